use criterion::{Criterion, Throughput, black_box, criterion_group, criterion_main};
use openephys_rs::codec::SpikeCodec;
use openephys_rs::encode::{encode_continuous, encode_events, encode_spikes};
use openephys_rs::{
    ContinuousRecord, DecodeOptions, EventRecord, Header, Precision, RecordReader, SpikeRecord,
    UnitMode, decode_continuous, decode_events, decode_spikes,
};

/// Generate LFP-like samples (slow oscillation plus faster ripple).
fn lfp_samples(record: usize) -> Vec<i16> {
    (0..1024)
        .map(|i| {
            let t = (record * 1024 + i) as f64;
            let slow = (t * 0.002).sin() * 400.0;
            let ripple = (t * 0.9).sin() * 25.0;
            (slow + ripple) as i16
        })
        .collect()
}

fn continuous_stream(records: usize) -> Vec<u8> {
    let header = Header::new()
        .with_field("bitVolts", "0.195")
        .with_field("sampleRate", "30000");
    let records: Vec<_> = (0..records)
        .map(|r| ContinuousRecord::new(r as i64 * 1024, lfp_samples(r)))
        .collect();
    encode_continuous(&header, &records).unwrap()
}

fn spike_stream(spikes: usize) -> Vec<u8> {
    let header = Header::new()
        .with_field(" version", "0.4")
        .with_field("num_channels", "4");
    let records: Vec<_> = (0..spikes)
        .map(|i| {
            let waveform = (0..4 * 40)
                .map(|s| 32768u16.wrapping_add(((s as f64 * 0.3).sin() * 300.0) as i16 as u16))
                .collect();
            SpikeRecord::new(4, 40)
                .with_timestamp(i as i64 * 300)
                .with_waveform(waveform)
                .with_gains(vec![2000.0; 4])
        })
        .collect();
    encode_spikes(&header, &records).unwrap()
}

fn event_stream(events: usize) -> Vec<u8> {
    let header = Header::new().with_field(" version", "0.4");
    let records: Vec<_> = (0..events)
        .map(|i| EventRecord {
            timestamp: i as i64 * 100,
            event_type: 3,
            event_id: (i % 2) as u8,
            channel: (i % 8) as u8,
            ..Default::default()
        })
        .collect();
    encode_events(&header, &records).unwrap()
}

fn bench_continuous(c: &mut Criterion) {
    let data = continuous_stream(100);

    let mut group = c.benchmark_group("continuous");

    group.throughput(Throughput::Elements(100 * 1024));

    let raw = DecodeOptions::new().with_units(UnitMode::Raw);
    let single = DecodeOptions::new().with_units(UnitMode::Physical(Precision::F32));
    let double = DecodeOptions::default();
    group.bench_function("raw/100rec", |b| {
        b.iter(|| decode_continuous(black_box(&data), &raw).unwrap())
    });
    group.bench_function("f32/100rec", |b| {
        b.iter(|| decode_continuous(black_box(&data), &single).unwrap())
    });
    group.bench_function("f64/100rec", |b| {
        b.iter(|| decode_continuous(black_box(&data), &double).unwrap())
    });

    group.finish();
}

fn bench_spikes(c: &mut Criterion) {
    let data = spike_stream(1000);
    let opts = DecodeOptions::default();

    let mut group = c.benchmark_group("spikes");

    group.throughput(Throughput::Elements(1000));

    group.bench_function("decode/1000spk", |b| {
        b.iter(|| decode_spikes(black_box(&data), &opts).unwrap())
    });
    group.bench_function("reader/1000spk", |b| {
        b.iter(|| {
            RecordReader::<SpikeCodec>::new(black_box(&data), &opts)
                .unwrap()
                .filter(|r| r.is_ok())
                .count()
        })
    });

    group.finish();
}

fn bench_events(c: &mut Criterion) {
    let data = event_stream(10_000);
    let opts = DecodeOptions::default();

    let mut group = c.benchmark_group("events");

    group.throughput(Throughput::Elements(10_000));

    group.bench_function("decode/10000evt", |b| {
        b.iter(|| decode_events(black_box(&data), &opts).unwrap())
    });

    group.finish();
}

criterion_group!(benches, bench_continuous, bench_spikes, bench_events);
criterion_main!(benches);
