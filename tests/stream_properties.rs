//! Whole-stream properties of the decoders, exercised through the public API.

use openephys_rs::encode::{encode_continuous, encode_events, encode_header, encode_spikes};
use openephys_rs::{
    ContinuousRecord, CorruptionPolicy, DecodeOptions, DecodedStream, ErrorKind, EventRecord,
    Header, OeError, Samples, SpikeRecord, StreamKind, UnitMode, decode, decode_continuous,
    decode_events, decode_spikes, open,
};

fn continuous_header(bit_volts: &str) -> Header {
    Header::new()
        .with_field("format", "'Open Ephys Data Format'")
        .with_field(" version", "0.4")
        .with_field("sampleRate", "30000")
        .with_field("blockLength", "1024")
        .with_field("bitVolts", bit_volts)
}

fn ramp_records(n: usize) -> Vec<ContinuousRecord> {
    (0..n)
        .map(|r| {
            let samples = (0..1024).map(|i| (i as i16 - 512) * (r as i16 + 1)).collect();
            ContinuousRecord::new(r as i64 * 1024, samples)
        })
        .collect()
}

fn raw() -> DecodeOptions {
    DecodeOptions::new().with_units(UnitMode::Raw)
}

#[test]
fn n_records_give_n_times_1024_samples() {
    for n in [1, 2, 7] {
        let data = encode_continuous(&continuous_header("0.195"), &ramp_records(n)).unwrap();
        let decoded = decode_continuous(&data, &raw()).unwrap();
        assert_eq!(decoded.samples.len(), n * 1024);
        assert_eq!(decoded.timestamps.len(), n);
        assert_eq!(decoded.recording_numbers.len(), n);
    }
}

#[test]
fn raw_samples_round_trip_exactly() {
    let records = ramp_records(3);
    let data = encode_continuous(&continuous_header("0.195"), &records).unwrap();
    let decoded = decode_continuous(&data, &raw()).unwrap();

    let expected: Vec<i16> = records.iter().flat_map(|r| r.samples.clone()).collect();
    assert_eq!(decoded.samples, Samples::Int(expected));
}

#[test]
fn physical_samples_scale_by_bit_volts() {
    let records = ramp_records(2);
    let data = encode_continuous(&continuous_header("0.195"), &records).unwrap();
    let decoded = decode_continuous(&data, &DecodeOptions::default()).unwrap();

    let Samples::Double(values) = &decoded.samples else {
        panic!("expected f64 samples");
    };
    let raw_values = records.iter().flat_map(|r| r.samples.iter());
    for (&v, &raw) in values.iter().zip(raw_values) {
        assert!((v - raw as f64 * 0.195).abs() < 1e-9);
    }
}

#[test]
fn decoding_twice_gives_identical_results() {
    let data = encode_continuous(&continuous_header("0.5"), &ramp_records(4)).unwrap();
    let opts = DecodeOptions::default();
    assert_eq!(
        decode_continuous(&data, &opts).unwrap(),
        decode_continuous(&data, &opts).unwrap()
    );

    let header = Header::new()
        .with_field(" version", "0.4")
        .with_field("num_channels", "2");
    let spikes = encode_spikes(&header, &[SpikeRecord::new(2, 40), SpikeRecord::new(2, 40)]).unwrap();
    assert_eq!(
        decode_spikes(&spikes, &opts).unwrap(),
        decode_spikes(&spikes, &opts).unwrap()
    );
}

#[test]
fn header_only_file_decodes_to_empty_arrays() {
    let data = encode_header(&continuous_header("0.195")).unwrap();
    assert_eq!(data.len(), 1024);
    let decoded = decode_continuous(&data, &DecodeOptions::default()).unwrap();
    assert!(decoded.samples.is_empty());
    assert!(decoded.timestamps.is_empty());

    let events = encode_header(&Header::new().with_field(" version", "0.4")).unwrap();
    let decoded = decode_events(&events, &DecodeOptions::default()).unwrap();
    assert_eq!(decoded.num_events(), 0);
}

#[test]
fn trailing_partial_continuous_record_is_format_error() {
    let mut data = encode_continuous(&continuous_header("0.195"), &ramp_records(2)).unwrap();
    data.truncate(data.len() - 70);
    let err = decode_continuous(&data, &DecodeOptions::default()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Format);
    assert!(matches!(
        err,
        OeError::TruncatedStream {
            remainder: 2000,
            ..
        }
    ));
}

#[test]
fn bad_sample_count_in_first_record_is_corruption_at_record_zero() {
    let records = [ContinuousRecord::filled(0, 3).with_sample_count(1023)];
    let data = encode_continuous(&continuous_header("0.195"), &records).unwrap();
    let err = decode_continuous(&data, &DecodeOptions::default()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Corruption);
    assert_eq!(err.record_index(), Some(0));
    assert!(err.to_string().contains("record 0"));
}

#[test]
fn old_spike_version_is_rejected_before_records() {
    let header = Header::new()
        .with_field(" version", "0.3")
        .with_field("num_channels", "4");
    let data = encode_spikes(&header, &[SpikeRecord::new(4, 40)]).unwrap();
    let err = decode_spikes(&data, &DecodeOptions::default()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Format);
    assert_eq!(err.record_index(), None);
}

#[test]
fn three_events_decode_to_matching_arrays() {
    let events = [
        EventRecord {
            timestamp: 10,
            sample_number: 1,
            event_type: 3,
            node_id: 101,
            event_id: 1,
            channel: 0,
            recording_number: 0,
        },
        EventRecord {
            timestamp: 20,
            sample_number: 2,
            event_type: 3,
            node_id: 101,
            event_id: 0,
            channel: 0,
            recording_number: 0,
        },
        EventRecord {
            timestamp: 30,
            sample_number: 3,
            event_type: 5,
            node_id: 102,
            event_id: 1,
            channel: 7,
            recording_number: 1,
        },
    ];
    let data = encode_events(&Header::new().with_field(" version", "0.4"), &events).unwrap();
    let decoded = decode_events(&data, &DecodeOptions::default()).unwrap();

    assert_eq!(decoded.timestamps, vec![10, 20, 30]);
    assert_eq!(decoded.sample_numbers, vec![1, 2, 3]);
    assert_eq!(decoded.event_types, vec![3, 3, 5]);
    assert_eq!(decoded.node_ids, vec![101, 101, 102]);
    assert_eq!(decoded.event_ids, vec![1, 0, 1]);
    assert_eq!(decoded.channels, vec![0, 0, 7]);
    assert_eq!(decoded.recording_numbers, vec![0, 0, 1]);
}

#[test]
fn lenient_policy_reports_skipped_spikes() {
    let header = Header::new()
        .with_field(" version", "0.4")
        .with_field("num_channels", "1");
    let records = [
        SpikeRecord::new(1, 40).with_timestamp(1),
        SpikeRecord::new(1, 0).with_timestamp(2),
        SpikeRecord::new(1, 40).with_timestamp(3),
    ];
    let data = encode_spikes(&header, &records).unwrap();

    let strict = decode_spikes(&data, &DecodeOptions::default()).unwrap_err();
    assert!(strict.is_corruption());

    let opts = DecodeOptions::new().with_policy(CorruptionPolicy::Lenient);
    let decoded = decode_spikes(&data, &opts).unwrap();
    assert_eq!(decoded.timestamps, vec![1, 3]);
    assert_eq!(decoded.skipped, vec![1]);
}

#[test]
fn independent_streams_decode_in_parallel() {
    let streams: Vec<Vec<u8>> = (1..=4)
        .map(|n| encode_continuous(&continuous_header("0.195"), &ramp_records(n)).unwrap())
        .collect();
    let opts = &DecodeOptions::default();

    let counts: Vec<usize> = std::thread::scope(|s| {
        let handles: Vec<_> = streams
            .iter()
            .map(|data| s.spawn(move || decode(data, StreamKind::Continuous, opts).unwrap().len()))
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });
    assert_eq!(counts, vec![1, 2, 3, 4]);
}

#[test]
fn open_reads_each_kind_from_disk() {
    let dir = tempfile::tempdir().unwrap();

    let continuous = dir.path().join("100_CH1.continuous");
    std::fs::write(
        &continuous,
        encode_continuous(&continuous_header("0.195"), &ramp_records(2)).unwrap(),
    )
    .unwrap();
    let spikes = dir.path().join("STp106.0n0.spikes");
    std::fs::write(
        &spikes,
        encode_spikes(
            &Header::new()
                .with_field(" version", "0.4")
                .with_field("num_channels", "4"),
            &[SpikeRecord::new(4, 40)],
        )
        .unwrap(),
    )
    .unwrap();

    let opts = DecodeOptions::default();
    match open(&continuous, &opts).unwrap() {
        DecodedStream::Continuous(data) => assert_eq!(data.num_records(), 2),
        other => panic!("unexpected stream kind {}", other.kind()),
    }
    match open(&spikes, &opts).unwrap() {
        DecodedStream::Spikes(data) => assert_eq!(data.waveforms.shape(), (1, 4, 40)),
        other => panic!("unexpected stream kind {}", other.kind()),
    }

    let unknown = dir.path().join("notes.txt");
    std::fs::write(&unknown, b"hello").unwrap();
    let err = open(&unknown, &opts).unwrap_err();
    assert!(matches!(err, OeError::UnknownStreamKind(_)));
}
