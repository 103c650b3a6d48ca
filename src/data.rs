//! Column-oriented results of decoding a whole stream.
//!
//! Every per-record array in [`ContinuousData`], [`SpikeData`] and
//! [`EventData`] has the same length: the number of records that decoded
//! successfully. Records skipped in lenient mode contribute nothing but
//! their index in `skipped`.

use crate::codec::{RecordPos, SAMPLES_PER_RECORD};
use crate::header::Header;
use crate::options::UnitMode;
use crate::record::{ContinuousRecord, EventRecord, Samples, SpikeRecord};
use crate::types::StreamKind;
use crate::units;
use crate::{OeError, Result};

/// Decoded `.continuous` stream.
#[derive(Debug, Clone, PartialEq)]
pub struct ContinuousData {
    pub header: Header,
    /// All samples in record order, `records × 1024` long.
    pub samples: Samples,
    /// Timestamp of the first sample of each record.
    pub timestamps: Vec<i64>,
    pub recording_numbers: Vec<u16>,
}

impl ContinuousData {
    pub(crate) fn with_capacity(header: Header, units: UnitMode, records: usize) -> Self {
        Self {
            header,
            samples: units::continuous_buffer(units, records * SAMPLES_PER_RECORD),
            timestamps: Vec::with_capacity(records),
            recording_numbers: Vec::with_capacity(records),
        }
    }

    pub(crate) fn push(&mut self, record: ContinuousRecord, bit_volts: f64) {
        units::extend_continuous(&mut self.samples, &record.samples, bit_volts);
        self.timestamps.push(record.timestamp);
        self.recording_numbers.push(record.recording_number);
    }

    /// Number of decoded records.
    pub fn num_records(&self) -> usize {
        self.timestamps.len()
    }

    /// Sample rate from the header, if present.
    pub fn sample_rate(&self) -> Option<f64> {
        self.header.sample_rate()
    }

    /// Range of `samples` holding record `index`.
    pub fn record_samples(&self, index: usize) -> Option<std::ops::Range<usize>> {
        (index < self.num_records())
            .then(|| index * SAMPLES_PER_RECORD..(index + 1) * SAMPLES_PER_RECORD)
    }
}

/// Dense spike waveforms indexed `[spike, channel, sample]`.
#[derive(Debug, Clone, PartialEq)]
pub struct WaveformTensor {
    n_spikes: usize,
    n_channels: usize,
    n_samples: usize,
    values: Samples,
}

impl WaveformTensor {
    fn new(units: UnitMode) -> Self {
        Self {
            n_spikes: 0,
            n_channels: 0,
            n_samples: 0,
            values: units::waveform_buffer(units),
        }
    }

    /// `(spikes, channels, samples)`.
    pub fn shape(&self) -> (usize, usize, usize) {
        (self.n_spikes, self.n_channels, self.n_samples)
    }

    /// Flat values in `[spike][channel][sample]` order.
    pub fn values(&self) -> &Samples {
        &self.values
    }

    pub fn into_values(self) -> Samples {
        self.values
    }

    /// Value at `[spike, channel, sample]`, widened to `f64`.
    pub fn get(&self, spike: usize, channel: usize, sample: usize) -> Option<f64> {
        if spike >= self.n_spikes || channel >= self.n_channels || sample >= self.n_samples {
            return None;
        }
        let index = (spike * self.n_channels + channel) * self.n_samples + sample;
        self.values.get_f64(index)
    }

    /// Check that `record` fits the tensor shape, fixing the shape on the
    /// first spike.
    fn accept_shape(&mut self, record: &SpikeRecord, pos: RecordPos) -> Result<()> {
        let shape = (record.n_channels as usize, record.n_samples as usize);
        if self.n_spikes == 0 {
            self.n_channels = shape.0;
            self.n_samples = shape.1;
            return Ok(());
        }
        if shape != (self.n_channels, self.n_samples) {
            return Err(OeError::InvalidSpikeRecord {
                record: pos.index,
                reason: format!(
                    "waveform shape {}x{} differs from earlier spikes {}x{}",
                    shape.0, shape.1, self.n_channels, self.n_samples
                ),
            });
        }
        Ok(())
    }

    fn push(&mut self, record: &SpikeRecord) {
        units::extend_waveform(
            &mut self.values,
            &record.waveform,
            &record.gains,
            self.n_samples,
        );
        self.n_spikes += 1;
    }
}

/// Decoded `.spikes` stream.
#[derive(Debug, Clone, PartialEq)]
pub struct SpikeData {
    pub header: Header,
    pub waveforms: WaveformTensor,
    pub timestamps: Vec<i64>,
    pub software_timestamps: Vec<i64>,
    pub sources: Vec<u16>,
    pub electrode_ids: Vec<u16>,
    pub channels: Vec<u16>,
    pub sorted_ids: Vec<u16>,
    pub colors: Vec<[u8; 3]>,
    pub pc_projections: Vec<[f32; 2]>,
    pub sample_frequencies: Vec<u16>,
    /// Per-spike, per-channel gain.
    pub gains: Vec<Vec<f32>>,
    /// Per-spike, per-channel threshold.
    pub thresholds: Vec<Vec<u16>>,
    pub recording_numbers: Vec<u16>,
    /// Indices of records skipped in lenient mode.
    pub skipped: Vec<usize>,
}

impl SpikeData {
    pub(crate) fn new(header: Header, units: UnitMode) -> Self {
        Self {
            header,
            waveforms: WaveformTensor::new(units),
            timestamps: Vec::new(),
            software_timestamps: Vec::new(),
            sources: Vec::new(),
            electrode_ids: Vec::new(),
            channels: Vec::new(),
            sorted_ids: Vec::new(),
            colors: Vec::new(),
            pc_projections: Vec::new(),
            sample_frequencies: Vec::new(),
            gains: Vec::new(),
            thresholds: Vec::new(),
            recording_numbers: Vec::new(),
            skipped: Vec::new(),
        }
    }

    /// Append a spike. Nothing is appended if its shape is rejected.
    pub(crate) fn push(&mut self, record: SpikeRecord, pos: RecordPos) -> Result<()> {
        self.waveforms.accept_shape(&record, pos)?;
        self.waveforms.push(&record);
        self.timestamps.push(record.timestamp);
        self.software_timestamps.push(record.software_timestamp);
        self.sources.push(record.source_id);
        self.electrode_ids.push(record.electrode_id);
        self.channels.push(record.channel);
        self.sorted_ids.push(record.sorted_id);
        self.colors.push(record.color);
        self.pc_projections.push(record.pc_projection);
        self.sample_frequencies.push(record.sample_frequency);
        self.gains.push(record.gains);
        self.thresholds.push(record.thresholds);
        self.recording_numbers.push(record.recording_number);
        Ok(())
    }

    pub(crate) fn shrink_to_fit(&mut self) {
        self.waveforms.values.shrink_to_fit();
        self.timestamps.shrink_to_fit();
        self.software_timestamps.shrink_to_fit();
        self.sources.shrink_to_fit();
        self.electrode_ids.shrink_to_fit();
        self.channels.shrink_to_fit();
        self.sorted_ids.shrink_to_fit();
        self.colors.shrink_to_fit();
        self.pc_projections.shrink_to_fit();
        self.sample_frequencies.shrink_to_fit();
        self.gains.shrink_to_fit();
        self.thresholds.shrink_to_fit();
        self.recording_numbers.shrink_to_fit();
    }

    /// Number of decoded spikes.
    pub fn num_spikes(&self) -> usize {
        self.timestamps.len()
    }
}

/// Decoded `.events` stream.
#[derive(Debug, Clone, PartialEq)]
pub struct EventData {
    pub header: Header,
    pub timestamps: Vec<i64>,
    pub sample_numbers: Vec<i16>,
    pub event_types: Vec<u8>,
    pub node_ids: Vec<u8>,
    pub event_ids: Vec<u8>,
    pub channels: Vec<u8>,
    pub recording_numbers: Vec<u16>,
    /// Indices of records skipped in lenient mode.
    pub skipped: Vec<usize>,
}

impl EventData {
    pub(crate) fn with_capacity(header: Header, events: usize) -> Self {
        Self {
            header,
            timestamps: Vec::with_capacity(events),
            sample_numbers: Vec::with_capacity(events),
            event_types: Vec::with_capacity(events),
            node_ids: Vec::with_capacity(events),
            event_ids: Vec::with_capacity(events),
            channels: Vec::with_capacity(events),
            recording_numbers: Vec::with_capacity(events),
            skipped: Vec::new(),
        }
    }

    pub(crate) fn push(&mut self, record: EventRecord) {
        self.timestamps.push(record.timestamp);
        self.sample_numbers.push(record.sample_number);
        self.event_types.push(record.event_type);
        self.node_ids.push(record.node_id);
        self.event_ids.push(record.event_id);
        self.channels.push(record.channel);
        self.recording_numbers.push(record.recording_number);
    }

    pub(crate) fn shrink_to_fit(&mut self) {
        self.timestamps.shrink_to_fit();
        self.sample_numbers.shrink_to_fit();
        self.event_types.shrink_to_fit();
        self.node_ids.shrink_to_fit();
        self.event_ids.shrink_to_fit();
        self.channels.shrink_to_fit();
        self.recording_numbers.shrink_to_fit();
    }

    /// Number of decoded events.
    pub fn num_events(&self) -> usize {
        self.timestamps.len()
    }

    /// Iterate over the events as records.
    pub fn iter(&self) -> impl Iterator<Item = EventRecord> + '_ {
        (0..self.num_events()).map(|i| EventRecord {
            timestamp: self.timestamps[i],
            sample_number: self.sample_numbers[i],
            event_type: self.event_types[i],
            node_id: self.node_ids[i],
            event_id: self.event_ids[i],
            channel: self.channels[i],
            recording_number: self.recording_numbers[i],
        })
    }
}

/// Result of decoding a stream whose kind is only known at run time.
#[derive(Debug, Clone, PartialEq)]
pub enum DecodedStream {
    Continuous(ContinuousData),
    Spikes(SpikeData),
    Events(EventData),
}

impl DecodedStream {
    pub fn kind(&self) -> StreamKind {
        match self {
            Self::Continuous(_) => StreamKind::Continuous,
            Self::Spikes(_) => StreamKind::Spikes,
            Self::Events(_) => StreamKind::Events,
        }
    }

    pub fn header(&self) -> &Header {
        match self {
            Self::Continuous(d) => &d.header,
            Self::Spikes(d) => &d.header,
            Self::Events(d) => &d.header,
        }
    }

    /// Number of decoded records.
    pub fn len(&self) -> usize {
        match self {
            Self::Continuous(d) => d.num_records(),
            Self::Spikes(d) => d.num_spikes(),
            Self::Events(d) => d.num_events(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::Precision;

    const POS: RecordPos = RecordPos {
        index: 1,
        offset: 0,
    };

    #[test]
    fn test_tensor_indexing() {
        let mut data = SpikeData::new(Header::new(), UnitMode::Raw);
        let rec = SpikeRecord::new(2, 3).with_waveform(vec![1, 2, 3, 4, 5, 6]);
        data.push(rec, POS).unwrap();
        let rec = SpikeRecord::new(2, 3).with_waveform(vec![7, 8, 9, 10, 11, 12]);
        data.push(rec, POS).unwrap();

        let w = &data.waveforms;
        assert_eq!(w.shape(), (2, 2, 3));
        assert_eq!(w.get(0, 0, 0), Some(1.0));
        assert_eq!(w.get(0, 1, 2), Some(6.0));
        assert_eq!(w.get(1, 1, 0), Some(10.0));
        assert_eq!(w.get(2, 0, 0), None);
        assert_eq!(w.get(0, 2, 0), None);
    }

    #[test]
    fn test_shape_mismatch_leaves_data_untouched() {
        let mut data = SpikeData::new(Header::new(), UnitMode::Physical(Precision::F32));
        data.push(SpikeRecord::new(1, 4), POS).unwrap();
        let err = data.push(SpikeRecord::new(2, 4), POS).unwrap_err();
        assert!(matches!(err, OeError::InvalidSpikeRecord { record: 1, .. }));
        assert_eq!(data.num_spikes(), 1);
        assert_eq!(data.waveforms.shape(), (1, 1, 4));
        assert_eq!(data.waveforms.values().len(), 4);
        assert_eq!(data.gains.len(), 1);
    }

    #[test]
    fn test_continuous_record_ranges() {
        let mut data = ContinuousData::with_capacity(Header::new(), UnitMode::Raw, 2);
        data.push(ContinuousRecord::filled(0, 1), 1.0);
        data.push(ContinuousRecord::filled(1024, 2), 1.0);
        assert_eq!(data.num_records(), 2);
        assert_eq!(data.record_samples(1), Some(1024..2048));
        assert_eq!(data.record_samples(2), None);
        assert_eq!(data.samples.get_f64(1024), Some(2.0));
    }
}
