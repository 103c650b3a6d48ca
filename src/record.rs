//! Decoded record types for the three stream kinds, and [`Samples`].
//!
//! One value of [`ContinuousRecord`], [`SpikeRecord`] or [`EventRecord`]
//! corresponds to one binary record in the stream. The accumulated,
//! column-oriented results live in [`crate::data`].

use std::fmt;

use crate::codec::{RECORD_MARKER, SAMPLES_PER_RECORD, SPIKE_EVENT_TYPE, WAVEFORM_OFFSET};

/// One 1024-sample block of a `.continuous` file.
#[derive(Debug, Clone, PartialEq)]
pub struct ContinuousRecord {
    /// Timestamp of the first sample in the block.
    pub timestamp: i64,
    /// Sample count declared by the record (always 1024 in valid files).
    pub sample_count: u16,
    pub recording_number: u16,
    pub samples: Vec<i16>,
    pub marker: [u8; 10],
}

impl ContinuousRecord {
    /// Create a record holding `samples`, declaring their count.
    pub fn new(timestamp: i64, samples: Vec<i16>) -> Self {
        Self {
            timestamp,
            sample_count: samples.len() as u16,
            recording_number: 0,
            samples,
            marker: RECORD_MARKER,
        }
    }

    /// A full-size record filled with `value`.
    pub fn filled(timestamp: i64, value: i16) -> Self {
        Self::new(timestamp, vec![value; SAMPLES_PER_RECORD])
    }

    pub fn with_recording_number(mut self, recording_number: u16) -> Self {
        self.recording_number = recording_number;
        self
    }

    /// Override the declared sample count without touching the samples.
    pub fn with_sample_count(mut self, sample_count: u16) -> Self {
        self.sample_count = sample_count;
        self
    }
}

impl fmt::Display for ContinuousRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "continuous @ {} | rec {} | {} samples",
            self.timestamp, self.recording_number, self.sample_count
        )
    }
}

/// One spike from a `.spikes` file.
///
/// The waveform is stored channel-major (`[channel][sample]`) as unsigned
/// 16-bit values offset by 32768.
#[derive(Debug, Clone, PartialEq)]
pub struct SpikeRecord {
    pub event_type: u8,
    pub timestamp: i64,
    pub software_timestamp: i64,
    pub source_id: u16,
    pub n_channels: u16,
    pub n_samples: u16,
    pub sorted_id: u16,
    pub electrode_id: u16,
    pub channel: u16,
    pub color: [u8; 3],
    pub pc_projection: [f32; 2],
    pub sample_frequency: u16,
    pub waveform: Vec<u16>,
    pub gains: Vec<f32>,
    pub thresholds: Vec<u16>,
    pub recording_number: u16,
}

impl SpikeRecord {
    /// Create a flat-line spike of the given shape.
    ///
    /// Defaults: event type 4, waveform at the zero offset, gain 1.0,
    /// threshold 0, all ids 0.
    pub fn new(n_channels: u16, n_samples: u16) -> Self {
        let nc = n_channels as usize;
        Self {
            event_type: SPIKE_EVENT_TYPE,
            timestamp: 0,
            software_timestamp: 0,
            source_id: 0,
            n_channels,
            n_samples,
            sorted_id: 0,
            electrode_id: 0,
            channel: 0,
            color: [0; 3],
            pc_projection: [0.0; 2],
            sample_frequency: 0,
            waveform: vec![WAVEFORM_OFFSET; nc * n_samples as usize],
            gains: vec![1.0; nc],
            thresholds: vec![0; nc],
            recording_number: 0,
        }
    }

    pub fn with_timestamp(mut self, timestamp: i64) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Set the waveform (channel-major, offset by 32768).
    pub fn with_waveform(mut self, waveform: Vec<u16>) -> Self {
        self.waveform = waveform;
        self
    }

    pub fn with_gains(mut self, gains: Vec<f32>) -> Self {
        self.gains = gains;
        self
    }

    pub fn with_thresholds(mut self, thresholds: Vec<u16>) -> Self {
        self.thresholds = thresholds;
        self
    }

    pub fn with_source(mut self, source_id: u16) -> Self {
        self.source_id = source_id;
        self
    }

    pub fn with_sorted_id(mut self, sorted_id: u16) -> Self {
        self.sorted_id = sorted_id;
        self
    }

    pub fn with_recording_number(mut self, recording_number: u16) -> Self {
        self.recording_number = recording_number;
        self
    }

    /// Size of this record on disk.
    pub fn encoded_len(&self) -> usize {
        crate::codec::spike_record_size(self.n_channels as usize, self.n_samples as usize)
    }
}

impl fmt::Display for SpikeRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "spike @ {} | electrode {} | {}x{} | sorted {}",
            self.timestamp, self.electrode_id, self.n_channels, self.n_samples, self.sorted_id
        )
    }
}

/// One entry of a `.events` file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EventRecord {
    pub timestamp: i64,
    pub sample_number: i16,
    pub event_type: u8,
    pub node_id: u8,
    pub event_id: u8,
    pub channel: u8,
    pub recording_number: u16,
}

impl fmt::Display for EventRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "event @ {} | type {} | node {} | id {} | ch {}",
            self.timestamp, self.event_type, self.node_id, self.event_id, self.channel
        )
    }
}

/// Decoded sample data.
#[derive(Debug, Clone, PartialEq)]
pub enum Samples {
    /// Raw continuous samples.
    Int(Vec<i16>),
    /// Raw spike waveform values (offset by 32768).
    UInt(Vec<u16>),
    Float(Vec<f32>),
    Double(Vec<f64>),
}

impl Samples {
    pub fn len(&self) -> usize {
        match self {
            Samples::Int(v) => v.len(),
            Samples::UInt(v) => v.len(),
            Samples::Float(v) => v.len(),
            Samples::Double(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Value at `index` widened to `f64`.
    pub fn get_f64(&self, index: usize) -> Option<f64> {
        match self {
            Samples::Int(v) => v.get(index).map(|&x| x as f64),
            Samples::UInt(v) => v.get(index).map(|&x| x as f64),
            Samples::Float(v) => v.get(index).map(|&x| x as f64),
            Samples::Double(v) => v.get(index).copied(),
        }
    }

    pub(crate) fn shrink_to_fit(&mut self) {
        match self {
            Samples::Int(v) => v.shrink_to_fit(),
            Samples::UInt(v) => v.shrink_to_fit(),
            Samples::Float(v) => v.shrink_to_fit(),
            Samples::Double(v) => v.shrink_to_fit(),
        }
    }
}
