//! Encode headers and records into Open Ephys stream bytes.
//!
//! The writers mirror the decoder layouts in [`crate::codec`] and are mainly
//! used to build fixtures and synthetic recordings. Record fields are
//! written as given: a [`SpikeRecord`] whose waveform length disagrees with
//! its declared counts produces a misaligned stream, which is occasionally
//! what a test wants.

use crate::header::{HEADER_SIZE, Header};
use crate::record::{ContinuousRecord, EventRecord, SpikeRecord};
use crate::{OeError, Result};

/// Encode `header` as the 1024-byte text preamble, padded with spaces.
pub fn encode_header(header: &Header) -> Result<Vec<u8>> {
    let mut text = String::new();
    for (key, value) in header.iter() {
        text.push_str("header.");
        text.push_str(key);
        text.push_str(" = ");
        text.push_str(value);
        text.push_str(";\n");
    }

    if text.len() > HEADER_SIZE {
        return Err(OeError::HeaderTooLong {
            len: text.len(),
            max: HEADER_SIZE,
        });
    }

    let mut buf = text.into_bytes();
    buf.resize(HEADER_SIZE, b' ');
    Ok(buf)
}

/// Encode one continuous record (2070 bytes for a full record).
pub fn encode_continuous_record(record: &ContinuousRecord) -> Vec<u8> {
    let mut buf = Vec::with_capacity(12 + record.samples.len() * 2 + record.marker.len());
    buf.extend_from_slice(&record.timestamp.to_le_bytes());
    buf.extend_from_slice(&record.sample_count.to_le_bytes());
    buf.extend_from_slice(&record.recording_number.to_be_bytes());
    for sample in &record.samples {
        buf.extend_from_slice(&sample.to_be_bytes());
    }
    buf.extend_from_slice(&record.marker);
    buf
}

/// Encode one spike record.
pub fn encode_spike_record(record: &SpikeRecord) -> Vec<u8> {
    let mut buf = Vec::with_capacity(record.encoded_len());
    buf.push(record.event_type);
    buf.extend_from_slice(&record.timestamp.to_le_bytes());
    buf.extend_from_slice(&record.software_timestamp.to_le_bytes());
    buf.extend_from_slice(&record.source_id.to_le_bytes());
    buf.extend_from_slice(&record.n_channels.to_le_bytes());
    buf.extend_from_slice(&record.n_samples.to_le_bytes());
    buf.extend_from_slice(&record.sorted_id.to_le_bytes());
    buf.extend_from_slice(&record.electrode_id.to_le_bytes());
    buf.extend_from_slice(&record.channel.to_le_bytes());
    buf.extend_from_slice(&record.color);
    for proj in record.pc_projection {
        buf.extend_from_slice(&proj.to_le_bytes());
    }
    buf.extend_from_slice(&record.sample_frequency.to_le_bytes());
    for value in &record.waveform {
        buf.extend_from_slice(&value.to_le_bytes());
    }
    for gain in &record.gains {
        buf.extend_from_slice(&gain.to_le_bytes());
    }
    for threshold in &record.thresholds {
        buf.extend_from_slice(&threshold.to_le_bytes());
    }
    buf.extend_from_slice(&record.recording_number.to_le_bytes());
    buf
}

/// Encode one 16-byte event record.
pub fn encode_event_record(record: &EventRecord) -> Vec<u8> {
    let mut buf = Vec::with_capacity(crate::codec::EVENT_RECORD_SIZE);
    buf.extend_from_slice(&record.timestamp.to_le_bytes());
    buf.extend_from_slice(&record.sample_number.to_le_bytes());
    buf.push(record.event_type);
    buf.push(record.node_id);
    buf.push(record.event_id);
    buf.push(record.channel);
    buf.extend_from_slice(&record.recording_number.to_le_bytes());
    buf
}

/// Encode a complete `.continuous` stream.
pub fn encode_continuous(header: &Header, records: &[ContinuousRecord]) -> Result<Vec<u8>> {
    let mut buf = encode_header(header)?;
    for record in records {
        buf.extend_from_slice(&encode_continuous_record(record));
    }
    Ok(buf)
}

/// Encode a complete `.spikes` stream.
pub fn encode_spikes(header: &Header, records: &[SpikeRecord]) -> Result<Vec<u8>> {
    let mut buf = encode_header(header)?;
    for record in records {
        buf.extend_from_slice(&encode_spike_record(record));
    }
    Ok(buf)
}

/// Encode a complete `.events` stream.
pub fn encode_events(header: &Header, records: &[EventRecord]) -> Result<Vec<u8>> {
    let mut buf = encode_header(header)?;
    for record in records {
        buf.extend_from_slice(&encode_event_record(record));
    }
    Ok(buf)
}
