//! Binary record layouts for `.continuous`, `.spikes` and `.events` streams.
//!
//! Each stream kind has a [`RecordCodec`] configured from the stream header.
//! The decoder asks the codec how many bytes the next record occupies, cuts
//! that window out of the stream and hands it to [`RecordCodec::decode_one`].
//!
//! Layouts (after the 1024-byte header):
//!
//! - continuous, 2070 bytes: `i64` LE timestamp, `u16` LE sample count,
//!   `u16` BE recording number, 1024 × `i16` BE samples, 10-byte marker.
//! - spikes, variable: 42 bytes of metadata (channel and sample counts at
//!   bytes 19..23), then `channels × samples` × `u16` waveform, `channels` ×
//!   `f32` gain, `channels` × `u16` threshold, `u16` recording number. LE.
//! - events, 16 bytes: `i64` timestamp, `i16` sample number, `u8` event
//!   type, `u8` node id, `u8` event id, `u8` channel, `u16` recording
//!   number. LE.

use crate::fields::FieldReader;
use crate::header::Header;
use crate::options::{DecodeOptions, UnitMode};
use crate::record::{ContinuousRecord, EventRecord, SpikeRecord};
use crate::types::{ByteOrder, StreamKind};
use crate::{OeError, Result};

/// Samples in every continuous record.
pub const SAMPLES_PER_RECORD: usize = 1024;

/// Marker closing every continuous record.
pub const RECORD_MARKER: [u8; 10] = [0, 1, 2, 3, 4, 5, 6, 7, 8, 255];

/// Size of one continuous record in bytes.
pub const CONTINUOUS_RECORD_SIZE: usize = 8 + 2 + 2 + SAMPLES_PER_RECORD * 2 + RECORD_MARKER.len();

/// Fixed metadata preceding every spike waveform.
pub const SPIKE_META_SIZE: usize = 42;

/// Byte offset of the channel count inside a spike record.
const SPIKE_COUNTS_OFFSET: usize = 19;

/// Event type tag written in front of every spike.
pub const SPIKE_EVENT_TYPE: u8 = 4;

/// Samples per spike the acquisition software writes but does not record in
/// the header.
pub const NOMINAL_SPIKE_SAMPLES: usize = 40;

/// Zero level of stored spike waveform values.
pub const WAVEFORM_OFFSET: u16 = 32768;

/// Size of one event record in bytes.
pub const EVENT_RECORD_SIZE: usize = 16;

/// Oldest spike/event format version this crate reads.
pub const MIN_VERSION: f64 = 0.4;

/// Position of a record in its stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordPos {
    /// Zero-based record index.
    pub index: usize,
    /// Byte offset of the record from the start of the file.
    pub offset: usize,
}

/// Layout of one record kind.
pub trait RecordCodec: Sized {
    type Record;

    const KIND: StreamKind;

    /// Configure the codec from the stream header, validating what the
    /// layout depends on.
    fn from_header(header: &Header, options: &DecodeOptions) -> Result<Self>;

    /// Record size if it is the same for every record.
    fn fixed_record_size(&self) -> Option<usize>;

    /// Bytes the record starting at `window[0]` occupies.
    fn record_size(&self, window: &[u8], pos: RecordPos) -> Result<usize>;

    /// Decode one record. `window` is exactly [`record_size`] bytes long.
    ///
    /// [`record_size`]: RecordCodec::record_size
    fn decode_one(&self, window: &[u8], pos: RecordPos) -> Result<Self::Record>;
}

/// Size of a spike record with the given counts.
pub fn spike_record_size(n_channels: usize, n_samples: usize) -> usize {
    SPIKE_META_SIZE + n_channels * n_samples * 2 + n_channels * 4 + n_channels * 2 + 2
}

fn check_version(header: &Header) -> Result<f64> {
    let version = header.version()?;
    if version < MIN_VERSION {
        return Err(OeError::UnsupportedVersion {
            found: version,
            minimum: MIN_VERSION,
        });
    }
    Ok(version)
}

/// Codec for `.continuous` records.
#[derive(Debug, Clone)]
pub struct ContinuousCodec {
    bit_volts: Option<f64>,
    verify_marker: bool,
}

impl ContinuousCodec {
    /// Bit-to-volt factor from the header, if present.
    pub fn bit_volts(&self) -> Option<f64> {
        self.bit_volts
    }
}

impl RecordCodec for ContinuousCodec {
    type Record = ContinuousRecord;

    const KIND: StreamKind = StreamKind::Continuous;

    fn from_header(header: &Header, options: &DecodeOptions) -> Result<Self> {
        if let Some(block_length) = header.block_length() {
            let block_length = block_length?;
            if block_length != SAMPLES_PER_RECORD {
                return Err(OeError::UnsupportedBlockLength {
                    found: block_length,
                    expected: SAMPLES_PER_RECORD,
                });
            }
        }

        // Physical output cannot be produced without the scale factor.
        let bit_volts = match options.units {
            UnitMode::Physical(_) => Some(header.bit_volts()?),
            UnitMode::Raw => header.bit_volts().ok(),
        };

        Ok(Self {
            bit_volts,
            verify_marker: options.verify_marker,
        })
    }

    fn fixed_record_size(&self) -> Option<usize> {
        Some(CONTINUOUS_RECORD_SIZE)
    }

    fn record_size(&self, _window: &[u8], _pos: RecordPos) -> Result<usize> {
        Ok(CONTINUOUS_RECORD_SIZE)
    }

    fn decode_one(&self, window: &[u8], pos: RecordPos) -> Result<ContinuousRecord> {
        let mut r = FieldReader::new(window, pos.index, pos.offset);

        let timestamp = r.read_i64(ByteOrder::Little)?;
        let sample_count = r.read_u16(ByteOrder::Little)?;
        if sample_count as usize != SAMPLES_PER_RECORD {
            return Err(OeError::SampleCountMismatch {
                record: pos.index,
                expected: SAMPLES_PER_RECORD,
                actual: sample_count as usize,
            });
        }
        let recording_number = r.read_u16(ByteOrder::Big)?;

        let mut samples = Vec::with_capacity(SAMPLES_PER_RECORD);
        r.read_i16_into(SAMPLES_PER_RECORD, ByteOrder::Big, &mut samples)?;

        let marker = r.read_bytes::<10>()?;
        if self.verify_marker && marker != RECORD_MARKER {
            return Err(OeError::BadRecordMarker {
                record: pos.index,
                found: marker,
            });
        }

        Ok(ContinuousRecord {
            timestamp,
            sample_count,
            recording_number,
            samples,
            marker,
        })
    }
}

/// Codec for `.spikes` records.
///
/// Channel and sample counts are read from every record and drive the size
/// of the waveform, gain and threshold blocks. The header's `num_channels`
/// is only enforced with [`DecodeOptions::require_header_shape`].
#[derive(Debug, Clone)]
pub struct SpikeCodec {
    version: f64,
    num_channels: usize,
    require_header_shape: bool,
    physical: bool,
}

impl SpikeCodec {
    pub fn version(&self) -> f64 {
        self.version
    }

    /// Channel count declared in the header.
    pub fn num_channels(&self) -> usize {
        self.num_channels
    }

    fn invalid(pos: RecordPos, reason: String) -> OeError {
        OeError::InvalidSpikeRecord {
            record: pos.index,
            reason,
        }
    }
}

impl RecordCodec for SpikeCodec {
    type Record = SpikeRecord;

    const KIND: StreamKind = StreamKind::Spikes;

    fn from_header(header: &Header, options: &DecodeOptions) -> Result<Self> {
        let version = check_version(header)?;
        let num_channels = header.num_channels()?;
        Ok(Self {
            version,
            num_channels,
            require_header_shape: options.require_header_shape,
            physical: matches!(options.units, UnitMode::Physical(_)),
        })
    }

    fn fixed_record_size(&self) -> Option<usize> {
        None
    }

    fn record_size(&self, window: &[u8], pos: RecordPos) -> Result<usize> {
        let mut r = FieldReader::new(window, pos.index, pos.offset);
        r.take(SPIKE_COUNTS_OFFSET)?;
        let n_channels = r.read_u16(ByteOrder::Little)? as usize;
        let n_samples = r.read_u16(ByteOrder::Little)? as usize;
        Ok(spike_record_size(n_channels, n_samples))
    }

    fn decode_one(&self, window: &[u8], pos: RecordPos) -> Result<SpikeRecord> {
        let mut r = FieldReader::new(window, pos.index, pos.offset);

        // Field order matters: the counts size everything after the metadata.
        let event_type = r.read_u8()?;
        let timestamp = r.read_i64(ByteOrder::Little)?;
        let software_timestamp = r.read_i64(ByteOrder::Little)?;
        let source_id = r.read_u16(ByteOrder::Little)?;
        let n_channels = r.read_u16(ByteOrder::Little)?;
        let n_samples = r.read_u16(ByteOrder::Little)?;
        let sorted_id = r.read_u16(ByteOrder::Little)?;
        let electrode_id = r.read_u16(ByteOrder::Little)?;
        let channel = r.read_u16(ByteOrder::Little)?;
        let color = r.read_bytes::<3>()?;
        let pc_projection = [r.read_f32(ByteOrder::Little)?, r.read_f32(ByteOrder::Little)?];
        let sample_frequency = r.read_u16(ByteOrder::Little)?;

        let nc = n_channels as usize;
        let ns = n_samples as usize;

        let mut waveform = Vec::with_capacity(nc * ns);
        r.read_u16_into(nc * ns, ByteOrder::Little, &mut waveform)?;
        let mut gains = Vec::with_capacity(nc);
        r.read_f32_into(nc, ByteOrder::Little, &mut gains)?;
        let mut thresholds = Vec::with_capacity(nc);
        r.read_u16_into(nc, ByteOrder::Little, &mut thresholds)?;
        let recording_number = r.read_u16(ByteOrder::Little)?;

        if nc == 0 || ns == 0 {
            return Err(Self::invalid(
                pos,
                format!("empty waveform ({nc} channels x {ns} samples)"),
            ));
        }
        if self.require_header_shape && (nc != self.num_channels || ns != NOMINAL_SPIKE_SAMPLES) {
            return Err(Self::invalid(
                pos,
                format!(
                    "shape {nc}x{ns} differs from header {}x{NOMINAL_SPIKE_SAMPLES}",
                    self.num_channels
                ),
            ));
        }
        if self.physical {
            if let Some((ch, gain)) = gains
                .iter()
                .enumerate()
                .find(|(_, g)| !(g.is_finite() && **g > 0.0))
            {
                return Err(Self::invalid(pos, format!("channel {ch} has gain {gain}")));
            }
        }

        Ok(SpikeRecord {
            event_type,
            timestamp,
            software_timestamp,
            source_id,
            n_channels,
            n_samples,
            sorted_id,
            electrode_id,
            channel,
            color,
            pc_projection,
            sample_frequency,
            waveform,
            gains,
            thresholds,
            recording_number,
        })
    }
}

/// Codec for `.events` records.
#[derive(Debug, Clone)]
pub struct EventCodec {
    version: f64,
}

impl EventCodec {
    pub fn version(&self) -> f64 {
        self.version
    }
}

impl RecordCodec for EventCodec {
    type Record = EventRecord;

    const KIND: StreamKind = StreamKind::Events;

    fn from_header(header: &Header, _options: &DecodeOptions) -> Result<Self> {
        Ok(Self {
            version: check_version(header)?,
        })
    }

    fn fixed_record_size(&self) -> Option<usize> {
        Some(EVENT_RECORD_SIZE)
    }

    fn record_size(&self, _window: &[u8], _pos: RecordPos) -> Result<usize> {
        Ok(EVENT_RECORD_SIZE)
    }

    fn decode_one(&self, window: &[u8], pos: RecordPos) -> Result<EventRecord> {
        let mut r = FieldReader::new(window, pos.index, pos.offset);
        Ok(EventRecord {
            timestamp: r.read_i64(ByteOrder::Little)?,
            sample_number: r.read_i16(ByteOrder::Little)?,
            event_type: r.read_u8()?,
            node_id: r.read_u8()?,
            event_id: r.read_u8()?,
            channel: r.read_u8()?,
            recording_number: r.read_u16(ByteOrder::Little)?,
        })
    }
}
