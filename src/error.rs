//! Error types for Open Ephys decoding.
//!
//! Every failure is an [`OeError`]. Use [`OeError::kind`] to tell structural
//! problems ([`ErrorKind::Format`]) from inconsistent record contents
//! ([`ErrorKind::Corruption`]) and I/O failures ([`ErrorKind::Io`]).

use thiserror::Error;

#[derive(Debug, Error)]
pub enum OeError {
    #[error("header too short: expected {expected} bytes, got {actual}")]
    HeaderTooShort { expected: usize, actual: usize },

    #[error("header text is {len} bytes, at most {max} fit")]
    HeaderTooLong { len: usize, max: usize },

    #[error("header is not valid UTF-8 (byte {offset})")]
    InvalidHeaderText { offset: usize },

    #[error("header key {0:?} not found")]
    MissingHeaderKey(String),

    #[error("header key {key:?} has invalid value {value:?}")]
    InvalidHeaderValue { key: String, value: String },

    #[error("unsupported format version {found} (minimum {minimum})")]
    UnsupportedVersion { found: f64, minimum: f64 },

    #[error("unsupported block length {found} (expected {expected})")]
    UnsupportedBlockLength { found: usize, expected: usize },

    #[error(
        "stream length is not a whole number of {record_size}-byte records: \
         {remainder} trailing bytes at offset {offset}"
    )]
    TruncatedStream {
        offset: usize,
        record_size: usize,
        remainder: usize,
    },

    #[error("partial record {record} at offset {offset}: need {needed} bytes, {available} left")]
    PartialRecord {
        record: usize,
        offset: usize,
        needed: usize,
        available: usize,
    },

    #[error("data length {len} is not a multiple of {n_channels} interleaved channels")]
    ChannelCountMismatch { len: usize, n_channels: usize },

    #[error("channel {channel} out of range ({n_channels} channels)")]
    ChannelOutOfRange { channel: usize, n_channels: usize },

    #[error("cannot determine stream kind of {0:?}")]
    UnknownStreamKind(String),

    #[error("invalid sidecar metadata: {0}")]
    InvalidMetadata(#[from] serde_json::Error),

    #[error("corrupted record {record}: declared {actual} samples, expected {expected}")]
    SampleCountMismatch {
        record: usize,
        expected: usize,
        actual: usize,
    },

    #[error("corrupted record {record}: bad record marker {found:?}")]
    BadRecordMarker { record: usize, found: [u8; 10] },

    #[error("corrupted spike record {record}: {reason}")]
    InvalidSpikeRecord { record: usize, reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Coarse classification of an [`OeError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Structural: header size, record count, version, metadata layout.
    Format,
    /// A record's fields are internally inconsistent.
    Corruption,
    /// Reading the byte source failed.
    Io,
}

impl OeError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::SampleCountMismatch { .. }
            | Self::BadRecordMarker { .. }
            | Self::InvalidSpikeRecord { .. } => ErrorKind::Corruption,
            Self::Io(_) => ErrorKind::Io,
            _ => ErrorKind::Format,
        }
    }

    /// Index of the record the error refers to, if any.
    pub fn record_index(&self) -> Option<usize> {
        match self {
            Self::PartialRecord { record, .. }
            | Self::SampleCountMismatch { record, .. }
            | Self::BadRecordMarker { record, .. }
            | Self::InvalidSpikeRecord { record, .. } => Some(*record),
            _ => None,
        }
    }

    pub fn is_corruption(&self) -> bool {
        self.kind() == ErrorKind::Corruption
    }
}

pub type Result<T> = std::result::Result<T, OeError>;
