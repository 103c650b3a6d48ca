//! Pure Rust decoder for Open Ephys recordings.
//!
//! Reads the legacy record formats (`.continuous`, `.spikes`, `.events`),
//! each a 1024-byte text header followed by fixed or self-sized binary
//! records, and flat binary-format `continuous.dat` files with their
//! `structure.oebin` sidecar. Output is column-oriented, in raw counts or
//! physical units.
//!
//! # Decoding a continuous stream
//!
//! ```
//! use openephys_rs::encode::encode_continuous;
//! use openephys_rs::{ContinuousRecord, DecodeOptions, Header, Samples, decode_continuous};
//!
//! // Build a two-record stream, then decode it back
//! let header = Header::new()
//!     .with_field("bitVolts", "0.195")
//!     .with_field("sampleRate", "30000");
//! let records = [
//!     ContinuousRecord::filled(0, 10),
//!     ContinuousRecord::filled(1024, -10),
//! ];
//! let bytes = encode_continuous(&header, &records).unwrap();
//!
//! let decoded = decode_continuous(&bytes, &DecodeOptions::default()).unwrap();
//! assert_eq!(decoded.timestamps, vec![0, 1024]);
//! assert_eq!(decoded.sample_rate(), Some(30000.0));
//! let Samples::Double(values) = &decoded.samples else { unreachable!() };
//! assert_eq!(values.len(), 2048);
//! assert!((values[0] - 1.95).abs() < 1e-12);
//! ```
//!
//! # Raw units and lenient spike decoding
//!
//! ```
//! use openephys_rs::encode::encode_spikes;
//! use openephys_rs::{CorruptionPolicy, DecodeOptions, Header, SpikeRecord, UnitMode, decode_spikes};
//!
//! let header = Header::new()
//!     .with_field(" version", "0.4")
//!     .with_field("num_channels", "1");
//! let records = [
//!     SpikeRecord::new(1, 40).with_timestamp(7),
//!     // zero channels: corrupt, skipped in lenient mode
//!     SpikeRecord::new(0, 40).with_timestamp(8),
//!     SpikeRecord::new(1, 40).with_timestamp(9),
//! ];
//! let bytes = encode_spikes(&header, &records).unwrap();
//!
//! let opts = DecodeOptions::new()
//!     .with_units(UnitMode::Raw)
//!     .with_policy(CorruptionPolicy::Lenient);
//! let spikes = decode_spikes(&bytes, &opts).unwrap();
//! assert_eq!(spikes.timestamps, vec![7, 9]);
//! assert_eq!(spikes.skipped, vec![1]);
//! assert_eq!(spikes.waveforms.shape(), (2, 1, 40));
//! ```
//!
//! # Dispatching on the file name
//!
//! ```no_run
//! use openephys_rs::{DecodeOptions, DecodedStream, open};
//!
//! match open("100_CH1.continuous", &DecodeOptions::default()).unwrap() {
//!     DecodedStream::Continuous(data) => println!("{} records", data.num_records()),
//!     other => println!("{} records of {}", other.len(), other.kind()),
//! }
//! ```

pub mod binary;
pub mod codec;
pub mod data;
pub mod decode;
pub mod encode;
pub mod error;
pub mod fields;
pub mod header;
pub mod options;
pub mod policy;
pub mod reader;
pub mod record;
pub mod sidecar;
pub mod types;
pub mod units;

pub use binary::{BinaryData, BinaryOptions, Reference, load_binary};
pub use data::{ContinuousData, DecodedStream, EventData, SpikeData, WaveformTensor};
pub use error::{ErrorKind, OeError, Result};
pub use header::{HEADER_SIZE, Header, parse_header};
pub use options::{DecodeOptions, Precision, UnitMode};
pub use policy::{CorruptionPolicy, DecodeState};
pub use reader::RecordReader;
pub use record::{ContinuousRecord, EventRecord, Samples, SpikeRecord};
pub use sidecar::{ContinuousStreamInfo, OebinMetadata};
pub use types::{ByteOrder, StreamKind};
pub use units::{BinaryUnit, ChannelInfo, ChannelMetadata};

pub use decode::{
    StreamDecoder, decode, decode_continuous, decode_events, decode_spikes, open, read_stream,
};
