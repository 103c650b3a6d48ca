//! Decode whole Open Ephys record streams into column arrays.
//!
//! The entry points are [`decode_continuous()`], [`decode_spikes()`],
//! [`decode_events()`] and the kind-dispatching [`decode()`] / [`open()`].
//! [`StreamDecoder`] exposes the same operations with an optional progress
//! callback.

use std::io::Read;
use std::path::Path;

use crate::codec::{CONTINUOUS_RECORD_SIZE, ContinuousCodec, EventCodec, RecordCodec, RecordPos, SpikeCodec};
use crate::data::{ContinuousData, DecodedStream, EventData, SpikeData};
use crate::header::{HEADER_SIZE, Header};
use crate::options::DecodeOptions;
use crate::policy::PolicyTracker;
use crate::reader::RecordReader;
use crate::types::StreamKind;
use crate::{OeError, Result};

/// Progress of a running decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub kind: StreamKind,
    /// Records processed so far, including skipped ones.
    pub records: usize,
    /// Bytes consumed so far, including the header.
    pub bytes_consumed: usize,
    pub bytes_total: usize,
}

impl Progress {
    /// Fraction of the stream consumed, in `0.0..=1.0`.
    pub fn fraction(&self) -> f64 {
        if self.bytes_total == 0 {
            return 1.0;
        }
        self.bytes_consumed as f64 / self.bytes_total as f64
    }
}

/// Decoder for one stream held in memory.
///
/// ```
/// use openephys_rs::encode::encode_continuous;
/// use openephys_rs::decode::Progress;
/// use openephys_rs::{ContinuousRecord, DecodeOptions, Header, StreamDecoder};
///
/// let header = Header::new().with_field("bitVolts", "0.195");
/// let records: Vec<_> = (0..4).map(|i| ContinuousRecord::filled(i * 1024, 1)).collect();
/// let data = encode_continuous(&header, &records).unwrap();
///
/// let mut reports = Vec::new();
/// let mut on_progress = |p: Progress| reports.push(p);
/// let decoded = StreamDecoder::new(&data, &DecodeOptions::new().with_progress_interval(2))
///     .with_progress(&mut on_progress)
///     .decode_continuous()
///     .unwrap();
///
/// assert_eq!(decoded.num_records(), 4);
/// assert_eq!(reports.len(), 2);
/// ```
pub struct StreamDecoder<'a, 'p> {
    data: &'a [u8],
    options: DecodeOptions,
    progress: Option<&'p mut dyn FnMut(Progress)>,
    last_report: Option<usize>,
}

impl<'a, 'p> StreamDecoder<'a, 'p> {
    pub fn new(data: &'a [u8], options: &DecodeOptions) -> Self {
        Self {
            data,
            options: options.clone(),
            progress: None,
            last_report: None,
        }
    }

    /// Report progress to `progress` every
    /// [`DecodeOptions::progress_interval`] records and once at the end.
    pub fn with_progress(mut self, progress: &'p mut dyn FnMut(Progress)) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Decode a stream of the given kind.
    pub fn decode(self, kind: StreamKind) -> Result<DecodedStream> {
        Ok(match kind {
            StreamKind::Continuous => DecodedStream::Continuous(self.decode_continuous()?),
            StreamKind::Spikes => DecodedStream::Spikes(self.decode_spikes()?),
            StreamKind::Events => DecodedStream::Events(self.decode_events()?),
        })
    }

    /// Decode a `.continuous` stream. Any corrupt record aborts the decode.
    pub fn decode_continuous(mut self) -> Result<ContinuousData> {
        let mut tracker = PolicyTracker::new(StreamKind::Continuous, self.options.policy);
        let reader = RecordReader::<ContinuousCodec>::new(self.data, &self.options)
            .map_err(|e| tracker.abort(e))?;
        let records = self
            .whole_records(CONTINUOUS_RECORD_SIZE)
            .map_err(|e| tracker.abort(e))?;

        // Raw mode never reads the factor.
        let bit_volts = reader.codec().bit_volts().unwrap_or(1.0);
        let mut out = ContinuousData::with_capacity(Header::new(), self.options.units, records);
        let header = self.drive(reader, &mut tracker, |record, _| {
            out.push(record, bit_volts);
            Ok(())
        })?;
        tracker.finish();

        out.header = header;
        Ok(out)
    }

    /// Decode a `.spikes` stream.
    pub fn decode_spikes(mut self) -> Result<SpikeData> {
        let mut tracker = PolicyTracker::new(StreamKind::Spikes, self.options.policy);
        let reader = RecordReader::<SpikeCodec>::new(self.data, &self.options)
            .map_err(|e| tracker.abort(e))?;

        let mut out = SpikeData::new(Header::new(), self.options.units);
        let header = self.drive(reader, &mut tracker, |record, pos| out.push(record, pos))?;

        out.header = header;
        out.skipped = tracker.finish();
        out.shrink_to_fit();
        Ok(out)
    }

    /// Decode a `.events` stream.
    pub fn decode_events(mut self) -> Result<EventData> {
        let mut tracker = PolicyTracker::new(StreamKind::Events, self.options.policy);
        let reader = RecordReader::<EventCodec>::new(self.data, &self.options)
            .map_err(|e| tracker.abort(e))?;

        let capacity = reader
            .codec()
            .fixed_record_size()
            .map_or(0, |size| (self.data.len() - HEADER_SIZE) / size);
        let mut out = EventData::with_capacity(Header::new(), capacity);
        let header = self.drive(reader, &mut tracker, |record, _| {
            out.push(record);
            Ok(())
        })?;

        out.header = header;
        out.skipped = tracker.finish();
        out.shrink_to_fit();
        Ok(out)
    }

    /// Number of whole fixed-size records after the header.
    fn whole_records(&self, record_size: usize) -> Result<usize> {
        let body = self.data.len() - HEADER_SIZE;
        let remainder = body % record_size;
        if remainder != 0 {
            return Err(OeError::TruncatedStream {
                offset: self.data.len() - remainder,
                record_size,
                remainder,
            });
        }
        Ok(body / record_size)
    }

    /// Run `reader` to the end, handing every record to `push` and every
    /// error to `tracker`.
    fn drive<C, F>(
        &mut self,
        mut reader: RecordReader<'a, C>,
        tracker: &mut PolicyTracker,
        mut push: F,
    ) -> Result<Header>
    where
        C: RecordCodec,
        F: FnMut(C::Record, RecordPos) -> Result<()>,
    {
        tracing::debug!(kind = %C::KIND, bytes = self.data.len(), "decoding stream");

        while let Some(item) = reader.next() {
            if let Err(err) = item.and_then(|(pos, record)| push(record, pos)) {
                let index = err.record_index().unwrap_or(reader.index());
                tracker.check(index, err)?;
            }

            let interval = self.options.progress_interval;
            if interval > 0 && reader.index() % interval == 0 {
                self.report(C::KIND, reader.index(), reader.offset());
            }
        }
        self.report(C::KIND, reader.index(), reader.offset());

        tracing::debug!(
            kind = %C::KIND,
            records = reader.index(),
            skipped = tracker.skipped().len(),
            "decoded stream"
        );
        Ok(reader.into_parts().0)
    }

    fn report(&mut self, kind: StreamKind, records: usize, bytes_consumed: usize) {
        if self.last_report == Some(records) {
            return;
        }
        if let Some(progress) = self.progress.as_deref_mut() {
            self.last_report = Some(records);
            progress(Progress {
                kind,
                records,
                bytes_consumed,
                bytes_total: self.data.len(),
            });
        }
    }
}

/// Decode a `.continuous` stream held in memory.
pub fn decode_continuous(data: &[u8], options: &DecodeOptions) -> Result<ContinuousData> {
    StreamDecoder::new(data, options).decode_continuous()
}

/// Decode a `.spikes` stream held in memory.
pub fn decode_spikes(data: &[u8], options: &DecodeOptions) -> Result<SpikeData> {
    StreamDecoder::new(data, options).decode_spikes()
}

/// Decode a `.events` stream held in memory.
pub fn decode_events(data: &[u8], options: &DecodeOptions) -> Result<EventData> {
    StreamDecoder::new(data, options).decode_events()
}

/// Decode a stream of the given kind held in memory.
pub fn decode(data: &[u8], kind: StreamKind, options: &DecodeOptions) -> Result<DecodedStream> {
    StreamDecoder::new(data, options).decode(kind)
}

/// Read `source` to the end and decode it as a stream of the given kind.
pub fn read_stream<R: Read>(
    mut source: R,
    kind: StreamKind,
    options: &DecodeOptions,
) -> Result<DecodedStream> {
    let mut data = Vec::new();
    source.read_to_end(&mut data)?;
    decode(&data, kind, options)
}

/// Read and decode the file at `path`, picking the stream kind from its name.
pub fn open(path: impl AsRef<Path>, options: &DecodeOptions) -> Result<DecodedStream> {
    let path = path.as_ref();
    let kind = StreamKind::from_path(path)?;
    let data = std::fs::read(path)?;
    decode(&data, kind, options)
}
