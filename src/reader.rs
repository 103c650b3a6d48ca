//! Iterator-based reader over the records of one stream.
//!
//! Use [`RecordReader`] to walk records lazily without accumulating them
//! into column arrays. [`crate::decode`] builds its column outputs on top of
//! it.

use crate::codec::{RecordCodec, RecordPos};
use crate::header::{HEADER_SIZE, Header, parse_header};
use crate::options::DecodeOptions;
use crate::{OeError, Result};

/// Iterator over the records of a stream in a byte slice.
///
/// Each call to `next()` decodes the next record and advances past it. A
/// corrupt record is reported as an error and stepped over, since its size
/// is already known. Any other error ends the iteration.
///
/// # Example
///
/// ```
/// use openephys_rs::codec::EventCodec;
/// use openephys_rs::encode::encode_events;
/// use openephys_rs::{DecodeOptions, EventRecord, Header, RecordReader};
///
/// let header = Header::new().with_field(" version", "0.4");
/// let events = [EventRecord { timestamp: 10, ..Default::default() }; 2];
/// let data = encode_events(&header, &events).unwrap();
///
/// let reader = RecordReader::<EventCodec>::new(&data, &DecodeOptions::default()).unwrap();
/// let records: Vec<_> = reader.collect::<Result<Vec<_>, _>>().unwrap();
/// assert_eq!(records.len(), 2);
/// assert_eq!(records[1].1.timestamp, 10);
/// ```
pub struct RecordReader<'a, C: RecordCodec> {
    data: &'a [u8],
    header: Header,
    codec: C,
    offset: usize,
    index: usize,
}

impl<'a, C: RecordCodec> RecordReader<'a, C> {
    /// Parse the header of `data` and configure the codec from it.
    pub fn new(data: &'a [u8], options: &DecodeOptions) -> Result<Self> {
        let header = parse_header(data)?;
        let codec = C::from_header(&header, options)?;
        Ok(Self {
            data,
            header,
            codec,
            offset: HEADER_SIZE,
            index: 0,
        })
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    pub fn codec(&self) -> &C {
        &self.codec
    }

    /// Byte offset of the next record.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Index of the next record.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Split into the parsed header and the configured codec.
    pub fn into_parts(self) -> (Header, C) {
        (self.header, self.codec)
    }

    fn stop(&mut self, err: OeError) -> Option<Result<(RecordPos, C::Record)>> {
        // Move offset to end to stop iteration
        self.offset = self.data.len();
        Some(Err(err))
    }
}

impl<C: RecordCodec> Iterator for RecordReader<'_, C> {
    type Item = Result<(RecordPos, C::Record)>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.offset >= self.data.len() {
            return None;
        }

        let remaining = &self.data[self.offset..];
        let pos = RecordPos {
            index: self.index,
            offset: self.offset,
        };

        let record_size = match self.codec.record_size(remaining, pos) {
            Ok(len) => len,
            Err(e) => return self.stop(e),
        };

        if remaining.len() < record_size {
            return self.stop(OeError::PartialRecord {
                record: pos.index,
                offset: pos.offset,
                needed: record_size,
                available: remaining.len(),
            });
        }

        let result = self.codec.decode_one(&remaining[..record_size], pos);
        match result {
            Ok(record) => {
                self.offset += record_size;
                self.index += 1;
                Some(Ok((pos, record)))
            }
            Err(e) if e.is_corruption() => {
                self.offset += record_size;
                self.index += 1;
                Some(Err(e))
            }
            Err(e) => self.stop(e),
        }
    }
}
