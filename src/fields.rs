//! Ordered, bounds-checked field reads over a record window.
//!
//! Spike records cannot be overlaid with a fixed struct: the waveform, gain
//! and threshold blocks are sized by counts read earlier in the same record.
//! [`FieldReader`] walks a record front to back and reports a
//! [`OeError::PartialRecord`] as soon as a field runs past the window.

use crate::types::ByteOrder;
use crate::{OeError, Result};

/// Sequential reader over one record's bytes.
pub struct FieldReader<'a> {
    data: &'a [u8],
    pos: usize,
    record: usize,
    base_offset: usize,
}

impl<'a> FieldReader<'a> {
    /// Create a reader for record `record` starting at stream offset `base_offset`.
    pub fn new(data: &'a [u8], record: usize, base_offset: usize) -> Self {
        Self {
            data,
            pos: 0,
            record,
            base_offset,
        }
    }

    /// Bytes consumed so far.
    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    /// Take the next `n` bytes.
    pub fn take(&mut self, n: usize) -> Result<&'a [u8]> {
        if self.remaining() < n {
            return Err(OeError::PartialRecord {
                record: self.record,
                offset: self.base_offset,
                needed: self.pos + n,
                available: self.data.len(),
            });
        }
        let bytes = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(bytes)
    }

    fn array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let bytes = self.take(N)?;
        let mut out = [0u8; N];
        out.copy_from_slice(bytes);
        Ok(out)
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.take(1)?[0])
    }

    pub fn read_u16(&mut self, byte_order: ByteOrder) -> Result<u16> {
        let bytes = self.array::<2>()?;
        Ok(match byte_order {
            ByteOrder::Big => u16::from_be_bytes(bytes),
            ByteOrder::Little => u16::from_le_bytes(bytes),
        })
    }

    pub fn read_i16(&mut self, byte_order: ByteOrder) -> Result<i16> {
        let bytes = self.array::<2>()?;
        Ok(match byte_order {
            ByteOrder::Big => i16::from_be_bytes(bytes),
            ByteOrder::Little => i16::from_le_bytes(bytes),
        })
    }

    pub fn read_i64(&mut self, byte_order: ByteOrder) -> Result<i64> {
        let bytes = self.array::<8>()?;
        Ok(match byte_order {
            ByteOrder::Big => i64::from_be_bytes(bytes),
            ByteOrder::Little => i64::from_le_bytes(bytes),
        })
    }

    pub fn read_f32(&mut self, byte_order: ByteOrder) -> Result<f32> {
        let bytes = self.array::<4>()?;
        Ok(match byte_order {
            ByteOrder::Big => f32::from_be_bytes(bytes),
            ByteOrder::Little => f32::from_le_bytes(bytes),
        })
    }

    pub fn read_bytes<const N: usize>(&mut self) -> Result<[u8; N]> {
        self.array::<N>()
    }

    /// Read `count` consecutive `u16` values into `out`.
    pub fn read_u16_into(
        &mut self,
        count: usize,
        byte_order: ByteOrder,
        out: &mut Vec<u16>,
    ) -> Result<()> {
        let bytes = self.take(count * 2)?;
        out.extend(bytes.chunks_exact(2).map(|c| match byte_order {
            ByteOrder::Big => u16::from_be_bytes([c[0], c[1]]),
            ByteOrder::Little => u16::from_le_bytes([c[0], c[1]]),
        }));
        Ok(())
    }

    /// Read `count` consecutive `i16` values into `out`.
    pub fn read_i16_into(
        &mut self,
        count: usize,
        byte_order: ByteOrder,
        out: &mut Vec<i16>,
    ) -> Result<()> {
        let bytes = self.take(count * 2)?;
        out.extend(bytes.chunks_exact(2).map(|c| match byte_order {
            ByteOrder::Big => i16::from_be_bytes([c[0], c[1]]),
            ByteOrder::Little => i16::from_le_bytes([c[0], c[1]]),
        }));
        Ok(())
    }

    /// Read `count` consecutive `f32` values into `out`.
    pub fn read_f32_into(
        &mut self,
        count: usize,
        byte_order: ByteOrder,
        out: &mut Vec<f32>,
    ) -> Result<()> {
        let bytes = self.take(count * 4)?;
        out.extend(bytes.chunks_exact(4).map(|c| {
            let b = [c[0], c[1], c[2], c[3]];
            match byte_order {
                ByteOrder::Big => f32::from_be_bytes(b),
                ByteOrder::Little => f32::from_le_bytes(b),
            }
        }));
        Ok(())
    }
}
