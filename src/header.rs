//! Parse the 1024-byte text header at the start of every record stream.
//!
//! The header is a run of `header.key = value;` pairs, padded to
//! [`HEADER_SIZE`] bytes. [`parse_header()`] only splits it into raw string
//! pairs; numeric interpretation happens in the typed accessors on
//! [`Header`], which callers use as needed.

use std::collections::BTreeMap;
use std::fmt;

use crate::{OeError, Result};

/// Size of the text header in bytes.
pub const HEADER_SIZE: usize = 1024;

const FIELD_PREFIX: &str = "header.";

/// Parsed stream header: raw key/value strings.
///
/// Keys are kept verbatim. Legacy spike and event files write the version
/// key with a leading space (`" version"`), see [`Header::version`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Header {
    fields: BTreeMap<String, String>,
}

impl Header {
    /// Create an empty header.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a field.
    pub fn with_field(mut self, key: &str, value: &str) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    /// Raw value of `key`, exactly as written.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    /// Value of `key` with surrounding whitespace and single quotes removed.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key)
            .map(|v| v.trim().trim_matches('\'').trim())
    }

    /// Parse `key` as a float.
    pub fn get_f64(&self, key: &str) -> Result<f64> {
        let raw = self.require(key)?;
        parse_value(key, raw)
    }

    /// Parse `key` as an unsigned integer. Accepts integral floats (`"1024.0"`).
    pub fn get_usize(&self, key: &str) -> Result<usize> {
        let raw = self.require(key)?;
        let trimmed = raw.trim().trim_matches('\'');
        if let Ok(n) = trimmed.parse::<usize>() {
            return Ok(n);
        }
        let f: f64 = parse_value(key, raw)?;
        if f >= 0.0 && f.fract() == 0.0 {
            Ok(f as usize)
        } else {
            Err(invalid(key, raw))
        }
    }

    /// Format version, from `" version"` (legacy) or `"version"`.
    pub fn version(&self) -> Result<f64> {
        match self.get(" version") {
            Some(raw) => parse_value(" version", raw),
            None => self.get_f64("version"),
        }
    }

    /// Bit-to-volt scale factor of a continuous stream.
    pub fn bit_volts(&self) -> Result<f64> {
        self.get_f64("bitVolts")
    }

    /// Sample rate in Hz, if the header carries one.
    pub fn sample_rate(&self) -> Option<f64> {
        self.get_f64("sampleRate").ok()
    }

    /// Samples per continuous record, if the header carries one.
    pub fn block_length(&self) -> Option<Result<usize>> {
        self.get("blockLength")
            .map(|_| self.get_usize("blockLength"))
    }

    /// Channel count of a spike stream.
    pub fn num_channels(&self) -> Result<usize> {
        if self.get("num_channels").is_none() && self.get(" num_channels").is_some() {
            return self.get_usize(" num_channels");
        }
        self.get_usize("num_channels")
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterate over `(key, value)` pairs in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    fn require(&self, key: &str) -> Result<&str> {
        self.get(key)
            .ok_or_else(|| OeError::MissingHeaderKey(key.into()))
    }
}

impl fmt::Display for Header {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (key, value) in self.iter() {
            write!(f, "{FIELD_PREFIX}{key} = {value};")?;
        }
        Ok(())
    }
}

fn parse_value<T: std::str::FromStr>(key: &str, raw: &str) -> Result<T> {
    raw.trim()
        .trim_matches('\'')
        .parse()
        .map_err(|_| invalid(key, raw))
}

fn invalid(key: &str, raw: &str) -> OeError {
    OeError::InvalidHeaderValue {
        key: key.into(),
        value: raw.into(),
    }
}

/// Parse the first [`HEADER_SIZE`] bytes of `data` into a [`Header`].
///
/// Line terminators are stripped and every `header.` token removed before
/// splitting on `;`. Segments without `=`, or without the ` = ` separator,
/// are ignored. Anything after the last pair (padding) is ignored too.
pub fn parse_header(data: &[u8]) -> Result<Header> {
    if data.len() < HEADER_SIZE {
        return Err(OeError::HeaderTooShort {
            expected: HEADER_SIZE,
            actual: data.len(),
        });
    }

    let text = std::str::from_utf8(&data[..HEADER_SIZE]).map_err(|e| {
        OeError::InvalidHeaderText {
            offset: e.valid_up_to(),
        }
    })?;
    let text = text.replace(['\n', '\r'], "").replace(FIELD_PREFIX, "");

    let mut fields = BTreeMap::new();
    for segment in text.split(';') {
        if !segment.contains('=') {
            continue;
        }
        let mut parts = segment.split(" = ");
        if let (Some(key), Some(value)) = (parts.next(), parts.next()) {
            fields.insert(key.to_string(), value.to_string());
        }
    }

    tracing::debug!(fields = fields.len(), "parsed stream header");
    Ok(Header { fields })
}
