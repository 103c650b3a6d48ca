//! Decode configuration: [`DecodeOptions`], [`UnitMode`] and [`Precision`].

use crate::policy::CorruptionPolicy;

/// Floating-point width of physical-unit output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Precision {
    F32,
    #[default]
    F64,
}

/// Whether samples are scaled to physical units or kept as stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitMode {
    /// Keep the stored integers (`i16` continuous, `u16` spike waveforms).
    Raw,
    /// Scale by the stream's bit-to-volt factor or gain.
    Physical(Precision),
}

impl Default for UnitMode {
    fn default() -> Self {
        Self::Physical(Precision::F64)
    }
}

/// Options for decoding a record stream.
///
/// Defaults: physical units in `f64`, strict corruption policy, no marker
/// verification, per-record spike shapes trusted over the header, no
/// progress reports.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DecodeOptions {
    pub units: UnitMode,
    pub policy: CorruptionPolicy,
    /// Check the 10-byte marker that ends every continuous record.
    pub verify_marker: bool,
    /// Reject spike records whose channel/sample counts disagree with the
    /// header's `num_channels` and the nominal 40 samples per spike.
    pub require_header_shape: bool,
    /// Report progress every this many records. `0` disables reports.
    pub progress_interval: usize,
}

impl DecodeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the unit mode.
    pub fn with_units(mut self, units: UnitMode) -> Self {
        self.units = units;
        self
    }

    /// Set the corruption policy.
    pub fn with_policy(mut self, policy: CorruptionPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_marker_check(mut self, verify: bool) -> Self {
        self.verify_marker = verify;
        self
    }

    pub fn with_header_shape_check(mut self, require: bool) -> Self {
        self.require_header_shape = require;
        self
    }

    /// Report progress every `interval` records.
    pub fn with_progress_interval(mut self, interval: usize) -> Self {
        self.progress_interval = interval;
        self
    }
}
