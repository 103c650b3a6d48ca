//! Conversion of raw ADC counts to physical units.
//!
//! All scaling is done in `f64` and only then narrowed to the caller's
//! [`Precision`]. Raw mode leaves the stored integers untouched.

use serde::{Deserialize, Serialize};

use crate::codec::WAVEFORM_OFFSET;
use crate::options::{Precision, UnitMode};
use crate::record::Samples;

/// Spike gains are stored in units of 1/1000.
const GAIN_UNIT: f64 = 1000.0;

/// Physical amplitude of a raw spike waveform value.
pub fn spike_amplitude(raw: u16, gain: f32) -> f64 {
    (raw as f64 - WAVEFORM_OFFSET as f64) / (gain as f64 / GAIN_UNIT)
}

/// Physical value of a raw continuous sample.
pub fn continuous_value(raw: i16, bit_volts: f64) -> f64 {
    raw as f64 * bit_volts
}

/// Empty continuous sample buffer for `mode` with room for `capacity` samples.
pub(crate) fn continuous_buffer(mode: UnitMode, capacity: usize) -> Samples {
    match mode {
        UnitMode::Raw => Samples::Int(Vec::with_capacity(capacity)),
        UnitMode::Physical(Precision::F32) => Samples::Float(Vec::with_capacity(capacity)),
        UnitMode::Physical(Precision::F64) => Samples::Double(Vec::with_capacity(capacity)),
    }
}

/// Empty spike waveform buffer for `mode`.
pub(crate) fn waveform_buffer(mode: UnitMode) -> Samples {
    match mode {
        UnitMode::Raw => Samples::UInt(Vec::new()),
        UnitMode::Physical(Precision::F32) => Samples::Float(Vec::new()),
        UnitMode::Physical(Precision::F64) => Samples::Double(Vec::new()),
    }
}

/// Append raw continuous samples to `out`, scaling by `bit_volts` unless
/// `out` holds raw integers.
pub(crate) fn extend_continuous(out: &mut Samples, raw: &[i16], bit_volts: f64) {
    match out {
        Samples::Int(v) => v.extend_from_slice(raw),
        Samples::Float(v) => v.extend(raw.iter().map(|&x| continuous_value(x, bit_volts) as f32)),
        Samples::Double(v) => v.extend(raw.iter().map(|&x| continuous_value(x, bit_volts))),
        Samples::UInt(v) => v.extend(raw.iter().map(|&x| x as u16)),
    }
}

/// Append one channel-major spike waveform to `out`, scaling each channel
/// by its own gain unless `out` holds raw values.
pub(crate) fn extend_waveform(out: &mut Samples, raw: &[u16], gains: &[f32], n_samples: usize) {
    let per_channel = raw.chunks_exact(n_samples.max(1)).zip(gains.iter());
    match out {
        Samples::UInt(v) => v.extend_from_slice(raw),
        Samples::Float(v) => {
            for (chunk, &gain) in per_channel {
                v.extend(chunk.iter().map(|&x| spike_amplitude(x, gain) as f32));
            }
        }
        Samples::Double(v) => {
            for (chunk, &gain) in per_channel {
                v.extend(chunk.iter().map(|&x| spike_amplitude(x, gain)));
            }
        }
        Samples::Int(v) => v.extend(raw.iter().map(|&x| x.wrapping_sub(WAVEFORM_OFFSET) as i16)),
    }
}

/// Scale a whole raw continuous array at once.
pub fn scale_continuous(raw: &[i16], bit_volts: f64, mode: UnitMode) -> Samples {
    let mut out = continuous_buffer(mode, raw.len());
    extend_continuous(&mut out, raw, bit_volts);
    out
}

/// Per-channel metadata of a recording.
///
/// Deserializes from the channel objects of a `structure.oebin` sidecar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelInfo {
    #[serde(rename = "channel_name")]
    pub name: String,
    /// Physical units per ADC count.
    pub bit_volts: f64,
    /// Unit label as reported by the acquisition software (`"uV"`, `"V"`).
    #[serde(default = "default_units")]
    pub units: String,
}

fn default_units() -> String {
    "uV".into()
}

impl ChannelInfo {
    pub fn new(name: &str, bit_volts: f64) -> Self {
        Self {
            name: name.into(),
            bit_volts,
            units: default_units(),
        }
    }

    /// Analog (ADC) inputs are recorded in volts rather than microvolts.
    pub fn is_adc(&self) -> bool {
        self.name.contains("ADC")
    }
}

/// Lookup of per-channel metadata, keyed by channel index.
///
/// Implemented for plain slices of [`ChannelInfo`] and for sidecar-derived
/// metadata ([`crate::sidecar::ContinuousStreamInfo`]).
pub trait ChannelMetadata {
    fn channel_count(&self) -> usize;
    fn channel_info(&self, index: usize) -> Option<&ChannelInfo>;
}

impl ChannelMetadata for [ChannelInfo] {
    fn channel_count(&self) -> usize {
        self.len()
    }

    fn channel_info(&self, index: usize) -> Option<&ChannelInfo> {
        self.get(index)
    }
}

impl ChannelMetadata for Vec<ChannelInfo> {
    fn channel_count(&self) -> usize {
        self.len()
    }

    fn channel_info(&self, index: usize) -> Option<&ChannelInfo> {
        self.get(index)
    }
}

/// Target unit of binary-format conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BinaryUnit {
    #[default]
    Microvolts,
    Millivolts,
    /// Keep raw ADC counts.
    Bits,
}

impl BinaryUnit {
    fn factor(self) -> Option<f64> {
        match self {
            Self::Microvolts => Some(1.0),
            Self::Millivolts => Some(1e-3),
            Self::Bits => None,
        }
    }
}

/// Multiplier turning a raw count of `channel` into `unit`, or `None` in
/// [`BinaryUnit::Bits`] mode.
pub fn channel_factor(channel: &ChannelInfo, unit: BinaryUnit) -> Option<f64> {
    let factor = unit.factor()? * channel.bit_volts;
    Some(if channel.is_adc() { factor * 1e6 } else { factor })
}
