//! Flat binary-format recordings (`continuous.dat`).
//!
//! A binary recording is a headerless run of little-endian `i16` samples,
//! interleaved `[sample][channel]`. Per-channel scaling comes from separate
//! metadata, usually a [`crate::sidecar::OebinMetadata`] stream.

use crate::record::Samples;
use crate::units::{BinaryUnit, ChannelInfo, ChannelMetadata, channel_factor};
use crate::{OeError, Result};

/// Split interleaved little-endian `i16` samples.
///
/// The result stays row-major: sample `s` of channel `c` is at
/// `s * n_channels + c`.
pub fn decode_interleaved(data: &[u8], n_channels: usize) -> Result<Vec<i16>> {
    if n_channels == 0 || data.len() % (2 * n_channels) != 0 {
        return Err(OeError::ChannelCountMismatch {
            len: data.len(),
            n_channels,
        });
    }
    Ok(data
        .chunks_exact(2)
        .map(|b| i16::from_le_bytes([b[0], b[1]]))
        .collect())
}

/// Signal subtracted from every output channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Reference {
    #[default]
    None,
    /// One recorded channel, by its index in the file.
    Channel(usize),
    /// Mean of the selected channels at each sample.
    Average,
}

/// Options for [`load_binary`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BinaryOptions {
    /// Channels to keep, in output order. Empty keeps all of them.
    pub channel_map: Vec<usize>,
    pub reference: Reference,
    pub unit: BinaryUnit,
}

impl BinaryOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_channel_map(mut self, channel_map: Vec<usize>) -> Self {
        self.channel_map = channel_map;
        self
    }

    pub fn with_reference(mut self, reference: Reference) -> Self {
        self.reference = reference;
        self
    }

    pub fn with_unit(mut self, unit: BinaryUnit) -> Self {
        self.unit = unit;
        self
    }
}

/// Loaded binary recording.
#[derive(Debug, Clone, PartialEq)]
pub struct BinaryData {
    pub n_samples: usize,
    pub n_channels: usize,
    /// Names of the output channels, in output order.
    pub channel_names: Vec<String>,
    /// Row-major `[sample][channel]`: [`Samples::Int`] for
    /// [`BinaryUnit::Bits`], [`Samples::Float`] otherwise.
    pub values: Samples,
}

impl BinaryData {
    /// Value of `channel` at `sample`, widened to `f64`.
    pub fn get(&self, sample: usize, channel: usize) -> Option<f64> {
        if sample >= self.n_samples || channel >= self.n_channels {
            return None;
        }
        self.values.get_f64(sample * self.n_channels + channel)
    }
}

/// Decode a binary recording, select and reference its channels, and
/// convert to the requested unit.
///
/// ```
/// use openephys_rs::binary::{BinaryOptions, Reference, load_binary};
/// use openephys_rs::units::ChannelInfo;
///
/// let channels = vec![ChannelInfo::new("CH1", 0.5), ChannelInfo::new("CH2", 0.5)];
/// let data: Vec<u8> = [10i16, 4, 20, 8].iter().flat_map(|v| v.to_le_bytes()).collect();
///
/// let opts = BinaryOptions::new()
///     .with_channel_map(vec![0])
///     .with_reference(Reference::Channel(1));
/// let loaded = load_binary(&data, &channels, &opts).unwrap();
/// assert_eq!(loaded.n_channels, 1);
/// assert_eq!(loaded.get(1, 0), Some(6.0));
/// ```
pub fn load_binary(
    data: &[u8],
    metadata: &dyn ChannelMetadata,
    options: &BinaryOptions,
) -> Result<BinaryData> {
    let n_total = metadata.channel_count();
    let raw = decode_interleaved(data, n_total)?;
    let n_samples = raw.len() / n_total;

    let selected: Vec<usize> = if options.channel_map.is_empty() {
        (0..n_total).collect()
    } else {
        options.channel_map.clone()
    };
    let infos = selected
        .iter()
        .map(|&c| channel(metadata, c))
        .collect::<Result<Vec<_>>>()?;
    let reference = match options.reference {
        Reference::Channel(c) => Some((c, channel(metadata, c)?)),
        _ => None,
    };

    tracing::debug!(
        n_samples,
        n_total,
        n_selected = selected.len(),
        unit = ?options.unit,
        "loading binary recording"
    );

    let rows = raw.chunks_exact(n_total);
    let values = match options.unit {
        BinaryUnit::Bits => {
            let mut out = Vec::with_capacity(n_samples * selected.len());
            for row in rows {
                let r = match options.reference {
                    Reference::None => 0,
                    Reference::Channel(c) => row[c],
                    Reference::Average => mean_counts(row, &selected),
                };
                out.extend(selected.iter().map(|&c| row[c].saturating_sub(r)));
            }
            Samples::Int(out)
        }
        unit => {
            let factors: Vec<f64> = infos
                .iter()
                .map(|info| channel_factor(info, unit).unwrap_or(info.bit_volts))
                .collect();
            let ref_factor = reference.and_then(|(c, info)| Some((c, channel_factor(info, unit)?)));

            let mut out = Vec::with_capacity(n_samples * selected.len());
            let mut scaled = vec![0.0; selected.len()];
            for row in rows {
                for ((v, &c), f) in scaled.iter_mut().zip(&selected).zip(&factors) {
                    *v = row[c] as f64 * f;
                }
                let r = match (options.reference, ref_factor) {
                    (Reference::Channel(_), Some((c, f))) => row[c] as f64 * f,
                    (Reference::Average, _) if !scaled.is_empty() => {
                        scaled.iter().sum::<f64>() / scaled.len() as f64
                    }
                    _ => 0.0,
                };
                out.extend(scaled.iter().map(|&v| (v - r) as f32));
            }
            Samples::Float(out)
        }
    };

    Ok(BinaryData {
        n_samples,
        n_channels: selected.len(),
        channel_names: infos.iter().map(|info| info.name.clone()).collect(),
        values,
    })
}

fn channel(metadata: &dyn ChannelMetadata, index: usize) -> Result<&ChannelInfo> {
    metadata
        .channel_info(index)
        .ok_or_else(|| OeError::ChannelOutOfRange {
            channel: index,
            n_channels: metadata.channel_count(),
        })
}

/// Rounded mean of the selected raw counts.
fn mean_counts(row: &[i16], selected: &[usize]) -> i16 {
    if selected.is_empty() {
        return 0;
    }
    let sum: i64 = selected.iter().map(|&c| row[c] as i64).sum();
    (sum as f64 / selected.len() as f64).round() as i16
}
