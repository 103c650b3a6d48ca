//! `structure.oebin` sidecar metadata of binary-format recordings.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::Result;
use crate::units::{ChannelInfo, ChannelMetadata};

/// Parsed `structure.oebin` file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OebinMetadata {
    #[serde(rename = "GUI version", default)]
    pub gui_version: Option<String>,
    #[serde(default)]
    pub continuous: Vec<ContinuousStreamInfo>,
    /// Event stream descriptions, kept as raw JSON.
    #[serde(default)]
    pub events: Vec<serde_json::Value>,
    /// Spike stream descriptions, kept as raw JSON.
    #[serde(default)]
    pub spikes: Vec<serde_json::Value>,
}

impl OebinMetadata {
    pub fn from_json(text: &str) -> Result<Self> {
        let metadata: Self = serde_json::from_str(text)?;
        tracing::debug!(
            continuous = metadata.continuous.len(),
            events = metadata.events.len(),
            spikes = metadata.spikes.len(),
            "parsed sidecar metadata"
        );
        Ok(metadata)
    }

    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Continuous stream stored under `folder_name`.
    pub fn stream(&self, folder_name: &str) -> Option<&ContinuousStreamInfo> {
        self.continuous
            .iter()
            .find(|s| s.folder_name.trim_end_matches('/') == folder_name.trim_end_matches('/'))
    }
}

/// One continuous stream of a binary recording.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContinuousStreamInfo {
    /// Directory of the stream's `continuous.dat`, relative to the recording.
    #[serde(default)]
    pub folder_name: String,
    pub sample_rate: f64,
    pub num_channels: usize,
    #[serde(default)]
    pub source_processor_name: Option<String>,
    #[serde(default)]
    pub channels: Vec<ChannelInfo>,
}

impl ChannelMetadata for ContinuousStreamInfo {
    fn channel_count(&self) -> usize {
        self.channels.len()
    }

    fn channel_info(&self, index: usize) -> Option<&ChannelInfo> {
        self.channels.get(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binary::{BinaryOptions, load_binary};

    const OEBIN: &str = r#"{
        "GUI version": "0.4.6",
        "continuous": [{
            "folder_name": "Rhythm_FPGA-100.0/",
            "sample_rate": 30000.0,
            "source_processor_name": "Rhythm FPGA",
            "num_channels": 2,
            "channels": [
                {"channel_name": "CH1", "description": "Headstage data channel",
                 "identifier": "genericdata.continuous", "history": "Rhythm FPGA",
                 "bit_volts": 0.195, "units": "uV", "source_processor_index": 0},
                {"channel_name": "ADC1", "bit_volts": 0.00015259, "units": "V"}
            ]
        }],
        "events": [{"folder_name": "Rhythm_FPGA-100.0/TTL_1/", "channel_name": "TTL"}],
        "spikes": []
    }"#;

    #[test]
    fn test_parse_oebin() {
        let meta = OebinMetadata::from_json(OEBIN).unwrap();
        assert_eq!(meta.gui_version.as_deref(), Some("0.4.6"));
        assert_eq!(meta.events.len(), 1);

        let stream = meta.stream("Rhythm_FPGA-100.0").unwrap();
        assert_eq!(stream.sample_rate, 30000.0);
        assert_eq!(stream.channel_count(), 2);
        let adc = stream.channel_info(1).unwrap();
        assert_eq!(adc.units, "V");
        assert!(adc.is_adc());
        assert!(meta.stream("missing").is_none());
    }

    #[test]
    fn test_channel_units_default() {
        let json = r#"{"continuous": [{"sample_rate": 1000, "num_channels": 1,
            "channels": [{"channel_name": "CH1", "bit_volts": 1.0}]}]}"#;
        let meta = OebinMetadata::from_json(json).unwrap();
        assert_eq!(meta.continuous[0].channels[0].units, "uV");
        assert!(meta.gui_version.is_none());
    }

    #[test]
    fn test_invalid_json_is_format_error() {
        let err = OebinMetadata::from_json("{\"continuous\": 3}").unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::Format);
    }

    #[test]
    fn test_stream_drives_binary_load() {
        let meta = OebinMetadata::from_json(OEBIN).unwrap();
        let stream = &meta.continuous[0];
        let data: Vec<u8> = [10i16, 0, -10, 1].iter().flat_map(|v| v.to_le_bytes()).collect();
        let loaded = load_binary(&data, stream, &BinaryOptions::default()).unwrap();
        assert_eq!(loaded.n_samples, 2);
        assert!((loaded.get(0, 0).unwrap() - 1.95).abs() < 1e-5);
        assert!((loaded.get(1, 1).unwrap() - 152.59).abs() < 1e-2);
    }

    #[test]
    fn test_open_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("structure.oebin");
        std::fs::write(&path, OEBIN).unwrap();
        let meta = OebinMetadata::open(&path).unwrap();
        assert_eq!(meta.continuous.len(), 1);
    }
}
