//! Shared types: [`StreamKind`] and [`ByteOrder`].

use std::fmt;
use std::path::Path;

use crate::{OeError, Result};

/// Kind of record stream stored in an Open Ephys file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StreamKind {
    /// `.continuous`: fixed 2070-byte sample blocks.
    Continuous,
    /// `.spikes`: variable-length spike waveform records.
    Spikes,
    /// `.events`: fixed 16-byte digital event records.
    Events,
}

impl StreamKind {
    /// Determine the stream kind from a file name or path.
    ///
    /// Matches on the extension first, then falls back to a substring match
    /// on the file name (`"100_CH1.continuous.bak"` still resolves).
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(kind) = path
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
        {
            return Ok(kind);
        }

        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default();
        [Self::Continuous, Self::Spikes, Self::Events]
            .into_iter()
            .find(|kind| name.contains(kind.extension()))
            .ok_or_else(|| OeError::UnknownStreamKind(path.display().to_string()))
    }

    fn from_extension(ext: &str) -> Option<Self> {
        match ext {
            "continuous" => Some(Self::Continuous),
            "spikes" => Some(Self::Spikes),
            "events" => Some(Self::Events),
            _ => None,
        }
    }

    /// File extension used for this stream kind, without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Continuous => "continuous",
            Self::Spikes => "spikes",
            Self::Events => "events",
        }
    }
}

impl fmt::Display for StreamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Continuous => write!(f, "continuous"),
            Self::Spikes => write!(f, "spikes"),
            Self::Events => write!(f, "events"),
        }
    }
}

/// Byte order of a multi-byte record field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteOrder {
    Big,
    Little,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_path_extension() {
        assert_eq!(
            StreamKind::from_path("data/100_CH1.continuous").unwrap(),
            StreamKind::Continuous
        );
        assert_eq!(
            StreamKind::from_path("TT1.spikes").unwrap(),
            StreamKind::Spikes
        );
        assert_eq!(
            StreamKind::from_path("all_channels.events").unwrap(),
            StreamKind::Events
        );
    }

    #[test]
    fn test_from_path_substring() {
        assert_eq!(
            StreamKind::from_path("100_CH1.continuous.bak").unwrap(),
            StreamKind::Continuous
        );
    }

    #[test]
    fn test_from_path_unknown() {
        let err = StreamKind::from_path("settings.xml").unwrap_err();
        assert!(matches!(err, OeError::UnknownStreamKind(_)));
    }
}
