//! Corruption handling for a single decode.
//!
//! A decode starts in [`DecodeState::Scanning`] and ends in either
//! [`DecodeState::Success`] or [`DecodeState::Aborted`]. Format errors always
//! abort. Corruption errors abort under [`CorruptionPolicy::Strict`]; under
//! [`CorruptionPolicy::Lenient`] they are skipped, but only for stream kinds
//! whose records can be stepped over independently (spikes and events).

use crate::types::StreamKind;
use crate::{OeError, Result};

/// What to do with a corrupt record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CorruptionPolicy {
    /// Abort on the first corrupt record.
    #[default]
    Strict,
    /// Skip corrupt spike/event records and keep decoding.
    Lenient,
}

/// State of a decode operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeState {
    Scanning,
    Success,
    /// Aborted at this record index (`None` for stream-level failures).
    Aborted { record: Option<usize> },
}

/// Outcome of handing an error to the tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Skip,
    Abort,
}

/// Tracks the state of one decode and the records it skipped.
#[derive(Debug)]
pub struct PolicyTracker {
    kind: StreamKind,
    policy: CorruptionPolicy,
    state: DecodeState,
    skipped: Vec<usize>,
}

impl PolicyTracker {
    pub fn new(kind: StreamKind, policy: CorruptionPolicy) -> Self {
        Self {
            kind,
            policy,
            state: DecodeState::Scanning,
            skipped: Vec::new(),
        }
    }

    pub fn state(&self) -> DecodeState {
        self.state
    }

    /// Whether a corrupt record of this stream kind may be skipped.
    pub fn allows_skip(&self) -> bool {
        self.policy == CorruptionPolicy::Lenient && self.kind != StreamKind::Continuous
    }

    /// Decide what to do with `err` raised while decoding record `record`.
    pub fn on_error(&mut self, record: usize, err: &OeError) -> Action {
        if self.state != DecodeState::Scanning {
            return Action::Abort;
        }
        if err.is_corruption() && self.allows_skip() {
            tracing::warn!(kind = %self.kind, record, error = %err, "skipping corrupt record");
            self.skipped.push(record);
            return Action::Skip;
        }
        self.state = DecodeState::Aborted {
            record: Some(err.record_index().unwrap_or(record)),
        };
        Action::Abort
    }

    /// Handle `err` and return it if the decode must abort.
    pub fn check(&mut self, record: usize, err: OeError) -> Result<()> {
        match self.on_error(record, &err) {
            Action::Skip => Ok(()),
            Action::Abort => Err(err),
        }
    }

    /// Mark a stream-level failure (before or between records).
    pub fn abort(&mut self, err: OeError) -> OeError {
        if self.state == DecodeState::Scanning {
            self.state = DecodeState::Aborted {
                record: err.record_index(),
            };
        }
        err
    }

    /// Finish successfully and hand back the skipped indices.
    pub fn finish(mut self) -> Vec<usize> {
        self.state = DecodeState::Success;
        self.skipped
    }

    pub fn skipped(&self) -> &[usize] {
        &self.skipped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corruption(record: usize) -> OeError {
        OeError::InvalidSpikeRecord {
            record,
            reason: "zero channels".into(),
        }
    }

    #[test]
    fn test_strict_aborts_on_corruption() {
        let mut t = PolicyTracker::new(StreamKind::Spikes, CorruptionPolicy::Strict);
        assert_eq!(t.on_error(4, &corruption(4)), Action::Abort);
        assert_eq!(t.state(), DecodeState::Aborted { record: Some(4) });
    }

    #[test]
    fn test_lenient_skips_spike_corruption() {
        let mut t = PolicyTracker::new(StreamKind::Spikes, CorruptionPolicy::Lenient);
        assert_eq!(t.on_error(1, &corruption(1)), Action::Skip);
        assert_eq!(t.on_error(3, &corruption(3)), Action::Skip);
        assert_eq!(t.state(), DecodeState::Scanning);
        assert_eq!(t.finish(), vec![1, 3]);
    }

    #[test]
    fn test_lenient_never_skips_continuous() {
        let mut t = PolicyTracker::new(StreamKind::Continuous, CorruptionPolicy::Lenient);
        assert!(!t.allows_skip());
        let err = OeError::SampleCountMismatch {
            record: 2,
            expected: 1024,
            actual: 0,
        };
        assert_eq!(t.on_error(2, &err), Action::Abort);
        assert_eq!(t.state(), DecodeState::Aborted { record: Some(2) });
    }

    #[test]
    fn test_lenient_never_skips_format_errors() {
        let mut t = PolicyTracker::new(StreamKind::Events, CorruptionPolicy::Lenient);
        let err = OeError::PartialRecord {
            record: 5,
            offset: 1104,
            needed: 16,
            available: 3,
        };
        assert!(t.check(5, err).is_err());
        assert_eq!(t.state(), DecodeState::Aborted { record: Some(5) });
    }

    #[test]
    fn test_stream_level_abort() {
        let mut t = PolicyTracker::new(StreamKind::Continuous, CorruptionPolicy::Strict);
        let err = t.abort(OeError::TruncatedStream {
            offset: 1024,
            record_size: 2070,
            remainder: 1,
        });
        assert!(matches!(err, OeError::TruncatedStream { .. }));
        assert_eq!(t.state(), DecodeState::Aborted { record: None });
    }
}
