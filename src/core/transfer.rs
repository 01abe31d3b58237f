//! Transfer data model

use crate::error::VgetError;
use std::path::PathBuf;

/// One URL-to-file transfer request.
///
/// Immutable once the transfer starts; `expected_size` is only a hint and
/// is confirmed or overwritten by the engine's server probe.
#[derive(Debug, Clone)]
pub struct TransferTarget {
    /// Resolved byte-stream URL
    pub url: String,
    /// Destination file on disk
    pub local_path: PathBuf,
    /// Size hint from the resolver, if any
    pub expected_size: Option<u64>,
}

impl TransferTarget {
    /// Create a new transfer target
    pub fn new(url: impl Into<String>, local_path: impl Into<PathBuf>) -> Self {
        Self {
            url: url.into(),
            local_path: local_path.into(),
            expected_size: None,
        }
    }

    /// Attach a size hint
    pub fn with_expected_size(mut self, size: Option<u64>) -> Self {
        self.expected_size = size;
        self
    }
}

/// Snapshot of local and remote state at the start of an attempt.
///
/// Derived, consumed, then discarded; the bytes already written to
/// `local_path` are the only state that survives a process run.
#[derive(Debug, Clone, Copy)]
pub struct TransferState {
    /// Bytes already present in the local file
    pub bytes_on_disk: u64,
    /// Authoritative total size reported by the server (0 when unknown)
    pub total_size: u64,
    /// Whether the attempt starts from a non-zero offset
    pub resumable: bool,
}

impl TransferState {
    /// The no-op fast path: everything is already on disk.
    pub fn is_complete(&self) -> bool {
        self.total_size > 0 && self.bytes_on_disk >= self.total_size
    }

    /// Bytes still missing from the local file
    pub fn remaining(&self) -> u64 {
        self.total_size.saturating_sub(self.bytes_on_disk)
    }
}

/// Terminal result of one download engine invocation
#[derive(Debug)]
pub enum DownloadOutcome {
    /// Transfer finished and the on-disk size matches the server total
    Completed { path: PathBuf, bytes: u64 },
    /// The local file already covered the full size; nothing was transferred
    AlreadyComplete { path: PathBuf, bytes: u64 },
    /// Transfer finished but the on-disk size disagrees with the server
    /// total; the file is retained for inspection or resume
    SizeMismatch { expected: u64, actual: u64 },
    /// A network-layer fault ended the transfer; partial bytes are retained
    TransferFailed(VgetError),
    /// Cancellation was observed; partial bytes are retained
    Interrupted,
}

impl DownloadOutcome {
    /// Whether the target file is fully present after this invocation
    pub fn is_success(&self) -> bool {
        matches!(
            self,
            DownloadOutcome::Completed { .. } | DownloadOutcome::AlreadyComplete { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_complete_requires_known_total() {
        let state = TransferState {
            bytes_on_disk: 0,
            total_size: 0,
            resumable: false,
        };
        assert!(!state.is_complete());

        let state = TransferState {
            bytes_on_disk: 1000,
            total_size: 1000,
            resumable: true,
        };
        assert!(state.is_complete());
    }

    #[test]
    fn test_state_overlong_partial_counts_as_complete() {
        let state = TransferState {
            bytes_on_disk: 1200,
            total_size: 1000,
            resumable: true,
        };
        assert!(state.is_complete());
        assert_eq!(state.remaining(), 0);
    }

    #[test]
    fn test_state_remaining() {
        let state = TransferState {
            bytes_on_disk: 400,
            total_size: 1000,
            resumable: true,
        };
        assert_eq!(state.remaining(), 600);
        assert!(!state.is_complete());
    }

    #[test]
    fn test_outcome_success() {
        let completed = DownloadOutcome::Completed {
            path: PathBuf::from("a.mp4"),
            bytes: 10,
        };
        assert!(completed.is_success());
        assert!(!DownloadOutcome::Interrupted.is_success());
        assert!(!DownloadOutcome::SizeMismatch {
            expected: 1000,
            actual: 900
        }
        .is_success());
    }
}
