//! Upload progress reporting

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Bytes of image payload handed to the transport so far
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct UploadProgress {
    /// Bytes sent
    pub sent: u64,
    /// Bytes in all file parts together
    pub total: u64,
}

impl UploadProgress {
    /// Whole-number percentage, rounded; an empty body counts as complete
    #[must_use]
    pub fn percent(&self) -> u8 {
        if self.total == 0 {
            return 100;
        }
        let pct = (self.sent.min(self.total) as f64 / self.total as f64 * 100.0).round();
        pct as u8
    }

    /// Whether every byte has been sent
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.sent >= self.total
    }
}

/// Callback invoked as the request body streams
pub type ProgressCallback = Arc<dyn Fn(UploadProgress) + Send + Sync>;

/// Shared byte counter for one upload request
#[derive(Clone)]
pub(crate) struct ProgressTracker {
    sent: Arc<AtomicU64>,
    total: u64,
    callback: ProgressCallback,
}

impl ProgressTracker {
    pub(crate) fn new(total: u64, callback: ProgressCallback) -> Self {
        Self {
            sent: Arc::new(AtomicU64::new(0)),
            total,
            callback,
        }
    }

    /// Count `bytes` more as sent and notify
    pub(crate) fn advance(&self, bytes: u64) {
        let sent = self.sent.fetch_add(bytes, Ordering::Relaxed) + bytes;
        (self.callback)(UploadProgress {
            sent,
            total: self.total,
        });
    }

    pub(crate) fn snapshot(&self) -> UploadProgress {
        UploadProgress {
            sent: self.sent.load(Ordering::Relaxed),
            total: self.total,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn test_percent() {
        assert_eq!(UploadProgress { sent: 0, total: 200 }.percent(), 0);
        assert_eq!(UploadProgress { sent: 1, total: 3 }.percent(), 33);
        assert_eq!(UploadProgress { sent: 2, total: 3 }.percent(), 67);
        assert_eq!(UploadProgress { sent: 200, total: 200 }.percent(), 100);
        assert_eq!(UploadProgress { sent: 0, total: 0 }.percent(), 100);
    }

    #[test]
    fn test_tracker_accumulates() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let tracker = ProgressTracker::new(
            100,
            Arc::new(move |p: UploadProgress| sink.lock().unwrap().push(p.sent)),
        );

        tracker.advance(40);
        tracker.clone().advance(60);

        assert_eq!(*seen.lock().unwrap(), [40, 100]);
        assert!(tracker.snapshot().is_complete());
    }
}
