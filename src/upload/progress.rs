use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

pub type ProgressCallback = Box<dyn Fn(u8) + Send + Sync>;

/// Integer percentage of `sent` over `total`, floored and capped at 100.
pub fn percent_of(sent: u64, total: u64) -> u8 {
    if total == 0 {
        return 100;
    }
    let percent = (u128::from(sent) * 100) / u128::from(total);
    percent.min(100) as u8
}

/// Counts body bytes handed to the network layer and reports the
/// percentage whenever it grows.
pub struct ProgressTracker {
    total: u64,
    sent: AtomicU64,
    last_reported: Mutex<Option<u8>>,
    callback: ProgressCallback,
}

impl ProgressTracker {
    pub fn new(total: u64, callback: ProgressCallback) -> Self {
        Self {
            total,
            sent: AtomicU64::new(0),
            last_reported: Mutex::new(None),
            callback,
        }
    }

    pub fn advance(&self, bytes: u64) {
        let sent = self.sent.fetch_add(bytes, Ordering::SeqCst) + bytes;
        self.report(percent_of(sent, self.total));
    }

    /// The whole body is out; anything below 100 is bumped to 100.
    pub fn finish(&self) {
        self.report(100);
    }

    fn report(&self, percent: u8) {
        let Ok(mut last) = self.last_reported.lock() else {
            return;
        };
        if last.map_or(true, |previous| percent > previous) {
            *last = Some(percent);
            (self.callback)(percent);
        }
    }
}
