//! Cooperative cancellation for long-running computations.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Polled by long loops to find out whether the caller gave up on the result.
pub trait Cancel {
    fn is_cancelled(&self) -> bool;
}

/// Never requests cancellation.
#[derive(Debug, Clone, Copy, Default)]
pub struct NeverCancel;

impl Cancel for NeverCancel {
    fn is_cancelled(&self) -> bool {
        false
    }
}

/// Shared flag that one thread sets and a worker polls.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    flag: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }
}

impl Cancel for CancellationToken {
    fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}
