//! Cooperative cancellation for generation runs.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Shared cancellation flag. Clones observe the same flag.
#[derive(Clone, Debug, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Trip the flag. Idempotent.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }
}

/// Hands out one token per run and cancels the previous run's token when a
/// new run begins, so a superseded run stops at its next stage boundary.
#[derive(Debug, Default)]
pub struct RunSupervisor {
    current: Option<CancelToken>,
    runs: u64,
}

impl RunSupervisor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new run, superseding the current one.
    pub fn begin(&mut self) -> CancelToken {
        let token = CancelToken::new();
        if let Some(previous) = self.current.replace(token.clone()) {
            previous.cancel();
            tracing::debug!(run = self.runs, "superseded previous generation run");
        }
        self.runs += 1;
        token
    }

    /// Cancel the current run, if any.
    pub fn cancel_current(&mut self) {
        if let Some(token) = self.current.take() {
            token.cancel();
        }
    }

    /// Number of runs started so far.
    pub fn runs(&self) -> u64 {
        self.runs
    }
}
