//! Global atomic counters for pipeline observability.
//!
//! Counters are incremented silently at the call site. Call
//! [`Metrics::flush`] to emit current values as a single
//! `tracing::info!` event (the orchestrator does so at the end of each run).

use std::sync::atomic::{AtomicU64, Ordering};

/// Global metrics singleton.
pub static METRICS: Metrics = Metrics::new();

/// Lightweight atomic counters.
pub struct Metrics {
    runs_started: AtomicU64,
    runs_succeeded: AtomicU64,
    runs_exhausted: AtomicU64,
    runs_failed: AtomicU64,
    stage_calls: AtomicU64,
    critiques_rejected: AtomicU64,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    pub const fn new() -> Self {
        Self {
            runs_started: AtomicU64::new(0),
            runs_succeeded: AtomicU64::new(0),
            runs_exhausted: AtomicU64::new(0),
            runs_failed: AtomicU64::new(0),
            stage_calls: AtomicU64::new(0),
            critiques_rejected: AtomicU64::new(0),
        }
    }

    pub fn inc_runs_started(&self) {
        self.runs_started.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "runs_started", "counter incremented");
    }

    pub fn inc_runs_succeeded(&self) {
        self.runs_succeeded.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "runs_succeeded", "counter incremented");
    }

    pub fn inc_runs_exhausted(&self) {
        self.runs_exhausted.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "runs_exhausted", "counter incremented");
    }

    pub fn inc_runs_failed(&self) {
        self.runs_failed.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "runs_failed", "counter incremented");
    }

    pub fn inc_stage_calls(&self) {
        self.stage_calls.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_critiques_rejected(&self) {
        self.critiques_rejected.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "critiques_rejected", "counter incremented");
    }

    /// Emit all current counter values as a single `info!` event.
    pub fn flush(&self) {
        tracing::info!(
            metric = "flush",
            runs_started = self.runs_started(),
            runs_succeeded = self.runs_succeeded(),
            runs_exhausted = self.runs_exhausted(),
            runs_failed = self.runs_failed(),
            stage_calls = self.stage_calls(),
            critiques_rejected = self.critiques_rejected(),
        );
    }

    pub fn runs_started(&self) -> u64 {
        self.runs_started.load(Ordering::Relaxed)
    }

    pub fn runs_succeeded(&self) -> u64 {
        self.runs_succeeded.load(Ordering::Relaxed)
    }

    pub fn runs_exhausted(&self) -> u64 {
        self.runs_exhausted.load(Ordering::Relaxed)
    }

    pub fn runs_failed(&self) -> u64 {
        self.runs_failed.load(Ordering::Relaxed)
    }

    pub fn stage_calls(&self) -> u64 {
        self.stage_calls.load(Ordering::Relaxed)
    }

    pub fn critiques_rejected(&self) -> u64 {
        self.critiques_rejected.load(Ordering::Relaxed)
    }

    /// Reset all counters to zero (useful in tests).
    pub fn reset(&self) {
        self.runs_started.store(0, Ordering::Relaxed);
        self.runs_succeeded.store(0, Ordering::Relaxed);
        self.runs_exhausted.store(0, Ordering::Relaxed);
        self.runs_failed.store(0, Ordering::Relaxed);
        self.stage_calls.store(0, Ordering::Relaxed);
        self.critiques_rejected.store(0, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_increment() {
        let m = Metrics::new();
        m.inc_runs_started();
        m.inc_runs_started();
        assert_eq!(m.runs_started(), 2);

        m.inc_stage_calls();
        m.inc_critiques_rejected();
        m.inc_runs_exhausted();
        assert_eq!(m.stage_calls(), 1);
        assert_eq!(m.critiques_rejected(), 1);
        assert_eq!(m.runs_exhausted(), 1);
        assert_eq!(m.runs_failed(), 0);
    }

    #[test]
    fn reset_zeroes_everything() {
        let m = Metrics::new();
        m.inc_runs_succeeded();
        m.inc_runs_failed();
        m.reset();
        assert_eq!(m.runs_succeeded(), 0);
        assert_eq!(m.runs_failed(), 0);
    }

    #[test]
    fn flush_does_not_panic() {
        let m = Metrics::new();
        m.inc_stage_calls();
        m.flush();
    }
}
