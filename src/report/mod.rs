//! Reporting collaborator seam
//!
//! The harness emits lifecycle events through [`Reporter`] and knows nothing
//! about rendering. [`TracingReporter`] forwards events to the log and keeps
//! counters; a richer sink can be swapped in without touching the core.

use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::{error, info, warn};

/// Install a global tracing subscriber for harness runs
///
/// `RUST_LOG` wins when set; otherwise `default_filter` applies. Safe to
/// call from every test, only the first call installs.
pub fn init_logging(default_filter: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter));

    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// Sink for test lifecycle events
pub trait Reporter: Send + Sync {
    /// A test is about to run
    fn create_test(&self, name: &str, description: &str);

    /// Free-form progress note for a running test
    fn info(&self, name: &str, message: &str);

    /// The test passed
    fn pass(&self, name: &str);

    /// The test failed, with a diagnostic
    fn fail(&self, name: &str, diagnostic: &str);

    /// The test was skipped
    fn skip(&self, name: &str, reason: &str);
}

/// Aggregate counts a reporter has seen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportSummary {
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
}

/// Reporter that logs through `tracing` and counts outcomes
#[derive(Debug, Default)]
pub struct TracingReporter {
    passed: AtomicUsize,
    failed: AtomicUsize,
    skipped: AtomicUsize,
}

impl TracingReporter {
    /// Create a reporter with zeroed counters
    pub fn new() -> Self {
        Self::default()
    }

    /// Totals seen so far
    pub fn summary(&self) -> ReportSummary {
        ReportSummary {
            passed: self.passed.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            skipped: self.skipped.load(Ordering::Relaxed),
        }
    }
}

impl Reporter for TracingReporter {
    fn create_test(&self, name: &str, description: &str) {
        info!("TEST {} - {}", name, description);
    }

    fn info(&self, name: &str, message: &str) {
        info!("TEST {}: {}", name, message);
    }

    fn pass(&self, name: &str) {
        self.passed.fetch_add(1, Ordering::Relaxed);
        info!("PASS {}", name);
    }

    fn fail(&self, name: &str, diagnostic: &str) {
        self.failed.fetch_add(1, Ordering::Relaxed);
        error!("FAIL {}: {}", name, diagnostic);
    }

    fn skip(&self, name: &str, reason: &str) {
        self.skipped.fetch_add(1, Ordering::Relaxed);
        warn!("SKIP {}: {}", name, reason);
    }
}

/// Reporter that drops everything, for tests of the harness itself
#[derive(Debug, Default)]
pub struct NullReporter;

impl Reporter for NullReporter {
    fn create_test(&self, _name: &str, _description: &str) {}
    fn info(&self, _name: &str, _message: &str) {}
    fn pass(&self, _name: &str) {}
    fn fail(&self, _name: &str, _diagnostic: &str) {}
    fn skip(&self, _name: &str, _reason: &str) {}
}
