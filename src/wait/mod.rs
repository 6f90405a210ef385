//! Predicate-driven synchronization
//!
//! Every read and write against the live browser goes through a wait: the UI
//! under test re-renders asynchronously, so "locate once, assume stable" is
//! not a usable model. [`WaitEngine`] polls an async predicate until it holds
//! or a deadline passes, sleeping between attempts so the driver's own I/O
//! keeps running.

use crate::{Error, Result};
use std::future::Future;
use std::time::Duration;
use tracing::{debug, trace};

/// Timeout and poll interval for a single wait call
///
/// Constructed fresh per call; has no identity beyond the call it shapes.
#[derive(Debug, Clone, Copy)]
pub struct WaitOptions {
    /// Total time to keep polling before surfacing a timeout
    pub timeout: Duration,
    /// Pause between predicate evaluations
    pub poll_interval: Duration,
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            poll_interval: Duration::from_millis(300),
        }
    }
}

impl WaitOptions {
    /// Options with a custom timeout and the default poll interval
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            timeout,
            ..Default::default()
        }
    }
}

/// Polls predicates against live browser state
///
/// A `WaitEngine` never mutates anything: the only side effect of a wait is
/// the polling itself. A predicate that errors transiently (element detached
/// mid-render, evaluation raced a navigation) is retried until the deadline;
/// only the final timeout surfaces, carrying the condition description and
/// elapsed time so the diagnostic is readable without a debugger.
#[derive(Debug, Clone)]
pub struct WaitEngine {
    options: WaitOptions,
}

impl Default for WaitEngine {
    fn default() -> Self {
        Self::new(WaitOptions::default())
    }
}

impl WaitEngine {
    /// Create a wait engine with the given default options
    pub fn new(options: WaitOptions) -> Self {
        Self { options }
    }

    /// Default options this engine polls with
    pub fn options(&self) -> WaitOptions {
        self.options
    }

    /// Poll `predicate` until it returns `Ok(true)` or the default timeout elapses
    ///
    /// `description` names the condition in the timeout diagnostic. A `false`
    /// result is never returned: callers that want "not present" as a valid
    /// outcome must ask a negative question instead (see
    /// [`crate::element::ElementHandle::is_displayed`]).
    pub async fn wait_until<F, Fut>(&self, description: &str, predicate: F) -> Result<()>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<bool>>,
    {
        self.wait_until_with(self.options, description, predicate)
            .await
    }

    /// Poll `predicate` with per-call options
    pub async fn wait_until_with<F, Fut>(
        &self,
        options: WaitOptions,
        description: &str,
        predicate: F,
    ) -> Result<()>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<bool>>,
    {
        debug!(
            "Waiting up to {:?} for: {} (poll {:?})",
            options.timeout, description, options.poll_interval
        );

        let start = tokio::time::Instant::now();
        let deadline = start + options.timeout;

        loop {
            match predicate().await {
                Ok(true) => {
                    trace!("Condition held after {:?}: {}", start.elapsed(), description);
                    return Ok(());
                }
                Ok(false) => {
                    trace!("Condition not yet true: {}", description);
                }
                Err(e) => {
                    // Transient driver errors during DOM churn are part of
                    // normal polling; retry until the deadline.
                    trace!("Predicate errored, retrying: {}", e);
                }
            }

            if tokio::time::Instant::now() >= deadline {
                break;
            }

            // Sleep rather than spin; the driver connection needs the
            // executor between polls.
            tokio::time::sleep(options.poll_interval).await;
        }

        // One final evaluation after the deadline so a condition that became
        // true during the last sleep is not reported as a timeout.
        if let Ok(true) = predicate().await {
            return Ok(());
        }

        Err(Error::wait_timeout(description, start.elapsed()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;
    use tokio_test::assert_ok;

    fn fast_engine() -> WaitEngine {
        WaitEngine::new(WaitOptions {
            timeout: Duration::from_millis(200),
            poll_interval: Duration::from_millis(10),
        })
    }

    #[tokio::test]
    async fn test_immediate_success() {
        let engine = fast_engine();
        tokio_test::assert_ok!(engine.wait_until("always true", || async { Ok(true) }).await);
    }

    #[tokio::test]
    async fn test_eventual_success() {
        let engine = fast_engine();
        let attempts = Arc::new(AtomicU32::new(0));

        let attempts_clone = attempts.clone();
        engine
            .wait_until("true on third poll", move || {
                let attempts = attempts_clone.clone();
                async move { Ok(attempts.fetch_add(1, Ordering::SeqCst) >= 2) }
            })
            .await
            .unwrap();

        assert!(attempts.load(Ordering::SeqCst) >= 3);
    }

    #[tokio::test]
    async fn test_timeout_not_before_deadline() {
        let engine = WaitEngine::new(WaitOptions {
            timeout: Duration::from_millis(100),
            poll_interval: Duration::from_millis(10),
        });

        let start = std::time::Instant::now();
        let err = engine
            .wait_until("never true", || async { Ok(false) })
            .await
            .unwrap_err();

        // Never earlier than the configured timeout
        assert!(start.elapsed() >= Duration::from_millis(100));
        assert!(err.is_wait_timeout());
    }

    #[tokio::test]
    async fn test_timeout_diagnostic_contents() {
        let engine = fast_engine();
        let err = engine
            .wait_until("login banner visible", || async { Ok(false) })
            .await
            .unwrap_err();

        match err {
            Error::WaitTimeout { condition, elapsed_ms } => {
                assert_eq!(condition, "login banner visible");
                assert!(elapsed_ms >= 200);
            }
            other => panic!("expected WaitTimeout, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_transient_errors_retried() {
        let engine = fast_engine();
        let attempts = Arc::new(AtomicU32::new(0));

        let attempts_clone = attempts.clone();
        engine
            .wait_until("errors then true", move || {
                let attempts = attempts_clone.clone();
                async move {
                    if attempts.fetch_add(1, Ordering::SeqCst) < 3 {
                        Err(Error::interaction("node detached during re-render"))
                    } else {
                        Ok(true)
                    }
                }
            })
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_persistent_error_surfaces_as_timeout() {
        let engine = fast_engine();
        let err = engine
            .wait_until("always erroring", || async {
                Err::<bool, _>(Error::cdp("evaluation raced navigation"))
            })
            .await
            .unwrap_err();

        // The error taxonomy of polling is collapsed into the timeout
        assert!(err.is_wait_timeout());
    }

    #[tokio::test]
    async fn test_per_call_override() {
        let engine = WaitEngine::default();
        let start = std::time::Instant::now();

        let err = engine
            .wait_until_with(
                WaitOptions {
                    timeout: Duration::from_millis(50),
                    poll_interval: Duration::from_millis(10),
                },
                "never true, short deadline",
                || async { Ok(false) },
            )
            .await
            .unwrap_err();

        assert!(err.is_wait_timeout());
        // The 10s engine default must not apply
        assert!(start.elapsed() < Duration::from_secs(2));
    }
}
