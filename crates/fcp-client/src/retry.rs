//! Fixed backoff for resubmitting requests while no node is reachable
//!
//! The client never gives up on a transient outage. The only way out of a
//! backoff wait is the link being declared closed or a [`ShutdownSignal`]
//! being triggered.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

use crate::error::{ClientError, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackoffPolicy {
    /// Delay before resubmitting a fetch
    pub fetch_delay: Duration,

    /// Delay before resubmitting key generation and inserts
    pub request_delay: Duration,
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self {
            fetch_delay: Duration::from_secs(10),
            request_delay: Duration::from_secs(5),
        }
    }
}

impl BackoffPolicy {
    /// Create backoff policy from environment variables
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();
        Ok(Self {
            fetch_delay: std::env::var("FCP_FETCH_BACKOFF_MS")
                .ok()
                .and_then(|s| s.parse().ok())
                .map_or(defaults.fetch_delay, Duration::from_millis),
            request_delay: std::env::var("FCP_REQUEST_BACKOFF_MS")
                .ok()
                .and_then(|s| s.parse().ok())
                .map_or(defaults.request_delay, Duration::from_millis),
        })
    }

    /// Same delay for every operation, mostly useful in tests
    pub fn fixed(delay: Duration) -> Self {
        Self {
            fetch_delay: delay,
            request_delay: delay,
        }
    }
}

/// Process-wide shutdown trigger observed by backoff waits
#[derive(Debug, Clone)]
pub struct ShutdownSignal {
    sender: Arc<watch::Sender<bool>>,
}

impl Default for ShutdownSignal {
    fn default() -> Self {
        Self::new()
    }
}

impl ShutdownSignal {
    pub fn new() -> Self {
        let (sender, _) = watch::channel(false);
        Self {
            sender: Arc::new(sender),
        }
    }

    /// Wake every pending backoff wait. Idempotent.
    pub fn trigger(&self) {
        self.sender.send_replace(true);
    }

    pub fn is_triggered(&self) -> bool {
        *self.sender.borrow()
    }

    /// Sleep for `delay` unless shutdown is triggered first
    pub async fn sleep(&self, delay: Duration) -> Result<()> {
        let mut receiver = self.sender.subscribe();
        if *receiver.borrow_and_update() {
            return Err(ClientError::Shutdown);
        }

        tokio::select! {
            () = tokio::time::sleep(delay) => Ok(()),
            _ = receiver.wait_for(|triggered| *triggered) => Err(ClientError::Shutdown),
        }
    }
}

#[cfg(test)]
#[allow(
    unsafe_code,
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::significant_drop_tightening
)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[test]
    fn test_default_policy() {
        let policy = BackoffPolicy::default();
        assert_eq!(policy.fetch_delay, Duration::from_secs(10));
        assert_eq!(policy.request_delay, Duration::from_secs(5));
    }

    #[test]
    fn test_from_env() {
        for var in ["FCP_FETCH_BACKOFF_MS", "FCP_REQUEST_BACKOFF_MS"] {
            unsafe {
                std::env::remove_var(var);
            }
        }
        let policy = BackoffPolicy::from_env().expect("Operation should succeed");
        assert_eq!(policy, BackoffPolicy::default());

        unsafe {
            std::env::set_var("FCP_FETCH_BACKOFF_MS", "250");
            std::env::set_var("FCP_REQUEST_BACKOFF_MS", "not-a-number");
        }
        let policy = BackoffPolicy::from_env().expect("Operation should succeed");
        assert_eq!(policy.fetch_delay, Duration::from_millis(250));
        assert_eq!(policy.request_delay, Duration::from_secs(5));

        for var in ["FCP_FETCH_BACKOFF_MS", "FCP_REQUEST_BACKOFF_MS"] {
            unsafe {
                std::env::remove_var(var);
            }
        }
    }

    #[tokio::test]
    async fn test_sleep_completes_without_shutdown() {
        let signal = ShutdownSignal::new();
        let start = Instant::now();
        signal
            .sleep(Duration::from_millis(5))
            .await
            .expect("Operation should succeed");
        assert!(start.elapsed() >= Duration::from_millis(5));
    }

    #[tokio::test]
    async fn test_trigger_interrupts_sleep() {
        let signal = ShutdownSignal::new();
        let waiter = signal.clone();
        let task = tokio::spawn(async move { waiter.sleep(Duration::from_secs(3600)).await });

        tokio::time::sleep(Duration::from_millis(10)).await;
        signal.trigger();

        let result = tokio::time::timeout(Duration::from_secs(5), task)
            .await
            .expect("sleep should be interrupted")
            .expect("task should not panic");
        assert!(matches!(result, Err(ClientError::Shutdown)));
        assert!(signal.is_triggered());
    }

    #[tokio::test]
    async fn test_sleep_after_trigger_fails_immediately() {
        let signal = ShutdownSignal::new();
        signal.trigger();
        let result = signal.sleep(Duration::from_secs(3600)).await;
        assert!(matches!(result, Err(ClientError::Shutdown)));
    }
}
