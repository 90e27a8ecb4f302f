//! Fixed-pause retry of transient failures.

use std::future::Future;
use std::time::Duration;

use tokio::time::sleep;
use tracing::{debug, warn};

use aztable_core::Result;

/// How often and how patiently to retry a call.
///
/// Only errors for which [`aztable_core::Error::is_retryable`] holds are
/// retried; anything else is returned after the first attempt. Once the
/// retries are spent the last error is returned unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt.
    pub max_retries: u32,
    /// Pause before each retry.
    pub pause: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            pause: Duration::from_millis(200),
        }
    }
}

impl RetryPolicy {
    /// A policy that never retries.
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            pause: Duration::ZERO,
        }
    }

    /// Run `operation` until it succeeds, fails permanently or runs out
    /// of retries.
    pub async fn run<T, F, Fut>(&self, what: &str, mut operation: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut attempts = 0;
        loop {
            attempts += 1;
            match operation().await {
                Ok(value) => return Ok(value),
                Err(e) if e.is_retryable() && attempts <= self.max_retries => {
                    warn!(
                        "{} failed (attempt {}/{}): {}, retrying...",
                        what,
                        attempts,
                        self.max_retries + 1,
                        e
                    );
                    debug!("Waiting {:?} before retry", self.pause);
                    sleep(self.pause).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    use aztable_core::Error;
    use aztable_core::error::{CompileError, StatusError, TransportError};

    fn transient(n: u32) -> Error {
        Error::Transport(TransportError::Connection {
            message: format!("reset {}", n),
        })
    }

    #[tokio::test(start_paused = true)]
    async fn succeeds_after_two_failures() {
        let calls = AtomicU32::new(0);
        let counter = &calls;
        let result = RetryPolicy::default()
            .run("op", || async move {
                let n = counter.fetch_add(1, Ordering::SeqCst) + 1;
                if n <= 2 { Err(transient(n)) } else { Ok(n) }
            })
            .await;

        assert_eq!(result.unwrap(), 3);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn surfaces_last_failure_after_four_attempts() {
        let calls = AtomicU32::new(0);
        let counter = &calls;
        let result: Result<()> = RetryPolicy::default()
            .run("op", || async move {
                let n = counter.fetch_add(1, Ordering::SeqCst) + 1;
                Err(transient(n))
            })
            .await;

        assert_eq!(calls.load(Ordering::SeqCst), 4);
        match result.unwrap_err() {
            Error::Transport(TransportError::Connection { message }) => {
                assert_eq!(message, "reset 4")
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn status_errors_are_retried() {
        let calls = AtomicU32::new(0);
        let counter = &calls;
        let result: Result<()> = RetryPolicy::default()
            .run("op", || async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err(StatusError::new(503, None, None, "").into())
            })
            .await;

        assert_eq!(result.unwrap_err().status(), Some(503));
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn local_errors_are_not_retried() {
        let calls = AtomicU32::new(0);
        let counter = &calls;
        let result: Result<()> = RetryPolicy::default()
            .run("op", || async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err(CompileError::NoClauses.into())
            })
            .await;

        assert!(matches!(result.unwrap_err(), Error::Compile(_)));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn pauses_between_attempts() {
        let start = tokio::time::Instant::now();
        let _: Result<()> = RetryPolicy::default()
            .run("op", || async { Err(transient(0)) })
            .await;
        assert!(start.elapsed() >= Duration::from_millis(600));
    }

    #[tokio::test]
    async fn none_makes_one_attempt() {
        let calls = AtomicU32::new(0);
        let counter = &calls;
        let _: Result<()> = RetryPolicy::none()
            .run("op", || async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err(transient(0))
            })
            .await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
