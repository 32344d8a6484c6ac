//! Bounded fixed-delay retry
//!
//! Re-runs an idempotent operation (typically "make a call, then assert on
//! the result") until it succeeds or the attempt budget is exhausted. The
//! delay is a plain blocking sleep; there is no jitter, no backoff, and no
//! discrimination between error kinds - the closure decides what is worth
//! retrying by returning `Err` only for those cases.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use thiserror::Error;
use tracing::debug;

/// Retry configuration: fixed delay between attempts and the total attempt
/// budget. `attempts` counts the first try, so `attempts = 3` means one try
/// plus at most two retries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Sleep between attempts.
    pub delay: Duration,
    /// Total attempts, first try included. Treated as at least 1.
    pub attempts: u32,
}

impl RetryPolicy {
    /// Creates a policy.
    #[must_use]
    pub const fn new(delay: Duration, attempts: u32) -> Self {
        Self { delay, attempts }
    }

    /// A single attempt, no retries.
    #[must_use]
    pub const fn once() -> Self {
        Self::new(Duration::ZERO, 1)
    }
}

/// Runs `op` under the policy, returning the first success or the last
/// error verbatim once the budget is exhausted.
///
/// # Errors
///
/// The error of the final attempt, unwrapped and unmodified.
pub fn run<T, E, F>(policy: RetryPolicy, mut op: F) -> Result<T, E>
where
    F: FnMut() -> Result<T, E>,
{
    let attempts = policy.attempts.max(1);
    let mut attempt = 1;

    loop {
        match op() {
            Ok(value) => return Ok(value),
            Err(err) if attempt >= attempts => return Err(err),
            Err(_) => {
                debug!(attempt, total = attempts, "attempt failed; retrying after delay");
            }
        }
        attempt += 1;
        thread::sleep(policy.delay);
    }
}

/// Error type for the cancellable retry variant.
#[derive(Debug, Error)]
pub enum RetryError<E>
where
    E: std::error::Error,
{
    /// The token was cancelled between attempts.
    #[error("retry loop cancelled")]
    Cancelled,

    /// The final attempt's error.
    #[error(transparent)]
    Operation(E),
}

/// Cooperative cancellation flag for long retry loops.
///
/// The original contract has no way to abort a running loop; this token is
/// an added capability so a suite-level watchdog can stop waiting. It is
/// only observed between attempts - a sleeping loop wakes normally and
/// then notices the flag.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    /// Creates an uncancelled token.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Flags the token. Idempotent.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Whether the token has been flagged.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// As [`run`], but checks `token` before every attempt and before every
/// sleep.
///
/// # Errors
///
/// [`RetryError::Cancelled`] when the token fires, otherwise
/// [`RetryError::Operation`] carrying the final attempt's error.
pub fn run_cancellable<T, E, F>(
    policy: RetryPolicy,
    token: &CancellationToken,
    mut op: F,
) -> Result<T, RetryError<E>>
where
    E: std::error::Error,
    F: FnMut() -> Result<T, E>,
{
    let attempts = policy.attempts.max(1);
    let mut attempt = 1;

    loop {
        if token.is_cancelled() {
            return Err(RetryError::Cancelled);
        }
        match op() {
            Ok(value) => return Ok(value),
            Err(err) if attempt >= attempts => return Err(RetryError::Operation(err)),
            Err(_) => {
                debug!(attempt, total = attempts, "attempt failed; retrying after delay");
            }
        }
        attempt += 1;
        if token.is_cancelled() {
            return Err(RetryError::Cancelled);
        }
        thread::sleep(policy.delay);
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::time::Instant;

    use pretty_assertions::assert_eq;

    use super::*;

    #[derive(Debug, Error, PartialEq, Eq)]
    #[error("boom {0}")]
    struct Boom(u32);

    #[test]
    fn success_on_first_try_invokes_once() {
        let calls = Cell::new(0u32);
        let policy = RetryPolicy::new(Duration::from_millis(50), 5);

        let result: Result<&str, Boom> = run(policy, || {
            calls.set(calls.get() + 1);
            Ok("done")
        });

        assert_eq!(result.unwrap(), "done");
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn exhaustion_re_raises_the_last_error() {
        let calls = Cell::new(0u32);
        let policy = RetryPolicy::new(Duration::from_millis(10), 3);
        let started = Instant::now();

        let result: Result<(), Boom> = run(policy, || {
            calls.set(calls.get() + 1);
            Err(Boom(calls.get()))
        });

        assert_eq!(calls.get(), 3);
        // Two inter-attempt delays.
        assert!(started.elapsed() >= Duration::from_millis(20));
        assert_eq!(result.unwrap_err(), Boom(3));
    }

    #[test]
    fn eventual_success_stops_retrying() {
        let calls = Cell::new(0u32);
        let policy = RetryPolicy::new(Duration::from_millis(1), 3);

        let result: Result<u32, Boom> = run(policy, || {
            calls.set(calls.get() + 1);
            if calls.get() < 3 {
                Err(Boom(calls.get()))
            } else {
                Ok(calls.get())
            }
        });

        assert_eq!(result.unwrap(), 3);
        assert_eq!(calls.get(), 3);
    }

    #[test]
    fn zero_attempts_still_runs_once() {
        let calls = Cell::new(0u32);
        let result: Result<(), Boom> = run(RetryPolicy::new(Duration::ZERO, 0), || {
            calls.set(calls.get() + 1);
            Err(Boom(0))
        });
        assert!(result.is_err());
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn pre_cancelled_token_skips_the_operation() {
        let token = CancellationToken::new();
        token.cancel();
        let calls = Cell::new(0u32);

        let result: Result<(), RetryError<Boom>> =
            run_cancellable(RetryPolicy::new(Duration::ZERO, 3), &token, || {
                calls.set(calls.get() + 1);
                Err(Boom(0))
            });

        assert!(matches!(result, Err(RetryError::Cancelled)));
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn cancellation_between_attempts() {
        let token = CancellationToken::new();
        let calls = Cell::new(0u32);

        let result: Result<(), RetryError<Boom>> =
            run_cancellable(RetryPolicy::new(Duration::ZERO, 10), &token, || {
                calls.set(calls.get() + 1);
                token.cancel();
                Err(Boom(calls.get()))
            });

        assert!(matches!(result, Err(RetryError::Cancelled)));
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn cancellable_exhaustion_wraps_the_last_error() {
        let token = CancellationToken::new();

        let result: Result<(), RetryError<Boom>> =
            run_cancellable(RetryPolicy::new(Duration::ZERO, 2), &token, || Err(Boom(7)));

        match result {
            Err(RetryError::Operation(err)) => assert_eq!(err, Boom(7)),
            other => panic!("expected operation error, got {other:?}"),
        }
    }
}
