//! Fixed-interval, bounded retry
//!
//! Invokes a check up to `max_attempts` times, sleeping `interval` between
//! checks. A check either finishes the loop, asks for another attempt, or
//! aborts it with an error.

use crate::error::{Error, Result};
use backoff::backoff::{Backoff, Constant};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;
use tracing::trace;

/// Default milliseconds between bind checks
pub const DEFAULT_POLL_INTERVAL_MILLIS: u64 = 4_000;

/// Default number of bind checks. With the default interval this bounds the
/// wait at about a minute, which covers PVC binding on GCE PD.
pub const DEFAULT_POLL_ATTEMPTS: u32 = 15;

/// Interval and attempt limit for a bounded poll
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RetryBudget {
    /// Milliseconds to sleep between checks
    pub interval_millis: u64,
    /// Maximum number of checks
    pub max_attempts: u32,
}

impl Default for RetryBudget {
    fn default() -> Self {
        Self {
            interval_millis: DEFAULT_POLL_INTERVAL_MILLIS,
            max_attempts: DEFAULT_POLL_ATTEMPTS,
        }
    }
}

impl RetryBudget {
    /// Build a validated budget. The interval must be a non-zero whole
    /// number of milliseconds.
    pub fn new(interval: Duration, max_attempts: u32) -> Result<Self> {
        if interval.subsec_nanos() % 1_000_000 != 0 {
            return Err(Error::Configuration(format!(
                "retry interval {:?} is not a whole number of milliseconds",
                interval
            )));
        }
        let interval_millis = u64::try_from(interval.as_millis()).map_err(|_| {
            Error::Configuration(format!("retry interval {:?} is too large", interval))
        })?;

        let budget = Self {
            interval_millis,
            max_attempts,
        };
        budget.validate()?;
        Ok(budget)
    }

    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_millis)
    }

    /// Worst-case time spent sleeping between checks
    pub fn max_wait(&self) -> Duration {
        self.interval() * self.max_attempts.saturating_sub(1)
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_attempts == 0 {
            return Err(Error::Configuration(
                "retry budget needs at least one attempt".into(),
            ));
        }
        if self.interval_millis == 0 {
            return Err(Error::Configuration(
                "retry interval must be greater than zero".into(),
            ));
        }
        Ok(())
    }

    fn schedule(&self) -> Constant {
        Constant::new(self.interval())
    }
}

/// Outcome of a single check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Check<T, S> {
    /// Condition met, stop retrying
    Ready(T),
    /// Condition not met yet; carries what was observed
    NotReady(S),
}

/// Outcome of a bounded retry that did not abort
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Retried<T, S> {
    Ready { value: T, attempts: u32 },
    Exhausted { last: Option<S>, attempts: u32 },
}

/// Run `check` until it is ready, errors, or the budget runs out.
///
/// `check` receives the 1-based attempt number. There is no sleep before the
/// first check or after the last one.
pub async fn retry<T, S, F, Fut>(budget: &RetryBudget, mut check: F) -> Result<Retried<T, S>>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<Check<T, S>>>,
{
    let mut schedule = budget.schedule();
    let mut last = None;

    for attempt in 1..=budget.max_attempts {
        match check(attempt).await? {
            Check::Ready(value) => return Ok(Retried::Ready { value, attempts: attempt }),
            Check::NotReady(observed) => last = Some(observed),
        }

        if attempt == budget.max_attempts {
            break;
        }
        if let Some(delay) = schedule.next_backoff() {
            trace!(attempt, delay_ms = delay.as_millis() as u64, "Retrying after delay");
            tokio::time::sleep(delay).await;
        }
    }

    Ok(Retried::Exhausted {
        last,
        attempts: budget.max_attempts,
    })
}
