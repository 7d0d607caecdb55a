//! Bounded polling
//!
//! `eventually` re-runs a probe until it reports a value, reports a fatal
//! error, or the timeout is used up. Time is counted in poll intervals handed to the injected
//! [`Delay`], so a recording delay makes the whole loop instant in tests.
//!
//! # Example
//!
//! ```ignore
//! use ingress_dns_smoke::eventually::{eventually, Probe};
//! use std::time::Duration;
//!
//! let hostname = eventually(|| async {
//!     match lookup().await {
//!         Ok(Some(h)) => Probe::Done(h),
//!         Ok(None) => Probe::Waiting("no hostname yet".to_string()),
//!         Err(e) => Probe::Failed(e),
//!     }
//! })
//! .timeout(Duration::from_secs(60))
//! .interval(Duration::from_secs(1))
//! .await_condition()
//! .await?;
//! ```

use std::future::Future;
use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use crate::delay::{Delay, TokioDelay};

/// Outcome of a single probe
#[derive(Debug, Clone, PartialEq)]
pub enum Probe<T, E> {
    /// Condition met, carrying the observed value
    Done(T),
    /// Not yet; the string describes what was observed
    Waiting(String),
    /// Polling cannot succeed; stop immediately
    Failed(E),
}

/// Error type for eventually operations
#[derive(Debug, thiserror::Error)]
pub enum ConditionError<E> {
    #[error("condition not met after {attempts} attempts over {elapsed:?}: {last_state}")]
    EventuallyFailed {
        attempts: u32,
        elapsed: Duration,
        last_state: String,
    },

    #[error("{0}")]
    Aborted(E),
}

/// Builder for eventually checks
pub struct Eventually<F, Fut, T, E>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Probe<T, E>>,
{
    probe: F,
    timeout: Duration,
    interval: Duration,
    delay: Arc<dyn Delay>,
    _marker: PhantomData<fn() -> (Fut, T, E)>,
}

/// Create an eventually check that retries until the probe is done
///
/// Default timeout: 60 seconds
/// Default interval: 1 second
pub fn eventually<F, Fut, T, E>(probe: F) -> Eventually<F, Fut, T, E>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Probe<T, E>>,
{
    Eventually {
        probe,
        timeout: Duration::from_secs(60),
        interval: Duration::from_secs(1),
        delay: Arc::new(TokioDelay),
        _marker: PhantomData,
    }
}

impl<F, Fut, T, E> Eventually<F, Fut, T, E>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Probe<T, E>>,
{
    /// Set the timeout duration
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the polling interval
    pub fn interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Set the delay used between probes
    pub fn delay(mut self, delay: Arc<dyn Delay>) -> Self {
        self.delay = delay;
        self
    }

    /// Run the probe until it is done, fails, or the timeout is used up
    pub async fn await_condition(self) -> Result<T, ConditionError<E>> {
        let mut waited = Duration::ZERO;
        let mut attempts = 0u32;

        loop {
            attempts += 1;

            let last_state = match (self.probe)().await {
                Probe::Done(value) => return Ok(value),
                Probe::Waiting(state) => state,
                Probe::Failed(err) => return Err(ConditionError::Aborted(err)),
            };

            // A zero interval would never advance `waited`
            if waited >= self.timeout || self.interval.is_zero() {
                return Err(ConditionError::EventuallyFailed {
                    attempts,
                    elapsed: waited,
                    last_state,
                });
            }

            debug!(attempt = attempts, state = %last_state, "Condition not met yet");
            self.delay.sleep(self.interval).await;
            waited += self.interval;
        }
    }
}
