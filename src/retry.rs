use std::future::Future;
use std::time::Duration;

/// How often and how patiently a single request is retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub multiplier: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(1),
            multiplier: 2,
        }
    }
}

/// Where a retried request currently stands. Attempts are numbered from 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryState {
    Attempting(u32),
    Success,
    Exhausted,
}

/// Returned by [`RetryPolicy::run`] once the last attempt has failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetriesExhausted<E> {
    pub attempts: u32,
    pub last_error: E,
}

impl RetryPolicy {
    pub fn start(&self) -> RetryState {
        RetryState::Attempting(1)
    }

    /// Next state after an attempt finished. Terminal states never move.
    pub fn transition(&self, state: RetryState, succeeded: bool) -> RetryState {
        match state {
            RetryState::Attempting(_) if succeeded => RetryState::Success,
            RetryState::Attempting(n) if n >= self.max_attempts.max(1) => RetryState::Exhausted,
            RetryState::Attempting(n) => RetryState::Attempting(n + 1),
            terminal => terminal,
        }
    }

    /// Delay before retry number `retry` (0-based): `base * multiplier^retry`.
    pub fn backoff(&self, retry: u32) -> Duration {
        self.base_delay
            .saturating_mul(self.multiplier.saturating_pow(retry))
    }

    /// Drives `op` through the state machine, sleeping between failed attempts.
    ///
    /// `on_retry` is told the upcoming attempt number, the delay about to be
    /// slept and the error that caused the retry.
    pub async fn run<T, E, F, Fut, R>(
        &self,
        mut op: F,
        mut on_retry: R,
    ) -> Result<T, RetriesExhausted<E>>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        R: FnMut(u32, Duration, &E),
    {
        let mut state = self.start();
        let mut attempts = 0;

        let outcome = loop {
            if let RetryState::Attempting(n) = state {
                attempts = n;
            }
            let result = op(attempts).await;
            state = self.transition(state, result.is_ok());

            match (state, result) {
                (RetryState::Attempting(next), Err(error)) => {
                    let delay = self.backoff(next - 2);
                    on_retry(next, delay, &error);
                    tokio::time::sleep(delay).await;
                }
                // Success or Exhausted
                (_, result) => break result,
            }
        };

        outcome.map_err(|last_error| RetriesExhausted {
            attempts,
            last_error,
        })
    }
}
