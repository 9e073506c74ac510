//! Retrying remote call - runs a single remote lookup until it yields an answer

use std::future::Future;
use std::time::Instant;

use tracing::{debug, warn};

use super::RetryPolicy;
use crate::domain::{DomainError, RemoteError};

/// Answer of a retried lookup: a value, or a definite "does not exist"
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup<T> {
    Found(T),
    NotFound,
}

impl<T> Lookup<T> {
    pub fn found(self) -> Option<T> {
        match self {
            Self::Found(value) => Some(value),
            Self::NotFound => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound)
    }
}

/// Invoke `call` until it succeeds or reports `NotFound`.
///
/// Transient and other remote errors are retried on the policy's backoff
/// schedule; `NotFound` stops immediately. An unbounded policy only returns
/// once the remote answers.
pub async fn retry_remote<T, F, Fut>(
    policy: &RetryPolicy,
    operation: &str,
    mut call: F,
) -> Result<Lookup<T>, DomainError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, RemoteError>>,
{
    let started = Instant::now();
    let mut attempts: u32 = 0;

    loop {
        attempts += 1;

        let error = match call().await {
            Ok(value) => return Ok(Lookup::Found(value)),
            Err(error) if error.is_not_found() => {
                debug!(operation, attempts, "Remote reported not found");
                return Ok(Lookup::NotFound);
            }
            Err(error) => error,
        };

        if !policy.allows_retry(attempts, started.elapsed()) {
            return Err(DomainError::RetryExhausted {
                operation: operation.to_string(),
                attempts,
                last_error: error,
            });
        }

        let delay =
            policy.clamp_to_deadline(policy.jittered_delay(attempts - 1), started.elapsed());
        warn!(
            operation,
            attempt = attempts,
            delay_ms = delay.as_millis() as u64,
            error = %error,
            "Remote call failed, retrying"
        );

        tokio::time::sleep(delay).await;
    }
}
