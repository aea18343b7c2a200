//! Retry stage: resubmits a request through the remainder of the chain on
//! retryable failures, with exponential backoff and jitter.

use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;
use reqwest::StatusCode;

use super::{Next, Policy};
use crate::context::Context;
use crate::error::ClientError;
use crate::http::{Request, Response};

/// Retry configuration.
#[derive(Debug, Clone)]
pub struct RetryOptions {
    /// Maximum number of attempts, including the first.
    pub max_attempts: u32,
    /// Delay before the first resubmission.
    pub initial_delay: Duration,
    /// Ceiling for the computed delay.
    pub max_delay: Duration,
    /// Multiplier applied per attempt (exponential backoff).
    pub backoff_multiplier: f64,
    /// Whether to randomize delays.
    pub use_jitter: bool,
    /// Maximum jitter as a fraction of the delay (0.0 to 1.0).
    pub jitter_factor: f64,
}

impl Default for RetryOptions {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_millis(1000),
            max_delay: Duration::from_secs(60),
            backoff_multiplier: 2.0,
            use_jitter: true,
            jitter_factor: 0.1,
        }
    }
}

impl RetryOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub const fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    pub const fn with_initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    pub const fn with_max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    pub const fn with_backoff_multiplier(mut self, multiplier: f64) -> Self {
        self.backoff_multiplier = multiplier;
        self
    }

    pub const fn with_jitter(mut self, use_jitter: bool) -> Self {
        self.use_jitter = use_jitter;
        self
    }

    pub fn with_jitter_factor(mut self, factor: f64) -> Self {
        self.jitter_factor = factor.clamp(0.0, 1.0);
        self
    }

    /// Delay before resubmitting after `attempt` (zero-based).
    fn delay_for(&self, attempt: u32) -> Duration {
        let base =
            self.initial_delay.as_millis() as f64 * self.backoff_multiplier.powi(attempt as i32);
        let delay = Duration::from_millis(base as u64).min(self.max_delay);
        if self.use_jitter {
            self.add_jitter(delay)
        } else {
            delay
        }
    }

    fn add_jitter(&self, delay: Duration) -> Duration {
        let mut rng = rand::thread_rng();
        let range = delay.as_millis() as f64 * self.jitter_factor;
        let jitter = if range > 0.0 {
            rng.gen_range(-range..=range)
        } else {
            0.0
        };
        Duration::from_millis((delay.as_millis() as f64 + jitter).max(0.0) as u64)
    }
}

/// Statuses the retry stage treats as transient. Anything else — including
/// client errors the protocol layer will report — passes through untouched.
fn is_retryable_status(status: StatusCode) -> bool {
    status == StatusCode::REQUEST_TIMEOUT
        || status == StatusCode::TOO_MANY_REQUESTS
        || status.is_server_error()
}

/// The retry pipeline stage.
pub struct RetryPolicy {
    options: RetryOptions,
}

impl RetryPolicy {
    pub fn new(options: RetryOptions) -> Self {
        Self { options }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(RetryOptions::default())
    }
}

#[async_trait]
impl Policy for RetryPolicy {
    async fn send(
        &self,
        ctx: &Context,
        request: &mut Request,
        next: Next<'_>,
    ) -> Result<Response, ClientError> {
        let attempts = self.options.max_attempts.max(1);
        let mut last_error = None;

        for attempt in 0..attempts {
            let last = attempt + 1 == attempts;
            match next.run(ctx, request).await {
                Ok(response) if last || !is_retryable_status(response.status()) => {
                    return Ok(response);
                }
                Ok(response) => {
                    tracing::debug!(
                        status = response.status().as_u16(),
                        attempt,
                        "retrying after transient status"
                    );
                    // Release the connection before resubmitting.
                    response.drain(ctx).await?;
                    last_error = None;
                }
                Err(error) if last || !error.is_retryable() => return Err(error),
                Err(error) => {
                    tracing::debug!(%error, attempt, "retrying after retryable error");
                    last_error = Some(error);
                }
            }
            ctx.sleep(self.options.delay_for(attempt)).await?;
        }

        // Unreachable: the final attempt returns from inside the loop.
        Err(last_error
            .unwrap_or_else(|| ClientError::Internal("retry loop exited without result".into())))
    }
}
