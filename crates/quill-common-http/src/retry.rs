// Copyright (c) 2026 Quill Authors. All rights reserved.
// SPDX-License-Identifier: Apache-2.0

//! Bounded retry with exponential backoff and jitter.

use std::future::Future;
use std::time::Duration;

use reqwest::StatusCode;
use tracing::{debug, warn};

/// Classifies whether an error is worth retrying.
///
/// Only transient failures (network errors, timeouts, 5xx responses, rate
/// limits) should report `true`. Callers decide per operation whether to
/// apply retry at all; idempotency is the caller's responsibility.
pub trait RetryableError {
	fn is_retryable(&self) -> bool;
}

impl RetryableError for reqwest::Error {
	fn is_retryable(&self) -> bool {
		if self.is_timeout() || self.is_connect() {
			return true;
		}
		match self.status() {
			Some(status) => status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS,
			None => false,
		}
	}
}

/// Retry behaviour for an operation.
#[derive(Debug, Clone)]
pub struct RetryConfig {
	/// Total attempts, including the first one.
	pub max_attempts: u32,
	/// Delay before the first retry.
	pub base_delay: Duration,
	/// Upper bound on any single delay.
	pub max_delay: Duration,
	/// Multiplier applied to the delay after each attempt.
	pub backoff_factor: f64,
	/// Randomize each delay in `[delay/2, delay]` to avoid thundering herds.
	pub jitter: bool,
	/// HTTP statuses considered transient when classifying responses.
	pub retryable_statuses: Vec<StatusCode>,
}

impl Default for RetryConfig {
	fn default() -> Self {
		Self {
			max_attempts: 3,
			base_delay: Duration::from_millis(500),
			max_delay: Duration::from_secs(30),
			backoff_factor: 2.0,
			jitter: true,
			retryable_statuses: vec![
				StatusCode::TOO_MANY_REQUESTS,
				StatusCode::REQUEST_TIMEOUT,
				StatusCode::INTERNAL_SERVER_ERROR,
				StatusCode::BAD_GATEWAY,
				StatusCode::SERVICE_UNAVAILABLE,
				StatusCode::GATEWAY_TIMEOUT,
			],
		}
	}
}

impl RetryConfig {
	/// A config that never retries. Useful for operations that are not
	/// idempotent.
	pub fn no_retry() -> Self {
		Self {
			max_attempts: 1,
			..Self::default()
		}
	}

	fn delay_for_attempt(&self, attempt: u32) -> Duration {
		let exp = self.backoff_factor.powi(attempt as i32);
		let raw = self.base_delay.as_secs_f64() * exp;
		let capped = raw.min(self.max_delay.as_secs_f64());
		let jittered = if self.jitter {
			capped / 2.0 + fastrand::f64() * (capped / 2.0)
		} else {
			capped
		};
		Duration::from_secs_f64(jittered)
	}
}

/// Run `operation` until it succeeds, returns a non-retryable error, or the
/// attempt budget is exhausted.
///
/// The last error is returned when all attempts fail.
pub async fn retry<T, E, F, Fut>(config: &RetryConfig, mut operation: F) -> Result<T, E>
where
	E: RetryableError + std::fmt::Debug,
	F: FnMut() -> Fut,
	Fut: Future<Output = Result<T, E>>,
{
	let mut attempt = 0u32;
	loop {
		match operation().await {
			Ok(value) => return Ok(value),
			Err(err) => {
				attempt += 1;
				if attempt >= config.max_attempts || !err.is_retryable() {
					if attempt > 1 {
						warn!(attempts = attempt, "giving up after retries");
					}
					return Err(err);
				}
				let delay = config.delay_for_attempt(attempt - 1);
				debug!(
					attempt = attempt,
					delay_ms = delay.as_millis() as u64,
					error = ?err,
					"transient failure, retrying"
				);
				tokio::time::sleep(delay).await;
			}
		}
	}
}
