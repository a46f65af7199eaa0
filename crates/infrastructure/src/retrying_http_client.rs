use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use http::StatusCode;
use tracing::{debug, warn};
use warden_core::{AppError, AppResult};

use crate::http_transport::{HttpRequest, HttpResponse, HttpTransport};

/// Backoff and retry limits for transient HTTP failures.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    retry_max: u32,
    wait_min: Duration,
    wait_max: Duration,
    multiplier: f64,
    jitter: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            retry_max: 4,
            wait_min: Duration::from_millis(1000),
            wait_max: Duration::from_millis(30_000),
            multiplier: 2.0,
            jitter: 0.1,
        }
    }
}

impl RetryPolicy {
    /// Creates a policy with the default multiplier and jitter.
    pub fn new(retry_max: u32, wait_min: Duration, wait_max: Duration) -> AppResult<Self> {
        if wait_min > wait_max {
            return Err(AppError::Validation(format!(
                "retry wait minimum {}ms exceeds maximum {}ms",
                wait_min.as_millis(),
                wait_max.as_millis()
            )));
        }

        Ok(Self {
            retry_max,
            wait_min,
            wait_max,
            ..Self::default()
        })
    }

    /// Returns the maximum number of retries after the first attempt.
    #[must_use]
    pub fn retry_max(&self) -> u32 {
        self.retry_max
    }

    /// Computes the wait before the retry that follows `attempt` (1-based).
    ///
    /// `wait_min * multiplier^(attempt - 1)` plus up to `jitter` of random
    /// spread, clamped to `[wait_min, wait_max]`.
    #[must_use]
    pub fn calculate_backoff(&self, attempt: u32) -> Duration {
        let exponent = i32::try_from(attempt.saturating_sub(1)).unwrap_or(i32::MAX);
        let base = self.wait_min.as_secs_f64() * self.multiplier.powi(exponent);
        let spread = base * self.jitter * rand::random::<f64>();

        self.clamp_secs(base + spread)
    }

    fn clamp_secs(&self, seconds: f64) -> Duration {
        if !seconds.is_finite() || seconds >= self.wait_max.as_secs_f64() {
            return self.wait_max;
        }

        Duration::from_secs_f64(seconds.max(0.0)).clamp(self.wait_min, self.wait_max)
    }

    fn clamp(&self, wait: Duration) -> Duration {
        wait.clamp(self.wait_min, self.wait_max)
    }
}

/// Returns whether a response status is worth retrying.
#[must_use]
pub fn should_retry(status: StatusCode) -> bool {
    matches!(
        status,
        StatusCode::TOO_MANY_REQUESTS
            | StatusCode::BAD_GATEWAY
            | StatusCode::SERVICE_UNAVAILABLE
            | StatusCode::GATEWAY_TIMEOUT
    )
}

/// Extracts a delta-seconds `Retry-After` hint from a 429 or 503 response.
fn retry_after(response: &HttpResponse) -> Option<Duration> {
    if response.status != StatusCode::TOO_MANY_REQUESTS
        && response.status != StatusCode::SERVICE_UNAVAILABLE
    {
        return None;
    }

    response
        .headers
        .get(http::header::RETRY_AFTER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse::<u64>().ok())
        .map(Duration::from_secs)
}

/// Transport decorator retrying transient failures with exponential backoff.
///
/// Every discarded response is dropped, which closes its body, before the
/// next attempt starts.
#[derive(Clone)]
pub struct RetryingHttpClient {
    inner: Arc<dyn HttpTransport>,
    policy: RetryPolicy,
}

impl RetryingHttpClient {
    /// Creates a retrying client around a transport.
    #[must_use]
    pub fn new(inner: Arc<dyn HttpTransport>, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }

    /// Sends a request, retrying 429/502/503/504 responses and transport errors.
    ///
    /// Other statuses are returned as-is for the caller to classify. Requests
    /// the transport rejects as invalid fail on the first attempt.
    pub async fn do_with_retry(&self, request: &HttpRequest) -> AppResult<HttpResponse> {
        let attempts = self.policy.retry_max.saturating_add(1);
        let mut last_failure = String::new();

        for attempt in 1..=attempts {
            let hint = match self.inner.send(request).await {
                Ok(response) if should_retry(response.status) => {
                    last_failure = format!("HTTP status {}", response.status);
                    let hint = retry_after(&response);
                    drop(response);
                    hint
                }
                Ok(response) => return Ok(response),
                Err(error @ AppError::Validation(_)) => return Err(error),
                Err(error) => {
                    last_failure = error.to_string();
                    None
                }
            };

            if attempt < attempts {
                let wait = hint
                    .map(|hint| self.policy.clamp(hint))
                    .unwrap_or_else(|| self.policy.calculate_backoff(attempt));
                debug!(
                    method = %request.method,
                    url = %request.url,
                    attempt,
                    wait_ms = wait.as_millis(),
                    failure = %last_failure,
                    "retrying transient HTTP failure"
                );
                tokio::time::sleep(wait).await;
            }
        }

        warn!(
            method = %request.method,
            url = %request.url,
            attempts,
            failure = %last_failure,
            "giving up on HTTP request"
        );

        Err(AppError::Unavailable(format!(
            "{} {} failed after {attempts} attempt(s): {last_failure}",
            request.method, request.url
        )))
    }
}

#[async_trait]
impl HttpTransport for RetryingHttpClient {
    async fn send(&self, request: &HttpRequest) -> AppResult<HttpResponse> {
        self.do_with_retry(request).await
    }
}
