//! Resilient request execution.
//!
//! # Responsibilities
//! - Send a prepared request within the retry budget
//! - Retry transport failures and 5xx responses after a fixed delay
//! - Surface 4xx responses immediately as [`ApiError`]
//! - Decode successful bodies exactly once, without retrying on failure
//! - Never re-send once a non-5xx status has arrived, even if its body was lost
//!
//! # Design Decisions
//! - One attempt at a time; no sleep after the final attempt
//! - Exhaustion reports the attempt count and the last retryable failure
//! - Cancellation is dropping the returned future, including mid-backoff

use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::de::DeserializeOwned;

use crate::error::{ClientError, LastFailure, Result};
use crate::http::request::PreparedRequest;
use crate::http::response::{ApiError, RawResponse};
use crate::http::transport::Transport;
use crate::observability::metrics;
use crate::resilience::backoff;
use crate::resilience::timeouts;
use crate::resilience::{RetryBudget, RetryOutcome};

/// Runs requests through a [`Transport`] under a [`RetryBudget`].
#[derive(Clone)]
pub struct RequestExecutor {
    transport: Arc<dyn Transport>,
    budget: RetryBudget,
    attempt_timeout: Option<Duration>,
}

impl std::fmt::Debug for RequestExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestExecutor")
            .field("budget", &self.budget)
            .field("attempt_timeout", &self.attempt_timeout)
            .finish_non_exhaustive()
    }
}

impl RequestExecutor {
    pub fn new(transport: Arc<dyn Transport>, budget: RetryBudget) -> Self {
        Self {
            transport,
            budget,
            attempt_timeout: None,
        }
    }

    /// Bound each attempt, independently of the transport's own timeout.
    pub fn with_attempt_timeout(mut self, limit: Duration) -> Self {
        self.attempt_timeout = Some(limit);
        self
    }

    pub fn budget(&self) -> RetryBudget {
        self.budget
    }

    /// Send `request`, retrying as the budget allows, and return the first
    /// response with a status below 400.
    pub async fn send(&self, request: &PreparedRequest) -> Result<RawResponse> {
        let max_attempts = self.budget.max_attempts();
        let mut last_failure: Option<LastFailure> = None;

        for attempt in 0..max_attempts {
            tracing::debug!(method = %request.method, url = %request.url, attempt = attempt + 1, "Sending request");
            let result = timeouts::within(self.attempt_timeout, self.transport.send(request)).await;
            let outcome = RetryOutcome::classify(result);
            metrics::record_attempt(outcome.label());

            match outcome {
                RetryOutcome::Success(response) => return Ok(response),
                RetryOutcome::ClientFailure(response) => {
                    tracing::warn!(
                        method = %request.method,
                        url = %request.url,
                        status = response.status,
                        "Client error, not retrying"
                    );
                    return Err(ApiError::from(response).into());
                }
                RetryOutcome::IncompleteResponse { status, error } => {
                    tracing::warn!(
                        method = %request.method,
                        url = %request.url,
                        status,
                        error = %error,
                        "Response body lost, not retrying"
                    );
                    return Err(ClientError::IncompleteResponse { status, source: error });
                }
                RetryOutcome::TransportFailure(e) => {
                    tracing::warn!(
                        method = %request.method,
                        url = %request.url,
                        attempt = attempt + 1,
                        error = %e,
                        "Request failed"
                    );
                    last_failure = Some(LastFailure::Transport(e));
                }
                RetryOutcome::ServerFailure(response) => {
                    tracing::error!(
                        method = %request.method,
                        url = %request.url,
                        attempt = attempt + 1,
                        status = response.status,
                        "Server error"
                    );
                    last_failure = Some(LastFailure::from(response));
                }
            }

            if let Some(delay) = backoff::backoff_after(&self.budget, attempt) {
                tracing::info!(attempt = attempt + 1, delay = ?delay, "Retrying request");
                metrics::record_retry();
                backoff::wait(delay).await;
            }
        }

        tracing::error!(method = %request.method, url = %request.url, attempts = max_attempts, "Retry budget exhausted");
        Err(ClientError::RetryBudgetExhausted {
            attempts: max_attempts,
            last_failure,
        })
    }

    /// Send `request` and decode the successful body as `T`.
    pub async fn execute<T: DeserializeOwned>(&self, request: &PreparedRequest) -> Result<T> {
        let start = Instant::now();
        let method = request.method.as_str();

        let response = match self.send(request).await {
            Ok(response) => response,
            Err(e) => {
                metrics::record_call(method, result_label(&e), start);
                return Err(e);
            }
        };

        match response.decode::<T>() {
            Ok(value) => {
                metrics::record_call(method, "ok", start);
                Ok(value)
            }
            Err(source) => {
                tracing::warn!(
                    url = %request.url,
                    status = response.status,
                    error = %source,
                    "Response body did not match expected shape"
                );
                metrics::record_call(method, "decode_error", start);
                Err(ClientError::Decode {
                    source,
                    body: response.body_text(),
                })
            }
        }
    }
}

fn result_label(err: &ClientError) -> &'static str {
    match err {
        ClientError::Api(_) => "client_error",
        ClientError::RetryBudgetExhausted { .. } => "exhausted",
        ClientError::IncompleteResponse { .. } => "incomplete_response",
        _ => "error",
    }
}
