//! Retry logic.
//!
//! # Responsibilities
//! - Hold the per-client retry budget (attempt count, backoff delay)
//! - Classify the result of one attempt as retryable or terminal
//!
//! # Design Decisions
//! - Transport failures and 5xx responses are retryable until the budget runs out
//! - 4xx responses are terminal immediately
//! - Any response below 400 is terminal; it is never re-sent, even if it cannot be decoded
//!   or its body is cut short

use std::time::Duration;

use crate::config::RetryConfig;
use crate::http::response::RawResponse;
use crate::http::transport::TransportError;

/// Bounded retry configuration, immutable for the lifetime of a client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryBudget {
    max_attempts: u32,
    backoff_delay: Duration,
}

impl RetryBudget {
    /// Create a budget. `max_attempts` of 0 is treated as 1.
    pub fn new(max_attempts: u32, backoff_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            backoff_delay,
        }
    }

    /// A single attempt with no retries.
    pub fn single_attempt() -> Self {
        Self::new(1, Duration::ZERO)
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn backoff_delay(&self) -> Duration {
        self.backoff_delay
    }

    /// Whether another attempt may follow the given 0-indexed attempt.
    pub fn has_attempt_after(&self, attempt: u32) -> bool {
        attempt + 1 < self.max_attempts
    }
}

impl Default for RetryBudget {
    fn default() -> Self {
        RetryBudget::from(&RetryConfig::default())
    }
}

impl From<&RetryConfig> for RetryBudget {
    fn from(config: &RetryConfig) -> Self {
        Self::new(config.max_attempts, config.backoff_delay())
    }
}

/// Classified result of one attempt.
#[derive(Debug)]
pub enum RetryOutcome {
    /// Status below 400; the body is ready to decode.
    Success(RawResponse),
    /// The exchange failed before a response arrived.
    TransportFailure(TransportError),
    /// Status 500 or above.
    ServerFailure(RawResponse),
    /// Status in 400..500.
    ClientFailure(RawResponse),
    /// Status below 500 arrived but the body was lost. The service may have
    /// acted on the request, so it is not re-sent.
    IncompleteResponse { status: u16, error: TransportError },
}

impl RetryOutcome {
    pub fn classify(result: Result<RawResponse, TransportError>) -> Self {
        match result {
            Err(e) => match e.response_status() {
                Some(status) if status < 500 => RetryOutcome::IncompleteResponse { status, error: e },
                _ => RetryOutcome::TransportFailure(e),
            },
            Ok(response) if response.status >= 500 => RetryOutcome::ServerFailure(response),
            Ok(response) if response.status >= 400 => RetryOutcome::ClientFailure(response),
            Ok(response) => RetryOutcome::Success(response),
        }
    }

    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            RetryOutcome::TransportFailure(_) | RetryOutcome::ServerFailure(_)
        )
    }

    /// Metric label for this outcome.
    pub fn label(&self) -> &'static str {
        match self {
            RetryOutcome::Success(_) => "success",
            RetryOutcome::TransportFailure(_) => "transport_failure",
            RetryOutcome::ServerFailure(_) => "server_failure",
            RetryOutcome::ClientFailure(_) => "client_failure",
            RetryOutcome::IncompleteResponse { .. } => "incomplete_response",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(status: u16) -> RawResponse {
        RawResponse::new(status, Vec::new())
    }

    #[test]
    fn test_zero_attempts_normalised() {
        let budget = RetryBudget::new(0, Duration::from_millis(5));
        assert_eq!(budget.max_attempts(), 1);
        assert!(!budget.has_attempt_after(0));
    }

    #[test]
    fn test_has_attempt_after() {
        let budget = RetryBudget::new(3, Duration::ZERO);
        assert!(budget.has_attempt_after(0));
        assert!(budget.has_attempt_after(1));
        assert!(!budget.has_attempt_after(2));
    }

    #[test]
    fn test_from_config() {
        let config = RetryConfig {
            max_attempts: 4,
            backoff_delay_ms: 250,
        };
        let budget = RetryBudget::from(&config);
        assert_eq!(budget.max_attempts(), 4);
        assert_eq!(budget.backoff_delay(), Duration::from_millis(250));
    }

    #[test]
    fn test_classification_boundaries() {
        assert!(matches!(RetryOutcome::classify(Ok(response(200))), RetryOutcome::Success(_)));
        assert!(matches!(RetryOutcome::classify(Ok(response(201))), RetryOutcome::Success(_)));
        assert!(matches!(RetryOutcome::classify(Ok(response(399))), RetryOutcome::Success(_)));
        assert!(matches!(RetryOutcome::classify(Ok(response(400))), RetryOutcome::ClientFailure(_)));
        assert!(matches!(RetryOutcome::classify(Ok(response(499))), RetryOutcome::ClientFailure(_)));
        assert!(matches!(RetryOutcome::classify(Ok(response(500))), RetryOutcome::ServerFailure(_)));
        assert!(matches!(RetryOutcome::classify(Ok(response(503))), RetryOutcome::ServerFailure(_)));

        let transport = RetryOutcome::classify(Err(TransportError::Connect("refused".into())));
        assert!(matches!(transport, RetryOutcome::TransportFailure(_)));
    }

    #[test]
    fn test_retryable() {
        assert!(RetryOutcome::classify(Ok(response(502))).is_retryable());
        assert!(RetryOutcome::classify(Err(TransportError::Timeout("slow".into()))).is_retryable());
        assert!(!RetryOutcome::classify(Ok(response(404))).is_retryable());
        assert!(!RetryOutcome::classify(Ok(response(200))).is_retryable());
    }

    #[test]
    fn test_lost_body_after_success_is_terminal() {
        let lost = |status| {
            RetryOutcome::classify(Err(TransportError::Body {
                status,
                message: "connection closed".into(),
            }))
        };

        assert!(matches!(lost(201), RetryOutcome::IncompleteResponse { status: 201, .. }));
        assert!(!lost(201).is_retryable());
        assert!(!lost(404).is_retryable());
        assert!(matches!(lost(503), RetryOutcome::TransportFailure(_)));
        assert!(lost(503).is_retryable());
    }
}
