//! Timeout enforcement.
//!
//! # Responsibilities
//! - Bound a single attempt with an optional deadline
//!
//! # Design Decisions
//! - Uses Tokio's timeout facilities
//! - A timed-out attempt is a transport failure, retryable like any other

use std::future::Future;
use std::time::Duration;

use crate::http::transport::TransportError;

/// Run `attempt`, failing with [`TransportError::Timeout`] if it exceeds `limit`.
pub async fn within<F, T>(limit: Option<Duration>, attempt: F) -> Result<T, TransportError>
where
    F: Future<Output = Result<T, TransportError>>,
{
    match limit {
        None => attempt.await,
        Some(limit) => match tokio::time::timeout(limit, attempt).await {
            Ok(result) => result,
            Err(_) => Err(TransportError::Timeout(format!(
                "attempt exceeded {}ms",
                limit.as_millis()
            ))),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_within_limit() {
        let result = within(Some(Duration::from_secs(1)), async { Ok::<_, TransportError>(7) }).await;
        assert_eq!(result.unwrap(), 7);
    }

    #[tokio::test]
    async fn test_exceeding_limit_is_timeout() {
        let result = within(Some(Duration::from_millis(10)), async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok::<_, TransportError>(())
        })
        .await;
        assert!(matches!(result, Err(TransportError::Timeout(_))));
    }

    #[tokio::test]
    async fn test_no_limit_passes_errors_through() {
        let result: Result<(), _> =
            within(None, async { Err(TransportError::Connect("refused".into())) }).await;
        assert!(matches!(result, Err(TransportError::Connect(_))));
    }
}
