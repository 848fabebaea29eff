//! Fixed backoff between attempts.

use std::time::Duration;

use crate::resilience::retries::RetryBudget;

/// Delay to wait after the given 0-indexed attempt, or `None` when no attempt follows.
///
/// The delay is constant: no jitter, no growth.
pub fn backoff_after(budget: &RetryBudget, attempt: u32) -> Option<Duration> {
    budget
        .has_attempt_after(attempt)
        .then(|| budget.backoff_delay())
}

/// Sleep for the backoff delay. Cancelled if the awaiting future is dropped.
pub async fn wait(delay: Duration) {
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
}
