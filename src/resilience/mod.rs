//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Request to the ledger service:
//!     → timeouts.rs (bound each attempt)
//!     → retries.rs (classify outcome: success / transport / 5xx / 4xx)
//!     → On retryable failure: backoff.rs (fixed delay), next attempt
//! ```
//!
//! # Design Decisions
//! - Every attempt has a deadline
//! - Retry only infrastructure-looking failures; client errors fail fast
//! - Never re-send after a successful status, whatever the body looks like
//! - The retry budget is fixed when the client is built

pub mod backoff;
pub mod retries;
pub mod timeouts;

pub use retries::{RetryBudget, RetryOutcome};
