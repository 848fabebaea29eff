//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! allocation validator, request executor produce:
//!     → tracing events (retry transitions, rejections, terminal failures)
//!     → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → logging.rs subscriber (stdout, human or JSON)
//!     → whatever metrics recorder the application installs
//! ```
//!
//! # Design Decisions
//! - Structured logging for machine parsing
//! - Every retry transition is logged; logging is never correctness-relevant
//! - Metrics are cheap and optional

pub mod logging;
pub mod metrics;
