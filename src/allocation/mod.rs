//! Multi-party allocation subsystem.
//!
//! # Data Flow
//! ```text
//! CreateTransactionRequest
//!     → TransferIntent (borrowed view: amount, precision, both sides)
//!     → validator.rs (target form, amount sign, per-side share resolution)
//!         → distribution.rs (classify "5.5%" / "2000.00" / "left")
//!     → ResolvedAllocation or ValidationError
//! ```
//!
//! # Design Decisions
//! - Runs before any request is built; a rejected transfer never reaches the network
//! - First violation wins, in a fixed order, so errors are deterministic
//! - Pure computation, no partial results escape on failure
//! - Distribution patterns are compiled once per process

pub mod distribution;
pub mod error;
pub mod validator;

pub use distribution::{Distribution, DistributionKind};
pub use error::{Side, ValidationError, ValidationErrorKind};
pub use validator::{
    AllocationTarget, AllocationValidator, AmountComparison, ResolvedAllocation, ResolvedShare,
    ResolvedSide, SideSpec, TransferIntent,
};
