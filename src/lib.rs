//! Client SDK for the Blnk double-entry ledger service.
//!
//! ```no_run
//! use blnk_sdk::{BlnkClient, CreateLedgerRequest};
//!
//! # async fn run() -> blnk_sdk::Result<()> {
//! let client = BlnkClient::builder("http://localhost:5001")
//!     .api_key("my-key")
//!     .max_attempts(3)
//!     .build()?;
//!
//! let ledger = client.ledgers().create(&CreateLedgerRequest::new("Customer Savings")).await?;
//! println!("{}", ledger.ledger_id);
//! # Ok(())
//! # }
//! ```

pub mod allocation;
pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod observability;
pub mod resilience;
pub mod resources;

pub use allocation::{
    AllocationTarget, AllocationValidator, AmountComparison, Distribution, ResolvedAllocation,
    ValidationError,
};
pub use client::{BlnkClient, ClientBuilder};
pub use config::ClientConfig;
pub use error::{ClientError, Result};
pub use http::{ApiError, UploadSource};
pub use resources::ledgers::CreateLedgerRequest;
pub use resources::transactions::{CreateTransactionRequest, ParentTransaction};
