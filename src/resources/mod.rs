//! Ledger service resources.
//!
//! # Data Flow
//! ```text
//! client.transactions().create(req)
//!     → argument checks (required ids, allocation, identity rules)
//!     → RequestBuilder (endpoint, body, headers)
//!     → RequestExecutor (retry loop, decode)
//!     → typed response
//! ```
//!
//! # Design Decisions
//! - Services are short-lived borrows of the client's builder and executor
//! - Every check that can fail locally runs before a request is built

use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{ClientError, Result};
use crate::http::{PreparedRequest, RequestBuilder, RequestExecutor};

pub mod balance_monitors;
pub mod balances;
pub mod identities;
pub mod ledgers;
pub mod metadata;
pub mod reconciliation;
pub mod search;
pub mod transactions;

pub use balance_monitors::BalanceMonitors;
pub use balances::Balances;
pub use identities::Identities;
pub use ledgers::Ledgers;
pub use metadata::MetadataService;
pub use reconciliation::Reconciliation;
pub use search::Search;
pub use transactions::Transactions;

/// Free-form metadata attached to ledger entities.
pub type MetaData = Map<String, Value>;

/// The two capabilities every service needs.
#[derive(Debug, Clone, Copy)]
pub struct Api<'a> {
    requests: &'a RequestBuilder,
    executor: &'a RequestExecutor,
}

impl<'a> Api<'a> {
    pub fn new(requests: &'a RequestBuilder, executor: &'a RequestExecutor) -> Self {
        Self { requests, executor }
    }

    pub fn requests(&self) -> &'a RequestBuilder {
        self.requests
    }

    /// Build and execute a request with an optional body.
    pub async fn call<B, T>(&self, endpoint: &str, method: Method, body: Option<&B>) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = self.requests.build(endpoint, method, body)?;
        self.executor.execute(&request).await
    }

    /// GET without parameters.
    pub async fn get<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T> {
        self.call::<(), T>(endpoint, Method::GET, None).await
    }

    pub async fn execute<T: DeserializeOwned>(&self, request: &PreparedRequest) -> Result<T> {
        self.executor.execute(request).await
    }
}

/// Fail with `InvalidArgument` when a required value is empty.
pub(crate) fn require(value: &str, name: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(ClientError::InvalidArgument(format!("{} is required", name)));
    }
    Ok(())
}
