//! HTTP subsystem.
//!
//! # Data Flow
//! ```text
//! Service call
//!     → request.rs (resolve endpoint, headers, encode body)
//!     → executor.rs (attempt loop under the retry budget)
//!     → transport.rs (one exchange through reqwest)
//!     → response.rs (status classification, 4xx as ApiError)
//!     → executor.rs (decode body once)
//! ```

pub mod executor;
pub mod request;
pub mod response;
pub mod transport;

pub use executor::RequestExecutor;
pub use request::{PreparedRequest, RequestBody, RequestBuilder, UploadSource};
pub use response::{ApiError, RawResponse};
pub use transport::{ReqwestTransport, Transport, TransportError};
