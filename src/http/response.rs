//! Raw responses and service-reported client errors.

use reqwest::header::HeaderMap;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use thiserror::Error;

/// A response as received from the transport, body fully read.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: u16,
    /// Status line, e.g. "404 Not Found".
    pub status_text: String,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl RawResponse {
    pub fn new(status: u16, body: Vec<u8>) -> Self {
        Self {
            status,
            status_text: status_line(status),
            headers: HeaderMap::new(),
            body,
        }
    }

    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }
}

/// "<code> <canonical reason>", or just the code for unregistered statuses.
pub fn status_line(status: u16) -> String {
    match StatusCode::from_u16(status).ok().and_then(|s| s.canonical_reason()) {
        Some(reason) => format!("{} {}", status, reason),
        None => status.to_string(),
    }
}

/// A 4xx response, surfaced verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Status: {status}, Message: {status_text}, Body: {}", String::from_utf8_lossy(.body))]
pub struct ApiError {
    pub status: u16,
    pub status_text: String,
    pub body: Vec<u8>,
}

impl ApiError {
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Parse the body as JSON, if it is JSON.
    pub fn json(&self) -> Option<serde_json::Value> {
        serde_json::from_slice(&self.body).ok()
    }

    pub fn is_not_found(&self) -> bool {
        self.status == 404
    }
}

impl From<RawResponse> for ApiError {
    fn from(response: RawResponse) -> Self {
        Self {
            status: response.status,
            status_text: response.status_text,
            body: response.body,
        }
    }
}
