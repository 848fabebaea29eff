//! Transport seam.
//!
//! # Responsibilities
//! - Perform one HTTP exchange and read the full body
//! - Map connection and timeout failures to [`TransportError`]
//! - Keep the status when the body cannot be read, so a success is never mistaken for a lost request
//!
//! # Design Decisions
//! - The executor only sees the [`Transport`] trait, so tests swap in scripted transports
//! - The reqwest request is rebuilt for each attempt from the owned [`PreparedRequest`]

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use thiserror::Error;

use crate::config::TimeoutConfig;
use crate::http::request::{PreparedRequest, RequestBody};
use crate::http::response::{status_line, RawResponse};

/// Failure before a complete response was received.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("connection failed: {0}")]
    Connect(String),

    #[error("request timed out: {0}")]
    Timeout(String),

    #[error("transport error: {0}")]
    Other(String),

    /// The status line arrived but the body could not be read in full.
    #[error("failed to read body of {status} response: {message}")]
    Body { status: u16, message: String },
}

impl TransportError {
    /// Status of the response whose body was lost, if one arrived.
    pub fn response_status(&self) -> Option<u16> {
        match self {
            TransportError::Body { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            TransportError::Timeout(err.to_string())
        } else if err.is_connect() {
            TransportError::Connect(err.to_string())
        } else {
            TransportError::Other(err.to_string())
        }
    }
}

/// Sends a prepared request and returns the response with its body read.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: &PreparedRequest) -> Result<RawResponse, TransportError>;
}

/// Transport backed by a shared `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(timeouts: &TimeoutConfig) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .timeout(timeouts.request())
            .connect_timeout(timeouts.connect())
            .build()
            .map_err(|e| TransportError::Other(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self { client })
    }

    pub fn from_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: &PreparedRequest) -> Result<RawResponse, TransportError> {
        let mut builder = self
            .client
            .request(request.method.clone(), request.url.clone())
            .headers(request.headers.clone());

        builder = match &request.body {
            RequestBody::Empty => builder,
            RequestBody::Json(bytes) => builder.body(bytes.clone()),
            RequestBody::Multipart(payload) => {
                let mut form = Form::new().part(
                    payload.file_field.clone(),
                    Part::bytes(payload.content.clone()).file_name(payload.file_name.clone()),
                );
                for (name, value) in &payload.fields {
                    form = form.text(name.clone(), value.clone());
                }
                builder.multipart(form)
            }
        };

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let headers = response.headers().clone();
        let body = response.bytes().await.map_err(|e| TransportError::Body {
            status,
            message: e.to_string(),
        })?;

        Ok(RawResponse {
            status,
            status_text: status_line(status),
            headers,
            body: body.to_vec(),
        })
    }
}
