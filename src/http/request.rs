//! Request construction.
//!
//! # Responsibilities
//! - Resolve endpoint paths against the base URL
//! - Attach the API key and content type headers
//! - Encode bodies: JSON for writes, query parameters for GET, multipart for uploads
//!
//! # Design Decisions
//! - A `PreparedRequest` is an owned, cloneable value so every attempt re-sends it unchanged
//! - Multipart payloads are kept as bytes and turned into a form per attempt

use std::path::{Path, PathBuf};

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use reqwest::Method;
use serde::Serialize;
use serde_json::Value;
use url::Url;

use crate::error::{ClientError, Result};

/// Header carrying the API key.
pub const API_KEY_HEADER: &str = "x-blnk-key";

/// Body of a prepared request.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    Empty,
    Json(Vec<u8>),
    Multipart(MultipartPayload),
}

/// A single-file multipart form.
#[derive(Debug, Clone, PartialEq)]
pub struct MultipartPayload {
    pub file_field: String,
    pub file_name: String,
    pub content: Vec<u8>,
    pub fields: Vec<(String, String)>,
}

/// A fully formed request, ready to hand to a transport.
#[derive(Debug, Clone)]
pub struct PreparedRequest {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: RequestBody,
}

impl PreparedRequest {
    /// The JSON body, parsed back into a value.
    pub fn json_body(&self) -> Option<Value> {
        match &self.body {
            RequestBody::Json(bytes) => serde_json::from_slice(bytes).ok(),
            _ => None,
        }
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

/// Where an uploaded file comes from.
#[derive(Debug, Clone)]
pub enum UploadSource {
    /// Read from disk; the default file name is the path's base name.
    Path(PathBuf),
    /// In-memory content; the default file name is "upload".
    Bytes(Vec<u8>),
}

/// Builds requests against one service endpoint.
#[derive(Debug, Clone)]
pub struct RequestBuilder {
    base_url: Url,
    api_key: Option<String>,
}

impl RequestBuilder {
    /// Create a builder. A trailing `/` is added to the base path when missing.
    pub fn new(base_url: &str, api_key: Option<String>) -> Result<Self> {
        let base_url = base_url.trim();
        if base_url.is_empty() {
            return Err(ClientError::InvalidArgument("base url is required".into()));
        }

        let mut url = Url::parse(base_url)
            .map_err(|e| ClientError::InvalidArgument(format!("invalid base url {:?}: {}", base_url, e)))?;
        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }

        Ok(Self {
            base_url: url,
            api_key,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Build a request. For GET the body (if any) becomes query parameters,
    /// otherwise it is sent as JSON.
    pub fn build<B>(&self, endpoint: &str, method: Method, body: Option<&B>) -> Result<PreparedRequest>
    where
        B: Serialize + ?Sized,
    {
        let mut url = self.resolve(endpoint)?;
        let mut request_body = RequestBody::Empty;

        if let Some(body) = body {
            if method == Method::GET {
                let value = serde_json::to_value(body)
                    .map_err(|e| ClientError::RequestBuild(format!("failed to encode query: {}", e)))?;
                append_query(&mut url, query_pairs(value)?);
            } else {
                let bytes = serde_json::to_vec(body)
                    .map_err(|e| ClientError::RequestBuild(format!("failed to encode body: {}", e)))?;
                request_body = RequestBody::Json(bytes);
            }
        }

        Ok(PreparedRequest {
            method,
            url,
            headers: self.headers(true)?,
            body: request_body,
        })
    }

    /// Build a body-less request with explicit query parameters.
    pub fn build_with_query(
        &self,
        endpoint: &str,
        method: Method,
        query: &[(&str, String)],
    ) -> Result<PreparedRequest> {
        let mut url = self.resolve(endpoint)?;
        append_query(
            &mut url,
            query.iter().map(|(k, v)| (k.to_string(), v.clone())).collect(),
        );

        Ok(PreparedRequest {
            method,
            url,
            headers: self.headers(true)?,
            body: RequestBody::Empty,
        })
    }

    /// Build a multipart POST carrying one file plus text fields.
    pub fn build_upload(
        &self,
        endpoint: &str,
        file_field: &str,
        source: UploadSource,
        file_name: Option<&str>,
        fields: &[(&str, &str)],
    ) -> Result<PreparedRequest> {
        let (content, default_name) = match source {
            UploadSource::Path(path) => {
                let content = std::fs::read(&path)?;
                (content, base_name(&path))
            }
            UploadSource::Bytes(content) => (content, "upload".to_string()),
        };
        let file_name = file_name
            .filter(|n| !n.is_empty())
            .map(str::to_string)
            .unwrap_or(default_name);

        Ok(PreparedRequest {
            method: Method::POST,
            url: self.resolve(endpoint)?,
            headers: self.headers(false)?,
            body: RequestBody::Multipart(MultipartPayload {
                file_field: file_field.to_string(),
                file_name,
                content,
                fields: fields
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect(),
            }),
        })
    }

    fn resolve(&self, endpoint: &str) -> Result<Url> {
        let raw = format!("{}{}", self.base_url, endpoint.trim_start_matches('/'));
        Url::parse(&raw).map_err(|e| ClientError::RequestBuild(format!("invalid url {:?}: {}", raw, e)))
    }

    fn headers(&self, json: bool) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        if let Some(key) = &self.api_key {
            let value = HeaderValue::from_str(key)
                .map_err(|_| ClientError::RequestBuild("api key is not a valid header value".into()))?;
            headers.insert(HeaderName::from_static(API_KEY_HEADER), value);
        }
        if json {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        }
        Ok(headers)
    }
}

fn base_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "upload".to_string())
}

fn append_query(url: &mut Url, pairs: Vec<(String, String)>) {
    if !pairs.is_empty() {
        url.query_pairs_mut().extend_pairs(pairs);
    }
}

/// Flatten a serialised value into query pairs: scalars as text, arrays as
/// repeated keys, nulls skipped, nested objects as JSON text.
fn query_pairs(value: Value) -> Result<Vec<(String, String)>> {
    let Value::Object(map) = value else {
        return Err(ClientError::RequestBuild(
            "GET parameters must serialize to an object".into(),
        ));
    };

    let mut pairs = Vec::new();
    for (key, value) in map {
        match value {
            Value::Array(items) => {
                pairs.extend(items.iter().filter_map(query_text).map(|v| (key.clone(), v)));
            }
            other => {
                if let Some(text) = query_text(&other) {
                    pairs.push((key, text));
                }
            }
        }
    }
    Ok(pairs)
}

fn query_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn builder() -> RequestBuilder {
        RequestBuilder::new("http://localhost:5001/api", Some("secret".into())).unwrap()
    }

    #[test]
    fn test_base_url_gets_trailing_slash() {
        assert_eq!(builder().base_url().as_str(), "http://localhost:5001/api/");
        let b = RequestBuilder::new("http://localhost:5001", None).unwrap();
        assert_eq!(b.base_url().as_str(), "http://localhost:5001/");
    }

    #[test]
    fn test_empty_base_url_rejected() {
        assert!(matches!(
            RequestBuilder::new("", None),
            Err(ClientError::InvalidArgument(_))
        ));
        assert!(RequestBuilder::new("::nope", None).is_err());
    }

    #[test]
    fn test_post_json_body_and_headers() {
        let req = builder()
            .build("ledgers", Method::POST, Some(&json!({"name": "main"})))
            .unwrap();

        assert_eq!(req.url.as_str(), "http://localhost:5001/api/ledgers");
        assert_eq!(req.header("x-blnk-key"), Some("secret"));
        assert_eq!(req.header("content-type"), Some("application/json"));
        assert_eq!(req.json_body().unwrap(), json!({"name": "main"}));
    }

    #[test]
    fn test_no_api_key_header_when_unset() {
        let b = RequestBuilder::new("http://localhost:5001", None).unwrap();
        let req = b.build::<()>("ledgers/ldg_1", Method::GET, None).unwrap();
        assert_eq!(req.header("x-blnk-key"), None);
        assert_eq!(req.body, RequestBody::Empty);
    }

    #[test]
    fn test_get_body_becomes_query() {
        let params = json!({"page": 2, "q": "usd wallet", "tags": ["a", "b"], "skip": null});
        let req = builder().build("balances", Method::GET, Some(&params)).unwrap();

        assert_eq!(req.body, RequestBody::Empty);
        let pairs: Vec<(String, String)> = req.url.query_pairs().into_owned().collect();
        assert!(pairs.contains(&("page".into(), "2".into())));
        assert!(pairs.contains(&("q".into(), "usd wallet".into())));
        assert!(pairs.contains(&("tags".into(), "a".into())));
        assert!(pairs.contains(&("tags".into(), "b".into())));
        assert!(!pairs.iter().any(|(k, _)| k == "skip"));
    }

    #[test]
    fn test_get_with_scalar_body_rejected() {
        let err = builder().build("balances", Method::GET, Some(&5)).unwrap_err();
        assert!(matches!(err, ClientError::RequestBuild(_)));
    }

    #[test]
    fn test_explicit_query_is_encoded() {
        let req = builder()
            .build_with_query(
                "balances/bln_1/at",
                Method::GET,
                &[("timestamp", "2025-08-30T01:38:30+03:00".to_string())],
            )
            .unwrap();
        assert_eq!(
            req.url.as_str(),
            "http://localhost:5001/api/balances/bln_1/at?timestamp=2025-08-30T01%3A38%3A30%2B03%3A00"
        );
    }

    #[test]
    fn test_upload_from_bytes() {
        let req = builder()
            .build_upload(
                "reconciliation/upload",
                "file",
                UploadSource::Bytes(b"id,amount\n1,10\n".to_vec()),
                None,
                &[("source", "stripe")],
            )
            .unwrap();

        assert_eq!(req.method, Method::POST);
        assert_eq!(req.header("content-type"), None);
        assert_eq!(req.header("x-blnk-key"), Some("secret"));
        let RequestBody::Multipart(form) = &req.body else {
            panic!("expected multipart body");
        };
        assert_eq!(form.file_field, "file");
        assert_eq!(form.file_name, "upload");
        assert_eq!(form.fields, vec![("source".to_string(), "stripe".to_string())]);
    }

    #[test]
    fn test_upload_from_path_uses_base_name() {
        let path = std::env::temp_dir().join(format!("blnk-upload-{}.csv", std::process::id()));
        std::fs::write(&path, b"id,amount\n").unwrap();

        let req = builder()
            .build_upload("reconciliation/upload", "file", UploadSource::Path(path.clone()), None, &[])
            .unwrap();
        let RequestBody::Multipart(form) = &req.body else {
            panic!("expected multipart body");
        };
        assert_eq!(form.file_name, path.file_name().unwrap().to_string_lossy());
        assert_eq!(form.content, b"id,amount\n");

        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_upload_missing_file_is_io_error() {
        let err = builder()
            .build_upload(
                "reconciliation/upload",
                "file",
                UploadSource::Path("/no/such/file.csv".into()),
                None,
                &[],
            )
            .unwrap_err();
        assert!(matches!(err, ClientError::Io(_)));
    }
}
