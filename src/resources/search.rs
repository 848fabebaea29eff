//! Full-text search over ledger resources.

use std::fmt;

use chrono::{DateTime, TimeZone, Utc};
use reqwest::Method;
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

use crate::error::Result;
use crate::resources::Api;

/// Searchable collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceType {
    Ledgers,
    Balances,
    Transactions,
    Identities,
}

impl ResourceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceType::Ledgers => "ledgers",
            ResourceType::Balances => "balances",
            ResourceType::Transactions => "transactions",
            ResourceType::Identities => "identities",
        }
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ResourceType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "ledgers" => Ok(ResourceType::Ledgers),
            "balances" => Ok(ResourceType::Balances),
            "transactions" => Ok(ResourceType::Transactions),
            "identities" => Ok(ResourceType::Identities),
            other => Err(format!("unknown resource type: {}", other)),
        }
    }
}

/// A timestamp the search index may store as Unix seconds or RFC3339 text.
/// Always serialised back as Unix seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlexibleTime(pub DateTime<Utc>);

impl FlexibleTime {
    fn from_unix(seconds: i64) -> Option<Self> {
        Utc.timestamp_opt(seconds, 0).single().map(FlexibleTime)
    }
}

impl Serialize for FlexibleTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_i64(self.0.timestamp())
    }
}

impl<'de> Deserialize<'de> for FlexibleTime {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        let parsed = match &value {
            Value::Number(n) => n.as_i64().and_then(FlexibleTime::from_unix),
            Value::String(s) if !s.is_empty() => DateTime::parse_from_rfc3339(s)
                .map(|t| FlexibleTime(t.with_timezone(&Utc)))
                .ok()
                .or_else(|| s.parse::<i64>().ok().and_then(FlexibleTime::from_unix)),
            _ => None,
        };
        parsed.ok_or_else(|| de::Error::custom(format!("cannot parse time from: {}", value)))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchParams {
    pub q: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub per_page: Option<u32>,
}

impl SearchParams {
    pub fn query(q: impl Into<String>) -> Self {
        Self {
            q: q.into(),
            ..Self::default()
        }
    }
}

/// An indexed document. Which fields are present depends on the collection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchDocument {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<FlexibleTime>,
    /// Stored as a map or as encoded text, depending on the collection.
    pub meta_data: Value,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub balance_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub balance: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credit_balance: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub debit_balance: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub precision: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ledger_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount_string: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub precise_amount: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rate: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub destination: Option<String>,
    #[serde(skip_serializing_if = "Value::is_null")]
    pub sources: Value,
    #[serde(skip_serializing_if = "Value::is_null")]
    pub destinations: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_transaction: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hash: Option<String>,
    pub atomic: bool,
    pub inflight: bool,
    pub allow_overdraft: bool,
    pub skip_queue: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overdraft_limit: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheduled_for: Option<FlexibleTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inflight_expiry_date: Option<FlexibleTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub effective_date: Option<FlexibleTime>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub document: SearchDocument,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchResponse {
    pub found: u64,
    pub out_of: u64,
    pub page: u32,
    pub request_params: Value,
    pub search_time_ms: u64,
    pub hits: Vec<SearchHit>,
}

pub struct Search<'a> {
    api: Api<'a>,
}

impl<'a> Search<'a> {
    pub fn new(api: Api<'a>) -> Self {
        Self { api }
    }

    pub async fn search(&self, resource: ResourceType, params: &SearchParams) -> Result<SearchResponse> {
        self.api
            .call(&format!("search/{}", resource), Method::POST, Some(params))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_flexible_time_accepts_all_forms() {
        let expected = Utc.with_ymd_and_hms(2024, 2, 20, 5, 28, 3).unwrap();
        for raw in [json!(1708406883), json!("1708406883"), json!("2024-02-20T05:28:03Z")] {
            let parsed: FlexibleTime = serde_json::from_value(raw).unwrap();
            assert_eq!(parsed.0, expected);
        }
    }

    #[test]
    fn test_flexible_time_rejects_garbage() {
        assert!(serde_json::from_value::<FlexibleTime>(json!("")).is_err());
        assert!(serde_json::from_value::<FlexibleTime>(json!("yesterday")).is_err());
        assert!(serde_json::from_value::<FlexibleTime>(json!(null)).is_err());
    }

    #[test]
    fn test_flexible_time_serializes_as_unix() {
        let t = FlexibleTime(Utc.with_ymd_and_hms(2024, 2, 20, 5, 28, 3).unwrap());
        assert_eq!(serde_json::to_value(t).unwrap(), json!(1708406883));
    }

    #[test]
    fn test_search_response_decodes_mixed_documents() {
        let response: SearchResponse = serde_json::from_value(json!({
            "found": 2,
            "out_of": 10,
            "page": 1,
            "request_params": {"q": "USD", "per_page": 10},
            "search_time_ms": 3,
            "hits": [
                {"document": {"balance_id": "bln_1", "currency": "USD", "created_at": 1708406883, "meta_data": "{}"}},
                {"document": {"transaction_id": "txn_1", "amount": 10.5, "created_at": "2024-02-20T05:28:03Z",
                              "meta_data": {"k": "v"}, "scheduled_for": "0"}}
            ]
        }))
        .unwrap();

        assert_eq!(response.found, 2);
        assert_eq!(response.hits[0].document.balance_id.as_deref(), Some("bln_1"));
        assert_eq!(response.hits[1].document.amount, Some(10.5));
        assert_eq!(response.hits[1].document.meta_data["k"], "v");
    }

    #[test]
    fn test_params_skip_unset() {
        let body = serde_json::to_value(SearchParams::query("USD")).unwrap();
        assert_eq!(body, json!({"q": "USD"}));
    }
}
