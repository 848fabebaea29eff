//! Transactions.
//!
//! `create` runs the allocation validator first and refuses to send a
//! transfer whose counterparties or shares do not add up.

use std::fmt;

use chrono::{DateTime, Utc};
use reqwest::Method;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::allocation::{AllocationTarget, AllocationValidator, SideSpec, TransferIntent};
use crate::error::Result;
use crate::resources::{require, Api, MetaData};

/// Lifecycle state reported by the service.
///
/// States this client does not know are kept verbatim in `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TransactionStatus {
    Queued,
    Applied,
    Rejected,
    Commit,
    Void,
    Inflight,
    Expired,
    #[serde(untagged)]
    Other(String),
}

impl TransactionStatus {
    pub fn as_str(&self) -> &str {
        match self {
            TransactionStatus::Queued => "QUEUED",
            TransactionStatus::Applied => "APPLIED",
            TransactionStatus::Rejected => "REJECTED",
            TransactionStatus::Commit => "COMMIT",
            TransactionStatus::Void => "VOID",
            TransactionStatus::Inflight => "INFLIGHT",
            TransactionStatus::Expired => "EXPIRED",
            TransactionStatus::Other(status) => status.as_str(),
        }
    }
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resolution of an inflight transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InflightStatus {
    Commit,
    Void,
}

impl fmt::Display for InflightStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InflightStatus::Commit => write!(f, "commit"),
            InflightStatus::Void => write!(f, "void"),
        }
    }
}

/// Fields shared by transaction requests and responses.
///
/// Either `source` or `sources` names the debited side, and either
/// `destination` or `destinations` the credited side, never both.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParentTransaction {
    pub amount: f64,
    pub reference: String,
    pub precision: i64,
    pub description: String,
    pub currency: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub sources: Vec<AllocationTarget>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub destinations: Vec<AllocationTarget>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rate: Option<f64>,
    #[serde(skip_serializing_if = "is_blank")]
    pub source: Option<String>,
    #[serde(skip_serializing_if = "is_blank")]
    pub destination: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub precise_amount: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<TransactionStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta_data: Option<MetaData>,
}

/// An empty counterparty is the same as none, both to the validator and on the wire.
fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().map_or(true, str::is_empty)
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CreateTransactionRequest {
    #[serde(flatten)]
    pub transaction: ParentTransaction,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub inflight: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inflight_expiry_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheduled_for: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub allow_overdraft: bool,
}

impl CreateTransactionRequest {
    /// The validator's view of this request.
    pub fn intent(&self) -> TransferIntent<'_> {
        let tx = &self.transaction;
        TransferIntent {
            amount: tx.amount,
            precision: tx.precision,
            source: SideSpec {
                single: tx.source.as_deref(),
                multiple: &tx.sources,
            },
            destination: SideSpec {
                single: tx.destination.as_deref(),
                multiple: &tx.destinations,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    #[serde(flatten)]
    pub transaction: ParentTransaction,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    pub transaction_id: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateStatus {
    pub status: InflightStatus,
}

pub struct Transactions<'a> {
    api: Api<'a>,
    validator: &'a AllocationValidator,
}

impl<'a> Transactions<'a> {
    pub fn new(api: Api<'a>, validator: &'a AllocationValidator) -> Self {
        Self { api, validator }
    }

    /// Record a transfer. Rejected locally, with no request sent, if the
    /// allocation is invalid.
    pub async fn create(&self, request: &CreateTransactionRequest) -> Result<Transaction> {
        self.validator.validate(&request.intent())?;
        self.api.call("transactions", Method::POST, Some(request)).await
    }

    pub async fn get(&self, transaction_id: &str) -> Result<Transaction> {
        require(transaction_id, "transaction id")?;
        self.api.get(&format!("transactions/{}", transaction_id)).await
    }

    /// Commit or void an inflight transaction.
    pub async fn update_inflight(&self, transaction_id: &str, status: InflightStatus) -> Result<Transaction> {
        require(transaction_id, "transaction id")?;
        self.api
            .call(
                &format!("transactions/inflight/{}", transaction_id),
                Method::PUT,
                Some(&UpdateStatus { status }),
            )
            .await
    }

    pub async fn refund(&self, transaction_id: &str) -> Result<Transaction> {
        require(transaction_id, "transaction id")?;
        self.api
            .call::<(), _>(&format!("refund-transaction/{}", transaction_id), Method::POST, None)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::allocation::{ResolvedSide, ValidationErrorKind};
    use serde_json::json;

    fn split_request() -> CreateTransactionRequest {
        CreateTransactionRequest {
            transaction: ParentTransaction {
                amount: 30000.0,
                reference: "ref_001".into(),
                precision: 100,
                currency: "USD".into(),
                sources: vec![
                    AllocationTarget::new("@bank-account", "2000.00"),
                    AllocationTarget::new("@visa-account", "50%"),
                    AllocationTarget::new("@master-account", "left"),
                ],
                destination: Some("bln_0dde".into()),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_intent_resolves_split_sources() {
        let request = split_request();
        let resolved = AllocationValidator::new().validate(&request.intent()).unwrap();

        let ResolvedSide::Split(shares) = &resolved.source else {
            panic!("expected split source");
        };
        assert_eq!(shares[0].share, 2000.0);
        assert_eq!(shares[1].share, 15000.0);
        assert_eq!(shares[2].share, 13000.0);
        assert_eq!(resolved.destination.share_of("bln_0dde"), Some(30000.0));
    }

    #[test]
    fn test_intent_flags_both_forms() {
        let mut request = split_request();
        request.transaction.source = Some("@world".into());
        let err = AllocationValidator::new().validate(&request.intent()).unwrap_err();
        assert_eq!(err.kind(), ValidationErrorKind::AmbiguousTargetForm);
    }

    #[test]
    fn test_request_serialization() {
        let mut request = split_request();
        request.inflight = true;
        let body = serde_json::to_value(&request).unwrap();

        assert_eq!(body["amount"], json!(30000.0));
        assert_eq!(body["inflight"], json!(true));
        assert!(body.get("allow_overdraft").is_none());
        assert!(body.get("source").is_none());
        assert!(body.get("destinations").is_none());
        assert_eq!(
            body["sources"][1],
            json!({"identifier": "@visa-account", "distribution": "50%"})
        );
    }

    #[test]
    fn test_transaction_decodes() {
        let tx: Transaction = serde_json::from_value(json!({
            "transaction_id": "txn_1",
            "amount": 750,
            "precise_amount": 75000,
            "precision": 100,
            "reference": "ref_002",
            "currency": "USD",
            "source": "@World",
            "destination": "bln_1",
            "status": "QUEUED",
            "created_at": "2024-02-20T05:28:03.978Z"
        }))
        .unwrap();
        assert_eq!(tx.transaction.amount, 750.0);
        assert_eq!(tx.transaction.precise_amount, Some(Decimal::from(75000)));
        assert_eq!(tx.transaction.status, Some(TransactionStatus::Queued));
    }

    #[test]
    fn test_unknown_status_is_kept() {
        let tx: Transaction = serde_json::from_value(json!({
            "transaction_id": "txn_1",
            "amount": 750,
            "status": "SCHEDULED"
        }))
        .unwrap();
        let status = tx.transaction.status.unwrap();
        assert_eq!(status, TransactionStatus::Other("SCHEDULED".into()));
        assert_eq!(status.to_string(), "SCHEDULED");
        assert_eq!(serde_json::to_value(&status).unwrap(), json!("SCHEDULED"));
        assert_eq!(serde_json::to_value(TransactionStatus::Applied).unwrap(), json!("APPLIED"));
    }

    #[test]
    fn test_empty_single_target_not_sent() {
        let mut request = split_request();
        request.transaction.source = Some(String::new());
        AllocationValidator::new().validate(&request.intent()).unwrap();

        let body = serde_json::to_value(&request).unwrap();
        assert!(body.get("source").is_none());
        assert_eq!(body["sources"].as_array().unwrap().len(), 3);
        assert_eq!(body["destination"], json!("bln_0dde"));

        request.transaction.destination = Some(String::new());
        request.transaction.destinations = vec![AllocationTarget::new("bln_0dde", "100%")];
        let body = serde_json::to_value(&request).unwrap();
        assert!(body.get("destination").is_none());
    }

    #[test]
    fn test_inflight_status_wire_format() {
        let body = serde_json::to_value(UpdateStatus {
            status: InflightStatus::Commit,
        })
        .unwrap();
        assert_eq!(body, json!({"status": "commit"}));
    }
}
