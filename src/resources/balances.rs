//! Ledger balances, including point-in-time lookups.
//!
//! Balance figures are arbitrary-precision decimals; the service may send
//! them as JSON numbers or strings.

use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::Method;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::resources::{require, Api, MetaData};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Balance {
    pub balance_id: String,
    pub balance: Decimal,
    pub version: i64,
    pub inflight_balance: Decimal,
    pub credit_balance: Decimal,
    pub inflight_credit_balance: Decimal,
    pub debit_balance: Decimal,
    pub inflight_debit_balance: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub queued_debit_balance: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub queued_credit_balance: Option<Decimal>,
    pub currency_multiplier: f64,
    pub precision: i64,
    pub ledger_id: String,
    pub identity_id: String,
    pub indicator: String,
    pub currency: String,
    pub created_at: Option<DateTime<Utc>>,
    pub inflight_expires_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta_data: Option<MetaData>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CreateBalanceRequest {
    pub ledger_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identity_id: Option<String>,
    pub currency: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta_data: Option<MetaData>,
}

/// Balance figures as of a past instant.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BalanceSnapshot {
    pub balance: Decimal,
    pub balance_id: String,
    pub credit_balance: Decimal,
    pub currency: String,
    pub debit_balance: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoricalBalance {
    pub balance: BalanceSnapshot,
    #[serde(default)]
    pub from_source: bool,
    pub timestamp: DateTime<Utc>,
}

pub struct Balances<'a> {
    api: Api<'a>,
}

impl<'a> Balances<'a> {
    pub fn new(api: Api<'a>) -> Self {
        Self { api }
    }

    pub async fn create(&self, request: &CreateBalanceRequest) -> Result<Balance> {
        require(&request.ledger_id, "ledger id")?;
        self.api.call("balances", Method::POST, Some(request)).await
    }

    pub async fn get(&self, balance_id: &str) -> Result<Balance> {
        require(balance_id, "balance id")?;
        self.api.get(&format!("balances/{}", balance_id)).await
    }

    pub async fn get_by_indicator(&self, indicator: &str, currency: &str) -> Result<Balance> {
        require(indicator, "indicator")?;
        require(currency, "currency")?;
        self.api
            .get(&format!("balances/indicator/{}/currency/{}", indicator, currency))
            .await
    }

    /// The balance as it stood at `timestamp`. With `from_source`, the service
    /// recomputes it from transactions instead of snapshots.
    pub async fn get_historical(
        &self,
        balance_id: &str,
        timestamp: DateTime<Utc>,
        from_source: bool,
    ) -> Result<HistoricalBalance> {
        require(balance_id, "balance id")?;

        let mut query = vec![(
            "timestamp",
            timestamp.to_rfc3339_opts(SecondsFormat::Secs, true),
        )];
        if from_source {
            query.push(("from_source", "true".to_string()));
        }

        let request = self.api.requests().build_with_query(
            &format!("balances/{}/at", balance_id),
            Method::GET,
            &query,
        )?;
        self.api.execute(&request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::str::FromStr;

    #[test]
    fn test_balance_accepts_large_numbers_and_strings() {
        let balance: Balance = serde_json::from_value(json!({
            "balance_id": "bln_1",
            "balance": "123456789012345678901234567",
            "credit_balance": 5000,
            "debit_balance": 0,
            "currency": "USD",
            "precision": 100,
            "ledger_id": "ldg_1",
            "indicator": "@World",
            "created_at": "2024-11-26T09:35:40.962Z",
            "inflight_expires_at": "0001-01-01T00:00:00Z"
        }))
        .unwrap();

        assert_eq!(
            balance.balance,
            Decimal::from_str("123456789012345678901234567").unwrap()
        );
        assert_eq!(balance.credit_balance, Decimal::from(5000));
        assert_eq!(balance.queued_debit_balance, None);
        assert_eq!(balance.indicator, "@World");
    }

    #[test]
    fn test_create_request_shape() {
        let body = serde_json::to_value(CreateBalanceRequest {
            ledger_id: "ldg_1".into(),
            currency: "USD".into(),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(body, json!({"ledger_id": "ldg_1", "currency": "USD"}));
    }

    #[test]
    fn test_historical_decodes() {
        let historical: HistoricalBalance = serde_json::from_value(json!({
            "balance": {
                "balance": 1500,
                "balance_id": "bln_1",
                "credit_balance": 2000,
                "currency": "USD",
                "debit_balance": 500
            },
            "from_source": true,
            "timestamp": "2025-08-30T01:38:30Z"
        }))
        .unwrap();
        assert!(historical.from_source);
        assert_eq!(historical.balance.balance, Decimal::from(1500));
    }
}
