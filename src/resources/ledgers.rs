//! Ledgers.

use chrono::{DateTime, Utc};
use reqwest::Method;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::resources::{require, Api, MetaData};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ledger {
    pub ledger_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta_data: Option<MetaData>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CreateLedgerRequest {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta_data: Option<MetaData>,
}

impl CreateLedgerRequest {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            meta_data: None,
        }
    }
}

pub struct Ledgers<'a> {
    api: Api<'a>,
}

impl<'a> Ledgers<'a> {
    pub fn new(api: Api<'a>) -> Self {
        Self { api }
    }

    pub async fn create(&self, request: &CreateLedgerRequest) -> Result<Ledger> {
        self.api.call("ledgers", Method::POST, Some(request)).await
    }

    pub async fn get(&self, ledger_id: &str) -> Result<Ledger> {
        require(ledger_id, "ledger id")?;
        self.api.get(&format!("ledgers/{}", ledger_id)).await
    }
}
