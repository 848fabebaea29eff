//! Balance monitors: service-side alerts on balance thresholds.

use reqwest::Method;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::resources::{require, Api};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MonitorOperator {
    #[serde(rename = ">")]
    GreaterThan,
    #[serde(rename = "<")]
    LessThan,
    #[serde(rename = "=")]
    Equal,
    #[serde(rename = "!=")]
    NotEqual,
    #[serde(rename = ">=")]
    GreaterThanOrEqual,
    #[serde(rename = "<=")]
    LessThanOrEqual,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonitorCondition {
    /// Balance field to watch, e.g. "debit_balance".
    pub field: String,
    pub operator: MonitorOperator,
    pub value: i64,
    #[serde(default)]
    pub precision: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonitorData {
    pub condition: MonitorCondition,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub balance_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub call_back_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Monitor {
    #[serde(flatten)]
    pub data: MonitorData,
    pub monitor_id: String,
    #[serde(default)]
    pub created_at: String,
}

pub struct BalanceMonitors<'a> {
    api: Api<'a>,
}

impl<'a> BalanceMonitors<'a> {
    pub fn new(api: Api<'a>) -> Self {
        Self { api }
    }

    pub async fn create(&self, data: &MonitorData) -> Result<Monitor> {
        require(&data.balance_id, "balance id")?;
        self.api.call("balance-monitors", Method::POST, Some(data)).await
    }

    pub async fn get(&self, monitor_id: &str) -> Result<Monitor> {
        require(monitor_id, "monitor id")?;
        self.api.get(&format!("balance-monitors/{}", monitor_id)).await
    }

    pub async fn list(&self) -> Result<Vec<Monitor>> {
        self.api.get("balance-monitors").await
    }

    pub async fn update(&self, monitor_id: &str, data: &MonitorData) -> Result<Monitor> {
        require(monitor_id, "monitor id")?;
        self.api
            .call(&format!("balance-monitors/{}", monitor_id), Method::PUT, Some(data))
            .await
    }
}
