//! Reconciliation against external records.
//!
//! # Data Flow
//! ```text
//! upload(source, file)          → upload_id
//! create_matching_rule(matcher) → rule_id
//! run(upload_id, rule_ids)      → reconciliation run
//! ```

use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::Result;
use crate::http::UploadSource;
use crate::resources::{require, Api};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReconciliationOperator {
    Equals,
    GreaterThan,
    LessThan,
    Contains,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReconciliationStrategy {
    OneToOne,
    OneToMany,
    ManyToOne,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadResponse {
    pub upload_id: String,
    #[serde(default)]
    pub record_count: u64,
    #[serde(default)]
    pub source: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Criteria {
    /// Record field compared, e.g. "amount" or "reference".
    pub field: String,
    pub operator: ReconciliationOperator,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allowable_drift: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Matcher {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub criteria: Vec<Criteria>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchingRule {
    #[serde(flatten)]
    pub matcher: Matcher,
    pub rule_id: String,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReconciliation {
    pub upload_id: String,
    pub strategy: ReconciliationStrategy,
    #[serde(default)]
    pub dry_run: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grouping_criteria: Option<String>,
    pub matching_rule_ids: Vec<String>,
}

/// Acknowledgement of a started run; fields beyond the id vary by service version.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReconciliationRun {
    #[serde(default)]
    pub reconciliation_id: String,
    #[serde(flatten)]
    pub details: Map<String, Value>,
}

pub struct Reconciliation<'a> {
    api: Api<'a>,
}

impl<'a> Reconciliation<'a> {
    pub fn new(api: Api<'a>) -> Self {
        Self { api }
    }

    /// Upload external records. The file goes in the `file` form field and
    /// `source` names where the records came from.
    pub async fn upload(
        &self,
        source: &str,
        file: UploadSource,
        file_name: Option<&str>,
    ) -> Result<UploadResponse> {
        require(source, "source")?;
        let request = self.api.requests().build_upload(
            "reconciliation/upload",
            "file",
            file,
            file_name,
            &[("source", source)],
        )?;
        self.api.execute(&request).await
    }

    pub async fn create_matching_rule(&self, matcher: &Matcher) -> Result<MatchingRule> {
        require(&matcher.name, "matching rule name")?;
        self.api
            .call("reconciliation/matching-rules", Method::POST, Some(matcher))
            .await
    }

    pub async fn run(&self, data: &RunReconciliation) -> Result<ReconciliationRun> {
        require(&data.upload_id, "upload id")?;
        self.api.call("reconciliation/start", Method::POST, Some(data)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_run_request_shape() {
        let body = serde_json::to_value(RunReconciliation {
            upload_id: "upl_1".into(),
            strategy: ReconciliationStrategy::OneToMany,
            dry_run: true,
            grouping_criteria: None,
            matching_rule_ids: vec!["rule_1".into()],
        })
        .unwrap();
        assert_eq!(
            body,
            json!({
                "upload_id": "upl_1",
                "strategy": "one_to_many",
                "dry_run": true,
                "matching_rule_ids": ["rule_1"]
            })
        );
    }

    #[test]
    fn test_matching_rule_decodes() {
        let rule: MatchingRule = serde_json::from_value(json!({
            "rule_id": "rule_1",
            "name": "Matching Rule",
            "description": "",
            "criteria": [{"field": "amount", "operator": "equals", "allowable_drift": 0.1}],
            "created_at": "2024-02-20T05:28:03Z",
            "updated_at": "2024-02-20T05:28:03Z"
        }))
        .unwrap();
        assert_eq!(rule.matcher.criteria[0].operator, ReconciliationOperator::Equals);
        assert_eq!(rule.matcher.criteria[0].allowable_drift, Some(0.1));
    }

    #[test]
    fn test_run_response_keeps_details() {
        let run: ReconciliationRun =
            serde_json::from_value(json!({"reconciliation_id": "rec_1", "status": "started"})).unwrap();
        assert_eq!(run.reconciliation_id, "rec_1");
        assert_eq!(run.details["status"], "started");
    }
}
