//! Metadata updates for any entity (ledger, balance, transaction, identity).

use reqwest::Method;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::resources::{require, Api, MetaData};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateMetadataRequest {
    pub meta_data: MetaData,
}

/// Metadata after the update, as merged by the service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    #[serde(default)]
    pub metadata: MetaData,
}

pub struct MetadataService<'a> {
    api: Api<'a>,
}

impl<'a> MetadataService<'a> {
    pub fn new(api: Api<'a>) -> Self {
        Self { api }
    }

    pub async fn update(&self, entity_id: &str, meta_data: MetaData) -> Result<Metadata> {
        require(entity_id, "entity id")?;
        self.api
            .call(
                &format!("{}/metadata", entity_id),
                Method::POST,
                Some(&UpdateMetadataRequest { meta_data }),
            )
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_wraps_metadata() {
        let mut meta = MetaData::new();
        meta.insert("tier".into(), json!("gold"));
        let body = serde_json::to_value(UpdateMetadataRequest { meta_data: meta }).unwrap();
        assert_eq!(body, json!({"meta_data": {"tier": "gold"}}));
    }
}
