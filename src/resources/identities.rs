//! Identities: the people and organisations that own balances.

use std::fmt;

use chrono::{DateTime, Utc};
use reqwest::Method;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::Result;
use crate::resources::{require, Api, MetaData};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdentityType {
    Individual,
    Organization,
}

impl fmt::Display for IdentityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IdentityType::Individual => write!(f, "individual"),
            IdentityType::Organization => write!(f, "organization"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Identity {
    pub identity_type: IdentityType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub other_names: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dob: Option<DateTime<Utc>>,
    #[serde(default)]
    pub email_address: String,
    #[serde(default)]
    pub phone_number: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nationality: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization_name: Option<String>,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub street: String,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub post_code: String,
    #[serde(default)]
    pub city: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta_data: Option<MetaData>,
}

impl Identity {
    /// An empty identity of the given type.
    pub fn new(identity_type: IdentityType) -> Self {
        Self {
            identity_type,
            first_name: None,
            last_name: None,
            other_names: None,
            gender: None,
            dob: None,
            email_address: String::new(),
            phone_number: String::new(),
            nationality: None,
            organization_name: None,
            category: String::new(),
            street: String::new(),
            country: String::new(),
            state: String::new(),
            post_code: String::new(),
            city: String::new(),
            meta_data: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdentityResponse {
    pub identity_id: String,
    #[serde(default)]
    pub created_at: String,
    #[serde(flatten)]
    pub identity: Identity,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentityValidationError {
    #[error("{field} is required for {identity_type}")]
    MissingField {
        identity_type: IdentityType,
        field: &'static str,
    },
}

/// Check that the fields required for the identity's type are present and non-empty.
pub fn validate_identity(identity: &Identity) -> std::result::Result<(), IdentityValidationError> {
    let required: Vec<(&'static str, bool)> = match identity.identity_type {
        IdentityType::Individual => vec![
            ("first_name", is_set(&identity.first_name)),
            ("last_name", is_set(&identity.last_name)),
            ("dob", identity.dob.is_some()),
            ("gender", is_set(&identity.gender)),
            ("nationality", is_set(&identity.nationality)),
        ],
        IdentityType::Organization => vec![("organization_name", is_set(&identity.organization_name))],
    };

    match required.into_iter().find(|(_, present)| !present) {
        Some((field, _)) => Err(IdentityValidationError::MissingField {
            identity_type: identity.identity_type,
            field,
        }),
        None => Ok(()),
    }
}

fn is_set(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|v| !v.trim().is_empty())
}

pub struct Identities<'a> {
    api: Api<'a>,
}

impl<'a> Identities<'a> {
    pub fn new(api: Api<'a>) -> Self {
        Self { api }
    }

    pub async fn create(&self, identity: &Identity) -> Result<IdentityResponse> {
        validate_identity(identity)?;
        self.api.call("identities", Method::POST, Some(identity)).await
    }

    pub async fn get(&self, identity_id: &str) -> Result<IdentityResponse> {
        require(identity_id, "identity id")?;
        self.api.get(&format!("identities/{}", identity_id)).await
    }

    pub async fn list(&self) -> Result<Vec<IdentityResponse>> {
        self.api.get("identities").await
    }

    pub async fn update(&self, identity_id: &str, identity: &Identity) -> Result<IdentityResponse> {
        require(identity_id, "identity id")?;
        self.api
            .call(&format!("identities/{}", identity_id), Method::PUT, Some(identity))
            .await
    }
}
