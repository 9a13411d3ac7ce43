//! azflow.yaml contents and credential resolution

use crate::error::{ConfigError, Result};
use azflow_cloud::Credentials;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const TENANT_ID_ENV: &str = "AZURE_TENANT_ID";
pub const CLIENT_ID_ENV: &str = "AZURE_CLIENT_ID";
pub const CLIENT_SECRET_ENV: &str = "AZURE_CLIENT_SECRET";
pub const SUBSCRIPTION_ID_ENV: &str = "AZURE_SUBSCRIPTION_ID";

fn default_az_path() -> String {
    "az".to_string()
}

/// Parsed azflow.yaml
///
/// ```yaml
/// credentials:
///   tenant_id: 00000000-0000-0000-0000-000000000000
///   client_id: 00000000-0000-0000-0000-000000000000
///   subscription_id: 00000000-0000-0000-0000-000000000000
/// az_path: /usr/local/bin/az
/// cosmos_api_version: "2018-12-31"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub credentials: CredentialSettings,

    /// az executable
    #[serde(default = "default_az_path")]
    pub az_path: String,

    /// `x-ms-version` for Cosmos DB requests
    #[serde(default)]
    pub cosmos_api_version: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            credentials: CredentialSettings::default(),
            az_path: default_az_path(),
            cosmos_api_version: None,
        }
    }
}

/// Partially known service principal, from a file or from the command line
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialSettings {
    pub tenant_id: Option<String>,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub subscription_id: Option<String>,
}

impl std::fmt::Debug for CredentialSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialSettings")
            .field("tenant_id", &self.tenant_id)
            .field("client_id", &self.client_id)
            .field("client_secret", &self.client_secret.as_ref().map(|_| "***"))
            .field("subscription_id", &self.subscription_id)
            .finish()
    }
}

impl Settings {
    pub fn from_yaml(content: &str, path: &Path) -> Result<Self> {
        serde_yaml::from_str(content).map_err(|source| ConfigError::Yaml {
            path: path.display().to_string(),
            source,
        })
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content, path)
    }

    /// Merge `overrides` over the file's credentials; every field must end up non-empty
    pub fn resolve_credentials(&self, overrides: &CredentialSettings) -> Result<Credentials> {
        let file = &self.credentials;
        Ok(Credentials::new(
            pick(&overrides.tenant_id, &file.tenant_id, "tenant_id", "tenant-id", TENANT_ID_ENV)?,
            pick(&overrides.client_id, &file.client_id, "client_id", "client-id", CLIENT_ID_ENV)?,
            pick(
                &overrides.client_secret,
                &file.client_secret,
                "client_secret",
                "client-secret",
                CLIENT_SECRET_ENV,
            )?,
            pick(
                &overrides.subscription_id,
                &file.subscription_id,
                "subscription_id",
                "subscription-id",
                SUBSCRIPTION_ID_ENV,
            )?,
        ))
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn pick(
    preferred: &Option<String>,
    fallback: &Option<String>,
    field: &'static str,
    flag: &'static str,
    env: &'static str,
) -> Result<String> {
    non_empty(preferred)
        .or_else(|| non_empty(fallback))
        .map(str::to_string)
        .ok_or(ConfigError::MissingCredential { field, flag, env })
}
