//! az CLI wrapper
//!
//! Wraps the Azure CLI commands for control plane operations.

use crate::error::{AzureError, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::process::Stdio;
use tokio::process::Command;

/// Base URL of the Azure Resource Manager API
pub const ARM_ENDPOINT: &str = "https://management.azure.com";

/// API version used for `Microsoft.SignalRService` requests
pub const SIGNALR_API_VERSION: &str = "2020-05-01";

/// Fragments of az error output that mean the resource does not exist
const NOT_FOUND_MARKERS: &[&str] = &[
    "ResourceNotFound",
    "ResourceGroupNotFound",
    "was not found",
    "could not be found",
];

/// Flags whose following argument is never logged
const SECRET_FLAGS: &[&str] = &["--password", "-p"];

/// az CLI wrapper
#[derive(Debug, Clone)]
pub struct AzCli {
    program: String,
}

impl Default for AzCli {
    fn default() -> Self {
        Self::new("az")
    }
}

impl AzCli {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Run an az command and return stdout
    async fn run_command(&self, args: &[&str]) -> Result<String> {
        let mut cmd = Command::new(&self.program);
        cmd.args(args);
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());

        tracing::debug!("Running: {} {}", self.program, display_args(args));

        let output = cmd.output().await.map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => AzureError::AzNotFound,
            _ => AzureError::IoError(e),
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(AzureError::CommandFailed(stderr.trim().to_string()));
        }

        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }

    async fn run_json<T: DeserializeOwned>(&self, args: &[&str]) -> Result<T> {
        let output = self.run_command(args).await?;
        Ok(serde_json::from_str(&output)?)
    }

    /// Like `run_json`, but a not-found failure yields `None`
    async fn run_optional<T: DeserializeOwned>(&self, args: &[&str]) -> Result<Option<T>> {
        match self.run_command(args).await {
            Ok(output) if output.trim().is_empty() => Ok(None),
            Ok(output) => Ok(Some(serde_json::from_str(&output)?)),
            Err(AzureError::CommandFailed(stderr)) if is_not_found(&stderr) => Ok(None),
            Err(e) => Err(e),
        }
    }

    // ========== Account ==========

    /// Log in with a service principal and select the subscription
    pub async fn login(
        &self,
        tenant_id: &str,
        client_id: &str,
        client_secret: &str,
        subscription_id: &str,
    ) -> Result<()> {
        self.run_command(&[
            "login",
            "--service-principal",
            "--username",
            client_id,
            "--password",
            client_secret,
            "--tenant",
            tenant_id,
            "--output",
            "none",
        ])
        .await
        .map_err(|e| match e {
            AzureError::CommandFailed(stderr) => AzureError::AuthenticationFailed(stderr),
            other => other,
        })?;

        self.run_command(&["account", "set", "--subscription", subscription_id])
            .await
            .map_err(|e| match e {
                AzureError::CommandFailed(stderr) => AzureError::AuthenticationFailed(stderr),
                other => other,
            })?;

        Ok(())
    }

    // ========== Resource groups ==========

    pub async fn group_exists(&self, name: &str) -> Result<bool> {
        let output = self.run_command(&["group", "exists", "--name", name]).await?;
        Ok(output.trim() == "true")
    }

    pub async fn create_group(&self, name: &str, location: &str) -> Result<GroupInfo> {
        self.run_json(&[
            "group",
            "create",
            "--name",
            name,
            "--location",
            location,
            "--output",
            "json",
        ])
        .await
    }

    pub async fn delete_group(&self, name: &str) -> Result<()> {
        self.run_command(&["group", "delete", "--name", name, "--yes"])
            .await?;
        Ok(())
    }

    pub async fn list_groups(&self) -> Result<Vec<GroupInfo>> {
        let output = self
            .run_command(&["group", "list", "--output", "json"])
            .await?;

        if output.trim().is_empty() {
            return Ok(Vec::new());
        }

        Ok(serde_json::from_str(&output)?)
    }

    // ========== Storage accounts ==========

    pub async fn show_storage_account(
        &self,
        group: &str,
        name: &str,
    ) -> Result<Option<StorageAccountInfo>> {
        self.run_optional(&[
            "storage",
            "account",
            "show",
            "--resource-group",
            group,
            "--name",
            name,
            "--output",
            "json",
        ])
        .await
    }

    /// Create a general purpose (StorageV2) account
    pub async fn create_storage_account(
        &self,
        group: &str,
        name: &str,
        location: &str,
    ) -> Result<StorageAccountInfo> {
        self.run_json(&[
            "storage",
            "account",
            "create",
            "--resource-group",
            group,
            "--name",
            name,
            "--location",
            location,
            "--kind",
            "StorageV2",
            "--sku",
            "Standard_LRS",
            "--output",
            "json",
        ])
        .await
    }

    pub async fn storage_connection_string(&self, group: &str, name: &str) -> Result<String> {
        let output = self
            .run_command(&[
                "storage",
                "account",
                "show-connection-string",
                "--resource-group",
                group,
                "--name",
                name,
                "--query",
                "connectionString",
                "--output",
                "tsv",
            ])
            .await?;
        Ok(output.trim().to_string())
    }

    // ========== Cosmos DB accounts ==========

    pub async fn show_cosmosdb(&self, group: &str, name: &str) -> Result<Option<CosmosDbInfo>> {
        self.run_optional(&[
            "cosmosdb",
            "show",
            "--resource-group",
            group,
            "--name",
            name,
            "--output",
            "json",
        ])
        .await
    }

    pub async fn create_cosmosdb(&self, config: &CreateCosmosDbConfig) -> Result<CosmosDbInfo> {
        let location_args = cosmos_location_args(
            &config.location,
            &config.write_location,
            &config.read_location,
        );

        let mut args = vec![
            "cosmosdb",
            "create",
            "--resource-group",
            config.resource_group.as_str(),
            "--name",
            config.name.as_str(),
            "--kind",
            "GlobalDocumentDB",
            "--default-consistency-level",
            config.consistency.as_str(),
            "--output",
            "json",
        ];
        for arg in &location_args {
            args.push(arg.as_str());
        }

        self.run_json(&args).await
    }

    pub async fn list_cosmosdb_keys(&self, group: &str, name: &str) -> Result<CosmosDbKeys> {
        self.run_json(&[
            "cosmosdb",
            "keys",
            "list",
            "--resource-group",
            group,
            "--name",
            name,
            "--type",
            "keys",
            "--output",
            "json",
        ])
        .await
    }

    pub async fn delete_cosmosdb(&self, group: &str, name: &str) -> Result<()> {
        self.run_command(&[
            "cosmosdb",
            "delete",
            "--resource-group",
            group,
            "--name",
            name,
            "--yes",
        ])
        .await?;
        Ok(())
    }

    // ========== Function apps ==========

    pub async fn list_functionapps(&self, group: &str) -> Result<Vec<FunctionAppInfo>> {
        let output = self
            .run_command(&[
                "functionapp",
                "list",
                "--resource-group",
                group,
                "--output",
                "json",
            ])
            .await?;

        if output.trim().is_empty() {
            return Ok(Vec::new());
        }

        Ok(serde_json::from_str(&output)?)
    }

    pub async fn show_functionapp(
        &self,
        group: &str,
        name: &str,
    ) -> Result<Option<FunctionAppInfo>> {
        self.run_optional(&[
            "functionapp",
            "show",
            "--resource-group",
            group,
            "--name",
            name,
            "--output",
            "json",
        ])
        .await
    }

    /// Create an app on a consumption plan in `location`
    pub async fn create_functionapp(
        &self,
        group: &str,
        name: &str,
        location: &str,
        storage_account: &str,
    ) -> Result<FunctionAppInfo> {
        self.run_json(&[
            "functionapp",
            "create",
            "--resource-group",
            group,
            "--name",
            name,
            "--consumption-plan-location",
            location,
            "--storage-account",
            storage_account,
            "--output",
            "json",
        ])
        .await
    }

    pub async fn list_appsettings(&self, group: &str, name: &str) -> Result<Vec<AppSetting>> {
        self.run_json(&[
            "functionapp",
            "config",
            "appsettings",
            "list",
            "--resource-group",
            group,
            "--name",
            name,
            "--output",
            "json",
        ])
        .await
    }

    pub async fn set_appsettings(
        &self,
        group: &str,
        name: &str,
        settings: &BTreeMap<String, String>,
    ) -> Result<()> {
        if settings.is_empty() {
            return Ok(());
        }

        let pairs = settings_args(settings);
        let mut args = vec![
            "functionapp",
            "config",
            "appsettings",
            "set",
            "--resource-group",
            group,
            "--name",
            name,
            "--output",
            "none",
            "--settings",
        ];
        for pair in &pairs {
            args.push(pair.as_str());
        }

        self.run_command(&args).await?;
        Ok(())
    }

    pub async fn delete_appsettings(&self, group: &str, name: &str, keys: &[&str]) -> Result<()> {
        if keys.is_empty() {
            return Ok(());
        }

        let mut args = vec![
            "functionapp",
            "config",
            "appsettings",
            "delete",
            "--resource-group",
            group,
            "--name",
            name,
            "--output",
            "none",
            "--setting-names",
        ];
        args.extend_from_slice(keys);

        self.run_command(&args).await?;
        Ok(())
    }

    pub async fn delete_functionapp(&self, group: &str, name: &str) -> Result<()> {
        self.run_command(&[
            "functionapp",
            "delete",
            "--resource-group",
            group,
            "--name",
            name,
        ])
        .await?;
        Ok(())
    }

    // ========== Raw ARM requests ==========

    /// Issue an authenticated ARM request through `az rest`
    pub async fn rest(&self, method: &str, url: &str, body: Option<&str>) -> Result<String> {
        let mut args = vec!["rest", "--method", method, "--url", url];
        if let Some(body) = body {
            args.push("--body");
            args.push(body);
        }
        self.run_command(&args).await
    }
}

/// Whether az error output reports a missing resource
pub fn is_not_found(stderr: &str) -> bool {
    NOT_FOUND_MARKERS.iter().any(|m| stderr.contains(m))
}

/// Command line for logging, with secret values masked
fn display_args(args: &[&str]) -> String {
    let mut shown = Vec::with_capacity(args.len());
    let mut mask_next = false;
    for arg in args {
        if mask_next {
            shown.push("***");
            mask_next = false;
        } else {
            shown.push(*arg);
            mask_next = SECRET_FLAGS.contains(arg);
        }
    }
    shown.join(" ")
}

/// `--locations` arguments: the account region at priority 0, then each
/// distinct replication region at the next priority
fn cosmos_location_args(account: &str, write: &str, read: &str) -> Vec<String> {
    let mut regions: Vec<&str> = Vec::with_capacity(3);
    for region in [account, write, read] {
        if !regions.contains(&region) {
            regions.push(region);
        }
    }

    regions
        .iter()
        .enumerate()
        .flat_map(|(priority, region)| {
            [
                "--locations".to_string(),
                format!(
                    "regionName={} failoverPriority={} isZoneRedundant=False",
                    region, priority
                ),
            ]
        })
        .collect()
}

fn settings_args(settings: &BTreeMap<String, String>) -> Vec<String> {
    settings
        .iter()
        .map(|(key, value)| format!("{}={}", key, value))
        .collect()
}

/// Resource group info from az
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupInfo {
    pub name: String,
    pub location: String,
}

/// Storage account info from az
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageAccountInfo {
    pub name: String,
    pub resource_group: String,
    pub location: String,
}

/// Cosmos DB account info from az
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CosmosDbInfo {
    pub name: String,
    pub resource_group: String,
    pub document_endpoint: String,
}

/// Cosmos DB account keys from az
#[derive(Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CosmosDbKeys {
    pub primary_master_key: String,
}

/// Configuration for creating a Cosmos DB account
#[derive(Debug, Clone)]
pub struct CreateCosmosDbConfig {
    pub resource_group: String,
    pub name: String,
    pub consistency: String,
    /// Account region, failover priority 0
    pub location: String,
    pub write_location: String,
    pub read_location: String,
}

/// Function app info from az
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionAppInfo {
    pub name: String,
    pub resource_group: String,
    pub location: String,
}

/// One application setting of a function app
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppSetting {
    pub name: String,
    pub value: Option<String>,
    #[serde(default)]
    pub slot_setting: bool,
}

/// Name availability response of a resource provider
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NameAvailability {
    pub name_available: bool,
    pub reason: Option<String>,
    pub message: Option<String>,
}
