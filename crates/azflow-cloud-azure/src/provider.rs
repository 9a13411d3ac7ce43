//! Azure implementation of the cloud capability traits

use crate::az::{ARM_ENDPOINT, AzCli, CreateCosmosDbConfig, NameAvailability, SIGNALR_API_VERSION};
use crate::cosmos::{CosmosClient, DEFAULT_API_VERSION};
use crate::error::AzureError;
use async_trait::async_trait;
use azflow_cloud::constants::{EXTENSION_VERSION_SETTING, SIGNALR_NAMESPACE, SIGNALR_RESOURCE_TYPE_NAME};
use azflow_cloud::{
    CloudConnector, Credentials, DocumentDataPlane, DocumentDbAccount, DocumentDbAccountCreate,
    DocumentDbConnection, DocumentDbKeys, FunctionApp, FunctionAppCreate, FunctionAppUpdate,
    ManagementSession, Region, ResourceGroup, Result, SignalRCreate, SignalRManagement,
    StorageAccount,
};
use serde_json::json;
use std::collections::BTreeMap;

/// App setting holding the storage connection string of a function app
const WEB_JOBS_STORAGE_SETTING: &str = "AzureWebJobsStorage";

/// Connects to Azure through the az CLI
#[derive(Debug, Clone)]
pub struct AzureConnector {
    az: AzCli,
    cosmos_api_version: String,
}

impl Default for AzureConnector {
    fn default() -> Self {
        Self::new(AzCli::default())
    }
}

impl AzureConnector {
    pub fn new(az: AzCli) -> Self {
        Self {
            az,
            cosmos_api_version: DEFAULT_API_VERSION.to_string(),
        }
    }

    /// Override the `x-ms-version` sent to document db accounts
    pub fn with_cosmos_api_version(mut self, api_version: impl Into<String>) -> Self {
        self.cosmos_api_version = api_version.into();
        self
    }

    async fn login(&self, credentials: &Credentials) -> Result<()> {
        self.az
            .login(
                &credentials.tenant_id,
                &credentials.client_id,
                &credentials.client_secret,
                &credentials.subscription_id,
            )
            .await
            .map_err(|e| e.into_cloud("login"))
    }
}

#[async_trait]
impl CloudConnector for AzureConnector {
    type Session = AzureSession;
    type SignalR = AzureSignalR;

    async fn authenticate(&self, credentials: &Credentials) -> Result<AzureSession> {
        self.login(credentials).await?;
        tracing::debug!("Logged in to subscription {}", credentials.subscription_id);

        Ok(AzureSession {
            az: self.az.clone(),
            cosmos_api_version: self.cosmos_api_version.clone(),
        })
    }

    async fn connect_signalr(&self, credentials: &Credentials) -> Result<AzureSignalR> {
        self.login(credentials).await?;

        Ok(AzureSignalR {
            az: self.az.clone(),
            subscription_id: credentials.subscription_id.clone(),
        })
    }
}

/// Subscription-scoped session backed by the az CLI
#[derive(Debug, Clone)]
pub struct AzureSession {
    az: AzCli,
    cosmos_api_version: String,
}

#[async_trait]
impl ManagementSession for AzureSession {
    type DocumentClient = CosmosClient;

    async fn resource_group_exists(&self, name: &str) -> Result<bool> {
        self.az
            .group_exists(name)
            .await
            .map_err(|e| e.into_cloud("group exists"))
    }

    async fn create_resource_group(&self, name: &str, region: &Region) -> Result<()> {
        self.az
            .create_group(name, region.name())
            .await
            .map_err(|e| e.into_cloud("group create"))?;
        Ok(())
    }

    async fn delete_resource_group(&self, name: &str) -> Result<()> {
        self.az
            .delete_group(name)
            .await
            .map_err(|e| e.into_cloud("group delete"))
    }

    async fn list_resource_groups(&self) -> Result<Vec<ResourceGroup>> {
        let groups = self
            .az
            .list_groups()
            .await
            .map_err(|e| e.into_cloud("group list"))?;

        Ok(groups
            .into_iter()
            .map(|g| ResourceGroup {
                name: g.name,
                region: Region::new(g.location),
            })
            .collect())
    }

    async fn get_storage_account(
        &self,
        group: &str,
        name: &str,
    ) -> Result<Option<StorageAccount>> {
        let account = self
            .az
            .show_storage_account(group, name)
            .await
            .map_err(|e| e.into_cloud("storage account show"))?;

        Ok(account.map(|a| StorageAccount {
            name: a.name,
            resource_group: a.resource_group,
            region: Region::new(a.location),
        }))
    }

    async fn create_storage_account(
        &self,
        group: &str,
        name: &str,
        region: &Region,
    ) -> Result<StorageAccount> {
        let account = self
            .az
            .create_storage_account(group, name, region.name())
            .await
            .map_err(|e| e.into_cloud("storage account create"))?;

        Ok(StorageAccount {
            name: account.name,
            resource_group: account.resource_group,
            region: Region::new(account.location),
        })
    }

    async fn get_document_db_account(
        &self,
        group: &str,
        name: &str,
    ) -> Result<Option<DocumentDbAccount>> {
        let account = self
            .az
            .show_cosmosdb(group, name)
            .await
            .map_err(|e| e.into_cloud("cosmosdb show"))?;

        Ok(account.map(|a| DocumentDbAccount {
            name: a.name,
            resource_group: a.resource_group,
            document_endpoint: a.document_endpoint,
        }))
    }

    async fn create_document_db_account(
        &self,
        request: &DocumentDbAccountCreate,
    ) -> Result<DocumentDbAccount> {
        let config = CreateCosmosDbConfig {
            resource_group: request.resource_group.clone(),
            name: request.name.clone(),
            consistency: request.consistency.to_string(),
            location: request.region.name().to_string(),
            write_location: request.write_replication_region.name().to_string(),
            read_location: request.read_replication_region.name().to_string(),
        };

        let account = self
            .az
            .create_cosmosdb(&config)
            .await
            .map_err(|e| e.into_cloud("cosmosdb create"))?;

        Ok(DocumentDbAccount {
            name: account.name,
            resource_group: account.resource_group,
            document_endpoint: account.document_endpoint,
        })
    }

    async fn list_document_db_keys(&self, account: &DocumentDbAccount) -> Result<DocumentDbKeys> {
        let keys = self
            .az
            .list_cosmosdb_keys(&account.resource_group, &account.name)
            .await
            .map_err(|e| e.into_cloud("cosmosdb keys list"))?;

        Ok(DocumentDbKeys {
            primary_master_key: keys.primary_master_key,
        })
    }

    async fn delete_document_db_account(&self, group: &str, name: &str) -> Result<()> {
        self.az
            .delete_cosmosdb(group, name)
            .await
            .map_err(|e| e.into_cloud("cosmosdb delete"))
    }

    async fn connect_document_db(&self, connection: &DocumentDbConnection) -> Result<CosmosClient> {
        let client = CosmosClient::new(&connection.endpoint, &connection.master_key)
            .map_err(|e| e.into_cloud("document db connect"))?;
        Ok(client.with_api_version(self.cosmos_api_version.clone()))
    }

    async fn list_function_apps(&self, group: &str) -> Result<Vec<FunctionApp>> {
        let apps = self
            .az
            .list_functionapps(group)
            .await
            .map_err(|e| e.into_cloud("functionapp list"))?;

        Ok(apps
            .into_iter()
            .map(|a| FunctionApp {
                name: a.name,
                resource_group: a.resource_group,
                region: Region::new(a.location),
            })
            .collect())
    }

    async fn get_function_app(&self, group: &str, name: &str) -> Result<Option<FunctionApp>> {
        let app = self
            .az
            .show_functionapp(group, name)
            .await
            .map_err(|e| e.into_cloud("functionapp show"))?;

        Ok(app.map(|a| FunctionApp {
            name: a.name,
            resource_group: a.resource_group,
            region: Region::new(a.location),
        }))
    }

    async fn function_app_settings(&self, app: &FunctionApp) -> Result<BTreeMap<String, String>> {
        let settings = self
            .az
            .list_appsettings(&app.resource_group, &app.name)
            .await
            .map_err(|e| e.into_cloud("functionapp appsettings list"))?;

        Ok(settings
            .into_iter()
            .filter_map(|s| s.value.map(|v| (s.name, v)))
            .collect())
    }

    async fn create_function_app(&self, request: &FunctionAppCreate) -> Result<FunctionApp> {
        let app = self
            .az
            .create_functionapp(
                &request.resource_group,
                &request.name,
                request.region.name(),
                &request.storage_account,
            )
            .await
            .map_err(|e| e.into_cloud("functionapp create"))?;

        let mut settings = request.app_settings.clone();
        settings.insert(
            EXTENSION_VERSION_SETTING.to_string(),
            request.runtime_version.clone(),
        );
        self.az
            .set_appsettings(&request.resource_group, &request.name, &settings)
            .await
            .map_err(|e| e.into_cloud("functionapp appsettings set"))?;

        Ok(FunctionApp {
            name: app.name,
            resource_group: app.resource_group,
            region: Region::new(app.location),
        })
    }

    async fn update_function_app(&self, app: &FunctionApp, update: &FunctionAppUpdate) -> Result<()> {
        if update.is_empty() {
            return Ok(());
        }

        let mut settings = BTreeMap::new();
        if let Some(storage_account) = &update.storage_account {
            let connection_string = self
                .az
                .storage_connection_string(&app.resource_group, storage_account)
                .await
                .map_err(|e| e.into_cloud("storage account show-connection-string"))?;
            settings.insert(WEB_JOBS_STORAGE_SETTING.to_string(), connection_string);
        }

        let mut removed = Vec::new();
        for (key, value) in &update.app_settings {
            match value {
                Some(value) => {
                    settings.insert(key.clone(), value.clone());
                }
                None => removed.push(key.as_str()),
            }
        }

        self.az
            .set_appsettings(&app.resource_group, &app.name, &settings)
            .await
            .map_err(|e| e.into_cloud("functionapp appsettings set"))?;
        self.az
            .delete_appsettings(&app.resource_group, &app.name, &removed)
            .await
            .map_err(|e| e.into_cloud("functionapp appsettings delete"))
    }

    async fn delete_function_app(&self, group: &str, name: &str) -> Result<()> {
        self.az
            .delete_functionapp(group, name)
            .await
            .map_err(|e| e.into_cloud("functionapp delete"))
    }
}

#[async_trait]
impl DocumentDataPlane for CosmosClient {
    async fn create_database_if_absent(&self, database_id: &str) -> Result<bool> {
        self.create_database(database_id)
            .await
            .map_err(|e| e.into_cloud("create database"))
    }

    async fn create_collection_if_absent(
        &self,
        database_id: &str,
        collection_id: &str,
        throughput: u32,
    ) -> Result<bool> {
        self.create_collection(database_id, collection_id, throughput)
            .await
            .map_err(|e| e.into_cloud("create collection"))
    }
}

/// SignalR management through ARM requests issued by `az rest`
#[derive(Debug, Clone)]
pub struct AzureSignalR {
    az: AzCli,
    subscription_id: String,
}

impl AzureSignalR {
    fn name_availability_url(&self, region: &Region) -> String {
        format!(
            "{}/subscriptions/{}/providers/{}/locations/{}/checkNameAvailability?api-version={}",
            ARM_ENDPOINT, self.subscription_id, SIGNALR_NAMESPACE, region, SIGNALR_API_VERSION
        )
    }

    fn service_url(&self, group: &str, name: &str) -> String {
        format!(
            "{}/subscriptions/{}/resourceGroups/{}/providers/{}/{}/{}?api-version={}",
            ARM_ENDPOINT,
            self.subscription_id,
            group,
            SIGNALR_NAMESPACE,
            SIGNALR_RESOURCE_TYPE_NAME,
            name,
            SIGNALR_API_VERSION
        )
    }
}

#[async_trait]
impl SignalRManagement for AzureSignalR {
    async fn check_name_availability(
        &self,
        region: &Region,
        resource_type: &str,
        name: &str,
    ) -> Result<bool> {
        let body = json!({ "type": resource_type, "name": name }).to_string();
        let output = self
            .az
            .rest("post", &self.name_availability_url(region), Some(&body))
            .await
            .map_err(|e| e.into_cloud("signalr checkNameAvailability"))?;

        let availability: NameAvailability = serde_json::from_str(&output)
            .map_err(|e| AzureError::from(e).into_cloud("signalr checkNameAvailability"))?;

        if let Some(reason) = &availability.reason {
            tracing::debug!("SignalR name {} unavailable: {}", name, reason);
        }
        Ok(availability.name_available)
    }

    async fn create_or_update(&self, group: &str, name: &str, request: &SignalRCreate) -> Result<()> {
        let body = serde_json::to_string(request)?;
        self.az
            .rest("put", &self.service_url(group, name), Some(&body))
            .await
            .map_err(|e| e.into_cloud("signalr create"))?;
        Ok(())
    }

    async fn delete(&self, group: &str, name: &str) -> Result<()> {
        self.az
            .rest("delete", &self.service_url(group, name), None)
            .await
            .map_err(|e| e.into_cloud("signalr delete"))?;
        Ok(())
    }
}
