//! Cloud management capability traits
//!
//! The orchestrator only talks to these traits. A concrete provider (the `az`
//! CLI adapter, or an in-memory fake in tests) implements them.

use crate::credentials::Credentials;
use crate::error::Result;
use crate::model::{ConsistencyLevel, Region, ResourceSku};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Entry point of a provider: turns credentials into authenticated sessions
#[async_trait]
pub trait CloudConnector: Send + Sync {
    type Session: ManagementSession;
    type SignalR: SignalRManagement;

    /// Authenticate against the control plane, scoped to the credentials' subscription
    async fn authenticate(&self, credentials: &Credentials) -> Result<Self::Session>;

    /// Open a SignalR management session; this API family authenticates separately
    async fn connect_signalr(&self, credentials: &Credentials) -> Result<Self::SignalR>;
}

/// Subscription-scoped control plane session
#[async_trait]
pub trait ManagementSession: Send + Sync {
    type DocumentClient: DocumentDataPlane;

    // ========== Resource groups ==========

    async fn resource_group_exists(&self, name: &str) -> Result<bool>;

    async fn create_resource_group(&self, name: &str, region: &Region) -> Result<()>;

    async fn delete_resource_group(&self, name: &str) -> Result<()>;

    async fn list_resource_groups(&self) -> Result<Vec<ResourceGroup>>;

    // ========== Storage accounts ==========

    async fn get_storage_account(&self, group: &str, name: &str)
    -> Result<Option<StorageAccount>>;

    /// Creates a general purpose account
    async fn create_storage_account(
        &self,
        group: &str,
        name: &str,
        region: &Region,
    ) -> Result<StorageAccount>;

    // ========== Document database accounts ==========

    async fn get_document_db_account(
        &self,
        group: &str,
        name: &str,
    ) -> Result<Option<DocumentDbAccount>>;

    async fn create_document_db_account(
        &self,
        request: &DocumentDbAccountCreate,
    ) -> Result<DocumentDbAccount>;

    async fn list_document_db_keys(&self, account: &DocumentDbAccount) -> Result<DocumentDbKeys>;

    async fn delete_document_db_account(&self, group: &str, name: &str) -> Result<()>;

    /// Build a data plane client from an account endpoint and key
    async fn connect_document_db(
        &self,
        connection: &DocumentDbConnection,
    ) -> Result<Self::DocumentClient>;

    // ========== Function apps ==========

    async fn list_function_apps(&self, group: &str) -> Result<Vec<FunctionApp>>;

    async fn get_function_app(&self, group: &str, name: &str) -> Result<Option<FunctionApp>>;

    async fn function_app_settings(&self, app: &FunctionApp) -> Result<BTreeMap<String, String>>;

    /// Creates the app on a consumption plan
    async fn create_function_app(&self, request: &FunctionAppCreate) -> Result<FunctionApp>;

    async fn update_function_app(&self, app: &FunctionApp, update: &FunctionAppUpdate)
    -> Result<()>;

    async fn delete_function_app(&self, group: &str, name: &str) -> Result<()>;
}

/// Document database data plane, bound to one account
#[async_trait]
pub trait DocumentDataPlane: Send + Sync {
    /// Returns `true` when the database was created by this call
    async fn create_database_if_absent(&self, database_id: &str) -> Result<bool>;

    /// Returns `true` when the collection was created by this call
    async fn create_collection_if_absent(
        &self,
        database_id: &str,
        collection_id: &str,
        throughput: u32,
    ) -> Result<bool>;
}

/// SignalR service management
#[async_trait]
pub trait SignalRManagement: Send + Sync {
    /// `true` when no service of `resource_type` holds `name` yet
    async fn check_name_availability(
        &self,
        region: &Region,
        resource_type: &str,
        name: &str,
    ) -> Result<bool>;

    async fn create_or_update(&self, group: &str, name: &str, request: &SignalRCreate)
    -> Result<()>;

    async fn delete(&self, group: &str, name: &str) -> Result<()>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceGroup {
    pub name: String,
    pub region: Region,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageAccount {
    pub name: String,
    pub resource_group: String,
    pub region: Region,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentDbAccount {
    pub name: String,
    pub resource_group: String,
    pub document_endpoint: String,
}

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentDbKeys {
    pub primary_master_key: String,
}

impl std::fmt::Debug for DocumentDbKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentDbKeys")
            .field("primary_master_key", &"***")
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentDbAccountCreate {
    pub resource_group: String,
    pub name: String,
    pub region: Region,
    pub consistency: ConsistencyLevel,
    pub write_replication_region: Region,
    pub read_replication_region: Region,
}

/// Endpoint and key a data plane client is built from
#[derive(Clone, PartialEq, Eq)]
pub struct DocumentDbConnection {
    pub endpoint: String,
    pub master_key: String,
}

impl std::fmt::Debug for DocumentDbConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentDbConnection")
            .field("endpoint", &self.endpoint)
            .field("master_key", &"***")
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionApp {
    pub name: String,
    pub resource_group: String,
    pub region: Region,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionAppCreate {
    pub resource_group: String,
    pub name: String,
    pub region: Region,
    pub storage_account: String,
    pub runtime_version: String,
    pub app_settings: BTreeMap<String, String>,
}

/// Partial update of an existing function app
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FunctionAppUpdate {
    pub storage_account: Option<String>,
    /// `None` removes the setting
    pub app_settings: BTreeMap<String, Option<String>>,
}

impl FunctionAppUpdate {
    pub fn is_empty(&self) -> bool {
        self.storage_account.is_none() && self.app_settings.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SignalRCreate {
    pub location: Region,
    pub sku: ResourceSku,
    pub tags: BTreeMap<String, String>,
}
