//! Fluent configuration builder
//!
//! The order of calls defines which values are available: every step that
//! derives fields from an earlier slot fails with
//! [`CloudError::PrecedingStepMissing`] when that slot is still empty.
//!
//! ```
//! use azflow_cloud::{ConfigBuilder, Region};
//!
//! # fn main() -> azflow_cloud::Result<()> {
//! let config = ConfigBuilder::define("Playground")
//!     .with_resource_group("rg-play", Region::europe_north())
//!     .with_storage_account("playstorage", Region::europe_north())?
//!     .with_function_app("play-api", Region::europe_north(), "~2", Some("dotnet"))?
//!     .build();
//!
//! assert_eq!(config.function_apps[0].storage_account_name, "playstorage");
//! # Ok(())
//! # }
//! ```

use crate::error::{CloudError, Result};
use crate::model::{
    DocumentDbSpec, FunctionAppSpec, InfrastructureConfig, Region, ResourceGroupSpec,
    ResourceSku, SignalRSpec, StorageAccountSpec,
};

/// Accumulates an [`InfrastructureConfig`]; consumed by [`ConfigBuilder::build`]
#[derive(Debug)]
pub struct ConfigBuilder {
    config: InfrastructureConfig,
}

impl ConfigBuilder {
    pub fn define(name: impl Into<String>) -> Self {
        Self {
            config: InfrastructureConfig::new(name),
        }
    }

    /// Sets the resource group, replacing any previous one
    pub fn with_resource_group(mut self, name: impl Into<String>, region: Region) -> Self {
        self.config.resource_group = Some(ResourceGroupSpec {
            name: name.into(),
            region,
        });
        self
    }

    pub fn with_storage_account(
        mut self,
        account_name: impl Into<String>,
        region: Region,
    ) -> Result<Self> {
        let resource_group_name = self.resource_group_name("with_storage_account")?;
        self.config.storage_account = Some(StorageAccountSpec {
            resource_group_name,
            account_name: account_name.into(),
            region,
        });
        Ok(self)
    }

    pub fn with_document_db_account(
        mut self,
        account_name: impl Into<String>,
        region: Region,
        write_replication_region: Region,
        read_replication_region: Region,
    ) -> Result<Self> {
        let resource_group_name = self.resource_group_name("with_document_db_account")?;
        self.config.document_db = Some(DocumentDbSpec {
            resource_group_name,
            account_name: account_name.into(),
            database_id: None,
            collection_ids: Vec::new(),
            region,
            write_replication_region,
            read_replication_region,
        });
        Ok(self)
    }

    /// Sets the database id (last call wins) and appends the collection
    pub fn with_document_db_collection(
        mut self,
        database_id: impl Into<String>,
        collection_id: impl Into<String>,
    ) -> Result<Self> {
        let document_db = self.config.document_db.as_mut().ok_or_else(|| {
            CloudError::missing("with_document_db_collection", "document db account")
        })?;
        document_db.database_id = Some(database_id.into());
        document_db.add_collection_id(collection_id);
        Ok(self)
    }

    /// Appends a function app bound to the current resource group and storage account
    ///
    /// The names are copied now; redefining either slot later does not touch
    /// apps that were already appended. An empty worker runtime is treated as unset.
    pub fn with_function_app(
        mut self,
        app_name: impl Into<String>,
        region: Region,
        extensions_runtime_version: impl Into<String>,
        worker_runtime: Option<&str>,
    ) -> Result<Self> {
        let resource_group_name = self.resource_group_name("with_function_app")?;
        let storage_account_name = self
            .config
            .storage_account
            .as_ref()
            .map(|storage| storage.account_name.clone())
            .ok_or_else(|| CloudError::missing("with_function_app", "storage account"))?;

        self.config.function_apps.push(FunctionAppSpec {
            resource_group_name,
            app_name: app_name.into(),
            region,
            storage_account_name,
            extensions_runtime_version: extensions_runtime_version.into(),
            worker_runtime: worker_runtime
                .filter(|runtime| !runtime.is_empty())
                .map(str::to_string),
        });
        Ok(self)
    }

    /// Sets the SignalR service; `None` selects the free tier
    pub fn with_signalr_service(
        mut self,
        service_name: impl Into<String>,
        region: Region,
        sku: Option<ResourceSku>,
    ) -> Result<Self> {
        let resource_group_name = self.resource_group_name("with_signalr_service")?;
        let service_name = service_name.into();
        self.config.signalr = Some(SignalRSpec {
            resource_group_name,
            region,
            sku: sku.unwrap_or_default(),
            description: service_name.clone(),
            service_name,
        });
        Ok(self)
    }

    pub fn build(self) -> InfrastructureConfig {
        self.config
    }

    fn resource_group_name(&self, step: &'static str) -> Result<String> {
        self.config
            .resource_group
            .as_ref()
            .map(|group| group.name.clone())
            .ok_or_else(|| CloudError::missing(step, "resource group"))
    }
}
