//! Resource parameter value objects and the infrastructure aggregate

use serde::{Deserialize, Serialize};
use std::fmt;

/// Azure region, identified by its programmatic name (e.g. `northeurope`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Region(String);

impl Region {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn europe_north() -> Self {
        Self::new("northeurope")
    }

    pub fn europe_west() -> Self {
        Self::new("westeurope")
    }

    pub fn us_east() -> Self {
        Self::new("eastus")
    }

    pub fn us_west() -> Self {
        Self::new("westus")
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Pricing tier / size selector of a service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceSku {
    pub name: String,
    pub tier: String,
    pub size: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capacity: Option<u32>,
}

impl ResourceSku {
    pub fn new(name: impl Into<String>, tier: impl Into<String>, size: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tier: tier.into(),
            size: size.into(),
            capacity: None,
        }
    }

    pub fn with_capacity(mut self, capacity: u32) -> Self {
        self.capacity = Some(capacity);
        self
    }
}

impl Default for ResourceSku {
    /// The free tier
    fn default() -> Self {
        Self::new("Free_F1", "Free", "F1")
    }
}

/// Document database consistency level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConsistencyLevel {
    Eventual,
    Session,
    BoundedStaleness,
    Strong,
    ConsistentPrefix,
}

impl fmt::Display for ConsistencyLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConsistencyLevel::Eventual => write!(f, "Eventual"),
            ConsistencyLevel::Session => write!(f, "Session"),
            ConsistencyLevel::BoundedStaleness => write!(f, "BoundedStaleness"),
            ConsistencyLevel::Strong => write!(f, "Strong"),
            ConsistencyLevel::ConsistentPrefix => write!(f, "ConsistentPrefix"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceGroupSpec {
    pub name: String,
    pub region: Region,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageAccountSpec {
    pub resource_group_name: String,
    pub account_name: String,
    pub region: Region,
}

/// Document database account plus the logical database and collections in it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentDbSpec {
    pub resource_group_name: String,
    pub account_name: String,
    /// Unset until a collection is declared
    pub database_id: Option<String>,
    /// Declaration order, duplicates kept
    pub collection_ids: Vec<String>,
    pub region: Region,
    pub write_replication_region: Region,
    pub read_replication_region: Region,
}

impl DocumentDbSpec {
    pub fn add_collection_id(&mut self, collection_id: impl Into<String>) {
        self.collection_ids.push(collection_id.into());
    }
}

/// Function app, with the group and storage names captured when it was declared
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionAppSpec {
    pub resource_group_name: String,
    pub app_name: String,
    pub region: Region,
    pub storage_account_name: String,
    pub extensions_runtime_version: String,
    pub worker_runtime: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignalRSpec {
    pub resource_group_name: String,
    pub region: Region,
    pub sku: ResourceSku,
    pub service_name: String,
    pub description: String,
}

/// Desired topology: at most one of each singleton resource, any number of function apps
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InfrastructureConfig {
    pub name: String,
    pub resource_group: Option<ResourceGroupSpec>,
    pub storage_account: Option<StorageAccountSpec>,
    pub document_db: Option<DocumentDbSpec>,
    pub signalr: Option<SignalRSpec>,
    pub function_apps: Vec<FunctionAppSpec>,
}

impl InfrastructureConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            resource_group: None,
            storage_account: None,
            document_db: None,
            signalr: None,
            function_apps: Vec::new(),
        }
    }
}
