use async_trait::async_trait;
use azflow_cloud::{
    CloudConnector, CloudError, Credentials, DocumentDataPlane, DocumentDbAccount,
    DocumentDbAccountCreate, DocumentDbConnection, DocumentDbKeys, FunctionApp, FunctionAppCreate,
    FunctionAppUpdate, ManagementSession, Region, ResourceGroup, Result, SignalRCreate,
    SignalRManagement, StorageAccount,
};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, Mutex};

/// Remote state held by the fake subscription
#[derive(Debug, Default)]
pub struct FakeState {
    pub groups: BTreeMap<String, Region>,
    pub storage_accounts: BTreeMap<(String, String), Region>,
    pub document_db_accounts: BTreeMap<(String, String), String>,
    pub databases: BTreeSet<String>,
    pub collections: BTreeSet<(String, String)>,
    pub collection_throughput: BTreeMap<(String, String), u32>,
    pub signalr_services: BTreeMap<String, (String, SignalRCreate)>,
    pub function_apps: BTreeMap<(String, String), FakeFunctionApp>,
    /// Every remote call in order, as `operation:argument`
    pub calls: Vec<String>,
    pub reject_credentials: bool,
    pub fail_on: Option<&'static str>,
}

#[derive(Debug, Clone)]
pub struct FakeFunctionApp {
    pub region: Region,
    pub storage_account: String,
    pub runtime_version: String,
    pub app_settings: BTreeMap<String, String>,
}

const MUTATIONS: &[&str] = &[
    "create_resource_group",
    "delete_resource_group",
    "create_storage_account",
    "create_document_db_account",
    "delete_document_db_account",
    "create_database",
    "create_collection",
    "create_or_update_signalr",
    "delete_signalr",
    "create_function_app",
    "update_function_app",
    "delete_function_app",
];

/// In-memory subscription implementing every capability trait
#[derive(Clone, Default)]
pub struct FakeCloud {
    pub state: Arc<Mutex<FakeState>>,
}

#[allow(dead_code)]
impl FakeCloud {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rejecting_credentials() -> Self {
        let cloud = Self::new();
        cloud.state.lock().unwrap().reject_credentials = true;
        cloud
    }

    pub fn failing_on(operation: &'static str) -> Self {
        let cloud = Self::new();
        cloud.state.lock().unwrap().fail_on = Some(operation);
        cloud
    }

    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    /// Calls that changed remote state
    pub fn mutations(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|call| {
                let operation = call.split(':').next().unwrap_or_default();
                MUTATIONS.contains(&operation)
            })
            .collect()
    }

    pub fn count(&self, operation: &str) -> usize {
        self.calls()
            .iter()
            .filter(|call| call.split(':').next() == Some(operation))
            .count()
    }

    pub fn clear_calls(&self) {
        self.state.lock().unwrap().calls.clear();
    }

    pub fn with_state<T>(&self, f: impl FnOnce(&mut FakeState) -> T) -> T {
        let mut state = self.state.lock().unwrap();
        f(&mut *state)
    }

    pub fn seed_function_app(&self, group: &str, name: &str, settings: &[(&str, &str)]) {
        self.with_state(|state| {
            state.function_apps.insert(
                (group.to_string(), name.to_string()),
                FakeFunctionApp {
                    region: Region::europe_north(),
                    storage_account: String::new(),
                    runtime_version: "~1".to_string(),
                    app_settings: settings
                        .iter()
                        .map(|(k, v)| (k.to_string(), v.to_string()))
                        .collect(),
                },
            );
        });
    }
}

fn record(state: &Arc<Mutex<FakeState>>, operation: &str, argument: &str) -> Result<()> {
    let mut state = state.lock().unwrap();
    state.calls.push(format!("{}:{}", operation, argument));
    if state.fail_on == Some(operation) {
        return Err(CloudError::remote(operation, "injected failure"));
    }
    Ok(())
}

fn key(group: &str, name: &str) -> (String, String) {
    (group.to_string(), name.to_string())
}

#[async_trait]
impl CloudConnector for FakeCloud {
    type Session = FakeSession;
    type SignalR = FakeSignalR;

    async fn authenticate(&self, credentials: &Credentials) -> Result<FakeSession> {
        record(&self.state, "authenticate", &credentials.subscription_id)?;
        if self.state.lock().unwrap().reject_credentials {
            return Err(CloudError::AuthenticationFailed(
                "invalid client secret".to_string(),
            ));
        }
        Ok(FakeSession {
            state: Arc::clone(&self.state),
        })
    }

    async fn connect_signalr(&self, credentials: &Credentials) -> Result<FakeSignalR> {
        record(&self.state, "connect_signalr", &credentials.subscription_id)?;
        Ok(FakeSignalR {
            state: Arc::clone(&self.state),
        })
    }
}

pub struct FakeSession {
    state: Arc<Mutex<FakeState>>,
}

#[async_trait]
impl ManagementSession for FakeSession {
    type DocumentClient = FakeDocumentClient;

    async fn resource_group_exists(&self, name: &str) -> Result<bool> {
        record(&self.state, "resource_group_exists", name)?;
        Ok(self.state.lock().unwrap().groups.contains_key(name))
    }

    async fn create_resource_group(&self, name: &str, region: &Region) -> Result<()> {
        record(&self.state, "create_resource_group", name)?;
        self.state
            .lock()
            .unwrap()
            .groups
            .insert(name.to_string(), region.clone());
        Ok(())
    }

    async fn delete_resource_group(&self, name: &str) -> Result<()> {
        record(&self.state, "delete_resource_group", name)?;
        let mut state = self.state.lock().unwrap();
        state.groups.remove(name);
        state.storage_accounts.retain(|(group, _), _| group != name);
        state.document_db_accounts.retain(|(group, _), _| group != name);
        state.function_apps.retain(|(group, _), _| group != name);
        state.signalr_services.retain(|_, (group, _)| group != name);
        Ok(())
    }

    async fn list_resource_groups(&self) -> Result<Vec<ResourceGroup>> {
        record(&self.state, "list_resource_groups", "")?;
        Ok(self
            .state
            .lock()
            .unwrap()
            .groups
            .iter()
            .map(|(name, region)| ResourceGroup {
                name: name.clone(),
                region: region.clone(),
            })
            .collect())
    }

    async fn get_storage_account(&self, group: &str, name: &str) -> Result<Option<StorageAccount>> {
        record(&self.state, "get_storage_account", name)?;
        Ok(self
            .state
            .lock()
            .unwrap()
            .storage_accounts
            .get(&key(group, name))
            .map(|region| StorageAccount {
                name: name.to_string(),
                resource_group: group.to_string(),
                region: region.clone(),
            }))
    }

    async fn create_storage_account(
        &self,
        group: &str,
        name: &str,
        region: &Region,
    ) -> Result<StorageAccount> {
        record(&self.state, "create_storage_account", name)?;
        self.state
            .lock()
            .unwrap()
            .storage_accounts
            .insert(key(group, name), region.clone());
        Ok(StorageAccount {
            name: name.to_string(),
            resource_group: group.to_string(),
            region: region.clone(),
        })
    }

    async fn get_document_db_account(
        &self,
        group: &str,
        name: &str,
    ) -> Result<Option<DocumentDbAccount>> {
        record(&self.state, "get_document_db_account", name)?;
        Ok(self
            .state
            .lock()
            .unwrap()
            .document_db_accounts
            .get(&key(group, name))
            .map(|endpoint| DocumentDbAccount {
                name: name.to_string(),
                resource_group: group.to_string(),
                document_endpoint: endpoint.clone(),
            }))
    }

    async fn create_document_db_account(
        &self,
        request: &DocumentDbAccountCreate,
    ) -> Result<DocumentDbAccount> {
        record(&self.state, "create_document_db_account", &request.name)?;
        let endpoint = format!("https://{}.documents.azure.com:443/", request.name);
        self.state
            .lock()
            .unwrap()
            .document_db_accounts
            .insert(key(&request.resource_group, &request.name), endpoint.clone());
        Ok(DocumentDbAccount {
            name: request.name.clone(),
            resource_group: request.resource_group.clone(),
            document_endpoint: endpoint,
        })
    }

    async fn list_document_db_keys(&self, account: &DocumentDbAccount) -> Result<DocumentDbKeys> {
        record(&self.state, "list_document_db_keys", &account.name)?;
        Ok(DocumentDbKeys {
            primary_master_key: format!("{}-key", account.name),
        })
    }

    async fn delete_document_db_account(&self, group: &str, name: &str) -> Result<()> {
        record(&self.state, "delete_document_db_account", name)?;
        self.state
            .lock()
            .unwrap()
            .document_db_accounts
            .remove(&key(group, name));
        Ok(())
    }

    async fn connect_document_db(
        &self,
        connection: &DocumentDbConnection,
    ) -> Result<FakeDocumentClient> {
        record(&self.state, "connect_document_db", &connection.endpoint)?;
        Ok(FakeDocumentClient {
            state: Arc::clone(&self.state),
        })
    }

    async fn list_function_apps(&self, group: &str) -> Result<Vec<FunctionApp>> {
        record(&self.state, "list_function_apps", group)?;
        Ok(self
            .state
            .lock()
            .unwrap()
            .function_apps
            .iter()
            .filter(|((app_group, _), _)| app_group == group)
            .map(|((app_group, name), app)| FunctionApp {
                name: name.clone(),
                resource_group: app_group.clone(),
                region: app.region.clone(),
            })
            .collect())
    }

    async fn get_function_app(&self, group: &str, name: &str) -> Result<Option<FunctionApp>> {
        record(&self.state, "get_function_app", name)?;
        Ok(self
            .state
            .lock()
            .unwrap()
            .function_apps
            .get(&key(group, name))
            .map(|app| FunctionApp {
                name: name.to_string(),
                resource_group: group.to_string(),
                region: app.region.clone(),
            }))
    }

    async fn function_app_settings(&self, app: &FunctionApp) -> Result<BTreeMap<String, String>> {
        record(&self.state, "function_app_settings", &app.name)?;
        Ok(self
            .state
            .lock()
            .unwrap()
            .function_apps
            .get(&key(&app.resource_group, &app.name))
            .map(|app| app.app_settings.clone())
            .unwrap_or_default())
    }

    async fn create_function_app(&self, request: &FunctionAppCreate) -> Result<FunctionApp> {
        record(&self.state, "create_function_app", &request.name)?;
        self.state.lock().unwrap().function_apps.insert(
            key(&request.resource_group, &request.name),
            FakeFunctionApp {
                region: request.region.clone(),
                storage_account: request.storage_account.clone(),
                runtime_version: request.runtime_version.clone(),
                app_settings: request.app_settings.clone(),
            },
        );
        Ok(FunctionApp {
            name: request.name.clone(),
            resource_group: request.resource_group.clone(),
            region: request.region.clone(),
        })
    }

    async fn update_function_app(&self, app: &FunctionApp, update: &FunctionAppUpdate) -> Result<()> {
        record(&self.state, "update_function_app", &app.name)?;
        let mut state = self.state.lock().unwrap();
        let Some(existing) = state
            .function_apps
            .get_mut(&key(&app.resource_group, &app.name))
        else {
            return Err(CloudError::ResourceNotFound(app.name.clone()));
        };
        if let Some(storage_account) = &update.storage_account {
            existing.storage_account = storage_account.clone();
        }
        for (name, value) in &update.app_settings {
            match value {
                Some(value) => {
                    existing.app_settings.insert(name.clone(), value.clone());
                }
                None => {
                    existing.app_settings.remove(name);
                }
            }
        }
        Ok(())
    }

    async fn delete_function_app(&self, group: &str, name: &str) -> Result<()> {
        record(&self.state, "delete_function_app", name)?;
        self.state
            .lock()
            .unwrap()
            .function_apps
            .remove(&key(group, name));
        Ok(())
    }
}

pub struct FakeDocumentClient {
    state: Arc<Mutex<FakeState>>,
}

#[async_trait]
impl DocumentDataPlane for FakeDocumentClient {
    async fn create_database_if_absent(&self, database_id: &str) -> Result<bool> {
        let exists = self.state.lock().unwrap().databases.contains(database_id);
        if exists {
            record(&self.state, "database_exists", database_id)?;
            return Ok(false);
        }
        record(&self.state, "create_database", database_id)?;
        self.state
            .lock()
            .unwrap()
            .databases
            .insert(database_id.to_string());
        Ok(true)
    }

    async fn create_collection_if_absent(
        &self,
        database_id: &str,
        collection_id: &str,
        throughput: u32,
    ) -> Result<bool> {
        let id = key(database_id, collection_id);
        let exists = self.state.lock().unwrap().collections.contains(&id);
        if exists {
            record(&self.state, "collection_exists", collection_id)?;
            return Ok(false);
        }
        record(&self.state, "create_collection", collection_id)?;
        let mut state = self.state.lock().unwrap();
        state.collection_throughput.insert(id.clone(), throughput);
        state.collections.insert(id);
        Ok(true)
    }
}

pub struct FakeSignalR {
    state: Arc<Mutex<FakeState>>,
}

#[async_trait]
impl SignalRManagement for FakeSignalR {
    async fn check_name_availability(
        &self,
        _region: &Region,
        resource_type: &str,
        name: &str,
    ) -> Result<bool> {
        record(
            &self.state,
            "check_name_availability",
            &format!("{}/{}", resource_type, name),
        )?;
        Ok(!self
            .state
            .lock()
            .unwrap()
            .signalr_services
            .contains_key(name))
    }

    async fn create_or_update(&self, group: &str, name: &str, request: &SignalRCreate) -> Result<()> {
        record(&self.state, "create_or_update_signalr", name)?;
        self.state
            .lock()
            .unwrap()
            .signalr_services
            .insert(name.to_string(), (group.to_string(), request.clone()));
        Ok(())
    }

    async fn delete(&self, _group: &str, name: &str) -> Result<()> {
        record(&self.state, "delete_signalr", name)?;
        self.state.lock().unwrap().signalr_services.remove(name);
        Ok(())
    }
}

#[allow(dead_code)]
pub fn credentials() -> Credentials {
    Credentials::new("tenant", "client", "secret", "sub-1")
}
