//! Idempotent reconciliation of an [`InfrastructureConfig`]
//!
//! [`apply`] walks the configured slots in dependency order
//! (resource group, storage, document db, SignalR, function apps) and creates
//! whatever is missing. [`teardown`] walks them in reverse and deletes whatever
//! is present. Every step re-queries the remote state before acting, so a
//! failed run is recovered by running it again. There is no rollback: an error
//! aborts the remaining steps and leaves already-created resources in place.
//!
//! Runs are strictly sequential and assume a single writer; the existence
//! checks are check-then-act.

use crate::action::{ActionType, ResourceKind, RunReport};
use crate::constants::{
    DEFAULT_COLLECTION_THROUGHPUT, DESCRIPTION_TAG, SIGNALR_RESOURCE_TYPE, WORKER_RUNTIME_SETTING,
};
use crate::credentials::Credentials;
use crate::error::{CloudError, Result};
use crate::logger::Logger;
use crate::model::{
    ConsistencyLevel, DocumentDbSpec, FunctionAppSpec, InfrastructureConfig, ResourceGroupSpec,
    SignalRSpec, StorageAccountSpec,
};
use crate::provider::{
    CloudConnector, DocumentDataPlane, DocumentDbAccountCreate, DocumentDbConnection,
    FunctionAppCreate, FunctionAppUpdate, ManagementSession, SignalRCreate, SignalRManagement,
};
use std::collections::BTreeMap;
use std::time::Instant;
use tracing::Instrument;

/// Create or update every resource declared in `config`
pub async fn apply<C: CloudConnector>(
    connector: &C,
    logger: &dyn Logger,
    credentials: &Credentials,
    config: &InfrastructureConfig,
) -> Result<RunReport> {
    let span = tracing::info_span!("apply", config = %config.name);
    apply_config(connector, logger, credentials, config)
        .instrument(span)
        .await
}

/// Delete every resource declared in `config`, in reverse dependency order
pub async fn teardown<C: CloudConnector>(
    connector: &C,
    logger: &dyn Logger,
    credentials: &Credentials,
    config: &InfrastructureConfig,
) -> Result<RunReport> {
    let span = tracing::info_span!("teardown", config = %config.name);
    teardown_config(connector, logger, credentials, config)
        .instrument(span)
        .await
}

async fn apply_config<C: CloudConnector>(
    connector: &C,
    logger: &dyn Logger,
    credentials: &Credentials,
    config: &InfrastructureConfig,
) -> Result<RunReport> {
    let resource_group = validate(credentials, config)?;
    let start = Instant::now();
    let mut report = RunReport::new();

    logger.info(&format!("Creating {} azure infrastructure", config.name));
    let session = authenticate(connector, logger, credentials).await?;

    ensure_resource_group(&session, logger, resource_group, &mut report).await?;
    list_resource_groups(&session, logger).await?;

    if let Some(storage) = &config.storage_account {
        ensure_storage_account(&session, logger, storage, &mut report).await?;
    }

    if let Some(document_db) = &config.document_db {
        ensure_document_db(&session, logger, document_db, &mut report).await?;
    }

    if let Some(signalr) = &config.signalr {
        let management = connector.connect_signalr(credentials).await?;
        ensure_signalr_service(&management, logger, signalr, &mut report).await?;
    }

    if !config.function_apps.is_empty() {
        for function_app in &config.function_apps {
            ensure_function_app(&session, logger, function_app, &mut report).await?;
        }
        list_function_apps(&session, logger, &resource_group.name).await?;
    }

    report.duration_ms = start.elapsed().as_millis() as u64;
    logger.info(&format!(
        "Created or updated {} azure infrastructure ({})",
        config.name,
        report.summary()
    ));
    Ok(report)
}

async fn teardown_config<C: CloudConnector>(
    connector: &C,
    logger: &dyn Logger,
    credentials: &Credentials,
    config: &InfrastructureConfig,
) -> Result<RunReport> {
    let resource_group = validate(credentials, config)?;
    let start = Instant::now();
    let mut report = RunReport::new();

    logger.info(&format!("Deleting {} azure infrastructure", config.name));
    let session = authenticate(connector, logger, credentials).await?;

    if let Some(document_db) = &config.document_db {
        delete_document_db(&session, logger, document_db, &mut report).await?;
    }

    if let Some(signalr) = &config.signalr {
        let management = connector.connect_signalr(credentials).await?;
        delete_signalr_service(&management, logger, signalr, &mut report).await?;
    }

    if !config.function_apps.is_empty() {
        for function_app in &config.function_apps {
            delete_function_app(&session, logger, function_app, &mut report).await?;
        }
        list_function_apps(&session, logger, &resource_group.name).await?;
    }

    if let Some(storage) = &config.storage_account {
        delete_storage_account(&session, logger, storage, &mut report).await?;
    }

    delete_resource_group(&session, logger, resource_group, &mut report).await?;

    report.duration_ms = start.elapsed().as_millis() as u64;
    logger.info(&format!(
        "Deleted {} azure infrastructure ({})",
        config.name,
        report.summary()
    ));
    Ok(report)
}

fn validate<'a>(
    credentials: &Credentials,
    config: &'a InfrastructureConfig,
) -> Result<&'a ResourceGroupSpec> {
    let missing = credentials.missing_fields();
    if !missing.is_empty() {
        return Err(CloudError::InvalidConfig(format!(
            "credentials are missing {}",
            missing.join(", ")
        )));
    }

    config.resource_group.as_ref().ok_or_else(|| {
        CloudError::InvalidConfig(format!(
            "configuration '{}' does not define a resource group",
            config.name
        ))
    })
}

async fn authenticate<C: CloudConnector>(
    connector: &C,
    logger: &dyn Logger,
    credentials: &Credentials,
) -> Result<C::Session> {
    logger.info("Authenticating with azure credentials");
    let session = connector.authenticate(credentials).await?;
    logger.info("Authenticated with azure credentials");
    Ok(session)
}

/// Whether the desired worker runtime differs from the deployed app setting
///
/// Unset on both sides is no change. A desired runtime against a missing
/// setting is a change, and so is any mismatch once the setting exists.
pub fn worker_runtime_changed(desired: Option<&str>, current: Option<&str>) -> bool {
    match (desired, current) {
        (None, None) => false,
        (Some(desired), None) => !desired.is_empty(),
        (desired, Some(current)) => desired != Some(current),
    }
}

// ========== Resource groups ==========

async fn ensure_resource_group<S: ManagementSession>(
    session: &S,
    logger: &dyn Logger,
    spec: &ResourceGroupSpec,
    report: &mut RunReport,
) -> Result<()> {
    logger.info(&format!("Creating resource group with name {}", spec.name));
    if session.resource_group_exists(&spec.name).await? {
        logger.info(&format!(
            "Resource group already exists with name {}",
            spec.name
        ));
        report.record(ResourceKind::ResourceGroup, &spec.name, ActionType::NoOp);
        return Ok(());
    }

    session
        .create_resource_group(&spec.name, &spec.region)
        .await?;
    logger.info(&format!("Created resource group with name {}", spec.name));
    report.record(ResourceKind::ResourceGroup, &spec.name, ActionType::Create);
    Ok(())
}

async fn list_resource_groups<S: ManagementSession>(session: &S, logger: &dyn Logger) -> Result<()> {
    logger.info("Listing all resource groups:");
    for group in session.list_resource_groups().await? {
        logger.info(&format!("\t Resource group: {}", group.name));
    }
    Ok(())
}

async fn delete_resource_group<S: ManagementSession>(
    session: &S,
    logger: &dyn Logger,
    spec: &ResourceGroupSpec,
    report: &mut RunReport,
) -> Result<()> {
    logger.info(&format!("Deleting resource group with name {}", spec.name));
    if !session.resource_group_exists(&spec.name).await? {
        logger.info(&format!(
            "Resource group does not exist with name {}",
            spec.name
        ));
        report.record(ResourceKind::ResourceGroup, &spec.name, ActionType::NoOp);
        return Ok(());
    }

    session.delete_resource_group(&spec.name).await?;
    logger.info(&format!("Deleted resource group with name {}", spec.name));
    report.record(ResourceKind::ResourceGroup, &spec.name, ActionType::Delete);
    Ok(())
}

// ========== Storage accounts ==========

async fn ensure_storage_account<S: ManagementSession>(
    session: &S,
    logger: &dyn Logger,
    spec: &StorageAccountSpec,
    report: &mut RunReport,
) -> Result<()> {
    logger.info(&format!(
        "Creating storage account with name {} in group {}",
        spec.account_name, spec.resource_group_name
    ));
    if session
        .get_storage_account(&spec.resource_group_name, &spec.account_name)
        .await?
        .is_some()
    {
        logger.info(&format!(
            "Storage account with name {} already exists in group {}",
            spec.account_name, spec.resource_group_name
        ));
        report.record(
            ResourceKind::StorageAccount,
            &spec.account_name,
            ActionType::NoOp,
        );
        return Ok(());
    }

    session
        .create_storage_account(&spec.resource_group_name, &spec.account_name, &spec.region)
        .await?;
    logger.info(&format!(
        "Created storage account with name {} in group {}",
        spec.account_name, spec.resource_group_name
    ));
    report.record(
        ResourceKind::StorageAccount,
        &spec.account_name,
        ActionType::Create,
    );
    Ok(())
}

/// Removes the account by deleting its whole resource group
///
/// The final resource group step of teardown then finds the group gone.
async fn delete_storage_account<S: ManagementSession>(
    session: &S,
    logger: &dyn Logger,
    spec: &StorageAccountSpec,
    report: &mut RunReport,
) -> Result<()> {
    logger.info(&format!(
        "Deleting storage account with name {} in group {}",
        spec.account_name, spec.resource_group_name
    ));
    if session
        .get_storage_account(&spec.resource_group_name, &spec.account_name)
        .await?
        .is_none()
    {
        logger.info(&format!(
            "Storage account with name {} does not exist in group {}",
            spec.account_name, spec.resource_group_name
        ));
        report.record(
            ResourceKind::StorageAccount,
            &spec.account_name,
            ActionType::NoOp,
        );
        return Ok(());
    }

    tracing::warn!(
        group = %spec.resource_group_name,
        account = %spec.account_name,
        "storage account teardown deletes the enclosing resource group"
    );
    session
        .delete_resource_group(&spec.resource_group_name)
        .await?;
    logger.info(&format!(
        "Deleted resource group with name {}",
        spec.resource_group_name
    ));
    report.record(
        ResourceKind::StorageAccount,
        &spec.account_name,
        ActionType::Delete,
    );
    Ok(())
}

// ========== Document database ==========

async fn ensure_document_db<S: ManagementSession>(
    session: &S,
    logger: &dyn Logger,
    spec: &DocumentDbSpec,
    report: &mut RunReport,
) -> Result<()> {
    logger.info(&format!(
        "Creating document db account with name {} in group {}",
        spec.account_name, spec.resource_group_name
    ));
    let account = match session
        .get_document_db_account(&spec.resource_group_name, &spec.account_name)
        .await?
    {
        Some(account) => {
            logger.info(&format!(
                "Document db account with name {} already exists in group {}",
                spec.account_name, spec.resource_group_name
            ));
            report.record(
                ResourceKind::DocumentDbAccount,
                &spec.account_name,
                ActionType::NoOp,
            );
            account
        }
        None => {
            let request = DocumentDbAccountCreate {
                resource_group: spec.resource_group_name.clone(),
                name: spec.account_name.clone(),
                region: spec.region.clone(),
                consistency: ConsistencyLevel::Eventual,
                write_replication_region: spec.write_replication_region.clone(),
                read_replication_region: spec.read_replication_region.clone(),
            };
            let account = session.create_document_db_account(&request).await?;
            logger.info(&format!(
                "Created document db account with name {} in group {}",
                spec.account_name, spec.resource_group_name
            ));
            report.record(
                ResourceKind::DocumentDbAccount,
                &spec.account_name,
                ActionType::Create,
            );
            account
        }
    };

    let Some(database_id) = spec.database_id.as_deref() else {
        logger.info(&format!(
            "No database declared for document db account {}",
            spec.account_name
        ));
        return Ok(());
    };

    let keys = session.list_document_db_keys(&account).await?;
    let connection = DocumentDbConnection {
        endpoint: account.document_endpoint.clone(),
        master_key: keys.primary_master_key,
    };
    let client = session.connect_document_db(&connection).await?;

    logger.info(&format!(
        "Creating document database if not exists with id {}",
        database_id
    ));
    let created = client.create_database_if_absent(database_id).await?;
    logger.info(&format!("Ensured document database with id {}", database_id));
    report.record(
        ResourceKind::DocumentDatabase,
        database_id,
        created_or_unchanged(created),
    );

    for collection_id in &spec.collection_ids {
        logger.info(&format!(
            "Creating collection if not exists for database {} with id {}",
            database_id, collection_id
        ));
        let created = client
            .create_collection_if_absent(database_id, collection_id, DEFAULT_COLLECTION_THROUGHPUT)
            .await?;
        logger.info(&format!(
            "Ensured collection for database {} with id {}",
            database_id, collection_id
        ));
        report.record(
            ResourceKind::DocumentCollection,
            collection_id,
            created_or_unchanged(created),
        );
    }

    Ok(())
}

async fn delete_document_db<S: ManagementSession>(
    session: &S,
    logger: &dyn Logger,
    spec: &DocumentDbSpec,
    report: &mut RunReport,
) -> Result<()> {
    logger.info(&format!(
        "Deleting document db account with name {} in group {}",
        spec.account_name, spec.resource_group_name
    ));
    if session
        .get_document_db_account(&spec.resource_group_name, &spec.account_name)
        .await?
        .is_none()
    {
        logger.info(&format!(
            "Document db account with name {} does not exist in group {}",
            spec.account_name, spec.resource_group_name
        ));
        report.record(
            ResourceKind::DocumentDbAccount,
            &spec.account_name,
            ActionType::NoOp,
        );
        return Ok(());
    }

    session
        .delete_document_db_account(&spec.resource_group_name, &spec.account_name)
        .await?;
    logger.info(&format!(
        "Deleted document db account with name {} in group {}",
        spec.account_name, spec.resource_group_name
    ));
    report.record(
        ResourceKind::DocumentDbAccount,
        &spec.account_name,
        ActionType::Delete,
    );
    Ok(())
}

fn created_or_unchanged(created: bool) -> ActionType {
    if created {
        ActionType::Create
    } else {
        ActionType::NoOp
    }
}

// ========== SignalR ==========

/// Creates the service when its name is still available
///
/// An unavailable name is taken to mean the service already exists; its
/// parameters are not compared or updated.
async fn ensure_signalr_service<M: SignalRManagement>(
    management: &M,
    logger: &dyn Logger,
    spec: &SignalRSpec,
    report: &mut RunReport,
) -> Result<()> {
    logger.info(&format!(
        "Creating SignalR service with name {} in group {}",
        spec.service_name, spec.resource_group_name
    ));
    let available = management
        .check_name_availability(&spec.region, SIGNALR_RESOURCE_TYPE, &spec.service_name)
        .await?;
    if !available {
        logger.info(&format!(
            "SignalR service with name {} already exists in group {}",
            spec.service_name, spec.resource_group_name
        ));
        report.record(ResourceKind::SignalR, &spec.service_name, ActionType::NoOp);
        return Ok(());
    }

    let request = SignalRCreate {
        location: spec.region.clone(),
        sku: spec.sku.clone(),
        tags: BTreeMap::from([(DESCRIPTION_TAG.to_string(), spec.description.clone())]),
    };
    management
        .create_or_update(&spec.resource_group_name, &spec.service_name, &request)
        .await?;
    logger.info(&format!(
        "Created SignalR service with name {} in group {}",
        spec.service_name, spec.resource_group_name
    ));
    report.record(ResourceKind::SignalR, &spec.service_name, ActionType::Create);
    Ok(())
}

async fn delete_signalr_service<M: SignalRManagement>(
    management: &M,
    logger: &dyn Logger,
    spec: &SignalRSpec,
    report: &mut RunReport,
) -> Result<()> {
    logger.info(&format!(
        "Deleting SignalR service with name {} in group {}",
        spec.service_name, spec.resource_group_name
    ));
    let available = management
        .check_name_availability(&spec.region, SIGNALR_RESOURCE_TYPE, &spec.service_name)
        .await?;
    if available {
        logger.info(&format!(
            "SignalR service with name {} does not exist in group {}",
            spec.service_name, spec.resource_group_name
        ));
        report.record(ResourceKind::SignalR, &spec.service_name, ActionType::NoOp);
        return Ok(());
    }

    management
        .delete(&spec.resource_group_name, &spec.service_name)
        .await?;
    logger.info(&format!(
        "Deleted SignalR service with name {} in group {}",
        spec.service_name, spec.resource_group_name
    ));
    report.record(ResourceKind::SignalR, &spec.service_name, ActionType::Delete);
    Ok(())
}

// ========== Function apps ==========

async fn ensure_function_app<S: ManagementSession>(
    session: &S,
    logger: &dyn Logger,
    spec: &FunctionAppSpec,
    report: &mut RunReport,
) -> Result<()> {
    logger.info(&format!(
        "Creating function app with name {} in group {}",
        spec.app_name, spec.resource_group_name
    ));
    let existing = session
        .list_function_apps(&spec.resource_group_name)
        .await?
        .into_iter()
        .find(|app| app.name == spec.app_name);
    let storage = session
        .get_storage_account(&spec.resource_group_name, &spec.storage_account_name)
        .await?
        .ok_or_else(|| {
            CloudError::ResourceNotFound(format!(
                "storage account {} in group {} (required by function app {})",
                spec.storage_account_name, spec.resource_group_name, spec.app_name
            ))
        })?;

    if let Some(app) = existing {
        logger.info(&format!(
            "Function app with name {} already exists in group {}",
            spec.app_name, spec.resource_group_name
        ));
        logger.info(&format!(
            "Looking for changes in function app {} in group {}",
            spec.app_name, spec.resource_group_name
        ));

        let settings = session.function_app_settings(&app).await?;
        let current = settings.get(WORKER_RUNTIME_SETTING).map(String::as_str);
        let desired = spec.worker_runtime.as_deref();
        if !worker_runtime_changed(desired, current) {
            logger.info(&format!(
                "There are no changes in function app {} in group {}",
                spec.app_name, spec.resource_group_name
            ));
            report.record(ResourceKind::FunctionApp, &spec.app_name, ActionType::NoOp);
            return Ok(());
        }

        let update = FunctionAppUpdate {
            storage_account: Some(storage.name),
            app_settings: BTreeMap::from([(
                WORKER_RUNTIME_SETTING.to_string(),
                desired.map(str::to_string),
            )]),
        };
        logger.info(&format!(
            "Applying changes in function app {} in group {}",
            spec.app_name, spec.resource_group_name
        ));
        session.update_function_app(&app, &update).await?;
        logger.info(&format!(
            "Applied changes in function app {} in group {}",
            spec.app_name, spec.resource_group_name
        ));
        report.record(ResourceKind::FunctionApp, &spec.app_name, ActionType::Update);
        return Ok(());
    }

    let mut app_settings = BTreeMap::new();
    if let Some(worker_runtime) = &spec.worker_runtime {
        app_settings.insert(WORKER_RUNTIME_SETTING.to_string(), worker_runtime.clone());
    }
    let request = FunctionAppCreate {
        resource_group: spec.resource_group_name.clone(),
        name: spec.app_name.clone(),
        region: spec.region.clone(),
        storage_account: storage.name,
        runtime_version: spec.extensions_runtime_version.clone(),
        app_settings,
    };
    session.create_function_app(&request).await?;
    logger.info(&format!(
        "Created function app with name {} in group {}",
        spec.app_name, spec.resource_group_name
    ));
    report.record(ResourceKind::FunctionApp, &spec.app_name, ActionType::Create);
    Ok(())
}

async fn list_function_apps<S: ManagementSession>(
    session: &S,
    logger: &dyn Logger,
    group: &str,
) -> Result<()> {
    logger.info("Listing all function apps:");
    for app in session.list_function_apps(group).await? {
        logger.info(&format!("\t Function app: {}", app.name));
    }
    Ok(())
}

async fn delete_function_app<S: ManagementSession>(
    session: &S,
    logger: &dyn Logger,
    spec: &FunctionAppSpec,
    report: &mut RunReport,
) -> Result<()> {
    logger.info(&format!(
        "Deleting function app with name {} in group {}",
        spec.app_name, spec.resource_group_name
    ));
    if session
        .get_function_app(&spec.resource_group_name, &spec.app_name)
        .await?
        .is_none()
    {
        logger.info(&format!(
            "Function app with name {} does not exist in group {}",
            spec.app_name, spec.resource_group_name
        ));
        report.record(ResourceKind::FunctionApp, &spec.app_name, ActionType::NoOp);
        return Ok(());
    }

    session
        .delete_function_app(&spec.resource_group_name, &spec.app_name)
        .await?;
    logger.info(&format!(
        "Deleted function app with name {} in group {}",
        spec.app_name, spec.resource_group_name
    ));
    report.record(ResourceKind::FunctionApp, &spec.app_name, ActionType::Delete);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_worker_runtime_unset_on_both_sides() {
        assert!(!worker_runtime_changed(None, None));
    }

    #[test]
    fn test_worker_runtime_desired_against_missing_setting() {
        assert!(worker_runtime_changed(Some("dotnet"), None));
        assert!(!worker_runtime_changed(Some(""), None));
    }

    #[test]
    fn test_worker_runtime_mismatch() {
        assert!(worker_runtime_changed(Some("dotnet"), Some("node")));
        assert!(worker_runtime_changed(None, Some("node")));
        assert!(!worker_runtime_changed(Some("dotnet"), Some("dotnet")));
    }
}
