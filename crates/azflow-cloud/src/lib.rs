//! azflow cloud orchestration
//!
//! Declares a fixed topology of Azure resources and reconciles it against a
//! subscription with idempotent "create if absent" / "delete if present" steps.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────┐
//! │                   azflow CLI                      │
//! │            (azflow apply / teardown)              │
//! └─────────────────┬────────────────────────────────┘
//!                   │
//! ┌─────────────────▼────────────────────────────────┐
//! │                 azflow-cloud                      │
//! │  ┌───────────────┐      ┌──────────────────────┐ │
//! │  │ ConfigBuilder │ ───▶ │ InfrastructureConfig │ │
//! │  └───────────────┘      └──────────┬───────────┘ │
//! │                         ┌──────────▼───────────┐ │
//! │                         │  apply / teardown    │ │
//! │                         └──────────┬───────────┘ │
//! │  ┌─────────────────────────────────▼──────────┐  │
//! │  │  trait CloudConnector / ManagementSession  │  │
//! │  └────────────────────────────────────────────┘  │
//! └─────────────────┬────────────────────────────────┘
//!                   │
//! ┌─────────────────▼───────────────┐
//! │   azflow-cloud-azure (az CLI,    │
//! │   Cosmos DB REST)                │
//! └──────────────────────────────────┘
//! ```

pub mod action;
pub mod builder;
pub mod constants;
pub mod credentials;
pub mod error;
pub mod logger;
pub mod model;
pub mod orchestrator;
pub mod provider;

// Re-exports
pub use action::{Action, ActionType, ReportSummary, ResourceKind, RunReport};
pub use builder::ConfigBuilder;
pub use credentials::Credentials;
pub use error::{CloudError, Result};
pub use logger::{Logger, MemoryLogger, TracingLogger};
pub use model::{
    ConsistencyLevel, DocumentDbSpec, FunctionAppSpec, InfrastructureConfig, Region,
    ResourceGroupSpec, ResourceSku, SignalRSpec, StorageAccountSpec,
};
pub use orchestrator::{apply, teardown, worker_runtime_changed};
pub use provider::{
    CloudConnector, DocumentDataPlane, DocumentDbAccount, DocumentDbAccountCreate,
    DocumentDbConnection, DocumentDbKeys, FunctionApp, FunctionAppCreate, FunctionAppUpdate,
    ManagementSession, ResourceGroup, SignalRCreate, SignalRManagement, StorageAccount,
};
