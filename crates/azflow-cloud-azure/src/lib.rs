//! Azure provider for azflow
//!
//! This crate implements the azflow capability traits for Azure,
//! enabling azflow to provision resource groups, storage, Cosmos DB,
//! function apps and SignalR services.
//!
//! # Requirements
//!
//! - The `az` CLI must be installed
//! - A service principal allowed to manage the target subscription
//!
//! # Example
//!
//! ```ignore
//! use azflow_cloud::{Credentials, TracingLogger, apply};
//! use azflow_cloud_azure::{AzCli, AzureConnector};
//!
//! let connector = AzureConnector::new(AzCli::new("az"));
//! let credentials = Credentials::new(tenant, client, secret, subscription);
//! let report = apply(&connector, &TracingLogger, &credentials, &config).await?;
//! println!("{}", report.summary());
//! ```

pub mod az;
pub mod cosmos;
pub mod error;
pub mod provider;

pub use az::AzCli;
pub use cosmos::CosmosClient;
pub use error::{AzureError, Result};
pub use provider::{AzureConnector, AzureSession, AzureSignalR};
