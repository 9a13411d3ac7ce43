//! Azure provider error types

use azflow_cloud::CloudError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AzureError {
    #[error("az not found. Please install the Azure CLI: https://aka.ms/installazurecli")]
    AzNotFound,

    #[error("az authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("az command failed: {0}")]
    CommandFailed(String),

    #[error("Invalid document db master key: {0}")]
    InvalidKey(String),

    #[error("Cosmos DB API error ({status}): {message}")]
    CosmosApi { status: u16, message: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parse error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl AzureError {
    /// Convert into the orchestrator's error, tagging the failed operation
    ///
    /// Only a failed `az login` is an authentication failure; a rejected
    /// data plane request is a remote operation failure like any other.
    pub fn into_cloud(self, operation: &str) -> CloudError {
        match self {
            AzureError::AuthenticationFailed(message) => CloudError::AuthenticationFailed(message),
            other => CloudError::remote(operation, other.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, AzureError>;
