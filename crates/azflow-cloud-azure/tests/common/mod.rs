//! Recording stand-in for the az executable

#![allow(dead_code)]

use azflow_cloud::{CloudConnector, Credentials};
use azflow_cloud_azure::{AzCli, AzureConnector, AzureSession};
use std::os::unix::fs::PermissionsExt;
use std::path::PathBuf;

/// Appends each invocation's arguments, `|`-separated, to LOG_PATH and
/// prints canned az output
const SCRIPT: &str = r#"#!/bin/sh
printf '%s|' "$@" >> 'LOG_PATH'
echo >> 'LOG_PATH'
case "$*" in
  *"--name missing"*)
    echo "ERROR: (ResourceNotFound) The Resource under resource group 'rg1' was not found." >&2
    exit 3
    ;;
  "group exists"*)
    echo true
    ;;
  "functionapp create"*)
    echo '{"name": "fn1", "resourceGroup": "rg1", "location": "northeurope"}'
    ;;
  "functionapp delete"*)
    echo "ERROR: (Conflict) Another operation is in progress." >&2
    exit 1
    ;;
  "storage account show-connection-string"*)
    echo 'DefaultEndpointsProtocol=https;AccountName=acct1'
    ;;
  "cosmosdb create"*)
    echo '{"name": "docs1", "resourceGroup": "rg1", "documentEndpoint": "https://docs1.documents.azure.com:443/"}'
    ;;
  "rest --method post"*)
    echo '{"nameAvailable": false, "reason": "AlreadyExists", "message": "taken"}'
    ;;
esac
"#;

pub struct FakeAz {
    dir: tempfile::TempDir,
    log: PathBuf,
}

impl FakeAz {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let log = dir.path().join("calls.log");
        let script = dir.path().join("az");

        std::fs::write(&script, SCRIPT.replace("LOG_PATH", &log.to_string_lossy())).unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

        Self { dir, log }
    }

    pub fn cli(&self) -> AzCli {
        AzCli::new(self.dir.path().join("az").to_string_lossy().into_owned())
    }

    /// Recorded invocations, in order, arguments joined by `|`
    pub fn calls(&self) -> Vec<String> {
        std::fs::read_to_string(&self.log)
            .unwrap_or_default()
            .lines()
            .map(|line| line.trim_end_matches('|').to_string())
            .collect()
    }

    pub fn clear(&self) {
        let _ = std::fs::remove_file(&self.log);
    }

    /// Logged-in session with the login calls cleared from the log
    pub async fn session(&self) -> AzureSession {
        let session = self.connector().authenticate(&credentials()).await.unwrap();
        self.clear();
        session
    }

    pub fn connector(&self) -> AzureConnector {
        AzureConnector::new(self.cli())
    }
}

pub fn credentials() -> Credentials {
    Credentials::new("tenant", "client", "secret", "sub-1")
}
