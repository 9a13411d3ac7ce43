pub mod error;
pub mod settings;

pub use error::*;
pub use settings::{
    CLIENT_ID_ENV, CLIENT_SECRET_ENV, CredentialSettings, SUBSCRIPTION_ID_ENV, Settings,
    TENANT_ID_ENV,
};

use std::path::PathBuf;

/// Environment variable naming the settings file directly
pub const CONFIG_PATH_ENV: &str = "AZFLOW_CONFIG_PATH";

const CANDIDATES: [&str; 2] = ["azflow.local.yaml", "azflow.yaml"];

/// Find the azflow.yaml settings file
///
/// Search order:
/// 1. `AZFLOW_CONFIG_PATH` (direct path)
/// 2. Current directory: azflow.local.yaml, azflow.yaml
/// 3. `./.azflow/` directory, same order
/// 4. `~/.config/azflow/azflow.yaml` (global settings)
pub fn find_settings_file() -> Result<PathBuf> {
    if let Ok(config_path) = std::env::var(CONFIG_PATH_ENV) {
        let path = PathBuf::from(config_path);
        if path.exists() {
            return Ok(path);
        }
    }

    let current_dir = std::env::current_dir()?;

    for filename in &CANDIDATES {
        let path = current_dir.join(filename);
        if path.exists() {
            return Ok(path);
        }
    }

    let project_dir = current_dir.join(".azflow");
    if project_dir.is_dir() {
        for filename in &CANDIDATES {
            let path = project_dir.join(filename);
            if path.exists() {
                return Ok(path);
            }
        }
    }

    if let Some(config_dir) = dirs::config_dir() {
        let global = config_dir.join("azflow").join("azflow.yaml");
        if global.exists() {
            return Ok(global);
        }
    }

    Err(ConfigError::SettingsFileNotFound)
}

/// Load the discovered settings file, or defaults when there is none
pub fn load_settings() -> Result<Settings> {
    match find_settings_file() {
        Ok(path) => Settings::load(&path),
        Err(ConfigError::SettingsFileNotFound) => Ok(Settings::default()),
        Err(e) => Err(e),
    }
}
