use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error(
        "Settings file not found. Looked in:\n\
        - AZFLOW_CONFIG_PATH environment variable\n\
        - current directory: azflow.local.yaml, azflow.yaml\n\
        - ./.azflow/ directory\n\
        - ~/.config/azflow/azflow.yaml"
    )]
    SettingsFileNotFound,

    #[error("Missing credential `{field}`: pass --{flag}, set {env}, or add it to azflow.yaml")]
    MissingCredential {
        field: &'static str,
        flag: &'static str,
        env: &'static str,
    },

    #[error("Failed to parse {path}: {source}")]
    Yaml {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ConfigError>;
