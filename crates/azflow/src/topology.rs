//! The playground topologies azflow provisions

use azflow_cloud::{ConfigBuilder, InfrastructureConfig, Region, Result};
use clap::ValueEnum;

pub const CONFIG_NAME: &str = "AppyPlayResources";
pub const RESOURCE_GROUP: &str = "AppyPlay";
pub const STORAGE_ACCOUNT: &str = "appyplaystorage";
pub const SIGNALR_SERVICE: &str = "appyplaysignalr";
pub const DURABLE_APP: &str = "appy-play-durable";
pub const CLIENT_APP: &str = "appy-play-client";

/// Which revision of the playground to converge to
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Profile {
    /// Function apps on runtime `~1`
    Initial,
    /// Function apps on runtime `~2`, client app on the dotnet worker
    Upgrade,
}

pub fn build(profile: Profile) -> Result<InfrastructureConfig> {
    let (runtime_version, client_worker) = match profile {
        Profile::Initial => ("~1", None),
        Profile::Upgrade => ("~2", Some("dotnet")),
    };

    let config = ConfigBuilder::define(CONFIG_NAME)
        .with_resource_group(RESOURCE_GROUP, Region::europe_north())
        .with_storage_account(STORAGE_ACCOUNT, Region::europe_north())?
        .with_signalr_service(SIGNALR_SERVICE, Region::europe_north(), None)?
        .with_function_app(DURABLE_APP, Region::europe_north(), runtime_version, None)?
        .with_function_app(CLIENT_APP, Region::europe_north(), runtime_version, client_worker)?
        .build();

    Ok(config)
}
