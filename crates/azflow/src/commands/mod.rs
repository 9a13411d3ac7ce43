pub mod apply;
pub mod show;
pub mod teardown;

use azflow_cloud::{ActionType, Credentials, RunReport};
use azflow_cloud_azure::{AzCli, AzureConnector};
use azflow_config::CredentialSettings;
use colored::Colorize;

/// Resolve credentials and build the Azure connector from azflow.yaml
pub fn connect(overrides: &CredentialSettings) -> anyhow::Result<(AzureConnector, Credentials)> {
    let settings = azflow_config::load_settings()?;
    let credentials = settings.resolve_credentials(overrides)?;

    let mut connector = AzureConnector::new(AzCli::new(&settings.az_path));
    if let Some(api_version) = &settings.cosmos_api_version {
        connector = connector.with_cosmos_api_version(api_version);
    }

    Ok((connector, credentials))
}

pub fn print_report(report: &RunReport) {
    println!();
    for action in &report.actions {
        let marker = match action.action_type {
            ActionType::Create => "+".green(),
            ActionType::Update => "~".yellow(),
            ActionType::Delete => "-".red(),
            ActionType::NoOp => "=".dimmed(),
        };
        println!("  {} {} {}", marker, action.resource_kind, action.name.cyan());
    }

    println!();
    println!(
        "{} ({} ms)",
        report.summary().to_string().bold(),
        report.duration_ms
    );
}
