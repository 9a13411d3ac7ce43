use crate::topology::{self, Profile};
use azflow_cloud::TracingLogger;
use azflow_config::CredentialSettings;
use colored::Colorize;

pub async fn handle(overrides: CredentialSettings, profile: Profile) -> anyhow::Result<()> {
    let config = topology::build(profile)?;
    let (connector, credentials) = super::connect(&overrides)?;

    println!(
        "{}",
        format!("Applying {} ({:?} profile)...", config.name, profile).yellow()
    );

    let report = azflow_cloud::apply(&connector, &TracingLogger, &credentials, &config).await?;

    super::print_report(&report);
    if !report.has_changes() {
        println!("{}", "✓ Already up to date".green());
    }

    Ok(())
}
