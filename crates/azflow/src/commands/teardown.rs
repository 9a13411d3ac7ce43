use crate::topology::{self, Profile};
use azflow_cloud::TracingLogger;
use azflow_config::CredentialSettings;
use colored::Colorize;
use std::io::{self, BufRead, Write};

pub async fn handle(overrides: CredentialSettings, yes: bool) -> anyhow::Result<()> {
    // Resource names are shared by every profile
    let config = topology::build(Profile::Initial)?;
    let (connector, credentials) = super::connect(&overrides)?;

    if !yes && !confirm(&config.name)? {
        println!("Aborted");
        return Ok(());
    }

    println!("{}", format!("Tearing down {}...", config.name).yellow());

    let report = azflow_cloud::teardown(&connector, &TracingLogger, &credentials, &config).await?;

    super::print_report(&report);
    Ok(())
}

fn confirm(name: &str) -> anyhow::Result<bool> {
    print!(
        "{} Delete every resource of {}? [y/N] ",
        "!".red().bold(),
        name.cyan()
    );
    io::stdout().flush()?;

    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;

    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}
