mod commands;
mod topology;

use azflow_config::CredentialSettings;
use clap::{Args, Parser, Subcommand};
use topology::Profile;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "azflow")]
#[command(about = "Provision the AppyPlay Azure playground, idempotently", long_about = None)]
struct Cli {
    #[command(flatten)]
    credentials: CredentialArgs,

    #[command(subcommand)]
    command: Commands,
}

/// Service principal; each flag falls back to its env var, then to azflow.yaml
#[derive(Args)]
struct CredentialArgs {
    /// Azure AD tenant
    #[arg(long, env = "AZURE_TENANT_ID", global = true)]
    tenant_id: Option<String>,

    /// Service principal application (client) id
    #[arg(long, env = "AZURE_CLIENT_ID", global = true)]
    client_id: Option<String>,

    /// Service principal secret
    #[arg(long, env = "AZURE_CLIENT_SECRET", global = true, hide_env_values = true)]
    client_secret: Option<String>,

    /// Subscription the resources live in
    #[arg(long, env = "AZURE_SUBSCRIPTION_ID", global = true)]
    subscription_id: Option<String>,
}

impl From<CredentialArgs> for CredentialSettings {
    fn from(args: CredentialArgs) -> Self {
        Self {
            tenant_id: args.tenant_id,
            client_id: args.client_id,
            client_secret: args.client_secret,
            subscription_id: args.subscription_id,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create missing resources and update function apps that drifted
    Apply {
        /// Topology revision to converge to
        #[arg(short, long, value_enum, default_value_t = Profile::Initial)]
        profile: Profile,
    },
    /// Delete the playground resources
    Teardown {
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Print the desired topology as JSON
    Show {
        #[arg(short, long, value_enum, default_value_t = Profile::Initial)]
        profile: Profile,
    },
    /// Show version information
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Version => {
            println!("azflow {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        Commands::Show { profile } => commands::show::handle(profile),
        Commands::Apply { profile } => commands::apply::handle(cli.credentials.into(), profile).await,
        Commands::Teardown { yes } => commands::teardown::handle(cli.credentials.into(), yes).await,
    }
}
