//! ddcheck CLI - check how many VTubers a Bilibili user follows

use anyhow::Context;
use clap::Parser;
use ddcheck_core::{spawn_registry_refresh, DdCheck, DdCheckConfig};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "ddcheck")]
#[command(about = "ddcheck - what fraction of a Bilibili follow-list are VTubers")]
struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true, default_value = "config/ddcheck.toml")]
    config: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Check a user by UID or exact display name
    Check {
        /// UID or display name
        target: String,

        /// Print the report payload as JSON
        #[arg(long)]
        json: bool,
    },
    /// Refresh the VTuber registry from the mirrors once
    Update,
    /// Keep the registry refreshed until interrupted
    Serve,
    /// Fetch and print the current WBI signing keys
    Keys,
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

    let config = DdCheckConfig::load(&cli.config)
        .with_context(|| format!("failed to load config {}", cli.config))?;

    let Some(command) = cli.command else {
        println!("ddcheck v{} - Use --help for commands", env!("CARGO_PKG_VERSION"));
        return Ok(());
    };

    let ddcheck = DdCheck::new(config)?;

    match command {
        Commands::Check { target, json } => {
            let report = match ddcheck.check(&target).await {
                Ok(report) => report,
                Err(e) => {
                    error!("Check for '{}' failed: {}", target, e);
                    anyhow::bail!("{}", e.user_message());
                }
            };
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print!("{}", report.summary());
            }
        }
        Commands::Update => {
            let count = ddcheck
                .refresh_registry()
                .await
                .map_err(|e| anyhow::anyhow!("{}", e.user_message()))?;
            println!("Registry updated: {} entries", count);
        }
        Commands::Serve => {
            if ddcheck.config().registry.refresh_on_start {
                if let Err(e) = ddcheck.refresh_registry().await {
                    error!("Startup registry refresh failed: {}", e);
                }
            }

            let handle = spawn_registry_refresh(ddcheck.registry().clone(), ddcheck.refresh_interval());
            tokio::signal::ctrl_c().await?;
            info!("Shutting down");
            handle.abort();
        }
        Commands::Keys => {
            let keys = ddcheck
                .signing_keys()
                .await
                .map_err(|e| anyhow::anyhow!("{}", e.user_message()))?;
            println!("img_key: {}", keys.image_key());
            println!("sub_key: {}", keys.sub_key());
            println!("mixin:   {}", keys.mixin_key()?);
        }
    }

    Ok(())
}
