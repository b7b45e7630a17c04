//! `sysara query` — fetch a snapshot from a running daemon.

use anyhow::Result;
use clap::Subcommand;

use super::snapshot::{print_processes, print_system};
use super::OutputFormat;
use crate::client::{SysaraClient, DEFAULT_BASE_URL};

#[derive(Subcommand)]
pub enum QueryCommands {
    /// Daemon health check
    Health,
    /// Current system statistics
    Stats,
    /// Current process list
    Processes,
}

pub fn run(url: Option<&str>, format: OutputFormat, command: &QueryCommands) -> Result<()> {
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(run_async(url, format, command))
}

async fn run_async(url: Option<&str>, format: OutputFormat, command: &QueryCommands) -> Result<()> {
    let client = SysaraClient::new(url.unwrap_or(DEFAULT_BASE_URL))?;
    let json = format == OutputFormat::Json;

    match command {
        QueryCommands::Health => {
            let data = client.health().await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&data)?);
            } else {
                println!(
                    "{} (version {}, up {}s)",
                    data.status, data.version, data.uptime_secs
                );
            }
        }
        QueryCommands::Stats => {
            let data = client.stats().await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&data)?);
            } else {
                print_system(&data);
            }
        }
        QueryCommands::Processes => {
            let data = client.processes().await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&data)?);
            } else {
                print_processes(&data);
            }
        }
    }
    Ok(())
}
