mod api;
mod client;
mod commands;
mod config;
mod domain;
mod format;
mod server;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "sysara", version, about = "Point-in-time host resource snapshots")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the monitoring daemon (REST + HTML fragments)
    Serve {
        /// HTTP listen address (overrides config)
        #[arg(long)]
        http_addr: Option<String>,

        /// Log level (overrides config)
        #[arg(long)]
        log_level: Option<String>,

        /// Path to config file (default: ~/.config/sysara/config.yaml)
        #[arg(long)]
        config: Option<String>,
    },

    /// Take a snapshot of this host and print it
    Snapshot {
        /// Output format
        #[arg(long, value_enum, default_value_t = commands::OutputFormat::Table)]
        format: commands::OutputFormat,

        /// Include the process list
        #[arg(long)]
        processes: bool,

        /// Path to config file (default: ~/.config/sysara/config.yaml)
        #[arg(long)]
        config: Option<String>,
    },

    /// Query a sysara daemon's REST API
    Query {
        /// Daemon base URL (defaults to localhost)
        #[arg(long, global = true)]
        url: Option<String>,

        /// Output format
        #[arg(long, global = true, value_enum, default_value_t = commands::OutputFormat::Table)]
        format: commands::OutputFormat,

        #[command(subcommand)]
        command: commands::query::QueryCommands,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve {
            http_addr,
            log_level,
            config,
        } => commands::serve::run(http_addr, log_level, config),
        Commands::Snapshot {
            format,
            processes,
            config,
        } => commands::snapshot::run(format, processes, config.as_deref()),
        Commands::Query {
            url,
            format,
            command,
        } => commands::query::run(url.as_deref(), format, &command),
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;
    use crate::commands::OutputFormat;

    #[test]
    fn cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn format_defaults_to_table() {
        let cli = Cli::try_parse_from(["sysara", "snapshot"]).unwrap();
        let Commands::Snapshot { format, .. } = cli.command else {
            panic!("expected snapshot");
        };
        assert_eq!(format, OutputFormat::Table);

        let cli = Cli::try_parse_from(["sysara", "query", "stats", "--format", "json"]).unwrap();
        let Commands::Query { format, .. } = cli.command else {
            panic!("expected query");
        };
        assert_eq!(format, OutputFormat::Json);
    }

    #[test]
    fn unknown_format_is_rejected() {
        assert!(Cli::try_parse_from(["sysara", "snapshot", "--format", "jsno"]).is_err());
        assert!(Cli::try_parse_from(["sysara", "query", "--format", "xml", "stats"]).is_err());
    }
}
