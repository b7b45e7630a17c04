pub mod query;
pub mod serve;
pub mod snapshot;

use clap::ValueEnum;

/// Output format for commands that print a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
}
