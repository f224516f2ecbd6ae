//! CLI module for assignd
//!
//! Command-line interface definitions and handlers.
//!
//! # Commands
//!
//! - `assign` - Run one assignment decision for a work item
//! - `rank` - Score and rank a group without committing anything
//! - `health` - Check roster and ticketing backends
//! - `config` - Configuration utilities (init, validate)
//! - `completions` - Generate shell completions
//!
//! # Example
//!
//! ```bash
//! # Rank the network-ops group as of now
//! assignd rank --group network-ops
//!
//! # Route an incident
//! assignd assign --item INC0001 --group network-ops --priority 2
//!
//! # Generate shell completions
//! assignd completions bash > ~/.bash_completion.d/assignd
//! ```

pub mod assign;
pub mod completions;
pub mod config;
pub mod health;
pub mod output;
pub mod rank;
pub mod setup;

pub use completions::handle_completions;
pub use config::{handle_config_init, handle_config_validate};

use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// assignd - incident assignment decision engine
#[derive(Parser, Debug)]
#[command(
    name = "assignd",
    version,
    about = "Routes work items to the best-suited member of a group"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run one assignment decision
    Assign(AssignArgs),
    /// Rank a group's candidates without committing
    Rank(RankArgs),
    /// Check backend health
    Health(HealthArgs),
    /// Configuration utilities
    #[command(subcommand)]
    Config(ConfigCommands),
    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Options shared by commands that build an engine
#[derive(Args, Debug, Clone)]
pub struct EngineArgs {
    /// Path to configuration file
    #[arg(short, long, default_value = "assignd.toml")]
    pub config: PathBuf,

    /// Override roster file
    #[arg(long, env = "ASSIGND_ROSTER_PATH")]
    pub roster: Option<PathBuf>,

    /// Override ticketing fixture file (fixture backend only)
    #[arg(long)]
    pub fixture: Option<PathBuf>,

    /// Set log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "ASSIGND_LOG_LEVEL")]
    pub log_level: Option<String>,
}

#[derive(Args, Debug)]
pub struct AssignArgs {
    #[command(flatten)]
    pub engine: EngineArgs,

    /// Work item identifier
    #[arg(short, long)]
    pub item: String,

    /// Owning group
    #[arg(short, long)]
    pub group: String,

    /// Priority, 1 (most urgent) to 5
    #[arg(short, long, value_parser = clap::value_parser!(u8).range(1..=5))]
    pub priority: u8,

    /// Severity
    #[arg(long)]
    pub severity: Option<u8>,

    /// When the item was opened (RFC 3339), defaults to now
    #[arg(long)]
    pub opened_at: Option<DateTime<Utc>>,

    /// Evaluate shifts at this instant (RFC 3339) instead of the clock
    #[arg(long)]
    pub at: Option<DateTime<Utc>>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct RankArgs {
    #[command(flatten)]
    pub engine: EngineArgs,

    /// Group to rank
    #[arg(short, long)]
    pub group: String,

    /// Evaluate shifts at this instant (RFC 3339), defaults to now
    #[arg(long)]
    pub at: Option<DateTime<Utc>>,

    /// JSON file mapping candidate ids to their open items
    #[arg(short, long)]
    pub workload: Option<PathBuf>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct HealthArgs {
    #[command(flatten)]
    pub engine: EngineArgs,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Initialize a new configuration file
    Init(ConfigInitArgs),
    /// Check a configuration file for errors
    Validate(ConfigValidateArgs),
}

#[derive(Args, Debug)]
pub struct ConfigInitArgs {
    /// Output file path
    #[arg(short, long, default_value = "assignd.toml")]
    pub output: PathBuf,

    /// Overwrite existing file
    #[arg(short, long)]
    pub force: bool,
}

#[derive(Args, Debug)]
pub struct ConfigValidateArgs {
    /// Path to configuration file
    #[arg(short, long, default_value = "assignd.toml")]
    pub config: PathBuf,
}

#[derive(Args, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: clap_complete::Shell,
}
