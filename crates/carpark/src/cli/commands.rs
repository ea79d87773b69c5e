//! CLI command definitions.
//!
//! This module defines the structure of all CLI subcommands.

use std::path::PathBuf;

use clap::{Args, Subcommand, ValueEnum};

use crate::model::SpaceType;

/// Park command arguments.
#[derive(Debug, Args)]
pub struct ParkCommand {
    /// Registration of a registered car
    pub registration: String,

    /// Requested stay in minutes (rounded to the nearest slot)
    #[arg(allow_negative_numbers = true)]
    pub minutes: i64,

    /// Park in this space instead of the first suitable one
    #[arg(short, long, value_name = "ID")]
    pub space: Option<String>,
}

/// Leave command arguments.
#[derive(Debug, Args)]
pub struct LeaveCommand {
    /// Registration of the parked car, or the space it occupies
    pub identifier: String,
}

/// Parked command arguments.
#[derive(Debug, Args)]
pub struct ParkedCommand {
    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,
}

/// Free command arguments.
#[derive(Debug, Args)]
pub struct FreeCommand {
    /// Only spaces a car with this entitlement may use
    #[arg(short = 't', long = "type", value_enum, ignore_case = true)]
    pub space_type: Option<SpaceTypeArg>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,
}

/// Status command arguments.
#[derive(Debug, Args)]
pub struct StatusCommand {
    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show configuration file path
    Path,

    /// Validate configuration file
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

/// Space type argument for filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SpaceTypeArg {
    /// Standard bays
    Standard,
    /// Disabled bays
    Disabled,
    /// Electric vehicle charging bays
    Ev,
}

impl From<SpaceTypeArg> for SpaceType {
    fn from(arg: SpaceTypeArg) -> Self {
        match arg {
            SpaceTypeArg::Standard => Self::Standard,
            SpaceTypeArg::Disabled => Self::Disabled,
            SpaceTypeArg::Ev => Self::Ev,
        }
    }
}

/// Output format for listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Fixed-width table
    #[default]
    Table,
    /// JSON array
    Json,
}
