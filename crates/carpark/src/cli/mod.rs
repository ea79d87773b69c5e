//! Command-line interface for carpark.
//!
//! This module provides the CLI structure for the `carpark` binary. With no
//! subcommand the interactive menu runs.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::{
    ConfigCommand, FreeCommand, LeaveCommand, OutputFormat, ParkCommand, ParkedCommand,
    SpaceTypeArg, StatusCommand,
};

use crate::logging::Verbosity;

/// carpark - Keep track of who is parked where
///
/// Reads the spaces, registered cars and parked cars from plain text files,
/// and lets you park cars, record departures and view what is free.
#[derive(Debug, Parser)]
#[command(name = "carpark")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Directory holding SPACES.txt, CARS.txt and PARKED.txt
    #[arg(short, long, global = true, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    /// Increase verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// The command to execute (defaults to the interactive menu)
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the interactive menu
    Menu,

    /// Park a registered car and save
    Park(ParkCommand),

    /// Record a car leaving and save
    Leave(LeaveCommand),

    /// List parked cars
    Parked(ParkedCommand),

    /// List free spaces
    Free(FreeCommand),

    /// Show occupancy summary
    Status(StatusCommand),

    /// View or check configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> Verbosity {
        if self.quiet {
            Verbosity::Quiet
        } else {
            match self.verbose {
                0 => Verbosity::Normal,
                1 => Verbosity::Verbose,
                2 => Verbosity::Debug,
                _ => Verbosity::Trace,
            }
        }
    }
}
