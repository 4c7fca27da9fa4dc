//! Command-line interface for carpool.
//!
//! This module provides the CLI structure for the `carona` binary.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::{
    to_index, AddTripCommand, BackupCommand, ConfigCommand, ExportTextCommand, NamesCommand,
    ParticipantCommand, StatusCommand, TripCommand, TripTypeArg, WeekCommand,
};

/// carona - Track weekly carpool trips and who has paid
///
/// Records trips for the active week, archives past weeks, and exports
/// backups or a shareable payment summary.
#[derive(Debug, Parser)]
#[command(name = "carona")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v for info, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show the active week and payment totals
    Status(StatusCommand),

    /// Create, switch, rename and delete weeks
    #[command(subcommand)]
    Week(WeekCommand),

    /// Manage trips in the active week
    #[command(subcommand)]
    Trip(TripCommand),

    /// Pay, rename or remove participants
    #[command(subcommand)]
    Participant(ParticipantCommand),

    /// List every participant name on record
    Names(NamesCommand),

    /// Full JSON backup and restore
    #[command(subcommand)]
    Backup(BackupCommand),

    /// Export the active week's payment summary as text
    ExportText(ExportTextCommand),

    /// View configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> crate::logging::Verbosity {
        if self.quiet {
            crate::logging::Verbosity::Quiet
        } else {
            match self.verbose {
                0 => crate::logging::Verbosity::Normal,
                1 => crate::logging::Verbosity::Verbose,
                _ => crate::logging::Verbosity::Trace,
            }
        }
    }
}
