//! CLI command definitions.
//!
//! This module defines the structure of all CLI subcommands. Trip and
//! participant positions are 1-based, as printed by `trip list`.

use std::num::NonZeroUsize;
use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Subcommand, ValueEnum};

/// Status command arguments.
#[derive(Debug, Args)]
pub struct StatusCommand {
    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Week management commands.
#[derive(Debug, Subcommand)]
pub enum WeekCommand {
    /// Start a new week, archiving the active one
    New {
        /// First day of the week (YYYY-MM-DD)
        date: NaiveDate,
    },

    /// Make an archived week active, archiving the current one
    Select {
        /// Week name as shown by `week list`
        name: String,
    },

    /// Permanently delete a week
    Delete {
        /// Week name as shown by `week list`
        name: String,

        /// Skip confirmation
        #[arg(short, long)]
        yes: bool,
    },

    /// Rename the active week
    Rename {
        /// New name
        name: String,
    },

    /// List all weeks grouped by year and month
    List {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },
}

/// Trip management commands.
#[derive(Debug, Subcommand)]
pub enum TripCommand {
    /// Add a trip to the active week
    Add(AddTripCommand),

    /// List the active week's trips by day
    List {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Delete a trip from the active week
    Delete {
        /// Trip number
        trip: NonZeroUsize,

        /// Skip confirmation
        #[arg(short, long)]
        yes: bool,
    },
}

/// Arguments for adding a trip.
#[derive(Debug, Args)]
pub struct AddTripCommand {
    /// Day of the trip (YYYY-MM-DD)
    #[arg(short, long)]
    pub date: NaiveDate,

    /// Direction of the trip
    #[arg(short = 't', long = "type", value_enum, default_value = "ida")]
    pub trip_type: TripTypeArg,

    /// Participant name (repeatable)
    #[arg(short, long = "name")]
    pub names: Vec<String>,

    /// Previously recorded participant to add (repeatable, see `names`)
    #[arg(short, long = "pick")]
    pub picks: Vec<String>,

    /// File with one participant name per line
    #[arg(long, value_name = "FILE")]
    pub names_file: Option<PathBuf>,
}

/// Participant commands, addressed by trip and participant number.
#[derive(Debug, Subcommand)]
pub enum ParticipantCommand {
    /// Toggle a participant's payment
    Pay {
        /// Trip number
        trip: NonZeroUsize,
        /// Participant number within the trip
        participant: NonZeroUsize,
    },

    /// Rename a participant
    Rename {
        /// Trip number
        trip: NonZeroUsize,
        /// Participant number within the trip
        participant: NonZeroUsize,
        /// New name
        name: String,
    },

    /// Remove a participant from a trip
    Remove {
        /// Trip number
        trip: NonZeroUsize,
        /// Participant number within the trip
        participant: NonZeroUsize,
    },
}

/// Names command arguments.
#[derive(Debug, Args)]
pub struct NamesCommand {
    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Backup commands.
#[derive(Debug, Subcommand)]
pub enum BackupCommand {
    /// Write a full JSON backup
    Export {
        /// Output file (defaults to a dated file in the export directory)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Print to stdout instead of writing a file
        #[arg(long, conflicts_with = "output")]
        stdout: bool,
    },

    /// Replace all data with a JSON backup
    Import {
        /// Backup file to restore
        file: PathBuf,

        /// Skip confirmation
        #[arg(short, long)]
        yes: bool,
    },
}

/// Text export arguments.
#[derive(Debug, Args)]
pub struct ExportTextCommand {
    /// Output file (defaults to `status_pagamento.txt` in the export directory)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Print to stdout instead of writing a file
    #[arg(long, conflicts_with = "output")]
    pub stdout: bool,
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

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

/// Trip direction argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TripTypeArg {
    /// Outbound leg
    Ida,
    /// Return leg
    Volta,
}

impl From<TripTypeArg> for crate::model::TripType {
    fn from(arg: TripTypeArg) -> Self {
        match arg {
            TripTypeArg::Ida => Self::Ida,
            TripTypeArg::Volta => Self::Volta,
        }
    }
}

/// Convert a 1-based position from the command line to an index.
#[must_use]
pub fn to_index(position: NonZeroUsize) -> usize {
    position.get() - 1
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TripType;

    #[test]
    fn test_trip_type_arg_conversion() {
        assert_eq!(TripType::from(TripTypeArg::Ida), TripType::Ida);
        assert_eq!(TripType::from(TripTypeArg::Volta), TripType::Volta);
    }

    #[test]
    fn test_to_index() {
        assert_eq!(to_index(NonZeroUsize::new(1).unwrap()), 0);
        assert_eq!(to_index(NonZeroUsize::new(7).unwrap()), 6);
    }

    #[test]
    fn test_week_command_debug() {
        let cmd = WeekCommand::Delete {
            name: "Semana Atual".to_string(),
            yes: true,
        };
        let debug_str = format!("{cmd:?}");
        assert!(debug_str.contains("Delete"));
        assert!(debug_str.contains("yes"));
    }
}
