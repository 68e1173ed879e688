//! CLI command definitions.

use std::path::PathBuf;

use clap::{Args, Subcommand};

/// Add command arguments: the four form fields.
///
/// Fields are passed through the form exactly as typed, so an empty or
/// non-numeric value is rejected the same way the interactive form rejects it.
#[derive(Debug, Args)]
pub struct AddCommand {
    /// Student name
    #[arg(short, long, default_value = "")]
    pub name: String,

    /// Student age (whole number)
    #[arg(short, long, default_value = "", allow_hyphen_values = true)]
    pub age: String,

    /// Contact email
    #[arg(short, long, default_value = "")]
    pub email: String,

    /// Enrolled course
    #[arg(short = 'C', long, default_value = "")]
    pub course: String,
}

/// List command arguments.
#[derive(Debug, Args)]
pub struct ListCommand {
    /// Output as JSON, including record identifiers
    #[arg(short, long)]
    pub json: bool,
}

/// Delete command arguments.
#[derive(Debug, Args)]
pub struct DeleteCommand {
    /// Identifier of the record to delete (see `list --json`)
    pub id: String,

    /// Skip confirmation prompt
    #[arg(short, long)]
    pub yes: bool,
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

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}
