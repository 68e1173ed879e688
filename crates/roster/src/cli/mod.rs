//! Command-line interface for roster.
//!
//! This module provides the CLI structure for the `roster` binary.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::{AddCommand, ConfigCommand, DeleteCommand, ListCommand, StatusCommand};

use crate::logging::Verbosity;

/// roster - Keep a list of students
///
/// Add, list and delete student records kept in a local document database.
/// Run without a command to open the interactive form and table.
#[derive(Debug, Parser)]
#[command(name = "roster")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// The command to execute (defaults to `run`)
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Open the interactive form and table
    Run,

    /// Add one student
    Add(AddCommand),

    /// List all students
    List(ListCommand),

    /// Delete one student by identifier
    Delete(DeleteCommand),

    /// Show database location and record counts
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
