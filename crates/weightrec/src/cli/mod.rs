//! Command-line interface for weightrec.
//!
//! This module provides the CLI structure and output rendering for the
//! `weightrec` binary.

mod commands;
pub mod output;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::{
    AddCommand, ConfigCommand, DeleteCommand, ListCommand, OutputFormat, StatusCommand,
    TrendCommand, UpdateCommand,
};

/// weightrec - Track your weight and see the trend
///
/// Stores dated weigh-ins in MongoDB (or a local SQLite file) and shows
/// them as a table and a rolling average.
#[derive(Debug, Parser)]
#[command(name = "weightrec")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v for info, -vv for debug)
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
    /// Add a weigh-in
    Add(AddCommand),

    /// List stored entries
    List(ListCommand),

    /// Delete an entry by id
    Delete(DeleteCommand),

    /// Change the weight of an entry
    Update(UpdateCommand),

    /// Show weights with their rolling average
    Trend(TrendCommand),

    /// Show store connection status
    Status(StatusCommand),

    /// View or validate configuration
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
