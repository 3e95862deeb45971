//! Command-line argument definitions for the archmodel CLI.
//!
//! This module defines the [`Args`] structure parsed from the command line
//! using [`clap`]. Each [`Command`] reads one or two serialized workspaces,
//! and the global options select the configuration file and logging
//! verbosity.

use clap::{Parser, Subcommand};

/// Command-line arguments for the archmodel workspace tool
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Path to configuration file (TOML)
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "info", global = true)]
    pub log_level: String,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Copy element positions and routing from a published workspace
    MergeLayout {
        /// Previously published workspace (JSON)
        #[arg(long)]
        source: String,

        /// Workspace to receive the layout (JSON)
        current: String,

        /// Path of the merged workspace
        #[arg(short, long)]
        output: String,
    },

    /// Add implied relationships and default layouts before publishing
    Prepare {
        /// Workspace to prepare (JSON)
        input: String,

        /// Path of the prepared workspace
        #[arg(short, long)]
        output: String,
    },

    /// Log element, relationship and view counts
    Summary {
        /// Workspace to summarize (JSON)
        input: String,
    },
}
