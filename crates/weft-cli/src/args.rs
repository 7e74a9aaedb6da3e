//! Command-line argument definitions for the Weft CLI.
//!
//! This module defines the [`Args`] structure parsed from the command line
//! using [`clap`]. A subcommand selects what happens to the input file; the
//! global options control configuration file selection and logging verbosity.

use clap::{Parser, Subcommand};

/// Command-line arguments for the Weft diagram tool
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
    /// Parse a file and report its diagnostics
    Check {
        #[arg(help = "Path to the input file")]
        input: String,
    },

    /// Rewrite a file in canonical form
    ///
    /// Edge endpoints that name no declared node are not written back.
    Fmt {
        #[arg(help = "Path to the input file")]
        input: String,

        /// Path to the output file; stdout when omitted
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Print the lines of a file with HTML highlighting markers
    Highlight {
        #[arg(help = "Path to the input file")]
        input: String,
    },
}

impl Command {
    /// Path of the file the command reads.
    pub fn input(&self) -> &str {
        match self {
            Command::Check { input } | Command::Fmt { input, .. } | Command::Highlight { input } => {
                input
            }
        }
    }
}
