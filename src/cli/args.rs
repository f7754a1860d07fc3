//! CLI argument definitions using clap
//!
//! Commands:
//! - loandesk init --config <path>
//! - loandesk serve --config <path> [--port <port>]
//! - loandesk list --config <path>
//! - loandesk create --config <path>
//! - loandesk update --config <path> <application-number>
//! - loandesk delete --config <path> <application-number>

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// loandesk - durable, file-backed loan application manager
#[derive(Parser, Debug)]
#[command(name = "loandesk")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create the data directory and an empty data file
    Init {
        /// Path to configuration file
        #[arg(long, default_value = "./loandesk.json")]
        config: PathBuf,
    },

    /// Serve the application manager over HTTP
    Serve {
        /// Path to configuration file
        #[arg(long, default_value = "./loandesk.json")]
        config: PathBuf,

        /// Port override for `http.port`
        #[arg(long)]
        port: Option<u16>,
    },

    /// Print every application as a JSON array
    List {
        /// Path to configuration file
        #[arg(long, default_value = "./loandesk.json")]
        config: PathBuf,
    },

    /// Create an application read from stdin
    Create {
        /// Path to configuration file
        #[arg(long, default_value = "./loandesk.json")]
        config: PathBuf,
    },

    /// Replace an application with the record read from stdin
    Update {
        /// Path to configuration file
        #[arg(long, default_value = "./loandesk.json")]
        config: PathBuf,

        /// Application number to update
        application_number: String,
    },

    /// Delete an application
    Delete {
        /// Path to configuration file
        #[arg(long, default_value = "./loandesk.json")]
        config: PathBuf,

        /// Application number to delete
        application_number: String,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
