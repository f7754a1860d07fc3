//! CLI module for loandesk
//!
//! Provides command-line interface for:
//! - init: Create the data directory and an empty data file
//! - serve: Open the store and serve HTTP
//! - list/create/update/delete: One-shot record operations over stdin/stdout

mod args;
mod commands;
mod config;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{create, delete, init, list, run, run_command, serve, update};
pub use config::Config;
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::{parse_request, read_request, write_error, write_json, write_response};
