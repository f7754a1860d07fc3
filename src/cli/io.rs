//! JSON I/O handling for CLI
//!
//! - Input: one JSON document on stdin
//! - Output: one JSON document on stdout
//! - Logs never go to stdout

use std::io::{self, Read, Write};

use serde_json::Value;

use crate::application::ApplicationInput;
use crate::store::StoreError;

use super::errors::{CliError, CliResult};

/// Read one application record from stdin
pub fn read_request() -> CliResult<ApplicationInput> {
    let mut input = String::new();
    io::stdin().lock().read_to_string(&mut input)?;
    parse_request(&input)
}

/// Parse an application record; `null` is an absent record
pub fn parse_request(input: &str) -> CliResult<ApplicationInput> {
    if input.trim().is_empty() {
        return Err(CliError::invalid_input("Empty input"));
    }

    let request: Option<ApplicationInput> = serde_json::from_str(input)
        .map_err(|e| CliError::invalid_input(format!("Invalid application JSON: {}", e)))?;

    request.ok_or_else(|| CliError::from(StoreError::missing_record()))
}

/// Write a success response to stdout
pub fn write_response(data: Value) -> CliResult<()> {
    let response = serde_json::json!({
        "status": "ok",
        "data": data
    });

    let mut stdout = io::stdout();
    serde_json::to_writer(&mut stdout, &response)?;
    writeln!(stdout)?;
    stdout.flush()?;

    Ok(())
}

/// Write an error response to stdout
pub fn write_error(code: &str, message: &str) -> CliResult<()> {
    let response = serde_json::json!({
        "status": "error",
        "code": code,
        "message": message
    });

    let mut stdout = io::stdout();
    serde_json::to_writer(&mut stdout, &response)?;
    writeln!(stdout)?;
    stdout.flush()?;

    Ok(())
}

/// Write a raw JSON string to stdout
pub fn write_json(json_str: &str) -> CliResult<()> {
    let mut stdout = io::stdout();
    writeln!(stdout, "{}", json_str)?;
    stdout.flush()?;

    Ok(())
}
