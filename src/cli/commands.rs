//! CLI command implementations
//!
//! Every command loads the config, sets the log level and opens the store
//! before doing anything else. Record commands run exactly one store
//! operation and print one JSON document.

use std::path::Path;
use std::sync::Arc;

use serde_json::json;

use crate::http_server::HttpServer;
use crate::observability::{log_event, log_event_with_fields, Event, Logger};
use crate::store::{DataFile, RecordStore};

use super::args::Command;
use super::config::Config;
use super::errors::{CliError, CliResult};
use super::io::{read_request, write_error, write_json, write_response};

/// Main CLI entry point
///
/// Parses arguments and dispatches to the appropriate command. A failed
/// command prints its error document on stdout before returning it.
pub fn run() -> CliResult<()> {
    let cli = super::args::Cli::parse_args();
    run_command(cli.command).map_err(|e| {
        // stdout may be closed; the caller still reports on stderr
        let _ = write_error(e.code_str(), e.message());
        e
    })
}

/// Run the appropriate command based on CLI args
pub fn run_command(cmd: Command) -> CliResult<()> {
    match cmd {
        Command::Init { config } => init(&config),
        Command::Serve { config, port } => serve(&config, port),
        Command::List { config } => list(&config),
        Command::Create { config } => create(&config),
        Command::Update {
            config,
            application_number,
        } => update(&config, &application_number),
        Command::Delete {
            config,
            application_number,
        } => delete(&config, &application_number),
    }
}

/// Load config and apply the log level
fn load_config(config_path: &Path) -> CliResult<Config> {
    let config = Config::load(config_path)?;
    Logger::set_min_severity(config.severity()?);

    log_event_with_fields(
        Event::ConfigLoaded,
        &[
            ("config", &config_path.display().to_string()),
            ("data_file", &config.data_file.display().to_string()),
        ],
    );

    Ok(config)
}

fn open_store(config: &Config) -> CliResult<RecordStore> {
    Ok(RecordStore::open(&config.data_file)?)
}

/// Create the data directory and an empty data file
///
/// Refuses to touch an existing data file.
pub fn init(config_path: &Path) -> CliResult<()> {
    let config = load_config(config_path)?;
    let file = DataFile::new(&config.data_file);

    file.ensure_dir()?;
    let _lock = file.lock()?;

    if file.path().exists() {
        return Err(CliError::already_initialized(file.path()));
    }

    file.commit(&[])?;

    write_response(json!({
        "message": "Initialized.",
        "dataFile": file.path().display().to_string(),
    }))
}

/// Serve the HTTP API until the process is terminated
///
/// The store is opened before the runtime starts so a corrupt data file
/// stops the process before any port is bound.
pub fn serve(config_path: &Path, port: Option<u16>) -> CliResult<()> {
    log_event(Event::BootStart);

    let config = load_config(config_path)?;
    let store = Arc::new(open_store(&config)?);

    let server = HttpServer::with_store(config.http_config(port), store);

    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| CliError::boot_failed(format!("Failed to create tokio runtime: {}", e)))?;

    log_event_with_fields(Event::BootComplete, &[("addr", &server.socket_addr())]);

    rt.block_on(async {
        server
            .start()
            .await
            .map_err(|e| CliError::boot_failed(format!("HTTP server failed: {}", e)))
    })
}

/// Print every application as a JSON array
pub fn list(config_path: &Path) -> CliResult<()> {
    let config = load_config(config_path)?;
    let store = open_store(&config)?;

    let records = store.list_all()?;
    write_json(&serde_json::to_string(&records)?)
}

/// Create one application read from stdin
pub fn create(config_path: &Path) -> CliResult<()> {
    let config = load_config(config_path)?;
    let store = open_store(&config)?;

    let input = read_request()?;
    store.create(input)?;

    write_response(json!({ "message": "Created Successfully." }))
}

/// Replace one application with the record read from stdin
pub fn update(config_path: &Path, application_number: &str) -> CliResult<()> {
    let config = load_config(config_path)?;
    let store = open_store(&config)?;

    let input = read_request()?;
    store.update(application_number, input)?;

    write_response(json!({ "message": "Updated Successfully." }))
}

/// Delete one application
pub fn delete(config_path: &Path, application_number: &str) -> CliResult<()> {
    let config = load_config(config_path)?;
    let store = open_store(&config)?;

    store.delete(application_number)?;

    write_response(json!({ "message": "Deleted Successfully." }))
}

#[cfg(test)]
mod tests {
    use super::super::errors::CliErrorCode;
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn create_config(temp_dir: &TempDir) -> std::path::PathBuf {
        let config_path = temp_dir.path().join("loandesk.json");
        let data_file = temp_dir.path().join("data").join("loanApplication.json");

        let config = json!({
            "data_file": data_file.to_string_lossy(),
            "log_level": "error"
        });

        fs::write(&config_path, config.to_string()).unwrap();
        config_path
    }

    #[test]
    fn test_init_creates_empty_data_file() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = create_config(&temp_dir);
        let data_file = temp_dir.path().join("data").join("loanApplication.json");

        init(&config_path).unwrap();

        let content = fs::read_to_string(&data_file).unwrap();
        let records: Vec<serde_json::Value> = serde_json::from_str(&content).unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn test_init_refuses_reinit() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = create_config(&temp_dir);

        init(&config_path).unwrap();

        let result = init(&config_path);
        assert!(result.is_err());
        assert_eq!(
            result.unwrap_err().code(),
            &CliErrorCode::AlreadyInitialized
        );
    }

    #[test]
    fn test_delete_unknown_reports_store_code() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = create_config(&temp_dir);
        init(&config_path).unwrap();

        let err = delete(&config_path, "A-404").unwrap_err();
        assert_eq!(err.code_str(), "LOAN_NOT_FOUND");
    }

    #[test]
    fn test_list_fails_on_corrupt_file() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = create_config(&temp_dir);
        let data_dir = temp_dir.path().join("data");
        fs::create_dir_all(&data_dir).unwrap();
        fs::write(data_dir.join("loanApplication.json"), "[{").unwrap();

        let err = list(&config_path).unwrap_err();
        assert_eq!(err.code_str(), "LOAN_STORAGE_CORRUPTION");
    }
}
