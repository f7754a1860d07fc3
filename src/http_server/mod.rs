//! # HTTP Server Module
//!
//! Axum surface over the record store.
//!
//! # Endpoints
//!
//! - `/health` - Health check
//! - `/ApplicationManager/*` - Loan application CRUD
//! - `/observability/*` - Health and store counters

pub mod application_routes;
pub mod config;
pub mod errors;
pub mod observability_routes;
pub mod server;

pub use application_routes::MessageResponse;
pub use config::HttpServerConfig;
pub use errors::{ApiError, ApiResult, ErrorResponse};
pub use server::HttpServer;
