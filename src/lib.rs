//! loandesk - a durable, file-backed loan application manager
//!
//! - `application`: record model and field rules
//! - `store`: the single authority over the data file
//! - `http_server`: axum surface for the Angular client
//! - `cli`: init, serve and one-shot record commands

pub mod application;
pub mod cli;
pub mod crash_point;
pub mod http_server;
pub mod observability;
pub mod store;
