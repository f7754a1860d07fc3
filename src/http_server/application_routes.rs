//! Application Manager HTTP Routes
//!
//! Verb/path contract consumed by the Angular client. Handlers only
//! deserialize payloads; every field rule lives in the store.
//!
//! - `GET    /GetApplications`
//! - `POST   /CreateApplication`
//! - `PUT    /UpdateApplication/:application_number`
//! - `DELETE /DeleteApplication/:application_number`
//!
//! Failures carry `{"error": <message>, "code": <status>}`. An Angular
//! `HttpErrorResponse` exposes that body as `error`, so the client reads the
//! message at `err.error.error` rather than at `err.error`.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    routing::{delete, get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::application::{ApplicationInput, LoanApplication};
use crate::store::{RecordStore, StoreError, StoreResult};

use super::errors::{ApiError, ApiResult};

// ==================
// Shared State
// ==================

/// Application routes state
pub struct ApplicationState {
    pub store: Arc<RecordStore>,
}

impl ApplicationState {
    pub fn new(store: Arc<RecordStore>) -> Self {
        Self { store }
    }
}

// ==================
// Response Types
// ==================

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    fn new(message: &str) -> Self {
        Self {
            message: message.to_string(),
        }
    }
}

// ==================
// Routes
// ==================

/// Create application routes
pub fn application_routes(state: Arc<ApplicationState>) -> Router {
    Router::new()
        .route("/GetApplications", get(list_applications_handler))
        .route("/CreateApplication", post(create_application_handler))
        .route(
            "/UpdateApplication/:application_number",
            put(update_application_handler),
        )
        .route(
            "/DeleteApplication/:application_number",
            delete(delete_application_handler),
        )
        // A missing path key is a blank key, not an unknown route
        .route("/UpdateApplication", put(missing_key_handler))
        .route("/UpdateApplication/", put(missing_key_handler))
        .route("/DeleteApplication", delete(missing_key_handler))
        .route("/DeleteApplication/", delete(missing_key_handler))
        .with_state(state)
}

// ==================
// Helper Functions
// ==================

/// Run a store operation on the blocking pool.
async fn with_store<T, F>(state: &ApplicationState, op: F) -> ApiResult<T>
where
    F: FnOnce(&RecordStore) -> StoreResult<T> + Send + 'static,
    T: Send + 'static,
{
    let store = Arc::clone(&state.store);
    tokio::task::spawn_blocking(move || op(&store))
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?
        .map_err(ApiError::from)
}

/// A `null` body is an absent record; anything undeserializable is a bad body.
fn require_body(
    payload: Result<Json<Option<ApplicationInput>>, JsonRejection>,
) -> ApiResult<ApplicationInput> {
    let Json(body) = payload.map_err(|rejection| ApiError::InvalidBody(rejection.body_text()))?;
    body.ok_or_else(|| ApiError::Store(StoreError::missing_record()))
}

// ==================
// Handlers
// ==================

async fn list_applications_handler(
    State(state): State<Arc<ApplicationState>>,
) -> ApiResult<Json<Vec<LoanApplication>>> {
    let applications = with_store(&state, |store| store.list_all()).await?;
    Ok(Json(applications))
}

async fn create_application_handler(
    State(state): State<Arc<ApplicationState>>,
    payload: Result<Json<Option<ApplicationInput>>, JsonRejection>,
) -> ApiResult<Json<MessageResponse>> {
    let input = require_body(payload)?;
    with_store(&state, move |store| store.create(input)).await?;
    Ok(Json(MessageResponse::new("Created Successfully.")))
}

async fn update_application_handler(
    State(state): State<Arc<ApplicationState>>,
    Path(application_number): Path<String>,
    payload: Result<Json<Option<ApplicationInput>>, JsonRejection>,
) -> ApiResult<Json<MessageResponse>> {
    let input = require_body(payload)?;
    with_store(&state, move |store| store.update(&application_number, input)).await?;
    Ok(Json(MessageResponse::new("Updated Successfully.")))
}

async fn delete_application_handler(
    State(state): State<Arc<ApplicationState>>,
    Path(application_number): Path<String>,
) -> ApiResult<Json<MessageResponse>> {
    with_store(&state, move |store| store.delete(&application_number)).await?;
    Ok(Json(MessageResponse::new("Deleted Successfully.")))
}

async fn missing_key_handler() -> ApiError {
    ApiError::Store(StoreError::blank_key())
}
