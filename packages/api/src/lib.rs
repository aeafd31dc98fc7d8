//! HTTP API for the print coordinator.
//!
//! Every route except `/health` requires the shared secret in the
//! `X-API-Key` header.

pub mod agent;
pub mod auth;
mod error;
mod extract;
pub mod jobs;
mod state;

use axum::Router;
use axum::middleware;
use axum::routing::{get, post};

pub use error::ApiError;
pub use extract::JsonBody;
pub use state::AppState;

/// Build the router over `state`.
pub fn build_router(state: AppState) -> Router {
    let protected = Router::new()
        .route("/jobs", get(jobs::list_jobs).post(jobs::add_job))
        .route("/jobs/clear", post(jobs::clear_jobs))
        .route("/jobs/reorder", post(jobs::reorder_jobs))
        .route("/jobs/print-next", post(jobs::print_next))
        .route("/jobs/{job_id}/print", post(jobs::print_specific))
        .route("/agent/claim", post(agent::claim))
        .route("/agent/report", post(agent::report))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_api_key,
        ));

    Router::new()
        .route("/health", get(health))
        .merge(protected)
        .with_state(state)
}

async fn health() -> &'static str {
    "OK"
}
