//! HTTP API exposing the pipeline.
//!
//! A deliberately small surface: one synchronous run endpoint and a health
//! probe. There is no task store and no status polling; a run request is
//! answered with the pipeline's final state.

mod routes;
mod types;

pub use routes::{router, serve, AppState};
pub use types::{CreateRunRequest, ErrorResponse, HealthResponse, RunResponse};
