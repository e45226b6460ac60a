//! HTTP routes exposing the pipeline.

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::agent::Pipeline;
use crate::config::Config;
use crate::llm::{CompletionClient, OpenRouterClient};
use crate::sandbox::{ProcessSandbox, Sandbox, SandboxConfig};

use super::types::{CreateRunRequest, ErrorResponse, HealthResponse, RunResponse};

/// Shared state for request handlers.
pub struct AppState {
    pub config: Config,
    pub client: Arc<dyn CompletionClient>,
    pub sandbox: Arc<dyn Sandbox>,
}

/// Build the router over an existing app state.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/runs", post(create_run))
        .route("/api/health", get(health))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Start the HTTP server. Blocks until the listener fails.
pub async fn serve(config: Config) -> anyhow::Result<()> {
    let client: Arc<dyn CompletionClient> = Arc::new(OpenRouterClient::new(config.api_key.clone()));

    // Fail fast at startup if no JS runtime is installed, rather than on the
    // first run request.
    let sandbox: Arc<dyn Sandbox> = Arc::new(
        ProcessSandbox::detect(SandboxConfig {
            timeout_ms: config.sandbox_timeout_ms,
            ..SandboxConfig::default()
        })
        .await?,
    );

    let addr = format!("{}:{}", config.host, config.port);
    let state = Arc::new(AppState {
        config,
        client,
        sandbox,
    });

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Listening on {}", addr);

    axum::serve(listener, router(state)).await?;

    Ok(())
}

/// `POST /api/runs` - run one request through the pipeline.
async fn create_run(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateRunRequest>,
) -> Response {
    if payload.request.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: "request must not be empty".to_string(),
            }),
        )
            .into_response();
    }

    let model = payload
        .model
        .unwrap_or_else(|| state.config.default_model.clone());

    let id = Uuid::new_v4();
    tracing::info!("Run {} started (model {})", id, model);

    let pipeline = Pipeline::new(
        Arc::clone(&state.client),
        Arc::clone(&state.sandbox),
        model,
    );
    let final_state = pipeline.run(&payload.request).await;

    tracing::info!("Run {} finished", id);

    Json(RunResponse {
        id,
        created_at: chrono::Utc::now().to_rfc3339(),
        messages: final_state.messages().to_vec(),
        generated_code: final_state.generated_code().map(str::to_string),
        evaluation_result: final_state.evaluation_result().map(str::to_string),
    })
    .into_response()
}

/// `GET /api/health` - liveness probe.
async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
