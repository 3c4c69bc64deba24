use std::env;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};
use wayfarer_agents::ConversationRouter;
use wayfarer_core::{ConversationTurn, CoreError};
use wayfarer_llm::{
    max_tokens_from_env, CompletionClient, CompletionConfig, OpenAiCompatClient, UnconfiguredClient,
};
use wayfarer_observability::{AppMetrics, MetricsSnapshot};
use wayfarer_storage::{MemoryStore, Store};

#[derive(Clone)]
pub struct ApiState {
    pub router: Arc<ConversationRouter<Store>>,
    pub metrics: Arc<AppMetrics>,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    timestamp_utc: String,
    model: String,
    metrics: MetricsSnapshot,
}

#[derive(Debug, Deserialize)]
struct ChatRequest {
    #[serde(default)]
    message: String,
    #[serde(default)]
    location: Option<String>,
    #[serde(default)]
    history: Vec<ConversationTurn>,
}

#[derive(Debug, Serialize)]
struct ChatResponse {
    response: String,
}

/// Wires the live stack from the environment: location table, optional SQLite, completion client.
pub async fn build_app(locations_path: impl AsRef<Path>) -> Result<Router> {
    let seed = MemoryStore::from_json_file(locations_path)?;

    let store = if let Ok(database_url) = env::var("WAYFARER_DATABASE_URL") {
        let store = Store::sqlite(&database_url).await?;
        let imported = store
            .import_from(&seed)
            .await
            .context("failed seeding sqlite location table")?;
        info!(imported, "sqlite location table seeded");
        store
    } else {
        Store::Memory(seed)
    };

    let client: Arc<dyn CompletionClient> = match CompletionConfig::from_env() {
        Some(config) => {
            Arc::new(OpenAiCompatClient::new(config).context("failed to build completion client")?)
        }
        None => {
            warn!("WAYFARER_LLM_API_KEY not set; travel questions will get an inline error");
            Arc::new(UnconfiguredClient)
        }
    };

    Ok(build_app_with(store, client, max_tokens_from_env()))
}

pub fn build_app_with(store: Store, client: Arc<dyn CompletionClient>, max_tokens: u32) -> Router {
    let metrics = AppMetrics::shared();
    let router = ConversationRouter::new(Arc::new(store), client, metrics.clone())
        .with_max_tokens(max_tokens);

    build_router(ApiState {
        router: Arc::new(router),
        metrics,
    })
}

pub fn build_router(state: ApiState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/chat", post(chat))
        .route("/api/locations", get(locations))
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(RequestBodyLimitLayer::new(64 * 1024))
        .with_state(state)
}

async fn health(State(state): State<ApiState>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok",
        timestamp_utc: chrono::Utc::now().to_rfc3339(),
        model: state.router.model_name().to_string(),
        metrics: state.metrics.snapshot(),
    })
}

async fn chat(State(state): State<ApiState>, Json(request): Json<ChatRequest>) -> Response {
    let location = request
        .location
        .as_deref()
        .map(str::trim)
        .filter(|name| !name.is_empty());

    match state
        .router
        .respond(&request.message, location, &request.history)
        .await
    {
        Ok(response) => (StatusCode::OK, Json(ChatResponse { response })).into_response(),
        Err(err) => match err.downcast_ref::<CoreError>() {
            Some(core) => error_response(StatusCode::BAD_REQUEST, core.to_string()),
            None => {
                error!(error = ?err, "chat request failed");
                error_response(StatusCode::INTERNAL_SERVER_ERROR, "internal error".to_string())
            }
        },
    }
}

async fn locations(State(state): State<ApiState>) -> Response {
    match state.router.list_locations().await {
        Ok(names) => Json(names).into_response(),
        Err(err) => {
            error!(error = ?err, "listing locations failed");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "internal error".to_string())
        }
    }
}

fn error_response(status: StatusCode, message: String) -> Response {
    (status, Json(serde_json::json!({ "error": message }))).into_response()
}
