use anyhow::{anyhow, Context, Result};
use axum::extract::State;
use axum::http::{HeaderValue, Method, StatusCode};
use axum::routing::post;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

use crate::config::ServerConfig;
use crate::dispatch::{ActionDispatcher, NoteResponse};
use crate::intent::IntentExtractor;
use crate::storage::NoteStore;

/// Process-scoped collaborators, constructed once at startup and shared by
/// reference with every request handler.
pub struct AppState {
    pub intent: IntentExtractor,
    pub dispatcher: ActionDispatcher,
    pub store: Arc<dyn NoteStore>,
}

#[derive(Debug, Deserialize)]
pub struct UserInput {
    pub user_input: String,
}

#[derive(Debug, Serialize)]
struct ChatEnvelope {
    response: NoteResponse,
}

#[derive(Debug, Serialize)]
struct TitlesEnvelope {
    response: Vec<String>,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", post(use_agent).get(get_titles))
        .with_state(state)
}

/// Bind and run the HTTP server until it errors or the process stops.
pub async fn serve(state: Arc<AppState>, config: &ServerConfig) -> Result<()> {
    let cors = cors_layer(&config.allowed_origins)?;
    let app = router(state).layer(cors);

    let listener = TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_addr))?;
    log::info!("Server: listening on {}", config.bind_addr);

    axum::serve(listener, app).await.context("HTTP server error")
}

fn cors_layer(origins: &[String]) -> Result<CorsLayer> {
    let mut values = Vec::with_capacity(origins.len());
    for origin in origins {
        values.push(
            HeaderValue::from_str(origin)
                .with_context(|| format!("Invalid CORS origin: {origin}"))?,
        );
    }

    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list(values))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any))
}

/// POST / — run the full intent → action pipeline for one user message.
async fn use_agent(
    State(state): State<Arc<AppState>>,
    Json(input): Json<UserInput>,
) -> Result<Json<ChatEnvelope>, (StatusCode, Json<ErrorResponse>)> {
    log::info!("Server: handling user query ({} chars)", input.user_input.len());

    let intent = state
        .intent
        .extract(&input.user_input)
        .await
        .map_err(internal_error)?;

    let response = state
        .dispatcher
        .dispatch(&intent, state.store.as_ref())
        .await
        .map_err(internal_error)?;

    if response.message.is_empty() {
        return Err(internal_error(anyhow!(
            "empty response from the action agent"
        )));
    }

    Ok(Json(ChatEnvelope { response }))
}

/// GET / — list all note titles, store direct, bypassing the agent pipeline.
async fn get_titles(
    State(state): State<Arc<AppState>>,
) -> Result<Json<TitlesEnvelope>, (StatusCode, Json<ErrorResponse>)> {
    let titles = state
        .store
        .list_all_titles()
        .await
        .map_err(internal_error)?;

    if titles.is_empty() {
        return Err(internal_error(anyhow!("no note titles stored")));
    }

    Ok(Json(TitlesEnvelope {
        response: titles.into_iter().map(|t| t.title).collect(),
    }))
}

/// Any uncaught pipeline or storage failure surfaces as a generic server
/// error; no domain-specific error code distinguishes the cause.
fn internal_error(err: anyhow::Error) -> (StatusCode, Json<ErrorResponse>) {
    log::error!("Server: request failed: {err:#}");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse {
            error: "internal server error".to_string(),
        }),
    )
}
