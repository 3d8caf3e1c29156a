use crate::app::dto::*;
use crate::app::engine::AnnotationEngine;
use anyhow::Result;
use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::task::spawn_blocking;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

#[derive(Clone)]
pub struct HttpState {
    pub engine: AnnotationEngine,
}

#[derive(Debug, Clone, Deserialize)]
struct LookupQuery {
    name: String,
}

#[derive(Debug, Clone, Serialize)]
struct ApiErrorBody {
    error: String,
}

fn api_error(status: StatusCode, msg: impl Into<String>) -> impl IntoResponse {
    (status, Json(ApiErrorBody { error: msg.into() }))
}

/// Runs `job` off the async runtime; errors from the job itself map to `status`.
async fn blocking<T, F>(status: StatusCode, job: F) -> Response
where
    T: Serialize + Send + 'static,
    F: FnOnce() -> Result<T> + Send + 'static,
{
    match spawn_blocking(job).await {
        Ok(Ok(res)) => Json(res).into_response(),
        Ok(Err(e)) => api_error(status, format!("{e:#}")).into_response(),
        Err(e) => api_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("task join error: {e}"),
        )
        .into_response(),
    }
}

pub fn build_router(engine: AnnotationEngine) -> Router {
    let state = Arc::new(HttpState { engine });

    Router::new()
        .route("/health", get(health))
        .route("/read", post(read))
        .route("/extract", post(extract))
        .route("/validate", post(validate))
        .route("/check", post(check))
        .route("/lookup", get(lookup))
        .route("/routes", get(routes))
        .route("/reload", post(reload))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

pub async fn serve(engine: AnnotationEngine, addr: SocketAddr) -> Result<()> {
    let app = build_router(engine);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "listening");
    axum::serve(listener, app).await?;
    Ok(())
}

async fn health(State(state): State<Arc<HttpState>>) -> impl IntoResponse {
    Json(state.engine.health())
}

async fn reload(State(state): State<Arc<HttpState>>) -> impl IntoResponse {
    let engine = state.engine.clone();
    blocking(StatusCode::INTERNAL_SERVER_ERROR, move || engine.reload()).await
}

async fn read(
    State(state): State<Arc<HttpState>>,
    Json(req): Json<ReadRequest>,
) -> impl IntoResponse {
    let engine = state.engine.clone();
    blocking(StatusCode::UNPROCESSABLE_ENTITY, move || engine.read(req)).await
}

async fn extract(
    State(state): State<Arc<HttpState>>,
    Json(req): Json<ExtractRequest>,
) -> impl IntoResponse {
    let engine = state.engine.clone();
    blocking(StatusCode::BAD_REQUEST, move || engine.extract(req)).await
}

async fn validate(
    State(state): State<Arc<HttpState>>,
    Json(req): Json<ValidateRequest>,
) -> impl IntoResponse {
    let engine = state.engine.clone();
    blocking(StatusCode::BAD_REQUEST, move || engine.validate(req)).await
}

async fn check(
    State(state): State<Arc<HttpState>>,
    Json(req): Json<CheckRequest>,
) -> impl IntoResponse {
    let engine = state.engine.clone();
    blocking(StatusCode::BAD_REQUEST, move || engine.check(req)).await
}

async fn lookup(
    State(state): State<Arc<HttpState>>,
    Query(q): Query<LookupQuery>,
) -> impl IntoResponse {
    let res = state.engine.lookup(&q.name);
    if res.types.is_empty() && res.functions.is_empty() {
        return api_error(
            StatusCode::NOT_FOUND,
            format!("no type or function named '{}'", q.name),
        )
        .into_response();
    }
    Json(res).into_response()
}

async fn routes(State(state): State<Arc<HttpState>>) -> impl IntoResponse {
    let engine = state.engine.clone();
    blocking(StatusCode::UNPROCESSABLE_ENTITY, move || engine.routes()).await
}
