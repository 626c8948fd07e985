//! REST surface: four JSON endpoints plus a health check, with a CORS
//! allow-list and a 2 MiB body limit.

use std::sync::Arc;

use axum::extract::{DefaultBodyLimit, State};
use axum::http::{header, HeaderValue, Method};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::analyzer::{Analyzer, QuestionContext};
use crate::config::normalize_origin;
use crate::error::{RepolensError, Result};
use crate::types::{Explanation, RepoAnalysis};

const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub analyzer: Arc<Analyzer>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AnalyzeRequest {
    repo_url: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PathRequest {
    repo_url: Option<String>,
    path: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QuestionRequest {
    repo_url: Option<String>,
    question: Option<String>,
    #[serde(default)]
    context: Option<QuestionContext>,
}

#[derive(Debug, Serialize)]
struct ExplanationResponse {
    explanation: Explanation,
}

#[derive(Debug, Serialize)]
struct AnswerResponse {
    answer: Explanation,
}

pub fn router(analyzer: Arc<Analyzer>, cors_origins: Vec<String>) -> Router {
    let state = AppState { analyzer };
    Router::new()
        .route("/health", get(health))
        .route("/api/analyze", post(analyze))
        .route("/api/file", post(explain_file))
        .route("/api/folder", post(explain_folder))
        .route("/api/question", post(answer_question))
        .layer(cors_layer(cors_origins))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// One deterministic CORS policy: a wildcard entry allows any origin with
/// credentials disabled; otherwise an origin is allowed when the configured
/// list is empty, contains it, or it ends with `.vercel.app`.
pub fn cors_layer(origins: Vec<String>) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    if origins.iter().any(|origin| origin == "*") {
        return layer.allow_origin(Any);
    }

    layer
        .allow_origin(AllowOrigin::predicate(
            move |origin: &HeaderValue, _request_parts| {
                origin
                    .to_str()
                    .map(|value| origin_allowed(value, &origins))
                    .unwrap_or(false)
            },
        ))
        .allow_credentials(true)
}

fn origin_allowed(origin: &str, allowed: &[String]) -> bool {
    let normalized = normalize_origin(origin);
    if allowed.is_empty() {
        return true;
    }
    if allowed.iter().any(|entry| *entry == normalized) {
        return true;
    }
    normalized.ends_with(".vercel.app")
}

async fn health() -> Json<Value> {
    Json(json!({ "ok": true }))
}

async fn analyze(
    State(state): State<AppState>,
    Json(body): Json<AnalyzeRequest>,
) -> Result<Json<RepoAnalysis>> {
    let repo_url = require(body.repo_url, "repoUrl is required")?;
    let result = state.analyzer.analyze(&repo_url).await?;
    Ok(Json(result))
}

async fn explain_file(
    State(state): State<AppState>,
    Json(body): Json<PathRequest>,
) -> Result<Json<ExplanationResponse>> {
    let missing = "repoUrl and path are required";
    let repo_url = require(body.repo_url, missing)?;
    let path = require(body.path, missing)?;
    let explanation = state.analyzer.explain_file(&repo_url, &path).await?;
    Ok(Json(ExplanationResponse { explanation }))
}

async fn explain_folder(
    State(state): State<AppState>,
    Json(body): Json<PathRequest>,
) -> Result<Json<ExplanationResponse>> {
    let missing = "repoUrl and path are required";
    let repo_url = require(body.repo_url, missing)?;
    let path = require(body.path, missing)?;
    let explanation = state.analyzer.explain_folder(&repo_url, &path).await?;
    Ok(Json(ExplanationResponse { explanation }))
}

async fn answer_question(
    State(state): State<AppState>,
    Json(body): Json<QuestionRequest>,
) -> Result<Json<AnswerResponse>> {
    let missing = "repoUrl and question are required";
    let repo_url = require(body.repo_url, missing)?;
    let question = require(body.question, missing)?;
    let context = body.context.unwrap_or_default();
    let answer = state
        .analyzer
        .answer_question(&repo_url, &question, &context)
        .await?;
    Ok(Json(AnswerResponse { answer }))
}

fn require(field: Option<String>, message: &str) -> Result<String> {
    field
        .filter(|value| !value.trim().is_empty())
        .ok_or_else(|| RepolensError::InvalidInput(message.to_string()))
}
