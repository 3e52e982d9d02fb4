use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use log2::{error, info};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

use crate::crawler::{CrawlError, Crawler};
use crate::frequency::{count_words, WordFrequencyTable};

/// Shared by every request; the crawler itself holds no per-request state
#[derive(Clone)]
pub struct AppState {
    crawler: Arc<Crawler>,
}

impl AppState {
    pub fn new(crawler: Arc<Crawler>) -> Self {
        Self { crawler }
    }
}

#[derive(Debug, Deserialize)]
pub struct WordFrequencyParams {
    pub article: String,
    pub depth: usize,
}

#[derive(Debug, Deserialize)]
pub struct KeywordsRequest {
    pub article: String,
    pub depth: usize,
    #[serde(default)]
    pub ignore_list: Vec<String>,
    pub percentile: f64,
}

/// Errors surfaced to HTTP clients as `{"detail": ...}`
#[derive(Debug)]
pub enum ApiError {
    NotFound(String),
    BadRequest(String),
    Upstream(String),
}

impl From<CrawlError> for ApiError {
    fn from(error: CrawlError) -> Self {
        match error {
            CrawlError::RootNotFound(_) => ApiError::NotFound(error.to_string()),
            CrawlError::DepthExceeded { .. } => ApiError::BadRequest(error.to_string()),
            CrawlError::Fetch(e) => {
                error!("Crawling failed: {:#}", e);
                ApiError::Upstream(format!("Failed to fetch articles: {}", e))
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, detail) = match self {
            ApiError::NotFound(detail) => (StatusCode::NOT_FOUND, detail),
            ApiError::BadRequest(detail) => (StatusCode::BAD_REQUEST, detail),
            ApiError::Upstream(detail) => (StatusCode::BAD_GATEWAY, detail),
        };
        (status, Json(json!({ "detail": detail }))).into_response()
    }
}

async fn word_frequency(
    State(state): State<AppState>,
    Query(params): Query<WordFrequencyParams>,
) -> Result<Json<WordFrequencyTable>, ApiError> {
    info!("called word_frequency with {} and depth: {}", params.article, params.depth);
    let texts = state.crawler.collect_document_texts(&params.article, params.depth).await?;
    Ok(Json(count_words(&texts, None)))
}

async fn keywords(
    State(state): State<AppState>,
    Json(request): Json<KeywordsRequest>,
) -> Result<Json<WordFrequencyTable>, ApiError> {
    info!(
        "called keywords with {} and depth: {}, percentile: {}",
        request.article, request.depth, request.percentile
    );
    let texts = state.crawler.collect_document_texts(&request.article, request.depth).await?;
    let table = count_words(&texts, Some(request.ignore_list.as_slice()));
    Ok(Json(table.filter_by_percentile(request.percentile)))
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/word-frequency", get(word_frequency))
        .route("/keywords", post(keywords))
        .with_state(state)
}
