use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{DateTime, Local, Utc};
use optistock_core::FieldKey;
use optistock_import::RecordSource;
use optistock_query::{sort_records, Filter, SortState, StatusFilter};
use optistock_render::{render_printable, render_row, result_count_label, ExportKind, RenderedRow};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

use crate::orchestrator::{FetchOutcome, Orchestrator, RefreshMode};
use crate::state::StatusMessage;

const BODY_LIMIT: usize = 16 * 1024;
const INDEX_HTML: &str = include_str!("../assets/index.html");

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    NotFound(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
        };
        (status, Json(serde_json::json!({ "error": self.to_string() }))).into_response()
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RecordsParams {
    pub q: String,
    pub familia: String,
    pub estado: String,
}

#[derive(Debug, Serialize)]
pub struct RecordsResponse {
    pub count: usize,
    pub count_label: String,
    pub rows: Vec<RenderedRow>,
    pub sort: SortState,
    pub last_sync: Option<DateTime<Utc>>,
    pub last_sync_label: Option<String>,
    pub status: StatusMessage,
    pub loading: bool,
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: StatusMessage,
    pub last_sync: Option<DateTime<Utc>>,
    pub loading: bool,
    pub fetching: bool,
    pub records: usize,
}

type AppOrchestrator<S> = State<Arc<Orchestrator<S>>>;

pub fn build_router<S: RecordSource + 'static>(orch: Arc<Orchestrator<S>>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/healthz", get(healthz))
        .route("/api/records", get(records::<S>))
        .route("/api/sort/{key}", post(toggle_sort::<S>))
        .route("/api/refresh", post(refresh::<S>))
        .route("/api/refresh/force", post(force_refresh::<S>))
        .route("/api/familias", get(familias::<S>))
        .route("/api/status", get(status::<S>))
        .route("/export/{kind}", get(export::<S>))
        .layer(RequestBodyLimitLayer::new(BODY_LIMIT))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(orch)
}

async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

async fn healthz() -> &'static str {
    "ok"
}

fn sync_label(at: Option<DateTime<Utc>>) -> Option<String> {
    at.map(|t| t.with_timezone(&Local).format("%-d/%-m/%Y %H:%M").to_string())
}

async fn records<S: RecordSource + 'static>(
    State(orch): AppOrchestrator<S>,
    Query(params): Query<RecordsParams>,
) -> Result<Json<RecordsResponse>, ApiError> {
    let status: StatusFilter = params.estado.parse().map_err(ApiError::BadRequest)?;
    let filter = Filter::new(&params.q, &params.familia, status);

    let state = orch.state().lock().await;
    let sorted = sort_records(state.inventory.filter(&filter), state.sort);
    let rows: Vec<RenderedRow> = sorted
        .into_iter()
        .map(|r| render_row(r, &filter.query.highlight_tokens))
        .collect();

    Ok(Json(RecordsResponse {
        count: rows.len(),
        count_label: result_count_label(rows.len()),
        rows,
        sort: state.sort,
        last_sync: state.last_sync,
        last_sync_label: sync_label(state.last_sync),
        status: state.status.clone(),
        loading: state.is_loading(),
    }))
}

async fn toggle_sort<S: RecordSource + 'static>(
    State(orch): AppOrchestrator<S>,
    Path(key): Path<String>,
) -> Result<Json<SortState>, ApiError> {
    let key: FieldKey = key.parse().map_err(ApiError::BadRequest)?;
    let mut state = orch.state().lock().await;
    state.sort.toggle(key);
    Ok(Json(state.sort))
}

async fn refresh<S: RecordSource + 'static>(State(orch): AppOrchestrator<S>) -> Json<FetchOutcome> {
    Json(orch.fetch_all(RefreshMode::Normal).await)
}

async fn force_refresh<S: RecordSource + 'static>(State(orch): AppOrchestrator<S>) -> Json<FetchOutcome> {
    Json(orch.fetch_all(RefreshMode::Force).await)
}

async fn familias<S: RecordSource + 'static>(State(orch): AppOrchestrator<S>) -> Json<Vec<String>> {
    Json(orch.state().lock().await.inventory.categories())
}

async fn status<S: RecordSource + 'static>(State(orch): AppOrchestrator<S>) -> Json<StatusResponse> {
    let state = orch.state().lock().await;
    Json(StatusResponse {
        status: state.status.clone(),
        last_sync: state.last_sync,
        loading: state.is_loading(),
        fetching: orch.is_fetching(),
        records: state.inventory.len(),
    })
}

/// Printable list. Uses the caller's query and category plus the current
/// sort; the status filter comes from the path.
async fn export<S: RecordSource + 'static>(
    State(orch): AppOrchestrator<S>,
    Path(kind): Path<String>,
    Query(params): Query<RecordsParams>,
) -> Result<Html<String>, ApiError> {
    let kind: ExportKind = kind.parse().map_err(ApiError::NotFound)?;
    let status = match kind {
        ExportKind::Available => StatusFilter::Available,
        ExportKind::Sold => StatusFilter::Sold,
    };
    let filter = Filter::new(&params.q, &params.familia, status);

    let state = orch.state().lock().await;
    let sorted = sort_records(state.inventory.filter(&filter), state.sort);
    Ok(Html(render_printable(&sorted, kind, Local::now().naive_local())))
}
