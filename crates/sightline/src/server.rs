//! HTTP API for the dashboard.
//!
//! - `GET /api/health`
//! - `GET /api/kinds` - analyses with a report
//! - `GET /api/{kind}/rows?page=&size=&sort=col:dir,...` - one sorted page of rows
//! - `GET /api/{kind}/file?path=...` - a file's content and findings

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use eyre::Result;
use serde::Deserialize;
use sightline_api::{ApiError, ApiFileDetail, ApiHealth, ApiKindInfo, ApiPage, ApiRow};
use sightline_core::{AnalysisKind, FetchError, FileSource, PageRequest, RowSource, Sorter};
use tower_http::cors::{Any, CorsLayer};
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::store::{KindSource, ReportStore};

/// State shared across HTTP handlers.
pub struct AppState {
    store: ReportStore,
    default_sorter: Sorter,
    page_size: usize,
}

impl AppState {
    pub fn new(store: ReportStore, config: &Config) -> Self {
        Self {
            store,
            default_sorter: config.default_sorter(),
            page_size: config.page_size.max(1),
        }
    }
}

/// Build the API router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(api_health))
        .route("/api/kinds", get(api_kinds))
        .route("/api/{kind}/rows", get(api_rows))
        .route("/api/{kind}/file", get(api_file))
        .with_state(Arc::new(state))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
}

/// Serve the API until the process is stopped.
pub async fn run(state: AppState, port: Option<u16>, open: bool) -> Result<()> {
    let app = router(state);

    // Find a free port if none was explicitly requested
    let listener = match port {
        Some(p) => {
            let addr = format!("127.0.0.1:{p}");
            tokio::net::TcpListener::bind(&addr).await?
        }
        None => {
            const DEFAULT_PORT: u16 = 3000;
            const MAX_ATTEMPTS: u16 = 20;
            let mut listener = None;
            for p in DEFAULT_PORT..DEFAULT_PORT + MAX_ATTEMPTS {
                match tokio::net::TcpListener::bind(format!("127.0.0.1:{p}")).await {
                    Ok(l) => {
                        listener = Some(l);
                        break;
                    }
                    Err(_) => continue,
                }
            }
            listener.ok_or_else(|| {
                eyre::eyre!(
                    "Could not find a free port in range {DEFAULT_PORT}..{}",
                    DEFAULT_PORT + MAX_ATTEMPTS
                )
            })?
        }
    };

    let addr = listener.local_addr()?;
    info!("sightline listening on http://{}", addr);

    if open {
        let url = format!("http://{}", addr);
        if let Err(e) = ::open::that(&url) {
            warn!("Failed to open browser: {}. Open manually at: {}", e, url);
        }
    }

    axum::serve(listener, app).await?;

    Ok(())
}

fn error_response(status: StatusCode, code: &str, msg: impl Into<String>) -> Response {
    (
        status,
        Json(ApiError {
            error: msg.into(),
            code: code.to_string(),
        }),
    )
        .into_response()
}

fn bad_request(msg: impl Into<String>) -> Response {
    error_response(StatusCode::BAD_REQUEST, "bad_request", msg)
}

fn not_found(msg: impl Into<String>) -> Response {
    error_response(StatusCode::NOT_FOUND, "not_found", msg)
}

fn internal(msg: impl Into<String>) -> Response {
    error_response(StatusCode::INTERNAL_SERVER_ERROR, "internal", msg)
}

fn fetch_error(e: FetchError) -> Response {
    match e {
        FetchError::NotFound { .. } => not_found(e.to_string()),
        FetchError::Transport { .. } | FetchError::Decode { .. } => {
            warn!(error = %e, "fetch failed");
            internal(e.to_string())
        }
    }
}

/// Resolve the `{kind}` path segment to a loaded report
#[allow(clippy::result_large_err)]
fn kind_source(state: &AppState, kind: &str) -> Result<KindSource, Response> {
    let kind: AnalysisKind = kind.parse().map_err(bad_request)?;
    state
        .store
        .source(kind)
        .ok_or_else(|| not_found(format!("No report for {kind}")))
}

/// Query parameters for the rows endpoint. Numbers are parsed by hand so
/// malformed values get a JSON error body.
#[derive(Debug, Clone, Deserialize)]
struct RowsQuery {
    page: Option<String>,
    size: Option<String>,
    sort: Option<String>,
}

/// Query parameters for the file endpoint.
#[derive(Debug, Clone, Deserialize)]
struct FileQuery {
    path: Option<String>,
}

#[allow(clippy::result_large_err)]
fn parse_number(name: &str, value: Option<&str>, default: usize) -> Result<usize, Response> {
    match value {
        None | Some("") => Ok(default),
        Some(raw) => raw
            .parse::<usize>()
            .map_err(|_| bad_request(format!("Invalid {name}: '{raw}'"))),
    }
}

#[allow(clippy::result_large_err)]
fn parse_sort(value: Option<&str>, default: &Sorter) -> Result<Vec<Sorter>, Response> {
    let sorters = value
        .unwrap_or("")
        .split(',')
        .filter(|s| !s.is_empty())
        .map(|s| s.parse::<Sorter>().map_err(bad_request))
        .collect::<Result<Vec<_>, _>>()?;
    if sorters.is_empty() {
        return Ok(vec![default.clone()]);
    }
    Ok(sorters)
}

/// GET /api/health
async fn api_health() -> Response {
    Json(ApiHealth {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
    .into_response()
}

/// GET /api/kinds - Analyses with a report.
async fn api_kinds(State(state): State<Arc<AppState>>) -> Response {
    let kinds: Vec<ApiKindInfo> = state
        .store
        .kinds()
        .into_iter()
        .map(|kind| ApiKindInfo {
            kind,
            title: kind.title().to_string(),
            default_sort: state.default_sorter.to_string(),
        })
        .collect();
    Json(kinds).into_response()
}

/// GET /api/{kind}/rows - One sorted page of a report's rows.
async fn api_rows(
    State(state): State<Arc<AppState>>,
    Path(kind): Path<String>,
    Query(query): Query<RowsQuery>,
) -> Response {
    let source = match kind_source(&state, &kind) {
        Ok(s) => s,
        Err(e) => return e,
    };
    let request = match (
        parse_number("page", query.page.as_deref(), 1),
        parse_number("size", query.size.as_deref(), state.page_size),
        parse_sort(query.sort.as_deref(), &state.default_sorter),
    ) {
        (Ok(page), Ok(page_size), Ok(sorters)) => PageRequest {
            page: page.max(1),
            page_size: page_size.max(1),
            sorters,
        },
        (Err(e), _, _) | (_, Err(e), _) | (_, _, Err(e)) => return e,
    };
    debug!(kind = %kind, page = request.page, size = request.page_size, "rows request");

    match source.fetch_page(&request).await {
        Ok(page) => Json(ApiPage::<ApiRow>::from(page)).into_response(),
        Err(e) => fetch_error(e),
    }
}

/// GET /api/{kind}/file - A file with the report's findings for it.
async fn api_file(
    State(state): State<Arc<AppState>>,
    Path(kind): Path<String>,
    Query(query): Query<FileQuery>,
) -> Response {
    let source = match kind_source(&state, &kind) {
        Ok(s) => s,
        Err(e) => return e,
    };
    let Some(path) = query.path.filter(|p| !p.is_empty()) else {
        return bad_request("Missing 'path' parameter");
    };

    match source.fetch_file(&path).await {
        Ok(detail) => Json(ApiFileDetail::new(path, detail)).into_response(),
        Err(e) => fetch_error(e),
    }
}
