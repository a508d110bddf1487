// Course Extraction - HTTP trigger
// GET /extract?university_id=..&spreadsheet_id=.. runs every module into the
// CSV workbook for that spreadsheet id.

use anyhow::{Context, Result};
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use clap::Parser;
use course_extraction::{
    build_config, run_extraction, workbook_dir_name, CliOverrides, CsvWorkbook, ExtractConfig,
    ExtractionRequest, RunReport, SqliteCourseStore,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tower_http::cors::CorsLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

/// Course extraction server
#[derive(Parser, Debug)]
#[command(name = "extract-server")]
#[command(version, about, long_about = None)]
struct Args {
    /// Configuration file path (TOML format)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// SQLite course store
    #[arg(long, value_name = "FILE")]
    database: Option<PathBuf>,

    /// Root directory for CSV workbooks
    #[arg(long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Host address to bind to
    #[arg(long)]
    host: Option<String>,

    /// Port to listen on
    #[arg(short, long)]
    port: Option<u16>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,
}

impl From<Args> for CliOverrides {
    fn from(args: Args) -> Self {
        CliOverrides {
            config_file: args.config,
            database: args.database,
            output_dir: args.output_dir,
            host: args.host,
            port: args.port,
            log_level: args.log_level,
            ..Default::default()
        }
    }
}

/// Shared application state
#[derive(Clone)]
struct AppState {
    store: Arc<Mutex<SqliteCourseStore>>,
    config: Arc<ExtractConfig>,
}

/// API Response wrapper
#[derive(Debug, Serialize, Deserialize)]
struct ApiResponse<T> {
    success: bool,
    data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    run_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<T> ApiResponse<T> {
    fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
            run_id: None,
            error: None,
        }
    }

    fn failed(data: T, error: impl Into<String>) -> Self {
        Self {
            success: false,
            data,
            run_id: None,
            error: Some(error.into()),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ExtractParams {
    university_id: Option<String>,
    spreadsheet_id: Option<String>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

// ============================================================================
// Handlers
// ============================================================================

/// GET / - liveness
async fn root() -> &'static str {
    "Course extraction server is running"
}

/// GET /api/health - Health check
async fn health_check() -> impl IntoResponse {
    Json(ApiResponse::ok("OK"))
}

/// GET /extract - run every module for one university
async fn trigger_extraction(
    State(state): State<AppState>,
    Query(params): Query<ExtractParams>,
) -> Response {
    let (Some(university_id), Some(spreadsheet_id)) = (
        non_blank(params.university_id),
        non_blank(params.spreadsheet_id),
    ) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::failed(
                String::new(),
                "university_id and spreadsheet_id are required",
            )),
        )
            .into_response();
    };

    if let Err(e) = workbook_dir_name(&spreadsheet_id) {
        return (
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::failed(String::new(), e.to_string())),
        )
            .into_response();
    }

    let request = ExtractionRequest::new(university_id, spreadsheet_id);
    let result = tokio::task::spawn_blocking(move || run_blocking(&state, &request)).await;

    match result {
        Ok(Ok(report)) => {
            let mut response = ApiResponse::ok(report.summary());
            response.run_id = Some(report.run_id);
            (StatusCode::OK, Json(response)).into_response()
        }
        Ok(Err(e)) => {
            tracing::error!(error = %format!("{:#}", e), "Extraction could not start");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::failed(String::new(), "extraction failed")),
            )
                .into_response()
        }
        Err(e) => {
            tracing::error!(error = %e, "Extraction worker panicked");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::failed(String::new(), "extraction failed")),
            )
                .into_response()
        }
    }
}

fn run_blocking(state: &AppState, request: &ExtractionRequest) -> Result<RunReport> {
    let mut workbook = CsvWorkbook::open(&state.config.output_dir, &request.spreadsheet_id)?;
    let store = state
        .store
        .lock()
        .map_err(|_| anyhow::anyhow!("course store lock poisoned"))?;

    Ok(run_extraction(&*store, &mut workbook, request, &state.config))
}

fn build_router(state: AppState) -> Router {
    let api_routes = Router::new().route("/health", get(health_check));

    Router::new()
        .route("/", get(root))
        .route("/extract", get(trigger_extraction))
        .nest("/api", api_routes)
        .layer(CorsLayer::permissive())
        .with_state(state)
}

fn init_tracing(log_level: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = build_config(&args.into())?;

    init_tracing(config.log_level.as_filter_str());

    tracing::info!("Course extraction server v{}", course_extraction::VERSION);
    tracing::info!(
        database = %config.database_path.display(),
        output_dir = %config.output_dir.display(),
        write_delay_ms = config.write_delay_ms,
        "Server configuration loaded"
    );

    let store = SqliteCourseStore::open(&config.database_path)?
        .with_degree_level(config.degree_level_id.clone());

    let addr = config.server.socket_addr();
    let state = AppState {
        store: Arc::new(Mutex::new(store)),
        config: Arc::new(config),
    };

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    tracing::info!(address = %addr, "Server running");

    axum::serve(listener, build_router(state))
        .await
        .context("Server stopped unexpectedly")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn create_test_state(output_dir: PathBuf) -> AppState {
        let store = SqliteCourseStore::open_in_memory().unwrap();
        let export = json!({
            "universities": [ { "_id": "uni1", "name": "Test University" } ],
            "currencies": [ { "_id": "myr", "name": "MYR" } ],
            "courses": [
                {
                    "_id": "c1",
                    "name": "Certificate in Baking",
                    "university_id": "uni1",
                    "data": {
                        "publish": "on",
                        "level_of_studies": ["cert"],
                        "local_year_fulltime": 1,
                        "domesticstd_fee_currency": "myr",
                        "domesticstd_course_fees": {
                            "1": { "fees_category": "1", "fees_amount": 8000 }
                        }
                    }
                }
            ]
        });
        store.import(export.as_object().unwrap()).unwrap();

        AppState {
            store: Arc::new(Mutex::new(store)),
            config: Arc::new(ExtractConfig {
                output_dir,
                write_delay_ms: 0,
                ..Default::default()
            }),
        }
    }

    fn scratch_dir() -> PathBuf {
        std::env::temp_dir().join(format!("extract-server-{}", Uuid::new_v4()))
    }

    async fn get_json(router: Router, uri: &str) -> (StatusCode, Value) {
        let response = router
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();

        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn test_health_endpoint_returns_200() {
        let router = build_router(create_test_state(scratch_dir()));
        let (status, body) = get_json(router, "/api/health").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["data"], "OK");
    }

    #[tokio::test]
    async fn test_root_is_alive() {
        let router = build_router(create_test_state(scratch_dir()));
        let response = router
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_extract_requires_both_ids() {
        let router = build_router(create_test_state(scratch_dir()));

        let (status, body) = get_json(router.clone(), "/extract?university_id=uni1").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);

        let (status, _) = get_json(router, "/extract?university_id=&spreadsheet_id=s1").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_extract_rejects_parent_dir_spreadsheet() {
        let root = scratch_dir();
        let output_dir = root.join("workbooks");
        let router = build_router(create_test_state(output_dir));

        let (status, body) =
            get_json(router.clone(), "/extract?university_id=uni1&spreadsheet_id=..").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);

        let (status, _) = get_json(router, "/extract?university_id=uni1&spreadsheet_id=.").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        assert!(!root.join("Status.csv").exists());
        std::fs::remove_dir_all(&root).ok();
    }

    #[tokio::test]
    async fn test_extract_writes_workbook() {
        let output_dir = scratch_dir();
        let router = build_router(create_test_state(output_dir.clone()));

        let (status, body) =
            get_json(router, "/extract?university_id=uni1&spreadsheet_id=sheet-42").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert!(body["run_id"].is_string());
        assert!(body["data"].as_str().unwrap().contains("uni1"));

        let workbook = output_dir.join("sheet-42");
        assert!(workbook.join("Status.csv").exists());
        assert!(workbook.join("Fee-Extraction-Non-Degree-CWB.csv").exists());

        let status_tab = std::fs::read_to_string(workbook.join("Status.csv")).unwrap();
        assert_eq!(status_tab.lines().count(), 7);

        std::fs::remove_dir_all(&output_dir).ok();
    }
}
