// GST Reconciliation Tool - Web Server
// Upload both invoice files, run the reconciliation, download the workbook

use axum::{
    extract::{DefaultBodyLimit, Multipart},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::Serialize;
use tower_http::cors::CorsLayer;
use tracing_subscriber::EnvFilter;

use gst_recon::{ingest, reconcile_rows, report, Source, VERSION};

/// API Response wrapper
#[derive(Serialize)]
struct ApiResponse<T> {
    success: bool,
    data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<T> ApiResponse<T> {
    fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
            error: None,
        }
    }
}

impl ApiResponse<()> {
    fn err(message: String) -> Self {
        Self {
            success: false,
            data: (),
            error: Some(message),
        }
    }
}

/// One uploaded input file.
struct Upload {
    file_name: String,
    bytes: Vec<u8>,
}

// ============================================================================
// API Handlers
// ============================================================================

/// GET /api/health - Health check
async fn health_check() -> impl IntoResponse {
    Json(ApiResponse::ok(format!("gst-recon v{VERSION}")))
}

/// POST /api/reconcile - Multipart upload of `gstr2b` and `ledger` files;
/// responds with the generated report workbook.
async fn run_reconciliation(multipart: Multipart) -> Response {
    let (gstr, ledger) = match read_uploads(multipart).await {
        Ok(uploads) => uploads,
        Err(message) => {
            return (StatusCode::BAD_REQUEST, Json(ApiResponse::err(message))).into_response();
        }
    };

    let gstr_rows = match ingest::load_rows_from_bytes(gstr.bytes, &gstr.file_name, Source::Gstr2b)
    {
        Ok(rows) => rows,
        Err(e) => {
            return (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(ApiResponse::err(e.to_string())),
            )
                .into_response();
        }
    };
    let ledger_rows =
        match ingest::load_rows_from_bytes(ledger.bytes, &ledger.file_name, Source::Ledger) {
            Ok(rows) => rows,
            Err(e) => {
                return (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    Json(ApiResponse::err(e.to_string())),
                )
                    .into_response();
            }
        };

    let run = reconcile_rows(&gstr_rows, &ledger_rows);
    run.quality.log_concerns();
    tracing::info!(summary = %run.partition.summary(), "reconciliation served");

    match report::workbook_bytes(&run.partition) {
        Ok(bytes) => (
            StatusCode::OK,
            [
                (
                    header::CONTENT_TYPE,
                    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
                ),
                (
                    header::CONTENT_DISPOSITION,
                    "attachment; filename=\"reconciliation_output.xlsx\"",
                ),
            ],
            bytes,
        )
            .into_response(),
        Err(e) => {
            tracing::error!("failed to build report workbook: {e}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::err(e.to_string())),
            )
                .into_response()
        }
    }
}

/// Pull the two expected file fields out of the multipart body.
async fn read_uploads(mut multipart: Multipart) -> Result<(Upload, Upload), String> {
    let mut gstr: Option<Upload> = None;
    let mut ledger: Option<Upload> = None;

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => return Err(format!("invalid multipart body: {e}")),
        };

        let name = field.name().unwrap_or_default().to_string();
        let file_name = field.file_name().unwrap_or("upload.xlsx").to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| format!("failed to read upload '{name}': {e}"))?
            .to_vec();

        match name.as_str() {
            "gstr2b" => gstr = Some(Upload { file_name, bytes }),
            "ledger" => ledger = Some(Upload { file_name, bytes }),
            other => tracing::warn!("ignoring unexpected upload field '{other}'"),
        }
    }

    match (gstr, ledger) {
        (Some(g), Some(l)) => Ok((g, l)),
        (None, _) => Err("missing upload field 'gstr2b'".to_string()),
        (_, None) => Err("missing upload field 'ledger'".to_string()),
    }
}

/// GET / - Serve index.html
async fn serve_index() -> impl IntoResponse {
    Html(include_str!("../web/index.html"))
}

// ============================================================================
// Main Server
// ============================================================================

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("🌐 GST Reconciliation Tool - Web Server v{VERSION}");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    // Build API routes
    let api_routes = Router::new()
        .route("/health", get(health_check))
        .route("/reconcile", post(run_reconciliation));

    // Build main router
    let app = Router::new()
        .route("/", get(serve_index))
        .nest("/api", api_routes)
        .layer(DefaultBodyLimit::max(25 * 1024 * 1024))
        .layer(CorsLayer::permissive());

    // Start server
    let addr = "0.0.0.0:3000";
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    println!("\n🚀 Server running on http://localhost:3000");
    println!("   API: POST http://localhost:3000/api/reconcile");
    println!("   UI:  http://localhost:3000");
    println!("\n   Press Ctrl+C to stop\n");

    axum::serve(listener, app)
        .await
        .expect("Failed to start server");
}
