// CSF Tracker - Web Server
// JSON API consumed by the browser dashboard. The dashboard re-fetches the
// full control set after every mutation, so every read handler works from
// get_all_controls and derives views in memory.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, put},
    Router,
};
use rusqlite::Connection;
use serde::Serialize;
use std::sync::{Arc, Mutex};
use tower_http::cors::CorsLayer;
use tracing::error;

use csf_tracker::{
    dashboard_stats, delete_all_controls, get_all_controls, get_controls_by_owner,
    insert_controls, setup_database, update_control, Control, ControlFilter,
    DashboardStats,
};

/// Shared application state
#[derive(Clone)]
struct AppState {
    db: Arc<Mutex<Connection>>,
}

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

fn internal_error(context: &str, err: anyhow::Error) -> axum::response::Response {
    error!("{context}: {err:#}");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ApiResponse::err(context.to_string())),
    )
        .into_response()
}

// ============================================================================
// API Handlers
// ============================================================================

/// GET /api/health - Health check
async fn health_check() -> impl IntoResponse {
    Json(ApiResponse::ok("OK"))
}

/// GET /api/controls - Filtered control list (all query params optional)
async fn list_controls(
    State(state): State<AppState>,
    Query(filter): Query<ControlFilter>,
) -> impl IntoResponse {
    let conn = state.db.lock().unwrap();

    match get_all_controls(&conn) {
        Ok(controls) => {
            let filtered = filter.apply(&controls);
            (StatusCode::OK, Json(ApiResponse::ok(filtered))).into_response()
        }
        Err(e) => internal_error("Failed to list controls", e),
    }
}

/// POST /api/controls - Bulk insert (all-or-nothing)
async fn create_controls(
    State(state): State<AppState>,
    Json(controls): Json<Vec<Control>>,
) -> impl IntoResponse {
    let mut conn = state.db.lock().unwrap();

    match insert_controls(&mut conn, &controls) {
        Ok(written) => (StatusCode::CREATED, Json(ApiResponse::ok(written))).into_response(),
        Err(e) => internal_error("Failed to insert controls", e),
    }
}

/// PUT /api/controls/:id - Full-record update keyed by id
async fn put_control(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(mut control): Json<Control>,
) -> impl IntoResponse {
    // The path owns the identity; the body cannot redirect the write
    control.id = id;

    let conn = state.db.lock().unwrap();

    match update_control(&conn, &control) {
        Ok(true) => (StatusCode::OK, Json(ApiResponse::ok(control))).into_response(),
        Ok(false) => (
            StatusCode::NOT_FOUND,
            Json(ApiResponse::err(format!(
                "No control with id {}",
                control.id
            ))),
        )
            .into_response(),
        Err(e) => internal_error("Failed to update control", e),
    }
}

/// DELETE /api/controls - Bulk clear
async fn clear_controls(State(state): State<AppState>) -> impl IntoResponse {
    let conn = state.db.lock().unwrap();

    match delete_all_controls(&conn) {
        Ok(deleted) => (StatusCode::OK, Json(ApiResponse::ok(deleted))).into_response(),
        Err(e) => internal_error("Failed to clear controls", e),
    }
}

/// GET /api/stats - Dashboard aggregates over the full control set
async fn get_stats(State(state): State<AppState>) -> impl IntoResponse {
    let conn = state.db.lock().unwrap();

    match get_all_controls(&conn) {
        Ok(controls) => {
            let stats: DashboardStats = dashboard_stats(&controls);
            (StatusCode::OK, Json(ApiResponse::ok(stats))).into_response()
        }
        Err(e) => internal_error("Failed to compute stats", e),
    }
}

/// GET /api/owners/:owner/controls - Controls for one owner
async fn owner_controls(
    State(state): State<AppState>,
    Path(owner): Path<String>,
) -> impl IntoResponse {
    // Decode URL-encoded owner names ("Legal%20%26%20Compliance")
    let decoded_owner = urlencoding::decode(&owner)
        .unwrap_or_else(|_| owner.clone().into())
        .into_owned();

    let conn = state.db.lock().unwrap();

    match get_controls_by_owner(&conn, &decoded_owner) {
        Ok(controls) => (StatusCode::OK, Json(ApiResponse::ok(controls))).into_response(),
        Err(e) => internal_error("Failed to list owner controls", e),
    }
}

// ============================================================================
// Main Server
// ============================================================================

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    println!("🌐 CSF Tracker - Web Server");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    let db_path = std::env::var("CSF_TRACKER_DB").unwrap_or_else(|_| "controls.db".to_string());

    let conn = Connection::open(&db_path).expect("Failed to open database");
    setup_database(&conn).expect("Failed to initialize database");
    println!("✓ Database opened: {:?}", db_path);

    // Create shared state
    let state = AppState {
        db: Arc::new(Mutex::new(conn)),
    };

    // Build API routes
    let api_routes = Router::new()
        .route("/health", get(health_check))
        .route(
            "/controls",
            get(list_controls).post(create_controls).delete(clear_controls),
        )
        .route("/controls/:id", put(put_control))
        .route("/stats", get(get_stats))
        .route("/owners/:owner/controls", get(owner_controls))
        .with_state(state.clone());

    let app = Router::new()
        .nest("/api", api_routes)
        .layer(CorsLayer::permissive());

    // Start server
    let addr = "0.0.0.0:3000";
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    println!("\n🚀 Server running on http://localhost:3000");
    println!("   Controls: http://localhost:3000/api/controls");
    println!("   Stats:    http://localhost:3000/api/stats");
    println!("\n   Press Ctrl+C to stop\n");

    axum::serve(listener, app)
        .await
        .expect("Failed to start server");
}
