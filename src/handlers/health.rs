use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json};
use serde_json::{json, Value};

use crate::state::AppState;

/// GET / - Service description and route map
pub async fn root() -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    Json(json!({
        "success": true,
        "data": {
            "name": "BuildPro API",
            "version": version,
            "description": "Project management backend for customers, projects, tasks and files",
            "endpoints": {
                "customers": "/api/customers[/:id]",
                "projects": "/api/projects[/:id]",
                "tasks": "/api/tasks[/:id]",
                "bulk": "/api/tasks/bulk",
                "files": "/api/files[/:id]",
                "upload": "/api/upload",
                "seed": "/api/seed (when enabled)",
                "health": "/health",
            }
        }
    }))
}

/// GET /health - Ping the document store
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();
    let backend = state.store.backend_name();

    match state.store.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "database": backend,
                }
            })),
        ),
        Err(e) => {
            tracing::warn!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "success": false,
                    "error": "database unavailable",
                    "data": {
                        "status": "degraded",
                        "timestamp": now,
                        "database": backend,
                        "database_error": e.to_string(),
                    }
                })),
            )
        }
    }
}
