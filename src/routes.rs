//! Application router shared by the server binary and the integration tests.

use axum::extract::DefaultBodyLimit;
use axum::http::{HeaderValue, Method};
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::services::ServeDir;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::config::SecurityConfig;
use crate::handlers::{customers, files, health, projects, seed, tasks, upload};
use crate::state::AppState;

/// Multipart framing allowance on top of the largest accepted file.
const MULTIPART_OVERHEAD: usize = 1024 * 1024;

pub fn app(state: AppState) -> Router {
    let config = state.config.clone();
    let uploads = ServeDir::new(&config.uploads.dir);

    let mut router = Router::new()
        .route("/", get(health::root))
        .route("/health", get(health::health))
        .nest("/api", api_routes(&state))
        .nest_service(&config.uploads.public_path, uploads);

    if config.security.enable_cors {
        router = router.layer(cors_layer(&config.security));
    }
    if config.api.enable_request_logging {
        router = router.layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        );
    }

    router
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .with_state(state)
}

fn api_routes(state: &AppState) -> Router<AppState> {
    let upload_limit = state
        .config
        .uploads
        .file_max_bytes
        .max(state.config.uploads.image_max_bytes)
        + MULTIPART_OVERHEAD;

    let router = Router::new()
        .route(
            "/customers",
            get(customers::collection_get).post(customers::collection_post),
        )
        .route(
            "/customers/:id",
            get(customers::record_get)
                .put(customers::record_put)
                .delete(customers::record_delete),
        )
        .route(
            "/projects",
            get(projects::collection_get).post(projects::collection_post),
        )
        .route(
            "/projects/:id",
            get(projects::record_get)
                .put(projects::record_put)
                .delete(projects::record_delete),
        )
        .route("/tasks", get(tasks::collection_get).post(tasks::collection_post))
        .route("/tasks/bulk", post(tasks::bulk_post))
        .route(
            "/tasks/:id",
            get(tasks::record_get)
                .put(tasks::record_put)
                .delete(tasks::record_delete),
        )
        .route("/files", get(files::collection_get).post(files::collection_post))
        .route(
            "/files/:id",
            get(files::record_get)
                .put(files::record_put)
                .delete(files::record_delete),
        )
        .route(
            "/upload",
            post(upload::post).layer(DefaultBodyLimit::max(upload_limit)),
        );

    if state.config.api.enable_seed {
        router.route("/seed", get(seed::get).post(seed::post))
    } else {
        router
    }
}

fn cors_layer(security: &SecurityConfig) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers(Any);

    if security.cors_origins.iter().any(|o| o == "*") {
        return layer.allow_origin(Any);
    }
    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();
    layer.allow_origin(origins)
}
