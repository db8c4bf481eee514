//! Skyfolio HTTP server: upload intake, media records, thumbnail generation
//! and static delivery of originals and renditions.

pub mod handlers;
pub mod infra;
pub mod routes;

pub use infra::app_state::AppState;

use axum::{
    Router,
    http::{HeaderValue, Method, header},
};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};

use crate::infra::app_state::{THUMBNAIL_ROUTE, UPLOAD_ROUTE};

pub fn create_app(state: AppState) -> Router {
    let versioned_api = routes::create_api_router(state.clone());

    let origins: Vec<HeaderValue> = state
        .config()
        .cors
        .allowed_origins
        .iter()
        .filter(|origin| origin.as_str() != "*")
        .filter_map(|origin| HeaderValue::from_str(origin).ok())
        .collect();
    let allow_origin = if origins.is_empty() {
        AllowOrigin::any()
    } else {
        AllowOrigin::list(origins)
    };
    let cors_layer = CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers(Any)
        .expose_headers([header::CONTENT_LENGTH]);

    let thumbnails = ServeDir::new(&state.config().storage.thumbnail_dir);
    let uploads = ServeDir::new(&state.config().storage.upload_dir);

    Router::new()
        .route("/health", axum::routing::get(handlers::health::health_handler))
        .merge(versioned_api)
        .nest_service(&format!("/{THUMBNAIL_ROUTE}"), thumbnails)
        .nest_service(&format!("/{UPLOAD_ROUTE}"), uploads)
        // Outer to inner: CORS, then tracing
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer)
        .with_state(state)
}
