use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};

use crate::{
    AppState,
    handlers::{
        health::health_handler,
        media::{
            handle_media::{delete_media_handler, get_media_handler, list_media_handler},
            handle_upload::upload_handler,
        },
        thumbnails::handle_thumbnails::{
            check_remote_image_handler, delete_thumbnail_handler,
            generate_thumbnail_handler, generate_tiers_handler,
        },
    },
};

/// Create all v1 API routes
pub fn create_v1_router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/health", get(health_handler))
        .merge(create_media_routes(&state))
        .merge(create_thumbnail_routes())
}

fn create_media_routes(state: &AppState) -> Router<AppState> {
    let max_upload_bytes = state.config().uploads.max_upload_bytes;
    Router::new()
        .route(
            "/uploads",
            post(upload_handler).layer(DefaultBodyLimit::max(max_upload_bytes)),
        )
        .route("/media", get(list_media_handler))
        .route(
            "/media/{id}",
            get(get_media_handler).delete(delete_media_handler),
        )
}

fn create_thumbnail_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/thumbnails",
            post(generate_thumbnail_handler).delete(delete_thumbnail_handler),
        )
        .route("/thumbnails/tiers", post(generate_tiers_handler))
        .route("/thumbnails/check", get(check_remote_image_handler))
}
