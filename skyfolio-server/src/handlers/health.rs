use axum::{Json, extract::State};
use serde_json::{Value, json};

use crate::infra::app_state::AppState;

/// GET /api/v1/health
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    let thumbnail_dir = state.generator.output_dir().dir();
    let dir_ok = tokio::fs::metadata(thumbnail_dir)
        .await
        .map(|meta| meta.is_dir())
        .unwrap_or(false);

    Json(json!({
        "status": if dir_ok { "healthy" } else { "degraded" },
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "version": env!("CARGO_PKG_VERSION"),
        "checks": {
            "thumbnailDir": {
                "status": if dir_ok { "healthy" } else { "missing" },
                "path": thumbnail_dir.display().to_string(),
            }
        }
    }))
}
