use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::{Deserialize, Serialize};
use skyfolio_model::{MediaId, MediaRecord, MediaType};
use uuid::Uuid;

use crate::infra::{
    app_state::AppState,
    errors::{AppError, AppResult},
};

#[derive(Debug, Default, Deserialize)]
pub struct ListMediaQuery {
    pub media_type: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteMediaResponse {
    pub id: MediaId,
    pub files_removed: usize,
    pub files_missing: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub files_failed: Vec<String>,
}

/// GET /api/v1/media
pub async fn list_media_handler(
    State(state): State<AppState>,
    Query(query): Query<ListMediaQuery>,
) -> AppResult<Json<Vec<MediaRecord>>> {
    let media_type = query
        .media_type
        .as_deref()
        .filter(|raw| !raw.is_empty() && *raw != "all")
        .map(|raw| raw.parse::<MediaType>())
        .transpose()
        .map_err(|e| AppError::bad_request(e.to_string()))?;

    Ok(Json(state.library.list(media_type).await?))
}

/// GET /api/v1/media/{id}
pub async fn get_media_handler(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<MediaRecord>> {
    Ok(Json(state.library.get(MediaId::from(id)).await?))
}

/// DELETE /api/v1/media/{id}
///
/// Removes the record together with its stored original and every
/// generated rendition.
pub async fn delete_media_handler(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<DeleteMediaResponse>> {
    let report = state.library.delete(MediaId::from(id)).await?;
    Ok(Json(DeleteMediaResponse {
        id: report.record.id,
        files_removed: report.files_removed,
        files_missing: report.files_missing,
        files_failed: report.files_failed,
    }))
}
