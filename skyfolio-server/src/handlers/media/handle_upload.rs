use axum::{
    Json,
    body::Bytes,
    extract::{Query, State, rejection::BytesRejection},
    http::{HeaderMap, StatusCode, header},
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use skyfolio_core::UploadRequest;
use skyfolio_model::{MediaId, MediaType};
use tracing::info;

use crate::infra::{app_state::AppState, errors::AppResult};

pub const FILENAME_HEADER: &str = "x-filename";

#[derive(Debug, Default, Deserialize)]
pub struct UploadQuery {
    pub title: Option<String>,
    pub location: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub id: MediaId,
    pub title: String,
    pub media_type: MediaType,
    pub url: String,
    pub thumbnail_url: Option<String>,
    pub variants: Vec<String>,
}

/// POST /api/v1/uploads
///
/// Raw body upload. `Content-Type` declares the MIME type and `X-Filename`
/// optionally carries the original name, used as the default title.
pub async fn upload_handler(
    State(state): State<AppState>,
    Query(query): Query<UploadQuery>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> AppResult<impl IntoResponse> {
    let bytes = body?;

    let header_str = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };

    let request = UploadRequest {
        bytes,
        content_type: header_str(header::CONTENT_TYPE.as_str()),
        filename: header_str(FILENAME_HEADER),
        title: query.title,
        location: query.location,
    };

    let cancel = state.shutdown.child_token();
    let outcome = state.uploads.run(request, &cancel).await?;
    let record = outcome.record;

    info!(id = %record.id, title = %record.title, "upload accepted");

    Ok((
        StatusCode::CREATED,
        Json(UploadResponse {
            id: record.id,
            title: record.title,
            media_type: record.media_type,
            url: record.url,
            thumbnail_url: record.thumbnail_url,
            variants: record.variants,
        }),
    ))
}
