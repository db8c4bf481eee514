//! Direct access to the thumbnail generator. Sources are always fetched over
//! HTTP; relative URLs resolve against the public base URL, so a caller can
//! never point the generator at a local path.

use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use skyfolio_core::ThumbnailSource;
use skyfolio_model::{
    OutputFormat, ThumbnailOptions, ThumbnailResult, ThumbnailSet, ThumbnailTier,
    TierFailure,
};
use tracing::debug;

use crate::infra::{app_state::AppState, errors::AppResult};

#[derive(Debug, Deserialize)]
pub struct GenerateThumbnailRequest {
    pub url: String,
    #[serde(flatten)]
    pub options: ThumbnailOptions,
}

#[derive(Debug, Deserialize)]
pub struct GenerateTiersRequest {
    pub url: String,
    #[serde(default)]
    pub tiers: Option<Vec<ThumbnailTier>>,
    /// Applied to the default tiers when `tiers` is absent
    #[serde(default)]
    pub format: Option<OutputFormat>,
}

#[derive(Debug, Deserialize)]
pub struct UrlQuery {
    pub url: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ThumbnailResponse {
    pub url: String,
    pub byte_size: u64,
}

impl From<ThumbnailResult> for ThumbnailResponse {
    fn from(result: ThumbnailResult) -> Self {
        Self {
            url: result.url,
            byte_size: result.byte_size,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ThumbnailSetResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub small: Option<ThumbnailResponse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub medium: Option<ThumbnailResponse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub large: Option<ThumbnailResponse>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub failed: Vec<TierFailure>,
}

impl From<ThumbnailSet> for ThumbnailSetResponse {
    fn from(set: ThumbnailSet) -> Self {
        Self {
            small: set.small.map(Into::into),
            medium: set.medium.map(Into::into),
            large: set.large.map(Into::into),
            failed: set.failed,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DeleteThumbnailResponse {
    pub deleted: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteImageCheckResponse {
    pub url: String,
    pub is_image: bool,
}

/// POST /api/v1/thumbnails
pub async fn generate_thumbnail_handler(
    State(state): State<AppState>,
    Json(request): Json<GenerateThumbnailRequest>,
) -> AppResult<impl IntoResponse> {
    debug!(url = %request.url, ?request.options, "thumbnail requested");
    let result = state
        .generator
        .generate_from_url(&request.url, request.options)
        .await?;
    Ok((StatusCode::CREATED, Json(ThumbnailResponse::from(result))))
}

/// POST /api/v1/thumbnails/tiers
pub async fn generate_tiers_handler(
    State(state): State<AppState>,
    Json(request): Json<GenerateTiersRequest>,
) -> AppResult<impl IntoResponse> {
    let tiers = match (request.tiers, request.format) {
        (Some(tiers), _) => tiers,
        (None, Some(format)) => ThumbnailTier::defaults_in(format),
        (None, None) => ThumbnailTier::defaults(),
    };
    let set = state
        .generator
        .generate_multiple_sizes(ThumbnailSource::Url(request.url), &tiers)
        .await?;
    Ok((StatusCode::CREATED, Json(ThumbnailSetResponse::from(set))))
}

/// DELETE /api/v1/thumbnails?url=...
pub async fn delete_thumbnail_handler(
    State(state): State<AppState>,
    Query(query): Query<UrlQuery>,
) -> AppResult<Json<DeleteThumbnailResponse>> {
    let deleted = state.generator.delete_variant(&query.url).await?;
    Ok(Json(DeleteThumbnailResponse { deleted }))
}

/// GET /api/v1/thumbnails/check?url=...
pub async fn check_remote_image_handler(
    State(state): State<AppState>,
    Query(query): Query<UrlQuery>,
) -> Json<RemoteImageCheckResponse> {
    let is_image = state.generator.validate_remote_image(&query.url).await;
    Json(RemoteImageCheckResponse {
        url: query.url,
        is_image,
    })
}
