use axum::{
    body::Body,
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::Response,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::AppState;
use crate::errors::AppError;
use crate::models::StreamType;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

#[derive(Debug, Deserialize)]
pub struct PlaylistParams {
    pub provider: Option<Uuid>,
}

/// Generate and serve one user's filtered playlist.
///
/// `kind` accepts `live`, `vod` or `series`, with or without an `.m3u8`
/// suffix. Response headers carry the playlist content type, a suggested
/// filename and a no-cache directive; the body is the emitter's output
/// byte-for-byte.
pub async fn serve_playlist(
    Path((user_id, kind)): Path<(Uuid, String)>,
    Query(params): Query<PlaylistParams>,
    State(state): State<AppState>,
) -> Result<Response, AppError> {
    let kind_name = kind.strip_suffix(".m3u8").unwrap_or(&kind);
    let stream_type = StreamType::parse(kind_name)
        .ok_or_else(|| AppError::validation(format!("unknown playlist kind '{kind}'")))?;

    let playlist = state
        .playlist
        .generate(user_id, stream_type, params.provider)
        .await?;

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "application/vnd.apple.mpegurl")
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}.m3u8\"", stream_type),
        )
        .header(header::CACHE_CONTROL, "no-cache")
        .body(Body::from(playlist.content))
        .map_err(|e| AppError::internal(format!("failed to build response: {e}")))
}
