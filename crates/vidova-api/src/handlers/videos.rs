//! Video upload, listing and streaming handlers.

use std::path::Path as FsPath;

use axum::body::Body;
use axum::extract::{Multipart, Path, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::Response;
use axum::Json;
use tokio_util::io::ReaderStream;
use tracing::info;

use vidova_models::{VideoId, VideoRecord, VideoWithUploader};

use crate::auth::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Accepted video container formats, matched against both the file
/// extension and the declared MIME type.
const ALLOWED_FORMATS: &[&str] = &["mp4", "mov", "avi", "mkv"];

/// Check an upload's filename extension and declared MIME type.
fn is_allowed_video(filename: &str, mime_type: &str) -> bool {
    let ext_ok = FsPath::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| {
            let e = e.to_lowercase();
            ALLOWED_FORMATS.contains(&e.as_str())
        })
        .unwrap_or(false);
    let mime = mime_type.to_lowercase();
    let mime_ok = ALLOWED_FORMATS.iter().any(|f| mime.contains(f));
    ext_ok && mime_ok
}

/// A parsed `Range` header, inclusive on both ends.
#[derive(Debug, PartialEq, Eq)]
enum ByteRange {
    /// No Range header, or one in a unit other than bytes.
    Full,
    /// A satisfiable `bytes=start-end` range.
    Partial { start: u64, end: u64 },
}

/// Parse a `Range` header against a file of `size` bytes.
///
/// Only single `bytes=start[-end]` ranges are supported; the end is
/// clamped to the last byte. Unsatisfiable or malformed byte ranges
/// are an error so the client sees 416 instead of a silent full body.
fn parse_range(header: Option<&str>, size: u64) -> Result<ByteRange, ApiError> {
    let Some(header) = header else {
        return Ok(ByteRange::Full);
    };
    let Some(spec) = header.strip_prefix("bytes=") else {
        return Ok(ByteRange::Full);
    };

    let err = || ApiError::RangeNotSatisfiable(format!("{header} for size {size}"));

    let (start_s, end_s) = spec.split_once('-').ok_or_else(err)?;
    let start: u64 = start_s.trim().parse().map_err(|_| err())?;
    let end: u64 = match end_s.trim() {
        "" => size.saturating_sub(1),
        s => s.parse().map_err(|_| err())?,
    };
    let end = end.min(size.saturating_sub(1));

    if size == 0 || start >= size || start > end {
        return Err(err());
    }
    Ok(ByteRange::Partial { start, end })
}

/// Accept a video upload and submit it for analysis.
///
/// POST /api/videos/upload (multipart: `video` file, optional `title`)
pub async fn upload_video(
    State(state): State<AppState>,
    user: AuthUser,
    mut multipart: Multipart,
) -> ApiResult<(StatusCode, Json<VideoRecord>)> {
    let mut file: Option<(String, String, axum::body::Bytes)> = None;
    let mut title: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("Malformed multipart body: {e}")))?
    {
        let name = field.name().map(|s| s.to_string());
        match name.as_deref() {
            Some("video") => {
                let filename = field
                    .file_name()
                    .map(|s| s.to_string())
                    .ok_or_else(|| ApiError::validation("Missing filename"))?;
                let mime_type = field
                    .content_type()
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| "application/octet-stream".to_string());
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::bad_request(format!("Failed to read upload: {e}")))?;
                file = Some((filename, mime_type, bytes));
            }
            Some("title") => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| ApiError::bad_request(format!("Malformed title field: {e}")))?;
                let text = text.trim().to_string();
                if !text.is_empty() {
                    title = Some(text);
                }
            }
            _ => {}
        }
    }

    let (filename, mime_type, bytes) = file.ok_or_else(|| ApiError::validation("Please upload a file"))?;

    if !is_allowed_video(&filename, &mime_type) {
        return Err(ApiError::validation("Error: Videos Only! (mp4, mov, avi, mkv)"));
    }
    if bytes.len() > state.config.max_upload_bytes {
        return Err(ApiError::validation(format!(
            "File too large (max {} bytes)",
            state.config.max_upload_bytes
        )));
    }

    let stored = state.media.save(&filename, &bytes).await?;
    info!(
        "Upload accepted from user {}: {} ({} bytes)",
        user.id, stored.key, stored.size
    );

    let title = title.unwrap_or_else(|| filename.clone());
    let record = state
        .pipeline
        .submit(&stored, &mime_type, &user.id, title)
        .await?;

    Ok((StatusCode::CREATED, Json(record)))
}

/// List the authenticated user's videos, newest first.
///
/// GET /api/videos
pub async fn list_videos(
    State(state): State<AppState>,
    user: AuthUser,
) -> ApiResult<Json<Vec<VideoRecord>>> {
    let videos = state.videos.list_by_uploader(&user.id).await?;
    Ok(Json(videos))
}

/// Fetch one video with its uploader's username. Unauthenticated, for
/// shared playback pages.
///
/// GET /api/videos/:id
pub async fn get_video(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<VideoWithUploader>> {
    let video = state
        .videos
        .find_with_uploader(&VideoId::from(id))
        .await?
        .ok_or_else(|| ApiError::not_found("Video not found"))?;
    Ok(Json(video))
}

/// Stream a video's bytes, honoring single `Range` requests.
///
/// GET /api/videos/stream/:id
pub async fn stream_video(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> ApiResult<Response> {
    let record = state
        .videos
        .find_by_id(&VideoId::from(id))
        .await?
        .ok_or_else(|| ApiError::not_found("Video not found"))?;

    let key = record.filename.as_str();
    let size = state.media.len(key).await.map_err(|e| {
        if matches!(e, vidova_storage::StorageError::NotFound(_)) {
            ApiError::not_found("Video file not found")
        } else {
            ApiError::Storage(e)
        }
    })?;

    let range_header = headers.get(header::RANGE).and_then(|v| v.to_str().ok());

    match parse_range(range_header, size)? {
        ByteRange::Partial { start, end } => {
            let bytes = state.media.read_range(key, start, end).await?;
            Response::builder()
                .status(StatusCode::PARTIAL_CONTENT)
                .header(header::CONTENT_TYPE, "video/mp4")
                .header(header::ACCEPT_RANGES, "bytes")
                .header(
                    header::CONTENT_RANGE,
                    format!("bytes {start}-{end}/{size}"),
                )
                .header(header::CONTENT_LENGTH, bytes.len())
                .body(Body::from(bytes))
                .map_err(|e| ApiError::internal(format!("Failed to build response: {e}")))
        }
        ByteRange::Full => {
            let file = state.media.reader(key).await?;
            let stream = ReaderStream::new(file);
            Response::builder()
                .status(StatusCode::OK)
                .header(header::CONTENT_TYPE, "video/mp4")
                .header(header::ACCEPT_RANGES, "bytes")
                .header(header::CONTENT_LENGTH, size)
                .body(Body::from_stream(stream))
                .map_err(|e| ApiError::internal(format!("Failed to build response: {e}")))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_the_four_video_formats() {
        assert!(is_allowed_video("clip.mp4", "video/mp4"));
        assert!(is_allowed_video("clip.MOV", "video/mov"));
        assert!(is_allowed_video("clip.avi", "video/avi"));
        assert!(is_allowed_video("clip.mkv", "video/mkv"));
    }

    #[test]
    fn rejects_mismatched_extension_or_mime() {
        assert!(!is_allowed_video("notes.txt", "text/plain"));
        assert!(!is_allowed_video("clip.mp4", "text/plain"));
        assert!(!is_allowed_video("clip.txt", "video/mp4"));
        assert!(!is_allowed_video("noextension", "video/mp4"));
    }

    #[test]
    fn no_range_header_streams_full_body() {
        assert_eq!(parse_range(None, 1000).unwrap(), ByteRange::Full);
        assert_eq!(parse_range(Some("items=0-5"), 1000).unwrap(), ByteRange::Full);
    }

    #[test]
    fn explicit_range_is_inclusive() {
        assert_eq!(
            parse_range(Some("bytes=0-99"), 1000).unwrap(),
            ByteRange::Partial { start: 0, end: 99 }
        );
    }

    #[test]
    fn open_ended_range_runs_to_last_byte() {
        assert_eq!(
            parse_range(Some("bytes=500-"), 1000).unwrap(),
            ByteRange::Partial {
                start: 500,
                end: 999
            }
        );
    }

    #[test]
    fn end_past_eof_is_clamped() {
        assert_eq!(
            parse_range(Some("bytes=900-5000"), 1000).unwrap(),
            ByteRange::Partial {
                start: 900,
                end: 999
            }
        );
    }

    #[test]
    fn start_past_eof_is_unsatisfiable() {
        assert!(parse_range(Some("bytes=1000-"), 1000).is_err());
        assert!(parse_range(Some("bytes=2000-2100"), 1000).is_err());
    }

    #[test]
    fn malformed_byte_ranges_are_unsatisfiable() {
        assert!(parse_range(Some("bytes=abc-def"), 1000).is_err());
        assert!(parse_range(Some("bytes=99-0"), 1000).is_err());
        assert!(parse_range(Some("bytes=0-"), 0).is_err());
    }
}
