//! Analysis job description.

use std::path::PathBuf;

use vidova_models::VideoId;

/// One unit of work for the worker pool: classify a stored upload and
/// finish its record.
#[derive(Debug, Clone)]
pub struct AnalysisJob {
    /// Record the terminal update targets.
    pub video_id: VideoId,
    /// Stored media file to send to the provider.
    pub filepath: PathBuf,
    /// Declared MIME type of the upload.
    pub mime_type: String,
    /// Human-readable name passed to the provider.
    pub display_name: String,
}
