//! Video record models.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Unique identifier for an uploaded video.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VideoId(pub String);

impl VideoId {
    /// Generate a new random video ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Get the inner string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for VideoId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for VideoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for VideoId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for VideoId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Analysis lifecycle status of a video record.
///
/// Transitions are forward-only: `Processing` moves to exactly one of
/// `Completed` or `Error` and never reverts. `Pending` exists for
/// compatibility with older records but new uploads start at `Processing`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum VideoStatus {
    Pending,
    #[default]
    Processing,
    Completed,
    Error,
}

impl VideoStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            VideoStatus::Pending => "pending",
            VideoStatus::Processing => "processing",
            VideoStatus::Completed => "completed",
            VideoStatus::Error => "error",
        }
    }

    /// Whether no further transitions occur for this record.
    pub fn is_terminal(&self) -> bool {
        matches!(self, VideoStatus::Completed | VideoStatus::Error)
    }
}

impl fmt::Display for VideoStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for VideoStatus {
    type Err = VideoStatusParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(VideoStatus::Pending),
            "processing" => Ok(VideoStatus::Processing),
            "completed" => Ok(VideoStatus::Completed),
            "error" => Ok(VideoStatus::Error),
            _ => Err(VideoStatusParseError(s.to_string())),
        }
    }
}

#[derive(Debug, Error)]
#[error("Unknown video status: {0}")]
pub struct VideoStatusParseError(String);

/// Content-sensitivity classification of a video.
///
/// `Safe`/`Flagged` are only meaningful once the record is `Completed`;
/// every other status carries `Unchecked`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Sensitivity {
    #[default]
    Unchecked,
    Safe,
    Flagged,
}

impl Sensitivity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sensitivity::Unchecked => "unchecked",
            Sensitivity::Safe => "safe",
            Sensitivity::Flagged => "flagged",
        }
    }
}

impl fmt::Display for Sensitivity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Sensitivity {
    type Err = SensitivityParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "unchecked" => Ok(Sensitivity::Unchecked),
            "safe" => Ok(Sensitivity::Safe),
            "flagged" => Ok(Sensitivity::Flagged),
            _ => Err(SensitivityParseError(s.to_string())),
        }
    }
}

#[derive(Debug, Error)]
#[error("Unknown sensitivity: {0}")]
pub struct SensitivityParseError(String);

/// An uploaded video and its analysis state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoRecord {
    /// Unique video ID.
    pub id: VideoId,

    /// Human-readable label; defaults to the original filename.
    pub title: String,

    /// Key into the media store (generated filename).
    pub filename: String,

    /// Absolute path of the stored media file.
    pub filepath: String,

    /// Byte length of the stored media.
    pub size: i64,

    /// Owning user's ID.
    pub uploader_id: String,

    /// Analysis lifecycle status.
    pub status: VideoStatus,

    /// Content-sensitivity verdict.
    pub sensitivity: Sensitivity,

    /// Creation timestamp, immutable.
    pub created_at: DateTime<Utc>,
}

impl VideoRecord {
    /// Create a new record for an accepted upload.
    ///
    /// Records skip `Pending` and are born `Processing` with an
    /// `Unchecked` sensitivity; the pipeline owns the terminal update.
    pub fn new(
        title: impl Into<String>,
        filename: impl Into<String>,
        filepath: impl Into<String>,
        size: i64,
        uploader_id: impl Into<String>,
    ) -> Self {
        Self {
            id: VideoId::new(),
            title: title.into(),
            filename: filename.into(),
            filepath: filepath.into(),
            size,
            uploader_id: uploader_id.into(),
            status: VideoStatus::Processing,
            sensitivity: Sensitivity::Unchecked,
            created_at: Utc::now(),
        }
    }
}

/// A video record with its uploader's username resolved, for the public
/// lookup endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoWithUploader {
    #[serde(flatten)]
    pub record: VideoRecord,
    pub uploader_username: String,
}
