//! Real-time notification payloads.

use serde::{Deserialize, Serialize};

use crate::video::VideoRecord;

/// Event pushed to connected clients when a pipeline run reaches a
/// terminal state. Best-effort fan-out only; clients that miss it pick
/// the state up from the next listing fetch.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum VideoEvent {
    VideoProcessed { video: VideoRecord },
}

impl VideoEvent {
    pub fn processed(video: VideoRecord) -> Self {
        Self::VideoProcessed { video }
    }

    /// The record carried by the event.
    pub fn video(&self) -> &VideoRecord {
        match self {
            Self::VideoProcessed { video } => video,
        }
    }
}
