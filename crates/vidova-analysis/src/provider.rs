//! Provider capability trait.

use std::path::Path;

use async_trait::async_trait;

use vidova_models::Verdict;

use crate::error::AnalysisResult;

/// Reference to a media file the provider has accepted for ingestion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaHandle {
    /// Provider-scoped resource name, e.g. `files/abc123`.
    pub name: String,
    /// URI used when referencing the media in an inference call.
    pub uri: String,
    /// MIME type recorded by the provider.
    pub mime_type: String,
}

/// Ingestion state of an uploaded media reference.
///
/// Only `Processing` keeps the pipeline polling; any state that is not
/// processing and not failed is treated as usable for inference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestionState {
    Processing,
    Failed,
    Ready,
}

impl IngestionState {
    /// Map a raw provider state string onto the recognized set.
    pub fn from_provider(state: &str) -> Self {
        match state {
            "PROCESSING" => IngestionState::Processing,
            "FAILED" => IngestionState::Failed,
            _ => IngestionState::Ready,
        }
    }
}

/// Capability set required from the external AI provider: upload a
/// media reference, fetch its ingestion state, and run inference over
/// an ingested reference.
#[async_trait]
pub trait AnalysisProvider: Send + Sync {
    /// Upload a stored media file, returning the provider's handle.
    async fn upload_media(
        &self,
        path: &Path,
        mime_type: &str,
        display_name: &str,
    ) -> AnalysisResult<MediaHandle>;

    /// Current ingestion state of an uploaded reference.
    async fn ingestion_state(&self, handle: &MediaHandle) -> AnalysisResult<IngestionState>;

    /// Classify an ingested reference into a two-valued verdict.
    async fn classify(&self, handle: &MediaHandle) -> AnalysisResult<Verdict>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_states_are_usable_for_inference() {
        assert_eq!(IngestionState::from_provider("PROCESSING"), IngestionState::Processing);
        assert_eq!(IngestionState::from_provider("FAILED"), IngestionState::Failed);
        assert_eq!(IngestionState::from_provider("ACTIVE"), IngestionState::Ready);
        assert_eq!(IngestionState::from_provider("SOMETHING_NEW"), IngestionState::Ready);
    }
}
