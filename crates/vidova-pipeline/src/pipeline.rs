//! Submission front of the pipeline.

use std::sync::Arc;

use tracing::{info, warn};

use vidova_db::VideoRepository;
use vidova_models::{VideoEvent, VideoRecord};
use vidova_storage::StoredMedia;

use crate::error::{PipelineError, PipelineResult};
use crate::events::EventBus;
use crate::job::AnalysisJob;
use crate::queue::AnalysisQueue;

/// Accepts stored uploads into the analysis pipeline.
///
/// `submit` is the synchronous part of the contract: it persists the
/// `Processing` record and hands the rest to the worker pool. The
/// caller replies to the client with the returned record; everything
/// after that surfaces through the event bus and later listings.
#[derive(Clone)]
pub struct AnalysisPipeline {
    repo: Arc<dyn VideoRepository>,
    queue: AnalysisQueue,
    events: EventBus,
}

impl AnalysisPipeline {
    pub fn new(repo: Arc<dyn VideoRepository>, queue: AnalysisQueue, events: EventBus) -> Self {
        Self {
            repo,
            queue,
            events,
        }
    }

    /// Create the record for an accepted upload and enqueue its
    /// analysis. Repository failures here surface to the caller; after
    /// this returns, failures are terminal-state-only.
    pub async fn submit(
        &self,
        media: &StoredMedia,
        mime_type: &str,
        uploader_id: &str,
        title: impl Into<String>,
    ) -> PipelineResult<VideoRecord> {
        let record = VideoRecord::new(
            title,
            media.key.clone(),
            media.path.display().to_string(),
            media.size,
            uploader_id,
        );
        self.repo.create(&record).await?;

        let job = AnalysisJob {
            video_id: record.id.clone(),
            filepath: media.path.clone(),
            mime_type: mime_type.to_string(),
            display_name: record.title.clone(),
        };

        match self.queue.enqueue(job).await {
            Ok(()) => {
                info!("Accepted video {} for analysis", record.id);
                Ok(record)
            }
            Err(PipelineError::QueueClosed) => {
                // Shutdown race: don't leave the record silently
                // Processing; fail it now so the client learns the truth.
                warn!("Queue closed, failing video {} at submit", record.id);
                match self.repo.mark_error(&record.id).await? {
                    Some(failed) => {
                        self.events.publish(VideoEvent::processed(failed.clone()));
                        Ok(failed)
                    }
                    None => Ok(record),
                }
            }
            Err(e) => Err(e),
        }
    }
}
