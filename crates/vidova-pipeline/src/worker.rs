//! Worker pool consuming analysis jobs.

use std::sync::Arc;

use tokio::sync::Semaphore;
use tracing::{error, info, warn};

use vidova_analysis::{AnalysisError, AnalysisProvider, IngestionState};
use vidova_db::VideoRepository;
use vidova_models::{Sensitivity, Verdict, VideoEvent, VideoId};

use crate::config::PipelineConfig;
use crate::error::{PipelineError, PipelineResult};
use crate::events::EventBus;
use crate::job::AnalysisJob;
use crate::queue::JobReceiver;

/// Executes a single analysis job end to end: provider workflow,
/// terminal repository write, event broadcast.
pub struct AnalysisRunner {
    repo: Arc<dyn VideoRepository>,
    provider: Arc<dyn AnalysisProvider>,
    events: EventBus,
    config: PipelineConfig,
}

impl AnalysisRunner {
    pub fn new(
        repo: Arc<dyn VideoRepository>,
        provider: Arc<dyn AnalysisProvider>,
        events: EventBus,
        config: PipelineConfig,
    ) -> Self {
        Self {
            repo,
            provider,
            events,
            config,
        }
    }

    /// Run one job. All errors are absorbed here; the HTTP response for
    /// this upload was sent long ago.
    pub async fn run(&self, job: AnalysisJob) {
        info!("Starting analysis for video {}", job.video_id);
        match self.analyze(&job).await {
            Ok(verdict) => {
                info!(
                    "Video {} classified {} ({})",
                    job.video_id,
                    verdict.sensitivity,
                    verdict.reason.as_deref().unwrap_or("no reason given")
                );
                self.finish(&job.video_id, Some(verdict.sensitivity)).await;
            }
            Err(e) => {
                warn!("Analysis failed for video {}: {e}", job.video_id);
                self.finish(&job.video_id, None).await;
            }
        }
    }

    /// Provider workflow: upload, bounded ingestion poll, inference.
    async fn analyze(&self, job: &AnalysisJob) -> PipelineResult<Verdict> {
        let handle = self
            .provider
            .upload_media(&job.filepath, &job.mime_type, &job.display_name)
            .await?;

        let mut attempts = 0u32;
        loop {
            match self.provider.ingestion_state(&handle).await? {
                IngestionState::Processing => {
                    attempts += 1;
                    if attempts >= self.config.max_poll_attempts {
                        return Err(PipelineError::IngestionTimeout { attempts });
                    }
                    tokio::time::sleep(self.config.poll_interval).await;
                }
                IngestionState::Failed => {
                    return Err(AnalysisError::IngestionFailed.into());
                }
                IngestionState::Ready => break,
            }
        }

        Ok(self.provider.classify(&handle).await?)
    }

    /// Terminal write plus broadcast. The write is retried once; if it
    /// still fails the record stays `Processing` and only the log tells
    /// the story. Broadcast happens only when this attempt actually
    /// performed the transition, keeping the event at-most-once.
    async fn finish(&self, video_id: &VideoId, outcome: Option<Sensitivity>) {
        for attempt in 0..2u8 {
            let result = match outcome {
                Some(sensitivity) => self.repo.complete(video_id, sensitivity).await,
                None => self.repo.mark_error(video_id).await,
            };
            match result {
                Ok(Some(record)) => {
                    self.events.publish(VideoEvent::processed(record));
                    return;
                }
                Ok(None) => {
                    warn!("Video {video_id} already terminal, skipping broadcast");
                    return;
                }
                Err(e) if attempt == 0 => {
                    warn!("Terminal update failed for video {video_id}, retrying: {e}");
                    tokio::time::sleep(self.config.terminal_retry_delay).await;
                }
                Err(e) => {
                    error!("Terminal update failed permanently for video {video_id}: {e}");
                }
            }
        }
    }
}

/// Dispatcher that drains the job queue into concurrent runner tasks,
/// bounded by a semaphore.
pub struct AnalysisWorkerPool {
    runner: Arc<AnalysisRunner>,
    receiver: JobReceiver,
    semaphore: Arc<Semaphore>,
}

impl AnalysisWorkerPool {
    pub fn new(runner: AnalysisRunner, receiver: JobReceiver) -> Self {
        let permits = runner.config.max_concurrent_jobs;
        Self {
            runner: Arc::new(runner),
            receiver,
            semaphore: Arc::new(Semaphore::new(permits)),
        }
    }

    /// Consume jobs until every queue handle is dropped.
    pub async fn run(mut self) {
        info!(
            "Analysis worker pool running with {} max concurrent jobs",
            self.semaphore.available_permits()
        );
        while let Some(job) = self.receiver.recv().await {
            let permit = match Arc::clone(&self.semaphore).acquire_owned().await {
                Ok(p) => p,
                Err(_) => break,
            };
            let runner = Arc::clone(&self.runner);
            tokio::spawn(async move {
                let _permit = permit;
                runner.run(job).await;
            });
        }
        info!("Analysis worker pool stopped");
    }
}
