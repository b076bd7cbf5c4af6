//! In-process job queue.

use tokio::sync::mpsc;
use tracing::debug;

use crate::error::{PipelineError, PipelineResult};
use crate::job::AnalysisJob;

/// Receiving half handed to the worker pool.
pub type JobReceiver = mpsc::Receiver<AnalysisJob>;

/// Bounded producer handle for analysis jobs.
#[derive(Debug, Clone)]
pub struct AnalysisQueue {
    tx: mpsc::Sender<AnalysisJob>,
}

impl AnalysisQueue {
    /// Create a queue with the given capacity; the receiver goes to the
    /// worker pool.
    pub fn new(capacity: usize) -> (Self, JobReceiver) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self { tx }, rx)
    }

    /// Enqueue a job, waiting for space if the queue is full. Fails
    /// only when the worker pool has shut down.
    pub async fn enqueue(&self, job: AnalysisJob) -> PipelineResult<()> {
        debug!("Enqueueing analysis job for video {}", job.video_id);
        self.tx
            .send(job)
            .await
            .map_err(|_| PipelineError::QueueClosed)
    }
}
