//! Pipeline configuration.

use std::time::Duration;

/// Tunables for the analysis pipeline.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Interval between ingestion-state polls.
    pub poll_interval: Duration,
    /// Maximum number of polls before the run is abandoned as failed.
    pub max_poll_attempts: u32,
    /// Concurrent analysis jobs.
    pub max_concurrent_jobs: usize,
    /// Bounded queue depth between submit and the worker pool.
    pub queue_capacity: usize,
    /// Delay before the single retry of a failed terminal write.
    pub terminal_retry_delay: Duration,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(2),
            max_poll_attempts: 150,
            max_concurrent_jobs: 4,
            queue_capacity: 64,
            terminal_retry_delay: Duration::from_secs(2),
        }
    }
}

impl PipelineConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            poll_interval: Duration::from_secs(
                std::env::var("PIPELINE_POLL_INTERVAL_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(2),
            ),
            max_poll_attempts: std::env::var("PIPELINE_MAX_POLL_ATTEMPTS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.max_poll_attempts),
            max_concurrent_jobs: std::env::var("PIPELINE_MAX_CONCURRENT_JOBS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.max_concurrent_jobs),
            queue_capacity: std::env::var("PIPELINE_QUEUE_CAPACITY")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.queue_capacity),
            terminal_retry_delay: defaults.terminal_retry_delay,
        }
    }
}
