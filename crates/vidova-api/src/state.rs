//! Application state.

use std::sync::Arc;

use tracing::info;

use vidova_analysis::{AnalysisProvider, GeminiClient};
use vidova_db::{SqlxUserRepository, SqlxVideoRepository, UserRepository, VideoRepository};
use vidova_pipeline::{
    AnalysisPipeline, AnalysisQueue, AnalysisRunner, AnalysisWorkerPool, EventBus, PipelineConfig,
};
use vidova_storage::MediaStore;

use crate::auth::AuthKeys;
use crate::config::ApiConfig;

/// Shared application state for handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: ApiConfig,
    pub videos: Arc<dyn VideoRepository>,
    pub users: Arc<dyn UserRepository>,
    pub media: Arc<MediaStore>,
    pub pipeline: AnalysisPipeline,
    pub events: EventBus,
    pub auth: AuthKeys,
}

impl AppState {
    /// Create application state and the worker pool it feeds.
    ///
    /// The pool is returned rather than spawned so the binary owns the
    /// task and ties its lifetime to the server's.
    pub async fn new(config: ApiConfig) -> anyhow::Result<(Self, AnalysisWorkerPool)> {
        let pool = vidova_db::connect(&config.database_url).await?;
        let videos: Arc<dyn VideoRepository> = Arc::new(SqlxVideoRepository::new(pool.clone()));
        let users: Arc<dyn UserRepository> = Arc::new(SqlxUserRepository::new(pool));

        let media = Arc::new(MediaStore::open(config.media_root.clone()).await?);

        let provider: Arc<dyn AnalysisProvider> = Arc::new(GeminiClient::from_env()?);

        let pipeline_config = PipelineConfig::from_env();
        info!(
            "Pipeline config: {} workers, queue depth {}",
            pipeline_config.max_concurrent_jobs, pipeline_config.queue_capacity
        );

        let events = EventBus::default();
        let (queue, receiver) = AnalysisQueue::new(pipeline_config.queue_capacity);
        let runner = AnalysisRunner::new(
            Arc::clone(&videos),
            provider,
            events.clone(),
            pipeline_config,
        );
        let worker_pool = AnalysisWorkerPool::new(runner, receiver);
        let pipeline = AnalysisPipeline::new(Arc::clone(&videos), queue, events.clone());

        let auth = AuthKeys::new(&config.jwt_secret);

        let state = Self {
            config,
            videos,
            users,
            media,
            pipeline,
            events,
            auth,
        };
        Ok((state, worker_pool))
    }
}
