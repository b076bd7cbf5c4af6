//! Asynchronous upload-analyze-notify pipeline.
//!
//! `submit` persists a `Processing` record and returns immediately; the
//! classification work runs on an explicit in-process job queue consumed
//! by a bounded worker pool. Each job ends in exactly one terminal
//! repository write and at most one broadcast event; failures never
//! reach the request path.

pub mod config;
pub mod error;
pub mod events;
pub mod job;
pub mod pipeline;
pub mod queue;
#[cfg(test)]
pub mod testing;
pub mod worker;

pub use config::PipelineConfig;
pub use error::{PipelineError, PipelineResult};
pub use events::EventBus;
pub use job::AnalysisJob;
pub use pipeline::AnalysisPipeline;
pub use queue::{AnalysisQueue, JobReceiver};
pub use worker::{AnalysisRunner, AnalysisWorkerPool};
