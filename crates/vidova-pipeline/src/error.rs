//! Pipeline error types.

use thiserror::Error;

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Analysis error: {0}")]
    Analysis(#[from] vidova_analysis::AnalysisError),

    #[error("Database error: {0}")]
    Db(#[from] vidova_db::DbError),

    #[error("Ingestion still processing after {attempts} polls")]
    IngestionTimeout { attempts: u32 },

    #[error("Analysis queue is closed")]
    QueueClosed,
}
