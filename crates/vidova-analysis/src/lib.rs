//! Analysis client for the external generative AI provider.
//!
//! Normalizes provider-specific response shapes (URIs, state enums,
//! JSON-in-markdown text) into the two things the pipeline needs: a
//! media reference handle and a `{sensitivity, reason}` verdict.

pub mod error;
pub mod gemini;
pub mod provider;

pub use error::{AnalysisError, AnalysisResult};
pub use gemini::{GeminiClient, GeminiConfig};
pub use provider::{AnalysisProvider, IngestionState, MediaHandle};
