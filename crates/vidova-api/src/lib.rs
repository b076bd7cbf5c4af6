//! Axum HTTP/WS API server.
//!
//! This crate provides:
//! - Token-based registration and login
//! - Multipart video upload feeding the analysis pipeline
//! - Range-aware video streaming
//! - WebSocket push of processing events

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod state;
pub mod ws;

pub use config::ApiConfig;
pub use error::{ApiError, ApiResult};
pub use routes::create_router;
pub use state::AppState;
