//! Request handlers.

pub mod admin;
pub mod auth;
pub mod health;
pub mod videos;

pub use admin::*;
pub use auth::*;
pub use health::*;
pub use videos::*;
