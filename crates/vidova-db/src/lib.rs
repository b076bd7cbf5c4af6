//! SQLite persistence for the Vidova backend.
//!
//! Repository traits with `Sqlx*` implementations. The video repository
//! guarantees at-most-once terminal updates through conditional writes;
//! no cross-record transactions are needed or provided.

pub mod error;
pub mod models;
pub mod pool;
pub mod user_repo;
pub mod video_repo;

pub use error::{DbError, DbResult};
pub use pool::connect;
pub use user_repo::{SqlxUserRepository, UserRepository};
pub use video_repo::{SqlxVideoRepository, VideoRepository};
