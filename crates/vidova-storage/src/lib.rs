//! Local-disk media store.
//!
//! Owns the bytes of uploaded videos under a single root directory.
//! Keys are timestamp-qualified filenames so concurrent uploads of the
//! same file never collide.

pub mod error;
pub mod store;

pub use error::{StorageError, StorageResult};
pub use store::{MediaStore, StoredMedia};
