//! Shared data models for the Vidova backend.

pub mod event;
pub mod user;
pub mod verdict;
pub mod video;

pub use event::VideoEvent;
pub use user::{PublicUser, User, UserRole, UserRoleParseError};
pub use verdict::Verdict;
pub use video::{
    Sensitivity, SensitivityParseError, VideoId, VideoRecord, VideoStatus, VideoStatusParseError,
    VideoWithUploader,
};
