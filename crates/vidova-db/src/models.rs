//! Row models mapping SQLite rows to domain types.

use chrono::{DateTime, Utc};
use sqlx::FromRow;

use vidova_models::{
    SensitivityParseError, User, UserRole, UserRoleParseError, VideoRecord, VideoStatusParseError,
    VideoWithUploader,
};

use crate::error::{DbError, DbResult};

#[derive(Debug, FromRow)]
pub struct VideoRow {
    pub id: String,
    pub title: String,
    pub filename: String,
    pub filepath: String,
    pub size: i64,
    pub uploader_id: String,
    pub status: String,
    pub sensitivity: String,
    pub created_at: DateTime<Utc>,
}

impl VideoRow {
    pub fn into_record(self) -> DbResult<VideoRecord> {
        Ok(VideoRecord {
            id: self.id.into(),
            title: self.title,
            filename: self.filename,
            filepath: self.filepath,
            size: self.size,
            uploader_id: self.uploader_id,
            status: self
                .status
                .parse()
                .map_err(|e: VideoStatusParseError| DbError::decode(e.to_string()))?,
            sensitivity: self
                .sensitivity
                .parse()
                .map_err(|e: SensitivityParseError| DbError::decode(e.to_string()))?,
            created_at: self.created_at,
        })
    }
}

#[derive(Debug, FromRow)]
pub struct VideoWithUploaderRow {
    #[sqlx(flatten)]
    pub video: VideoRow,
    pub uploader_username: String,
}

impl VideoWithUploaderRow {
    pub fn into_record(self) -> DbResult<VideoWithUploader> {
        Ok(VideoWithUploader {
            record: self.video.into_record()?,
            uploader_username: self.uploader_username,
        })
    }
}

#[derive(Debug, FromRow)]
pub struct UserRow {
    pub id: String,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub role: String,
    pub organization_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl UserRow {
    pub fn into_user(self) -> DbResult<User> {
        let role: UserRole = self
            .role
            .parse()
            .map_err(|e: UserRoleParseError| DbError::decode(e.to_string()))?;
        Ok(User {
            id: self.id,
            username: self.username,
            email: self.email,
            password_hash: self.password_hash,
            role,
            organization_id: self.organization_id,
            created_at: self.created_at,
        })
    }
}
