//! Hand-written fakes for pipeline tests.

use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use vidova_analysis::{AnalysisError, AnalysisProvider, AnalysisResult, IngestionState, MediaHandle};
use vidova_db::{DbError, DbResult, VideoRepository};
use vidova_models::{Sensitivity, Verdict, VideoId, VideoRecord, VideoStatus, VideoWithUploader};

/// Scripted classify outcome.
enum ClassifyScript {
    Verdict(Sensitivity),
    ParseError,
}

/// Scripted provider: a fixed number of `Processing` polls, then a
/// terminal ingestion state, then a scripted classification.
pub struct FakeProvider {
    upload_fails: bool,
    ingestion_fails: bool,
    processing_polls: Option<usize>,
    classify: ClassifyScript,
    state_calls: AtomicUsize,
}

impl FakeProvider {
    pub fn safe_after_polls(polls: usize) -> Self {
        Self {
            upload_fails: false,
            ingestion_fails: false,
            processing_polls: Some(polls),
            classify: ClassifyScript::Verdict(Sensitivity::Safe),
            state_calls: AtomicUsize::new(0),
        }
    }

    pub fn classify_parse_error() -> Self {
        Self {
            classify: ClassifyScript::ParseError,
            ..Self::safe_after_polls(0)
        }
    }

    pub fn upload_fails() -> Self {
        Self {
            upload_fails: true,
            ..Self::safe_after_polls(0)
        }
    }

    pub fn ingestion_fails() -> Self {
        Self {
            ingestion_fails: true,
            ..Self::safe_after_polls(0)
        }
    }

    pub fn never_ready() -> Self {
        Self {
            processing_polls: None,
            ..Self::safe_after_polls(0)
        }
    }

    pub fn state_calls(&self) -> usize {
        self.state_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AnalysisProvider for FakeProvider {
    async fn upload_media(
        &self,
        _path: &Path,
        mime_type: &str,
        _display_name: &str,
    ) -> AnalysisResult<MediaHandle> {
        if self.upload_fails {
            return Err(AnalysisError::provider(500, "upload exploded"));
        }
        Ok(MediaHandle {
            name: "files/fake".to_string(),
            uri: "https://provider/files/fake".to_string(),
            mime_type: mime_type.to_string(),
        })
    }

    async fn ingestion_state(&self, _handle: &MediaHandle) -> AnalysisResult<IngestionState> {
        let call = self.state_calls.fetch_add(1, Ordering::SeqCst);
        if self.ingestion_fails {
            return Ok(IngestionState::Failed);
        }
        match self.processing_polls {
            None => Ok(IngestionState::Processing),
            Some(polls) if call < polls => Ok(IngestionState::Processing),
            Some(_) => Ok(IngestionState::Ready),
        }
    }

    async fn classify(&self, _handle: &MediaHandle) -> AnalysisResult<Verdict> {
        match &self.classify {
            ClassifyScript::Verdict(sensitivity) => Ok(Verdict {
                sensitivity: *sensitivity,
                reason: Some("scripted".to_string()),
            }),
            ClassifyScript::ParseError => {
                Err(AnalysisError::parse("expected JSON, got prose"))
            }
        }
    }
}

/// In-memory video repository honoring the conditional terminal-write
/// contract, with optional injected write failures.
pub struct InMemoryVideoRepo {
    records: Mutex<HashMap<String, VideoRecord>>,
    failing_writes: AtomicUsize,
}

impl InMemoryVideoRepo {
    pub fn new() -> Self {
        Self {
            records: Mutex::new(HashMap::new()),
            failing_writes: AtomicUsize::new(0),
        }
    }

    /// Make the next `n` terminal writes fail.
    pub fn failing_terminal_writes(self, n: usize) -> Self {
        self.failing_writes.store(n, Ordering::SeqCst);
        self
    }

    pub fn insert(&self, record: VideoRecord) {
        self.records
            .lock()
            .unwrap()
            .insert(record.id.as_str().to_string(), record);
    }

    pub fn get(&self, id: &VideoId) -> Option<VideoRecord> {
        self.records.lock().unwrap().get(id.as_str()).cloned()
    }

    fn finish(
        &self,
        id: &VideoId,
        status: VideoStatus,
        sensitivity: Sensitivity,
    ) -> DbResult<Option<VideoRecord>> {
        let remaining = self.failing_writes.load(Ordering::SeqCst);
        if remaining > 0 {
            self.failing_writes.store(remaining - 1, Ordering::SeqCst);
            return Err(DbError::decode("simulated write failure"));
        }
        let mut records = self.records.lock().unwrap();
        match records.get_mut(id.as_str()) {
            Some(record) if record.status == VideoStatus::Processing => {
                record.status = status;
                record.sensitivity = sensitivity;
                Ok(Some(record.clone()))
            }
            _ => Ok(None),
        }
    }
}

impl Default for InMemoryVideoRepo {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VideoRepository for InMemoryVideoRepo {
    async fn create(&self, record: &VideoRecord) -> DbResult<()> {
        self.insert(record.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &VideoId) -> DbResult<Option<VideoRecord>> {
        Ok(self.get(id))
    }

    async fn find_with_uploader(&self, id: &VideoId) -> DbResult<Option<VideoWithUploader>> {
        Ok(self.get(id).map(|record| VideoWithUploader {
            record,
            uploader_username: "test".to_string(),
        }))
    }

    async fn list_by_uploader(&self, uploader_id: &str) -> DbResult<Vec<VideoRecord>> {
        let mut records: Vec<_> = self
            .records
            .lock()
            .unwrap()
            .values()
            .filter(|r| r.uploader_id == uploader_id)
            .cloned()
            .collect();
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(records)
    }

    async fn complete(
        &self,
        id: &VideoId,
        sensitivity: Sensitivity,
    ) -> DbResult<Option<VideoRecord>> {
        self.finish(id, VideoStatus::Completed, sensitivity)
    }

    async fn mark_error(&self, id: &VideoId) -> DbResult<Option<VideoRecord>> {
        self.finish(id, VideoStatus::Error, Sensitivity::Unchecked)
    }

    async fn delete_all(&self) -> DbResult<u64> {
        let mut records = self.records.lock().unwrap();
        let n = records.len() as u64;
        records.clear();
        Ok(n)
    }
}
