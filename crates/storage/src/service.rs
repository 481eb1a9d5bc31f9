//! Content store operations
//!
//! Upload writes the blob first and the metadata row second. A failed
//! insert leaves an orphaned blob, which a later identical upload simply
//! overwrites.

use antiplagiat_common::{
    db::{models::SubmissionRecord, NewSubmissionRecord, SubmissionRepository},
    errors::AppError,
    metrics,
    models::{HashLookup, NewSubmission, StoredSubmission, Submission, SubmissionSummary, TaskSubmissions},
    ContentHash, Result, DEFAULT_FILENAME, DEFAULT_STUDENT_NAME, DEFAULT_TASK_ID,
};
use async_trait::async_trait;
use chrono::Utc;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, instrument};

use crate::blob::BlobStore;

/// Persistence of submission metadata
#[async_trait]
pub trait SubmissionRecords: Send + Sync {
    async fn insert(&self, record: NewSubmissionRecord) -> Result<SubmissionRecord>;

    async fn find_by_id(&self, id: i64) -> Result<Option<SubmissionRecord>>;

    async fn find_by_hash(&self, content_hash: &str) -> Result<Vec<SubmissionRecord>>;

    async fn find_by_task(&self, task_id: &str) -> Result<Vec<SubmissionRecord>>;

    async fn ping(&self) -> Result<()>;
}

#[async_trait]
impl SubmissionRecords for SubmissionRepository {
    async fn insert(&self, record: NewSubmissionRecord) -> Result<SubmissionRecord> {
        self.create(record).await
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<SubmissionRecord>> {
        SubmissionRepository::find_by_id(self, id).await
    }

    async fn find_by_hash(&self, content_hash: &str) -> Result<Vec<SubmissionRecord>> {
        SubmissionRepository::find_by_hash(self, content_hash).await
    }

    async fn find_by_task(&self, task_id: &str) -> Result<Vec<SubmissionRecord>> {
        SubmissionRepository::find_by_task(self, task_id).await
    }

    async fn ping(&self) -> Result<()> {
        SubmissionRepository::ping(self).await
    }
}

/// Raw bytes of a stored submission
#[derive(Debug)]
pub struct FileContent {
    pub filename: String,
    pub bytes: Vec<u8>,
}

pub struct FileService {
    records: Arc<dyn SubmissionRecords>,
    blobs: BlobStore,
}

impl FileService {
    pub fn new(records: Arc<dyn SubmissionRecords>, blobs: BlobStore) -> Self {
        Self { records, blobs }
    }

    /// Store a new submission and return its assigned id and hash
    #[instrument(skip(self, submission))]
    pub async fn upload(&self, submission: NewSubmission) -> Result<StoredSubmission> {
        let content = submission.require_content()?.to_owned();

        let student_name = submission
            .student_name
            .unwrap_or_else(|| DEFAULT_STUDENT_NAME.to_string());
        let task_id = submission
            .task_id
            .unwrap_or_else(|| DEFAULT_TASK_ID.to_string());
        let filename = submission
            .filename
            .unwrap_or_else(|| DEFAULT_FILENAME.to_string());

        let content_hash = ContentHash::of(content.as_bytes());
        let file_path = self
            .blobs
            .write(&content_hash, &filename, content.as_bytes())
            .await?;

        let record = self
            .records
            .insert(NewSubmissionRecord {
                student_name,
                task_id,
                filename,
                file_path: file_path.to_string_lossy().into_owned(),
                content_hash: content_hash.to_string(),
                size_bytes: content.len() as i64,
                uploaded_at: Utc::now(),
            })
            .await?;

        metrics::record_submission_stored(content.len());
        info!(
            submission_id = record.id,
            task_id = %record.task_id,
            content_hash = %content_hash,
            size_bytes = record.size_bytes,
            "Submission stored"
        );

        record.to_stored()
    }

    pub async fn get(&self, id: i64) -> Result<Submission> {
        let record = self
            .records
            .find_by_id(id)
            .await?
            .ok_or(AppError::SubmissionNotFound { id })?;

        Submission::try_from(record)
    }

    /// Stored bytes; a row without its blob is a storage fault, not a 404
    pub async fn content(&self, id: i64) -> Result<FileContent> {
        let record = self
            .records
            .find_by_id(id)
            .await?
            .ok_or(AppError::SubmissionNotFound { id })?;

        let bytes = self.blobs.read(Path::new(&record.file_path)).await?;

        Ok(FileContent {
            filename: record.filename,
            bytes,
        })
    }

    pub async fn find_by_hash(&self, hash: &str) -> Result<HashLookup> {
        let hash = ContentHash::parse(hash)?;
        let files = self
            .records
            .find_by_hash(hash.as_str())
            .await?
            .into_iter()
            .map(SubmissionSummary::from)
            .collect();

        Ok(HashLookup::new(files))
    }

    pub async fn list_task(&self, task_id: &str) -> Result<TaskSubmissions> {
        let files = self
            .records
            .find_by_task(task_id)
            .await?
            .into_iter()
            .map(Submission::try_from)
            .collect::<Result<Vec<_>>>()?;

        Ok(TaskSubmissions::new(task_id.to_string(), files))
    }

    pub async fn ping(&self) -> Result<()> {
        self.records.ping().await
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::Mutex;

    /// In-memory stand-in for the submissions table
    #[derive(Default)]
    pub(crate) struct MemoryRecords {
        rows: Mutex<Vec<SubmissionRecord>>,
    }

    #[async_trait]
    impl SubmissionRecords for MemoryRecords {
        async fn insert(&self, record: NewSubmissionRecord) -> Result<SubmissionRecord> {
            let mut rows = self.rows.lock().unwrap();
            let row = SubmissionRecord {
                id: rows.len() as i64 + 1,
                student_name: record.student_name,
                task_id: record.task_id,
                filename: record.filename,
                file_path: record.file_path,
                content_hash: record.content_hash,
                size_bytes: record.size_bytes,
                uploaded_at: record.uploaded_at.into(),
            };
            rows.push(row.clone());
            Ok(row)
        }

        async fn find_by_id(&self, id: i64) -> Result<Option<SubmissionRecord>> {
            let rows = self.rows.lock().unwrap();
            Ok(rows.iter().find(|row| row.id == id).cloned())
        }

        async fn find_by_hash(&self, content_hash: &str) -> Result<Vec<SubmissionRecord>> {
            let rows = self.rows.lock().unwrap();
            Ok(rows
                .iter()
                .filter(|row| row.content_hash == content_hash)
                .cloned()
                .collect())
        }

        async fn find_by_task(&self, task_id: &str) -> Result<Vec<SubmissionRecord>> {
            let rows = self.rows.lock().unwrap();
            Ok(rows
                .iter()
                .filter(|row| row.task_id == task_id)
                .cloned()
                .collect())
        }

        async fn ping(&self) -> Result<()> {
            Ok(())
        }
    }

    pub(crate) fn service(dir: &Path) -> FileService {
        FileService::new(Arc::new(MemoryRecords::default()), BlobStore::new(dir))
    }

    fn submission(student: &str, task: &str, content: &str) -> NewSubmission {
        NewSubmission {
            student_name: Some(student.to_string()),
            task_id: Some(task.to_string()),
            filename: Some("work.txt".to_string()),
            content: Some(content.to_string()),
        }
    }

    #[tokio::test]
    async fn test_upload_assigns_increasing_ids() {
        let dir = tempfile::tempdir().unwrap();
        let files = service(dir.path());

        let first = files.upload(submission("ann", "hw1", "text")).await.unwrap();
        let second = files.upload(submission("bob", "hw1", "text")).await.unwrap();

        assert!(second.id > first.id);
        assert_eq!(first.content_hash, second.content_hash);
        assert_eq!(first.content_hash, ContentHash::of("text"));
        assert_eq!(first.size_bytes, 4);
        assert_eq!(first.message.as_deref(), Some("File uploaded successfully"));
    }

    #[tokio::test]
    async fn test_upload_applies_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let files = service(dir.path());

        let stored = files
            .upload(NewSubmission {
                content: Some("just text".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(stored.student_name, DEFAULT_STUDENT_NAME);
        assert_eq!(stored.task_id, DEFAULT_TASK_ID);
        assert_eq!(stored.filename, DEFAULT_FILENAME);
    }

    #[tokio::test]
    async fn test_upload_rejects_empty_content() {
        let dir = tempfile::tempdir().unwrap();
        let files = service(dir.path());

        let err = files
            .upload(submission("ann", "hw1", ""))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation { .. }));

        let err = files.upload(NewSubmission::default()).await.unwrap_err();
        assert!(matches!(err, AppError::Validation { .. }));
    }

    #[tokio::test]
    async fn test_metadata_does_not_affect_hash() {
        let dir = tempfile::tempdir().unwrap();
        let files = service(dir.path());

        let a = files.upload(submission("ann", "hw1", "same")).await.unwrap();
        let b = files.upload(submission("bob", "hw2", "same")).await.unwrap();
        let c = files.upload(submission("ann", "hw1", "same ")).await.unwrap();

        assert_eq!(a.content_hash, b.content_hash);
        assert_ne!(a.content_hash, c.content_hash);
    }

    #[tokio::test]
    async fn test_get_and_content() {
        let dir = tempfile::tempdir().unwrap();
        let files = service(dir.path());

        let stored = files.upload(submission("ann", "hw1", "body")).await.unwrap();

        let fetched = files.get(stored.id).await.unwrap();
        assert_eq!(fetched.student_name, "ann");
        assert_eq!(fetched.content_hash, stored.content_hash);

        let content = files.content(stored.id).await.unwrap();
        assert_eq!(content.filename, "work.txt");
        assert_eq!(content.bytes, b"body");

        let err = files.get(999).await.unwrap_err();
        assert!(matches!(err, AppError::SubmissionNotFound { id: 999 }));
    }

    #[tokio::test]
    async fn test_content_missing_blob() {
        let dir = tempfile::tempdir().unwrap();
        let files = service(dir.path());

        let stored = files.upload(submission("ann", "hw1", "body")).await.unwrap();
        std::fs::remove_file(
            BlobStore::new(dir.path()).path_for(&stored.content_hash, "work.txt"),
        )
        .unwrap();

        let err = files.content(stored.id).await.unwrap_err();
        assert!(matches!(err, AppError::BlobStorage { .. }));
    }

    #[tokio::test]
    async fn test_find_by_hash() {
        let dir = tempfile::tempdir().unwrap();
        let files = service(dir.path());

        files.upload(submission("ann", "hw1", "alpha")).await.unwrap();
        files.upload(submission("bob", "hw1", "beta")).await.unwrap();
        files.upload(submission("cat", "hw2", "alpha")).await.unwrap();

        let lookup = files
            .find_by_hash(ContentHash::of("alpha").as_str())
            .await
            .unwrap();
        assert_eq!(lookup.count, 2);
        let students: Vec<_> = lookup.files.iter().map(|f| f.student_name.as_str()).collect();
        assert_eq!(students, vec!["ann", "cat"]);

        let empty = files
            .find_by_hash(ContentHash::of("gamma").as_str())
            .await
            .unwrap();
        assert_eq!(empty.count, 0);

        let err = files.find_by_hash("not-a-hash").await.unwrap_err();
        assert!(matches!(err, AppError::InvalidFormat { .. }));
    }

    #[tokio::test]
    async fn test_list_task() {
        let dir = tempfile::tempdir().unwrap();
        let files = service(dir.path());

        files.upload(submission("ann", "hw1", "one")).await.unwrap();
        files.upload(submission("bob", "hw2", "two")).await.unwrap();
        files.upload(submission("cat", "hw1", "three")).await.unwrap();

        let task = files.list_task("hw1").await.unwrap();
        assert_eq!(task.task_id, "hw1");
        assert_eq!(task.count, 2);
        assert!(task.files.iter().all(|f| f.task_id == "hw1"));
    }
}
