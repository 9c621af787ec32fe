use cirrus_client::MultipartStore;
use cirrus_core::domain::multipart::{CompletedPart, PartPlan, PartRange};
use std::io::SeekFrom;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncSeekExt};
use tokio::task::JoinSet;
use tracing::{debug, info};

use crate::config::TransferConfig;
use crate::error::{Result, RunnerError};
use crate::transfer::session::UploadSession;

/// Result of a completed upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadSummary {
    pub key: String,
    pub upload_id: String,
    /// Object size in bytes
    pub size: u64,
    pub parts: usize,
}

/// Where part bodies are read from
#[derive(Clone)]
enum PartSource {
    File(PathBuf),
    Memory(Arc<[u8]>),
}

impl PartSource {
    async fn read(&self, range: PartRange) -> Result<Vec<u8>> {
        match self {
            PartSource::File(path) => {
                let mut file = tokio::fs::File::open(path)
                    .await
                    .map_err(RunnerError::io(path))?;
                file.seek(SeekFrom::Start(range.offset))
                    .await
                    .map_err(RunnerError::io(path))?;

                let mut body = vec![0u8; range.length as usize];
                file.read_exact(&mut body)
                    .await
                    .map_err(RunnerError::io(path))?;
                Ok(body)
            }
            PartSource::Memory(data) => {
                Ok(data[range.offset as usize..range.end() as usize].to_vec())
            }
        }
    }
}

/// Uploads whole objects through multipart sessions
pub struct MultipartUploader {
    store: Arc<dyn MultipartStore>,
    config: TransferConfig,
}

impl MultipartUploader {
    pub fn new(store: Arc<dyn MultipartStore>, config: TransferConfig) -> Self {
        Self { store, config }
    }

    pub fn config(&self) -> &TransferConfig {
        &self.config
    }

    /// Uploads a local file to `key`
    pub async fn upload_file(&self, path: &Path, key: &str) -> Result<UploadSummary> {
        let size = tokio::fs::metadata(path)
            .await
            .map_err(RunnerError::io(path))?
            .len();

        self.upload(PartSource::File(path.to_path_buf()), size, key)
            .await
    }

    /// Uploads an in-memory buffer to `key`
    pub async fn upload_bytes(&self, data: Vec<u8>, key: &str) -> Result<UploadSummary> {
        let size = data.len() as u64;
        self.upload(PartSource::Memory(data.into()), size, key).await
    }

    async fn upload(&self, source: PartSource, size: u64, key: &str) -> Result<UploadSummary> {
        self.config.validate()?;
        let plan = PartPlan::new(size, self.config.part_size)?;

        let mut session = UploadSession::begin(Arc::clone(&self.store), key).await?;
        session.expect_parts(plan.len());

        info!(
            "Uploading {} bytes to {} in {} part(s), {} at a time",
            size,
            key,
            plan.len(),
            self.config.max_concurrent_parts
        );

        if let Err(err) = self.upload_parts(&mut session, &source, &plan).await {
            session.abort_after_failure().await;
            return Err(err);
        }

        let upload_id = session.upload_id().to_string();
        let parts = session.complete().await?;

        Ok(UploadSummary {
            key: key.to_string(),
            upload_id,
            size,
            parts,
        })
    }

    /// Uploads every planned part, keeping at most `max_concurrent_parts` in flight
    ///
    /// On the first failure the parts still in flight are cancelled and
    /// awaited before the error is returned.
    async fn upload_parts(
        &self,
        session: &mut UploadSession,
        source: &PartSource,
        plan: &PartPlan,
    ) -> Result<()> {
        let limit = self.config.max_concurrent_parts.max(1);
        let mut ranges = plan.parts().iter().copied();
        let mut tasks: JoinSet<Result<CompletedPart>> = JoinSet::new();

        loop {
            while tasks.len() < limit {
                let Some(range) = ranges.next() else {
                    break;
                };
                tasks.spawn(upload_one(
                    session.store(),
                    session.key().to_string(),
                    session.upload_id().to_string(),
                    source.clone(),
                    range,
                ));
            }

            let Some(joined) = tasks.join_next().await else {
                return Ok(());
            };

            let recorded = match joined {
                Ok(Ok(part)) => {
                    debug!(
                        "Part {} acknowledged ({}/{})",
                        part.number,
                        session.uploaded_parts() + 1,
                        plan.len()
                    );
                    session.record(part)
                }
                Ok(Err(err)) => Err(err),
                Err(err) => Err(err.into()),
            };

            if let Err(err) = recorded {
                // no part request may outlive the abort that follows
                tasks.shutdown().await;
                return Err(err);
            }
        }
    }
}

async fn upload_one(
    store: Arc<dyn MultipartStore>,
    key: String,
    upload_id: String,
    source: PartSource,
    range: PartRange,
) -> Result<CompletedPart> {
    let body = source.read(range).await?;
    let part = store
        .upload_part(&key, &upload_id, range.number, body)
        .await?;
    Ok(part)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transfer::testing::MemoryStore;
    use cirrus_core::MultipartError;
    use std::io::Write;
    use std::time::Duration;

    const MIB: usize = 1024 * 1024;

    fn object(len: usize) -> Vec<u8> {
        (0..len).map(|i| (i % 251) as u8).collect()
    }

    fn uploader(store: &Arc<MemoryStore>, concurrency: usize) -> MultipartUploader {
        MultipartUploader::new(
            store.clone(),
            TransferConfig::default().with_max_concurrent_parts(concurrency),
        )
    }

    #[tokio::test]
    async fn test_sequential_upload() {
        let store = Arc::new(
            MemoryStore::new()
                .delay_part(1, Duration::from_millis(20))
                .delay_part(2, Duration::from_millis(10)),
        );
        let data = object(12 * MIB);

        let summary = uploader(&store, 1)
            .upload_bytes(data.clone(), "videos/clip.mp4")
            .await
            .unwrap();

        assert_eq!(summary.key, "videos/clip.mp4");
        assert_eq!(summary.size, 12 * MIB as u64);
        assert_eq!(summary.parts, 3);
        assert_eq!(store.upload_order(), vec![1, 2, 3]);
        assert_eq!(store.object("videos/clip.mp4").unwrap(), data);
        assert!(store.aborted().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_parts_finish_out_of_order() {
        let store = Arc::new(
            MemoryStore::new()
                .delay_part(1, Duration::from_millis(30))
                .delay_part(2, Duration::from_millis(10)),
        );
        let data = object(11 * MIB);

        let summary = uploader(&store, 3)
            .upload_bytes(data.clone(), "archive.tar")
            .await
            .unwrap();

        assert_eq!(summary.parts, 3);
        assert_eq!(store.upload_order(), vec![3, 2, 1]);
        assert_eq!(store.object("archive.tar").unwrap(), data);
    }

    #[tokio::test]
    async fn test_empty_object_uploads_one_part() {
        let store = Arc::new(MemoryStore::new());

        let summary = uploader(&store, 1)
            .upload_bytes(Vec::new(), "empty.txt")
            .await
            .unwrap();

        assert_eq!(summary.parts, 1);
        assert_eq!(store.object("empty.txt").unwrap(), Vec::<u8>::new());
    }

    #[tokio::test]
    async fn test_part_failure_aborts_upload() {
        let store = Arc::new(MemoryStore::new().fail_on_part(2));

        let err = uploader(&store, 1)
            .upload_bytes(object(12 * MIB), "broken.bin")
            .await
            .unwrap_err();

        assert!(matches!(err, RunnerError::Client(_)));
        assert_eq!(store.upload_order(), vec![1]);
        assert_eq!(store.complete_calls(), 0);
        assert_eq!(store.aborted(), vec!["upload-1".to_string()]);
        assert!(store.object("broken.bin").is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_part_failure_waits_for_parts_in_flight() {
        let store = Arc::new(
            MemoryStore::new()
                .fail_on_part(1)
                .delay_part(2, Duration::from_secs(1))
                .delay_part(3, Duration::from_secs(1)),
        );

        let err = uploader(&store, 3)
            .upload_bytes(object(12 * MIB), "racy.bin")
            .await
            .unwrap_err();

        assert!(matches!(err, RunnerError::Client(_)));
        assert_eq!(store.aborted(), vec!["upload-1".to_string()]);
        assert_eq!(store.in_flight_at_abort(), vec![0]);
        assert!(store.upload_order().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_part_size_is_rejected_before_upload() {
        let store = Arc::new(MemoryStore::new());
        let uploader = MultipartUploader::new(store.clone(), TransferConfig::new(1024, 1));

        let err = uploader
            .upload_bytes(object(4096), "small.bin")
            .await
            .unwrap_err();

        assert!(matches!(err, RunnerError::Config(_)));
        assert!(!store.is_open("upload-1"));
        assert!(store.aborted().is_empty());
    }

    #[test]
    fn test_too_many_parts_is_rejected() {
        let plan = PartPlan::new(10_001 * 5 * MIB as u64, 5 * MIB as u64);
        assert!(matches!(plan, Err(MultipartError::TooManyParts { .. })));
    }

    #[tokio::test]
    async fn test_upload_file() {
        let data = object(6 * MIB);
        let path = std::env::temp_dir().join(format!("cirrus-upload-{}.bin", std::process::id()));
        std::fs::File::create(&path)
            .unwrap()
            .write_all(&data)
            .unwrap();

        let store = Arc::new(MemoryStore::new());
        let summary = uploader(&store, 2)
            .upload_file(&path, "from-disk.bin")
            .await
            .unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(summary.size, 6 * MIB as u64);
        assert_eq!(summary.parts, 2);
        assert_eq!(store.object("from-disk.bin").unwrap(), data);
    }

    #[tokio::test]
    async fn test_missing_file_is_io_error() {
        let store = Arc::new(MemoryStore::new());

        let err = uploader(&store, 1)
            .upload_file(Path::new("/nonexistent/cirrus/input.bin"), "x")
            .await
            .unwrap_err();

        assert!(matches!(err, RunnerError::Io { .. }));
        assert_eq!(store.complete_calls(), 0);
    }
}
