use axum::body::Bytes;
use std::{
    io::Write,
    path::{Path, PathBuf},
};
use thiserror::Error;

/// Default cap on uploaded documents: 20 MiB.
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("The uploaded document is empty.")]
    EmptyPayload,
    #[error("The uploaded document is {size} bytes; the limit is {limit} bytes.")]
    PayloadTooLarge { size: usize, limit: usize },
    /// The document could not be parsed.
    #[error("Extraction error: {0}")]
    Extraction(String),
    /// The temporary copy of the upload could not be written or read.
    #[error("Storage error: {0}")]
    Storage(#[from] std::io::Error),
}

/// Turns an uploaded document into plain text.
#[async_trait::async_trait]
pub trait TextExtractor: Send + Sync {
    async fn extract(&self, payload: Bytes) -> Result<String, IngestError>;
}

/// Extracts text from PDF uploads.
///
/// Each upload is spooled to its own temporary file under `upload_dir`; the
/// file is removed once extraction finishes, whether it succeeded or not.
#[derive(Debug, Clone)]
pub struct PdfExtractor {
    upload_dir: PathBuf,
    max_bytes: usize,
}

impl PdfExtractor {
    pub fn new(upload_dir: impl Into<PathBuf>, max_bytes: usize) -> Self {
        Self {
            upload_dir: upload_dir.into(),
            max_bytes,
        }
    }
}

#[async_trait::async_trait]
impl TextExtractor for PdfExtractor {
    async fn extract(&self, payload: Bytes) -> Result<String, IngestError> {
        if payload.is_empty() {
            return Err(IngestError::EmptyPayload);
        }
        if payload.len() > self.max_bytes {
            return Err(IngestError::PayloadTooLarge {
                size: payload.len(),
                limit: self.max_bytes,
            });
        }

        let upload_dir = self.upload_dir.clone();
        tokio::task::spawn_blocking(move || extract_via_temp_file(&upload_dir, &payload))
            .await
            .map_err(|error| {
                IngestError::Extraction(if error.is_panic() {
                    "PDF parser panicked".to_string()
                } else {
                    format!("extraction task failed: {error}")
                })
            })?
    }
}

fn extract_via_temp_file(upload_dir: &Path, payload: &[u8]) -> Result<String, IngestError> {
    std::fs::create_dir_all(upload_dir)?;

    let mut file = tempfile::Builder::new()
        .prefix("upload-")
        .suffix(".pdf")
        .tempfile_in(upload_dir)?;
    file.write_all(payload)?;
    file.flush()?;

    tracing::debug!(path = %file.path().display(), bytes = payload.len(), "spooled upload");

    let bytes = std::fs::read(file.path())?;
    let text = pdf_extract::extract_text_from_mem(&bytes)
        .map_err(|error| IngestError::Extraction(error.to_string()))?;

    file.close()?;
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entries(dir: &Path) -> usize {
        std::fs::read_dir(dir).map(Iterator::count).unwrap_or(0)
    }

    #[tokio::test]
    async fn rejects_empty_payload() {
        let dir = tempfile::tempdir().unwrap();
        let extractor = PdfExtractor::new(dir.path(), 1024);

        let error = extractor.extract(Bytes::new()).await.unwrap_err();
        assert!(matches!(error, IngestError::EmptyPayload));
    }

    #[tokio::test]
    async fn rejects_oversized_payload_without_touching_disk() {
        let dir = tempfile::tempdir().unwrap();
        let upload_dir = dir.path().join("uploads");
        let extractor = PdfExtractor::new(&upload_dir, 16);

        let error = extractor
            .extract(Bytes::from(vec![b'%'; 17]))
            .await
            .unwrap_err();
        assert!(matches!(
            error,
            IngestError::PayloadTooLarge { size: 17, limit: 16 }
        ));
        assert!(!upload_dir.exists());
    }

    #[tokio::test]
    async fn extracts_text_and_removes_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let upload_dir = dir.path().join("uploads");
        let extractor = PdfExtractor::new(&upload_dir, DEFAULT_MAX_UPLOAD_BYTES);

        let text = extractor
            .extract(Bytes::from_static(include_bytes!("../tests/fixtures/hello.pdf")))
            .await
            .unwrap();

        assert!(text.contains("Hello"), "{text:?}");
        assert!(text.contains("EaseAI"), "{text:?}");
        assert_eq!(entries(&upload_dir), 0);
    }

    #[tokio::test]
    async fn corrupt_document_fails_and_cleans_up() {
        let dir = tempfile::tempdir().unwrap();
        let upload_dir = dir.path().join("uploads");
        let extractor = PdfExtractor::new(&upload_dir, DEFAULT_MAX_UPLOAD_BYTES);

        let error = extractor
            .extract(Bytes::from_static(b"this is not a pdf at all"))
            .await
            .unwrap_err();
        assert!(matches!(error, IngestError::Extraction(_)), "{error:?}");
        assert!(upload_dir.exists());
        assert_eq!(entries(&upload_dir), 0);
    }

    #[tokio::test]
    async fn unwritable_upload_dir_is_a_storage_error() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, b"not a directory").unwrap();
        let extractor = PdfExtractor::new(blocker.join("uploads"), DEFAULT_MAX_UPLOAD_BYTES);

        let error = extractor
            .extract(Bytes::from_static(b"%PDF-1.4"))
            .await
            .unwrap_err();
        assert!(matches!(error, IngestError::Storage(_)), "{error:?}");
    }
}
