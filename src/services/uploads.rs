use std::path::{Path, PathBuf};

use chrono::Utc;
use tokio::fs;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{errors::ServiceError, models::UploadResponse};

pub const PDF_CONTENT_TYPE: &str = "application/pdf";
const PDF_SUBDIR: &str = "pdfs";

/// Stores exported proposal PDFs under `{upload_dir}/pdfs`, served back at `/uploads`.
#[derive(Debug, Clone)]
pub struct UploadService {
    upload_dir: PathBuf,
    max_bytes: usize,
}

impl UploadService {
    pub fn new(upload_dir: impl Into<PathBuf>, max_bytes: usize) -> Self {
        Self {
            upload_dir: upload_dir.into(),
            max_bytes,
        }
    }

    pub fn upload_dir(&self) -> &Path {
        &self.upload_dir
    }

    pub fn max_bytes(&self) -> usize {
        self.max_bytes
    }

    fn pdf_dir(&self) -> PathBuf {
        self.upload_dir.join(PDF_SUBDIR)
    }

    /// Checks a declared content type before any bytes are read.
    pub fn check_content_type(&self, content_type: Option<&str>) -> Result<(), ServiceError> {
        match content_type {
            Some(ct) if ct.eq_ignore_ascii_case(PDF_CONTENT_TYPE) => Ok(()),
            _ => Err(ServiceError::BadRequest(
                "only PDF files are accepted".to_string(),
            )),
        }
    }

    pub fn check_size(&self, len: usize) -> Result<(), ServiceError> {
        if len > self.max_bytes {
            return Err(ServiceError::PayloadTooLarge(format!(
                "file exceeds the {} byte limit",
                self.max_bytes
            )));
        }
        Ok(())
    }

    #[instrument(skip(self, data), fields(bytes = data.len()))]
    pub async fn store_proposal_pdf(&self, data: &[u8]) -> Result<UploadResponse, ServiceError> {
        if data.is_empty() {
            return Err(ServiceError::BadRequest("no file uploaded".to_string()));
        }
        self.check_size(data.len())?;

        let dir = self.pdf_dir();
        fs::create_dir_all(&dir).await?;

        let filename = format!(
            "proposal-{}-{}.pdf",
            Utc::now().format("%Y%m%d%H%M%S"),
            Uuid::new_v4()
        );
        fs::write(dir.join(&filename), data).await?;

        info!(filename = %filename, "Proposal PDF stored");
        Ok(UploadResponse {
            url: format!("/uploads/{}/{}", PDF_SUBDIR, filename),
            filename,
        })
    }
}
