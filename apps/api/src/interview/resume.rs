//! Resume upload to plain text. PDFs go through `pdf-extract`; anything else
//! must already be UTF-8 text.

use bytes::Bytes;
use thiserror::Error;
use tracing::{debug, warn};

const PDF_MAGIC: &[u8] = b"%PDF";

#[derive(Debug, Error)]
pub enum ResumeError {
    #[error("could not read PDF resume: {0}")]
    Pdf(String),

    #[error("resume must be a PDF or a UTF-8 text file")]
    NotText,

    #[error("resume extraction task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Extracts the text of an uploaded resume. Empty uploads yield an empty string.
pub async fn extract_resume_text(
    file_name: Option<&str>,
    content_type: Option<&str>,
    bytes: Bytes,
) -> Result<String, ResumeError> {
    if bytes.is_empty() {
        return Ok(String::new());
    }

    if !is_pdf(file_name, content_type, &bytes) {
        let text = String::from_utf8(bytes.to_vec()).map_err(|_| ResumeError::NotText)?;
        return Ok(text.trim().to_string());
    }

    let size = bytes.len();
    let text = tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&bytes))
        .await?
        .map_err(|e| {
            warn!("PDF resume extraction failed: {e:?}");
            ResumeError::Pdf(format!("{e:?}"))
        })?;

    debug!("Extracted {} chars from a {size} byte PDF resume", text.len());
    Ok(text.trim().to_string())
}

fn is_pdf(file_name: Option<&str>, content_type: Option<&str>, bytes: &[u8]) -> bool {
    bytes.starts_with(PDF_MAGIC)
        || content_type.is_some_and(|ct| ct.eq_ignore_ascii_case("application/pdf"))
        || file_name.is_some_and(|name| name.to_ascii_lowercase().ends_with(".pdf"))
}
