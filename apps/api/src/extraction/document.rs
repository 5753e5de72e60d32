//! Uploaded document → plain text.

use bytes::Bytes;
use tracing::{debug, warn};

use crate::errors::AppError;

/// Extracted text plus the one layout signal text extraction loses.
#[derive(Debug, Clone, Default)]
pub struct Document {
    pub text: String,
    pub has_images: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    PlainText,
}

impl DocumentKind {
    /// Decides the kind from the upload's file name, declared content type
    /// and magic bytes.
    pub fn detect(
        file_name: Option<&str>,
        content_type: Option<&str>,
        bytes: &[u8],
    ) -> Result<Self, AppError> {
        let extension = file_name
            .and_then(|name| name.rsplit_once('.'))
            .map(|(_, ext)| ext.to_ascii_lowercase());
        let content_type = content_type
            .map(|ct| ct.split(';').next().unwrap_or(ct).trim().to_ascii_lowercase());

        if bytes.starts_with(b"%PDF")
            || extension.as_deref() == Some("pdf")
            || content_type.as_deref() == Some("application/pdf")
        {
            return Ok(DocumentKind::Pdf);
        }
        if extension.as_deref() == Some("txt") || content_type.as_deref() == Some("text/plain") {
            return Ok(DocumentKind::PlainText);
        }

        Err(AppError::UnsupportedFileType(format!(
            "Unsupported file type: {}. Please upload a PDF.",
            file_name.or(content_type.as_deref()).unwrap_or("unknown")
        )))
    }
}

/// Loads an uploaded résumé. PDF parsing runs on the blocking pool.
pub async fn load_document(bytes: Bytes, kind: DocumentKind) -> Result<Document, AppError> {
    if bytes.is_empty() {
        return Err(AppError::Validation("Empty file".to_string()));
    }

    let document = match kind {
        DocumentKind::PlainText => Document {
            text: String::from_utf8_lossy(&bytes).into_owned(),
            has_images: false,
        },
        DocumentKind::Pdf => {
            let has_images = pdf_has_images(&bytes);
            let text = tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&bytes))
                .await
                .map_err(|e| {
                    warn!("PDF extraction task failed: {e}");
                    extraction_failed()
                })?
                .map_err(|e| {
                    warn!("PDF extraction failed: {e}");
                    extraction_failed()
                })?;
            Document { text, has_images }
        }
    };

    if document.text.trim().is_empty() {
        return Err(extraction_failed());
    }

    debug!(
        chars = document.text.len(),
        has_images = document.has_images,
        "Document loaded"
    );
    Ok(document)
}

fn extraction_failed() -> AppError {
    AppError::DocumentExtraction("Could not extract text from PDF".to_string())
}

/// Uncompressed image XObject dictionaries. Images inside compressed object
/// streams are not seen.
fn pdf_has_images(bytes: &[u8]) -> bool {
    const MARKERS: [&[u8]; 2] = [b"/Subtype/Image", b"/Subtype /Image"];
    MARKERS
        .iter()
        .any(|marker| bytes.windows(marker.len()).any(|w| w == *marker))
}
