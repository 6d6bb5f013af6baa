//! PDF text extraction using lopdf and pdf-extract.

use super::{DocumentReader, RawContent, Result};
#[cfg(feature = "pdf")]
use crate::error::SourceError;

/// PDF reader.
///
/// lopdf opens the document and handles empty-password encryption; the
/// (possibly decrypted) bytes are then handed to pdf-extract for text.
#[derive(Debug, Default, Clone, Copy)]
pub struct PdfReader;

impl PdfReader {
    pub fn new() -> Self {
        Self
    }
}

#[cfg(feature = "pdf")]
impl PdfReader {
    /// Load the document, returning bytes pdf-extract can read.
    fn prepare(&self, data: &[u8]) -> Result<Vec<u8>> {
        use lopdf::Document;
        use tracing::debug;

        let mut doc = Document::load_mem(data).map_err(|e| SourceError::Pdf(e.to_string()))?;

        let page_count = doc.get_pages().len();
        if page_count == 0 {
            return Err(SourceError::Pdf("document has no pages".to_string()));
        }

        if !doc.is_encrypted() {
            debug!("Loaded PDF with {} pages", page_count);
            return Ok(data.to_vec());
        }

        if doc.decrypt("").is_err() {
            return Err(SourceError::Encrypted);
        }
        debug!("Decrypted PDF with empty password ({} pages)", page_count);

        let mut decrypted = Vec::new();
        doc.save_to(&mut decrypted)
            .map_err(|e| SourceError::Pdf(format!("failed to save decrypted PDF: {}", e)))?;
        Ok(decrypted)
    }
}

#[cfg(feature = "pdf")]
impl DocumentReader for PdfReader {
    fn read(&self, data: &[u8]) -> Result<RawContent> {
        let bytes = self.prepare(data)?;

        // pdf-extract panics on some malformed content streams.
        let text = std::panic::catch_unwind(|| pdf_extract::extract_text_from_mem(&bytes))
            .map_err(|_| SourceError::Pdf("text extraction panicked".to_string()))?
            .map_err(|e| SourceError::Pdf(e.to_string()))?;
        Ok(RawContent::Text(text))
    }
}

#[cfg(not(feature = "pdf"))]
impl DocumentReader for PdfReader {
    fn read(&self, _data: &[u8]) -> Result<RawContent> {
        Err(crate::error::SourceError::Disabled("PDF"))
    }
}
