use std::path::Path;

use super::sentence::SentenceSegmenter;
use super::types::{BatchExtraction, FormatDecoder};
use super::DecodeError;
use crate::pipeline::import::{FormatFamily, SourceFile};

/// Text layer of a PDF, one string per page.
/// Abstracted behind a trait so the decoder can be tested without real PDFs.
pub trait PdfPageSource {
    fn page_texts(&self, pdf_bytes: &[u8]) -> Result<Vec<String>, DecodeError>;
}

/// Page text source using the pdf-extract crate.
/// Handles digital PDFs with embedded text layers; scans yield empty pages.
pub struct PdfExtractPages;

impl PdfPageSource for PdfExtractPages {
    fn page_texts(&self, pdf_bytes: &[u8]) -> Result<Vec<String>, DecodeError> {
        pdf_extract::extract_text_from_mem_by_pages(pdf_bytes)
            .map_err(|e| DecodeError::PdfParsing(e.to_string()))
    }
}

/// PDF decoder: pages joined with a space, then split into sentences.
pub struct PdfDecoder {
    source: Box<dyn PdfPageSource>,
}

impl PdfDecoder {
    pub fn new(source: Box<dyn PdfPageSource>) -> Self {
        Self { source }
    }

    fn extract_pdf(
        &self,
        path: &Path,
        segmenter: &SentenceSegmenter,
    ) -> Result<Vec<String>, DecodeError> {
        let bytes = std::fs::read(path)?;
        let pages = self.source.page_texts(&bytes)?;
        let empty_pages = pages.iter().filter(|p| p.trim().is_empty()).count();
        if empty_pages > 0 {
            tracing::debug!(
                file = %path.display(),
                pages = pages.len(),
                empty_pages,
                "PDF pages without a text layer"
            );
        }
        Ok(segmenter.split(&pages.join(" ")))
    }
}

impl Default for PdfDecoder {
    fn default() -> Self {
        Self::new(Box::new(PdfExtractPages))
    }
}

impl FormatDecoder for PdfDecoder {
    fn family(&self) -> FormatFamily {
        FormatFamily::Pdf
    }

    fn extract_batch(&self, files: &[SourceFile]) -> BatchExtraction {
        let segmenter = SentenceSegmenter::new();
        BatchExtraction::per_file(files, |source| self.extract_pdf(&source.path, &segmenter))
    }
}
