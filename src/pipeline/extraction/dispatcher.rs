//! Extraction dispatcher.
//!
//! Classifies input paths into format buckets, runs each bucket's decoder
//! once with the whole bucket, and concatenates the fragments in bucket
//! order (Word-modern, Word-legacy, spreadsheet, text, PDF). Within a
//! bucket the decoder's file order and each file's fragment order are kept.

use std::path::PathBuf;

use serde::Serialize;

use super::legacy_word::LegacyWordDecoder;
use super::pdf::PdfDecoder;
use super::spreadsheet::SpreadsheetDecoder;
use super::text_files::TextFileDecoder;
use super::types::{DecoderSettings, ExtractionWarning, FormatDecoder, RawFragment};
use super::word::DocxDecoder;
use crate::pipeline::import::{classify_path, FormatFamily, SourceFile};

/// A file whose decoder reported an error. It contributed no fragments.
#[derive(Debug, Clone, Serialize)]
pub struct FileFailure {
    pub path: PathBuf,
    pub reason: String,
}

#[derive(Debug, Default)]
pub struct DispatchOutcome {
    pub fragments: Vec<RawFragment>,
    /// Paths outside the supported extension set.
    pub ignored: Vec<PathBuf>,
    pub failures: Vec<FileFailure>,
    pub warnings: Vec<ExtractionWarning>,
    /// Files that decoded without error (possibly to zero fragments).
    pub files_decoded: usize,
}

pub struct ExtractionDispatcher {
    decoders: Vec<Box<dyn FormatDecoder>>,
}

impl ExtractionDispatcher {
    /// Build from explicit decoders. A family without a decoder has its
    /// files reported as failures.
    pub fn new(decoders: Vec<Box<dyn FormatDecoder>>) -> Self {
        Self { decoders }
    }

    pub fn with_default_decoders(settings: &DecoderSettings) -> Self {
        Self::new(vec![
            Box::new(DocxDecoder),
            Box::new(LegacyWordDecoder::new(settings.clone())),
            Box::new(SpreadsheetDecoder),
            Box::new(TextFileDecoder),
            Box::new(PdfDecoder::default()),
        ])
    }

    fn decoder_for(&self, family: FormatFamily) -> Option<&dyn FormatDecoder> {
        self.decoders
            .iter()
            .find(|d| d.family() == family)
            .map(|d| d.as_ref())
    }

    /// Extract every supported file in `paths`.
    ///
    /// `progress` is called after each bucket with (files processed, files total).
    pub fn dispatch(
        &self,
        paths: &[PathBuf],
        progress: &mut dyn FnMut(usize, usize),
    ) -> DispatchOutcome {
        let mut outcome = DispatchOutcome::default();
        let mut buckets: Vec<(FormatFamily, Vec<SourceFile>)> = FormatFamily::DISPATCH_ORDER
            .iter()
            .map(|family| (*family, Vec::new()))
            .collect();

        for (index, path) in paths.iter().enumerate() {
            match classify_path(path, index) {
                Some(source) => {
                    if let Some((_, bucket)) = buckets.iter_mut().find(|(f, _)| *f == source.family()) {
                        bucket.push(source);
                    }
                }
                None => {
                    tracing::debug!(file = %path.display(), "Ignoring unsupported file");
                    outcome.ignored.push(path.clone());
                }
            }
        }

        let total: usize = buckets.iter().map(|(_, files)| files.len()).sum();
        let mut processed = 0usize;

        for (family, files) in buckets {
            if files.is_empty() {
                continue;
            }
            let Some(decoder) = self.decoder_for(family) else {
                tracing::warn!(family = family.as_str(), files = files.len(), "No decoder registered");
                outcome.failures.extend(files.iter().map(|f| FileFailure {
                    path: f.path.clone(),
                    reason: format!("no decoder for {}", family.as_str()),
                }));
                processed += files.len();
                progress(processed, total);
                continue;
            };

            let before = outcome.fragments.len();
            let batch = decoder.extract_batch(&files);
            if batch.files.len() != files.len() {
                tracing::warn!(
                    family = family.as_str(),
                    expected = files.len(),
                    returned = batch.files.len(),
                    "Decoder result count mismatch"
                );
                outcome.warnings.push(ExtractionWarning::DecoderMismatch {
                    family,
                    expected: files.len(),
                    returned: batch.files.len(),
                });
            }

            for extraction in batch.files {
                match extraction.result {
                    Ok(texts) => {
                        outcome.files_decoded += 1;
                        let batch_index = extraction.source.batch_index;
                        outcome.fragments.extend(
                            texts
                                .into_iter()
                                .enumerate()
                                .map(|(position, text)| RawFragment::new(text, batch_index, position)),
                        );
                    }
                    Err(e) => {
                        tracing::warn!(
                            file = %extraction.source.path.display(),
                            error = %e,
                            "Failed to extract text, skipping file"
                        );
                        outcome.failures.push(FileFailure {
                            path: extraction.source.path.clone(),
                            reason: e.to_string(),
                        });
                    }
                }
            }
            outcome.warnings.extend(batch.warnings);

            tracing::info!(
                family = family.as_str(),
                files = files.len(),
                fragments = outcome.fragments.len() - before,
                "Extracted bucket"
            );
            processed += files.len();
            progress(processed, total);
        }

        outcome
    }
}
