use std::fmt;

use serde::{Deserialize, Serialize};

use super::DecodeError;
use crate::pipeline::import::{FormatFamily, SourceFile};

/// One unit of extracted text (line, cell, paragraph, sentence or cue)
/// before normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawFragment {
    pub text: String,
    /// Position of the source file in the caller's input list.
    pub batch_index: usize,
    /// Position of the fragment within its source file.
    pub position: usize,
}

impl RawFragment {
    pub fn new(text: impl Into<String>, batch_index: usize, position: usize) -> Self {
        Self {
            text: text.into(),
            batch_index,
            position,
        }
    }
}

/// Outcome of decoding one file of a batch.
#[derive(Debug)]
pub struct FileExtraction {
    pub source: SourceFile,
    pub result: Result<Vec<String>, DecodeError>,
}

/// Non-fatal conditions a decoder reports for the whole batch.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ExtractionWarning {
    /// No program or built-in reader can open `.doc` files; the whole
    /// legacy Word bucket produced nothing.
    NoLegacyWordBackend { skipped_files: usize },
    /// A decoder returned a result for a file it was not given, or
    /// skipped one it was given.
    DecoderMismatch { family: FormatFamily, expected: usize, returned: usize },
}

impl fmt::Display for ExtractionWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoLegacyWordBackend { skipped_files } => write!(
                f,
                "No compatible program found to process .doc files ({skipped_files} skipped), \
                 please convert them to .docx before continuing"
            ),
            Self::DecoderMismatch {
                family,
                expected,
                returned,
            } => write!(
                f,
                "{} decoder returned {returned} results for {expected} files",
                family.as_str()
            ),
        }
    }
}

/// Everything one decoder produced for its bucket.
#[derive(Debug, Default)]
pub struct BatchExtraction {
    pub files: Vec<FileExtraction>,
    pub warnings: Vec<ExtractionWarning>,
}

impl BatchExtraction {
    /// Decode each file independently with `decode_file`, keeping input order.
    pub fn per_file<F>(files: &[SourceFile], mut decode_file: F) -> Self
    where
        F: FnMut(&SourceFile) -> Result<Vec<String>, DecodeError>,
    {
        let files = files
            .iter()
            .map(|source| FileExtraction {
                source: source.clone(),
                result: decode_file(source),
            })
            .collect();
        Self {
            files,
            warnings: Vec::new(),
        }
    }
}

/// Decoder capability for one format family.
///
/// `extract_batch` receives the bucket's whole file list so that setup
/// work (sentence segmenter, backend probe) happens once per batch.
/// Implementations return one `FileExtraction` per input file, in order.
pub trait FormatDecoder {
    fn family(&self) -> FormatFamily;

    fn extract_batch(&self, files: &[SourceFile]) -> BatchExtraction;
}

/// Settings the default decoders are built from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecoderSettings {
    /// Fall back to the in-process OLE reader when no external `.doc`
    /// converter is installed.
    pub builtin_doc_reader: bool,
    /// External `.doc` converters probed on `PATH`, in preference order.
    /// Each must print the document text to stdout when given the path.
    pub external_doc_converters: Vec<String>,
}

impl Default for DecoderSettings {
    fn default() -> Self {
        Self {
            builtin_doc_reader: true,
            external_doc_converters: vec!["antiword".into(), "catdoc".into()],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::import::classify_path;
    use std::path::Path;

    #[test]
    fn per_file_keeps_order_and_errors() {
        let files = vec![
            classify_path(Path::new("a.txt"), 0).unwrap(),
            classify_path(Path::new("b.txt"), 1).unwrap(),
        ];
        let batch = BatchExtraction::per_file(&files, |source| {
            if source.batch_index == 0 {
                Ok(vec!["first".into()])
            } else {
                Err(DecodeError::Subtitle("broken".into()))
            }
        });
        assert_eq!(batch.files.len(), 2);
        assert_eq!(batch.files[0].result.as_ref().unwrap(), &vec!["first".to_string()]);
        assert!(batch.files[1].result.is_err());
        assert!(batch.warnings.is_empty());
    }

    #[test]
    fn warning_display_mentions_docx() {
        let warning = ExtractionWarning::NoLegacyWordBackend { skipped_files: 2 };
        let text = warning.to_string();
        assert!(text.contains(".docx"));
        assert!(text.contains("2 skipped"));
    }

    #[test]
    fn default_settings_enable_builtin_reader() {
        let settings = DecoderSettings::default();
        assert!(settings.builtin_doc_reader);
        assert_eq!(settings.external_doc_converters, vec!["antiword", "catdoc"]);
    }
}
