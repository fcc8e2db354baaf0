pub mod types;
pub mod encoding;
pub mod sentence;
pub mod word;
pub mod legacy_word;
pub mod spreadsheet;
pub mod text_files;
pub mod pdf;
pub mod dispatcher;

pub use types::*;
pub use dispatcher::*;

use thiserror::Error;

use crate::pipeline::import::SourceFormat;

/// Per-file decode failure. The dispatcher logs it and moves on to the
/// next file; it never aborts a batch.
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Archive error: {0}")]
    Archive(String),

    #[error("XML parsing failed: {0}")]
    Xml(String),

    #[error("HTML parsing failed: {0}")]
    Html(String),

    #[error("Spreadsheet parsing failed: {0}")]
    Spreadsheet(String),

    #[error("Delimited text parsing failed: {0}")]
    Delimited(String),

    #[error("PDF parsing failed: {0}")]
    PdfParsing(String),

    #[error("Subtitle parsing failed: {0}")]
    Subtitle(String),

    #[error("No candidate encoding could decode the file (tried {})", tried.join(", "))]
    EncodingExhausted { tried: Vec<String> },

    #[error("Legacy Word document could not be read: {0}")]
    LegacyDocument(String),

    #[error("External converter `{program}` failed: {reason}")]
    ExternalConverter { program: String, reason: String },

    #[error("Format {0:?} is not handled by this decoder")]
    UnsupportedFormat(SourceFormat),
}
