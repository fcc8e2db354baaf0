use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Decoder buckets. Every supported format belongs to exactly one family,
/// and each family is served by one decoder invoked once per batch.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum FormatFamily {
    WordModern,
    WordLegacy,
    Spreadsheet,
    Text,
    Pdf,
}

impl FormatFamily {
    /// Order in which buckets are decoded and their fragments concatenated.
    pub const DISPATCH_ORDER: [FormatFamily; 5] = [
        Self::WordModern,
        Self::WordLegacy,
        Self::Spreadsheet,
        Self::Text,
        Self::Pdf,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::WordModern => "word_modern",
            Self::WordLegacy => "word_legacy",
            Self::Spreadsheet => "spreadsheet",
            Self::Text => "text",
            Self::Pdf => "pdf",
        }
    }
}

/// Concrete input format, derived from the file extension.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum SourceFormat {
    Docx,
    Doc,
    Xls,
    Xlsx,
    Xlsm,
    Ods,
    Txt,
    Csv,
    Tsv,
    Srt,
    Log,
    Xml,
    Html,
    Pdf,
}

const SUPPORTED_EXTENSIONS: &[&str] = &[
    "doc", "docx", "xls", "xlsx", "xlsm", "ods", "txt", "csv", "tsv", "srt", "log", "xml",
    "html", "pdf",
];

/// Every extension the dispatcher accepts, lower-case and without the dot.
pub fn supported_extensions() -> &'static [&'static str] {
    SUPPORTED_EXTENSIONS
}

impl SourceFormat {
    /// Map an extension (with or without the leading dot, any case).
    pub fn from_extension(extension: &str) -> Option<Self> {
        let ext = extension.trim().trim_start_matches('.').to_ascii_lowercase();
        let format = match ext.as_str() {
            "docx" => Self::Docx,
            "doc" => Self::Doc,
            "xls" => Self::Xls,
            "xlsx" => Self::Xlsx,
            "xlsm" => Self::Xlsm,
            "ods" => Self::Ods,
            "txt" => Self::Txt,
            "csv" => Self::Csv,
            "tsv" => Self::Tsv,
            "srt" => Self::Srt,
            "log" => Self::Log,
            "xml" => Self::Xml,
            "html" => Self::Html,
            "pdf" => Self::Pdf,
            _ => return None,
        };
        Some(format)
    }

    pub fn family(&self) -> FormatFamily {
        match self {
            Self::Docx => FormatFamily::WordModern,
            Self::Doc => FormatFamily::WordLegacy,
            Self::Xls | Self::Xlsx | Self::Xlsm | Self::Ods => FormatFamily::Spreadsheet,
            Self::Txt
            | Self::Csv
            | Self::Tsv
            | Self::Srt
            | Self::Log
            | Self::Xml
            | Self::Html => FormatFamily::Text,
            Self::Pdf => FormatFamily::Pdf,
        }
    }
}

/// One input file after classification. Lives only for the duration of
/// its bucket's extraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub path: PathBuf,
    pub format: SourceFormat,
    /// Position of the path in the caller's input list.
    pub batch_index: usize,
}

impl SourceFile {
    pub fn family(&self) -> FormatFamily {
        self.format.family()
    }
}

/// Classify a path by its extension (case-insensitive).
/// Returns `None` for anything outside the supported set.
pub fn classify_path(path: &Path, batch_index: usize) -> Option<SourceFile> {
    let extension = path.extension()?.to_str()?;
    let format = SourceFormat::from_extension(extension)?;
    Some(SourceFile {
        path: path.to_path_buf(),
        format,
        batch_index,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_supported_extension_classifies() {
        for ext in supported_extensions() {
            let path = PathBuf::from(format!("sample.{ext}"));
            let file = classify_path(&path, 0).expect("supported extension");
            assert_eq!(SourceFormat::from_extension(ext), Some(file.format));
        }
    }

    #[test]
    fn extension_matching_ignores_case() {
        let file = classify_path(Path::new("REPORT.DOCX"), 3).unwrap();
        assert_eq!(file.format, SourceFormat::Docx);
        assert_eq!(file.batch_index, 3);
        assert_eq!(
            classify_path(Path::new("Budget.XlSm"), 0).unwrap().format,
            SourceFormat::Xlsm
        );
    }

    #[test]
    fn unsupported_extensions_are_none() {
        assert!(classify_path(Path::new("slides.pptx"), 0).is_none());
        assert!(classify_path(Path::new("archive.tar.gz"), 0).is_none());
        assert!(classify_path(Path::new("no_extension"), 0).is_none());
        assert!(classify_path(Path::new("page.htm"), 0).is_none());
    }

    #[test]
    fn only_last_extension_counts() {
        let file = classify_path(Path::new("notes.pdf.txt"), 0).unwrap();
        assert_eq!(file.format, SourceFormat::Txt);
    }

    #[test]
    fn families_cover_buckets() {
        assert_eq!(SourceFormat::Docx.family(), FormatFamily::WordModern);
        assert_eq!(SourceFormat::Doc.family(), FormatFamily::WordLegacy);
        for f in [SourceFormat::Xls, SourceFormat::Xlsx, SourceFormat::Xlsm, SourceFormat::Ods] {
            assert_eq!(f.family(), FormatFamily::Spreadsheet);
        }
        for f in [
            SourceFormat::Txt,
            SourceFormat::Csv,
            SourceFormat::Tsv,
            SourceFormat::Srt,
            SourceFormat::Log,
            SourceFormat::Xml,
            SourceFormat::Html,
        ] {
            assert_eq!(f.family(), FormatFamily::Text);
        }
        assert_eq!(SourceFormat::Pdf.family(), FormatFamily::Pdf);
    }

    #[test]
    fn dispatch_order_is_stable() {
        assert_eq!(
            FormatFamily::DISPATCH_ORDER.map(|f| f.as_str()),
            ["word_modern", "word_legacy", "spreadsheet", "text", "pdf"]
        );
    }

    #[test]
    fn from_extension_accepts_leading_dot() {
        assert_eq!(SourceFormat::from_extension(".PDF"), Some(SourceFormat::Pdf));
        assert_eq!(SourceFormat::from_extension("odt"), None);
    }
}
