use std::ops::Range;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::{Destination, Report, ReportError, ReportSink};
use crate::config::{default_output_dir, DEFAULT_REPORT_NAME};

const LABEL_COLUMN: &str = "Prediction";
const TEXT_COLUMN: &str = "Text";

/// Where reports are written and under which base name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportSettings {
    pub output_dir: PathBuf,
    pub report_name: String,
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            report_name: DEFAULT_REPORT_NAME.to_string(),
        }
    }
}

/// Writes `<name>.csv`, or `<name>0.csv`, `<name>1.csv`, ... for chunks.
/// Every file starts with a header row.
pub struct CsvReportSink {
    output_dir: PathBuf,
    report_name: String,
}

impl CsvReportSink {
    pub fn new(settings: &ReportSettings) -> Self {
        Self {
            output_dir: settings.output_dir.clone(),
            report_name: sanitize_report_name(&settings.report_name),
        }
    }

    pub fn path_for(&self, destination: Destination) -> PathBuf {
        let file_name = match destination {
            Destination::Single => format!("{}.csv", self.report_name),
            Destination::Chunk(index) => format!("{}{index}.csv", self.report_name),
        };
        self.output_dir.join(file_name)
    }
}

impl ReportSink for CsvReportSink {
    fn write(
        &self,
        destination: Destination,
        report: &Report,
        rows: Range<usize>,
    ) -> Result<PathBuf, ReportError> {
        std::fs::create_dir_all(&self.output_dir)?;
        let path = self.path_for(destination);
        write_csv(&path, report, rows)?;
        Ok(path)
    }
}

fn write_csv(path: &Path, report: &Report, rows: Range<usize>) -> Result<(), ReportError> {
    let mut writer = csv::Writer::from_path(path)?;
    match report {
        Report::Unlabeled(texts) => {
            writer.write_record([TEXT_COLUMN])?;
            for text in &texts[rows] {
                writer.write_record([text])?;
            }
        }
        Report::Labeled(pairs) => {
            writer.write_record([LABEL_COLUMN, TEXT_COLUMN])?;
            for (label, text) in &pairs[rows] {
                writer.write_record([label, text])?;
            }
        }
    }
    writer.flush()?;
    Ok(())
}

/// Make a user-supplied report name safe to use as a file stem.
/// Removes path separators, replaces other special characters, strips a
/// trailing `.csv` and falls back to the default name when nothing is left.
pub fn sanitize_report_name(name: &str) -> String {
    let name = name.trim();
    let name = name
        .strip_suffix(".csv")
        .or_else(|| name.strip_suffix(".CSV"))
        .unwrap_or(name);

    let sanitized: String = name
        .chars()
        .filter(|&c| c != '/' && c != '\\' && c != '\0')
        .map(|c| {
            if c.is_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();

    // Remove consecutive dots (path traversal prevention)
    let sanitized = sanitized.replace("..", "");
    let sanitized: String = sanitized.chars().take(100).collect();

    if sanitized.is_empty() {
        DEFAULT_REPORT_NAME.into()
    } else {
        sanitized
    }
}
