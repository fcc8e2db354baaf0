//! Report assembly and persistence.
//!
//! A report is the ordered list of retained texts, optionally paired with
//! their language labels. Reports at or above `REPORT_ROW_LIMIT` rows are
//! split into contiguous chunks, one destination per chunk numbered from 0.

pub mod csv_sink;

pub use csv_sink::*;

use std::ops::Range;
use std::path::PathBuf;

use thiserror::Error;

use crate::config::REPORT_ROW_LIMIT;
use crate::pipeline::filter::RetainedFragment;
use crate::pipeline::language::LabeledFragment;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Report {
    Unlabeled(Vec<String>),
    /// (label, text) pairs.
    Labeled(Vec<(String, String)>),
}

impl Report {
    /// Labeled when classification ran, unlabeled otherwise.
    pub fn build(retained: Vec<RetainedFragment>, labeled: Option<Vec<LabeledFragment>>) -> Self {
        match labeled {
            Some(labeled) => Self::Labeled(
                labeled
                    .into_iter()
                    .map(|l| (l.label, l.fragment.text))
                    .collect(),
            ),
            None => Self::Unlabeled(retained.into_iter().map(|f| f.text).collect()),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Unlabeled(texts) => texts.len(),
            Self::Labeled(pairs) => pairs.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_labeled(&self) -> bool {
        matches!(self, Self::Labeled(_))
    }
}

/// Where one slice of the report goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Destination {
    Single,
    Chunk(usize),
}

/// Persists report slices. Returns the location each slice was written to.
pub trait ReportSink {
    fn write(
        &self,
        destination: Destination,
        report: &Report,
        rows: Range<usize>,
    ) -> Result<PathBuf, ReportError>;
}

/// Row ranges for a report of `len` rows under the fixed row ceiling.
pub fn plan_chunks(len: usize) -> Vec<(Destination, Range<usize>)> {
    plan_chunks_with_limit(len, REPORT_ROW_LIMIT)
}

fn plan_chunks_with_limit(len: usize, limit: usize) -> Vec<(Destination, Range<usize>)> {
    if len < limit {
        return vec![(Destination::Single, 0..len)];
    }
    (0..len.div_ceil(limit))
        .map(|i| (Destination::Chunk(i), i * limit..((i + 1) * limit).min(len)))
        .collect()
}

/// Write `report` through `sink`, chunked as needed.
pub fn persist(report: &Report, sink: &dyn ReportSink) -> Result<Vec<PathBuf>, ReportError> {
    let plan = plan_chunks(report.len());
    tracing::debug!(
        rows = report.len(),
        labeled = report.is_labeled(),
        chunks = plan.len(),
        "Persisting report"
    );
    let mut written = Vec::with_capacity(plan.len());
    for (destination, rows) in plan {
        let row_count = rows.len();
        let path = sink.write(destination, report, rows)?;
        tracing::info!(path = %path.display(), rows = row_count, "Report written");
        written.push(path);
    }
    Ok(written)
}
