//! Language classification of retained fragments.
//!
//! In extraction-only mode nothing is classified. In language-check mode
//! every fragment gets exactly one label, in order.

pub mod classifier;

pub use classifier::*;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::UNKNOWN_LABEL;
use crate::pipeline::filter::RetainedFragment;

#[derive(Error, Debug)]
pub enum ClassifyError {
    #[error("At least two candidate languages are required, got {0}")]
    TooFewLanguages(usize),

    #[error("Unknown language: {0}")]
    UnknownLanguage(String),
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OperationMode {
    ExtractionOnly,
    LanguageCheck,
}

impl OperationMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ExtractionOnly => "extraction_only",
            Self::LanguageCheck => "language_check",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabeledFragment {
    pub label: String,
    pub fragment: RetainedFragment,
}

/// Label every fragment in language-check mode; `None` in extraction-only mode.
///
/// One engine call per fragment, no caching. `progress` receives
/// (fragments classified, total) after each call.
pub fn classify(
    fragments: &[RetainedFragment],
    classifier: &dyn LanguageClassifier,
    mode: OperationMode,
    progress: &mut dyn FnMut(usize, usize),
) -> Option<Vec<LabeledFragment>> {
    if mode == OperationMode::ExtractionOnly {
        return None;
    }

    let total = fragments.len();
    let mut unknown = 0usize;
    let labeled: Vec<LabeledFragment> = fragments
        .iter()
        .enumerate()
        .map(|(i, fragment)| {
            let label = classifier.detect(&fragment.text).unwrap_or_else(|| {
                unknown += 1;
                UNKNOWN_LABEL.to_string()
            });
            progress(i + 1, total);
            LabeledFragment {
                label,
                fragment: fragment.clone(),
            }
        })
        .collect();

    tracing::info!(fragments = total, unknown, "Classified fragments");
    Some(labeled)
}
