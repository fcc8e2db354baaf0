use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::normalize::normalize_fragment;
use super::options::FilterOptions;
use super::patterns::{is_hyperlink, is_measurement, is_untranslatable};
use crate::pipeline::extraction::RawFragment;

/// A fragment that survived normalization and every enabled filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetainedFragment {
    pub text: String,
    pub batch_index: usize,
    pub position: usize,
}

/// Per-stage drop counts for one pipeline call.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct FilterStats {
    pub input: usize,
    pub duplicates: usize,
    pub empty: usize,
    pub untranslatable: usize,
    pub measurement: usize,
    pub hyperlink: usize,
    pub retained: usize,
}

#[derive(Debug, Default)]
pub struct FilterOutcome {
    pub retained: Vec<RetainedFragment>,
    pub stats: FilterStats,
}

/// Run the filter pipeline over `fragments`, preserving their order.
///
/// Stages: normalize, deduplicate (optional, first occurrence wins), drop
/// empties, drop untranslatable / measurement / hyperlink values (each
/// optional, whole-value match), then a final trim and empty check.
pub fn filter_fragments(fragments: Vec<RawFragment>, options: &FilterOptions) -> FilterOutcome {
    let mut stats = FilterStats {
        input: fragments.len(),
        ..Default::default()
    };
    let mut seen: HashSet<String> = HashSet::new();
    let mut retained = Vec::new();

    for fragment in fragments {
        let text = normalize_fragment(&fragment.text);

        if options.remove_repetitions && !seen.insert(text.clone()) {
            stats.duplicates += 1;
            continue;
        }
        if text.is_empty() {
            stats.empty += 1;
            continue;
        }
        if options.remove_untranslatables && is_untranslatable(&text) {
            stats.untranslatable += 1;
            continue;
        }
        if options.remove_measurements && is_measurement(&text) {
            stats.measurement += 1;
            continue;
        }
        if options.remove_hyperlinks && is_hyperlink(&text) {
            stats.hyperlink += 1;
            continue;
        }

        let text = text.trim();
        if text.is_empty() {
            stats.empty += 1;
            continue;
        }
        retained.push(RetainedFragment {
            text: text.to_string(),
            batch_index: fragment.batch_index,
            position: fragment.position,
        });
    }

    stats.retained = retained.len();
    tracing::info!(
        input = stats.input,
        retained = stats.retained,
        duplicates = stats.duplicates,
        empty = stats.empty,
        untranslatable = stats.untranslatable,
        measurement = stats.measurement,
        hyperlink = stats.hyperlink,
        "Filtered fragments"
    );

    FilterOutcome { retained, stats }
}
