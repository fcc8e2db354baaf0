//! Sentence splitting for flowing text (PDF pages, subtitle cues).
//!
//! Unicode sentence boundaries (UAX #29) with a small abbreviation list to
//! glue back sentences that were cut after a title such as "Dr.".

use std::collections::HashSet;

use unicode_segmentation::UnicodeSegmentation;

const ABBREVIATIONS: &[&str] = &[
    "mr", "mrs", "ms", "dr", "prof", "sr", "jr", "mt", "vs", "e.g", "i.e", "approx", "dept",
];

/// Only glued when the next sentence starts with a digit ("No. 5", "Fig. 3").
const NUMBER_PREFIXES: &[&str] = &["no", "nos", "nr", "fig", "vol", "p", "pp"];

/// Built once per batch and reused for every file of the batch.
pub struct SentenceSegmenter {
    abbreviations: HashSet<&'static str>,
    number_prefixes: HashSet<&'static str>,
}

impl SentenceSegmenter {
    pub fn new() -> Self {
        Self {
            abbreviations: ABBREVIATIONS.iter().copied().collect(),
            number_prefixes: NUMBER_PREFIXES.iter().copied().collect(),
        }
    }

    /// Collapse whitespace, then split into trimmed, non-empty sentences.
    pub fn split(&self, text: &str) -> Vec<String> {
        let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
        let mut sentences: Vec<String> = Vec::new();
        let mut pending = String::new();

        let mut pieces = collapsed.unicode_sentences().peekable();
        while let Some(piece) = pieces.next() {
            pending.push_str(piece);
            let next_is_number = pieces
                .peek()
                .and_then(|next| next.trim_start().chars().next())
                .is_some_and(|c| c.is_ascii_digit());
            if self.glues_to_next(pending.trim_end(), next_is_number) {
                continue;
            }
            let sentence = pending.trim();
            if !sentence.is_empty() {
                sentences.push(sentence.to_string());
            }
            pending.clear();
        }

        let rest = pending.trim();
        if !rest.is_empty() {
            sentences.push(rest.to_string());
        }
        sentences
    }

    fn glues_to_next(&self, sentence: &str, next_is_number: bool) -> bool {
        let Some(without_dot) = sentence.strip_suffix('.') else {
            return false;
        };
        let last_word = without_dot
            .rsplit(char::is_whitespace)
            .next()
            .unwrap_or_default()
            .to_lowercase();
        self.abbreviations.contains(last_word.as_str())
            || (next_is_number && self.number_prefixes.contains(last_word.as_str()))
    }
}

impl Default for SentenceSegmenter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_simple_sentences() {
        let s = SentenceSegmenter::new();
        assert_eq!(
            s.split("Hello there. How are you? Fine!"),
            vec!["Hello there.", "How are you?", "Fine!"]
        );
    }

    #[test]
    fn collapses_whitespace_and_newlines() {
        let s = SentenceSegmenter::new();
        assert_eq!(
            s.split("A first\n  line   continues.\n\nSecond one."),
            vec!["A first line continues.", "Second one."]
        );
    }

    #[test]
    fn keeps_titles_attached() {
        let s = SentenceSegmenter::new();
        assert_eq!(
            s.split("We met Dr. Smith yesterday. He was late."),
            vec!["We met Dr. Smith yesterday.", "He was late."]
        );
    }

    #[test]
    fn unterminated_tail_is_kept() {
        let s = SentenceSegmenter::new();
        assert_eq!(s.split("Done. and then"), vec!["Done. and then"]);
        assert_eq!(s.split("No terminator"), vec!["No terminator"]);
    }

    #[test]
    fn empty_input_gives_nothing() {
        let s = SentenceSegmenter::new();
        assert!(s.split("   \n\t ").is_empty());
    }

    #[test]
    fn abbreviation_at_end_of_text_flushes() {
        let s = SentenceSegmenter::new();
        assert_eq!(s.split("Call Dr."), vec!["Call Dr."]);
    }

    #[test]
    fn ordinary_words_still_end_sentences() {
        let s = SentenceSegmenter::new();
        assert_eq!(
            s.split("The answer was no. We left early. It was Dec. Then snow came."),
            vec!["The answer was no.", "We left early.", "It was Dec.", "Then snow came."]
        );
    }

    #[test]
    fn number_prefix_glues_only_before_digits() {
        let s = SentenceSegmenter::new();
        assert_eq!(
            s.split("See Fig. 3 Below the line. Room No. 5 Was empty."),
            vec!["See Fig. 3 Below the line.", "Room No. 5 Was empty."]
        );
    }
}
