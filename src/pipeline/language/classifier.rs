use lingua::{Language, LanguageDetector, LanguageDetectorBuilder};

use super::ClassifyError;

/// Language identification engine.
/// Abstracted behind a trait so the adapter can be tested without models.
pub trait LanguageClassifier {
    /// Upper-case language name (e.g. "ENGLISH"), or `None` when the
    /// engine cannot decide between the candidates.
    fn detect(&self, text: &str) -> Option<String>;
}

/// Statistical n-gram classifier from the lingua crate, restricted to a
/// fixed set of candidate languages.
pub struct LinguaClassifier {
    detector: LanguageDetector,
}

impl LinguaClassifier {
    pub fn new(candidates: &[Language]) -> Result<Self, ClassifyError> {
        let mut unique: Vec<Language> = Vec::with_capacity(candidates.len());
        for language in candidates {
            if !unique.contains(language) {
                unique.push(*language);
            }
        }
        if unique.len() < 2 {
            return Err(ClassifyError::TooFewLanguages(unique.len()));
        }

        tracing::info!(
            languages = %unique.iter().map(language_label).collect::<Vec<_>>().join(","),
            "Building language detector"
        );
        let detector = LanguageDetectorBuilder::from_languages(&unique).build();
        Ok(Self { detector })
    }

    /// Parse and build in one step from user input such as `["en", "french"]`.
    pub fn from_names<S: AsRef<str>>(names: &[S]) -> Result<Self, ClassifyError> {
        let languages = names
            .iter()
            .map(|name| parse_language(name.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(&languages)
    }
}

impl LanguageClassifier for LinguaClassifier {
    fn detect(&self, text: &str) -> Option<String> {
        self.detector
            .detect_language_of(text)
            .map(|language| language_label(&language))
    }
}

/// Report label of a language: its English name in upper case.
pub fn language_label(language: &Language) -> String {
    format!("{language:?}").to_uppercase()
}

/// Parse an English language name ("french") or ISO 639-1 code ("fr"),
/// ignoring case.
pub fn parse_language(input: &str) -> Result<Language, ClassifyError> {
    let wanted = input.trim();
    Language::all()
        .into_iter()
        .find(|language| {
            format!("{language:?}").eq_ignore_ascii_case(wanted)
                || format!("{:?}", language.iso_code_639_1()).eq_ignore_ascii_case(wanted)
        })
        .ok_or_else(|| ClassifyError::UnknownLanguage(wanted.to_string()))
}

/// Every supported language label, sorted.
pub fn supported_language_labels() -> Vec<String> {
    let mut labels: Vec<String> = Language::all().iter().map(language_label).collect();
    labels.sort();
    labels
}
