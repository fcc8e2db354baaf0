//! Run orchestration.
//!
//! Drives one run: extract → filter → (classify) → persist report.
//! Engines sit behind traits (`FormatDecoder`, `LanguageClassifier`,
//! `ReportSink`) so the runner stays testable with stub implementations.

use std::path::PathBuf;

use serde::Serialize;

use crate::pipeline::extraction::{ExtractionDispatcher, ExtractionWarning, FileFailure};
use crate::pipeline::filter::{filter_fragments, FilterOptions, FilterStats};
use crate::pipeline::language::{
    classify, ClassifyError, LanguageClassifier, LinguaClassifier, OperationMode,
};
use crate::pipeline::report::{persist, Report, ReportError, ReportSink};

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Fatal run errors. Per-file decode failures are not fatal and end up
/// in `RunSummary::failures` instead.
#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error("Language classification setup failed: {0}")]
    Classify(#[from] ClassifyError),

    #[error("Failed to write report: {0}")]
    Report(#[from] ReportError),
}

// ---------------------------------------------------------------------------
// Input / output types
// ---------------------------------------------------------------------------

/// What the user picked before the run.
#[derive(Debug, Clone, Default)]
pub struct Selection {
    /// Candidate languages, by name or ISO 639-1 code. Used in language-check mode only.
    pub languages: Vec<String>,
    pub options: FilterOptions,
    /// `None` means the user cancelled; the run stops before any work.
    pub mode: Option<OperationMode>,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AbortReason {
    NoModeSelected,
    NoFilesSelected,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub mode: OperationMode,
    pub files_requested: usize,
    pub files_decoded: usize,
    pub ignored: Vec<PathBuf>,
    pub failures: Vec<FileFailure>,
    pub raw_fragments: usize,
    pub retained_fragments: usize,
    /// Present in language-check mode only.
    pub labeled_fragments: Option<usize>,
    pub filters: FilterOptions,
    pub filter_stats: FilterStats,
    pub reports: Vec<PathBuf>,
    pub warnings: Vec<ExtractionWarning>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RunOutcome {
    Aborted { reason: AbortReason },
    Completed(RunSummary),
}

/// Progress callbacks for the long stages. All methods default to no-ops.
pub trait RunProgress {
    fn extraction(&mut self, _files_done: usize, _files_total: usize) {}
    fn classification(&mut self, _fragments_done: usize, _fragments_total: usize) {}
    fn stage_finished(&mut self, _stage: &'static str) {}
}

/// Progress sink that ignores everything.
pub struct NoProgress;

impl RunProgress for NoProgress {}

// ---------------------------------------------------------------------------
// Runner
// ---------------------------------------------------------------------------

pub struct Runner {
    dispatcher: ExtractionDispatcher,
    sink: Box<dyn ReportSink>,
}

impl Runner {
    pub fn new(dispatcher: ExtractionDispatcher, sink: Box<dyn ReportSink>) -> Self {
        Self { dispatcher, sink }
    }

    /// Run with the default language engine built from `selection.languages`.
    ///
    /// The engine is built before extraction so a bad language list fails fast.
    pub fn run(
        &self,
        selection: &Selection,
        files: &[PathBuf],
        progress: &mut dyn RunProgress,
    ) -> Result<RunOutcome, RunError> {
        let mode = match check_selection(selection, files) {
            Ok(mode) => mode,
            Err(reason) => return Ok(abort(reason)),
        };
        match mode {
            OperationMode::ExtractionOnly => {
                self.execute(mode, &selection.options, files, None, progress)
            }
            OperationMode::LanguageCheck => {
                let classifier = LinguaClassifier::from_names(&selection.languages)?;
                self.execute(mode, &selection.options, files, Some(&classifier), progress)
            }
        }
    }

    /// Same as `run`, with a caller-supplied engine for language-check mode.
    pub fn run_with_classifier(
        &self,
        selection: &Selection,
        files: &[PathBuf],
        classifier: &dyn LanguageClassifier,
        progress: &mut dyn RunProgress,
    ) -> Result<RunOutcome, RunError> {
        let mode = match check_selection(selection, files) {
            Ok(mode) => mode,
            Err(reason) => return Ok(abort(reason)),
        };
        self.execute(mode, &selection.options, files, Some(classifier), progress)
    }

    fn execute(
        &self,
        mode: OperationMode,
        options: &FilterOptions,
        files: &[PathBuf],
        classifier: Option<&dyn LanguageClassifier>,
        progress: &mut dyn RunProgress,
    ) -> Result<RunOutcome, RunError> {
        tracing::info!(mode = mode.as_str(), files = files.len(), "Run started");

        // Step 1: Extract
        let dispatched = self
            .dispatcher
            .dispatch(files, &mut |done, total| progress.extraction(done, total));
        progress.stage_finished("extraction");
        for warning in &dispatched.warnings {
            tracing::warn!(%warning, "Extraction warning");
        }
        let raw_fragments = dispatched.fragments.len();

        // Step 2: Filter
        let filtered = filter_fragments(dispatched.fragments, options);

        // Step 3: Classify (language-check mode only)
        let labeled = match (mode, classifier) {
            (OperationMode::LanguageCheck, Some(classifier)) => {
                let labeled = classify(&filtered.retained, classifier, mode, &mut |done, total| {
                    progress.classification(done, total)
                });
                progress.stage_finished("classification");
                labeled
            }
            _ => None,
        };
        let labeled_fragments = labeled.as_ref().map(Vec::len);
        let retained_fragments = filtered.retained.len();

        // Step 4: Persist
        let report = Report::build(filtered.retained, labeled);
        let reports = persist(&report, self.sink.as_ref())?;

        let summary = RunSummary {
            mode,
            files_requested: files.len(),
            files_decoded: dispatched.files_decoded,
            ignored: dispatched.ignored,
            failures: dispatched.failures,
            raw_fragments,
            retained_fragments,
            labeled_fragments,
            filters: *options,
            filter_stats: filtered.stats,
            reports,
            warnings: dispatched.warnings,
        };
        tracing::info!(
            retained = summary.retained_fragments,
            reports = summary.reports.len(),
            failed = summary.failures.len(),
            "Run finished"
        );
        Ok(RunOutcome::Completed(summary))
    }
}

fn check_selection(selection: &Selection, files: &[PathBuf]) -> Result<OperationMode, AbortReason> {
    let mode = selection.mode.ok_or(AbortReason::NoModeSelected)?;
    if files.is_empty() {
        return Err(AbortReason::NoFilesSelected);
    }
    Ok(mode)
}

fn abort(reason: AbortReason) -> RunOutcome {
    tracing::info!(?reason, "Run aborted before processing");
    RunOutcome::Aborted { reason }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::extraction::DecoderSettings;
    use crate::pipeline::report::{CsvReportSink, ReportSettings};
    use std::path::Path;

    struct FirstWordClassifier;

    impl LanguageClassifier for FirstWordClassifier {
        fn detect(&self, text: &str) -> Option<String> {
            match text.split_whitespace().next()? {
                "Hello" => Some("ENGLISH".into()),
                "Bonjour" => Some("FRENCH".into()),
                _ => None,
            }
        }
    }

    #[derive(Default)]
    struct CountingProgress {
        extraction_calls: usize,
        classification_calls: usize,
        stages: Vec<&'static str>,
    }

    impl RunProgress for CountingProgress {
        fn extraction(&mut self, _: usize, _: usize) {
            self.extraction_calls += 1;
        }
        fn classification(&mut self, _: usize, _: usize) {
            self.classification_calls += 1;
        }
        fn stage_finished(&mut self, stage: &'static str) {
            self.stages.push(stage);
        }
    }

    fn runner_in(dir: &Path) -> Runner {
        Runner::new(
            ExtractionDispatcher::with_default_decoders(&DecoderSettings::default()),
            Box::new(CsvReportSink::new(&ReportSettings {
                output_dir: dir.to_path_buf(),
                report_name: "report".into(),
            })),
        )
    }

    fn write_input(dir: &Path) -> PathBuf {
        let path = dir.join("input.txt");
        std::fs::write(
            &path,
            "  Hello  \nHello\n\nwww.test.com\n5kg\nBonjour tout le monde\n",
        )
        .unwrap();
        path
    }

    fn completed(outcome: RunOutcome) -> RunSummary {
        match outcome {
            RunOutcome::Completed(summary) => summary,
            RunOutcome::Aborted { reason } => panic!("unexpected abort: {reason:?}"),
        }
    }

    #[test]
    fn no_mode_aborts_without_report() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_input(dir.path());
        let outcome = runner_in(dir.path())
            .run(&Selection::default(), &[input], &mut NoProgress)
            .unwrap();
        assert!(matches!(
            outcome,
            RunOutcome::Aborted { reason: AbortReason::NoModeSelected }
        ));
        assert!(!dir.path().join("report.csv").exists());
    }

    #[test]
    fn no_files_aborts() {
        let dir = tempfile::tempdir().unwrap();
        let selection = Selection {
            mode: Some(OperationMode::ExtractionOnly),
            ..Default::default()
        };
        let outcome = runner_in(dir.path()).run(&selection, &[], &mut NoProgress).unwrap();
        assert!(matches!(
            outcome,
            RunOutcome::Aborted { reason: AbortReason::NoFilesSelected }
        ));
    }

    #[test]
    fn extraction_only_writes_unlabeled_report() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_input(dir.path());
        let selection = Selection {
            languages: Vec::new(),
            options: FilterOptions::all(),
            mode: Some(OperationMode::ExtractionOnly),
        };
        let mut progress = CountingProgress::default();

        let summary = completed(runner_in(dir.path()).run(&selection, &[input], &mut progress).unwrap());

        assert_eq!(summary.raw_fragments, 6);
        assert_eq!(summary.retained_fragments, 2);
        assert_eq!(summary.labeled_fragments, None);
        assert_eq!(summary.reports, vec![dir.path().join("report.csv")]);
        let csv = std::fs::read_to_string(&summary.reports[0]).unwrap();
        assert_eq!(csv, "Text\nHello\nBonjour tout le monde\n");
        assert_eq!(progress.stages, vec!["extraction"]);
        assert_eq!(progress.extraction_calls, 1);
    }

    #[test]
    fn language_check_labels_every_fragment() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_input(dir.path());
        let selection = Selection {
            languages: vec!["en".into(), "fr".into()],
            options: FilterOptions::all(),
            mode: Some(OperationMode::LanguageCheck),
        };
        let mut progress = CountingProgress::default();

        let summary = completed(
            runner_in(dir.path())
                .run_with_classifier(&selection, &[input], &FirstWordClassifier, &mut progress)
                .unwrap(),
        );

        assert_eq!(summary.labeled_fragments, Some(2));
        let csv = std::fs::read_to_string(&summary.reports[0]).unwrap();
        assert_eq!(csv, "Prediction,Text\nENGLISH,Hello\nFRENCH,Bonjour tout le monde\n");
        assert_eq!(progress.classification_calls, 2);
        assert_eq!(progress.stages, vec!["extraction", "classification"]);
    }

    #[test]
    fn extraction_only_skips_classification_even_with_engine() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_input(dir.path());
        let selection = Selection {
            mode: Some(OperationMode::ExtractionOnly),
            ..Default::default()
        };
        let mut progress = CountingProgress::default();

        let summary = completed(
            runner_in(dir.path())
                .run_with_classifier(&selection, &[input], &FirstWordClassifier, &mut progress)
                .unwrap(),
        );

        assert_eq!(summary.labeled_fragments, None);
        assert_eq!(progress.classification_calls, 0);
        assert_eq!(progress.stages, vec!["extraction"]);
    }

    #[test]
    fn too_few_languages_fail_before_extraction() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_input(dir.path());
        let selection = Selection {
            languages: vec!["english".into()],
            options: FilterOptions::default(),
            mode: Some(OperationMode::LanguageCheck),
        };
        let mut progress = CountingProgress::default();
        let result = runner_in(dir.path()).run(&selection, &[input], &mut progress);
        assert!(matches!(
            result,
            Err(RunError::Classify(ClassifyError::TooFewLanguages(1)))
        ));
        assert_eq!(progress.extraction_calls, 0);
    }

    #[test]
    fn unsupported_and_broken_files_are_reported() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_input(dir.path());
        let ignored = dir.path().join("slides.pptx");
        let missing = dir.path().join("missing.csv");
        let selection = Selection {
            mode: Some(OperationMode::ExtractionOnly),
            ..Default::default()
        };

        let summary = completed(
            runner_in(dir.path())
                .run(&selection, &[ignored.clone(), input, missing.clone()], &mut NoProgress)
                .unwrap(),
        );

        assert_eq!(summary.files_requested, 3);
        assert_eq!(summary.files_decoded, 1);
        assert_eq!(summary.ignored, vec![ignored]);
        assert_eq!(summary.failures.len(), 1);
        assert_eq!(summary.failures[0].path, missing);
        // No filters: only the empty line goes.
        assert_eq!(summary.retained_fragments, 5);
    }

    #[test]
    fn summary_serializes_with_status_tag() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_input(dir.path());
        let selection = Selection {
            mode: Some(OperationMode::ExtractionOnly),
            ..Default::default()
        };
        let outcome = runner_in(dir.path()).run(&selection, &[input], &mut NoProgress).unwrap();
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["status"], "completed");
        assert_eq!(json["mode"], "extraction_only");
        assert_eq!(json["filter_stats"]["input"], 6);
        assert_eq!(json["filters"]["remove_repetitions"], false);
    }
}
