//! Command-line front end: argument parsing, progress bars and the
//! end-of-run summary.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};

use crate::config;
use crate::pipeline::extraction::{DecoderSettings, ExtractionDispatcher};
use crate::pipeline::filter::{FilterOption, FilterOptions};
use crate::pipeline::import::supported_extensions;
use crate::pipeline::language::OperationMode;
use crate::pipeline::report::{CsvReportSink, ReportSettings};
use crate::pipeline::runner::{AbortReason, RunError, RunOutcome, RunProgress, Runner, Selection};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ModeArg {
    /// Extract and filter text only
    Extract,
    /// Also label every fragment with its language
    Check,
}

impl From<ModeArg> for OperationMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Extract => OperationMode::ExtractionOnly,
            ModeArg::Check => OperationMode::LanguageCheck,
        }
    }
}

/// Extract text from documents and sort it by language.
#[derive(Debug, Parser)]
#[command(name = "linguasort", version = config::APP_VERSION)]
pub struct Cli {
    #[arg(help = files_help())]
    pub files: Vec<PathBuf>,

    /// What to do with the extracted text
    #[arg(long, value_enum, default_value_t = ModeArg::Extract)]
    pub mode: ModeArg,

    /// Candidate languages for `--mode check`, by name or ISO 639-1 code (at least two)
    #[arg(short, long, value_delimiter = ',', value_name = "LANG,...")]
    pub languages: Vec<String>,

    #[arg(long, help = FilterOption::RemoveRepetitions.description())]
    pub remove_repetitions: bool,

    #[arg(long, help = FilterOption::RemoveUntranslatables.description())]
    pub remove_untranslatables: bool,

    #[arg(long, help = FilterOption::RemoveMeasurements.description())]
    pub remove_measurements: bool,

    #[arg(long, help = FilterOption::RemoveHyperlinks.description())]
    pub remove_hyperlinks: bool,

    /// Filters by display name, e.g. "Remove repetitions,Remove hyperlinks"
    #[arg(long, value_delimiter = ',', value_name = "NAME,...", value_parser = parse_filter_name)]
    pub filters: Vec<FilterOption>,

    /// Enable every filter
    #[arg(long)]
    pub all_filters: bool,

    /// Directory the report is written to [default: current directory]
    #[arg(short, long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Base file name of the report
    #[arg(long, default_value = config::DEFAULT_REPORT_NAME)]
    pub report_name: String,

    /// Never read .doc files in-process; rely on antiword or catdoc only
    #[arg(long)]
    pub no_builtin_doc_reader: bool,

    /// Hide progress bars
    #[arg(short, long)]
    pub quiet: bool,

    /// Print the run summary as JSON
    #[arg(long)]
    pub json: bool,

    /// List the languages accepted by `--languages` and exit
    #[arg(long)]
    pub list_languages: bool,
}

impl Cli {
    pub fn filter_options(&self) -> FilterOptions {
        if self.all_filters {
            return FilterOptions::all();
        }
        let flags = [
            (FilterOption::RemoveRepetitions, self.remove_repetitions),
            (FilterOption::RemoveUntranslatables, self.remove_untranslatables),
            (FilterOption::RemoveMeasurements, self.remove_measurements),
            (FilterOption::RemoveHyperlinks, self.remove_hyperlinks),
        ];
        FilterOptions::from_selected(
            flags
                .into_iter()
                .filter_map(|(option, enabled)| enabled.then_some(option))
                .chain(self.filters.iter().copied()),
        )
    }

    pub fn selection(&self) -> Selection {
        Selection {
            languages: self.languages.clone(),
            options: self.filter_options(),
            mode: Some(self.mode.into()),
        }
    }

    pub fn decoder_settings(&self) -> DecoderSettings {
        DecoderSettings {
            builtin_doc_reader: !self.no_builtin_doc_reader,
            ..Default::default()
        }
    }

    pub fn report_settings(&self) -> ReportSettings {
        ReportSettings {
            output_dir: self
                .output_dir
                .clone()
                .unwrap_or_else(config::default_output_dir),
            report_name: self.report_name.clone(),
        }
    }
}

fn files_help() -> String {
    let extensions: Vec<String> = supported_extensions().iter().map(|ext| format!(".{ext}")).collect();
    format!("Files to process ({})", extensions.join(" "))
}

fn parse_filter_name(name: &str) -> Result<FilterOption, String> {
    FilterOption::from_display_name(name).ok_or_else(|| {
        let known: Vec<&str> = FilterOption::ALL.iter().map(FilterOption::display_name).collect();
        format!("unknown filter '{name}' (expected one of: {})", known.join(", "))
    })
}

/// Progress bars on stderr, one per long stage.
pub struct BarProgress {
    extraction: ProgressBar,
    classification: ProgressBar,
}

impl BarProgress {
    pub fn new(quiet: bool) -> Self {
        let bar = |message: &'static str| {
            if quiet {
                return ProgressBar::hidden();
            }
            let pb = ProgressBar::new(0);
            pb.set_style(
                ProgressStyle::with_template(
                    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}",
                )
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-"),
            );
            pb.set_message(message);
            pb
        };
        Self {
            extraction: bar("files"),
            classification: bar("fragments"),
        }
    }
}

impl RunProgress for BarProgress {
    fn extraction(&mut self, files_done: usize, files_total: usize) {
        self.extraction.set_length(files_total as u64);
        self.extraction.set_position(files_done as u64);
    }

    fn classification(&mut self, fragments_done: usize, fragments_total: usize) {
        self.classification.set_length(fragments_total as u64);
        self.classification.set_position(fragments_done as u64);
    }

    fn stage_finished(&mut self, stage: &'static str) {
        match stage {
            "extraction" => self.extraction.finish_and_clear(),
            "classification" => self.classification.finish_and_clear(),
            _ => {}
        }
    }
}

/// Run the pipeline for parsed arguments.
pub fn execute(cli: &Cli) -> Result<RunOutcome, RunError> {
    let runner = Runner::new(
        ExtractionDispatcher::with_default_decoders(&cli.decoder_settings()),
        Box::new(CsvReportSink::new(&cli.report_settings())),
    );
    let mut progress = BarProgress::new(cli.quiet || cli.json);
    runner.run(&cli.selection(), &cli.files, &mut progress)
}

/// Human-readable end-of-run summary for stdout.
pub fn render_summary(outcome: &RunOutcome) -> String {
    let summary = match outcome {
        RunOutcome::Aborted { reason } => {
            return format!("Nothing to do ({}).", abort_message(*reason));
        }
        RunOutcome::Completed(summary) => summary,
    };

    let mut lines = vec![
        format!("{} v{}: {}", config::APP_NAME, config::APP_VERSION, summary.mode.as_str()),
        format!("  Files decoded:      {}", summary.files_decoded),
        format!("  Files ignored:      {}", summary.ignored.len()),
        format!("  Files failed:       {}", summary.failures.len()),
        format!("  Fragments found:    {}", summary.raw_fragments),
        format!("  Fragments retained: {}", summary.retained_fragments),
        format!("  Filters:            {}", filter_names(&summary.filters)),
    ];
    if let Some(labeled) = summary.labeled_fragments {
        lines.push(format!("  Fragments labeled:  {labeled}"));
    }
    for failure in &summary.failures {
        lines.push(format!("  ! {}: {}", failure.path.display(), failure.reason));
    }
    for warning in &summary.warnings {
        lines.push(format!("  ! {warning}"));
    }
    for path in &summary.reports {
        lines.push(format!("  Report: {}", path.display()));
    }
    lines.join("\n")
}

fn filter_names(options: &FilterOptions) -> String {
    let names: Vec<&str> = options.enabled().iter().map(FilterOption::display_name).collect();
    if names.is_empty() {
        "none".to_string()
    } else {
        names.join(", ")
    }
}

fn abort_message(reason: AbortReason) -> &'static str {
    match reason {
        AbortReason::NoModeSelected => "no operation selected",
        AbortReason::NoFilesSelected => "no files selected",
    }
}
