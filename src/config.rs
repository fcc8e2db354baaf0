use std::path::PathBuf;

/// Application-level constants
pub const APP_NAME: &str = "LinguaSort";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Rows per report destination. Reports at or above this size are split
/// into numbered chunks of at most this many rows.
pub const REPORT_ROW_LIMIT: usize = 750_000;

/// Base file name of the report when none is given on the command line.
pub const DEFAULT_REPORT_NAME: &str = "report";

/// Label written for fragments the classification engine could not place.
pub const UNKNOWN_LABEL: &str = "UNKNOWN";

/// Filter used when `RUST_LOG` is not set.
pub fn default_log_filter() -> String {
    "warn,linguasort=info,linguasort_lib=info".to_string()
}

/// Directory reports are written to when `--output-dir` is not given.
/// Falls back to the current directory, then to the home directory.
pub fn default_output_dir() -> PathBuf {
    std::env::current_dir()
        .ok()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
}
