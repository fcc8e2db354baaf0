pub mod cli;
pub mod config;
pub mod pipeline;

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use pipeline::language::supported_language_labels;

pub fn run() -> ExitCode {
    let cli = cli::Cli::parse();

    // Initialize tracing; stderr keeps stdout free for the summary
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .with_writer(std::io::stderr)
        .init();

    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);

    if cli.list_languages {
        for label in supported_language_labels() {
            println!("{label}");
        }
        return ExitCode::SUCCESS;
    }

    match cli::execute(&cli) {
        Ok(outcome) => {
            if cli.json {
                match serde_json::to_string_pretty(&outcome) {
                    Ok(json) => println!("{json}"),
                    Err(e) => {
                        tracing::error!(error = %e, "Failed to serialize run summary");
                        return ExitCode::FAILURE;
                    }
                }
            } else {
                println!("{}", cli::render_summary(&outcome));
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "Run failed");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
