use std::process::ExitCode;

use dotenvy::dotenv;
use tracing_subscriber::EnvFilter;

mod browser;
mod config;
mod report;

use config::VerifyConfig;

#[tokio::main]
async fn main() -> ExitCode {
    dotenv().ok();

    // Logs go to stderr; stdout carries only the report.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cfg = match VerifyConfig::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            println!("Test failed: {e}");
            return ExitCode::FAILURE;
        }
    };

    let on_loaded = |title: &str| {
        for line in report::loaded_lines(title) {
            println!("{line}");
        }
    };

    match browser::inspect(&cfg, on_loaded).await {
        Ok(report) => {
            for line in report.lines() {
                println!("{line}");
            }
            if report.succeeded() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            }
        }
        Err(e) => {
            println!("Test failed: {e:#}");
            ExitCode::FAILURE
        }
    }
}
