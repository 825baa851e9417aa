pub mod catalog;
pub mod cli;
pub mod config;
pub mod error;
pub mod formatter;
pub mod inspector;
pub mod models;
pub mod row;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use self::cli::Cli;
use self::config::{resolve_config, AppConfig};
use self::formatter::OutputGenerator;
use self::inspector::Inspector;

// Connects, Extracts, and Formats in one go.
pub async fn generate_report(config: &AppConfig) -> Result<String> {
    // 1. Connect
    let mut inspector = Inspector::connect(config).await?;

    // 2. Extract (Inspector)
    let rendered = if config.list_databases {
        let databases = inspector.get_databases().await?;
        OutputGenerator::generate_json(&databases, config.pretty)
    } else {
        let document = inspector.get_scheme().await?;
        OutputGenerator::generate_json(&document, config.pretty)
    };
    let output = rendered.context("Failed to serialize output")?;

    // 3. Release the connection; the document is already complete.
    if let Err(err) = inspector.close().await {
        tracing::warn!(error = %err, "closing connection failed");
    }

    Ok(output)
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    // Stdout carries the document only.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

pub async fn run() -> Result<()> {
    // 1. Parse Args
    let args = Cli::parse();

    // 2. Resolve Config
    let config = resolve_config(args)?;
    init_logging();

    // 3. Generate
    let output = generate_report(&config).await?;

    // 4. Output
    println!("{}", output);

    Ok(())
}
