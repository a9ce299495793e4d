//! Formdown CLI - Main entry point

mod commands;

use clap::{Parser, Subcommand};
use formdown_foundation::{FormdownConfig, FORMDOWN_CONFIG_FILE};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Formdown - markdown-like form documents
#[derive(Parser, Debug)]
#[command(name = "formdown")]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Config file (.toml or .json); defaults to ./formdown.toml when present
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Parse a document and print the parse result as JSON
    Parse {
        file: PathBuf,
    },
    /// Render a document to HTML
    Html {
        file: PathBuf,

        /// Associate generated inputs with this form id
        #[arg(long)]
        form_id: Option<String>,

        /// Emit a full HTML page with field-type styles and scripts
        #[arg(long)]
        standalone: bool,
    },
    /// Print the JSON Schema of a document
    Schema {
        file: PathBuf,
    },
    /// Validate a JSON data file against a document
    Validate {
        file: PathBuf,

        /// JSON object of field values
        #[arg(long)]
        data: PathBuf,
    },
    /// Show registered plugins, hooks and field types
    Stats,
}

fn load_config(path: Option<&PathBuf>) -> anyhow::Result<FormdownConfig> {
    let config = match path {
        Some(path) => FormdownConfig::load(path)?,
        None => FormdownConfig::load_or_default(FORMDOWN_CONFIG_FILE)?,
    };
    Ok(config)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // 로그는 stderr로 (stdout은 출력 결과 전용)
    let log_level = if args.debug { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    let config = load_config(args.config.as_ref())?;

    match args.command {
        Command::Parse { file } => commands::parse(&config, &file).await,
        Command::Html {
            file,
            form_id,
            standalone,
        } => commands::html(&config, &file, form_id, standalone).await,
        Command::Schema { file } => commands::schema(&config, &file).await,
        Command::Validate { file, data } => commands::validate(&config, &file, &data).await,
        Command::Stats => commands::stats(&config).await,
    }
}
