mod cli;
mod config;

use anyhow::{Context, Result, bail};
use clap::Parser;
use tokio::net::TcpListener;
use tracing::info;

use tailview_types::FilterConfig;
use tailview_web::ViewerSettings;

use crate::cli::Args;
use crate::config::{FileConfig, Settings};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let result = run(args).await;

    if let Err(e) = &result {
        eprintln!("Error: {:#}", e);
    }

    result
}

async fn run(args: Args) -> Result<()> {
    let file_config = match &args.config {
        Some(path) => FileConfig::load(path)?,
        None => FileConfig::default(),
    };
    let settings = Settings::resolve(&args, file_config)?;

    if !args.log_file.exists() {
        bail!("Log file does not exist: {}", args.log_file.display());
    }

    log_filter_summary(&settings.filter);

    let listener = TcpListener::bind(&settings.bind)
        .await
        .with_context(|| format!("failed to listen on {}", settings.bind))?;

    info!(
        "Starting log viewer for {} on http://{}",
        args.log_file.display(),
        listener.local_addr()?
    );

    let viewer = ViewerSettings {
        log_file: args.log_file,
        filter: settings.filter,
        tail_lines: settings.tail_lines,
        read_limit: settings.read_limit,
    };
    tailview_web::serve(listener, viewer)
        .await
        .context("server error")?;

    Ok(())
}

/// Report the active level filter and highlight window
fn log_filter_summary(filter: &FilterConfig) {
    if filter.shows_all_levels() {
        info!("Showing all log levels");
    } else {
        let levels: Vec<_> = filter
            .enabled_levels()
            .iter()
            .map(|level| level.as_str())
            .collect();
        info!("Filtering log levels: {}", levels.join(", "));
    }

    if filter.highlights_recent() {
        info!(
            "Highlighting logs from the last {} minute(s)",
            filter.highlight_window().num_minutes()
        );
    } else {
        info!("Log highlighting is disabled");
    }
}
