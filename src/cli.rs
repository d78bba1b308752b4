use std::path::PathBuf;

use clap::Parser;

/// tailview - A web viewer for the tail of structured application logs
///
/// If no level flags are given, all levels are shown. Level flags can be
/// combined to show several levels.
#[derive(Parser, Debug)]
#[command(name = "tailview")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Log file to view
    #[arg(value_name = "LOG_FILE")]
    pub log_file: PathBuf,

    /// Show all log levels
    #[arg(long)]
    pub all: bool,

    /// Show INFO level logs
    #[arg(long)]
    pub info: bool,

    /// Show WARN level logs
    #[arg(long)]
    pub warn: bool,

    /// Show NOTICE level logs
    #[arg(long)]
    pub notice: bool,

    /// Show DEBUG level logs
    #[arg(long)]
    pub debug: bool,

    /// Show ERROR/ERR level logs
    #[arg(long)]
    pub err: bool,

    /// Minutes to highlight recent logs (0 to disable) [default: 1]
    #[arg(long)]
    pub minutes: Option<u32>,

    /// Number of log entries returned per request [default: 50]
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    pub tail: Option<u64>,

    /// Only read this many bytes from the end of the log file
    #[arg(long, value_name = "BYTES", value_parser = clap::value_parser!(u64).range(1..))]
    pub max_bytes: Option<u64>,

    /// Address to listen on [default: 0.0.0.0:1111]
    #[arg(long, value_name = "ADDR")]
    pub bind: Option<String>,

    /// TOML config file with default settings
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

impl Args {
    /// Whether any level selection was made on the command line
    pub fn has_level_flags(&self) -> bool {
        self.all || self.info || self.warn || self.notice || self.debug || self.err
    }
}
