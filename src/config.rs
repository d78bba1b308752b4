//! Startup configuration
//!
//! Settings come from three layers: built-in defaults, an optional TOML file,
//! and command line flags. Flags win over the file, the file wins over the
//! defaults.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use serde::Deserialize;

use tailview_types::{DEFAULT_HIGHLIGHT_MINUTES, DEFAULT_TAIL_LINES, FilterConfig, LogLevel};

use crate::cli::Args;

pub const DEFAULT_BIND: &str = "0.0.0.0:1111";

/// Contents of the optional config file
///
/// ```toml
/// levels = ["error", "warn"]
/// minutes = 5
/// tail = 100
/// bind = "127.0.0.1:8080"
/// ```
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub all: bool,
    pub levels: Vec<String>,
    pub minutes: Option<u32>,
    pub tail: Option<usize>,
    pub max_bytes: Option<u64>,
    pub bind: Option<String>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::parse(&content)
            .with_context(|| format!("invalid config file {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }
}

/// Effective settings after merging all layers
#[derive(Debug)]
pub struct Settings {
    pub filter: FilterConfig,
    pub tail_lines: usize,
    pub read_limit: Option<u64>,
    pub bind: String,
}

impl Settings {
    pub fn resolve(args: &Args, file: FileConfig) -> Result<Self> {
        let mut filter = FilterConfig::new();

        if args.has_level_flags() {
            let flags = [
                (args.info, LogLevel::Info),
                (args.warn, LogLevel::Warn),
                (args.notice, LogLevel::Notice),
                (args.debug, LogLevel::Debug),
                (args.err, LogLevel::Error),
            ];
            filter = filter.with_levels(
                flags
                    .into_iter()
                    .filter_map(|(enabled, level)| enabled.then_some(level)),
            );
            if args.all {
                filter = filter.with_all_levels();
            }
        } else {
            let mut levels = Vec::with_capacity(file.levels.len());
            for label in &file.levels {
                match LogLevel::from_label(label) {
                    Some(level) => levels.push(level),
                    None => bail!("unknown log level in config: {label:?}"),
                }
            }
            filter = filter.with_levels(levels);
            if file.all {
                filter = filter.with_all_levels();
            }
        }

        let minutes = args
            .minutes
            .or(file.minutes)
            .unwrap_or(DEFAULT_HIGHLIGHT_MINUTES);
        filter = filter.with_highlight_minutes(minutes);

        let tail_lines = match args.tail {
            Some(tail) => usize::try_from(tail).unwrap_or(usize::MAX),
            None => file.tail.unwrap_or(DEFAULT_TAIL_LINES),
        };
        if tail_lines == 0 {
            bail!("tail must be a positive number of entries");
        }

        let read_limit = args.max_bytes.or(file.max_bytes);
        if read_limit == Some(0) {
            bail!("max_bytes must be positive");
        }

        let bind = args
            .bind
            .clone()
            .or(file.bind)
            .unwrap_or_else(|| DEFAULT_BIND.to_string());

        Ok(Self {
            filter,
            tail_lines,
            read_limit,
            bind,
        })
    }
}
