//! Shared types for tailview
//!
//! This crate contains the record and configuration types passed between the
//! log parsing core and the HTTP surface.

use chrono::TimeDelta;
use serde::Serialize;
use std::collections::HashSet;
use std::fmt;

/// Highlight window used when nothing else is configured
pub const DEFAULT_HIGHLIGHT_MINUTES: u32 = 1;

/// Number of records returned per request when nothing else is configured
pub const DEFAULT_TAIL_LINES: usize = 50;

// ============================================================================
// Log Levels
// ============================================================================

/// Severity levels that can be switched on individually in the filter
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum LogLevel {
    Info,
    Warn,
    Notice,
    Debug,
    Error,
}

impl LogLevel {
    /// Every filterable level, in the order they are reported at startup
    pub const ALL: [LogLevel; 5] = [
        Self::Info,
        Self::Warn,
        Self::Notice,
        Self::Debug,
        Self::Error,
    ];

    /// Map a level label to a known level.
    ///
    /// Matching is case-insensitive and ignores surrounding whitespace; `ERR`
    /// is the same flag as `ERROR`.
    pub fn from_label(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "INFO" => Some(Self::Info),
            "WARN" => Some(Self::Warn),
            "NOTICE" => Some(Self::Notice),
            "DEBUG" => Some(Self::Debug),
            "ERROR" | "ERR" => Some(Self::Error),
            _ => None,
        }
    }

    /// Canonical uppercase label
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "INFO",
            Self::Warn => "WARN",
            Self::Notice => "NOTICE",
            Self::Debug => "DEBUG",
            Self::Error => "ERROR",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Log Records
// ============================================================================

/// A single parsed log line
///
/// The serialized key names are what the browser viewer reads, so they are
/// kept stable independently of the Rust field names.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct LogRecord {
    /// Timestamp text as found in the line
    pub timestamp: String,

    /// Uppercase level label (`ERR` is reported as `ERROR`)
    pub level: String,

    /// Free text in front of the embedded payload
    pub message: String,

    #[serde(rename = "json_file")]
    pub file: String,

    #[serde(rename = "json_line")]
    pub line: i64,

    #[serde(rename = "json_class")]
    pub class: String,

    #[serde(rename = "json_function")]
    pub function: String,

    #[serde(rename = "json_code")]
    pub code: i64,

    #[serde(rename = "json_exceptionMessage")]
    pub exception_message: String,

    #[serde(rename = "json_exception")]
    pub exception: String,

    #[serde(rename = "json_log_context")]
    pub log_context: String,

    #[serde(rename = "json_pid")]
    pub pid: i64,

    #[serde(rename = "json_app_version")]
    pub app_version: String,

    #[serde(rename = "json_request_uri")]
    pub request_uri: String,

    #[serde(rename = "json_correlation_id")]
    pub correlation_id: String,

    #[serde(rename = "json_user_agent")]
    pub user_agent: String,

    /// Original line, untouched
    pub raw_line: String,

    /// Embedded payload, pretty-printed when it is valid JSON, always HTML-escaped
    pub json_part: String,

    /// Whether the timestamp falls inside the highlight window
    pub is_recent: bool,
}

impl LogRecord {
    /// Create a record for a raw line with every parsed field empty
    pub fn new(raw_line: String) -> Self {
        Self {
            raw_line,
            ..Self::default()
        }
    }
}

// ============================================================================
// Filter Configuration
// ============================================================================

/// Level filter and highlight settings, fixed for the life of a server run
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FilterConfig {
    /// Levels to include (empty = all)
    levels: HashSet<LogLevel>,

    /// Explicit request for every level
    show_all: bool,

    /// Records this close to "now" are flagged as recent (zero = never)
    highlight_window: TimeDelta,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl FilterConfig {
    /// Show every level and highlight the default window
    pub fn new() -> Self {
        Self {
            levels: HashSet::new(),
            show_all: false,
            highlight_window: TimeDelta::minutes(i64::from(DEFAULT_HIGHLIGHT_MINUTES)),
        }
    }

    /// Set the levels to show
    pub fn with_levels(mut self, levels: impl IntoIterator<Item = LogLevel>) -> Self {
        self.levels = levels.into_iter().collect();
        self
    }

    /// Enable one more level
    pub fn with_level(mut self, level: LogLevel) -> Self {
        self.levels.insert(level);
        self
    }

    /// Show every level regardless of the enabled set
    pub fn with_all_levels(mut self) -> Self {
        self.show_all = true;
        self
    }

    /// Set the highlight window in minutes (0 disables highlighting)
    pub fn with_highlight_minutes(self, minutes: u32) -> Self {
        self.with_highlight_window(TimeDelta::minutes(i64::from(minutes)))
    }

    /// Set the highlight window; negative windows are treated as zero
    pub fn with_highlight_window(mut self, window: TimeDelta) -> Self {
        self.highlight_window = window.max(TimeDelta::zero());
        self
    }

    /// Whether every level passes the filter
    pub fn shows_all_levels(&self) -> bool {
        self.show_all || self.levels.is_empty()
    }

    /// Whether a specific level was enabled
    pub fn is_enabled(&self, level: LogLevel) -> bool {
        self.levels.contains(&level)
    }

    /// Enabled levels in canonical order
    pub fn enabled_levels(&self) -> Vec<LogLevel> {
        LogLevel::ALL
            .into_iter()
            .filter(|level| self.levels.contains(level))
            .collect()
    }

    pub fn highlight_window(&self) -> TimeDelta {
        self.highlight_window
    }

    /// Whether recency tagging is switched on
    pub fn highlights_recent(&self) -> bool {
        self.highlight_window > TimeDelta::zero()
    }
}
