use tailview_types::{FilterConfig, LogLevel, LogRecord};

/// Level filter backed by the process-wide configuration
#[derive(Clone, Copy, Debug)]
pub struct LevelFilter<'a> {
    config: &'a FilterConfig,
}

impl<'a> LevelFilter<'a> {
    pub fn new(config: &'a FilterConfig) -> Self {
        Self { config }
    }

    /// Check if a level label passes the filter.
    ///
    /// With no specific level enabled (or every level requested) everything
    /// passes, including empty and custom labels. Otherwise only enabled known
    /// levels pass; `ERR` and `ERROR` share a flag.
    pub fn matches(&self, level: &str) -> bool {
        if self.config.shows_all_levels() {
            return true;
        }

        LogLevel::from_label(level).is_some_and(|level| self.config.is_enabled(level))
    }

    /// Check if a record passes the filter
    pub fn matches_record(&self, record: &LogRecord) -> bool {
        self.matches(&record.level)
    }
}
