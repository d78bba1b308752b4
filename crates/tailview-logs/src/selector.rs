use std::borrow::Cow;
use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::Path;

use chrono::{DateTime, Local, TimeZone};
use tracing::debug;

use tailview_types::{FilterConfig, LogRecord};

use crate::error::{Result, SelectError};
use crate::filter::LevelFilter;
use crate::parser::LineParser;

/// Selects the most recent matching records from a log file
#[derive(Clone, Debug)]
pub struct LogSelector<'a> {
    config: &'a FilterConfig,
    parser: LineParser,
    /// Only read this many bytes from the end of the file
    read_limit: Option<u64>,
}

impl<'a> LogSelector<'a> {
    pub fn new(config: &'a FilterConfig) -> Self {
        Self {
            config,
            parser: LineParser::from_config(config),
            read_limit: None,
        }
    }

    /// Bound the read to the final `bytes` of the file.
    ///
    /// Lines that start before the window are not returned.
    pub fn with_read_limit(mut self, bytes: u64) -> Self {
        self.read_limit = Some(bytes);
        self
    }

    /// Select up to `max_count` records from the end of the file, oldest first
    pub fn select(&self, path: impl AsRef<Path>, max_count: usize) -> Result<Vec<LogRecord>> {
        self.select_at(path, max_count, &Local::now())
    }

    /// Same as [`select`](Self::select) with an explicit "now" for recency
    pub fn select_at<Tz: TimeZone>(
        &self,
        path: impl AsRef<Path>,
        max_count: usize,
        now: &DateTime<Tz>,
    ) -> Result<Vec<LogRecord>> {
        let path = path.as_ref();
        let content = self
            .read_tail(path)
            .map_err(|source| SelectError::FileAccess {
                path: path.to_path_buf(),
                source,
            })?;

        let records = self.select_from_bytes(&content, max_count, now);
        debug!(
            path = %path.display(),
            bytes = content.len(),
            records = records.len(),
            "Selected log tail"
        );
        Ok(records)
    }

    /// Scan `content` from its last line backwards and keep matching records.
    ///
    /// The returned records are in file order.
    pub fn select_from_bytes<Tz: TimeZone>(
        &self,
        content: &[u8],
        max_count: usize,
        now: &DateTime<Tz>,
    ) -> Vec<LogRecord> {
        let filter = LevelFilter::new(self.config);
        let mut records = Vec::with_capacity(max_count.min(1024));

        for raw in content.rsplit(|byte| *byte == b'\n') {
            if records.len() >= max_count {
                break;
            }

            if raw.is_empty() {
                continue;
            }

            let line = String::from_utf8_lossy(raw);
            if let Cow::Owned(_) = line {
                debug!(bytes = raw.len(), "Decoded log line with invalid UTF-8 lossily");
            }

            let Some(record) = self.parser.parse_at(&line, now) else {
                continue;
            };

            if filter.matches_record(&record) {
                records.push(record);
            }
        }

        records.reverse();
        records
    }

    /// Read the whole file, or only its final `read_limit` bytes
    fn read_tail(&self, path: &Path) -> io::Result<Vec<u8>> {
        let mut file = File::open(path)?;
        let mut content = Vec::new();

        let Some(limit) = self.read_limit else {
            file.read_to_end(&mut content)?;
            return Ok(content);
        };

        let len = file.metadata()?.len();
        let start = len.saturating_sub(limit);
        if start == 0 {
            file.read_to_end(&mut content)?;
            return Ok(content);
        }

        // Read one byte early so a window starting on a line boundary keeps its
        // first line; everything up to the first newline is a partial line.
        file.seek(SeekFrom::Start(start - 1))?;
        file.take(limit + 1).read_to_end(&mut content)?;
        match content.iter().position(|byte| *byte == b'\n') {
            Some(newline) => {
                content.drain(..=newline);
            }
            None => content.clear(),
        }
        Ok(content)
    }
}

/// Select up to `max_count` records from the end of `path` using `config`
pub fn select(
    path: impl AsRef<Path>,
    max_count: usize,
    config: &FilterConfig,
) -> Result<Vec<LogRecord>> {
    LogSelector::new(config).select(path, max_count)
}
