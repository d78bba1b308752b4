use chrono::{DateTime, Local, TimeDelta, TimeZone};
use serde_json::{Map, Value};

use tailview_types::{FilterConfig, LogRecord};

use crate::timestamp;

/// Separates the bracketed timestamp from the rest of the line
const FIELD_SEPARATOR: &str = " - ";

/// Marks the start of the embedded JSON payload
const PAYLOAD_MARKER: &str = "~>";

/// Ends the context part of a bracket-form line: `LEVEL(context)]: message`
const CONTEXT_END: &str = "]:";

/// Parser turning raw log lines into records
#[derive(Clone, Debug)]
pub struct LineParser {
    highlight_window: TimeDelta,
}

impl LineParser {
    /// Create a parser flagging records within `highlight_window` of now
    pub fn new(highlight_window: TimeDelta) -> Self {
        Self { highlight_window }
    }

    pub fn from_config(config: &FilterConfig) -> Self {
        Self::new(config.highlight_window())
    }

    /// Parse a raw log line, evaluating recency against the current local time.
    ///
    /// Returns `None` for lines without the `" - "` separator.
    pub fn parse(&self, line: &str) -> Option<LogRecord> {
        self.parse_at(line, &Local::now())
    }

    /// Parse a raw log line, evaluating recency against `now`
    pub fn parse_at<Tz: TimeZone>(&self, line: &str, now: &DateTime<Tz>) -> Option<LogRecord> {
        let (prefix, rest) = line.split_once(FIELD_SEPARATOR)?;

        let mut record = LogRecord::new(line.to_string());
        record.timestamp = Self::extract_timestamp(prefix).to_string();

        let (head, payload) = match rest.split_once(PAYLOAD_MARKER) {
            Some((head, payload)) => (head, Some(payload)),
            None => (rest, None),
        };

        let (level, message) = Self::extract_level_and_message(head);
        record.level = normalize_level(level);
        record.message = message;

        if let Some(payload) = payload {
            Self::apply_payload(&mut record, payload.trim());
        }

        record.is_recent = timestamp::is_recent(&record.timestamp, now, self.highlight_window);

        Some(record)
    }

    /// Strip the brackets around the timestamp: `[2024-01-15 10:00:00]`
    fn extract_timestamp(prefix: &str) -> &str {
        let trimmed = prefix.trim().trim_start_matches('[');
        trimmed.strip_suffix(']').unwrap_or(trimmed).trim()
    }

    /// Split the part after the separator into level and message
    fn extract_level_and_message(head: &str) -> (&str, String) {
        // Bracket form: `LEVEL(context)]: message`
        if let Some(paren) = head.find('(') {
            let level = head[..paren].trim();
            let after_paren = &head[paren..];
            let message = after_paren
                .find(CONTEXT_END)
                .map(|end| after_paren[end + CONTEXT_END.len()..].trim().to_string())
                .unwrap_or_default();
            return (level, message);
        }

        // Simple form: `LEVEL message words`
        let mut tokens = head.split_whitespace();
        let level = tokens.next().unwrap_or_default();
        let message = tokens.collect::<Vec<_>>().join(" ");
        (level, message)
    }

    /// Fill the payload-derived fields of a record
    fn apply_payload(record: &mut LogRecord, payload: &str) {
        let value: Option<Value> = serde_json::from_str(payload).ok();

        let pretty = value
            .as_ref()
            .and_then(|value| serde_json::to_string_pretty(value).ok());
        record.json_part = escape_html(pretty.as_deref().unwrap_or(payload));

        if let Some(Value::Object(fields)) = &value {
            Self::extract_payload_fields(record, fields);
        }
    }

    /// Copy the well-known payload keys into the record, ignoring mismatched types
    fn extract_payload_fields(record: &mut LogRecord, fields: &Map<String, Value>) {
        record.file = string_field(fields, "json_file");
        record.line = integer_field(fields, "json_line");
        record.class = string_field(fields, "json_class");
        record.function = string_field(fields, "json_function");
        record.code = integer_field(fields, "json_code");
        record.log_context = string_field(fields, "json_log_context");
        record.pid = integer_field(fields, "json_pid");
        record.app_version = string_field(fields, "json_app_version");
        record.request_uri = string_field(fields, "json_request_uri");
        record.correlation_id = string_field(fields, "json_correlation_id");
        record.user_agent = string_field(fields, "json_user_agent");
        record.exception_message = string_field(fields, "json_exceptionMessage");
        record.exception = string_field(fields, "json_exception");
    }
}

/// Uppercase a level label and fold `ERR` into `ERROR`
fn normalize_level(level: &str) -> String {
    let level = level.trim().to_uppercase();
    if level == "ERR" {
        "ERROR".to_string()
    } else {
        level
    }
}

fn string_field(fields: &Map<String, Value>, key: &str) -> String {
    fields
        .get(key)
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_default()
}

/// Numbers are truncated towards zero; anything else reads as 0
fn integer_field(fields: &Map<String, Value>, key: &str) -> i64 {
    match fields.get(key) {
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .unwrap_or_default(),
        _ => 0,
    }
}

/// Escape text for embedding into HTML
fn escape_html(s: &str) -> String {
    let mut escaped = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '\'' => escaped.push_str("&#39;"),
            '"' => escaped.push_str("&#34;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, NaiveDate};
    use serde_json::json;

    fn parser() -> LineParser {
        LineParser::new(TimeDelta::minutes(1))
    }

    fn at(h: u32, m: u32, s: u32) -> DateTime<FixedOffset> {
        FixedOffset::east_opt(0)
            .unwrap()
            .from_local_datetime(
                &NaiveDate::from_ymd_opt(2024, 1, 15)
                    .unwrap()
                    .and_hms_opt(h, m, s)
                    .unwrap(),
            )
            .unwrap()
    }

    #[test]
    fn test_line_without_separator() {
        assert!(parser().parse("no separator here").is_none());
        assert!(parser().parse("[2024-01-15 10:00:00]-ERROR").is_none());
        assert!(parser().parse("").is_none());
    }

    #[test]
    fn test_parse_bracket_form() {
        let line = r#"[2024-01-15 10:00:00] - err(app.core)]: Payment failed~>{"json_code":402,"json_file":"pay.php"}"#;
        let record = parser().parse_at(line, &at(12, 0, 0)).unwrap();
        assert_eq!(record.timestamp, "2024-01-15 10:00:00");
        assert_eq!(record.level, "ERROR");
        assert_eq!(record.message, "Payment failed");
        assert_eq!(record.code, 402);
        assert_eq!(record.file, "pay.php");
        assert_eq!(
            record.json_part,
            "{\n  &#34;json_code&#34;: 402,\n  &#34;json_file&#34;: &#34;pay.php&#34;\n}"
        );
        assert_eq!(record.raw_line, line);
        assert!(!record.is_recent);
    }

    #[test]
    fn test_bracket_form_without_context_end() {
        let record = parser()
            .parse_at("[2024-01-15 10:00:00] - WARN(ctx) dangling", &at(10, 0, 0))
            .unwrap();
        assert_eq!(record.level, "WARN");
        assert_eq!(record.message, "");
    }

    #[test]
    fn test_context_end_before_paren_is_ignored() {
        let record = parser()
            .parse_at("[2024-01-15 10:00:00] - ]: INFO(ctx) tail", &at(10, 0, 0))
            .unwrap();
        assert_eq!(record.level, "]: INFO");
        assert_eq!(record.message, "");
    }

    #[test]
    fn test_parse_simple_form() {
        let record = parser()
            .parse_at("[2024-01-15 10:00:00] - info   user   logged in", &at(10, 0, 0))
            .unwrap();
        assert_eq!(record.level, "INFO");
        assert_eq!(record.message, "user logged in");
        assert_eq!(record.json_part, "");
        assert!(record.is_recent);
    }

    #[test]
    fn test_empty_head() {
        let record = parser().parse_at("[x] -    ", &at(10, 0, 0)).unwrap();
        assert_eq!(record.timestamp, "x");
        assert_eq!(record.level, "");
        assert_eq!(record.message, "");
        assert!(!record.is_recent);
    }

    #[test]
    fn test_separator_splits_once() {
        let record = parser()
            .parse_at("[2024-01-15 10:00:00] - NOTICE a - b - c", &at(10, 0, 0))
            .unwrap();
        assert_eq!(record.level, "NOTICE");
        assert_eq!(record.message, "a - b - c");
    }

    #[test]
    fn test_invalid_payload_kept_raw_and_escaped() {
        let record = parser()
            .parse_at(
                "[2024-01-15 10:00:00] - DEBUG dump~> <not json> & more ",
                &at(10, 0, 0),
            )
            .unwrap();
        assert_eq!(record.message, "dump");
        assert_eq!(record.json_part, "&lt;not json&gt; &amp; more");
        assert_eq!(record.code, 0);
        assert_eq!(record.file, "");
    }

    #[test]
    fn test_payload_type_mismatch_leaves_zero_values() {
        let line = r#"[2024-01-15 10:00:00] - ERROR~>{"json_code":"500","json_file":7,"json_line":12.9,"json_pid":-3}"#;
        let record = parser().parse_at(line, &at(10, 0, 0)).unwrap();
        assert_eq!(record.code, 0);
        assert_eq!(record.file, "");
        assert_eq!(record.line, 12);
        assert_eq!(record.pid, -3);
    }

    #[test]
    fn test_non_object_payload() {
        let record = parser()
            .parse_at("[2024-01-15 10:00:00] - ERROR~>[1,2]", &at(10, 0, 0))
            .unwrap();
        assert_eq!(record.json_part, "[\n  1,\n  2\n]");
        assert_eq!(record.code, 0);
    }

    #[test]
    fn test_payload_round_trip() {
        let payload = json!({
            "json_file": "src/Controller.php",
            "json_line": 118,
            "json_class": "App\\Controller",
            "json_function": "handle",
            "json_code": 9_000_000_000i64,
            "json_exceptionMessage": "Division by zero",
            "json_exception": "DivisionByZeroError",
            "json_log_context": "checkout",
            "json_pid": 4242,
            "json_app_version": "3.1.4",
            "json_request_uri": "/cart?id=1&x=<y>",
            "json_correlation_id": "c0ffee",
            "json_user_agent": "Mozilla/5.0 \"quoted\"",
        });
        let line = format!("[2024-01-15 10:00:00] - ERROR(app)]: boom~>{payload}");
        let record = parser().parse_at(&line, &at(10, 0, 0)).unwrap();

        assert_eq!(record.file, "src/Controller.php");
        assert_eq!(record.line, 118);
        assert_eq!(record.class, "App\\Controller");
        assert_eq!(record.function, "handle");
        assert_eq!(record.code, 9_000_000_000);
        assert_eq!(record.exception_message, "Division by zero");
        assert_eq!(record.exception, "DivisionByZeroError");
        assert_eq!(record.log_context, "checkout");
        assert_eq!(record.pid, 4242);
        assert_eq!(record.app_version, "3.1.4");
        assert_eq!(record.request_uri, "/cart?id=1&x=<y>");
        assert_eq!(record.correlation_id, "c0ffee");
        assert_eq!(record.user_agent, "Mozilla/5.0 \"quoted\"");

        // Only the display copy is escaped
        assert!(record.json_part.contains("&lt;y&gt;"));
        assert!(!record.json_part.contains('<'));
        assert!(!record.json_part.contains('"'));
    }

    #[test]
    fn test_payload_key_order_preserved() {
        let record = parser()
            .parse_at(r#"[t] - INFO~>{"z":1,"a":2}"#, &at(10, 0, 0))
            .unwrap();
        assert_eq!(record.json_part, "{\n  &#34;z&#34;: 1,\n  &#34;a&#34;: 2\n}");
    }

    #[test]
    fn test_payload_numbers_keep_their_spelling() {
        let record = parser()
            .parse_at(
                r#"[t] - INFO~>{"price":1.50,"id":123456789012345678901,"e":1e3}"#,
                &at(10, 0, 0),
            )
            .unwrap();
        assert_eq!(
            record.json_part,
            "{\n  &#34;price&#34;: 1.50,\n  &#34;id&#34;: 123456789012345678901,\n  &#34;e&#34;: 1e3\n}"
        );

        let record = parser()
            .parse_at(r#"[t] - INFO~>{"huge":1e400,"json_code":1e3}"#, &at(10, 0, 0))
            .unwrap();
        assert_eq!(
            record.json_part,
            "{\n  &#34;huge&#34;: 1e400,\n  &#34;json_code&#34;: 1e3\n}"
        );
        assert_eq!(record.code, 1000);
    }

    #[test]
    fn test_reparse_is_stable() {
        let line = r#"[2024-01-15T09:59:30Z] - Err(db)]: timeout ~> {"json_pid": 7}"#;
        let now = at(10, 0, 0);
        let first = parser().parse_at(line, &now).unwrap();
        let second = parser().parse_at(&first.raw_line, &now).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.level, "ERROR");
        assert_eq!(first.message, "timeout");
        assert_eq!(first.pid, 7);
        assert!(first.is_recent);
    }

    #[test]
    fn test_scenario_error_with_code() {
        let record = parser()
            .parse_at(
                r#"[2024-01-15 10:00:00] - ERROR~>{"json_code":500}"#,
                &at(10, 0, 0),
            )
            .unwrap();
        assert_eq!(record.level, "ERROR");
        assert_eq!(record.code, 500);
        assert!(record.is_recent);
    }

    #[test]
    fn test_highlight_disabled() {
        let record = LineParser::new(TimeDelta::zero())
            .parse_at("[2024-01-15 10:00:00] - INFO now", &at(10, 0, 0))
            .unwrap();
        assert!(!record.is_recent);
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<a href="x">'&'</a>"#),
            "&lt;a href=&#34;x&#34;&gt;&#39;&amp;&#39;&lt;/a&gt;"
        );
    }
}
