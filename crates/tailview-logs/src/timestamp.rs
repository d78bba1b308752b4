use chrono::{DateTime, FixedOffset, NaiveDateTime, TimeDelta, TimeZone, Utc};

/// A timestamp layout accepted in the line prefix
struct Layout {
    format: &'static str,
    /// Layout ends in the `Z` designator, so a match is an instant in UTC
    utc_designator: bool,
}

/// Accepted layouts, first match wins
const LAYOUTS: [Layout; 5] = [
    Layout {
        format: "%Y/%m/%d %H:%M:%S",
        utc_designator: false,
    },
    Layout {
        format: "%Y-%m-%d %H:%M:%S",
        utc_designator: false,
    },
    Layout {
        format: "%Y-%m-%dT%H:%M:%S",
        utc_designator: false,
    },
    Layout {
        format: "%Y-%m-%dT%H:%M:%SZ",
        utc_designator: true,
    },
    Layout {
        format: "%Y-%m-%dT%H:%M:%S%.fZ",
        utc_designator: true,
    },
];

/// Parse a raw timestamp, treating zone-less layouts as wall-clock time in `local`.
///
/// Local layouts are tried first. Only when none of them match is every layout
/// retried as UTC; a `Z` match is then converted into `local`, any other match
/// stays in UTC.
pub fn parse_timestamp_in<Tz: TimeZone>(raw: &str, local: &Tz) -> Option<DateTime<FixedOffset>> {
    parse_as_local(raw, local).or_else(|| parse_as_utc(raw, local))
}

fn parse_as_local<Tz: TimeZone>(raw: &str, local: &Tz) -> Option<DateTime<FixedOffset>> {
    LAYOUTS
        .iter()
        .filter(|layout| !layout.utc_designator)
        .find_map(|layout| {
            let naive = NaiveDateTime::parse_from_str(raw, layout.format).ok()?;
            // Folded wall-clock times take the earlier instant; times skipped by
            // a DST gap do not exist locally and fall through to the UTC pass.
            local
                .from_local_datetime(&naive)
                .earliest()
                .map(|t| t.fixed_offset())
        })
}

fn parse_as_utc<Tz: TimeZone>(raw: &str, local: &Tz) -> Option<DateTime<FixedOffset>> {
    LAYOUTS.iter().find_map(|layout| {
        let naive = NaiveDateTime::parse_from_str(raw, layout.format).ok()?;
        let utc = Utc.from_utc_datetime(&naive);
        if layout.utc_designator {
            Some(utc.with_timezone(local).fixed_offset())
        } else {
            Some(utc.fixed_offset())
        }
    })
}

/// Whether `raw` names a time within `window` of `now`, in either direction.
///
/// The zone of `now` is the local zone used to read zone-less timestamps.
/// Unparsable timestamps and non-positive windows are never recent.
pub fn is_recent<Tz: TimeZone>(raw: &str, now: &DateTime<Tz>, window: TimeDelta) -> bool {
    if window <= TimeDelta::zero() {
        return false;
    }

    let Some(parsed) = parse_timestamp_in(raw, &now.timezone()) else {
        return false;
    };

    let mut distance = now.naive_utc() - parsed.naive_utc();
    if distance < TimeDelta::zero() {
        distance = -distance;
    }
    distance <= window
}
