//! Clock abstraction and build timestamp formatting

use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, NaiveDateTime, SecondsFormat, TimeZone, Utc};
use std::fmt::Write;

/// Primary timestamp pattern: `YYYY-MM-DD HH:MM:SS <timezone-label>`
pub const DEFAULT_FORMAT: &str = "%Y-%m-%d %H:%M:%S %Z";

/// Timezone label chrono renders for `%Z` on a UTC timestamp
pub const UTC_LABEL: &str = "UTC";

/// Source of the current wall-clock time
pub trait Clock {
    /// Current instant, normalized to UTC
    fn now(&self) -> DateTime<Utc>;
}

/// Reads the system clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        now()
    }
}

/// Always returns the same instant
///
/// Used by tests and by callers that want a pinned build time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub DateTime<Utc>);

impl FixedClock {
    /// Pin the clock to the given Unix timestamp (seconds)
    pub fn from_unix(secs: i64) -> Option<Self> {
        Utc.timestamp_opt(secs, 0).single().map(Self)
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Get current UTC timestamp
pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Render `instant` with a strftime pattern.
///
/// Returns an empty string when the pattern renders nothing or contains an
/// item chrono cannot format; callers treat both the same way.
pub fn format_with(instant: &DateTime<Utc>, pattern: &str) -> String {
    let mut out = String::new();
    if write!(out, "{}", instant.format_with_items(StrftimeItems::new(pattern))).is_err() {
        out.clear();
    }
    out
}

/// ISO 8601 representation with second precision and explicit `+00:00` offset
pub fn iso8601(instant: &DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Secs, false)
}

/// Format with the primary pattern, falling back to ISO 8601 when the
/// result is blank (empty, whitespace or control characters only). The
/// fallback is one-shot, never retried.
pub fn format_or_iso8601(instant: &DateTime<Utc>, pattern: &str) -> String {
    let formatted = format_with(instant, pattern);
    if is_blank(&formatted) {
        tracing::warn!(
            "Timestamp pattern {:?} rendered blank, falling back to ISO 8601",
            pattern
        );
        iso8601(instant)
    } else {
        formatted
    }
}

fn is_blank(text: &str) -> bool {
    text.chars().all(|c| c.is_whitespace() || c.is_control())
}

/// Check that every item in a strftime pattern is one chrono understands
pub fn is_valid_pattern(pattern: &str) -> bool {
    !StrftimeItems::new(pattern).any(|item| matches!(item, Item::Error))
}

/// Parse a string produced by [`DEFAULT_FORMAT`]
pub fn parse_default_format(text: &str) -> Option<DateTime<Utc>> {
    let naive_part = text.strip_suffix(UTC_LABEL)?.trim_end();
    NaiveDateTime::parse_from_str(naive_part, "%Y-%m-%d %H:%M:%S")
        .ok()
        .map(|naive| naive.and_utc())
}
