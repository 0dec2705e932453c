//! Decoding of injected build stamps
//!
//! The consuming side of the injector. A build stamp arrives either as the
//! formatted date string the injector writes, as an ISO 8601 string (the
//! fallback), or as a bare integer epoch some build setups define instead.
//! When no stamp was injected at all, callers supply their own fallback.

use crate::time::{iso8601, parse_default_format, DEFAULT_FORMAT};
use crate::{Error, Result};
use chrono::{DateTime, TimeZone, Utc};
use std::fmt;

/// Decoded build stamp value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildStamp {
    /// Date string in the primary format or ISO 8601
    Formatted(DateTime<Utc>),
    /// Integer seconds since the Unix epoch
    Epoch(DateTime<Utc>),
    /// Non-empty text that is neither
    Raw(String),
}

impl BuildStamp {
    /// Interpret a define value
    pub fn decode(value: &str) -> Result<Self> {
        let value = value.trim();
        if value.is_empty() {
            return Err(Error::InvalidInput("empty build stamp".to_string()));
        }

        if let Ok(secs) = value.parse::<i64>() {
            return Utc
                .timestamp_opt(secs, 0)
                .single()
                .map(BuildStamp::Epoch)
                .ok_or_else(|| Error::InvalidInput(format!("epoch {} out of range", secs)));
        }

        if let Some(instant) = parse_default_format(value) {
            return Ok(BuildStamp::Formatted(instant));
        }

        if let Ok(instant) = DateTime::parse_from_rfc3339(value) {
            return Ok(BuildStamp::Formatted(instant.with_timezone(&Utc)));
        }

        Ok(BuildStamp::Raw(value.to_string()))
    }

    /// Instant the stamp denotes, if it is a recognized date
    pub fn instant(&self) -> Option<DateTime<Utc>> {
        match self {
            BuildStamp::Formatted(instant) | BuildStamp::Epoch(instant) => Some(*instant),
            BuildStamp::Raw(_) => None,
        }
    }
}

impl fmt::Display for BuildStamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuildStamp::Formatted(instant) => write!(f, "{}", instant.format(DEFAULT_FORMAT)),
            BuildStamp::Epoch(instant) => write!(
                f,
                "{} (epoch {})",
                instant.format(DEFAULT_FORMAT),
                instant.timestamp()
            ),
            BuildStamp::Raw(text) => f.write_str(text),
        }
    }
}

/// Build identification recovered from a compiler flag list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildInfo {
    pub stamp: BuildStamp,
    /// `false` when the stamp came from the fallback
    pub injected: bool,
}

impl BuildInfo {
    /// Decode the last `-D<name>=...` in `flags`, or use `fallback` if none
    pub fn from_flags<F>(flags: &[String], name: &str, fallback: F) -> Result<Self>
    where
        F: FnOnce() -> BuildStamp,
    {
        match flags.iter().rev().find_map(|flag| parse_define(flag, name)) {
            Some(value) => Ok(Self {
                stamp: BuildStamp::decode(&value)?,
                injected: true,
            }),
            None => Ok(Self {
                stamp: fallback(),
                injected: false,
            }),
        }
    }

    /// One-line human-readable description
    pub fn summary(&self) -> String {
        let mut line = format!("built {}", self.stamp);
        if let Some(instant) = self.stamp.instant() {
            line.push_str(&format!(" [{}]", iso8601(&instant)));
        }
        if !self.injected {
            line.push_str(" (no build stamp injected)");
        }
        line
    }
}

/// Extract the value of `-D<name>="<value>"` or `-D<name>=<value>`
pub fn parse_define(flag: &str, name: &str) -> Option<String> {
    let value = flag.strip_prefix("-D")?.strip_prefix(name)?.strip_prefix('=')?;

    match value.strip_prefix('"').and_then(|v| v.strip_suffix('"')) {
        Some(quoted) => Some(unescape_define_value(quoted)),
        None => Some(value.to_string()),
    }
}

/// Reverse of [`crate::inject::escape_define_value`]
pub fn unescape_define_value(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(next) = chars.next() {
                out.push(next);
                continue;
            }
        }
        out.push(c);
    }
    out
}
