use std::fmt::{Display, Write};

use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Local, TimeZone};
use chrono_tz::Tz;

pub const FALLBACK_FORMAT: &str = "%H:%M:%S";

/// Zone a clock renders in. `Local` follows the browser's own offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClockZone {
    #[default]
    Local,
    Named(Tz),
}

impl ClockZone {
    pub fn format<Z: TimeZone>(&self, instant: &DateTime<Z>, format: &str) -> String {
        match self {
            ClockZone::Local => format_clock(&instant.with_timezone(&Local), format),
            ClockZone::Named(tz) => format_clock(&instant.with_timezone(tz), format),
        }
    }
}

pub fn is_valid_format(format: &str) -> bool {
    !StrftimeItems::new(format).any(|item| matches!(item, Item::Error))
}

/// Formats `time`, falling back to `HH:MM:SS` if `format` cannot be rendered.
pub fn format_clock<Z>(time: &DateTime<Z>, format: &str) -> String
where
    Z: TimeZone,
    Z::Offset: Display,
{
    let mut out = String::new();
    if write!(out, "{}", time.format(format)).is_ok() {
        return out;
    }
    time.format(FALLBACK_FORMAT).to_string()
}
