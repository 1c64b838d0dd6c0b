//! Turns upstream bar timestamps into x-axis labels.
//!
//! Timestamps are rendered as delivered (exchange-local time); no timezone
//! conversion happens here. Anything that does not parse is shown verbatim.

use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelStyle {
    /// `14:30` or `02:30 PM`
    TimeOfDay,
    /// `Feb 7`
    MonthDay,
    /// `Feb 2025`
    MonthYear,
    /// `2025`. No [`Interval`](crate::models::Interval) selects this today
    /// because Twelve Data has no yearly bar size.
    Year,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ClockStyle {
    #[default]
    #[serde(rename = "12h")]
    TwelveHour,
    #[serde(rename = "24h")]
    TwentyFourHour,
}

impl FromStr for ClockStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "12h" | "12" => Ok(ClockStyle::TwelveHour),
            "24h" | "24" => Ok(ClockStyle::TwentyFourHour),
            other => Err(format!("Invalid clock style '{}'. Must be '12h' or '24h'", other)),
        }
    }
}

const DATETIME_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M:%S"];

fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .map(|d| d.and_time(NaiveTime::MIN))
        })
}

pub fn format_label(raw: &str, style: LabelStyle, clock: ClockStyle) -> String {
    let Some(ts) = parse_timestamp(raw) else {
        return raw.to_string();
    };

    let pattern = match (style, clock) {
        (LabelStyle::TimeOfDay, ClockStyle::TwentyFourHour) => "%H:%M",
        (LabelStyle::TimeOfDay, ClockStyle::TwelveHour) => "%I:%M %p",
        (LabelStyle::MonthDay, _) => "%b %-d",
        (LabelStyle::MonthYear, _) => "%b %Y",
        (LabelStyle::Year, _) => "%Y",
    };

    ts.format(pattern).to_string()
}
