use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::services::labels::LabelStyle;

/// Sampling granularity of a chart, one per user selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Interval {
    #[serde(alias = "1h")]
    Intraday,
    #[default]
    #[serde(alias = "1day")]
    Daily,
    #[serde(alias = "1week")]
    Weekly,
    #[serde(alias = "1month")]
    Monthly,
}

impl Interval {
    pub const ALL: [Interval; 4] = [
        Interval::Intraday,
        Interval::Daily,
        Interval::Weekly,
        Interval::Monthly,
    ];

    /// The `interval` query token understood by Twelve Data.
    pub fn upstream_token(self) -> &'static str {
        match self {
            Interval::Intraday => "1h",
            Interval::Daily => "1day",
            Interval::Weekly => "1week",
            Interval::Monthly => "1month",
        }
    }

    pub fn label_style(self) -> LabelStyle {
        match self {
            Interval::Intraday => LabelStyle::TimeOfDay,
            Interval::Daily | Interval::Weekly => LabelStyle::MonthDay,
            Interval::Monthly => LabelStyle::MonthYear,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Interval::Intraday => "intraday",
            Interval::Daily => "daily",
            Interval::Weekly => "weekly",
            Interval::Monthly => "monthly",
        }
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Interval {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Interval::ALL
            .into_iter()
            .find(|i| i.as_str() == wanted || i.upstream_token() == wanted)
            .ok_or_else(|| {
                format!(
                    "Unknown interval '{}'. Must be one of: intraday, daily, weekly, monthly",
                    s
                )
            })
    }
}
