use serde::{Deserialize, Deserializer, Serialize};

use crate::models::Interval;

/// The symbols and interval a single fetch cycle runs against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Selection {
    pub symbols: Vec<String>,
    pub interval: Interval,
}

impl Selection {
    /// Trims and uppercases symbols, dropping blanks and repeats while
    /// keeping the order the user picked them in.
    pub fn new<I, S>(symbols: I, interval: Interval) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut normalized: Vec<String> = Vec::new();
        for symbol in symbols {
            let symbol = symbol.as_ref().trim().to_ascii_uppercase();
            if !symbol.is_empty() && !normalized.contains(&symbol) {
                normalized.push(symbol);
            }
        }
        Self {
            symbols: normalized,
            interval,
        }
    }

    /// Parses a comma separated list such as `"PFE, lly"`.
    pub fn from_csv(symbols: &str, interval: Interval) -> Self {
        Self::new(symbols.split(','), interval)
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}

impl<'de> Deserialize<'de> for Selection {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct Body {
            #[serde(default)]
            symbols: Vec<String>,
            #[serde(default)]
            interval: Interval,
        }

        let body = Body::deserialize(deserializer)?;
        Ok(Selection::new(body.symbols, body.interval))
    }
}
