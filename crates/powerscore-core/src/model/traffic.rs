// ── Traffic ──

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Rank label used when the popularity rank is missing or unparseable.
pub const UNKNOWN_RANK: &str = "Unknown";

/// Mobile/desktop split as reported by the traffic provider.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FormFactors {
    #[serde(rename = "Mobile", default)]
    pub mobile: Value,
    #[serde(rename = "Desktop", default)]
    pub desktop: Value,
}

/// Attribution for the traffic numbers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrafficSource {
    pub url: String,
    pub label: String,
}

/// Traffic data exactly as the `get-traffic` action returns it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawTraffic {
    /// Human rank such as `"Top 1,000"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub popularity_rank: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub form_factors: Option<FormFactors>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<TrafficSource>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Parsed popularity rank.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Popularity {
    /// Display label; [`UNKNOWN_RANK`] when `number` is `None`.
    pub rank: String,
    /// Numeric rank, `None` when the label carried no number.
    pub number: Option<u64>,
}

impl Popularity {
    pub fn unknown() -> Self {
        Self {
            rank: UNKNOWN_RANK.into(),
            number: None,
        }
    }

    /// A rank given only as a number, labelled `Top 1,000` style.
    pub fn from_number(number: u64) -> Self {
        Self {
            rank: format!("Top {}", group_thousands(number)),
            number: Some(number),
        }
    }

    pub fn tier(&self) -> TrafficTier {
        TrafficTier::from_rank(self.number)
    }
}

/// Normalized traffic: the raw data plus a parsed popularity rank.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Traffic {
    #[serde(flatten)]
    pub raw: RawTraffic,
    pub popularity: Popularity,
}

/// Coarse traffic bucket used for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum::Display)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum TrafficTier {
    HighTraffic,
    MedTraffic,
    LowTraffic,
}

impl TrafficTier {
    pub fn from_rank(rank: Option<u64>) -> Self {
        match rank {
            Some(n) if n < 100_000 => Self::HighTraffic,
            Some(n) if n < 5_000_000 => Self::MedTraffic,
            _ => Self::LowTraffic,
        }
    }
}

fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
