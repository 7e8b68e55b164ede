// ── Traffic normalization ──

use crate::model::{Popularity, RawTraffic, Traffic};

/// Parse a human rank such as `"Top 1,234,567"`.
///
/// Anything without a leading number after dropping `top` and commas
/// becomes the `Unknown` rank with no numeric value.
pub fn parse_popularity_rank(rank: &str) -> Popularity {
    let cleaned = rank.to_lowercase().replacen("top", "", 1).replace(',', "");
    let cleaned = cleaned.trim();
    let digits_end = cleaned
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(cleaned.len());

    match cleaned[..digits_end].parse::<u64>() {
        Ok(number) => Popularity {
            rank: rank.to_owned(),
            number: Some(number),
        },
        Err(_) => Popularity::unknown(),
    }
}

pub fn normalize_traffic(raw: &RawTraffic) -> Traffic {
    let popularity = raw
        .popularity_rank
        .as_deref()
        .map_or_else(Popularity::unknown, parse_popularity_rank);
    Traffic {
        raw: raw.clone(),
        popularity,
    }
}
