// ── Composite complexity scores ──
//
// Each score is a weighted average of 0-100 sub-scores. Weights and caps
// are fixed.

use serde::Serialize;

use crate::model::Integrations;

const TEMPLATE_POINTS: f64 = 3.0;
const SCORE_CAP: f64 = 100.0;
const PAGES_PER_POINT: f64 = 20.0;

const COMMERCE_POINTS: f64 = 50.0;
const AUTHENTICATION_POINTS: f64 = 30.0;
const FORMS_POINTS: f64 = 20.0;

pub fn template_score(num_templates: u32) -> f64 {
    (f64::from(num_templates) * TEMPLATE_POINTS).min(SCORE_CAP)
}

pub fn block_score(block_count: f64) -> f64 {
    block_count.min(SCORE_CAP)
}

pub fn integration_score(integrations: Integrations) -> f64 {
    let mut score = 0.0;
    if integrations.commerce {
        score += COMMERCE_POINTS;
    }
    if integrations.authentication {
        score += AUTHENTICATION_POINTS;
    }
    if integrations.forms {
        score += FORMS_POINTS;
    }
    score
}

#[allow(clippy::cast_precision_loss, clippy::as_conversions)]
pub fn pages_score(num_pages: u64) -> f64 {
    (num_pages as f64 / PAGES_PER_POINT).min(SCORE_CAP)
}

/// CDN sub-score; CDNs outside the scored set contribute nothing.
pub fn cdn_score(cdn_id: &str) -> f64 {
    match cdn_id {
        "akamai" => 30.0,
        "cloudfront" => 55.0,
        "azure" => 75.0,
        "wpengine" | "unknown" => 100.0,
        _ => 0.0,
    }
}

/// Traffic sub-score; busier sites (lower rank) score higher.
pub fn traffic_score(rank: Option<u64>) -> f64 {
    match rank {
        Some(n) if n < 100_000 => 90.0,
        Some(n) if n < 1_000_000 => 60.0,
        Some(n) if n < 5_000_000 => 40.0,
        Some(n) if n < 10_000_000 => 20.0,
        _ => 5.0,
    }
}

/// Mobile performance sub-score from a Lighthouse score in `0.0..=1.0`.
pub fn mobile_perf_score(performance: f64) -> f64 {
    100.0 - performance * 100.0
}

/// (templates×1 + blocks×2 + integrations×1) / 4
pub fn code_complexity(num_templates: u32, block_count: f64, integrations: Integrations) -> f64 {
    (template_score(num_templates) + block_score(block_count) * 2.0
        + integration_score(integrations))
        / 4.0
}

/// (pages×1 + templates×2) / 3
pub fn import_complexity(num_pages: u64, num_templates: u32) -> f64 {
    (pages_score(num_pages) + template_score(num_templates) * 2.0) / 3.0
}

/// (traffic×2 + mobile performance×3 + cdn×1) / 6
pub fn site_complexity(rank: Option<u64>, mobile_performance: f64, cdn_id: &str) -> f64 {
    (traffic_score(rank) * 2.0 + mobile_perf_score(mobile_performance) * 3.0 + cdn_score(cdn_id))
        / 6.0
}

/// Headline score shown for a finished analysis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PowerScore {
    pub code_complexity: f64,
    pub import_complexity: f64,
    pub site_complexity: f64,
    /// Mean of the three components, rounded.
    pub overall: f64,
    /// Each component's share of a 360° pie, in component order.
    pub slices: [f64; 3],
}

impl PowerScore {
    pub fn from_components(code: f64, import: f64, site: f64) -> Self {
        let total = code + import + site;
        let slices = if total > 0.0 {
            [code, import, site].map(|part| part / total * 360.0)
        } else {
            [0.0; 3]
        };
        Self {
            code_complexity: code,
            import_complexity: import,
            site_complexity: site,
            overall: (total / 3.0).round(),
            slices,
        }
    }
}
