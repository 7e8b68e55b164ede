// ── Template analysis ──

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Block count assumed when the template crawl could not measure one.
pub const DEFAULT_BLOCK_COUNT: f64 = 27.0;

/// Third-party integrations detected on the site.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Integrations {
    #[serde(default)]
    pub commerce: bool,
    #[serde(default)]
    pub authentication: bool,
    #[serde(default)]
    pub forms: bool,
}

impl Integrations {
    /// Number of enabled integrations.
    pub fn enabled_count(self) -> usize {
        [self.commerce, self.authentication, self.forms]
            .into_iter()
            .filter(|enabled| *enabled)
            .count()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateStats {
    #[serde(default)]
    pub num_templates: u32,
}

/// Result of the `get-templates` action over the sampled URLs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateAnalysis {
    #[serde(default)]
    pub templates: TemplateStats,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub integrations: Option<Integrations>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub average_block_count: Option<f64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Average number of blocks per template.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockStats {
    pub block_count: f64,
}

impl BlockStats {
    pub fn from_analysis(analysis: &TemplateAnalysis) -> Self {
        Self {
            block_count: analysis.average_block_count.unwrap_or(DEFAULT_BLOCK_COUNT),
        }
    }
}
