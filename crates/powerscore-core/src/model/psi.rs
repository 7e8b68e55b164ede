// ── PageSpeed Insights ──

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Lighthouse categories shown for a PSI report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display, strum::EnumIter, strum::AsRefStr)]
#[strum(serialize_all = "kebab-case")]
pub enum PsiCategory {
    Performance,
    Accessibility,
    BestPractices,
    Seo,
}

impl PsiCategory {
    /// Human label, e.g. `Best Practices`.
    pub fn label(self) -> &'static str {
        match self {
            Self::Performance => "Performance",
            Self::Accessibility => "Accessibility",
            Self::BestPractices => "Best Practices",
            Self::Seo => "SEO",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoryScore {
    /// Score in `0.0..=1.0`; Lighthouse reports `null` for errored audits.
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LighthouseResult {
    #[serde(default)]
    pub categories: BTreeMap<String, CategoryScore>,
}

/// One PSI run (mobile or desktop).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PsiReport {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lighthouse_result: Option<LighthouseResult>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl PsiReport {
    /// A report carrying only a performance score, as the calculator seeds it.
    pub fn with_performance(score: f64) -> Self {
        let mut categories = BTreeMap::new();
        categories.insert(
            PsiCategory::Performance.as_ref().to_owned(),
            CategoryScore {
                score: Some(score),
                extra: Map::new(),
            },
        );
        Self {
            lighthouse_result: Some(LighthouseResult { categories }),
            extra: Map::new(),
        }
    }

    /// Raw `0.0..=1.0` score for a category.
    pub fn category_score(&self, category: PsiCategory) -> Option<f64> {
        self.lighthouse_result
            .as_ref()?
            .categories
            .get(category.as_ref())?
            .score
    }

    pub fn performance_score(&self) -> Option<f64> {
        self.category_score(PsiCategory::Performance)
    }
}

/// Combined result of the `psi` action.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PsiResult {
    #[serde(default)]
    pub mobile: PsiReport,
    #[serde(default)]
    pub desktop: PsiReport,
}

/// PSI gauge bucket for a 0-100 score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum PsiLevel {
    Good,
    Improve,
    Poor,
}

impl PsiLevel {
    pub fn from_score(score: f64) -> Self {
        if score < 50.0 {
            Self::Poor
        } else if score < 90.0 {
            Self::Improve
        } else {
            Self::Good
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn reads_category_scores() {
        let psi: PsiResult = serde_json::from_value(json!({
            "mobile": { "lighthouseResult": { "categories": {
                "performance": { "score": 0.42, "title": "Performance" },
                "best-practices": { "score": 0.96 },
                "seo": { "score": null }
            }}},
            "desktop": {}
        }))
        .unwrap();
        assert_eq!(psi.mobile.performance_score(), Some(0.42));
        assert_eq!(psi.mobile.category_score(PsiCategory::BestPractices), Some(0.96));
        assert_eq!(psi.mobile.category_score(PsiCategory::Seo), None);
        assert_eq!(psi.desktop.performance_score(), None);
    }

    #[test]
    fn calculator_report_has_only_performance() {
        let report = PsiReport::with_performance(0.5);
        assert_eq!(report.performance_score(), Some(0.5));
        assert_eq!(report.category_score(PsiCategory::Accessibility), None);
    }

    #[test]
    fn levels_follow_gauge_thresholds() {
        assert_eq!(PsiLevel::from_score(95.0), PsiLevel::Good);
        assert_eq!(PsiLevel::from_score(90.0), PsiLevel::Good);
        assert_eq!(PsiLevel::from_score(89.0), PsiLevel::Improve);
        assert_eq!(PsiLevel::from_score(50.0), PsiLevel::Improve);
        assert_eq!(PsiLevel::from_score(49.0), PsiLevel::Poor);
    }
}
