// ── Analysis report ──
//
// Flat snapshot of everything a bus has published, shaped for display.

use std::collections::BTreeMap;

use serde::Serialize;
use strum::IntoEnumIterator;

use crate::bus::NotificationBus;
use crate::data_type::DataType;
use crate::derive::PowerScore;
use crate::model::{CdnInfo, Datum, Integrations, PsiCategory, PsiLevel, PsiReport, TrafficTier};

/// One Lighthouse gauge.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PsiGauge {
    /// `mobile` or `desktop`.
    pub form_factor: &'static str,
    pub category: &'static str,
    /// 0-100.
    pub score: f64,
    pub level: PsiLevel,
}

impl PsiGauge {
    fn collect(form_factor: &'static str, report: &PsiReport) -> Vec<Self> {
        PsiCategory::iter()
            .filter_map(|category| {
                let score = (report.category_score(category)? * 100.0).round();
                Some(Self {
                    form_factor,
                    category: category.label(),
                    score,
                    level: PsiLevel::from_score(score),
                })
            })
            .collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisReport {
    pub origin: Option<String>,
    pub session_id: Option<String>,
    pub pages: Option<u64>,
    pub languages: Option<u64>,
    pub templates: Option<u32>,
    pub blocks: Option<f64>,
    pub integrations: Option<Integrations>,
    pub traffic_rank: Option<u64>,
    pub traffic_label: Option<String>,
    pub traffic_tier: Option<TrafficTier>,
    pub cdn: Option<CdnInfo>,
    /// Lighthouse mobile performance, `0.0..=1.0`.
    pub mobile_performance: Option<f64>,
    pub psi: Vec<PsiGauge>,
    pub code_complexity: Option<f64>,
    pub import_complexity: Option<f64>,
    pub site_complexity: Option<f64>,
    pub customer_complexity: Option<f64>,
    pub customer_urgency: Option<f64>,
    pub power_score: Option<PowerScore>,
    /// Failure message per data type that failed.
    pub errors: BTreeMap<DataType, String>,
}

impl AnalysisReport {
    /// Collect the latest outcome of every data type on `bus`.
    pub fn from_bus(bus: &NotificationBus) -> Self {
        let mut report = Self::default();
        let mut mobile = None;
        let mut desktop = None;

        for data_type in DataType::iter() {
            let datum = match bus.latest(data_type) {
                None => continue,
                Some(Err(error)) => {
                    report.errors.insert(data_type, error.message);
                    continue;
                }
                Some(Ok(datum)) => datum,
            };
            match (data_type, &*datum) {
                (DataType::Setup, Datum::Setup(setup)) => {
                    report.origin = Some(setup.origin.clone()).filter(|o| !o.is_empty());
                    report.session_id =
                        Some(setup.id.to_string()).filter(|id| !id.is_empty());
                }
                (DataType::Sitemap, Datum::Sitemap(sitemap)) => {
                    report.pages = Some(sitemap.num_pages);
                    report.languages = Some(sitemap.num_languages);
                }
                (DataType::Templates, Datum::Templates(analysis)) => {
                    report.templates = Some(analysis.templates.num_templates);
                }
                (DataType::Blocks, Datum::Blocks(blocks)) => {
                    report.blocks = Some(blocks.block_count);
                }
                (DataType::Integrations, Datum::Integrations(integrations)) => {
                    report.integrations = Some(*integrations);
                }
                (DataType::Traffic, Datum::Traffic(traffic)) => {
                    report.traffic_rank = traffic.popularity.number;
                    report.traffic_label = Some(traffic.popularity.rank.clone());
                    report.traffic_tier = Some(traffic.popularity.tier());
                }
                (DataType::Cdn, Datum::Cdn(cdn)) => report.cdn = Some(cdn.clone()),
                (DataType::PsiMobile, Datum::PsiReport(psi)) => mobile = Some(psi.clone()),
                (DataType::PsiDesktop, Datum::PsiReport(psi)) => desktop = Some(psi.clone()),
                (DataType::CodeComplexity, Datum::Score(v)) => report.code_complexity = Some(*v),
                (DataType::ImportComplexity, Datum::Score(v)) => {
                    report.import_complexity = Some(*v);
                }
                (DataType::SiteComplexity, Datum::Score(v)) => report.site_complexity = Some(*v),
                (DataType::CustomerComplexity, Datum::Score(v)) => {
                    report.customer_complexity = Some(*v);
                }
                (DataType::CustomerUrgency, Datum::Score(v)) => {
                    report.customer_urgency = Some(*v);
                }
                _ => {}
            }
        }

        if let Some(mobile) = &mobile {
            report.mobile_performance = mobile.performance_score();
            report.psi.extend(PsiGauge::collect("mobile", mobile));
        }
        if let Some(desktop) = &desktop {
            report.psi.extend(PsiGauge::collect("desktop", desktop));
        }

        if let (Some(code), Some(import), Some(site)) = (
            report.code_complexity,
            report.import_complexity,
            report.site_complexity,
        ) {
            report.power_score = Some(PowerScore::from_components(code, import, site));
        }
        report
    }

    /// `true` once all three complexity scores are known.
    pub fn is_complete(&self) -> bool {
        self.power_score.is_some()
    }
}
