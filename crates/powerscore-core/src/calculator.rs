// ── Calculator mode ──
//
// Seeds a bus with hand-entered site characteristics instead of running
// the backend analysis. The same derivation pipeline then computes the
// scores, so a calculator link reproduces an analysis.

use std::str::FromStr;

use url::form_urlencoded;

use crate::bus::NotificationBus;
use crate::data_type::DataType;
use crate::error::CoreError;
use crate::model::{
    BlockStats, CdnInfo, CdnProfile, Datum, Integrations, Popularity, PsiReport, PsiResult,
    RawTraffic, SessionId, SetupInfo, Sitemap, TemplateAnalysis, TemplateStats, Traffic,
};
use crate::report::AnalysisReport;

pub const DEFAULT_PAGES: u64 = 1;
pub const DEFAULT_LANGUAGES: u64 = 1;
pub const DEFAULT_LAYOUTS: u32 = 1;
pub const DEFAULT_BLOCKS: f64 = 1.0;
pub const DEFAULT_TRAFFIC_RANK: u64 = 5_000_000;
pub const DEFAULT_MOBILE_PERF: f64 = 0.5;
pub const DEFAULT_CUSTOMER_SLIDER: f64 = 50.0;

/// Calculator inputs. Unset fields fall back to the defaults above.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CalculatorParams {
    pub url: Option<String>,
    pub id: Option<String>,
    pub pages: Option<u64>,
    pub langs: Option<u64>,
    pub layouts: Option<u32>,
    pub blocks: Option<f64>,
    pub traffic_rank: Option<u64>,
    /// CDN id from the known table; unknown ids mean the unknown CDN.
    pub cdn: Option<String>,
    pub forms: bool,
    pub commerce: bool,
    pub authentication: bool,
    /// Lighthouse mobile performance, `0.0..=1.0`.
    pub mobile_perf: Option<f64>,
    pub customer_complexity: Option<f64>,
    pub customer_urgency: Option<f64>,
}

fn parse_value<T: FromStr>(name: &str, value: &str) -> Result<T, CoreError> {
    value.trim().parse().map_err(|_| CoreError::InvalidParameter {
        name: name.to_owned(),
        value: value.to_owned(),
    })
}

impl CalculatorParams {
    /// Parse a query string or URL fragment, with or without the
    /// leading `?`/`#`. Unknown keys are ignored.
    pub fn parse(query: &str) -> Result<Self, CoreError> {
        let query = query.trim_start_matches(['?', '#']);
        let mut params = Self::default();
        for (key, value) in form_urlencoded::parse(query.as_bytes()) {
            let value = value.as_ref();
            match key.as_ref() {
                "url" => params.url = Some(value.to_owned()),
                "id" => params.id = Some(value.to_owned()),
                "pages" => params.pages = Some(parse_value("pages", value)?),
                "langs" => params.langs = Some(parse_value("langs", value)?),
                "layouts" => params.layouts = Some(parse_value("layouts", value)?),
                "blocks" => params.blocks = Some(parse_value("blocks", value)?),
                "trafficRank" => params.traffic_rank = Some(parse_value("trafficRank", value)?),
                "cdn" => params.cdn = Some(value.to_owned()),
                "forms" => params.forms = value == "true",
                "commerce" => params.commerce = value == "true",
                "authentication" | "auth" => params.authentication = value == "true",
                "mobilePerf" => params.mobile_perf = Some(parse_value("mobilePerf", value)?),
                "customerComplexity" => {
                    params.customer_complexity = Some(parse_value("customerComplexity", value)?);
                }
                "customerUrgency" => {
                    params.customer_urgency = Some(parse_value("customerUrgency", value)?);
                }
                other => tracing::debug!(key = other, "ignoring calculator parameter"),
            }
        }
        Ok(params)
    }

    /// Calculator inputs that reproduce a finished analysis.
    pub fn from_results(report: &AnalysisReport) -> Self {
        Self {
            url: report.origin.clone(),
            id: report.session_id.clone(),
            pages: report.pages,
            langs: report.languages,
            layouts: report.templates,
            blocks: report.blocks,
            traffic_rank: report.traffic_rank,
            cdn: report.cdn.as_ref().map(|c| c.id.clone()),
            forms: report.integrations.is_some_and(|i| i.forms),
            commerce: report.integrations.is_some_and(|i| i.commerce),
            authentication: report.integrations.is_some_and(|i| i.authentication),
            mobile_perf: report.mobile_performance,
            customer_complexity: report.customer_complexity,
            customer_urgency: report.customer_urgency,
        }
    }

    /// Encode as a query string (no leading `?`), set fields only.
    pub fn to_query_string(&self) -> String {
        let mut out = form_urlencoded::Serializer::new(String::new());
        if let Some(url) = &self.url {
            out.append_pair("url", url);
        }
        if let Some(id) = &self.id {
            out.append_pair("id", id);
        }
        let numbers = [
            ("pages", self.pages.map(|v| v.to_string())),
            ("langs", self.langs.map(|v| v.to_string())),
            ("layouts", self.layouts.map(|v| v.to_string())),
            ("blocks", self.blocks.map(|v| v.to_string())),
            ("trafficRank", self.traffic_rank.map(|v| v.to_string())),
        ];
        for (key, value) in numbers {
            if let Some(value) = value {
                out.append_pair(key, &value);
            }
        }
        if let Some(cdn) = &self.cdn {
            out.append_pair("cdn", cdn);
        }
        out.append_pair("forms", &self.forms.to_string());
        out.append_pair("commerce", &self.commerce.to_string());
        out.append_pair("authentication", &self.authentication.to_string());
        let sliders = [
            ("mobilePerf", self.mobile_perf),
            ("customerComplexity", self.customer_complexity),
            ("customerUrgency", self.customer_urgency),
        ];
        for (key, value) in sliders {
            if let Some(value) = value {
                out.append_pair(key, &value.to_string());
            }
        }
        out.finish()
    }

    pub fn integrations(&self) -> Integrations {
        Integrations {
            commerce: self.commerce,
            authentication: self.authentication,
            forms: self.forms,
        }
    }

    pub fn cdn_info(&self) -> CdnInfo {
        self.cdn.as_deref().map_or_else(CdnInfo::unknown, |id| {
            CdnInfo::from_profile(&CdnProfile::by_id(id), None)
        })
    }
}

/// Publish calculator inputs as if an analysis had produced them.
pub fn provide_calculator_data(bus: &NotificationBus, params: &CalculatorParams) {
    let integrations = params.integrations();
    let blocks = params.blocks.unwrap_or(DEFAULT_BLOCKS);

    bus.provide(
        DataType::Setup,
        Datum::Setup(SetupInfo {
            origin: params.url.clone().unwrap_or_default(),
            id: SessionId::new(params.id.clone().unwrap_or_default()),
        }),
    );
    bus.provide(
        DataType::Sitemap,
        Datum::Sitemap(Sitemap {
            num_pages: params.pages.unwrap_or(DEFAULT_PAGES),
            num_languages: params.langs.unwrap_or(DEFAULT_LANGUAGES),
            sitemaps: Vec::new(),
        }),
    );
    bus.provide(
        DataType::Templates,
        Datum::Templates(TemplateAnalysis {
            templates: TemplateStats {
                num_templates: params.layouts.unwrap_or(DEFAULT_LAYOUTS),
            },
            integrations: Some(integrations),
            average_block_count: Some(blocks),
            ..TemplateAnalysis::default()
        }),
    );
    bus.provide(
        DataType::Blocks,
        Datum::Blocks(BlockStats {
            block_count: blocks,
        }),
    );
    bus.provide(
        DataType::Traffic,
        Datum::Traffic(Traffic {
            raw: RawTraffic::default(),
            popularity: Popularity::from_number(
                params.traffic_rank.unwrap_or(DEFAULT_TRAFFIC_RANK),
            ),
        }),
    );
    bus.provide(DataType::Cdn, Datum::Cdn(params.cdn_info()));
    bus.provide(DataType::Integrations, Datum::Integrations(integrations));
    bus.provide(
        DataType::Psi,
        Datum::Psi(PsiResult {
            mobile: PsiReport::with_performance(params.mobile_perf.unwrap_or(DEFAULT_MOBILE_PERF)),
            desktop: PsiReport::default(),
        }),
    );
    bus.provide(
        DataType::CustomerComplexity,
        Datum::Score(params.customer_complexity.unwrap_or(DEFAULT_CUSTOMER_SLIDER)),
    );
    bus.provide(
        DataType::CustomerUrgency,
        Datum::Score(params.customer_urgency.unwrap_or(DEFAULT_CUSTOMER_SLIDER)),
    );
}
