// ── Typed data model ──
//
// Every payload published on the bus, plus the `Datum` sum type that
// carries them. Payload structs mirror the JSON bodies the analysis
// backend returns; unknown fields are preserved where the backend is
// known to add them.

pub mod cdn;
pub mod psi;
pub mod site;
pub mod templates;
pub mod traffic;

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::data_type::DataType;
use crate::error::DataError;

pub use cdn::{CDN_TABLE, CdnInfo, CdnProfile, DnsPayload, DnsRecord, UNKNOWN_CDN};
pub use psi::{CategoryScore, LighthouseResult, PsiCategory, PsiLevel, PsiReport, PsiResult};
pub use site::{SessionId, SetupInfo, Sitemap, SitemapPage};
pub use templates::{BlockStats, DEFAULT_BLOCK_COUNT, Integrations, TemplateAnalysis, TemplateStats};
pub use traffic::{
    FormFactors, Popularity, RawTraffic, Traffic, TrafficSource, TrafficTier, UNKNOWN_RANK,
};

/// A value published on the bus.
#[derive(Debug, Clone, PartialEq, Serialize, strum::IntoStaticStr)]
#[serde(untagged)]
pub enum Datum {
    Setup(SetupInfo),
    Sitemap(Sitemap),
    Templates(TemplateAnalysis),
    RawTraffic(RawTraffic),
    Traffic(Traffic),
    Dns(DnsRecord),
    Cdn(CdnInfo),
    Psi(PsiResult),
    PsiReport(PsiReport),
    SampledUrls(Vec<String>),
    Blocks(BlockStats),
    Integrations(Integrations),
    /// Complexity scores and customer sliders, 0-100.
    Score(f64),
}

/// A slot held a different variant than the consumer expected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("expected {expected} data, found {found}")]
pub struct DatumMismatch {
    pub expected: &'static str,
    pub found: &'static str,
}

impl DatumMismatch {
    /// Attach the data type being derived.
    pub fn into_data_error(self, data_type: DataType) -> DataError {
        DataError::derivation(data_type, self.to_string())
    }
}

macro_rules! accessor {
    ($name:ident, $variant:ident, $ty:ty) => {
        pub fn $name(&self) -> Result<&$ty, DatumMismatch> {
            match self {
                Self::$variant(inner) => Ok(inner),
                other => Err(DatumMismatch {
                    expected: stringify!($variant),
                    found: other.into(),
                }),
            }
        }
    };
}

impl Datum {
    accessor!(setup, Setup, SetupInfo);
    accessor!(sitemap, Sitemap, Sitemap);
    accessor!(templates, Templates, TemplateAnalysis);
    accessor!(raw_traffic, RawTraffic, RawTraffic);
    accessor!(traffic, Traffic, Traffic);
    accessor!(dns, Dns, DnsRecord);
    accessor!(cdn, Cdn, CdnInfo);
    accessor!(psi, Psi, PsiResult);
    accessor!(psi_report, PsiReport, PsiReport);
    accessor!(sampled_urls, SampledUrls, Vec<String>);
    accessor!(blocks, Blocks, BlockStats);
    accessor!(integrations, Integrations, Integrations);

    pub fn score(&self) -> Result<f64, DatumMismatch> {
        match self {
            Self::Score(v) => Ok(*v),
            other => Err(DatumMismatch {
                expected: "Score",
                found: other.into(),
            }),
        }
    }

    /// Decode a backend JSON body into the payload `data_type` carries.
    pub fn decode(data_type: DataType, value: Value) -> Result<Self, DataError> {
        fn parse<T: serde::de::DeserializeOwned>(
            data_type: DataType,
            value: Value,
        ) -> Result<T, DataError> {
            serde_json::from_value(value).map_err(|e| {
                DataError::derivation(data_type, format!("malformed {data_type} payload: {e}"))
            })
        }

        Ok(match data_type {
            DataType::Setup => Self::Setup(parse(data_type, value)?),
            DataType::Sitemap => Self::Sitemap(parse(data_type, value)?),
            DataType::Templates => Self::Templates(parse(data_type, value)?),
            DataType::RawTraffic => Self::RawTraffic(parse(data_type, value)?),
            DataType::Traffic => Self::Traffic(parse(data_type, value)?),
            DataType::Dns => Self::Dns(parse(data_type, value)?),
            DataType::Cdn => Self::Cdn(parse(data_type, value)?),
            DataType::Psi => Self::Psi(parse(data_type, value)?),
            DataType::PsiMobile | DataType::PsiDesktop => {
                Self::PsiReport(parse(data_type, value)?)
            }
            DataType::SampledUrls => Self::SampledUrls(parse(data_type, value)?),
            DataType::Blocks => Self::Blocks(parse(data_type, value)?),
            DataType::Integrations => Self::Integrations(parse(data_type, value)?),
            DataType::CodeComplexity
            | DataType::ImportComplexity
            | DataType::SiteComplexity
            | DataType::CustomerComplexity
            | DataType::CustomerUrgency => Self::Score(parse(data_type, value)?),
        })
    }
}
