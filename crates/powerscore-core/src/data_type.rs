// ── Data type registry ──
//
// The closed set of data categories that flow through the bus. Wire
// names are kebab-case and double as the suffix of server-side result
// file names.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumCount, EnumIter, EnumString, IntoStaticStr};

/// One category of data published on the [`NotificationBus`](crate::NotificationBus).
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    EnumCount,
    AsRefStr,
    IntoStaticStr,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum DataType {
    // ── Base data (remote providers) ─────────────────────────────────
    Setup,
    Sitemap,
    Templates,
    RawTraffic,
    Dns,
    Psi,

    // ── Derived data (pipeline) ──────────────────────────────────────
    Traffic,
    Cdn,
    PsiMobile,
    PsiDesktop,
    SampledUrls,
    Blocks,
    Integrations,
    CodeComplexity,
    ImportComplexity,
    SiteComplexity,

    // ── Calculator inputs ────────────────────────────────────────────
    CustomerComplexity,
    CustomerUrgency,
}

impl DataType {
    /// Name of the result file a long-running action writes for this type.
    pub fn result_file_name(self, session_id: &str) -> String {
        format!("{session_id}__{}.json", self.as_ref())
    }

    /// `true` for types produced by the derivation pipeline.
    pub fn is_derived(self) -> bool {
        matches!(
            self,
            Self::Traffic
                | Self::Cdn
                | Self::PsiMobile
                | Self::PsiDesktop
                | Self::SampledUrls
                | Self::Blocks
                | Self::Integrations
                | Self::CodeComplexity
                | Self::ImportComplexity
                | Self::SiteComplexity
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn wire_names_are_kebab_case() {
        assert_eq!(DataType::RawTraffic.to_string(), "raw-traffic");
        assert_eq!(DataType::PsiMobile.as_ref(), "psi-mobile");
        assert_eq!(
            "site-complexity".parse::<DataType>().unwrap(),
            DataType::SiteComplexity
        );
    }

    #[test]
    fn serde_matches_strum() {
        for dt in DataType::iter() {
            let json = serde_json::to_string(&dt).unwrap();
            assert_eq!(json, format!("\"{dt}\""));
        }
    }

    #[test]
    fn result_file_name_uses_wire_name() {
        assert_eq!(DataType::Psi.result_file_name("abc"), "abc__psi.json");
        assert_eq!(
            DataType::Sitemap.result_file_name("42"),
            "42__sitemap.json"
        );
    }

    #[test]
    fn registry_is_closed() {
        assert_eq!(DataType::COUNT, 18);
        assert_eq!(DataType::iter().filter(|d| d.is_derived()).count(), 10);
    }
}
