// ── DNS and CDN ──

use serde::{Deserialize, Serialize};

/// DNS lookup result for the analyzed origin.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DnsRecord {
    #[serde(default)]
    pub payload: DnsPayload,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DnsPayload {
    #[serde(default)]
    pub cname: String,
}

/// Static description of a known CDN.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CdnProfile {
    pub id: &'static str,
    pub icon: &'static str,
    /// Dot-separated label runs identifying this CDN in a CNAME.
    pub cnames: &'static [&'static str],
    pub label: &'static str,
}

/// Known CDNs in match priority order.
pub const CDN_TABLE: [CdnProfile; 7] = [
    CdnProfile {
        id: "akamai",
        icon: "akamai",
        cnames: &["edgekey.net", "edgesuite.net"],
        label: "Akamai",
    },
    CdnProfile {
        id: "cloudfront",
        icon: "cloudfront",
        cnames: &["cloudfront.net"],
        label: "AWS Cloudfront",
    },
    CdnProfile {
        id: "azure",
        icon: "azure-cdn",
        cnames: &["azureedge.net"],
        label: "Azure Edge",
    },
    CdnProfile {
        id: "wpengine",
        icon: "wpengine",
        cnames: &["wpeproxy.com"],
        label: "WordPress Engine",
    },
    CdnProfile {
        id: "adobe",
        icon: "adobe",
        cnames: &["adobeaemcloud.com", "hlxcdn"],
        label: "Adobe",
    },
    CdnProfile {
        id: "fastly",
        icon: "fastly",
        cnames: &["fastly"],
        label: "Fastly",
    },
    CdnProfile {
        id: "cloudflare",
        icon: "cloudflare",
        cnames: &["cloudflare.com"],
        label: "Cloudflare",
    },
];

/// Sentinel for a CNAME no known CDN matches.
pub const UNKNOWN_CDN: CdnProfile = CdnProfile {
    id: "unknown",
    icon: "question",
    cnames: &[],
    label: "Unknown",
};

impl CdnProfile {
    /// Look up a profile by id; unrecognized ids resolve to [`UNKNOWN_CDN`].
    pub fn by_id(id: &str) -> Self {
        CDN_TABLE
            .iter()
            .find(|p| p.id == id)
            .copied()
            .unwrap_or(UNKNOWN_CDN)
    }

    /// Whether a signature occurs in `cname` on label boundaries, so
    /// `fastly` matches `global.fastly.net` but not `fastly-edge.com`.
    pub fn matches(&self, cname: &str) -> bool {
        let cname = cname.trim_end_matches('.').to_ascii_lowercase();
        self.cnames.iter().any(|sig| label_aligned(&cname, sig))
    }
}

fn label_aligned(cname: &str, signature: &str) -> bool {
    cname.match_indices(signature).any(|(start, _)| {
        let end = start + signature.len();
        (start == 0 || cname[..start].ends_with('.'))
            && (end == cname.len() || cname[end..].starts_with('.'))
    })
}

/// CDN published on the bus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CdnInfo {
    pub id: String,
    pub icon: String,
    pub cnames: Vec<String>,
    pub label: String,
    /// The CNAME the CDN was inferred from, absent when chosen manually.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cname: Option<String>,
}

impl CdnInfo {
    pub fn from_profile(profile: &CdnProfile, cname: Option<String>) -> Self {
        Self {
            id: profile.id.into(),
            icon: profile.icon.into(),
            cnames: profile.cnames.iter().map(|c| (*c).to_owned()).collect(),
            label: profile.label.into(),
            cname,
        }
    }

    pub fn unknown() -> Self {
        Self::from_profile(&UNKNOWN_CDN, None)
    }

    pub fn is_unknown(&self) -> bool {
        self.id == UNKNOWN_CDN.id
    }
}
