// ── Site setup and sitemap ──

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// Identifier the backend assigns to one analysis run.
///
/// The setup action has answered with both `"id": "abc"` and
/// `"id": { "value": "abc" }`; both decode to the same value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for SessionId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Plain(String),
            Number(u64),
            Wrapped { value: String },
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Plain(s) | Raw::Wrapped { value: s } => Self(s),
            Raw::Number(n) => Self(n.to_string()),
        })
    }
}

/// Result of the `setup` action: which site is analyzed under which id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetupInfo {
    pub origin: String,
    pub id: SessionId,
}

/// One page entry in a crawled sitemap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SitemapPage {
    pub page: String,
}

/// Crawled sitemap summary.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Sitemap {
    #[serde(default)]
    pub num_pages: u64,
    #[serde(default)]
    pub num_languages: u64,
    /// One list of pages per discovered sitemap document.
    #[serde(default)]
    pub sitemaps: Vec<Vec<SitemapPage>>,
}

impl Sitemap {
    /// Every page URL across all sitemaps, in document order.
    pub fn all_urls(&self) -> impl Iterator<Item = &str> {
        self.sitemaps
            .iter()
            .flat_map(|sitemap| sitemap.iter().map(|p| p.page.as_str()))
    }
}
