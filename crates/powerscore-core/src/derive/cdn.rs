// ── CDN inference ──

use crate::model::{CDN_TABLE, CdnInfo, UNKNOWN_CDN};

/// First CDN in table order whose signature occurs in `cname`.
///
/// See [`CdnProfile::matches`](crate::model::CdnProfile::matches).
pub fn infer_cdn(cname: &str) -> CdnInfo {
    let profile = CDN_TABLE
        .iter()
        .find(|profile| profile.matches(cname))
        .unwrap_or(&UNKNOWN_CDN);
    CdnInfo::from_profile(profile, Some(cname.to_owned()))
}
