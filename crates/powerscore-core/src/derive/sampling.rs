// ── Sampled URL selection ──

use indexmap::IndexSet;
use rand::Rng;
use url::Url;

use crate::model::Sitemap;

/// Number of URLs handed to the template crawl.
pub const DEFAULT_TARGET_URL_COUNT: usize = 50;

/// `true` when the URL path has fewer than two non-empty segments.
///
/// Unparseable URLs are never top-level.
pub fn is_top_level(url: &str) -> bool {
    Url::parse(url).is_ok_and(|parsed| {
        parsed
            .path()
            .split('/')
            .filter(|segment| !segment.trim().is_empty())
            .count()
            < 2
    })
}

/// Pick the URLs to crawl for template analysis.
///
/// Every top-level URL is kept, even past `target`. The rest are kept by
/// independent draws at rate `remaining slots / remaining URLs`, so the
/// result size is `target` on average, not exactly. No URL appears twice.
pub fn sample_urls<R: Rng + ?Sized>(sitemap: &Sitemap, target: usize, rng: &mut R) -> Vec<String> {
    let all: IndexSet<&str> = sitemap.all_urls().collect();
    let (top_level, rest): (Vec<&str>, Vec<&str>) =
        all.into_iter().partition(|url| is_top_level(url));

    let slots = target.saturating_sub(top_level.len());
    let mut sampled: Vec<String> = top_level.into_iter().map(str::to_owned).collect();
    if slots == 0 || rest.is_empty() {
        return sampled;
    }

    #[allow(clippy::cast_precision_loss, clippy::as_conversions)]
    let rate = (slots as f64 / rest.len() as f64).clamp(0.0, 1.0);
    sampled.extend(
        rest.into_iter()
            .filter(|_| rng.gen_bool(rate))
            .map(str::to_owned),
    );
    sampled
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::SitemapPage;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::collections::HashSet;

    fn sitemap(urls: &[String]) -> Sitemap {
        Sitemap {
            num_pages: urls.len() as u64,
            num_languages: 1,
            sitemaps: vec![
                urls.iter()
                    .map(|u| SitemapPage { page: u.clone() })
                    .collect(),
            ],
        }
    }

    fn site(top: usize, deep: usize) -> Vec<String> {
        let mut urls = vec!["https://example.com/".to_owned()];
        urls.extend((1..top).map(|i| format!("https://example.com/section-{i}")));
        urls.extend((0..deep).map(|i| format!("https://example.com/blog/post-{i}")));
        urls
    }

    #[test]
    fn top_level_detection() {
        assert!(is_top_level("https://example.com"));
        assert!(is_top_level("https://example.com/"));
        assert!(is_top_level("https://example.com/about/"));
        assert!(!is_top_level("https://example.com/blog/post"));
        assert!(!is_top_level("not a url"));
    }

    #[test]
    fn keeps_top_level_and_samples_rest_without_duplicates() {
        let urls = site(3, 97);
        let mut rng = StdRng::seed_from_u64(7);

        let sampled = sample_urls(&sitemap(&urls), 50, &mut rng);

        for top in &urls[..3] {
            assert!(sampled.contains(top), "missing {top}");
        }
        let unique: HashSet<&String> = sampled.iter().collect();
        assert_eq!(unique.len(), sampled.len());
        assert!(sampled.iter().all(|u| urls.contains(u)));
        // 97 draws at p = 47/97; a seeded run lands well inside this band.
        assert!((25..=75).contains(&sampled.len()), "got {}", sampled.len());
    }

    #[test]
    fn average_size_approaches_target() {
        let urls = site(3, 97);
        let map = sitemap(&urls);
        let mut rng = StdRng::seed_from_u64(42);

        let runs = 200;
        let total: usize = (0..runs)
            .map(|_| sample_urls(&map, 50, &mut rng).len())
            .sum();
        let mean = total as f64 / f64::from(runs);
        assert!((45.0..=55.0).contains(&mean), "mean {mean}");
    }

    #[test]
    fn small_sitemaps_are_taken_whole() {
        let urls = site(2, 10);
        let mut rng = StdRng::seed_from_u64(1);
        let sampled = sample_urls(&sitemap(&urls), 50, &mut rng);
        assert_eq!(sampled, urls);
    }

    #[test]
    fn top_level_overflow_skips_sampling() {
        let urls = site(60, 40);
        let mut rng = StdRng::seed_from_u64(3);
        let sampled = sample_urls(&sitemap(&urls), 50, &mut rng);
        assert_eq!(sampled, urls[..60].to_vec());
    }

    #[test]
    fn duplicate_sitemap_entries_collapse() {
        let mut urls = site(2, 0);
        urls.push(urls[0].clone());
        let mut rng = StdRng::seed_from_u64(0);
        let sampled = sample_urls(&sitemap(&urls), 50, &mut rng);
        assert_eq!(sampled, urls[..2].to_vec());
    }
}
