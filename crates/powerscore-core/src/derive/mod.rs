// ── Derivation pipeline ──
//
// Fixed set of steps that observe base data on the bus and publish
// derived data back into it. A failed input fails every output of the
// step with the same error.

pub mod cdn;
pub mod sampling;
pub mod scores;
pub mod traffic;

use std::sync::Arc;

use parking_lot::Mutex;
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::trace;

use crate::bus::NotificationBus;
use crate::data_type::DataType;
use crate::error::DataError;
use crate::model::{BlockStats, Datum};

pub use cdn::infer_cdn;
pub use sampling::{DEFAULT_TARGET_URL_COUNT, is_top_level, sample_urls};
pub use scores::{
    PowerScore, cdn_score, code_complexity, import_complexity, site_complexity, traffic_score,
};
pub use traffic::{normalize_traffic, parse_popularity_rank};

/// Tunables for the derivation steps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DerivationConfig {
    pub target_url_count: usize,
    /// Fixed seed for URL sampling; `None` seeds from the OS.
    pub sampling_seed: Option<u64>,
}

impl Default for DerivationConfig {
    fn default() -> Self {
        Self {
            target_url_count: DEFAULT_TARGET_URL_COUNT,
            sampling_seed: None,
        }
    }
}

/// Register every derivation step on `bus`.
pub fn init_calculations(bus: &NotificationBus, config: &DerivationConfig) {
    let target = config.target_url_count;
    let rng = Mutex::new(
        config
            .sampling_seed
            .map_or_else(StdRng::from_entropy, StdRng::seed_from_u64),
    );
    step(
        bus,
        "sample-urls",
        &[DataType::Sitemap],
        &[DataType::SampledUrls],
        move |values| {
            let sitemap = values[0]
                .sitemap()
                .map_err(|e| e.into_data_error(DataType::SampledUrls))?;
            let urls = sample_urls(sitemap, target, &mut *rng.lock());
            Ok(vec![Datum::SampledUrls(urls)])
        },
    );

    step(
        bus,
        "split-psi",
        &[DataType::Psi],
        &[DataType::PsiMobile, DataType::PsiDesktop],
        |values| {
            let psi = values[0]
                .psi()
                .map_err(|e| e.into_data_error(DataType::PsiMobile))?;
            Ok(vec![
                Datum::PsiReport(psi.mobile.clone()),
                Datum::PsiReport(psi.desktop.clone()),
            ])
        },
    );

    step(
        bus,
        "template-details",
        &[DataType::Templates],
        &[DataType::Integrations, DataType::Blocks],
        |values| {
            let templates = values[0]
                .templates()
                .map_err(|e| e.into_data_error(DataType::Integrations))?;
            Ok(vec![
                Datum::Integrations(templates.integrations.unwrap_or_default()),
                Datum::Blocks(BlockStats::from_analysis(templates)),
            ])
        },
    );

    step(
        bus,
        "normalize-traffic",
        &[DataType::RawTraffic],
        &[DataType::Traffic],
        |values| {
            let raw = values[0]
                .raw_traffic()
                .map_err(|e| e.into_data_error(DataType::Traffic))?;
            Ok(vec![Datum::Traffic(normalize_traffic(raw))])
        },
    );

    step(
        bus,
        "infer-cdn",
        &[DataType::Dns],
        &[DataType::Cdn],
        |values| {
            let dns = values[0]
                .dns()
                .map_err(|e| e.into_data_error(DataType::Cdn))?;
            Ok(vec![Datum::Cdn(infer_cdn(&dns.payload.cname))])
        },
    );

    step(
        bus,
        "code-complexity",
        &[DataType::Templates, DataType::Blocks, DataType::Integrations],
        &[DataType::CodeComplexity],
        |values| {
            let mismatch = |e: crate::model::DatumMismatch| {
                e.into_data_error(DataType::CodeComplexity)
            };
            let templates = values[0].templates().map_err(mismatch)?;
            let blocks = values[1].blocks().map_err(mismatch)?;
            let integrations = values[2].integrations().map_err(mismatch)?;
            Ok(vec![Datum::Score(code_complexity(
                templates.templates.num_templates,
                blocks.block_count,
                *integrations,
            ))])
        },
    );

    step(
        bus,
        "import-complexity",
        &[DataType::Sitemap, DataType::Templates],
        &[DataType::ImportComplexity],
        |values| {
            let mismatch = |e: crate::model::DatumMismatch| {
                e.into_data_error(DataType::ImportComplexity)
            };
            let sitemap = values[0].sitemap().map_err(mismatch)?;
            let templates = values[1].templates().map_err(mismatch)?;
            Ok(vec![Datum::Score(import_complexity(
                sitemap.num_pages,
                templates.templates.num_templates,
            ))])
        },
    );

    step(
        bus,
        "site-complexity",
        &[DataType::Psi, DataType::Cdn, DataType::Traffic],
        &[DataType::SiteComplexity],
        |values| {
            let mismatch = |e: crate::model::DatumMismatch| {
                e.into_data_error(DataType::SiteComplexity)
            };
            let psi = values[0].psi().map_err(mismatch)?;
            let cdn = values[1].cdn().map_err(mismatch)?;
            let traffic = values[2].traffic().map_err(mismatch)?;
            let performance = psi.mobile.performance_score().ok_or_else(|| {
                DataError::derivation(
                    DataType::SiteComplexity,
                    "psi result has no mobile performance score",
                )
            })?;
            Ok(vec![Datum::Score(site_complexity(
                traffic.popularity.number,
                performance,
                &cdn.id,
            ))])
        },
    );
}

/// Observe `inputs` and publish one value per entry of `outputs`.
fn step<F>(
    bus: &NotificationBus,
    name: &'static str,
    inputs: &[DataType],
    outputs: &'static [DataType],
    derive: F,
) where
    F: Fn(&[Arc<Datum>]) -> Result<Vec<Datum>, DataError> + Send + Sync + 'static,
{
    let weak = bus.downgrade();
    bus.observe(inputs, move |delivery| {
        let Some(bus) = weak.upgrade() else { return };
        let values = match delivery {
            Ok(values) => values,
            Err(upstream) => {
                for &data_type in outputs {
                    bus.fail(data_type, upstream.clone());
                }
                return;
            }
        };
        match derive(values) {
            Ok(derived) => {
                trace!(step = name, "derived");
                for (&data_type, value) in outputs.iter().zip(derived) {
                    bus.provide(data_type, value);
                }
            }
            // A failure of this step is reported under each output's own type.
            Err(error) => {
                for &data_type in outputs {
                    bus.fail(
                        data_type,
                        DataError {
                            data_type,
                            ..error.clone()
                        },
                    );
                }
            }
        }
    });
}
