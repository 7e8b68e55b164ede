//! `analyze`: run the remote analysis and print the report.

use std::sync::Arc;

use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};
use url::Url;

use powerscore_config::FileSessionCache;
use powerscore_core::{
    AnalysisReport, CalculatorParams, DataType, MemorySessionCache, NotificationBus, PowerScoreSession,
    SessionCache,
};

use crate::cli::{AnalyzeArgs, GlobalOpts};
use crate::config;
use crate::error::CliError;
use crate::output;

/// Inputs whose arrival is reported while the analysis runs.
const TRACKED: [DataType; 7] = [
    DataType::Setup,
    DataType::Sitemap,
    DataType::Dns,
    DataType::RawTraffic,
    DataType::Psi,
    DataType::SampledUrls,
    DataType::Templates,
];

/// Accept bare hosts the way the web form does: no scheme means https.
pub fn normalize_url(raw: &str) -> Result<Url, CliError> {
    let raw = raw.trim();
    let candidate = if raw.starts_with("http://") || raw.starts_with("https://") {
        raw.to_owned()
    } else {
        format!("https://{raw}")
    };
    let url = Url::parse(&candidate).map_err(|e| CliError::Validation {
        field: "url".into(),
        reason: format!("{raw}: {e}"),
    })?;
    if url.host_str().is_none_or(str::is_empty) {
        return Err(CliError::Validation {
            field: "url".into(),
            reason: format!("{raw}: no host"),
        });
    }
    Ok(url)
}

fn progress_bar(quiet: bool) -> ProgressBar {
    if quiet {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new(u64::try_from(TRACKED.len()).unwrap_or_default());
    let style = ProgressStyle::with_template("{spinner} [{pos}/{len}] {msg} ({elapsed})")
        .unwrap_or_else(|_| ProgressStyle::default_spinner());
    bar.set_style(style);
    bar.set_message("starting analysis");
    bar.enable_steady_tick(std::time::Duration::from_millis(120));
    bar
}

fn track_progress(bus: &NotificationBus, bar: &ProgressBar) {
    for data_type in TRACKED {
        let bar = bar.clone();
        bus.observe(&[data_type], move |delivery| {
            bar.inc(1);
            match delivery {
                Ok(_) => bar.set_message(format!("{data_type} ready")),
                Err(error) => bar.println(format!("  {data_type} failed: {}", error.message)),
            }
        });
    }
}

fn describe_failures(report: &AnalysisReport) -> String {
    if report.errors.is_empty() {
        return "scores did not resolve".into();
    }
    report
        .errors
        .keys()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

pub async fn handle(args: AnalyzeArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let cfg = config::load(global)?;
    let runtime = config::runtime_config(&cfg)?;
    let format = config::output_format(global, &cfg)?;
    let color = output::should_color(config::color_mode(global, &cfg)?);
    let url = normalize_url(&args.url)?;

    let cache: Arc<dyn SessionCache> = if args.no_cache {
        Arc::new(MemorySessionCache::new())
    } else {
        Arc::new(FileSessionCache::at_default_path())
    };
    let session = PowerScoreSession::connect(&runtime, cache)?;

    let progress = progress_bar(global.quiet);
    track_progress(session.bus(), &progress);

    let bus = session.bus();
    let code = bus.wait_for(&[DataType::CodeComplexity]);
    let import = bus.wait_for(&[DataType::ImportComplexity]);
    let site = bus.wait_for(&[DataType::SiteComplexity]);

    info!(url = %url, force = args.force, base_url = %runtime.base_url, "starting analysis");
    session.start(url.as_str(), args.force)?;

    let deadline = config::analysis_deadline(&runtime);
    let outcome = tokio::select! {
        scores = tokio::time::timeout(deadline, async { tokio::join!(code, import, site) }) => {
            scores.map_err(|_| CliError::Timeout { seconds: deadline.as_secs() })
        }
        _ = tokio::signal::ctrl_c() => Err(CliError::Interrupted),
    };
    progress.finish_and_clear();
    session.shutdown();

    let (code, import, site) = outcome?;
    for (name, result) in [("code", code), ("import", import), ("site", site)] {
        if let Err(e) = result {
            debug!(score = name, error = %e, "score unavailable");
        }
    }

    let report = session.report();
    output::print_output(&output::render_report(format, &report, color), global.quiet);
    if args.link && !global.quiet {
        let query = CalculatorParams::from_results(&report).to_query_string();
        eprintln!("Calculator: ?{query}");
    }

    if report.is_complete() {
        Ok(())
    } else {
        Err(CliError::AnalysisIncomplete {
            failed: describe_failures(&report),
        })
    }
}
