//! `calculate`: offline scores from hand-entered site characteristics.

use powerscore_core::{CalculatorParams, DerivationConfig, PowerScoreSession};

use crate::cli::{CalculateArgs, GlobalOpts};
use crate::config;
use crate::error::CliError;
use crate::output;

/// Query string first, then individual flags on top.
fn build_params(args: &CalculateArgs) -> Result<CalculatorParams, CliError> {
    let mut params = match &args.query {
        Some(query) => CalculatorParams::parse(query)?,
        None => CalculatorParams::default(),
    };

    params.pages = args.pages.or(params.pages);
    params.langs = args.langs.or(params.langs);
    params.layouts = args.layouts.or(params.layouts);
    params.blocks = args.blocks.or(params.blocks);
    params.traffic_rank = args.traffic_rank.or(params.traffic_rank);
    params.cdn = args.cdn.clone().or(params.cdn);
    params.forms |= args.forms;
    params.commerce |= args.commerce;
    params.authentication |= args.authentication;
    params.mobile_perf = args.mobile_perf.or(params.mobile_perf);
    params.customer_complexity = args.customer_complexity.or(params.customer_complexity);
    params.customer_urgency = args.customer_urgency.or(params.customer_urgency);

    if let Some(perf) = params.mobile_perf {
        if !(0.0..=1.0).contains(&perf) {
            return Err(CliError::Validation {
                field: "mobile-perf".into(),
                reason: format!("{perf} is outside 0.0 to 1.0"),
            });
        }
    }
    Ok(params)
}

pub fn handle(args: &CalculateArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let cfg = config::load(global)?;
    let format = config::output_format(global, &cfg)?;
    let color = output::should_color(config::color_mode(global, &cfg)?);
    let params = build_params(args)?;

    let session = PowerScoreSession::offline(&DerivationConfig {
        target_url_count: cfg.sampling.target_url_count,
        sampling_seed: cfg.sampling.seed,
    });
    session.load_calculator(&params);
    let report = session.report();

    output::print_output(&output::render_report(format, &report, color), global.quiet);
    if args.link && !global.quiet {
        eprintln!("Calculator: ?{}", params.to_query_string());
    }
    Ok(())
}
