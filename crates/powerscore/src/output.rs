//! Output formatting: table, JSON, YAML, plain.
//!
//! Renders an `AnalysisReport` in the format selected by `--output`.
//! Table uses `tabled`, structured formats use serde, plain emits the
//! overall score alone.

use std::io::{self, IsTerminal, Write};

use owo_colors::OwoColorize;
use tabled::{Table, Tabled, settings::Style};

use powerscore_core::AnalysisReport;
use powerscore_core::model::PsiLevel;

use crate::cli::{ColorMode, OutputFormat};

// ── Color helpers ────────────────────────────────────────────────────

/// Determine whether color output should be enabled.
pub fn should_color(mode: ColorMode) -> bool {
    match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => io::stdout().is_terminal() && std::env::var("NO_COLOR").is_err(),
    }
}

#[derive(Tabled)]
struct MetricRow {
    #[tabled(rename = "Metric")]
    metric: &'static str,
    #[tabled(rename = "Value")]
    value: String,
}

#[derive(Tabled)]
struct GaugeRow {
    #[tabled(rename = "Form factor")]
    form_factor: &'static str,
    #[tabled(rename = "Category")]
    category: &'static str,
    #[tabled(rename = "Score")]
    score: String,
}

// ── Render dispatchers ───────────────────────────────────────────────

/// Render a report in the chosen format.
pub fn render_report(format: OutputFormat, report: &AnalysisReport, color: bool) -> String {
    match format {
        OutputFormat::Table => render_report_table(report, color),
        OutputFormat::Json => render_json_pretty(report),
        OutputFormat::JsonCompact => render_json_compact(report),
        OutputFormat::Yaml => render_yaml(report),
        OutputFormat::Plain => report
            .power_score
            .map(|score| score.overall.to_string())
            .unwrap_or_default(),
    }
}

/// Render any serializable value; table falls back to `detail_fn`.
pub fn render_single<T>(format: OutputFormat, data: &T, detail_fn: impl Fn(&T) -> String) -> String
where
    T: serde::Serialize,
{
    match format {
        OutputFormat::Table | OutputFormat::Plain => detail_fn(data),
        OutputFormat::Json => render_json_pretty(data),
        OutputFormat::JsonCompact => render_json_compact(data),
        OutputFormat::Yaml => render_yaml(data),
    }
}

/// Print the rendered output to stdout, respecting quiet mode.
pub fn print_output(output: &str, quiet: bool) {
    if quiet || output.is_empty() {
        return;
    }
    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "{output}");
}

// ── Table view ───────────────────────────────────────────────────────

fn opt<T: ToString>(value: Option<T>) -> String {
    value.map_or_else(|| "-".into(), |v| v.to_string())
}

fn score(value: Option<f64>) -> String {
    value.map_or_else(|| "-".into(), |v| format!("{v:.1}"))
}

fn metric_rows(report: &AnalysisReport) -> Vec<MetricRow> {
    let integrations = report.integrations.map(|i| {
        let enabled: Vec<&str> = [
            (i.commerce, "commerce"),
            (i.authentication, "authentication"),
            (i.forms, "forms"),
        ]
        .into_iter()
        .filter_map(|(on, name)| on.then_some(name))
        .collect();
        if enabled.is_empty() {
            "none".to_owned()
        } else {
            enabled.join(", ")
        }
    });
    let cdn = report.cdn.as_ref().map(|cdn| match &cdn.cname {
        Some(cname) if !cname.is_empty() => format!("{} ({cname})", cdn.label),
        _ => cdn.label.clone(),
    });
    let traffic = report.traffic_label.as_ref().map(|label| match report.traffic_tier {
        Some(tier) => format!("{label} ({tier})"),
        None => label.clone(),
    });

    vec![
        MetricRow { metric: "Site", value: opt(report.origin.as_deref()) },
        MetricRow { metric: "Pages", value: opt(report.pages) },
        MetricRow { metric: "Languages", value: opt(report.languages) },
        MetricRow { metric: "Layouts", value: opt(report.templates) },
        MetricRow { metric: "Blocks per page", value: score(report.blocks) },
        MetricRow { metric: "Integrations", value: opt(integrations) },
        MetricRow { metric: "Traffic", value: opt(traffic) },
        MetricRow { metric: "CDN", value: opt(cdn) },
        MetricRow {
            metric: "Mobile performance",
            value: opt(report.mobile_performance.map(|p| (p * 100.0).round())),
        },
        MetricRow { metric: "Code complexity", value: score(report.code_complexity) },
        MetricRow { metric: "Import complexity", value: score(report.import_complexity) },
        MetricRow { metric: "Site complexity", value: score(report.site_complexity) },
        MetricRow { metric: "Customer complexity", value: score(report.customer_complexity) },
        MetricRow { metric: "Customer urgency", value: score(report.customer_urgency) },
    ]
}

fn level_text(level: PsiLevel, text: String, color: bool) -> String {
    if !color {
        return text;
    }
    match level {
        PsiLevel::Good => text.green().to_string(),
        PsiLevel::Improve => text.yellow().to_string(),
        PsiLevel::Poor => text.red().to_string(),
    }
}

fn render_report_table(report: &AnalysisReport, color: bool) -> String {
    let mut sections = vec![Table::new(metric_rows(report)).with(Style::rounded()).to_string()];

    if !report.psi.is_empty() {
        let gauges: Vec<GaugeRow> = report
            .psi
            .iter()
            .map(|gauge| GaugeRow {
                form_factor: gauge.form_factor,
                category: gauge.category,
                score: level_text(gauge.level, format!("{} ({})", gauge.score, gauge.level), color),
            })
            .collect();
        sections.push(Table::new(gauges).with(Style::rounded()).to_string());
    }

    if let Some(power) = report.power_score {
        let headline = format!("Power score: {}", power.overall);
        sections.push(if color { headline.bold().to_string() } else { headline });
    }

    if !report.errors.is_empty() {
        let lines: Vec<String> = report
            .errors
            .iter()
            .map(|(data_type, message)| {
                let line = format!("{data_type}: {message}");
                if color { line.red().to_string() } else { line }
            })
            .collect();
        sections.push(format!("Failed:\n  {}", lines.join("\n  ")));
    }

    sections.join("\n\n")
}

// ── Format-specific renderers ────────────────────────────────────────

/// Pretty-printed JSON.
pub(crate) fn render_json_pretty<T: serde::Serialize + ?Sized>(data: &T) -> String {
    serde_json::to_string_pretty(data).expect("serialization should not fail")
}

/// Compact single-line JSON.
pub(crate) fn render_json_compact<T: serde::Serialize + ?Sized>(data: &T) -> String {
    serde_json::to_string(data).expect("serialization should not fail")
}

/// YAML output.
pub(crate) fn render_yaml<T: serde::Serialize + ?Sized>(data: &T) -> String {
    serde_yaml::to_string(data).expect("serialization should not fail")
}

#[cfg(test)]
mod tests {
    use super::*;
    use powerscore_core::{DataError, DataType, PowerScore};

    fn sample() -> AnalysisReport {
        AnalysisReport {
            origin: Some("https://www.example.com".into()),
            pages: Some(400),
            code_complexity: Some(30.0),
            import_complexity: Some(30.0),
            site_complexity: Some(60.0),
            power_score: Some(PowerScore::from_components(30.0, 30.0, 60.0)),
            ..AnalysisReport::default()
        }
    }

    #[test]
    fn plain_prints_overall_only() {
        assert_eq!(render_report(OutputFormat::Plain, &sample(), false), "40");
        assert_eq!(
            render_report(OutputFormat::Plain, &AnalysisReport::default(), false),
            ""
        );
    }

    #[test]
    fn table_lists_metrics_and_headline() {
        let text = render_report(OutputFormat::Table, &sample(), false);
        assert!(text.contains("https://www.example.com"));
        assert!(text.contains("Code complexity"));
        assert!(text.contains("30.0"));
        assert!(text.contains("Power score: 40"));
        assert!(!text.contains("Failed"));
    }

    #[test]
    fn table_lists_failures() {
        let mut report = sample();
        let error = DataError::timeout(DataType::Sitemap, std::time::Duration::from_secs(300));
        report.errors.insert(DataType::Sitemap, error.message);
        let text = render_report(OutputFormat::Table, &report, false);
        assert!(text.contains("sitemap: action sitemap exceeded max allowed time of 300s"));
    }

    #[test]
    fn json_uses_camel_case() {
        let value: serde_json::Value =
            serde_json::from_str(&render_report(OutputFormat::Json, &sample(), false)).unwrap();
        assert_eq!(value["codeComplexity"], 30.0);
        assert_eq!(value["powerScore"]["overall"], 40.0);
    }
}
