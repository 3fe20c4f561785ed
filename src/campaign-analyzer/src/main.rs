//! Campaign Analyzer — funnel, timing, journey and drop-off analysis for one
//! campaign's email event log.
//!
//! Reads a JSON array of event records from a file or stdin and writes the
//! analysis as JSON to stdout. Logs go to stderr.

use anyhow::Context;
use campaign_core::config::{AnalyzerConfig, TimeZoneMode};
use campaign_core::parse_event_log;
use campaign_reporting::{AnalysisResult, Insight, InsightEngine, SequenceAnalyzer};
use clap::Parser;
use serde::Serialize;
use std::io::Read;
use std::path::PathBuf;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "campaign-analyzer")]
#[command(about = "Analyze a campaign's email event log")]
#[command(version)]
struct Cli {
    /// Event log file (JSON array). Reads stdin when omitted.
    #[arg(long, short)]
    input: Option<PathBuf>,

    /// TOML config file, overridden by CAMPAIGN_ANALYZER__* variables
    #[arg(long, env = "CAMPAIGN_ANALYZER_CONFIG")]
    config: Option<String>,

    /// Hour bucketing time zone: utc or local (overrides config)
    #[arg(long, env = "CAMPAIGN_ANALYZER__TIME_ZONE")]
    time_zone: Option<TimeZoneMode>,

    /// Include rule-based insights in the output
    #[arg(long, default_value_t = false)]
    insights: bool,

    /// Single-line JSON output
    #[arg(long, default_value_t = false)]
    compact: bool,
}

#[derive(Serialize)]
struct Report<'a> {
    analysis: &'a AnalysisResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    insights: Option<Vec<Insight>>,
}

/// An explicitly named config file must load; the environment-only layer
/// falls back to defaults.
fn load_config(path: Option<&str>) -> anyhow::Result<AnalyzerConfig> {
    match path {
        Some(path) => AnalyzerConfig::load_from(Some(path))
            .with_context(|| format!("loading config file {path}")),
        None => Ok(AnalyzerConfig::load().unwrap_or_else(|e| {
            warn!(error = %e, "Failed to load config, using defaults");
            AnalyzerConfig::default()
        })),
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "campaign_analyzer=info,campaign_reporting=info".into()),
        )
        .with_writer(std::io::stderr)
        .json()
        .init();

    let cli = Cli::parse();

    let mut config = load_config(cli.config.as_deref())?;
    if let Some(time_zone) = cli.time_zone {
        config.time_zone = time_zone;
    }
    info!(time_zone = ?config.time_zone, "Configuration loaded");

    let payload = match &cli.input {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("reading event log {}", path.display()))?,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("reading event log from stdin")?;
            buf
        }
    };

    let raw = parse_event_log(&payload).context("parsing event log")?;
    let insight_engine = cli
        .insights
        .then(|| InsightEngine::with_default_rules(&config.insights));
    let analysis = SequenceAnalyzer::new(config).analyze_raw(&raw);

    let report = Report {
        analysis: &analysis,
        insights: insight_engine.map(|engine| engine.evaluate(&analysis)),
    };
    let out = if cli.compact {
        serde_json::to_string(&report)?
    } else {
        serde_json::to_string_pretty(&report)?
    };
    println!("{out}");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_explicit_config_is_an_error() {
        let err = load_config(Some("/nonexistent/campaign-analyzer.toml")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/campaign-analyzer.toml"));
    }

    #[test]
    fn test_no_config_path_loads() {
        assert!(load_config(None).is_ok());
    }
}
