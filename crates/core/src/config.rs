use crate::error::CampaignResult;
use serde::Deserialize;
use std::str::FromStr;

/// Root analyzer configuration. Loaded from environment variables
/// with the prefix `CAMPAIGN_ANALYZER__` and an optional TOML config file.
#[derive(Debug, Clone, Deserialize)]
pub struct AnalyzerConfig {
    #[serde(default)]
    pub time_zone: TimeZoneMode,
    #[serde(default)]
    pub timing: TimingConfig,
    #[serde(default)]
    pub summary: SummaryConfig,
    #[serde(default)]
    pub insights: InsightThresholds,
}

/// Time zone used to bucket engagement events into hours of the day.
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TimeZoneMode {
    #[default]
    Utc,
    /// Time zone of the executing process. Results differ across hosts.
    Local,
}

impl FromStr for TimeZoneMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "utc" => Ok(TimeZoneMode::Utc),
            "local" => Ok(TimeZoneMode::Local),
            other => Err(format!("unknown time zone mode '{other}', expected utc or local")),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TimingConfig {
    #[serde(default = "default_immediate_open_secs")]
    pub immediate_open_secs: i64,
    #[serde(default = "default_immediate_ratio")]
    pub immediate_ratio: f64,
    #[serde(default = "default_delayed_ratio")]
    pub delayed_ratio: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SummaryConfig {
    #[serde(default = "default_top_types")]
    pub top_types: usize,
}

/// Thresholds (percentages) used by the rule-based insight engine.
#[derive(Debug, Clone, Deserialize)]
pub struct InsightThresholds {
    #[serde(default = "default_high_bounce_rate")]
    pub high_bounce_rate: f64,
    #[serde(default = "default_low_open_rate")]
    pub low_open_rate: f64,
    #[serde(default = "default_low_click_through_rate")]
    pub low_click_through_rate: f64,
    #[serde(default = "default_high_unsubscribe_rate")]
    pub high_unsubscribe_rate: f64,
    #[serde(default = "default_strong_click_to_open_rate")]
    pub strong_click_to_open_rate: f64,
}

// Default functions
fn default_immediate_open_secs() -> i64 {
    3600
}
fn default_immediate_ratio() -> f64 {
    0.7
}
fn default_delayed_ratio() -> f64 {
    0.3
}
fn default_top_types() -> usize {
    5
}
fn default_high_bounce_rate() -> f64 {
    5.0
}
fn default_low_open_rate() -> f64 {
    20.0
}
fn default_low_click_through_rate() -> f64 {
    2.0
}
fn default_high_unsubscribe_rate() -> f64 {
    0.5
}
fn default_strong_click_to_open_rate() -> f64 {
    15.0
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            immediate_open_secs: default_immediate_open_secs(),
            immediate_ratio: default_immediate_ratio(),
            delayed_ratio: default_delayed_ratio(),
        }
    }
}

impl Default for SummaryConfig {
    fn default() -> Self {
        Self {
            top_types: default_top_types(),
        }
    }
}

impl Default for InsightThresholds {
    fn default() -> Self {
        Self {
            high_bounce_rate: default_high_bounce_rate(),
            low_open_rate: default_low_open_rate(),
            low_click_through_rate: default_low_click_through_rate(),
            high_unsubscribe_rate: default_high_unsubscribe_rate(),
            strong_click_to_open_rate: default_strong_click_to_open_rate(),
        }
    }
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            time_zone: TimeZoneMode::default(),
            timing: TimingConfig::default(),
            summary: SummaryConfig::default(),
            insights: InsightThresholds::default(),
        }
    }
}

impl AnalyzerConfig {
    /// Load configuration from environment variables only.
    pub fn load() -> CampaignResult<Self> {
        Self::load_from(None)
    }

    /// Load configuration from an optional TOML file, overridden by
    /// `CAMPAIGN_ANALYZER__*` environment variables.
    pub fn load_from(path: Option<&str>) -> CampaignResult<Self> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(config::File::with_name(path).required(true));
        }
        let builder = builder.add_source(
            config::Environment::with_prefix("CAMPAIGN_ANALYZER")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        Ok(config.try_deserialize()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = AnalyzerConfig::default();
        assert_eq!(cfg.time_zone, TimeZoneMode::Utc);
        assert_eq!(cfg.timing.immediate_open_secs, 3600);
        assert_eq!(cfg.summary.top_types, 5);
        assert!((cfg.insights.high_bounce_rate - 5.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_time_zone_from_str() {
        assert_eq!("UTC".parse::<TimeZoneMode>(), Ok(TimeZoneMode::Utc));
        assert_eq!("local".parse::<TimeZoneMode>(), Ok(TimeZoneMode::Local));
        assert!("mars".parse::<TimeZoneMode>().is_err());
    }

    #[test]
    fn test_missing_file_is_config_error() {
        let err = AnalyzerConfig::load_from(Some("/nonexistent/campaign-analyzer")).unwrap_err();
        assert!(matches!(err, crate::error::CampaignError::Config(_)));
    }

    #[test]
    fn test_partial_document_fills_defaults() {
        let cfg: AnalyzerConfig =
            serde_json::from_str(r#"{"time_zone":"local","timing":{"immediate_ratio":0.8}}"#)
                .unwrap();
        assert_eq!(cfg.time_zone, TimeZoneMode::Local);
        assert!((cfg.timing.immediate_ratio - 0.8).abs() < f64::EPSILON);
        assert!((cfg.timing.delayed_ratio - 0.3).abs() < f64::EPSILON);
        assert_eq!(cfg.summary.top_types, 5);
    }
}
