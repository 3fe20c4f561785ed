//! Rule-based campaign insights. Each rule reads a finished
//! [`AnalysisResult`] and may emit one [`Insight`]; rules never feed back
//! into the aggregation.

use crate::analyzer::AnalysisResult;
use crate::dropoff::DropOffStage;
use crate::timing::EngagementPattern;
use campaign_core::config::InsightThresholds;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Warning,
    Critical,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Insight {
    pub rule: String,
    pub severity: Severity,
    pub message: String,
    pub recommendation: Option<String>,
}

impl Insight {
    fn new(rule: &str, severity: Severity, message: String, recommendation: Option<&str>) -> Self {
        Self {
            rule: rule.to_string(),
            severity,
            message,
            recommendation: recommendation.map(str::to_string),
        }
    }
}

/// A single insight strategy.
pub trait InsightRule: Send + Sync {
    fn name(&self) -> &'static str;
    fn evaluate(&self, result: &AnalysisResult) -> Option<Insight>;
}

pub struct HighBounceRate {
    pub threshold: f64,
}

impl InsightRule for HighBounceRate {
    fn name(&self) -> &'static str {
        "high_bounce_rate"
    }

    fn evaluate(&self, result: &AnalysisResult) -> Option<Insight> {
        let rate = result.rates.bounce_rate;
        if rate <= self.threshold {
            return None;
        }
        let severity = if rate > self.threshold * 2.0 {
            Severity::Critical
        } else {
            Severity::Warning
        };
        Some(Insight::new(
            self.name(),
            severity,
            format!("Bounce rate is {rate:.2}%, above the {:.2}% threshold", self.threshold),
            Some("Clean the recipient list and remove invalid addresses"),
        ))
    }
}

pub struct LowOpenRate {
    pub threshold: f64,
}

impl InsightRule for LowOpenRate {
    fn name(&self) -> &'static str {
        "low_open_rate"
    }

    fn evaluate(&self, result: &AnalysisResult) -> Option<Insight> {
        if result.funnel.delivered == 0 || result.rates.open_rate >= self.threshold {
            return None;
        }
        Some(Insight::new(
            self.name(),
            Severity::Warning,
            format!("Open rate is {:.2}% of delivered email", result.rates.open_rate),
            Some("Test subject lines and sender names"),
        ))
    }
}

pub struct LowClickThroughRate {
    pub threshold: f64,
}

impl InsightRule for LowClickThroughRate {
    fn name(&self) -> &'static str {
        "low_click_through_rate"
    }

    fn evaluate(&self, result: &AnalysisResult) -> Option<Insight> {
        if result.funnel.delivered == 0 || result.rates.click_through_rate >= self.threshold {
            return None;
        }
        Some(Insight::new(
            self.name(),
            Severity::Warning,
            format!("Click-through rate is {:.2}%", result.rates.click_through_rate),
            Some("Make calls to action more prominent and content more relevant"),
        ))
    }
}

pub struct HighUnsubscribeRate {
    pub threshold: f64,
}

impl InsightRule for HighUnsubscribeRate {
    fn name(&self) -> &'static str {
        "high_unsubscribe_rate"
    }

    fn evaluate(&self, result: &AnalysisResult) -> Option<Insight> {
        if result.rates.unsubscribe_rate <= self.threshold {
            return None;
        }
        Some(Insight::new(
            self.name(),
            Severity::Warning,
            format!("Unsubscribe rate is {:.2}%", result.rates.unsubscribe_rate),
            Some("Review sending frequency and audience targeting"),
        ))
    }
}

pub struct StrongClickToOpenRate {
    pub threshold: f64,
}

impl InsightRule for StrongClickToOpenRate {
    fn name(&self) -> &'static str {
        "strong_click_to_open_rate"
    }

    fn evaluate(&self, result: &AnalysisResult) -> Option<Insight> {
        if result.rates.click_to_open_rate <= self.threshold {
            return None;
        }
        Some(Insight::new(
            self.name(),
            Severity::Info,
            format!(
                "{:.2}% of recipients who opened also clicked",
                result.rates.click_to_open_rate
            ),
            None,
        ))
    }
}

pub struct PrimaryDropOff;

impl InsightRule for PrimaryDropOff {
    fn name(&self) -> &'static str {
        "primary_drop_off"
    }

    fn evaluate(&self, result: &AnalysisResult) -> Option<Insight> {
        if result.funnel.sent == 0 {
            return None;
        }
        let d = &result.drop_off;
        let (lost, recommendation) = match d.primary_drop_off_stage {
            DropOffStage::Delivery => (
                d.delivery_drop_off,
                "Check sender reputation and authentication records",
            ),
            DropOffStage::Opening => (d.open_drop_off, "Improve subject lines and send timing"),
            DropOffStage::Clicking => (d.click_drop_off, "Improve email content and calls to action"),
        };
        if lost == 0.0 {
            return None;
        }
        Some(Insight::new(
            self.name(),
            Severity::Info,
            format!(
                "Largest loss happens at {} ({lost:.2}% of recipients)",
                d.primary_drop_off_stage
            ),
            Some(recommendation),
        ))
    }
}

pub struct EngagementTiming;

impl InsightRule for EngagementTiming {
    fn name(&self) -> &'static str {
        "engagement_timing"
    }

    fn evaluate(&self, result: &AnalysisResult) -> Option<Insight> {
        let timing = &result.timing;
        let peak = timing
            .peak_engagement_hour
            .map(|h| format!(", peaking at {h:02}:00"))
            .unwrap_or_default();
        let (message, recommendation) = match timing.engagement_pattern {
            EngagementPattern::Unknown => return None,
            EngagementPattern::Immediate => (
                format!("Most recipients open within an hour of delivery{peak}"),
                None,
            ),
            EngagementPattern::Delayed => (
                format!("Most recipients open more than an hour after delivery{peak}"),
                Some("Try sending closer to the peak engagement hour"),
            ),
            EngagementPattern::Mixed => (format!("Open timing is mixed{peak}"), None),
        };
        Some(Insight::new(self.name(), Severity::Info, message, recommendation))
    }
}

/// Ordered collection of insight rules.
#[derive(Default)]
pub struct InsightEngine {
    rules: Vec<Box<dyn InsightRule>>,
}

impl InsightEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_default_rules(thresholds: &InsightThresholds) -> Self {
        let mut engine = Self::new();
        engine.register(Box::new(HighBounceRate {
            threshold: thresholds.high_bounce_rate,
        }));
        engine.register(Box::new(LowOpenRate {
            threshold: thresholds.low_open_rate,
        }));
        engine.register(Box::new(LowClickThroughRate {
            threshold: thresholds.low_click_through_rate,
        }));
        engine.register(Box::new(HighUnsubscribeRate {
            threshold: thresholds.high_unsubscribe_rate,
        }));
        engine.register(Box::new(StrongClickToOpenRate {
            threshold: thresholds.strong_click_to_open_rate,
        }));
        engine.register(Box::new(PrimaryDropOff));
        engine.register(Box::new(EngagementTiming));
        engine
    }

    pub fn register(&mut self, rule: Box<dyn InsightRule>) {
        self.rules.push(rule);
    }

    pub fn rule_names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|r| r.name()).collect()
    }

    pub fn evaluate(&self, result: &AnalysisResult) -> Vec<Insight> {
        self.rules.iter().filter_map(|r| r.evaluate(result)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::funnel::{ConversionRates, FunnelMetrics};

    fn result_with(funnel: FunnelMetrics) -> AnalysisResult {
        AnalysisResult {
            funnel,
            rates: ConversionRates::from_metrics(&funnel),
            drop_off: crate::dropoff::DropOffAnalysis::from_metrics(&funnel),
            ..Default::default()
        }
    }

    #[test]
    fn test_default_rules_registered() {
        let engine = InsightEngine::with_default_rules(&InsightThresholds::default());
        assert_eq!(engine.rule_names().len(), 7);
    }

    #[test]
    fn test_empty_result_has_no_insights() {
        let engine = InsightEngine::with_default_rules(&InsightThresholds::default());
        assert!(engine.evaluate(&AnalysisResult::default()).is_empty());
    }

    #[test]
    fn test_high_bounce_rate() {
        let result = result_with(FunnelMetrics {
            sent: 100,
            delivered: 88,
            bounced: 12,
            ..Default::default()
        });
        let insight = HighBounceRate { threshold: 5.0 }.evaluate(&result).unwrap();
        assert_eq!(insight.severity, Severity::Critical);
        assert!(insight.recommendation.unwrap().contains("list"));

        assert!(HighBounceRate { threshold: 20.0 }.evaluate(&result).is_none());
    }

    #[test]
    fn test_drop_off_insight_names_stage() {
        let result = result_with(FunnelMetrics {
            sent: 3,
            delivered: 2,
            opened: 1,
            clicked: 1,
            bounced: 1,
            unsubscribed: 0,
        });
        let insight = PrimaryDropOff.evaluate(&result).unwrap();
        assert!(insight.message.contains("opening"));
    }

    struct AlwaysFires;

    impl InsightRule for AlwaysFires {
        fn name(&self) -> &'static str {
            "always"
        }

        fn evaluate(&self, _result: &AnalysisResult) -> Option<Insight> {
            Some(Insight::new(self.name(), Severity::Info, "fired".into(), None))
        }
    }

    #[test]
    fn test_custom_rule() {
        let mut engine = InsightEngine::new();
        engine.register(Box::new(AlwaysFires));
        let insights = engine.evaluate(&AnalysisResult::default());
        assert_eq!(insights.len(), 1);
        assert_eq!(insights[0].rule, "always");
    }
}
