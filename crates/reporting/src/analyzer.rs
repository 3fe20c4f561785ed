//! Campaign sequence analyzer — runs the full pipeline over one campaign's
//! event log: group, walk, aggregate, classify, summarize.

use crate::dropoff::DropOffAnalysis;
use crate::funnel::{ConversionRates, FunnelAggregator, FunnelMetrics};
use crate::grouper::group_by_recipient;
use crate::journey::{classify_journeys, UserJourneys};
use crate::normalizer::normalize_all;
use crate::progress::RecipientProgress;
use crate::summary::{build_summary, Summary};
use crate::timing::{TimingAnalysis, TimingAnalyzer};
use campaign_core::config::AnalyzerConfig;
use campaign_core::types::{Event, RawEvent, UNKNOWN_RECIPIENT};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Everything computed for one campaign's event log.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub summary: Summary,
    pub funnel: FunnelMetrics,
    pub rates: ConversionRates,
    pub timing: TimingAnalysis,
    pub journeys: UserJourneys,
    pub drop_off: DropOffAnalysis,
    pub recipients_analyzed: u64,
    /// Recipients that fit no journey bucket (e.g. still in transit).
    pub unclassified_recipients: u64,
}

/// Stateless analyzer; safe to share across threads and campaigns.
#[derive(Debug, Clone, Default)]
pub struct SequenceAnalyzer {
    config: AnalyzerConfig,
}

impl SequenceAnalyzer {
    pub fn new(config: AnalyzerConfig) -> Self {
        Self { config }
    }

    /// Normalize raw event log records, then analyze them.
    pub fn analyze_raw(&self, raw: &[RawEvent]) -> AnalysisResult {
        self.analyze(&normalize_all(raw))
    }

    pub fn analyze(&self, events: &[Event]) -> AnalysisResult {
        metrics::counter!("analyzer.runs").increment(1);
        metrics::counter!("analyzer.events").increment(events.len() as u64);

        let sequences = group_by_recipient(events);
        if let Some(unknown) = sequences.get(UNKNOWN_RECIPIENT) {
            metrics::counter!("analyzer.unknown_recipients").increment(unknown.len() as u64);
            warn!(
                events = unknown.len(),
                "Events without recipient identity collapsed into one recipient"
            );
        }
        debug!(recipients = sequences.len(), "Grouped events by recipient");

        let progress: Vec<RecipientProgress> = sequences
            .values()
            .map(RecipientProgress::from_sequence)
            .collect();

        let funnel = FunnelAggregator::aggregate(&progress);
        let rates = ConversionRates::from_metrics(&funnel);
        debug!(
            sent = funnel.sent,
            delivered = funnel.delivered,
            opened = funnel.opened,
            clicked = funnel.clicked,
            "Funnel aggregated"
        );

        let timing = TimingAnalyzer::new(self.config.timing.clone(), self.config.time_zone)
            .analyze(&progress);
        debug!(
            pattern = ?timing.engagement_pattern,
            peak_hour = ?timing.peak_engagement_hour,
            "Timing analyzed"
        );

        let (journeys, unclassified) = classify_journeys(&progress);
        if unclassified > 0 {
            metrics::counter!("analyzer.unclassified_recipients").increment(unclassified);
            debug!(unclassified, "Recipients matched no journey bucket");
        }

        let drop_off = DropOffAnalysis::from_metrics(&funnel);
        let summary = build_summary(events, self.config.summary.top_types);

        info!(
            events = events.len(),
            recipients = progress.len(),
            primary_drop_off = %drop_off.primary_drop_off_stage,
            "Campaign event log analyzed"
        );

        AnalysisResult {
            summary,
            funnel,
            rates,
            timing,
            journeys,
            drop_off,
            recipients_analyzed: progress.len() as u64,
            unclassified_recipients: unclassified,
        }
    }
}

/// Analyze events with the default configuration (UTC hour bucketing).
pub fn analyze(events: &[Event]) -> AnalysisResult {
    SequenceAnalyzer::default().analyze(events)
}
