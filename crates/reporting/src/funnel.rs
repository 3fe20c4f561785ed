//! Funnel aggregation — unique-recipient counts per stage and the
//! conversion rates derived from them.

use crate::progress::RecipientProgress;
use campaign_core::types::EventKind;
use serde::{Deserialize, Serialize};

/// Unique recipients that reached each stage at least once.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunnelMetrics {
    pub sent: u64,
    pub delivered: u64,
    pub opened: u64,
    pub clicked: u64,
    pub bounced: u64,
    pub unsubscribed: u64,
}

impl FunnelMetrics {
    fn record(&mut self, progress: &RecipientProgress) {
        for kind in EventKind::FUNNEL_STAGES {
            if !progress.reached(kind) {
                continue;
            }
            match kind {
                EventKind::Sent => self.sent += 1,
                EventKind::Delivered => self.delivered += 1,
                EventKind::Opened => self.opened += 1,
                EventKind::Clicked => self.clicked += 1,
                EventKind::Bounced => self.bounced += 1,
                EventKind::Unsubscribed => self.unsubscribed += 1,
                EventKind::Other => {}
            }
        }
    }
}

/// Stage-to-stage conversion rates, as percentages in `[0, 100]`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ConversionRates {
    pub delivery_rate: f64,
    pub open_rate: f64,
    pub click_through_rate: f64,
    pub click_to_open_rate: f64,
    pub bounce_rate: f64,
    pub unsubscribe_rate: f64,
}

impl ConversionRates {
    pub fn from_metrics(m: &FunnelMetrics) -> Self {
        Self {
            delivery_rate: round2(percentage(m.delivered, m.sent)),
            open_rate: round2(percentage(m.opened, m.delivered)),
            click_through_rate: round2(percentage(m.clicked, m.delivered)),
            click_to_open_rate: round2(percentage(m.clicked, m.opened)),
            bounce_rate: round2(percentage(m.bounced, m.sent)),
            unsubscribe_rate: round2(percentage(m.unsubscribed, m.delivered)),
        }
    }
}

/// Counts unique recipients per funnel stage.
#[derive(Debug, Default, Clone)]
pub struct FunnelAggregator {
    metrics: FunnelMetrics,
}

impl FunnelAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn observe(&mut self, progress: &RecipientProgress) {
        self.metrics.record(progress);
    }

    pub fn finish(self) -> FunnelMetrics {
        self.metrics
    }

    pub fn aggregate<'a>(progress: impl IntoIterator<Item = &'a RecipientProgress>) -> FunnelMetrics {
        let mut aggregator = Self::new();
        for p in progress {
            aggregator.observe(p);
        }
        aggregator.finish()
    }
}

/// `numerator / denominator * 100`, clamped to `[0, 100]`; 0 for an empty denominator.
pub(crate) fn percentage(numerator: u64, denominator: u64) -> f64 {
    if denominator == 0 {
        return 0.0;
    }
    (numerator as f64 / denominator as f64 * 100.0).clamp(0.0, 100.0)
}

pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
