//! Drop-off analysis — percentage of recipients lost between adjacent
//! funnel stages, and the stage that loses the most.

use crate::funnel::{percentage, round2, FunnelMetrics};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DropOffStage {
    #[default]
    Delivery,
    Opening,
    Clicking,
}

impl fmt::Display for DropOffStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DropOffStage::Delivery => "delivery",
            DropOffStage::Opening => "opening",
            DropOffStage::Clicking => "clicking",
        })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DropOffAnalysis {
    pub delivery_drop_off: f64,
    pub open_drop_off: f64,
    pub click_drop_off: f64,
    pub primary_drop_off_stage: DropOffStage,
}

impl DropOffAnalysis {
    pub fn from_metrics(m: &FunnelMetrics) -> Self {
        let delivery = percentage(m.sent.saturating_sub(m.delivered), m.sent);
        let open = percentage(m.delivered.saturating_sub(m.opened), m.delivered);
        let click = percentage(m.opened.saturating_sub(m.clicked), m.opened);

        // Delivery is the fallback; it wins every tie.
        let primary = if open > delivery && open > click {
            DropOffStage::Opening
        } else if click > delivery && click > open {
            DropOffStage::Clicking
        } else {
            DropOffStage::Delivery
        };

        Self {
            delivery_drop_off: round2(delivery),
            open_drop_off: round2(open),
            click_drop_off: round2(click),
            primary_drop_off_stage: primary,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metrics(sent: u64, delivered: u64, opened: u64, clicked: u64) -> FunnelMetrics {
        FunnelMetrics {
            sent,
            delivered,
            opened,
            clicked,
            ..Default::default()
        }
    }

    #[test]
    fn test_opening_is_primary() {
        let d = DropOffAnalysis::from_metrics(&metrics(3, 2, 1, 1));
        assert_eq!(d.delivery_drop_off, 33.33);
        assert_eq!(d.open_drop_off, 50.0);
        assert_eq!(d.click_drop_off, 0.0);
        assert_eq!(d.primary_drop_off_stage, DropOffStage::Opening);
    }

    #[test]
    fn test_clicking_is_primary() {
        let d = DropOffAnalysis::from_metrics(&metrics(10, 10, 8, 1));
        assert_eq!(d.primary_drop_off_stage, DropOffStage::Clicking);
        assert_eq!(d.click_drop_off, 87.5);
    }

    #[test]
    fn test_ties_resolve_to_delivery() {
        // open == click == 50%, delivery 0%: neither strictly beats the other.
        let d = DropOffAnalysis::from_metrics(&metrics(4, 4, 2, 1));
        assert_eq!(d.open_drop_off, 50.0);
        assert_eq!(d.click_drop_off, 50.0);
        assert_eq!(d.primary_drop_off_stage, DropOffStage::Delivery);
    }

    #[test]
    fn test_empty_funnel() {
        let d = DropOffAnalysis::from_metrics(&FunnelMetrics::default());
        assert_eq!(d, DropOffAnalysis::default());
        assert_eq!(d.primary_drop_off_stage.to_string(), "delivery");
    }

    #[test]
    fn test_inverted_stages_never_negative() {
        // More clicks than opens (opens not tracked): drop-off floors at zero.
        let d = DropOffAnalysis::from_metrics(&metrics(5, 5, 1, 4));
        assert_eq!(d.click_drop_off, 0.0);
    }
}
