//! Single ordered walk over a recipient's sequence. The funnel, timing and
//! journey components all read the resulting [`RecipientProgress`].

use crate::grouper::RecipientSequence;
use campaign_core::types::EventKind;

const DELIVERED: usize = 1;
const OPENED: usize = 2;

/// What one recipient reached, and when they first reached it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecipientProgress {
    /// Indexed like [`EventKind::FUNNEL_STAGES`].
    reached: [bool; 6],
    first_seen_at: [Option<i64>; 6],
    /// Seconds from first delivery to first open. Gaps too wide for an
    /// `i64` are dropped rather than recorded.
    pub open_latency: Option<i64>,
    /// Seconds from first open (or first delivery) to first click.
    pub click_latency: Option<i64>,
    /// Timestamps of the first open and first click, for hour bucketing.
    pub engagement_times: Vec<i64>,
}

impl RecipientProgress {
    pub fn from_sequence(sequence: &RecipientSequence) -> Self {
        let mut progress = Self::default();

        for event in sequence.events() {
            let Some(stage) = event.kind.stage_index() else {
                continue;
            };
            if progress.reached[stage] {
                continue;
            }
            progress.reached[stage] = true;
            progress.first_seen_at[stage] = event.timestamp;

            let Some(at) = event.timestamp else {
                continue;
            };
            match event.kind {
                EventKind::Opened => {
                    if let Some(delivered_at) = progress.first_seen_at[DELIVERED] {
                        progress.open_latency = at.checked_sub(delivered_at);
                    }
                    progress.engagement_times.push(at);
                }
                EventKind::Clicked => {
                    let base = progress.first_seen_at[OPENED]
                        .or(progress.first_seen_at[DELIVERED]);
                    if let Some(base) = base {
                        progress.click_latency = at.checked_sub(base);
                    }
                    progress.engagement_times.push(at);
                }
                _ => {}
            }
        }

        progress
    }

    pub fn reached(&self, kind: EventKind) -> bool {
        kind.stage_index().is_some_and(|i| self.reached[i])
    }

    pub fn first_seen_at(&self, kind: EventKind) -> Option<i64> {
        kind.stage_index().and_then(|i| self.first_seen_at[i])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use campaign_core::types::Event;

    fn sequence(events: &[(EventKind, Option<i64>)]) -> RecipientSequence {
        RecipientSequence::new(
            "r".to_string(),
            events
                .iter()
                .map(|(kind, ts)| Event::new("r", *kind, *ts))
                .collect(),
        )
    }

    #[test]
    fn test_full_journey_latencies() {
        let p = RecipientProgress::from_sequence(&sequence(&[
            (EventKind::Sent, Some(0)),
            (EventKind::Delivered, Some(10)),
            (EventKind::Opened, Some(70)),
            (EventKind::Clicked, Some(130)),
        ]));
        assert!(p.reached(EventKind::Clicked));
        assert!(!p.reached(EventKind::Bounced));
        assert!(!p.reached(EventKind::Other));
        assert_eq!(p.open_latency, Some(60));
        assert_eq!(p.click_latency, Some(60));
        assert_eq!(p.engagement_times, vec![70, 130]);
    }

    #[test]
    fn test_only_first_occurrence_counts() {
        let p = RecipientProgress::from_sequence(&sequence(&[
            (EventKind::Delivered, Some(0)),
            (EventKind::Opened, Some(100)),
            (EventKind::Opened, Some(5000)),
        ]));
        assert_eq!(p.first_seen_at(EventKind::Opened), Some(100));
        assert_eq!(p.open_latency, Some(100));
        assert_eq!(p.engagement_times, vec![100]);
    }

    #[test]
    fn test_click_falls_back_to_delivery() {
        let p = RecipientProgress::from_sequence(&sequence(&[
            (EventKind::Delivered, Some(10)),
            (EventKind::Clicked, Some(40)),
        ]));
        assert_eq!(p.click_latency, Some(30));
        assert_eq!(p.open_latency, None);
    }

    #[test]
    fn test_click_without_anchor_records_nothing() {
        let p = RecipientProgress::from_sequence(&sequence(&[
            (EventKind::Sent, Some(0)),
            (EventKind::Clicked, Some(40)),
        ]));
        assert_eq!(p.click_latency, None);
        assert_eq!(p.engagement_times, vec![40]);
    }

    #[test]
    fn test_extreme_timestamps_drop_latency() {
        let p = RecipientProgress::from_sequence(&sequence(&[
            (EventKind::Delivered, Some(i64::MIN)),
            (EventKind::Opened, Some(i64::MAX)),
            (EventKind::Clicked, Some(i64::MAX)),
        ]));
        assert!(p.reached(EventKind::Opened));
        assert_eq!(p.open_latency, None);
        assert_eq!(p.click_latency, Some(0));
        assert_eq!(p.engagement_times, vec![i64::MAX, i64::MAX]);
    }

    #[test]
    fn test_missing_timestamps_excluded_from_timing() {
        let p = RecipientProgress::from_sequence(&sequence(&[
            (EventKind::Delivered, None),
            (EventKind::Opened, Some(100)),
        ]));
        assert!(p.reached(EventKind::Delivered));
        assert_eq!(p.open_latency, None);
        assert_eq!(p.engagement_times, vec![100]);
    }
}
