//! Journey classification — places each recipient in the first bucket that
//! describes how far they progressed.

use crate::progress::RecipientProgress;
use campaign_core::types::EventKind;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JourneyBucket {
    CompleteJourney,
    OpenedNotClicked,
    DeliveredNotOpened,
    BouncedImmediately,
}

impl JourneyBucket {
    /// First matching bucket, or `None` for a recipient that fits none of them
    /// (for example sent but neither delivered nor bounced yet).
    pub fn classify(progress: &RecipientProgress) -> Option<Self> {
        let sent = progress.reached(EventKind::Sent);
        let delivered = progress.reached(EventKind::Delivered);
        let opened = progress.reached(EventKind::Opened);
        let clicked = progress.reached(EventKind::Clicked);
        let bounced = progress.reached(EventKind::Bounced);

        if sent && delivered && opened && clicked {
            Some(JourneyBucket::CompleteJourney)
        } else if sent && delivered && opened {
            Some(JourneyBucket::OpenedNotClicked)
        } else if sent && delivered {
            Some(JourneyBucket::DeliveredNotOpened)
        } else if sent && bounced {
            Some(JourneyBucket::BouncedImmediately)
        } else {
            None
        }
    }
}

/// Recipients per journey bucket. Does not necessarily sum to the number of
/// recipients analyzed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserJourneys {
    pub complete_journey: u64,
    pub opened_not_clicked: u64,
    pub delivered_not_opened: u64,
    pub bounced_immediately: u64,
}

impl UserJourneys {
    pub fn total(&self) -> u64 {
        self.complete_journey
            + self.opened_not_clicked
            + self.delivered_not_opened
            + self.bounced_immediately
    }

    pub fn record(&mut self, bucket: JourneyBucket) {
        match bucket {
            JourneyBucket::CompleteJourney => self.complete_journey += 1,
            JourneyBucket::OpenedNotClicked => self.opened_not_clicked += 1,
            JourneyBucket::DeliveredNotOpened => self.delivered_not_opened += 1,
            JourneyBucket::BouncedImmediately => self.bounced_immediately += 1,
        }
    }
}

/// Classify every recipient. Returns the bucket counts and the number of
/// recipients that matched no bucket.
pub fn classify_journeys<'a>(
    progress: impl IntoIterator<Item = &'a RecipientProgress>,
) -> (UserJourneys, u64) {
    let mut journeys = UserJourneys::default();
    let mut unclassified = 0;
    for p in progress {
        match JourneyBucket::classify(p) {
            Some(bucket) => journeys.record(bucket),
            None => unclassified += 1,
        }
    }
    (journeys, unclassified)
}
