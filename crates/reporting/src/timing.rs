//! Timing analysis — open/click latency averages, the peak engagement hour,
//! and a coarse classification of how quickly recipients open.

use crate::funnel::round2;
use crate::progress::RecipientProgress;
use campaign_core::config::{TimeZoneMode, TimingConfig};
use chrono::{Local, TimeZone, Timelike, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EngagementPattern {
    Immediate,
    Delayed,
    Mixed,
    #[default]
    Unknown,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TimingAnalysis {
    /// Mean seconds from delivery to first open.
    pub avg_time_to_open: Option<f64>,
    /// Mean seconds from open (or delivery) to first click.
    pub avg_time_to_click: Option<f64>,
    /// Hour of day (0-23) with the most first opens and first clicks.
    pub peak_engagement_hour: Option<u32>,
    pub engagement_pattern: EngagementPattern,
    /// First-engagement counts per hour of day.
    pub hourly_engagement: [u64; 24],
}

pub struct TimingAnalyzer {
    config: TimingConfig,
    time_zone: TimeZoneMode,
}

impl TimingAnalyzer {
    pub fn new(config: TimingConfig, time_zone: TimeZoneMode) -> Self {
        Self { config, time_zone }
    }

    pub fn analyze<'a>(&self, progress: impl IntoIterator<Item = &'a RecipientProgress>) -> TimingAnalysis {
        let mut open_latencies = Vec::new();
        let mut click_latencies = Vec::new();
        let mut hourly = [0u64; 24];

        for p in progress {
            open_latencies.extend(p.open_latency);
            click_latencies.extend(p.click_latency);
            for &at in &p.engagement_times {
                if let Some(hour) = self.hour_of_day(at) {
                    hourly[hour as usize] += 1;
                }
            }
        }

        TimingAnalysis {
            avg_time_to_open: mean(&open_latencies).map(round2),
            avg_time_to_click: mean(&click_latencies).map(round2),
            peak_engagement_hour: peak_hour(&hourly),
            engagement_pattern: self.classify(&open_latencies),
            hourly_engagement: hourly,
        }
    }

    /// Hour of day for an epoch timestamp in the configured zone.
    pub fn hour_of_day(&self, epoch_secs: i64) -> Option<u32> {
        match self.time_zone {
            TimeZoneMode::Utc => Utc.timestamp_opt(epoch_secs, 0).earliest().map(|t| t.hour()),
            TimeZoneMode::Local => Local.timestamp_opt(epoch_secs, 0).earliest().map(|t| t.hour()),
        }
    }

    fn classify(&self, open_latencies: &[i64]) -> EngagementPattern {
        if open_latencies.is_empty() {
            return EngagementPattern::Unknown;
        }
        let immediate = open_latencies
            .iter()
            .filter(|&&l| l < self.config.immediate_open_secs)
            .count();
        let ratio = immediate as f64 / open_latencies.len() as f64;

        if ratio >= self.config.immediate_ratio {
            EngagementPattern::Immediate
        } else if ratio <= self.config.delayed_ratio {
            EngagementPattern::Delayed
        } else {
            EngagementPattern::Mixed
        }
    }
}

impl Default for TimingAnalyzer {
    fn default() -> Self {
        Self::new(TimingConfig::default(), TimeZoneMode::Utc)
    }
}

fn mean(samples: &[i64]) -> Option<f64> {
    if samples.is_empty() {
        return None;
    }
    let sum: f64 = samples.iter().map(|&s| s as f64).sum();
    Some(sum / samples.len() as f64)
}

// Ties go to the earliest hour.
fn peak_hour(hourly: &[u64; 24]) -> Option<u32> {
    let mut peak: Option<(usize, u64)> = None;
    for (hour, &count) in hourly.iter().enumerate() {
        if count > 0 && peak.map_or(true, |(_, best)| count > best) {
            peak = Some((hour, count));
        }
    }
    peak.map(|(hour, _)| hour as u32)
}
