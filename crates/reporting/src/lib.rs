//! Campaign event-log sequence analysis — funnels, conversion rates, timing,
//! recipient journeys, drop-off diagnostics, and rule-based insights.

pub mod analyzer;
pub mod dropoff;
pub mod funnel;
pub mod grouper;
pub mod insights;
pub mod journey;
pub mod normalizer;
pub mod progress;
pub mod summary;
pub mod timing;

pub use analyzer::{analyze, AnalysisResult, SequenceAnalyzer};
pub use dropoff::{DropOffAnalysis, DropOffStage};
pub use funnel::{ConversionRates, FunnelAggregator, FunnelMetrics};
pub use grouper::{group_by_recipient, RecipientSequence};
pub use insights::{Insight, InsightEngine, InsightRule, Severity};
pub use journey::{JourneyBucket, UserJourneys};
pub use normalizer::{normalize, normalize_all};
pub use summary::{build_summary, Summary};
pub use timing::{EngagementPattern, TimingAnalysis, TimingAnalyzer};
