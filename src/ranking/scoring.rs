use chrono::{DateTime, Utc};

use crate::models::WidgetDescriptor;
use crate::ranking::config::ScoringConfig;

/// The engagement-relevant fields of a widget, extracted so the scorer and
/// the score-cache fingerprint agree on exactly which fields matter.
#[derive(Debug, Clone, PartialEq)]
pub struct EngagementSignals {
    pub priority: u32,
    pub last_viewed: Option<DateTime<Utc>>,
    pub view_count: u32,
    pub interaction_count: u32,
}

impl EngagementSignals {
    pub fn of<W>(widget: &WidgetDescriptor<W>) -> Self {
        Self {
            priority: widget.priority,
            last_viewed: widget.last_viewed,
            view_count: widget.view_count,
            interaction_count: widget.interaction_count,
        }
    }
}

/// Compute the ranking score for one widget.
///
/// Static priority is the floor, so important widgets never rank below their
/// configured importance. Views contribute `view_count * view_weight` scaled
/// by half-life decay on the time since the last view, so a single old view
/// eventually contributes ~0 while repeated recent views compound.
/// Interactions contribute `interaction_count * interaction_weight` and do
/// not decay.
pub fn engagement_score(
    signals: &EngagementSignals,
    now: DateTime<Utc>,
    config: &ScoringConfig,
) -> f64 {
    let mut score = signals.priority as f64;

    if let Some(last_viewed) = signals.last_viewed {
        let elapsed_ms = (now - last_viewed).num_milliseconds() as f64;
        let half_life_ms = config.view_half_life.num_milliseconds() as f64;
        let decay = 0.5_f64.powf(elapsed_ms / half_life_ms);
        score += signals.view_count as f64 * config.view_weight * decay;
    }

    score += signals.interaction_count as f64 * config.interaction_weight;

    score
}

/// Fingerprint of the engagement-relevant fields.
///
/// A cached score is reusable only while the descriptor still hashes to the
/// same fingerprint, which makes the score cache self-invalidating on any
/// engagement-relevant mutation.
pub fn engagement_fingerprint(signals: &EngagementSignals) -> String {
    let last_viewed_ms = signals
        .last_viewed
        .map(|t| t.timestamp_millis())
        .unwrap_or(-1);
    format!(
        "{}:{}:{}:{}",
        signals.priority, last_viewed_ms, signals.view_count, signals.interaction_count
    )
}
