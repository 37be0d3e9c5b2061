use chrono::Duration;

/// Tunable weights for the engagement ranking.
#[derive(Debug, Clone)]
pub struct ScoringConfig {
    /// Half-life of the view-recency decay: a view this old contributes half
    /// the weight of a view recorded just now.
    pub view_half_life: Duration,

    /// Weight of a single fully-fresh view.
    pub view_weight: f64,

    /// Weight of a single explicit interaction. Interactions never decay.
    pub interaction_weight: f64,

    /// How long a cached score stays reusable without recomputation.
    pub score_ttl: Duration,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            view_half_life: Duration::days(3),
            view_weight: 10.0,
            interaction_weight: 50.0,
            score_ttl: Duration::minutes(5),
        }
    }
}
