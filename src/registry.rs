use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};
use log::{debug, error, warn};

use crate::models::{OverrideRecord, WidgetDescriptor};
use crate::ranking::{engagement_fingerprint, engagement_score, EngagementSignals, ScoringConfig};
use crate::storage::KeyValueStore;

/// Storage key the serialized override map lives under.
const OVERRIDES_KEY: &str = "widget_overrides";

struct ScoreCacheEntry {
    score: f64,
    computed_at: DateTime<Utc>,
    fingerprint: String,
}

/// Owns the merged widget catalog, layers per-widget user overrides on top,
/// and produces engagement-ranked views of it.
///
/// One registry instance exists per running application; all mutation goes
/// through its methods. Scores are cached per widget and revalidated against
/// both a TTL and a fingerprint of the engagement-relevant fields, so a
/// recorded view or interaction is always reflected in the next sorted view
/// even inside the TTL window.
pub struct WidgetRegistry<W> {
    catalog: Vec<WidgetDescriptor<W>>,
    overrides: RwLock<HashMap<String, OverrideRecord>>,
    score_cache: RwLock<HashMap<String, ScoreCacheEntry>>,
    listeners: RwLock<Vec<Box<dyn Fn() + Send + Sync>>>,
    store: Arc<dyn KeyValueStore>,
    config: ScoringConfig,
}

impl<W> WidgetRegistry<W> {
    /// Build the registry from the static catalog plus any custom entries.
    ///
    /// Custom entries win on id collision. The override map is loaded from
    /// durable storage once, here; an unreadable or corrupt map degrades to
    /// empty rather than failing construction.
    pub fn new(
        static_catalog: Vec<WidgetDescriptor<W>>,
        custom_catalog: Vec<WidgetDescriptor<W>>,
        store: Arc<dyn KeyValueStore>,
        config: ScoringConfig,
    ) -> Self {
        let catalog = merge_catalogs(static_catalog, custom_catalog);
        let overrides = load_overrides(store.as_ref());

        Self {
            catalog,
            overrides: RwLock::new(overrides),
            score_cache: RwLock::new(HashMap::new()),
            listeners: RwLock::new(Vec::new()),
            store,
            config,
        }
    }

    /// All catalog entries with their overrides merged in.
    pub fn get_all(&self) -> Vec<WidgetDescriptor<W>> {
        let overrides = self.overrides.read().unwrap();
        self.catalog
            .iter()
            .map(|widget| {
                let mut merged = widget.clone();
                if let Some(record) = overrides.get(&merged.id) {
                    merged.apply_override(record);
                }
                merged
            })
            .collect()
    }

    /// Enabled catalog entries with their overrides merged in.
    pub fn get_enabled(&self) -> Vec<WidgetDescriptor<W>> {
        self.get_all()
            .into_iter()
            .filter(|widget| widget.enabled)
            .collect()
    }

    /// Enabled entries in display order: pinned first, then descending
    /// engagement score, then descending static priority on equal scores.
    pub fn get_sorted(&self) -> Vec<WidgetDescriptor<W>> {
        let mut widgets = self.get_enabled();
        for widget in &mut widgets {
            widget.engagement_score = self.cached_score(&widget.id, &EngagementSignals::of(widget));
        }

        widgets.sort_by(|a, b| {
            b.pinned
                .cmp(&a.pinned)
                .then_with(|| {
                    b.engagement_score
                        .partial_cmp(&a.engagement_score)
                        .unwrap_or(Ordering::Equal)
                })
                .then_with(|| b.priority.cmp(&a.priority))
        });

        widgets
    }

    /// Merge `patch` into the override record for `id` and persist the map.
    ///
    /// Unknown ids are stored regardless; the orphaned override simply has
    /// no effect until a matching descriptor exists.
    pub fn update_preference(&self, id: &str, patch: OverrideRecord) {
        {
            let mut overrides = self.overrides.write().unwrap();
            if !self.catalog.iter().any(|widget| widget.id == id)
                && !overrides.contains_key(id)
            {
                debug!("storing override for unknown widget '{id}'");
            }
            overrides.entry(id.to_string()).or_default().merge(patch);
            self.persist(&overrides);
        }

        self.score_cache.write().unwrap().remove(id);
        self.notify_listeners();
    }

    /// Record a passive view: stamps `last_viewed` and bumps the view count.
    pub fn record_view(&self, id: &str) {
        let views = self.effective_counts(id).0;
        self.update_preference(
            id,
            OverrideRecord {
                last_viewed: Some(Utc::now()),
                view_count: Some(views + 1),
                ..Default::default()
            },
        );
    }

    /// Record an explicit interaction: bumps the interaction count.
    pub fn record_interaction(&self, id: &str) {
        let interactions = self.effective_counts(id).1;
        self.update_preference(
            id,
            OverrideRecord {
                interaction_count: Some(interactions + 1),
                ..Default::default()
            },
        );
    }

    /// Register a callback run after every preference mutation. Downstream
    /// consumers use this to refetch their sorted list.
    pub fn subscribe(&self, listener: impl Fn() + Send + Sync + 'static) {
        self.listeners.write().unwrap().push(Box::new(listener));
    }

    fn notify_listeners(&self) {
        for listener in self.listeners.read().unwrap().iter() {
            listener();
        }
    }

    /// Current (view, interaction) counts for `id` with overrides applied.
    fn effective_counts(&self, id: &str) -> (u32, u32) {
        let overrides = self.overrides.read().unwrap();
        let record = overrides.get(id);
        let base = self.catalog.iter().find(|widget| widget.id == id);

        let views = record
            .and_then(|r| r.view_count)
            .or_else(|| base.map(|w| w.view_count))
            .unwrap_or(0);
        let interactions = record
            .and_then(|r| r.interaction_count)
            .or_else(|| base.map(|w| w.interaction_count))
            .unwrap_or(0);

        (views, interactions)
    }

    /// Serve the score from the cache when both the TTL and the fingerprint
    /// still hold; recompute and overwrite the entry otherwise. The
    /// fingerprint comparison is the authoritative staleness check; the
    /// explicit eviction in `update_preference` is an optimization.
    fn cached_score(&self, id: &str, signals: &EngagementSignals) -> f64 {
        let now = Utc::now();
        let fingerprint = engagement_fingerprint(signals);

        {
            let cache = self.score_cache.read().unwrap();
            if let Some(entry) = cache.get(id) {
                if entry.fingerprint == fingerprint
                    && now - entry.computed_at < self.config.score_ttl
                {
                    return entry.score;
                }
            }
        }

        let score = engagement_score(signals, now, &self.config);
        self.score_cache.write().unwrap().insert(
            id.to_string(),
            ScoreCacheEntry {
                score,
                computed_at: now,
                fingerprint,
            },
        );
        score
    }

    fn persist(&self, overrides: &HashMap<String, OverrideRecord>) {
        match serde_json::to_string(overrides) {
            Ok(raw) => {
                if let Err(err) = self.store.write(OVERRIDES_KEY, &raw) {
                    error!("Failed to persist widget overrides: {err}");
                }
            }
            Err(err) => error!("Failed to serialize widget overrides: {err}"),
        }
    }
}

fn merge_catalogs<W>(
    static_catalog: Vec<WidgetDescriptor<W>>,
    custom_catalog: Vec<WidgetDescriptor<W>>,
) -> Vec<WidgetDescriptor<W>> {
    let mut merged: Vec<WidgetDescriptor<W>> = Vec::new();
    let mut index_by_id: HashMap<String, usize> = HashMap::new();

    for widget in static_catalog.into_iter().chain(custom_catalog) {
        match index_by_id.get(&widget.id) {
            Some(&index) => {
                debug!("catalog entry '{}' replaced by later registration", widget.id);
                merged[index] = widget;
            }
            None => {
                index_by_id.insert(widget.id.clone(), merged.len());
                merged.push(widget);
            }
        }
    }

    merged
}

fn load_overrides(store: &dyn KeyValueStore) -> HashMap<String, OverrideRecord> {
    match store.read(OVERRIDES_KEY) {
        Ok(Some(raw)) => match serde_json::from_str(&raw) {
            Ok(overrides) => overrides,
            Err(err) => {
                warn!("Stored widget overrides are corrupt, starting fresh: {err}");
                HashMap::new()
            }
        },
        Ok(None) => HashMap::new(),
        Err(err) => {
            warn!("Failed to read widget overrides, starting fresh: {err}");
            HashMap::new()
        }
    }
}
