//! Engagement core for the Kinboard family dashboard.
//!
//! Owns the widget catalog and its engagement-based ordering, the TTL cache
//! that backs remote query results, and the anchor/quiet lazy-loading
//! policy. Rendering, data fetching, and authentication live in the
//! application shell on top of this crate.

pub mod cache;
pub mod loading;
pub mod models;
pub mod ranking;
pub mod registry;
pub mod storage;
pub mod utils;

use std::sync::Arc;

use log::info;

pub use cache::query::{cached_query, invalidate_table, query_cache_key};
pub use cache::{CacheConfig, CacheStats, TtlCache};
pub use loading::{LayoutConfig, LoadClassifier};
pub use models::{LoadFuture, OverrideRecord, WidgetDescriptor, WidgetLoader};
pub use ranking::{engagement_score, EngagementSignals, ScoringConfig};
pub use registry::WidgetRegistry;
pub use storage::{FileStore, KeyValueStore, MemoryStore, SqliteStore};
pub use utils::init_logging;

/// Top-level knobs for a [`Dashboard`].
#[derive(Debug, Clone, Default)]
pub struct DashboardConfig {
    pub scoring: ScoringConfig,
    pub cache: CacheConfig,
    pub layout: LayoutConfig,
}

/// The one process-wide dashboard core: registry, query cache, and
/// lazy-load policy, constructed once at application start and shared by
/// reference with every consumer.
pub struct Dashboard<W> {
    pub registry: WidgetRegistry<W>,
    pub query_cache: TtlCache<serde_json::Value>,
    pub loading: LoadClassifier,
}

impl<W> Dashboard<W> {
    pub fn new(
        static_catalog: Vec<WidgetDescriptor<W>>,
        custom_catalog: Vec<WidgetDescriptor<W>>,
        store: Arc<dyn KeyValueStore>,
        config: DashboardConfig,
    ) -> Self {
        let widget_total = static_catalog.len() + custom_catalog.len();
        let registry = WidgetRegistry::new(static_catalog, custom_catalog, store, config.scoring);
        info!("Dashboard core initialized with {widget_total} registered widgets");

        Self {
            registry,
            query_cache: TtlCache::with_config(config.cache),
            loading: LoadClassifier::new(&config.layout),
        }
    }
}
