//! Widget catalog data models.
//!
//! A `WidgetDescriptor` is one addressable unit of dashboard content (daily
//! reflection, quiz, media wall, ...). User-specific mutable state lives in
//! `OverrideRecord`s layered on top of the static catalog entry.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Future produced by a lazy widget loader.
pub type LoadFuture<W> = Pin<Box<dyn Future<Output = Result<Arc<W>>> + Send>>;

/// How a widget's renderable implementation is obtained.
///
/// Anchor widgets ship `Eager` implementations resolved at dashboard mount;
/// quiet widgets ship `Lazy` factories resolved on first scroll-into-view or
/// explicit expand. The core never invokes or inspects either variant; that
/// is the UI layer's job.
pub enum WidgetLoader<W> {
    Eager(Arc<W>),
    Lazy(Arc<dyn Fn() -> LoadFuture<W> + Send + Sync>),
}

impl<W> WidgetLoader<W> {
    pub fn lazy<F>(load: F) -> Self
    where
        F: Fn() -> LoadFuture<W> + Send + Sync + 'static,
    {
        WidgetLoader::Lazy(Arc::new(load))
    }
}

impl<W> Clone for WidgetLoader<W> {
    fn clone(&self) -> Self {
        match self {
            WidgetLoader::Eager(implementation) => WidgetLoader::Eager(Arc::clone(implementation)),
            WidgetLoader::Lazy(load) => WidgetLoader::Lazy(Arc::clone(load)),
        }
    }
}

impl<W> fmt::Debug for WidgetLoader<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WidgetLoader::Eager(_) => f.write_str("WidgetLoader::Eager(..)"),
            WidgetLoader::Lazy(_) => f.write_str("WidgetLoader::Lazy(..)"),
        }
    }
}

/// One entry of the widget catalog.
///
/// `engagement_score` is derived, not authoritative: the registry fills it
/// when producing sorted views and it is recomputed (or served from the score
/// cache) on demand.
pub struct WidgetDescriptor<W> {
    pub id: String,
    pub name: String,
    pub loader: WidgetLoader<W>,
    /// Static importance set by configuration; higher = more important baseline.
    pub priority: u32,
    pub enabled: bool,
    /// Pinned widgets always sort first regardless of score.
    pub pinned: bool,
    pub last_viewed: Option<DateTime<Utc>>,
    pub view_count: u32,
    pub interaction_count: u32,
    pub engagement_score: f64,
}

impl<W> WidgetDescriptor<W> {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        loader: WidgetLoader<W>,
        priority: u32,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            loader,
            priority,
            enabled: true,
            pinned: false,
            last_viewed: None,
            view_count: 0,
            interaction_count: 0,
            engagement_score: 0.0,
        }
    }

    /// Layer a user override on top of this catalog entry. Override fields win.
    pub fn apply_override(&mut self, record: &OverrideRecord) {
        if let Some(pinned) = record.pinned {
            self.pinned = pinned;
        }
        if let Some(last_viewed) = record.last_viewed {
            self.last_viewed = Some(last_viewed);
        }
        if let Some(view_count) = record.view_count {
            self.view_count = view_count;
        }
        if let Some(interaction_count) = record.interaction_count {
            self.interaction_count = interaction_count;
        }
    }
}

impl<W> Clone for WidgetDescriptor<W> {
    fn clone(&self) -> Self {
        Self {
            id: self.id.clone(),
            name: self.name.clone(),
            loader: self.loader.clone(),
            priority: self.priority,
            enabled: self.enabled,
            pinned: self.pinned,
            last_viewed: self.last_viewed,
            view_count: self.view_count,
            interaction_count: self.interaction_count,
            engagement_score: self.engagement_score,
        }
    }
}

impl<W> fmt::Debug for WidgetDescriptor<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WidgetDescriptor")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("loader", &self.loader)
            .field("priority", &self.priority)
            .field("enabled", &self.enabled)
            .field("pinned", &self.pinned)
            .field("last_viewed", &self.last_viewed)
            .field("view_count", &self.view_count)
            .field("interaction_count", &self.interaction_count)
            .field("engagement_score", &self.engagement_score)
            .finish()
    }
}

/// Per-widget user-specific mutable state, keyed by widget id.
///
/// Created or updated whenever a view or interaction is recorded, persisted
/// to durable storage on every mutation, loaded once at registry
/// construction. Doubles as the partial-update patch for
/// `WidgetRegistry::update_preference`: `None` fields leave the stored
/// record untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OverrideRecord {
    pub pinned: Option<bool>,
    pub last_viewed: Option<DateTime<Utc>>,
    pub view_count: Option<u32>,
    pub interaction_count: Option<u32>,
}

impl OverrideRecord {
    /// Field-wise merge: `Some` patch fields replace the stored value.
    pub fn merge(&mut self, patch: OverrideRecord) {
        if patch.pinned.is_some() {
            self.pinned = patch.pinned;
        }
        if patch.last_viewed.is_some() {
            self.last_viewed = patch.last_viewed;
        }
        if patch.view_count.is_some() {
            self.view_count = patch.view_count;
        }
        if patch.interaction_count.is_some() {
            self.interaction_count = patch.interaction_count;
        }
    }
}
