//! Lazy-load policy for dashboard widgets.
//!
//! Anchor widgets resolve their implementations eagerly at dashboard mount;
//! quiet widgets defer until first scroll-into-view or explicit expand. The
//! classifier only governs deferral, not visibility: an id in neither set is
//! treated as anchor-equivalent by the consuming UI layer.

use std::collections::HashSet;

use log::warn;

/// Which widgets load eagerly and which defer.
#[derive(Debug, Clone)]
pub struct LayoutConfig {
    pub anchor: Vec<String>,
    pub quiet: Vec<String>,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            // The daily touchpoints render the moment the dashboard mounts
            anchor: vec!["daily-reflection".into(), "daily-quiz".into()],
            // Heavyweight widgets wait until the user reaches them
            quiet: vec![
                "scenario-prompts".into(),
                "age-simulator".into(),
                "media-wall".into(),
            ],
        }
    }
}

/// Static partition of widget ids into anchor and quiet sets.
///
/// The sets are disjoint by construction: an id configured on both sides is
/// kept as anchor and dropped from quiet.
pub struct LoadClassifier {
    anchor: HashSet<String>,
    quiet: HashSet<String>,
}

impl LoadClassifier {
    pub fn new(config: &LayoutConfig) -> Self {
        let anchor: HashSet<String> = config.anchor.iter().cloned().collect();

        let mut quiet = HashSet::new();
        for id in &config.quiet {
            if anchor.contains(id) {
                warn!("widget '{id}' configured as both anchor and quiet; keeping anchor");
                continue;
            }
            quiet.insert(id.clone());
        }

        Self { anchor, quiet }
    }

    pub fn is_anchor(&self, id: &str) -> bool {
        self.anchor.contains(id)
    }

    pub fn is_quiet(&self, id: &str) -> bool {
        self.quiet.contains(id)
    }
}

impl Default for LoadClassifier {
    fn default() -> Self {
        Self::new(&LayoutConfig::default())
    }
}
