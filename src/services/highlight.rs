//! Matcher and highlighter
//!
//! Scans a buffer for image references, caches the regions per buffer, and
//! underlines them grouped by lexical scope so the host can color each
//! underline like the text it sits on.
//!
//! Decoration groups are keyed by scope name. Adding a group replaces it,
//! so a rescan only has to erase the groups whose scope disappeared.

use crate::config::{Config, SharedConfig};
use crate::host::{HostProfile, View, DECORATION_KEY_PREFIX};
use crate::model::event::BufferId;
use crate::model::region::{BufferMatches, MatchKind, Region};
use crate::primitives::patterns::pattern_for;
use crate::state::BufferRegistry;
use indexmap::{IndexMap, IndexSet};
use std::sync::{Arc, Mutex, PoisonError};

/// Decoration group key for a scope
pub fn decoration_key(scope_name: &str) -> String {
    format!("{DECORATION_KEY_PREFIX}{scope_name}")
}

/// Finds image references and keeps their underlines in sync
pub struct Highlighter {
    registry: Arc<BufferRegistry>,
    profile: Arc<dyn HostProfile>,
    config: SharedConfig,
    /// Serializes scans dispatched off the event thread
    scan_lock: Mutex<()>,
}

impl Highlighter {
    pub fn new(
        registry: Arc<BufferRegistry>,
        profile: Arc<dyn HostProfile>,
        config: SharedConfig,
    ) -> Self {
        Self {
            registry,
            profile,
            config,
            scan_lock: Mutex::new(()),
        }
    }

    /// Rescan a buffer: find matches, cache them and underline them.
    ///
    /// Buffers that once exceeded `max_url_limit` are skipped until closed.
    pub fn rescan(&self, view: &dyn View) {
        let id = view.id();
        if self.registry.is_ignored(id) {
            tracing::trace!("Skipping ignored buffer {:?}", id);
            return;
        }

        let config = Config::snapshot(&self.config);

        let mut matches = BufferMatches::default();
        for kind in MatchKind::PRIORITY {
            if config.kind_enabled(kind) {
                *matches.of_kind_mut(kind) = view.find_all(pattern_for(kind));
            }
        }

        let counted = matches.counted_len();
        if counted > config.max_url_limit {
            tracing::info!(
                "Ignoring buffer {:?} with {} image references (limit {})",
                id,
                counted,
                config.max_url_limit
            );
            self.registry.mark_ignored(id);
            return;
        }

        let all = matches.all();
        tracing::debug!("Buffer {:?}: {} image references", id, all.len());
        if matches.is_empty() {
            self.registry.clear_matches(id);
        } else {
            self.registry.store_matches(id, matches);
        }

        if config.highlight_images {
            self.highlight(view, &all);
        }
    }

    /// Same as [`rescan`](Self::rescan), holding the process-wide scan lock.
    ///
    /// The lock is released when the scan returns or unwinds.
    pub fn rescan_serialized(&self, view: &dyn View) {
        let _guard = self.scan_lock.lock().unwrap_or_else(PoisonError::into_inner);
        self.rescan(view);
    }

    /// Drop all state for a closed buffer, under the scan lock
    pub fn forget(&self, id: BufferId) {
        let _guard = self.scan_lock.lock().unwrap_or_else(PoisonError::into_inner);
        if self.registry.remove(id).is_some() {
            tracing::debug!("Dropped state for closed buffer {:?}", id);
        }
    }

    /// Group regions by the scope at their start and underline each group
    pub fn highlight(&self, view: &dyn View, regions: &[Region]) {
        let mut groups: IndexMap<String, Vec<Region>> = IndexMap::new();
        for region in regions {
            groups
                .entry(view.scope_name(region.start))
                .or_default()
                .push(*region);
        }

        for (scope_name, scope_regions) in &groups {
            self.underline(view, scope_name, scope_regions);
        }

        self.reconcile_scopes(view, groups.into_keys().collect());
    }

    /// Create or replace the underline group for `scope_name`
    pub fn underline(&self, view: &dyn View, scope_name: &str, regions: &[Region]) {
        self.profile
            .underline(view, &decoration_key(scope_name), regions, scope_name);
    }

    /// Record the new scope set for the buffer and erase groups for scopes
    /// that are no longer in use
    pub fn reconcile_scopes(&self, view: &dyn View, new_scopes: IndexSet<String>) {
        let id = view.id();
        let old_scopes = self.registry.replace_scopes(id, new_scopes.clone());
        for unused in old_scopes.difference(&new_scopes) {
            tracing::debug!("Buffer {:?}: erasing underline for scope {:?}", id, unused);
            view.erase_regions(&decoration_key(unused));
        }
    }
}
