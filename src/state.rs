//! Per-buffer state owned by the extension
//!
//! One [`BufferState`] record per open buffer, kept in a single
//! [`BufferRegistry`]. Records are created on first scan and dropped when
//! the buffer closes.
//!
//! Match sets are stored behind an `Arc` and swapped wholesale, so a hover
//! reader racing a scan sees either the old set or the new one, never a mix.

use crate::model::event::BufferId;
use crate::model::region::BufferMatches;
use indexmap::IndexSet;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Everything the extension remembers about one buffer
#[derive(Debug, Clone, Default)]
pub struct BufferState {
    /// Regions found by the last successful scan
    pub matches: Option<Arc<BufferMatches>>,
    /// Scope names that currently have a decoration group
    pub scopes: IndexSet<String>,
    /// Set once the buffer exceeded `max_url_limit`; never cleared until close
    pub ignored: bool,
}

/// Registry of per-buffer state, keyed by buffer handle
#[derive(Debug, Default)]
pub struct BufferRegistry {
    buffers: RwLock<HashMap<BufferId, BufferState>>,
}

impl BufferRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    // Poisoned locks are entered anyway. Every write below leaves the map
    // consistent.
    fn read(&self) -> RwLockReadGuard<'_, HashMap<BufferId, BufferState>> {
        self.buffers.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<BufferId, BufferState>> {
        self.buffers.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Whether the buffer was excluded from scanning
    pub fn is_ignored(&self, id: BufferId) -> bool {
        self.read().get(&id).is_some_and(|state| state.ignored)
    }

    /// Exclude the buffer from scanning until it is closed
    pub fn mark_ignored(&self, id: BufferId) {
        self.write().entry(id).or_default().ignored = true;
    }

    /// Replace the buffer's match set
    pub fn store_matches(&self, id: BufferId, matches: BufferMatches) {
        self.write().entry(id).or_default().matches = Some(Arc::new(matches));
    }

    /// Forget the buffer's match set, leaving other state in place
    pub fn clear_matches(&self, id: BufferId) {
        if let Some(state) = self.write().get_mut(&id) {
            state.matches = None;
        }
    }

    /// Current match set of the buffer, if it has one
    pub fn matches(&self, id: BufferId) -> Option<Arc<BufferMatches>> {
        self.read().get(&id).and_then(|state| state.matches.clone())
    }

    /// Scope names with active decorations in the buffer
    pub fn scopes(&self, id: BufferId) -> IndexSet<String> {
        self.read()
            .get(&id)
            .map(|state| state.scopes.clone())
            .unwrap_or_default()
    }

    /// Store a new scope set and return the previous one
    pub fn replace_scopes(&self, id: BufferId, scopes: IndexSet<String>) -> IndexSet<String> {
        let mut buffers = self.write();
        if scopes.is_empty() && !buffers.contains_key(&id) {
            return IndexSet::new();
        }
        std::mem::replace(&mut buffers.entry(id).or_default().scopes, scopes)
    }

    /// Drop everything known about the buffer
    pub fn remove(&self, id: BufferId) -> Option<BufferState> {
        self.write().remove(&id)
    }

    /// Whether the registry holds any record for the buffer
    pub fn contains(&self, id: BufferId) -> bool {
        self.read().contains_key(&id)
    }

    /// Number of buffers with a record
    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }
}
