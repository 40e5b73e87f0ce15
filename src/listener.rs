//! Event entry points
//!
//! [`RemoteImagesPreview`] receives editor lifecycle and hover events and
//! routes them to the highlighter and hover resolver. Both services share
//! one [`BufferRegistry`] and never call each other.

use crate::config::{Config, SharedConfig};
use crate::host::{profile_for_version, DispatchMode, HostProfile, View};
use crate::model::event::{BufferId, EditorEvent, HoverZone};
use crate::services::highlight::Highlighter;
use crate::services::hover::HoverResolver;
use crate::services::image_loader::{ImageLoader, NetworkLoader};
use crate::services::scan_worker::ScanWorker;
use crate::state::BufferRegistry;
use std::path::Path;
use std::sync::{Arc, PoisonError};

/// The extension: one instance per host process
pub struct RemoteImagesPreview {
    registry: Arc<BufferRegistry>,
    config: SharedConfig,
    profile: Arc<dyn HostProfile>,
    highlighter: Arc<Highlighter>,
    hover: HoverResolver,
    /// Present only for hosts that dispatch scans off the event thread
    worker: Option<ScanWorker>,
}

impl RemoteImagesPreview {
    /// Create the extension for a host version with settings from the
    /// default settings file
    pub fn for_host(version: u32) -> Self {
        Self::for_host_version(version, Config::load_or_default())
    }

    /// Create the extension for a host version with settings from `path`
    pub fn with_settings_file(version: u32, path: &Path) -> Self {
        Self::for_host_version(version, Config::load_or_default_from(path))
    }

    /// Create the extension for a host version, fetching images over HTTP
    pub fn for_host_version(version: u32, config: Config) -> Self {
        let config = config.shared();
        let loader = Arc::new(NetworkLoader::new(config.clone()));
        Self::with_shared_config(profile_for_version(version).into(), config, loader)
    }

    /// Create the extension with an explicit host profile and image loader
    pub fn new(
        profile: Arc<dyn HostProfile>,
        config: Config,
        loader: Arc<dyn ImageLoader>,
    ) -> Self {
        Self::with_shared_config(profile, config.shared(), loader)
    }

    fn with_shared_config(
        profile: Arc<dyn HostProfile>,
        config: SharedConfig,
        loader: Arc<dyn ImageLoader>,
    ) -> Self {
        let registry = Arc::new(BufferRegistry::new());
        let highlighter = Arc::new(Highlighter::new(
            registry.clone(),
            profile.clone(),
            config.clone(),
        ));
        let worker = match profile.dispatch_mode() {
            DispatchMode::Blocking => None,
            DispatchMode::Worker => Some(ScanWorker::spawn(highlighter.clone())),
        };
        tracing::debug!(
            "Remote images preview started with {:?} dispatch",
            profile.dispatch_mode()
        );

        Self {
            hover: HoverResolver::new(registry.clone(), loader),
            registry,
            config,
            profile,
            highlighter,
            worker,
        }
    }

    /// Per-buffer state shared by the highlighter and the hover resolver
    pub fn registry(&self) -> &Arc<BufferRegistry> {
        &self.registry
    }

    /// Current configuration
    pub fn config(&self) -> Config {
        Config::snapshot(&self.config)
    }

    /// Replace the configuration; applies from the next scan or fetch on
    pub fn reload_config(&self, config: Config) {
        *self.config.write().unwrap_or_else(PoisonError::into_inner) = config;
    }

    /// Buffer became active: rescan on the event thread
    pub fn on_activated(&self, view: &dyn View) {
        match self.profile.dispatch_mode() {
            DispatchMode::Blocking => self.highlighter.rescan(view),
            DispatchMode::Worker => self.highlighter.rescan_serialized(view),
        }
    }

    /// Buffer loaded (blocking hosts only)
    pub fn on_load(&self, view: &dyn View) {
        if self.profile.dispatch_mode() == DispatchMode::Blocking {
            self.highlighter.rescan(view);
        }
    }

    /// Buffer modified (blocking hosts only)
    pub fn on_modified(&self, view: &dyn View) {
        if self.profile.dispatch_mode() == DispatchMode::Blocking {
            self.highlighter.rescan(view);
        }
    }

    /// Buffer loaded (hosts with async handlers)
    pub fn on_load_async(&self, view: Arc<dyn View>) {
        self.submit_scan(view);
    }

    /// Buffer modified (hosts with async handlers)
    pub fn on_modified_async(&self, view: Arc<dyn View>) {
        self.submit_scan(view);
    }

    fn submit_scan(&self, view: Arc<dyn View>) {
        match &self.worker {
            Some(worker) => {
                if !worker.submit(view) {
                    tracing::warn!("Scan worker is gone, dropping scan request");
                }
            }
            None => tracing::trace!("Async scan requested on a blocking host, ignoring"),
        }
    }

    /// Buffer closed: forget everything about it. On worker hosts the
    /// removal is queued behind scans already submitted for the buffer.
    pub fn on_close(&self, id: BufferId) {
        match &self.worker {
            Some(worker) if worker.forget(id) => {}
            _ => self.highlighter.forget(id),
        }
    }

    /// Pointer rests over the buffer. Returns true when a popup was shown.
    pub fn on_hover(&self, view: &dyn View, point: usize, zone: HoverZone) -> bool {
        self.hover
            .resolve_hover(self.profile.as_ref(), view, point, zone)
    }

    /// Dispatch an editor event for `view`
    pub fn handle(&self, event: &EditorEvent, view: Arc<dyn View>) {
        debug_assert_eq!(event.buffer_id(), view.id());
        match *event {
            EditorEvent::Activated { .. } => self.on_activated(view.as_ref()),
            EditorEvent::Loaded { .. } => match self.profile.dispatch_mode() {
                DispatchMode::Blocking => self.on_load(view.as_ref()),
                DispatchMode::Worker => self.on_load_async(view),
            },
            EditorEvent::Modified { .. } => match self.profile.dispatch_mode() {
                DispatchMode::Blocking => self.on_modified(view.as_ref()),
                DispatchMode::Worker => self.on_modified_async(view),
            },
            EditorEvent::Closed { buffer_id } => self.on_close(buffer_id),
            EditorEvent::Hover { point, zone, .. } => {
                self.on_hover(view.as_ref(), point, zone);
            }
        }
    }

    /// Wait until queued background scans have finished
    pub fn flush(&self) {
        if let Some(worker) = &self.worker {
            worker.flush();
        }
    }

    /// Stop the background worker, if any
    pub fn shutdown(&mut self) {
        if let Some(mut worker) = self.worker.take() {
            worker.shutdown();
        }
    }
}
