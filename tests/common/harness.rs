// PreviewTestHarness - in-memory host editor for end-to-end tests

use anyhow::Result;
use remote_images_preview::host::{DrawFlags, HostProfile, PopupOptions};
use remote_images_preview::services::image_loader::ImageLoader;
use remote_images_preview::{
    BufferId, Config, CurrentProfile, EditorEvent, HoverZone, Region, RemoteImagesPreview, View,
};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

/// A host call recorded by [`TestView`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostCall {
    AddRegions {
        key: String,
        regions: Vec<Region>,
        scope: String,
        flags: DrawFlags,
    },
    EraseRegions {
        key: String,
    },
    ShowPopup {
        content: String,
        options: PopupOptions,
    },
}

/// Buffer living in the fake host. Keeps the decoration layer the way a
/// real host would: groups keyed by name, replaced on add.
pub struct TestView {
    id: BufferId,
    text: Mutex<String>,
    scopes: Mutex<Vec<(usize, usize, String)>>,
    file_name: Option<PathBuf>,
    calls: Mutex<Vec<HostCall>>,
    decorations: Mutex<HashMap<String, Vec<Region>>>,
}

impl TestView {
    pub fn new(id: usize, text: &str) -> Arc<Self> {
        Self::build(id, text, None)
    }

    pub fn with_file(id: usize, text: &str, file_name: PathBuf) -> Arc<Self> {
        Self::build(id, text, Some(file_name))
    }

    fn build(id: usize, text: &str, file_name: Option<PathBuf>) -> Arc<Self> {
        Arc::new(Self {
            id: BufferId(id),
            text: Mutex::new(text.to_string()),
            scopes: Mutex::new(Vec::new()),
            file_name,
            calls: Mutex::new(Vec::new()),
            decorations: Mutex::new(HashMap::new()),
        })
    }

    pub fn set_text(&self, text: &str) {
        *self.text.lock().unwrap() = text.to_string();
    }

    /// Make `[start, end)` report `scope`; later calls win on overlap
    pub fn set_scope(&self, start: usize, end: usize, scope: &str) {
        self.scopes
            .lock()
            .unwrap()
            .push((start, end, scope.to_string()));
    }

    pub fn calls(&self) -> Vec<HostCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    pub fn add_calls(&self) -> Vec<HostCall> {
        self.calls()
            .into_iter()
            .filter(|call| matches!(call, HostCall::AddRegions { .. }))
            .collect()
    }

    pub fn erased_keys(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                HostCall::EraseRegions { key } => Some(key),
                _ => None,
            })
            .collect()
    }

    pub fn popups(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                HostCall::ShowPopup { content, .. } => Some(content),
                _ => None,
            })
            .collect()
    }

    /// Decoration groups currently present, sorted by key
    pub fn decoration_keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.decorations.lock().unwrap().keys().cloned().collect();
        keys.sort();
        keys
    }

    pub fn decoration(&self, key: &str) -> Option<Vec<Region>> {
        self.decorations.lock().unwrap().get(key).cloned()
    }
}

impl View for TestView {
    fn id(&self) -> BufferId {
        self.id
    }

    fn text(&self) -> String {
        self.text.lock().unwrap().clone()
    }

    fn scope_name(&self, offset: usize) -> String {
        self.scopes
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|(start, end, _)| *start <= offset && offset < *end)
            .map(|(_, _, scope)| scope.clone())
            .unwrap_or_else(|| "text.plain".to_string())
    }

    fn file_name(&self) -> Option<PathBuf> {
        self.file_name.clone()
    }

    fn add_regions(&self, key: &str, regions: &[Region], scope: &str, flags: DrawFlags) {
        self.decorations
            .lock()
            .unwrap()
            .insert(key.to_string(), regions.to_vec());
        self.calls.lock().unwrap().push(HostCall::AddRegions {
            key: key.to_string(),
            regions: regions.to_vec(),
            scope: scope.to_string(),
            flags,
        });
    }

    fn erase_regions(&self, key: &str) {
        self.decorations.lock().unwrap().remove(key);
        self.calls.lock().unwrap().push(HostCall::EraseRegions {
            key: key.to_string(),
        });
    }

    fn show_popup(&self, content: &str, options: PopupOptions) {
        self.calls.lock().unwrap().push(HostCall::ShowPopup {
            content: content.to_string(),
            options,
        });
    }
}

/// Image loader that records fetched URLs and returns canned bytes
#[derive(Default)]
pub struct RecordingLoader {
    pub body: Vec<u8>,
    pub fail: bool,
    fetched: Mutex<Vec<String>>,
}

impl RecordingLoader {
    pub fn returning(body: &[u8]) -> Arc<Self> {
        Arc::new(Self {
            body: body.to_vec(),
            ..Default::default()
        })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            fail: true,
            ..Default::default()
        })
    }

    pub fn fetched(&self) -> Vec<String> {
        self.fetched.lock().unwrap().clone()
    }
}

impl ImageLoader for RecordingLoader {
    fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        self.fetched.lock().unwrap().push(url.to_string());
        if self.fail {
            anyhow::bail!("connection refused");
        }
        Ok(self.body.clone())
    }
}

/// Extension wired to the fake host
pub struct PreviewTestHarness {
    pub preview: RemoteImagesPreview,
    pub loader: Arc<RecordingLoader>,
}

impl PreviewTestHarness {
    /// Current-generation host, default config, loader returning `PNGDATA`
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    pub fn with_config(config: Config) -> Self {
        Self::with_parts(
            Arc::new(CurrentProfile::default()),
            config,
            RecordingLoader::returning(b"PNGDATA"),
        )
    }

    pub fn with_parts(
        profile: Arc<dyn HostProfile>,
        config: Config,
        loader: Arc<RecordingLoader>,
    ) -> Self {
        let preview = RemoteImagesPreview::new(profile, config, loader.clone());
        Self { preview, loader }
    }

    /// Deliver an event and wait for any background scan it queued
    pub fn send(&self, event: EditorEvent, view: &Arc<TestView>) {
        self.preview.handle(&event, view.clone());
        self.preview.flush();
    }

    pub fn activate(&self, view: &Arc<TestView>) {
        self.send(EditorEvent::Activated { buffer_id: view.id() }, view);
    }

    pub fn load(&self, view: &Arc<TestView>) {
        self.send(EditorEvent::Loaded { buffer_id: view.id() }, view);
    }

    pub fn modify(&self, view: &Arc<TestView>, text: &str) {
        view.set_text(text);
        self.send(EditorEvent::Modified { buffer_id: view.id() }, view);
    }

    pub fn close(&self, view: &Arc<TestView>) {
        self.send(EditorEvent::Closed { buffer_id: view.id() }, view);
    }

    pub fn hover(&self, view: &Arc<TestView>, point: usize) {
        self.send(
            EditorEvent::Hover {
                buffer_id: view.id(),
                point,
                zone: HoverZone::Text,
            },
            view,
        );
    }
}
