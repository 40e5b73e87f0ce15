//! In-memory host view used by unit tests

use crate::host::{DrawFlags, PopupOptions, View};
use crate::model::event::BufferId;
use crate::model::region::Region;
use std::path::PathBuf;
use std::sync::Mutex;

/// A host call recorded by [`MockView`]
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

pub struct MockView {
    id: BufferId,
    text: Mutex<String>,
    /// `(start, end, scope)` overrides; anything else is `text.plain`
    scopes: Mutex<Vec<(usize, usize, String)>>,
    file_name: Option<PathBuf>,
    calls: Mutex<Vec<HostCall>>,
}

impl MockView {
    pub fn new(id: usize, text: &str) -> Self {
        Self {
            id: BufferId(id),
            text: Mutex::new(text.to_string()),
            scopes: Mutex::new(Vec::new()),
            file_name: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_file_name(mut self, path: PathBuf) -> Self {
        self.file_name = Some(path);
        self
    }

    pub fn set_text(&self, text: &str) {
        *self.text.lock().unwrap() = text.to_string();
    }

    pub fn set_scope(&self, start: usize, end: usize, scope: &str) {
        self.scopes
            .lock()
            .unwrap()
            .push((start, end, scope.to_string()));
    }

    pub fn calls(&self) -> Vec<HostCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn take_calls(&self) -> Vec<HostCall> {
        std::mem::take(&mut *self.calls.lock().unwrap())
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

    pub fn added_keys(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                HostCall::AddRegions { key, .. } => Some(key),
                _ => None,
            })
            .collect()
    }

    pub fn popups(&self) -> Vec<(String, PopupOptions)> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                HostCall::ShowPopup { content, options } => Some((content, options)),
                _ => None,
            })
            .collect()
    }
}

impl View for MockView {
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
        self.calls.lock().unwrap().push(HostCall::AddRegions {
            key: key.to_string(),
            regions: regions.to_vec(),
            scope: scope.to_string(),
            flags,
        });
    }

    fn erase_regions(&self, key: &str) {
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
