//! Background scan worker
//!
//! Load and modify scans on current hosts run here instead of on the event
//! thread. Every scan takes the highlighter's scan lock, so scans for
//! different buffers, or two scans for the same buffer, never interleave.

use crate::host::View;
use crate::model::event::BufferId;
use crate::services::highlight::Highlighter;
use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc::{self, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

enum ScanRequest {
    Rescan(Arc<dyn View>),
    /// Buffer closed; runs after every scan queued before it
    Forget(BufferId),
    /// Reply once every earlier request has been handled
    Flush(mpsc::SyncSender<()>),
    Shutdown,
}

/// Handle to the scan worker thread
pub struct ScanWorker {
    sender: Sender<ScanRequest>,
    thread_handle: Option<JoinHandle<()>>,
}

impl ScanWorker {
    /// Spawn the worker thread
    pub fn spawn(highlighter: Arc<Highlighter>) -> Self {
        let (sender, receiver) = mpsc::channel::<ScanRequest>();

        let thread_handle = thread::Builder::new()
            .name("remote-images-scan".to_string())
            .spawn(move || {
                while let Ok(request) = receiver.recv() {
                    match request {
                        ScanRequest::Rescan(view) => run_scan(&highlighter, view.as_ref()),
                        ScanRequest::Forget(id) => highlighter.forget(id),
                        ScanRequest::Flush(reply) => {
                            let _ = reply.send(());
                        }
                        ScanRequest::Shutdown => break,
                    }
                }
                tracing::debug!("Scan worker shutting down");
            });

        let thread_handle = match thread_handle {
            Ok(handle) => Some(handle),
            Err(e) => {
                tracing::error!("Failed to spawn scan worker: {}", e);
                None
            }
        };

        Self {
            sender,
            thread_handle,
        }
    }

    /// Queue a rescan. Returns false if the worker is gone.
    pub fn submit(&self, view: Arc<dyn View>) -> bool {
        self.sender.send(ScanRequest::Rescan(view)).is_ok()
    }

    /// Queue removal of a closed buffer's state. Returns false if the
    /// worker is gone.
    pub fn forget(&self, id: BufferId) -> bool {
        self.sender.send(ScanRequest::Forget(id)).is_ok()
    }

    /// Block until every scan queued so far has finished
    pub fn flush(&self) {
        let (tx, rx) = mpsc::sync_channel(1);
        if self.sender.send(ScanRequest::Flush(tx)).is_ok() {
            let _ = rx.recv();
        }
    }

    /// Stop the worker after pending scans and wait for it
    pub fn shutdown(&mut self) {
        let _ = self.sender.send(ScanRequest::Shutdown);

        if let Some(handle) = self.thread_handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for ScanWorker {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Run one serialized scan. A panic ends this scan only, not the worker.
fn run_scan(highlighter: &Highlighter, view: &dyn View) {
    let result = panic::catch_unwind(AssertUnwindSafe(|| highlighter.rescan_serialized(view)));
    if result.is_err() {
        tracing::error!("Scan of buffer {:?} panicked", view.id());
    }
}
