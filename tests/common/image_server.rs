// Local HTTP server serving fixed image bytes, for hover fetch tests

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// Serves the same body for every request until dropped
pub struct MockImageServer {
    pub base_url: String,
    requests: Arc<AtomicUsize>,
    stop_tx: mpsc::Sender<()>,
}

impl MockImageServer {
    /// Start a server answering every request with `status` and `body`
    pub fn start(status: u16, body: Vec<u8>) -> Self {
        let server = tiny_http::Server::http("127.0.0.1:0").expect("Failed to start test server");
        let port = server.server_addr().to_ip().unwrap().port();
        let base_url = format!("http://127.0.0.1:{}", port);
        let requests = Arc::new(AtomicUsize::new(0));
        let (stop_tx, stop_rx) = mpsc::channel::<()>();

        let counter = requests.clone();
        thread::spawn(move || loop {
            if stop_rx.try_recv().is_ok() {
                break;
            }
            match server.recv_timeout(Duration::from_millis(50)) {
                Ok(Some(request)) => {
                    counter.fetch_add(1, Ordering::SeqCst);
                    let response =
                        tiny_http::Response::from_data(body.clone()).with_status_code(status);
                    let _ = request.respond(response);
                }
                Ok(None) => {}
                Err(_) => break,
            }
        });

        Self {
            base_url,
            requests,
            stop_tx,
        }
    }

    /// Number of requests served so far
    pub fn request_count(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }
}

impl Drop for MockImageServer {
    fn drop(&mut self) {
        let _ = self.stop_tx.send(());
    }
}
