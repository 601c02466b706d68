//! Relay binding lifecycle state
//!
//! Shutdown is cooperative: consumer workers check the active flag between
//! poll iterations and exit on their own. An iteration already inside a
//! blocking long-poll call completes on the poll's own timeout, so
//! `join` bounds the wait with a caller-supplied deadline and logs workers
//! that outlive it instead of blocking process exit on them.

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{info, warn};

/// Cooperative shutdown flag plus the registry of consumer workers.
#[derive(Debug)]
pub struct RelayState {
    active: AtomicBool,
    workers: Mutex<Vec<JoinHandle<()>>>,
}

impl RelayState {
    pub fn new() -> Self {
        Self {
            active: AtomicBool::new(true),
            workers: Mutex::new(Vec::new()),
        }
    }

    /// Whether consumer loops should keep polling.
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    /// Request shutdown. No further poll iterations start after this.
    pub fn deactivate(&self) {
        self.active.store(false, Ordering::SeqCst);
        info!("relay binding deactivated");
    }

    /// Register a consumer worker for `join` to await.
    pub fn register(&self, handle: JoinHandle<()>) {
        self.workers.lock().unwrap().push(handle);
    }

    /// Await every registered worker under one shared deadline.
    ///
    /// Workers still alive past the deadline are logged and left to finish
    /// on their own; they never block process exit.
    pub async fn join(&self, timeout: Duration) {
        let handles: Vec<JoinHandle<()>> = {
            let mut workers = self.workers.lock().unwrap();
            workers.drain(..).collect()
        };

        let deadline = tokio::time::Instant::now() + timeout;
        for handle in handles {
            match tokio::time::timeout_at(deadline, handle).await {
                Ok(Ok(())) => {}
                Ok(Err(err)) => warn!(error = %err, "consumer worker ended abnormally"),
                Err(_) => warn!("consumer worker still running past shutdown deadline"),
            }
        }
    }
}
