//! SyncRuntime: background driver for a `ClipSync` engine.
//!
//! Owns the engine behind a mutex and a worker thread that drains host
//! notifications and runs due tasks. Callers reach the engine through
//! `with`, which holds the lock for the duration of the closure.

use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, Sender};

use crate::engine::ClipSync;

pub struct SyncRuntime {
    engine: Arc<Mutex<ClipSync>>,
    shutdown_tx: Sender<()>,
    join_handle: Option<JoinHandle<()>>,
}

impl SyncRuntime {
    /// Spawn the worker. It wakes at least every `poll_resolution`, and
    /// earlier when a scheduled task falls due.
    pub fn start(engine: ClipSync, poll_resolution: Duration) -> Self {
        let engine = Arc::new(Mutex::new(engine));
        let (shutdown_tx, shutdown_rx) = crossbeam_channel::bounded(1);
        let thread_engine = Arc::clone(&engine);

        let join_handle = thread::Builder::new()
            .name("clipsync".into())
            .spawn(move || run(thread_engine, shutdown_rx, poll_resolution));

        let join_handle = match join_handle {
            Ok(handle) => Some(handle),
            Err(e) => {
                log::error!(target: "runtime", "failed to spawn sync thread: {}", e);
                None
            }
        };

        Self {
            engine,
            shutdown_tx,
            join_handle,
        }
    }

    pub fn is_running(&self) -> bool {
        self.join_handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Run `f` against the engine under its lock.
    pub fn with<R>(&self, f: impl FnOnce(&mut ClipSync) -> R) -> R {
        let mut engine = self.engine.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut engine)
    }
}

fn run(engine: Arc<Mutex<ClipSync>>, shutdown_rx: Receiver<()>, poll_resolution: Duration) {
    log::debug!(target: "runtime", "sync thread started");
    loop {
        let next_deadline = {
            let mut engine = engine.lock().unwrap_or_else(PoisonError::into_inner);
            let events = engine.drain_host_events();
            let tasks = engine.poll();
            if events > 0 || tasks > 0 {
                log::trace!(target: "runtime", "handled {} events, {} tasks", events, tasks);
            }
            engine.next_deadline()
        };

        let wait = match next_deadline {
            Some(due) => due
                .saturating_duration_since(Instant::now())
                .min(poll_resolution),
            None => poll_resolution,
        };

        crossbeam_channel::select! {
            recv(shutdown_rx) -> _ => break,
            default(wait) => {}
        }
    }
    log::debug!(target: "runtime", "sync thread stopped");
}

impl Drop for SyncRuntime {
    fn drop(&mut self) {
        let _ = self.shutdown_tx.send(());
        if let Some(handle) = self.join_handle.take() {
            let _ = handle.join();
        }
    }
}
