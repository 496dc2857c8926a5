//! Searches that run off the caller's thread.
//!
//! The worker gets its own snapshot of the board, so the live game can keep
//! handling input while the engine thinks. Results come back over a channel.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam_channel::{bounded, Receiver, TryRecvError};
use engine::Board;
use tracing::debug;

use crate::search::SearchEngine;
use crate::types::SearchResult;

/// Handle to a search running on a worker thread. Dropping it cancels the search.
#[derive(Debug)]
pub struct SearchTask {
    receiver: Receiver<SearchResult>,
    cancel: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl SearchTask {
    pub fn spawn(engine: SearchEngine, board: &Board) -> Self {
        let snapshot = board.snapshot();
        let cancel = Arc::new(AtomicBool::new(false));
        let (sender, receiver) = bounded(1);

        let worker_cancel = Arc::clone(&cancel);
        let handle = thread::spawn(move || {
            let result = engine.search_with_cancel(&snapshot, &worker_cancel);
            // Receiver gone means nobody wants the answer any more
            let _ = sender.send(result);
        });
        debug!("Spawned {} search at depth {}", engine.color(), engine.depth());

        Self {
            receiver,
            cancel,
            handle: Some(handle),
        }
    }

    /// The result if the search has finished. Each result is handed out once.
    pub fn try_result(&self) -> Option<SearchResult> {
        match self.receiver.try_recv() {
            Ok(result) => Some(result),
            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => None,
        }
    }

    /// Block until the search finishes. `None` if the result was already taken.
    pub fn wait(self) -> Option<SearchResult> {
        self.receiver.recv().ok()
    }

    /// Ask the worker to stop at its next node
    pub fn cancel(&self) {
        self.cancel.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.load(Ordering::Relaxed)
    }
}

impl Drop for SearchTask {
    fn drop(&mut self) {
        self.cancel();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}
