// EventDash - app/refresh.rs
//
// Refresh lifecycle management. Runs the aggregation pipeline on a
// background thread, sending progress messages to the consumer via an
// mpsc channel.
//
// Architecture:
//   - `RefreshManager` lives with the front end; `run_refresh` runs on a
//     background thread.
//   - All cross-thread communication is via `RefreshProgress` messages.
//   - Starting a new refresh while one is in flight replaces the progress
//     channel; the superseded run keeps fetching but its messages go
//     nowhere and its snapshot is dropped, which is safe because snapshots
//     are immutable and installed wholesale.

use crate::core::fetch::EventSource;
use crate::core::model::{ChannelSpec, RefreshProgress};
use crate::core::pipeline;
use std::sync::{mpsc, Arc, Mutex};

/// Manages refresh cycles on a background thread.
pub struct RefreshManager {
    /// Channel receiver for the consumer to poll progress messages.
    pub progress_rx: Option<mpsc::Receiver<RefreshProgress>>,
}

impl RefreshManager {
    pub fn new() -> Self {
        Self { progress_rx: None }
    }

    /// Start a refresh over `specs`. Spawns a background thread immediately;
    /// progress is sent over the channel and the completed snapshot arrives
    /// as `RefreshProgress::Completed`.
    pub fn start_refresh(&mut self, source: Arc<dyn EventSource>, specs: Vec<ChannelSpec>) {
        let (tx, rx) = mpsc::channel();
        self.progress_rx = Some(rx);

        std::thread::spawn(move || {
            run_refresh(source, specs, tx);
        });

        tracing::info!("Refresh started");
    }

    /// Poll for progress messages without blocking. Returns all pending
    /// messages, oldest first.
    pub fn poll_progress(&self) -> Vec<RefreshProgress> {
        let mut messages = Vec::new();
        if let Some(ref rx) = self.progress_rx {
            while let Ok(msg) = rx.try_recv() {
                messages.push(msg);
            }
        }
        messages
    }
}

impl Default for RefreshManager {
    fn default() -> Self {
        Self::new()
    }
}

/// Run one refresh synchronously and return the snapshot.
///
/// The deterministic entry point for the CLI and for tests: callers get
/// completion by return value instead of waiting on dispatcher callbacks.
pub fn refresh_blocking(source: &dyn EventSource, specs: &[ChannelSpec]) -> crate::core::model::Aggregation {
    pipeline::refresh(source, specs)
}

/// Background refresh body: fan out via the pipeline, forwarding one
/// `ChannelLoaded` per settled channel, then deliver the snapshot.
fn run_refresh(
    source: Arc<dyn EventSource>,
    specs: Vec<ChannelSpec>,
    tx: mpsc::Sender<RefreshProgress>,
) {
    if tx
        .send(RefreshProgress::Started {
            channels: specs.len(),
        })
        .is_err()
    {
        return; // Receiver dropped (superseded or front end gone); exit quietly.
    }

    // The pipeline invokes the callback from several fetch threads; the
    // sender is not Sync, so serialise sends through a mutex.
    let progress_tx = Mutex::new(tx.clone());

    let aggregation = pipeline::refresh_with(source.as_ref(), &specs, &|spec, settled| {
        let Ok(guard) = progress_tx.lock() else {
            return;
        };
        if let Some(failure) = &settled.failure {
            let _ = guard.send(RefreshProgress::Warning {
                message: format!("{}: {failure}", spec.label),
            });
        }
        let _ = guard.send(RefreshProgress::ChannelLoaded {
            channel: spec.name.clone(),
            records: settled.records.len(),
            skipped: settled.skipped,
        });
    });

    let _ = tx.send(RefreshProgress::Completed { aggregation });
}
