// EventDash - app/state.rs
//
// Dashboard state management. Owns the latest aggregation snapshot, the
// active severity filter, the per-channel filtered index views, and the
// status line. Front ends (the CLI, or any future interactive shell) read
// this state; only the refresh flow writes to it.

use crate::core::filter::{self, SeverityFilter};
use crate::core::model::{Aggregation, ChannelSpec, LogRecord, RefreshProgress};
use crate::util::error::ExportError;
use std::path::Path;

/// Top-level dashboard state.
#[derive(Debug)]
pub struct DashboardState {
    /// Channel specs the dashboard was configured with; used to rebuild the
    /// cleared snapshot.
    specs: Vec<ChannelSpec>,

    /// The installed aggregation snapshot (cleared until the first refresh
    /// completes).
    pub aggregation: Aggregation,

    /// Active severity filter.
    pub filter: SeverityFilter,

    /// Per-channel indices of records matching the filter, parallel to
    /// `aggregation.channels`.
    pub filtered: Vec<Vec<usize>>,

    /// Status message for the status surface.
    pub status: String,

    /// Non-fatal warnings from the most recent refresh.
    pub warnings: Vec<String>,

    /// Whether a refresh is currently in flight.
    pub refresh_in_progress: bool,
}

impl DashboardState {
    /// Create initial (cleared) state for the given channel set.
    pub fn new(specs: &[ChannelSpec]) -> Self {
        let aggregation = Aggregation::cleared(specs);
        let filter = SeverityFilter::All;
        let filtered = apply_to_all(&aggregation, &filter);
        Self {
            specs: specs.to_vec(),
            aggregation,
            filter,
            filtered,
            status: "Ready.".to_string(),
            warnings: Vec::new(),
            refresh_in_progress: false,
        }
    }

    /// Mark a refresh as started and update the status surface.
    pub fn begin_refresh(&mut self) {
        self.refresh_in_progress = true;
        self.warnings.clear();
        self.status = "Loading all logs...".to_string();
    }

    /// Install a completed snapshot wholesale and reapply the active filter.
    ///
    /// The swap is the only mutation of the visible collections, so no
    /// consumer ever observes a half-refreshed channel.
    pub fn install(&mut self, aggregation: Aggregation) {
        self.warnings = aggregation
            .channels
            .iter()
            .flat_map(|c| c.warnings.iter().cloned())
            .collect();
        self.aggregation = aggregation;
        self.reapply_filter();
        self.refresh_in_progress = false;
        self.status = "All logs loaded successfully".to_string();
    }

    /// Apply a progress message from the refresh thread.
    pub fn handle_progress(&mut self, progress: RefreshProgress) {
        match progress {
            RefreshProgress::Started { .. } => self.begin_refresh(),
            RefreshProgress::ChannelLoaded {
                channel,
                records,
                skipped,
            } => {
                tracing::debug!(channel = %channel, records, skipped, "Channel loaded");
            }
            RefreshProgress::Warning { message } => self.warnings.push(message),
            RefreshProgress::Completed { aggregation } => self.install(aggregation),
        }
    }

    /// Change the active severity filter and recompute the views.
    /// The stored collections and their metrics are untouched.
    pub fn set_filter(&mut self, filter: SeverityFilter) {
        self.filter = filter;
        self.reapply_filter();
    }

    /// Empty every channel collection. Metrics on the cleared state report
    /// zero for all counts.
    pub fn clear_all(&mut self) {
        self.aggregation = Aggregation::cleared(&self.specs);
        self.reapply_filter();
        self.warnings.clear();
        self.status = "All logs cleared".to_string();
    }

    /// Records of one channel currently visible under the active filter,
    /// in stored (newest-first) order.
    pub fn visible(&self, channel_idx: usize) -> impl Iterator<Item = &LogRecord> {
        let records = &self.aggregation.channels[channel_idx].records;
        self.filtered[channel_idx].iter().map(move |&i| &records[i])
    }

    /// Total visible records across all channels under the active filter.
    pub fn visible_total(&self) -> usize {
        self.filtered.iter().map(|v| v.len()).sum()
    }

    /// Record an export outcome on the status surface.
    pub fn record_export(&mut self, outcome: &Result<(std::path::PathBuf, usize), ExportError>) {
        self.status = match outcome {
            Ok((path, count)) => format!(
                "Exported {count} events to {}",
                file_name_for_status(path)
            ),
            Err(e) => format!("Export failed: {e}"),
        };
    }

    fn reapply_filter(&mut self) {
        self.filtered = apply_to_all(&self.aggregation, &self.filter);
    }
}

fn apply_to_all(aggregation: &Aggregation, filter: &SeverityFilter) -> Vec<Vec<usize>> {
    aggregation
        .channels
        .iter()
        .map(|c| filter::apply_filter(&c.records, filter))
        .collect()
}

fn file_name_for_status(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
