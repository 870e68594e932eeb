// EventDash - core/model.rs
//
// Core data model types. Pure data definitions with no I/O, no UI,
// no platform dependencies.
//
// These types are the shared vocabulary across all layers.

use crate::util::constants;
use chrono::{DateTime, Utc};
use serde::Serialize;

// =============================================================================
// Log record (normalised output of a channel fetch)
// =============================================================================

/// A single normalised event, independent of the channel it came from.
///
/// This is the core data unit that flows through filtering, display,
/// and export. Immutable once created by the fetcher.
#[derive(Debug, Clone, Serialize)]
pub struct LogRecord {
    /// Event creation time in UTC. The fetcher substitutes "now" when the
    /// source record carries no timestamp.
    pub timestamp: DateTime<Utc>,

    /// Source-defined event identifier. Not unique across channels.
    pub event_id: u32,

    /// Normalised severity token: the first whitespace-delimited word of
    /// the source's level string, or "Information" when absent. Never empty.
    pub level: String,

    /// Provider / origin name; "Unknown" when the source names none.
    pub source: String,

    /// Machine name where the event was captured.
    pub host: String,

    /// Principal associated with the event; "N/A" when unavailable.
    pub user: String,

    /// Human-readable description, truncated to
    /// `constants::MESSAGE_PREVIEW_CHARS` characters plus the truncation
    /// marker when longer.
    pub message: String,

    /// Name of the channel this record was fetched from.
    pub channel: String,
}

// =============================================================================
// Channel specification
// =============================================================================

/// One configured log channel: the OS channel name, the short label shown
/// in the dashboard, and the per-channel record cap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelSpec {
    /// Full channel name as known to the OS log subsystem
    /// (e.g. "Microsoft-Windows-DNS-Client/Operational").
    pub name: String,

    /// Short display label (e.g. "DNS").
    pub label: String,

    /// Maximum number of records fetched per refresh.
    pub max_records: usize,
}

impl ChannelSpec {
    pub fn new(name: impl Into<String>, label: impl Into<String>, max_records: usize) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            max_records,
        }
    }

    /// The default five-channel dashboard configuration.
    pub fn defaults() -> Vec<ChannelSpec> {
        constants::DEFAULT_CHANNELS
            .iter()
            .map(|(name, label)| ChannelSpec::new(*name, *label, constants::DEFAULT_MAX_RECORDS))
            .collect()
    }
}

// =============================================================================
// Channel metrics
// =============================================================================

/// Per-channel severity counts, recomputed from final collection contents
/// on every refresh. Never persisted across runs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChannelMetrics {
    /// Total records in the channel collection.
    pub total: usize,

    /// Records whose level contains "Error".
    pub errors: usize,

    /// Records whose level contains "Warning".
    pub warnings: usize,

    /// Remainder: `total - errors - warnings`.
    pub infos: usize,

    /// When these metrics were computed. `None` only for the cleared state.
    pub last_updated: Option<DateTime<Utc>>,
}

impl ChannelMetrics {
    /// Compute metrics from a channel collection.
    ///
    /// The counting rule deliberately matches the severity filter's
    /// substring containment so that displayed counts and filtered views
    /// agree on which records are errors or warnings.
    pub fn compute(records: &[LogRecord], now: DateTime<Utc>) -> Self {
        let total = records.len();
        let errors = records.iter().filter(|r| r.level.contains("Error")).count();
        let warnings = records
            .iter()
            .filter(|r| r.level.contains("Warning"))
            .count();
        Self {
            total,
            errors,
            warnings,
            infos: total.saturating_sub(errors).saturating_sub(warnings),
            last_updated: Some(now),
        }
    }
}

// =============================================================================
// Aggregation snapshot
// =============================================================================

/// One channel's slice of an aggregation snapshot: the spec it was fetched
/// under, its bounded newest-first records, derived metrics, and any
/// non-fatal warnings raised while fetching it.
#[derive(Debug, Clone)]
pub struct ChannelAggregate {
    pub spec: ChannelSpec,
    pub records: Vec<LogRecord>,
    pub metrics: ChannelMetrics,
    pub warnings: Vec<String>,
}

/// A complete, immutable snapshot of all channel collections produced by
/// one refresh cycle.
///
/// Consumers replace their snapshot wholesale; a refresh never mutates a
/// snapshot that has already been handed out, so overlapping refreshes
/// cannot interleave records from different cycles.
#[derive(Debug, Clone)]
pub struct Aggregation {
    /// Channels in configured order. Export and display iterate this order.
    pub channels: Vec<ChannelAggregate>,
}

impl Aggregation {
    /// The empty state: every configured channel present with zero records
    /// and zero metrics. Used at startup and by ClearAll.
    pub fn cleared(specs: &[ChannelSpec]) -> Self {
        Self {
            channels: specs
                .iter()
                .map(|spec| ChannelAggregate {
                    spec: spec.clone(),
                    records: Vec::new(),
                    metrics: ChannelMetrics::default(),
                    warnings: Vec::new(),
                })
                .collect(),
        }
    }

    /// Total records across all channels.
    pub fn total_records(&self) -> usize {
        self.channels.iter().map(|c| c.records.len()).sum()
    }

    /// Look up a channel by its OS name.
    pub fn channel(&self, name: &str) -> Option<&ChannelAggregate> {
        self.channels.iter().find(|c| c.spec.name == name)
    }

    /// All records flattened in export order: channels in configured order,
    /// records within a channel in stored (newest-first) order.
    pub fn flattened(&self) -> impl Iterator<Item = &LogRecord> {
        self.channels.iter().flat_map(|c| c.records.iter())
    }
}

// =============================================================================
// Refresh progress (for front ends)
// =============================================================================

/// Progress messages sent from the refresh thread to the consumer.
#[derive(Debug)]
pub enum RefreshProgress {
    /// The refresh cycle started fetching the given number of channels.
    Started { channels: usize },

    /// One channel's fetch settled (successfully or fail-safe-empty).
    ChannelLoaded {
        channel: String,
        records: usize,
        skipped: usize,
    },

    /// A non-fatal warning occurred (channel failure, skipped records).
    Warning { message: String },

    /// The whole cycle completed; the snapshot is ready to install.
    Completed { aggregation: Aggregation },
}
