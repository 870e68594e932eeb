// EventDash - util/constants.rs
//
// Single source of truth for all named constants, limits, and defaults.

// =============================================================================
// Application metadata
// =============================================================================

/// Application display name.
pub const APP_NAME: &str = "EventDash";

/// Application identifier used for config/data directories.
pub const APP_ID: &str = "EventDash";

/// Current application version.
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

// =============================================================================
// Channel defaults
// =============================================================================

/// Maximum records fetched per channel when not configured otherwise.
pub const DEFAULT_MAX_RECORDS: usize = 100;

/// Minimum sensible per-channel record cap (a zero cap loads nothing).
pub const MIN_MAX_RECORDS: usize = 1;

/// Hard upper bound on the per-channel record cap (prevents configuration
/// mistakes from pulling an entire multi-gigabyte channel into memory).
pub const ABSOLUTE_MAX_RECORDS: usize = 10_000;

/// The default channel set: `(channel name, display label)` pairs, in the
/// order channels appear in the dashboard and in exports.
pub const DEFAULT_CHANNELS: &[(&str, &str)] = &[
    ("Security", "Security"),
    (
        "Microsoft-Windows-Windows Firewall With Advanced Security/Firewall",
        "Firewall",
    ),
    ("Microsoft-Windows-DNS-Client/Operational", "DNS"),
    ("Application", "Application"),
    ("System", "System"),
];

// =============================================================================
// Record normalisation
// =============================================================================

/// Maximum number of characters of an event description kept in a record's
/// message. Longer descriptions are cut here and marked with
/// `TRUNCATION_MARKER`, so a message never exceeds
/// `MESSAGE_PREVIEW_CHARS + TRUNCATION_MARKER.len()` characters.
pub const MESSAGE_PREVIEW_CHARS: usize = 200;

/// Marker appended to truncated messages.
pub const TRUNCATION_MARKER: &str = "...";

/// Level assigned when the source record carries no usable level string.
pub const FALLBACK_LEVEL: &str = "Information";

/// Provider name used when the source record names no provider.
pub const FALLBACK_PROVIDER: &str = "Unknown";

/// Principal used when the source record carries no user information.
pub const FALLBACK_USER: &str = "N/A";

// =============================================================================
// Event log reads
// =============================================================================

/// Number of event handles requested from the OS per `EvtNext` call.
pub const EVENT_READ_BATCH: usize = 64;

/// Per-batch timeout in milliseconds for `EvtNext`.
pub const EVENT_READ_TIMEOUT_MS: u32 = 100;

// =============================================================================
// Export
// =============================================================================

/// Exact CSV header row. Written unquoted, ahead of the quoted data rows.
pub const CSV_HEADER: &str = "Timestamp,EventID,Level,Source,Computer,User,Message";

/// chrono format string for record timestamps in CSV rows.
pub const CSV_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// chrono format string for the timestamp embedded in export filenames.
pub const EXPORT_STAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Export filename prefix: `logs_<stamp>.csv` / `logs_<stamp>.json`.
pub const EXPORT_FILE_PREFIX: &str = "logs_";

// =============================================================================
// Logging
// =============================================================================

/// Default log level when neither RUST_LOG, --debug, nor config set one.
pub const DEFAULT_LOG_LEVEL: &str = "info";

// =============================================================================
// Configuration
// =============================================================================

/// Configuration file name, looked up in the platform config directory.
pub const CONFIG_FILE_NAME: &str = "config.toml";
