// EventDash - util/error.rs
//
// Typed error hierarchy with context-preserving error chains.
// No string-based error propagation; every wrapped failure keeps its
// causal chain reachable through `source()` for diagnostic logging.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Top-level error type for all EventDash operations.
/// Errors are categorised by the subsystem that produced them.
#[derive(Debug)]
pub enum EventDashError {
    /// A channel fetch failed.
    Fetch(FetchError),

    /// An export operation failed.
    Export(ExportError),

    /// Configuration loading or validation failed.
    Config(ConfigError),

    /// I/O error with path context.
    Io {
        path: PathBuf,
        operation: &'static str,
        source: io::Error,
    },
}

impl fmt::Display for EventDashError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fetch(e) => write!(f, "Fetch error: {e}"),
            Self::Export(e) => write!(f, "Export error: {e}"),
            Self::Config(e) => write!(f, "Configuration error: {e}"),
            Self::Io {
                path,
                operation,
                source,
            } => write!(
                f,
                "I/O error during {operation} on '{}': {source}",
                path.display()
            ),
        }
    }
}

impl std::error::Error for EventDashError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Fetch(e) => Some(e),
            Self::Export(e) => Some(e),
            Self::Config(e) => Some(e),
            Self::Io { source, .. } => Some(source),
        }
    }
}

// ---------------------------------------------------------------------------
// Fetch errors
// ---------------------------------------------------------------------------

/// Errors raised while querying a log channel or reading its records.
///
/// `ChannelNotFound`, `AccessDenied`, and `Query` are channel-scoped: the
/// whole fetch for that channel yields an empty result. `Render` and
/// `MalformedEvent` are record-scoped: the affected record is skipped and
/// the fetch continues.
#[derive(Debug)]
pub enum FetchError {
    /// The named channel does not exist on this machine.
    ChannelNotFound { channel: String },

    /// The caller lacks permission to read the channel.
    AccessDenied { channel: String },

    /// The log subsystem rejected the query with an OS error code.
    Query { channel: String, code: u32 },

    /// A single record could not be rendered by the log subsystem.
    Render { channel: String },

    /// A single rendered record could not be parsed into a raw event.
    MalformedEvent { channel: String, reason: String },
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ChannelNotFound { channel } => {
                write!(f, "channel '{channel}' was not found")
            }
            Self::AccessDenied { channel } => {
                write!(f, "access to channel '{channel}' was denied")
            }
            Self::Query { channel, code } => {
                write!(f, "query on channel '{channel}' failed with OS error {code}")
            }
            Self::Render { channel } => {
                write!(f, "a record from channel '{channel}' could not be rendered")
            }
            Self::MalformedEvent { channel, reason } => {
                write!(f, "malformed record in channel '{channel}': {reason}")
            }
        }
    }
}

impl std::error::Error for FetchError {}

impl From<FetchError> for EventDashError {
    fn from(e: FetchError) -> Self {
        Self::Fetch(e)
    }
}

// ---------------------------------------------------------------------------
// Export errors
// ---------------------------------------------------------------------------

/// Errors related to export operations.
#[derive(Debug)]
pub enum ExportError {
    /// I/O error writing the export file.
    Io { path: PathBuf, source: io::Error },

    /// CSV serialisation error.
    Csv { path: PathBuf, source: csv::Error },

    /// JSON serialisation error.
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },

    /// No destination directory could be determined for the export.
    NoDestination,
}

impl fmt::Display for ExportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "export I/O error '{}': {source}", path.display())
            }
            Self::Csv { path, source } => {
                write!(f, "CSV export error '{}': {source}", path.display())
            }
            Self::Json { path, source } => {
                write!(f, "JSON export error '{}': {source}", path.display())
            }
            Self::NoDestination => write!(
                f,
                "no export destination: the desktop folder could not be resolved \
                 and no output directory was given"
            ),
        }
    }
}

impl std::error::Error for ExportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Csv { source, .. } => Some(source),
            Self::Json { source, .. } => Some(source),
            Self::NoDestination => None,
        }
    }
}

impl From<ExportError> for EventDashError {
    fn from(e: ExportError) -> Self {
        Self::Export(e)
    }
}

// ---------------------------------------------------------------------------
// Config errors
// ---------------------------------------------------------------------------

/// Errors related to configuration loading.
///
/// Configuration problems are never fatal: the loader converts these into
/// warnings and falls back to defaults, but the typed variants keep the
/// cause chain intact for the warning text.
#[derive(Debug)]
pub enum ConfigError {
    /// TOML parsing failed.
    TomlParse {
        path: PathBuf,
        source: toml::de::Error,
    },

    /// A config value is out of the allowed range.
    ValueOutOfRange {
        field: String,
        value: String,
        expected: String,
    },

    /// I/O error reading the config file.
    Io { path: PathBuf, source: io::Error },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TomlParse { path, source } => {
                write!(f, "config parse error '{}': {source}", path.display())
            }
            Self::ValueOutOfRange {
                field,
                value,
                expected,
            } => write!(
                f,
                "config '{field}' = '{value}' is out of range. Expected: {expected}"
            ),
            Self::Io { path, source } => {
                write!(f, "config I/O error '{}': {source}", path.display())
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::TomlParse { source, .. } => Some(source),
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<ConfigError> for EventDashError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

/// Convenience type alias for EventDash results.
pub type Result<T> = std::result::Result<T, EventDashError>;
