// EventDash - core/fetch.rs
//
// Channel fetching and record normalisation.
//
// `EventSource` is the seam to the OS log subsystem: implementations yield
// raw, newest-first records for a named channel. `fetch_channel` drives a
// source cursor and turns raw records into bounded, normalised
// `LogRecord` collections.
//
// Failure policy:
//   - A record-scoped failure (render/parse) is counted and skipped; the
//     fetch continues with the next record.
//   - A channel-scoped failure (open/query) yields an empty result carried
//     back to the pipeline; sibling channels are unaffected.

use crate::core::model::{ChannelSpec, LogRecord};
use crate::util::constants;
use crate::util::error::FetchError;
use chrono::{DateTime, Utc};

// =============================================================================
// Raw events and the source trait
// =============================================================================

/// One pre-normalisation record as handed over by an `EventSource`.
///
/// Every field except `event_id` is optional; the normaliser substitutes
/// the documented defaults for whatever the source could not provide.
#[derive(Debug, Clone, Default)]
pub struct RawEvent {
    /// Event creation time, if the source recorded one.
    pub time_created: Option<DateTime<Utc>>,

    /// Source-defined numeric event identifier.
    pub event_id: u32,

    /// Raw level string (e.g. "Information", "Error", or a provider-specific
    /// phrase such as "Audit Success").
    pub level_name: Option<String>,

    /// Provider / source name.
    pub provider: Option<String>,

    /// Principal associated with the event (SID or account name).
    pub user: Option<String>,

    /// Rendered human-readable description.
    pub description: Option<String>,
}

/// A newest-first stream of raw records from one channel. Each item is one
/// record or a record-scoped failure the caller may skip.
pub type EventCursor<'a> = Box<dyn Iterator<Item = std::result::Result<RawEvent, FetchError>> + 'a>;

/// The OS log subsystem boundary.
///
/// Implementations must return records newest-first and must not block
/// indefinitely; the pipeline runs one fetch per channel concurrently and
/// waits for all of them.
pub trait EventSource: Send + Sync {
    /// Open a newest-first cursor over the named channel.
    fn query(&self, channel: &str) -> std::result::Result<EventCursor<'_>, FetchError>;
}

// =============================================================================
// Normalisation rules
// =============================================================================

/// Normalise a raw level string to its severity token: the first
/// whitespace-delimited word, or "Information" when the input is absent
/// or empty.
pub fn normalize_level(raw: Option<&str>) -> String {
    raw.and_then(|s| s.split_whitespace().next())
        .unwrap_or(constants::FALLBACK_LEVEL)
        .to_string()
}

/// Truncate a description to `MESSAGE_PREVIEW_CHARS` characters, appending
/// the truncation marker when anything was cut. Short messages are
/// returned unchanged.
pub fn truncate_message(raw: &str) -> String {
    match raw.char_indices().nth(constants::MESSAGE_PREVIEW_CHARS) {
        Some((byte_idx, _)) => {
            let mut truncated = raw[..byte_idx].to_string();
            truncated.push_str(constants::TRUNCATION_MARKER);
            truncated
        }
        None => raw.to_string(),
    }
}

/// Turn a raw event into a normalised record for the given channel.
fn normalize(raw: RawEvent, channel: &str, host: &str, now: DateTime<Utc>) -> LogRecord {
    LogRecord {
        timestamp: raw.time_created.unwrap_or(now),
        event_id: raw.event_id,
        level: normalize_level(raw.level_name.as_deref()),
        source: raw
            .provider
            .filter(|p| !p.is_empty())
            .unwrap_or_else(|| constants::FALLBACK_PROVIDER.to_string()),
        host: host.to_string(),
        user: raw
            .user
            .filter(|u| !u.is_empty())
            .unwrap_or_else(|| constants::FALLBACK_USER.to_string()),
        message: truncate_message(raw.description.as_deref().unwrap_or("")),
        channel: channel.to_string(),
    }
}

/// The machine name records are stamped with.
///
/// Windows sets COMPUTERNAME; most POSIX shells export HOSTNAME.
pub fn machine_name() -> String {
    std::env::var("COMPUTERNAME")
        .or_else(|_| std::env::var("HOSTNAME"))
        .unwrap_or_else(|_| "localhost".to_string())
}

// =============================================================================
// Channel fetch
// =============================================================================

/// Outcome of one channel fetch. `failure` is set when the channel itself
/// could not be read; `records` is then empty. Record-scoped failures only
/// increment `skipped`.
#[derive(Debug)]
pub struct ChannelFetch {
    pub records: Vec<LogRecord>,
    pub skipped: usize,
    pub failure: Option<FetchError>,
}

/// Fetch the newest records of one channel, bounded by the spec's cap.
///
/// Never panics and never propagates an error: the worst outcome is an
/// empty record list with `failure` set, so sibling fetches always run to
/// completion.
pub fn fetch_channel(
    source: &dyn EventSource,
    spec: &ChannelSpec,
    host: &str,
    now: DateTime<Utc>,
) -> ChannelFetch {
    let cursor = match source.query(&spec.name) {
        Ok(cursor) => cursor,
        Err(e) => {
            tracing::warn!(channel = %spec.name, error = %e, "Channel fetch failed");
            return ChannelFetch {
                records: Vec::new(),
                skipped: 0,
                failure: Some(e),
            };
        }
    };

    let mut records = Vec::with_capacity(spec.max_records.min(constants::DEFAULT_MAX_RECORDS));
    let mut skipped = 0usize;

    for item in cursor {
        if records.len() >= spec.max_records {
            break;
        }
        match item {
            Ok(raw) => records.push(normalize(raw, &spec.name, host, now)),
            Err(e) => {
                // Record-scoped: skip and keep reading.
                skipped += 1;
                tracing::debug!(channel = %spec.name, error = %e, "Skipped unreadable record");
            }
        }
    }

    tracing::debug!(
        channel = %spec.name,
        records = records.len(),
        skipped,
        "Channel fetch complete"
    );

    ChannelFetch {
        records,
        skipped,
        failure: None,
    }
}
