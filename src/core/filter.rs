// EventDash - core/filter.rs
//
// Severity filtering over channel collections.
// Non-destructive: filtering produces index views, never mutates or
// copies the underlying records.

use crate::core::model::LogRecord;

/// The active severity predicate.
///
/// Matching is substring containment against a record's `level`, the same
/// rule the metrics use to count errors and warnings, so visible rows and
/// displayed counts always agree on what qualifies.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SeverityFilter {
    /// Show everything.
    #[default]
    All,

    /// Show records whose level contains this token.
    Contains(String),
}

impl SeverityFilter {
    /// Parse a user-supplied filter token. "All" (any case) and the empty
    /// string mean unfiltered; anything else is a containment token.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("all") {
            SeverityFilter::All
        } else {
            SeverityFilter::Contains(trimmed.to_string())
        }
    }

    /// Whether a level string passes this filter.
    pub fn matches(&self, level: &str) -> bool {
        match self {
            SeverityFilter::All => true,
            SeverityFilter::Contains(token) => level.contains(token.as_str()),
        }
    }

    /// Display label for status lines.
    pub fn label(&self) -> &str {
        match self {
            SeverityFilter::All => "All",
            SeverityFilter::Contains(token) => token,
        }
    }
}

/// Apply the filter to one channel collection, returning indices of the
/// matching records in stored order.
///
/// Returning indices avoids copying records and keeps the stored
/// collection untouched; consumers resolve indices against the same slice.
pub fn apply_filter(records: &[LogRecord], filter: &SeverityFilter) -> Vec<usize> {
    if matches!(filter, SeverityFilter::All) {
        return (0..records.len()).collect();
    }

    records
        .iter()
        .enumerate()
        .filter(|(_, record)| filter.matches(&record.level))
        .map(|(idx, _)| idx)
        .collect()
}
