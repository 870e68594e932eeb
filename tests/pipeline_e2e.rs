// EventDash - tests/pipeline_e2e.rs
//
// End-to-end tests for the aggregation pipeline: fan-out fetch,
// normalisation, metrics, filtering, state handling, and export.
//
// The OS log subsystem is replaced by a scripted `EventSource`; everything
// downstream of the source boundary — the real pipeline threads, the real
// filter and metrics rules, the real CSV writer on a real filesystem — is
// exercised unmocked.

use chrono::{TimeZone, Utc};
use eventdash::app::state::DashboardState;
use eventdash::core::export;
use eventdash::core::fetch::{EventCursor, EventSource, RawEvent};
use eventdash::core::filter::SeverityFilter;
use eventdash::core::model::{ChannelSpec, RefreshProgress};
use eventdash::core::pipeline;
use eventdash::util::error::FetchError;
use std::collections::HashMap;

// =============================================================================
// Scripted source
// =============================================================================

/// Per-channel script: canned raw events, a number of unreadable records
/// ahead of them, or a channel-level failure.
#[derive(Default)]
struct Script {
    events: Vec<RawEvent>,
    unreadable: usize,
    deny_access: bool,
}

#[derive(Default)]
struct FakeEventLog {
    scripts: HashMap<String, Script>,
}

impl FakeEventLog {
    fn with(mut self, channel: &str, script: Script) -> Self {
        self.scripts.insert(channel.to_string(), script);
        self
    }
}

impl EventSource for FakeEventLog {
    fn query(&self, channel: &str) -> Result<EventCursor<'_>, FetchError> {
        let Some(script) = self.scripts.get(channel) else {
            return Err(FetchError::ChannelNotFound {
                channel: channel.to_string(),
            });
        };
        if script.deny_access {
            return Err(FetchError::AccessDenied {
                channel: channel.to_string(),
            });
        }
        let channel = channel.to_string();
        let unreadable = (0..script.unreadable).map(move |_| {
            Err(FetchError::Render {
                channel: channel.clone(),
            })
        });
        Ok(Box::new(
            unreadable.chain(script.events.clone().into_iter().map(Ok)),
        ))
    }
}

// =============================================================================
// Helpers
// =============================================================================

fn event(event_id: u32, level: &str, message: &str) -> RawEvent {
    RawEvent {
        time_created: Some(Utc.with_ymd_and_hms(2025, 8, 6, 9, 0, 0).unwrap()),
        event_id,
        level_name: Some(level.to_string()),
        provider: Some("TestProvider".to_string()),
        user: None,
        description: Some(message.to_string()),
    }
}

fn five_specs() -> Vec<ChannelSpec> {
    ChannelSpec::defaults()
}

/// The default five-channel source, every channel healthy.
fn healthy_source() -> FakeEventLog {
    let mut source = FakeEventLog::default();
    for (idx, spec) in five_specs().iter().enumerate() {
        let events = (0..3 + idx as u32)
            .map(|i| {
                let level = match i % 3 {
                    0 => "Information",
                    1 => "Warning",
                    _ => "Error",
                };
                event(1000 + i, level, "routine event")
            })
            .collect();
        source = source.with(
            &spec.name,
            Script {
                events,
                ..Default::default()
            },
        );
    }
    source
}

// =============================================================================
// Pipeline E2E
// =============================================================================

/// A full refresh over five healthy channels loads every channel in
/// configured order with consistent metrics.
#[test]
fn e2e_refresh_loads_all_channels() {
    let source = healthy_source();
    let specs = five_specs();
    let agg = pipeline::refresh(&source, &specs);

    assert_eq!(agg.channels.len(), 5);
    let labels: Vec<&str> = agg.channels.iter().map(|c| c.spec.label.as_str()).collect();
    assert_eq!(
        labels,
        ["Security", "Firewall", "DNS", "Application", "System"]
    );

    for channel in &agg.channels {
        assert!(!channel.records.is_empty(), "{} is empty", channel.spec.label);
        let m = &channel.metrics;
        assert_eq!(m.total, channel.records.len());
        assert_eq!(m.errors + m.warnings + m.infos, m.total);
    }
}

/// One denied channel yields an empty collection plus a warning; the four
/// healthy siblings still load and the refresh succeeds.
#[test]
fn e2e_failing_channel_is_isolated() {
    let mut source = healthy_source();
    source = source.with(
        "Security",
        Script {
            deny_access: true,
            ..Default::default()
        },
    );
    let agg = pipeline::refresh(&source, &five_specs());

    let security = agg.channel("Security").expect("Security present");
    assert!(security.records.is_empty());
    assert_eq!(security.metrics.total, 0);
    assert!(
        security.warnings.iter().any(|w| w.contains("denied")),
        "expected an access-denied warning, got {:?}",
        security.warnings
    );

    let healthy: usize = agg
        .channels
        .iter()
        .filter(|c| c.spec.name != "Security")
        .map(|c| c.records.len())
        .sum();
    assert!(healthy > 0, "sibling channels should still have records");
}

/// Unreadable records are skipped without losing the readable remainder.
#[test]
fn e2e_unreadable_records_are_skipped() {
    let source = FakeEventLog::default().with(
        "Application",
        Script {
            events: vec![event(1, "Information", "ok")],
            unreadable: 3,
            ..Default::default()
        },
    );
    let specs = vec![ChannelSpec::new("Application", "Application", 100)];
    let agg = pipeline::refresh(&source, &specs);

    let app = &agg.channels[0];
    assert_eq!(app.records.len(), 1);
    assert!(
        app.warnings.iter().any(|w| w.contains("skipped")),
        "expected a skip warning, got {:?}",
        app.warnings
    );
}

/// Normalisation through the full pipeline: long descriptions are capped
/// at 203 characters, level strings are reduced to their first token.
#[test]
fn e2e_normalisation_rules_apply() {
    let long_message = "y".repeat(500);
    let source = FakeEventLog::default().with(
        "Security",
        Script {
            events: vec![
                event(4624, "Audit Success", &long_message),
                event(4625, "", "short"),
            ],
            ..Default::default()
        },
    );
    let specs = vec![ChannelSpec::new("Security", "Security", 100)];
    let agg = pipeline::refresh(&source, &specs);
    let records = &agg.channels[0].records;

    assert_eq!(records[0].level, "Audit");
    assert_eq!(records[0].message.chars().count(), 203);
    assert!(records[0].message.ends_with("..."));

    assert_eq!(records[1].level, "Information");
    assert_eq!(records[1].message, "short");
}

/// The per-channel cap bounds the fetch even when the source has more.
#[test]
fn e2e_record_cap_is_honoured() {
    let source = FakeEventLog::default().with(
        "System",
        Script {
            events: (0..250).map(|i| event(i, "Information", "e")).collect(),
            ..Default::default()
        },
    );
    let specs = vec![ChannelSpec::new("System", "System", 100)];
    let agg = pipeline::refresh(&source, &specs);
    assert_eq!(agg.channels[0].records.len(), 100);
}

// =============================================================================
// Filtering and state
// =============================================================================

/// Filtering restricts the visible views; the stored collections and their
/// metrics stay untouched (metrics reflect the unfiltered collection).
#[test]
fn e2e_filter_views_diverge_from_metrics() {
    let specs = five_specs();
    let mut state = DashboardState::new(&specs);
    state.install(pipeline::refresh(&healthy_source(), &specs));

    let total_before = state.visible_total();
    let metrics_before: Vec<_> = state
        .aggregation
        .channels
        .iter()
        .map(|c| c.metrics.clone())
        .collect();

    state.set_filter(SeverityFilter::parse("Error"));
    let error_total: usize = state
        .aggregation
        .channels
        .iter()
        .map(|c| c.metrics.errors)
        .sum();
    assert_eq!(state.visible_total(), error_total);
    assert!(state.visible_total() < total_before);

    let metrics_after: Vec<_> = state
        .aggregation
        .channels
        .iter()
        .map(|c| c.metrics.clone())
        .collect();
    assert_eq!(metrics_before, metrics_after);

    state.set_filter(SeverityFilter::parse("All"));
    assert_eq!(state.visible_total(), total_before);
}

/// ClearAll empties every channel and metrics report zero across the board.
#[test]
fn e2e_clear_all_resets_everything() {
    let specs = five_specs();
    let mut state = DashboardState::new(&specs);
    state.install(pipeline::refresh(&healthy_source(), &specs));
    assert!(state.visible_total() > 0);

    state.clear_all();
    assert_eq!(state.status, "All logs cleared");
    assert_eq!(state.visible_total(), 0);
    for channel in &state.aggregation.channels {
        let m = &channel.metrics;
        assert_eq!((m.total, m.errors, m.warnings, m.infos), (0, 0, 0, 0));
    }
}

/// Progress messages from a background refresh drive the state machine to
/// the installed snapshot.
#[test]
fn e2e_background_refresh_via_progress_messages() {
    use eventdash::app::refresh::RefreshManager;
    use std::sync::Arc;
    use std::time::{Duration, Instant};

    let specs = five_specs();
    let mut state = DashboardState::new(&specs);
    state.begin_refresh();
    assert_eq!(state.status, "Loading all logs...");

    let mut manager = RefreshManager::new();
    manager.start_refresh(Arc::new(healthy_source()), specs);

    let deadline = Instant::now() + Duration::from_secs(5);
    while state.refresh_in_progress && Instant::now() < deadline {
        for message in manager.poll_progress() {
            if let RefreshProgress::ChannelLoaded { records, .. } = &message {
                assert!(*records > 0);
            }
            state.handle_progress(message);
        }
        std::thread::sleep(Duration::from_millis(5));
    }

    assert!(!state.refresh_in_progress, "refresh did not complete");
    assert_eq!(state.status, "All logs loaded successfully");
    assert!(state.visible_total() > 0);
}

// =============================================================================
// Export E2E
// =============================================================================

/// Exported CSV parses back with standard quoting rules, recovering every
/// field value including embedded double quotes.
#[test]
fn e2e_csv_round_trip_recovers_fields() {
    let source = FakeEventLog::default().with(
        "Application",
        Script {
            events: vec![event(7, "Error", "He said \"hi\"")],
            ..Default::default()
        },
    );
    let specs = vec![ChannelSpec::new("Application", "Application", 100)];
    let agg = pipeline::refresh(&source, &specs);

    let mut buf = Vec::new();
    export::export_csv(&agg, &mut buf, std::path::Path::new("out.csv")).unwrap();

    let mut reader = csv::Reader::from_reader(buf.as_slice());
    assert_eq!(
        reader.headers().unwrap(),
        &csv::StringRecord::from(vec![
            "Timestamp", "EventID", "Level", "Source", "Computer", "User", "Message"
        ])
    );

    let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
    assert_eq!(rows.len(), 1);
    assert_eq!(&rows[0][0], "2025-08-06 09:00:00");
    assert_eq!(&rows[0][1], "7");
    assert_eq!(&rows[0][2], "Error");
    assert_eq!(&rows[0][3], "TestProvider");
    assert_eq!(&rows[0][5], "N/A");
    assert_eq!(&rows[0][6], "He said \"hi\"");
}

/// Rows appear in configured channel order, records newest-first within a
/// channel, exactly as stored.
#[test]
fn e2e_csv_preserves_channel_and_record_order() {
    let source = FakeEventLog::default()
        .with(
            "Security",
            Script {
                events: vec![event(2, "Information", "sec-new"), event(1, "Information", "sec-old")],
                ..Default::default()
            },
        )
        .with(
            "System",
            Script {
                events: vec![event(3, "Information", "sys-new")],
                ..Default::default()
            },
        );
    let specs = vec![
        ChannelSpec::new("Security", "Security", 100),
        ChannelSpec::new("System", "System", 100),
    ];
    let agg = pipeline::refresh(&source, &specs);

    let mut buf = Vec::new();
    export::export_csv(&agg, &mut buf, std::path::Path::new("out.csv")).unwrap();
    let text = String::from_utf8(buf).unwrap();

    let messages: Vec<usize> = ["sec-new", "sec-old", "sys-new"]
        .iter()
        .map(|m| text.find(m).unwrap())
        .collect();
    assert!(messages[0] < messages[1] && messages[1] < messages[2]);
}

/// A successful file export lands under the timestamped name and the
/// status surface reports it; a failed export leaves nothing behind.
#[test]
fn e2e_export_file_success_and_failure() {
    let specs = five_specs();
    let mut state = DashboardState::new(&specs);
    state.install(pipeline::refresh(&healthy_source(), &specs));

    let dir = tempfile::tempdir().unwrap();
    let outcome = export::export_csv_file(&state.aggregation, dir.path());
    state.record_export(&outcome);

    let (path, count) = outcome.unwrap();
    assert_eq!(count, state.aggregation.total_records());
    assert!(path.exists());
    assert!(state.status.starts_with(&format!("Exported {count} events to logs_")));

    // Failure: nonexistent destination directory.
    let missing = dir.path().join("nope");
    let outcome = export::export_csv_file(&state.aggregation, &missing);
    state.record_export(&outcome);
    assert!(outcome.is_err());
    assert!(state.status.starts_with("Export failed:"));
    assert!(!missing.exists());
    let stray: Vec<_> = std::fs::read_dir(dir.path())
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.path().extension().is_some_and(|ext| ext == "tmp"))
        .collect();
    assert!(stray.is_empty(), "temp files left behind: {stray:?}");
}
