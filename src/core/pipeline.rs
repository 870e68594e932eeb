// EventDash - core/pipeline.rs
//
// The aggregation pipeline: fan out one fetch per configured channel,
// wait for all of them (single barrier), then compute per-channel metrics
// from the settled collections.
//
// Each refresh produces a fresh, immutable `Aggregation` snapshot.
// Consumers install snapshots wholesale, so a refresh in flight can never
// expose records from two different cycles for the same channel, and
// overlapping refreshes stay safe without any locking on the collections.

use crate::core::fetch::{self, ChannelFetch, EventSource};
use crate::core::model::{Aggregation, ChannelAggregate, ChannelMetrics, ChannelSpec};
use chrono::Utc;

/// Run one full refresh cycle over the given channels.
pub fn refresh(source: &dyn EventSource, specs: &[ChannelSpec]) -> Aggregation {
    refresh_with(source, specs, &|_, _| {})
}

/// Run one full refresh cycle, invoking `on_channel` from the fetch thread
/// as each channel settles (for progress reporting). The callback sees the
/// settled fetch before the barrier; the returned snapshot is only built
/// once every channel has settled.
pub fn refresh_with(
    source: &dyn EventSource,
    specs: &[ChannelSpec],
    on_channel: &(dyn Fn(&ChannelSpec, &ChannelFetch) + Sync),
) -> Aggregation {
    let host = fetch::machine_name();
    let now = Utc::now();

    tracing::info!(channels = specs.len(), "Refresh started");

    let fetches: Vec<ChannelFetch> = std::thread::scope(|scope| {
        let handles: Vec<_> = specs
            .iter()
            .map(|spec| {
                let host = host.as_str();
                scope.spawn(move || {
                    let result = fetch::fetch_channel(source, spec, host, now);
                    on_channel(spec, &result);
                    result
                })
            })
            .collect();

        // Joining in spawn order keeps the snapshot in configured channel
        // order regardless of completion order. This join is the barrier.
        handles
            .into_iter()
            .zip(specs)
            .map(|(handle, spec)| {
                handle.join().unwrap_or_else(|_| {
                    tracing::error!(channel = %spec.name, "Channel fetch thread panicked");
                    ChannelFetch {
                        records: Vec::new(),
                        skipped: 0,
                        failure: None,
                    }
                })
            })
            .collect()
    });

    let channels: Vec<ChannelAggregate> = specs
        .iter()
        .zip(fetches)
        .map(|(spec, settled)| {
            let mut warnings = Vec::new();
            if let Some(failure) = &settled.failure {
                warnings.push(format!("{}: {failure}", spec.label));
            }
            if settled.skipped > 0 {
                warnings.push(format!(
                    "{}: {} record(s) could not be read and were skipped",
                    spec.label, settled.skipped
                ));
            }
            ChannelAggregate {
                spec: spec.clone(),
                metrics: ChannelMetrics::compute(&settled.records, now),
                records: settled.records,
                warnings,
            }
        })
        .collect();

    let aggregation = Aggregation { channels };
    tracing::info!(
        channels = aggregation.channels.len(),
        records = aggregation.total_records(),
        "Refresh complete"
    );
    aggregation
}
