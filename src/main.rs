// EventDash - main.rs
//
// CLI entry point and presentation layer. Handles:
// 1. CLI argument parsing
// 2. Configuration loading and logging initialisation
// 3. One refresh cycle over the configured channels
// 4. Rendering (metrics table, entry listing) and export

use clap::Parser;
use comfy_table::{ContentArrangement, Table};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use eventdash::app::refresh::RefreshManager;
use eventdash::app::state::DashboardState;
use eventdash::core::export;
use eventdash::core::fetch::EventSource;
use eventdash::core::filter::SeverityFilter;
use eventdash::core::model::{ChannelSpec, LogRecord};
use eventdash::platform;
use eventdash::util::constants;
use eventdash::util::error::ExportError;
use eventdash::util::logging;

/// How often the CLI polls the refresh thread for progress.
const PROGRESS_POLL_INTERVAL_MS: u64 = 25;

/// EventDash - Windows Event Log dashboard.
///
/// Reads the configured event log channels in parallel, shows per-channel
/// severity counts, and optionally lists or exports the loaded entries.
#[derive(Parser, Debug)]
#[command(name = "EventDash", version, about)]
struct Cli {
    /// Severity filter (All, Error, Warning, Information, or any token).
    #[arg(short = 'f', long = "filter-level", default_value = "All")]
    filter_level: String,

    /// Restrict the dashboard to the named channels (name or label; repeatable).
    #[arg(short = 'c', long = "channel")]
    channels: Vec<String>,

    /// Override the per-channel record cap.
    #[arg(short = 'n', long = "max-records")]
    max_records: Option<usize>,

    /// List the visible entries below the metrics table.
    #[arg(short = 'l', long = "list")]
    list: bool,

    /// Export the loaded entries after the refresh.
    #[arg(short = 'e', long = "export")]
    export: bool,

    /// Export as JSON instead of CSV.
    #[arg(long = "json", requires = "export")]
    json: bool,

    /// Destination directory for exports (defaults to the desktop folder).
    #[arg(short = 'o', long = "output")]
    output: Option<PathBuf>,

    /// Enable debug logging (equivalent to RUST_LOG=debug).
    #[arg(short = 'd', long = "debug")]
    debug: bool,
}

fn main() {
    let cli = Cli::parse();

    // Config is read before logging is initialised so [logging] level can
    // take effect; diagnostics from these two steps come back as warnings.
    let paths = platform::paths::PlatformPaths::resolve();
    let (config, config_warnings) = platform::config::load_config(&paths.config_dir);

    logging::init(cli.debug, config.log_level.as_deref());

    tracing::info!(
        version = constants::APP_VERSION,
        debug = cli.debug,
        "EventDash starting"
    );
    for warning in &config_warnings {
        tracing::warn!(warning = %warning, "Configuration warning");
    }

    let specs = select_channels(config.channels, &cli);
    if specs.is_empty() {
        eprintln!("Error: no channels selected.");
        std::process::exit(2);
    }

    let Some(source) = native_source() else {
        eprintln!("Error: the Windows Event Log is only available on Windows.");
        std::process::exit(1);
    };

    let mut state = DashboardState::new(&specs);
    state.set_filter(SeverityFilter::parse(&cli.filter_level));

    // Run the refresh on the background thread and poll for progress, the
    // same way an interactive front end would.
    state.begin_refresh();
    println!("{}", state.status);

    let mut manager = RefreshManager::new();
    manager.start_refresh(source, specs.clone());
    while state.refresh_in_progress {
        for message in manager.poll_progress() {
            state.handle_progress(message);
        }
        if state.refresh_in_progress {
            std::thread::sleep(Duration::from_millis(PROGRESS_POLL_INTERVAL_MS));
        }
    }
    println!("{}", state.status);

    for warning in &state.warnings {
        eprintln!("Warning: {warning}");
    }

    print_metrics(&state);
    if cli.list {
        print_entries(&state);
    }

    if cli.export {
        let destination = cli
            .output
            .clone()
            .or_else(|| config.export_dir.clone())
            .or_else(|| paths.desktop_dir.clone());

        let outcome = match destination {
            Some(dir) => {
                if cli.json {
                    export::export_json_file(&state.aggregation, &dir)
                } else {
                    export::export_csv_file(&state.aggregation, &dir)
                }
            }
            None => Err(ExportError::NoDestination),
        };

        state.record_export(&outcome);
        println!("{}", state.status);
        if outcome.is_err() {
            std::process::exit(1);
        }
    }
}

/// Resolve the channel set from configuration and CLI flags.
///
/// `--channel` picks configured channels by name or label; an unknown name
/// is taken as a raw channel name so any channel on the machine can be
/// inspected without editing the config file.
fn select_channels(configured: Vec<ChannelSpec>, cli: &Cli) -> Vec<ChannelSpec> {
    let mut specs: Vec<ChannelSpec> = if cli.channels.is_empty() {
        configured
    } else {
        cli.channels
            .iter()
            .map(|wanted| {
                configured
                    .iter()
                    .find(|s| {
                        s.name.eq_ignore_ascii_case(wanted) || s.label.eq_ignore_ascii_case(wanted)
                    })
                    .cloned()
                    .unwrap_or_else(|| {
                        ChannelSpec::new(
                            wanted.clone(),
                            wanted.clone(),
                            constants::DEFAULT_MAX_RECORDS,
                        )
                    })
            })
            .collect()
    };

    if let Some(cap) = cli.max_records {
        let cap = cap.clamp(constants::MIN_MAX_RECORDS, constants::ABSOLUTE_MAX_RECORDS);
        for spec in &mut specs {
            spec.max_records = cap;
        }
    }

    specs
}

/// The platform's live event source; `None` where no event log exists.
#[cfg(windows)]
fn native_source() -> Option<Arc<dyn EventSource>> {
    Some(Arc::new(platform::win_event_log::WinEventLog::new()))
}

#[cfg(not(windows))]
fn native_source() -> Option<Arc<dyn EventSource>> {
    None
}

/// Per-channel metrics table.
fn print_metrics(state: &DashboardState) {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        "Channel",
        "Events",
        "Errors",
        "Warnings",
        "Info",
        "Last updated",
    ]);

    for channel in &state.aggregation.channels {
        let metrics = &channel.metrics;
        let updated = metrics
            .last_updated
            .map(|t| t.format(constants::CSV_TIMESTAMP_FORMAT).to_string())
            .unwrap_or_else(|| "-".to_string());
        table.add_row(vec![
            channel.spec.label.clone(),
            metrics.total.to_string(),
            metrics.errors.to_string(),
            metrics.warnings.to_string(),
            metrics.infos.to_string(),
            updated,
        ]);
    }

    println!("{table}");
}

/// Entry listing under the active filter, one block per channel.
fn print_entries(state: &DashboardState) {
    for (idx, channel) in state.aggregation.channels.iter().enumerate() {
        let visible: Vec<&LogRecord> = state.visible(idx).collect();
        println!();
        println!(
            "== {} ({} of {} shown, filter: {}) ==",
            channel.spec.label,
            visible.len(),
            channel.records.len(),
            state.filter.label()
        );
        for record in visible {
            println!(
                "{}  {:<12} {:>6}  {}  {}",
                record.timestamp.format(constants::CSV_TIMESTAMP_FORMAT),
                record.level,
                record.event_id,
                record.source,
                record.message
            );
        }
    }
}
