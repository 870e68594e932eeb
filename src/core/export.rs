// EventDash - core/export.rs
//
// CSV and JSON export of the loaded channel collections.
// Streaming functions write to any Write; the file variants resolve the
// timestamped filename and write atomically (temp file + rename) so a
// failed export never leaves a partial file behind.
//
// CSV format contract (fixed, consumed by external tooling):
//   - header row exactly `Timestamp,EventID,Level,Source,Computer,User,Message`,
//     unquoted;
//   - one row per record, channels in configured order, records newest-first;
//   - timestamps as `yyyy-MM-dd HH:mm:ss`, text fields double-quoted with
//     embedded quotes doubled, EventID bare.

use crate::core::model::Aggregation;
use crate::util::constants;
use crate::util::error::ExportError;
use chrono::Local;
use csv::{QuoteStyle, WriterBuilder};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Export all channel collections as CSV text.
///
/// `export_path` is used for error context only; persistence is the file
/// variant's concern. Returns the number of rows written.
pub fn export_csv<W: Write>(
    aggregation: &Aggregation,
    mut writer: W,
    export_path: &Path,
) -> Result<usize, ExportError> {
    // The header is written directly: the contract wants it unquoted, while
    // the data rows use non-numeric quoting to match the format above.
    writeln!(writer, "{}", constants::CSV_HEADER).map_err(|e| ExportError::Io {
        path: export_path.to_path_buf(),
        source: e,
    })?;

    let mut csv_writer = WriterBuilder::new()
        .quote_style(QuoteStyle::NonNumeric)
        .from_writer(writer);

    let mut count = 0;
    for record in aggregation.flattened() {
        let timestamp = record
            .timestamp
            .format(constants::CSV_TIMESTAMP_FORMAT)
            .to_string();
        let event_id = record.event_id.to_string();

        csv_writer
            .write_record([
                timestamp.as_str(),
                event_id.as_str(),
                record.level.as_str(),
                record.source.as_str(),
                record.host.as_str(),
                record.user.as_str(),
                record.message.as_str(),
            ])
            .map_err(|e| ExportError::Csv {
                path: export_path.to_path_buf(),
                source: e,
            })?;
        count += 1;
    }

    csv_writer.flush().map_err(|e| ExportError::Io {
        path: export_path.to_path_buf(),
        source: e,
    })?;

    Ok(count)
}

/// Export all channel collections as a JSON array of records, flattened in
/// the same order as the CSV rows.
pub fn export_json<W: Write>(
    aggregation: &Aggregation,
    writer: W,
    export_path: &Path,
) -> Result<usize, ExportError> {
    let records: Vec<_> = aggregation.flattened().collect();
    serde_json::to_writer_pretty(writer, &records).map_err(|e| ExportError::Json {
        path: export_path.to_path_buf(),
        source: e,
    })?;
    Ok(records.len())
}

/// The timestamped export filename: `logs_<yyyyMMdd>_<HHmmss>.<ext>`.
///
/// Second-resolution stamps make collisions effectively impossible under
/// interactive use; on a collision the atomic rename replaces the older
/// export of the same second.
pub fn export_filename(extension: &str) -> String {
    format!(
        "{}{}.{extension}",
        constants::EXPORT_FILE_PREFIX,
        Local::now().format(constants::EXPORT_STAMP_FORMAT)
    )
}

/// Write a CSV export into `dir`, returning the final path and row count.
pub fn export_csv_file(
    aggregation: &Aggregation,
    dir: &Path,
) -> Result<(PathBuf, usize), ExportError> {
    write_atomically(dir, &export_filename("csv"), |writer, path| {
        export_csv(aggregation, writer, path)
    })
}

/// Write a JSON export into `dir`, returning the final path and record count.
pub fn export_json_file(
    aggregation: &Aggregation,
    dir: &Path,
) -> Result<(PathBuf, usize), ExportError> {
    write_atomically(dir, &export_filename("json"), |writer, path| {
        export_json(aggregation, writer, path)
    })
}

/// Atomic write: serialise into a sibling temp file, then rename into
/// place. A failure at any point removes the temp file, so the destination
/// either receives the complete export or nothing at all.
fn write_atomically<F>(dir: &Path, file_name: &str, serialise: F) -> Result<(PathBuf, usize), ExportError>
where
    F: FnOnce(&mut std::io::BufWriter<std::fs::File>, &Path) -> Result<usize, ExportError>,
{
    let final_path = dir.join(file_name);
    let tmp_path = final_path.with_extension("tmp");

    let file = std::fs::File::create(&tmp_path).map_err(|e| ExportError::Io {
        path: tmp_path.clone(),
        source: e,
    })?;
    let mut writer = std::io::BufWriter::new(file);

    let count = match serialise(&mut writer, &final_path) {
        Ok(count) => count,
        Err(e) => {
            drop(writer);
            let _ = std::fs::remove_file(&tmp_path);
            return Err(e);
        }
    };

    if let Err(e) = writer.flush() {
        drop(writer);
        let _ = std::fs::remove_file(&tmp_path);
        return Err(ExportError::Io {
            path: tmp_path.clone(),
            source: e,
        });
    }
    drop(writer);

    std::fs::rename(&tmp_path, &final_path).map_err(|e| {
        let _ = std::fs::remove_file(&tmp_path);
        ExportError::Io {
            path: final_path.clone(),
            source: e,
        }
    })?;

    tracing::debug!(path = %final_path.display(), rows = count, "Export written");
    Ok((final_path, count))
}
