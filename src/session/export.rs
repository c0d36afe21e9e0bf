//! CSV export of the full log
//!
//! The text format is deliberately plain: comma-separated, `\n` line breaks,
//! no quoting and no trailing newline. Values never contain commas, so no
//! escaping is needed.

use std::fmt::Display;
use std::path::Path;

use chrono::{DateTime, TimeZone};

use crate::error::{Result, SensorViewError};
use crate::types::Reading;

/// MIME type of exported files
pub const CSV_MIME: &str = "text/csv";

/// File extension of exported files
pub const CSV_EXTENSION: &str = "csv";

/// `timestamp,sensor_0,...,sensor_{n-1}`
pub fn csv_header(channel_count: usize) -> Vec<String> {
    std::iter::once("timestamp".to_string())
        .chain((0..channel_count).map(|i| format!("sensor_{}", i)))
        .collect()
}

/// One row per reading: ISO-8601 timestamp, then the values
pub fn log_rows(log: &[Reading]) -> Vec<Vec<String>> {
    log.iter()
        .map(|reading| {
            std::iter::once(reading.iso_timestamp())
                .chain(reading.values.iter().map(|v| v.to_string()))
                .collect()
        })
        .collect()
}

/// Join a header and rows into CSV text
pub fn to_delimited_text<S: AsRef<str>>(rows: &[Vec<String>], header: &[S]) -> String {
    let header_line = header
        .iter()
        .map(|h| h.as_ref())
        .collect::<Vec<_>>()
        .join(",");
    std::iter::once(header_line)
        .chain(rows.iter().map(|row| row.join(",")))
        .collect::<Vec<_>>()
        .join("\n")
}

/// CSV text for a whole log
pub fn log_to_csv(log: &[Reading], channel_count: usize) -> String {
    to_delimited_text(&log_rows(log), &csv_header(channel_count))
}

/// Replace every run of characters outside `[A-Za-z0-9._-]` with a single `-`
pub fn sanitize_for_filename(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut in_run = false;
    for c in s.chars() {
        if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
            out.push(c);
            in_run = false;
        } else if !in_run {
            out.push('-');
            in_run = true;
        }
    }
    out
}

/// `YYYYMMDD_hhmm` in the timestamp's own zone
pub fn format_ymd_hm<Tz: TimeZone>(dt: &DateTime<Tz>) -> String
where
    Tz::Offset: Display,
{
    dt.format("%Y%m%d_%H%M").to_string()
}

/// Suggested export filename.
///
/// `{label}_{id}_sensor_log_{start}-{end}.csv`, where start and end come
/// from the first and last log entries rendered in `now`'s time zone, or
/// both equal `now` when the log is empty. Empty labels become `device`
/// and `id-unknown`.
pub fn derive_filename<Tz: TimeZone>(
    label: &str,
    id: &str,
    log: &[Reading],
    now: DateTime<Tz>,
) -> String
where
    Tz::Offset: Display,
{
    let label = sanitize_for_filename(if label.is_empty() { "device" } else { label });
    let id = sanitize_for_filename(if id.is_empty() { "id-unknown" } else { id });

    let tz = now.timezone();
    let (start, end) = match (log.first(), log.last()) {
        (Some(first), Some(last)) => (
            format_ymd_hm(&first.timestamp.with_timezone(&tz)),
            format_ymd_hm(&last.timestamp.with_timezone(&tz)),
        ),
        _ => {
            let stamp = format_ymd_hm(&now);
            (stamp.clone(), stamp)
        }
    };

    format!(
        "{}_{}_sensor_log_{}-{}.{}",
        label, id, start, end, CSV_EXTENSION
    )
}

/// Write CSV text to `path` as UTF-8
pub fn export_to_path(path: &Path, text: &str) -> Result<()> {
    std::fs::write(path, text.as_bytes()).map_err(|e| {
        SensorViewError::Io(e).with_context(format!("Failed to write {}", path.display()))
    })?;
    tracing::info!(
        "Exported {} bytes of {} to {}",
        text.len(),
        CSV_MIME,
        path.display()
    );
    Ok(())
}
