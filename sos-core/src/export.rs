use std::{fs::File, io::Write, path::Path};

use anyhow::{Context, Result};
use chrono::SecondsFormat;
use tracing::info;

use crate::model::ObservationSeries;

/// Write `series` as two-column CSV: `Date,<property>(<unit>)`.
pub fn write_csv<W: Write>(series: &ObservationSeries, writer: W) -> Result<()> {
    let mut csv = csv::Writer::from_writer(writer);

    csv.write_record(["Date".to_string(), series.column_label()])
        .context("Failed to write CSV header")?;

    for point in &series.points {
        csv.write_record([
            point.time.to_rfc3339_opts(SecondsFormat::AutoSi, true),
            point.value.to_string(),
        ])
        .context("Failed to write CSV row")?;
    }

    csv.flush().context("Failed to flush CSV output")?;
    Ok(())
}

/// Write `series` as pretty-printed JSON, followed by a newline.
pub fn write_json<W: Write>(series: &ObservationSeries, mut writer: W) -> Result<()> {
    serde_json::to_writer_pretty(&mut writer, series).context("Failed to serialize series to JSON")?;
    writeln!(writer).context("Failed to write JSON output")?;
    Ok(())
}

/// Export `series` to a file at `path`.
///
/// Returns `false` without touching the filesystem when there is nothing to export.
pub fn export_csv(series: &ObservationSeries, path: &Path) -> Result<bool> {
    if series.is_empty() {
        return Ok(false);
    }

    let file = File::create(path)
        .with_context(|| format!("Failed to create CSV file: {}", path.display()))?;
    write_csv(series, file)
        .with_context(|| format!("Failed to export series to {}", path.display()))?;

    info!(path = %path.display(), rows = series.len(), "series exported");
    Ok(true)
}
