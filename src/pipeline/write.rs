//! Dataset writer: serialise the station table to a CSV artifact.
//!
//! Reconciled tables get a header row (`Station` plus the projected column
//! names); raw filtered extracts are written headerless, cells verbatim,
//! matching how downstream modeling scripts consume them. The write is
//! atomic (temp file in the destination directory, then rename) so a
//! crashed run never leaves a truncated artifact behind.

use crate::config::ExtractionConfig;
use crate::error::ExtractError;
use crate::output::StationTable;
use std::path::Path;
use tracing::info;

/// Write the table to `path`, overwriting any existing file.
pub fn write_csv(
    table: &StationTable,
    config: &ExtractionConfig,
    path: &Path,
) -> Result<(), ExtractError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|e| ExtractError::OutputWriteFailed {
                path: path.to_path_buf(),
                source: e,
            })?;
        }
    }

    let mut buf = Vec::new();
    write_csv_to(table, config, &mut buf)?;

    let tmp_path = path.with_extension("csv.tmp");
    std::fs::write(&tmp_path, &buf).map_err(|e| ExtractError::OutputWriteFailed {
        path: path.to_path_buf(),
        source: e,
    })?;
    std::fs::rename(&tmp_path, path).map_err(|e| ExtractError::OutputWriteFailed {
        path: path.to_path_buf(),
        source: e,
    })?;

    info!("wrote {} rows to {}", table.rows.len(), path.display());
    Ok(())
}

/// Write CSV records to any writer. Split out from [`write_csv`] so the CLI
/// can stream the same bytes to stdout.
pub fn write_csv_to(
    table: &StationTable,
    config: &ExtractionConfig,
    writer: impl std::io::Write,
) -> Result<(), ExtractError> {
    let mut csv_writer = csv::WriterBuilder::new()
        .flexible(true)
        .from_writer(writer);

    let io_err = |e: csv::Error| ExtractError::Internal(format!("csv write: {e}"));

    if table.filtered {
        // Raw filtered extract: no header, no synthetic Station column.
        for row in &table.rows {
            let record: Vec<String> = row.cells.iter().map(|c| c.to_field()).collect();
            csv_writer.write_record(&record).map_err(io_err)?;
        }
    } else {
        let keep = keep_mask(table, config);

        let mut header = vec!["Station".to_string()];
        header.extend(
            table
                .columns
                .iter()
                .zip(&keep)
                .filter(|(_, keep)| **keep)
                .map(|(name, _)| name.clone()),
        );
        csv_writer.write_record(&header).map_err(io_err)?;

        for row in &table.rows {
            let mut record = vec![row.station.clone()];
            record.extend(
                row.cells
                    .iter()
                    .zip(&keep)
                    .filter(|(_, keep)| **keep)
                    .map(|(cell, _)| cell.to_field()),
            );
            csv_writer.write_record(&record).map_err(io_err)?;
        }
    }

    // Surface flush errors rather than dropping them on close.
    csv_writer.flush().map_err(|e| ExtractError::Internal(format!("csv flush: {e}")))?;
    Ok(())
}

/// Which table columns survive the configured projection.
fn keep_mask(table: &StationTable, config: &ExtractionConfig) -> Vec<bool> {
    match &config.output_columns {
        None => vec![true; table.columns.len()],
        Some(projection) => table
            .columns
            .iter()
            .map(|name| projection.iter().any(|p| p == name))
            .collect(),
    }
}
