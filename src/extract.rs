//! Top-level extraction entry points.
//!
//! The functions here wire the pipeline stages together: resolve the input
//! to a local PDF, open it, scan the configured pages for station data,
//! reconcile the matches against the registry, append seasonal aggregates,
//! and hand back a [`StationTable`] (or write it straight to CSV).

use std::path::Path;
use std::time::Instant;

use tracing::{debug, info};

use crate::config::{DocumentLayout, ExtractionConfig};
use crate::error::ExtractError;
use crate::output::{DocumentMetadata, ExtractionOutput, ExtractionStats};
use crate::pipeline::aggregate::append_aggregates;
use crate::pipeline::input::resolve_input;
use crate::pipeline::reconcile::{build_filtered_table, build_table};
use crate::pipeline::scan::{check_page_bounds, scan_groups, scan_tables};
use crate::pipeline::source::{PageSource, PdfiumSource};
use crate::pipeline::write::write_csv;

/// Extract a station table from a PDF file or URL.
///
/// `input` is either a local filesystem path or an `http(s)://` URL; URLs
/// are downloaded to a temporary directory that lives for the duration of
/// the call.
///
/// # Example
///
/// ```no_run
/// use stationtab::presets;
///
/// let config = presets::monthly_temperature().build()?;
/// let output = stationtab::extract("normals_2017.pdf", &config)?;
/// assert_eq!(output.table.rows.len(), config.registry.len());
/// # Ok::<(), stationtab::ExtractError>(())
/// ```
pub fn extract(
    input: impl AsRef<str>,
    config: &ExtractionConfig,
) -> Result<ExtractionOutput, ExtractError> {
    let started = Instant::now();
    let input = input.as_ref();

    // Step 1: resolve the input to a local file.
    let resolved = resolve_input(input, config.download_timeout_secs)?;

    // Step 2: open the document.
    let source = PdfiumSource::open(resolved.path(), config.password.as_deref())?;

    // Step 3: run the pipeline against it.
    let mut output = extract_from_source(&source, config)?;
    output.stats.total_duration_ms = started.elapsed().as_millis() as u64;

    info!(
        "extracted {} rows from '{}' in {}ms",
        output.table.rows.len(),
        input,
        output.stats.total_duration_ms
    );
    Ok(output)
}

/// Extract and write the result to a CSV file in one call.
pub fn extract_to_file(
    input: impl AsRef<str>,
    output_path: impl AsRef<Path>,
    config: &ExtractionConfig,
) -> Result<ExtractionStats, ExtractError> {
    let started = Instant::now();
    let mut output = extract(&input, config)?;
    write_csv(&output.table, config, output_path.as_ref())?;
    output.stats.total_duration_ms = started.elapsed().as_millis() as u64;
    debug!("wrote '{}'", output_path.as_ref().display());
    Ok(output.stats)
}

/// Run the scan/reconcile/aggregate stages against an already-open source.
///
/// This is the seam the integration tests use: any [`PageSource`]
/// implementation works, not only a PDF on disk.
pub fn extract_from_source(
    source: &dyn PageSource,
    config: &ExtractionConfig,
) -> Result<ExtractionOutput, ExtractError> {
    let started = Instant::now();
    let mut stats = ExtractionStats::default();
    let progress = config.progress_callback.as_ref();

    // Configured page selections must fit the document before any page is
    // touched. `All` adapts to the page count and never fails here.
    let selections: Vec<_> = match &config.layout {
        DocumentLayout::StationLines { groups, .. } => {
            groups.iter().map(|g| &g.pages).collect()
        }
        DocumentLayout::FilteredTables { pages } => vec![pages],
    };
    check_page_bounds(&selections, source.page_count())?;

    let table = match &config.layout {
        DocumentLayout::StationLines { groups, columns } => {
            // Each group only needs tokens up to its widest referenced index.
            let widths: Vec<usize> = (0..groups.len())
                .map(|g| {
                    columns
                        .iter()
                        .filter(|c| c.group == g)
                        .map(|c| c.index + 1)
                        .max()
                        .unwrap_or(0)
                })
                .collect();

            let records = scan_groups(source, groups, &widths, &config.registry, &mut stats, progress)?;
            fail_if_all_pages_empty(&stats)?;

            let mut table = build_table(&config.registry, &records, columns, &mut stats);
            append_aggregates(&mut table, &config.aggregates);
            table
        }
        DocumentLayout::FilteredTables { pages } => {
            let matched = scan_tables(source, pages, &config.registry, &mut stats, progress)?;
            fail_if_all_pages_empty(&stats)?;

            build_filtered_table(&config.registry, matched, &mut stats)
        }
    };

    stats.scan_duration_ms = started.elapsed().as_millis() as u64;
    stats.total_duration_ms = stats.scan_duration_ms;

    if let Some(cb) = progress {
        cb.on_scan_complete(stats.pages_scanned, stats.stations_matched);
    }
    debug!(
        "scan complete: {}/{} stations matched, {} lines seen",
        stats.stations_matched,
        config.registry.len(),
        stats.lines_seen
    );

    Ok(ExtractionOutput {
        table,
        metadata: source.metadata(),
        stats,
    })
}

/// Open a document and return its metadata without scanning any pages.
pub fn inspect(
    input: impl AsRef<str>,
    password: Option<&str>,
) -> Result<DocumentMetadata, ExtractError> {
    let resolved = resolve_input(input.as_ref(), 120)?;
    let source = PdfiumSource::open(resolved.path(), password)?;
    Ok(source.metadata())
}

/// Abort only on structural failure: no page selected, or every selected
/// page blank. Pages that carry text but match no station line are a
/// data-quality situation, not an error; the reconciled table comes out
/// all-missing and the stats say why.
fn fail_if_all_pages_empty(stats: &ExtractionStats) -> Result<(), ExtractError> {
    if stats.pages_scanned == 0 || stats.pages_empty == stats.pages_scanned {
        return Err(ExtractError::NoUsableData {
            pages: stats.pages_scanned,
        });
    }
    Ok(())
}
