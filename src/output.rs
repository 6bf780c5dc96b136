//! Output types: the reconciled station table, per-run statistics, and
//! document metadata.
//!
//! The table is built once after all relevant pages are consumed and never
//! mutated after writing. Every type serialises cleanly so the CLI's
//! `--json` mode can emit the whole [`ExtractionOutput`].

use serde::{Deserialize, Serialize};

/// A single table value with an explicit missing marker.
///
/// This is the one missing-value convention used from tokenization through
/// aggregation and output. `Missing` propagates through aggregation by
/// exclusion; it is never coerced to zero. `Text` appears only in raw
/// filtered extracts (crop-yield tables), where cells are passed through
/// verbatim.
///
/// Serialises untagged: a bare number, a bare string, or `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Cell {
    Number(f64),
    Text(String),
    Missing,
}

impl Cell {
    /// The numeric value, if present.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Cell::Number(v) => Some(*v),
            _ => None,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Cell::Missing)
    }

    /// Render for CSV output: numbers verbatim, missing as an empty field.
    pub fn to_field(&self) -> String {
        match self {
            Cell::Number(v) => format_number(*v),
            Cell::Text(s) => s.clone(),
            Cell::Missing => String::new(),
        }
    }
}

/// Format a value the way the source data reads: integral values without a
/// fractional tail, everything else with its natural shortest form.
fn format_number(v: f64) -> String {
    if v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{}", v as i64)
    } else {
        format!("{v}")
    }
}

/// One final record for one station, covering all requested columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StationRow {
    /// Canonical station name (registry spelling, not the source spelling).
    pub station: String,
    /// Values in column order. Ragged only in filtered extracts.
    pub cells: Vec<Cell>,
}

/// The station-indexed output table.
///
/// For reconciled layouts the invariant holds: exactly one row per registry
/// station, in registry order, with all-`Missing` rows for stations absent
/// from the source. Filtered extracts (`filtered == true`) instead carry
/// every matching source row, ordered by registry position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StationTable {
    /// Data column names followed by aggregate column names, in declaration
    /// order. Empty for filtered extracts, whose rows are ragged.
    pub columns: Vec<String>,
    pub rows: Vec<StationRow>,
    /// Raw filtered extract: rows pass through verbatim, output has no
    /// header and no Station column of its own.
    pub filtered: bool,
}

impl StationTable {
    /// Position of a named column, data or aggregate.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }
}

/// Document metadata extracted without scanning any page content.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocumentMetadata {
    pub title: Option<String>,
    pub author: Option<String>,
    pub subject: Option<String>,
    pub creator: Option<String>,
    pub producer: Option<String>,
    pub page_count: usize,
    pub pdf_version: String,
}

/// Per-run counters for diagnosis of data quality.
///
/// Every recoverable per-line issue lands here rather than in an error:
/// the counts tell you *why* a station's row came out missing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionStats {
    /// Pages actually scanned (selected and within the document).
    pub pages_scanned: usize,
    /// Scanned pages that yielded no text/rows at all.
    pub pages_empty: usize,
    /// Raw lines (or table rows) inspected.
    pub lines_seen: usize,
    /// Lines discarded for having fewer than the configured minimum tokens.
    pub lines_short: usize,
    /// Lines/rows whose first token matched a canonical station.
    pub lines_matched: usize,
    /// Later duplicate lines for an already-recorded station.
    pub duplicates_ignored: usize,
    /// Data tokens that classified as missing (sentinel or unparseable).
    pub values_missing: usize,
    /// Registry stations found in at least one source mapping.
    pub stations_matched: usize,
    /// Registry stations absent from every source mapping.
    pub stations_missing: usize,
    /// Wall-clock time spent scanning pages.
    pub scan_duration_ms: u64,
    /// Wall-clock time for the whole run.
    pub total_duration_ms: u64,
}

/// Everything one pipeline run produces.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionOutput {
    pub table: StationTable,
    pub metadata: DocumentMetadata,
    pub stats: ExtractionStats,
}
