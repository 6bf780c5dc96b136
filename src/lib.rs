//! # stationtab
//!
//! Extract station-indexed data tables from PDF reports and reconcile them
//! against a canonical station list.
//!
//! Meteorological and agricultural agencies publish their observation
//! tables as PDF, one line (or table row) per station, with the station
//! name spelled slightly differently from year to year. This crate turns
//! those documents into deterministic CSV datasets: every configured
//! station gets exactly one output row, in registry order, with missing
//! observations represented explicitly rather than dropped.
//!
//! ## Pipeline
//!
//! ```text
//!   input (path or URL)
//!        │  resolve / download
//!        ▼
//!   PDF document ──► page text / table rows
//!        │                  │  tokenize + station match
//!        ▼                  ▼
//!   page groups ──────► matched records
//!                           │  reconcile against registry
//!                           ▼
//!                      station table ──► aggregates ──► CSV
//! ```
//!
//! ## Quick start
//!
//! ```no_run
//! use stationtab::presets;
//!
//! let config = presets::monthly_rainfall().build()?;
//! let stats = stationtab::extract_to_file(
//!     "rainfall_normals.pdf",
//!     "rainfall.csv",
//!     &config,
//! )?;
//! println!("{} of {} stations found", stats.stations_matched, 28);
//! # Ok::<(), stationtab::ExtractError>(())
//! ```
//!
//! Custom document layouts are described with [`ExtractionConfig::builder`]:
//! pick a [`StationRegistry`], describe where the data columns sit with a
//! [`DocumentLayout`], and optionally add [`AggregateSpec`] means over
//! column subsets.

pub mod config;
pub mod error;
pub mod extract;
pub mod output;
pub mod pipeline;
pub mod presets;
pub mod progress;
pub mod registry;

pub use config::{
    AggregateSpec, ColumnSpec, DocumentLayout, ExtractionConfig, ExtractionConfigBuilder,
    PageGroup, PageSelection,
};
pub use error::ExtractError;
pub use extract::{extract, extract_from_source, extract_to_file, inspect};
pub use output::{
    Cell, DocumentMetadata, ExtractionOutput, ExtractionStats, StationRow, StationTable,
};
pub use pipeline::source::{PageSource, PdfiumSource};
pub use progress::{NoopProgressCallback, ProgressCallback, ScanProgressCallback};
pub use registry::{MatchPolicy, Station, StationRegistry};
