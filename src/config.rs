//! Configuration types for a station-table extraction run.
//!
//! All per-document-type variation is controlled through
//! [`ExtractionConfig`], built via its [`ExtractionConfigBuilder`]. The six
//! report kinds the original datasets came from differ only in page ranges,
//! column offsets, cross-page column maps, matching policy, and aggregate
//! declarations, so those differences are config *values* consumed by one
//! shared pipeline, never separate code paths.
//!
//! # Design choice: builder over constructor
//! A config with this many knobs is unreadable as a positional constructor
//! and breaks on every new field. The builder lets callers (and the presets
//! in [`crate::presets`]) set only what a document type needs, and `build()`
//! is the single place where configuration errors fail fast, before any
//! extraction work begins.

use crate::error::ExtractError;
use crate::progress::ProgressCallback;
use crate::registry::StationRegistry;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Specifies which pages of the document to scan.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PageSelection {
    /// Scan all pages (default).
    #[default]
    All,
    /// Scan a single page (1-indexed).
    Single(usize),
    /// Scan a contiguous range of pages (1-indexed, inclusive).
    Range(usize, usize),
    /// Scan at most the first `n` pages, clamped to the document length.
    ///
    /// Unlike [`Range`](Self::Range), this never trips the fail-fast bounds
    /// check: it is meant for presets whose documents vary in length (the
    /// crop reports run anywhere up to 18 pages).
    UpTo(usize),
    /// Scan specific pages (1-indexed, deduplicated).
    Set(Vec<usize>),
}

impl PageSelection {
    /// Expand the selection into a sorted, deduplicated list of 0-indexed
    /// page numbers, clamped to the document's page count.
    pub fn to_indices(&self, total_pages: usize) -> Vec<usize> {
        let mut indices: Vec<usize> = match self {
            PageSelection::All => (0..total_pages).collect(),
            PageSelection::Single(p) => {
                if *p >= 1 && *p <= total_pages {
                    vec![p - 1]
                } else {
                    vec![]
                }
            }
            PageSelection::Range(start, end) => {
                let s = (*start).max(1) - 1;
                let e = (*end).min(total_pages);
                (s..e).collect()
            }
            PageSelection::UpTo(n) => (0..total_pages.min(*n)).collect(),
            PageSelection::Set(pages) => pages
                .iter()
                .filter(|&&p| p >= 1 && p <= total_pages)
                .map(|p| p - 1)
                .collect(),
        };
        indices.sort_unstable();
        indices.dedup();
        indices
    }

    /// The highest 1-indexed page this selection explicitly names, if any.
    ///
    /// Used to fail fast on out-of-range configuration: `All` adapts to any
    /// document, but `Single(19)` against an 18-page report is a caller
    /// mistake, not a data-quality issue.
    pub fn max_explicit_page(&self) -> Option<usize> {
        match self {
            PageSelection::All | PageSelection::UpTo(_) => None,
            PageSelection::Single(p) => Some(*p),
            PageSelection::Range(_, end) => Some(*end),
            PageSelection::Set(pages) => pages.iter().max().copied(),
        }
    }
}

/// One station→tokens mapping source: a set of pages scanned as
/// whitespace-delimited station lines.
///
/// A report whose monthly columns all sit on one page needs a single group;
/// a report that splits one crop-season across two calendar pages needs one
/// group per page, with [`ColumnSpec`]s interleaving their columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageGroup {
    /// Pages contributing lines to this mapping.
    pub pages: PageSelection,
    /// Index of the first data token on a matched line. Skips the station
    /// name itself plus any leading Year or serial columns, which vary per
    /// report layout.
    pub data_start: usize,
    /// Minimum token count for a line to be considered at all. Shorter lines
    /// (page headers, continuation fragments) are discarded whole rather
    /// than producing misaligned partial records.
    pub min_tokens: usize,
}

/// One output data column, pulled from one page group's token slice.
///
/// `group` and `index` together form the caller-configured cross-page column
/// map: e.g. November and December from group 0 (first calendar page)
/// followed by January–June from group 1 (second calendar page).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSpec {
    /// Column name in the output schema (e.g. `March` or `2016_November`).
    pub name: String,
    /// Which page group supplies the value.
    pub group: usize,
    /// 0-based index into the group's data-token slice (after `data_start`).
    pub index: usize,
}

impl ColumnSpec {
    pub fn new(name: impl Into<String>, group: usize, index: usize) -> Self {
        Self {
            name: name.into(),
            group,
            index,
        }
    }
}

/// A derived column: mean over a declared subset of data columns, ignoring
/// missing values, rounded to 2 decimal places. Missing iff every input is
/// missing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregateSpec {
    pub name: String,
    /// Names of the data columns averaged. Validated against the layout's
    /// declared columns at `build()` time.
    pub over: Vec<String>,
}

impl AggregateSpec {
    pub fn new<I, S>(name: impl Into<String>, over: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            over: over.into_iter().map(Into::into).collect(),
        }
    }
}

/// How station data is laid out in the document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DocumentLayout {
    /// Whitespace-delimited lines, one station per line, parsed from page
    /// text. The common case for meteorological monthly reports.
    StationLines {
        groups: Vec<PageGroup>,
        columns: Vec<ColumnSpec>,
    },
    /// Structured table rows filtered by station match and passed through
    /// verbatim (crop-yield reports). Ragged rows, no output header.
    FilteredTables { pages: PageSelection },
}

/// Configuration for one extraction run.
///
/// Built via [`ExtractionConfig::builder`] or taken from
/// [`crate::presets`].
///
/// # Example
/// ```rust
/// use stationtab::presets;
///
/// let config = presets::monthly_temperature().build().unwrap();
/// assert!(!config.registry.is_empty());
/// ```
#[derive(Clone)]
pub struct ExtractionConfig {
    /// Canonical stations and matching policy. Shared read-only by every
    /// pipeline stage; never mutated after `build()`.
    pub registry: StationRegistry,

    /// Page/column layout of the document type.
    pub layout: DocumentLayout,

    /// Aggregate columns appended after reconciliation, in declaration order.
    pub aggregates: Vec<AggregateSpec>,

    /// Column projection applied at write time. `None` keeps every declared
    /// data and aggregate column; the monthly presets keep only Station plus
    /// the seasonal aggregates, matching the downstream dataset schema.
    pub output_columns: Option<Vec<String>>,

    /// PDF user password for encrypted documents.
    pub password: Option<String>,

    /// Download timeout for URL inputs in seconds. Default: 120.
    pub download_timeout_secs: u64,

    /// Per-page scan progress events. `None` disables reporting.
    pub progress_callback: Option<ProgressCallback>,
}

impl fmt::Debug for ExtractionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtractionConfig")
            .field("registry_len", &self.registry.len())
            .field("policy", &self.registry.policy())
            .field("layout", &self.layout)
            .field("aggregates", &self.aggregates)
            .field("output_columns", &self.output_columns)
            .field("password", &self.password.as_ref().map(|_| "<set>"))
            .field("download_timeout_secs", &self.download_timeout_secs)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<dyn callback>"),
            )
            .finish()
    }
}

impl ExtractionConfig {
    /// Create a new builder. Registry and layout have no usable defaults, so
    /// they are required up front; everything else is optional.
    pub fn builder(registry: StationRegistry, layout: DocumentLayout) -> ExtractionConfigBuilder {
        ExtractionConfigBuilder {
            config: ExtractionConfig {
                registry,
                layout,
                aggregates: Vec::new(),
                output_columns: None,
                password: None,
                download_timeout_secs: 120,
                progress_callback: None,
            },
            pages_override: None,
        }
    }

    /// Declared data column names, in declaration order. Empty for filtered
    /// layouts.
    pub fn data_columns(&self) -> Vec<&str> {
        match &self.layout {
            DocumentLayout::StationLines { columns, .. } => {
                columns.iter().map(|c| c.name.as_str()).collect()
            }
            DocumentLayout::FilteredTables { .. } => Vec::new(),
        }
    }
}

/// Builder for [`ExtractionConfig`].
pub struct ExtractionConfigBuilder {
    config: ExtractionConfig,
    pages_override: Option<PageSelection>,
}

impl ExtractionConfigBuilder {
    pub fn aggregate(mut self, spec: AggregateSpec) -> Self {
        self.config.aggregates.push(spec);
        self
    }

    pub fn aggregates<I>(mut self, specs: I) -> Self
    where
        I: IntoIterator<Item = AggregateSpec>,
    {
        self.config.aggregates.extend(specs);
        self
    }

    /// Keep only these columns (data or aggregate) in the written artifact.
    pub fn output_columns<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.output_columns = Some(names.into_iter().map(Into::into).collect());
        self
    }

    pub fn password(mut self, pwd: impl Into<String>) -> Self {
        self.config.password = Some(pwd.into());
        self
    }

    pub fn download_timeout_secs(mut self, secs: u64) -> Self {
        self.config.download_timeout_secs = secs;
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Override the page selection of a single-group layout (CLI `--pages`).
    ///
    /// Rejected at `build()` time for split layouts, where each group is
    /// bound to a specific physical page and a blanket override would
    /// scramble the cross-page column map.
    pub fn pages(mut self, selection: PageSelection) -> Self {
        self.pages_override = Some(selection);
        self
    }

    /// Build the configuration, validating every cross-reference.
    ///
    /// Configuration errors surface here, before any page is opened:
    /// distinct from data-quality diagnostics, which never abort a run.
    pub fn build(mut self) -> Result<ExtractionConfig, ExtractError> {
        if let Some(selection) = self.pages_override.take() {
            self.apply_pages_override(selection)?;
        }

        let c = &self.config;
        if c.registry.is_empty() {
            return Err(ExtractError::InvalidConfig(
                "station registry is empty".into(),
            ));
        }

        match &c.layout {
            DocumentLayout::StationLines { groups, columns } => {
                if groups.is_empty() {
                    return Err(ExtractError::InvalidConfig(
                        "layout declares no page groups".into(),
                    ));
                }
                if columns.is_empty() {
                    return Err(ExtractError::InvalidConfig(
                        "layout declares no data columns".into(),
                    ));
                }
                for group in groups {
                    if group.min_tokens == 0 {
                        return Err(ExtractError::InvalidConfig(
                            "page group min_tokens must be >= 1".into(),
                        ));
                    }
                }
                let mut seen = HashSet::new();
                for col in columns {
                    if !seen.insert(col.name.as_str()) {
                        return Err(ExtractError::InvalidConfig(format!(
                            "duplicate column name '{}'",
                            col.name
                        )));
                    }
                    if col.group >= groups.len() {
                        return Err(ExtractError::InvalidConfig(format!(
                            "column '{}' references page group {} but only {} exist",
                            col.name,
                            col.group,
                            groups.len()
                        )));
                    }
                }
            }
            DocumentLayout::FilteredTables { .. } => {
                if !c.aggregates.is_empty() {
                    return Err(ExtractError::InvalidConfig(
                        "aggregates require declared data columns; filtered-table layouts have none"
                            .into(),
                    ));
                }
                if c.output_columns.is_some() {
                    return Err(ExtractError::InvalidConfig(
                        "column projection does not apply to filtered-table layouts".into(),
                    ));
                }
            }
        }

        let data_columns: HashSet<&str> = c.data_columns().into_iter().collect();
        let mut agg_names = HashSet::new();
        for agg in &c.aggregates {
            if data_columns.contains(agg.name.as_str()) || !agg_names.insert(agg.name.as_str()) {
                return Err(ExtractError::InvalidConfig(format!(
                    "aggregate column name '{}' collides with an existing column",
                    agg.name
                )));
            }
            if agg.over.is_empty() {
                return Err(ExtractError::InvalidConfig(format!(
                    "aggregate '{}' averages over no columns",
                    agg.name
                )));
            }
            for input in &agg.over {
                if !data_columns.contains(input.as_str()) {
                    return Err(ExtractError::InvalidConfig(format!(
                        "aggregate '{}' references unknown column '{}'",
                        agg.name, input
                    )));
                }
            }
        }

        if let Some(ref projection) = c.output_columns {
            for name in projection {
                let known = data_columns.contains(name.as_str())
                    || c.aggregates.iter().any(|a| &a.name == name);
                if !known {
                    return Err(ExtractError::InvalidConfig(format!(
                        "output column '{name}' is neither a data nor an aggregate column"
                    )));
                }
            }
        }

        Ok(self.config)
    }

    fn apply_pages_override(&mut self, selection: PageSelection) -> Result<(), ExtractError> {
        match &mut self.config.layout {
            DocumentLayout::StationLines { groups, .. } if groups.len() == 1 => {
                groups[0].pages = selection;
                Ok(())
            }
            DocumentLayout::StationLines { .. } => Err(ExtractError::InvalidConfig(
                "page override is not supported for split (multi-group) layouts".into(),
            )),
            DocumentLayout::FilteredTables { pages } => {
                *pages = selection;
                Ok(())
            }
        }
    }
}
