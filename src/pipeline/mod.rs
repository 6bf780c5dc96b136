//! Pipeline stages for station-table extraction.
//!
//! Each submodule implements exactly one transformation step.
//! Keeping stages separate makes each independently testable and lets us
//! swap implementations (e.g. a different PDF backend behind
//! [`source::PageSource`]) without touching other stages.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ source ──▶ tokenize ──▶ scan ──▶ reconcile ──▶ aggregate ──▶ write
//! (URL/path) (pdfium)  (classify)  (match)   (align)       (means)       (CSV)
//! ```
//!
//! 1. [`input`]     — canonicalise the user-supplied path or URL to a local file
//! 2. [`source`]    — page text / table rows via pdfium, behind a trait
//! 3. [`tokenize`]  — whitespace split + numeric/sentinel classification
//! 4. [`scan`]      — station matching, dedup, column offsets, per-page diagnostics
//! 5. [`reconcile`] — one row per canonical station, registry order, cross-page map
//! 6. [`aggregate`] — mean-ignoring-missing derived columns
//! 7. [`write`]     — CSV artifact, atomic overwrite

pub mod aggregate;
pub mod input;
pub mod reconcile;
pub mod scan;
pub mod source;
pub mod tokenize;
pub mod write;
