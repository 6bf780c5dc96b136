//! Error types for the stationtab library.
//!
//! Only *fatal* conditions are represented here: problems that prevent the
//! pipeline from producing any output artifact at all (bad input file,
//! invalid configuration, every required page empty). Line-level data-quality
//! issues (too few tokens, an unparseable value, an unmatched station name)
//! are deliberately **not** errors: they are recovered locally, logged via
//! `tracing`, and counted in [`crate::output::ExtractionStats`]. Source
//! documents are full of page headers, totals rows, and sentinel values, so
//! treating those as failures would make every real report unprocessable.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the stationtab library.
#[derive(Debug, Error)]
pub enum ExtractError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("PDF file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// HTTP URL was syntactically valid but download failed.
    #[error("Failed to download '{url}': {reason}\nCheck your internet connection.")]
    DownloadFailed { url: String, reason: String },

    /// Download exceeded the configured timeout.
    #[error("Download timed out after {secs}s for '{url}'\nIncrease --download-timeout.")]
    DownloadTimeout { url: String, secs: u64 },

    /// The file exists and was read, but is not a PDF.
    #[error("File is not a valid PDF: '{path}'\nFirst bytes: {magic:?}")]
    NotAPdf { path: PathBuf, magic: [u8; 4] },

    // ── PDF errors ────────────────────────────────────────────────────────
    /// PDF header/trailer/xref is corrupt and cannot be parsed.
    #[error("PDF '{path}' is corrupt: {detail}\nTry repairing with: qpdf --decrypt input.pdf output.pdf")]
    CorruptPdf { path: PathBuf, detail: String },

    /// PDF requires a password but none was provided.
    #[error("PDF '{path}' is encrypted and requires a password.\nProvide it with --password <PASSWORD>.")]
    PasswordRequired { path: PathBuf },

    /// A password was provided but it is wrong.
    #[error("Wrong password for PDF '{path}'")]
    WrongPassword { path: PathBuf },

    /// A configured page index exceeds the actual page count.
    ///
    /// Raised *before* any page is scanned so a misconfigured page range
    /// fails fast rather than producing a half-empty table.
    #[error("Page {page} is out of range (document has {total} pages)")]
    PageOutOfRange { page: usize, total: usize },

    /// pdfium returned an error while extracting text from a specific page.
    #[error("Text extraction failed for page {page}: {detail}")]
    TextExtractionFailed { page: usize, detail: String },

    // ── Data errors ───────────────────────────────────────────────────────
    /// Every required page yielded no usable text or rows; no artifact is
    /// produced. Per-page emptiness alone is non-fatal; other pages may
    /// still carry data.
    #[error("No usable data on any of the {pages} scanned pages.\nCheck the document layout matches the configured document type.")]
    NoUsableData { pages: usize },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create or write the output dataset file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Pdfium binding errors ─────────────────────────────────────────────
    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\n\
Set PDFIUM_LIB_PATH=/path/to/libpdfium or install pdfium system-wide.\n"
    )]
    PdfiumBindingFailed(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_out_of_range_display() {
        let e = ExtractError::PageOutOfRange { page: 19, total: 18 };
        let msg = e.to_string();
        assert!(msg.contains("Page 19"), "got: {msg}");
        assert!(msg.contains("18 pages"), "got: {msg}");
    }

    #[test]
    fn no_usable_data_display() {
        let e = ExtractError::NoUsableData { pages: 2 };
        assert!(e.to_string().contains("2 scanned pages"));
    }

    #[test]
    fn not_a_pdf_shows_magic() {
        let e = ExtractError::NotAPdf {
            path: PathBuf::from("report.xlsx"),
            magic: *b"PK\x03\x04",
        };
        assert!(e.to_string().contains("report.xlsx"));
    }

    #[test]
    fn invalid_config_display() {
        let e = ExtractError::InvalidConfig("aggregate 'X' references unknown column 'Y'".into());
        assert!(e.to_string().contains("unknown column 'Y'"));
    }
}
