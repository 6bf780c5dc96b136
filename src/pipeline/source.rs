//! Page access: the boundary between the pipeline and the PDF engine.
//!
//! The pipeline consumes a document purely as "text per page" or "table rows
//! per page" through the [`PageSource`] trait. [`PdfiumSource`] implements it
//! over pdfium; tests substitute an in-memory source, so none of the
//! reconciliation logic ever touches PDF internals.
//!
//! ## Why reopen the document per call?
//!
//! pdfium document handles borrow the library binding, which makes a
//! self-referential owner awkward in safe Rust. Opening the file per page
//! access keeps `PdfiumSource` a plain owned value; for the short reports
//! this pipeline targets (≤ 20 pages), the reopen cost is noise.

use crate::error::ExtractError;
use crate::output::DocumentMetadata;
use pdfium_render::prelude::*;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Fragments whose vertical midpoints differ by no more than this many PDF
/// points are treated as one table row.
const ROW_TOLERANCE_POINTS: f32 = 5.0;

/// Read-only page access for one document.
pub trait PageSource {
    /// Total pages in the document.
    fn page_count(&self) -> usize;

    /// Document metadata, available without scanning page content.
    fn metadata(&self) -> DocumentMetadata;

    /// The page's text, newline-delimited in reading order. `Ok(None)` when
    /// the page carries no text layer at all.
    fn page_text(&self, index: usize) -> Result<Option<String>, ExtractError>;

    /// The page's content as recovered table rows, each row an ordered
    /// sequence of cell strings. Empty when nothing row-like was found.
    fn page_rows(&self, index: usize) -> Result<Vec<Vec<String>>, ExtractError>;
}

/// [`PageSource`] backed by the pdfium library.
pub struct PdfiumSource {
    path: PathBuf,
    password: Option<String>,
    metadata: DocumentMetadata,
}

impl PdfiumSource {
    /// Open a PDF file, validating it can be loaded and caching its metadata.
    pub fn open(path: impl AsRef<Path>, password: Option<&str>) -> Result<Self, ExtractError> {
        let path = path.as_ref().to_path_buf();
        let pdfium = bind_pdfium()?;
        let document = load_document(&pdfium, &path, password)?;
        let metadata = read_metadata(&document);
        debug!(
            "opened '{}': {} pages, pdf {}",
            path.display(),
            metadata.page_count,
            metadata.pdf_version
        );
        Ok(Self {
            path,
            password: password.map(str::to_string),
            metadata,
        })
    }

    fn with_document<T>(
        &self,
        f: impl FnOnce(&PdfDocument) -> Result<T, ExtractError>,
    ) -> Result<T, ExtractError> {
        let pdfium = bind_pdfium()?;
        let document = load_document(&pdfium, &self.path, self.password.as_deref())?;
        f(&document)
    }
}

impl PageSource for PdfiumSource {
    fn page_count(&self) -> usize {
        self.metadata.page_count
    }

    fn metadata(&self) -> DocumentMetadata {
        self.metadata.clone()
    }

    fn page_text(&self, index: usize) -> Result<Option<String>, ExtractError> {
        self.with_document(|document| {
            let page = get_page(document, index)?;
            let text = page
                .text()
                .map_err(|e| ExtractError::TextExtractionFailed {
                    page: index + 1,
                    detail: format!("{e:?}"),
                })?
                .all();
            if text.trim().is_empty() {
                Ok(None)
            } else {
                Ok(Some(text))
            }
        })
    }

    fn page_rows(&self, index: usize) -> Result<Vec<Vec<String>>, ExtractError> {
        self.with_document(|document| {
            let page = get_page(document, index)?;
            let text = page.text().map_err(|e| ExtractError::TextExtractionFailed {
                page: index + 1,
                detail: format!("{e:?}"),
            })?;

            let mut fragments: Vec<Fragment> = text
                .segments()
                .iter()
                .filter_map(|segment| {
                    let bounds = segment.bounds();
                    let cell = segment.text().trim().to_string();
                    if cell.is_empty() {
                        None
                    } else {
                        Some(Fragment {
                            x: bounds.left().value,
                            y: (bounds.top().value + bounds.bottom().value) / 2.0,
                            text: cell,
                        })
                    }
                })
                .collect();

            Ok(group_into_rows(&mut fragments))
        })
    }
}

/// A positioned text fragment from one page.
struct Fragment {
    x: f32,
    y: f32,
    text: String,
}

/// Recover table rows from positioned fragments: cluster by vertical
/// midpoint (top of page first), then order cells left-to-right.
fn group_into_rows(fragments: &mut [Fragment]) -> Vec<Vec<String>> {
    // PDF user space grows upward, so larger y means nearer the page top.
    fragments.sort_by(|a, b| b.y.total_cmp(&a.y).then(a.x.total_cmp(&b.x)));

    let mut rows: Vec<Vec<String>> = Vec::new();
    let mut current: Vec<&Fragment> = Vec::new();
    let mut current_y = f32::NEG_INFINITY;

    for fragment in fragments.iter() {
        if current.is_empty() || (current_y - fragment.y).abs() <= ROW_TOLERANCE_POINTS {
            if current.is_empty() {
                current_y = fragment.y;
            }
            current.push(fragment);
        } else {
            rows.push(flush_row(&mut current));
            current_y = fragment.y;
            current.push(fragment);
        }
    }
    if !current.is_empty() {
        rows.push(flush_row(&mut current));
    }
    rows
}

fn flush_row(cells: &mut Vec<&Fragment>) -> Vec<String> {
    cells.sort_by(|a, b| a.x.total_cmp(&b.x));
    cells.drain(..).map(|f| f.text.clone()).collect()
}

// ── pdfium plumbing ──────────────────────────────────────────────────────

fn bind_pdfium() -> Result<Pdfium, ExtractError> {
    let bindings = match std::env::var("PDFIUM_LIB_PATH") {
        Ok(dir) => Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path(&dir)),
        Err(_) => Pdfium::bind_to_system_library(),
    }
    .map_err(|e| ExtractError::PdfiumBindingFailed(format!("{e:?}")))?;
    Ok(Pdfium::new(bindings))
}

fn load_document<'a>(
    pdfium: &'a Pdfium,
    path: &Path,
    password: Option<&'a str>,
) -> Result<PdfDocument<'a>, ExtractError> {
    pdfium.load_pdf_from_file(path, password).map_err(|e| {
        let err_str = format!("{e:?}");
        if err_str.contains("Password") || err_str.contains("password") {
            if password.is_some() {
                ExtractError::WrongPassword {
                    path: path.to_path_buf(),
                }
            } else {
                ExtractError::PasswordRequired {
                    path: path.to_path_buf(),
                }
            }
        } else {
            ExtractError::CorruptPdf {
                path: path.to_path_buf(),
                detail: err_str,
            }
        }
    })
}

fn get_page<'a>(document: &'a PdfDocument, index: usize) -> Result<PdfPage<'a>, ExtractError> {
    document
        .pages()
        .get(index as u16)
        .map_err(|e| ExtractError::TextExtractionFailed {
            page: index + 1,
            detail: format!("{e:?}"),
        })
}

fn read_metadata(document: &PdfDocument) -> DocumentMetadata {
    let metadata = document.metadata();
    let get_meta = |tag: PdfDocumentMetadataTagType| -> Option<String> {
        metadata.get(tag).and_then(|t| {
            let v = t.value().to_string();
            if v.is_empty() {
                None
            } else {
                Some(v)
            }
        })
    };

    DocumentMetadata {
        title: get_meta(PdfDocumentMetadataTagType::Title),
        author: get_meta(PdfDocumentMetadataTagType::Author),
        subject: get_meta(PdfDocumentMetadataTagType::Subject),
        creator: get_meta(PdfDocumentMetadataTagType::Creator),
        producer: get_meta(PdfDocumentMetadataTagType::Producer),
        page_count: document.pages().len() as usize,
        pdf_version: format!("{:?}", document.version()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frag(x: f32, y: f32, text: &str) -> Fragment {
        Fragment {
            x,
            y,
            text: text.to_string(),
        }
    }

    #[test]
    fn fragments_cluster_into_rows_top_down() {
        let mut fragments = vec![
            frag(10.0, 700.0, "Station"),
            frag(120.0, 701.5, "Aus"),
            frag(10.0, 680.0, "Dhaka"),
            frag(120.0, 679.0, "2.61"),
        ];
        let rows = group_into_rows(&mut fragments);
        assert_eq!(
            rows,
            vec![
                vec!["Station".to_string(), "Aus".to_string()],
                vec!["Dhaka".to_string(), "2.61".to_string()],
            ]
        );
    }

    #[test]
    fn cells_order_left_to_right_within_a_row() {
        let mut fragments = vec![
            frag(200.0, 500.0, "3.14"),
            frag(10.0, 500.2, "Khulna"),
            frag(100.0, 499.8, "Boro"),
        ];
        let rows = group_into_rows(&mut fragments);
        assert_eq!(rows, vec![vec!["Khulna".to_string(), "Boro".to_string(), "3.14".to_string()]]);
    }

    #[test]
    fn vertical_gap_beyond_tolerance_starts_a_new_row() {
        let mut fragments = vec![frag(10.0, 500.0, "a"), frag(10.0, 494.0, "b")];
        let rows = group_into_rows(&mut fragments);
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn empty_input_yields_no_rows() {
        let mut fragments: Vec<Fragment> = Vec::new();
        assert!(group_into_rows(&mut fragments).is_empty());
    }
}
