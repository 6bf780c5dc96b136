//! Page extraction: walk the selected pages, match station lines/rows, and
//! accumulate per-group station records.
//!
//! This is the only stage that touches the [`PageSource`]. Everything it
//! finds goes into in-memory mappings keyed by registry position; the
//! reconciler then turns those mappings into the final table. Pages are
//! processed strictly in document order, single-pass, no backtracking.

use crate::config::{PageGroup, PageSelection};
use crate::error::ExtractError;
use crate::output::{Cell, ExtractionStats};
use crate::pipeline::source::PageSource;
use crate::pipeline::tokenize;
use crate::progress::ProgressCallback;
use crate::registry::StationRegistry;
use std::collections::HashMap;
use tracing::{debug, warn};

/// Station records for one page group: registry position → data cells.
pub type GroupRecords = HashMap<usize, Vec<Cell>>;

/// A table row that matched a station: registry position + raw cells.
pub type MatchedRow = (usize, Vec<String>);

/// Fail fast when a configured page selection names a page beyond the
/// document. `All` selections adapt to any page count and never trip this.
pub fn check_page_bounds(
    selections: &[&PageSelection],
    page_count: usize,
) -> Result<(), ExtractError> {
    for selection in selections {
        if let Some(max) = selection.max_explicit_page() {
            if max > page_count {
                return Err(ExtractError::PageOutOfRange {
                    page: max,
                    total: page_count,
                });
            }
        }
    }
    Ok(())
}

/// Scan every page group of a station-lines layout.
///
/// `widths[g]` is the number of data cells to record per station in group
/// `g` (the highest column index into that group, plus one). Within a group
/// the first matched line for a station wins; later duplicates are ignored
/// (repeated header/data blocks are common in these reports).
pub fn scan_groups(
    source: &dyn PageSource,
    groups: &[PageGroup],
    widths: &[usize],
    registry: &StationRegistry,
    stats: &mut ExtractionStats,
    progress: Option<&ProgressCallback>,
) -> Result<Vec<GroupRecords>, ExtractError> {
    let page_count = source.page_count();
    let group_indices: Vec<Vec<usize>> = groups
        .iter()
        .map(|g| g.pages.to_indices(page_count))
        .collect();
    let total_pages: usize = group_indices.iter().map(Vec::len).sum();

    if let Some(cb) = progress {
        cb.on_scan_start(total_pages);
    }

    let mut results: Vec<GroupRecords> = Vec::with_capacity(groups.len());
    let mut scanned = 0usize;

    for (group_idx, (group, indices)) in groups.iter().zip(&group_indices).enumerate() {
        let width = widths[group_idx];
        let mut records = GroupRecords::new();

        for &page_idx in indices {
            scanned += 1;
            stats.pages_scanned += 1;

            let text = match source.page_text(page_idx)? {
                Some(text) => text,
                None => {
                    stats.pages_empty += 1;
                    warn!("page {} yielded no extractable text", page_idx + 1);
                    if let Some(cb) = progress {
                        cb.on_page_empty(scanned, total_pages);
                    }
                    continue;
                }
            };

            let mut page_matched = 0usize;
            for line in text.lines() {
                let tokens = tokenize::split_line(line);
                if tokens.is_empty() {
                    continue;
                }
                stats.lines_seen += 1;

                if tokens.len() < group.min_tokens {
                    stats.lines_short += 1;
                    debug!(
                        "page {}: skipping short line ({} < {} tokens): {line:?}",
                        page_idx + 1,
                        tokens.len(),
                        group.min_tokens
                    );
                    continue;
                }

                let Some(station) = registry.match_token(tokens[0]) else {
                    continue;
                };
                stats.lines_matched += 1;
                page_matched += 1;

                if records.contains_key(&station) {
                    stats.duplicates_ignored += 1;
                    debug!(
                        "page {}: duplicate line for '{}' ignored",
                        page_idx + 1,
                        registry.name(station)
                    );
                    continue;
                }

                let cells = tokenize::classify_data(&tokens, group.data_start, width);
                stats.values_missing += cells.iter().filter(|c| c.is_missing()).count();
                records.insert(station, cells);
            }

            debug!(
                "page {}: matched {page_matched} station lines",
                page_idx + 1
            );
            if let Some(cb) = progress {
                cb.on_page_scanned(scanned, total_pages, page_matched);
            }
        }

        results.push(records);
    }

    Ok(results)
}

/// Scan a filtered-tables layout: keep every table row whose first cell
/// matches a canonical station, verbatim.
///
/// Unlike station lines, duplicates are *kept*: crop reports carry one row
/// per rice type per region, and all of them belong in the extract.
pub fn scan_tables(
    source: &dyn PageSource,
    pages: &PageSelection,
    registry: &StationRegistry,
    stats: &mut ExtractionStats,
    progress: Option<&ProgressCallback>,
) -> Result<Vec<MatchedRow>, ExtractError> {
    let indices = pages.to_indices(source.page_count());
    let total_pages = indices.len();

    if let Some(cb) = progress {
        cb.on_scan_start(total_pages);
    }

    let mut matched: Vec<MatchedRow> = Vec::new();

    for (scanned, &page_idx) in indices.iter().enumerate() {
        stats.pages_scanned += 1;
        let rows = source.page_rows(page_idx)?;

        if rows.is_empty() {
            stats.pages_empty += 1;
            warn!("page {} yielded no table rows", page_idx + 1);
            if let Some(cb) = progress {
                cb.on_page_empty(scanned + 1, total_pages);
            }
            continue;
        }

        let mut page_matched = 0usize;
        for row in rows {
            let Some(first) = row.first() else { continue };
            stats.lines_seen += 1;
            let Some(station) = registry.match_token(first) else {
                continue;
            };
            stats.lines_matched += 1;
            page_matched += 1;
            matched.push((station, row));
        }

        debug!("page {}: matched {page_matched} table rows", page_idx + 1);
        if let Some(cb) = progress {
            cb.on_page_scanned(scanned + 1, total_pages, page_matched);
        }
    }

    Ok(matched)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::DocumentMetadata;
    use crate::registry::{MatchPolicy, Station};

    /// In-memory page source: one entry per page; `None` simulates a page
    /// with no text layer.
    struct TextPages(Vec<Option<String>>);

    impl PageSource for TextPages {
        fn page_count(&self) -> usize {
            self.0.len()
        }
        fn metadata(&self) -> DocumentMetadata {
            DocumentMetadata {
                page_count: self.0.len(),
                ..DocumentMetadata::default()
            }
        }
        fn page_text(&self, index: usize) -> Result<Option<String>, ExtractError> {
            Ok(self.0[index].clone())
        }
        fn page_rows(&self, _index: usize) -> Result<Vec<Vec<String>>, ExtractError> {
            Ok(Vec::new())
        }
    }

    fn registry() -> StationRegistry {
        StationRegistry::new(
            vec![Station::new("Dhaka"), Station::new("Khulna")],
            MatchPolicy::CaseInsensitive,
        )
    }

    fn group(min_tokens: usize, data_start: usize) -> PageGroup {
        PageGroup {
            pages: PageSelection::All,
            data_start,
            min_tokens,
        }
    }

    #[test]
    fn matched_lines_record_classified_cells() {
        let source = TextPages(vec![Some("Dhaka 33.1 - 29.0".into())]);
        let mut stats = ExtractionStats::default();
        let records = scan_groups(&source, &[group(4, 1)], &[3], &registry(), &mut stats, None)
            .unwrap();

        assert_eq!(
            records[0][&0],
            vec![Cell::Number(33.1), Cell::Missing, Cell::Number(29.0)]
        );
        assert_eq!(stats.lines_matched, 1);
        assert_eq!(stats.values_missing, 1);
    }

    #[test]
    fn short_lines_are_discarded_whole() {
        let source = TextPages(vec![Some("Dhaka 33.1\nKhulna 1 2 3".into())]);
        let mut stats = ExtractionStats::default();
        let records = scan_groups(&source, &[group(4, 1)], &[3], &registry(), &mut stats, None)
            .unwrap();

        assert!(!records[0].contains_key(&0), "short Dhaka line must be dropped");
        assert!(records[0].contains_key(&1));
        assert_eq!(stats.lines_short, 1);
    }

    #[test]
    fn duplicate_station_keeps_first_occurrence() {
        let source = TextPages(vec![Some("Dhaka 1 2 3\nDhaka 9 9 9".into())]);
        let mut stats = ExtractionStats::default();
        let records = scan_groups(&source, &[group(4, 1)], &[3], &registry(), &mut stats, None)
            .unwrap();

        assert_eq!(records[0][&0][0], Cell::Number(1.0));
        assert_eq!(stats.duplicates_ignored, 1);
    }

    #[test]
    fn header_lines_are_silently_dropped() {
        let source = TextPages(vec![Some(
            "Station March April May\nMonthly Normals 2022 report page\nDhaka 1 2 3".into(),
        )]);
        let mut stats = ExtractionStats::default();
        let records = scan_groups(&source, &[group(4, 1)], &[3], &registry(), &mut stats, None)
            .unwrap();

        assert_eq!(records[0].len(), 1);
        assert_eq!(stats.lines_matched, 1);
    }

    #[test]
    fn empty_page_is_counted_not_fatal() {
        let source = TextPages(vec![None, Some("Khulna 1 2 3".into())]);
        let mut stats = ExtractionStats::default();
        let records = scan_groups(&source, &[group(4, 1)], &[3], &registry(), &mut stats, None)
            .unwrap();

        assert_eq!(stats.pages_empty, 1);
        assert_eq!(stats.pages_scanned, 2);
        assert!(records[0].contains_key(&1));
    }

    #[test]
    fn page_bounds_fail_fast() {
        let err = check_page_bounds(&[&PageSelection::Single(3)], 2).unwrap_err();
        assert!(matches!(err, ExtractError::PageOutOfRange { page: 3, total: 2 }));
        check_page_bounds(&[&PageSelection::All], 0).unwrap();
    }

    #[test]
    fn groups_accumulate_independently() {
        let source = TextPages(vec![
            Some("Dhaka 2016 1 2".into()),
            Some("Dhaka 2017 8 9".into()),
        ]);
        let groups = [
            PageGroup {
                pages: PageSelection::Single(1),
                data_start: 2,
                min_tokens: 4,
            },
            PageGroup {
                pages: PageSelection::Single(2),
                data_start: 2,
                min_tokens: 4,
            },
        ];
        let mut stats = ExtractionStats::default();
        let records =
            scan_groups(&source, &groups, &[2, 2], &registry(), &mut stats, None).unwrap();

        assert_eq!(records[0][&0], vec![Cell::Number(1.0), Cell::Number(2.0)]);
        assert_eq!(records[1][&0], vec![Cell::Number(8.0), Cell::Number(9.0)]);
    }
}
