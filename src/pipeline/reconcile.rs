//! Reconciliation: merge per-group station records into the final
//! table skeleton, one row per canonical station.
//!
//! The registry drives the iteration, not the source data: a station absent
//! from every scanned page still gets its row, all-missing, in its canonical
//! position. The declared [`ColumnSpec`]s pull each output column from one
//! group's record slice, which is how a crop season split across two
//! calendar pages becomes a single contiguous row.

use crate::config::ColumnSpec;
use crate::output::{Cell, ExtractionStats, StationRow, StationTable};
use crate::pipeline::scan::{GroupRecords, MatchedRow};
use crate::registry::StationRegistry;

/// Build the reconciled table: `registry.len()` rows, registry order, one
/// cell per declared column, `Missing` wherever a group lacks the station
/// or the indexed value is absent.
pub fn build_table(
    registry: &StationRegistry,
    groups: &[GroupRecords],
    columns: &[ColumnSpec],
    stats: &mut ExtractionStats,
) -> StationTable {
    let mut rows = Vec::with_capacity(registry.len());

    for (station_idx, station) in registry.stations().iter().enumerate() {
        let cells: Vec<Cell> = columns
            .iter()
            .map(|spec| {
                groups[spec.group]
                    .get(&station_idx)
                    .and_then(|record| record.get(spec.index))
                    .cloned()
                    .unwrap_or(Cell::Missing)
            })
            .collect();

        if groups.iter().any(|g| g.contains_key(&station_idx)) {
            stats.stations_matched += 1;
        } else {
            stats.stations_missing += 1;
        }

        rows.push(StationRow {
            station: station.name.clone(),
            cells,
        });
    }

    StationTable {
        columns: columns.iter().map(|c| c.name.clone()).collect(),
        rows,
        filtered: false,
    }
}

/// Build the raw filtered extract: matched rows verbatim, ordered by
/// registry position (stable within a station, preserving document order).
pub fn build_filtered_table(
    registry: &StationRegistry,
    mut matched: Vec<MatchedRow>,
    stats: &mut ExtractionStats,
) -> StationTable {
    matched.sort_by_key(|(station_idx, _)| *station_idx);

    let mut present = vec![false; registry.len()];
    let rows: Vec<StationRow> = matched
        .into_iter()
        .map(|(station_idx, cells)| {
            present[station_idx] = true;
            StationRow {
                station: registry.name(station_idx).to_string(),
                cells: cells.into_iter().map(Cell::Text).collect(),
            }
        })
        .collect();

    stats.stations_matched += present.iter().filter(|p| **p).count();
    stats.stations_missing += present.iter().filter(|p| !**p).count();

    StationTable {
        columns: Vec::new(),
        rows,
        filtered: true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ColumnSpec;
    use crate::registry::{MatchPolicy, Station};

    fn registry() -> StationRegistry {
        StationRegistry::new(
            vec![
                Station::new("Barishal"),
                Station::new("Dhaka"),
                Station::new("Sylhet"),
            ],
            MatchPolicy::Exact,
        )
    }

    #[test]
    fn every_station_gets_exactly_one_row_in_registry_order() {
        // Only Dhaka appears in the source.
        let mut group = GroupRecords::new();
        group.insert(1, vec![Cell::Number(10.0)]);

        let mut stats = ExtractionStats::default();
        let table = build_table(
            &registry(),
            &[group],
            &[ColumnSpec::new("March", 0, 0)],
            &mut stats,
        );

        let names: Vec<&str> = table.rows.iter().map(|r| r.station.as_str()).collect();
        assert_eq!(names, vec!["Barishal", "Dhaka", "Sylhet"]);
        assert_eq!(table.rows[0].cells, vec![Cell::Missing]);
        assert_eq!(table.rows[1].cells, vec![Cell::Number(10.0)]);
        assert_eq!(stats.stations_matched, 1);
        assert_eq!(stats.stations_missing, 2);
    }

    #[test]
    fn cross_page_columns_interleave_two_groups() {
        // Group 0 carries the tail of year A, group 1 the head of year B.
        let mut first = GroupRecords::new();
        first.insert(1, vec![Cell::Number(1.0), Cell::Number(2.0)]);
        let mut second = GroupRecords::new();
        second.insert(1, vec![Cell::Number(3.0)]);
        // Sylhet appears only on the second page.
        second.insert(2, vec![Cell::Number(7.0)]);

        let columns = vec![
            ColumnSpec::new("A_November", 0, 0),
            ColumnSpec::new("A_December", 0, 1),
            ColumnSpec::new("B_January", 1, 0),
        ];
        let mut stats = ExtractionStats::default();
        let table = build_table(&registry(), &[first, second], &columns, &mut stats);

        assert_eq!(
            table.rows[1].cells,
            vec![Cell::Number(1.0), Cell::Number(2.0), Cell::Number(3.0)]
        );
        // Page-2-only station: missing markers for the page-1-derived columns.
        assert_eq!(
            table.rows[2].cells,
            vec![Cell::Missing, Cell::Missing, Cell::Number(7.0)]
        );
    }

    #[test]
    fn record_shorter_than_column_index_yields_missing() {
        let mut group = GroupRecords::new();
        group.insert(0, vec![Cell::Number(5.0)]);
        let columns = vec![ColumnSpec::new("a", 0, 0), ColumnSpec::new("b", 0, 5)];
        let mut stats = ExtractionStats::default();
        let table = build_table(&registry(), &[group], &columns, &mut stats);
        assert_eq!(table.rows[0].cells, vec![Cell::Number(5.0), Cell::Missing]);
    }

    #[test]
    fn no_source_data_yields_all_missing_skeleton() {
        let mut stats = ExtractionStats::default();
        let table = build_table(
            &registry(),
            &[GroupRecords::new()],
            &[ColumnSpec::new("March", 0, 0)],
            &mut stats,
        );
        assert_eq!(table.rows.len(), 3);
        assert!(table.rows.iter().all(|r| r.cells.iter().all(Cell::is_missing)));
        assert_eq!(stats.stations_missing, 3);
    }

    #[test]
    fn filtered_rows_sort_by_registry_stable_within_station() {
        let matched = vec![
            (2, vec!["Sylhet".to_string(), "Aman".to_string()]),
            (0, vec!["Barishal".to_string(), "Aus".to_string()]),
            (2, vec!["Sylhet".to_string(), "Boro".to_string()]),
        ];
        let mut stats = ExtractionStats::default();
        let table = build_filtered_table(&registry(), matched, &mut stats);

        assert!(table.filtered);
        assert_eq!(table.rows.len(), 3);
        assert_eq!(table.rows[0].station, "Barishal");
        assert_eq!(table.rows[1].cells[1], Cell::Text("Aman".into()));
        assert_eq!(table.rows[2].cells[1], Cell::Text("Boro".into()));
        assert_eq!(stats.stations_matched, 2);
        assert_eq!(stats.stations_missing, 1);
    }
}
