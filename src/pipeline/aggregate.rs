//! Range aggregation: append derived mean columns to the reconciled table.
//!
//! Runs strictly after reconciliation so every aggregate sees the full
//! canonical row set. Missing values are excluded from the mean, never
//! coerced to zero; an aggregate is itself missing only when *every* input
//! column is missing for that row.

use crate::config::AggregateSpec;
use crate::output::{Cell, StationTable};

/// Compute and append the declared aggregate columns, in declaration order.
///
/// Column references were validated at config build time; an unknown name
/// here is simply skipped.
pub fn append_aggregates(table: &mut StationTable, aggregates: &[AggregateSpec]) {
    let resolved: Vec<(String, Vec<usize>)> = aggregates
        .iter()
        .map(|spec| {
            let indices = spec
                .over
                .iter()
                .filter_map(|name| table.column_index(name))
                .collect();
            (spec.name.clone(), indices)
        })
        .collect();

    for row in &mut table.rows {
        for (_, indices) in &resolved {
            let cell = mean_ignoring_missing(indices.iter().filter_map(|&i| {
                row.cells.get(i).and_then(Cell::as_number)
            }));
            row.cells.push(cell);
        }
    }

    table.columns.extend(resolved.into_iter().map(|(name, _)| name));
}

/// Mean of the present values, rounded to 2 decimal places; `Missing` when
/// no value is present.
fn mean_ignoring_missing(values: impl Iterator<Item = f64>) -> Cell {
    let (sum, count) = values.fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    if count == 0 {
        Cell::Missing
    } else {
        Cell::Number(round2(sum / count as f64))
    }
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::StationRow;

    fn table(cells: Vec<Cell>) -> StationTable {
        StationTable {
            columns: vec!["March".into(), "April".into(), "May".into()],
            rows: vec![StationRow {
                station: "Dhaka".into(),
                cells,
            }],
            filtered: false,
        }
    }

    fn spec() -> AggregateSpec {
        AggregateSpec::new("March-May", ["March", "April", "May"])
    }

    #[test]
    fn mean_skips_missing_values() {
        let mut t = table(vec![Cell::Number(10.0), Cell::Missing, Cell::Number(30.0)]);
        append_aggregates(&mut t, &[spec()]);
        assert_eq!(t.columns.last().map(String::as_str), Some("March-May"));
        assert_eq!(t.rows[0].cells.last(), Some(&Cell::Number(20.0)));
    }

    #[test]
    fn all_missing_inputs_yield_missing_aggregate() {
        let mut t = table(vec![Cell::Missing, Cell::Missing, Cell::Missing]);
        append_aggregates(&mut t, &[spec()]);
        assert_eq!(t.rows[0].cells.last(), Some(&Cell::Missing));
    }

    #[test]
    fn mean_rounds_to_two_decimals() {
        let mut t = table(vec![
            Cell::Number(1.0),
            Cell::Number(2.0),
            Cell::Number(2.005),
        ]);
        append_aggregates(&mut t, &[spec()]);
        // (1 + 2 + 2.005) / 3 = 1.668333… → 1.67
        assert_eq!(t.rows[0].cells.last(), Some(&Cell::Number(1.67)));
    }

    #[test]
    fn aggregates_append_in_declaration_order() {
        let mut t = table(vec![Cell::Number(4.0), Cell::Number(6.0), Cell::Missing]);
        let specs = [
            AggregateSpec::new("Early", ["March", "April"]),
            AggregateSpec::new("Late", ["May"]),
        ];
        append_aggregates(&mut t, &specs);
        assert_eq!(
            t.columns,
            vec!["March", "April", "May", "Early", "Late"]
        );
        let cells = &t.rows[0].cells;
        assert_eq!(cells[3], Cell::Number(5.0));
        assert_eq!(cells[4], Cell::Missing);
    }

    #[test]
    fn single_present_value_is_its_own_mean() {
        let mut t = table(vec![Cell::Missing, Cell::Number(7.3), Cell::Missing]);
        append_aggregates(&mut t, &[spec()]);
        assert_eq!(t.rows[0].cells.last(), Some(&Cell::Number(7.3)));
    }
}
