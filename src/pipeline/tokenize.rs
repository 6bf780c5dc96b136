//! Line tokenization and token classification.
//!
//! A raw text line recovered from a PDF page becomes an ordered sequence of
//! whitespace-delimited tokens; a pre-split table row is taken cell-by-cell
//! with no re-splitting. Each data token then classifies as a parsed number,
//! a recognized missing-value sentinel, or an unparseable value that softens
//! to [`Cell::Missing`] with a debug log; a garbled glyph must never abort
//! the whole line, and a sentinel must never coerce to zero.

use crate::output::Cell;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

/// Integer-or-decimal pattern for data values as they appear in the reports.
///
/// Deliberately unsigned: the source tables print monthly normals without
/// signs, and anything else on a line (codes, dates, ditto marks) must not
/// sneak in as data.
static RE_NUMERIC: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+(\.\d+)?$").unwrap());

/// Sentinels the reports use for "not available".
const MISSING_SENTINELS: &[&str] = &["-", "*", "**", "***", ""];

/// Split a raw text line into non-empty whitespace-delimited tokens.
pub fn split_line(line: &str) -> Vec<&str> {
    line.split_whitespace().collect()
}

/// Is this token one of the recognized missing-value sentinels?
pub fn is_missing_sentinel(token: &str) -> bool {
    MISSING_SENTINELS.contains(&token.trim())
}

/// Classify one data token.
///
/// Numeric → `Cell::Number`; sentinel → `Cell::Missing`; anything else →
/// `Cell::Missing` with a logged skip. The fallback is deliberate: a footnote
/// marker or OCR artefact in a data column degrades one value, not the line.
pub fn classify(token: &str) -> Cell {
    let token = token.trim();
    if is_missing_sentinel(token) {
        return Cell::Missing;
    }
    if RE_NUMERIC.is_match(token) {
        match token.parse::<f64>() {
            Ok(v) => return Cell::Number(v),
            Err(e) => {
                debug!("numeric-looking token '{token}' failed to parse: {e}");
                return Cell::Missing;
            }
        }
    }
    debug!("unparseable data token '{token}' treated as missing");
    Cell::Missing
}

/// Classify the data slice of a tokenized line.
///
/// `tokens` is the full line; values are taken from `data_start` onward.
/// A requested width longer than the line pads with `Cell::Missing` so the
/// record always has a value per declared position.
pub fn classify_data(tokens: &[&str], data_start: usize, width: usize) -> Vec<Cell> {
    (0..width)
        .map(|i| match tokens.get(data_start + i) {
            Some(token) => classify(token),
            None => Cell::Missing,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_collapses_runs_of_whitespace() {
        assert_eq!(
            split_line("  Dhaka   2017\t26.4  27.1 "),
            vec!["Dhaka", "2017", "26.4", "27.1"]
        );
        assert_eq!(split_line(""), Vec::<&str>::new());
    }

    #[test]
    fn numeric_tokens_parse() {
        assert_eq!(classify("26"), Cell::Number(26.0));
        assert_eq!(classify("26.4"), Cell::Number(26.4));
        assert_eq!(classify("0.0"), Cell::Number(0.0));
    }

    #[test]
    fn sentinels_classify_as_missing() {
        for s in ["-", "*", "**", "***", "", "  "] {
            assert_eq!(classify(s), Cell::Missing, "sentinel {s:?}");
        }
    }

    #[test]
    fn unparseable_tokens_soften_to_missing() {
        assert_eq!(classify("Trace"), Cell::Missing);
        assert_eq!(classify("26,4"), Cell::Missing);
        assert_eq!(classify("-3.0"), Cell::Missing); // signed values are not data here
        assert_eq!(classify("26.4.1"), Cell::Missing);
    }

    #[test]
    fn classify_data_pads_short_lines() {
        let tokens = vec!["Dhaka", "33.1", "-"];
        let cells = classify_data(&tokens, 1, 4);
        assert_eq!(
            cells,
            vec![
                Cell::Number(33.1),
                Cell::Missing,
                Cell::Missing,
                Cell::Missing
            ]
        );
    }

    #[test]
    fn classify_data_respects_offset() {
        // Station + Year column, then data.
        let tokens = vec!["Sylhet", "2016", "18.2", "22.9"];
        let cells = classify_data(&tokens, 2, 2);
        assert_eq!(cells, vec![Cell::Number(18.2), Cell::Number(22.9)]);
    }
}
