//! Marker scanning over a grid.
//!
//! Locates cells by predicate: first match in row-major document order, or
//! last match in rightmost-then-lowest order. Both orderings are load-bearing
//! for the callers — the driver picks the header row closest to the table
//! top, and span detection needs the trailing edge of an ambiguous block.

use crate::engine::text::starts_with_marker;
use crate::grid::Grid;
use crate::grid::Region;
use crate::grid::Value;

/// Fixed prefix that marks a cell as a data-column header.
pub const COLUMN_HEADER_PREFIX: &str = "COL";

/// First header cell of a well-formed table, searched for exactly.
pub const COLUMN_HEADER_SENTINEL: &str = "COL1";

/// Finds the first cell satisfying `predicate`, scanning row-major
/// (top-to-bottom, left-to-right within a row).
///
/// When `region` is given only that rectangle is scanned, but the returned
/// coordinates stay absolute in the underlying grid, so callers can keep
/// using them for further lookups against the unclipped grid. A region that
/// does not fit the grid yields no match.
pub fn find_first<P>(grid: &Grid, predicate: P, region: Option<Region>) -> Option<(usize, usize)>
where
    P: Fn(&Value) -> bool,
{
    let (row_lower, col_lower, row_upper, col_upper) = match region {
        Some(region) => (region.start_row, region.start_col, region.end_row, region.end_col),
        None => (0, 0, grid.rows().checked_sub(1)?, grid.cols().checked_sub(1)?),
    };
    if row_upper >= grid.rows() || col_upper >= grid.cols() {
        return None;
    }
    for row in row_lower..=row_upper {
        for col in col_lower..=col_upper {
            if predicate(grid.at(row, col)) {
                return Some((row, col));
            }
        }
    }
    None
}

/// Finds the last cell satisfying `predicate` under lexicographic order on
/// (column, row): the rightmost match wins, ties broken by the lowest row.
pub fn find_last<P>(grid: &Grid, predicate: P) -> Option<(usize, usize)>
where
    P: Fn(&Value) -> bool,
{
    let mut best: Option<(usize, usize)> = None;
    for row in 0..grid.rows() {
        for col in 0..grid.cols() {
            if predicate(grid.at(row, col)) {
                best = match best {
                    Some((best_row, best_col)) if (best_col, best_row) >= (col, row) => {
                        Some((best_row, best_col))
                    }
                    _ => Some((row, col)),
                };
            }
        }
    }
    best
}

/// Tests whether a cell looks like a data-column header.
/// Numeric and empty cells are coerced to text first and never fail the
/// coercion; they simply do not match the prefix.
pub fn is_column_header(value: &Value) -> bool {
    starts_with_marker(&value.coerce_text(), COLUMN_HEADER_PREFIX)
}

/// Exact-match predicate on the coerced text form of a cell, used for
/// fixed sentinel values.
pub fn matches_exactly(value: &Value, target: &str) -> bool {
    value.coerce_text() == target
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid() -> Grid {
        Grid::from_rows(vec![
            vec![Value::Empty, Value::from("x"), Value::Empty],
            vec![Value::from("x"), Value::Empty, Value::from("x")],
            vec![Value::Empty, Value::from("x"), Value::Empty],
        ])
    }

    #[test]
    fn first_match_is_row_major() {
        let hit = find_first(&grid(), |v| v.coerce_text() == "x", None);
        assert_eq!(hit, Some((0, 1)));
    }

    #[test]
    fn region_restricted_scan_keeps_absolute_coordinates() {
        let region = Region::new(1, 0, 2, 2).unwrap();
        let hit = find_first(&grid(), |v| v.coerce_text() == "x", Some(region));
        assert_eq!(hit, Some((1, 0)));
    }

    #[test]
    fn oversized_region_finds_nothing() {
        let region = Region::new(0, 0, 5, 5).unwrap();
        assert_eq!(find_first(&grid(), |v| !v.is_empty(), Some(region)), None);
    }

    #[test]
    fn last_match_is_rightmost_then_lowest() {
        // Matches at (0,1), (1,0), (1,2), (2,1): column 2 beats both
        // column-1 hits even though row 2 is lower in the document.
        let hit = find_last(&grid(), |v| v.coerce_text() == "x");
        assert_eq!(hit, Some((1, 2)));
    }

    #[test]
    fn header_predicate_coerces_without_failing() {
        assert!(is_column_header(&Value::from("COL3")));
        assert!(is_column_header(&Value::from("col1 ")));
        assert!(!is_column_header(&Value::from("TOTAL")));
        assert!(!is_column_header(&Value::from(12.0)));
        assert!(!is_column_header(&Value::Empty));
    }

    #[test]
    fn sentinel_match_is_exact() {
        assert!(matches_exactly(&Value::from("COL1"), "COL1"));
        assert!(!matches_exactly(&Value::from("COL10"), "COL1"));
    }
}
