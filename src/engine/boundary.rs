//! Section boundary resolution.
//!
//! A sheet's subsections are delimited by marker rows whose caption-column
//! cell starts with the section prefix. Given a starting row, the resolver
//! walks downward and reports how many body rows precede the next marker,
//! or that the grid ran out first.

use crate::engine::text::starts_with_marker;
use crate::grid::Grid;
use crate::grid::Value;

/// Fixed prefix of a section-marker cell, compared accent- and
/// case-insensitively ("SECCIÓN B: …", "Seccion C", …).
pub const SECTION_MARKER_PREFIX: &str = "SECCION";

/// Outcome of one boundary scan. Only text cells are marker candidates;
/// numbers and empty cells count as body rows.
#[derive(Clone, Debug, PartialEq)]
pub enum SectionBoundary {
    /// A marker row was found after `span` body rows.
    ///
    /// `immediate` is set when the very first row inspected was itself the
    /// marker — the heading at the cursor has no table beneath it and acts
    /// as a pure grouping label.
    Marker {
        /// Raw marker text, accents and all
        text: String,
        span: usize,
        immediate: bool,
    },
    /// The scan exhausted the grid without finding a marker; `span` body
    /// rows remain after the last marker. This is the driver's
    /// loop-termination signal.
    EndOfGrid { span: usize },
}

impl SectionBoundary {
    /// Body-row count accumulated before the boundary.
    pub fn span(&self) -> usize {
        match self {
            SectionBoundary::Marker { span, .. } => *span,
            SectionBoundary::EndOfGrid { span } => *span,
        }
    }

    /// True when the row at the scan start was itself a marker.
    pub fn is_immediate(&self) -> bool {
        matches!(self, SectionBoundary::Marker { immediate: true, .. })
    }
}

/// Walks downward from `start_row`, reading the cell in `watch_col` on each
/// row, until a section marker or the bottom of the grid is reached.
pub fn resolve_boundary(grid: &Grid, watch_col: usize, start_row: usize) -> SectionBoundary {
    let mut span = 0usize;
    for row in start_row..grid.rows() {
        if let Value::Text(text) = grid.at(row, watch_col) {
            if starts_with_marker(text, SECTION_MARKER_PREFIX) {
                return SectionBoundary::Marker {
                    text: text.to_owned(),
                    span,
                    // span == 0 holds exactly when the first inspected row
                    // is the marker itself
                    immediate: span == 0,
                };
            }
        }
        span += 1;
    }
    SectionBoundary::EndOfGrid { span }
}
