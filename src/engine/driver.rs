//! Section segmentation driver.
//!
//! Owns the traversal state for one sheet: a row cursor starting just below
//! the sheet's top-level section marker, advanced past each resolved section
//! plus its marker row. Every iteration resolves the next boundary, reads
//! the caption sitting on the marker row above the cursor, and emits either
//! a table segment (clipped to its real column span) or a folder segment.

use crate::engine::boundary::resolve_boundary;
use crate::engine::boundary::SectionBoundary;
use crate::engine::scan::find_first;
use crate::engine::scan::is_column_header;
use crate::engine::scan::matches_exactly;
use crate::engine::scan::COLUMN_HEADER_SENTINEL;
use crate::engine::span::last_header_column;
use crate::engine::text::slugify;
use crate::engine::EngineError;
use crate::engine::Segment;
use crate::grid::Grid;
use crate::grid::GridError;
use crate::grid::Region;
use crate::grid::Value;
use tracing::warn;

/// Layout conventions of one dictionary sheet.
#[derive(Copy, Clone, Debug)]
pub struct SheetLayout {
    /// Column holding captions and section markers
    pub caption_col: usize,
    /// First body row, immediately below the sheet's top-level marker
    pub start_row: usize,
}

impl Default for SheetLayout {
    /// The dictionary convention: captions in column 1, body from row 7.
    fn default() -> Self {
        SheetLayout {
            caption_col: 1,
            start_row: 7,
        }
    }
}

/// Segments one sheet's grid into an ordered sequence of table and folder
/// segments.
///
/// Segments come out in strictly increasing row order and never overlap.
/// A subsection whose header cells cannot be located is skipped with a
/// diagnostic; a caption cell that is not text aborts the sheet, since it
/// breaks the layout assumption every later section depends on.
pub fn segment_sheet(grid: &Grid, layout: &SheetLayout) -> Result<Vec<Segment>, EngineError> {
    let mut segments = Vec::new();
    let mut cursor = layout.start_row;
    loop {
        let boundary = resolve_boundary(grid, layout.caption_col, cursor);
        let span = boundary.span();
        let immediate = boundary.is_immediate();
        if span == 0 && !immediate {
            // End markers or an exhausted grid; nothing left to emit.
            break;
        }

        let Some(caption_row) = cursor.checked_sub(1) else {
            break;
        };
        let caption = match grid.value(caption_row, layout.caption_col)? {
            Value::Text(text) => text.to_owned(),
            other => {
                return Err(EngineError::CaptionTypeMismatch {
                    row: caption_row,
                    col: layout.caption_col,
                    found: other.kind_name(),
                })
            }
        };
        let slug = slugify(&caption);

        if immediate {
            segments.push(Segment::Folder { caption, slug });
        } else {
            match resolve_table_region(grid, cursor, span) {
                Ok(Some(region)) => segments.push(Segment::Table { caption, slug, region }),
                Ok(None) => {
                    warn!(caption = %caption, row = cursor, "no column header found, skipping section");
                }
                Err(error) => {
                    warn!(caption = %caption, row = cursor, %error, "section out of range, skipping");
                }
            }
        }
        cursor += span + 1;

        if let SectionBoundary::EndOfGrid { .. } = boundary {
            // The trailing block was emitted above; the traversal is done.
            break;
        }
    }
    Ok(segments)
}

/// Clips the candidate block starting at `cursor` to its real column span.
///
/// The header cell is located inside the block by the exact sentinel first,
/// then by the header-prefix fallback; the span walk runs on the unclipped
/// grid so column coordinates stay absolute. Returns `None` when no header
/// can be found at all — the caller surfaces that as a data-quality defect.
fn resolve_table_region(
    grid: &Grid,
    cursor: usize,
    span: usize,
) -> Result<Option<Region>, GridError> {
    let end_row = cursor + span - 1;
    let Some(last_col) = grid.cols().checked_sub(1) else {
        return Ok(None);
    };
    let block = Region::new(cursor, 0, end_row, last_col)?;
    let header = find_first(grid, |v| matches_exactly(v, COLUMN_HEADER_SENTINEL), Some(block))
        .or_else(|| find_first(grid, is_column_header, Some(block)));
    let Some((header_row, header_col)) = header else {
        return Ok(None);
    };
    let Some(span_end) = last_header_column(grid, header_row, header_col)? else {
        return Ok(None);
    };
    Ok(Some(Region::new(cursor, 0, end_row, span_end)?))
}
