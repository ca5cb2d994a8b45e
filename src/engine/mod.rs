//! # Segmentation Engine
//!
//! The boundary-inference core: given an untyped 2-D grid of cell values,
//! find the section markers that separate tables, determine each table's
//! exact row/column span, trim incidental empty rows and columns, and derive
//! filesystem-safe identifiers from the free-text captions.
//!
//! Every component is a pure function over explicit inputs; the only mutable
//! state is the driver's row cursor, scoped to one sheet traversal.

use thiserror::Error;

pub mod boundary;
pub mod driver;
pub mod scan;
pub mod segment;
pub mod span;
pub mod text;
pub mod trim;

pub use boundary::resolve_boundary;
pub use boundary::SectionBoundary;
pub use driver::segment_sheet;
pub use driver::SheetLayout;
pub use segment::Segment;
pub use trim::trim;
pub use trim::TrimMode;

/// Errors raised by the segmentation engine.
#[derive(Error, Debug)]
pub enum EngineError {
    /// A caption cell held something other than text; the sheet violates
    /// the layout convention and cannot be segmented further.
    #[error("Caption cell at ({row}, {col}) holds {found}, expected text")]
    CaptionTypeMismatch {
        row: usize,
        col: usize,
        found: &'static str,
    },

    #[error("{0}")]
    GridError(#[from] crate::grid::GridError),
}
