use crate::grid::Region;

/// One unit of driver output, in document order.
#[derive(Clone, Debug, PartialEq)]
pub enum Segment {
    /// A caption with a rectangular table body, header row included.
    Table {
        /// Raw caption text
        caption: String,
        /// Filesystem-safe identifier derived from the caption
        slug: String,
        /// Row/column span of the table within the source grid
        region: Region,
    },
    /// A grouping heading with no table body of its own; the segments that
    /// follow it belong under this heading in the output tree.
    Folder {
        caption: String,
        slug: String,
    },
}

impl Segment {
    /// Raw caption text of the segment.
    pub fn caption(&self) -> &str {
        match self {
            Segment::Table { caption, .. } => caption,
            Segment::Folder { caption, .. } => caption,
        }
    }

    /// Normalized identifier of the segment.
    pub fn slug(&self) -> &str {
        match self {
            Segment::Table { slug, .. } => slug,
            Segment::Folder { slug, .. } => slug,
        }
    }
}
