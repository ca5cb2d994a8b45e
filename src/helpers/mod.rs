//! Internal helper utilities shared by the workbook readers and writer.

pub(crate) mod xml;
pub(crate) mod zip;
