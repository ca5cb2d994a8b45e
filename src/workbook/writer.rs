//! Minimal XLSX writer for extracted tables.
//!
//! Emits the smallest container a spreadsheet application accepts: the
//! content-types part, the package and workbook relationships, a one-sheet
//! workbook, and the worksheet itself. Text goes out as inline strings so
//! no shared string table is needed.

use crate::error::SheetCarverError;
use crate::grid::Grid;
use crate::grid::Value;
use crate::workbook::index_to_reference;
use quick_xml::events::BytesDecl;
use quick_xml::events::BytesEnd;
use quick_xml::events::BytesStart;
use quick_xml::events::BytesText;
use quick_xml::events::Event;
use quick_xml::Writer;
use std::fs::File;
use std::io::BufWriter;
use std::io::Cursor;
use std::io::Write;
use std::path::Path;
use zip::write::SimpleFileOptions;
use zip::CompressionMethod;
use zip::ZipWriter;

const MAIN_NAMESPACE: &str = "http://schemas.openxmlformats.org/spreadsheetml/2006/main";

const CONTENT_TYPES: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    r#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">"#,
    r#"<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>"#,
    r#"<Default Extension="xml" ContentType="application/xml"/>"#,
    r#"<Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/>"#,
    r#"<Override PartName="/xl/worksheets/sheet1.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/>"#,
    r#"</Types>"#,
);

const PACKAGE_RELATIONSHIPS: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
    r#"<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/>"#,
    r#"</Relationships>"#,
);

const WORKBOOK_RELATIONSHIPS: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
    r#"<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/>"#,
    r#"</Relationships>"#,
);

/// Writes one rectangular grid as a single-sheet XLSX file, creating or
/// overwriting the file at `path`.
pub fn write_table<P>(path: P, grid: &Grid) -> Result<(), SheetCarverError>
where
    P: AsRef<Path>,
{
    write_workbook(path.as_ref(), "Table", grid)
}

/// Writes a grid under an explicit sheet name.
pub(crate) fn write_workbook(
    path: &Path,
    sheet_name: &str,
    grid: &Grid,
) -> Result<(), SheetCarverError> {
    let file = File::create(path)?;
    let mut zip = ZipWriter::new(BufWriter::new(file));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    zip.start_file("[Content_Types].xml", options)?;
    zip.write_all(CONTENT_TYPES.as_bytes())?;
    zip.start_file("_rels/.rels", options)?;
    zip.write_all(PACKAGE_RELATIONSHIPS.as_bytes())?;
    zip.start_file("xl/workbook.xml", options)?;
    zip.write_all(&workbook_xml(sheet_name)?)?;
    zip.start_file("xl/_rels/workbook.xml.rels", options)?;
    zip.write_all(WORKBOOK_RELATIONSHIPS.as_bytes())?;
    zip.start_file("xl/worksheets/sheet1.xml", options)?;
    zip.write_all(&worksheet_xml(grid)?)?;

    zip.finish()?.flush()?;
    Ok(())
}

/// Builds xl/workbook.xml with a single sheet entry.
fn workbook_xml(sheet_name: &str) -> Result<Vec<u8>, SheetCarverError> {
    let mut writer = Writer::new(Cursor::new(Vec::new()));
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))?;

    let mut workbook = BytesStart::new("workbook");
    workbook.push_attribute(("xmlns", MAIN_NAMESPACE));
    workbook.push_attribute((
        "xmlns:r",
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships",
    ));
    writer.write_event(Event::Start(workbook))?;
    writer.write_event(Event::Start(BytesStart::new("sheets")))?;

    let mut sheet = BytesStart::new("sheet");
    sheet.push_attribute(("name", sheet_name));
    sheet.push_attribute(("sheetId", "1"));
    sheet.push_attribute(("r:id", "rId1"));
    writer.write_event(Event::Empty(sheet))?;

    writer.write_event(Event::End(BytesEnd::new("sheets")))?;
    writer.write_event(Event::End(BytesEnd::new("workbook")))?;
    Ok(writer.into_inner().into_inner())
}

/// Builds xl/worksheets/sheet1.xml from the grid's cells.
/// Empty cells are simply not emitted.
fn worksheet_xml(grid: &Grid) -> Result<Vec<u8>, SheetCarverError> {
    let mut writer = Writer::new(Cursor::new(Vec::new()));
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))?;

    let mut worksheet = BytesStart::new("worksheet");
    worksheet.push_attribute(("xmlns", MAIN_NAMESPACE));
    writer.write_event(Event::Start(worksheet))?;
    writer.write_event(Event::Start(BytesStart::new("sheetData")))?;

    for row in 0..grid.rows() {
        let mut row_element = BytesStart::new("row");
        row_element.push_attribute(("r", (row + 1).to_string().as_str()));
        writer.write_event(Event::Start(row_element))?;
        for col in 0..grid.cols() {
            write_cell(&mut writer, row, col, grid.at(row, col))?;
        }
        writer.write_event(Event::End(BytesEnd::new("row")))?;
    }

    writer.write_event(Event::End(BytesEnd::new("sheetData")))?;
    writer.write_event(Event::End(BytesEnd::new("worksheet")))?;
    Ok(writer.into_inner().into_inner())
}

/// Writes one cell: numbers as plain values, text as an inline string.
fn write_cell(
    writer: &mut Writer<Cursor<Vec<u8>>>,
    row: usize,
    col: usize,
    value: &Value,
) -> Result<(), SheetCarverError> {
    let mut cell = BytesStart::new("c");
    cell.push_attribute(("r", index_to_reference(row, col).as_str()));
    match value {
        Value::Empty => (),
        Value::Number(number) => {
            writer.write_event(Event::Start(cell))?;
            writer.write_event(Event::Start(BytesStart::new("v")))?;
            writer.write_event(Event::Text(BytesText::new(&number.to_string())))?;
            writer.write_event(Event::End(BytesEnd::new("v")))?;
            writer.write_event(Event::End(BytesEnd::new("c")))?;
        }
        Value::Text(text) => {
            cell.push_attribute(("t", "inlineStr"));
            writer.write_event(Event::Start(cell))?;
            writer.write_event(Event::Start(BytesStart::new("is")))?;
            writer.write_event(Event::Start(BytesStart::new("t")))?;
            writer.write_event(Event::Text(BytesText::new(text)))?;
            writer.write_event(Event::End(BytesEnd::new("t")))?;
            writer.write_event(Event::End(BytesEnd::new("is")))?;
            writer.write_event(Event::End(BytesEnd::new("c")))?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workbook::open_workbook;

    fn table() -> Grid {
        Grid::from_rows(vec![
            vec![Value::from("COL1"), Value::from("COL2")],
            vec![Value::from("niños: á"), Value::from(0.0)],
            vec![Value::Empty, Value::from(12.5)],
        ])
    }

    #[test]
    fn written_workbook_reads_back_identically() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("table.xlsx");
        write_table(&path, &table()).unwrap();

        let mut workbook = open_workbook(&path).unwrap();
        assert_eq!(workbook.sheet_names(), vec!["Table".to_owned()]);
        let grid = workbook.read_sheet("Table").unwrap();
        assert_eq!(grid, table());
    }

    #[test]
    fn missing_sheet_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("table.xlsx");
        write_table(&path, &table()).unwrap();

        let mut workbook = open_workbook(&path).unwrap();
        assert!(workbook.read_sheet("A01").is_err());
    }

    #[test]
    fn overwrites_an_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("table.xlsx");
        write_table(&path, &table()).unwrap();
        let smaller = Grid::from_rows(vec![vec![Value::from("only")]]);
        write_table(&path, &smaller).unwrap();

        let mut workbook = open_workbook(&path).unwrap();
        assert_eq!(workbook.read_sheet("Table").unwrap(), smaller);
    }
}
