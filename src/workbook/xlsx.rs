//! XLSX workbook reader.
//!
//! Parses the workbook relationships, the shared string table, and the
//! worksheet parts of an Excel 2007+ container into untyped grids. Styles
//! and number formats are deliberately not read: the engine works on the
//! stored values, so a cell is empty, text, or a number and nothing more.

use crate::error::SheetCarverError;
use crate::grid::Grid;
use crate::grid::Value;
use crate::helpers::xml::XmlAttributeHelper;
use crate::helpers::xml::XmlNodeHelper;
use crate::helpers::xml::XmlReader;
use crate::helpers::xml::XmlTextContextHelper;
use crate::helpers::zip::ZipHelper;
use crate::match_xml_events;
use crate::workbook::reference_to_index;
use crate::workbook::WorkbookError;
use quick_xml::events::Event;
use quick_xml::name::QName;
use std::borrow::Cow;
use std::collections::HashMap;
use std::fs::File;
use std::io::BufRead;
use std::io::BufReader;
use std::path::Path;
use zip::ZipArchive;

// XML tag names for parsing the Excel XLSX format
const TAG_RELATIONSHIP: &[u8] = b"Relationship";        // Workbook relationship entry
const TAG_SHEET: QName = QName(b"sheet");               // Worksheet definition
const TAG_SHARED_STRING_ITEM: QName = QName(b"si");     // Shared string table item
const TAG_PHONETIC_TEXT: QName = QName(b"rPh");         // Phonetic text for Asian languages
const TAG_TEXT: QName = QName(b"t");                    // Text content within strings
const TAG_ROW: QName = QName(b"row");                   // Row in worksheet
const TAG_CELL: QName = QName(b"c");                    // Cell in worksheet
const TAG_INLINE_STRING: QName = QName(b"is");          // Inline string value
const TAG_VALUE: QName = QName(b"v");                   // Cell value content

/// Storage class of a worksheet cell, from its `t` attribute.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
enum XlsxCellType {
    /// Plain numeric storage (no `t`, or `t="n"`)
    #[default]
    Number,
    /// Inline or formula string (`t="inlineStr"`, `t="str"`)
    InlineString,
    /// Shared string table reference (`t="s"`)
    SharedString,
    /// Everything stored as literal text (`t="b"`, `t="e"`, `t="d"`)
    Literal,
}

/// An Excel XLSX workbook opened for reading.
pub struct XlsxWorkbook {
    /// Source file name, kept for error reporting
    name: String,
    /// ZIP archive holding the container parts
    zip: ZipArchive<BufReader<File>>,
    /// Worksheets as (name, zip_path) pairs, in workbook order
    sheets: Vec<(String, String)>,
    /// Shared string table, loaded on first sheet read
    shared_strings: Option<Vec<String>>,
}

impl XlsxWorkbook {
    /// Opens an XLSX container and parses its workbook structure.
    pub(crate) fn open(path: &Path) -> Result<XlsxWorkbook, SheetCarverError> {
        let file = File::open(path)?;
        let mut zip = ZipArchive::new(BufReader::new(file))?;
        let sheets = load_workbook(&mut zip)?;
        Ok(XlsxWorkbook {
            name: path.to_string_lossy().to_string(),
            zip,
            sheets,
            shared_strings: None,
        })
    }

    /// Returns the names of all worksheets in workbook order.
    pub fn sheet_names(&self) -> Vec<String> {
        self.sheets.iter().map(|(name, _)| name.to_owned()).collect()
    }

    /// Reads one worksheet into a grid of untyped values.
    ///
    /// Fails with [`WorkbookError::SheetNotFound`] when the workbook holds
    /// no sheet of that name.
    pub fn read_sheet(&mut self, sheet_name: &str) -> Result<Grid, SheetCarverError> {
        let zip_path = self
            .sheets
            .iter()
            .find(|(name, _)| name == sheet_name)
            .map(|(_, path)| path.to_owned())
            .ok_or_else(|| WorkbookError::SheetNotFound {
                file: self.name.to_owned(),
                name: sheet_name.to_owned(),
            })?;

        if self.shared_strings.is_none() {
            self.shared_strings = Some(load_shared_strings(&mut self.zip)?);
        }
        let shared_strings = self.shared_strings.as_deref().unwrap_or_default();

        let mut cells: Vec<Vec<Value>> = Vec::new();
        let mut row_count = 0usize;
        let mut col_count = 0usize;
        let mut row = 0usize;
        let mut col = 0usize;
        let mut kind = XlsxCellType::default();
        let mut value = String::new();
        let mut reader = self
            .zip
            .xml_reader(&zip_path)?
            .ok_or_else(|| WorkbookError::MissingArchiveFile(zip_path.to_owned()))?;
        match_xml_events!(reader => {
            Event::End(event) if event.name() == TAG_ROW => {
                row_count += 1;
                col_count = 0;
            }
            Event::Start(event) if event.name() == TAG_CELL => {
                (row, col) = event.get_attribute_value("r")?
                    .and_then(|reference| reference_to_index(&reference))
                    .unwrap_or((row_count, col_count));
                col_count += 1;
                kind = event.get_attribute_value("t")?.map(|t| {
                    match t.as_ref() {
                        "inlineStr" | "str" => XlsxCellType::InlineString,
                        "s" => XlsxCellType::SharedString,
                        "b" | "e" | "d" => XlsxCellType::Literal,
                        _ => XlsxCellType::Number,
                    }
                }).unwrap_or(XlsxCellType::Number);
                value.clear();
            }
            Event::Start(event) if event.name() == TAG_INLINE_STRING => {
                value = read_string_value(&mut reader, TAG_INLINE_STRING, false)?;
            }
            Event::Start(event) if event.name() == TAG_VALUE => {
                value = read_string_value(&mut reader, TAG_VALUE, true)?;
            }
            Event::End(event) if !value.is_empty() && event.name() == TAG_CELL => {
                let cell = match kind {
                    XlsxCellType::Number => value
                        .parse::<f64>()
                        .map(Value::Number)
                        .unwrap_or_else(|_| Value::Text(value.to_owned())),
                    XlsxCellType::SharedString => {
                        let index = value.parse::<usize>()?;
                        let text = shared_strings.get(index).ok_or_else(|| {
                            WorkbookError::SharedStringNotFound {
                                file: self.name.to_owned(),
                                index,
                            }
                        })?;
                        Value::Text(text.to_owned())
                    }
                    XlsxCellType::InlineString | XlsxCellType::Literal => {
                        Value::Text(value.to_owned())
                    }
                };
                set_cell(&mut cells, row, col, cell);
                value.clear();
            }
        });
        Ok(Grid::from_rows(cells))
    }
}

/// Places a value at (row, col), growing the row vectors as needed.
fn set_cell(cells: &mut Vec<Vec<Value>>, row: usize, col: usize, value: Value) {
    if cells.len() <= row {
        cells.resize_with(row + 1, Vec::new);
    }
    let record = &mut cells[row];
    if record.len() <= col {
        record.resize(col + 1, Value::Empty);
    }
    record[col] = value;
}

/// Loads worksheet names and their zip paths from xl/workbook.xml,
/// resolving relationship ids through xl/_rels/workbook.xml.rels.
fn load_workbook(
    zip: &mut ZipArchive<BufReader<File>>,
) -> Result<Vec<(String, String)>, SheetCarverError> {
    let relationships = load_relationships(zip, "xl/_rels/workbook.xml.rels")?;
    let mut reader = zip
        .xml_reader("xl/workbook.xml")?
        .ok_or_else(|| WorkbookError::MissingArchiveFile("xl/workbook.xml".to_owned()))?;
    let mut sheets: Vec<(String, String)> = Vec::new();
    match_xml_events!(reader => {
        Event::Start(event) if event.name() == TAG_SHEET => {
            let mut name = None::<Cow<str>>;
            let mut id = None::<Cow<str>>;
            for result in event.attributes() {
                let attribute = result?;
                let key = attribute.key.local_name();
                if key.as_ref() == b"name" {
                    name = Some(attribute.get_value()?);
                } else if key.as_ref() == b"id" {
                    id = Some(attribute.get_value()?);
                }
            }
            if let Some((name, id)) = name.zip(id) {
                if let Some(path) = relationships.get(&id.to_string()) {
                    sheets.push((name.to_string(), path.to_owned()));
                }
            }
        }
    });
    Ok(sheets)
}

/// Loads worksheet relationships, mapping relationship ids to zip paths.
fn load_relationships(
    zip: &mut ZipArchive<BufReader<File>>,
    path: &str,
) -> Result<HashMap<String, String>, SheetCarverError> {
    let mut reader = zip
        .xml_reader(path)?
        .ok_or_else(|| WorkbookError::MissingArchiveFile(path.to_owned()))?;
    let mut relationships: HashMap<String, String> = HashMap::new();
    match_xml_events!(reader => {
        Event::Start(event) if event.local_name().as_ref() == TAG_RELATIONSHIP => {
            let id = event.get_attribute_value("Id")?;
            let kind = event.get_attribute_value("Type")?;
            let target = event.get_attribute_value("Target")?;
            // Only worksheet relationships matter here
            if kind.map(|it| it.ends_with("/worksheet")).unwrap_or(true) {
                if let Some((id, target)) = id.zip(target) {
                    relationships.insert(id.to_string(), to_zip_path(target));
                }
            }
        }
    });
    Ok(relationships)
}

/// Normalizes a relationship target to a path inside the archive.
fn to_zip_path(path: Cow<'_, str>) -> String {
    if let Some(stripped) = path.strip_prefix("/xl/") {
        format!("xl/{stripped}")
    } else if path.starts_with("xl/") {
        path.to_string()
    } else {
        format!("xl/{path}")
    }
}

/// Loads the shared string table, if the workbook has one.
fn load_shared_strings(
    zip: &mut ZipArchive<BufReader<File>>,
) -> Result<Vec<String>, SheetCarverError> {
    let mut shared_strings = Vec::<String>::new();
    let mut reader = match zip.xml_reader("xl/sharedStrings.xml")? {
        Some(reader) => reader,
        None => return Ok(shared_strings),
    };
    match_xml_events!(reader => {
        Event::Start(event) if event.name() == TAG_SHARED_STRING_ITEM => {
            let string = read_string_value(&mut reader, TAG_SHARED_STRING_ITEM, false)?;
            shared_strings.push(string);
        }
    });
    Ok(shared_strings)
}

/// Reads string content up to `end_tag`, skipping phonetic annotations and
/// handling text nodes, CDATA sections, and character references.
fn read_string_value<R: BufRead>(
    reader: &mut XmlReader<R>,
    end_tag: QName,
    is_text_content: bool,
) -> Result<String, SheetCarverError> {
    let mut is_phonetic_text = false;
    let mut is_text = is_text_content;
    let mut text = String::new();
    match_xml_events!(reader => {
        Event::End(event) if event.name() == end_tag => break,
        Event::Start(event) if event.name() == TAG_PHONETIC_TEXT => is_phonetic_text = true,
        Event::End(event) if event.name() == TAG_PHONETIC_TEXT => is_phonetic_text = false,
        Event::Start(event) if !is_phonetic_text && event.name() == TAG_TEXT => is_text = true,
        Event::End(event) if is_text && event.name() == TAG_TEXT => is_text = false,
        Event::Text(event) if is_text => text.push_bytes_text(&event)?,
        Event::CData(event) if is_text => text.push_str(&event.xml_content()?),
        Event::GeneralRef(event) if is_text => text.push_bytes_ref(&event)?,
    });
    Ok(text)
}
