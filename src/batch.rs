//! # Batch Traversal
//!
//! Walks workbooks and their accepted sheets, runs the segmentation engine
//! on each sheet, and lays the trimmed tables out on disk as
//! `<out_dir>/<principal_slug>/[<folder_slug>/]<title_slug>.xlsx`.
//!
//! Failure isolation follows the dictionary-processing reality: one sheet
//! violating the layout convention must never abort a run over dozens of
//! workbooks, so sheet- and workbook-level errors are logged and skipped.
//! Distinct captions can slugify to the same identifier; the later write
//! overwrites the earlier one.

use crate::engine::scan::find_first;
use crate::engine::segment_sheet;
use crate::engine::text::slugify;
use crate::engine::text::starts_with_marker;
use crate::engine::trim::trim;
use crate::engine::trim::TrimMode;
use crate::engine::Segment;
use crate::engine::SheetLayout;
use crate::error::ResultMessage;
use crate::error::SheetCarverError;
use crate::grid::Grid;
use crate::grid::Region;
use crate::grid::Value;
use crate::workbook::criteria::Criteria;
use crate::workbook::open_workbook;
use crate::workbook::write_table;
use crate::workbook::XlsxWorkbook;
use std::fs;
use std::path::Path;
use std::path::PathBuf;
use tracing::error;
use tracing::info;

/// Prefix of the principal caption that names a sheet's output folder.
pub const PRINCIPAL_CAPTION_PREFIX: &str = "REM";

/// Fixed dictionary row of the principal caption, used as the fallback
/// when no prefixed caption is found in the preamble.
const PRINCIPAL_CAPTION_ROW: usize = 5;

/// Options for one batch run.
#[derive(Clone, Debug)]
pub struct BatchOptions {
    /// Output directory root
    pub out_dir: PathBuf,
    /// Sheet selection criteria
    pub criteria: Criteria,
    /// Per-sheet layout conventions
    pub layout: SheetLayout,
    /// Emptiness policy for table trimming; None disables trimming
    pub trim_mode: Option<TrimMode>,
}

impl Default for BatchOptions {
    fn default() -> Self {
        BatchOptions {
            out_dir: PathBuf::from("carved-tables"),
            criteria: Criteria::default(),
            layout: SheetLayout::default(),
            trim_mode: Some(TrimMode::default()),
        }
    }
}

/// Counters accumulated over one batch run.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub workbooks: usize,
    pub sheets: usize,
    pub tables: usize,
    pub folders: usize,
    /// Sheets or workbooks abandoned after an error
    pub failures: usize,
}

impl BatchSummary {
    fn absorb(&mut self, other: BatchSummary) {
        self.workbooks += other.workbooks;
        self.sheets += other.sheets;
        self.tables += other.tables;
        self.folders += other.folders;
        self.failures += other.failures;
    }
}

/// Expands an input argument into workbook paths: an existing file stays
/// itself, a directory becomes its `*.xlsx` entries, anything else is
/// treated as a glob pattern. Paths come back sorted.
pub fn expand_inputs(input: &str) -> Result<Vec<PathBuf>, SheetCarverError> {
    let path = Path::new(input);
    if path.is_file() {
        return Ok(vec![path.to_path_buf()]);
    }
    let pattern = if path.is_dir() {
        format!("{}/*.xlsx", input.trim_end_matches('/'))
    } else {
        input.to_owned()
    };
    let mut paths = Vec::new();
    for entry in glob::glob(&pattern)? {
        paths.push(entry?);
    }
    paths.sort();
    Ok(paths)
}

/// Idempotent directory creation.
pub fn ensure_dir(path: &Path) -> Result<(), SheetCarverError> {
    fs::create_dir_all(path)?;
    Ok(())
}

/// Runs the batch over every workbook. A failing workbook is logged and
/// skipped; the run itself never aborts early.
pub fn run(inputs: &[PathBuf], options: &BatchOptions) -> Result<BatchSummary, SheetCarverError> {
    ensure_dir(&options.out_dir)?;
    let mut summary = BatchSummary::default();
    for path in inputs {
        match carve_workbook(path, options) {
            Ok(workbook_summary) => {
                summary.absorb(workbook_summary);
                summary.workbooks += 1;
            }
            Err(workbook_error) => {
                error!(workbook = %path.display(), error = %workbook_error, "workbook failed");
                summary.failures += 1;
            }
        }
    }
    Ok(summary)
}

/// Carves every accepted sheet of one workbook. A failing sheet is logged
/// and skipped; the remaining sheets are still processed.
pub fn carve_workbook(
    path: &Path,
    options: &BatchOptions,
) -> Result<BatchSummary, SheetCarverError> {
    let mut workbook =
        open_workbook(path).with_prefix(&format!("Open workbook '{}'", path.display()))?;
    let names: Vec<String> = workbook
        .sheet_names()
        .into_iter()
        .filter(|name| options.criteria.accept(name))
        .collect();
    let names = match options.criteria.sheet_limit {
        Some(limit) => names.into_iter().take(limit).collect(),
        None => names,
    };

    let mut summary = BatchSummary::default();
    for name in &names {
        match carve_sheet(&mut workbook, name, options) {
            Ok(sheet_summary) => {
                summary.absorb(sheet_summary);
                summary.sheets += 1;
            }
            Err(sheet_error) => {
                error!(
                    workbook = %path.display(),
                    sheet = %name,
                    error = %sheet_error,
                    "sheet failed"
                );
                summary.failures += 1;
            }
        }
    }
    Ok(summary)
}

/// Segments one sheet and writes its tables under the principal folder.
/// A folder segment nests all subsequent tables one level deeper, until
/// the next folder segment.
fn carve_sheet(
    workbook: &mut XlsxWorkbook,
    sheet_name: &str,
    options: &BatchOptions,
) -> Result<BatchSummary, SheetCarverError> {
    let grid = workbook.read_sheet(sheet_name)?;
    let principal = principal_caption(&grid, &options.layout)?;
    let principal_dir = options.out_dir.join(slugify(&principal));
    ensure_dir(&principal_dir)?;

    let mut summary = BatchSummary::default();
    let mut folder: Option<PathBuf> = None;
    for segment in segment_sheet(&grid, &options.layout)? {
        match segment {
            Segment::Folder { slug, .. } => {
                let dir = principal_dir.join(&slug);
                ensure_dir(&dir)?;
                folder = Some(dir);
                summary.folders += 1;
            }
            Segment::Table { slug, region, .. } => {
                let table = grid.region(region)?;
                let table = match options.trim_mode {
                    Some(mode) => trim(&table, mode),
                    None => table,
                };
                let target_dir = folder.as_deref().unwrap_or(&principal_dir);
                let target = target_dir.join(format!("{slug}.xlsx"));
                write_table(&target, &table)?;
                info!(sheet = %sheet_name, table = %target.display(), "table written");
                summary.tables += 1;
            }
        }
    }
    Ok(summary)
}

/// Locates the principal caption naming the sheet's output folder: the
/// first preamble cell of the caption column carrying the caption prefix,
/// else the fixed dictionary position.
fn principal_caption(grid: &Grid, layout: &SheetLayout) -> Result<String, SheetCarverError> {
    if layout.caption_col < grid.cols() {
        if let Some(preamble_end) = layout.start_row.min(grid.rows()).checked_sub(1) {
            let preamble = Region::new(0, layout.caption_col, preamble_end, layout.caption_col)?;
            let prefixed = find_first(
                grid,
                |value| {
                    value
                        .as_text()
                        .map(|text| starts_with_marker(text, PRINCIPAL_CAPTION_PREFIX))
                        .unwrap_or(false)
                },
                Some(preamble),
            );
            if let Some((row, col)) = prefixed {
                if let Value::Text(text) = grid.at(row, col) {
                    return Ok(text.to_owned());
                }
            }
        }
        if let Ok(Value::Text(text)) = grid.value(PRINCIPAL_CAPTION_ROW, layout.caption_col) {
            return Ok(text.to_owned());
        }
    }
    Err(SheetCarverError::WithContextError(
        "No principal caption found in the sheet preamble".to_owned(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workbook::writer::write_workbook;

    fn caption(text: &str) -> Vec<Value> {
        vec![Value::Empty, Value::from(text)]
    }

    fn data(values: &[&str]) -> Vec<Value> {
        let mut row = vec![Value::Empty, Value::Empty];
        row.extend(values.iter().map(|v| Value::from(*v)));
        row
    }

    fn dictionary_grid() -> Grid {
        let mut rows: Vec<Vec<Value>> = (0..5).map(|_| vec![]).collect();
        rows.push(caption("REM-A01: CONTROLES DE SALUD"));
        rows.push(caption("SECCIÓN A: HEAD"));
        rows.push(data(&["COL1", "COL2"]));
        rows.push(data(&["a", "b"]));
        rows.push(caption("SECCIÓN B: GROUP"));
        rows.push(caption("SECCIÓN B.1: SUB"));
        rows.push(data(&["COL1"]));
        rows.push(data(&["x"]));
        Grid::from_rows(rows)
    }

    #[test]
    fn carves_a_workbook_into_the_output_tree() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("DICCIONARIO.xlsx");
        write_workbook(&source, "A01", &dictionary_grid()).unwrap();

        let options = BatchOptions {
            out_dir: dir.path().join("out"),
            ..BatchOptions::default()
        };
        let summary = run(&[source], &options).unwrap();
        assert_eq!(summary.workbooks, 1);
        assert_eq!(summary.sheets, 1);
        assert_eq!(summary.tables, 2);
        assert_eq!(summary.folders, 1);
        assert_eq!(summary.failures, 0);

        let principal = options.out_dir.join("REM-A01-CONTROLES_DE_SALUD");
        assert!(principal.join("SECCION_A-HEAD.xlsx").is_file());
        assert!(principal.join("SECCION_B-GROUP").is_dir());
        assert!(principal
            .join("SECCION_B-GROUP")
            .join("SECCION_B1-SUB.xlsx")
            .is_file());
    }

    #[test]
    fn written_tables_are_trimmed_to_their_real_span() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("DICCIONARIO.xlsx");
        write_workbook(&source, "A01", &dictionary_grid()).unwrap();

        let options = BatchOptions {
            out_dir: dir.path().join("out"),
            ..BatchOptions::default()
        };
        run(&[source], &options).unwrap();

        let table_path = options
            .out_dir
            .join("REM-A01-CONTROLES_DE_SALUD")
            .join("SECCION_A-HEAD.xlsx");
        let mut workbook = open_workbook(&table_path).unwrap();
        let table = workbook.read_sheet("Table").unwrap();
        assert_eq!(
            table,
            Grid::from_rows(vec![
                vec![Value::from("COL1"), Value::from("COL2")],
                vec![Value::from("a"), Value::from("b")],
            ])
        );
    }

    #[test]
    fn sheets_outside_the_criteria_are_left_alone() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("DICCIONARIO.xlsx");
        write_workbook(&source, "MACROS", &dictionary_grid()).unwrap();

        let options = BatchOptions {
            out_dir: dir.path().join("out"),
            criteria: Criteria {
                sheet_name_patterns: Some(vec![glob::Pattern::new("A*").unwrap()]),
                sheet_limit: None,
            },
            ..BatchOptions::default()
        };
        let summary = run(&[source], &options).unwrap();
        assert_eq!(summary.sheets, 0);
        assert_eq!(summary.tables, 0);
    }

    #[test]
    fn a_bad_workbook_does_not_abort_the_batch() {
        let dir = tempfile::tempdir().unwrap();
        let bad = dir.path().join("not-a-workbook.xlsx");
        std::fs::write(&bad, b"plain bytes").unwrap();
        let good = dir.path().join("DICCIONARIO.xlsx");
        write_workbook(&good, "A01", &dictionary_grid()).unwrap();

        let options = BatchOptions {
            out_dir: dir.path().join("out"),
            ..BatchOptions::default()
        };
        let summary = run(&[bad, good], &options).unwrap();
        assert_eq!(summary.workbooks, 1);
        assert_eq!(summary.failures, 1);
        assert_eq!(summary.tables, 2);
    }

    #[test]
    fn expand_inputs_globs_directories() {
        let dir = tempfile::tempdir().unwrap();
        write_workbook(&dir.path().join("b.xlsx"), "A01", &dictionary_grid()).unwrap();
        write_workbook(&dir.path().join("a.xlsx"), "A01", &dictionary_grid()).unwrap();
        std::fs::write(dir.path().join("notes.txt"), b"skip me").unwrap();

        let paths = expand_inputs(dir.path().to_str().unwrap()).unwrap();
        assert_eq!(paths.len(), 2);
        assert!(paths[0].ends_with("a.xlsx"));
        assert!(paths[1].ends_with("b.xlsx"));
    }

    #[test]
    fn ensure_dir_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        ensure_dir(&nested).unwrap();
        ensure_dir(&nested).unwrap();
        assert!(nested.is_dir());
    }
}
