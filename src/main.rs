//! Command-line entry point: carve data-dictionary workbooks into
//! per-section tables.

use anyhow::Context;
use clap::Parser;
use clap::ValueEnum;
use sheet_carver::batch;
use sheet_carver::batch::BatchOptions;
use sheet_carver::engine::SheetLayout;
use sheet_carver::engine::TrimMode;
use sheet_carver::workbook::criteria::Criteria;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Split data-dictionary workbooks into per-section spreadsheet files.
#[derive(Parser, Debug)]
#[command(name = "sheet-carver", version, about)]
struct Args {
    /// Workbook file, directory of workbooks, or glob pattern
    input: String,

    /// Output directory root
    #[arg(short, long, default_value = "carved-tables")]
    out_dir: PathBuf,

    /// Glob pattern selecting which sheets to carve
    #[arg(short, long, default_value = "A*")]
    sheets: String,

    /// Maximum number of sheets to carve per workbook
    #[arg(long)]
    max_sheets: Option<usize>,

    /// Emptiness policy used when trimming extracted tables
    #[arg(long, value_enum, default_value_t = TrimArg::Permissive)]
    trim: TrimArg,

    /// First body row below a sheet's top-level section marker
    #[arg(long, default_value_t = 7)]
    start_row: usize,

    /// Column holding captions and section markers
    #[arg(long, default_value_t = 1)]
    caption_col: usize,
}

#[derive(ValueEnum, Copy, Clone, Debug)]
enum TrimArg {
    /// Only truly empty cells count as empty
    Strict,
    /// Zero-valued cells count as empty too
    Permissive,
    /// Keep extracted tables untrimmed
    None,
}

impl TrimArg {
    fn to_mode(self) -> Option<TrimMode> {
        match self {
            TrimArg::Strict => Some(TrimMode::Strict),
            TrimArg::Permissive => Some(TrimMode::Permissive),
            TrimArg::None => None,
        }
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let options = BatchOptions {
        out_dir: args.out_dir,
        criteria: Criteria {
            sheet_name_patterns: Some(vec![
                glob::Pattern::new(&args.sheets).context("Invalid sheet pattern")?
            ]),
            sheet_limit: args.max_sheets,
        },
        layout: SheetLayout {
            caption_col: args.caption_col,
            start_row: args.start_row,
        },
        trim_mode: args.trim.to_mode(),
    };

    let inputs = batch::expand_inputs(&args.input).context("Enumerate input workbooks")?;
    anyhow::ensure!(!inputs.is_empty(), "No workbooks match '{}'", args.input);

    let summary = batch::run(&inputs, &options)?;
    info!(
        workbooks = summary.workbooks,
        sheets = summary.sheets,
        tables = summary.tables,
        folders = summary.folders,
        failures = summary.failures,
        "batch finished"
    );
    Ok(())
}
