//! # sheet_plot
//!
//! Turns measurement workbooks into chart requests.
//!
//! Lab exports rarely start their data at a fixed place: a sheet carries a
//! few rows of free-form header, blank rows, units, and then the numbers.
//! This crate finds where the numbers begin and pulls out aligned series:
//!
//! - **Workbook reading**: `.xlsx`, `.xlsm` and `.xlam` files are read directly
//!   (zip + XML) into typed cell grids. Date and time formatted numbers are kept
//!   apart from plain numbers.
//! - **Data location**: [`locate_start_row`] returns the first row whose cell in a
//!   given column is numeric.
//! - **Series extraction**: [`extract_series_groups`] finds every marker cell
//!   (`"Physical time [s]"` by default) in a header row and returns one labeled
//!   time/value series per marker, each starting at its own first numeric row.
//! - **Statistics**: [`StatisticsTable`] holds names with min/mean/max values, read
//!   from a sheet or summarized from extracted series.
//! - **Chart requests**: [`ChartRequest`] describes a line, bar or radar chart in
//!   full; a [`ChartRenderer`] turns it into output. [`JsonRenderer`] writes it as
//!   JSON for an external plotting tool.
//! - **Batch processing**: [`collect_workbooks`] expands a directory into workbooks
//!   and [`run_batch`] processes them one by one, collecting failures per file.
mod batch;
mod chart;
mod error;
mod helpers;
mod locate;
mod plot;
mod series;
mod spreadsheet;
mod statistics;

pub use crate::batch::collect_workbooks;
pub use crate::batch::run_batch;
pub use crate::batch::BatchReport;
pub use crate::chart::ChartKind;
pub use crate::chart::ChartRenderer;
pub use crate::chart::ChartRequest;
pub use crate::chart::FigureSize;
pub use crate::chart::Font;
pub use crate::chart::Fonts;
pub use crate::chart::Highlight;
pub use crate::chart::HighlightValue;
pub use crate::chart::JsonRenderer;
pub use crate::error::SheetPlotError;
pub use crate::locate::locate_start_row;
pub use crate::locate::locate_start_row_from;
pub use crate::plot::bar_chart;
pub use crate::plot::line_chart;
pub use crate::plot::BarChartSettings;
pub use crate::plot::LineChartSettings;
pub use crate::series::extract_series;
pub use crate::series::extract_series_groups;
pub use crate::series::SeriesError;
pub use crate::series::SeriesGroup;
pub use crate::series::SeriesOptions;
pub use crate::series::StartRow;
pub use crate::series::Summary;
pub use crate::series::DEFAULT_MARKER;
pub use crate::spreadsheet::cell::CellValue;
pub use crate::spreadsheet::criteria::Criteria;
pub use crate::spreadsheet::is_workbook;
pub use crate::spreadsheet::open_spreadsheet;
pub use crate::spreadsheet::range::Range;
pub use crate::spreadsheet::range::RangeError;
pub use crate::spreadsheet::sheet::Sheet;
pub use crate::spreadsheet::Spreadsheet;
pub use crate::spreadsheet::SpreadsheetError;
pub use crate::statistics::StatisticsOptions;
pub use crate::statistics::StatisticsTable;
