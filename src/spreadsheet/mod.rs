//! # Workbook reading
//!
//! Opens Office Open XML workbooks (`.xlsx`, `.xlsm`, `.xlam`) and loads
//! worksheets into in-memory [`Sheet`] grids with typed cells. Numbers that
//! carry a date or time number format are typed as temporal values so that
//! data scans never mistake them for measurements.
pub(crate) mod cell;
pub(crate) mod criteria;
pub(crate) mod range;
pub(crate) mod reference;
pub(crate) mod sheet;
pub(crate) mod xlsx;

use crate::error::SheetPlotError;
use crate::spreadsheet::criteria::Criteria;
use crate::spreadsheet::sheet::Sheet;
use crate::spreadsheet::xlsx::XlsxSpreadsheet;
use std::collections::HashMap;
use std::collections::HashSet;
use std::ffi::OsStr;
use std::path::Path;
use thiserror::Error;

/// File extensions handled by [`open_spreadsheet`].
pub const WORKBOOK_EXTENSIONS: [&str; 3] = ["xlsx", "xlsm", "xlam"];

#[derive(Error, Debug)]
pub enum SpreadsheetError {
    #[error("Cannot detect file format for '{0}'")]
    InvalidFileFormat(String),

    #[error("Missing part '{0}' in workbook")]
    FileError(String),

    #[error("Workbook '{0}' has no worksheets")]
    SpreadsheetEmptyError(String),

    #[error("Sheet '{sheet}' not found in '{file}'")]
    SheetNotFound { file: String, sheet: String },
}

/// A workbook opened for reading.
pub trait Spreadsheet {
    /// Returns the file name of this spreadsheet
    fn name(&self) -> String;

    /// Names of all worksheets in workbook order
    fn sheet_names(&self) -> Vec<String>;

    /// Name of the sheet that was active when the workbook was saved.
    /// When that tab is a chart sheet, the first worksheet is returned.
    fn active_sheet_name(&self) -> Option<String>;

    /// Loads the shared string entries listed in `indexes`.
    ///
    /// The returned map translates a shared string index into a position of
    /// the returned vector. Indexes past the end of the table are left out.
    fn load_shared_strings(
        &mut self,
        indexes: HashSet<usize>,
    ) -> Result<(Vec<String>, HashMap<usize, usize>), SheetPlotError>;

    /// Reads every sheet accepted by `criteria`, shared strings resolved.
    fn read_sheets(&mut self, criteria: &Criteria) -> Result<Vec<Sheet>, SheetPlotError>;

    /// Reads one sheet by name, or the active sheet when `name` is `None`.
    fn read_sheet(&mut self, name: Option<&str>) -> Result<Sheet, SheetPlotError> {
        let name = match name {
            Some(name) => name.to_owned(),
            None => self.active_sheet_name().ok_or_else(|| SpreadsheetError::SpreadsheetEmptyError(self.name()))?,
        };
        self.read_sheets(&Criteria::named(&name))?
            .into_iter()
            .next()
            .ok_or_else(|| SpreadsheetError::SheetNotFound { file: self.name(), sheet: name }.into())
    }
}

/// True if the path carries one of the [`WORKBOOK_EXTENSIONS`].
pub fn is_workbook(path: &Path) -> bool {
    path.extension()
        .and_then(OsStr::to_str)
        .map(|extension| WORKBOOK_EXTENSIONS.iter().any(|it| it.eq_ignore_ascii_case(extension)))
        .unwrap_or(false)
}

/// Opens a workbook, choosing the reader from the file extension.
pub fn open_spreadsheet(path: &Path) -> Result<Box<dyn Spreadsheet>, SheetPlotError> {
    if is_workbook(path) {
        Ok(Box::new(XlsxSpreadsheet::open(path)?))
    } else {
        Err(SpreadsheetError::InvalidFileFormat(path.display().to_string()))?
    }
}
