use crate::error::SheetPlotError;
use crate::spreadsheet::is_workbook;
use crate::spreadsheet::SpreadsheetError;
use glob::MatchOptions;
use glob::Pattern;
use std::path::Path;
use std::path::PathBuf;

/// Expands `path` into the workbooks to process.
///
/// A workbook file stands for itself. A directory is searched recursively for
/// `*.xlsx` files (any letter case); Office lock files (`~$...`) are skipped.
/// The result is sorted.
pub fn collect_workbooks(path: &Path) -> Result<Vec<PathBuf>, SheetPlotError> {
    if path.is_file() {
        if !is_workbook(path) {
            Err(SpreadsheetError::InvalidFileFormat(path.display().to_string()))?
        }
        return Ok(vec![path.to_path_buf()]);
    }
    if !path.is_dir() {
        Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("No such file or directory: '{}'", path.display()),
        ))?
    }

    let pattern = format!("{}/**/*.xlsx", Pattern::escape(&path.to_string_lossy()));
    let options = MatchOptions {
        case_sensitive: false,
        ..Default::default()
    };
    let mut workbooks = Vec::new();
    for entry in glob::glob_with(&pattern, options)? {
        let entry = entry?;
        let is_lock_file = entry
            .file_name()
            .map(|name| name.to_string_lossy().starts_with("~$"))
            .unwrap_or(false);
        if entry.is_file() && !is_lock_file {
            workbooks.push(entry);
        }
    }
    workbooks.sort();
    log::info!("Found {} workbook(s) under '{}'", workbooks.len(), path.display());
    Ok(workbooks)
}

/// Outcome of [`run_batch`].
#[derive(Debug, Default)]
pub struct BatchReport {
    pub succeeded: Vec<PathBuf>,
    pub failed: Vec<(PathBuf, SheetPlotError)>,
}

impl BatchReport {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Runs `process` on every workbook in order.
/// A failing workbook is logged and recorded; the remaining ones still run.
pub fn run_batch<F>(paths: &[PathBuf], mut process: F) -> BatchReport
where
    F: FnMut(&Path) -> Result<(), SheetPlotError>,
{
    let mut report = BatchReport::default();
    for (index, path) in paths.iter().enumerate() {
        log::info!("[{}/{}] {}", index + 1, paths.len(), path.display());
        match process(path) {
            Ok(()) => report.succeeded.push(path.to_owned()),
            Err(e) => {
                log::warn!("{}: {}", path.display(), e);
                report.failed.push((path.to_owned(), e));
            }
        }
    }
    report
}
