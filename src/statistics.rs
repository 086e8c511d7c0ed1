use crate::error::SheetPlotError;
use crate::series::SeriesGroup;
use crate::spreadsheet::range::Range;
use crate::spreadsheet::sheet::Sheet;
use serde::Serialize;

/// Where the name/min/mean/max block sits in a sheet.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct StatisticsOptions {
    /// First data row (1-based), below the column captions
    pub first_row: usize,
    /// Last data row (1-based); `None` reads to the end of the sheet
    pub last_row: Option<usize>,
    /// Column (1-based) of the names; min, mean and max follow to the right
    pub first_column: usize,
}

impl Default for StatisticsOptions {
    fn default() -> Self {
        StatisticsOptions {
            first_row: 2,
            last_row: None,
            first_column: 1,
        }
    }
}

impl TryFrom<&str> for StatisticsOptions {
    type Error = SheetPlotError;

    /// Reads the block position from a range such as `A2:D` or `C5:F20`.
    /// Only the upper left corner and the last row are used.
    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let range = Range::try_from(value)?;
        Ok(StatisticsOptions {
            first_row: range.row_lower_bound.map(|row| row + 1).unwrap_or(1),
            last_row: range.row_upper_bound.map(|row| row + 1),
            first_column: range.col_lower_bound.map(|col| col + 1).unwrap_or(1),
        })
    }
}

/// Named min/mean/max triples, the input of bar and radar charts.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct StatisticsTable {
    names: Vec<String>,
    min: Vec<f64>,
    mean: Vec<f64>,
    max: Vec<f64>,
}

impl StatisticsTable {
    /// Reads the table from `sheet`.
    ///
    /// Blank rows are skipped. A row whose min, mean or max is not a number is
    /// skipped with a warning.
    pub fn from_sheet(sheet: &Sheet, options: &StatisticsOptions) -> Self {
        let mut table = StatisticsTable::default();
        let last_row = options.last_row.unwrap_or(usize::MAX).min(sheet.last_row());
        let column = options.first_column;
        for row in options.first_row.max(1)..=last_row {
            let name = sheet.value(row, column);
            let statistics = [1, 2, 3].map(|offset| sheet.value(row, column + offset));
            if name.is_empty() && statistics.iter().all(|value| value.is_empty()) {
                continue;
            }
            match statistics.each_ref().map(|value| value.as_number()) {
                [Some(min), Some(mean), Some(max)] => table.push(name.to_string(), min, mean, max),
                _ => log::warn!("{}: skipping row {} ('{}'), statistics are not numeric",
                    sheet.name(), row, name),
            }
        }
        log::debug!("{}: {} statistics row(s)", sheet.name(), table.len());
        table
    }

    /// Summarizes each non-empty series into one entry named after its label.
    pub fn from_groups(groups: &[SeriesGroup]) -> Self {
        let mut table = StatisticsTable::default();
        for group in groups {
            if let Some(summary) = group.summary() {
                table.push(group.label().to_owned(), summary.min, summary.mean, summary.max);
            }
        }
        table
    }

    fn push(&mut self, name: String, min: f64, mean: f64, max: f64) {
        self.names.push(name);
        self.min.push(min);
        self.mean.push(mean);
        self.max.push(max);
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn min(&self) -> &[f64] {
        &self.min
    }

    pub fn mean(&self) -> &[f64] {
        &self.mean
    }

    pub fn max(&self) -> &[f64] {
        &self.max
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
