//! Extraction of labeled time/value series from marker columns.
//!
//! A measurement export lays out each channel as two adjacent columns: time on
//! the left, the measured value on the right. The time column is identified by a
//! marker text in one header row and the channel label sits next to the marker.
//!
//! ```text
//!        C                    D          ...   G                    H
//!  4  | Physical time [s] | Sensor A | ... | Physical time [s] | Sensor B |
//!  12 | 0.0               | 20.1     | ... |                   |          |
//!  15 | 3.0               | 20.4     | ... | 0.0               | 19.8     |
//! ```

use crate::error::SheetPlotError;
use crate::locate::locate_start_row_from;
use crate::spreadsheet::sheet::Sheet;
use serde::Serialize;
use thiserror::Error;

/// Marker text written above every time column by the measurement software.
pub const DEFAULT_MARKER: &str = "Physical time [s]";

#[derive(Error, Debug)]
pub enum SeriesError {
    #[error("No '{marker}' marker in row {header_row} of sheet '{sheet}'")]
    MissingMarker {
        sheet: String,
        marker: String,
        header_row: usize,
    },
}

/// Where each group's data begins.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum StartRow {
    /// First numeric row below the header, located per marker column.
    #[default]
    PerGroup,
    /// The same 1-based row for every group.
    Fixed(usize),
}

/// Parameters for series extraction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SeriesOptions {
    /// 1-based row holding the marker cells
    pub header_row: usize,
    /// Exact text of a marker cell
    pub marker: String,
    pub start_row: StartRow,
    /// Column distance from the marker to its label cell
    pub label_offset: usize,
    /// Column distance from the marker (time) column to the value column
    pub value_offset: usize,
    /// Fail with [`SeriesError::MissingMarker`] when the header row has no marker
    pub require_marker: bool,
}

impl Default for SeriesOptions {
    fn default() -> Self {
        SeriesOptions {
            header_row: 4,
            marker: DEFAULT_MARKER.to_owned(),
            start_row: StartRow::PerGroup,
            label_offset: 1,
            value_offset: 1,
            require_marker: false,
        }
    }
}

/// Minimum, mean and maximum of a series' values.
#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
pub struct Summary {
    pub min: f64,
    pub mean: f64,
    pub max: f64,
}

/// One labeled series: aligned time and value sequences from a marker column pair.
///
/// `time[i]`, `values[i]` and `rows[i]` always describe the same sheet row.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SeriesGroup {
    label: String,
    column: usize,
    start_row: Option<usize>,
    time: Vec<f64>,
    values: Vec<f64>,
    rows: Vec<usize>,
}

impl SeriesGroup {
    /// Text of the cell next to the marker
    pub fn label(&self) -> &str {
        &self.label
    }

    /// 1-based column of the marker (time) cell
    pub fn column(&self) -> usize {
        self.column
    }

    /// First row scanned for data; `None` when the time column has no number at all
    pub fn start_row(&self) -> Option<usize> {
        self.start_row
    }

    pub fn time(&self) -> &[f64] {
        &self.time
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Sheet row (1-based) each pair was read from.
    /// Consecutive entries differing by more than one reveal dropped rows.
    pub fn rows(&self) -> &[usize] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    /// Value paired with the first time exactly equal to `x`.
    pub fn value_at(&self, x: f64) -> Option<f64> {
        self.time
            .iter()
            .position(|time| *time == x)
            .map(|index| self.values[index])
    }

    /// Last (time, value) pair
    pub fn last(&self) -> Option<(f64, f64)> {
        self.time.last().copied().zip(self.values.last().copied())
    }

    pub fn summary(&self) -> Option<Summary> {
        if self.values.is_empty() {
            return None;
        }
        let min = self.values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = self.values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let mean = self.values.iter().sum::<f64>() / self.values.len() as f64;
        Some(Summary { min, mean, max })
    }
}

/// Extracts every series group from `sheet`, in column order.
///
/// Markers are looked up in `header_row`; each group starts at the first numeric
/// row of its own time column. Never fails: no markers gives an empty vector.
pub fn extract_series_groups(sheet: &Sheet, header_row: usize, marker_text: &str) -> Vec<SeriesGroup> {
    let options = SeriesOptions {
        header_row,
        marker: marker_text.to_owned(),
        ..Default::default()
    };
    collect_groups(sheet, &options)
}

/// Extracts series groups as configured by `options`.
///
/// Only fails when `options.require_marker` is set and the header row holds no marker.
pub fn extract_series(sheet: &Sheet, options: &SeriesOptions) -> Result<Vec<SeriesGroup>, SheetPlotError> {
    let groups = collect_groups(sheet, options);
    if groups.is_empty() && options.require_marker {
        Err(SeriesError::MissingMarker {
            sheet: sheet.name().to_owned(),
            marker: options.marker.to_owned(),
            header_row: options.header_row,
        })?
    }
    Ok(groups)
}

fn collect_groups(sheet: &Sheet, options: &SeriesOptions) -> Vec<SeriesGroup> {
    find_markers(sheet, options)
        .into_iter()
        .map(|(column, label)| extract_group(sheet, options, column, label))
        .collect()
}

/// Marker columns in `options.header_row` with their labels, left to right.
fn find_markers(sheet: &Sheet, options: &SeriesOptions) -> Vec<(usize, String)> {
    (1..=sheet.last_column())
        .filter(|column| sheet.value(options.header_row, *column).as_text() == Some(options.marker.as_str()))
        .map(|column| {
            let label = sheet.value(options.header_row, column + options.label_offset).to_string();
            (column, label)
        })
        .collect()
}

fn extract_group(sheet: &Sheet, options: &SeriesOptions, column: usize, label: String) -> SeriesGroup {
    let start_row = match options.start_row {
        StartRow::PerGroup => locate_start_row_from(sheet, column, options.header_row + 1),
        StartRow::Fixed(row) => Some(row.max(1)),
    };
    let value_column = column + options.value_offset;

    let mut time = Vec::new();
    let mut values = Vec::new();
    let mut rows = Vec::new();
    if let Some(start_row) = start_row {
        for row in start_row..=sheet.last_row() {
            let pair = sheet.value(row, column).as_number()
                .zip(sheet.value(row, value_column).as_number());
            if let Some((t, v)) = pair {
                time.push(t);
                values.push(v);
                rows.push(row);
            }
        }
    }
    debug_assert!(time.len() == values.len() && values.len() == rows.len());

    log::debug!("{}!{}: series '{}' from row {:?}, {} point(s)",
        sheet.name(), column, label, start_row, time.len());
    SeriesGroup { label, column, start_row, time, values, rows }
}
