use crate::spreadsheet::cell::Cell;
use crate::spreadsheet::cell::CellType;
use crate::spreadsheet::cell::CellValue;
use std::collections::HashMap;
use std::collections::HashSet;

/// One worksheet held in memory as a sparse grid of populated cells.
///
/// Positions are 0-based internally. The public accessors take and return
/// 1-based row and column numbers, the way they appear in a spreadsheet UI:
/// `value(1, 1)` is cell A1.
#[derive(Clone, Debug, Default)]
pub struct Sheet {
    /// Source file name
    pub(crate) file_name: String,
    /// Sheet name
    pub(crate) name: String,
    /// All populated cells in insertion order
    pub(crate) cells: Vec<Cell>,
    /// (row, col) to position in `cells`
    indexes: HashMap<(usize, usize), usize>,
    /// Last populated row and column (0-based), determined from cell data
    pub(crate) row_upper_bound: Option<usize>,
    pub(crate) col_upper_bound: Option<usize>,
}

impl Sheet {
    /// Creates an empty sheet.
    pub fn new(file_name: &str, name: &str) -> Self {
        Self {
            file_name: file_name.to_owned(),
            name: name.to_owned(),
            ..Default::default()
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Returns true if the sheet contains no cells.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Last populated row (1-based), 0 for an empty sheet.
    pub fn last_row(&self) -> usize {
        self.row_upper_bound.map(|row| row + 1).unwrap_or(0)
    }

    /// Last populated column (1-based), 0 for an empty sheet.
    pub fn last_column(&self) -> usize {
        self.col_upper_bound.map(|col| col + 1).unwrap_or(0)
    }

    /// Value of the cell at a 1-based position. Row or column 0 and anything
    /// outside the populated area read as [`CellValue::Empty`].
    pub fn value(&self, row: usize, column: usize) -> CellValue {
        if row == 0 || column == 0 {
            return CellValue::Empty;
        }
        self.get(row - 1, column - 1)
            .map(Cell::to_value)
            .unwrap_or(CellValue::Empty)
    }

    /// Stores a value at a 1-based position, replacing what was there.
    /// Storing [`CellValue::Empty`] or using row/column 0 is a no-op.
    pub fn set(&mut self, row: usize, column: usize, value: CellValue) {
        if row == 0 || column == 0 {
            return;
        }
        let (kind, value) = match value {
            CellValue::Empty => return,
            CellValue::Number(number) => (CellType::Number, number.to_string()),
            CellValue::Boolean(flag) => (CellType::Boolean, if flag { "1" } else { "0" }.to_owned()),
            CellValue::Temporal(text) => (CellType::IsoDateTime, text),
            CellValue::Text(text) => (CellType::InlineString, text),
            CellValue::Error(text) => (CellType::Error, text),
        };
        self.push(Cell { row: row - 1, col: column - 1, kind, value });
    }

    /// Gets the cell at a 0-based position.
    pub(crate) fn get(&self, row: usize, col: usize) -> Option<&Cell> {
        self.indexes
            .get(&(row, col))
            .and_then(|index| self.cells.get(*index))
    }

    /// Adds a cell to the sheet, updating the data range.
    pub(crate) fn push(&mut self, cell: Cell) {
        self.update_bound(cell.row, cell.col);
        if let Some(index) = self.indexes.get(&(cell.row, cell.col)).copied() {
            self.cells[index] = cell;
        } else {
            self.indexes.insert((cell.row, cell.col), self.cells.len());
            self.cells.push(cell);
        }
    }

    /// Extends the populated area to include a cell position.
    fn update_bound(&mut self, row: usize, col: usize) {
        if self.row_upper_bound.map(|row_upper_bound| row_upper_bound < row).unwrap_or(true) {
            self.row_upper_bound = Some(row);
        }
        if self.col_upper_bound.map(|col_upper_bound| col_upper_bound < col).unwrap_or(true) {
            self.col_upper_bound = Some(col);
        }
    }

    /// Indexes into the shared string table referenced by this sheet.
    pub(crate) fn shared_string_indexes(&self) -> HashSet<usize> {
        self.cells
            .iter()
            .filter(|cell| cell.kind == CellType::SharedString)
            .filter_map(|cell| cell.value.parse::<usize>().ok())
            .collect()
    }

    /// Replaces shared string references with their text.
    /// `mappings` maps a shared string index to its position in `shared_strings`.
    pub(crate) fn resolve_shared_strings(&mut self, shared_strings: &[String], mappings: &HashMap<usize, usize>) {
        for cell in self.cells.iter_mut().filter(|cell| cell.kind == CellType::SharedString) {
            let text = cell.value
                .parse::<usize>()
                .ok()
                .and_then(|id| mappings.get(&id))
                .and_then(|index| shared_strings.get(*index));
            match text {
                Some(text) => {
                    cell.kind = CellType::InlineString;
                    cell.value = text.to_owned();
                }
                None => {
                    log::warn!("{}!{}: dangling shared string '{}'", self.name, cell.reference(), cell.value);
                    cell.kind = CellType::InlineString;
                    cell.value.clear();
                }
            }
        }
    }
}
