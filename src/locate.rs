//! Finding where the numbers start in a loosely structured sheet.

use crate::spreadsheet::sheet::Sheet;

/// First row (1-based) whose cell in `target_column` holds a number.
///
/// Rows are scanned from the top down to the last populated row. Empty cells,
/// text, booleans, dates and error values are skipped, so blank rows inside the
/// header block do not stop the scan. Returns `None` when no row qualifies.
pub fn locate_start_row(sheet: &Sheet, target_column: usize) -> Option<usize> {
    locate_start_row_from(sheet, target_column, 1)
}

/// Like [`locate_start_row`], starting the scan at `lower_bound` (1-based).
pub fn locate_start_row_from(sheet: &Sheet, target_column: usize, lower_bound: usize) -> Option<usize> {
    (lower_bound.max(1)..=sheet.last_row())
        .find(|row| sheet.value(*row, target_column).is_number())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spreadsheet::cell::CellValue;

    fn text(value: &str) -> CellValue {
        CellValue::Text(value.to_owned())
    }

    #[test]
    fn skips_text_header_rows() {
        let mut sheet = Sheet::new("", "");
        for row in 1..=3 {
            sheet.set(row, 2, text("N/A"));
        }
        sheet.set(4, 2, CellValue::Number(12.5));
        sheet.set(5, 2, CellValue::Number(13.0));

        assert_eq!(locate_start_row(&sheet, 2), Some(4));
    }

    #[test]
    fn blank_rows_do_not_terminate() {
        let mut sheet = Sheet::new("", "");
        sheet.set(1, 2, text("Header"));
        sheet.set(2, 5, text("unrelated"));
        sheet.set(9, 2, CellValue::Number(0.0));

        assert_eq!(locate_start_row(&sheet, 2), Some(9));
    }

    #[test]
    fn not_found_without_numbers() {
        let mut sheet = Sheet::new("", "");
        sheet.set(1, 2, text("a"));
        sheet.set(2, 2, CellValue::Boolean(true));
        sheet.set(3, 2, CellValue::Temporal("2023-03-15".to_owned()));
        sheet.set(4, 2, CellValue::Error("#N/A".to_owned()));
        sheet.set(5, 1, CellValue::Number(1.0));
        sheet.set(5, 3, CellValue::Number(1.0));

        assert_eq!(locate_start_row(&sheet, 2), None);
    }

    #[test]
    fn not_found_on_empty_sheet() {
        let sheet = Sheet::new("", "");
        assert_eq!(locate_start_row(&sheet, 2), None);
        assert_eq!(locate_start_row(&sheet, 0), None);
    }

    #[test]
    fn returns_minimal_row_for_every_column() {
        let mut sheet = Sheet::new("", "");
        let starts = [(1, 7), (2, 3), (3, 12), (4, 1)];
        for (column, start) in starts {
            for row in 1..start {
                sheet.set(row, column, text("unit"));
            }
            for row in start..=20 {
                sheet.set(row, column, CellValue::Number(row as f64));
            }
        }

        for (column, start) in starts {
            assert_eq!(locate_start_row(&sheet, column), Some(start));
        }
    }

    #[test]
    fn lower_bound_moves_the_scan() {
        let mut sheet = Sheet::new("", "");
        sheet.set(2, 3, CellValue::Number(1.0));
        sheet.set(4, 3, text("Physical time [s]"));
        sheet.set(12, 3, CellValue::Number(0.0));

        assert_eq!(locate_start_row_from(&sheet, 3, 0), Some(2));
        assert_eq!(locate_start_row_from(&sheet, 3, 2), Some(2));
        assert_eq!(locate_start_row_from(&sheet, 3, 5), Some(12));
        assert_eq!(locate_start_row_from(&sheet, 3, 13), None);
    }
}
