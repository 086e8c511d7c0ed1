use crate::error::SheetPlotError;
use crate::helpers::xml::XmlAttributeHelper;
use crate::helpers::xml::XmlNodeHelper;
use crate::helpers::xml::XmlReader;
use crate::helpers::xml::XmlTextContextHelper;
use crate::helpers::zip::ZipHelper;
use crate::match_xml_events;
use crate::spreadsheet::cell::Cell;
use crate::spreadsheet::cell::CellType;
use crate::spreadsheet::criteria::Criteria;
use crate::spreadsheet::reference::reference_to_index;
use crate::spreadsheet::reference::row_to_index;
use crate::spreadsheet::sheet::Sheet;
use crate::spreadsheet::Spreadsheet;
use crate::spreadsheet::SpreadsheetError;
use quick_xml::events::Event;
use quick_xml::name::QName;
use std::borrow::Cow;
use std::collections::HashMap;
use std::collections::HashSet;
use std::fs::File;
use std::io::BufRead;
use std::io::BufReader;
use std::path::Path;
use zip::ZipArchive;

// XML tag names for parsing Excel XLSX format
const TAG_RELATIONSHIP: &[u8] = b"Relationship";          // Package relationship
const TAG_CUSTOM_FORMATS: QName = QName(b"numFmts");     // Custom number formats container
const TAG_CUSTOM_FORMAT: QName = QName(b"numFmt");       // Individual custom number format
const TAG_FORMAT_INDEXES: QName = QName(b"cellXfs");     // Cell format indexes container
const TAG_FORMAT_INDEX: QName = QName(b"xf");            // Individual cell format index
const TAG_SHARED_STRING_ITEM: QName = QName(b"si");      // Shared string table item
const TAG_PHONETIC_TEXT: QName = QName(b"rPh");          // Phonetic text for Asian languages
const TAG_TEXT: QName = QName(b"t");                     // Text content within strings
const TAG_WORKBOOK_PROPERTIES: QName = QName(b"workbookPr"); // Workbook properties
const TAG_WORKBOOK_VIEW: QName = QName(b"workbookView"); // Window state, holds the active tab
const TAG_SHEET: QName = QName(b"sheet");                // Worksheet definition
const TAG_ROW: QName = QName(b"row");                    // Row in worksheet
const TAG_CELL: QName = QName(b"c");                     // Cell in worksheet
const TAG_INLINE_STRING: QName = QName(b"is");           // Inline string value
const TAG_VALUE: QName = QName(b"v");                    // Cell value content

type FileReader = BufReader<File>;

/// An Excel 2007+ workbook (.xlsx, .xlsm, .xlam)
pub(crate) struct XlsxSpreadsheet {
    /// File name of the spreadsheet
    pub(crate) name: String,
    zip: ZipArchive<FileReader>,
    /// Cell type per style index, from styles.xml
    number_formats: Vec<CellType>,
    /// Worksheets as (name, zip_path) pairs in workbook order
    sheets: Vec<(String, String)>,
    /// Index into `sheets` of the active tab
    active: usize,
}

impl XlsxSpreadsheet {
    /// Opens a workbook and parses its structure (sheets, date system, styles).
    pub(crate) fn open(path: &Path) -> Result<XlsxSpreadsheet, SheetPlotError> {
        let file_name = path.display().to_string();
        let mut zip = ZipArchive::new(BufReader::new(File::open(path)?))?;
        let workbook = load_workbook(&mut zip)?;
        if workbook.sheets.is_empty() {
            Err(SpreadsheetError::SpreadsheetEmptyError(file_name.to_owned()))?
        }
        let number_formats = load_number_formats(&mut zip, workbook.is_1904)?;
        log::debug!("{file_name}: {} sheet(s), {} style(s), 1904 dates: {}",
            workbook.sheets.len(), number_formats.len(), workbook.is_1904);
        Ok(XlsxSpreadsheet {
            name: file_name,
            zip,
            number_formats,
            active: workbook.active,
            sheets: workbook.sheets,
        })
    }
}

impl Spreadsheet for XlsxSpreadsheet {
    fn name(&self) -> String {
        self.name.to_owned()
    }

    fn sheet_names(&self) -> Vec<String> {
        self.sheets.iter().map(|(name, _)| name.to_owned()).collect()
    }

    fn active_sheet_name(&self) -> Option<String> {
        self.sheets.get(self.active).map(|(name, _)| name.to_owned())
    }

    fn load_shared_strings(&mut self, mut indexes: HashSet<usize>) -> Result<(Vec<String>, HashMap<usize, usize>), SheetPlotError> {
        let mut shared_strings = Vec::<String>::new();
        let mut mappings = HashMap::<usize, usize>::new();
        let mut reader = match self.zip.xml_reader("xl/sharedStrings.xml")? {
            Some(reader) => reader,
            None => return Ok((shared_strings, mappings)),
        };

        let mut id = 0usize;
        match_xml_events!(reader => {
            Event::Start(event) if event.name() == TAG_SHARED_STRING_ITEM => {
                if indexes.is_empty() {
                    break;
                }
                if indexes.remove(&id) {
                    let string = read_string_value(&mut reader, TAG_SHARED_STRING_ITEM, false)?;
                    mappings.insert(id, shared_strings.len());
                    shared_strings.push(string);
                }
                id += 1;
            }
        });
        Ok((shared_strings, mappings))
    }

    fn read_sheets(&mut self, criteria: &Criteria) -> Result<Vec<Sheet>, SheetPlotError> {
        let mut sheets = Vec::<Sheet>::new();
        for (sheet_name, zip_path) in &self.sheets {
            if criteria.sheet_limit.map(|limit| sheets.len() >= limit).unwrap_or(false) {
                break;
            } else if !criteria.accept(sheet_name) {
                continue;
            }

            let mut sheet = Sheet::new(&self.name, sheet_name);
            let mut row = 0usize;
            let mut col = 0usize;
            let mut next_row = 0usize;
            let mut next_col = 0usize;
            let mut kind = CellType::default();
            let mut value = String::new();
            let mut reader = self.zip.xml_reader(zip_path)?
                .ok_or_else(|| SpreadsheetError::FileError(zip_path.to_owned()))?;
            match_xml_events!(reader => {
                Event::Start(event) if event.name() == TAG_ROW => {
                    row = event.get_attribute_value("r")?
                        .and_then(|number| row_to_index(&number))
                        .unwrap_or(next_row);
                    next_row = row + 1;
                    next_col = 0;
                }
                Event::Start(event) if event.name() == TAG_CELL => {
                    (row, col) = event.get_attribute_value("r")?
                        .and_then(|reference| reference_to_index(&reference))
                        .unwrap_or((row, next_col));
                    next_col = col + 1;
                    value.clear();
                    let t = event.get_attribute_value("t")?;
                    let s = event.get_attribute_value("s")?;
                    kind = cell_type(&self.number_formats, t.as_deref(), s.as_deref())?;
                }
                Event::Start(event) if kind != CellType::Empty && event.name() == TAG_INLINE_STRING => {
                    value = read_string_value(&mut reader, TAG_INLINE_STRING, false)?;
                }
                Event::Start(event) if kind != CellType::Empty && event.name() == TAG_VALUE => {
                    value = read_string_value(&mut reader, TAG_VALUE, true)?;
                }
                Event::End(event) if event.name() == TAG_CELL => {
                    if kind != CellType::Empty && !value.is_empty() {
                        sheet.push(Cell {
                            row,
                            col,
                            kind,
                            value: std::mem::take(&mut value),
                        });
                    }
                    kind = CellType::Empty;
                }
            });
            log::debug!("{}!{}: {} cell(s), last row {}", self.name, sheet_name, sheet.cells.len(), sheet.last_row());
            sheets.push(sheet);
        }

        let indexes: HashSet<usize> = sheets.iter()
            .flat_map(|sheet| sheet.shared_string_indexes())
            .collect();
        if !indexes.is_empty() {
            let (shared_strings, mappings) = self.load_shared_strings(indexes)?;
            for sheet in &mut sheets {
                sheet.resolve_shared_strings(&shared_strings, &mappings);
            }
        }
        Ok(sheets)
    }
}

/// Cell type of a `<c>` element from its `t` and `s` attributes.
fn cell_type(number_formats: &[CellType], kind: Option<&str>, style: Option<&str>) -> Result<CellType, SheetPlotError> {
    let kind = match kind {
        Some("inlineStr") | Some("str") => CellType::InlineString,
        Some("s") => CellType::SharedString,
        Some("d") => CellType::IsoDateTime,
        Some("b") => CellType::Boolean,
        Some("e") => CellType::Error,
        _ => CellType::Number,
    };
    match style.filter(|style| kind == CellType::Number && !style.is_empty()) {
        Some(style) => {
            let index = style.parse::<usize>()?;
            Ok(number_formats.get(index).copied().unwrap_or(CellType::Number))
        }
        None => Ok(kind),
    }
}

/// Sheet list and workbook level properties from xl/workbook.xml
struct Workbook {
    /// (name, zip_path) pairs in workbook order
    sheets: Vec<(String, String)>,
    is_1904: bool,
    /// Index into `sheets` of the active tab
    active: usize,
}

/// Loads worksheet names, their part paths, the date system and the active tab.
fn load_workbook(zip: &mut ZipArchive<FileReader>) -> Result<Workbook, SheetPlotError> {
    let relationships = load_relationships(zip, "xl/_rels/workbook.xml.rels")?;
    let mut reader = zip.xml_reader("xl/workbook.xml")?
        .ok_or_else(|| SpreadsheetError::FileError("xl/workbook.xml".to_string()))?;
    let mut sheets: Vec<(String, String)> = Vec::new();
    // Every <sheet> in tab order, with its position in `sheets` when it is a worksheet
    let mut tabs: Vec<Option<usize>> = Vec::new();
    let mut is_1904 = false;
    let mut active_tab = 0usize;
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
            let worksheet = name.zip(id).and_then(|(name, id)| {
                relationships.get(&*id).map(|path| (name.to_string(), path.to_owned()))
            });
            match worksheet {
                Some(worksheet) => {
                    tabs.push(Some(sheets.len()));
                    sheets.push(worksheet);
                }
                None => tabs.push(None),
            }
        }
        Event::Start(event) if event.name() == TAG_WORKBOOK_PROPERTIES => {
            is_1904 = event.get_attribute_value("date1904")?
                .map(|value| value.eq("1") || value.eq("true"))
                .unwrap_or(false);
        }
        Event::Start(event) if event.name() == TAG_WORKBOOK_VIEW => {
            active_tab = event.get_attribute_value("activeTab")?
                .and_then(|value| value.parse::<usize>().ok())
                .unwrap_or(0);
        }
    });

    let active = match tabs.get(active_tab) {
        Some(Some(index)) => *index,
        _ => {
            log::debug!("Active tab {active_tab} is not a worksheet, using the first worksheet");
            0
        }
    };
    Ok(Workbook { sheets, is_1904, active })
}

/// Maps relationship IDs to worksheet part paths.
fn load_relationships(zip: &mut ZipArchive<FileReader>, path: &str) -> Result<HashMap<String, String>, SheetPlotError> {
    let mut reader = zip.xml_reader(path)?
        .ok_or_else(|| SpreadsheetError::FileError(path.to_string()))?;
    let mut relationships: HashMap<String, String> = HashMap::new();
    match_xml_events!(reader => {
        Event::Start(event) if event.local_name().as_ref() == TAG_RELATIONSHIP => {
            let id = event.get_attribute_value("Id")?;
            let kind = event.get_attribute_value("Type")?;
            let target = event.get_attribute_value("Target")?;
            if kind.map(|it| it.ends_with("/worksheet")).unwrap_or(true) {
                if let Some((id, target)) = id.zip(target) {
                    relationships.insert(id.to_string(), to_zip_path(&target));
                }
            }
        }
    });
    Ok(relationships)
}

/// Loads the cell type implied by each cell style (cellXfs entry) in xl/styles.xml.
fn load_number_formats(zip: &mut ZipArchive<FileReader>, is_1904: bool) -> Result<Vec<CellType>, SheetPlotError> {
    let mut reader = match zip.xml_reader("xl/styles.xml")? {
        Some(reader) => reader,
        None => return Ok(Vec::new()),
    };

    let mut custom_formats_context = false;
    let mut custom_formats = HashMap::<String, CellType>::new();
    let mut format_indexes_context = false;
    let mut format_indexes = Vec::<String>::new();

    match_xml_events!(reader => {
        Event::Start(event) if event.name() == TAG_CUSTOM_FORMATS => custom_formats_context = true,
        Event::End(event) if event.name() == TAG_CUSTOM_FORMATS => custom_formats_context = false,
        Event::Start(event) if custom_formats_context && event.name() == TAG_CUSTOM_FORMAT => {
            let id = event.get_attribute_value("numFmtId")?;
            let format = event.get_attribute_value("formatCode")?;
            if let Some((id, format)) = id.zip(format) {
                custom_formats.insert(id.to_string(), CellType::parse_custom_number_format(&format, is_1904));
            }
        }
        Event::Start(event) if event.name() == TAG_FORMAT_INDEXES => format_indexes_context = true,
        Event::End(event) if event.name() == TAG_FORMAT_INDEXES => break,
        Event::Start(event) if format_indexes_context && event.name() == TAG_FORMAT_INDEX => {
            format_indexes.push(event.get_attribute_value("numFmtId")?.unwrap_or_default().to_string());
        }
    });

    Ok(format_indexes
        .iter()
        .map(|id| {
            custom_formats
                .get(id)
                .copied()
                .or_else(|| CellType::parse_builtin_number_format_id(id, is_1904))
                .unwrap_or(CellType::Number)
        })
        .collect())
}

/// Normalizes a relationship target to a path inside the archive.
fn to_zip_path(path: &str) -> String {
    if let Some(stripped) = path.strip_prefix('/') {
        stripped.to_string()
    } else if path.starts_with("xl/") {
        path.to_string()
    } else {
        format!("xl/{path}")
    }
}

/// Reads string content up to `end_tag`, skipping phonetic runs.
/// Text is collected from `<t>` elements, or directly when `is_text_content`.
fn read_string_value<R: BufRead>(
    reader: &mut XmlReader<R>,
    end_tag: QName,
    is_text_content: bool,
) -> Result<String, SheetPlotError> {
    let mut is_phonetic_text = false;
    let mut is_text = is_text_content;
    let mut text = String::new();
    match_xml_events!(reader => {
        Event::End(event) if event.name() == end_tag => break,
        Event::Start(event) if event.name() == TAG_PHONETIC_TEXT => is_phonetic_text = true,
        Event::End(event) if event.name() == TAG_PHONETIC_TEXT => is_phonetic_text = false,
        Event::Start(event) if !is_phonetic_text && event.name() == TAG_TEXT => is_text = true,
        Event::End(event) if is_text && event.name() == TAG_TEXT => is_text = false,
        Event::Text(event) if is_text => text.push_str(&event.xml_content()?),
        Event::CData(event) if is_text => text.push_str(&event.xml_content()?),
        Event::GeneralRef(event) if is_text => text.push_bytes_ref(&event)?,
    });
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zip_paths() {
        assert_eq!(to_zip_path("worksheets/sheet1.xml"), "xl/worksheets/sheet1.xml");
        assert_eq!(to_zip_path("/xl/worksheets/sheet1.xml"), "xl/worksheets/sheet1.xml");
        assert_eq!(to_zip_path("xl/worksheets/sheet1.xml"), "xl/worksheets/sheet1.xml");
    }

    #[test]
    fn cell_types_from_attributes() {
        let formats = [CellType::Number, CellType::NumberDate1900];
        assert_eq!(cell_type(&formats, None, None).unwrap(), CellType::Number);
        assert_eq!(cell_type(&formats, Some("n"), Some("1")).unwrap(), CellType::NumberDate1900);
        assert_eq!(cell_type(&formats, Some("s"), Some("1")).unwrap(), CellType::SharedString);
        assert_eq!(cell_type(&formats, Some("str"), None).unwrap(), CellType::InlineString);
        assert_eq!(cell_type(&formats, Some("b"), None).unwrap(), CellType::Boolean);
        assert_eq!(cell_type(&formats, None, Some("9")).unwrap(), CellType::Number);
    }

    #[test]
    fn string_values_skip_phonetic_runs() -> Result<(), SheetPlotError> {
        let xml = "<si><r><t>Sensor</t></r><r><t xml:space=\"preserve\"> A</t></r><rPh><t>ignored</t></rPh></si>";
        let mut reader = XmlReader::new(xml.as_bytes());
        // consume the opening <si>
        reader.next()?;
        assert_eq!(read_string_value(&mut reader, TAG_SHARED_STRING_ITEM, false)?, "Sensor A");
        Ok(())
    }
}
