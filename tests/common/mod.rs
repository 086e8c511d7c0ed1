//! Builds small but complete .xlsx workbooks for the integration tests.

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

pub const MARKER: &str = "Physical time [s]";

/// Style index of a `yyyy-mm-dd` formatted cell
const DATE_STYLE: usize = 1;

const STYLES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
<numFmts count="1"><numFmt numFmtId="164" formatCode="yyyy\-mm\-dd"/></numFmts>
<cellXfs count="2"><xf numFmtId="0" fontId="0"/><xf numFmtId="164" fontId="0" applyNumberFormat="1"/></cellXfs>
</styleSheet>"#;

const CHARTSHEET: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<chartsheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetViews><sheetView workbookViewId="0"/></sheetViews></chartsheet>"#;

fn column_letters(mut column: usize) -> String {
    let mut letters = Vec::new();
    while column > 0 {
        let digit = (column - 1) % 26;
        letters.push((b'A' + digit as u8) as char);
        column = (column - 1) / 26;
    }
    letters.iter().rev().collect()
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

/// One worksheet, cells addressed 1-based like in the spreadsheet UI.
pub struct SheetXml {
    name: String,
    rows: BTreeMap<usize, BTreeMap<usize, String>>,
    /// Written as a chartsheet part instead of a worksheet
    is_chart: bool,
}

impl SheetXml {
    pub fn new(name: &str) -> Self {
        SheetXml {
            name: name.to_owned(),
            rows: BTreeMap::new(),
            is_chart: false,
        }
    }

    /// A tab holding only a chart, without cells
    pub fn chart(name: &str) -> Self {
        SheetXml {
            is_chart: true,
            ..SheetXml::new(name)
        }
    }

    fn cell(&mut self, row: usize, column: usize, attributes: &str, body: String) -> &mut Self {
        let reference = format!("{}{}", column_letters(column), row);
        let xml = format!(r#"<c r="{reference}"{attributes}>{body}</c>"#);
        self.rows.entry(row).or_default().insert(column, xml);
        self
    }

    pub fn number(&mut self, row: usize, column: usize, value: f64) -> &mut Self {
        self.cell(row, column, "", format!("<v>{value}</v>"))
    }

    pub fn text(&mut self, row: usize, column: usize, value: &str) -> &mut Self {
        self.cell(row, column, r#" t="inlineStr""#, format!("<is><t>{}</t></is>", escape(value)))
    }

    /// Reference into the workbook's shared string table
    pub fn shared(&mut self, row: usize, column: usize, index: usize) -> &mut Self {
        self.cell(row, column, r#" t="s""#, format!("<v>{index}</v>"))
    }

    /// Date serial number with a date number format
    pub fn date(&mut self, row: usize, column: usize, serial: f64) -> &mut Self {
        self.cell(row, column, &format!(r#" s="{DATE_STYLE}""#), format!("<v>{serial}</v>"))
    }

    pub fn error(&mut self, row: usize, column: usize, value: &str) -> &mut Self {
        self.cell(row, column, r#" t="e""#, format!("<v>{value}</v>"))
    }

    /// Styled but valueless cell, as left behind by formatting a range
    pub fn blank(&mut self, row: usize, column: usize) -> &mut Self {
        let reference = format!("{}{}", column_letters(column), row);
        self.rows.entry(row).or_default().insert(column, format!(r#"<c r="{reference}" s="0"/>"#));
        self
    }

    /// A time/value channel: marker and label in `header_row`, a units row
    /// below it, then `points` samples from `start` taken every `step` seconds.
    pub fn channel(&mut self, header_row: usize, column: usize, label: &str, start: usize, points: usize, step: f64) -> &mut Self {
        self.text(header_row, column, MARKER)
            .text(header_row, column + 1, label)
            .text(header_row + 1, column, "s")
            .text(header_row + 1, column + 1, "°C");
        for index in 0..points {
            self.number(start + index, column, index as f64 * step)
                .number(start + index, column + 1, 20.0 + index as f64 * 0.5);
        }
        self
    }

    fn to_xml(&self) -> String {
        let mut xml = String::from(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData>"#,
        );
        for (row, cells) in &self.rows {
            xml.push_str(&format!(r#"<row r="{row}">"#));
            for cell in cells.values() {
                xml.push_str(cell);
            }
            xml.push_str("</row>");
        }
        xml.push_str("</sheetData></worksheet>");
        xml
    }
}

/// Writes a workbook holding `sheets` in order, with `active` as the selected tab.
pub fn write_workbook(path: &Path, sheets: &[&SheetXml], shared_strings: &[&str], active: usize) {
    let mut zip = ZipWriter::new(File::create(path).unwrap());
    let options = SimpleFileOptions::default();

    let mut entries = Vec::new();
    let mut content_types = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="xml" ContentType="application/xml"/>"#,
    );
    let mut sheet_list = String::new();
    let mut relationships = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
    );
    for (index, sheet) in sheets.iter().enumerate() {
        let number = index + 1;
        let (folder, kind, content) = if sheet.is_chart {
            ("chartsheets", "chartsheet", CHARTSHEET.to_owned())
        } else {
            ("worksheets", "worksheet", sheet.to_xml())
        };
        content_types.push_str(&format!(
            r#"<Override PartName="/xl/{folder}/sheet{number}.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.{kind}+xml"/>"#
        ));
        sheet_list.push_str(&format!(
            r#"<sheet name="{}" sheetId="{number}" r:id="rId{number}"/>"#,
            escape(&sheet.name)
        ));
        relationships.push_str(&format!(
            r#"<Relationship Id="rId{number}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/{kind}" Target="{folder}/sheet{number}.xml"/>"#
        ));
        entries.push((format!("xl/{folder}/sheet{number}.xml"), content));
    }
    let styles_id = sheets.len() + 1;
    relationships.push_str(&format!(
        r#"<Relationship Id="rId{styles_id}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/>"#
    ));
    relationships.push_str("</Relationships>");
    content_types.push_str("</Types>");

    let workbook = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><workbookPr/><bookViews><workbookView activeTab="{active}"/></bookViews><sheets>{sheet_list}</sheets></workbook>"#
    );

    let mut shared = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><sst xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" count="{0}" uniqueCount="{0}">"#,
        shared_strings.len()
    );
    for text in shared_strings {
        shared.push_str(&format!("<si><t>{}</t></si>", escape(text)));
    }
    shared.push_str("</sst>");

    entries.push(("[Content_Types].xml".to_owned(), content_types));
    entries.push(("xl/workbook.xml".to_owned(), workbook));
    entries.push(("xl/_rels/workbook.xml.rels".to_owned(), relationships));
    entries.push(("xl/styles.xml".to_owned(), STYLES.to_owned()));
    if !shared_strings.is_empty() {
        entries.push(("xl/sharedStrings.xml".to_owned(), shared));
    }

    for (name, content) in entries {
        zip.start_file(name, options).unwrap();
        zip.write_all(content.as_bytes()).unwrap();
    }
    zip.finish().unwrap();
}

/// The layout written by the measurement software: a report sheet first,
/// then "Plot Data" with two channels starting at rows 12 and 15.
pub fn measurement_workbook(path: &Path) {
    let mut report = SheetXml::new("Report");
    report.shared(1, 1, 0).date(2, 1, 45000.0);

    let mut plot_data = SheetXml::new("Plot Data");
    plot_data
        .shared(1, 1, 1)
        .date(2, 3, 45000.0)
        .channel(4, 3, "Sensor A", 12, 50, 2.0)
        .channel(4, 7, "Sensor B", 15, 40, 2.0)
        .blank(70, 3)
        .blank(70, 4);

    write_workbook(path, &[&report, &plot_data], &["Test report", "Oven run 7"], 0);
}
