//! Chart requests: everything a plotting backend needs to draw one figure.
//!
//! Extraction code never talks to a plotting library. It builds a
//! [`ChartRequest`] and hands it to a [`ChartRenderer`].

use crate::error::SheetPlotError;
use crate::series::SeriesGroup;
use crate::statistics::StatisticsTable;
use serde::Serialize;
use std::io::Write;
use std::path::PathBuf;
use std::str::FromStr;

/// A font family with a point size.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Font {
    pub family: String,
    pub size: f64,
}

impl Font {
    pub fn new(family: &str, size: f64) -> Self {
        Font {
            family: family.to_owned(),
            size,
        }
    }
}

impl FromStr for Font {
    type Err = String;

    /// Parses `family:size`, e.g. `montserrat:10`.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let (family, size) = value
            .rsplit_once(':')
            .ok_or_else(|| format!("Expected FAMILY:SIZE, got '{value}'"))?;
        let size = size
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|size| *size > 0.0)
            .ok_or_else(|| format!("Invalid font size in '{value}'"))?;
        match family.trim() {
            "" => Err(format!("Missing font family in '{value}'")),
            family => Ok(Font::new(family, size)),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Fonts {
    /// Axis captions
    pub axis_label: Font,
    /// Value annotations inside the plot
    pub text: Font,
}

impl Default for Fonts {
    fn default() -> Self {
        Fonts {
            axis_label: Font::new("sans-serif", 12.0),
            text: Font::new("sans-serif", 10.0),
        }
    }
}

/// Figure size in inches.
#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
pub struct FigureSize {
    pub width: f64,
    pub height: f64,
}

impl Default for FigureSize {
    fn default() -> Self {
        FigureSize {
            width: 12.0,
            height: 6.0,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    /// One line per series group
    Lines,
    /// Min, mean and max bars per name
    Bars,
    /// Min, mean and max polygons over all names
    Radar,
}

/// The y value of one series at a highlighted x.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct HighlightValue {
    pub label: String,
    pub y: f64,
}

/// An x position called out on a line chart.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Highlight {
    pub x: f64,
    /// Draw a vertical guide line at `x`
    pub draw_line: bool,
    pub values: Vec<HighlightValue>,
}

impl Highlight {
    /// Looks `x` up in every group's own time sequence.
    /// Groups that never reach exactly `x` contribute no value.
    pub fn collect(groups: &[SeriesGroup], x: f64, draw_line: bool) -> Self {
        let values = groups
            .iter()
            .filter_map(|group| {
                group.value_at(x).map(|y| HighlightValue {
                    label: group.label().to_owned(),
                    y,
                })
            })
            .collect::<Vec<_>>();
        if values.is_empty() {
            log::debug!("No series has a sample at x={x}");
        }
        Highlight { x, draw_line, values }
    }
}

/// A complete description of one figure.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ChartRequest {
    title: String,
    kind: ChartKind,
    x_label: String,
    y_label: String,
    size: FigureSize,
    fonts: Fonts,
    grid: bool,
    /// Image path when the figure should be saved
    #[serde(skip_serializing_if = "Option::is_none")]
    output: Option<PathBuf>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    series: Vec<SeriesGroup>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    highlights: Vec<Highlight>,
    #[serde(skip_serializing_if = "Option::is_none")]
    statistics: Option<StatisticsTable>,
}

impl ChartRequest {
    fn new(title: &str, kind: ChartKind, x_label: &str) -> Self {
        ChartRequest {
            title: title.to_owned(),
            kind,
            x_label: x_label.to_owned(),
            y_label: "Temperature [°C]".to_owned(),
            size: FigureSize::default(),
            fonts: Fonts::default(),
            grid: true,
            output: None,
            series: Vec::new(),
            highlights: Vec::new(),
            statistics: None,
        }
    }

    /// Line chart of time/value series.
    pub fn lines(title: &str, groups: Vec<SeriesGroup>) -> Self {
        ChartRequest {
            series: groups,
            ..ChartRequest::new(title, ChartKind::Lines, "Time [s]")
        }
    }

    /// Grouped min/mean/max bars per name.
    pub fn bars(title: &str, table: StatisticsTable) -> Self {
        ChartRequest {
            statistics: Some(table),
            ..ChartRequest::new(title, ChartKind::Bars, "Runs")
        }
    }

    /// Min/mean/max polygons with one spoke per name.
    pub fn radar(title: &str, table: StatisticsTable) -> Self {
        ChartRequest {
            statistics: Some(table),
            ..ChartRequest::new(title, ChartKind::Radar, "Runs")
        }
    }

    pub fn with_size(mut self, size: FigureSize) -> Self {
        self.size = size;
        self
    }

    pub fn with_fonts(mut self, fonts: Fonts) -> Self {
        self.fonts = fonts;
        self
    }

    pub fn with_grid(mut self, grid: bool) -> Self {
        self.grid = grid;
        self
    }

    pub fn with_output(mut self, output: Option<PathBuf>) -> Self {
        self.output = output;
        self
    }

    pub fn with_highlights(mut self, highlights: Vec<Highlight>) -> Self {
        self.highlights = highlights;
        self
    }

    pub fn with_axis_labels(mut self, x_label: &str, y_label: &str) -> Self {
        self.x_label = x_label.to_owned();
        self.y_label = y_label.to_owned();
        self
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn kind(&self) -> ChartKind {
        self.kind
    }

    pub fn x_label(&self) -> &str {
        &self.x_label
    }

    pub fn y_label(&self) -> &str {
        &self.y_label
    }

    pub fn size(&self) -> FigureSize {
        self.size
    }

    pub fn fonts(&self) -> &Fonts {
        &self.fonts
    }

    pub fn grid(&self) -> bool {
        self.grid
    }

    pub fn output(&self) -> Option<&PathBuf> {
        self.output.as_ref()
    }

    pub fn series(&self) -> &[SeriesGroup] {
        &self.series
    }

    pub fn highlights(&self) -> &[Highlight] {
        &self.highlights
    }

    pub fn statistics(&self) -> Option<&StatisticsTable> {
        self.statistics.as_ref()
    }
}

/// Turns chart requests into output.
pub trait ChartRenderer {
    fn render(&mut self, request: &ChartRequest) -> Result<(), SheetPlotError>;
}

/// Writes every request as a single line of JSON.
pub struct JsonRenderer<W: Write> {
    writer: W,
}

impl<W: Write> JsonRenderer<W> {
    pub fn new(writer: W) -> Self {
        JsonRenderer { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> ChartRenderer for JsonRenderer<W> {
    fn render(&mut self, request: &ChartRequest) -> Result<(), SheetPlotError> {
        serde_json::to_writer(&mut self.writer, request)?;
        writeln!(self.writer)?;
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::series::extract_series_groups;
    use crate::spreadsheet::cell::CellValue;
    use crate::spreadsheet::sheet::Sheet;
    use pretty_assertions::assert_eq;
    use serde_json::Value;

    fn groups() -> Vec<SeriesGroup> {
        let mut sheet = Sheet::new("run.xlsx", "Plot Data");
        for (column, label, start) in [(1, "Sensor A", 12), (4, "Sensor B", 14)] {
            sheet.set(4, column, CellValue::Text("Physical time [s]".to_owned()));
            sheet.set(4, column + 1, CellValue::Text(label.to_owned()));
            for step in 0..5 {
                sheet.set(start + step, column, CellValue::Number(start as f64 + step as f64 * 2.0));
                sheet.set(start + step, column + 1, CellValue::Number(20.0 + step as f64));
            }
        }
        extract_series_groups(&sheet, 4, "Physical time [s]")
    }

    #[test]
    fn font_from_str() {
        assert_eq!("montserrat:10".parse::<Font>(), Ok(Font::new("montserrat", 10.0)));
        assert_eq!("DejaVu Sans: 11.5".parse::<Font>(), Ok(Font::new("DejaVu Sans", 11.5)));
        assert!("montserrat".parse::<Font>().is_err());
        assert!(":10".parse::<Font>().is_err());
        assert!("montserrat:big".parse::<Font>().is_err());
        assert!("montserrat:0".parse::<Font>().is_err());
    }

    #[test]
    fn line_chart_defaults() {
        let request = ChartRequest::lines("run.xlsx", groups());

        assert_eq!(request.kind(), ChartKind::Lines);
        assert_eq!(request.x_label(), "Time [s]");
        assert_eq!(request.y_label(), "Temperature [°C]");
        assert_eq!(request.size(), FigureSize { width: 12.0, height: 6.0 });
        assert_eq!(request.fonts().axis_label, Font::new("sans-serif", 12.0));
        assert_eq!(request.fonts().text, Font::new("sans-serif", 10.0));
        assert!(request.grid());
        assert_eq!(request.output(), None);
        assert_eq!(request.series().len(), 2);
    }

    #[test]
    fn bar_chart_defaults() {
        let request = ChartRequest::bars("Titel", StatisticsTable::default())
            .with_grid(false)
            .with_axis_labels("Runs", "Pressure [bar]");

        assert_eq!(request.kind(), ChartKind::Bars);
        assert_eq!(request.x_label(), "Runs");
        assert_eq!(request.y_label(), "Pressure [bar]");
        assert!(!request.grid());
        assert!(request.statistics().is_some());
        assert!(request.series().is_empty());
    }

    #[test]
    fn highlights_use_each_groups_own_time() {
        let groups = groups();

        // 16 is the third sample of Sensor A and the second of Sensor B
        let highlight = Highlight::collect(&groups, 16.0, true);
        assert_eq!(highlight.values, vec![
            HighlightValue { label: "Sensor A".to_owned(), y: 22.0 },
            HighlightValue { label: "Sensor B".to_owned(), y: 21.0 },
        ]);

        // 12 only exists in Sensor A
        let highlight = Highlight::collect(&groups, 12.0, false);
        assert_eq!(highlight.values.len(), 1);
        assert!(!highlight.draw_line);

        assert!(Highlight::collect(&groups, 13.0, true).values.is_empty());
    }

    #[test]
    fn json_renderer_writes_one_line_per_request() -> Result<(), SheetPlotError> {
        let groups = groups();
        let highlights = vec![Highlight::collect(&groups, 16.0, true)];
        let mut renderer = JsonRenderer::new(Vec::new());
        renderer.render(&ChartRequest::lines("run.xlsx", groups).with_highlights(highlights))?;
        renderer.render(&ChartRequest::radar("Summary", StatisticsTable::default()))?;

        let output = String::from_utf8(renderer.into_inner()).unwrap();
        let lines: Vec<Value> = output
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();

        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["kind"], "lines");
        assert_eq!(lines[0]["title"], "run.xlsx");
        assert_eq!(lines[0]["series"][1]["label"], "Sensor B");
        assert_eq!(lines[0]["series"][1]["start_row"], 14);
        assert_eq!(lines[0]["highlights"][0]["values"][0]["y"], 22.0);
        assert!(lines[0].get("output").is_none());
        assert_eq!(lines[1]["kind"], "radar");
        assert!(lines[1].get("series").is_none());
        assert_eq!(lines[1]["statistics"]["names"], Value::Array(Vec::new()));
        Ok(())
    }
}
