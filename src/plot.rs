//! Workbook to chart request, one workbook at a time.

use crate::chart::ChartRequest;
use crate::chart::FigureSize;
use crate::chart::Fonts;
use crate::chart::Highlight;
use crate::error::ResultMessage;
use crate::error::SheetPlotError;
use crate::series::extract_series;
use crate::series::SeriesOptions;
use crate::spreadsheet::open_spreadsheet;
use crate::spreadsheet::sheet::Sheet;
use crate::statistics::StatisticsOptions;
use crate::statistics::StatisticsTable;
use std::path::Path;
use std::path::PathBuf;

/// Sheet the measurement software writes its curves to.
pub const PLOT_DATA_SHEET: &str = "Plot Data";

/// Settings for [`line_chart`].
#[derive(Clone, Debug, PartialEq)]
pub struct LineChartSettings {
    /// Sheet to read; `None` reads the active sheet
    pub sheet: Option<String>,
    pub series: SeriesOptions,
    /// x values to call out
    pub highlights: Vec<f64>,
    pub draw_highlight_line: bool,
    pub grid: bool,
    /// Request an image next to the workbook
    pub save: bool,
    pub size: FigureSize,
    pub fonts: Fonts,
}

impl Default for LineChartSettings {
    fn default() -> Self {
        LineChartSettings {
            sheet: Some(PLOT_DATA_SHEET.to_owned()),
            series: SeriesOptions::default(),
            highlights: Vec::new(),
            draw_highlight_line: true,
            grid: true,
            save: false,
            size: FigureSize::default(),
            fonts: Fonts::default(),
        }
    }
}

/// Settings for [`bar_chart`].
#[derive(Clone, Debug, PartialEq)]
pub struct BarChartSettings {
    /// Sheet to read; `None` reads the active sheet
    pub sheet: Option<String>,
    pub statistics: StatisticsOptions,
    /// Radar instead of grouped bars
    pub radar: bool,
    /// Chart title; defaults to the workbook file name
    pub title: Option<String>,
    pub grid: bool,
    pub save: bool,
    pub size: FigureSize,
    pub fonts: Fonts,
}

impl Default for BarChartSettings {
    fn default() -> Self {
        BarChartSettings {
            sheet: None,
            statistics: StatisticsOptions::default(),
            radar: false,
            title: None,
            grid: true,
            save: false,
            size: FigureSize::default(),
            fonts: Fonts::default(),
        }
    }
}

/// Builds the line chart of every series group in the workbook at `path`.
/// The chart is titled with the workbook's file name.
pub fn line_chart(path: &Path, settings: &LineChartSettings) -> Result<ChartRequest, SheetPlotError> {
    let sheet = read_sheet(path, settings.sheet.as_deref())?;
    let groups = extract_series(&sheet, &settings.series).with_prefix(&path.display().to_string())?;
    let highlights = settings
        .highlights
        .iter()
        .map(|x| Highlight::collect(&groups, *x, settings.draw_highlight_line))
        .collect();
    log::info!("{}: {} series", path.display(), groups.len());

    Ok(ChartRequest::lines(&file_name(path), groups)
        .with_highlights(highlights)
        .with_grid(settings.grid)
        .with_size(settings.size)
        .with_fonts(settings.fonts.clone())
        .with_output(image_path(path, settings.save)))
}

/// Builds a bar (or radar) chart of the statistics table in the workbook at `path`.
pub fn bar_chart(path: &Path, settings: &BarChartSettings) -> Result<ChartRequest, SheetPlotError> {
    let sheet = read_sheet(path, settings.sheet.as_deref())?;
    let table = StatisticsTable::from_sheet(&sheet, &settings.statistics);
    let title = settings.title.clone().unwrap_or_else(|| file_name(path));
    let request = if settings.radar {
        ChartRequest::radar(&title, table)
    } else {
        ChartRequest::bars(&title, table)
    };
    Ok(request
        .with_grid(settings.grid)
        .with_size(settings.size)
        .with_fonts(settings.fonts.clone())
        .with_output(image_path(path, settings.save)))
}

fn read_sheet(path: &Path, name: Option<&str>) -> Result<Sheet, SheetPlotError> {
    let prefix = path.display().to_string();
    let mut spreadsheet = open_spreadsheet(path).with_prefix(&prefix)?;
    spreadsheet.read_sheet(name).with_prefix(&prefix)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// The workbook path with a `.png` extension, when saving.
fn image_path(path: &Path, save: bool) -> Option<PathBuf> {
    save.then(|| path.with_extension("png"))
}
