//! sheet-plot: chart requests from measurement workbooks

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use sheet_plot::*;
use std::io;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "sheet-plot")]
#[command(author, version, about = "Locate data in measurement workbooks and describe charts as JSON")]
struct Cli {
    /// Increase log output (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the first row whose cell in a column is numeric
    Locate {
        /// Workbook file (xlsx, xlsm, xlam)
        file: PathBuf,

        /// Sheet name (default: the active sheet)
        #[arg(short, long)]
        sheet: Option<String>,

        /// Column to scan (1-based); the second column holds the data in lab exports
        #[arg(short, long, default_value = "2")]
        column: usize,

        /// First row to look at (1-based)
        #[arg(long, default_value = "1")]
        from: usize,
    },

    /// Emit a line chart per workbook, one series per time marker
    Lines {
        /// Workbook file or directory searched recursively for *.xlsx
        path: PathBuf,

        /// Sheet holding the curves
        #[arg(short, long, default_value = "Plot Data")]
        sheet: String,

        /// Row holding the time markers (1-based)
        #[arg(long, default_value = "4")]
        header_row: usize,

        /// Text of a time marker cell
        #[arg(long, default_value = DEFAULT_MARKER)]
        marker: String,

        /// Read every series from this row instead of its first numeric row
        #[arg(long)]
        fixed_start_row: Option<usize>,

        /// Fail a workbook whose header row has no marker
        #[arg(long)]
        require_marker: bool,

        /// x value to call out; may be repeated
        #[arg(long = "highlight", value_name = "X")]
        highlights: Vec<f64>,

        /// Do not draw guide lines at highlighted x values
        #[arg(long)]
        no_highlight_line: bool,

        #[command(flatten)]
        figure: FigureArgs,
    },

    /// Emit a bar (or radar) chart of a name/min/mean/max table
    Bars {
        /// Workbook file
        file: PathBuf,

        /// Sheet name (default: the active sheet)
        #[arg(short, long)]
        sheet: Option<String>,

        /// Table position, names in the first column
        #[arg(long, default_value = "A2:D", value_parser = parse_statistics_range)]
        range: StatisticsOptions,

        /// Radar chart instead of grouped bars
        #[arg(long)]
        radar: bool,

        /// Chart title (default: the file name)
        #[arg(long)]
        title: Option<String>,

        #[command(flatten)]
        figure: FigureArgs,
    },
}

#[derive(Args)]
struct FigureArgs {
    /// Hide the grid
    #[arg(long)]
    no_grid: bool,

    /// Ask for a .png image next to each workbook
    #[arg(long)]
    save: bool,

    /// Figure width in inches
    #[arg(long, default_value = "12")]
    width: f64,

    /// Figure height in inches
    #[arg(long, default_value = "6")]
    height: f64,

    /// Axis label font as FAMILY:SIZE
    #[arg(long, default_value = "sans-serif:12")]
    axis_font: Font,

    /// Annotation font as FAMILY:SIZE
    #[arg(long, default_value = "sans-serif:10")]
    text_font: Font,
}

impl FigureArgs {
    fn size(&self) -> FigureSize {
        FigureSize {
            width: self.width,
            height: self.height,
        }
    }

    fn fonts(&self) -> Fonts {
        Fonts {
            axis_label: self.axis_font.clone(),
            text: self.text_font.clone(),
        }
    }
}

fn parse_statistics_range(value: &str) -> Result<StatisticsOptions, String> {
    StatisticsOptions::try_from(value).map_err(|e| e.to_string())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    match cli.command {
        Commands::Locate {
            file,
            sheet,
            column,
            from,
        } => locate(&file, sheet.as_deref(), column, from),
        Commands::Lines {
            path,
            sheet,
            header_row,
            marker,
            fixed_start_row,
            require_marker,
            highlights,
            no_highlight_line,
            figure,
        } => {
            let settings = LineChartSettings {
                sheet: Some(sheet),
                series: SeriesOptions {
                    header_row,
                    marker,
                    start_row: fixed_start_row.map(StartRow::Fixed).unwrap_or_default(),
                    require_marker,
                    ..Default::default()
                },
                highlights,
                draw_highlight_line: !no_highlight_line,
                grid: !figure.no_grid,
                save: figure.save,
                size: figure.size(),
                fonts: figure.fonts(),
            };
            lines(&path, &settings)
        }
        Commands::Bars {
            file,
            sheet,
            range,
            radar,
            title,
            figure,
        } => {
            let settings = BarChartSettings {
                sheet,
                statistics: range,
                radar,
                title,
                grid: !figure.no_grid,
                save: figure.save,
                size: figure.size(),
                fonts: figure.fonts(),
            };
            bars(&file, &settings)
        }
    }
}

fn locate(file: &Path, sheet: Option<&str>, column: usize, from: usize) -> Result<()> {
    let mut spreadsheet =
        open_spreadsheet(file).with_context(|| format!("Failed to open '{}'", file.display()))?;
    let sheet = spreadsheet
        .read_sheet(sheet)
        .with_context(|| format!("Failed to read '{}'", file.display()))?;

    match locate_start_row_from(&sheet, column, from) {
        Some(row) => println!("{row}"),
        None => println!("not found"),
    }
    Ok(())
}

fn lines(path: &Path, settings: &LineChartSettings) -> Result<()> {
    let workbooks = collect_workbooks(path)
        .with_context(|| format!("Failed to list workbooks in '{}'", path.display()))?;
    if workbooks.is_empty() {
        log::warn!("No workbooks found in '{}'", path.display());
        return Ok(());
    }

    let mut renderer = JsonRenderer::new(io::stdout().lock());
    let report = run_batch(&workbooks, |workbook| {
        let request = line_chart(workbook, settings)?;
        renderer.render(&request)
    });
    finish(report)
}

fn bars(file: &Path, settings: &BarChartSettings) -> Result<()> {
    let request = bar_chart(file, settings)?;
    JsonRenderer::new(io::stdout().lock())
        .render(&request)
        .context("Failed to write chart request")?;
    Ok(())
}

/// Failures were already logged by `run_batch`; only the count is reported here.
fn finish(report: BatchReport) -> Result<()> {
    if !report.is_success() {
        bail!(
            "{} of {} workbook(s) failed",
            report.failed.len(),
            report.failed.len() + report.succeeded.len()
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn locate_defaults_to_second_column() {
        let cli = Cli::parse_from(["sheet-plot", "locate", "run.xlsx"]);
        match cli.command {
            Commands::Locate { sheet, column, from, .. } => {
                assert_eq!(sheet, None);
                assert_eq!(column, 2);
                assert_eq!(from, 1);
            }
            _ => panic!("expected the locate command"),
        }

        let cli = Cli::parse_from(["sheet-plot", "locate", "run.xlsx", "-c", "7", "--from", "5"]);
        match cli.command {
            Commands::Locate { column, from, .. } => assert_eq!((column, from), (7, 5)),
            _ => panic!("expected the locate command"),
        }
    }

    #[test]
    fn failed_workbooks_fail_the_run() {
        let succeeded = BatchReport {
            succeeded: vec![PathBuf::from("a.xlsx")],
            failed: Vec::new(),
        };
        assert!(finish(succeeded).is_ok());

        let failed = BatchReport {
            succeeded: vec![PathBuf::from("a.xlsx")],
            failed: vec![(PathBuf::from("b.xlsx"), SheetPlotError::WithContextError("broken".to_owned()))],
        };
        assert_eq!(finish(failed).unwrap_err().to_string(), "1 of 2 workbook(s) failed");
    }

    #[test]
    fn lines_defaults() {
        let cli = Cli::parse_from(["sheet-plot", "lines", "runs", "--highlight", "200", "--highlight", "52"]);
        match cli.command {
            Commands::Lines { sheet, header_row, marker, highlights, figure, .. } => {
                assert_eq!(sheet, "Plot Data");
                assert_eq!(header_row, 4);
                assert_eq!(marker, DEFAULT_MARKER);
                assert_eq!(highlights, vec![200.0, 52.0]);
                assert_eq!(figure.fonts(), Fonts::default());
                assert_eq!(figure.size(), FigureSize::default());
            }
            _ => panic!("expected the lines command"),
        }
    }

    #[test]
    fn bars_range() {
        let cli = Cli::parse_from(["sheet-plot", "-v", "bars", "stapel.xlsx", "--range", "B3:E", "--radar"]);
        assert_eq!(cli.verbose, 1);
        match cli.command {
            Commands::Bars { range, radar, .. } => {
                assert_eq!(range, StatisticsOptions { first_row: 3, last_row: None, first_column: 2 });
                assert!(radar);
            }
            _ => panic!("expected the bars command"),
        }
    }
}
