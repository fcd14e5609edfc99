//! Bar charts of the most frequent k-mers.
//!
//! The pipeline hands a [`BarChart`] to a [`PlotSink`]. The default sink draws
//! horizontal bars on the terminal; [`SvgPlot`] saves an SVG file per chart.

use std::{
    io::Write,
    path::{Path, PathBuf},
};

use clap::ValueEnum;
use colored::Colorize;
use svg::node::element::{Group, Rectangle, Text};

use crate::{
    error::KmerStatError, format::ReportFormat, kmer::KmerLength, table::FrequencyTable,
};

/// An ordered list of labelled bars for one k-mer size.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BarChart {
    pub title: String,
    pub k: KmerLength,
    pub bars: Vec<(String, u64)>,
}

impl BarChart {
    /// Chart of the `n` highest-count rows of `table`.
    pub fn top_kmers(table: &FrequencyTable, k: KmerLength, n: usize) -> Self {
        let bars: Vec<_> = table
            .top(n)
            .rows()
            .iter()
            .map(|r| (r.kmer.clone(), r.count))
            .collect();
        Self {
            title: format!("Top {} k-mers (k={k})", bars.len()),
            k,
            bars,
        }
    }

    fn max_value(&self) -> u64 {
        self.bars.iter().map(|(_, v)| *v).max().unwrap_or(0)
    }
}

/// Destination for rendered charts.
pub trait PlotSink {
    fn render(&mut self, chart: &BarChart) -> Result<(), KmerStatError>;
}

/// Where the CLI sends charts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum PlotMode {
    /// Draw bars on standard output.
    #[default]
    Terminal,
    /// Save an SVG file per k-mer size in the output directory.
    Svg,
    /// Skip plotting.
    None,
}

/// Discards every chart.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoPlot;

impl PlotSink for NoPlot {
    fn render(&mut self, _chart: &BarChart) -> Result<(), KmerStatError> {
        Ok(())
    }
}

/// Text bar chart written to any [`Write`].
#[derive(Debug)]
pub struct TerminalPlot<W> {
    out: W,
    width: usize,
    color: bool,
}

impl<W: Write> TerminalPlot<W> {
    pub const fn new(out: W) -> Self {
        Self {
            out,
            width: 50,
            color: true,
        }
    }

    #[must_use]
    pub const fn width(mut self, width: usize) -> Self {
        self.width = width;
        self
    }

    #[must_use]
    pub const fn color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    #[allow(
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss
    )]
    fn bar_len(&self, value: u64, max: u64) -> usize {
        if max == 0 {
            return 0;
        }
        let len = (value as f64 / max as f64 * self.width as f64).round() as usize;
        len.max(usize::from(value > 0))
    }
}

impl<W: Write> PlotSink for TerminalPlot<W> {
    fn render(&mut self, chart: &BarChart) -> Result<(), KmerStatError> {
        let max = chart.max_value();
        let label_width = chart.bars.iter().map(|(l, _)| l.len()).max().unwrap_or(0);
        let mut text = String::new();

        let title = if self.color {
            chart.title.bold().to_string()
        } else {
            chart.title.clone()
        };
        text.push_str(&title);
        text.push('\n');
        for (label, value) in &chart.bars {
            let bar = "█".repeat(self.bar_len(*value, max));
            let bar = if self.color {
                bar.green().to_string()
            } else {
                bar
            };
            text.push_str(&format!("{label:<label_width$} {bar} {value}\n"));
        }

        self.out
            .write_all(text.as_bytes())
            .and_then(|()| self.out.flush())
            .map_err(|e| KmerStatError::Plot {
                details: e.to_string(),
            })
    }
}

const SVG_WIDTH: usize = 900;
const BAR_HEIGHT: usize = 14;
const BAR_GAP: usize = 4;
const LABEL_WIDTH: usize = 300;
const MARGIN: usize = 30;

/// Saves each chart as `kmer_top{n}_k{k}.svg` in a directory.
#[derive(Debug, Clone)]
pub struct SvgPlot {
    dir: PathBuf,
    saved: Vec<PathBuf>,
}

impl SvgPlot {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            saved: Vec::new(),
        }
    }

    /// Files written so far, in render order.
    pub fn saved(&self) -> &[PathBuf] {
        &self.saved
    }

    /// The file a chart will be written to.
    pub fn path_for(&self, chart: &BarChart) -> PathBuf {
        let name = format!("kmer_top{}_k{}.svg", chart.bars.len(), chart.k);
        self.dir.join(name)
    }

    pub fn document(chart: &BarChart) -> svg::Document {
        let max = chart.max_value().max(1);
        let plot_width = SVG_WIDTH - LABEL_WIDTH - 2 * MARGIN;
        let height = 2 * MARGIN + chart.bars.len() * (BAR_HEIGHT + BAR_GAP);

        let title = Text::new()
            .add(svg::node::Text::new(chart.title.as_str()))
            .set("x", MARGIN)
            .set("y", MARGIN / 2 + 5)
            .set("font-size", 14);

        let mut bars = Group::new()
            .set("font-family", "monospace")
            .set("font-size", 11);
        for (i, (label, value)) in chart.bars.iter().enumerate() {
            let y = MARGIN + i * (BAR_HEIGHT + BAR_GAP);
            #[allow(clippy::cast_precision_loss)]
            let width = *value as f64 / max as f64 * plot_width as f64;
            bars = bars
                .add(
                    Text::new()
                        .add(svg::node::Text::new(label.as_str()))
                        .set("x", MARGIN)
                        .set("y", y + BAR_HEIGHT - 3),
                )
                .add(
                    Rectangle::new()
                        .set("x", MARGIN + LABEL_WIDTH)
                        .set("y", y)
                        .set("width", width)
                        .set("height", BAR_HEIGHT)
                        .set("fill", "steelblue"),
                )
                .add(
                    Text::new()
                        .add(svg::node::Text::new(value.to_string()))
                        .set("x", width + (MARGIN + LABEL_WIDTH + 4) as f64)
                        .set("y", y + BAR_HEIGHT - 3),
                );
        }

        svg::Document::new()
            .set("viewBox", (0, 0, SVG_WIDTH, height))
            .set("width", SVG_WIDTH)
            .set("height", height)
            .add(title)
            .add(bars)
    }
}

impl PlotSink for SvgPlot {
    fn render(&mut self, chart: &BarChart) -> Result<(), KmerStatError> {
        let path = self.path_for(chart);
        svg::save(&path, &Self::document(chart)).map_err(KmerStatError::write(&path))?;
        tracing::info!(path = %path.display(), "saved plot");
        self.saved.push(path);
        Ok(())
    }
}

/// Builds the sink for a [`PlotMode`], writing SVG files under `dir`.
///
/// Terminal charts share standard output with the report only when the
/// report is a human-readable table; otherwise they go to standard error.
pub fn sink_for(mode: PlotMode, dir: &Path, report: ReportFormat) -> Box<dyn PlotSink> {
    match (mode, report.is_machine_readable()) {
        (PlotMode::Terminal, false) => Box::new(TerminalPlot::new(std::io::stdout())),
        (PlotMode::Terminal, true) => Box::new(TerminalPlot::new(std::io::stderr())),
        (PlotMode::Svg, _) => Box::new(SvgPlot::new(dir)),
        (PlotMode::None, _) => Box::new(NoPlot),
    }
}
