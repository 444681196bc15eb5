// Copyright 2021 Twitter, Inc.
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Composition of the two-panel comparison figure.

mod marker;

pub use self::marker::{Marker, MarkerElement};

use crate::config::FigureConfig;
use crate::data::{Measurements, Operation, Structure};
use crate::pdf::font::text_width;
use crate::pdf::PdfBackend;
use crate::Error;

use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::{FontDesc, FontFamily, FontStyle};
use strum::IntoEnumIterator;

use std::path::Path;

macro_rules! hexcolour {
    ($colour:literal) => {
        RGBColor(
            (($colour & 0xFF0000) >> 16) as u8,
            (($colour & 0x00FF00) >> 8) as u8,
            ($colour & 0x0000FF) as u8,
        )
    };
}

/// Series colours, indexed by [`Structure::index`].
pub const COLOURS: &[RGBColor] = &[
    hexcolour!(0x1F77B4),
    hexcolour!(0xFF7F0E),
    hexcolour!(0x2CA02C),
    hexcolour!(0xD62728),
];

const FONT: FontFamily<'static> = FontFamily::SansSerif;

/// Half-length of the line segment drawn through legend markers.
const LEGEND_STEM: i32 = 10;

/// One labelled line of a panel.
#[derive(Clone, Debug, PartialEq)]
pub struct Series {
    structure: Structure,
    colour: RGBColor,
    points: Vec<(f64, f64)>,
}

impl Series {
    pub fn structure(&self) -> Structure {
        self.structure
    }

    pub fn label(&self) -> &'static str {
        self.structure.label()
    }

    pub fn marker(&self) -> Marker {
        self.structure.marker()
    }

    pub fn colour(&self) -> RGBColor {
        self.colour
    }

    pub fn points(&self) -> &[(f64, f64)] {
        &self.points
    }
}

/// One subplot: an operation's four series over a logarithmic x axis.
#[derive(Clone, Debug, PartialEq)]
pub struct Panel {
    operation: Operation,
    title: String,
    series: Vec<Series>,
    x_range: (f64, f64),
    y_range: (f64, f64),
}

impl Panel {
    fn new(measurements: &Measurements, operation: Operation, config: &FigureConfig) -> Self {
        let series = Structure::iter()
            .map(|structure| Series {
                structure,
                colour: COLOURS[structure.index()],
                points: measurements.points(operation, structure),
            })
            .collect();

        Self {
            operation,
            title: config.title(operation).to_string(),
            series,
            x_range: log_padded(measurements.sizes()),
            y_range: value_range(measurements, operation),
        }
    }

    pub fn operation(&self) -> Operation {
        self.operation
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn series(&self) -> &[Series] {
        &self.series
    }
}

/// Pads the size range by 5% of its decades on each side, or half a decade
/// when there is a single size.
fn log_padded(sizes: &[u64]) -> (f64, f64) {
    let lo = sizes.first().copied().unwrap_or(1).max(1) as f64;
    let hi = sizes.last().copied().unwrap_or(1).max(1) as f64;
    let decades = (hi / lo).log10();
    let pad = if decades > 0.0 { decades * 0.05 } else { 0.5 };
    (10f64.powf(lo.log10() - pad), 10f64.powf(hi.log10() + pad))
}

fn value_range(measurements: &Measurements, operation: Operation) -> (f64, f64) {
    let min = measurements
        .series(operation)
        .flat_map(|(_, values)| values.iter().copied())
        .fold(0.0, f64::min);
    let max = measurements.max(operation);
    if max <= min {
        (min, min + 1.0)
    } else {
        (min * 1.05, max * 1.05)
    }
}

/// Tick label for an input size.
fn format_size(n: f64) -> String {
    format!("{:.0}", n)
}

/// Tick label for a measured value. Spans narrower than ten get enough
/// decimals to tell neighbouring ticks apart.
fn format_value(v: f64, span: f64) -> String {
    if span >= 10.0 || span <= 0.0 {
        format!("{:.0}", v)
    } else {
        let decimals = (1.0 - span.log10()).ceil().max(1.0) as usize;
        format!("{:.*}", decimals, v)
    }
}

/// Width of the y label area: the widest tick label, the rotated axis label
/// and the tick marks.
fn y_label_area(config: &FigureConfig, (y0, y1): (f64, f64)) -> i32 {
    let span = y1 - y0;
    let tick = f64::from(config.tick_size());
    let widest = [y0, y1]
        .iter()
        .map(|v| text_width(&format_value(*v, span), tick))
        .fold(0.0, f64::max);
    widest.ceil() as i32 + config.label_size() as i32 + 16
}

fn font(size: u32) -> FontDesc<'static> {
    (FONT, f64::from(size)).into_font()
}

/// The complete figure, ready to be drawn onto any backend.
pub struct Figure {
    config: FigureConfig,
    panels: Vec<Panel>,
}

impl Figure {
    pub fn new(measurements: &Measurements, config: &FigureConfig) -> Self {
        let panels = Operation::iter()
            .map(|operation| Panel::new(measurements, operation, config))
            .collect();
        Self {
            config: config.clone(),
            panels,
        }
    }

    pub fn size(&self) -> (u32, u32) {
        self.config.size()
    }

    pub fn panels(&self) -> &[Panel] {
        &self.panels
    }

    /// Draws the panels side by side onto `root`.
    pub fn draw<DB: DrawingBackend>(
        &self,
        root: &DrawingArea<DB, Shift>,
    ) -> Result<(), DrawingAreaErrorKind<DB::ErrorType>> {
        root.fill(&WHITE)?;
        let areas = root.split_evenly((1, self.panels.len().max(1)));
        for (panel, area) in self.panels.iter().zip(areas.iter()) {
            debug!(
                "drawing panel `{}` x: {:.1}..{:.1} y: {:.1}..{:.1}",
                panel.title, panel.x_range.0, panel.x_range.1, panel.y_range.0, panel.y_range.1
            );
            self.draw_panel(panel, area)?;
        }
        Ok(())
    }

    fn draw_panel<DB: DrawingBackend>(
        &self,
        panel: &Panel,
        area: &DrawingArea<DB, Shift>,
    ) -> Result<(), DrawingAreaErrorKind<DB::ErrorType>> {
        let config = &self.config;
        let (x0, x1) = panel.x_range;
        let (y0, y1) = panel.y_range;
        let span = y1 - y0;

        let mut chart = ChartBuilder::on(area)
            .caption(
                panel.title(),
                font(config.title_size()).style(FontStyle::Bold),
            )
            .margin(8)
            .x_label_area_size((config.tick_size() + config.label_size() + 16) as i32)
            .y_label_area_size(y_label_area(config, panel.y_range))
            .build_cartesian_2d((x0..x1).log_scale(), y0..y1)?;

        chart
            .configure_mesh()
            .x_desc(config.x_label())
            .y_desc(config.y_label())
            .axis_desc_style(font(config.label_size()))
            .label_style(font(config.tick_size()))
            .x_label_formatter(&|n| format_size(*n))
            .y_label_formatter(&|v| format_value(*v, span))
            .bold_line_style(BLACK.mix(config.grid_alpha()).stroke_width(1))
            .light_line_style(TRANSPARENT)
            .draw()?;

        let size = config.marker_size();
        let width = config.line_width();
        for series in panel.series() {
            let colour = series.colour();
            let marker = series.marker();
            trace!(
                "series `{}` with {} points",
                series.label(),
                series.points().len()
            );

            chart
                .draw_series(LineSeries::new(
                    series.points().iter().copied(),
                    colour.stroke_width(width),
                ))?
                .label(series.label())
                .legend(move |(x, y)| {
                    marker
                        .at((x, y), size, colour.filled())
                        .with_stem(LEGEND_STEM, width)
                });
            chart.draw_series(
                series
                    .points()
                    .iter()
                    .map(|&point| marker.at(point, size, colour.filled())),
            )?;
        }

        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperLeft)
            .label_font(font(config.tick_size()))
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK.mix(0.3))
            .draw()?;

        Ok(())
    }

    /// Renders the figure as a PDF document at `path`.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), Error> {
        let root = self.backend(PdfBackend::new(path, self.size())).into_drawing_area();
        self.draw(&root)?;
        root.present()?;
        Ok(())
    }

    /// Renders the figure as PDF bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>, Error> {
        let mut buffer = Vec::new();
        {
            let root = self
                .backend(PdfBackend::with_buffer(&mut buffer, self.size()))
                .into_drawing_area();
            self.draw(&root)?;
            root.present()?;
        }
        Ok(buffer)
    }

    fn backend<'a>(&self, backend: PdfBackend<'a>) -> PdfBackend<'a> {
        backend
            .title("Data Structure Benchmark Results")
            .producer(concat!(env!("CARGO_PKG_NAME"), " ", env!("CARGO_PKG_VERSION")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Measurements {
        let sizes = vec![100, 1000, 10000];
        let series = |k: f64| vec![k, k * 2.0, k * 4.0];
        Measurements::new(
            sizes,
            [series(10.0), series(20.0), series(30.0), series(40.0)],
            [series(1.0), series(2.0), series(3.0), series(4.0)],
        )
        .unwrap()
    }

    fn pdf(figure: &Figure) -> String {
        String::from_utf8_lossy(&figure.to_bytes().unwrap()).into_owned()
    }

    #[test]
    fn two_panels_in_operation_order() {
        let figure = Figure::new(&Measurements::default(), &FigureConfig::default());
        let titles: Vec<_> = figure.panels().iter().map(|p| p.title()).collect();
        assert_eq!(
            titles,
            vec!["(a) Insert Performance", "(b) Lookup Performance"]
        );
        assert_eq!(figure.panels()[1].operation(), Operation::Lookup);
    }

    #[test]
    fn each_panel_has_four_distinct_series() {
        let figure = Figure::new(&sample(), &FigureConfig::default());
        for panel in figure.panels() {
            let labels: Vec<_> = panel.series().iter().map(|s| s.label()).collect();
            assert_eq!(labels, vec!["Linked List", "Hash Table", "RB-Tree", "XArray"]);

            let markers: Vec<_> = panel.series().iter().map(|s| s.marker()).collect();
            let colours: Vec<_> = panel.series().iter().map(|s| s.colour()).collect();
            for i in 0..markers.len() {
                for j in i + 1..markers.len() {
                    assert_ne!(markers[i], markers[j]);
                    assert_ne!(colours[i], colours[j]);
                }
            }
        }
    }

    #[test]
    fn series_follow_measurements() {
        let figure = Figure::new(&sample(), &FigureConfig::default());
        let rb_tree = &figure.panels()[1].series()[2];
        assert_eq!(rb_tree.structure(), Structure::RbTree);
        assert_eq!(
            rb_tree.points(),
            &[(100.0, 3.0), (1000.0, 6.0), (10000.0, 12.0)]
        );
    }

    #[test]
    fn x_range_is_padded_geometrically() {
        let (lo, hi) = log_padded(&[100, 10000]);
        assert!((lo - 10f64.powf(1.9)).abs() < 1e-9);
        assert!((hi - 10f64.powf(4.1)).abs() < 1e-6);

        let (lo, hi) = log_padded(&[1000]);
        assert!((lo * hi - 1e6).abs() < 1e-3);
        assert!(lo < 1000.0 && hi > 1000.0);
    }

    #[test]
    fn y_range_covers_values() {
        let m = sample();
        assert_eq!(value_range(&m, Operation::Insert), (0.0, 160.0 * 1.05));
        assert_eq!(value_range(&Measurements::default(), Operation::Lookup), (0.0, 1.0));
    }

    #[test]
    fn tick_labels() {
        assert_eq!(format_size(100.0), "100");
        assert_eq!(format_size(9999.999_999), "10000");
    }

    #[test]
    fn value_labels() {
        assert_eq!(format_value(20.0, 168.0), "20");
        assert_eq!(format_value(1234.5678, 5000.0), "1235");
        assert_eq!(format_value(0.5, 1.0), "0.5");
        assert_eq!(format_value(0.25, 0.5), "0.25");
    }

    #[test]
    fn y_label_area_fits_widest_label() {
        let config = FigureConfig::default();
        let narrow = y_label_area(&config, (0.0, 10.0));
        let wide = y_label_area(&config, (0.0, 100_000.0));
        let tick = f64::from(config.tick_size());
        let extra = text_width("100000", tick) - text_width("10", tick);
        assert!(wide > narrow);
        assert!(f64::from(wide - narrow) >= extra.floor());
    }

    #[test]
    fn value_ticks_are_integers() {
        let doc = pdf(&Figure::new(&sample(), &FigureConfig::default()));
        assert!(doc.contains("(0) Tj"));
        let ticks: Vec<_> = doc.lines().filter(|l| l.ends_with(" Tj")).collect();
        assert!(!ticks.is_empty());
        assert!(ticks.iter().all(|l| !l.contains('.')), "{:?}", ticks);
    }

    #[test]
    fn rendered_document_has_labels() {
        let doc = pdf(&Figure::new(&sample(), &FigureConfig::default()));
        assert!(doc.starts_with("%PDF-"));
        assert!(doc.contains("/MediaBox [0 0 720 288]"));
        assert!(doc.contains("(\\(a\\) Insert Performance) Tj"));
        assert!(doc.contains("(\\(b\\) Lookup Performance) Tj"));
        assert!(doc.contains("(Number of Entries \\(N\\)) Tj"));
        assert!(doc.contains("(Time per Operation \\(ns/op\\)) Tj"));
        for structure in Structure::iter() {
            let label = format!("({}) Tj", structure.label());
            assert_eq!(doc.matches(&label).count(), 2, "{}", structure.label());
        }
        assert!(doc.contains("(1000) Tj"));
    }

    #[test]
    fn rendering_is_deterministic() {
        let figure = Figure::new(&sample(), &FigureConfig::default());
        assert_eq!(figure.to_bytes().unwrap(), figure.to_bytes().unwrap());
    }

    #[test]
    fn figure_size_follows_config() {
        let mut config = FigureConfig::default();
        config.set_size(400, 200);
        let doc = pdf(&Figure::new(&Measurements::default(), &config));
        assert!(doc.contains("/MediaBox [0 0 400 200]"));
    }
}
