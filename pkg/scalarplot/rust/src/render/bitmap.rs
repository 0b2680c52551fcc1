// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

//! PNG output through `plotters`.

use std::collections::HashMap;
use std::ops::Range;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, OnceLock};

use log::debug;
use plotters::prelude::*;

use super::{ChartBackend, ChartSeries, ChartSpec};
use crate::errors::{Error, IoContext, Result};
use crate::fonts::FontFace;

const TITLE_SCALE: f64 = 1.2;
const LEGEND_LINE_PX: i32 = 20;
const Y_PADDING: f64 = 0.05;

/// Font files already handed to plotters, keyed by path.
///
/// plotters can only draw with fonts registered in its process-wide table, so
/// each file is registered under a name derived from its path. Family names
/// chosen by users never reach that table.
static REGISTERED_FONTS: OnceLock<Mutex<HashMap<PathBuf, String>>> = OnceLock::new();

fn plotters_family(face: &FontFace) -> Result<String> {
    let registered = REGISTERED_FONTS.get_or_init(|| Mutex::new(HashMap::new()));
    let mut registered = registered.lock().map_err(|_| Error::Render {
        reason: "font table lock poisoned".to_string(),
    })?;
    if let Some(name) = registered.get(&face.path) {
        return Ok(name.clone());
    }

    let bytes = std::fs::read(&face.path)
        .io_context(|| format!("failed to read font {}", face.path.display()))?;
    let name = format!("scalar-plot:{}", face.path.display());
    let bytes: &'static [u8] = Box::leak(bytes.into_boxed_slice());
    plotters::style::register_font(&name, FontStyle::Normal, bytes).map_err(|_| Error::Font {
        path: face.path.clone(),
        reason: "not a valid TrueType/OpenType font".to_string(),
    })?;

    debug!("Loaded font {} from {}", face.family, face.path.display());
    registered.insert(face.path.clone(), name.clone());
    Ok(name)
}

/// Draws charts as PNG files with `plotters`' bitmap backend.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlottersBackend;

impl PlottersBackend {
    pub fn new() -> Self {
        Self
    }
}

impl ChartBackend for PlottersBackend {
    fn draw(&self, chart: &ChartSpec, path: &Path) -> Result<()> {
        let face = chart.style.font.as_ref().ok_or_else(|| Error::Render {
            reason: "no font available, upload a .ttf/.otf file or configure font_dirs"
                .to_string(),
        })?;
        let family = plotters_family(face)?;

        draw_png(chart, path, &family).map_err(|e| Error::Render {
            reason: format!("{}: {e}", chart.title),
        })
    }
}

#[allow(clippy::cast_possible_truncation)]
fn draw_png(
    chart: &ChartSpec,
    path: &Path,
    family: &str,
) -> std::result::Result<(), Box<dyn std::error::Error>> {
    let style = &chart.style;
    let font = FontDesc::new(FontFamily::Name(family), style.font_size_px, FontStyle::Normal);
    let title_font = FontDesc::new(
        FontFamily::Name(family),
        style.font_size_px * TITLE_SCALE,
        FontStyle::Normal,
    );
    let font_px = style.font_size_px.round().max(1.0) as u32;
    let line_width = style.line_width_px;

    let (x_range, y_range) = data_ranges(&chart.series);

    let root = BitMapBackend::new(path, (style.width_px, style.height_px)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut ctx = ChartBuilder::on(&root)
        .caption(&chart.title, title_font)
        .margin(font_px)
        .x_label_area_size(font_px * 3)
        .y_label_area_size(font_px * 5)
        .build_cartesian_2d(x_range, y_range)?;

    let mut mesh = ctx.configure_mesh();
    mesh.x_desc(chart.x_label.as_str())
        .y_desc(chart.y_label.as_str())
        .label_style(font.clone())
        .axis_desc_style(font.clone());
    if !style.show_grid {
        mesh.disable_mesh();
    }
    mesh.draw()?;

    for series in &chart.series {
        let color = RGBColor(series.color.0, series.color.1, series.color.2);
        ctx.draw_series(LineSeries::new(
            series.points.iter().copied(),
            color.stroke_width(line_width),
        ))?
        .label(series.label.as_str())
        .legend(move |(x, y)| {
            PathElement::new(
                vec![(x, y), (x + LEGEND_LINE_PX, y)],
                color.stroke_width(line_width),
            )
        });
    }

    ctx.configure_series_labels()
        .label_font(font)
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .position(SeriesLabelPosition::UpperRight)
        .draw()?;

    root.present()?;
    Ok(())
}

/// Axis ranges covering every point, widened when the data is a single value.
fn data_ranges(series: &[ChartSeries]) -> (Range<f64>, Range<f64>) {
    let points = || series.iter().flat_map(|s| s.points.iter());
    let x = span(points().map(|(x, _)| *x)).unwrap_or((0.0, 1.0));
    let y = span(points().map(|(_, y)| *y)).unwrap_or((0.0, 1.0));

    let x_range = if x.0 == x.1 {
        (x.0 - 1.0)..(x.1 + 1.0)
    } else {
        x.0..x.1
    };
    let y_pad = if y.0 == y.1 {
        (y.0.abs() * 0.1).max(0.5)
    } else {
        (y.1 - y.0) * Y_PADDING
    };
    (x_range, (y.0 - y_pad)..(y.1 + y_pad))
}

fn span(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    values
        .filter(|v| v.is_finite())
        .fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
}
