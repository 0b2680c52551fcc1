// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

//! Turns selected series into chart images.
//!
//! The pipeline resolves the selected display labels back to catalog entries,
//! groups them into charts, fetches and smooths each series, assigns colors
//! and hands a finished `ChartSpec` to a `ChartBackend` for drawing. Individual
//! series or charts that fail are logged and skipped; a render call always
//! returns the charts that were written.

pub mod bitmap;

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use log::{debug, error, info, warn};
use serde::Deserialize;

use crate::catalog::{Catalog, CatalogEntry};
use crate::errors::{IoContext, Result};
use crate::events::ScalarSource;
use crate::fonts::{FontFace, FontResolver};
use crate::labels::{Mapping, display_name, resolve_catalog_key};
use crate::palette::{ColorCycle, Rgb, parse_color};
use crate::smoothing::smooth;

pub const DEFAULT_X_LABEL: &str = "Step";
pub const DEFAULT_Y_LABEL: &str = "Value";
pub const DEFAULT_DPI: u32 = 100;
pub const DEFAULT_FONT_SIZE: u32 = 12;
/// Figure size in inches; the pixel size is this times the DPI.
pub const DEFAULT_FIGURE_SIZE: (f64, f64) = (10.0, 6.0);
const IMAGE_EXTENSION: &str = "png";
const POINTS_PER_INCH: f64 = 72.0;
const LINE_WIDTH_PT: f64 = 1.5;

/// How selections are split into charts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupingMode {
    /// One chart per series name, overlaying that series from every file.
    #[default]
    PerMetric,
    /// One chart per selected series.
    PerSeries,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlotOptions {
    pub x_label: Option<String>,
    pub y_label: Option<String>,
    pub dpi: u32,
    pub smoothing: usize,
    pub show_grid: bool,
    pub font_family: Option<String>,
    /// Font size in points.
    pub font_size: u32,
    pub grouping: GroupingMode,
    pub figure_size: (f64, f64),
}

impl Default for PlotOptions {
    fn default() -> Self {
        Self {
            x_label: None,
            y_label: None,
            dpi: DEFAULT_DPI,
            smoothing: 1,
            show_grid: true,
            font_family: None,
            font_size: DEFAULT_FONT_SIZE,
            grouping: GroupingMode::default(),
            figure_size: DEFAULT_FIGURE_SIZE,
        }
    }
}

/// Everything a render call needs besides the catalog.
#[derive(Debug, Clone, Default)]
pub struct RenderRequest {
    /// Selected display labels (custom titles or display keys).
    pub selections: Vec<String>,
    /// Display key -> custom label.
    pub titles: Mapping,
    /// Display key or display label -> color string.
    pub colors: Mapping,
    pub options: PlotOptions,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChartStyle {
    pub width_px: u32,
    pub height_px: u32,
    pub font: Option<FontFace>,
    pub font_size_px: f64,
    pub line_width_px: u32,
    pub show_grid: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChartSeries {
    pub label: String,
    pub color: Rgb,
    /// `(step, smoothed value)` pairs.
    pub points: Vec<(f64, f64)>,
}

/// A fully resolved chart, ready to be drawn.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSpec {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub series: Vec<ChartSeries>,
    pub style: ChartStyle,
}

/// Draws a chart into an image file.
pub trait ChartBackend {
    fn draw(&self, chart: &ChartSpec, path: &Path) -> Result<()>;
}

/// A selection resolved to its catalog entry and legend label.
struct Selected<'a> {
    entry: &'a CatalogEntry,
    label: String,
}

struct Group<'a> {
    name: String,
    members: Vec<Selected<'a>>,
}

pub struct Renderer<'a> {
    source: &'a dyn ScalarSource,
    backend: &'a dyn ChartBackend,
    fonts: &'a FontResolver,
}

impl<'a> Renderer<'a> {
    pub fn new(
        source: &'a dyn ScalarSource,
        backend: &'a dyn ChartBackend,
        fonts: &'a FontResolver,
    ) -> Self {
        Self {
            source,
            backend,
            fonts,
        }
    }

    /// Renders `request` against `catalog` into `output_dir`, returning the
    /// written image paths in chart order.
    pub fn render(
        &self,
        catalog: &Catalog,
        request: &RenderRequest,
        output_dir: &Path,
    ) -> Result<Vec<PathBuf>> {
        std::fs::create_dir_all(output_dir)
            .io_context(|| format!("failed to create output directory {}", output_dir.display()))?;

        for label in request.titles.ambiguous_labels() {
            warn!("Title '{label}' is used for several series, only the last one can be selected by it");
        }

        let selected = resolve_selections(catalog, request);
        let groups = group_selections(selected, request.options.grouping);
        let style = self.chart_style(&request.options);

        let mut colors = ColorCycle::new();
        let mut used_names = HashSet::new();
        let mut written = Vec::new();

        for group in groups {
            let series: Vec<ChartSeries> = group
                .members
                .iter()
                .filter_map(|member| self.load_series(member, request, &mut colors))
                .collect();
            if series.is_empty() {
                warn!("No data to plot for '{}', skipping chart", group.name);
                continue;
            }

            let chart = ChartSpec {
                title: group.name.clone(),
                x_label: axis_label(&request.options.x_label, DEFAULT_X_LABEL),
                y_label: axis_label(&request.options.y_label, DEFAULT_Y_LABEL),
                series,
                style: style.clone(),
            };
            let path = output_dir.join(unique_file_name(&group.name, &mut used_names));

            match self.backend.draw(&chart, &path) {
                Ok(()) => {
                    debug!("Wrote {}", path.display());
                    written.push(path);
                }
                Err(e) => error!("Failed to draw chart '{}': {e}", group.name),
            }
        }

        info!(
            "Rendered {} chart(s) from {} selection(s)",
            written.len(),
            request.selections.len()
        );
        Ok(written)
    }

    fn chart_style(&self, options: &PlotOptions) -> ChartStyle {
        let dpi = f64::from(options.dpi);
        let (width_in, height_in) = options.figure_size;
        ChartStyle {
            width_px: to_pixels(width_in * dpi),
            height_px: to_pixels(height_in * dpi),
            font: self.fonts.resolve(options.font_family.as_deref()),
            font_size_px: f64::from(options.font_size) * dpi / POINTS_PER_INCH,
            line_width_px: to_pixels(LINE_WIDTH_PT * dpi / POINTS_PER_INCH).max(1),
            show_grid: options.show_grid,
        }
    }

    fn load_series(
        &self,
        member: &Selected<'_>,
        request: &RenderRequest,
        colors: &mut ColorCycle,
    ) -> Option<ChartSeries> {
        let entry = member.entry;
        let points = match self.source.points(&entry.full_path, &entry.key.series) {
            Ok(points) => points,
            Err(e) => {
                warn!("Skipping '{}': {e}", member.label);
                return None;
            }
        };
        if points.is_empty() {
            warn!("Series '{}' has no data points, skipping", member.label);
            return None;
        }

        let values: Vec<f64> = points.iter().map(|p| p.value).collect();
        let smoothed = smooth(&values, request.options.smoothing);
        #[allow(clippy::cast_precision_loss)]
        let points: Vec<(f64, f64)> = points
            .iter()
            .zip(smoothed)
            .map(|(p, v)| (p.step as f64, v))
            .filter(|(_, v)| v.is_finite())
            .collect();
        if points.is_empty() {
            warn!("Series '{}' has no finite values, skipping", member.label);
            return None;
        }

        let color = explicit_color(entry, &member.label, &request.colors)
            .or_else(|| colors.next())
            .unwrap_or(Rgb(0, 0, 0));

        Some(ChartSeries {
            label: member.label.clone(),
            color,
            points,
        })
    }
}

fn resolve_selections<'c>(catalog: &'c Catalog, request: &RenderRequest) -> Vec<Selected<'c>> {
    let mut seen = HashSet::new();
    let mut selected = Vec::new();
    for label in &request.selections {
        let Some(entry) = resolve_catalog_key(label, catalog, &request.titles) else {
            continue;
        };
        if !seen.insert(&entry.key) {
            debug!("'{label}' selects an already selected series, ignoring");
            continue;
        }
        selected.push(Selected {
            entry,
            label: display_name(entry, &request.titles),
        });
    }
    selected
}

fn group_selections(selected: Vec<Selected<'_>>, mode: GroupingMode) -> Vec<Group<'_>> {
    match mode {
        GroupingMode::PerSeries => selected
            .into_iter()
            .map(|member| Group {
                name: member.label.clone(),
                members: vec![member],
            })
            .collect(),
        GroupingMode::PerMetric => {
            let mut groups: Vec<Group<'_>> = Vec::new();
            for member in selected {
                let series = &member.entry.key.series;
                match groups.iter_mut().find(|g| &g.name == series) {
                    Some(group) => group.members.push(member),
                    None => groups.push(Group {
                        name: series.clone(),
                        members: vec![member],
                    }),
                }
            }
            groups
        }
    }
}

fn explicit_color(entry: &CatalogEntry, label: &str, colors: &Mapping) -> Option<Rgb> {
    let text = colors
        .get(entry.display_key())
        .or_else(|| colors.get(label))?;
    let color = parse_color(text);
    if color.is_none() {
        warn!("Ignoring unknown color '{text}' for '{label}'");
    }
    color
}

fn axis_label(label: &Option<String>, default: &str) -> String {
    match label.as_deref().map(str::trim) {
        Some(label) if !label.is_empty() => label.to_string(),
        _ => default.to_string(),
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn to_pixels(value: f64) -> u32 {
    value.round().max(0.0) as u32
}

/// Replaces path separators, whitespace and characters that are unsafe in
/// file names with `_`.
pub fn sanitize_file_stem(name: &str) -> String {
    let stem: String = name
        .chars()
        .map(|c| match c {
            '/' | '\\' | '*' | '?' | ':' | '"' | '<' | '>' | '|' | '(' | ')' => '_',
            c if c.is_whitespace() || c.is_control() => '_',
            c => c,
        })
        .collect();
    if stem.is_empty() || stem.chars().all(|c| c == '.') {
        "chart".to_string()
    } else {
        stem
    }
}

/// File name for a chart that does not collide with any name in `used`.
/// Comparison ignores case so case-insensitive filesystems are safe too.
pub fn unique_file_name(name: &str, used: &mut HashSet<String>) -> String {
    let stem = sanitize_file_stem(name);
    let mut candidate = stem.clone();
    let mut suffix = 1;
    while !used.insert(candidate.to_lowercase()) {
        candidate = format!("{stem}_{suffix}");
        suffix += 1;
    }
    format!("{candidate}.{IMAGE_EXTENSION}")
}

/// Creates a new, empty directory under `root` for one render call.
pub fn fresh_output_dir(root: &Path) -> Result<PathBuf> {
    std::fs::create_dir_all(root)
        .io_context(|| format!("failed to create output root {}", root.display()))?;
    let dir = tempfile::Builder::new()
        .prefix("render-")
        .tempdir_in(root)
        .io_context(|| format!("failed to create output directory in {}", root.display()))?;
    Ok(dir.keep())
}
