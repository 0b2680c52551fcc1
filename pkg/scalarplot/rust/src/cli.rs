// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, value_parser};
use log::warn;

use crate::labels::{MappingStatus, ParsedMapping, parse_mapping};
use crate::render::{GroupingMode, PlotOptions, RenderRequest};

#[derive(Parser, Debug)]
#[command(name = "scalar-plot")]
#[command(about = "Plot TensorBoard scalar series as smoothed line charts", long_about = None)]
#[command(version)]
pub struct Args {
    /// Path to the YAML config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Register uploads and list the event files found in them
    Files {
        /// Event files or .zip archives of run directories
        #[arg(required = true)]
        uploads: Vec<PathBuf>,
    },

    /// List the scalar series of the selected files and suggest titles
    Series {
        #[arg(required = true)]
        uploads: Vec<PathBuf>,

        /// Event file to include, as listed by `files` (default: all)
        #[arg(long = "file")]
        files: Vec<String>,
    },

    /// Render charts for the selected series
    Plot(PlotArgs),

    /// List selectable font families
    Fonts {
        /// Font file to register before listing
        #[arg(long)]
        font_file: Vec<PathBuf>,
    },
}

#[derive(clap::Args, Debug)]
pub struct PlotArgs {
    #[arg(required = true)]
    pub uploads: Vec<PathBuf>,

    /// Event file to read series from, as listed by `files`
    #[arg(long = "file", required = true)]
    pub files: Vec<String>,

    /// Series to plot, by display key or custom title
    #[arg(long = "series", required = true)]
    pub series: Vec<String>,

    /// Custom titles as a JSON object, or @PATH to read one from a file
    #[arg(long)]
    pub titles: Option<String>,

    /// Line colors as a JSON object, or @PATH to read one from a file
    #[arg(long)]
    pub colors: Option<String>,

    #[arg(long)]
    pub x_label: Option<String>,

    #[arg(long)]
    pub y_label: Option<String>,

    #[arg(long, value_parser = value_parser!(u32).range(50..=600))]
    pub dpi: Option<u32>,

    /// Moving average window
    #[arg(long, value_parser = value_parser!(u32).range(1..=50))]
    pub smoothing: Option<u32>,

    #[arg(long)]
    pub no_grid: bool,

    #[arg(long)]
    pub font_family: Option<String>,

    /// Font size in points
    #[arg(long, value_parser = value_parser!(u32).range(6..=72))]
    pub font_size: Option<u32>,

    /// Font file to register and use when it matches --font-family
    #[arg(long)]
    pub font_file: Vec<PathBuf>,

    /// One chart per selected series instead of one per metric
    #[arg(long)]
    pub per_series: bool,

    /// Directory that receives the render directory and archive
    #[arg(long, default_value = ".")]
    pub out_dir: PathBuf,

    /// Also bundle the charts into a zip archive
    #[arg(long)]
    pub pack: bool,
}

impl PlotArgs {
    /// Command line values layered over `defaults`.
    pub fn options(&self, defaults: PlotOptions) -> PlotOptions {
        PlotOptions {
            x_label: self.x_label.clone().or(defaults.x_label),
            y_label: self.y_label.clone().or(defaults.y_label),
            dpi: self.dpi.unwrap_or(defaults.dpi),
            smoothing: self
                .smoothing
                .and_then(|s| usize::try_from(s).ok())
                .unwrap_or(defaults.smoothing),
            show_grid: defaults.show_grid && !self.no_grid,
            font_family: self.font_family.clone().or(defaults.font_family),
            font_size: self.font_size.unwrap_or(defaults.font_size),
            grouping: if self.per_series {
                GroupingMode::PerSeries
            } else {
                defaults.grouping
            },
            figure_size: defaults.figure_size,
        }
    }

    pub fn request(&self, defaults: PlotOptions) -> Result<RenderRequest> {
        let titles = load_mapping("titles", self.titles.as_deref())?;
        let colors = load_mapping("colors", self.colors.as_deref())?;
        Ok(RenderRequest {
            selections: self.series.clone(),
            titles: titles.mapping,
            colors: colors.mapping,
            options: self.options(defaults),
        })
    }
}

/// Parses a mapping argument given inline or as `@PATH`.
///
/// Malformed JSON is logged and yields an empty mapping; only an unreadable
/// `@PATH` file is an error.
pub fn load_mapping(name: &str, value: Option<&str>) -> Result<ParsedMapping> {
    let text = match value {
        Some(value) => match value.strip_prefix('@') {
            Some(path) => std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read --{name} file {path}"))?,
            None => value.to_string(),
        },
        None => String::new(),
    };

    let parsed = parse_mapping(&text);
    if let MappingStatus::Invalid(reason) = &parsed.status {
        warn!("Ignoring --{name}, not a valid JSON object: {reason}");
    }
    for key in &parsed.ignored {
        warn!("Ignoring --{name} entry '{key}': value is not a string");
    }
    Ok(parsed)
}
