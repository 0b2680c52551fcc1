// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

use std::env;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::warn;
use serde::Deserialize;

use crate::registry::DEFAULT_EVENT_MARKER;
use crate::render::{DEFAULT_DPI, DEFAULT_FIGURE_SIZE, DEFAULT_FONT_SIZE, GroupingMode, PlotOptions};

pub const DEFAULT_CONFIG_PATH: &str = "/etc/scalar-plot/scalar-plot.yaml";
pub const CONFIG_PATH_ENV: &str = "SCALAR_PLOT_CONFIG";

fn default_event_marker() -> String {
    DEFAULT_EVENT_MARKER.to_string()
}

fn default_work_dir() -> PathBuf {
    env::temp_dir()
}

fn default_font_dirs() -> Vec<PathBuf> {
    ["/usr/share/fonts", "/usr/local/share/fonts"]
        .iter()
        .map(PathBuf::from)
        .collect()
}

fn default_dpi() -> u32 {
    DEFAULT_DPI
}

fn default_smoothing() -> usize {
    1
}

fn default_font_size() -> u32 {
    DEFAULT_FONT_SIZE
}

fn default_true() -> bool {
    true
}

fn default_width() -> f64 {
    DEFAULT_FIGURE_SIZE.0
}

fn default_height() -> f64 {
    DEFAULT_FIGURE_SIZE.1
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Config {
    pub log_level: Option<String>,
    /// Root under which per-upload working directories are created.
    #[serde(default = "default_work_dir")]
    pub work_dir: PathBuf,
    /// Substring that marks a file as an event log.
    #[serde(default = "default_event_marker")]
    pub event_marker: String,
    #[serde(default = "default_font_dirs")]
    pub font_dirs: Vec<PathBuf>,
    #[serde(default)]
    pub render: RenderDefaults,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: None,
            work_dir: default_work_dir(),
            event_marker: default_event_marker(),
            font_dirs: default_font_dirs(),
            render: RenderDefaults::default(),
        }
    }
}

/// Defaults for plot options not given on the command line.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RenderDefaults {
    #[serde(default = "default_dpi")]
    pub dpi: u32,
    #[serde(default = "default_smoothing")]
    pub smoothing: usize,
    pub font_family: Option<String>,
    #[serde(default = "default_font_size")]
    pub font_size: u32,
    #[serde(default = "default_true")]
    pub show_grid: bool,
    #[serde(default)]
    pub grouping: GroupingMode,
    #[serde(default = "default_width")]
    pub width_in: f64,
    #[serde(default = "default_height")]
    pub height_in: f64,
}

impl Default for RenderDefaults {
    fn default() -> Self {
        Self {
            dpi: default_dpi(),
            smoothing: default_smoothing(),
            font_family: None,
            font_size: default_font_size(),
            show_grid: true,
            grouping: GroupingMode::default(),
            width_in: default_width(),
            height_in: default_height(),
        }
    }
}

impl RenderDefaults {
    pub fn plot_options(&self) -> PlotOptions {
        PlotOptions {
            x_label: None,
            y_label: None,
            dpi: self.dpi,
            smoothing: self.smoothing,
            show_grid: self.show_grid,
            font_family: self.font_family.clone(),
            font_size: self.font_size,
            grouping: self.grouping,
            figure_size: (self.width_in, self.height_in),
        }
    }
}

/// Path of the config file: the explicit one, then `SCALAR_PLOT_CONFIG`, then
/// the default location.
pub fn config_path(explicit: Option<PathBuf>) -> PathBuf {
    explicit
        .or_else(|| env::var(CONFIG_PATH_ENV).ok().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}

/// Loads the YAML config file if it exists, otherwise returns defaults.
pub fn load_config(config_path: &Path) -> Result<Config> {
    if !config_path.exists() {
        warn!(
            "Config file not found at {}. Using defaults.",
            config_path.display()
        );
        return Ok(Config::default());
    }

    let contents = std::fs::read_to_string(config_path)
        .with_context(|| format!("Failed to read config file {}", config_path.display()))?;
    if contents.trim().is_empty() {
        return Ok(Config::default());
    }
    serde_yaml::from_str(&contents)
        .with_context(|| format!("Failed to parse YAML config {}", config_path.display()))
}

fn parse_log_level(level: &str) -> log::Level {
    match level.to_lowercase().as_str() {
        "trace" => log::Level::Trace,
        "debug" => log::Level::Debug,
        "info" => log::Level::Info,
        "warn" | "warning" => log::Level::Warn,
        "error" | "critical" | "off" => log::Level::Error,
        _ => log::Level::Info,
    }
}

/// Gets the log level from configuration.
/// Priority: SCALAR_PLOT_LOG_LEVEL > LOG_LEVEL > YAML config > default Info
pub fn get_log_level(config: &Result<Config>) -> log::Level {
    if let Ok(level) = env::var("SCALAR_PLOT_LOG_LEVEL") {
        return parse_log_level(&level);
    }

    if let Ok(level) = env::var("LOG_LEVEL") {
        return parse_log_level(&level);
    }

    config
        .as_ref()
        .ok()
        .and_then(|c| c.log_level.as_deref())
        .map(parse_log_level)
        .unwrap_or(log::Level::Info)
}
