// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

//! Shared helpers for unit tests.

use std::cell::{Cell, RefCell};
use std::collections::HashSet;
use std::io::Write;
use std::path::{Path, PathBuf};

use prost::Message;

use crate::errors::{Error, Result};
use crate::events::proto::{
    DT_FLOAT, Event, PluginData, Summary, SummaryMetadata, SummaryValue, TensorProto, event,
    summary_value,
};
use crate::events::record::frame;
use crate::events::{ScalarPoint, ScalarSource};
use crate::render::{ChartBackend, ChartSpec};

/// Writes a zip archive at `path` holding `entries` as `(name, contents)`.
pub fn write_zip(path: &Path, entries: &[(&str, &[u8])]) {
    let file = std::fs::File::create(path).unwrap();
    let mut writer = zip::ZipWriter::new(file);
    let options = zip::write::FileOptions::<()>::default()
        .compression_method(zip::CompressionMethod::Stored);
    for (name, contents) in entries {
        writer.start_file(*name, options).unwrap();
        writer.write_all(contents).unwrap();
    }
    writer.finish().unwrap();
}

#[allow(clippy::cast_precision_loss)]
fn summary_event(step: i64, value: SummaryValue) -> Event {
    Event {
        wall_time: 1_700_000_000.0 + step as f64,
        step,
        what: Some(event::What::Summary(Summary { value: vec![value] })),
    }
}

/// Scalar written the modern way: a one-element float tensor, with plugin
/// metadata when `plugin` is set.
#[allow(clippy::cast_possible_truncation)]
pub fn scalar_tensor_event(step: i64, tag: &str, value: f64, plugin: Option<&str>) -> Event {
    let tensor = TensorProto {
        dtype: DT_FLOAT,
        float_val: vec![value as f32],
        ..Default::default()
    };
    summary_event(
        step,
        SummaryValue {
            tag: tag.to_string(),
            metadata: plugin.map(|name| SummaryMetadata {
                plugin_data: Some(PluginData {
                    plugin_name: name.to_string(),
                    content: Vec::new(),
                }),
            }),
            kind: Some(summary_value::Kind::Tensor(tensor)),
        },
    )
}

/// Builds a TFRecord event file in memory.
pub struct EventLogBuilder {
    events: Vec<Event>,
}

impl EventLogBuilder {
    /// Starts with the file version header every writer emits.
    pub fn new() -> Self {
        Self {
            events: vec![Event {
                wall_time: 1_700_000_000.0,
                step: 0,
                what: Some(event::What::FileVersion("brain.Event:2".to_string())),
            }],
        }
    }

    /// Adds a legacy `simple_value` scalar.
    pub fn scalar(mut self, step: i64, tag: &str, value: f32) -> Self {
        self.events.push(summary_event(
            step,
            SummaryValue {
                tag: tag.to_string(),
                metadata: None,
                kind: Some(summary_value::Kind::SimpleValue(value)),
            },
        ));
        self
    }

    pub fn event(mut self, event: Event) -> Self {
        self.events.push(event);
        self
    }

    pub fn bytes(&self) -> Vec<u8> {
        self.events
            .iter()
            .flat_map(|event| frame(&event.encode_to_vec()))
            .collect()
    }

    pub fn write(&self, path: &Path) {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(path, self.bytes()).unwrap();
    }
}

/// In-memory `ScalarSource` that counts how often it is asked for names.
#[derive(Default)]
pub struct FakeSource {
    series: Vec<(PathBuf, String, Vec<ScalarPoint>)>,
    broken: HashSet<PathBuf>,
    name_queries: Cell<usize>,
}

impl FakeSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_series(mut self, path: impl AsRef<Path>, series: &str, points: &[(i64, f64)]) -> Self {
        let points = points
            .iter()
            .map(|&(step, value)| ScalarPoint { step, value })
            .collect();
        self.series
            .push((path.as_ref().to_path_buf(), series.to_string(), points));
        self
    }

    /// Makes every read of `path` fail with a decode error.
    pub fn with_broken(mut self, path: impl AsRef<Path>) -> Self {
        self.broken.insert(path.as_ref().to_path_buf());
        self
    }

    pub fn name_queries(&self) -> usize {
        self.name_queries.get()
    }

    fn check(&self, path: &Path) -> Result<()> {
        if self.broken.contains(path) {
            return Err(Error::Decode {
                path: path.to_path_buf(),
                reason: "broken on purpose".to_string(),
            });
        }
        Ok(())
    }
}

impl ScalarSource for FakeSource {
    fn series_names(&self, path: &Path) -> Result<Vec<String>> {
        self.name_queries.set(self.name_queries.get() + 1);
        self.check(path)?;
        Ok(self
            .series
            .iter()
            .filter(|(p, _, _)| p == path)
            .map(|(_, name, _)| name.clone())
            .collect())
    }

    fn points(&self, path: &Path, series: &str) -> Result<Vec<ScalarPoint>> {
        self.check(path)?;
        Ok(self
            .series
            .iter()
            .find(|(p, name, _)| p == path && name == series)
            .map(|(_, _, points)| points.clone())
            .unwrap_or_default())
    }
}

/// `ChartBackend` that records charts and writes a placeholder file.
#[derive(Default)]
pub struct RecordingBackend {
    charts: RefCell<Vec<ChartSpec>>,
    fail_on: Option<String>,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fails to draw any chart titled `title`.
    pub fn failing_on(title: &str) -> Self {
        Self {
            charts: RefCell::default(),
            fail_on: Some(title.to_string()),
        }
    }

    pub fn charts(&self) -> Vec<ChartSpec> {
        self.charts.borrow().clone()
    }
}

impl ChartBackend for RecordingBackend {
    fn draw(&self, chart: &ChartSpec, path: &Path) -> Result<()> {
        if self.fail_on.as_deref() == Some(chart.title.as_str()) {
            return Err(Error::Render {
                reason: "failing on purpose".to_string(),
            });
        }
        std::fs::write(path, chart.title.as_bytes()).unwrap();
        self.charts.borrow_mut().push(chart.clone());
        Ok(())
    }
}
