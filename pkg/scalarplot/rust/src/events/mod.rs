// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

//! Reading scalar series out of TensorBoard event files.

pub mod proto;
pub mod record;

use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use log::{debug, warn};
use prost::Message;

use crate::errors::{Error, Result};
use proto::{Event, SCALARS_PLUGIN, SummaryValue, event, summary_value};
use record::{RecordError, RecordReader};

/// A single scalar measurement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScalarPoint {
    pub step: i64,
    pub value: f64,
}

/// Source of named scalar series, one set per log file.
///
/// Implementations must not cache: every call reflects the file's current
/// contents.
pub trait ScalarSource {
    /// Scalar series names in `path`, in first-appearance order.
    fn series_names(&self, path: &Path) -> Result<Vec<String>>;

    /// Points of one series in `path`, in file order.
    fn points(&self, path: &Path, series: &str) -> Result<Vec<ScalarPoint>>;
}

/// `ScalarSource` backed by TFRecord event files on disk.
#[derive(Debug, Default, Clone, Copy)]
pub struct EventFileReader;

impl EventFileReader {
    pub fn new() -> Self {
        Self
    }

    fn read_events(path: &Path) -> Result<Vec<Event>> {
        let decode_error = |reason: String| Error::Decode {
            path: path.to_path_buf(),
            reason,
        };

        let file = File::open(path).map_err(|e| decode_error(e.to_string()))?;
        let mut events = Vec::new();

        for record in RecordReader::new(BufReader::new(file)) {
            let payload = match record {
                Ok(payload) => payload,
                Err(RecordError::Truncated) if !events.is_empty() => {
                    warn!(
                        "{} ends with a partial record, ignoring it",
                        path.display()
                    );
                    break;
                }
                Err(e) => return Err(decode_error(e.to_string())),
            };
            let event = Event::decode(payload.as_slice())
                .map_err(|e| decode_error(format!("record {}: {e}", events.len())))?;
            events.push(event);
        }

        debug!("Read {} event(s) from {}", events.len(), path.display());
        Ok(events)
    }

    /// Calls `visit(tag, point)` for every scalar in `path`.
    fn for_each_scalar<F>(path: &Path, mut visit: F) -> Result<()>
    where
        F: FnMut(&str, ScalarPoint),
    {
        // Plugin metadata is only written with the first value of a tag.
        let mut plugins: HashMap<String, String> = HashMap::new();

        for event in Self::read_events(path)? {
            let Some(event::What::Summary(summary)) = &event.what else {
                continue;
            };
            for value in &summary.value {
                if let Some(plugin) = value
                    .metadata
                    .as_ref()
                    .and_then(|m| m.plugin_data.as_ref())
                {
                    plugins
                        .entry(value.tag.clone())
                        .or_insert_with(|| plugin.plugin_name.clone());
                }
                if let Some(scalar) = scalar_value(value, &plugins) {
                    visit(
                        &value.tag,
                        ScalarPoint {
                            step: event.step,
                            value: scalar,
                        },
                    );
                }
            }
        }
        Ok(())
    }
}

fn scalar_value(value: &SummaryValue, plugins: &HashMap<String, String>) -> Option<f64> {
    match value.kind.as_ref()? {
        summary_value::Kind::SimpleValue(v) => Some(f64::from(*v)),
        summary_value::Kind::Tensor(tensor) => {
            let is_scalar_plugin = plugins
                .get(&value.tag)
                .is_some_and(|name| name == SCALARS_PLUGIN);
            if is_scalar_plugin { tensor.scalar() } else { None }
        }
    }
}

impl ScalarSource for EventFileReader {
    fn series_names(&self, path: &Path) -> Result<Vec<String>> {
        let mut seen = HashSet::new();
        let mut names = Vec::new();
        Self::for_each_scalar(path, |tag, _| {
            if seen.insert(tag.to_string()) {
                names.push(tag.to_string());
            }
        })?;
        Ok(names)
    }

    fn points(&self, path: &Path, series: &str) -> Result<Vec<ScalarPoint>> {
        let mut points = Vec::new();
        Self::for_each_scalar(path, |tag, point| {
            if tag == series {
                points.push(point);
            }
        })?;
        Ok(points)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{EventLogBuilder, scalar_tensor_event};

    #[test]
    fn test_lists_scalar_tags_in_first_appearance_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("events.out.tfevents.1");
        EventLogBuilder::new()
            .scalar(0, "train/loss", 1.0)
            .scalar(0, "train/acc", 0.1)
            .scalar(1, "train/loss", 0.5)
            .scalar(1, "eval/loss", 0.7)
            .write(&path);

        let names = EventFileReader::new().series_names(&path).unwrap();

        assert_eq!(names, vec!["train/loss", "train/acc", "eval/loss"]);
    }

    #[test]
    fn test_points_in_file_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("events.out.tfevents.1");
        EventLogBuilder::new()
            .scalar(10, "loss", 3.0)
            .scalar(10, "acc", 0.0)
            .scalar(20, "loss", 2.0)
            .scalar(30, "loss", 1.5)
            .write(&path);

        let points = EventFileReader::new().points(&path, "loss").unwrap();

        let steps: Vec<i64> = points.iter().map(|p| p.step).collect();
        let values: Vec<f64> = points.iter().map(|p| p.value).collect();
        assert_eq!(steps, vec![10, 20, 30]);
        assert_eq!(values, vec![3.0, 2.0, 1.5]);
    }

    #[test]
    fn test_tensor_scalars_need_plugin_from_first_occurrence() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("events.out.tfevents.2");
        EventLogBuilder::new()
            .event(scalar_tensor_event(1, "lr", 0.01, Some("scalars")))
            .event(scalar_tensor_event(2, "lr", 0.005, None))
            .event(scalar_tensor_event(1, "hist", 4.0, Some("histograms")))
            .write(&path);

        let reader = EventFileReader::new();

        assert_eq!(reader.series_names(&path).unwrap(), vec!["lr"]);
        let values: Vec<f64> = reader
            .points(&path, "lr")
            .unwrap()
            .iter()
            .map(|p| p.value)
            .collect();
        assert_eq!(values.len(), 2);
        assert!((values[0] - 0.01).abs() < 1e-6);
        assert!((values[1] - 0.005).abs() < 1e-6);
    }

    #[test]
    fn test_file_without_scalars_is_empty_not_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("events.out.tfevents.3");
        EventLogBuilder::new().write(&path);

        assert!(EventFileReader::new().series_names(&path).unwrap().is_empty());
    }

    #[test]
    fn test_partial_trailing_record_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("events.out.tfevents.4");
        EventLogBuilder::new()
            .scalar(1, "loss", 1.0)
            .scalar(2, "loss", 0.5)
            .write(&path);
        let mut bytes = std::fs::read(&path).unwrap();
        bytes.extend_from_slice(&[7, 0, 0]);
        std::fs::write(&path, bytes).unwrap();

        let points = EventFileReader::new().points(&path, "loss").unwrap();

        assert_eq!(points.len(), 2);
    }

    #[test]
    fn test_garbage_is_decode_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("events.out.tfevents.5");
        std::fs::write(&path, b"not an event file").unwrap();

        let result = EventFileReader::new().series_names(&path);

        assert!(matches!(result, Err(Error::Decode { .. })));
    }

    #[test]
    fn test_missing_file_is_decode_error() {
        let result = EventFileReader::new().points(Path::new("/nonexistent/tfevents"), "loss");
        assert!(matches!(result, Err(Error::Decode { .. })));
    }
}
