// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

#![allow(dead_code)]

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use prost::Message;
use scalar_plot::events::proto::{
    DT_DOUBLE, Event, PluginData, SCALARS_PLUGIN, Summary, SummaryMetadata, SummaryValue,
    TensorProto, event, summary_value,
};

/// TFRecord framing: length, length CRC, payload, payload CRC. CRCs are
/// left zeroed since the reader does not check them.
fn frame(payload: &[u8], out: &mut Vec<u8>) {
    out.extend_from_slice(&(payload.len() as u64).to_le_bytes());
    out.extend_from_slice(&[0; 4]);
    out.extend_from_slice(payload);
    out.extend_from_slice(&[0; 4]);
}

fn summary(step: i64, value: SummaryValue) -> Event {
    Event {
        wall_time: 1_700_000_000.0,
        step,
        what: Some(event::What::Summary(Summary { value: vec![value] })),
    }
}

/// Event file contents with one scalar per `(step, tag, value)`.
///
/// Even steps use legacy `simple_value`, odd steps use double tensors the way
/// newer writers do, so both encodings are exercised.
pub fn event_file(scalars: &[(i64, &str, f64)]) -> Vec<u8> {
    let mut events = vec![Event {
        wall_time: 1_700_000_000.0,
        step: 0,
        what: Some(event::What::FileVersion("brain.Event:2".to_string())),
    }];
    for &(step, tag, value) in scalars {
        let kind = if step % 2 == 0 {
            summary_value::Kind::SimpleValue(value as f32)
        } else {
            summary_value::Kind::Tensor(TensorProto {
                dtype: DT_DOUBLE,
                double_val: vec![value],
                ..Default::default()
            })
        };
        events.push(summary(
            step,
            SummaryValue {
                tag: tag.to_string(),
                metadata: Some(SummaryMetadata {
                    plugin_data: Some(PluginData {
                        plugin_name: SCALARS_PLUGIN.to_string(),
                        content: Vec::new(),
                    }),
                }),
                kind: Some(kind),
            },
        ));
    }

    let mut out = Vec::new();
    for event in &events {
        frame(&event.encode_to_vec(), &mut out);
    }
    out
}

pub fn write_zip(path: &Path, entries: &[(&str, Vec<u8>)]) {
    let file = std::fs::File::create(path).unwrap();
    let mut writer = zip::ZipWriter::new(file);
    let options: zip::write::FileOptions<()> =
        zip::write::FileOptions::default().compression_method(zip::CompressionMethod::Stored);
    for (name, contents) in entries {
        writer.start_file(*name, options).unwrap();
        writer.write_all(contents).unwrap();
    }
    writer.finish().unwrap();
}

/// Archive with two runs sharing `loss`; `run1` also logs `acc`.
pub fn two_run_archive(dir: &Path) -> PathBuf {
    let archive = dir.join("experiment.zip");
    write_zip(
        &archive,
        &[
            (
                "run1/events.out.tfevents.100.host",
                event_file(&[
                    (0, "loss", 1.0),
                    (0, "acc", 0.1),
                    (1, "loss", 0.8),
                    (1, "acc", 0.4),
                    (2, "loss", 0.5),
                ]),
            ),
            (
                "run2/events.out.tfevents.200.host",
                event_file(&[(0, "loss", 2.0), (1, "loss", 1.5)]),
            ),
            ("run2/hparams.json", b"{}".to_vec()),
        ],
    );
    archive
}

/// Config file pointing every directory the binary uses into `dir`.
pub fn write_config(dir: &Path) -> PathBuf {
    let path = dir.join("scalar-plot.yaml");
    let yaml = format!(
        "log_level: debug\nwork_dir: {}\nfont_dirs: []\n",
        dir.join("work").display()
    );
    std::fs::write(&path, yaml).unwrap();
    path
}

pub fn run_cli(config: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_scalar-plot"))
        .arg("--config")
        .arg(config)
        .args(args)
        .env_remove("SCALAR_PLOT_LOG_LEVEL")
        .env_remove("LOG_LEVEL")
        .output()
        .expect("failed to run scalar-plot")
}

pub fn stdout_lines(output: &Output) -> Vec<String> {
    String::from_utf8_lossy(&output.stdout)
        .lines()
        .map(str::to_string)
        .collect()
}
