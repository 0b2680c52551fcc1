// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

//! Materializes uploaded archives and loose files into a working directory and
//! indexes the event logs found inside it.

use std::fs::File;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use tempfile::TempDir;
use walkdir::WalkDir;
use zip::ZipArchive;

use crate::errors::{Error, IoContext, Result};

/// Substring identifying TensorBoard event logs by file name.
pub const DEFAULT_EVENT_MARKER: &str = "tfevents";

const CHOICE_PREFIX: &str = "./";

/// One event log of the current upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogFile {
    /// Path relative to the working directory, always `/`-separated.
    pub short_path: String,
    pub full_path: PathBuf,
}

impl LogFile {
    /// Label offered to the user when picking files.
    pub fn choice(&self) -> String {
        format!("{CHOICE_PREFIX}{}", self.short_path)
    }
}

/// Snapshot of the event logs found in one working directory.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    files: Vec<LogFile>,
}

impl Registry {
    pub fn files(&self) -> &[LogFile] {
        &self.files
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn choices(&self) -> Vec<String> {
        self.files.iter().map(LogFile::choice).collect()
    }

    /// Looks up a selection, given either as a bare short path or as the
    /// `./`-prefixed choice label.
    pub fn resolve(&self, selection: &str) -> Result<&LogFile> {
        let short_path = normalize_selection(selection);
        self.files
            .iter()
            .find(|file| file.short_path == short_path)
            .ok_or_else(|| Error::UnknownFile {
                short_path: short_path.to_string(),
            })
    }
}

pub fn normalize_selection(selection: &str) -> &str {
    selection.strip_prefix(CHOICE_PREFIX).unwrap_or(selection)
}

/// Replaces the previous working set with the given uploads.
///
/// The previous working directory, if any, is deleted before anything else
/// happens. The returned `TempDir` owns the new working directory and deletes
/// it when dropped.
pub fn register_uploads<P: AsRef<Path>>(
    items: &[P],
    previous: Option<TempDir>,
    work_root: &Path,
    marker: &str,
) -> Result<(TempDir, Registry)> {
    if let Some(previous) = previous {
        let path = previous.path().to_path_buf();
        previous
            .close()
            .io_context(|| format!("failed to delete working directory {}", path.display()))?;
        debug!("Deleted previous working directory {}", path.display());
    }

    std::fs::create_dir_all(work_root)
        .io_context(|| format!("failed to create work root {}", work_root.display()))?;
    let working_dir = tempfile::Builder::new()
        .prefix("scalar-plot-")
        .tempdir_in(work_root)
        .io_context(|| format!("failed to create working directory in {}", work_root.display()))?;

    for item in items {
        materialize(item.as_ref(), working_dir.path())?;
    }

    let registry = scan(working_dir.path(), marker)?;
    info!(
        "Registered {} event file(s) from {} upload(s) in {}",
        registry.len(),
        items.len(),
        working_dir.path().display()
    );
    Ok((working_dir, registry))
}

fn is_archive(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("zip"))
}

fn materialize(item: &Path, working_dir: &Path) -> Result<()> {
    if is_archive(item) {
        let file = File::open(item)
            .io_context(|| format!("failed to open upload {}", item.display()))?;
        let mut archive = ZipArchive::new(file).map_err(|source| Error::Extraction {
            archive: item.to_path_buf(),
            source,
        })?;
        archive
            .extract(working_dir)
            .map_err(|source| Error::Extraction {
                archive: item.to_path_buf(),
                source,
            })?;
        debug!(
            "Extracted {} entries from {}",
            archive.len(),
            item.display()
        );
        return Ok(());
    }

    let Some(name) = item.file_name() else {
        warn!("Skipping upload without a file name: {}", item.display());
        return Ok(());
    };
    let dest = working_dir.join(name);
    if dest.exists() {
        warn!(
            "Upload {} replaces an earlier file with the same name",
            item.display()
        );
    }
    std::fs::copy(item, &dest)
        .io_context(|| format!("failed to copy upload {}", item.display()))?;
    Ok(())
}

/// Walks `working_dir` and collects every file whose name contains `marker`.
pub fn scan(working_dir: &Path, marker: &str) -> Result<Registry> {
    let mut files = Vec::new();

    for entry in WalkDir::new(working_dir).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Skipping unreadable entry in {}: {e}", working_dir.display());
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        if !entry.file_name().to_string_lossy().contains(marker) {
            continue;
        }

        let Ok(relative) = entry.path().strip_prefix(working_dir) else {
            continue;
        };
        let short_path = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");

        files.push(LogFile {
            short_path,
            full_path: entry.path().to_path_buf(),
        });
    }

    Ok(Registry { files })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::write_zip;

    fn short_paths(registry: &Registry) -> Vec<&str> {
        registry
            .files()
            .iter()
            .map(|f| f.short_path.as_str())
            .collect()
    }

    #[test]
    fn test_archive_with_two_runs() {
        let uploads = tempfile::tempdir().unwrap();
        let work_root = tempfile::tempdir().unwrap();
        let archive = uploads.path().join("logs.zip");
        write_zip(
            &archive,
            &[
                ("run1/events.tfevents.1", b"a".as_slice()),
                ("run2/events.tfevents.2", b"b".as_slice()),
                ("run2/notes.txt", b"ignored".as_slice()),
            ],
        );

        let (working_dir, registry) =
            register_uploads(&[&archive], None, work_root.path(), DEFAULT_EVENT_MARKER).unwrap();

        assert_eq!(
            short_paths(&registry),
            vec!["run1/events.tfevents.1", "run2/events.tfevents.2"]
        );
        for file in registry.files() {
            assert!(file.full_path.starts_with(working_dir.path()));
            assert!(file.full_path.is_file());
        }
    }

    #[test]
    fn test_loose_file_copied_to_root() {
        let uploads = tempfile::tempdir().unwrap();
        let work_root = tempfile::tempdir().unwrap();
        let loose = uploads.path().join("events.out.tfevents.123.host");
        std::fs::write(&loose, b"data").unwrap();

        let (_working_dir, registry) =
            register_uploads(&[&loose], None, work_root.path(), DEFAULT_EVENT_MARKER).unwrap();

        assert_eq!(short_paths(&registry), vec!["events.out.tfevents.123.host"]);
        assert_eq!(
            registry.choices(),
            vec!["./events.out.tfevents.123.host".to_string()]
        );
    }

    #[test]
    fn test_marker_is_case_sensitive_substring() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.TFEVENTS"), b"").unwrap();
        std::fs::write(dir.path().join("b.tfevents.x"), b"").unwrap();
        std::fs::create_dir(dir.path().join("tfevents_dir")).unwrap();

        let registry = scan(dir.path(), DEFAULT_EVENT_MARKER).unwrap();

        assert_eq!(short_paths(&registry), vec!["b.tfevents.x"]);
    }

    #[test]
    fn test_reupload_deletes_previous_working_dir() {
        let uploads = tempfile::tempdir().unwrap();
        let work_root = tempfile::tempdir().unwrap();
        let first = uploads.path().join("first.zip");
        let second = uploads.path().join("second.zip");
        write_zip(&first, &[("old/events.tfevents.1", b"1".as_slice())]);
        write_zip(&second, &[("new/events.tfevents.2", b"2".as_slice())]);

        let (first_dir, first_registry) =
            register_uploads(&[&first], None, work_root.path(), DEFAULT_EVENT_MARKER).unwrap();
        let first_path = first_dir.path().to_path_buf();
        assert_eq!(short_paths(&first_registry), vec!["old/events.tfevents.1"]);

        let (second_dir, second_registry) = register_uploads(
            &[&second],
            Some(first_dir),
            work_root.path(),
            DEFAULT_EVENT_MARKER,
        )
        .unwrap();

        assert!(!first_path.exists(), "first working dir should be deleted");
        assert_ne!(second_dir.path(), first_path.as_path());
        assert_eq!(short_paths(&second_registry), vec!["new/events.tfevents.2"]);
        assert!(second_registry.resolve("old/events.tfevents.1").is_err());
    }

    #[test]
    fn test_malformed_archive_is_extraction_error() {
        let uploads = tempfile::tempdir().unwrap();
        let work_root = tempfile::tempdir().unwrap();
        let bogus = uploads.path().join("broken.zip");
        std::fs::write(&bogus, b"definitely not a zip").unwrap();

        let result = register_uploads(&[&bogus], None, work_root.path(), DEFAULT_EVENT_MARKER);

        assert!(matches!(result, Err(Error::Extraction { .. })));
    }

    #[test]
    fn test_archive_extension_case_insensitive() {
        let uploads = tempfile::tempdir().unwrap();
        let work_root = tempfile::tempdir().unwrap();
        let archive = uploads.path().join("LOGS.ZIP");
        write_zip(&archive, &[("events.tfevents.9", b"x".as_slice())]);

        let (_dir, registry) =
            register_uploads(&[&archive], None, work_root.path(), DEFAULT_EVENT_MARKER).unwrap();

        assert_eq!(short_paths(&registry), vec!["events.tfevents.9"]);
    }

    #[test]
    fn test_resolve_accepts_choice_label() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("run")).unwrap();
        std::fs::write(dir.path().join("run/events.tfevents.1"), b"").unwrap();
        let registry = scan(dir.path(), DEFAULT_EVENT_MARKER).unwrap();

        let by_choice = registry.resolve("./run/events.tfevents.1").unwrap();
        let by_path = registry.resolve("run/events.tfevents.1").unwrap();

        assert_eq!(by_choice, by_path);
        assert!(matches!(
            registry.resolve("run/missing.tfevents"),
            Err(Error::UnknownFile { short_path }) if short_path == "run/missing.tfevents"
        ));
    }
}
