// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

//! Bundles rendered images into a single zip archive.

use std::collections::HashSet;
use std::io::Write;
use std::path::{Path, PathBuf};

use log::info;

use crate::errors::{Error, Result};

/// Writes every file in `images` into a new `plots-*.zip` under `dest_dir`
/// and returns the archive path.
///
/// Entries are stored under their base names. If any input is unreadable or
/// two inputs share a base name, nothing is written.
pub fn pack<P: AsRef<Path>>(images: &[P], dest_dir: &Path) -> Result<PathBuf> {
    let packaging_error = |path: &Path, reason: String| Error::Packaging {
        path: path.to_path_buf(),
        reason,
    };

    let mut names = HashSet::new();
    let mut entries = Vec::with_capacity(images.len());
    for image in images {
        let image = image.as_ref();
        let name = image
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| packaging_error(image, "no file name".to_string()))?;
        if !names.insert(name.clone()) {
            return Err(packaging_error(
                image,
                format!("another input is also named {name}"),
            ));
        }
        let contents = std::fs::read(image).map_err(|e| packaging_error(image, e.to_string()))?;
        entries.push((name, contents));
    }

    let archive = tempfile::Builder::new()
        .prefix("plots-")
        .suffix(".zip")
        .tempfile_in(dest_dir)
        .map_err(|e| packaging_error(dest_dir, e.to_string()))?;

    let mut writer = zip::ZipWriter::new(archive.as_file());
    let options = zip::write::FileOptions::<()>::default()
        .compression_method(zip::CompressionMethod::Deflated);
    for (name, contents) in &entries {
        writer
            .start_file(name.as_str(), options)
            .map_err(|e| packaging_error(archive.path(), e.to_string()))?;
        writer
            .write_all(contents)
            .map_err(|e| packaging_error(archive.path(), e.to_string()))?;
    }
    writer
        .finish()
        .map_err(|e| packaging_error(archive.path(), e.to_string()))?;

    let (_, path) = archive
        .keep()
        .map_err(|e| packaging_error(dest_dir, e.to_string()))?;
    info!("Packed {} image(s) into {}", entries.len(), path.display());
    Ok(path)
}
