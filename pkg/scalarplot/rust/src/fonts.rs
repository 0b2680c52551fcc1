// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

//! Per-session font lookup.
//!
//! Uploaded font files are only visible to the session that registered them.

use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use walkdir::WalkDir;

use crate::errors::{Error, Result};

/// Families offered before any upload.
pub const DEFAULT_FAMILIES: &[&str] = &[
    "Arial",
    "Times New Roman",
    "Courier New",
    "Georgia",
    "SimHei",
    "SimSun",
    "Microsoft YaHei",
    "Microsoft JhengHei",
    "FangSong",
    "KaiTi",
    "DejaVu Sans",
];

/// Family used when none is requested or the requested one has no file.
pub const FALLBACK_FAMILY: &str = "DejaVu Sans";

const FONT_EXTENSIONS: &[&str] = &["ttf", "otf"];

/// A font family together with the file that provides it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FontFace {
    pub family: String,
    pub path: PathBuf,
}

#[derive(Debug, Clone, Default)]
pub struct FontResolver {
    uploaded: Vec<FontFace>,
    installed: Vec<FontFace>,
}

fn is_font_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            FONT_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
}

fn family_from_path(path: &Path) -> Option<String> {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
}

/// Family name recorded in the font's `name` table, preferring the
/// typographic family over the legacy one.
fn internal_family(data: &[u8]) -> Option<String> {
    let face = ttf_parser::Face::parse(data, 0).ok()?;
    let lookup = |id: u16| {
        face.names()
            .into_iter()
            .filter(|name| name.name_id == id)
            .find_map(|name| name.to_string())
            .filter(|family| !family.trim().is_empty())
    };
    lookup(ttf_parser::name_id::TYPOGRAPHIC_FAMILY).or_else(|| lookup(ttf_parser::name_id::FAMILY))
}

/// Lowercases and drops separators so "DejaVu Sans" matches "DejaVuSans".
fn normalize(name: &str) -> String {
    name.chars()
        .filter(|c| !matches!(c, ' ' | '-' | '_'))
        .flat_map(char::to_lowercase)
        .collect()
}

impl FontResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a resolver that knows the font files under `dirs`.
    /// Missing directories are skipped.
    pub fn with_font_dirs<P: AsRef<Path>>(dirs: &[P]) -> Self {
        let mut installed = Vec::new();
        for dir in dirs {
            let dir = dir.as_ref();
            if !dir.is_dir() {
                debug!("Font directory {} does not exist", dir.display());
                continue;
            }
            for entry in WalkDir::new(dir).sort_by_file_name().into_iter().flatten() {
                if !entry.file_type().is_file() || !is_font_file(entry.path()) {
                    continue;
                }
                if let Some(family) = family_from_path(entry.path()) {
                    installed.push(FontFace {
                        family,
                        path: entry.path().to_path_buf(),
                    });
                }
            }
        }
        debug!("Found {} installed font file(s)", installed.len());
        Self {
            uploaded: Vec::new(),
            installed,
        }
    }

    /// Registers an uploaded font file and returns the family name it is
    /// selectable under.
    pub fn register_file(&mut self, path: &Path) -> Result<String> {
        let font_error = |reason: &str| Error::Font {
            path: path.to_path_buf(),
            reason: reason.to_string(),
        };

        if !is_font_file(path) {
            return Err(font_error("expected a .ttf or .otf file"));
        }
        let metadata = std::fs::metadata(path).map_err(|e| font_error(&e.to_string()))?;
        if !metadata.is_file() || metadata.len() == 0 {
            return Err(font_error("not a non-empty regular file"));
        }
        let data = std::fs::read(path).map_err(|e| font_error(&e.to_string()))?;
        let family = match internal_family(&data) {
            Some(family) => family,
            None => {
                debug!("No family name in {}, using the file name", path.display());
                family_from_path(path).ok_or_else(|| font_error("no file name"))?
            }
        };

        let face = FontFace {
            family: family.clone(),
            path: path.to_path_buf(),
        };
        match self.uploaded.iter_mut().find(|f| f.family == family) {
            Some(existing) => {
                warn!("Font {family} re-uploaded, replacing {}", existing.path.display());
                *existing = face;
            }
            None => self.uploaded.push(face),
        }
        info!("Registered font {family} from {}", path.display());
        Ok(family)
    }

    /// Selectable family names: defaults followed by uploaded fonts.
    pub fn families(&self) -> Vec<String> {
        let mut families: Vec<String> = DEFAULT_FAMILIES.iter().map(|f| f.to_string()).collect();
        for face in &self.uploaded {
            if !families.contains(&face.family) {
                families.push(face.family.clone());
            }
        }
        families
    }

    /// Picks the font file to draw `family` with.
    ///
    /// Uploaded fonts win over installed ones. If nothing matches,
    /// `FALLBACK_FAMILY` is used, then the first known font, so text can
    /// still be drawn.
    pub fn resolve(&self, family: Option<&str>) -> Option<FontFace> {
        if let Some(family) = family.filter(|f| !f.trim().is_empty()) {
            if let Some(face) = self.find(family) {
                return Some(face.clone());
            }
            debug!("No font file for family {family}, using fallback");
        }

        self.find(FALLBACK_FAMILY)
            .or_else(|| self.uploaded.first())
            .or_else(|| self.installed.first())
            .cloned()
    }

    fn find(&self, family: &str) -> Option<&FontFace> {
        if let Some(face) = self.uploaded.iter().find(|f| f.family == family) {
            return Some(face);
        }
        let wanted = normalize(family);
        self.uploaded
            .iter()
            .chain(&self.installed)
            .find(|f| normalize(&f.family) == wanted)
    }
}
