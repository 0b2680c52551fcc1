// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

//! Flat catalog of the scalar series available in a set of selected files.

use std::fmt;
use std::path::PathBuf;

use log::{debug, warn};

use crate::errors::Result;
use crate::events::ScalarSource;
use crate::registry::Registry;

/// Identity of one scalar series within one event log.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SeriesKey {
    /// Tag as reported by the event log.
    pub series: String,
    /// `LogFile::short_path` of the file holding the series.
    pub short_path: String,
}

impl SeriesKey {
    pub fn new(series: impl Into<String>, short_path: impl Into<String>) -> Self {
        Self {
            series: series.into(),
            short_path: short_path.into(),
        }
    }
}

/// Formats the key the way it is shown to users: `"{series} ({short_path})"`.
impl fmt::Display for SeriesKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.series, self.short_path)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    pub key: SeriesKey,
    pub full_path: PathBuf,
    display: String,
}

impl CatalogEntry {
    pub fn new(key: SeriesKey, full_path: PathBuf) -> Self {
        let display = key.to_string();
        Self {
            key,
            full_path,
            display,
        }
    }

    /// Display string of the key, as used in title and color mappings.
    pub fn display_key(&self) -> &str {
        &self.display
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    entries: Vec<CatalogEntry>,
}

impl Catalog {
    /// Builds a catalog from entries, dropping repeated keys.
    pub fn from_entries(entries: impl IntoIterator<Item = CatalogEntry>) -> Self {
        let mut catalog = Catalog::default();
        for entry in entries {
            catalog.push(entry);
        }
        catalog
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Display keys in catalog order.
    pub fn keys(&self) -> Vec<&str> {
        self.entries.iter().map(CatalogEntry::display_key).collect()
    }

    pub fn get(&self, key: &SeriesKey) -> Option<&CatalogEntry> {
        self.entries.iter().find(|entry| &entry.key == key)
    }

    /// Looks up an entry by its display string.
    pub fn get_by_display(&self, display: &str) -> Option<&CatalogEntry> {
        self.entries
            .iter()
            .find(|entry| entry.display_key() == display)
    }

    fn push(&mut self, entry: CatalogEntry) {
        if self.get(&entry.key).is_none() {
            self.entries.push(entry);
        }
    }
}

/// Builds the catalog for `selected` files.
///
/// Each selection must be present in `registry`, otherwise this fails with
/// `Error::UnknownFile`. Files that cannot be decoded are logged and contribute
/// no series.
pub fn build_catalog<S: AsRef<str>>(
    selected: &[S],
    registry: &Registry,
    source: &dyn ScalarSource,
) -> Result<Catalog> {
    let mut catalog = Catalog::default();

    for selection in selected {
        let file = registry.resolve(selection.as_ref())?;
        let names = match source.series_names(&file.full_path) {
            Ok(names) => names,
            Err(e) => {
                warn!("Skipping {}: {e}", file.short_path);
                continue;
            }
        };
        debug!("{} has {} scalar series", file.short_path, names.len());

        for name in names {
            catalog.push(CatalogEntry::new(
                SeriesKey::new(name, file.short_path.clone()),
                file.full_path.clone(),
            ));
        }
    }

    Ok(catalog)
}
