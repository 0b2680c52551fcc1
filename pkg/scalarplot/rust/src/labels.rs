// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

//! Display labels: user-supplied title/color mappings and the lookups between
//! catalog keys and the labels shown on charts.

use std::collections::HashMap;

use log::warn;
use serde_json::Value;

use crate::catalog::{Catalog, CatalogEntry};

/// Ordered string-to-string mapping parsed from user JSON.
///
/// Keys are catalog display keys (or, for colors, optionally display labels).
/// Insertion order is preserved and decides reverse-lookup ties.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Mapping {
    entries: Vec<(String, String)>,
}

impl Mapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces `key`, keeping its original position on replace.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Value -> key, where a value shared by several keys maps to the key
    /// inserted last.
    fn inverse(&self) -> HashMap<&str, &str> {
        self.iter().map(|(k, v)| (v, k)).collect()
    }

    /// Labels assigned to more than one key, in first-seen order.
    pub fn ambiguous_labels(&self) -> Vec<&str> {
        let mut counts: HashMap<&str, usize> = HashMap::new();
        let mut order = Vec::new();
        for (_, label) in self.iter() {
            let count = counts.entry(label).or_insert(0);
            if *count == 0 {
                order.push(label);
            }
            *count += 1;
        }
        order
            .into_iter()
            .filter(|label| counts.get(label).is_some_and(|c| *c > 1))
            .collect()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Mapping {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut mapping = Mapping::new();
        for (k, v) in iter {
            mapping.insert(k, v);
        }
        mapping
    }
}

/// How a user-supplied mapping was interpreted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MappingStatus {
    /// Nothing was provided.
    Empty,
    /// A JSON object was parsed.
    Parsed,
    /// Input was provided but was not a JSON object; an empty mapping is used.
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedMapping {
    pub mapping: Mapping,
    pub status: MappingStatus,
    /// Keys dropped because their value was not a string.
    pub ignored: Vec<String>,
}

impl ParsedMapping {
    pub fn is_invalid(&self) -> bool {
        matches!(self.status, MappingStatus::Invalid(_))
    }
}

/// Parses a JSON object of strings. Never fails: bad input degrades to an
/// empty mapping and is reported through `status`.
pub fn parse_mapping(text: &str) -> ParsedMapping {
    if text.trim().is_empty() {
        return ParsedMapping {
            mapping: Mapping::new(),
            status: MappingStatus::Empty,
            ignored: Vec::new(),
        };
    }

    let object = match serde_json::from_str::<Value>(text) {
        Ok(Value::Object(object)) => object,
        Ok(other) => {
            return invalid(format!("expected a JSON object, got {}", json_kind(&other)));
        }
        Err(e) => return invalid(e.to_string()),
    };

    let mut mapping = Mapping::new();
    let mut ignored = Vec::new();
    for (key, value) in object {
        match value {
            Value::String(s) => mapping.insert(key, s),
            _ => ignored.push(key),
        }
    }

    ParsedMapping {
        mapping,
        status: MappingStatus::Parsed,
        ignored,
    }
}

fn invalid(reason: String) -> ParsedMapping {
    ParsedMapping {
        mapping: Mapping::new(),
        status: MappingStatus::Invalid(reason),
        ignored: Vec::new(),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Label shown for a catalog entry: its custom title if any, else its key.
pub fn display_name(entry: &CatalogEntry, titles: &Mapping) -> String {
    titles
        .get(entry.display_key())
        .unwrap_or(entry.display_key())
        .to_string()
}

/// Finds the catalog entry a display label refers to.
///
/// Labels found among the title values map back to their key (last inserted
/// wins for shared labels); any other label is taken to be a display key
/// itself. Returns `None` if the resulting key is not in the catalog.
pub fn resolve_catalog_key<'a>(
    label: &str,
    catalog: &'a Catalog,
    titles: &Mapping,
) -> Option<&'a CatalogEntry> {
    let inverse = titles.inverse();
    let key = inverse.get(label).copied().unwrap_or(label);
    let entry = catalog.get_by_display(key);
    if entry.is_none() {
        warn!("Series '{label}' (key '{key}') is not in the catalog, skipping");
    }
    entry
}

/// Default title mapping offered after a catalog build: every display key
/// mapped to its bare series name, as pretty-printed JSON.
pub fn suggested_titles(catalog: &Catalog) -> String {
    let object: serde_json::Map<String, Value> = catalog
        .entries()
        .iter()
        .map(|entry| {
            (
                entry.display_key().to_string(),
                Value::String(entry.key.series.clone()),
            )
        })
        .collect();
    serde_json::to_string_pretty(&Value::Object(object)).unwrap_or_else(|_| "{}".to_string())
}
