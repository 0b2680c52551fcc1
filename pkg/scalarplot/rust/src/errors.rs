// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("could not extract archive {}: {source}", archive.display())]
    Extraction {
        archive: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },

    #[error("event file {short_path} is not part of the current upload")]
    UnknownFile { short_path: String },

    #[error("could not decode event file {}: {reason}", path.display())]
    Decode { path: PathBuf, reason: String },

    #[error("could not package {}: {reason}", path.display())]
    Packaging { path: PathBuf, reason: String },

    #[error("could not render chart: {reason}")]
    Render { reason: String },

    #[error("unusable font file {}: {reason}", path.display())]
    Font { path: PathBuf, reason: String },

    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: io::Error,
    },
}

pub type Result<T> = std::result::Result<T, Error>;

/// Attaches a description to `io::Error`s, the way `anyhow::Context` does in
/// the binary.
pub(crate) trait IoContext<T> {
    fn io_context<F: FnOnce() -> String>(self, context: F) -> Result<T>;
}

impl<T> IoContext<T> for io::Result<T> {
    fn io_context<F: FnOnce() -> String>(self, context: F) -> Result<T> {
        self.map_err(|source| Error::Io {
            context: context(),
            source,
        })
    }
}
