// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

//! Per-user state: the uploaded working set, fonts and rendering backends.

use std::path::{Path, PathBuf};

use log::{info, warn};
use tempfile::TempDir;

use crate::catalog::{Catalog, build_catalog};
use crate::config::Config;
use crate::errors::Result;
use crate::events::{EventFileReader, ScalarSource};
use crate::fonts::FontResolver;
use crate::labels::suggested_titles;
use crate::pack::pack;
use crate::registry::{Registry, register_uploads};
use crate::render::bitmap::PlottersBackend;
use crate::render::{ChartBackend, PlotOptions, RenderRequest, Renderer, fresh_output_dir};

/// Everything one user works with. Independent sessions share no state.
pub struct Session {
    config: Config,
    working_dir: Option<TempDir>,
    registry: Registry,
    fonts: FontResolver,
    source: Box<dyn ScalarSource>,
    backend: Box<dyn ChartBackend>,
}

impl Session {
    /// A session reading event files from disk and drawing PNGs.
    pub fn new(config: Config) -> Self {
        Self::with_parts(
            config,
            Box::new(EventFileReader::new()),
            Box::new(PlottersBackend::new()),
        )
    }

    pub fn with_parts(
        config: Config,
        source: Box<dyn ScalarSource>,
        backend: Box<dyn ChartBackend>,
    ) -> Self {
        let fonts = FontResolver::with_font_dirs(&config.font_dirs);
        Self {
            config,
            working_dir: None,
            registry: Registry::default(),
            fonts,
            source,
            backend,
        }
    }

    /// Plot options filled from the configured defaults.
    pub fn default_plot_options(&self) -> PlotOptions {
        self.config.render.plot_options()
    }

    /// Replaces the working set with `items`. The previous working directory
    /// is deleted even if the new uploads fail to register.
    pub fn register_uploads<P: AsRef<Path>>(&mut self, items: &[P]) -> Result<&Registry> {
        let previous = self.working_dir.take();
        self.registry = Registry::default();

        let (working_dir, registry) = register_uploads(
            items,
            previous,
            &self.config.work_dir,
            &self.config.event_marker,
        )?;
        if registry.is_empty() {
            warn!("No event files found in {} upload(s)", items.len());
        }
        self.working_dir = Some(working_dir);
        self.registry = registry;
        Ok(&self.registry)
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn working_dir(&self) -> Option<&Path> {
        self.working_dir.as_ref().map(TempDir::path)
    }

    /// Catalog of the series in the selected files, read fresh from disk.
    pub fn build_catalog<S: AsRef<str>>(&self, selected: &[S]) -> Result<Catalog> {
        build_catalog(selected, &self.registry, self.source.as_ref())
    }

    /// Editable titles JSON for the selected files.
    pub fn suggested_titles<S: AsRef<str>>(&self, selected: &[S]) -> Result<String> {
        Ok(suggested_titles(&self.build_catalog(selected)?))
    }

    pub fn register_font(&mut self, path: &Path) -> Result<String> {
        self.fonts.register_file(path)
    }

    pub fn font_families(&self) -> Vec<String> {
        self.fonts.families()
    }

    /// Renders `request` for the series of `selected_files` into a new
    /// directory under `output_root`.
    pub fn render<S: AsRef<str>>(
        &self,
        selected_files: &[S],
        request: &RenderRequest,
        output_root: &Path,
    ) -> Result<Vec<PathBuf>> {
        let catalog = self.build_catalog(selected_files)?;
        let output_dir = fresh_output_dir(output_root)?;
        info!(
            "Rendering {} selection(s) from {} series into {}",
            request.selections.len(),
            catalog.len(),
            output_dir.display()
        );
        Renderer::new(self.source.as_ref(), self.backend.as_ref(), &self.fonts).render(
            &catalog,
            request,
            &output_dir,
        )
    }

    pub fn pack<P: AsRef<Path>>(&self, images: &[P], dest_dir: &Path) -> Result<PathBuf> {
        pack(images, dest_dir)
    }
}
