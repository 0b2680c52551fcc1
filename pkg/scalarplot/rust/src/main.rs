// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

// Correctness
#![deny(clippy::indexing_slicing)]
#![deny(clippy::string_slice)]
#![deny(clippy::cast_possible_wrap)]
#![deny(clippy::undocumented_unsafe_blocks)]
// Panicking code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::unimplemented)]
#![deny(clippy::todo)]
// Debug code that shouldn't be in production
#![deny(clippy::dbg_macro)]
#![deny(clippy::print_stdout)]
#![deny(clippy::print_stderr)]

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use log::{info, warn};
use scalar_plot::Session;
use scalar_plot::cli::{Args, Command, PlotArgs};
use scalar_plot::config;
use scalar_plot::labels::suggested_titles;

fn register(session: &mut Session, uploads: &[PathBuf]) -> Result<Vec<String>> {
    let registry = session
        .register_uploads(uploads)
        .context("Failed to register uploads")?;
    Ok(registry.choices())
}

fn register_fonts(session: &mut Session, fonts: &[PathBuf]) -> Result<()> {
    for font in fonts {
        session
            .register_font(font)
            .with_context(|| format!("Failed to register font {}", font.display()))?;
    }
    Ok(())
}

#[allow(clippy::print_stdout)]
fn files(session: &mut Session, uploads: &[PathBuf]) -> Result<()> {
    for choice in register(session, uploads)? {
        println!("{choice}");
    }
    Ok(())
}

#[allow(clippy::print_stdout)]
fn series(session: &mut Session, uploads: &[PathBuf], files: &[String]) -> Result<()> {
    let choices = register(session, uploads)?;
    let selected: &[String] = if files.is_empty() { &choices } else { files };

    let catalog = session
        .build_catalog(selected)
        .context("Failed to list series")?;
    for key in catalog.keys() {
        println!("{key}");
    }
    println!("{}", suggested_titles(&catalog));
    Ok(())
}

#[allow(clippy::print_stdout)]
fn plot(session: &mut Session, args: &PlotArgs) -> Result<()> {
    register(session, &args.uploads)?;
    register_fonts(session, &args.font_file)?;
    let request = args.request(session.default_plot_options())?;

    let images = session
        .render(&args.files, &request, &args.out_dir)
        .context("Failed to render charts")?;
    for image in &images {
        println!("{}", image.display());
    }

    if args.pack {
        if images.is_empty() {
            warn!("No charts were rendered, nothing to pack");
        } else {
            let archive = session
                .pack(&images, &args.out_dir)
                .context("Failed to pack charts")?;
            println!("{}", archive.display());
        }
    }
    Ok(())
}

#[allow(clippy::print_stdout)]
fn fonts(session: &mut Session, fonts: &[PathBuf]) -> Result<()> {
    register_fonts(session, fonts)?;
    for family in session.font_families() {
        println!("{family}");
    }
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    let config = config::load_config(&config::config_path(args.config.clone()));
    let log_level = config::get_log_level(&config);
    simple_logger::init_with_level(log_level)?;
    info!("Log level set to: {:?}", log_level);

    let mut session = Session::new(config?);
    match &args.command {
        Command::Files { uploads } => files(&mut session, uploads),
        Command::Series { uploads, files } => series(&mut session, uploads, files),
        Command::Plot(plot_args) => plot(&mut session, plot_args),
        Command::Fonts { font_file } => fonts(&mut session, font_file),
    }
}
