// Copyright 2021 Twitter, Inc.
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

#[macro_use]
extern crate log;

pub mod chart;
pub mod config;
pub mod data;
mod error;
pub mod logger;
pub mod measure;
pub mod pdf;
pub mod viewer;

pub use crate::chart::Figure;
pub use crate::config::Config;
pub use crate::data::{Measurements, Operation, Structure};
pub use crate::error::Error;

use crate::measure::Benchmark;

use strum::IntoEnumIterator;

use std::path::PathBuf;

/// Resolves the measurement tables selected by `config`: a benchmark report,
/// a fresh userspace run, or the literal tables.
pub fn measurements(config: &Config) -> Result<Measurements, Error> {
    if let Some(path) = config.general().data() {
        info!("reading benchmark report: {}", path.display());
        data::report::load(path)
    } else if config.general().measure() {
        Benchmark::new(config.sizes(), config.seed()).run()
    } else {
        if !config.has_tables() {
            warn!("no measurements configured, plotting placeholder zeros");
        }
        config.measurements()
    }
}

/// Renders the figure described by `config` and returns where it was written.
pub fn run(config: &Config) -> Result<PathBuf, Error> {
    let measurements = measurements(config)?;
    for operation in Operation::iter() {
        for line in measurements.format_table(operation) {
            info!("{}", line);
        }
    }

    let figure = Figure::new(&measurements, config.figure());
    let output = config.general().output().clone();
    figure.save(&output)?;
    info!("figure written to: {}", output.display());

    if config.general().show() {
        if let Err(e) = viewer::open(&output, config.general().viewer()) {
            warn!("{}", e);
        }
    }

    Ok(output)
}
