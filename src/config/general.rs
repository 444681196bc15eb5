// Copyright 2019 Twitter, Inc.
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::logger::Level;

use serde_derive::*;

use std::path::PathBuf;

#[derive(Deserialize)]
#[serde(remote = "Level")]
#[serde(rename_all = "lowercase")]
enum LevelDef {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

fn default_output() -> PathBuf {
    PathBuf::from("bench_results.pdf")
}

fn default_logging_level() -> Level {
    Level::Info
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct General {
    #[serde(default = "default_output")]
    output: PathBuf,
    #[serde(default)]
    show: bool,
    viewer: Option<String>,
    #[serde(with = "LevelDef")]
    #[serde(default = "default_logging_level")]
    logging: Level,
    data: Option<PathBuf>,
    #[serde(default)]
    measure: bool,
}

impl Default for General {
    fn default() -> Self {
        Self {
            output: default_output(),
            show: false,
            viewer: None,
            logging: default_logging_level(),
            data: None,
            measure: false,
        }
    }
}

impl General {
    pub fn output(&self) -> &PathBuf {
        &self.output
    }

    pub fn set_output(&mut self, output: PathBuf) {
        self.output = output;
    }

    pub fn show(&self) -> bool {
        self.show
    }

    pub fn set_show(&mut self, show: bool) {
        self.show = show;
    }

    /// Program used to open the figure instead of the platform default.
    pub fn viewer(&self) -> Option<&str> {
        self.viewer.as_deref()
    }

    pub fn logging(&self) -> Level {
        self.logging
    }

    pub fn set_logging(&mut self, level: Level) {
        self.logging = level;
    }

    /// Benchmark report to read the measurements from.
    pub fn data(&self) -> Option<&PathBuf> {
        self.data.as_ref()
    }

    pub fn set_data(&mut self, data: Option<PathBuf>) {
        self.data = data;
    }

    /// Whether to produce the measurements by running the benchmark.
    pub fn measure(&self) -> bool {
        self.measure
    }

    pub fn set_measure(&mut self, measure: bool) {
        self.measure = measure;
    }
}
