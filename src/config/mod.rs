//  Copyright 2019 Twitter, Inc
//
//  Licensed under the Apache License, Version 2.0 (the "License");
//  you may not use this file except in compliance with the License.
//  You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
//  Unless required by applicable law or agreed to in writing, software
//  distributed under the License is distributed on an "AS IS" BASIS,
//  WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
//  See the License for the specific language governing permissions and
//  limitations under the License.

mod figure;
mod general;

pub use self::figure::FigureConfig;
pub use self::general::General;

use crate::data::{Measurements, Operation, Structure, DEFAULT_SIZES};
use crate::logger::Level;
use crate::Error;

use clap::{App, Arg, ArgMatches};
use serde_derive::*;

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::str::FromStr;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");

fn default_seed() -> u64 {
    0x6c6b_705f_6473
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    general: General,
    #[serde(default)]
    figure: FigureConfig,
    #[serde(default)]
    measurements: Tables,
    #[serde(default)]
    measure: Measure,
}

/// Literal measurement tables. Missing series are filled with zeros.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Tables {
    sizes: Option<Vec<u64>>,
    #[serde(default)]
    insert: SeriesTable,
    #[serde(default)]
    lookup: SeriesTable,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
struct SeriesTable {
    linked_list: Option<Vec<f64>>,
    hash_table: Option<Vec<f64>>,
    rb_tree: Option<Vec<f64>>,
    xarray: Option<Vec<f64>>,
}

impl SeriesTable {
    fn get(&self, structure: Structure) -> Option<&Vec<f64>> {
        match structure {
            Structure::LinkedList => self.linked_list.as_ref(),
            Structure::HashTable => self.hash_table.as_ref(),
            Structure::RbTree => self.rb_tree.as_ref(),
            Structure::XArray => self.xarray.as_ref(),
        }
    }

    fn columns(&self, len: usize) -> [Vec<f64>; Structure::COUNT] {
        let column = |s| self.get(s).cloned().unwrap_or_else(|| vec![0.0; len]);
        [
            column(Structure::LinkedList),
            column(Structure::HashTable),
            column(Structure::RbTree),
            column(Structure::XArray),
        ]
    }
}

#[derive(Clone, Copy, Debug, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Measure {
    #[serde(default = "default_seed")]
    seed: u64,
}

impl Default for Measure {
    fn default() -> Self {
        Self {
            seed: default_seed(),
        }
    }
}

fn app() -> App<'static, 'static> {
    App::new(NAME)
        .version(VERSION)
        .about("Kernel data structure benchmark charts")
        .arg(
            Arg::with_name("config")
                .long("config")
                .value_name("FILE")
                .help("TOML config file")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("output")
                .long("output")
                .short("o")
                .value_name("FILE")
                .help("Where to write the PDF figure")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("data")
                .long("data")
                .value_name("FILE")
                .help("Concatenated /proc/lkp_ds_bench reports to plot")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("measure")
                .long("measure")
                .help("Run the userspace benchmark instead of plotting fixed data"),
        )
        .arg(
            Arg::with_name("sizes")
                .long("sizes")
                .value_name("N,N,...")
                .help("Comma separated input sizes")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("seed")
                .long("seed")
                .value_name("INT")
                .help("Seed for the benchmark's random values")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("show")
                .long("show")
                .help("Open the figure in the system viewer once written"),
        )
        .arg(
            Arg::with_name("verbose")
                .short("v")
                .long("verbose")
                .help("Increase verbosity by one level. Can be used more than once")
                .multiple(true),
        )
}

fn parse_numeric_arg<T: FromStr>(matches: &ArgMatches, key: &str) -> Result<Option<T>, Error> {
    match matches.value_of(key) {
        Some(value) => value
            .parse()
            .map(Some)
            .map_err(|_| Error::Config(format!("{} is not a number: {}", key, value))),
        None => Ok(None),
    }
}

fn parse_sizes(value: &str) -> Result<Vec<u64>, Error> {
    value
        .split(',')
        .map(|n| {
            n.trim()
                .parse::<u64>()
                .map_err(|_| Error::Config(format!("invalid input size: {}", n.trim())))
        })
        .collect()
}

impl Config {
    /// parse command line options and return `Config`
    pub fn new() -> Result<Config, Error> {
        Self::from_args(std::env::args_os())
    }

    pub fn from_args<I, T>(args: I) -> Result<Config, Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let matches = app().get_matches_from_safe(args)?;

        let mut config = if let Some(file) = matches.value_of("config") {
            Config::load_from_file(file)?
        } else {
            Default::default()
        };

        if let Some(output) = matches.value_of("output") {
            config.general.set_output(PathBuf::from(output));
        }

        if let Some(data) = matches.value_of("data") {
            config.general.set_data(Some(PathBuf::from(data)));
        }

        if matches.is_present("measure") {
            config.general.set_measure(true);
        }

        if matches.is_present("show") {
            config.general.set_show(true);
        }

        if let Some(sizes) = matches.value_of("sizes") {
            config.measurements.sizes = Some(parse_sizes(sizes)?);
        }

        if let Some(seed) = parse_numeric_arg(&matches, "seed")? {
            config.measure.seed = seed;
        }

        match matches.occurrences_of("verbose") {
            0 => {}
            1 => config.general.set_logging(Level::Debug),
            _ => config.general.set_logging(Level::Trace),
        }

        config.validate()?;
        Ok(config)
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Config, Error> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Config, Error> {
        let config: Config = toml::from_str(content)?;
        config.figure.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), Error> {
        if self.general.measure() && self.general.data().is_some() {
            return Err(Error::Config(
                "'measure' and 'data' cannot be used together".to_string(),
            ));
        }
        self.figure.validate()
    }

    pub fn general(&self) -> &General {
        &self.general
    }

    pub fn figure(&self) -> &FigureConfig {
        &self.figure
    }

    pub fn sizes(&self) -> Vec<u64> {
        self.measurements
            .sizes
            .clone()
            .unwrap_or_else(|| DEFAULT_SIZES.to_vec())
    }

    pub fn seed(&self) -> u64 {
        self.measure.seed
    }

    /// The literal tables from the config, aligned and validated.
    pub fn measurements(&self) -> Result<Measurements, Error> {
        let sizes = self.sizes();
        let len = sizes.len();
        Measurements::new(
            sizes,
            self.measurements.insert.columns(len),
            self.measurements.lookup.columns(len),
        )
    }

    /// Whether any series was given explicitly in the config.
    pub fn has_tables(&self) -> bool {
        [&self.measurements.insert, &self.measurements.lookup]
            .iter()
            .any(|t| **t != SeriesTable::default())
    }

    pub fn print(&self) {
        info!("-----");
        info!("Config:");
        info!("Output: {}", self.general.output().display());
        match (self.general.data(), self.general.measure()) {
            (Some(data), _) => info!("Data: {}", data.display()),
            (None, true) => info!("Data: userspace benchmark (seed: {})", self.seed()),
            (None, false) => info!("Data: builtin tables"),
        }
        info!("Sizes: {:?}", self.sizes());
        let (width, height) = self.figure.size();
        info!("Figure: {}x{} pt", width, height);
        info!(
            "Panels: {}, {}",
            self.figure.title(Operation::Insert),
            self.figure.title(Operation::Lookup)
        );
        info!("-----");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(extra: &[&str]) -> Vec<String> {
        std::iter::once(NAME)
            .chain(extra.iter().copied())
            .map(String::from)
            .collect()
    }

    #[test]
    fn builtin_defaults() {
        let config = Config::from_args(args(&[])).unwrap();
        assert_eq!(config.general().output(), &PathBuf::from("bench_results.pdf"));
        assert!(!config.general().show());
        assert_eq!(config.general().viewer(), None);
        assert!(!config.general().measure());
        assert_eq!(config.general().logging(), Level::Info);
        assert_eq!(config.sizes(), DEFAULT_SIZES.to_vec());
        assert_eq!(config.figure().size(), (720, 288));
        assert_eq!(config.figure().grid_alpha(), 0.3);
        assert_eq!(config.measurements().unwrap(), Measurements::default());
    }

    #[test]
    fn command_line_overrides() {
        let config = Config::from_args(args(&[
            "--output",
            "out.pdf",
            "--sizes",
            "10, 20,30",
            "--measure",
            "--seed",
            "7",
            "--show",
            "-vv",
        ]))
        .unwrap();
        assert_eq!(config.general().output(), &PathBuf::from("out.pdf"));
        assert_eq!(config.sizes(), vec![10, 20, 30]);
        assert!(config.general().measure());
        assert!(config.general().show());
        assert_eq!(config.seed(), 7);
        assert_eq!(config.general().logging(), Level::Trace);
    }

    #[test]
    fn conflicting_sources() {
        let err = Config::from_args(args(&["--measure", "--data", "bench_data.txt"])).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn bad_numbers() {
        assert!(matches!(
            Config::from_args(args(&["--sizes", "10,ten"])),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            Config::from_args(args(&["--seed", "lots"])),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            Config::from_args(args(&["--bogus"])),
            Err(Error::Cli(_))
        ));
    }

    #[test]
    fn toml_tables() {
        let config = Config::from_toml(
            r#"
            [general]
            output = "figure.pdf"
            logging = "debug"

            [figure]
            grid_alpha = 0.5

            [measurements]
            sizes = [10, 100]

            [measurements.insert]
            linked_list = [1, 2]
            xarray = [3.5, 4.5]

            [measurements.lookup]
            hash_table = [5, 6]
            "#,
        )
        .unwrap();
        assert_eq!(config.general().output(), &PathBuf::from("figure.pdf"));
        assert_eq!(config.general().logging(), Level::Debug);
        assert_eq!(config.figure().grid_alpha(), 0.5);
        assert!(config.has_tables());

        let m = config.measurements().unwrap();
        assert_eq!(m.sizes(), &[10, 100]);
        assert_eq!(m.values(Operation::Insert, Structure::LinkedList), &[1.0, 2.0]);
        assert_eq!(m.values(Operation::Insert, Structure::XArray), &[3.5, 4.5]);
        assert_eq!(m.values(Operation::Insert, Structure::HashTable), &[0.0, 0.0]);
        assert_eq!(m.values(Operation::Lookup, Structure::HashTable), &[5.0, 6.0]);
    }

    #[test]
    fn toml_misaligned_table() {
        let config = Config::from_toml(
            r#"
            [measurements.insert]
            rb_tree = [1, 2, 3]
            "#,
        )
        .unwrap();
        assert!(matches!(config.measurements(), Err(Error::Misaligned { .. })));
    }

    #[test]
    fn toml_rejects_unknown_fields() {
        assert!(matches!(
            Config::from_toml("[general]\ncolour = \"red\"\n"),
            Err(Error::Toml(_))
        ));
        assert!(matches!(
            Config::from_toml("[measurements.insert]\nskip_list = [1]\n"),
            Err(Error::Toml(_))
        ));
    }

    #[test]
    fn toml_rejects_bad_alpha() {
        assert!(matches!(
            Config::from_toml("[figure]\ngrid_alpha = 1.5\n"),
            Err(Error::Config(_))
        ));
    }
}
