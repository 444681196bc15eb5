// Copyright 2021 Twitter, Inc.
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

#[macro_use]
extern crate log;

use benchplot::logger::Logger;
use benchplot::{Config, Error};

fn main() {
    let config = match Config::new() {
        Ok(config) => config,
        Err(Error::Cli(e)) => e.exit(),
        Err(e) => {
            eprintln!("ERROR: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = Logger::new()
        .label("benchplot")
        .level(config.general().logging())
        .init()
    {
        eprintln!("ERROR: failed to initialize logger: {}", e);
        std::process::exit(1);
    }

    config.print();

    if let Err(e) = benchplot::run(&config) {
        error!("{}", e);
        std::process::exit(1);
    }
}
