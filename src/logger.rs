// Copyright 2015 Twitter, Inc
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

pub use log::{Level, LevelFilter};

use log::{Metadata, Record, SetLoggerError};

/// Line-oriented logger writing `timestamp level [target] message` to stdout.
pub struct Logger {
    label: &'static str,
    level: Level,
}

impl Default for Logger {
    fn default() -> Self {
        Self::new()
    }
}

impl Logger {
    pub fn new() -> Self {
        Self {
            label: env!("CARGO_PKG_NAME"),
            level: Level::Info,
        }
    }

    /// Target shown for messages at info and above.
    pub fn label(mut self, label: &'static str) -> Self {
        self.label = label;
        self
    }

    pub fn level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    pub fn init(self) -> Result<(), SetLoggerError> {
        let filter = self.level.to_level_filter();
        log::set_boxed_logger(Box::new(self))?;
        log::set_max_level(filter);
        Ok(())
    }

    fn format(&self, record: &Record) -> String {
        let target = if record.level() >= Level::Debug {
            record.target()
        } else {
            self.label
        };
        format!(
            "{} {:<5} [{}] {}",
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f"),
            record.level(),
            target,
            record.args()
        )
    }
}

impl log::Log for Logger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            println!("{}", self.format(record));
        }
    }

    fn flush(&self) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use log::Log;

    fn record_at<'a>(level: Level, args: std::fmt::Arguments<'a>) -> Record<'a> {
        Record::builder()
            .level(level)
            .target("benchplot::chart")
            .args(args)
            .build()
    }

    #[test]
    fn filters_by_level() {
        let logger = Logger::new().level(Level::Info);
        let debug = Metadata::builder().level(Level::Debug).build();
        let warn = Metadata::builder().level(Level::Warn).build();
        assert!(!logger.enabled(&debug));
        assert!(logger.enabled(&warn));
    }

    #[test]
    fn info_uses_label_as_target() {
        let logger = Logger::new().label("demo");
        let line = logger.format(&record_at(Level::Info, format_args!("hello")));
        assert!(line.ends_with("INFO  [demo] hello"), "{}", line);
    }

    #[test]
    fn debug_uses_module_target() {
        let logger = Logger::new().label("demo").level(Level::Trace);
        let line = logger.format(&record_at(Level::Debug, format_args!("panel")));
        assert!(line.ends_with("DEBUG [benchplot::chart] panel"), "{}", line);
    }
}
