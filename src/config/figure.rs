// Copyright 2021 Twitter, Inc.
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::data::Operation;
use crate::Error;

use serde_derive::*;

fn default_width() -> u32 {
    720
}

fn default_height() -> u32 {
    288
}

fn default_x_label() -> String {
    "Number of Entries (N)".to_string()
}

fn default_y_label() -> String {
    "Time per Operation (ns/op)".to_string()
}

fn default_insert_title() -> String {
    "(a) Insert Performance".to_string()
}

fn default_lookup_title() -> String {
    "(b) Lookup Performance".to_string()
}

fn default_grid_alpha() -> f64 {
    0.3
}

fn default_marker_size() -> u32 {
    3
}

fn default_line_width() -> u32 {
    2
}

fn default_title_size() -> u32 {
    12
}

fn default_label_size() -> u32 {
    10
}

fn default_tick_size() -> u32 {
    9
}

/// Cosmetics of the rendered figure. Sizes are in points.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct FigureConfig {
    #[serde(default = "default_width")]
    width: u32,
    #[serde(default = "default_height")]
    height: u32,
    #[serde(default = "default_x_label")]
    x_label: String,
    #[serde(default = "default_y_label")]
    y_label: String,
    #[serde(default = "default_insert_title")]
    insert_title: String,
    #[serde(default = "default_lookup_title")]
    lookup_title: String,
    #[serde(default = "default_grid_alpha")]
    grid_alpha: f64,
    #[serde(default = "default_marker_size")]
    marker_size: u32,
    #[serde(default = "default_line_width")]
    line_width: u32,
    #[serde(default = "default_title_size")]
    title_size: u32,
    #[serde(default = "default_label_size")]
    label_size: u32,
    #[serde(default = "default_tick_size")]
    tick_size: u32,
}

impl Default for FigureConfig {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            x_label: default_x_label(),
            y_label: default_y_label(),
            insert_title: default_insert_title(),
            lookup_title: default_lookup_title(),
            grid_alpha: default_grid_alpha(),
            marker_size: default_marker_size(),
            line_width: default_line_width(),
            title_size: default_title_size(),
            label_size: default_label_size(),
            tick_size: default_tick_size(),
        }
    }
}

impl FigureConfig {
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn set_size(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
    }

    pub fn x_label(&self) -> &str {
        &self.x_label
    }

    pub fn y_label(&self) -> &str {
        &self.y_label
    }

    pub fn title(&self, operation: Operation) -> &str {
        match operation {
            Operation::Insert => &self.insert_title,
            Operation::Lookup => &self.lookup_title,
        }
    }

    pub fn grid_alpha(&self) -> f64 {
        self.grid_alpha
    }

    pub fn marker_size(&self) -> u32 {
        self.marker_size
    }

    pub fn line_width(&self) -> u32 {
        self.line_width
    }

    pub fn title_size(&self) -> u32 {
        self.title_size
    }

    pub fn label_size(&self) -> u32 {
        self.label_size
    }

    pub fn tick_size(&self) -> u32 {
        self.tick_size
    }

    pub fn validate(&self) -> Result<(), Error> {
        if self.width < 100 || self.height < 100 {
            return Err(Error::Config(format!(
                "figure size {}x{} is smaller than 100x100 points",
                self.width, self.height
            )));
        }
        if !(0.0..=1.0).contains(&self.grid_alpha) {
            return Err(Error::Config(format!(
                "grid_alpha must be within 0.0 and 1.0, got {}",
                self.grid_alpha
            )));
        }
        if self.title_size == 0 || self.label_size == 0 || self.tick_size == 0 {
            return Err(Error::Config("font sizes must be positive".to_string()));
        }
        Ok(())
    }
}
