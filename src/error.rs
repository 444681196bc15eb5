// Copyright 2021 Twitter, Inc.
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::pdf::PdfError;

use plotters::drawing::DrawingAreaErrorKind;
use plotters_backend::DrawingErrorKind;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("{0}")]
    Cli(#[from] clap::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse TOML config: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("invalid configuration: {0}")]
    Config(String),
    #[error("line {line}: {reason}")]
    Data { line: usize, reason: String },
    #[error("no benchmark reports found")]
    EmptyReport,
    #[error("series `{label}` has {got} values but there are {expected} input sizes")]
    Misaligned {
        label: String,
        got: usize,
        expected: usize,
    },
    #[error("series `{label}` contains a non-finite value at N={size}")]
    NonFiniteValue { label: String, size: u64 },
    #[error("input sizes must be positive and strictly increasing: {0:?}")]
    InvalidSize(Vec<u64>),
    #[error("failed to draw chart: {0}")]
    Drawing(String),
    #[error("failed to launch viewer `{program}`: {source}")]
    Viewer {
        program: String,
        source: std::io::Error,
    },
}

impl Error {
    pub(crate) fn data(line: usize, reason: impl Into<String>) -> Self {
        Error::Data {
            line,
            reason: reason.into(),
        }
    }
}

impl From<DrawingAreaErrorKind<PdfError>> for Error {
    fn from(e: DrawingAreaErrorKind<PdfError>) -> Self {
        match e {
            DrawingAreaErrorKind::BackendError(DrawingErrorKind::DrawingError(PdfError::Io(e))) => {
                Error::Io(e)
            }
            e => Error::Drawing(e.to_string()),
        }
    }
}
