// Copyright 2021 Twitter, Inc.
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Benchmark measurement tables.
//!
//! A [`Measurements`] value holds one ns/op series per data structure and
//! operation, every series aligned by index to the shared list of input sizes.

pub mod report;

use crate::chart::Marker;
use crate::Error;

use strum::IntoEnumIterator;
use strum_macros::EnumIter;

use std::fmt::Write as _;

/// Input sizes used when nothing else is configured.
pub const DEFAULT_SIZES: [u64; 5] = [100, 1000, 5000, 10000, 50000];

/// The benchmarked data structures, in plotting order.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, EnumIter)]
pub enum Structure {
    LinkedList,
    HashTable,
    RbTree,
    XArray,
}

impl Structure {
    pub const COUNT: usize = 4;

    pub fn label(self) -> &'static str {
        match self {
            Structure::LinkedList => "Linked List",
            Structure::HashTable => "Hash Table",
            Structure::RbTree => "RB-Tree",
            Structure::XArray => "XArray",
        }
    }

    pub fn marker(self) -> Marker {
        match self {
            Structure::LinkedList => Marker::Circle,
            Structure::HashTable => Marker::Square,
            Structure::RbTree => Marker::Triangle,
            Structure::XArray => Marker::Diamond,
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, EnumIter)]
pub enum Operation {
    Insert,
    Lookup,
}

impl Operation {
    pub fn name(self) -> &'static str {
        match self {
            Operation::Insert => "Insert",
            Operation::Lookup => "Lookup",
        }
    }
}

/// All eight series plus the input sizes they are aligned to.
#[derive(Clone, Debug, PartialEq)]
pub struct Measurements {
    sizes: Vec<u64>,
    insert: [Vec<f64>; Structure::COUNT],
    lookup: [Vec<f64>; Structure::COUNT],
}

impl Default for Measurements {
    fn default() -> Self {
        Self::placeholder(DEFAULT_SIZES.to_vec())
    }
}

impl Measurements {
    /// Builds a table and checks that every series is aligned to `sizes`.
    pub fn new(
        sizes: Vec<u64>,
        insert: [Vec<f64>; Structure::COUNT],
        lookup: [Vec<f64>; Structure::COUNT],
    ) -> Result<Self, Error> {
        let measurements = Self {
            sizes,
            insert,
            lookup,
        };
        measurements.validate()?;
        Ok(measurements)
    }

    /// All-zero series awaiting real numbers.
    pub fn placeholder(sizes: Vec<u64>) -> Self {
        let zeros = || vec![0.0; sizes.len()];
        let insert = [zeros(), zeros(), zeros(), zeros()];
        let lookup = [zeros(), zeros(), zeros(), zeros()];
        Self {
            sizes,
            insert,
            lookup,
        }
    }

    pub fn validate(&self) -> Result<(), Error> {
        let increasing = self.sizes.windows(2).all(|w| w[0] < w[1]);
        if self.sizes.is_empty() || self.sizes[0] == 0 || !increasing {
            return Err(Error::InvalidSize(self.sizes.clone()));
        }

        for operation in Operation::iter() {
            for (structure, values) in self.series(operation) {
                let label = format!("{} {}", structure.label(), operation.name());
                if values.len() != self.sizes.len() {
                    return Err(Error::Misaligned {
                        label,
                        got: values.len(),
                        expected: self.sizes.len(),
                    });
                }
                if let Some(i) = values.iter().position(|v| !v.is_finite()) {
                    return Err(Error::NonFiniteValue {
                        label,
                        size: self.sizes[i],
                    });
                }
            }
        }
        Ok(())
    }

    pub fn sizes(&self) -> &[u64] {
        &self.sizes
    }

    pub fn values(&self, operation: Operation, structure: Structure) -> &[f64] {
        &self.table(operation)[structure.index()]
    }

    /// Series for one operation, in plotting order.
    pub fn series(&self, operation: Operation) -> impl Iterator<Item = (Structure, &[f64])> {
        let table = self.table(operation);
        Structure::iter().map(move |s| (s, table[s.index()].as_slice()))
    }

    /// `(N, ns/op)` pairs for one series.
    pub fn points(&self, operation: Operation, structure: Structure) -> Vec<(f64, f64)> {
        self.sizes
            .iter()
            .zip(self.values(operation, structure))
            .map(|(&n, &v)| (n as f64, v))
            .collect()
    }

    /// Largest value across the series of one operation.
    pub fn max(&self, operation: Operation) -> f64 {
        self.table(operation)
            .iter()
            .flatten()
            .copied()
            .fold(0.0, f64::max)
    }

    fn table(&self, operation: Operation) -> &[Vec<f64>; Structure::COUNT] {
        match operation {
            Operation::Insert => &self.insert,
            Operation::Lookup => &self.lookup,
        }
    }

    /// Aligned text rendering of one operation's table.
    pub fn format_table(&self, operation: Operation) -> Vec<String> {
        let mut lines = Vec::with_capacity(Structure::COUNT + 1);

        let mut header = format!("{:<16}", format!("{} (ns/op)", operation.name()));
        for n in &self.sizes {
            let _ = write!(header, "{:>12}", format!("N={}", n));
        }
        lines.push(header);

        for (structure, values) in self.series(operation) {
            let mut row = format!("  {:<14}", structure.label());
            for v in values {
                let _ = write!(row, "{:>12.0}", v);
            }
            lines.push(row);
        }
        lines
    }
}
