// Copyright 2021 Twitter, Inc.
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Parser for the text report exported by the `lkp_ds` kernel module through
//! `/proc/lkp_ds_bench`. A data file is any number of such reports, one per
//! input size, concatenated:
//!
//! ```text
//! LKP Data Structure Benchmark (N=1000)
//! =======================================
//! Insert (ns/op):
//!   Linked list:    12
//!   Hash table:     40
//!   Red-black tree: 95
//!   XArray:         60
//!
//! Lookup (ns/op):
//!   Linked list:    1500
//!   ...
//! ```

use crate::data::{Measurements, Operation, Structure};
use crate::Error;

use strum::IntoEnumIterator;

use std::path::Path;

const HEADER_PREFIX: &str = "LKP Data Structure Benchmark (N=";

struct Block {
    size: u64,
    line: usize,
    insert: [Option<f64>; Structure::COUNT],
    lookup: [Option<f64>; Structure::COUNT],
}

impl Block {
    fn new(size: u64, line: usize) -> Self {
        Self {
            size,
            line,
            insert: [None; Structure::COUNT],
            lookup: [None; Structure::COUNT],
        }
    }

    fn slot(&mut self, operation: Operation, structure: Structure) -> &mut Option<f64> {
        match operation {
            Operation::Insert => &mut self.insert[structure.index()],
            Operation::Lookup => &mut self.lookup[structure.index()],
        }
    }

    fn check_complete(&self) -> Result<(), Error> {
        for (operation, values) in &[
            (Operation::Insert, &self.insert),
            (Operation::Lookup, &self.lookup),
        ] {
            let missing = values
                .iter()
                .zip(Structure::iter())
                .find(|(value, _)| value.is_none());
            if let Some((_, structure)) = missing {
                return Err(Error::data(
                    self.line,
                    format!(
                        "report for N={} has no {} value for {}",
                        self.size,
                        operation.name().to_lowercase(),
                        structure.label()
                    ),
                ));
            }
        }
        Ok(())
    }
}

/// Accepts both the module's spelling and the chart labels.
fn parse_structure(name: &str) -> Option<Structure> {
    match name.trim().to_lowercase().as_str() {
        "linked list" | "list" => Some(Structure::LinkedList),
        "hash table" | "hashtable" => Some(Structure::HashTable),
        "red-black tree" | "rb-tree" | "rbtree" => Some(Structure::RbTree),
        "xarray" => Some(Structure::XArray),
        _ => None,
    }
}

fn parse_section(line: &str) -> Option<Operation> {
    match line {
        "Insert (ns/op):" => Some(Operation::Insert),
        "Lookup (ns/op):" => Some(Operation::Lookup),
        _ => None,
    }
}

fn parse_header(line: &str, lineno: usize) -> Result<Option<u64>, Error> {
    let rest = match line.strip_prefix(HEADER_PREFIX) {
        Some(rest) => rest,
        None => return Ok(None),
    };
    let digits = rest
        .strip_suffix(')')
        .ok_or_else(|| Error::data(lineno, "unterminated report header"))?;
    digits
        .trim()
        .parse::<u64>()
        .map(Some)
        .map_err(|_| Error::data(lineno, format!("invalid entry count: {}", digits)))
}

/// Parses concatenated benchmark reports into a measurement table with sizes
/// sorted ascending.
pub fn parse(input: &str) -> Result<Measurements, Error> {
    let mut blocks: Vec<Block> = Vec::new();
    let mut section: Option<Operation> = None;

    for (i, raw) in input.lines().enumerate() {
        let lineno = i + 1;
        let line = raw.trim();

        if line.is_empty() || line.chars().all(|c| c == '=') {
            continue;
        }

        if let Some(size) = parse_header(line, lineno)? {
            if let Some(previous) = blocks.iter().find(|b| b.size == size) {
                return Err(Error::data(
                    lineno,
                    format!(
                        "duplicate report for N={} (first at line {})",
                        size, previous.line
                    ),
                ));
            }
            blocks.push(Block::new(size, lineno));
            section = None;
            continue;
        }

        if let Some(operation) = parse_section(line) {
            if blocks.is_empty() {
                return Err(Error::data(lineno, "section before any report header"));
            }
            section = Some(operation);
            continue;
        }

        let (name, value) = match line.split_once(':') {
            Some(pair) => pair,
            None => return Err(Error::data(lineno, format!("unrecognized line: {}", line))),
        };
        let structure = parse_structure(name).ok_or_else(|| {
            Error::data(lineno, format!("unknown data structure: {}", name.trim()))
        })?;
        let operation = section
            .ok_or_else(|| Error::data(lineno, "value outside of an insert or lookup section"))?;
        let value = value
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite() && *v >= 0.0)
            .ok_or_else(|| Error::data(lineno, format!("invalid ns/op value: {}", value.trim())))?;

        // a header always precedes a section, checked above
        if let Some(block) = blocks.last_mut() {
            let slot = block.slot(operation, structure);
            if slot.is_some() {
                return Err(Error::data(
                    lineno,
                    format!(
                        "{} {} given twice for N={}",
                        structure.label(),
                        operation.name().to_lowercase(),
                        block.size
                    ),
                ));
            }
            *slot = Some(value);
        }
    }

    if blocks.is_empty() {
        return Err(Error::EmptyReport);
    }

    for block in &blocks {
        block.check_complete()?;
    }

    blocks.sort_by_key(|b| b.size);

    let sizes = blocks.iter().map(|b| b.size).collect();
    let column = |op: Operation, s: Structure| -> Vec<f64> {
        blocks
            .iter()
            .map(|b| match op {
                Operation::Insert => b.insert[s.index()],
                Operation::Lookup => b.lookup[s.index()],
            })
            .map(|v| v.unwrap_or(0.0))
            .collect()
    };
    let table = |op: Operation| {
        [
            column(op, Structure::LinkedList),
            column(op, Structure::HashTable),
            column(op, Structure::RbTree),
            column(op, Structure::XArray),
        ]
    };

    Measurements::new(sizes, table(Operation::Insert), table(Operation::Lookup))
}

pub fn load<P: AsRef<Path>>(path: P) -> Result<Measurements, Error> {
    let content = std::fs::read_to_string(path.as_ref())?;
    parse(&content)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(n: u64, insert: [u64; 4], lookup: [u64; 4]) -> String {
        format!(
            "LKP Data Structure Benchmark (N={})\n\
             =======================================\n\
             Insert (ns/op):\n\
             \x20 Linked list:    {}\n\
             \x20 Hash table:     {}\n\
             \x20 Red-black tree: {}\n\
             \x20 XArray:         {}\n\
             \n\
             Lookup (ns/op):\n\
             \x20 Linked list:    {}\n\
             \x20 Hash table:     {}\n\
             \x20 Red-black tree: {}\n\
             \x20 XArray:         {}\n",
            n,
            insert[0],
            insert[1],
            insert[2],
            insert[3],
            lookup[0],
            lookup[1],
            lookup[2],
            lookup[3]
        )
    }

    fn expect_error(input: &str, line: usize, contains: &str) {
        match parse(input) {
            Err(Error::Data { line: l, reason }) => {
                assert_eq!(l, line, "{}", reason);
                assert!(reason.contains(contains), "{}", reason);
            }
            Err(e) => panic!("unexpected error: {}", e),
            Ok(_) => panic!("parse succeeded"),
        }
    }

    #[test]
    fn single_report() {
        let m = parse(&report(1000, [12, 40, 95, 60], [1500, 30, 80, 10])).unwrap();
        assert_eq!(m.sizes(), &[1000]);
        assert_eq!(m.values(Operation::Insert, Structure::RbTree), &[95.0]);
        assert_eq!(m.values(Operation::Lookup, Structure::LinkedList), &[1500.0]);
        assert_eq!(m.values(Operation::Lookup, Structure::XArray), &[10.0]);
    }

    #[test]
    fn reports_sorted_by_size() {
        let input = [
            report(5000, [3, 3, 3, 3], [30, 3, 3, 3]),
            report(100, [1, 1, 1, 1], [10, 1, 1, 1]),
            report(1000, [2, 2, 2, 2], [20, 2, 2, 2]),
        ]
        .concat();
        let m = parse(&input).unwrap();
        assert_eq!(m.sizes(), &[100, 1000, 5000]);
        assert_eq!(
            m.values(Operation::Lookup, Structure::LinkedList),
            &[10.0, 20.0, 30.0]
        );
    }

    #[test]
    fn chart_labels_accepted() {
        let input = "LKP Data Structure Benchmark (N=10)\n\
                     Insert (ns/op):\n\
                     Linked List: 1\nHash Table: 2\nRB-Tree: 3\nXArray: 4\n\
                     Lookup (ns/op):\n\
                     Linked List: 5\nHash Table: 6\nRB-Tree: 7\nXArray: 8\n";
        let m = parse(input).unwrap();
        assert_eq!(m.values(Operation::Lookup, Structure::RbTree), &[7.0]);
    }

    #[test]
    fn missing_value_names_structure() {
        let input = "LKP Data Structure Benchmark (N=10)\n\
                     Insert (ns/op):\n\
                     Linked List: 1\nHash Table: 2\nRB-Tree: 3\nXArray: 4\n\
                     Lookup (ns/op):\n\
                     Linked List: 5\nHash Table: 6\nRB-Tree: 7\n";
        expect_error(input, 1, "has no lookup value for XArray");

        let block = report(100, [1, 1, 1, 1], [1, 1, 1, 1]);
        let input = block.replace("  Hash table:     1\n", "");
        expect_error(&input, 1, "has no insert value for Hash Table");
    }

    #[test]
    fn incomplete_report() {
        let input = "LKP Data Structure Benchmark (N=10)\n\
                     Insert (ns/op):\n\
                     Linked list: 1\n";
        expect_error(input, 1, "no insert value for Hash Table");
    }

    #[test]
    fn duplicate_size() {
        let input = [
            report(100, [1, 1, 1, 1], [1, 1, 1, 1]),
            report(100, [1, 1, 1, 1], [1, 1, 1, 1]),
        ]
        .concat();
        expect_error(&input, 14, "duplicate report for N=100");
    }

    #[test]
    fn bad_lines() {
        expect_error("Insert (ns/op):\n", 1, "before any report header");
        expect_error(
            "LKP Data Structure Benchmark (N=10)\nLinked list: 1\n",
            2,
            "outside of an insert or lookup section",
        );
        expect_error(
            "LKP Data Structure Benchmark (N=10)\nInsert (ns/op):\nSkip list: 1\n",
            3,
            "unknown data structure: Skip list",
        );
        expect_error(
            "LKP Data Structure Benchmark (N=10)\nInsert (ns/op):\nXArray: fast\n",
            3,
            "invalid ns/op value: fast",
        );
        expect_error("LKP Data Structure Benchmark (N=ten)\n", 1, "invalid entry count");
        expect_error("hello\n", 1, "unrecognized line");
        assert!(matches!(parse(""), Err(Error::EmptyReport)));
        assert!(matches!(parse("\n=====\n\n"), Err(Error::EmptyReport)));
    }

    #[test]
    fn repeated_value() {
        let input = "LKP Data Structure Benchmark (N=10)\n\
                     Insert (ns/op):\n\
                     XArray: 1\n\
                     XArray: 2\n";
        expect_error(input, 4, "XArray insert given twice");
    }
}
