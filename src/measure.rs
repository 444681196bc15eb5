// Copyright 2021 Twitter, Inc.
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Userspace rendition of the data structure benchmark.
//!
//! For each input size `N` we draw `N` random keys, time inserting all of
//! them into each structure, and then time looking every key up again. The
//! XArray stand-in is a `Vec` addressed by index, so its lookups are by
//! position `0..N`. Results are whole nanoseconds per operation.

use crate::data::{Measurements, Structure};
use crate::Error;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use strum::IntoEnumIterator;

use std::collections::{BTreeMap, HashMap, LinkedList};
use std::hint::black_box;
use std::time::{Duration, Instant};

pub struct Benchmark {
    sizes: Vec<u64>,
    seed: u64,
}

/// Insert and lookup cost of one structure at one size, in ns/op.
#[derive(Copy, Clone, Debug, PartialEq)]
struct Sample {
    insert: f64,
    lookup: f64,
}

fn per_op(elapsed: Duration, n: usize) -> f64 {
    if n == 0 {
        return 0.0;
    }
    (elapsed.as_nanos() / n as u128) as f64
}

fn time<F: FnOnce()>(f: F) -> Duration {
    let start = Instant::now();
    f();
    start.elapsed()
}

fn linked_list(keys: &[u64]) -> Sample {
    let mut list = LinkedList::new();
    let insert = time(|| {
        for &key in keys {
            list.push_front(key);
        }
    });
    let lookup = time(|| {
        for key in keys {
            black_box(list.iter().find(|v| *v == key));
        }
    });
    Sample {
        insert: per_op(insert, keys.len()),
        lookup: per_op(lookup, keys.len()),
    }
}

fn hash_table(keys: &[u64]) -> Sample {
    let mut map = HashMap::with_capacity(keys.len());
    let insert = time(|| {
        for &key in keys {
            map.insert(key, key);
        }
    });
    let lookup = time(|| {
        for key in keys {
            black_box(map.get(key));
        }
    });
    Sample {
        insert: per_op(insert, keys.len()),
        lookup: per_op(lookup, keys.len()),
    }
}

fn rb_tree(keys: &[u64]) -> Sample {
    let mut tree = BTreeMap::new();
    let insert = time(|| {
        for &key in keys {
            tree.insert(key, key);
        }
    });
    let lookup = time(|| {
        for key in keys {
            black_box(tree.get(key));
        }
    });
    Sample {
        insert: per_op(insert, keys.len()),
        lookup: per_op(lookup, keys.len()),
    }
}

fn xarray(keys: &[u64]) -> Sample {
    let mut array = Vec::new();
    let insert = time(|| {
        for &key in keys {
            array.push(key);
        }
    });
    let lookup = time(|| {
        for index in 0..keys.len() {
            black_box(array.get(index));
        }
    });
    Sample {
        insert: per_op(insert, keys.len()),
        lookup: per_op(lookup, keys.len()),
    }
}

impl Benchmark {
    pub fn new(sizes: Vec<u64>, seed: u64) -> Self {
        Self { sizes, seed }
    }

    pub fn run(&self) -> Result<Measurements, Error> {
        Measurements::placeholder(self.sizes.clone()).validate()?;

        let mut rng = SmallRng::seed_from_u64(self.seed);
        let mut insert: [Vec<f64>; Structure::COUNT] = Default::default();
        let mut lookup: [Vec<f64>; Structure::COUNT] = Default::default();

        for &n in &self.sizes {
            info!("measuring N={}", n);
            let keys: Vec<u64> = (0..n).map(|_| rng.gen()).collect();
            for structure in Structure::iter() {
                let sample = match structure {
                    Structure::LinkedList => linked_list(&keys),
                    Structure::HashTable => hash_table(&keys),
                    Structure::RbTree => rb_tree(&keys),
                    Structure::XArray => xarray(&keys),
                };
                debug!(
                    "N={} {}: insert {} ns/op lookup {} ns/op",
                    n,
                    structure.label(),
                    sample.insert,
                    sample.lookup
                );
                insert[structure.index()].push(sample.insert);
                lookup[structure.index()].push(sample.lookup);
            }
        }

        Measurements::new(self.sizes.clone(), insert, lookup)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Operation;

    #[test]
    fn nanoseconds_per_operation_are_whole() {
        assert_eq!(per_op(Duration::from_nanos(1000), 3), 333.0);
        assert_eq!(per_op(Duration::from_nanos(5), 10), 0.0);
        assert_eq!(per_op(Duration::from_secs(1), 0), 0.0);
    }

    #[test]
    fn fills_every_series() {
        let sizes = vec![10, 50, 200];
        let measurements = Benchmark::new(sizes.clone(), 7).run().unwrap();
        assert_eq!(measurements.sizes(), sizes.as_slice());
        for operation in [Operation::Insert, Operation::Lookup].iter() {
            for (_, values) in measurements.series(*operation) {
                assert_eq!(values.len(), sizes.len());
                assert!(values.iter().all(|v| *v >= 0.0 && v.fract() == 0.0));
            }
        }
    }

    #[test]
    fn rejects_bad_sizes() {
        assert!(matches!(
            Benchmark::new(vec![100, 10], 1).run(),
            Err(Error::InvalidSize(_))
        ));
        assert!(matches!(
            Benchmark::new(Vec::new(), 1).run(),
            Err(Error::InvalidSize(_))
        ));
    }

    #[test]
    fn timings_are_non_negative() {
        let keys: Vec<u64> = (0..64).map(|k| k * 3).collect();
        let samples = [
            linked_list(&keys),
            hash_table(&keys),
            rb_tree(&keys),
            xarray(&keys),
        ];
        for sample in samples.iter() {
            assert!(sample.insert >= 0.0);
            assert!(sample.lookup >= 0.0);
        }
    }
}
