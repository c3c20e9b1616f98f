use std::cmp::Ordering;

use fxhash::FxHashMap as HashMap;

use crate::consts::DEFAULT_CHROMOSOME_ORDER;
use crate::models::{FragmentList, LandmarkTable};

///
/// Explicit total order over chromosome names, shared by every stage that sorts by chromosome.
///
/// Chromosomes missing from the list sort after every listed one, then by name.
///
#[derive(Debug, Clone)]
pub struct ChromosomeOrder {
    names: Vec<String>,
    ranks: HashMap<String, usize>,
}

impl ChromosomeOrder {
    pub fn new<S: AsRef<str>>(names: &[S]) -> Self {
        let mut order = ChromosomeOrder {
            names: Vec::with_capacity(names.len()),
            ranks: HashMap::default(),
        };
        for name in names {
            let name = name.as_ref();
            if !order.ranks.contains_key(name) {
                order.ranks.insert(name.to_string(), order.names.len());
                order.names.push(name.to_string());
            }
        }
        order
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn rank(&self, chr: &str) -> usize {
        self.ranks.get(chr).copied().unwrap_or(self.names.len())
    }

    pub fn key<'a>(&self, chr: &'a str) -> (usize, &'a str) {
        (self.rank(chr), chr)
    }

    pub fn compare(&self, a: &str, b: &str) -> Ordering {
        self.key(a).cmp(&self.key(b))
    }

    pub fn sort<S: AsRef<str>>(&self, chromosomes: &mut [S]) {
        chromosomes.sort_by(|a, b| self.compare(a.as_ref(), b.as_ref()));
    }
}

impl Default for ChromosomeOrder {
    fn default() -> Self {
        ChromosomeOrder::new(&DEFAULT_CHROMOSOME_ORDER)
    }
}

///
/// Chromosome lengths in base pairs.
///
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChromosomeSizes {
    sizes: HashMap<String, u64>,
}

impl ChromosomeSizes {
    ///
    /// Resolve chromosome lengths from the landmark table, falling back to the end of the
    /// last fragment for chromosomes the table gives no length for (or does not list).
    ///
    pub fn resolve(landmarks: &LandmarkTable, fragments: &FragmentList) -> Self {
        let mut sizes = fragments.max_end_per_chr();
        for landmark in &landmarks.landmarks {
            if let Some(length) = landmark.length {
                sizes.insert(landmark.chr.clone(), length);
            }
        }
        ChromosomeSizes { sizes }
    }

    pub fn get(&self, chr: &str) -> Option<u64> {
        self.sizes.get(chr).copied()
    }

    pub fn insert(&mut self, chr: &str, size: u64) {
        self.sizes.insert(chr.to_string(), size);
    }

    pub fn len(&self) -> usize {
        self.sizes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sizes.is_empty()
    }

    /// Sum of all chromosome lengths except `chr`.
    pub fn total_excluding(&self, chr: &str) -> u64 {
        self.sizes
            .iter()
            .filter(|(c, _)| c.as_str() != chr)
            .map(|(_, s)| *s)
            .sum()
    }

    /// Chromosomes and their lengths in canonical order.
    pub fn ordered(&self, order: &ChromosomeOrder) -> Vec<(String, u64)> {
        let mut sizes: Vec<(String, u64)> = self
            .sizes
            .iter()
            .map(|(c, s)| (c.clone(), *s))
            .collect();
        sizes.sort_by(|a, b| order.compare(&a.0, &b.0));
        sizes
    }
}

impl<S: AsRef<str>> FromIterator<(S, u64)> for ChromosomeSizes {
    fn from_iter<T: IntoIterator<Item = (S, u64)>>(iter: T) -> Self {
        ChromosomeSizes {
            sizes: iter
                .into_iter()
                .map(|(c, s)| (c.as_ref().to_string(), s))
                .collect(),
        }
    }
}
