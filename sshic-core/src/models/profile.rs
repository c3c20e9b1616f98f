//! Per-probe contact profiles.
//!
//! A profile is a column-major table: one row per genomic key (a fragment, or a bin), one
//! nullable value column per probe. `None` means "no data" and is never conflated with a
//! measured zero.
use std::fmt::Debug;
use std::hash::Hash;
use std::path::Path;

use fxhash::FxHashMap as HashMap;

use crate::consts::{CHR_BINS_COL_NAME, CHR_COL_NAME, SIZES_COL_NAME, START_COL_NAME};
use crate::errors::Result;
use crate::io::{format_value, DelimitedTable, TsvWrite};
use crate::models::ChromosomeOrder;

pub trait ProfileKey: Clone + Eq + Hash + Debug {
    /// Names of the columns holding the key, in output order.
    fn key_columns() -> &'static [&'static str];

    fn chr(&self) -> &str;

    fn start(&self) -> u64;

    /// Tie-break after `start` when sorting rows of the same chromosome.
    fn extent(&self) -> u64 {
        0
    }

    fn fields(&self) -> Vec<String>;

    fn from_fields(table: &DelimitedTable, row: usize, cols: &[usize]) -> Result<Self>;
}

/// Row key of an unbinned profile: one genomic fragment.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FragmentKey {
    pub chr: String,
    pub start: u64,
    pub size: u64,
}

impl ProfileKey for FragmentKey {
    fn key_columns() -> &'static [&'static str] {
        &[CHR_COL_NAME, START_COL_NAME, SIZES_COL_NAME]
    }

    fn chr(&self) -> &str {
        &self.chr
    }

    fn start(&self) -> u64 {
        self.start
    }

    fn extent(&self) -> u64 {
        self.size
    }

    fn fields(&self) -> Vec<String> {
        vec![self.chr.clone(), self.start.to_string(), self.size.to_string()]
    }

    fn from_fields(table: &DelimitedTable, row: usize, cols: &[usize]) -> Result<Self> {
        Ok(FragmentKey {
            chr: table.text(row, cols[0])?.to_string(),
            start: table.field(row, cols[1])?,
            size: table.field(row, cols[2])?,
        })
    }
}

/// Row key of a binned profile: the bin's start coordinate, `floor(start / bin_size) * bin_size`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BinKey {
    pub chr: String,
    pub start: u64,
}

impl BinKey {
    pub fn index(&self, bin_size: u64) -> u64 {
        self.start / bin_size
    }
}

impl ProfileKey for BinKey {
    fn key_columns() -> &'static [&'static str] {
        &[CHR_COL_NAME, CHR_BINS_COL_NAME]
    }

    fn chr(&self) -> &str {
        &self.chr
    }

    fn start(&self) -> u64 {
        self.start
    }

    fn fields(&self) -> Vec<String> {
        vec![self.chr.clone(), self.start.to_string()]
    }

    fn from_fields(table: &DelimitedTable, row: usize, cols: &[usize]) -> Result<Self> {
        Ok(BinKey {
            chr: table.text(row, cols[0])?.to_string(),
            start: table.field(row, cols[1])?,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Profile<K> {
    pub keys: Vec<K>,
    pub probes: Vec<String>,
    pub columns: Vec<Vec<Option<f64>>>,
}

pub type UnbinnedProfile = Profile<FragmentKey>;
pub type BinnedProfile = Profile<BinKey>;

impl<K: ProfileKey> Profile<K> {
    pub fn new(probes: Vec<String>) -> Self {
        let columns = vec![Vec::new(); probes.len()];
        Profile {
            keys: Vec::new(),
            probes,
            columns,
        }
    }

    /// Append a row. `values` holds one cell per probe, in column order.
    pub fn push_row(&mut self, key: K, values: Vec<Option<f64>>) {
        debug_assert_eq!(values.len(), self.probes.len());
        self.keys.push(key);
        for (column, value) in self.columns.iter_mut().zip(values) {
            column.push(value);
        }
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn probe_index(&self, probe: &str) -> Option<usize> {
        self.probes.iter().position(|p| p == probe)
    }

    pub fn column(&self, probe: &str) -> Option<&[Option<f64>]> {
        self.probe_index(probe).map(|i| self.columns[i].as_slice())
    }

    /// Sum of a probe column, nulls counted as zero.
    pub fn column_total(&self, col: usize) -> f64 {
        self.columns[col].iter().flatten().sum()
    }

    /// Per-chromosome sums of a probe column, nulls counted as zero.
    pub fn chromosome_totals(&self, col: usize) -> HashMap<String, f64> {
        let mut totals: HashMap<String, f64> = HashMap::default();
        for (key, value) in self.keys.iter().zip(&self.columns[col]) {
            *totals.entry(key.chr().to_string()).or_insert(0.0) += value.unwrap_or(0.0);
        }
        totals
    }

    ///
    /// Normalize every probe column by its own sum.
    ///
    /// A column summing to zero normalizes to zeros rather than dividing by zero; null cells
    /// stay null.
    ///
    pub fn frequencies(&self) -> Self {
        let columns = self
            .columns
            .iter()
            .enumerate()
            .map(|(col, values)| {
                let total = self.column_total(col);
                values
                    .iter()
                    .map(|v| v.map(|v| if total > 0.0 { v / total } else { 0.0 }))
                    .collect()
            })
            .collect();

        Profile {
            keys: self.keys.clone(),
            probes: self.probes.clone(),
            columns,
        }
    }

    /// Sort rows by canonical chromosome order, then start.
    pub fn sort_by_chromosome(&mut self, order: &ChromosomeOrder) {
        let mut idx: Vec<usize> = (0..self.keys.len()).collect();
        idx.sort_by(|&i, &j| {
            let (a, b) = (&self.keys[i], &self.keys[j]);
            order
                .compare(a.chr(), b.chr())
                .then(a.start().cmp(&b.start()))
                .then(a.extent().cmp(&b.extent()))
        });

        self.keys = idx.iter().map(|&i| self.keys[i].clone()).collect();
        for column in self.columns.iter_mut() {
            *column = idx.iter().map(|&i| column[i]).collect();
        }
    }

    ///
    /// Read a profile written by [TsvWrite::write_tsv]: key columns first, then one
    /// column per probe.
    ///
    pub fn from_tsv<P: AsRef<Path>>(path: P) -> Result<Self> {
        let table = DelimitedTable::read(path.as_ref(), true)?;

        let key_cols = K::key_columns()
            .iter()
            .map(|name| table.column(name))
            .collect::<Result<Vec<usize>>>()?;

        let probe_cols: Vec<usize> = (0..table.header.len())
            .filter(|c| !key_cols.contains(c))
            .collect();
        let probes = probe_cols
            .iter()
            .map(|&c| table.header[c].clone())
            .collect();

        let mut profile = Profile::new(probes);
        for row in 0..table.len() {
            let key = K::from_fields(&table, row, &key_cols)?;
            let values = probe_cols
                .iter()
                .map(|&c| table.optional_f64(row, c))
                .collect::<Result<Vec<Option<f64>>>>()?;
            profile.push_row(key, values);
        }

        Ok(profile)
    }
}

impl<K: ProfileKey> TsvWrite for Profile<K> {
    fn header(&self) -> Vec<String> {
        K::key_columns()
            .iter()
            .map(|c| c.to_string())
            .chain(self.probes.iter().cloned())
            .collect()
    }

    fn records(&self) -> Vec<Vec<String>> {
        (0..self.len())
            .map(|row| {
                let mut record = self.keys[row].fields();
                record.extend(self.columns.iter().map(|c| format_value(c[row])));
                record
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::*;

    fn key(chr: &str, start: u64) -> FragmentKey {
        FragmentKey {
            chr: chr.to_string(),
            start,
            size: 100,
        }
    }

    #[fixture]
    fn profile() -> UnbinnedProfile {
        let mut profile = Profile::new(vec!["P1".to_string(), "P2".to_string()]);
        profile.push_row(key("chr10", 0), vec![Some(2.0), Some(0.0)]);
        profile.push_row(key("chr2", 100), vec![Some(3.0), Some(0.0)]);
        profile.push_row(key("chr2", 0), vec![Some(5.0), None]);
        profile
    }

    #[rstest]
    fn test_frequencies_sum_to_one(profile: UnbinnedProfile) {
        let frequencies = profile.frequencies();
        assert!((frequencies.column_total(0) - 1.0).abs() < 1e-12);
        assert_eq!(frequencies.columns[0][2], Some(0.5));
    }

    #[rstest]
    fn test_zero_column_normalizes_to_zero(profile: UnbinnedProfile) {
        let frequencies = profile.frequencies();
        assert_eq!(frequencies.columns[1], vec![Some(0.0), Some(0.0), None]);
    }

    #[rstest]
    fn test_sort_by_chromosome(mut profile: UnbinnedProfile) {
        profile.sort_by_chromosome(&ChromosomeOrder::default());
        let keys: Vec<(&str, u64)> = profile.keys.iter().map(|k| (k.chr(), k.start)).collect();
        assert_eq!(keys, vec![("chr2", 0), ("chr2", 100), ("chr10", 0)]);
        assert_eq!(profile.columns[0], vec![Some(5.0), Some(3.0), Some(2.0)]);
        assert_eq!(profile.columns[1], vec![None, Some(0.0), Some(0.0)]);
    }

    #[rstest]
    fn test_chromosome_totals(profile: UnbinnedProfile) {
        let totals = profile.chromosome_totals(0);
        assert_eq!(totals.get("chr2"), Some(&8.0));
        assert_eq!(totals.get("chr10"), Some(&2.0));
    }

    #[rstest]
    fn test_write_and_read_back(profile: UnbinnedProfile) {
        let tempdir = tempfile::tempdir().unwrap();
        let path = tempdir.path().join("AD162_unbinned_contacts.tsv");
        profile.write_tsv(&path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("chr\tstart\tsizes\tP1\tP2\n"));

        let read_back = UnbinnedProfile::from_tsv(&path).unwrap();
        assert_eq!(read_back, profile);
    }

    #[rstest]
    fn test_bin_index() {
        let bin = BinKey {
            chr: "chr1".to_string(),
            start: 150,
        };
        assert_eq!(bin.index(10), 15);
    }
}
