use std::path::{Path, PathBuf};

use crate::consts::{
    PROBE_CHR_COL_NAME, PROBE_END_COL_NAME, PROBE_NAME_COL_NAME, PROBE_SEQUENCE_COL_NAME,
    PROBE_START_COL_NAME, PROBE_TYPE_COL_NAME,
};
use crate::errors::{Result, SshicError};
use crate::io::DelimitedTable;
use crate::models::{ChromosomeOrder, Fragment};

///
/// A capture oligonucleotide as listed in the probe table.
///
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Probe {
    pub name: String,
    /// Category label, e.g. `ds` (double-stranded) or `ss`.
    pub kind: String,
    pub chr: String,
    pub start: u64,
    pub end: u64,
    pub sequence: Option<String>,
}

impl Probe {
    /// Midpoint used to anchor the probe: `floor((end - start - 1) / 2) + start - 1`.
    pub fn midpoint(&self) -> i64 {
        let start = self.start as i64;
        let end = self.end as i64;
        (end - start - 1).div_euclid(2) + start - 1
    }

    pub fn is_kind(&self, kind: &str) -> bool {
        self.kind == kind
    }
}

///
/// Probe list, normalized: column names are matched case-insensitively and probes are
/// sorted by chromosome (canonical order) then start.
///
#[derive(Debug, Clone, Default)]
pub struct ProbeSet {
    pub probes: Vec<Probe>,
    pub path: Option<PathBuf>,
}

impl ProbeSet {
    pub fn len(&self) -> usize {
        self.probes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.probes.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Probe> {
        self.probes.iter()
    }

    pub fn sort_by_position(&mut self, order: &ChromosomeOrder) {
        self.probes.sort_by(|a, b| {
            order
                .compare(&a.chr, &b.chr)
                .then(a.start.cmp(&b.start))
        });
    }
}

impl From<Vec<Probe>> for ProbeSet {
    fn from(probes: Vec<Probe>) -> Self {
        ProbeSet { probes, path: None }
    }
}

impl TryFrom<&Path> for ProbeSet {
    type Error = SshicError;

    ///
    /// Read the probe (capture oligo) table, comma or tab separated.
    ///
    /// # Arguments:
    /// - value: path to the probe table on disk.
    fn try_from(value: &Path) -> Result<Self> {
        let table = DelimitedTable::read(value, true)?;

        let name_col = table.column(PROBE_NAME_COL_NAME)?;
        let type_col = table.column(PROBE_TYPE_COL_NAME)?;
        let chr_col = table.column(PROBE_CHR_COL_NAME)?;
        let start_col = table.column(PROBE_START_COL_NAME)?;
        let end_col = table.column(PROBE_END_COL_NAME)?;
        let sequence_col = table.optional_column(PROBE_SEQUENCE_COL_NAME);

        let mut probes = Vec::with_capacity(table.len());
        for row in 0..table.len() {
            let sequence = match sequence_col {
                Some(col) => Some(table.text(row, col)?.to_string()).filter(|s| !s.is_empty()),
                None => None,
            };
            probes.push(Probe {
                name: table.text(row, name_col)?.to_string(),
                kind: table.text(row, type_col)?.to_string(),
                chr: table.text(row, chr_col)?.to_string(),
                start: table.field(row, start_col)?,
                end: table.field(row, end_col)?,
                sequence,
            });
        }

        Ok(ProbeSet {
            probes,
            path: Some(value.to_owned()),
        })
    }
}

impl TryFrom<&str> for ProbeSet {
    type Error = SshicError;

    fn try_from(value: &str) -> Result<Self> {
        ProbeSet::try_from(Path::new(value))
    }
}

impl TryFrom<PathBuf> for ProbeSet {
    type Error = SshicError;

    fn try_from(value: PathBuf) -> Result<Self> {
        ProbeSet::try_from(value.as_path())
    }
}

///
/// A probe together with the fragment that contains its midpoint.
///
#[derive(Debug, Clone)]
pub struct BoundProbe {
    pub probe: Probe,
    pub fragment: Fragment,
}

impl BoundProbe {
    pub fn name(&self) -> &str {
        &self.probe.name
    }

    pub fn chr(&self) -> &str {
        &self.probe.chr
    }

    pub fn fragment_id(&self) -> u32 {
        self.fragment.id
    }

    /// Start of the probe once bound: the start of its fragment.
    pub fn start(&self) -> u64 {
        self.fragment.start
    }
}
