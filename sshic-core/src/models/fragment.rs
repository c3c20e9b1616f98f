use std::path::{Path, PathBuf};

use fxhash::FxHashMap as HashMap;

use crate::consts::{
    FRAGMENT_CHR_COL_NAME, FRAGMENT_END_COL_NAME, FRAGMENT_GC_COL_NAME, FRAGMENT_SIZE_COL_NAME,
    FRAGMENT_START_COL_NAME,
};
use crate::errors::{Result, SshicError};
use crate::io::DelimitedTable;

///
/// A restriction fragment: the atomic unit of the contact matrix.
///
/// The id is the fragment's row in the fragment list, which is also its genomic order.
///
#[derive(Debug, Clone, PartialEq)]
pub struct Fragment {
    pub id: u32,
    pub chr: String,
    pub start: u64,
    pub end: u64,
    pub size: u64,
    pub gc_content: f64,
}

impl Fragment {
    /// Build a fragment with no GC content information. The id is assigned by [FragmentList].
    pub fn new(chr: &str, start: u64, end: u64) -> Self {
        Fragment {
            id: 0,
            chr: chr.to_string(),
            start,
            end,
            size: end.saturating_sub(start),
            gc_content: f64::NAN,
        }
    }

    /// Whether `position` lies in the half-open interval [start, end).
    pub fn contains(&self, position: i64) -> bool {
        position >= self.start as i64 && position < self.end as i64
    }
}

#[derive(Debug, Clone, Default)]
pub struct FragmentList {
    pub fragments: Vec<Fragment>,
    pub path: Option<PathBuf>,
}

impl FragmentList {
    pub fn get(&self, id: u32) -> Option<&Fragment> {
        self.fragments.get(id as usize)
    }

    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Fragment> {
        self.fragments.iter()
    }

    /// End of the last fragment of each chromosome.
    pub fn max_end_per_chr(&self) -> HashMap<String, u64> {
        let mut ends: HashMap<String, u64> = HashMap::default();
        for fragment in &self.fragments {
            let end = ends.entry(fragment.chr.clone()).or_insert(0);
            *end = (*end).max(fragment.end);
        }
        ends
    }
}

impl From<Vec<Fragment>> for FragmentList {
    fn from(fragments: Vec<Fragment>) -> Self {
        let fragments = fragments
            .into_iter()
            .enumerate()
            .map(|(id, fragment)| Fragment {
                id: id as u32,
                ..fragment
            })
            .collect();
        FragmentList {
            fragments,
            path: None,
        }
    }
}

impl TryFrom<&Path> for FragmentList {
    type Error = SshicError;

    ///
    /// Read a fragment list (hicstuff `fragments_list.txt`).
    ///
    /// # Arguments:
    /// - value: path to the fragment list on disk.
    fn try_from(value: &Path) -> Result<Self> {
        let table = DelimitedTable::read(value, true)?;

        let chr_col = table.column(FRAGMENT_CHR_COL_NAME)?;
        let start_col = table.column(FRAGMENT_START_COL_NAME)?;
        let end_col = table.column(FRAGMENT_END_COL_NAME)?;
        let size_col = table.column(FRAGMENT_SIZE_COL_NAME)?;
        let gc_col = table.optional_column(FRAGMENT_GC_COL_NAME);

        let mut fragments = Vec::with_capacity(table.len());
        for row in 0..table.len() {
            let gc_content = match gc_col {
                Some(col) => table.optional_f64(row, col)?.unwrap_or(f64::NAN),
                None => f64::NAN,
            };
            fragments.push(Fragment {
                id: row as u32,
                chr: table.text(row, chr_col)?.to_string(),
                start: table.field(row, start_col)?,
                end: table.field(row, end_col)?,
                size: table.field(row, size_col)?,
                gc_content,
            });
        }

        Ok(FragmentList {
            fragments,
            path: Some(value.to_owned()),
        })
    }
}

impl TryFrom<&str> for FragmentList {
    type Error = SshicError;

    fn try_from(value: &str) -> Result<Self> {
        FragmentList::try_from(Path::new(value))
    }
}

impl TryFrom<PathBuf> for FragmentList {
    type Error = SshicError;

    fn try_from(value: PathBuf) -> Result<Self> {
        FragmentList::try_from(value.as_path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::*;

    #[rstest]
    #[case(99, false)]
    #[case(100, true)]
    #[case(199, true)]
    #[case(200, false)]
    fn test_half_open_containment(#[case] position: i64, #[case] expected: bool) {
        let fragment = Fragment::new("chr1", 100, 200);
        assert_eq!(fragment.contains(position), expected);
    }

    #[rstest]
    fn test_read_fragment_list() {
        let tempdir = tempfile::tempdir().unwrap();
        let path = tempdir.path().join("fragments_list.txt");
        std::fs::write(
            &path,
            "id\tchrom\tstart_pos\tend_pos\tsize\tgc_content\n\
             1\tchr1\t0\t100\t100\t0.4\n\
             2\tchr1\t100\t200\t100\t0.35\n\
             3\tchr2\t0\t50\t50\tnan\n",
        )
        .unwrap();

        let fragments = FragmentList::try_from(path.as_path()).unwrap();
        assert_eq!(fragments.len(), 3);
        assert_eq!(fragments.get(1).unwrap().start, 100);
        assert_eq!(fragments.get(2).unwrap().id, 2);
        assert!(fragments.get(2).unwrap().gc_content.is_nan());
        assert_eq!(fragments.max_end_per_chr().get("chr1"), Some(&200));
    }

    #[rstest]
    fn test_ids_follow_row_order() {
        let fragments = FragmentList::from(vec![
            Fragment::new("chr1", 0, 10),
            Fragment::new("chr1", 10, 20),
        ]);
        let ids: Vec<u32> = fragments.iter().map(|f| f.id).collect();
        assert_eq!(ids, vec![0, 1]);
    }
}
