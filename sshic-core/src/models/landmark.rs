use std::path::{Path, PathBuf};

use fxhash::FxHashMap as HashMap;

use crate::errors::{Result, SshicError};
use crate::io::DelimitedTable;
use crate::models::ChromosomeOrder;

///
/// A biologically fixed position on a chromosome (its centromere), with the chromosome
/// length when known.
///
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Landmark {
    pub chr: String,
    pub position: u64,
    pub length: Option<u64>,
}

///
/// Landmark table: one row per chromosome.
///
/// Columns are positional: chromosome, an unused column, landmark position and an
/// optional chromosome length.
///
#[derive(Debug, Clone, Default)]
pub struct LandmarkTable {
    pub landmarks: Vec<Landmark>,
    /// chromosome -> row, first row wins on duplicates
    index: HashMap<String, usize>,
}

impl From<Vec<Landmark>> for LandmarkTable {
    fn from(landmarks: Vec<Landmark>) -> Self {
        let mut index: HashMap<String, usize> = HashMap::default();
        for (i, landmark) in landmarks.iter().enumerate() {
            index.entry(landmark.chr.clone()).or_insert(i);
        }
        LandmarkTable { landmarks, index }
    }
}

impl LandmarkTable {
    pub fn get(&self, chr: &str) -> Option<&Landmark> {
        self.index.get(chr).map(|&i| &self.landmarks[i])
    }

    pub fn len(&self) -> usize {
        self.landmarks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.landmarks.is_empty()
    }

    /// Landmarks in canonical chromosome order.
    pub fn sorted(&self, order: &ChromosomeOrder) -> Vec<&Landmark> {
        let mut landmarks: Vec<&Landmark> = self.landmarks.iter().collect();
        landmarks.sort_by(|a, b| order.compare(&a.chr, &b.chr));
        landmarks
    }
}

impl TryFrom<&Path> for LandmarkTable {
    type Error = SshicError;

    fn try_from(value: &Path) -> Result<Self> {
        let table = DelimitedTable::read(value, true)?;

        let mut landmarks = Vec::with_capacity(table.len());
        for row in 0..table.len() {
            let length = match table.rows[row].get(3) {
                Some(raw) if !raw.is_empty() => Some(table.field(row, 3)?),
                _ => None,
            };
            landmarks.push(Landmark {
                chr: table.text(row, 0)?.to_string(),
                position: table.field(row, 2)?,
                length,
            });
        }

        Ok(LandmarkTable::from(landmarks))
    }
}

impl TryFrom<&str> for LandmarkTable {
    type Error = SshicError;

    fn try_from(value: &str) -> Result<Self> {
        LandmarkTable::try_from(Path::new(value))
    }
}

impl TryFrom<PathBuf> for LandmarkTable {
    type Error = SshicError;

    fn try_from(value: PathBuf) -> Result<Self> {
        LandmarkTable::try_from(value.as_path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::*;

    #[rstest]
    fn test_read_landmarks() {
        let tempdir = tempfile::tempdir().unwrap();
        let path = tempdir.path().join("S288c_chr_centro_coordinates.tsv");
        std::fs::write(
            &path,
            "chr\tarm\tcentro\tlength\n\
             chr2\tleft\t238207\t813184\n\
             chr1\tleft\t151584\t230218\n\
             chr3\tleft\t114385\n",
        )
        .unwrap();

        let landmarks = LandmarkTable::try_from(path.as_path()).unwrap();
        assert_eq!(landmarks.len(), 3);
        assert_eq!(landmarks.get("chr1").unwrap().position, 151584);
        assert_eq!(landmarks.get("chr3").unwrap().length, None);

        let order = ChromosomeOrder::default();
        let chroms: Vec<&str> = landmarks
            .sorted(&order)
            .iter()
            .map(|l| l.chr.as_str())
            .collect();
        assert_eq!(chroms, vec!["chr1", "chr2", "chr3"]);
    }

    #[rstest]
    fn test_lookup_by_chromosome() {
        let landmark = |chr: &str, position: u64| Landmark {
            chr: chr.to_string(),
            position,
            length: None,
        };
        let landmarks = LandmarkTable::from(vec![
            landmark("chr4", 449_711),
            landmark("chr1", 151_584),
            landmark("chr4", 1),
        ]);

        assert_eq!(landmarks.get("chr1").unwrap().position, 151_584);
        assert_eq!(landmarks.get("chr4").unwrap().position, 449_711);
        assert_eq!(landmarks.get("chr2"), None);
        assert_eq!(landmarks.len(), 3);
    }
}
