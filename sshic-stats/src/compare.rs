use std::path::Path;

use log::{info, warn};

use fxhash::FxHashMap as HashMap;
use sshic_core::Result;

use crate::statistics::GlobalStatistics;

///
/// Capture efficiencies of a reference sample, keyed by probe name.
///
#[derive(Debug, Clone, Default)]
pub struct ReferenceEfficiency {
    pub name: String,
    efficiencies: HashMap<String, Option<f64>>,
}

impl ReferenceEfficiency {
    pub fn from_statistics(name: &str, stats: &GlobalStatistics) -> Self {
        ReferenceEfficiency {
            name: name.to_string(),
            efficiencies: stats
                .probes
                .iter()
                .map(|p| (p.probe.clone(), p.capture_efficiency))
                .collect(),
        }
    }

    /// Read the global statistics table of a reference sample.
    pub fn from_tsv<P: AsRef<Path>>(name: &str, path: P) -> Result<Self> {
        let stats = GlobalStatistics::from_tsv(path)?;
        Ok(Self::from_statistics(name, &stats))
    }

    /// `None` when the probe is absent from the reference or its efficiency is unset.
    pub fn get(&self, probe: &str) -> Option<f64> {
        self.efficiencies.get(probe).copied().flatten()
    }

    pub fn contains(&self, probe: &str) -> bool {
        self.efficiencies.contains_key(probe)
    }
}

/// Ratio of a sample's capture efficiency to a reference's, unset when the reference is not positive.
pub fn relative_efficiency(sample: Option<f64>, reference: Option<f64>) -> Option<f64> {
    match (sample, reference) {
        (Some(sample), Some(reference)) if reference > 0.0 => Some(sample / reference),
        _ => None,
    }
}

///
/// Add one `capture_efficiency_vs_<reference>` column per reference to a statistics table.
///
/// Probes missing from a reference, or whose reference efficiency is not positive, are left
/// unset. A reference already compared against is recomputed in place.
///
pub fn compare_to_references(
    mut stats: GlobalStatistics,
    references: &[ReferenceEfficiency],
) -> GlobalStatistics {
    for reference in references {
        let idx = match stats.reference_index(&reference.name) {
            Some(idx) => idx,
            None => {
                stats.references.push(reference.name.clone());
                for p in stats.probes.iter_mut() {
                    p.relative_efficiency.push(None);
                }
                stats.references.len() - 1
            }
        };

        let mut missing = 0;
        for p in stats.probes.iter_mut() {
            if !reference.contains(&p.probe) {
                missing += 1;
            }
            p.relative_efficiency[idx] =
                relative_efficiency(p.capture_efficiency, reference.get(&p.probe));
        }

        if missing > 0 {
            warn!(
                "{} probes have no capture efficiency in reference {}",
                missing, reference.name
            );
        }
        info!("compared capture efficiency against {}", reference.name);
    }

    stats
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::*;
    use sshic_core::io::TsvWrite;
    use tempfile::tempdir;

    use crate::statistics::ProbeStatistics;

    fn row(probe: &str, capture_efficiency: Option<f64>) -> ProbeStatistics {
        ProbeStatistics {
            probe: probe.to_string(),
            chr: "chr1".to_string(),
            fragment: 0,
            kind: "ds".to_string(),
            contacts: 0.0,
            coverage_over_hic_contacts: 0.0,
            cis: 0.0,
            trans: 0.0,
            intra_chr: 0.0,
            inter_chr: 0.0,
            capture_efficiency,
            relative_efficiency: Vec::new(),
        }
    }

    fn stats(rows: Vec<ProbeStatistics>) -> GlobalStatistics {
        GlobalStatistics {
            references: Vec::new(),
            probes: rows,
        }
    }

    #[rstest]
    #[case(Some(2.0), Some(4.0), Some(0.5))]
    #[case(Some(2.0), Some(0.0), None)]
    #[case(Some(2.0), Some(-1.0), None)]
    #[case(None, Some(1.0), None)]
    #[case(Some(1.0), None, None)]
    fn test_relative_efficiency(
        #[case] sample: Option<f64>,
        #[case] reference: Option<f64>,
        #[case] expected: Option<f64>,
    ) {
        assert_eq!(relative_efficiency(sample, reference), expected);
    }

    #[rstest]
    fn test_compare_adds_one_column_per_reference() {
        let sample = stats(vec![row("P1", Some(2.0)), row("P2", Some(1.0)), row("P3", Some(1.0))]);
        let wt = ReferenceEfficiency::from_statistics(
            "wt",
            &stats(vec![row("P1", Some(1.0)), row("P2", Some(0.0))]),
        );
        let other = ReferenceEfficiency::from_statistics("other", &stats(vec![row("P1", Some(4.0))]));

        let compared = compare_to_references(sample, &[wt, other]);

        assert_eq!(compared.references, vec!["wt", "other"]);
        assert_eq!(compared.relative_efficiency("P1", "wt"), Some(2.0));
        assert_eq!(compared.relative_efficiency("P1", "other"), Some(0.5));
        assert_eq!(compared.relative_efficiency("P2", "wt"), None);
        assert_eq!(compared.relative_efficiency("P3", "wt"), None);
    }

    #[rstest]
    fn test_compare_is_idempotent() {
        let sample = stats(vec![row("P1", Some(2.0))]);
        let wt = ReferenceEfficiency::from_statistics("wt", &stats(vec![row("P1", Some(1.0))]));

        let once = compare_to_references(sample, std::slice::from_ref(&wt));
        let twice = compare_to_references(once.clone(), std::slice::from_ref(&wt));
        assert_eq!(once, twice);
    }

    #[rstest]
    fn test_reference_from_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("wt_global_statistics.tsv");
        stats(vec![row("P1", Some(1.5)), row("P2", None)])
            .write_tsv(&path)
            .unwrap();

        let reference = ReferenceEfficiency::from_tsv("wt", &path).unwrap();
        assert_eq!(reference.get("P1"), Some(1.5));
        assert_eq!(reference.get("P2"), None);
        assert!(reference.contains("P2"));
        assert!(!reference.contains("P3"));
    }
}
