use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use sshic_aggregate::LandmarkKind;
use sshic_contacts::bin_suffix;

/// Sample id of a contact file: its file name up to the first `_` or `.`.
pub fn sample_id_from_path(path: &Path) -> String {
    let name = path.file_name().and_then(OsStr::to_str).unwrap_or_default();
    name.split(['_', '.']).next().unwrap_or(name).to_string()
}

///
/// Output layout of one sample:
///
/// ```text
/// <output>/<sample>/
///     <sample>_probes_to_fragments.tsv
///     <sample>_filtered.tsv
///     <sample>_global_statistics.tsv
///     <sample>_normalized_chr_freq.tsv
///     <sample>_normalized_inter_chr_freq.tsv
///     not_weighted/
///         <sample>_unbinned_{contacts,frequencies}.tsv
///         <sample>_<bin>_binned_{contacts,frequencies}.tsv
///         <centromeres|telomeres>/<no_norm|inter_norm>/...
///     weighted_<reference>/
///         (same as not_weighted)
/// ```
///
#[derive(Debug, Clone, PartialEq)]
pub struct SamplePaths {
    pub sample_id: String,
    pub sample_dir: PathBuf,
}

impl SamplePaths {
    pub fn new(output_dir: &Path, sample_id: &str) -> Self {
        SamplePaths {
            sample_id: sample_id.to_string(),
            sample_dir: output_dir.join(sample_id),
        }
    }

    fn in_sample_dir(&self, suffix: &str) -> PathBuf {
        self.sample_dir.join(format!("{}_{}", self.sample_id, suffix))
    }

    pub fn probes_to_fragments(&self) -> PathBuf {
        self.in_sample_dir("probes_to_fragments.tsv")
    }

    pub fn filtered(&self) -> PathBuf {
        self.in_sample_dir("filtered.tsv")
    }

    pub fn global_statistics(&self) -> PathBuf {
        self.in_sample_dir("global_statistics.tsv")
    }

    pub fn normalized_chr_freq(&self) -> PathBuf {
        self.in_sample_dir("normalized_chr_freq.tsv")
    }

    pub fn normalized_inter_chr_freq(&self) -> PathBuf {
        self.in_sample_dir("normalized_inter_chr_freq.tsv")
    }

    pub fn not_weighted_dir(&self) -> PathBuf {
        self.sample_dir.join("not_weighted")
    }

    pub fn weighted_dir(&self, reference: &str) -> PathBuf {
        self.sample_dir.join(format!("weighted_{}", reference))
    }

    pub fn unbinned_contacts(&self, dir: &Path) -> PathBuf {
        dir.join(format!("{}_unbinned_contacts.tsv", self.sample_id))
    }

    pub fn unbinned_frequencies(&self, dir: &Path) -> PathBuf {
        dir.join(format!("{}_unbinned_frequencies.tsv", self.sample_id))
    }

    pub fn binned_contacts(&self, dir: &Path, bin_size: u64) -> PathBuf {
        dir.join(format!(
            "{}_{}_binned_contacts.tsv",
            self.sample_id,
            bin_suffix(bin_size)
        ))
    }

    pub fn binned_frequencies(&self, dir: &Path, bin_size: u64) -> PathBuf {
        dir.join(format!(
            "{}_{}_binned_frequencies.tsv",
            self.sample_id,
            bin_suffix(bin_size)
        ))
    }

    pub fn aggregated_dir(&self, dir: &Path, kind: LandmarkKind, inter_normalized: bool) -> PathBuf {
        let norm = if inter_normalized { "inter_norm" } else { "no_norm" };
        dir.join(kind.name()).join(norm)
    }

    /// `<sample>_<statistic>_on_<cen|telo>.tsv` in an aggregated directory.
    pub fn aggregated(&self, dir: &Path, kind: LandmarkKind, statistic: &str) -> PathBuf {
        dir.join(format!(
            "{}_{}_on_{}.tsv",
            self.sample_id,
            statistic,
            kind.suffix()
        ))
    }

    /// Per-probe offset x chromosome table in an aggregated directory.
    pub fn probe_window(&self, dir: &Path, kind: LandmarkKind, probe: &str) -> PathBuf {
        dir.join(format!("{}_chr_{}.tsv", file_stem_of(probe), kind.suffix()))
    }
}

/// A name usable as a single path component: path separators become `_`, as does a bare `.` or `..`.
pub fn file_stem_of(name: &str) -> String {
    let stem: String = name
        .chars()
        .map(|c| if c == '/' || c == '\\' || c == '\0' { '_' } else { c })
        .collect();
    match stem.as_str() {
        "" | "." | ".." => "_".repeat(stem.len().max(1)),
        _ => stem,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::*;

    #[rstest]
    #[case("data/AD162_S288c_DSB_LY_Capture_artificial_cutsite_q30.txt", "AD162")]
    #[case("AD241.txt.gz", "AD241")]
    #[case("sample", "sample")]
    fn test_sample_id(#[case] path: &str, #[case] expected: &str) {
        assert_eq!(sample_id_from_path(Path::new(path)), expected);
    }

    #[rstest]
    #[case("Probe_chr1", "Probe_chr1")]
    #[case("Probe/chr1", "Probe_chr1")]
    #[case("../escape", ".._escape")]
    #[case("a\\b", "a_b")]
    #[case("..", "__")]
    #[case("", "_")]
    fn test_file_stem_of(#[case] name: &str, #[case] expected: &str) {
        assert_eq!(file_stem_of(name), expected);
    }

    #[rstest]
    fn test_probe_window_stays_in_directory() {
        let paths = SamplePaths::new(Path::new("/out"), "AD1");
        let dir = Path::new("/out/AD1/not_weighted/centromeres/no_norm");
        let path = paths.probe_window(dir, LandmarkKind::Centromere, "../../Probe/x");
        assert_eq!(path.parent(), Some(dir));
        assert_eq!(path, dir.join(".._.._Probe_x_chr_cen.tsv"));
    }

    #[rstest]
    fn test_layout() {
        let paths = SamplePaths::new(Path::new("/out"), "AD1");
        assert_eq!(paths.filtered(), PathBuf::from("/out/AD1/AD1_filtered.tsv"));

        let dir = paths.weighted_dir("wt");
        assert_eq!(
            paths.binned_frequencies(&dir, 10_000),
            PathBuf::from("/out/AD1/weighted_wt/AD1_10kb_binned_frequencies.tsv")
        );

        let agg = paths.aggregated_dir(&paths.not_weighted_dir(), LandmarkKind::Telomere, true);
        assert_eq!(agg, PathBuf::from("/out/AD1/not_weighted/telomeres/inter_norm"));
        assert_eq!(
            paths.aggregated(&agg, LandmarkKind::Telomere, "mean"),
            agg.join("AD1_mean_on_telo.tsv")
        );
        assert_eq!(
            paths.probe_window(&agg, LandmarkKind::Telomere, "Probe_chr1"),
            agg.join("Probe_chr1_chr_telo.tsv")
        );
    }
}
