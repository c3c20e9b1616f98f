use sshic_core::models::{BinnedProfile, ChromosomeOrder, ChromosomeSizes, LandmarkTable};

/// Which landmark chromosomes are aligned on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LandmarkKind {
    Centromere,
    Telomere,
}

impl LandmarkKind {
    /// Suffix used in output file names.
    pub fn suffix(&self) -> &'static str {
        match self {
            LandmarkKind::Centromere => "cen",
            LandmarkKind::Telomere => "telo",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            LandmarkKind::Centromere => "centromeres",
            LandmarkKind::Telomere => "telomeres",
        }
    }
}

impl TryFrom<&str> for LandmarkKind {
    type Error = String;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.to_ascii_lowercase().as_str() {
            "centromere" | "centromeres" | "cen" => Ok(LandmarkKind::Centromere),
            "telomere" | "telomeres" | "telo" => Ok(LandmarkKind::Telomere),
            other => Err(format!("unknown landmark kind '{}'", other)),
        }
    }
}

///
/// A position a window is centered on.
///
/// A mirrored anchor counts offsets towards lower coordinates as positive, so that the
/// right arm of a chromosome reads in the same direction as the left one.
///
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Anchor {
    /// Column label in per-chromosome tables.
    pub label: String,
    pub chr: String,
    pub position: u64,
    pub mirrored: bool,
}

///
/// Anchors of every chromosome of the landmark table, in canonical order.
///
/// Centromere mode yields one anchor per chromosome. Telomere mode yields the left end
/// (position 0) and, when the chromosome length is known from the landmark table or
/// `sizes`, the mirrored right end.
///
pub fn anchors(
    kind: LandmarkKind,
    landmarks: &LandmarkTable,
    sizes: &ChromosomeSizes,
    order: &ChromosomeOrder,
) -> Vec<Anchor> {
    let mut anchors = Vec::new();
    for landmark in landmarks.sorted(order) {
        match kind {
            LandmarkKind::Centromere => anchors.push(Anchor {
                label: landmark.chr.clone(),
                chr: landmark.chr.clone(),
                position: landmark.position,
                mirrored: false,
            }),
            LandmarkKind::Telomere => {
                anchors.push(Anchor {
                    label: format!("{}_left", landmark.chr),
                    chr: landmark.chr.clone(),
                    position: 0,
                    mirrored: false,
                });
                if let Some(length) = landmark.length.or_else(|| sizes.get(&landmark.chr)) {
                    anchors.push(Anchor {
                        label: format!("{}_right", landmark.chr),
                        chr: landmark.chr.clone(),
                        position: length,
                        mirrored: true,
                    });
                }
            }
        }
    }
    anchors
}

///
/// The bins of one chromosome around one anchor, re-indexed relative to the anchor's bin.
///
#[derive(Debug, Clone, PartialEq)]
pub struct WindowSlice {
    pub label: String,
    pub chr: String,
    /// Signed offset of each retained bin, in bins.
    pub offsets: Vec<i64>,
    /// One column per probe, aligned with `offsets`.
    pub columns: Vec<Vec<Option<f64>>>,
}

impl WindowSlice {
    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }

    /// Value of a probe column at an offset, `None` if masked or not covered.
    pub fn value(&self, col: usize, offset: i64) -> Option<f64> {
        let row = self.offsets.iter().position(|&o| o == offset)?;
        self.columns[col][row]
    }
}

///
/// Slice the bins of `anchor.chr` whose start lies in
/// `[position - window - bin_size, position + window)`, clamped at 0.
///
/// The zero-bin is the last retained bin starting at or before the anchor, or the first
/// retained bin when the anchor precedes them all. Returns `None` when no bin is retained.
///
pub fn extract_window(
    profile: &BinnedProfile,
    anchor: &Anchor,
    window: u64,
    bin_size: u64,
) -> Option<WindowSlice> {
    let low = anchor.position.saturating_sub(window + bin_size);
    let high = anchor.position + window;

    let rows: Vec<usize> = profile
        .keys
        .iter()
        .enumerate()
        .filter(|(_, k)| k.chr == anchor.chr && k.start >= low && k.start < high)
        .map(|(i, _)| i)
        .collect();
    if rows.is_empty() {
        return None;
    }

    let starts: Vec<u64> = rows.iter().map(|&r| profile.keys[r].start).collect();
    let zero = starts
        .iter()
        .filter(|&&s| s <= anchor.position)
        .max()
        .or_else(|| starts.iter().min())
        .copied()?;

    let offsets = starts
        .iter()
        .map(|&s| {
            let delta = (s as i64 - zero as i64).div_euclid(bin_size as i64);
            if anchor.mirrored { -delta } else { delta }
        })
        .collect();

    let columns = profile
        .columns
        .iter()
        .map(|column| rows.iter().map(|&r| column[r]).collect())
        .collect();

    Some(WindowSlice {
        label: anchor.label.clone(),
        chr: anchor.chr.clone(),
        offsets,
        columns,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::*;
    use sshic_core::models::{BinKey, Landmark};

    fn profile(chr: &str, n_bins: u64, bin_size: u64) -> BinnedProfile {
        let mut profile = BinnedProfile::new(vec!["P1".to_string()]);
        for i in 0..n_bins {
            profile.push_row(
                BinKey {
                    chr: chr.to_string(),
                    start: i * bin_size,
                },
                vec![Some(i as f64)],
            );
        }
        profile
    }

    fn anchor(chr: &str, position: u64, mirrored: bool) -> Anchor {
        Anchor {
            label: chr.to_string(),
            chr: chr.to_string(),
            position,
            mirrored,
        }
    }

    #[rstest]
    fn test_window_around_landmark() {
        let profile = profile("chr1", 30, 10);
        let slice = extract_window(&profile, &anchor("chr1", 150, false), 40, 10).unwrap();

        // bins 10..=18, the landmark bin 15 at offset 0
        assert_eq!(slice.offsets, (-5..=3).collect::<Vec<i64>>());
        assert_eq!(slice.value(0, 0), Some(15.0));
        assert_eq!(slice.value(0, -5), Some(10.0));
        assert_eq!(slice.value(0, 3), Some(18.0));
    }

    #[rstest]
    fn test_zero_bin_does_not_exceed_landmark() {
        let profile = profile("chr1", 30, 10);
        let slice = extract_window(&profile, &anchor("chr1", 157, false), 40, 10).unwrap();
        assert_eq!(slice.value(0, 0), Some(15.0));
    }

    #[rstest]
    fn test_window_clamped_at_chromosome_start() {
        let profile = profile("chr1", 30, 10);
        let slice = extract_window(&profile, &anchor("chr1", 20, false), 40, 10).unwrap();
        assert_eq!(slice.offsets, (-2..=3).collect::<Vec<i64>>());
        assert_eq!(slice.value(0, 0), Some(2.0));
    }

    #[rstest]
    fn test_mirrored_anchor_counts_inwards() {
        let profile = profile("chr1", 30, 10);
        let slice = extract_window(&profile, &anchor("chr1", 300, true), 40, 10).unwrap();
        assert_eq!(slice.value(0, 0), Some(29.0));
        assert_eq!(slice.value(0, 3), Some(26.0));
        assert_eq!(slice.offsets.iter().min(), Some(&0));
    }

    #[rstest]
    fn test_empty_window() {
        let profile = profile("chr1", 30, 10);
        assert!(extract_window(&profile, &anchor("chr2", 150, false), 40, 10).is_none());
        assert!(extract_window(&profile, &anchor("chr1", 5000, false), 40, 10).is_none());
    }

    #[rstest]
    fn test_telomere_anchors() {
        let landmarks = LandmarkTable::from(vec![
            Landmark {
                chr: "chr2".to_string(),
                position: 238_207,
                length: Some(813_184),
            },
            Landmark {
                chr: "chr1".to_string(),
                position: 151_465,
                length: None,
            },
        ]);
        let sizes: ChromosomeSizes = [("chr1", 230_218_u64)].into_iter().collect();
        let order = ChromosomeOrder::default();

        let telomeres = anchors(LandmarkKind::Telomere, &landmarks, &sizes, &order);
        let summary: Vec<(&str, u64, bool)> = telomeres
            .iter()
            .map(|a| (a.label.as_str(), a.position, a.mirrored))
            .collect();
        assert_eq!(
            summary,
            vec![
                ("chr1_left", 0, false),
                ("chr1_right", 230_218, true),
                ("chr2_left", 0, false),
                ("chr2_right", 813_184, true),
            ]
        );

        let centromeres = anchors(LandmarkKind::Centromere, &landmarks, &sizes, &order);
        assert_eq!(centromeres.len(), 2);
        assert_eq!(centromeres[0].position, 151_465);
    }

    #[rstest]
    #[case("centromeres", Ok(LandmarkKind::Centromere))]
    #[case("telo", Ok(LandmarkKind::Telomere))]
    fn test_landmark_kind_from_str(
        #[case] value: &str,
        #[case] expected: Result<LandmarkKind, String>,
    ) {
        assert_eq!(LandmarkKind::try_from(value), expected);
    }
}
