use log::debug;

use fxhash::FxHashMap as HashMap;
use sshic_core::consts::ARTIFICIAL_CHROMOSOME;
use sshic_core::io::{format_value, TsvWrite};
use sshic_core::models::{BoundProbe, ChromosomeOrder, Fragment, FragmentList, ProbeSet};
use sshic_core::{Result, SshicError};

/// Direction in which a chromosome's fragments are scanned for a probe's containing fragment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchDirection {
    /// First qualifying fragment wins.
    #[default]
    Forward,
    /// Last qualifying fragment wins.
    Reverse,
}

#[derive(Debug, Clone)]
pub struct AssociationOptions {
    /// Chromosomes scanned from their last fragment backwards.
    pub reverse_search: Vec<String>,
}

impl AssociationOptions {
    pub fn direction(&self, chr: &str) -> SearchDirection {
        if self.reverse_search.iter().any(|c| c == chr) {
            SearchDirection::Reverse
        } else {
            SearchDirection::Forward
        }
    }
}

impl Default for AssociationOptions {
    fn default() -> Self {
        AssociationOptions {
            reverse_search: vec![ARTIFICIAL_CHROMOSOME.to_string()],
        }
    }
}

///
/// Find the fragment of `chr` whose half-open interval contains `position`.
///
/// # Arguments
/// - fragments: fragments of a single chromosome, in genomic order
/// - position: the position to look up
/// - direction: which end of the chromosome the scan starts from
///
pub fn find_containing_fragment<'a>(
    fragments: &[&'a Fragment],
    position: i64,
    direction: SearchDirection,
) -> Option<&'a Fragment> {
    match direction {
        SearchDirection::Forward => fragments.iter().find(|f| f.contains(position)).copied(),
        SearchDirection::Reverse => fragments.iter().rev().find(|f| f.contains(position)).copied(),
    }
}

///
/// The probe-to-fragment table: every probe of the run with the fragment it is bound to,
/// sorted by chromosome then probe start.
///
#[derive(Debug, Clone, Default)]
pub struct ProbeFragments {
    pub probes: Vec<BoundProbe>,
}

impl ProbeFragments {
    pub fn len(&self) -> usize {
        self.probes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.probes.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, BoundProbe> {
        self.probes.iter()
    }

    pub fn names(&self) -> Vec<String> {
        self.probes.iter().map(|p| p.name().to_string()).collect()
    }

    pub fn get(&self, name: &str) -> Option<&BoundProbe> {
        self.probes.iter().find(|p| p.name() == name)
    }

    /// Probes grouped by the id of the fragment they are bound to.
    pub fn by_fragment(&self) -> HashMap<u32, Vec<&BoundProbe>> {
        let mut map: HashMap<u32, Vec<&BoundProbe>> = HashMap::default();
        for probe in &self.probes {
            map.entry(probe.fragment_id()).or_default().push(probe);
        }
        map
    }

    /// Chromosome of each probe, keyed by probe name.
    pub fn chromosomes(&self) -> HashMap<String, String> {
        self.probes
            .iter()
            .map(|p| (p.name().to_string(), p.chr().to_string()))
            .collect()
    }
}

impl TsvWrite for ProbeFragments {
    fn header(&self) -> Vec<String> {
        [
            "frag", "chr", "start", "end", "size", "gc_content", "name", "type", "probe_start",
            "probe_end", "sequence",
        ]
        .iter()
        .map(|c| c.to_string())
        .collect()
    }

    fn records(&self) -> Vec<Vec<String>> {
        self.probes
            .iter()
            .map(|p| {
                let gc = Some(p.fragment.gc_content).filter(|gc| !gc.is_nan());
                vec![
                    p.fragment.id.to_string(),
                    p.fragment.chr.clone(),
                    p.fragment.start.to_string(),
                    p.fragment.end.to_string(),
                    p.fragment.size.to_string(),
                    format_value(gc),
                    p.probe.name.clone(),
                    p.probe.kind.clone(),
                    p.probe.start.to_string(),
                    p.probe.end.to_string(),
                    p.probe.sequence.clone().unwrap_or_default(),
                ]
            })
            .collect()
    }
}

///
/// Bind every probe to the fragment containing its midpoint, on the probe's own chromosome.
///
/// Probes are sorted by chromosome then start first. A probe whose midpoint falls outside
/// every fragment of its chromosome aborts the association.
///
pub fn associate_probes(
    fragments: &FragmentList,
    probes: &ProbeSet,
    order: &ChromosomeOrder,
    options: &AssociationOptions,
) -> Result<ProbeFragments> {
    let mut probes = probes.clone();
    probes.sort_by_position(order);

    let mut by_chr: HashMap<&str, Vec<&Fragment>> = HashMap::default();
    for fragment in fragments.iter() {
        by_chr.entry(fragment.chr.as_str()).or_default().push(fragment);
    }

    let mut bound = Vec::with_capacity(probes.len());
    for probe in probes.probes {
        let midpoint = probe.midpoint();
        let candidates = by_chr.get(probe.chr.as_str()).map(|v| v.as_slice()).unwrap_or(&[]);
        let direction = options.direction(&probe.chr);

        let fragment = find_containing_fragment(candidates, midpoint, direction).ok_or_else(|| {
            SshicError::NoContainingFragment {
                probe: probe.name.clone(),
                chr: probe.chr.clone(),
                midpoint,
            }
        })?;

        debug!(
            "probe {} ({}:{}) bound to fragment {}",
            probe.name, probe.chr, midpoint, fragment.id
        );
        bound.push(BoundProbe {
            probe,
            fragment: fragment.clone(),
        });
    }

    Ok(ProbeFragments { probes: bound })
}
