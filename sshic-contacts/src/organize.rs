use log::debug;

use fxhash::FxHashMap as HashMap;
use sshic_core::models::{ChromosomeOrder, FragmentKey, UnbinnedProfile};

use crate::associate::ProbeFragments;
use crate::filter::{FilteredContacts, Side};

///
/// Collapse the filtered contacts into one row per contacted fragment and one column per probe.
///
/// Each cell is the number of contacts between the probe's fragment and the row fragment.
/// A physical contact is counted once per probe even when the filtered table lists it in
/// both orientations, which is the case for a probe fragment contacting itself.
/// Every probe of `probes` gets a column; probes without any contact get an all-zero one.
///
pub fn organize_contacts(
    filtered: &FilteredContacts,
    probes: &ProbeFragments,
    order: &ChromosomeOrder,
) -> UnbinnedProfile {
    let names = probes.names();
    let column_of: HashMap<&str, usize> = names
        .iter()
        .enumerate()
        .map(|(i, name)| (name.as_str(), i))
        .collect();

    // per probe: unordered fragment pair -> (contacted fragment, count)
    let mut edges: Vec<HashMap<(u32, u32), (FragmentKey, u64)>> =
        vec![HashMap::default(); names.len()];

    for row in filtered.iter() {
        for side in [Side::A, Side::B] {
            let Some(tag) = &row.side(side).probe else {
                continue;
            };
            let Some(&col) = column_of.get(tag.name.as_str()) else {
                debug!("skipping contacts of unknown probe {}", tag.name);
                continue;
            };
            let other = &row.side(side.other()).fragment;
            let pair = (
                row.frag_a().min(row.frag_b()),
                row.frag_a().max(row.frag_b()),
            );
            edges[col].entry(pair).or_insert_with(|| {
                (
                    FragmentKey {
                        chr: other.chr.clone(),
                        start: other.start,
                        size: other.size,
                    },
                    row.contacts,
                )
            });
        }
    }

    let mut profile = UnbinnedProfile::new(names.clone());
    let mut row_of: HashMap<FragmentKey, usize> = HashMap::default();

    for (col, probe_edges) in edges.iter().enumerate() {
        if probe_edges.is_empty() {
            debug!("probe {} has no contacts", names[col]);
        }
        for (key, count) in probe_edges.values() {
            let row = match row_of.get(key) {
                Some(&row) => row,
                None => {
                    profile.push_row(key.clone(), vec![Some(0.0); names.len()]);
                    row_of.insert(key.clone(), profile.len() - 1);
                    profile.len() - 1
                }
            };
            let cell = &mut profile.columns[col][row];
            *cell = Some(cell.unwrap_or(0.0) + *count as f64);
        }
    }

    profile.sort_by_chromosome(order);
    profile
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::*;
    use sshic_core::models::{Contact, ContactList, Fragment, FragmentList, Probe, ProbeSet};

    use crate::associate::{associate_probes, AssociationOptions};
    use crate::filter::filter_contacts;

    fn probe(name: &str, chr: &str, start: u64, end: u64) -> Probe {
        Probe {
            name: name.to_string(),
            kind: "ds".to_string(),
            chr: chr.to_string(),
            start,
            end,
            sequence: None,
        }
    }

    fn contacts(rows: &[(u32, u32, u64)]) -> ContactList {
        ContactList::from(
            rows.iter()
                .map(|&(frag_a, frag_b, count)| Contact {
                    frag_a,
                    frag_b,
                    count,
                })
                .collect::<Vec<_>>(),
        )
    }

    #[fixture]
    fn fragments() -> FragmentList {
        FragmentList::from(vec![
            Fragment::new("chr1", 0, 100),
            Fragment::new("chr1", 100, 200),
            Fragment::new("chr1", 200, 300),
            Fragment::new("chr2", 0, 100),
            Fragment::new("chr2", 100, 250),
        ])
    }

    fn run(fragments: &FragmentList, probes: Vec<Probe>, raw: &[(u32, u32, u64)]) -> UnbinnedProfile {
        let order = ChromosomeOrder::default();
        let bound = associate_probes(
            fragments,
            &ProbeSet::from(probes),
            &order,
            &AssociationOptions::default(),
        )
        .unwrap();
        let filtered = filter_contacts(fragments, &bound, &contacts(raw)).unwrap();
        organize_contacts(&filtered, &bound, &order)
    }

    #[rstest]
    fn test_single_probe_profile(fragments: FragmentList) {
        let profile = run(
            &fragments,
            vec![probe("P1", "chr1", 100, 110)],
            &[(0, 1, 5), (1, 2, 3)],
        );

        let keys: Vec<(&str, u64, u64)> = profile
            .keys
            .iter()
            .map(|k| (k.chr.as_str(), k.start, k.size))
            .collect();
        assert_eq!(keys, vec![("chr1", 0, 100), ("chr1", 200, 100)]);
        assert_eq!(profile.column("P1").unwrap(), &[Some(5.0), Some(3.0)]);

        let frequencies = profile.frequencies();
        assert_eq!(
            frequencies.column("P1").unwrap(),
            &[Some(5.0 / 8.0), Some(3.0 / 8.0)]
        );
    }

    #[rstest]
    fn test_contact_between_probes_counts_once_each(fragments: FragmentList) {
        let profile = run(
            &fragments,
            vec![probe("P1", "chr1", 100, 110), probe("P2", "chr2", 120, 130)],
            &[(1, 4, 6)],
        );

        assert_eq!(profile.len(), 2);
        // P1 sees the chr2 fragment, P2 sees the chr1 fragment
        let p1 = profile.column("P1").unwrap();
        let p2 = profile.column("P2").unwrap();
        assert_eq!(profile.keys[0].chr, "chr1");
        assert_eq!((p1[0], p2[0]), (Some(0.0), Some(6.0)));
        assert_eq!((p1[1], p2[1]), (Some(6.0), Some(0.0)));
    }

    #[rstest]
    fn test_self_contact_not_doubled(fragments: FragmentList) {
        let profile = run(
            &fragments,
            vec![probe("P1", "chr1", 100, 110)],
            &[(1, 1, 4), (1, 0, 2)],
        );
        assert_eq!(profile.column_total(0), 6.0);
    }

    #[rstest]
    fn test_probe_without_contacts_keeps_column(fragments: FragmentList) {
        let profile = run(
            &fragments,
            vec![probe("P1", "chr1", 100, 110), probe("Silent", "chr2", 10, 20)],
            &[(1, 2, 3)],
        );
        assert_eq!(profile.probes, vec!["P1", "Silent"]);
        assert_eq!(profile.column("Silent").unwrap(), &[Some(0.0)]);
        assert_eq!(profile.frequencies().column("Silent").unwrap(), &[Some(0.0)]);
    }

    #[rstest]
    fn test_probe_totals_are_conserved(fragments: FragmentList) {
        let raw = [(0, 1, 5), (1, 2, 3), (1, 3, 2), (4, 1, 1), (3, 4, 9)];
        let profile = run(&fragments, vec![probe("P1", "chr1", 100, 110)], &raw);
        let expected: u64 = raw
            .iter()
            .filter(|(a, b, _)| *a == 1 || *b == 1)
            .map(|(_, _, c)| c)
            .sum();
        assert_eq!(profile.column_total(0), expected as f64);
    }
}
