use std::path::Path;

use log::{debug, warn};

use sshic_core::io::{format_value, DelimitedTable, TsvWrite};
use sshic_core::models::{ContactGraph, ContactList, Fragment, FragmentList};
use sshic_core::{Result, SshicError};

use crate::associate::ProbeFragments;

/// One of the two ends of a contact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    A,
    B,
}

impl Side {
    pub fn other(self) -> Side {
        match self {
            Side::A => Side::B,
            Side::B => Side::A,
        }
    }

    /// Column suffix used in the filtered table.
    pub fn suffix(self) -> &'static str {
        match self {
            Side::A => "a",
            Side::B => "b",
        }
    }
}

/// Probe metadata attached to the probe end of a filtered contact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeTag {
    pub name: String,
    pub kind: String,
    pub sequence: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ContactSide {
    pub fragment: Fragment,
    pub probe: Option<ProbeTag>,
}

///
/// A contact that involves at least one probe fragment, annotated with the attributes of
/// both fragments. Exactly one side carries a probe tag: a contact between two probe
/// fragments yields one row per orientation.
///
#[derive(Debug, Clone, PartialEq)]
pub struct AugmentedContact {
    pub a: ContactSide,
    pub b: ContactSide,
    pub contacts: u64,
}

impl AugmentedContact {
    pub fn frag_a(&self) -> u32 {
        self.a.fragment.id
    }

    pub fn frag_b(&self) -> u32 {
        self.b.fragment.id
    }

    pub fn side(&self, side: Side) -> &ContactSide {
        match side {
            Side::A => &self.a,
            Side::B => &self.b,
        }
    }

    /// The side carrying the probe tag.
    pub fn probe_side(&self) -> Option<Side> {
        if self.a.probe.is_some() {
            Some(Side::A)
        } else if self.b.probe.is_some() {
            Some(Side::B)
        } else {
            None
        }
    }
}

const SIDE_COLUMNS: [&str; 8] = [
    "chr",
    "start",
    "end",
    "size",
    "gc_content",
    "type",
    "name",
    "sequence",
];

///
/// The filtered contact table: every raw contact touching a probe fragment, joined with
/// fragment and probe attributes, sorted by (frag_a, frag_b, start_a, start_b).
///
#[derive(Debug, Clone, Default)]
pub struct FilteredContacts {
    pub rows: Vec<AugmentedContact>,
}

impl FilteredContacts {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, AugmentedContact> {
        self.rows.iter()
    }

    fn sort(&mut self) {
        self.rows.sort_by(|x, y| {
            (x.frag_a(), x.frag_b(), x.a.fragment.start, x.b.fragment.start).cmp(&(
                y.frag_a(),
                y.frag_b(),
                y.a.fragment.start,
                y.b.fragment.start,
            ))
        });
    }

    /// Read a filtered table previously written with [TsvWrite::write_tsv].
    pub fn from_tsv<P: AsRef<Path>>(path: P) -> Result<Self> {
        let table = DelimitedTable::read(path.as_ref(), true)?;
        let contacts_col = table.column("contacts")?;

        let mut sides_cols = Vec::with_capacity(2);
        for side in [Side::A, Side::B] {
            let mut cols = Vec::with_capacity(SIDE_COLUMNS.len() + 1);
            cols.push(table.column(&format!("frag_{}", side.suffix()))?);
            for name in SIDE_COLUMNS {
                cols.push(table.column(&format!("{}_{}", name, side.suffix()))?);
            }
            sides_cols.push(cols);
        }

        let read_side = |row: usize, cols: &[usize]| -> Result<ContactSide> {
            let fragment = Fragment {
                id: table.field(row, cols[0])?,
                chr: table.text(row, cols[1])?.to_string(),
                start: table.field(row, cols[2])?,
                end: table.field(row, cols[3])?,
                size: table.field(row, cols[4])?,
                gc_content: table.optional_f64(row, cols[5])?.unwrap_or(f64::NAN),
            };
            let name = table.text(row, cols[7])?;
            let probe = if name.is_empty() {
                None
            } else {
                let sequence = table.text(row, cols[8])?;
                Some(ProbeTag {
                    name: name.to_string(),
                    kind: table.text(row, cols[6])?.to_string(),
                    sequence: (!sequence.is_empty()).then(|| sequence.to_string()),
                })
            };
            Ok(ContactSide { fragment, probe })
        };

        let mut rows = Vec::with_capacity(table.len());
        for row in 0..table.len() {
            rows.push(AugmentedContact {
                a: read_side(row, &sides_cols[0])?,
                b: read_side(row, &sides_cols[1])?,
                contacts: table.field(row, contacts_col)?,
            });
        }

        Ok(FilteredContacts { rows })
    }
}

fn side_record(side: &ContactSide) -> Vec<String> {
    let fragment = &side.fragment;
    let gc = Some(fragment.gc_content).filter(|gc| !gc.is_nan());
    let (kind, name, sequence) = match &side.probe {
        Some(tag) => (
            tag.kind.clone(),
            tag.name.clone(),
            tag.sequence.clone().unwrap_or_default(),
        ),
        None => (String::new(), String::new(), String::new()),
    };
    vec![
        fragment.chr.clone(),
        fragment.start.to_string(),
        fragment.end.to_string(),
        fragment.size.to_string(),
        format_value(gc),
        kind,
        name,
        sequence,
    ]
}

impl TsvWrite for FilteredContacts {
    fn header(&self) -> Vec<String> {
        let mut header: Vec<String> = ["frag_a", "frag_b", "contacts"]
            .iter()
            .map(|c| c.to_string())
            .collect();
        for side in [Side::A, Side::B] {
            header.extend(
                SIDE_COLUMNS
                    .iter()
                    .map(|c| format!("{}_{}", c, side.suffix())),
            );
        }
        header
    }

    fn records(&self) -> Vec<Vec<String>> {
        self.rows
            .iter()
            .map(|row| {
                let mut record = vec![
                    row.frag_a().to_string(),
                    row.frag_b().to_string(),
                    row.contacts.to_string(),
                ];
                record.extend(side_record(&row.a));
                record.extend(side_record(&row.b));
                record
            })
            .collect()
    }
}

fn lookup<'a>(fragments: &'a FragmentList, id: u32) -> Result<&'a Fragment> {
    fragments.get(id).ok_or(SshicError::UnknownFragment(id))
}

///
/// Keep the contacts touching a probe fragment and annotate both of their ends.
///
/// Raw rows are first folded into a [ContactGraph], so a pair listed in both orientations
/// is seen once. Every probe bound to a fragment yields its own row, so a fragment carrying
/// two probes duplicates its contacts, once per probe. Contacts whose fragment ids are not
/// in the fragment list are an error.
///
/// # Arguments
/// - fragments: the fragment list the contacts refer to
/// - probes: probes bound to their fragments
/// - contacts: the raw sparse contact list
///
pub fn filter_contacts(
    fragments: &FragmentList,
    probes: &ProbeFragments,
    contacts: &ContactList,
) -> Result<FilteredContacts> {
    let by_fragment = probes.by_fragment();
    let graph = ContactGraph::from(contacts);
    let mut filtered = FilteredContacts::default();

    for contact in graph.edges() {
        for side in [Side::A, Side::B] {
            let (probe_frag, other_frag) = match side {
                Side::A => (contact.frag_a, contact.frag_b),
                Side::B => (contact.frag_b, contact.frag_a),
            };
            let Some(bound) = by_fragment.get(&probe_frag) else {
                continue;
            };

            let probe_fragment = lookup(fragments, probe_frag)?;
            let other_fragment = lookup(fragments, other_frag)?;

            for probe in bound {
                let probe_side = ContactSide {
                    fragment: probe_fragment.clone(),
                    probe: Some(ProbeTag {
                        name: probe.probe.name.clone(),
                        kind: probe.probe.kind.clone(),
                        sequence: probe.probe.sequence.clone(),
                    }),
                };
                let other_side = ContactSide {
                    fragment: other_fragment.clone(),
                    probe: None,
                };
                let (a, b) = match side {
                    Side::A => (probe_side, other_side),
                    Side::B => (other_side, probe_side),
                };
                filtered.rows.push(AugmentedContact {
                    a,
                    b,
                    contacts: contact.count,
                });
            }
        }
    }

    if filtered.is_empty() {
        warn!("no contact involves a probe fragment");
    }
    debug!(
        "kept {} annotated rows out of {} contact pairs",
        filtered.len(),
        graph.len()
    );

    filtered.sort();
    Ok(filtered)
}
