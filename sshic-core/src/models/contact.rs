use std::path::{Path, PathBuf};

use fxhash::FxHashMap as HashMap;
use log::debug;

use crate::errors::{Result, SshicError};
use crate::io::DelimitedTable;

///
/// One row of the raw sparse contact list.
///
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Contact {
    pub frag_a: u32,
    pub frag_b: u32,
    pub count: u64,
}

///
/// The raw sparse contact list (hicstuff `abs_fragments_contacts_weighted.txt`).
///
/// Three unlabeled columns: fragment a, fragment b, count. The first row is a summary
/// row and is discarded.
///
#[derive(Debug, Clone, Default)]
pub struct ContactList {
    pub contacts: Vec<Contact>,
    pub path: Option<PathBuf>,
}

impl ContactList {
    pub fn len(&self) -> usize {
        self.contacts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contacts.is_empty()
    }

    /// Grand total of contacts in the sample.
    pub fn total(&self) -> u64 {
        self.contacts.iter().map(|c| c.count).sum()
    }
}

impl From<Vec<Contact>> for ContactList {
    fn from(contacts: Vec<Contact>) -> Self {
        ContactList {
            contacts,
            path: None,
        }
    }
}

impl TryFrom<&Path> for ContactList {
    type Error = SshicError;

    fn try_from(value: &Path) -> Result<Self> {
        let table = DelimitedTable::read(value, false)?;

        let mut contacts = Vec::with_capacity(table.len().saturating_sub(1));
        for row in 1..table.len() {
            contacts.push(Contact {
                frag_a: table.field(row, 0)?,
                frag_b: table.field(row, 1)?,
                count: table.field(row, 2)?,
            });
        }

        Ok(ContactList {
            contacts,
            path: Some(value.to_owned()),
        })
    }
}

impl TryFrom<&str> for ContactList {
    type Error = SshicError;

    fn try_from(value: &str) -> Result<Self> {
        ContactList::try_from(Path::new(value))
    }
}

impl TryFrom<PathBuf> for ContactList {
    type Error = SshicError;

    fn try_from(value: PathBuf) -> Result<Self> {
        ContactList::try_from(value.as_path())
    }
}

///
/// An undirected contact between two fragments, kept in the orientation it was first seen.
///
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Edge {
    pub frag_a: u32,
    pub frag_b: u32,
    pub count: u64,
}

impl Edge {
    /// The fragment on the other end of the edge from `fragment`, if `fragment` is an end.
    pub fn partner(&self, fragment: u32) -> Option<u32> {
        if self.frag_a == fragment {
            Some(self.frag_b)
        } else if self.frag_b == fragment {
            Some(self.frag_a)
        } else {
            None
        }
    }
}

///
/// Symmetric contact graph keyed by unordered fragment pair.
///
/// Rows repeating an orientation accumulate; a row whose mirrored orientation is already
/// present is that entry's symmetric twin and is not counted again.
///
#[derive(Debug, Clone, Default)]
pub struct ContactGraph {
    edges: HashMap<(u32, u32), Edge>,
}

impl ContactGraph {
    /// Add a contact row. Returns `false` when the row was a mirrored twin and was ignored.
    pub fn add(&mut self, contact: &Contact) -> bool {
        let key = (
            contact.frag_a.min(contact.frag_b),
            contact.frag_a.max(contact.frag_b),
        );

        match self.edges.get_mut(&key) {
            Some(edge) if edge.frag_a == contact.frag_a => {
                edge.count += contact.count;
                true
            }
            Some(_) => false,
            None => {
                self.edges.insert(
                    key,
                    Edge {
                        frag_a: contact.frag_a,
                        frag_b: contact.frag_b,
                        count: contact.count,
                    },
                );
                true
            }
        }
    }

    pub fn get(&self, x: u32, y: u32) -> Option<&Edge> {
        self.edges.get(&(x.min(y), x.max(y)))
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    pub fn total(&self) -> u64 {
        self.edges.values().map(|e| e.count).sum()
    }

    /// Edges sorted by (fragment a, fragment b) in their recorded orientation.
    pub fn edges(&self) -> Vec<Edge> {
        let mut edges: Vec<Edge> = self.edges.values().copied().collect();
        edges.sort_by_key(|e| (e.frag_a, e.frag_b));
        edges
    }
}

impl From<&ContactList> for ContactGraph {
    fn from(contacts: &ContactList) -> Self {
        let mut graph = ContactGraph::default();
        let mirrored = contacts
            .contacts
            .iter()
            .filter(|c| !graph.add(c))
            .count();
        if mirrored > 0 {
            debug!("ignored {} mirrored contact rows", mirrored);
        }
        graph
    }
}
