//! Structures that generated reactions may not involve.
//!
//! A family carries its own set, and a process-wide set is passed in with
//! the generation context. Both are plain values: nothing here is global.

use serde::{Deserialize, Serialize};

use crate::adjlist::AdjListError;
use crate::group::Group;
use crate::molecule::Molecule;

#[derive(Debug, Clone)]
pub enum ForbiddenPattern {
    /// Forbids every molecule containing the pattern.
    Group(Group),
    /// Forbids exactly this molecule.
    Molecule(Molecule),
}

#[derive(Debug, Clone)]
pub struct ForbiddenEntry {
    pub label: String,
    pub pattern: ForbiddenPattern,
}

/// A forbidden structure as written in a family file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForbiddenDefinition {
    pub label: String,
    pub adjlist: String,
    /// Read `adjlist` as a complete molecule rather than a group.
    #[serde(default)]
    pub molecule: bool,
}

#[derive(Debug, Clone, Default)]
pub struct ForbiddenStructures {
    entries: Vec<ForbiddenEntry>,
}

impl ForbiddenStructures {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_definitions(defs: &[ForbiddenDefinition]) -> Result<Self, AdjListError> {
        let mut forbidden = Self::new();
        for def in defs {
            if def.molecule {
                forbidden.add_molecule(&def.label, Molecule::from_adjacency_list(&def.adjlist)?);
            } else {
                forbidden.add_group(&def.label, Group::from_adjacency_list(&def.adjlist)?);
            }
        }
        Ok(forbidden)
    }

    pub fn add_group(&mut self, label: &str, group: Group) {
        self.entries.push(ForbiddenEntry {
            label: label.to_string(),
            pattern: ForbiddenPattern::Group(group),
        });
    }

    pub fn add_molecule(&mut self, label: &str, molecule: Molecule) {
        self.entries.push(ForbiddenEntry {
            label: label.to_string(),
            pattern: ForbiddenPattern::Molecule(molecule),
        });
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[ForbiddenEntry] {
        &self.entries
    }

    /// The first entry that forbids `mol`.
    pub fn matching_entry(&self, mol: &Molecule) -> Option<&ForbiddenEntry> {
        self.entries.iter().find(|entry| match &entry.pattern {
            ForbiddenPattern::Group(group) => mol.is_subgraph_isomorphic(group),
            ForbiddenPattern::Molecule(pattern) => mol.is_isomorphic(pattern),
        })
    }

    pub fn is_forbidden(&self, mol: &Molecule) -> bool {
        self.matching_entry(mol).is_some()
    }
}
