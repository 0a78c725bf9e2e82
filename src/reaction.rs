//! Species and the reactions generated between them.

use itertools::Itertools;

use crate::adjlist::AdjListError;
use crate::family::NodeId;
use crate::molecule::Molecule;
use crate::resonance::generate_resonance_isomers;

/// A chemical species: one or more resonance isomers of the same structure.
#[derive(Debug, Clone)]
pub struct Species {
    pub label: String,
    molecules: Vec<Molecule>,
}

impl Species {
    /// A species holding `molecule` and its resonance isomers.
    pub fn from_molecule(label: &str, molecule: Molecule) -> Self {
        let mut molecule = molecule;
        molecule.clear_labels();
        Self {
            label: label.to_string(),
            molecules: generate_resonance_isomers(&molecule),
        }
    }

    pub fn from_adjacency_list(label: &str, adjlist: &str) -> Result<Self, AdjListError> {
        Ok(Self::from_molecule(label, Molecule::from_adjacency_list(adjlist)?))
    }

    /// The resonance isomers. Never empty; the first is the one the species
    /// was built from.
    pub fn molecules(&self) -> &[Molecule] {
        &self.molecules
    }

    pub fn molecule(&self) -> &Molecule {
        &self.molecules[0]
    }

    /// Whether any resonance isomer is isomorphic to `mol`.
    pub fn is_isomorphic(&self, mol: &Molecule) -> bool {
        self.molecules.iter().any(|m| m.is_isomorphic(mol))
    }
}

impl std::fmt::Display for Species {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.label)
    }
}

/// A reaction produced by a family, stored in the family's
/// kinetics-defining direction.
#[derive(Debug, Clone)]
pub struct GeneratedReaction {
    pub family: String,
    pub reactants: Vec<Molecule>,
    pub products: Vec<Molecule>,
    /// The most specific template node matched by each reactant.
    pub template: Vec<NodeId>,
    /// Number of distinct reaction paths; at least 1.
    pub degeneracy: u32,
    /// `(reactant index, product index)` pairs.
    pub pairs: Vec<(usize, usize)>,
    /// Whether the reaction was found with the forward template.
    pub is_forward: bool,
    /// The reverse reaction, for families that are their own reverse.
    pub reverse: Option<Box<GeneratedReaction>>,
}

impl GeneratedReaction {
    /// Whether the reaction connects these reactants and products, in any
    /// order within each side.
    pub fn has_species(&self, reactants: &[Molecule], products: &[Molecule]) -> bool {
        same_molecules(&self.reactants, reactants) && same_molecules(&self.products, products)
    }

    /// Like [`GeneratedReaction::has_species`], also trying the reverse
    /// direction. Returns `Some(true)` for a forward match and `Some(false)`
    /// for a reverse one.
    pub fn match_direction(&self, reactants: &[Molecule], products: &[Molecule]) -> Option<bool> {
        if self.has_species(reactants, products) {
            Some(true)
        } else if self.has_species(products, reactants) {
            Some(false)
        } else {
            None
        }
    }

    pub(crate) fn clear_labels(&mut self) {
        for mol in self.reactants.iter_mut().chain(self.products.iter_mut()) {
            mol.clear_labels();
        }
    }
}

impl std::fmt::Display for GeneratedReaction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} <=> {}",
            self.reactants.iter().join(" + "),
            self.products.iter().join(" + ")
        )
    }
}

fn same_molecules(a: &[Molecule], b: &[Molecule]) -> bool {
    a.len() == b.len()
        && b.iter()
            .permutations(b.len())
            .any(|perm| a.iter().zip(perm).all(|(x, y)| x.is_isomorphic(y)))
}

/// Whether `mols` matches one resonance form per entry of `isomers`, in
/// any order.
pub(crate) fn matches_resonance_forms(mols: &[Molecule], isomers: &[Vec<Molecule>]) -> bool {
    mols.len() == isomers.len()
        && isomers
            .iter()
            .permutations(isomers.len())
            .any(|perm| {
                mols.iter()
                    .zip(perm)
                    .all(|(mol, forms)| forms.iter().any(|form| form.is_isomorphic(mol)))
            })
}
