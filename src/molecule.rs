use petgraph::graph::NodeIndex;

use crate::adjlist::{self, AdjListError};
use crate::atom::Atom;
use crate::bond::Bond;
use crate::element::Element;
use crate::formula::mol_formula;
use crate::group::Group;
use crate::mol::Mol;
use crate::substruct::{self, AtomMapping};

pub type Molecule = Mol<Atom, Bond>;

impl Mol<Atom, Bond> {
    /// Parse an adjacency list, adding any hydrogens needed to fill each
    /// atom's default valence.
    pub fn from_adjacency_list(text: &str) -> Result<Self, AdjListError> {
        adjlist::parse_molecule_saturated(text)
    }

    pub fn to_adjacency_list(&self) -> String {
        adjlist::molecule_to_adjacency_list(self)
    }

    /// Structural identity, ignoring atom labels.
    pub fn is_isomorphic(&self, other: &Molecule) -> bool {
        substruct::is_isomorphic_with(self, other, Atom::is_equivalent, |a: &Bond, b: &Bond| {
            a.order == b.order
        })
    }

    /// Every embedding of `group` in this molecule, as `(group atom,
    /// molecule atom)` pairs.
    pub fn find_subgraph_isomorphisms(&self, group: &Group) -> Vec<AtomMapping> {
        substruct::get_substruct_matches_with(
            self,
            group,
            |a, g| g.matches_atom(a),
            |b, g| g.matches_bond(b),
        )
    }

    pub fn is_subgraph_isomorphic(&self, group: &Group) -> bool {
        substruct::has_substruct_match_with(
            self,
            group,
            |a, g| g.matches_atom(a),
            |b, g| g.matches_bond(b),
        )
    }

    /// Subgraph check with `(group atom, molecule atom)` pairs pinned.
    pub fn is_subgraph_isomorphic_seeded(
        &self,
        group: &Group,
        seed: &[(NodeIndex, NodeIndex)],
    ) -> bool {
        substruct::has_seeded_substruct_match_with(
            self,
            group,
            seed,
            |a, g| g.matches_atom(a),
            |b, g| g.matches_bond(b),
        )
    }

    pub fn radical_count(&self) -> u32 {
        self.atoms()
            .map(|idx| self.atom(idx).radical_electrons as u32)
            .sum()
    }

    pub fn element_count(&self, element: Element) -> u32 {
        self.atoms()
            .filter(|&idx| self.atom(idx).element == element)
            .count() as u32
    }

    pub fn heavy_atom_count(&self) -> u32 {
        self.atoms()
            .filter(|&idx| self.atom(idx).element.is_heavy())
            .count() as u32
    }

    pub fn formula(&self) -> String {
        mol_formula(self)
    }

    pub fn molecular_weight(&self) -> f64 {
        self.atoms()
            .map(|idx| self.atom(idx).element.atomic_weight())
            .sum()
    }
}

impl std::fmt::Display for Mol<Atom, Bond> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.formula())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mol(adjlist: &str) -> Molecule {
        Molecule::from_adjacency_list(adjlist)
            .unwrap_or_else(|e| panic!("bad adjacency list {adjlist:?}: {e}"))
    }

    #[test]
    fn isomorphism_ignores_labels() {
        let a = mol("1 *1 C u0 {2,S}\n2 C u0 {1,S}");
        let b = mol("1 C u0 {2,S}\n2 *2 C u0 {1,S}");
        assert!(a.is_isomorphic(&b));
    }

    #[test]
    fn isomers_are_distinct() {
        let ethanol = mol("1 C u0 {2,S}\n2 C u0 {1,S} {3,S}\n3 O u0 {2,S}");
        let dimethyl_ether = mol("1 C u0 {2,S}\n2 O u0 {1,S} {3,S}\n3 C u0 {2,S}");
        assert_eq!(ethanol.formula(), dimethyl_ether.formula());
        assert!(!ethanol.is_isomorphic(&dimethyl_ether));
    }

    #[test]
    fn counts() {
        let propyl = mol("1 C u0 {2,S}\n2 C u0 {1,S} {3,S}\n3 C u1 {2,S}");
        assert_eq!(propyl.element_count(Element::C), 3);
        assert_eq!(propyl.element_count(Element::H), 7);
        assert_eq!(propyl.heavy_atom_count(), 3);
        assert_eq!(propyl.radical_count(), 1);
        assert_eq!(propyl.to_string(), "C3H7");
    }

    #[test]
    fn subgraph_queries() {
        let methanol = mol("1 C u0 {2,S}\n2 O u0 {1,S}");
        let oh = Group::from_adjacency_list("1 *1 O u0 {2,S}\n2 *2 H u0 {1,S}").unwrap();
        assert_eq!(methanol.find_subgraph_isomorphisms(&oh).len(), 1);
        assert!(methanol.is_subgraph_isomorphic(&oh));
        let oxygen_radical = Group::from_adjacency_list("1 O u1").unwrap();
        assert!(!methanol.is_subgraph_isomorphic(&oxygen_radical));
    }

    #[test]
    fn molecular_weight_of_water() {
        let water = mol("1 O u0");
        assert!((water.molecular_weight() - 18.015).abs() < 0.01);
    }
}
