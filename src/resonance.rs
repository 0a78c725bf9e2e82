//! Resonance isomers of radicals.
//!
//! Only allylic delocalization is considered: a radical on X next to a C=C
//! double bond moves to the far carbon, `X•–C=C` becoming `X=C–C•`. This is
//! the resonance form that matters for matching radical reaction templates.

use petgraph::graph::NodeIndex;

use crate::bond::BondOrder;
use crate::molecule::Molecule;
use crate::traits::RecipeBond;

/// The molecule followed by every distinct structure reachable through
/// repeated allylic shifts.
pub fn generate_resonance_isomers(mol: &Molecule) -> Vec<Molecule> {
    let mut isomers = vec![mol.clone()];
    let mut i = 0;
    while i < isomers.len() {
        let current = isomers[i].clone();
        for path in allyl_paths(&current) {
            let shifted = shift_radical(&current, path);
            if !isomers.iter().any(|m| m.is_isomorphic(&shifted)) {
                isomers.push(shifted);
            }
        }
        i += 1;
    }
    isomers
}

/// `(radical atom, middle atom, far atom)` triples with a single bond
/// followed by a double bond.
fn allyl_paths(mol: &Molecule) -> Vec<(NodeIndex, NodeIndex, NodeIndex)> {
    let mut paths = Vec::new();
    for a1 in mol.atoms() {
        if mol.atom(a1).radical_electrons == 0 {
            continue;
        }
        for a2 in mol.neighbors(a1) {
            if bond_order(mol, a1, a2) != Some(BondOrder::Single) {
                continue;
            }
            for a3 in mol.neighbors(a2) {
                if a3 != a1 && bond_order(mol, a2, a3) == Some(BondOrder::Double) {
                    paths.push((a1, a2, a3));
                }
            }
        }
    }
    paths
}

fn bond_order(mol: &Molecule, a: NodeIndex, b: NodeIndex) -> Option<BondOrder> {
    mol.bond_between(a, b).map(|e| mol.bond(e).order)
}

fn shift_radical(mol: &Molecule, (a1, a2, a3): (NodeIndex, NodeIndex, NodeIndex)) -> Molecule {
    let mut shifted = mol.clone();
    shifted.reset_connectivity_values();
    shifted.atom_mut(a1).radical_electrons -= 1;
    shifted.atom_mut(a3).radical_electrons += 1;
    if let Some(e) = shifted.bond_between(a1, a2) {
        shifted.bond_mut(e).change_order(1);
    }
    if let Some(e) = shifted.bond_between(a2, a3) {
        shifted.bond_mut(e).change_order(-1);
    }
    shifted.update_connectivity_values();
    shifted
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mol(adjlist: &str) -> Molecule {
        Molecule::from_adjacency_list(adjlist)
            .unwrap_or_else(|e| panic!("bad adjacency list {adjlist:?}: {e}"))
    }

    #[test]
    fn closed_shell_has_one_structure() {
        let propene = mol("1 C u0 {2,D}\n2 C u0 {1,D} {3,S}\n3 C u0 {2,S}");
        assert_eq!(generate_resonance_isomers(&propene).len(), 1);
    }

    #[test]
    fn symmetric_allyl_collapses() {
        let allyl = mol("1 C u0 {2,D}\n2 C u0 {1,D} {3,S}\n3 C u1 {2,S}");
        assert_eq!(generate_resonance_isomers(&allyl).len(), 1);
    }

    #[test]
    fn methylallyl_has_two_forms() {
        let secondary = mol("1 C u0 {2,D}\n2 C u0 {1,D} {3,S}\n3 C u1 {2,S} {4,S}\n4 C u0 {3,S}");
        let primary = mol("1 C u1 {2,S}\n2 C u0 {1,S} {3,D}\n3 C u0 {2,D} {4,S}\n4 C u0 {3,S}");
        let isomers = generate_resonance_isomers(&secondary);
        assert_eq!(isomers.len(), 2);
        assert!(isomers[1].is_isomorphic(&primary));
        assert_eq!(isomers[1].radical_count(), 1);
    }
}
