use std::fmt::Write;

use itertools::Itertools;

use crate::bond::BondOrder;
use crate::group::Group;
use crate::molecule::Molecule;

fn list<T: ToString>(values: &[T]) -> String {
    match values {
        [only] => only.to_string(),
        _ => format!("[{}]", values.iter().map(ToString::to_string).join(",")),
    }
}

pub fn molecule_to_adjacency_list(mol: &Molecule) -> String {
    let mut out = String::new();
    for idx in mol.atoms() {
        let atom = mol.atom(idx);
        let _ = write!(out, "{}", idx.index() + 1);
        if !atom.label.is_empty() {
            let _ = write!(out, " {}", atom.label);
        }
        let _ = write!(out, " {} u{}", atom.element.symbol(), atom.radical_electrons);
        if atom.charge != 0 {
            let _ = write!(out, " c{:+}", atom.charge);
        }
        let mut neighbors: Vec<_> = mol.neighbors(idx).collect();
        neighbors.sort();
        for nb in neighbors {
            if let Some(edge) = mol.bond_between(idx, nb) {
                let _ = write!(out, " {{{},{}}}", nb.index() + 1, mol.bond(edge).order.symbol());
            }
        }
        out.push('\n');
    }
    out
}

pub fn group_to_adjacency_list(group: &Group) -> String {
    let mut out = String::new();
    for idx in group.atoms() {
        let atom = group.atom(idx);
        let _ = write!(out, "{}", idx.index() + 1);
        if !atom.label.is_empty() {
            let _ = write!(out, " {}", atom.label);
        }
        let types: Vec<&str> = atom.atom_types.iter().map(|t| t.symbol()).collect();
        let types = if types.is_empty() { vec!["R"] } else { types };
        let _ = write!(out, " {}", list(&types));
        if !atom.radical_electrons.is_empty() {
            let _ = write!(out, " u{}", list(&atom.radical_electrons));
        }
        if !atom.charge.is_empty() {
            let _ = write!(out, " c{}", list(&atom.charge));
        }
        let mut neighbors: Vec<_> = group.neighbors(idx).collect();
        neighbors.sort();
        for nb in neighbors {
            if let Some(edge) = group.bond_between(idx, nb) {
                let orders = &group.bond(edge).orders;
                let symbols: Vec<&str> = if orders.is_empty() {
                    [BondOrder::Single, BondOrder::Double, BondOrder::Triple]
                        .iter()
                        .map(|o| o.symbol())
                        .collect()
                } else {
                    orders.iter().map(|o| o.symbol()).collect()
                };
                let _ = write!(out, " {{{},{}}}", nb.index() + 1, list(&symbols));
            }
        }
        out.push('\n');
    }
    out
}
