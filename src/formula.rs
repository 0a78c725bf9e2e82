//! Molecular formulas.
//!
//! [`mol_formula`] produces a Hill system string from a graph with explicit
//! hydrogens; [`element_counts`] gives the raw per-element tallies used by
//! species size constraints.

use std::collections::BTreeMap;
use std::fmt::Write;

use crate::element::Element;
use crate::mol::Mol;
use crate::traits::HasElement;

pub fn element_counts<A: HasElement, B>(mol: &Mol<A, B>) -> BTreeMap<Element, u32> {
    let mut counts = BTreeMap::new();
    for idx in mol.atoms() {
        *counts.entry(mol.atom(idx).element()).or_default() += 1;
    }
    counts
}

/// Compute the molecular formula as a Hill system string.
///
/// C comes first, then H, then the remaining elements alphabetically.
/// Formulas without carbon list every element alphabetically.
pub fn mol_formula<A: HasElement, B>(mol: &Mol<A, B>) -> String {
    let mut counts: BTreeMap<&'static str, u32> = element_counts(mol)
        .into_iter()
        .map(|(e, n)| (e.symbol(), n))
        .collect();

    let mut result = String::new();

    if let Some(c) = counts.remove("C") {
        append_element(&mut result, "C", c);
        if let Some(h) = counts.remove("H") {
            append_element(&mut result, "H", h);
        }
    }

    for (sym, count) in &counts {
        append_element(&mut result, sym, *count);
    }

    result
}

fn append_element(buf: &mut String, symbol: &str, count: u32) {
    buf.push_str(symbol);
    if count > 1 {
        let _ = write!(buf, "{count}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::molecule::Molecule;

    fn mol(adjlist: &str) -> Molecule {
        Molecule::from_adjacency_list(adjlist)
            .unwrap_or_else(|e| panic!("bad adjacency list {adjlist:?}: {e}"))
    }

    #[test]
    fn methane_formula() {
        assert_eq!(mol_formula(&mol("1 C u0")), "CH4");
    }

    #[test]
    fn water_formula() {
        assert_eq!(mol_formula(&mol("1 O u0")), "H2O");
    }

    #[test]
    fn ethanol_formula() {
        assert_eq!(
            mol_formula(&mol("1 C u0 {2,S}\n2 C u0 {1,S} {3,S}\n3 O u0 {2,S}")),
            "C2H6O"
        );
    }

    #[test]
    fn hydrogen_atom() {
        assert_eq!(mol_formula(&mol("1 H u1")), "H");
    }

    #[test]
    fn chloromethane_counts() {
        let counts = element_counts(&mol("1 C u0 {2,S}\n2 Cl u0 {1,S}"));
        assert_eq!(counts[&Element::C], 1);
        assert_eq!(counts[&Element::H], 3);
        assert_eq!(counts[&Element::Cl], 1);
    }
}
