use petgraph::graph::NodeIndex;

use crate::atom::{Atom, GroupAtom};
use crate::atomtype::AtomType;
use crate::bond::{Bond, BondOrder, GroupBond};
use crate::element::Element;
use crate::group::Group;
use crate::molecule::Molecule;

use super::error::AdjListError;
use super::tokenizer::RawAtom;

/// Validated bonds as `(i, j, order symbols)` with `i < j`.
fn collect_bonds(atoms: &[RawAtom]) -> Result<Vec<(usize, usize, Vec<String>)>, AdjListError> {
    let mut bonds = Vec::new();
    for (i, atom) in atoms.iter().enumerate() {
        for (j, orders) in &atom.bonds {
            let j = *j;
            if j >= atoms.len() {
                return Err(AdjListError::BondToUnknownAtom {
                    line: atom.line,
                    index: j + 1,
                });
            }
            if j == i {
                return Err(AdjListError::SelfBond { line: atom.line });
            }
            let mirrored = atoms[j]
                .bonds
                .iter()
                .find(|(k, _)| *k == i)
                .map(|(_, o)| o);
            match mirrored {
                Some(other) if crate::bond::same_set(orders, other) => {}
                _ => return Err(AdjListError::AsymmetricBond { a: i + 1, b: j + 1 }),
            }
            if i < j {
                bonds.push((i, j, orders.clone()));
            }
        }
    }
    Ok(bonds)
}

fn single<'a, T>(values: &'a [T], line: usize, what: &'static str) -> Result<Option<&'a T>, AdjListError> {
    match values {
        [] => Ok(None),
        [only] => Ok(Some(only)),
        _ => Err(AdjListError::Ambiguous { line, what }),
    }
}

fn bond_order(symbol: &str, line: usize) -> Result<BondOrder, AdjListError> {
    BondOrder::from_symbol(symbol).ok_or_else(|| AdjListError::InvalidToken {
        line,
        token: symbol.to_string(),
    })
}

pub(crate) fn build_molecule(atoms: &[RawAtom], saturate: bool) -> Result<Molecule, AdjListError> {
    let bonds = collect_bonds(atoms)?;
    let mut mol = Molecule::new();
    for raw in atoms {
        let symbol = single(&raw.types, raw.line, "element")?.ok_or(
            AdjListError::MissingAtomType { line: raw.line },
        )?;
        let element = Element::from_symbol(symbol).ok_or_else(|| AdjListError::UnknownAtomType {
            line: raw.line,
            text: symbol.clone(),
        })?;
        let mut atom = Atom::new(element);
        atom.label = raw.label.clone();
        atom.radical_electrons = single(&raw.radicals, raw.line, "radical count")?
            .copied()
            .unwrap_or(0);
        atom.charge = single(&raw.charges, raw.line, "charge")?.copied().unwrap_or(0);
        mol.add_atom(atom);
    }
    for (i, j, orders) in &bonds {
        let line = atoms[*i].line;
        let symbol = single(orders, line, "bond order")?.ok_or(AdjListError::InvalidToken {
            line,
            token: "{}".to_string(),
        })?;
        mol.add_bond(
            NodeIndex::new(*i),
            NodeIndex::new(*j),
            Bond::new(bond_order(symbol, line)?),
        );
    }
    if saturate {
        saturate_hydrogens(&mut mol);
    }
    mol.update_connectivity_values();
    Ok(mol)
}

fn default_valence(element: Element) -> u8 {
    match element {
        Element::H | Element::F | Element::Cl | Element::Br | Element::I => 1,
        Element::O | Element::S => 2,
        Element::N | Element::P => 3,
        Element::C | Element::Si => 4,
        Element::He | Element::Ne | Element::Ar => 0,
    }
}

/// Add hydrogens until every atom reaches its default valence.
fn saturate_hydrogens(mol: &mut Molecule) {
    let existing: Vec<NodeIndex> = mol.atoms().collect();
    for idx in existing {
        let atom = mol.atom(idx);
        let used: u8 = mol
            .bonds_of(idx)
            .map(|e| mol.bond(e).order.value())
            .sum::<u8>()
            + atom.radical_electrons
            + atom.charge.unsigned_abs();
        let missing = default_valence(atom.element).saturating_sub(used);
        for _ in 0..missing {
            let h = mol.add_atom(Atom::new(Element::H));
            mol.add_bond(idx, h, Bond::default());
        }
    }
}

pub(crate) fn build_group(atoms: &[RawAtom]) -> Result<Group, AdjListError> {
    let bonds = collect_bonds(atoms)?;
    let mut group = Group::new();
    for raw in atoms {
        let atom_types = raw
            .types
            .iter()
            .map(|t| {
                AtomType::from_symbol(t).ok_or_else(|| AdjListError::UnknownAtomType {
                    line: raw.line,
                    text: t.clone(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        group.add_atom(GroupAtom {
            atom_types,
            radical_electrons: raw.radicals.clone(),
            charge: raw.charges.clone(),
            label: raw.label.clone(),
        });
    }
    for (i, j, orders) in &bonds {
        let line = atoms[*i].line;
        let orders = orders
            .iter()
            .map(|o| bond_order(o, line))
            .collect::<Result<Vec<_>, _>>()?;
        group.add_bond(NodeIndex::new(*i), NodeIndex::new(*j), GroupBond::new(orders));
    }
    group.update_connectivity_values();
    Ok(group)
}
