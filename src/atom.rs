use crate::atomtype::{AtomType, Bonding};
use crate::bond::same_set;
use crate::element::Element;

/// Atom of a molecular graph.
///
/// Hydrogens are explicit graph nodes, so an atom carries no implicit
/// hydrogen count. `atom_type` is perceived from bonding whenever the
/// molecule's connectivity values are rebuilt.
///
/// # Examples
///
/// ```
/// use kincrab::{Atom, Element};
///
/// let methyl = Atom {
///     radical_electrons: 1,
///     ..Atom::new(Element::C)
/// };
/// assert_eq!(methyl.element, Element::C);
/// assert!(methyl.label.is_empty());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Atom {
    pub element: Element,
    /// Number of unpaired electrons.
    pub radical_electrons: u8,
    pub charge: i8,
    /// Reaction-center tag such as `*1`. Empty when unlabeled.
    pub label: String,
    pub atom_type: AtomType,
}

impl Atom {
    pub fn new(element: Element) -> Self {
        Self {
            element,
            radical_electrons: 0,
            charge: 0,
            label: String::new(),
            atom_type: AtomType::from_element(element),
        }
    }

    /// Equality for isomorphism purposes; labels are ignored.
    pub fn is_equivalent(&self, other: &Atom) -> bool {
        self.element == other.element
            && self.radical_electrons == other.radical_electrons
            && self.charge == other.charge
    }
}

impl crate::traits::HasLabel for Atom {
    fn label(&self) -> &str {
        &self.label
    }

    fn set_label(&mut self, label: String) {
        self.label = label;
    }
}

impl crate::traits::HasElement for Atom {
    fn element(&self) -> Element {
        self.element
    }
}

impl crate::traits::RecipeAtom for Atom {
    fn change_radicals(&mut self, delta: i8) -> bool {
        match self.radical_electrons.checked_add_signed(delta) {
            Some(count) => {
                self.radical_electrons = count;
                true
            }
            None => false,
        }
    }

    fn element_hint(&self) -> Option<Element> {
        Some(self.element)
    }

    fn perceive_type(&mut self, bonding: &Bonding) {
        self.atom_type = AtomType::perceive(self.element, bonding);
    }
}

/// Atom of a group pattern.
///
/// Each constraint lists the accepted values; an empty list accepts
/// anything.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GroupAtom {
    pub atom_types: Vec<AtomType>,
    pub radical_electrons: Vec<u8>,
    pub charge: Vec<i8>,
    pub label: String,
}

impl GroupAtom {
    pub fn new(atom_types: Vec<AtomType>) -> Self {
        Self {
            atom_types,
            ..Self::default()
        }
    }

    pub fn matches_atom(&self, atom: &Atom) -> bool {
        let type_ok = self.atom_types.is_empty()
            || self
                .atom_types
                .iter()
                .any(|&t| atom.atom_type.is_specific_case_of(t));
        let radical_ok = self.radical_electrons.is_empty()
            || self.radical_electrons.contains(&atom.radical_electrons);
        let charge_ok = self.charge.is_empty() || self.charge.contains(&atom.charge);
        type_ok && radical_ok && charge_ok
    }

    /// Equality of the accepted sets; labels are ignored.
    pub fn is_equivalent(&self, other: &GroupAtom) -> bool {
        same_set(&self.atom_types, &other.atom_types)
            && same_set(&self.radical_electrons, &other.radical_electrons)
            && same_set(&self.charge, &other.charge)
    }
}

impl crate::traits::HasLabel for GroupAtom {
    fn label(&self) -> &str {
        &self.label
    }

    fn set_label(&mut self, label: String) {
        self.label = label;
    }
}

impl crate::traits::RecipeAtom for GroupAtom {
    fn change_radicals(&mut self, delta: i8) -> bool {
        if self.radical_electrons.is_empty() {
            return true;
        }
        let shifted: Vec<u8> = self
            .radical_electrons
            .iter()
            .filter_map(|r| r.checked_add_signed(delta))
            .collect();
        if shifted.is_empty() {
            return false;
        }
        self.radical_electrons = shifted;
        true
    }

    fn apply_bond_change(&mut self, delta: i8) {
        let mut types: Vec<AtomType> = Vec::new();
        for t in &self.atom_types {
            for shifted in t.after_bond_change(delta) {
                if !types.contains(&shifted) {
                    types.push(shifted);
                }
            }
        }
        self.atom_types = types;
    }

    fn element_hint(&self) -> Option<Element> {
        match self.atom_types.as_slice() {
            [only] => only.element(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::RecipeAtom;

    #[test]
    fn molecule_atom_radicals() {
        let mut atom = Atom::new(Element::C);
        assert!(atom.change_radicals(1));
        assert_eq!(atom.radical_electrons, 1);
        assert!(atom.change_radicals(-1));
        assert!(!atom.change_radicals(-1));
        assert_eq!(atom.radical_electrons, 0);
    }

    #[test]
    fn group_atom_radical_sets_shift() {
        let mut atom = GroupAtom {
            radical_electrons: vec![0, 1],
            ..GroupAtom::new(vec![AtomType::C])
        };
        assert!(atom.change_radicals(-1));
        assert_eq!(atom.radical_electrons, vec![0]);
        assert!(!atom.change_radicals(-1));
    }

    #[test]
    fn group_atom_matching() {
        let mut methyl = Atom::new(Element::C);
        methyl.radical_electrons = 1;
        methyl.atom_type = AtomType::Cs;

        let radical = GroupAtom {
            radical_electrons: vec![1],
            ..GroupAtom::new(vec![AtomType::R])
        };
        assert!(radical.matches_atom(&methyl));

        let heavy_closed_shell = GroupAtom {
            radical_electrons: vec![0],
            ..GroupAtom::new(vec![AtomType::RnH])
        };
        assert!(!heavy_closed_shell.matches_atom(&methyl));
        assert!(!GroupAtom::new(vec![AtomType::Cd]).matches_atom(&methyl));
    }

    #[test]
    fn bond_change_updates_group_types() {
        let mut atom = GroupAtom::new(vec![AtomType::Cs, AtomType::Os]);
        atom.apply_bond_change(1);
        assert_eq!(atom.atom_types, vec![AtomType::Cd, AtomType::CO, AtomType::Od]);
    }
}
