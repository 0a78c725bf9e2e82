//! Atom types used by group patterns.
//!
//! Molecule atoms carry a perceived type derived from their element and
//! bonding (for example `Cd` for a carbon with one C=C double bond). Group
//! atoms list the types they accept. A molecule atom matches a group atom
//! when its perceived type is a specific case of one of the listed types.

use crate::element::Element;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AtomType {
    /// Any atom.
    R,
    /// Any non-hydrogen atom.
    RnH,
    H,
    He,
    C,
    /// Carbon with only single bonds.
    Cs,
    /// Carbon with one double bond to a non-oxygen atom.
    Cd,
    /// Carbon with two double bonds.
    Cdd,
    /// Carbon with one triple bond.
    Ct,
    /// Carbon with one double bond to oxygen.
    CO,
    N,
    O,
    /// Oxygen with only single bonds.
    Os,
    /// Oxygen with one double bond.
    Od,
    F,
    Ne,
    Si,
    P,
    S,
    Cl,
    Ar,
    Br,
    I,
}

const SYMBOLS: [(&str, AtomType); 23] = [
    ("R", AtomType::R),
    ("R!H", AtomType::RnH),
    ("H", AtomType::H),
    ("He", AtomType::He),
    ("C", AtomType::C),
    ("Cs", AtomType::Cs),
    ("Cd", AtomType::Cd),
    ("Cdd", AtomType::Cdd),
    ("Ct", AtomType::Ct),
    ("CO", AtomType::CO),
    ("N", AtomType::N),
    ("O", AtomType::O),
    ("Os", AtomType::Os),
    ("Od", AtomType::Od),
    ("F", AtomType::F),
    ("Ne", AtomType::Ne),
    ("Si", AtomType::Si),
    ("P", AtomType::P),
    ("S", AtomType::S),
    ("Cl", AtomType::Cl),
    ("Ar", AtomType::Ar),
    ("Br", AtomType::Br),
    ("I", AtomType::I),
];

/// Bond counts around one atom, used for type perception.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Bonding {
    pub single: u8,
    pub double: u8,
    pub triple: u8,
    pub double_to_oxygen: u8,
}

impl AtomType {
    pub fn from_symbol(s: &str) -> Option<AtomType> {
        SYMBOLS.iter().find(|(sym, _)| *sym == s).map(|(_, t)| *t)
    }

    pub fn symbol(self) -> &'static str {
        SYMBOLS
            .iter()
            .find(|(_, t)| *t == self)
            .map_or("?", |(sym, _)| sym)
    }

    /// The generic type for an element, before any bonding is known.
    pub fn from_element(element: Element) -> AtomType {
        match element {
            Element::H => AtomType::H,
            Element::He => AtomType::He,
            Element::C => AtomType::C,
            Element::N => AtomType::N,
            Element::O => AtomType::O,
            Element::F => AtomType::F,
            Element::Ne => AtomType::Ne,
            Element::Si => AtomType::Si,
            Element::P => AtomType::P,
            Element::S => AtomType::S,
            Element::Cl => AtomType::Cl,
            Element::Ar => AtomType::Ar,
            Element::Br => AtomType::Br,
            Element::I => AtomType::I,
        }
    }

    pub fn perceive(element: Element, bonding: &Bonding) -> AtomType {
        match element {
            Element::C => match (bonding.double, bonding.triple) {
                (0, 0) => AtomType::Cs,
                (0, 1) => AtomType::Ct,
                (1, 0) if bonding.double_to_oxygen == 1 => AtomType::CO,
                (1, 0) => AtomType::Cd,
                (2, 0) => AtomType::Cdd,
                _ => AtomType::C,
            },
            Element::O => match bonding.double {
                0 => AtomType::Os,
                1 => AtomType::Od,
                _ => AtomType::O,
            },
            other => AtomType::from_element(other),
        }
    }

    /// The element a concrete type belongs to; `None` for `R` and `R!H`.
    pub fn element(self) -> Option<Element> {
        match self {
            AtomType::R | AtomType::RnH => None,
            AtomType::C
            | AtomType::Cs
            | AtomType::Cd
            | AtomType::Cdd
            | AtomType::Ct
            | AtomType::CO => Some(Element::C),
            AtomType::O | AtomType::Os | AtomType::Od => Some(Element::O),
            AtomType::H => Some(Element::H),
            AtomType::He => Some(Element::He),
            AtomType::N => Some(Element::N),
            AtomType::F => Some(Element::F),
            AtomType::Ne => Some(Element::Ne),
            AtomType::Si => Some(Element::Si),
            AtomType::P => Some(Element::P),
            AtomType::S => Some(Element::S),
            AtomType::Cl => Some(Element::Cl),
            AtomType::Ar => Some(Element::Ar),
            AtomType::Br => Some(Element::Br),
            AtomType::I => Some(Element::I),
        }
    }

    pub fn is_specific_case_of(self, general: AtomType) -> bool {
        if self == general {
            return true;
        }
        match general {
            AtomType::R => true,
            AtomType::RnH => self != AtomType::H,
            AtomType::C | AtomType::O => self.element() == general.element(),
            _ => false,
        }
    }

    /// Types an atom of this type may become after its bond order changes
    /// by `delta`.
    pub fn after_bond_change(self, delta: i8) -> Vec<AtomType> {
        let mut current = vec![self];
        for _ in 0..delta.unsigned_abs() {
            let mut next: Vec<AtomType> = Vec::new();
            for t in current {
                let shifted: &[AtomType] = match (t, delta > 0) {
                    (AtomType::Cs, true) => &[AtomType::Cd, AtomType::CO],
                    (AtomType::Cd, true) => &[AtomType::Cdd, AtomType::Ct],
                    (AtomType::CO, true) => &[AtomType::Cdd],
                    (AtomType::Os, true) => &[AtomType::Od],
                    (AtomType::Cd | AtomType::CO, false) => &[AtomType::Cs],
                    (AtomType::Cdd, false) => &[AtomType::Cd, AtomType::CO],
                    (AtomType::Ct, false) => &[AtomType::Cd],
                    (AtomType::Od, false) => &[AtomType::Os],
                    _ => std::slice::from_ref(&t),
                };
                for &s in shifted {
                    if !next.contains(&s) {
                        next.push(s);
                    }
                }
            }
            current = next;
        }
        current
    }
}

impl std::fmt::Display for AtomType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.symbol())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symbols_round_trip() {
        for (sym, t) in SYMBOLS {
            assert_eq!(AtomType::from_symbol(sym), Some(t));
            assert_eq!(t.symbol(), sym);
        }
    }

    #[test]
    fn perceive_carbon() {
        let alkane = Bonding { single: 4, ..Bonding::default() };
        assert_eq!(AtomType::perceive(Element::C, &alkane), AtomType::Cs);
        let alkene = Bonding { single: 2, double: 1, ..Bonding::default() };
        assert_eq!(AtomType::perceive(Element::C, &alkene), AtomType::Cd);
        let carbonyl = Bonding { single: 2, double: 1, double_to_oxygen: 1, ..Bonding::default() };
        assert_eq!(AtomType::perceive(Element::C, &carbonyl), AtomType::CO);
        let alkyne = Bonding { single: 1, triple: 1, ..Bonding::default() };
        assert_eq!(AtomType::perceive(Element::C, &alkyne), AtomType::Ct);
    }

    #[test]
    fn perceive_oxygen() {
        let hydroxyl = Bonding { single: 2, ..Bonding::default() };
        assert_eq!(AtomType::perceive(Element::O, &hydroxyl), AtomType::Os);
        let carbonyl = Bonding { double: 1, ..Bonding::default() };
        assert_eq!(AtomType::perceive(Element::O, &carbonyl), AtomType::Od);
        assert_eq!(AtomType::perceive(Element::H, &Bonding::default()), AtomType::H);
    }

    #[test]
    fn hierarchy() {
        assert!(AtomType::Cs.is_specific_case_of(AtomType::C));
        assert!(AtomType::Cs.is_specific_case_of(AtomType::RnH));
        assert!(AtomType::H.is_specific_case_of(AtomType::R));
        assert!(!AtomType::H.is_specific_case_of(AtomType::RnH));
        assert!(!AtomType::Os.is_specific_case_of(AtomType::C));
        assert!(!AtomType::C.is_specific_case_of(AtomType::Cs));
    }

    #[test]
    fn bond_change_shifts_types() {
        assert_eq!(AtomType::Cs.after_bond_change(1), vec![AtomType::Cd, AtomType::CO]);
        assert_eq!(AtomType::Cd.after_bond_change(-1), vec![AtomType::Cs]);
        assert_eq!(AtomType::Ct.after_bond_change(-2), vec![AtomType::Cs]);
        assert_eq!(AtomType::R.after_bond_change(1), vec![AtomType::R]);
    }
}
