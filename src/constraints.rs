use serde::{Deserialize, Serialize};

use crate::element::Element;
use crate::molecule::Molecule;

/// Upper bounds on the species a generation step may produce.
///
/// `None` leaves a quantity unbounded.
///
/// ```
/// use kincrab::{Molecule, SpeciesConstraints};
///
/// let constraints: SpeciesConstraints =
///     serde_json::from_str(r#"{"max_carbon_atoms": 1}"#).unwrap();
/// let ethane = Molecule::from_adjacency_list("1 C u0 {2,S}\n2 C u0 {1,S}").unwrap();
/// assert!(!constraints.allows(&ethane));
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeciesConstraints {
    pub max_carbon_atoms: Option<u32>,
    pub max_hydrogen_atoms: Option<u32>,
    pub max_oxygen_atoms: Option<u32>,
    pub max_nitrogen_atoms: Option<u32>,
    pub max_silicon_atoms: Option<u32>,
    pub max_sulfur_atoms: Option<u32>,
    pub max_heavy_atoms: Option<u32>,
    pub max_radical_electrons: Option<u32>,
}

impl SpeciesConstraints {
    pub fn unconstrained() -> Self {
        Self::default()
    }

    pub fn allows(&self, mol: &Molecule) -> bool {
        let within = |limit: Option<u32>, value: u32| limit.is_none_or(|max| value <= max);
        let elements = [
            (self.max_carbon_atoms, Element::C),
            (self.max_hydrogen_atoms, Element::H),
            (self.max_oxygen_atoms, Element::O),
            (self.max_nitrogen_atoms, Element::N),
            (self.max_silicon_atoms, Element::Si),
            (self.max_sulfur_atoms, Element::S),
        ];
        elements
            .into_iter()
            .all(|(limit, element)| within(limit, mol.element_count(element)))
            && within(self.max_heavy_atoms, mol.heavy_atom_count())
            && within(self.max_radical_electrons, mol.radical_count())
    }
}
