//! Per-family special cases, looked up by family id.
//!
//! A handful of families need treatment the template alone cannot express:
//! identical reaction centers that the recipe must tell apart, product
//! relabeling for families that are their own reverse, 2-to-2 pairing
//! rules, and forced degeneracy halving. Each is a field of
//! [`FamilyStrategy`]; the default strategy has none of them.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::mol::Mol;
use crate::traits::HasLabel;

use super::error::FamilyError;

/// Two reaction centers that share one label in the template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdenticalCenters {
    /// The shared label, e.g. `*`.
    pub shared: String,
    /// Distinct labels given to the two centers while the recipe runs.
    pub numbered: [String; 2],
}

/// Relabeling applied to the products of a family that is its own reverse,
/// so that they carry the labels the template expects of reactants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductRelabel {
    /// Exchange two labels.
    Swap(String, String),
    /// Exchange `*1` and `*2` and reverse the chain `*4..*n`.
    IntraHMigration,
}

/// In a 2-to-2 reaction, the reactant carrying `reactant_label` pairs with
/// the product carrying `product_label`; the other two pair with each other.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairingRule {
    pub reactant_label: String,
    pub product_label: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FamilyStrategy {
    pub identical_centers: Option<IdenticalCenters>,
    pub product_relabel: Option<ProductRelabel>,
    pub pairing: Option<PairingRule>,
    /// Halve the degeneracy of every reaction, not just of A + A.
    pub halve_degeneracy: bool,
    /// Rate rules of a two-slot template also apply with the slots swapped.
    pub symmetric_rules: bool,
}

impl FamilyStrategy {
    /// Give the two atoms carrying the shared label their numbered labels.
    pub fn number_identical_centers<A: HasLabel, B>(&self, mol: &mut Mol<A, B>) -> Result<(), FamilyError> {
        let Some(centers) = &self.identical_centers else {
            return Ok(());
        };
        match mol.atoms_with_label(&centers.shared).as_slice() {
            &[first, second] => {
                mol.atom_mut(first).set_label(centers.numbered[0].clone());
                mol.atom_mut(second).set_label(centers.numbered[1].clone());
                Ok(())
            }
            found => Err(FamilyError::TemplateInconsistency(format!(
                "expected 2 atoms labeled {:?}, found {}",
                centers.shared,
                found.len()
            ))),
        }
    }

    /// Undo [`FamilyStrategy::number_identical_centers`].
    pub fn restore_identical_centers<A: HasLabel, B>(&self, mol: &mut Mol<A, B>) {
        let Some(centers) = &self.identical_centers else {
            return;
        };
        for label in &centers.numbered {
            for idx in mol.atoms_with_label(label) {
                mol.atom_mut(idx).set_label(centers.shared.clone());
            }
        }
    }

    /// Apply the product relabeling, if any.
    pub fn relabel_products<A: HasLabel, B>(&self, mol: &mut Mol<A, B>) -> Result<(), FamilyError> {
        match &self.product_relabel {
            None => Ok(()),
            Some(ProductRelabel::Swap(a, b)) => {
                relabel(mol, &[(a.as_str(), b.as_str()), (b.as_str(), a.as_str())])
            }
            Some(ProductRelabel::IntraHMigration) => {
                let highest = mol
                    .labeled_atoms()
                    .into_iter()
                    .map(|(label, _)| label)
                    .collect::<std::collections::BTreeSet<_>>()
                    .len();
                let mut mapping: Vec<(String, String)> =
                    vec![("*1".into(), "*2".into()), ("*2".into(), "*1".into())];
                if highest > 4 {
                    for i in 4..=highest {
                        mapping.push((format!("*{i}"), format!("*{}", 4 + highest - i)));
                    }
                }
                let pairs: Vec<(&str, &str)> =
                    mapping.iter().map(|(a, b)| (a.as_str(), b.as_str())).collect();
                relabel(mol, &pairs)
            }
        }
    }
}

/// Rename labels simultaneously. Every source label must be present.
fn relabel<A: HasLabel, B>(mol: &mut Mol<A, B>, mapping: &[(&str, &str)]) -> Result<(), FamilyError> {
    let mut targets = Vec::new();
    for &(from, to) in mapping {
        if from == to {
            continue;
        }
        let atoms = mol.atoms_with_label(from);
        if atoms.is_empty() {
            return Err(FamilyError::TemplateInconsistency(format!(
                "product relabeling needs an atom labeled {from:?}"
            )));
        }
        targets.extend(atoms.into_iter().map(|idx| (idx, to)));
    }
    for (idx, to) in targets {
        mol.atom_mut(idx).set_label(to.to_string());
    }
    Ok(())
}

/// Strategies keyed by lowercased family id.
#[derive(Debug, Clone, Default)]
pub struct StrategyTable {
    strategies: HashMap<String, FamilyStrategy>,
}

impl StrategyTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// The table of families known to need special handling.
    pub fn builtin() -> Self {
        let mut table = Self::new();
        table.register(
            "H_Abstraction",
            FamilyStrategy {
                product_relabel: Some(ProductRelabel::Swap("*1".into(), "*3".into())),
                pairing: Some(pairing("*1", "*3")),
                ..FamilyStrategy::default()
            },
        );
        table.register(
            "R_Recombination",
            FamilyStrategy {
                identical_centers: Some(IdenticalCenters {
                    shared: "*".into(),
                    numbered: ["*1".into(), "*2".into()],
                }),
                halve_degeneracy: true,
                symmetric_rules: true,
                ..FamilyStrategy::default()
            },
        );
        table.register(
            "Disproportionation",
            FamilyStrategy {
                pairing: Some(pairing("*1", "*1")),
                ..FamilyStrategy::default()
            },
        );
        table.register(
            "intra_H_migration",
            FamilyStrategy {
                product_relabel: Some(ProductRelabel::IntraHMigration),
                ..FamilyStrategy::default()
            },
        );
        for family in ["Substitution_O", "SubstitutionS"] {
            table.register(
                family,
                FamilyStrategy {
                    pairing: Some(pairing("*2", "*3")),
                    ..FamilyStrategy::default()
                },
            );
        }
        table
    }

    pub fn register(&mut self, family: &str, strategy: FamilyStrategy) {
        self.strategies.insert(family.to_lowercase(), strategy);
    }

    /// The registered strategy, or the default one.
    pub fn lookup(&self, family: &str) -> FamilyStrategy {
        self.strategies
            .get(&family.to_lowercase())
            .cloned()
            .unwrap_or_default()
    }
}

fn pairing(reactant_label: &str, product_label: &str) -> PairingRule {
    PairingRule {
        reactant_label: reactant_label.into(),
        product_label: product_label.into(),
    }
}
