//! Reaction recipes: ordered graph edits over labeled atoms.
//!
//! A recipe refers to atoms only through their labels (`*1`, `*2`, ...).
//! The same recipe is applied to merged reactant molecules to build
//! products, and to group patterns to build product templates.

use petgraph::graph::NodeIndex;
use serde::{Deserialize, Serialize};

use crate::bond::BondOrder;
use crate::mol::Mol;
use crate::traits::{RecipeAtom, RecipeBond};

/// Failure to apply or read a recipe action.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RecipeError {
    #[error("no atom labeled {0:?}")]
    MissingLabel(String),
    #[error("labels {0:?} and {1:?} refer to the same atom")]
    SelfAction(String, String),
    #[error("no bond between {0:?} and {1:?}")]
    MissingBond(String, String),
    #[error("bond between {0:?} and {1:?} already exists")]
    BondExists(String, String),
    #[error("bond order between {0:?} and {1:?} cannot change by {2}")]
    BondOrder(String, String, i8),
    #[error("atom {0:?} has no radical electron to lose")]
    NoRadical(String),
    #[error("unknown recipe action {0:?}")]
    UnknownAction(String),
    #[error("malformed recipe action {0:?}")]
    MalformedAction(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<RawToken>", into = "Vec<String>")]
pub enum Action {
    ChangeBond {
        center1: String,
        delta: i8,
        center2: String,
    },
    FormBond {
        center1: String,
        order: BondOrder,
        center2: String,
    },
    BreakBond {
        center1: String,
        order: BondOrder,
        center2: String,
    },
    GainRadical {
        center: String,
        count: u8,
    },
    LoseRadical {
        center: String,
        count: u8,
    },
}

/// Recipe tokens may be written as strings or bare numbers.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum RawToken {
    Text(String),
    Number(i64),
}

impl RawToken {
    fn into_string(self) -> String {
        match self {
            RawToken::Text(s) => s,
            RawToken::Number(n) => n.to_string(),
        }
    }
}

impl TryFrom<Vec<RawToken>> for Action {
    type Error = RecipeError;

    fn try_from(tokens: Vec<RawToken>) -> Result<Self, Self::Error> {
        let tokens: Vec<String> = tokens.into_iter().map(RawToken::into_string).collect();
        Action::from_tokens(&tokens)
    }
}

impl From<Action> for Vec<String> {
    fn from(action: Action) -> Self {
        action.to_tokens()
    }
}

impl Action {
    /// Read an action from its token form, e.g.
    /// `["CHANGE_BOND", "*1", "1", "*2"]`.
    pub fn from_tokens<S: AsRef<str>>(tokens: &[S]) -> Result<Action, RecipeError> {
        let tokens: Vec<&str> = tokens.iter().map(|t| t.as_ref().trim()).collect();
        let malformed = || RecipeError::MalformedAction(tokens.join(" "));
        let Some((&name, args)) = tokens.split_first() else {
            return Err(malformed());
        };
        let order = |s: &str| {
            BondOrder::from_symbol(s)
                .or_else(|| s.parse::<i16>().ok().and_then(BondOrder::from_value))
                .ok_or_else(malformed)
        };
        match (name.to_ascii_uppercase().as_str(), args) {
            ("CHANGE_BOND", [c1, delta, c2]) => Ok(Action::ChangeBond {
                center1: c1.to_string(),
                delta: delta.trim_start_matches('+').parse().map_err(|_| malformed())?,
                center2: c2.to_string(),
            }),
            ("FORM_BOND", [c1, o, c2]) => Ok(Action::FormBond {
                center1: c1.to_string(),
                order: order(*o)?,
                center2: c2.to_string(),
            }),
            ("BREAK_BOND", [c1, o, c2]) => Ok(Action::BreakBond {
                center1: c1.to_string(),
                order: order(*o)?,
                center2: c2.to_string(),
            }),
            ("GAIN_RADICAL", [c, count]) => Ok(Action::GainRadical {
                center: c.to_string(),
                count: count.parse().map_err(|_| malformed())?,
            }),
            ("LOSE_RADICAL", [c, count]) => Ok(Action::LoseRadical {
                center: c.to_string(),
                count: count.parse().map_err(|_| malformed())?,
            }),
            ("CHANGE_BOND" | "FORM_BOND" | "BREAK_BOND" | "GAIN_RADICAL" | "LOSE_RADICAL", _) => {
                Err(malformed())
            }
            _ => Err(RecipeError::UnknownAction(name.to_string())),
        }
    }

    pub fn to_tokens(&self) -> Vec<String> {
        match self {
            Action::ChangeBond { center1, delta, center2 } => vec![
                "CHANGE_BOND".into(),
                center1.clone(),
                delta.to_string(),
                center2.clone(),
            ],
            Action::FormBond { center1, order, center2 } => vec![
                "FORM_BOND".into(),
                center1.clone(),
                order.symbol().into(),
                center2.clone(),
            ],
            Action::BreakBond { center1, order, center2 } => vec![
                "BREAK_BOND".into(),
                center1.clone(),
                order.symbol().into(),
                center2.clone(),
            ],
            Action::GainRadical { center, count } => {
                vec!["GAIN_RADICAL".into(), center.clone(), count.to_string()]
            }
            Action::LoseRadical { center, count } => {
                vec!["LOSE_RADICAL".into(), center.clone(), count.to_string()]
            }
        }
    }

    /// The action that undoes this one.
    pub fn reverse(&self) -> Action {
        match self.clone() {
            Action::ChangeBond { center1, delta, center2 } => Action::ChangeBond {
                center1,
                delta: -delta,
                center2,
            },
            Action::FormBond { center1, order, center2 } => Action::BreakBond {
                center1,
                order,
                center2,
            },
            Action::BreakBond { center1, order, center2 } => Action::FormBond {
                center1,
                order,
                center2,
            },
            Action::GainRadical { center, count } => Action::LoseRadical { center, count },
            Action::LoseRadical { center, count } => Action::GainRadical { center, count },
        }
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.to_tokens().join(", "))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Recipe {
    pub actions: Vec<Action>,
}

impl Recipe {
    pub fn new(actions: Vec<Action>) -> Self {
        Self { actions }
    }

    /// The recipe for the reverse reaction: actions reversed individually.
    pub fn reverse(&self) -> Recipe {
        Recipe::new(self.actions.iter().map(Action::reverse).collect())
    }

    /// Apply every action to `mol` in order. With `forward == false` each
    /// action is applied as its reverse.
    ///
    /// The connectivity cache is dropped before the first edit and rebuilt
    /// once afterwards, even when an action fails part way through.
    pub fn apply<A, B>(&self, mol: &mut Mol<A, B>, forward: bool) -> Result<(), RecipeError>
    where
        A: RecipeAtom,
        B: RecipeBond,
    {
        mol.reset_connectivity_values();
        let result = self
            .actions
            .iter()
            .try_for_each(|action| apply_action(mol, action, forward));
        mol.update_connectivity_values();
        result
    }
}

fn resolve<A: RecipeAtom, B>(mol: &Mol<A, B>, label: &str) -> Result<NodeIndex, RecipeError> {
    mol.labeled_atom(label)
        .ok_or_else(|| RecipeError::MissingLabel(label.to_string()))
}

fn resolve_pair<A: RecipeAtom, B>(
    mol: &Mol<A, B>,
    label1: &str,
    label2: &str,
) -> Result<(NodeIndex, NodeIndex), RecipeError> {
    let a = resolve(mol, label1)?;
    let b = resolve(mol, label2)?;
    if a == b {
        return Err(RecipeError::SelfAction(label1.to_string(), label2.to_string()));
    }
    Ok((a, b))
}

fn apply_action<A, B>(mol: &mut Mol<A, B>, action: &Action, forward: bool) -> Result<(), RecipeError>
where
    A: RecipeAtom,
    B: RecipeBond,
{
    let action = if forward {
        action.clone()
    } else {
        action.reverse()
    };
    match action {
        Action::ChangeBond { center1, delta, center2 } => {
            let (a, b) = resolve_pair(mol, &center1, &center2)?;
            let edge = mol
                .bond_between(a, b)
                .ok_or_else(|| RecipeError::MissingBond(center1.clone(), center2.clone()))?;
            if !mol.bond_mut(edge).change_order(delta) {
                return Err(RecipeError::BondOrder(center1, center2, delta));
            }
            mol.atom_mut(a).apply_bond_change(delta);
            mol.atom_mut(b).apply_bond_change(delta);
        }
        Action::FormBond { center1, order, center2 } => {
            let (a, b) = resolve_pair(mol, &center1, &center2)?;
            if mol.bond_between(a, b).is_some() {
                return Err(RecipeError::BondExists(center1, center2));
            }
            let mut bond = B::single();
            let shift = order.value() as i8 - 1;
            if shift != 0 && !bond.change_order(shift) {
                return Err(RecipeError::BondOrder(center1, center2, shift));
            }
            mol.add_bond(a, b, bond);
        }
        Action::BreakBond { center1, center2, .. } => {
            let (a, b) = resolve_pair(mol, &center1, &center2)?;
            if mol.remove_bond(a, b).is_none() {
                return Err(RecipeError::MissingBond(center1, center2));
            }
        }
        Action::GainRadical { center, count } => {
            let a = resolve(mol, &center)?;
            for _ in 0..count {
                mol.atom_mut(a).change_radicals(1);
            }
        }
        Action::LoseRadical { center, count } => {
            let a = resolve(mol, &center)?;
            for _ in 0..count {
                if !mol.atom_mut(a).change_radicals(-1) {
                    return Err(RecipeError::NoRadical(center));
                }
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::group::Group;
    use crate::molecule::Molecule;

    fn mol(adjlist: &str) -> Molecule {
        Molecule::from_adjacency_list(adjlist)
            .unwrap_or_else(|e| panic!("bad adjacency list {adjlist:?}: {e}"))
    }

    fn action(tokens: &[&str]) -> Action {
        Action::from_tokens(tokens).unwrap()
    }

    fn h_abstraction() -> Recipe {
        Recipe::new(vec![
            action(&["BREAK_BOND", "*1", "S", "*2"]),
            action(&["FORM_BOND", "*2", "S", "*3"]),
            action(&["GAIN_RADICAL", "*1", "1"]),
            action(&["LOSE_RADICAL", "*3", "1"]),
        ])
    }

    fn methane_plus_hydrogen() -> Molecule {
        let methane = mol("1 *1 C u0 {2,S}\n2 *2 H u0 {1,S}");
        let hydrogen = mol("1 *3 H u1");
        methane.merge(&hydrogen)
    }

    // ---- Parsing ----

    #[test]
    fn tokens_round_trip() {
        let a = action(&["CHANGE_BOND", "*1", "-1", "*2"]);
        assert_eq!(
            a,
            Action::ChangeBond {
                center1: "*1".into(),
                delta: -1,
                center2: "*2".into()
            }
        );
        assert_eq!(Action::from_tokens(&a.to_tokens()).unwrap(), a);
    }

    #[test]
    fn unknown_action() {
        assert_eq!(
            Action::from_tokens(&["SWAP_ATOMS", "*1", "*2"]),
            Err(RecipeError::UnknownAction("SWAP_ATOMS".into()))
        );
        assert!(matches!(
            Action::from_tokens(&["FORM_BOND", "*1", "*2"]),
            Err(RecipeError::MalformedAction(_))
        ));
        assert!(matches!(
            Action::from_tokens(&["FORM_BOND", "*1", "Q", "*2"]),
            Err(RecipeError::MalformedAction(_))
        ));
    }

    #[test]
    fn json_tokens_accept_numbers() {
        let recipe: Recipe =
            serde_json::from_str(r#"[["CHANGE_BOND", "*1", 1, "*2"], ["GAIN_RADICAL", "*3", "2"]]"#)
                .unwrap();
        assert_eq!(recipe.actions.len(), 2);
        assert_eq!(
            recipe.actions[1],
            Action::GainRadical {
                center: "*3".into(),
                count: 2
            }
        );
        let text = serde_json::to_string(&recipe).unwrap();
        assert_eq!(text, r#"[["CHANGE_BOND","*1","1","*2"],["GAIN_RADICAL","*3","2"]]"#);
    }

    #[test]
    fn json_unknown_action_rejected() {
        let result: Result<Recipe, _> = serde_json::from_str(r#"[["EXPLODE", "*1"]]"#);
        assert!(result.is_err());
    }

    // ---- Reversal ----

    #[test]
    fn reverse_swaps_action_kinds() {
        let reverse = h_abstraction().reverse();
        assert_eq!(reverse.actions[0], action(&["FORM_BOND", "*1", "S", "*2"]));
        assert_eq!(reverse.actions[1], action(&["BREAK_BOND", "*2", "S", "*3"]));
        assert_eq!(reverse.actions[2], action(&["LOSE_RADICAL", "*1", "1"]));
        assert_eq!(reverse.actions[3], action(&["GAIN_RADICAL", "*3", "1"]));
        let change = action(&["CHANGE_BOND", "*1", "1", "*2"]);
        assert_eq!(change.reverse(), action(&["CHANGE_BOND", "*1", "-1", "*2"]));
    }

    #[test]
    fn reverse_is_an_involution() {
        let recipe = Recipe::new(vec![
            action(&["CHANGE_BOND", "*1", "1", "*2"]),
            action(&["FORM_BOND", "*1", "S", "*3"]),
            action(&["BREAK_BOND", "*2", "S", "*4"]),
            action(&["GAIN_RADICAL", "*4", "1"]),
            action(&["LOSE_RADICAL", "*3", "2"]),
        ]);
        assert_eq!(recipe.reverse().reverse(), recipe);
    }

    // ---- Application ----

    #[test]
    fn forward_produces_products() {
        let mut merged = methane_plus_hydrogen();
        h_abstraction().apply(&mut merged, true).unwrap();
        let products = merged.split();
        assert_eq!(products.len(), 2);
        let methyl = products.iter().find(|p| p.contains_labeled_atom("*1")).unwrap();
        assert_eq!(methyl.formula(), "CH3");
        assert_eq!(methyl.radical_count(), 1);
        let dihydrogen = products.iter().find(|p| p.contains_labeled_atom("*3")).unwrap();
        assert_eq!(dihydrogen.formula(), "H2");
        assert_eq!(dihydrogen.radical_count(), 0);
        assert!(merged.has_connectivity_values());
    }

    #[test]
    fn forward_then_reverse_restores_graph() {
        let original = methane_plus_hydrogen();
        let mut merged = original.clone();
        let recipe = h_abstraction();
        recipe.apply(&mut merged, true).unwrap();
        recipe.apply(&mut merged, false).unwrap();
        assert_eq!(merged, original);
        assert!(merged.is_isomorphic(&original));
    }

    #[test]
    fn reverse_recipe_forward_matches_recipe_backward() {
        let original = methane_plus_hydrogen();
        let recipe = h_abstraction();
        let mut a = original.clone();
        recipe.apply(&mut a, true).unwrap();
        let mut b = a.clone();
        recipe.reverse().apply(&mut a, true).unwrap();
        recipe.apply(&mut b, false).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn change_bond_updates_atom_types() {
        let mut ethyl = mol("1 *1 C u1 {2,S}\n2 *2 C u1 {1,S}");
        let recipe = Recipe::new(vec![
            action(&["CHANGE_BOND", "*1", "1", "*2"]),
            action(&["LOSE_RADICAL", "*1", "1"]),
            action(&["LOSE_RADICAL", "*2", "1"]),
        ]);
        recipe.apply(&mut ethyl, true).unwrap();
        let c = ethyl.labeled_atom("*1").unwrap();
        assert_eq!(ethyl.atom(c).atom_type, crate::atomtype::AtomType::Cd);
        assert_eq!(ethyl.formula(), "C2H4");
    }

    #[test]
    fn group_application_builds_product_pattern() {
        let mut pattern = Group::from_adjacency_list("1 *1 Cs u1 {2,S}\n2 *2 Cs u1 {1,S}").unwrap();
        let recipe = Recipe::new(vec![
            action(&["CHANGE_BOND", "*1", "1", "*2"]),
            action(&["LOSE_RADICAL", "*1", "1"]),
            action(&["LOSE_RADICAL", "*2", "1"]),
        ]);
        recipe.apply(&mut pattern, true).unwrap();
        let a = pattern.labeled_atom("*1").unwrap();
        assert_eq!(pattern.atom(a).radical_electrons, vec![0]);
        assert_eq!(
            pattern.atom(a).atom_types,
            vec![crate::atomtype::AtomType::Cd, crate::atomtype::AtomType::CO]
        );
    }

    // ---- Failures ----

    #[test]
    fn missing_label() {
        let mut merged = mol("1 *1 C u0 {2,S}\n2 *2 H u0 {1,S}");
        assert_eq!(
            h_abstraction().apply(&mut merged, true),
            Err(RecipeError::MissingLabel("*3".into()))
        );
    }

    #[test]
    fn break_missing_bond() {
        let mut merged = mol("1 *1 C u0").merge(&mol("1 *2 H u1"));
        let recipe = Recipe::new(vec![action(&["BREAK_BOND", "*1", "S", "*2"])]);
        assert_eq!(
            recipe.apply(&mut merged, true),
            Err(RecipeError::MissingBond("*1".into(), "*2".into()))
        );
    }

    #[test]
    fn self_action() {
        let mut ch4 = mol("1 *1 C u0");
        let recipe = Recipe::new(vec![action(&["FORM_BOND", "*1", "S", "*1"])]);
        assert!(matches!(
            recipe.apply(&mut ch4, true),
            Err(RecipeError::SelfAction(..))
        ));
    }

    #[test]
    fn lose_radical_below_zero() {
        let mut ch4 = mol("1 *1 C u0");
        let recipe = Recipe::new(vec![action(&["LOSE_RADICAL", "*1", "1"])]);
        assert_eq!(
            recipe.apply(&mut ch4, true),
            Err(RecipeError::NoRadical("*1".into()))
        );
    }

    #[test]
    fn bond_order_overflow() {
        let mut ethyne = mol("1 *1 C u0 {2,T}\n2 *2 C u0 {1,T}");
        let recipe = Recipe::new(vec![action(&["CHANGE_BOND", "*1", "1", "*2"])]);
        assert!(matches!(
            recipe.apply(&mut ethyne, true),
            Err(RecipeError::BondOrder(_, _, 1))
        ));
    }
}
