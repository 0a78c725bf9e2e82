//! Loading a family from its JSON definition.

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::forbidden::{ForbiddenDefinition, ForbiddenStructures};
use crate::group::Group;
use crate::kinetics::{ArrheniusEP, KineticsModel};
use crate::molecule::Molecule;
use crate::recipe::Recipe;

use super::depository::{Depository, DepositoryEntries, ReactionRecord, RuleRecord};
use super::error::FamilyError;
use super::rules::{RateRule, RuleTree, Widening};
use super::strategy::{FamilyStrategy, StrategyTable};
use super::tree::{NodeId, TemplateTree};
use super::{KineticsFamily, Template};

/// A family file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FamilyDefinition {
    pub label: String,
    /// Name of the reverse family.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reverse: Option<String>,
    #[serde(default)]
    pub own_reverse: bool,
    /// Labels of the template nodes that form the reactant slots.
    pub reactants: Vec<String>,
    /// Names given to the generated product template nodes. Ignored for
    /// families that are their own reverse.
    #[serde(default)]
    pub products: Vec<String>,
    pub recipe: Recipe,
    pub groups: Vec<GroupDefinition>,
    #[serde(default)]
    pub forbidden: Vec<ForbiddenDefinition>,
    #[serde(default)]
    pub rules: Vec<RuleDefinition>,
    #[serde(default)]
    pub depositories: Vec<DepositoryDefinition>,
    #[serde(default)]
    pub widening: Widening,
    /// Overrides the built-in special-case handling for this family.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strategy: Option<FamilyStrategy>,
}

/// A template node: either a group pattern or a union of other nodes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupDefinition {
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub adjlist: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub union: Option<Vec<String>>,
    /// Group-additivity contribution of this node.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<ArrheniusEP>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleDefinition {
    pub index: u32,
    /// One node label per reactant slot.
    pub template: Vec<String>,
    pub kinetics: ArrheniusEP,
    #[serde(default)]
    pub rank: u8,
    #[serde(default)]
    pub short_desc: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordDefinition {
    pub index: u32,
    pub label: String,
    /// Adjacency lists.
    pub reactants: Vec<String>,
    pub products: Vec<String>,
    pub kinetics: KineticsModel,
    #[serde(default)]
    pub rank: u8,
    #[serde(default)]
    pub short_desc: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum DepositoryDefinition {
    Rules {
        label: String,
        entries: Vec<RuleDefinition>,
    },
    Records {
        label: String,
        entries: Vec<RecordDefinition>,
    },
}

fn config(msg: impl Into<String>) -> FamilyError {
    FamilyError::Config(msg.into())
}

fn build_tree(groups: &[GroupDefinition]) -> Result<TemplateTree, FamilyError> {
    let mut tree = TemplateTree::new();

    for def in groups {
        let id = match (&def.adjlist, &def.union) {
            (Some(adjlist), None) => {
                let group = Group::from_adjacency_list(adjlist)
                    .map_err(|e| config(format!("group {}: {e}", def.label)))?;
                tree.add_leaf(&def.label, group)?
            }
            (None, Some(_)) => tree.add_union(&def.label, Vec::new())?,
            (Some(_), Some(_)) => {
                return Err(config(format!("group {} has both an adjlist and a union", def.label)));
            }
            (None, None) => {
                return Err(config(format!("group {} has neither an adjlist nor a union", def.label)));
            }
        };
        tree.set_data(id, def.data.clone());
    }

    let lookup = |tree: &TemplateTree, label: &str, what: &str, owner: &str| {
        tree.get(label)
            .ok_or_else(|| config(format!("group {owner}: unknown {what} {label}")))
    };
    for def in groups {
        let Some(id) = tree.get(&def.label) else {
            continue;
        };
        if let Some(members) = &def.union {
            let members = members
                .iter()
                .map(|m| lookup(&tree, m, "union member", &def.label))
                .collect::<Result<Vec<_>, _>>()?;
            tree.set_union_members(id, members)?;
        }
        if let Some(parent) = &def.parent {
            let parent = lookup(&tree, parent, "parent", &def.label)?;
            tree.set_parent(id, parent);
        }
    }
    Ok(tree)
}

fn resolve_template(tree: &TemplateTree, labels: &[String], owner: &str) -> Result<Vec<NodeId>, FamilyError> {
    labels
        .iter()
        .map(|label| {
            tree.get(label)
                .ok_or_else(|| config(format!("{owner}: unknown template node {label}")))
        })
        .collect()
}

fn build_rules(
    tree: &TemplateTree,
    defs: &[RuleDefinition],
    slots: usize,
) -> Result<RuleTree, FamilyError> {
    let mut rules = RuleTree::new();
    for def in defs {
        let owner = format!("rule {}", def.index);
        if def.template.len() != slots {
            return Err(config(format!(
                "{owner}: template has {} nodes, family has {slots} reactants",
                def.template.len()
            )));
        }
        let template = resolve_template(tree, &def.template, &owner)?;
        rules.add(RateRule {
            index: def.index,
            label: def.template.join(";"),
            template,
            kinetics: def.kinetics.clone(),
            rank: def.rank,
            short_desc: def.short_desc.clone(),
        });
    }
    Ok(rules)
}

fn parse_molecules(adjlists: &[String], owner: &str) -> Result<Vec<Molecule>, FamilyError> {
    adjlists
        .iter()
        .map(|adjlist| Molecule::from_adjacency_list(adjlist).map_err(|e| config(format!("{owner}: {e}"))))
        .collect()
}

fn build_depository(tree: &TemplateTree, def: &DepositoryDefinition) -> Result<Depository, FamilyError> {
    Ok(match def {
        DepositoryDefinition::Rules { label, entries } => {
            let rules = entries
                .iter()
                .map(|entry| {
                    resolve_template(tree, &entry.template, &format!("{label} entry {}", entry.index))?;
                    Ok(RuleRecord {
                        index: entry.index,
                        label: entry.template.join(";"),
                        kinetics: entry.kinetics.clone(),
                        rank: entry.rank,
                        short_desc: entry.short_desc.clone(),
                    })
                })
                .collect::<Result<Vec<_>, FamilyError>>()?;
            Depository {
                label: label.clone(),
                entries: DepositoryEntries::Rules(rules),
            }
        }
        DepositoryDefinition::Records { label, entries } => {
            let records = entries
                .iter()
                .map(|entry| {
                    let owner = format!("{label} entry {}", entry.index);
                    Ok(ReactionRecord {
                        index: entry.index,
                        label: entry.label.clone(),
                        reactants: parse_molecules(&entry.reactants, &owner)?,
                        products: parse_molecules(&entry.products, &owner)?,
                        kinetics: entry.kinetics.clone(),
                        rank: entry.rank,
                        short_desc: entry.short_desc.clone(),
                    })
                })
                .collect::<Result<Vec<_>, FamilyError>>()?;
            Depository {
                label: label.clone(),
                entries: DepositoryEntries::Records(records),
            }
        }
    })
}

impl KineticsFamily {
    pub fn from_json(json: &str) -> Result<Self, FamilyError> {
        let def: FamilyDefinition = serde_json::from_str(json)?;
        Self::from_definition(def)
    }

    /// Build a family, generating its product template and, unless it is its
    /// own reverse, its reverse template and recipe.
    pub fn from_definition(def: FamilyDefinition) -> Result<Self, FamilyError> {
        if def.reactants.is_empty() {
            return Err(config(format!("family {} has an empty template", def.label)));
        }
        if !def.own_reverse && def.products.is_empty() {
            return Err(config(format!(
                "family {} is not its own reverse but names no products",
                def.label
            )));
        }

        let tree = build_tree(&def.groups)?;
        let reactants = resolve_template(&tree, &def.reactants, &format!("family {}", def.label))?;
        let rules = build_rules(&tree, &def.rules, reactants.len())?;
        let depositories = def
            .depositories
            .iter()
            .map(|d| build_depository(&tree, d))
            .collect::<Result<Vec<_>, _>>()?;
        let forbidden = ForbiddenStructures::from_definitions(&def.forbidden)
            .map_err(|e| config(format!("family {} forbidden structures: {e}", def.label)))?;
        let strategy = def
            .strategy
            .unwrap_or_else(|| StrategyTable::builtin().lookup(&def.label));

        let mut family = KineticsFamily {
            label: def.label,
            reverse_label: def.reverse,
            own_reverse: def.own_reverse,
            forward_template: Template {
                reactants: reactants.clone(),
                products: Vec::new(),
            },
            forward_recipe: def.recipe,
            reverse_template: None,
            reverse_recipe: None,
            tree,
            forbidden,
            rules,
            depositories,
            widening: def.widening,
            strategy,
        };

        if family.own_reverse {
            family.forward_template.products = reactants;
        } else {
            let products = family.generate_product_template(&def.products)?;
            family.reverse_template = Some(Template {
                reactants: products.clone(),
                products: reactants,
            });
            family.reverse_recipe = Some(family.forward_recipe.reverse());
            family.forward_template.products = products;
        }

        log::info!(
            "loaded family {}: {} template nodes, {} rate rules, {} depositories",
            family.label,
            family.tree.len(),
            family.rules.len(),
            family.depositories.len()
        );
        Ok(family)
    }

    /// Apply the forward recipe to every combination of reactant leaves and
    /// add the distinct results to the tree, one node per product name.
    fn generate_product_template(&mut self, names: &[String]) -> Result<Vec<NodeId>, FamilyError> {
        let slots: Vec<Vec<Group>> = self
            .forward_template
            .reactants
            .iter()
            .map(|&slot| {
                self.tree
                    .expand(slot)
                    .iter()
                    .filter_map(|&leaf| self.tree.node(leaf).group().cloned())
                    .collect()
            })
            .collect();

        let mut found: Vec<Vec<Group>> = vec![Vec::new(); names.len()];
        for combination in slots.into_iter().multi_cartesian_product() {
            let labels = combination.iter().map(|g| g.to_adjacency_list()).join(" + ");
            let products = self
                .run_recipe(&combination, true)
                .map_err(|e| config(format!("family {}: recipe fails on {labels}: {e}", self.label)))?;
            if products.len() != names.len() {
                return Err(config(format!(
                    "family {}: recipe gives {} products, {} names given",
                    self.label,
                    products.len(),
                    names.len()
                )));
            }
            for (seen, product) in found.iter_mut().zip(products) {
                if !seen.iter().any(|g| g.is_isomorphic(&product)) {
                    seen.push(product);
                }
            }
        }

        let mut ids = Vec::with_capacity(names.len());
        for (name, mut groups) in names.iter().zip(found) {
            let id = if groups.len() == 1 {
                self.tree.add_leaf(name, groups.remove(0))?
            } else {
                let members = groups
                    .into_iter()
                    .enumerate()
                    .map(|(i, group)| self.tree.add_leaf(&format!("{name}_{}", i + 1), group))
                    .collect::<Result<Vec<_>, _>>()?;
                let union = self.tree.add_union(name, members.clone())?;
                for member in members {
                    self.tree.set_parent(member, union);
                }
                union
            };
            ids.push(id);
        }
        Ok(ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::family::NodeKind;
    use indoc::indoc;

    const FISSION: &str = indoc! {r#"
        {
            "label": "Bond_Fission",
            "reverse": "Recombination",
            "reactants": ["R_R"],
            "products": ["Rad1", "Rad2"],
            "recipe": [
                ["BREAK_BOND", "*1", "1", "*2"],
                ["GAIN_RADICAL", "*1", "1"],
                ["GAIN_RADICAL", "*2", "1"]
            ],
            "groups": [
                {"label": "R_R", "union": ["C_C", "C_O"]},
                {"label": "C_C", "parent": "R_R", "adjlist": "1 *1 C u0 {2,S}\n2 *2 C u0 {1,S}"},
                {"label": "C_O", "parent": "R_R", "adjlist": "1 *1 C u0 {2,S}\n2 *2 O u0 {1,S}"}
            ],
            "rules": [
                {"index": 1, "template": ["C_C"], "kinetics": {"a": [1e16, "s^-1"], "e0": [88, "kcal/mol"]}, "rank": 4}
            ]
        }
    "#};

    const RECOMBINATION: &str = indoc! {r#"
        {
            "label": "R_Recombination",
            "reactants": ["Y_rad", "Y_rad"],
            "products": ["R_R"],
            "recipe": [
                ["FORM_BOND", "*1", "1", "*2"],
                ["LOSE_RADICAL", "*1", "1"],
                ["LOSE_RADICAL", "*2", "1"]
            ],
            "groups": [
                {"label": "Y_rad", "adjlist": "1 * R u1"}
            ]
        }
    "#};

    fn definition(json: &str) -> FamilyDefinition {
        serde_json::from_str(json).unwrap()
    }

    fn expect_config(def: FamilyDefinition, needle: &str) {
        match KineticsFamily::from_definition(def) {
            Err(FamilyError::Config(msg)) => assert!(msg.contains(needle), "{msg:?} lacks {needle:?}"),
            other => panic!("expected a config error, got {other:?}"),
        }
    }

    #[test]
    fn product_template_merges_distinct_products() {
        let family = KineticsFamily::from_json(FISSION).unwrap();
        assert_eq!(family.reverse_label.as_deref(), Some("Recombination"));
        assert_eq!(family.tree.joined_labels(&family.forward_template.products), "Rad1;Rad2");

        // both fissions give the same *1 radical
        let rad1 = family.forward_template.products[0];
        assert!(matches!(family.tree.node(rad1).kind, NodeKind::Leaf(_)));

        let rad2 = family.forward_template.products[1];
        assert!(matches!(family.tree.node(rad2).kind, NodeKind::Union(_)));
        let leaves: Vec<_> = family.tree.expand(rad2).iter().map(|&id| family.tree.label(id)).collect();
        assert_eq!(leaves, ["Rad2_1", "Rad2_2"]);
        assert_eq!(family.tree.children(rad2).len(), 2);

        let reverse = family.reverse_template.as_ref().unwrap();
        assert_eq!(reverse.reactants, family.forward_template.products);
        assert_eq!(reverse.products, family.forward_template.reactants);
        assert_eq!(family.reverse_recipe.as_ref().unwrap(), &family.forward_recipe.reverse());
        assert_eq!(family.rules.len(), 1);
    }

    #[test]
    fn two_reactants_combine_into_one_product_slot() {
        let family = KineticsFamily::from_json(RECOMBINATION).unwrap();
        assert_eq!(family.tree.joined_labels(&family.forward_template.products), "R_R");

        let r_r = family.forward_template.products[0];
        let group = family.tree.node(r_r).group().unwrap();
        assert_eq!(group.atom_count(), 2);
        assert_eq!(group.bond_count(), 1);
        assert_eq!(group.atoms_with_label("*").len(), 2);

        let reverse = family.reverse_template.as_ref().unwrap();
        assert_eq!(reverse.reactants, vec![r_r]);
        assert_eq!(reverse.products, family.forward_template.reactants);
    }

    #[test]
    fn own_reverse_family_reuses_reactants() {
        let mut def = definition(FISSION);
        def.own_reverse = true;
        def.products.clear();
        let family = KineticsFamily::from_definition(def).unwrap();
        assert_eq!(family.forward_template.products, family.forward_template.reactants);
        assert!(family.reverse_template.is_none());
        assert!(family.reverse_recipe.is_none());
    }

    #[test]
    fn builtin_strategy_is_registered() {
        let mut def = definition(FISSION);
        def.label = "Disproportionation".into();
        let family = KineticsFamily::from_definition(def).unwrap();
        assert!(family.strategy().pairing.is_some());

        let mut def = definition(FISSION);
        def.strategy = Some(FamilyStrategy {
            symmetric_rules: true,
            ..FamilyStrategy::default()
        });
        let family = KineticsFamily::from_definition(def).unwrap();
        assert!(family.strategy().symmetric_rules);
        assert!(family.strategy().pairing.is_none());
    }

    #[test]
    fn invalid_definitions() {
        let mut def = definition(FISSION);
        def.groups[1].parent = Some("Nope".into());
        expect_config(def, "unknown parent Nope");

        let mut def = definition(FISSION);
        def.groups[0].union = Some(vec!["C_C".into(), "C_N".into()]);
        expect_config(def, "unknown union member C_N");

        let mut def = definition(FISSION);
        def.reactants = vec!["C_N".into()];
        expect_config(def, "unknown template node C_N");

        let mut def = definition(FISSION);
        def.groups[2].label = "C_C".into();
        expect_config(def, "C_C");

        let mut def = definition(FISSION);
        def.groups[1].adjlist = Some("1 *1 Qq u0".into());
        expect_config(def, "group C_C");

        let mut def = definition(FISSION);
        def.groups[0].adjlist = Some("1 *1 C u0".into());
        expect_config(def, "both");

        let mut def = definition(FISSION);
        def.groups[1].adjlist = None;
        expect_config(def, "neither");

        let mut def = definition(FISSION);
        def.reactants.clear();
        expect_config(def, "empty template");

        let mut def = definition(FISSION);
        def.products.clear();
        expect_config(def, "names no products");

        let mut def = definition(FISSION);
        def.products = vec!["Rad1".into()];
        expect_config(def, "2 products, 1 names");

        let mut def = definition(FISSION);
        def.products = vec!["C_C".into(), "Rad2".into()];
        expect_config(def, "C_C");

        let mut def = definition(FISSION);
        def.rules[0].template = vec!["C_C".into(), "C_O".into()];
        expect_config(def, "template has 2 nodes");
    }

    #[test]
    fn bad_json_is_reported() {
        assert!(matches!(KineticsFamily::from_json("{"), Err(FamilyError::Json(_))));
    }

    #[test]
    fn depositories_load() {
        let mut def = definition(FISSION);
        def.depositories = serde_json::from_str(indoc! {r#"
            [
                {
                    "kind": "records",
                    "label": "Bond_Fission/training",
                    "entries": [{
                        "index": 1,
                        "label": "C2H6 <=> CH3 + CH3",
                        "reactants": ["1 C u0 {2,S}\n2 C u0 {1,S}"],
                        "products": ["1 C u1", "1 C u1"],
                        "kinetics": {"type": "Arrhenius", "a": [2e16, "s^-1"], "n": 0, "ea": [88, "kcal/mol"]},
                        "rank": 2
                    }]
                },
                {
                    "kind": "rules",
                    "label": "Bond_Fission/library",
                    "entries": [{"index": 4, "template": ["C_O"], "kinetics": {"a": [1e15, "s^-1"], "e0": [90, "kcal/mol"]}}]
                }
            ]
        "#})
        .unwrap();
        let family = KineticsFamily::from_definition(def).unwrap();
        assert_eq!(family.depositories.len(), 2);
        assert_eq!(family.depositories[0].len(), 1);
        match &family.depositories[0].entries {
            DepositoryEntries::Records(records) => {
                assert_eq!(records[0].reactants[0].formula(), "C2H6");
                assert_eq!(records[0].products.len(), 2);
            }
            other => panic!("expected records, got {other:?}"),
        }
        match &family.depositories[1].entries {
            DepositoryEntries::Rules(rules) => assert_eq!(rules[0].label, "C_O"),
            other => panic!("expected rules, got {other:?}"),
        }
    }
}
