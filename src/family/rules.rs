//! Rate rules keyed by template, and the estimators built on them.

use std::collections::{HashMap, HashSet};

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::kinetics::{ArrheniusEP, KineticsModel, average_kinetics};
use crate::molecule::Molecule;

use super::depository::DepositoryEntries;
use super::error::FamilyError;
use super::tree::{NodeId, TemplateTree};
use super::KineticsFamily;

/// Rank given to rules produced by averaging.
pub const AVERAGED_RANK: u8 = 10;
/// Rank given to rules derived from training reactions.
pub const TRAINING_RANK: u8 = 3;

/// Direction in which the rate-rule search widens when the exact template
/// has no rule.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Widening {
    /// Replace one slot at a time with its parent.
    #[default]
    Ancestors,
    /// Replace every slot with its children.
    Descendants,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RateRule {
    pub index: u32,
    /// Template node labels joined with `;`.
    pub label: String,
    pub template: Vec<NodeId>,
    pub kinetics: ArrheniusEP,
    /// 0 marks a placeholder; lower nonzero ranks are more trusted.
    pub rank: u8,
    pub short_desc: String,
}

/// Rate rules grouped by template.
#[derive(Debug, Clone, Default)]
pub struct RuleTree {
    entries: HashMap<Vec<NodeId>, Vec<RateRule>>,
}

impl RuleTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, rule: RateRule) {
        self.entries.entry(rule.template.clone()).or_default().push(rule);
    }

    pub fn len(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Every rule stored for exactly this template.
    pub fn rules_for(&self, template: &[NodeId]) -> &[RateRule] {
        self.entries.get(template).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn iter(&self) -> impl Iterator<Item = &RateRule> {
        self.entries.values().flatten()
    }

    pub fn max_index(&self) -> u32 {
        self.iter().map(|r| r.index).max().unwrap_or(0)
    }

    /// The preferred rule for `template`: ranked rules beat placeholders,
    /// then the lowest rank wins, then the lowest index.
    pub fn lookup(&self, template: &[NodeId]) -> Option<&RateRule> {
        best_rule(self.rules_for(template))
    }

    /// Like [`RuleTree::lookup`], but with `symmetric` the rules stored
    /// under the swapped two-slot template compete as well.
    pub fn lookup_symmetric(&self, template: &[NodeId], symmetric: bool) -> Option<&RateRule> {
        let swapped: &[RateRule] = match template {
            [a, b] if symmetric && a != b => self.rules_for(&[*b, *a]),
            _ => &[],
        };
        best_rule(self.rules_for(template).iter().chain(swapped))
    }
}

fn best_rule<'a>(rules: impl IntoIterator<Item = &'a RateRule>) -> Option<&'a RateRule> {
    let rules: Vec<&RateRule> = rules.into_iter().collect();
    let ranked = rules.iter().any(|r| r.rank > 0);
    rules
        .into_iter()
        .filter(|r| !ranked || r.rank > 0)
        .min_by_key(|r| (r.rank, r.index))
}

/// Outcome of [`KineticsFamily::add_rules_from_training_set`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TrainingSummary {
    pub added: usize,
    /// Records that only match the reverse direction.
    pub skipped: usize,
}

/// `(a,b)` as used in estimate comments.
fn template_label(tree: &TemplateTree, template: &[NodeId]) -> String {
    format!("({})", template.iter().map(|&id| tree.label(id)).join(","))
}

fn append_line(comment: &mut String, line: &str) {
    if !comment.is_empty() {
        comment.push('\n');
    }
    comment.push_str(line);
}

impl KineticsFamily {
    /// The preferred rule for `template`. Families with symmetric rules
    /// pool the rules of both slot orders before picking.
    pub fn get_rate_rule(&self, template: &[NodeId]) -> Option<&RateRule> {
        self.rules.lookup_symmetric(template, self.strategy().symmetric_rules)
    }

    /// Kinetics for `template` from the rate rules, scaled by `degeneracy`.
    ///
    /// Without an exact ranked rule the search widens level by level, and
    /// the rules found at the first fruitful level are averaged. A
    /// placeholder rule for the exact template is the last resort.
    pub fn estimate_kinetics_using_rate_rules(
        &self,
        template: &[NodeId],
        degeneracy: u32,
    ) -> Result<ArrheniusEP, FamilyError> {
        let mut tried: HashSet<Vec<NodeId>> = HashSet::new();
        let mut level = vec![template.to_vec()];
        let mut exact = true;
        while !level.is_empty() {
            tried.extend(level.iter().cloned());
            let hits: Vec<(&Vec<NodeId>, &RateRule)> = level
                .iter()
                .filter_map(|t| self.get_rate_rule(t).map(|rule| (t, rule)))
                .filter(|(_, rule)| !exact || rule.rank > 0)
                .collect();
            exact = false;
            match hits.as_slice() {
                [] => level = self.widen(&level, &tried),
                [(t, rule)] => {
                    let note = if t.as_slice() == template {
                        "Exact match found".to_string()
                    } else {
                        format!("Estimated using template {}", template_label(&self.tree, t))
                    };
                    return Ok(self.finish_estimate(rule.kinetics.clone(), &note, template, degeneracy));
                }
                _ => {
                    let kinetics: Vec<ArrheniusEP> = hits.iter().map(|(_, r)| r.kinetics.clone()).collect();
                    let note = format!(
                        "Estimated using average of templates {}",
                        hits.iter().map(|(t, _)| template_label(&self.tree, t)).join(" + ")
                    );
                    return Ok(self.finish_estimate(average_kinetics(&kinetics)?, &note, template, degeneracy));
                }
            }
        }

        match self.get_rate_rule(template) {
            Some(rule) => Ok(self.finish_estimate(rule.kinetics.clone(), "Exact match found", template, degeneracy)),
            None => Err(FamilyError::UndeterminableKinetics(format!(
                "no rate rule for template {} in family {}",
                template_label(&self.tree, template),
                self.label
            ))),
        }
    }

    fn finish_estimate(
        &self,
        mut kinetics: ArrheniusEP,
        note: &str,
        template: &[NodeId],
        degeneracy: u32,
    ) -> ArrheniusEP {
        append_line(
            &mut kinetics.comment,
            &format!("{note} for rate rule {}", template_label(&self.tree, template)),
        );
        kinetics.multiply_a(degeneracy as f64);
        append_line(
            &mut kinetics.comment,
            &format!("Multiplied by reaction path degeneracy {degeneracy}"),
        );
        kinetics
    }

    /// The templates one step further from `level`, excluding any already
    /// tried.
    fn widen(&self, level: &[Vec<NodeId>], tried: &HashSet<Vec<NodeId>>) -> Vec<Vec<NodeId>> {
        let next: Vec<Vec<NodeId>> = match self.widening {
            Widening::Ancestors => level
                .iter()
                .flat_map(|t| {
                    (0..t.len()).filter_map(move |i| {
                        self.tree.parent(t[i]).map(|parent| {
                            let mut widened = t.clone();
                            widened[i] = parent;
                            widened
                        })
                    })
                })
                .collect(),
            Widening::Descendants => level
                .iter()
                .flat_map(|t| children_or_self(&self.tree, t))
                .collect(),
        };
        next.into_iter()
            .unique()
            .filter(|t| !tried.contains(t))
            .collect()
    }

    /// Fill templates without a ranked rule with the average of their
    /// children's rules, starting from the root template. Returns the number
    /// of rules added.
    pub fn fill_rules_by_averaging_up(&mut self) -> Result<usize, FamilyError> {
        let root = self.forward_template.reactants.clone();
        let symmetric = self.strategy().symmetric_rules;
        let mut filler = AveragingUp {
            tree: &self.tree,
            rules: &mut self.rules,
            symmetric,
            done: HashMap::new(),
            added: 0,
        };
        filler.average(&root)?;
        let added = filler.added;
        log::info!("{}: filled {added} rate rules by averaging", self.label);
        Ok(added)
    }

    /// Turn the forward training reactions into rank-3 rate rules with A
    /// divided by the reaction path degeneracy.
    pub fn add_rules_from_training_set(&mut self) -> Result<TrainingSummary, FamilyError> {
        let depository = self
            .depositories
            .iter()
            .find(|d| d.label.ends_with("training"))
            .ok_or_else(|| FamilyError::Config(format!("family {} has no training depository", self.label)))?;
        let DepositoryEntries::Records(records) = &depository.entries else {
            return Err(FamilyError::Config(format!(
                "training depository {} does not hold reactions",
                depository.label
            )));
        };
        let mut records: Vec<_> = records.iter().collect();
        records.sort_by_key(|r| r.index);

        let ctx = super::GenerationContext::default();
        let mut index = self.rules.max_index() + 1;
        let mut new_rules = Vec::new();
        let mut summary = TrainingSummary::default();
        for record in records {
            let slices: Vec<&[Molecule]> = record.reactants.iter().map(std::slice::from_ref).collect();
            let found = self.generate_direction(&slices, Some(record.products.as_slice()), true, &ctx)?;
            let Some(reaction) = found.first() else {
                log::warn!(
                    "{}: training reaction {} {} does not match the forward template; skipped",
                    self.label,
                    record.index,
                    record.label
                );
                summary.skipped += 1;
                continue;
            };
            let template = self.get_reaction_template(&reaction.reactants)?;
            let mut kinetics = match &record.kinetics {
                KineticsModel::Arrhenius(k) => k.to_arrhenius_ep(),
                KineticsModel::ArrheniusEP(k) => k.clone(),
            };
            kinetics.multiply_a(1.0 / reaction.degeneracy as f64);
            new_rules.push(RateRule {
                index,
                label: self.tree.joined_labels(&template),
                template,
                kinetics,
                rank: TRAINING_RANK,
                short_desc: format!("Rate rule generated from training reaction {}", record.index),
            });
            index += 1;
            summary.added += 1;
        }
        for rule in new_rules {
            self.rules.add(rule);
        }
        log::info!(
            "{}: added {} training rules, skipped {}",
            self.label,
            summary.added,
            summary.skipped
        );
        Ok(summary)
    }

    /// Kinetics from the root node data corrected by the most specific
    /// data-bearing ancestor of each template node.
    pub fn estimate_kinetics_using_group_additivity(
        &self,
        template: &[NodeId],
        degeneracy: u32,
    ) -> Result<ArrheniusEP, FamilyError> {
        let mut kinetics = self
            .forward_template
            .reactants
            .iter()
            .find_map(|&root| self.tree.node(root).data.clone())
            .ok_or_else(|| {
                FamilyError::UndeterminableKinetics(format!(
                    "no group additivity data at the roots of family {}",
                    self.label
                ))
            })?;
        let mut used = Vec::new();
        for &node in template {
            let source = std::iter::once(node)
                .chain(self.tree.ancestors(node))
                .filter(|&id| self.tree.parent(id).is_some())
                .find(|&id| self.tree.node(id).data.is_some());
            if let Some(correction) = source.and_then(|id| self.tree.node(id).data.as_ref()) {
                kinetics.a.scale(correction.a.value_si());
                kinetics.n += correction.n;
                kinetics.alpha += correction.alpha;
                kinetics.e0 = crate::units::Energy::from_si(kinetics.e0.value_si() + correction.e0.value_si());
                used.extend(source.map(|id| self.tree.label(id)));
            }
        }
        kinetics.comment = String::new();
        let note = if used.is_empty() {
            "Estimated using group additivity with no corrections".to_string()
        } else {
            format!("Estimated using group additivity with corrections from {}", used.join(", "))
        };
        Ok(self.finish_estimate(kinetics, &note, template, degeneracy))
    }
}

/// Each slot replaced by its children, or kept when it has none; every
/// combination, in slot order.
fn children_or_self(tree: &TemplateTree, template: &[NodeId]) -> Vec<Vec<NodeId>> {
    template
        .iter()
        .map(|&id| {
            let children = tree.children(id);
            if children.is_empty() { vec![id] } else { children.to_vec() }
        })
        .multi_cartesian_product()
        .collect()
}

struct AveragingUp<'a> {
    tree: &'a TemplateTree,
    rules: &'a mut RuleTree,
    symmetric: bool,
    done: HashMap<String, Option<ArrheniusEP>>,
    added: usize,
}

impl AveragingUp<'_> {
    fn average(&mut self, template: &[NodeId]) -> Result<Option<ArrheniusEP>, FamilyError> {
        let label = self.tree.joined_labels(template);
        if let Some(known) = self.done.get(&label) {
            return Ok(known.clone());
        }
        if let Some(rule) = self.rules.lookup_symmetric(template, self.symmetric).filter(|r| r.rank > 0) {
            let kinetics = rule.kinetics.clone();
            self.done.insert(label, Some(kinetics.clone()));
            return Ok(Some(kinetics));
        }

        let mut found: Vec<(ArrheniusEP, String)> = Vec::new();
        for child in children_or_self(self.tree, template) {
            if child.as_slice() == template {
                continue;
            }
            if let Some(kinetics) = self.average(&child)? {
                let name = if kinetics.comment.is_empty() {
                    self.tree.joined_labels(&child)
                } else {
                    kinetics.comment.clone()
                };
                found.push((kinetics, name));
            }
        }
        if found.is_empty() {
            self.done.insert(label, None);
            return Ok(None);
        }

        let kinetics_list: Vec<ArrheniusEP> = found.iter().map(|(k, _)| k.clone()).collect();
        let mut kinetics = average_kinetics(&kinetics_list)?;
        kinetics.comment = format!("Average of ({})", found.iter().map(|(_, name)| name).join(" + "));
        let index = self.rules.max_index() + 1;
        self.rules.add(RateRule {
            index,
            label: label.clone(),
            template: template.to_vec(),
            kinetics: kinetics.clone(),
            rank: AVERAGED_RANK,
            short_desc: String::new(),
        });
        self.added += 1;
        self.done.insert(label, Some(kinetics.clone()));
        Ok(Some(kinetics))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::units::{Energy, RateCoefficient};

    fn ep(a: f64, e0_kj: f64) -> ArrheniusEP {
        ArrheniusEP::new(
            RateCoefficient::new(a, "cm^3/(mol*s)").unwrap(),
            0.0,
            0.0,
            Energy::new(e0_kj, "kJ/mol").unwrap(),
        )
    }

    fn rule(index: u32, template: &[NodeId], a: f64, rank: u8) -> RateRule {
        RateRule {
            index,
            label: String::new(),
            template: template.to_vec(),
            kinetics: ep(a, 10.0),
            rank,
            short_desc: String::new(),
        }
    }

    #[test]
    fn ranked_rules_beat_placeholders() {
        let t = vec![NodeId(0), NodeId(1)];
        let mut rules = RuleTree::new();
        rules.add(rule(1, &t, 1e10, 0));
        rules.add(rule(7, &t, 2e10, 3));
        assert_eq!(rules.lookup(&t).map(|r| r.index), Some(7));
    }

    #[test]
    fn lower_index_breaks_rank_ties() {
        let t = vec![NodeId(0)];
        let mut rules = RuleTree::new();
        rules.add(rule(5, &t, 1e10, 2));
        rules.add(rule(2, &t, 2e10, 2));
        rules.add(rule(1, &t, 3e10, 4));
        assert_eq!(rules.lookup(&t).map(|r| r.index), Some(2));
        assert_eq!(rules.len(), 3);
        assert_eq!(rules.max_index(), 5);
    }

    #[test]
    fn placeholders_fall_back_to_index() {
        let t = vec![NodeId(0)];
        let mut rules = RuleTree::new();
        rules.add(rule(9, &t, 1e10, 0));
        rules.add(rule(4, &t, 2e10, 0));
        assert_eq!(rules.lookup(&t).map(|r| r.index), Some(4));
        assert!(rules.lookup(&[NodeId(3)]).is_none());
    }

    #[test]
    fn symmetric_lookup_ranks_both_orders_together() {
        let ab = vec![NodeId(0), NodeId(1)];
        let ba = vec![NodeId(1), NodeId(0)];
        let mut rules = RuleTree::new();
        rules.add(rule(2, &ab, 1e10, 0));
        rules.add(rule(3, &ba, 2e10, 3));
        assert_eq!(rules.lookup(&ab).map(|r| r.index), Some(2));
        assert_eq!(rules.lookup_symmetric(&ab, true).map(|r| r.index), Some(3));
        assert_eq!(rules.lookup_symmetric(&ab, false).map(|r| r.index), Some(2));

        let aa = vec![NodeId(0), NodeId(0)];
        rules.add(rule(4, &aa, 1e10, 1));
        assert_eq!(rules.lookup_symmetric(&aa, true).map(|r| r.index), Some(4));
    }

    #[test]
    fn descendant_combinations() {
        let mut tree = TemplateTree::new();
        let group = |s: &str| crate::group::Group::from_adjacency_list(s).unwrap();
        let a = tree.add_leaf("A", group("1 *1 C u0")).unwrap();
        let a1 = tree.add_leaf("A1", group("1 *1 C u0")).unwrap();
        let a2 = tree.add_leaf("A2", group("1 *1 C u0")).unwrap();
        let b = tree.add_leaf("B", group("1 *2 C u1")).unwrap();
        tree.set_parent(a1, a);
        tree.set_parent(a2, a);
        let combos = children_or_self(&tree, &[a, b]);
        assert_eq!(combos, vec![vec![a1, b], vec![a2, b]]);
        assert_eq!(children_or_self(&tree, &[a1, b]), vec![vec![a1, b]]);
    }

    #[test]
    fn comment_lines() {
        let mut comment = String::new();
        append_line(&mut comment, "first");
        append_line(&mut comment, "second");
        assert_eq!(comment, "first\nsecond");
    }
}
