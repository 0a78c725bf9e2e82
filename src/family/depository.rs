//! Kinetics libraries attached to a family, and the combined lookup that
//! falls back to the rate-rule estimators.

use std::collections::BTreeSet;

use crate::kinetics::{ArrheniusEP, KineticsModel};
use crate::molecule::Molecule;
use crate::reaction::GeneratedReaction;

use super::error::FamilyError;
use super::tree::{NodeId, TemplateTree};
use super::{Estimator, KineticsFamily};

/// A rate law stored against a template, written as `;`-joined labels.
#[derive(Debug, Clone)]
pub struct RuleRecord {
    pub index: u32,
    pub label: String,
    pub kinetics: ArrheniusEP,
    pub rank: u8,
    pub short_desc: String,
}

/// Kinetics measured or computed for one specific reaction.
#[derive(Debug, Clone)]
pub struct ReactionRecord {
    pub index: u32,
    pub label: String,
    pub reactants: Vec<Molecule>,
    pub products: Vec<Molecule>,
    pub kinetics: KineticsModel,
    pub rank: u8,
    pub short_desc: String,
}

#[derive(Debug, Clone)]
pub enum DepositoryEntries {
    Rules(Vec<RuleRecord>),
    Records(Vec<ReactionRecord>),
}

#[derive(Debug, Clone)]
pub struct Depository {
    pub label: String,
    pub entries: DepositoryEntries,
}

/// Where a rate law came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Provenance {
    Depository {
        depository: String,
        index: u32,
        label: String,
        rank: u8,
    },
    RateRules,
    GroupAdditivity,
}

#[derive(Debug, Clone, PartialEq)]
pub struct KineticsMatch {
    pub kinetics: KineticsModel,
    pub source: Provenance,
    /// Whether the kinetics apply to the reaction as stored, rather than to
    /// its reverse.
    pub is_forward: bool,
}

impl KineticsMatch {
    /// `(rank, index)` of depository entries; estimates sort last.
    fn sort_key(&self) -> (u8, u32) {
        match &self.source {
            Provenance::Depository { rank, index, .. } => (*rank, *index),
            _ => (u8::MAX, u32::MAX),
        }
    }

    fn rank(&self) -> u8 {
        self.sort_key().0
    }
}

fn label_set(labels: &str) -> BTreeSet<&str> {
    labels.split(';').map(str::trim).collect()
}

fn rule_match(
    depository: &str,
    index: u32,
    label: &str,
    rank: u8,
    kinetics: &ArrheniusEP,
    degeneracy: u32,
) -> KineticsMatch {
    let mut kinetics = kinetics.clone();
    kinetics.multiply_a(degeneracy as f64);
    if !kinetics.comment.is_empty() {
        kinetics.comment.push('\n');
    }
    kinetics.comment.push_str(&format!(
        "Matched rule {index} {label} in {depository}\nMultiplied by reaction path degeneracy {degeneracy}"
    ));
    KineticsMatch {
        kinetics: kinetics.into(),
        source: Provenance::Depository {
            depository: depository.to_string(),
            index,
            label: label.to_string(),
            rank,
        },
        is_forward: true,
    }
}

impl Depository {
    pub fn len(&self) -> usize {
        match &self.entries {
            DepositoryEntries::Rules(rules) => rules.len(),
            DepositoryEntries::Records(records) => records.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Entries matching `reaction`: rules by template label set, records by
    /// reaction isomorphism in either direction.
    pub fn find_kinetics(&self, tree: &TemplateTree, reaction: &GeneratedReaction) -> Vec<KineticsMatch> {
        match &self.entries {
            DepositoryEntries::Rules(rules) => {
                let template = tree.joined_labels(&reaction.template);
                let wanted = label_set(&template);
                rules
                    .iter()
                    .filter(|rule| label_set(&rule.label) == wanted)
                    .map(|rule| {
                        rule_match(
                            &self.label,
                            rule.index,
                            &rule.label,
                            rule.rank,
                            &rule.kinetics,
                            reaction.degeneracy,
                        )
                    })
                    .collect()
            }
            DepositoryEntries::Records(records) => records
                .iter()
                .filter_map(|record| {
                    let is_forward = reaction.match_direction(&record.reactants, &record.products)?;
                    let mut kinetics = record.kinetics.clone();
                    let comment = kinetics.comment_mut();
                    if !comment.is_empty() {
                        comment.push('\n');
                    }
                    comment.push_str(&format!(
                        "Matched reaction {} {} in {}",
                        record.index, record.label, self.label
                    ));
                    Some(KineticsMatch {
                        kinetics,
                        source: Provenance::Depository {
                            depository: self.label.clone(),
                            index: record.index,
                            label: record.label.clone(),
                            rank: record.rank,
                        },
                        is_forward,
                    })
                })
                .collect(),
        }
    }
}

impl KineticsFamily {
    /// Name under which the family's own rate rules are reported.
    fn rules_source(&self) -> String {
        format!("{}/rules", self.label)
    }

    /// Hits from every depository in registration order, followed by exact
    /// rules from the family's rule tree.
    pub fn get_kinetics_from_depositories(&self, reaction: &GeneratedReaction) -> Vec<KineticsMatch> {
        let mut hits: Vec<KineticsMatch> = self
            .depositories
            .iter()
            .flat_map(|d| d.find_kinetics(&self.tree, reaction))
            .collect();
        let template = self.tree.joined_labels(&reaction.template);
        let wanted = label_set(&template);
        let source = self.rules_source();
        let mut rules: Vec<_> = self
            .rules
            .iter()
            .filter(|rule| label_set(&rule.label) == wanted)
            .collect();
        rules.sort_by_key(|rule| rule.index);
        hits.extend(rules.into_iter().map(|rule| {
            rule_match(&source, rule.index, &rule.label, rule.rank, &rule.kinetics, reaction.degeneracy)
        }));
        hits
    }

    /// Every rate law available for `reaction`: depository hits, then the
    /// requested estimator, or both estimators when none is requested.
    pub fn get_all_kinetics(
        &self,
        reaction: &GeneratedReaction,
        estimator: Option<Estimator>,
    ) -> Result<Vec<KineticsMatch>, FamilyError> {
        let mut all = self.get_kinetics_from_depositories(reaction);
        let estimators = match estimator {
            Some(e) => vec![e],
            None => vec![Estimator::RateRules, Estimator::GroupAdditivity],
        };
        for estimator in estimators {
            match self.estimate(&reaction.template, reaction.degeneracy, estimator) {
                Ok(hit) => all.push(hit),
                Err(FamilyError::UndeterminableKinetics(reason)) => {
                    log::debug!("{}: {estimator:?} estimate unavailable: {reason}", self.label);
                }
                Err(err) => return Err(err),
            }
        }
        if all.is_empty() {
            return Err(FamilyError::UndeterminableKinetics(format!(
                "no kinetics for {reaction} in family {}",
                self.label
            )));
        }
        Ok(all)
    }

    /// The preferred rate law for `reaction`.
    ///
    /// Depository hits win when there are any, chosen by rank and then
    /// index across all depositories. Otherwise the requested estimator is
    /// used, or rate rules with group additivity as the fallback.
    pub fn get_best_kinetics(
        &self,
        reaction: &GeneratedReaction,
        estimator: Option<Estimator>,
    ) -> Result<KineticsMatch, FamilyError> {
        let mut hits = self.get_kinetics_from_depositories(reaction);
        if hits.iter().any(|h| h.rank() > 0) {
            hits.retain(|h| h.rank() > 0);
        }
        hits.sort_by_key(KineticsMatch::sort_key);
        if let Some(best) = hits.into_iter().next() {
            return Ok(best);
        }

        match estimator {
            Some(estimator) => self.estimate(&reaction.template, reaction.degeneracy, estimator),
            None => match self.estimate(&reaction.template, reaction.degeneracy, Estimator::RateRules) {
                Err(FamilyError::UndeterminableKinetics(_)) => {
                    self.estimate(&reaction.template, reaction.degeneracy, Estimator::GroupAdditivity)
                }
                result => result,
            },
        }
    }

    fn estimate(
        &self,
        template: &[NodeId],
        degeneracy: u32,
        estimator: Estimator,
    ) -> Result<KineticsMatch, FamilyError> {
        let (kinetics, source) = match estimator {
            Estimator::RateRules => (
                self.estimate_kinetics_using_rate_rules(template, degeneracy)?,
                Provenance::RateRules,
            ),
            Estimator::GroupAdditivity => (
                self.estimate_kinetics_using_group_additivity(template, degeneracy)?,
                Provenance::GroupAdditivity,
            ),
        };
        Ok(KineticsMatch {
            kinetics: kinetics.into(),
            source,
            is_forward: true,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::units::{Energy, RateCoefficient};
    use approx::assert_relative_eq;

    fn ep(a: f64) -> ArrheniusEP {
        ArrheniusEP::new(
            RateCoefficient::new(a, "cm^3/(mol*s)").unwrap(),
            0.0,
            0.0,
            Energy::new(10.0, "kJ/mol").unwrap(),
        )
    }

    fn mol(adjlist: &str) -> Molecule {
        Molecule::from_adjacency_list(adjlist)
            .unwrap_or_else(|e| panic!("bad adjacency list {adjlist:?}: {e}"))
    }

    fn tree_and_reaction() -> (TemplateTree, GeneratedReaction) {
        let mut tree = TemplateTree::new();
        let group = |s: &str| crate::group::Group::from_adjacency_list(s).unwrap();
        let c_h = tree.add_leaf("C_H", group("1 *1 C u0 {2,S}\n2 *2 H u0 {1,S}")).unwrap();
        let h_rad = tree.add_leaf("H_rad", group("1 *3 H u1")).unwrap();
        let reaction = GeneratedReaction {
            family: "H_Abstraction".into(),
            reactants: vec![mol("1 C u0"), mol("1 H u1")],
            products: vec![mol("1 H u0 {2,S}\n2 H u0 {1,S}"), mol("1 C u1")],
            template: vec![c_h, h_rad],
            degeneracy: 4,
            pairs: vec![(0, 1), (1, 0)],
            is_forward: true,
            reverse: None,
        };
        (tree, reaction)
    }

    #[test]
    fn rules_match_by_label_set() {
        let (tree, reaction) = tree_and_reaction();
        let depository = Depository {
            label: "H_Abstraction/rules".into(),
            entries: DepositoryEntries::Rules(vec![
                RuleRecord {
                    index: 3,
                    label: "H_rad;C_H".into(),
                    kinetics: ep(1e13),
                    rank: 2,
                    short_desc: String::new(),
                },
                RuleRecord {
                    index: 4,
                    label: "C_H;O_rad".into(),
                    kinetics: ep(1e12),
                    rank: 2,
                    short_desc: String::new(),
                },
            ]),
        };
        let hits = depository.find_kinetics(&tree, &reaction);
        assert_eq!(hits.len(), 1);
        assert_relative_eq!(hits[0].kinetics.a().value_si(), 4e7, max_relative = 1e-12);
        assert_eq!(
            hits[0].kinetics.comment(),
            "Matched rule 3 H_rad;C_H in H_Abstraction/rules\nMultiplied by reaction path degeneracy 4"
        );
        assert!(hits[0].is_forward);
    }

    #[test]
    fn records_match_either_direction() {
        let (tree, reaction) = tree_and_reaction();
        let record = |index, reactants: Vec<Molecule>, products: Vec<Molecule>| ReactionRecord {
            index,
            label: format!("r{index}"),
            reactants,
            products,
            kinetics: ep(1e12).into(),
            rank: 1,
            short_desc: String::new(),
        };
        let depository = Depository {
            label: "H_Abstraction/training".into(),
            entries: DepositoryEntries::Records(vec![
                record(1, vec![mol("1 H u0 {2,S}\n2 H u0 {1,S}"), mol("1 C u1")], vec![mol("1 C u0"), mol("1 H u1")]),
                record(2, vec![mol("1 H u1"), mol("1 C u0")], vec![mol("1 C u1"), mol("1 H u0 {2,S}\n2 H u0 {1,S}")]),
                record(3, vec![mol("1 O u0"), mol("1 H u1")], vec![mol("1 O u1"), mol("1 H u0 {2,S}\n2 H u0 {1,S}")]),
            ]),
        };
        assert_eq!(depository.len(), 3);
        let hits = depository.find_kinetics(&tree, &reaction);
        assert_eq!(hits.len(), 2);
        assert!(!hits[0].is_forward);
        assert!(hits[1].is_forward);
        assert_eq!(hits[1].kinetics.comment(), "Matched reaction 2 r2 in H_Abstraction/training");
        // records are not scaled by degeneracy
        assert_relative_eq!(hits[1].kinetics.a().value_si(), 1e6, max_relative = 1e-12);
    }

    #[test]
    fn estimates_sort_after_depository_hits() {
        let hit = KineticsMatch {
            kinetics: ep(1e12).into(),
            source: Provenance::Depository {
                depository: "d".into(),
                index: 9,
                label: "x".into(),
                rank: 5,
            },
            is_forward: true,
        };
        let estimate = KineticsMatch {
            source: Provenance::RateRules,
            ..hit.clone()
        };
        assert!(hit.sort_key() < estimate.sort_key());
    }
}
