//! Reaction families: a template of reactant patterns, a recipe that turns
//! matched reactants into products, and the rate rules and reaction
//! libraries that supply kinetics for what the template generates.

pub mod config;
pub mod depository;
pub mod error;
mod generate;
mod pairs;
pub mod rules;
pub mod strategy;
pub mod tree;

pub use config::FamilyDefinition;
pub use depository::{Depository, KineticsMatch, Provenance};
pub use error::FamilyError;
pub use generate::GenerationContext;
pub use pairs::reaction_pairs;
pub use rules::{RateRule, RuleTree, TrainingSummary, Widening};
pub use strategy::{FamilyStrategy, StrategyTable};
pub use tree::{NodeId, NodeKind, TemplateMatch, TemplateNode, TemplateTree};

use crate::forbidden::ForbiddenStructures;
use crate::recipe::Recipe;

/// Reactant and product slots of one direction of a family.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    pub reactants: Vec<NodeId>,
    pub products: Vec<NodeId>,
}

/// How kinetics are estimated when no depository entry matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Estimator {
    RateRules,
    GroupAdditivity,
}

#[derive(Debug)]
pub struct KineticsFamily {
    pub label: String,
    /// Name of the reverse family, if it has one.
    pub reverse_label: Option<String>,
    pub own_reverse: bool,
    pub forward_template: Template,
    pub forward_recipe: Recipe,
    pub reverse_template: Option<Template>,
    pub reverse_recipe: Option<Recipe>,
    pub tree: TemplateTree,
    pub forbidden: ForbiddenStructures,
    pub rules: RuleTree,
    /// Reaction and rule libraries, training set first.
    pub depositories: Vec<Depository>,
    pub widening: Widening,
    strategy: FamilyStrategy,
}

impl KineticsFamily {
    pub fn strategy(&self) -> &FamilyStrategy {
        &self.strategy
    }

    /// Replace the special-case handling registered for this family.
    pub fn set_strategy(&mut self, strategy: FamilyStrategy) {
        self.strategy = strategy;
    }

    /// Labels of the forward reactant slots joined with `;`.
    pub fn template_label(&self) -> String {
        self.tree.joined_labels(&self.forward_template.reactants)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn family_is_shareable_across_threads() {
        assert_send_sync::<KineticsFamily>();
    }
}
