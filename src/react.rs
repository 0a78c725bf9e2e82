//! Running a set of families over many reactant combinations.

use rayon::prelude::*;

use crate::constraints::SpeciesConstraints;
use crate::family::{FamilyError, GenerationContext, KineticsFamily};
use crate::forbidden::ForbiddenStructures;
use crate::reaction::{GeneratedReaction, Species};

/// Loaded families plus the restrictions shared by all of them.
#[derive(Debug, Default)]
pub struct ReactionSystem {
    pub families: Vec<KineticsFamily>,
    /// Structures forbidden in every family.
    pub forbidden: ForbiddenStructures,
    pub constraints: SpeciesConstraints,
}

impl ReactionSystem {
    pub fn new(families: Vec<KineticsFamily>) -> Self {
        Self {
            families,
            ..Self::default()
        }
    }

    pub fn with_forbidden(mut self, forbidden: ForbiddenStructures) -> Self {
        self.forbidden = forbidden;
        self
    }

    pub fn with_constraints(mut self, constraints: SpeciesConstraints) -> Self {
        self.constraints = constraints;
        self
    }

    pub fn family(&self, label: &str) -> Option<&KineticsFamily> {
        self.families.iter().find(|f| f.label == label)
    }

    fn context(&self) -> GenerationContext<'_> {
        GenerationContext::new(Some(&self.forbidden), self.constraints)
    }

    /// Reactions of one reactant tuple across every family, or only the
    /// named ones.
    pub fn react_species(
        &self,
        reactants: &[Species],
        only_families: Option<&[&str]>,
    ) -> Result<Vec<GeneratedReaction>, FamilyError> {
        let ctx = self.context();
        let mut reactions = Vec::new();
        for family in &self.families {
            if only_families.is_some_and(|only| !only.contains(&family.label.as_str())) {
                continue;
            }
            reactions.extend(family.generate_reactions(reactants, &ctx)?);
        }
        Ok(reactions)
    }

    /// Reactions of every tuple, in tuple order.
    pub fn react_all(
        &self,
        tuples: &[Vec<Species>],
        parallel: bool,
    ) -> Result<Vec<GeneratedReaction>, FamilyError> {
        let per_tuple: Vec<Vec<GeneratedReaction>> = if parallel {
            tuples
                .par_iter()
                .map(|tuple| self.react_species(tuple, None))
                .collect::<Result<_, _>>()?
        } else {
            tuples
                .iter()
                .map(|tuple| self.react_species(tuple, None))
                .collect::<Result<_, _>>()?
        };
        let reactions: Vec<_> = per_tuple.into_iter().flatten().collect();
        log::debug!("{} reactions from {} reactant tuples", reactions.len(), tuples.len());
        Ok(reactions)
    }
}

/// Every single species, plus each unordered pair and triple when asked,
/// with repeats allowed (`i <= j <= k`).
pub fn species_tuples(species: &[Species], bimolecular: bool, trimolecular: bool) -> Vec<Vec<Species>> {
    let n = species.len();
    let mut tuples: Vec<Vec<Species>> = species.iter().map(|s| vec![s.clone()]).collect();
    if bimolecular {
        for i in 0..n {
            for j in i..n {
                tuples.push(vec![species[i].clone(), species[j].clone()]);
            }
        }
    }
    if trimolecular {
        for i in 0..n {
            for j in i..n {
                for k in j..n {
                    tuples.push(vec![species[i].clone(), species[j].clone(), species[k].clone()]);
                }
            }
        }
    }
    tuples
}
