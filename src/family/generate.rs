//! Reaction generation: template matching, recipe application, and
//! degeneracy bookkeeping.

use itertools::Itertools;

use crate::constraints::SpeciesConstraints;
use crate::forbidden::ForbiddenStructures;
use crate::mol::Mol;
use crate::molecule::Molecule;
use crate::reaction::{GeneratedReaction, Species, matches_resonance_forms};
use crate::resonance::generate_resonance_isomers;
use crate::traits::{HasLabel, RecipeAtom, RecipeBond};

use super::error::FamilyError;
use super::pairs::reaction_pairs;
use super::tree::{NodeId, TemplateMatch};
use super::KineticsFamily;

/// Settings shared by every family during one generation step.
#[derive(Debug, Clone, Copy, Default)]
pub struct GenerationContext<'a> {
    /// Structures forbidden everywhere, in addition to each family's own.
    pub forbidden: Option<&'a ForbiddenStructures>,
    pub constraints: SpeciesConstraints,
}

impl<'a> GenerationContext<'a> {
    pub fn new(forbidden: Option<&'a ForbiddenStructures>, constraints: SpeciesConstraints) -> Self {
        Self { forbidden, constraints }
    }

    /// The same forbidden structures with no size limits.
    fn unconstrained(&self) -> Self {
        Self {
            forbidden: self.forbidden,
            constraints: SpeciesConstraints::unconstrained(),
        }
    }
}

impl KineticsFamily {
    /// Every reaction this family produces from `reactants`, in both
    /// directions.
    ///
    /// Reactions found with the reverse template are stored in the forward
    /// direction, with `is_forward == false` and their degeneracy taken
    /// from the forward template. For families that are their own reverse,
    /// each reaction carries its reverse instead.
    pub fn generate_reactions(
        &self,
        reactants: &[Species],
        ctx: &GenerationContext,
    ) -> Result<Vec<GeneratedReaction>, FamilyError> {
        let isomers: Vec<&[Molecule]> = reactants.iter().map(Species::molecules).collect();
        let mut reactions = Vec::new();

        for reaction in self.generate_direction(&isomers, None, true, ctx)? {
            let reverse = if self.own_reverse {
                Some(Box::new(self.own_reverse_reaction(&reaction, ctx)?))
            } else {
                None
            };
            let mut reaction = self.annotate(reaction, ctx)?;
            reaction.reverse = reverse;
            reactions.push(reaction);
        }

        if !self.own_reverse {
            for reaction in self.generate_direction(&isomers, None, false, ctx)? {
                reactions.push(self.annotate(reaction, ctx)?);
            }
        }

        log::debug!(
            "{}: {} reactions from {}",
            self.label,
            reactions.len(),
            reactants.iter().join(" + ")
        );
        Ok(reactions)
    }

    /// Path degeneracy of `reaction` counted with the forward template.
    pub fn calculate_degeneracy(
        &self,
        reaction: &GeneratedReaction,
        ctx: &GenerationContext,
    ) -> Result<u32, FamilyError> {
        let reactants = unlabeled(&reaction.reactants);
        let slices: Vec<&[Molecule]> = reactants.iter().map(std::slice::from_ref).collect();
        let found = self.generate_direction(&slices, Some(reaction.products.as_slice()), true, &ctx.unconstrained())?;
        match found.as_slice() {
            [only] => Ok(only.degeneracy),
            _ => Err(FamilyError::TemplateInconsistency(format!(
                "expected one reaction {reaction} in family {}, found {}",
                self.label,
                found.len()
            ))),
        }
    }

    /// Most specific template node matched by each labeled reactant.
    pub fn get_reaction_template(&self, reactants: &[Molecule]) -> Result<Vec<NodeId>, FamilyError> {
        let slots = &self.forward_template.reactants;
        let mut template = Vec::new();
        for &slot in slots.iter().unique() {
            let labels = self.tree.root_labels(slot);
            for mol in reactants {
                if labels.iter().all(|label| mol.contains_labeled_atom(label)) {
                    if let Some(node) = self.tree.descend_tree(mol, slot) {
                        template.push(node);
                    }
                }
            }
        }
        if template.len() != slots.len() {
            return Err(FamilyError::UndeterminableKinetics(format!(
                "could not match template {} in family {} to {}",
                self.template_label(),
                self.label,
                reactants.iter().join(" + ")
            )));
        }
        Ok(template)
    }

    /// Merge `structures`, run the recipe on the merged graph, and split it
    /// back into products.
    ///
    /// Returns `Ok(None)` when the products do not fit the template's
    /// product slots.
    pub(crate) fn apply_recipe<A, B>(
        &self,
        structures: &[Mol<A, B>],
        forward: bool,
    ) -> Result<Option<Vec<Mol<A, B>>>, FamilyError>
    where
        A: RecipeAtom + Clone,
        B: RecipeBond + Clone,
    {
        let slots = if forward {
            self.forward_template.products.len()
        } else {
            self.reverse_template.as_ref().map_or(0, |t| t.products.len())
        };
        let products = self.run_recipe(structures, forward)?;
        Ok((products.len() == slots).then_some(products))
    }

    /// The recipe step of [`KineticsFamily::apply_recipe`] without the
    /// product-slot check. With two products, the one holding `*1` comes
    /// first.
    pub(crate) fn run_recipe<A, B>(&self, structures: &[Mol<A, B>], forward: bool) -> Result<Vec<Mol<A, B>>, FamilyError>
    where
        A: RecipeAtom + Clone,
        B: RecipeBond + Clone,
    {
        let recipe = if forward {
            &self.forward_recipe
        } else {
            self.reverse_recipe.as_ref().ok_or_else(|| {
                FamilyError::TemplateInconsistency(format!("family {} has no reverse template", self.label))
            })?
        };
        let Some((first, rest)) = structures.split_first() else {
            return Ok(Vec::new());
        };
        let mut merged = rest.iter().fold(first.clone(), |acc, s| acc.merge(s));

        self.strategy.number_identical_centers(&mut merged)?;
        recipe.apply(&mut merged, true)?;
        self.strategy.restore_identical_centers(&mut merged);
        if self.own_reverse {
            self.strategy.relabel_products(&mut merged)?;
        }

        let mut products = merged.split();
        if products.len() == 2 && !products[0].contains_labeled_atom("*1") && products[1].contains_labeled_atom("*1") {
            products.swap(0, 1);
        }
        Ok(products)
    }

    /// Reactions of one template direction, deduplicated and with raw
    /// degeneracies. Atom labels are left in place.
    pub(crate) fn generate_direction(
        &self,
        reactants: &[&[Molecule]],
        expected: Option<&[Molecule]>,
        forward: bool,
        ctx: &GenerationContext,
    ) -> Result<Vec<GeneratedReaction>, FamilyError> {
        let template = if forward {
            &self.forward_template
        } else {
            match &self.reverse_template {
                Some(template) => template,
                None => return Ok(Vec::new()),
            }
        };
        let slots = &template.reactants;
        if slots.len() != reactants.len() {
            return Ok(Vec::new());
        }

        let mut candidates = Vec::new();
        match (reactants, slots.as_slice()) {
            ([a], [slot]) => {
                for mol in a.iter() {
                    for m in self.tree.match_node(mol, *slot) {
                        candidates.extend(self.candidate(&[(mol, &m)], forward, ctx)?);
                    }
                }
            }
            ([a, b], [slot1, slot2]) => {
                for (s1, s2) in [(*slot1, *slot2), (*slot2, *slot1)] {
                    for (mol_a, mol_b) in a.iter().cartesian_product(b.iter()) {
                        let matches_a = self.tree.match_node(mol_a, s1);
                        if matches_a.is_empty() {
                            continue;
                        }
                        let matches_b = self.tree.match_node(mol_b, s2);
                        for (ma, mb) in matches_a.iter().cartesian_product(&matches_b) {
                            candidates.extend(self.candidate(&[(mol_a, ma), (mol_b, mb)], forward, ctx)?);
                        }
                    }
                }
            }
            _ => {
                log::debug!(
                    "{}: templates with {} reactants are not supported",
                    self.label,
                    slots.len()
                );
                return Ok(Vec::new());
            }
        }

        let mut reactions = deduplicate(candidates, expected, forward);

        let same_reactants =
            reactants.len() == 2 && reactants[1].iter().any(|m| m.is_isomorphic(&reactants[0][0]));
        if same_reactants || self.strategy.halve_degeneracy {
            for reaction in &mut reactions {
                if reaction.degeneracy % 2 != 0 {
                    return Err(FamilyError::TemplateInconsistency(format!(
                        "odd degeneracy {} for {reaction} in family {}",
                        reaction.degeneracy, self.label
                    )));
                }
                reaction.degeneracy /= 2;
            }
        }
        Ok(reactions)
    }

    /// One template mapping turned into a reaction, if it survives every
    /// filter.
    fn candidate(
        &self,
        assignment: &[(&Molecule, &TemplateMatch)],
        forward: bool,
        ctx: &GenerationContext,
    ) -> Result<Option<GeneratedReaction>, FamilyError> {
        let mut structures = Vec::with_capacity(assignment.len());
        for &(mol, m) in assignment {
            let mut structure = mol.clone();
            structure.clear_labels();
            let pattern = self.tree.node(m.pattern).group();
            for &(g, a) in &m.mapping {
                if let Some(label) = pattern.map(|p| p.atom(g).label()).filter(|l| !l.is_empty()) {
                    structure.atom_mut(a).set_label(label.to_string());
                }
            }
            structures.push(structure);
        }
        if structures.iter().any(|s| self.is_forbidden(s, ctx)) {
            return Ok(None);
        }

        let products = match self.apply_recipe(&structures, forward) {
            Ok(Some(products)) => products,
            Ok(None) => return Ok(None),
            Err(err) => {
                log::error!(
                    "{}: {} recipe failed on reactants:\n{}\n{err}",
                    self.label,
                    if forward { "forward" } else { "reverse" },
                    structures.iter().map(Molecule::to_adjacency_list).join("\n")
                );
                return Err(err);
            }
        };

        if !products.iter().all(|p| ctx.constraints.allows(p)) {
            return Ok(None);
        }
        if products.iter().any(|p| self.is_forbidden(p, ctx)) {
            return Ok(None);
        }
        if is_identity(&structures, &products) {
            return Ok(None);
        }

        let (reactants, products) = if forward {
            (structures, products)
        } else {
            (products, structures)
        };
        Ok(Some(GeneratedReaction {
            family: self.label.clone(),
            reactants,
            products,
            template: Vec::new(),
            degeneracy: 1,
            pairs: Vec::new(),
            is_forward: forward,
            reverse: None,
        }))
    }

    fn is_forbidden(&self, mol: &Molecule, ctx: &GenerationContext) -> bool {
        self.forbidden.is_forbidden(mol) || ctx.forbidden.is_some_and(|f| f.is_forbidden(mol))
    }

    /// Attach pairs and template, fix the degeneracy of reverse-template
    /// reactions, and drop the labels.
    fn annotate(
        &self,
        mut reaction: GeneratedReaction,
        ctx: &GenerationContext,
    ) -> Result<GeneratedReaction, FamilyError> {
        reaction.pairs = reaction_pairs(&self.label, &self.strategy, &reaction.reactants, &reaction.products)?;
        reaction.template = self.get_reaction_template(&reaction.reactants)?;
        if !reaction.is_forward {
            reaction.degeneracy = self.calculate_degeneracy(&reaction, ctx)?;
        }
        reaction.clear_labels();
        Ok(reaction)
    }

    /// The reverse of a reaction of a family that is its own reverse.
    fn own_reverse_reaction(
        &self,
        reaction: &GeneratedReaction,
        ctx: &GenerationContext,
    ) -> Result<GeneratedReaction, FamilyError> {
        let products = unlabeled(&reaction.products);
        let slices: Vec<&[Molecule]> = products.iter().map(std::slice::from_ref).collect();
        let mut found =
            self.generate_direction(&slices, Some(reaction.reactants.as_slice()), true, &ctx.unconstrained())?;
        if found.len() != 1 {
            return Err(FamilyError::TemplateInconsistency(format!(
                "expected one reverse for {reaction} in family {}, found {}",
                self.label,
                found.len()
            )));
        }
        let reverse = found.remove(0);
        self.annotate(reverse, ctx)
    }
}

fn unlabeled(mols: &[Molecule]) -> Vec<Molecule> {
    mols.iter()
        .map(|m| {
            let mut m = m.clone();
            m.clear_labels();
            m
        })
        .collect()
}

/// Products that are the reactants again, up to order.
fn is_identity(reactants: &[Molecule], products: &[Molecule]) -> bool {
    match (reactants, products) {
        ([r], [p]) => r.is_isomorphic(p),
        ([r1, r2], [p1, p2]) => {
            (r1.is_isomorphic(p1) && r2.is_isomorphic(p2)) || (r1.is_isomorphic(p2) && r2.is_isomorphic(p1))
        }
        _ => false,
    }
}

/// The side of the reaction the recipe produced.
fn generated_side(reaction: &GeneratedReaction, forward: bool) -> &[Molecule] {
    if forward { &reaction.products } else { &reaction.reactants }
}

/// Collapse reactions with the same generated side, counting each
/// duplicate towards the kept reaction's degeneracy, and keep only those
/// matching `expected` when given.
fn deduplicate(
    candidates: Vec<GeneratedReaction>,
    expected: Option<&[Molecule]>,
    forward: bool,
) -> Vec<GeneratedReaction> {
    let mut unique = Vec::new();
    let mut remaining = candidates;
    while !remaining.is_empty() {
        let mut reaction = remaining.remove(0);
        let isomers: Vec<Vec<Molecule>> = generated_side(&reaction, forward).iter().map(generate_resonance_isomers).collect();
        let (duplicates, rest): (Vec<_>, Vec<_>) = remaining
            .into_iter()
            .partition(|other| matches_resonance_forms(generated_side(other, forward), &isomers));
        remaining = rest;
        reaction.degeneracy += duplicates.len() as u32;
        if expected.is_none_or(|expected| matches_resonance_forms(expected, &isomers)) {
            unique.push(reaction);
        }
    }
    unique
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::group::Group;
    use indoc::indoc;

    const H_ABSTRACTION: &str = indoc! {r#"
        {
            "label": "H_Abstraction",
            "own_reverse": true,
            "reactants": ["X_H", "Y_rad"],
            "recipe": [
                ["BREAK_BOND", "*1", "1", "*2"],
                ["FORM_BOND", "*2", "1", "*3"],
                ["GAIN_RADICAL", "*1", "1"],
                ["LOSE_RADICAL", "*3", "1"]
            ],
            "groups": [
                {"label": "X_H", "adjlist": "1 *1 R u0 {2,S}\n2 *2 H u0 {1,S}"},
                {"label": "H2", "parent": "X_H", "adjlist": "1 *1 H u0 {2,S}\n2 *2 H u0 {1,S}"},
                {"label": "C_H", "parent": "X_H", "adjlist": "1 *1 C u0 {2,S}\n2 *2 H u0 {1,S}"},
                {"label": "Y_rad", "union": ["H_rad", "C_rad"]},
                {"label": "H_rad", "parent": "Y_rad", "adjlist": "1 *3 H u1"},
                {"label": "C_rad", "parent": "Y_rad", "adjlist": "1 *3 C u1"}
            ]
        }
    "#};

    const UNIMOLECULAR: &str = indoc! {r#"
        {
            "label": "Bond_Fission",
            "reactants": ["C_C"],
            "products": ["Rad1", "Rad2"],
            "recipe": [
                ["BREAK_BOND", "*1", "1", "*2"],
                ["GAIN_RADICAL", "*1", "1"],
                ["GAIN_RADICAL", "*2", "1"]
            ],
            "groups": [
                {"label": "C_C", "adjlist": "1 *1 C u0 {2,S}\n2 *2 C u0 {1,S}"}
            ]
        }
    "#};

    fn family(json: &str) -> KineticsFamily {
        KineticsFamily::from_json(json).unwrap()
    }

    fn species(label: &str, adjlist: &str) -> Species {
        Species::from_adjacency_list(label, adjlist).unwrap()
    }

    fn mol(adjlist: &str) -> Molecule {
        Molecule::from_adjacency_list(adjlist)
            .unwrap_or_else(|e| panic!("bad adjacency list {adjlist:?}: {e}"))
    }

    #[test]
    fn h_abstraction_from_methane() {
        let family = family(H_ABSTRACTION);
        let reactions = family
            .generate_reactions(&[species("CH4", "1 C u0"), species("H", "1 H u1")], &GenerationContext::default())
            .unwrap();
        assert_eq!(reactions.len(), 1);
        let r = &reactions[0];
        assert_eq!(r.to_string(), "CH4 + H <=> H2 + CH3");
        assert_eq!(r.degeneracy, 4);
        assert_eq!(r.pairs, vec![(0, 1), (1, 0)]);
        assert_eq!(family.tree.joined_labels(&r.template), "C_H;H_rad");
        assert!(r.is_forward);
        assert!(r.reactants.iter().chain(&r.products).all(|m| m.labeled_atoms().is_empty()));

        let reverse = r.reverse.as_deref().unwrap();
        assert_eq!(reverse.to_string(), "H2 + CH3 <=> CH4 + H");
        assert_eq!(reverse.degeneracy, 2);
        assert_eq!(family.tree.joined_labels(&reverse.template), "H2;C_rad");
    }

    #[test]
    fn swapped_reactant_order_gives_one_reaction() {
        let family = family(H_ABSTRACTION);
        let reactions = family
            .generate_reactions(&[species("H", "1 H u1"), species("CH4", "1 C u0")], &GenerationContext::default())
            .unwrap();
        assert_eq!(reactions.len(), 1);
        assert_eq!(reactions[0].degeneracy, 4);
        assert_eq!(reactions[0].to_string(), "H + CH4 <=> H2 + CH3");
    }

    #[test]
    fn identical_reactants_halve_degeneracy() {
        let family = family(H_ABSTRACTION);
        let h = species("H", "1 H u1");
        let reactions = family
            .generate_reactions(&[h.clone(), h], &GenerationContext::default())
            .unwrap();
        // H + H has no X_H to abstract from
        assert!(reactions.is_empty());

        let methyl = species("CH3", "1 C u1");
        let methane = species("CH4", "1 C u0");
        let reactions = family
            .generate_reactions(&[methyl, methane], &GenerationContext::default())
            .unwrap();
        // CH3 + CH4 <=> CH4 + CH3 is an identity reaction
        assert!(reactions.is_empty());
    }

    #[test]
    fn unimolecular_two_mappings_count_twice() {
        let family = family(UNIMOLECULAR);
        let ethane = species("C2H6", "1 C u0 {2,S}\n2 C u0 {1,S}");
        let reactions = family
            .generate_reactions(&[ethane], &GenerationContext::default())
            .unwrap();
        assert_eq!(reactions.len(), 1);
        assert_eq!(reactions[0].degeneracy, 2);
        assert_eq!(reactions[0].to_string(), "C2H6 <=> CH3 + CH3");
        assert_eq!(reactions[0].pairs, vec![(0, 0), (0, 1)]);
    }

    #[test]
    fn reverse_template_recovers_forward_degeneracy() {
        let family = family(UNIMOLECULAR);
        let methyl = species("CH3", "1 C u1");
        let reactions = family
            .generate_reactions(&[methyl.clone(), methyl], &GenerationContext::default())
            .unwrap();
        assert_eq!(reactions.len(), 1);
        let r = &reactions[0];
        assert!(!r.is_forward);
        assert_eq!(r.to_string(), "C2H6 <=> CH3 + CH3");
        assert_eq!(r.degeneracy, 2);
    }

    #[test]
    fn constraints_and_forbidden_filter_products() {
        let family = family(UNIMOLECULAR);
        let propane = species("C3H8", "1 C u0 {2,S}\n2 C u0 {1,S} {3,S}\n3 C u0 {2,S}");
        let all = family
            .generate_reactions(std::slice::from_ref(&propane), &GenerationContext::default())
            .unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].degeneracy, 4);

        let constraints = SpeciesConstraints {
            max_carbon_atoms: Some(1),
            ..SpeciesConstraints::default()
        };
        let limited = family
            .generate_reactions(std::slice::from_ref(&propane), &GenerationContext::new(None, constraints))
            .unwrap();
        assert!(limited.is_empty());

        let mut forbidden = ForbiddenStructures::new();
        forbidden.add_molecule("methyl", mol("1 C u1"));
        let none = family
            .generate_reactions(
                &[propane],
                &GenerationContext::new(Some(&forbidden), SpeciesConstraints::default()),
            )
            .unwrap();
        assert!(none.is_empty());
    }

    #[test]
    fn odd_degeneracy_is_inconsistent() {
        let mut family = family(H_ABSTRACTION);
        family.set_strategy(crate::family::FamilyStrategy {
            halve_degeneracy: true,
            ..family.strategy().clone()
        });
        let h = species("H", "1 H u1");
        // four C-H paths halve to two
        let reactions = family
            .generate_reactions(&[species("CH4", "1 C u0"), h.clone()], &GenerationContext::default())
            .unwrap();
        assert_eq!(reactions[0].degeneracy, 2);

        // methanol has a single O-H path
        let methanol = species("CH3OH", "1 C u0 {2,S}\n2 O u0 {1,S}");
        let err = family
            .generate_reactions(&[methanol, h], &GenerationContext::default())
            .unwrap_err();
        assert!(matches!(err, FamilyError::TemplateInconsistency(_)));
    }

    #[test]
    fn apply_recipe_builds_group_products() {
        let family = family(UNIMOLECULAR);
        let c_c = Group::from_adjacency_list("1 *1 C u0 {2,S}\n2 *2 C u0 {1,S}").unwrap();
        let products = family.apply_recipe(&[c_c.clone()], true).unwrap().unwrap();
        assert_eq!(products.len(), 2);
        assert_eq!(family.run_recipe(&[c_c], true).unwrap(), products);
        assert!(products[0].contains_labeled_atom("*1"));
        assert_eq!(products[0].atom(petgraph::graph::NodeIndex::new(0)).radical_electrons, vec![1]);
    }

    #[test]
    fn missing_label_is_an_invalid_action() {
        let mut family = family(UNIMOLECULAR);
        family.forward_recipe = crate::recipe::Recipe::new(vec![
            crate::recipe::Action::from_tokens(&["GAIN_RADICAL", "*9", "1"][..]).unwrap(),
        ]);
        let ethane = species("C2H6", "1 C u0 {2,S}\n2 C u0 {1,S}");
        let err = family
            .generate_reactions(&[ethane], &GenerationContext::default())
            .unwrap_err();
        assert!(matches!(err, FamilyError::InvalidAction(_)));
    }

    #[test]
    fn identity_detection() {
        let a = mol("1 C u0");
        let b = mol("1 H u1");
        assert!(is_identity(&[a.clone(), b.clone()], &[b.clone(), a.clone()]));
        assert!(!is_identity(&[a.clone()], &[b.clone()]));
        assert!(!is_identity(&[a], &[b.clone(), b]));
    }
}
