//! Reaction-family network generation and rate-rule kinetics estimation.
//!
//! A [`KineticsFamily`] pairs a tree of group patterns with a recipe of
//! graph edits. Matching reactants against the tree and applying the recipe
//! enumerates reactions; the family's rate rules, depositories and
//! group-additivity data then supply kinetics for them.

pub mod adjlist;
pub mod atom;
pub mod atomtype;
pub mod bond;
pub mod constraints;
pub mod element;
pub mod family;
pub mod forbidden;
pub mod formula;
pub mod group;
pub mod kinetics;
pub mod mol;
pub mod molecule;
pub mod react;
pub mod reaction;
pub mod recipe;
pub mod resonance;
pub mod substruct;
pub mod traits;
pub mod units;

pub use adjlist::AdjListError;
pub use atom::{Atom, GroupAtom};
pub use atomtype::AtomType;
pub use bond::{Bond, BondOrder, GroupBond};
pub use constraints::SpeciesConstraints;
pub use element::Element;
pub use family::{
    Estimator, FamilyDefinition, FamilyError, GenerationContext, KineticsFamily, KineticsMatch,
    Provenance, Widening,
};
pub use forbidden::{ForbiddenDefinition, ForbiddenStructures};
pub use group::Group;
pub use kinetics::{Arrhenius, ArrheniusEP, KineticsModel};
pub use mol::Mol;
pub use molecule::Molecule;
pub use react::{ReactionSystem, species_tuples};
pub use reaction::{GeneratedReaction, Species};
pub use recipe::{Action, Recipe, RecipeError};
pub use traits::{HasBondOrder, HasElement, HasLabel, RecipeAtom, RecipeBond};
pub use units::{Energy, RateCoefficient, ReactionOrder, UnitsError};
