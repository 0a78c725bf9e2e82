//! Adjacency-list text format for molecules and group patterns.
//!
//! Each line describes one atom:
//!
//! ```text
//! 1 *1 C u1 {2,S} {3,S}
//! ```
//!
//! The fields are the running index, an optional `*` label, the element
//! (or, for groups, an atom type or `[list]` of types), an optional radical
//! count `uN`, an optional charge `cN`, and one `{neighbour,order}` entry per
//! bond. Groups may give lists for every field, e.g. `u[0,1]` or
//! `{2,[S,D]}`. A `multiplicity` line and a leading name line are ignored.

mod builder;
pub mod error;
mod tokenizer;
mod writer;

pub use error::AdjListError;
pub use writer::{group_to_adjacency_list, molecule_to_adjacency_list};

use crate::group::Group;
use crate::molecule::Molecule;

/// Parse a molecule exactly as written.
pub fn parse_molecule(text: &str) -> Result<Molecule, AdjListError> {
    let atoms = tokenizer::tokenize(text)?;
    builder::build_molecule(&atoms, false)
}

/// Parse a molecule, adding hydrogens to fill each atom's default valence.
pub fn parse_molecule_saturated(text: &str) -> Result<Molecule, AdjListError> {
    let atoms = tokenizer::tokenize(text)?;
    builder::build_molecule(&atoms, true)
}

pub fn parse_group(text: &str) -> Result<Group, AdjListError> {
    let atoms = tokenizer::tokenize(text)?;
    builder::build_group(&atoms)
}
