use itertools::Itertools;

use crate::molecule::Molecule;

use super::error::FamilyError;
use super::strategy::FamilyStrategy;

/// Reactant-to-product pairs `(reactant index, product index)` for a
/// reaction whose atoms still carry their reaction-center labels.
///
/// A lone species on either side pairs with everything on the other side.
/// Two-by-two reactions need the family's pairing rule.
pub fn reaction_pairs(
    family: &str,
    strategy: &FamilyStrategy,
    reactants: &[Molecule],
    products: &[Molecule],
) -> Result<Vec<(usize, usize)>, FamilyError> {
    match (reactants.len(), products.len()) {
        (1, n) => return Ok((0..n).map(|p| (0, p)).collect()),
        (n, 1) => return Ok((0..n).map(|r| (r, 0)).collect()),
        _ => {}
    }
    let unpaired = || FamilyError::Pairing {
        family: family.to_string(),
        reactants: reactants.iter().map(Molecule::formula).join(" + "),
        products: products.iter().map(Molecule::formula).join(" + "),
    };
    if reactants.len() != 2 || products.len() != 2 {
        return Err(unpaired());
    }
    let rule = strategy.pairing.as_ref().ok_or_else(unpaired)?;
    let r = reactants
        .iter()
        .position(|m| m.contains_labeled_atom(&rule.reactant_label))
        .ok_or_else(unpaired)?;
    let p = products
        .iter()
        .position(|m| m.contains_labeled_atom(&rule.product_label))
        .ok_or_else(unpaired)?;
    let mut pairs = vec![(r, p), (1 - r, 1 - p)];
    pairs.sort();
    Ok(pairs)
}
