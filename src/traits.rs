use crate::atomtype::Bonding;
use crate::bond::BondOrder;
use crate::element::Element;

pub trait HasLabel {
    fn label(&self) -> &str;
    fn set_label(&mut self, label: String);
}

pub trait HasElement {
    fn element(&self) -> Element;
}

pub trait HasBondOrder {
    fn bond_order(&self) -> BondOrder;
}

/// Atom-level edits a recipe can perform.
///
/// Implemented by both molecule atoms and group-pattern atoms so the same
/// recipe executor builds products from molecules and product templates
/// from groups.
pub trait RecipeAtom: HasLabel {
    /// Shift the free-electron count by `delta`. Returns `false` when the
    /// count would become negative.
    fn change_radicals(&mut self, delta: i8) -> bool;

    /// Bookkeeping after the order of one of this atom's bonds changes.
    fn apply_bond_change(&mut self, _delta: i8) {}

    /// The element, when the atom has exactly one.
    fn element_hint(&self) -> Option<Element> {
        None
    }

    /// Refresh cached typing from the bonds around the atom.
    fn perceive_type(&mut self, _bonding: &Bonding) {}
}

pub trait RecipeBond {
    fn single() -> Self;

    /// Shift the bond order by `delta`. Returns `false` when the order
    /// would leave the single..triple range.
    fn change_order(&mut self, delta: i8) -> bool;

    /// The order, when the bond has exactly one.
    fn order_hint(&self) -> Option<BondOrder>;
}
