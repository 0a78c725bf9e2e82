use crate::adjlist::{self, AdjListError};
use crate::atom::GroupAtom;
use crate::bond::GroupBond;
use crate::mol::Mol;
use crate::substruct;

/// A group pattern: a partial structure with per-atom and per-bond
/// alternatives.
pub type Group = Mol<GroupAtom, GroupBond>;

impl Mol<GroupAtom, GroupBond> {
    pub fn from_adjacency_list(text: &str) -> Result<Self, AdjListError> {
        adjlist::parse_group(text)
    }

    pub fn to_adjacency_list(&self) -> String {
        adjlist::group_to_adjacency_list(self)
    }

    /// Two patterns accept exactly the same structures (labels ignored).
    pub fn is_isomorphic(&self, other: &Group) -> bool {
        substruct::is_isomorphic_with(
            self,
            other,
            GroupAtom::is_equivalent,
            GroupBond::is_equivalent,
        )
    }
}
