//! Template-node arena: group patterns, unions of patterns, and the
//! specialization hierarchy between them.

use std::collections::HashMap;
use std::sync::OnceLock;

use itertools::Itertools;
use petgraph::graph::NodeIndex;

use crate::group::Group;
use crate::kinetics::ArrheniusEP;
use crate::molecule::Molecule;
use crate::substruct::{self, AtomMapping};
use crate::traits::HasLabel;

use super::error::FamilyError;

/// Index of a node in a [`TemplateTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone)]
pub enum NodeKind {
    Leaf(Group),
    /// Matches whatever any member matches.
    Union(Vec<NodeId>),
}

#[derive(Debug)]
pub struct TemplateNode {
    pub label: String,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    pub kind: NodeKind,
    /// Group-additivity contribution, if any.
    pub data: Option<ArrheniusEP>,
    expanded: OnceLock<Vec<NodeId>>,
}

impl TemplateNode {
    fn new(label: &str, kind: NodeKind) -> Self {
        Self {
            label: label.to_string(),
            parent: None,
            children: Vec::new(),
            kind,
            data: None,
            expanded: OnceLock::new(),
        }
    }

    pub fn group(&self) -> Option<&Group> {
        match &self.kind {
            NodeKind::Leaf(group) => Some(group),
            NodeKind::Union(_) => None,
        }
    }
}

/// One embedding of a leaf pattern in a molecule, as `(pattern atom,
/// molecule atom)` pairs.
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateMatch {
    pub pattern: NodeId,
    pub mapping: AtomMapping,
}

/// Arena of template nodes, forming a forest of specialization trees.
#[derive(Debug, Default)]
pub struct TemplateTree {
    nodes: Vec<TemplateNode>,
    by_label: HashMap<String, NodeId>,
}

impl TemplateTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn insert(&mut self, label: &str, kind: NodeKind) -> Result<NodeId, FamilyError> {
        if self.by_label.contains_key(label) {
            return Err(FamilyError::Config(format!("duplicate group label {label:?}")));
        }
        let id = NodeId(self.nodes.len());
        self.nodes.push(TemplateNode::new(label, kind));
        self.by_label.insert(label.to_string(), id);
        Ok(id)
    }

    pub fn add_leaf(&mut self, label: &str, group: Group) -> Result<NodeId, FamilyError> {
        self.insert(label, NodeKind::Leaf(group))
    }

    pub fn add_union(&mut self, label: &str, members: Vec<NodeId>) -> Result<NodeId, FamilyError> {
        let id = self.insert(label, NodeKind::Union(members))?;
        self.clear_expansions();
        Ok(id)
    }

    /// Replace the members of a union node.
    pub fn set_union_members(&mut self, id: NodeId, members: Vec<NodeId>) -> Result<(), FamilyError> {
        match &mut self.nodes[id.0].kind {
            NodeKind::Union(current) => *current = members,
            NodeKind::Leaf(_) => {
                return Err(FamilyError::Config(format!(
                    "{:?} is not a union",
                    self.nodes[id.0].label
                )));
            }
        }
        self.clear_expansions();
        Ok(())
    }

    /// Attach `child` below `parent`, detaching it from any previous parent.
    pub fn set_parent(&mut self, child: NodeId, parent: NodeId) {
        if let Some(old) = self.nodes[child.0].parent.take() {
            self.nodes[old.0].children.retain(|&c| c != child);
        }
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
    }

    pub fn set_data(&mut self, id: NodeId, data: Option<ArrheniusEP>) {
        self.nodes[id.0].data = data;
    }

    fn clear_expansions(&mut self) {
        for node in &mut self.nodes {
            node.expanded.take();
        }
    }

    pub fn get(&self, label: &str) -> Option<NodeId> {
        self.by_label.get(label).copied()
    }

    pub fn node(&self, id: NodeId) -> &TemplateNode {
        &self.nodes[id.0]
    }

    pub fn label(&self, id: NodeId) -> &str {
        &self.nodes[id.0].label
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    pub fn ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.nodes.len()).map(NodeId)
    }

    pub fn roots(&self) -> Vec<NodeId> {
        self.ids().filter(|&id| self.parent(id).is_none()).collect()
    }

    /// Parent, grandparent, ... up to the root.
    pub fn ancestors(&self, id: NodeId) -> Vec<NodeId> {
        let mut chain = Vec::new();
        let mut current = self.parent(id);
        while let Some(p) = current {
            chain.push(p);
            current = self.parent(p);
        }
        chain
    }

    /// Labels of `ids` joined with `;`.
    pub fn joined_labels(&self, ids: &[NodeId]) -> String {
        ids.iter().map(|&id| self.label(id)).join(";")
    }

    /// The leaf nodes a node stands for: itself for a leaf, the flattened
    /// and deduplicated members for a union.
    pub fn expand(&self, id: NodeId) -> &[NodeId] {
        self.nodes[id.0].expanded.get_or_init(|| {
            let mut leaves = Vec::new();
            self.collect_leaves(id, &mut Vec::new(), &mut leaves);
            leaves
        })
    }

    fn collect_leaves(&self, id: NodeId, path: &mut Vec<NodeId>, leaves: &mut Vec<NodeId>) {
        if path.contains(&id) {
            return;
        }
        match &self.nodes[id.0].kind {
            NodeKind::Leaf(_) => {
                if !leaves.contains(&id) {
                    leaves.push(id);
                }
            }
            NodeKind::Union(members) => {
                path.push(id);
                for &member in members {
                    self.collect_leaves(member, path, leaves);
                }
                path.pop();
            }
        }
    }

    /// Every embedding of the node's leaf patterns in `mol`.
    pub fn match_node(&self, mol: &Molecule, id: NodeId) -> Vec<TemplateMatch> {
        self.expand(id)
            .iter()
            .filter_map(|&leaf| self.node(leaf).group().map(|group| (leaf, group)))
            .flat_map(|(leaf, group)| {
                mol.find_subgraph_isomorphisms(group)
                    .into_iter()
                    .map(move |mapping| TemplateMatch { pattern: leaf, mapping })
            })
            .collect()
    }

    /// Whether the node matches a molecule whose reaction centers are
    /// already labeled. Labeled pattern atoms only map onto molecule atoms
    /// with the same label.
    pub fn match_node_to_structure(&self, mol: &Molecule, id: NodeId) -> bool {
        self.expand(id)
            .iter()
            .filter_map(|&leaf| self.node(leaf).group())
            .any(|group| matches_labeled(mol, group))
    }

    /// The most specific node under `root` that matches `mol`, following the
    /// first matching child at each level.
    pub fn descend_tree(&self, mol: &Molecule, root: NodeId) -> Option<NodeId> {
        if !self.match_node_to_structure(mol, root) {
            return None;
        }
        let mut current = root;
        while let Some(&child) = self
            .children(current)
            .iter()
            .find(|&&child| self.match_node_to_structure(mol, child))
        {
            current = child;
        }
        Some(current)
    }

    /// Labels of the node's first leaf pattern.
    pub fn root_labels(&self, id: NodeId) -> Vec<String> {
        self.expand(id)
            .first()
            .and_then(|&leaf| self.node(leaf).group())
            .map(|group| {
                group
                    .labeled_atoms()
                    .into_iter()
                    .map(|(label, _)| label)
                    .unique()
                    .collect()
            })
            .unwrap_or_default()
    }
}

fn matches_labeled(mol: &Molecule, group: &Group) -> bool {
    let labeled = group.labeled_atoms();
    if labeled.iter().any(|(label, _)| !mol.contains_labeled_atom(label)) {
        return false;
    }
    // Labels carried by exactly one atom on each side are pinned up front.
    let seed: Vec<(NodeIndex, NodeIndex)> = labeled
        .iter()
        .filter_map(|(label, g)| {
            let in_group = group.atoms_with_label(label).len();
            match mol.atoms_with_label(label).as_slice() {
                [m] if in_group == 1 => Some((*g, *m)),
                _ => None,
            }
        })
        .collect();
    substruct::has_seeded_substruct_match_with(
        mol,
        group,
        &seed,
        |a, g| g.matches_atom(a) && (g.label().is_empty() || g.label() == a.label()),
        |b, g| g.matches_bond(b),
    )
}
