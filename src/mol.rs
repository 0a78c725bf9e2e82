use std::borrow::Cow;

use petgraph::graph::{EdgeIndex, NodeIndex, UnGraph};
use petgraph::visit::EdgeRef;

use crate::atomtype::Bonding;
use crate::bond::BondOrder;
use crate::element::Element;
use crate::traits::{HasLabel, RecipeAtom, RecipeBond};

/// Extended-connectivity values of one atom: degree, then two rounds of
/// summing the neighbours' previous values.
pub type ConnectivityValue = [u32; 3];

/// Undirected labeled graph shared by molecules and group patterns.
pub struct Mol<A, B> {
    graph: UnGraph<A, B>,
    connectivity: Option<Vec<ConnectivityValue>>,
}

impl<A, B> Mol<A, B> {
    pub fn new() -> Self {
        Self {
            graph: UnGraph::default(),
            connectivity: None,
        }
    }

    pub fn graph(&self) -> &UnGraph<A, B> {
        &self.graph
    }

    pub fn atom(&self, idx: NodeIndex) -> &A {
        &self.graph[idx]
    }

    pub fn atom_mut(&mut self, idx: NodeIndex) -> &mut A {
        &mut self.graph[idx]
    }

    pub fn bond(&self, idx: EdgeIndex) -> &B {
        &self.graph[idx]
    }

    pub fn bond_mut(&mut self, idx: EdgeIndex) -> &mut B {
        &mut self.graph[idx]
    }

    pub fn add_atom(&mut self, atom: A) -> NodeIndex {
        self.connectivity = None;
        self.graph.add_node(atom)
    }

    pub fn add_bond(&mut self, a: NodeIndex, b: NodeIndex, bond: B) -> EdgeIndex {
        self.connectivity = None;
        self.graph.add_edge(a, b, bond)
    }

    /// Remove the bond between `a` and `b`, returning it if it existed.
    pub fn remove_bond(&mut self, a: NodeIndex, b: NodeIndex) -> Option<B> {
        let edge = self.graph.find_edge(a, b)?;
        self.connectivity = None;
        self.graph.remove_edge(edge)
    }

    pub fn atom_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn bond_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn neighbors(&self, idx: NodeIndex) -> impl Iterator<Item = NodeIndex> + '_ {
        self.graph.neighbors(idx)
    }

    pub fn bonds_of(&self, idx: NodeIndex) -> impl Iterator<Item = EdgeIndex> + '_ {
        self.graph.edges(idx).map(|e| e.id())
    }

    pub fn atoms(&self) -> impl Iterator<Item = NodeIndex> + '_ {
        self.graph.node_indices()
    }

    pub fn bonds(&self) -> impl Iterator<Item = EdgeIndex> + '_ {
        self.graph.edge_indices()
    }

    pub fn bond_between(&self, a: NodeIndex, b: NodeIndex) -> Option<EdgeIndex> {
        self.graph.find_edge(a, b)
    }

    pub fn bond_endpoints(&self, idx: EdgeIndex) -> Option<(NodeIndex, NodeIndex)> {
        self.graph.edge_endpoints(idx)
    }

    pub fn degree(&self, idx: NodeIndex) -> usize {
        self.graph.neighbors(idx).count()
    }

    /// Drop the cached connectivity values. Called before bond edits.
    pub fn reset_connectivity_values(&mut self) {
        self.connectivity = None;
    }

    pub fn has_connectivity_values(&self) -> bool {
        self.connectivity.is_some()
    }

    /// Cached connectivity values, or freshly computed ones when the cache
    /// has been invalidated.
    pub fn connectivity_values(&self) -> Cow<'_, [ConnectivityValue]> {
        match &self.connectivity {
            Some(values) => Cow::Borrowed(values),
            None => Cow::Owned(self.compute_connectivity()),
        }
    }

    fn compute_connectivity(&self) -> Vec<ConnectivityValue> {
        let n = self.atom_count();
        let mut values = vec![[0u32; 3]; n];
        for idx in self.atoms() {
            values[idx.index()][0] = self.degree(idx) as u32;
        }
        for round in 1..3 {
            for idx in self.atoms() {
                values[idx.index()][round] = self
                    .neighbors(idx)
                    .map(|nb| values[nb.index()][round - 1])
                    .sum();
            }
        }
        values
    }

    /// Connected components as sorted atom index lists.
    pub fn connected_components(&self) -> Vec<Vec<NodeIndex>> {
        let n = self.atom_count();
        let mut visited = vec![false; n];
        let mut components = Vec::new();
        for node in self.atoms() {
            if visited[node.index()] {
                continue;
            }
            let mut component = Vec::new();
            let mut stack = vec![node];
            while let Some(current) = stack.pop() {
                if visited[current.index()] {
                    continue;
                }
                visited[current.index()] = true;
                component.push(current);
                for neighbor in self.neighbors(current) {
                    if !visited[neighbor.index()] {
                        stack.push(neighbor);
                    }
                }
            }
            component.sort();
            components.push(component);
        }
        components
    }
}

impl<A: Clone, B: Clone> Mol<A, B> {
    /// A new graph holding this graph's atoms followed by `other`'s atoms.
    ///
    /// Atom `i` of `other` becomes atom `self.atom_count() + i`.
    pub fn merge(&self, other: &Mol<A, B>) -> Mol<A, B> {
        let mut merged = self.clone();
        let offset = merged.atom_count();
        for idx in other.atoms() {
            merged.graph.add_node(other.atom(idx).clone());
        }
        for edge in other.bonds() {
            if let Some((a, b)) = other.bond_endpoints(edge) {
                merged.graph.add_edge(
                    NodeIndex::new(a.index() + offset),
                    NodeIndex::new(b.index() + offset),
                    other.bond(edge).clone(),
                );
            }
        }
        merged.connectivity = None;
        merged
    }

    /// Split into one graph per connected component, keeping every atom
    /// and bond attribute (labels included).
    pub fn split(&self) -> Vec<Mol<A, B>> {
        let components = self.connected_components();
        let mut fragments = Vec::with_capacity(components.len());
        for component in &components {
            let mut frag = Mol::new();
            let mut index_map = vec![NodeIndex::new(0); self.atom_count()];
            for &old_idx in component {
                index_map[old_idx.index()] = frag.add_atom(self.atom(old_idx).clone());
            }
            for &old_idx in component {
                for edge in self.bonds_of(old_idx) {
                    if let Some((a, b)) = self.bond_endpoints(edge) {
                        let (a, b) = if a == old_idx { (a, b) } else { (b, a) };
                        if a.index() < b.index() {
                            frag.add_bond(
                                index_map[a.index()],
                                index_map[b.index()],
                                self.bond(edge).clone(),
                            );
                        }
                    }
                }
            }
            fragments.push(frag);
        }
        fragments
    }
}

impl<A: HasLabel, B> Mol<A, B> {
    /// The first atom carrying `label`.
    pub fn labeled_atom(&self, label: &str) -> Option<NodeIndex> {
        self.atoms().find(|&idx| self.atom(idx).label() == label)
    }

    /// Every atom carrying `label`, in index order.
    pub fn atoms_with_label(&self, label: &str) -> Vec<NodeIndex> {
        self.atoms()
            .filter(|&idx| self.atom(idx).label() == label)
            .collect()
    }

    /// Labeled atoms as `(label, atom)` pairs in index order.
    pub fn labeled_atoms(&self) -> Vec<(String, NodeIndex)> {
        self.atoms()
            .filter(|&idx| !self.atom(idx).label().is_empty())
            .map(|idx| (self.atom(idx).label().to_string(), idx))
            .collect()
    }

    pub fn contains_labeled_atom(&self, label: &str) -> bool {
        self.labeled_atom(label).is_some()
    }

    pub fn clear_labels(&mut self) {
        for idx in self.graph.node_indices() {
            self.graph[idx].set_label(String::new());
        }
    }
}

impl<A: RecipeAtom, B: RecipeBond> Mol<A, B> {
    /// Rebuild the connectivity cache and refresh atom typing from the
    /// current bonds. Called once after a full list of bond edits.
    pub fn update_connectivity_values(&mut self) {
        let values = self.compute_connectivity();
        let bonding: Vec<Bonding> = self.atoms().map(|idx| self.bonding(idx)).collect();
        for (i, b) in bonding.iter().enumerate() {
            self.graph[NodeIndex::new(i)].perceive_type(b);
        }
        self.connectivity = Some(values);
    }

    fn bonding(&self, idx: NodeIndex) -> Bonding {
        let mut bonding = Bonding::default();
        for edge in self.graph.edges(idx) {
            let other = if edge.source() == idx {
                edge.target()
            } else {
                edge.source()
            };
            match edge.weight().order_hint() {
                Some(BondOrder::Single) => bonding.single += 1,
                Some(BondOrder::Double) => {
                    bonding.double += 1;
                    if self.graph[other].element_hint() == Some(Element::O) {
                        bonding.double_to_oxygen += 1;
                    }
                }
                Some(BondOrder::Triple) => bonding.triple += 1,
                None => {}
            }
        }
        bonding
    }
}

impl<A: Clone, B: Clone> Clone for Mol<A, B> {
    fn clone(&self) -> Self {
        Self {
            graph: self.graph.clone(),
            connectivity: self.connectivity.clone(),
        }
    }
}

impl<A, B> Default for Mol<A, B> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: PartialEq, B: PartialEq> PartialEq for Mol<A, B> {
    fn eq(&self, other: &Self) -> bool {
        if self.atom_count() != other.atom_count() || self.bond_count() != other.bond_count() {
            return false;
        }
        for idx in self.atoms() {
            if self.atom(idx) != other.atom(idx) {
                return false;
            }
        }
        for idx in self.bonds() {
            let Some((a, b)) = self.bond_endpoints(idx) else {
                return false;
            };
            match other.bond_between(a, b) {
                Some(o) if self.bond(idx) == other.bond(o) => {}
                _ => return false,
            }
        }
        true
    }
}

impl<A: std::fmt::Debug, B: std::fmt::Debug> std::fmt::Debug for Mol<A, B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Mol")
            .field("atom_count", &self.atom_count())
            .field("bond_count", &self.bond_count())
            .field("graph", &self.graph)
            .finish()
    }
}
