use petgraph::graph::NodeIndex;

use crate::mol::Mol;

/// Matched atoms as `(query, target)` pairs.
pub type AtomMapping = Vec<(NodeIndex, NodeIndex)>;

pub fn has_substruct_match_with<A1, B1, A2, B2>(
    target: &Mol<A1, B1>,
    query: &Mol<A2, B2>,
    atom_match: impl Fn(&A1, &A2) -> bool,
    bond_match: impl Fn(&B1, &B2) -> bool,
) -> bool {
    get_substruct_match_with(target, query, atom_match, bond_match).is_some()
}

pub fn get_substruct_match_with<A1, B1, A2, B2>(
    target: &Mol<A1, B1>,
    query: &Mol<A2, B2>,
    atom_match: impl Fn(&A1, &A2) -> bool,
    bond_match: impl Fn(&B1, &B2) -> bool,
) -> Option<AtomMapping> {
    let node_match = |t: NodeIndex, q: NodeIndex| atom_match(target.atom(t), query.atom(q));
    Vf2::new(target, query, node_match, bond_match, &[]).find_first()
}

pub fn get_substruct_matches_with<A1, B1, A2, B2>(
    target: &Mol<A1, B1>,
    query: &Mol<A2, B2>,
    atom_match: impl Fn(&A1, &A2) -> bool,
    bond_match: impl Fn(&B1, &B2) -> bool,
) -> Vec<AtomMapping> {
    let node_match = |t: NodeIndex, q: NodeIndex| atom_match(target.atom(t), query.atom(q));
    Vf2::new(target, query, node_match, bond_match, &[]).find_all()
}

/// Substructure search with some query atoms pinned to target atoms.
///
/// `seed` holds `(query, target)` pairs. Each pinned pair must still
/// satisfy `atom_match`, and no other query atom may map onto a pinned
/// target atom.
pub fn has_seeded_substruct_match_with<A1, B1, A2, B2>(
    target: &Mol<A1, B1>,
    query: &Mol<A2, B2>,
    seed: &[(NodeIndex, NodeIndex)],
    atom_match: impl Fn(&A1, &A2) -> bool,
    bond_match: impl Fn(&B1, &B2) -> bool,
) -> bool {
    let node_match = |t: NodeIndex, q: NodeIndex| atom_match(target.atom(t), query.atom(q));
    Vf2::new(target, query, node_match, bond_match, seed)
        .find_first()
        .is_some()
}

/// Full graph isomorphism.
///
/// Besides the atom and bond predicates, candidate pairs must agree on
/// their extended connectivity values, which prunes most of the search.
pub fn is_isomorphic_with<A1, B1, A2, B2>(
    a: &Mol<A1, B1>,
    b: &Mol<A2, B2>,
    atom_match: impl Fn(&A1, &A2) -> bool,
    bond_match: impl Fn(&B1, &B2) -> bool,
) -> bool {
    if a.atom_count() != b.atom_count() || a.bond_count() != b.bond_count() {
        return false;
    }
    let a_values = a.connectivity_values();
    let b_values = b.connectivity_values();
    let mut a_sorted = a_values.to_vec();
    let mut b_sorted = b_values.to_vec();
    a_sorted.sort_unstable();
    b_sorted.sort_unstable();
    if a_sorted != b_sorted {
        return false;
    }
    let node_match = |t: NodeIndex, q: NodeIndex| {
        a_values[t.index()] == b_values[q.index()] && atom_match(a.atom(t), b.atom(q))
    };
    Vf2::new(a, b, node_match, bond_match, &[])
        .find_first()
        .is_some()
}

struct Vf2<'a, A1, B1, A2, B2, FN, FB> {
    target: &'a Mol<A1, B1>,
    query: &'a Mol<A2, B2>,
    node_match: FN,
    bond_match: FB,
    query_order: Vec<NodeIndex>,
    pinned: Vec<Option<NodeIndex>>,
    query_map: Vec<Option<NodeIndex>>,
    target_used: Vec<bool>,
    target_pinned: Vec<bool>,
}

impl<'a, A1, B1, A2, B2, FN, FB> Vf2<'a, A1, B1, A2, B2, FN, FB>
where
    FN: Fn(NodeIndex, NodeIndex) -> bool,
    FB: Fn(&B1, &B2) -> bool,
{
    fn new(
        target: &'a Mol<A1, B1>,
        query: &'a Mol<A2, B2>,
        node_match: FN,
        bond_match: FB,
        seed: &[(NodeIndex, NodeIndex)],
    ) -> Self {
        let mut pinned = vec![None; query.atom_count()];
        let mut target_pinned = vec![false; target.atom_count()];
        for &(q, t) in seed {
            if q.index() < pinned.len() && t.index() < target_pinned.len() {
                pinned[q.index()] = Some(t);
                target_pinned[t.index()] = true;
            }
        }
        let mut query_order: Vec<NodeIndex> = query.atoms().collect();
        // Pinned atoms first, then by descending degree.
        query_order.sort_by(|&a, &b| {
            pinned[b.index()]
                .is_some()
                .cmp(&pinned[a.index()].is_some())
                .then_with(|| query.degree(b).cmp(&query.degree(a)))
        });
        Self {
            target,
            query,
            node_match,
            bond_match,
            query_order,
            pinned,
            query_map: vec![None; query.atom_count()],
            target_used: vec![false; target.atom_count()],
            target_pinned,
        }
    }

    fn find_first(&mut self) -> Option<AtomMapping> {
        let mut results = Vec::new();
        self.recurse(0, &mut results, true);
        results.into_iter().next()
    }

    fn find_all(&mut self) -> Vec<AtomMapping> {
        let mut results = Vec::new();
        self.recurse(0, &mut results, false);
        results
    }

    fn recurse(&mut self, depth: usize, results: &mut Vec<AtomMapping>, first_only: bool) {
        if depth == self.query_order.len() {
            let mapping = self
                .query_order
                .iter()
                .filter_map(|&qn| self.query_map[qn.index()].map(|t| (qn, t)))
                .collect();
            results.push(mapping);
            return;
        }

        if first_only && !results.is_empty() {
            return;
        }

        let query_node = self.query_order[depth];
        let candidates: Vec<NodeIndex> = match self.pinned[query_node.index()] {
            Some(t) => vec![t],
            None => (0..self.target_used.len())
                .filter(|&i| !self.target_pinned[i])
                .map(NodeIndex::new)
                .collect(),
        };

        for target_node in candidates {
            if self.target_used[target_node.index()] {
                continue;
            }

            if !self.is_feasible(query_node, target_node) {
                continue;
            }

            self.query_map[query_node.index()] = Some(target_node);
            self.target_used[target_node.index()] = true;

            self.recurse(depth + 1, results, first_only);

            if first_only && !results.is_empty() {
                return;
            }

            self.query_map[query_node.index()] = None;
            self.target_used[target_node.index()] = false;
        }
    }

    fn is_feasible(&self, query_node: NodeIndex, target_node: NodeIndex) -> bool {
        if !(self.node_match)(target_node, query_node) {
            return false;
        }

        for q_neighbor in self.query.neighbors(query_node) {
            if let Some(t_mapped) = self.query_map[q_neighbor.index()] {
                let Some(q_bond) = self.query.bond_between(query_node, q_neighbor) else {
                    return false;
                };
                match self.target.bond_between(target_node, t_mapped) {
                    Some(t_bond) => {
                        if !(self.bond_match)(self.target.bond(t_bond), self.query.bond(q_bond)) {
                            return false;
                        }
                    }
                    None => return false,
                }
            }
        }

        true
    }
}
