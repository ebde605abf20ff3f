use std::fmt;

use itertools::Itertools;
use rustc_hash::FxHashSet;

use crate::partition::ClauseRef;

/// A propositional proof variable.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct Var(pub u32);

impl fmt::Display for Var {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

/// A literal is a variable with a sign; `sign == true` means negated.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct Lit {
    var: Var,
    sign: bool,
}

impl Lit {
    pub fn new(var: Var, sign: bool) -> Self {
        Lit { var, sign }
    }

    pub fn positive(var: Var) -> Self {
        Lit::new(var, false)
    }

    pub fn negative(var: Var) -> Self {
        Lit::new(var, true)
    }

    pub fn var(self) -> Var {
        self.var
    }

    pub fn sign(self) -> bool {
        self.sign
    }
}

impl std::ops::Not for Lit {
    type Output = Lit;

    fn not(self) -> Lit {
        Lit::new(self.var, !self.sign)
    }
}

impl fmt::Display for Lit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.sign {
            write!(f, "-{}", self.var)
        } else {
            write!(f, "{}", self.var)
        }
    }
}

/// Index of a node in the proof arena.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct NodeId(pub u32);

impl NodeId {
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n{}", self.0)
    }
}

/// What kind of clause a proof node holds. Everything except `Resolvent`
/// is a leaf, so a "leaf with an inner kind" cannot be constructed.
#[derive(Clone, Copy, Debug)]
pub enum NodeKind {
    /// Clause of the input formula; `clause_ref` looks up its partition mask.
    Original { clause_ref: ClauseRef },
    /// Theory lemma, interpolated by the theory handler.
    Theory,
    /// Binary theory split; both atoms range over the same theory variables.
    Split,
    /// Unit clause carrying an incremental frame marker.
    Assumption,
    Resolvent {
        ant1: NodeId,
        ant2: NodeId,
        pivot: Var,
    },
}

#[derive(Clone, Debug)]
pub struct ProofNode {
    pub id: NodeId,
    pub kind: NodeKind,
    pub clause: Vec<Lit>,
}

impl ProofNode {
    pub fn is_leaf(&self) -> bool {
        !matches!(self.kind, NodeKind::Resolvent { .. })
    }
}

/// A resolution refutation: an arena of clause nodes addressed by stable
/// ids, with antecedent links as ids rather than ownership edges. The root
/// is the node carrying the empty clause.
#[derive(Default, Debug)]
pub struct ProofGraph {
    nodes: Vec<ProofNode>,
    root: Option<NodeId>,
}

impl ProofGraph {
    pub fn new() -> Self {
        ProofGraph::default()
    }

    fn push(&mut self, kind: NodeKind, clause: Vec<Lit>) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        if clause.is_empty() {
            self.root = Some(id);
        }
        self.nodes.push(ProofNode { id, kind, clause });
        id
    }

    pub fn add_original(&mut self, clause: Vec<Lit>, clause_ref: ClauseRef) -> NodeId {
        self.push(NodeKind::Original { clause_ref }, clause)
    }

    pub fn add_theory(&mut self, clause: Vec<Lit>) -> NodeId {
        self.push(NodeKind::Theory, clause)
    }

    pub fn add_split(&mut self, clause: Vec<Lit>) -> NodeId {
        self.push(NodeKind::Split, clause)
    }

    pub fn add_assumption(&mut self, clause: Vec<Lit>) -> NodeId {
        self.push(NodeKind::Assumption, clause)
    }

    /// Adds a resolvent of two existing nodes. The resolved clause is
    /// computed here, so the resolution invariant holds by construction.
    pub fn add_resolvent(&mut self, ant1: NodeId, ant2: NodeId, pivot: Var) -> NodeId {
        let clause = resolve(
            &self.nodes[ant1.index()].clause,
            &self.nodes[ant2.index()].clause,
            pivot,
        );
        self.push(NodeKind::Resolvent { ant1, ant2, pivot }, clause)
    }

    pub fn node(&self, id: NodeId) -> &ProofNode {
        &self.nodes[id.index()]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    pub fn leaves(&self) -> impl Iterator<Item = &ProofNode> {
        self.nodes.iter().filter(|n| n.is_leaf())
    }

    /// All variables mentioned anywhere in the proof, in ascending order.
    pub fn variables(&self) -> Vec<Var> {
        let vars: FxHashSet<Var> = self
            .nodes
            .iter()
            .flat_map(|n| n.clause.iter().map(|l| l.var()))
            .collect();
        vars.into_iter().sorted().collect()
    }

    /// Topological order of the subgraph reachable from the root:
    /// antecedents always appear before their resolvents.
    pub fn topo_order(&self) -> Vec<NodeId> {
        let Some(root) = self.root else {
            return Vec::new();
        };
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut visited = vec![false; self.nodes.len()];
        let mut stack = vec![(root, false)];
        while let Some((id, expanded)) = stack.pop() {
            if expanded {
                order.push(id);
                continue;
            }
            if visited[id.index()] {
                continue;
            }
            visited[id.index()] = true;
            stack.push((id, true));
            if let NodeKind::Resolvent { ant1, ant2, .. } = self.nodes[id.index()].kind {
                stack.push((ant1, false));
                stack.push((ant2, false));
            }
        }
        order
    }
}

fn resolve(c1: &[Lit], c2: &[Lit], pivot: Var) -> Vec<Lit> {
    let mut clause: Vec<Lit> = Vec::with_capacity(c1.len() + c2.len());
    for &lit in c1.iter().chain(c2.iter()) {
        if lit.var() != pivot && !clause.contains(&lit) {
            clause.push(lit);
        }
    }
    clause
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolvent_clause_drops_pivot() {
        let mut proof = ProofGraph::new();
        let a = proof.add_theory(vec![Lit::positive(Var(0)), Lit::positive(Var(1))]);
        let b = proof.add_theory(vec![Lit::negative(Var(0)), Lit::positive(Var(1))]);
        let r = proof.add_resolvent(a, b, Var(0));
        assert_eq!(proof.node(r).clause, vec![Lit::positive(Var(1))]);
    }

    #[test]
    fn test_empty_clause_becomes_root() {
        let mut proof = ProofGraph::new();
        let a = proof.add_theory(vec![Lit::positive(Var(0))]);
        let b = proof.add_theory(vec![Lit::negative(Var(0))]);
        assert_eq!(proof.root(), None);
        let r = proof.add_resolvent(a, b, Var(0));
        assert_eq!(proof.root(), Some(r));
    }

    #[test]
    fn test_topo_order_antecedents_first() {
        let mut proof = ProofGraph::new();
        let a = proof.add_theory(vec![Lit::positive(Var(0)), Lit::positive(Var(1))]);
        let b = proof.add_theory(vec![Lit::negative(Var(0))]);
        let c = proof.add_theory(vec![Lit::negative(Var(1))]);
        let r1 = proof.add_resolvent(a, b, Var(0));
        let r2 = proof.add_resolvent(r1, c, Var(1));
        let order = proof.topo_order();
        let pos = |id: NodeId| order.iter().position(|&x| x == id).unwrap();
        assert_eq!(order.len(), 5);
        assert!(pos(a) < pos(r1));
        assert!(pos(b) < pos(r1));
        assert!(pos(r1) < pos(r2));
        assert!(pos(c) < pos(r2));
        assert_eq!(order.last(), Some(&r2));
    }

    #[test]
    fn test_literal_negation() {
        let lit = Lit::positive(Var(3));
        assert_eq!(!lit, Lit::negative(Var(3)));
        assert_eq!(!!lit, lit);
    }
}
