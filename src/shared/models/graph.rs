//! §3 `TxEdge` / `TxGraph` and §4.1 derived metrics types.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::address::{Address, ProgramId, Slot, TxSignature, UnixSeconds};

/// Direction of a [`TxEdge`] relative to a focal address.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    In,
    Out,
    Neutral,
}

/// One directed value transfer.
///
/// Invariant: `from != to` (self-loops are ignored by all analytics);
/// `value >= 0.0`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TxEdge {
    pub from: Address,
    pub to: Address,
    pub value: f64,
    pub slot: Option<Slot>,
    pub block_time: Option<UnixSeconds>,
    pub program: ProgramId,
    pub tx_signature: TxSignature,
    pub direction: Direction,
}

impl TxEdge {
    /// `true` for edges metrics must exclude from value-weighted stats.
    pub fn is_value_bearing(&self) -> bool {
        self.value > 0.0
    }
}

/// Directed multigraph over addresses, built once per investigation and
/// never mutated afterward (§3 lifecycle).
///
/// Adjacency indices preserve edge insertion order; deterministic pipelines
/// (taint BFS, k-shortest search, clustering BFS) rely on iterating them in
/// that order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TxGraph {
    nodes: Vec<Address>,
    edges: Vec<TxEdge>,
    adj_out: HashMap<Address, Vec<usize>>,
    adj_in: HashMap<Address, Vec<usize>>,
}

impl TxGraph {
    pub fn nodes(&self) -> &[Address] {
        &self.nodes
    }

    pub fn edges(&self) -> &[TxEdge] {
        &self.edges
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Outgoing edges of `addr`, in insertion order.
    pub fn out_edges(&self, addr: &Address) -> impl Iterator<Item = &TxEdge> {
        self.adj_out
            .get(addr)
            .into_iter()
            .flatten()
            .map(move |&i| &self.edges[i])
    }

    /// Incoming edges of `addr`, in insertion order.
    pub fn in_edges(&self, addr: &Address) -> impl Iterator<Item = &TxEdge> {
        self.adj_in
            .get(addr)
            .into_iter()
            .flatten()
            .map(move |&i| &self.edges[i])
    }

    pub fn contains(&self, addr: &Address) -> bool {
        self.adj_out.contains_key(addr) || self.adj_in.contains_key(addr)
    }

    /// |E| / (|V|*(|V|-1)), 0 when |V| <= 1.
    pub fn density(&self) -> f64 {
        let v = self.nodes.len() as f64;
        if v <= 1.0 {
            return 0.0;
        }
        self.edges.len() as f64 / (v * (v - 1.0))
    }

    /// Validates that adjacency sizes agree with |E| (§4.1 `validate`).
    pub fn validate(&self) -> Result<(), String> {
        let out_total: usize = self.adj_out.values().map(|v| v.len()).sum();
        let in_total: usize = self.adj_in.values().map(|v| v.len()).sum();
        if out_total != self.edges.len() || in_total != self.edges.len() {
            return Err(format!(
                "adjacency size mismatch: edges={}, adj_out={}, adj_in={}",
                self.edges.len(),
                out_total,
                in_total
            ));
        }
        Ok(())
    }
}

/// §4.1 builder: deterministic, O(E) time, O(V+E) memory; keeps duplicate
/// edges; zero-valued edges are retained (they carry program/temporal
/// info) but excluded from value-weighted metrics by callers. Single
/// pass, no recursion.
#[derive(Debug, Default)]
pub struct GraphBuilder {
    nodes: indexmap_like::OrderedSet,
    edges: Vec<TxEdge>,
    adj_out: HashMap<Address, Vec<usize>>,
    adj_in: HashMap<Address, Vec<usize>>,
}

/// Minimal insertion-ordered set so we don't need an external `indexmap`
/// dependency for the single place we need one.
mod indexmap_like {
    use std::collections::HashSet;

    use super::Address;

    #[derive(Debug, Default)]
    pub struct OrderedSet {
        order: Vec<Address>,
        seen: HashSet<Address>,
    }

    impl OrderedSet {
        pub fn insert(&mut self, addr: Address) {
            if self.seen.insert(addr.clone()) {
                self.order.push(addr);
            }
        }

        pub fn into_vec(self) -> Vec<Address> {
            self.order
        }
    }
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds one edge at a time, in caller-supplied order. Self-loops
    /// (`from == to`) are dropped here rather than later, since every
    /// downstream analytic is specified to ignore them.
    pub fn push_edge(&mut self, edge: TxEdge) {
        if edge.from == edge.to {
            return;
        }
        self.nodes.insert(edge.from.clone());
        self.nodes.insert(edge.to.clone());

        let idx = self.edges.len();
        self.adj_out.entry(edge.from.clone()).or_default().push(idx);
        self.adj_in.entry(edge.to.clone()).or_default().push(idx);
        self.edges.push(edge);
    }

    pub fn extend(&mut self, edges: impl IntoIterator<Item = TxEdge>) {
        for edge in edges {
            self.push_edge(edge);
        }
    }

    pub fn build(self) -> TxGraph {
        TxGraph {
            nodes: self.nodes.into_vec(),
            edges: self.edges,
            adj_out: self.adj_out,
            adj_in: self.adj_in,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edge(from: &str, to: &str, value: f64) -> TxEdge {
        TxEdge {
            from: Address::from(from),
            to: Address::from(to),
            value,
            slot: None,
            block_time: None,
            program: ProgramId::from("system"),
            tx_signature: TxSignature::from("sig"),
            direction: Direction::Neutral,
        }
    }

    #[test]
    fn builder_is_idempotent_on_duplicate_edges() {
        let mut b = GraphBuilder::new();
        b.push_edge(edge("A", "B", 1.0));
        b.push_edge(edge("A", "B", 1.0));
        let g = b.build();
        assert_eq!(g.edge_count(), 2, "duplicate edges are kept");
        assert_eq!(g.node_count(), 2);
        g.validate().unwrap();
    }

    #[test]
    fn self_loops_are_dropped() {
        let mut b = GraphBuilder::new();
        b.push_edge(edge("A", "A", 5.0));
        let g = b.build();
        assert_eq!(g.edge_count(), 0);
        assert_eq!(g.node_count(), 0);
    }

    #[test]
    fn adjacency_is_insertion_ordered() {
        let mut b = GraphBuilder::new();
        b.push_edge(edge("A", "C", 1.0));
        b.push_edge(edge("A", "B", 1.0));
        let g = b.build();
        let tos: Vec<_> = g.out_edges(&Address::from("A")).map(|e| e.to.as_str()).collect();
        assert_eq!(tos, vec!["C", "B"]);
    }

    #[test]
    fn density_is_zero_for_trivial_graphs() {
        assert_eq!(GraphBuilder::new().build().density(), 0.0);
        let mut b = GraphBuilder::new();
        b.push_edge(edge("A", "B", 1.0));
        assert!(b.build().density() > 0.0);
    }
}
