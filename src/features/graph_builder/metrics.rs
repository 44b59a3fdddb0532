//! §4.1 derived metrics over a built [`TxGraph`]: fan-in/out, net flow,
//! bounded reachability and density/validate pass-throughs.

use std::collections::{HashMap, HashSet, VecDeque};

use serde::{Deserialize, Serialize};

use crate::shared::models::{Address, TxGraph};

/// Per-direction edge statistics, restricted to value-bearing edges.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FanStats {
    pub count: usize,
    pub total_value: f64,
    pub unique_endpoints: usize,
    pub avg_value: f64,
    pub max_value: f64,
}

fn fan_stats<'a>(edges: impl Iterator<Item = (&'a Address, f64)>) -> FanStats {
    let mut count = 0usize;
    let mut total_value = 0.0;
    let mut max_value = 0.0f64;
    let mut endpoints: HashSet<&Address> = HashSet::new();

    for (endpoint, value) in edges {
        if value <= 0.0 {
            continue;
        }
        count += 1;
        total_value += value;
        max_value = max_value.max(value);
        endpoints.insert(endpoint);
    }

    FanStats {
        count,
        total_value,
        unique_endpoints: endpoints.len(),
        avg_value: if count > 0 { total_value / count as f64 } else { 0.0 },
        max_value,
    }
}

pub fn fan_out(graph: &TxGraph, addr: &Address) -> FanStats {
    fan_stats(graph.out_edges(addr).map(|e| (&e.to, e.value)))
}

pub fn fan_in(graph: &TxGraph, addr: &Address) -> FanStats {
    fan_stats(graph.in_edges(addr).map(|e| (&e.from, e.value)))
}

/// §4.1 `netFlow`: inflow minus outflow, plus flow ratio and raw
/// transaction count (value-bearing edges on either side).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetFlow {
    pub inflow: f64,
    pub outflow: f64,
    pub net_flow: f64,
    pub flow_ratio: f64,
    pub transaction_count: usize,
}

pub fn net_flow(graph: &TxGraph, addr: &Address) -> NetFlow {
    let fan_in = fan_in(graph, addr);
    let fan_out = fan_out(graph, addr);
    let inflow = fan_in.total_value;
    let outflow = fan_out.total_value;
    let total = inflow + outflow;

    NetFlow {
        inflow,
        outflow,
        net_flow: inflow - outflow,
        flow_ratio: if total > 0.0 { inflow / total } else { 0.0 },
        transaction_count: fan_in.count + fan_out.count,
    }
}

/// BFS over the undirected closure of `graph` from `addr`, returning the
/// minimum hop count to every address reachable within `max_hops`.
/// `addr` itself is included at hop 0.
pub fn reachable_within(graph: &TxGraph, addr: &Address, max_hops: u32) -> HashMap<Address, u32> {
    let mut distances = HashMap::new();
    distances.insert(addr.clone(), 0u32);

    let mut queue = VecDeque::new();
    queue.push_back(addr.clone());

    while let Some(current) = queue.pop_front() {
        let hop = distances[&current];
        if hop >= max_hops {
            continue;
        }
        let neighbors = graph
            .out_edges(&current)
            .map(|e| e.to.clone())
            .chain(graph.in_edges(&current).map(|e| e.from.clone()));
        for neighbor in neighbors {
            if !distances.contains_key(&neighbor) {
                distances.insert(neighbor.clone(), hop + 1);
                queue.push_back(neighbor);
            }
        }
    }

    distances
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::models::{Direction, GraphBuilder, ProgramId, TxEdge, TxSignature};

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
    fn fan_in_and_out_ignore_non_positive_edges() {
        let mut b = GraphBuilder::new();
        b.push_edge(edge("A", "B", 10.0));
        b.push_edge(edge("C", "B", 0.0));
        let g = b.build();
        let stats = fan_in(&g, &Address::from("B"));
        assert_eq!(stats.count, 1);
        assert_eq!(stats.total_value, 10.0);
    }

    #[test]
    fn fan_count_sums_to_incident_edges() {
        let mut b = GraphBuilder::new();
        b.push_edge(edge("A", "B", 10.0));
        b.push_edge(edge("B", "C", 5.0));
        let g = b.build();
        let b_addr = Address::from("B");
        let total_fan = fan_in(&g, &b_addr).count + fan_out(&g, &b_addr).count;
        let incident = g.edges().iter().filter(|e| e.from == b_addr || e.to == b_addr).count();
        assert_eq!(total_fan, incident);
    }

    #[test]
    fn net_flow_is_inflow_minus_outflow() {
        let mut b = GraphBuilder::new();
        b.push_edge(edge("A", "B", 10.0));
        b.push_edge(edge("B", "C", 4.0));
        let g = b.build();
        let nf = net_flow(&g, &Address::from("B"));
        assert_eq!(nf.net_flow, 6.0);
    }

    #[test]
    fn reachable_within_respects_hop_cap() {
        let mut b = GraphBuilder::new();
        b.push_edge(edge("A", "B", 1.0));
        b.push_edge(edge("B", "C", 1.0));
        b.push_edge(edge("C", "D", 1.0));
        let g = b.build();
        let dist = reachable_within(&g, &Address::from("A"), 2);
        assert_eq!(dist.get(&Address::from("C")), Some(&2));
        assert!(!dist.contains_key(&Address::from("D")));
    }
}
