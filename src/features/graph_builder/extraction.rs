//! Turns a [`TransactionDetails`] (as returned by the chain client) into
//! zero or more [`TxEdge`]s, falling back to balance-delta parsing when
//! the client did not already extract edges (§6).

use crate::shared::models::{Address, Direction, TxEdge};
use crate::shared::ports::TransactionDetails;

/// Extracts edges for one transaction, relative to `focus` (used only to
/// set [`Direction`] on the returned edges; extraction itself is
/// direction-agnostic).
pub fn extract_edges(details: &TransactionDetails, focus: &Address) -> Vec<TxEdge> {
    if !details.edges.is_empty() {
        return details
            .edges
            .iter()
            .cloned()
            .map(|mut e| {
                e.direction = direction_for(&e, focus);
                e
            })
            .collect();
    }
    if !details.status_ok {
        return Vec::new();
    }
    balance_delta_edges(details, focus)
}

fn direction_for(edge: &TxEdge, focus: &Address) -> Direction {
    if edge.from == *focus {
        Direction::Out
    } else if edge.to == *focus {
        Direction::In
    } else {
        Direction::Neutral
    }
}

/// Fallback extractor: pairs the single largest balance decrease with the
/// single largest balance increase among the transaction's accounts. This
/// captures the common single-transfer case; multi-party transfers need a
/// program-aware extractor, which is out of core scope (§6).
fn balance_delta_edges(details: &TransactionDetails, focus: &Address) -> Vec<TxEdge> {
    if details.account_keys.len() != details.pre_balances.len()
        || details.account_keys.len() != details.post_balances.len()
    {
        return Vec::new();
    }

    let deltas: Vec<i128> = details
        .pre_balances
        .iter()
        .zip(details.post_balances.iter())
        .map(|(pre, post)| *post as i128 - *pre as i128)
        .collect();

    let sender = deltas
        .iter()
        .enumerate()
        .min_by_key(|(_, d)| **d)
        .filter(|(_, d)| **d < 0);
    let receiver = deltas
        .iter()
        .enumerate()
        .max_by_key(|(_, d)| **d)
        .filter(|(_, d)| **d > 0);

    let (Some((from_idx, from_delta)), Some((to_idx, _))) = (sender, receiver) else {
        return Vec::new();
    };
    if from_idx == to_idx {
        return Vec::new();
    }

    let from = details.account_keys[from_idx].clone();
    let to = details.account_keys[to_idx].clone();
    if from == to {
        return Vec::new();
    }

    let value = (-from_delta) as f64;
    let program = details.programs.first().cloned().unwrap_or_else(|| "unknown".into());

    let edge = TxEdge {
        from,
        to,
        value,
        slot: Some(details.slot),
        block_time: details.block_time,
        program,
        tx_signature: details.signature.clone(),
        direction: Direction::Neutral,
    };
    let direction = direction_for(&edge, focus);
    vec![TxEdge { direction, ..edge }]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::models::TxSignature;

    fn details(pre: Vec<u64>, post: Vec<u64>, keys: &[&str]) -> TransactionDetails {
        TransactionDetails {
            signature: TxSignature::from("sig1"),
            slot: 100,
            block_time: Some(1_700_000_000),
            account_keys: keys.iter().map(|k| Address::from(*k)).collect(),
            programs: vec!["system".into()],
            fee: 5000,
            status_ok: true,
            pre_balances: pre,
            post_balances: post,
            edges: Vec::new(),
        }
    }

    #[test]
    fn extracts_single_transfer_from_balance_deltas() {
        let d = details(vec![100, 0], vec![80, 20], &["A", "B"]);
        let edges = extract_edges(&d, &Address::from("A"));
        assert_eq!(edges.len(), 1);
        assert_eq!(edges[0].from, Address::from("A"));
        assert_eq!(edges[0].to, Address::from("B"));
        assert_eq!(edges[0].value, 20.0);
        assert_eq!(edges[0].direction, Direction::Out);
    }

    #[test]
    fn failed_transaction_yields_no_edges() {
        let mut d = details(vec![100, 0], vec![80, 20], &["A", "B"]);
        d.status_ok = false;
        assert!(extract_edges(&d, &Address::from("A")).is_empty());
    }

    #[test]
    fn preextracted_edges_are_reused_with_direction_relabeled() {
        let mut d = details(vec![100, 0], vec![80, 20], &["A", "B"]);
        d.edges = vec![TxEdge {
            from: Address::from("A"),
            to: Address::from("B"),
            value: 20.0,
            slot: Some(100),
            block_time: Some(1_700_000_000),
            program: "system".into(),
            tx_signature: TxSignature::from("sig1"),
            direction: Direction::Neutral,
        }];
        let edges = extract_edges(&d, &Address::from("B"));
        assert_eq!(edges[0].direction, Direction::In);
    }
}
