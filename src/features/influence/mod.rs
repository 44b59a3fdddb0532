//! F5 (influence half): counterfactual betweenness analysis (§4.8).

pub mod analysis;

pub use analysis::{analyze_influence, betweenness_centrality, network_fragility};
