//! Feature modules, one per pipeline stage (§4). Each depends only on
//! `shared` and `config`, never on a sibling feature or on `pipeline`.

pub mod catalog;
pub mod clustering;
pub mod explainability;
pub mod flow_attribution;
pub mod graph_builder;
pub mod influence;
pub mod risk_engine;
pub mod taint_propagation;
