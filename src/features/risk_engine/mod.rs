//! F6: weighted, explainable risk scoring (§4.9). The regression harness
//! that exercises this against fixed historical cases lives in
//! [`crate::pipeline::regression`], since it runs the whole investigation
//! pipeline rather than just these components.

pub mod components;
pub mod engine;

pub use components::{all_components, DataQualityInputs};
pub use engine::aggregate;
