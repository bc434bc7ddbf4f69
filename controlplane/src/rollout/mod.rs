//! Traffic rollouts: validation and the commit protocol

pub mod engine;
pub mod validation;

pub use engine::{map_traffic_rules_to_domain, RolloutEngine, RolloutOutcome};
pub use validation::{validate_rollout_request, FieldError, ValidationErrors};
