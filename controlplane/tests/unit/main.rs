//! Integration tests for the riser control plane

mod helpers;
mod test_handlers;
mod test_rollout;
mod test_state_repo;
