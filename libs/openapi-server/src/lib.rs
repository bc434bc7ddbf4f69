//! Wire models exposed by the riser control plane HTTP API.

pub mod models;
