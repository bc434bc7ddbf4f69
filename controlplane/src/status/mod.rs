//! Status reconciliation between cluster reports, the side-store, and API views

pub mod reconciler;
pub mod service;

pub use reconciler::{map_deployment_to_status_view, map_status_from_report};
pub use service::StatusService;
