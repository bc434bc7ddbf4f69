//! HTTP surface

pub mod error_mapper;
pub mod handlers;
pub mod serve;
pub mod state;
