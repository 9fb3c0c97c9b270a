//! src/lib.rs
pub mod analytics;
pub mod configuration;
pub mod domain;
pub mod error;
pub mod routes;
pub mod session_state;
pub mod signup;
pub mod startup;
pub mod store;
pub mod telemetry;
mod utils;
