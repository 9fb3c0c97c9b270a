//! src/signup/mod.rs

mod bootstrap;
mod controller;
mod in_flight;
mod service;

pub use bootstrap::{BootstrapStatus, StoreBootstrap};
pub use controller::{
    user_message, IgnoreReason, SignupController, SignupState, SignupView, SubmitOutcome,
    Submission, DUPLICATE_SIGNUP_MESSAGE, GENERIC_FAILURE_MESSAGE,
};
pub use in_flight::{InFlightGuard, InFlightSubmissions};
pub use service::SignupService;
