//! src/routes/mod.rs

mod health_check;
mod home;
mod signups;

pub use health_check::*;
pub use home::*;
pub use signups::*;
