//! src/routes/signups/mod.rs

mod post;

pub use post::*;
