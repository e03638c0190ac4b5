//! Shared types for the Steam sign-in gateway

mod error;
mod secret;

pub use error::{Error, Result};
pub use secret::Secret;
