//! Steam OpenID 2.0 sign-in
//!
//! The three provider-facing pieces of the sign-in pipeline:
//!
//! 1. [`build_login_url`] produces the `checkid_setup` redirect to Steam
//! 2. [`CallbackVerifier`] re-posts the returned assertion to Steam as a
//!    `check_authentication` request and extracts the SteamID64
//! 3. [`ProfileFetcher`] reads the player summary for that SteamID64
//!
//! Nothing here issues session tokens or stores users; see the `session`
//! and `login` crates.

pub mod constants;
pub mod error;
pub mod identity;
pub mod openid;
pub mod profile;

pub use constants::*;
pub use error::{Error, Rejection, Result};
pub use identity::{CanonicalProfile, VerifiedIdentity};
pub use openid::{CallbackAssertion, CallbackVerifier, RedirectConfig, build_login_url};
pub use profile::ProfileFetcher;
