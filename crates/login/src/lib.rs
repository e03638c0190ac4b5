//! Sign-in orchestration
//!
//! Composes the Steam OpenID pieces from `steam-auth` with the token codec
//! from `session` into one login flow, and defines the seam to whatever
//! owns local user records.
//!
//! Flow for one login attempt:
//! 1. `AuthOrchestrator::login_url()` gives the redirect to Steam
//! 2. Steam redirects back; `complete_login()` re-confirms the assertion
//! 3. The player summary is fetched for the confirmed SteamID64
//! 4. `IdentityResolver::resolve()` maps the identity to a local user id
//! 5. A session token is minted for that user id
//!
//! Any failing step ends the attempt with one `LoginError`; nothing is
//! retried and nothing partial is returned.

pub mod error;
pub mod flow;
pub mod memory;
pub mod resolver;

pub use error::{LoginError, ResolveError, Result};
pub use flow::{AuthOrchestrator, LoginSession};
pub use memory::{InMemoryResolver, LocalUser};
pub use resolver::{IdentityResolver, ResolvedUser};
