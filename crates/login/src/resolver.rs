//! Seam to the owner of local user records

use std::future::Future;
use std::pin::Pin;

use steam_auth::{CanonicalProfile, VerifiedIdentity};

use crate::error::ResolveError;

/// Local user a verified identity resolved to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedUser {
    pub user_id: i64,
    /// Name to show the client; `None` falls back to the provider profile
    pub display_name: Option<String>,
}

/// Maps a verified external identity onto a local user.
///
/// Implementations must be idempotent per identity: resolving the same
/// SteamID64 again returns the same user id and refreshes the stored
/// profile fields instead of creating a second record.
///
/// Uses `Pin<Box<dyn Future>>` so the orchestrator can hold an
/// `Arc<dyn IdentityResolver>`.
pub trait IdentityResolver: Send + Sync {
    fn resolve<'a>(
        &'a self,
        identity: &'a VerifiedIdentity,
        profile: &'a CanonicalProfile,
    ) -> Pin<Box<dyn Future<Output = Result<ResolvedUser, ResolveError>> + Send + 'a>>;
}
