//! Verified identities and canonical profiles

use serde::Serialize;

use crate::constants::PROVIDER;

/// A Steam account whose ownership the provider has confirmed.
///
/// Only [`crate::CallbackVerifier`] can construct one, after a successful
/// `check_authentication` round trip. Nothing derived from raw request input
/// can become a `VerifiedIdentity` without going through that call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedIdentity {
    provider_user_id: String,
}

impl VerifiedIdentity {
    pub(crate) fn new(provider_user_id: String) -> Self {
        Self { provider_user_id }
    }

    /// The SteamID64, as a decimal string.
    pub fn provider_user_id(&self) -> &str {
        &self.provider_user_id
    }

    pub fn provider(&self) -> &'static str {
        PROVIDER
    }
}

/// Provider-agnostic profile shape.
///
/// Optional fields stay `None` when the provider omits them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CanonicalProfile {
    pub provider_user_id: String,
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
}
