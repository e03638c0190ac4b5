//! End-to-end sign-in flow

use std::sync::Arc;

use serde::Serialize;
use session::{SessionClaims, TokenCodec};
use steam_auth::{
    CallbackAssertion, CallbackVerifier, PROVIDER, ProfileFetcher, RedirectConfig,
    build_login_url,
};
use tracing::{info, instrument, warn};
use url::Url;

use crate::error::{LoginError, Result};
use crate::resolver::IdentityResolver;

/// What a successful login hands back to the client application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoginSession {
    pub access_token: String,
    pub token_type: &'static str,
    pub user_id: i64,
    pub username: Option<String>,
}

/// Runs the Steam sign-in flow and issues session tokens.
///
/// Stateless between calls: concurrent logins share only the HTTP client
/// pool, the token codec (immutable) and the resolver.
pub struct AuthOrchestrator {
    redirect: RedirectConfig,
    verifier: CallbackVerifier,
    profiles: ProfileFetcher,
    resolver: Arc<dyn IdentityResolver>,
    tokens: Arc<TokenCodec>,
}

impl AuthOrchestrator {
    pub fn new(
        redirect: RedirectConfig,
        verifier: CallbackVerifier,
        profiles: ProfileFetcher,
        resolver: Arc<dyn IdentityResolver>,
        tokens: Arc<TokenCodec>,
    ) -> Self {
        Self {
            redirect,
            verifier,
            profiles,
            resolver,
            tokens,
        }
    }

    /// Redirect target that starts a login.
    pub fn login_url(&self) -> Url {
        build_login_url(&self.redirect)
    }

    /// Finish a login from the return-redirect parameters.
    ///
    /// Stages run strictly in order and the first failure ends the attempt.
    /// Dropping the returned future cancels whichever provider call is in
    /// flight.
    #[instrument(skip_all)]
    pub async fn complete_login(&self, assertion: &CallbackAssertion) -> Result<LoginSession> {
        let identity = self.verifier.verify(assertion).await.map_err(|reason| {
            warn!(%reason, "steam assertion rejected");
            LoginError::VerificationFailed
        })?;
        let steam_id = identity.provider_user_id();

        let profile = match self.profiles.fetch(&identity).await {
            Ok(Some(profile)) => profile,
            Ok(None) => {
                warn!(steam_id, "steam has no profile for verified identity");
                return Err(LoginError::ProfileUnavailable);
            }
            Err(e) => {
                warn!(steam_id, error = %e, "steam profile lookup failed");
                return Err(LoginError::ProfileUnavailable);
            }
        };

        let user = self
            .resolver
            .resolve(&identity, &profile)
            .await
            .map_err(|e| {
                warn!(steam_id, error = %e, "identity resolution failed");
                LoginError::IdentityResolutionFailed
            })?;

        let access_token = self
            .tokens
            .mint_default(user.user_id, PROVIDER)
            .map_err(|e| {
                warn!(user_id = user.user_id, error = %e, "session token mint failed");
                LoginError::TokenIssuanceFailed
            })?;

        info!(user_id = user.user_id, steam_id, "login completed");

        Ok(LoginSession {
            access_token,
            token_type: "bearer",
            user_id: user.user_id,
            username: user.display_name.or(profile.display_name),
        })
    }

    /// Check a bearer token presented on a later request.
    pub fn authenticate(&self, token: &str) -> Result<SessionClaims> {
        self.tokens
            .verify(token)
            .map_err(|_| LoginError::InvalidToken)
    }
}
