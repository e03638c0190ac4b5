//! Mint and verify signed session tokens
//!
//! A session token is a compact JWT signed with a symmetric secret. Minting
//! stamps `exp = now + ttl` from the injected clock; verification checks the
//! signature and algorithm, decodes the required claims, and then compares
//! `exp` against the same clock. jsonwebtoken's built-in expiry check is
//! disabled because it reads the system clock.

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use common::Secret;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::clock::Clock;
use crate::error::{Error, InvalidToken, Result};

/// Claims carried by a session token.
///
/// Only [`TokenCodec::mint`] produces a signed token from these, and only
/// [`TokenCodec::verify`] hands them back as trusted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Local user id returned by the identity resolver
    pub user_id: i64,
    /// Identity provider the session was established through (e.g. "steam")
    pub provider: String,
    /// Expiry as unix seconds
    #[serde(rename = "exp")]
    pub expires_at: u64,
}

/// Signing settings, assembled once from process configuration.
#[derive(Debug, Clone)]
pub struct SigningConfig {
    pub secret: Secret<String>,
    pub algorithm: Algorithm,
    /// TTL applied by [`TokenCodec::mint_default`]
    pub default_ttl: Duration,
}

/// Parse an algorithm identifier, accepting only the HMAC family.
///
/// The codec signs with a shared secret, so RSA/EC identifiers would fail
/// at mint time anyway; rejecting them here surfaces the misconfiguration
/// at startup.
pub fn parse_algorithm(name: &str) -> Result<Algorithm> {
    let algorithm = Algorithm::from_str(name.trim())
        .map_err(|_| Error::UnsupportedAlgorithm(name.to_string()))?;
    require_hmac(algorithm)
}

fn require_hmac(algorithm: Algorithm) -> Result<Algorithm> {
    match algorithm {
        Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512 => Ok(algorithm),
        other => Err(Error::UnsupportedAlgorithm(format!("{other:?}"))),
    }
}

/// Stateless token codec. Cheap to share behind an `Arc`.
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    algorithm: Algorithm,
    default_ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl TokenCodec {
    pub fn new(config: &SigningConfig, clock: Arc<dyn Clock>) -> Result<Self> {
        if config.secret.is_blank() {
            return Err(Error::EmptySecret);
        }
        let algorithm = require_hmac(config.algorithm)?;
        if config.default_ttl.is_zero() {
            return Err(Error::ZeroTtl);
        }

        Ok(Self {
            encoding_key: EncodingKey::from_secret(config.secret.expose_bytes()),
            decoding_key: DecodingKey::from_secret(config.secret.expose_bytes()),
            algorithm,
            default_ttl: config.default_ttl,
            clock,
        })
    }

    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    /// Mint a token for `user_id` that expires `ttl` from now.
    ///
    /// `exp` has one-second resolution, so a fractional `ttl` rounds up.
    pub fn mint(&self, user_id: i64, provider: &str, ttl: Duration) -> Result<String> {
        if ttl.is_zero() {
            return Err(Error::ZeroTtl);
        }
        let ttl_secs = ttl.as_secs().saturating_add(u64::from(ttl.subsec_nanos() > 0));

        let claims = SessionClaims {
            user_id,
            provider: provider.to_string(),
            expires_at: self.clock.now().saturating_add(ttl_secs),
        };

        encode(&Header::new(self.algorithm), &claims, &self.encoding_key)
            .map_err(|e| Error::Encode(e.to_string()))
    }

    /// Mint a token with the configured default TTL.
    pub fn mint_default(&self, user_id: i64, provider: &str) -> Result<String> {
        self.mint(user_id, provider, self.default_ttl)
    }

    /// Verify a token and return its claims.
    ///
    /// Every failure mode maps to the same [`InvalidToken`]; the reason is
    /// only visible in debug logs.
    pub fn verify(&self, token: &str) -> std::result::Result<SessionClaims, InvalidToken> {
        let mut validation = Validation::new(self.algorithm);
        validation.algorithms = vec![self.algorithm];
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.leeway = 0;

        let claims = match decode::<SessionClaims>(token, &self.decoding_key, &validation) {
            Ok(data) => data.claims,
            Err(e) => {
                debug!(reason = %e, "session token rejected");
                return Err(InvalidToken);
            }
        };

        let now = self.clock.now();
        if claims.expires_at <= now {
            debug!(
                expires_at = claims.expires_at,
                now, "session token rejected: expired"
            );
            return Err(InvalidToken);
        }

        Ok(claims)
    }
}
