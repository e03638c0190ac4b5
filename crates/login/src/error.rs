//! Login failure taxonomy

/// Outcome of a failed login or token check, as seen by the caller.
///
/// Variants name the stage that failed and nothing more. Network, format
/// and expiry details go to the logs only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum LoginError {
    #[error("sign-in could not be verified")]
    VerificationFailed,

    #[error("profile unavailable")]
    ProfileUnavailable,

    #[error("identity resolution failed")]
    IdentityResolutionFailed,

    #[error("session token could not be issued")]
    TokenIssuanceFailed,

    #[error("invalid token")]
    InvalidToken,
}

/// Errors reported by an `IdentityResolver` implementation.
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error("identity store unavailable: {0}")]
    Unavailable(String),

    #[error("identity rejected: {0}")]
    Rejected(String),
}

/// Result alias for login operations.
pub type Result<T> = std::result::Result<T, LoginError>;
