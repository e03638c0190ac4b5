//! Error types for token minting and verification

/// Errors from minting a token or assembling a codec.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("token ttl must be greater than zero")]
    ZeroTtl,

    #[error("signing secret must not be empty")]
    EmptySecret,

    #[error("unsupported signing algorithm: {0}")]
    UnsupportedAlgorithm(String),

    #[error("token encoding failed: {0}")]
    Encode(String),
}

/// The single verdict for any token that fails verification.
///
/// Deliberately carries no detail: a malformed token, a bad signature, a
/// missing claim and an expired token are indistinguishable to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("invalid token")]
pub struct InvalidToken;

/// Result alias for session operations.
pub type Result<T> = std::result::Result<T, Error>;
