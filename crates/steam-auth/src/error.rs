//! Error types for Steam OpenID verification and profile lookup

/// Why a callback assertion was rejected.
///
/// Reasons are for logs. Callers collapse every variant into one
/// verification failure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Rejection {
    #[error("verification request failed: {0}")]
    Transport(String),

    #[error("verification request timed out")]
    Timeout,

    #[error("provider returned status {0}")]
    Status(u16),

    #[error("provider did not confirm the assertion")]
    NotConfirmed,

    #[error("assertion has no openid.claimed_id")]
    MissingClaimedId,

    #[error("openid.claimed_id does not end in a SteamID64: {0}")]
    MalformedClaimedId(String),
}

/// Errors from the Steam Web API profile lookup.
///
/// All of these mean the provider's data was never reached. An empty
/// result set is not an error (see `ProfileFetcher::fetch`).
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("no Steam Web API key configured")]
    MissingApiKey,

    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("Steam Web API returned status {0}")]
    Status(u16),

    #[error("invalid player summaries response: {0}")]
    Decode(String),

    #[error("invalid URL: {0}")]
    InvalidUrl(String),
}

/// Result alias for Steam API operations.
pub type Result<T> = std::result::Result<T, Error>;
