//! Steam OpenID and Web API constants
//!
//! These are protocol identifiers and public endpoints, not secrets. The
//! Web API key lives in process configuration.

/// Provider name stamped into session tokens
pub const PROVIDER: &str = "steam";

/// Steam's OpenID 2.0 provider endpoint (login redirect and verification POST)
pub const OPENID_ENDPOINT: &str = "https://steamcommunity.com/openid/login";

/// Steam Web API base URL
pub const API_BASE_URL: &str = "https://api.steampowered.com";

/// Player summaries method, relative to the Web API base
pub const PLAYER_SUMMARIES_PATH: &str = "ISteamUser/GetPlayerSummaries/v2";

/// Path on the relying party that receives the OpenID return redirect
pub const CALLBACK_PATH: &str = "/auth/steam/callback";

/// OpenID 2.0 namespace URI
pub const OPENID_NS: &str = "http://specs.openid.net/auth/2.0";

/// Lets the provider pick the identifier at login time
pub const IDENTIFIER_SELECT: &str = "http://specs.openid.net/auth/2.0/identifier_select";

pub const MODE_CHECKID_SETUP: &str = "checkid_setup";
pub const MODE_CHECK_AUTHENTICATION: &str = "check_authentication";

/// Prefix shared by every OpenID protocol parameter
pub const OPENID_PARAM_PREFIX: &str = "openid.";

/// Literal the provider returns in a key-value body for a valid assertion
pub const IS_VALID_MARKER: &str = "is_valid:true";

/// Path segments that precede the SteamID64 at the end of `openid.claimed_id`.
///
/// Steam issues `https://steamcommunity.com/openid/id/<steamid64>`; the
/// `steamid/` form is accepted for compatibility with older deployments.
pub const CLAIMED_ID_MARKERS: &[&str] = &["openid/id/", "steamid/"];

/// Default bound on each outbound call to Steam
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;
