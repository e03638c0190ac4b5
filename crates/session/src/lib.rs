//! Session token issuance and verification
//!
//! Mints the short-lived bearer token handed to the client application after
//! a successful provider sign-in, and verifies it on later requests. Tokens
//! are HMAC-signed JWTs carrying `user_id`, `provider` and `exp`.
//!
//! The codec does no I/O. Its only inputs besides the token are the signing
//! secret and an injected [`Clock`], so expiry can be simulated in tests.

pub mod clock;
pub mod codec;
pub mod error;

pub use clock::{Clock, ManualClock, SystemClock};
pub use codec::{SessionClaims, SigningConfig, TokenCodec, parse_algorithm};
pub use error::{Error, InvalidToken, Result};
pub use jsonwebtoken::Algorithm;
