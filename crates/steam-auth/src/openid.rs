//! OpenID 2.0 login redirect and assertion verification
//!
//! Steam signs users in with OpenID 2.0 in "stateless" mode: the relying
//! party never establishes an association, so the only way to trust the
//! parameters that come back on the return redirect is to POST them to
//! Steam again with `openid.mode=check_authentication` and look for
//! `is_valid:true` in the reply. The browser controls the query string; it
//! does not control the server-to-server round trip.

use std::collections::BTreeMap;
use std::time::Duration;

use tracing::{debug, warn};
use url::Url;

use crate::constants::{
    CALLBACK_PATH, CLAIMED_ID_MARKERS, DEFAULT_TIMEOUT_SECS, IDENTIFIER_SELECT, IS_VALID_MARKER,
    MODE_CHECK_AUTHENTICATION, MODE_CHECKID_SETUP, OPENID_NS, OPENID_PARAM_PREFIX,
};
use crate::error::{Error, Rejection, Result};
use crate::identity::VerifiedIdentity;

/// Static redirect settings, built once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedirectConfig {
    openid_endpoint: Url,
    return_to: Url,
    realm: Url,
}

impl RedirectConfig {
    pub fn new(openid_endpoint: Url, return_to: Url, realm: Url) -> Self {
        Self {
            openid_endpoint,
            return_to,
            realm,
        }
    }

    /// Derive return-to and realm from the public base URL of the relying party.
    ///
    /// `return_to` is `<base>/auth/steam/callback`; the realm is the base itself.
    pub fn from_base_url(openid_endpoint: Url, base_url: &Url) -> Result<Self> {
        let return_to = format!(
            "{}{}",
            base_url.as_str().trim_end_matches('/'),
            CALLBACK_PATH
        );
        let return_to =
            Url::parse(&return_to).map_err(|e| Error::InvalidUrl(format!("{return_to}: {e}")))?;
        Ok(Self::new(openid_endpoint, return_to, base_url.clone()))
    }

    pub fn openid_endpoint(&self) -> &Url {
        &self.openid_endpoint
    }

    pub fn return_to(&self) -> &Url {
        &self.return_to
    }

    pub fn realm(&self) -> &Url {
        &self.realm
    }
}

/// Build the `checkid_setup` URL the user agent is redirected to.
///
/// Deterministic: the same config always yields the same string.
pub fn build_login_url(config: &RedirectConfig) -> Url {
    let mut url = config.openid_endpoint.clone();
    url.query_pairs_mut()
        .clear()
        .append_pair("openid.ns", OPENID_NS)
        .append_pair("openid.mode", MODE_CHECKID_SETUP)
        .append_pair("openid.return_to", config.return_to.as_str())
        .append_pair("openid.realm", config.realm.as_str())
        .append_pair("openid.identity", IDENTIFIER_SELECT)
        .append_pair("openid.claimed_id", IDENTIFIER_SELECT);
    url
}

/// Query parameters received on the OpenID return redirect.
///
/// Entirely client-controlled until [`CallbackVerifier::verify`] succeeds.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallbackAssertion {
    params: Vec<(String, String)>,
}

impl CallbackAssertion {
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            params: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Parse a raw (still percent-encoded) query string.
    pub fn from_query(query: &str) -> Self {
        Self::from_pairs(url::form_urlencoded::parse(query.as_bytes()).into_owned())
    }

    /// Value of `key`. A repeated key resolves to its last occurrence.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// The `openid.*` parameters, last occurrence wins.
    fn protocol_params(&self) -> BTreeMap<&str, &str> {
        self.params
            .iter()
            .filter(|(k, _)| k.starts_with(OPENID_PARAM_PREFIX))
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect()
    }
}

/// Re-confirms return-redirect assertions with Steam.
///
/// Holds no per-login state; one instance serves all concurrent logins.
#[derive(Debug, Clone)]
pub struct CallbackVerifier {
    client: reqwest::Client,
    endpoint: Url,
    timeout: Duration,
}

impl CallbackVerifier {
    pub fn new(client: reqwest::Client, endpoint: Url) -> Self {
        Self {
            client,
            endpoint,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Confirm `assertion` with the provider and extract the SteamID64.
    ///
    /// Performs exactly one POST and never retries: a rejected assertion
    /// means the user has to start over from the login redirect.
    pub async fn verify(
        &self,
        assertion: &CallbackAssertion,
    ) -> std::result::Result<VerifiedIdentity, Rejection> {
        let mut form = assertion.protocol_params();
        // The incoming mode is `id_res`; echoing it back would just replay
        // the browser's claim.
        form.insert("openid.ns", OPENID_NS);
        form.insert("openid.mode", MODE_CHECK_AUTHENTICATION);

        let response = self
            .client
            .post(self.endpoint.clone())
            .timeout(self.timeout)
            .form(&form)
            .send()
            .await
            .map_err(transport_rejection)?;

        let status = response.status();
        if !status.is_success() {
            warn!(
                status = status.as_u16(),
                "check_authentication returned non-success status"
            );
            return Err(Rejection::Status(status.as_u16()));
        }

        let body = response.text().await.map_err(transport_rejection)?;
        if !body.contains(IS_VALID_MARKER) {
            debug!("check_authentication response lacks is_valid:true");
            return Err(Rejection::NotConfirmed);
        }

        let claimed_id = assertion
            .get("openid.claimed_id")
            .ok_or(Rejection::MissingClaimedId)?;
        let steam_id = steam_id_from_claimed_id(claimed_id)
            .ok_or_else(|| Rejection::MalformedClaimedId(claimed_id.to_string()))?;

        debug!(steam_id, "assertion confirmed by provider");
        Ok(VerifiedIdentity::new(steam_id.to_string()))
    }
}

fn transport_rejection(e: reqwest::Error) -> Rejection {
    if e.is_timeout() {
        Rejection::Timeout
    } else {
        Rejection::Transport(e.to_string())
    }
}

/// Pull the trailing SteamID64 out of a claimed identifier URL.
///
/// Pure suffix match against [`CLAIMED_ID_MARKERS`]; it does not parse the
/// URL or check its host. A format change on Steam's side breaks this.
///
/// [`CallbackVerifier::verify`] also never compares `openid.return_to` or
/// `openid.op_endpoint` against the configured redirect or endpoint, and
/// keeps no record of used nonces. Steam confirms the signature, not the
/// audience, so an assertion issued to another relying party and forwarded
/// here is accepted as long as Steam still vouches for it.
fn steam_id_from_claimed_id(claimed_id: &str) -> Option<&str> {
    CLAIMED_ID_MARKERS.iter().find_map(|marker| {
        let (_, digits) = claimed_id.rsplit_once(marker)?;
        let numeric = !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit());
        numeric.then_some(digits)
    })
}
