//! Player profile lookup through the Steam Web API
//!
//! Calls `ISteamUser/GetPlayerSummaries/v2` for a verified SteamID64 and maps
//! the first player record onto [`CanonicalProfile`].

use std::time::Duration;

use common::Secret;
use serde::Deserialize;
use tracing::debug;
use url::Url;

use crate::constants::{DEFAULT_TIMEOUT_SECS, PLAYER_SUMMARIES_PATH};
use crate::error::{Error, Result};
use crate::identity::{CanonicalProfile, VerifiedIdentity};

#[derive(Debug, Deserialize)]
struct SummariesEnvelope {
    #[serde(default)]
    response: PlayerList,
}

#[derive(Debug, Default, Deserialize)]
struct PlayerList {
    #[serde(default)]
    players: Vec<PlayerSummary>,
}

/// The subset of a player summary we read. Unknown fields are ignored.
#[derive(Debug, Deserialize)]
struct PlayerSummary {
    personaname: Option<String>,
    avatarfull: Option<String>,
}

/// Steam Web API client for player summaries.
#[derive(Debug, Clone)]
pub struct ProfileFetcher {
    client: reqwest::Client,
    api_base: Url,
    api_key: Option<Secret<String>>,
    timeout: Duration,
}

impl ProfileFetcher {
    pub fn new(client: reqwest::Client, api_base: Url, api_key: Option<Secret<String>>) -> Self {
        Self {
            client,
            api_base,
            api_key,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn summaries_url(&self) -> Result<Url> {
        let raw = format!(
            "{}/{}",
            self.api_base.as_str().trim_end_matches('/'),
            PLAYER_SUMMARIES_PATH
        );
        Url::parse(&raw).map_err(|e| Error::InvalidUrl(format!("{raw}: {e}")))
    }

    /// Fetch the canonical profile for a verified identity.
    ///
    /// - `Err(_)`: the request never reached the provider's data (no API
    ///   key, transport failure, rejected key, unreadable body)
    /// - `Ok(None)`: the provider answered but has no player for this id
    /// - `Ok(Some(_))`: first player record, optional fields left `None`
    ///   when absent
    pub async fn fetch(&self, identity: &VerifiedIdentity) -> Result<Option<CanonicalProfile>> {
        let api_key = self.api_key.as_ref().ok_or(Error::MissingApiKey)?;
        let steam_id = identity.provider_user_id();

        let response = self
            .client
            .get(self.summaries_url()?)
            .timeout(self.timeout)
            .query(&[("key", api_key.expose().as_str()), ("steamids", steam_id)])
            .send()
            .await
            .map_err(|e| Error::Http(format!("player summaries request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Status(status.as_u16()));
        }

        let envelope = response
            .json::<SummariesEnvelope>()
            .await
            .map_err(|e| Error::Decode(e.to_string()))?;

        let Some(player) = envelope.response.players.into_iter().next() else {
            debug!(steam_id, "player summaries returned no players");
            return Ok(None);
        };

        Ok(Some(CanonicalProfile {
            provider_user_id: steam_id.to_string(),
            display_name: player.personaname,
            avatar_url: player.avatarfull,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::Query;
    use axum::http::StatusCode;
    use axum::routing::get;
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};
    use tokio::net::TcpListener;

    type Seen = Arc<Mutex<Vec<HashMap<String, String>>>>;

    const STEAM_ID: &str = "76561198000000001";

    /// Start a mock Web API that records query strings and returns a fixed body.
    async fn start_api(status: StatusCode, body: serde_json::Value) -> (Url, Seen) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let seen: Seen = Arc::new(Mutex::new(Vec::new()));

        let recorder = seen.clone();
        let app = axum::Router::new().route(
            "/ISteamUser/GetPlayerSummaries/v2",
            get(move |Query(query): Query<HashMap<String, String>>| {
                let recorder = recorder.clone();
                let body = body.clone();
                async move {
                    recorder.lock().unwrap().push(query);
                    (status, axum::Json(body))
                }
            }),
        );
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        (Url::parse(&format!("http://{addr}")).unwrap(), seen)
    }

    fn fetcher(api_base: Url) -> ProfileFetcher {
        ProfileFetcher::new(
            reqwest::Client::new(),
            api_base,
            Some(Secret::new("test-api-key".to_string())),
        )
    }

    fn identity() -> VerifiedIdentity {
        VerifiedIdentity::new(STEAM_ID.to_string())
    }

    #[tokio::test]
    async fn maps_first_player() {
        let (base, seen) = start_api(
            StatusCode::OK,
            serde_json::json!({
                "response": {
                    "players": [
                        {
                            "steamid": STEAM_ID,
                            "personaname": "Alice",
                            "avatarfull": "https://x/a.jpg",
                            "avatar": "https://x/a_small.jpg",
                            "communityvisibilitystate": 3
                        },
                        { "personaname": "Mallory" }
                    ]
                }
            }),
        )
        .await;

        let profile = fetcher(base).fetch(&identity()).await.unwrap().unwrap();
        assert_eq!(
            profile,
            CanonicalProfile {
                provider_user_id: STEAM_ID.into(),
                display_name: Some("Alice".into()),
                avatar_url: Some("https://x/a.jpg".into()),
            }
        );

        let queries = seen.lock().unwrap();
        assert_eq!(queries[0]["key"], "test-api-key");
        assert_eq!(queries[0]["steamids"], STEAM_ID);
    }

    #[tokio::test]
    async fn missing_fields_stay_none() {
        let (base, _seen) = start_api(
            StatusCode::OK,
            serde_json::json!({ "response": { "players": [ { "steamid": STEAM_ID } ] } }),
        )
        .await;

        let profile = fetcher(base).fetch(&identity()).await.unwrap().unwrap();
        assert_eq!(profile.display_name, None);
        assert_eq!(profile.avatar_url, None);
    }

    #[tokio::test]
    async fn empty_player_list_is_absent() {
        let (base, _seen) = start_api(
            StatusCode::OK,
            serde_json::json!({ "response": { "players": [] } }),
        )
        .await;

        assert!(fetcher(base).fetch(&identity()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn missing_response_object_is_absent() {
        let (base, _seen) = start_api(StatusCode::OK, serde_json::json!({})).await;
        assert!(fetcher(base).fetch(&identity()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn rejected_key_is_an_error() {
        let (base, _seen) = start_api(StatusCode::FORBIDDEN, serde_json::json!({})).await;
        let result = fetcher(base).fetch(&identity()).await;
        assert!(matches!(result, Err(Error::Status(403))), "got {result:?}");
    }

    #[tokio::test]
    async fn missing_api_key_skips_the_request() {
        let (base, seen) = start_api(
            StatusCode::OK,
            serde_json::json!({ "response": { "players": [] } }),
        )
        .await;

        let fetcher = ProfileFetcher::new(reqwest::Client::new(), base, None);
        let result = fetcher.fetch(&identity()).await;
        assert!(matches!(result, Err(Error::MissingApiKey)));
        assert!(seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn unreachable_api_is_an_error() {
        // Bind then drop to get a port with nothing listening
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let base = Url::parse(&format!("http://{addr}")).unwrap();
        let result = fetcher(base).fetch(&identity()).await;
        assert!(matches!(result, Err(Error::Http(_))), "got {result:?}");
    }

    #[tokio::test]
    async fn slow_api_times_out() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let app = axum::Router::new().route(
            "/ISteamUser/GetPlayerSummaries/v2",
            get(|| async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                axum::Json(serde_json::json!({ "response": { "players": [] } }))
            }),
        );
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let base = Url::parse(&format!("http://{addr}")).unwrap();
        let result = fetcher(base)
            .with_timeout(Duration::from_millis(100))
            .fetch(&identity())
            .await;
        assert!(matches!(result, Err(Error::Http(_))), "got {result:?}");
    }

    #[tokio::test]
    async fn non_json_body_is_a_decode_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let app = axum::Router::new().route(
            "/ISteamUser/GetPlayerSummaries/v2",
            get(|| async { "<html>Service Unavailable</html>" }),
        );
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let base = Url::parse(&format!("http://{addr}")).unwrap();
        let result = fetcher(base).fetch(&identity()).await;
        assert!(matches!(result, Err(Error::Decode(_))), "got {result:?}");
    }

    #[test]
    fn summaries_url_joins_base() {
        let with_slash = fetcher(Url::parse("https://api.steampowered.com/").unwrap());
        assert_eq!(
            with_slash.summaries_url().unwrap().as_str(),
            "https://api.steampowered.com/ISteamUser/GetPlayerSummaries/v2"
        );
    }
}
