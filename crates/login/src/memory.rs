//! In-process identity resolver
//!
//! Keeps local users in memory, keyed by SteamID64. Ids are assigned from a
//! counter starting at 1. Suitable for a single gateway instance and tests;
//! anything persistent implements `IdentityResolver` itself.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;

use steam_auth::{CanonicalProfile, VerifiedIdentity};
use tokio::sync::Mutex;
use tracing::debug;

use crate::error::ResolveError;
use crate::resolver::{IdentityResolver, ResolvedUser};

/// A local user record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalUser {
    pub id: i64,
    pub steam_id: String,
    pub username: Option<String>,
    pub avatar_url: Option<String>,
}

#[derive(Default)]
struct Users {
    by_steam_id: HashMap<String, LocalUser>,
    last_id: i64,
}

#[derive(Default)]
pub struct InMemoryResolver {
    users: Mutex<Users>,
}

impl InMemoryResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a user for `steam_id`, or refresh its profile fields.
    pub async fn upsert(&self, steam_id: &str, profile: &CanonicalProfile) -> LocalUser {
        let mut users = self.users.lock().await;

        if let Some(user) = users.by_steam_id.get_mut(steam_id) {
            user.username = profile.display_name.clone();
            user.avatar_url = profile.avatar_url.clone();
            debug!(user_id = user.id, steam_id, "updated local user profile");
            return user.clone();
        }

        users.last_id += 1;
        let user = LocalUser {
            id: users.last_id,
            steam_id: steam_id.to_string(),
            username: profile.display_name.clone(),
            avatar_url: profile.avatar_url.clone(),
        };
        users.by_steam_id.insert(steam_id.to_string(), user.clone());
        debug!(user_id = user.id, steam_id, "created local user");
        user
    }

    pub async fn get(&self, steam_id: &str) -> Option<LocalUser> {
        let users = self.users.lock().await;
        users.by_steam_id.get(steam_id).cloned()
    }

    pub async fn len(&self) -> usize {
        self.users.lock().await.by_steam_id.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

impl IdentityResolver for InMemoryResolver {
    fn resolve<'a>(
        &'a self,
        identity: &'a VerifiedIdentity,
        profile: &'a CanonicalProfile,
    ) -> Pin<Box<dyn Future<Output = Result<ResolvedUser, ResolveError>> + Send + 'a>> {
        Box::pin(async move {
            let user = self.upsert(identity.provider_user_id(), profile).await;
            Ok(ResolvedUser {
                user_id: user.id,
                display_name: user.username,
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn profile(steam_id: &str, name: Option<&str>) -> CanonicalProfile {
        CanonicalProfile {
            provider_user_id: steam_id.into(),
            display_name: name.map(Into::into),
            avatar_url: Some(format!("https://avatars.test/{steam_id}.jpg")),
        }
    }

    #[tokio::test]
    async fn repeated_upserts_keep_one_record() {
        let resolver = InMemoryResolver::new();

        let first = resolver
            .upsert("76561198000000001", &profile("76561198000000001", Some("Alice")))
            .await;
        let second = resolver
            .upsert("76561198000000001", &profile("76561198000000001", Some("Alice B")))
            .await;

        assert_eq!(first.id, second.id);
        assert_eq!(second.username.as_deref(), Some("Alice B"));
        assert_eq!(resolver.len().await, 1);
        assert_eq!(
            resolver.get("76561198000000001").await.unwrap().username.as_deref(),
            Some("Alice B")
        );
    }

    #[tokio::test]
    async fn distinct_identities_get_distinct_ids() {
        let resolver = InMemoryResolver::new();
        assert!(resolver.is_empty().await);

        let a = resolver.upsert("1", &profile("1", Some("a"))).await;
        let b = resolver.upsert("2", &profile("2", None)).await;

        assert_eq!(a.id, 1);
        assert_eq!(b.id, 2);
        assert_eq!(b.username, None);
    }

    #[tokio::test]
    async fn concurrent_upserts_for_one_identity() {
        let resolver = Arc::new(InMemoryResolver::new());

        let mut handles = vec![];
        for i in 0..10 {
            let resolver = resolver.clone();
            handles.push(tokio::spawn(async move {
                let name = format!("name-{i}");
                resolver
                    .upsert("42", &profile("42", Some(name.as_str())))
                    .await
                    .id
            }));
        }

        let mut ids = vec![];
        for h in handles {
            ids.push(h.await.unwrap());
        }

        assert!(ids.iter().all(|id| *id == ids[0]));
        assert_eq!(resolver.len().await, 1);
    }

    #[tokio::test]
    async fn unknown_user_is_none() {
        let resolver = InMemoryResolver::new();
        assert!(resolver.get("nobody").await.is_none());
    }
}
