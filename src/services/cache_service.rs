//! Query cache for wallet API responses
//!
//! Responses are keyed by (chat user, query) and carry the tags their query
//! provides. A successful mutation invalidates a tag, which evicts every entry
//! carrying it so the next read goes back to the API.

use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::debug;

use crate::api::wallet::{TransactionSummary, WalletUser};

/// Provided by the transaction summary, invalidated by every money movement
pub const TAG_DEPOSIT: &str = "DEPOSIT";
/// Provided by profile and directory reads, invalidated by profile changes and logout
pub const TAG_USER: &str = "USER";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryName {
    TransactionSummary,
    AllUsers,
    UserInfo,
}

impl QueryName {
    pub fn provides_tags(&self) -> &'static [&'static str] {
        match self {
            QueryName::TransactionSummary => &[TAG_DEPOSIT],
            QueryName::AllUsers | QueryName::UserInfo => &[TAG_USER],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct QueryKey {
    /// Chat user the response belongs to
    pub scope: u64,
    pub query: QueryName,
}

impl QueryKey {
    pub fn new(scope: u64, query: QueryName) -> Self {
        Self { scope, query }
    }
}

#[derive(Debug, Clone)]
pub enum CachedResponse {
    Summary(TransactionSummary),
    Users(Vec<WalletUser>),
    Profile(WalletUser),
}

/// Typed view over a cached response
pub trait Cacheable: Sized + Clone {
    const QUERY: QueryName;

    fn into_cached(self) -> CachedResponse;
    fn from_cached(cached: &CachedResponse) -> Option<Self>;
}

impl Cacheable for TransactionSummary {
    const QUERY: QueryName = QueryName::TransactionSummary;

    fn into_cached(self) -> CachedResponse {
        CachedResponse::Summary(self)
    }

    fn from_cached(cached: &CachedResponse) -> Option<Self> {
        match cached {
            CachedResponse::Summary(summary) => Some(summary.clone()),
            _ => None,
        }
    }
}

impl Cacheable for Vec<WalletUser> {
    const QUERY: QueryName = QueryName::AllUsers;

    fn into_cached(self) -> CachedResponse {
        CachedResponse::Users(self)
    }

    fn from_cached(cached: &CachedResponse) -> Option<Self> {
        match cached {
            CachedResponse::Users(users) => Some(users.clone()),
            _ => None,
        }
    }
}

impl Cacheable for WalletUser {
    const QUERY: QueryName = QueryName::UserInfo;

    fn into_cached(self) -> CachedResponse {
        CachedResponse::Profile(self)
    }

    fn from_cached(cached: &CachedResponse) -> Option<Self> {
        match cached {
            CachedResponse::Profile(user) => Some(user.clone()),
            _ => None,
        }
    }
}

struct CacheEntry {
    response: CachedResponse,
    tags: &'static [&'static str],
    fetched_at: Instant,
}

pub struct QueryCache {
    entries: RwLock<HashMap<QueryKey, CacheEntry>>,
    ttl: Duration,
}

impl QueryCache {
    pub const DEFAULT_TTL: Duration = Duration::from_secs(60);

    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    /// Last known response for `scope`, if present and younger than the TTL
    pub async fn get<T: Cacheable>(&self, scope: u64) -> Option<T> {
        let key = QueryKey::new(scope, T::QUERY);
        let entries = self.entries.read().await;
        let entry = entries.get(&key)?;

        if entry.fetched_at.elapsed() >= self.ttl {
            debug!("Cache entry {:?} is stale", key);
            return None;
        }

        T::from_cached(&entry.response)
    }

    pub async fn insert<T: Cacheable>(&self, scope: u64, value: T) {
        let key = QueryKey::new(scope, T::QUERY);
        let entry = CacheEntry {
            response: value.into_cached(),
            tags: T::QUERY.provides_tags(),
            fetched_at: Instant::now(),
        };
        self.entries.write().await.insert(key, entry);
    }

    /// Evict every entry carrying `tag`; returns how many were evicted
    pub async fn invalidate(&self, tag: &str) -> usize {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, entry| !entry.tags.iter().any(|t| *t == tag));
        let evicted = before - entries.len();
        debug!("Invalidated tag {} ({} entries evicted)", tag, evicted);
        evicted
    }

    /// Evict everything belonging to one chat user
    pub async fn invalidate_scope(&self, scope: u64) -> usize {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|key, _| key.scope != scope);
        before - entries.len()
    }

    pub async fn contains(&self, key: QueryKey) -> bool {
        self.entries.read().await.contains_key(&key)
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }
}

impl Default for QueryCache {
    fn default() -> Self {
        Self::new(Self::DEFAULT_TTL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn user(id: &str) -> WalletUser {
        WalletUser {
            id: id.to_string(),
            name: format!("User {}", id),
            email: format!("{}@example.com", id),
            phone: None,
            role: Some("USER".to_string()),
            created_at: None,
        }
    }

    fn summary(cash_in: i64) -> TransactionSummary {
        let mut summary = TransactionSummary::default();
        summary.cash_in.amount = Decimal::from(cash_in);
        summary
    }

    #[tokio::test]
    async fn test_get_returns_what_was_inserted() {
        let cache = QueryCache::default();
        cache.insert(7, summary(900)).await;

        let cached: TransactionSummary = cache.get(7).await.unwrap();
        assert_eq!(cached.cash_in.amount, Decimal::from(900));
        assert!(cache.get::<TransactionSummary>(8).await.is_none());
        assert!(cache.get::<WalletUser>(7).await.is_none());
    }

    #[tokio::test]
    async fn test_invalidate_evicts_only_tagged_entries() {
        let cache = QueryCache::default();
        cache.insert(1, summary(100)).await;
        cache.insert(2, summary(200)).await;
        cache.insert(1, vec![user("a"), user("b")]).await;
        cache.insert(1, user("a")).await;

        assert_eq!(cache.invalidate(TAG_DEPOSIT).await, 2);
        assert_eq!(cache.len().await, 2);
        assert!(!cache.contains(QueryKey::new(1, QueryName::TransactionSummary)).await);
        assert!(cache.contains(QueryKey::new(1, QueryName::AllUsers)).await);

        assert_eq!(cache.invalidate(TAG_USER).await, 2);
        assert_eq!(cache.len().await, 0);
        assert_eq!(cache.invalidate(TAG_USER).await, 0);
    }

    #[tokio::test]
    async fn test_invalidate_scope_keeps_other_users() {
        let cache = QueryCache::default();
        cache.insert(1, summary(100)).await;
        cache.insert(1, user("a")).await;
        cache.insert(2, summary(200)).await;

        assert_eq!(cache.invalidate_scope(1).await, 2);
        assert!(cache.get::<TransactionSummary>(2).await.is_some());
    }

    #[tokio::test]
    async fn test_stale_entries_are_not_served() {
        let cache = QueryCache::new(Duration::ZERO);
        cache.insert(1, summary(100)).await;
        assert!(cache.get::<TransactionSummary>(1).await.is_none());
        assert!(cache.contains(QueryKey::new(1, QueryName::TransactionSummary)).await);
    }
}
