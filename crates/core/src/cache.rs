//! Session-scoped ranking cache. A ranking computed once at page load must
//! not visibly reorder while the visitor scrolls or hovers, so hits return
//! the stored order verbatim for the whole TTL window. Entries are replaced
//! wholesale, never patched; last writer wins.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};

use crate::domain::interaction::PageContext;
use crate::domain::recommendation::Recommendation;

/// Stable identity of one ranking call: the page surface, what it is looking
/// at, and how many candidates were in play.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub page: PageContext,
    pub identity: String,
    pub candidate_count: usize,
}

impl CacheKey {
    pub fn new(page: PageContext, identity: impl Into<String>, candidate_count: usize) -> Self {
        Self { page, identity: identity.into(), candidate_count }
    }

    pub fn signature(&self) -> String {
        format!("{}:{}:{}", self.page.as_str(), self.identity, self.candidate_count)
    }
}

#[derive(Clone, Debug)]
struct CacheEntry {
    recommendations: Vec<Recommendation>,
    created_at: DateTime<Utc>,
    ttl: Duration,
}

impl CacheEntry {
    fn fresh_at(&self, now: DateTime<Utc>) -> bool {
        now - self.created_at < self.ttl
    }
}

/// Explicit cache object owned by the session, passed by reference to the
/// engine rather than living as ambient global state.
#[derive(Clone, Debug)]
pub struct RankingCache {
    entries: HashMap<CacheKey, CacheEntry>,
    ttl: Duration,
}

impl RankingCache {
    pub fn new(ttl_ms: u64) -> Self {
        Self { entries: HashMap::new(), ttl: Duration::milliseconds(ttl_ms as i64) }
    }

    pub fn get(&self, key: &CacheKey, now: DateTime<Utc>) -> Option<Vec<Recommendation>> {
        let entry = self.entries.get(key)?;
        if entry.fresh_at(now) {
            Some(entry.recommendations.clone())
        } else {
            None
        }
    }

    pub fn put(&mut self, key: CacheKey, recommendations: Vec<Recommendation>, now: DateTime<Utc>) {
        self.entries.insert(key, CacheEntry { recommendations, created_at: now, ttl: self.ttl });
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
