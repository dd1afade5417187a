//! The orchestrator: session logs in, ranked recommendations out.
//!
//! Each call walks the same pipeline: resolve candidates, apply hard
//! filters, pick a strategy, run the signal generators, combine, cache,
//! assemble. Standard user-chosen sorts bypass scoring entirely.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::assemble::{assemble, assemble_standard_sort, RankedResult, Strategy};
use crate::behavior::{
    aggregate, BehaviorProfile, DebounceGate, InteractionLog, IntentClassification, RuleClassifier,
};
use crate::cache::{CacheKey, RankingCache};
use crate::config::EngineConfig;
use crate::domain::catalog::CatalogReader;
use crate::domain::interaction::{InteractionEvent, PageContext};
use crate::ensemble::combine;
use crate::filters::FilterContext;
use crate::signals::{RankingContext, SignalGenerator};

/// Sort criteria that skip scoring and return catalog order directly.
const STANDARD_SORTS: &[&str] = &["price-asc", "price-desc", "title-asc", "created-desc"];

#[derive(Clone, Debug, Default)]
pub struct RecommendationRequest {
    pub session_id: Option<String>,
    pub page: PageContext,
    pub anchor_id: Option<String>,
    pub collection_handle: Option<String>,
    pub search_query: Option<String>,
    pub sort: Option<String>,
    pub filters: FilterContext,
    pub limit: Option<usize>,
}

struct SessionState {
    log: InteractionLog,
    profile: BehaviorProfile,
    classification: Option<IntentClassification>,
    debounce: DebounceGate,
}

impl SessionState {
    fn new(debounce_ms: u64) -> Self {
        Self {
            log: InteractionLog::new(),
            profile: BehaviorProfile::default(),
            classification: None,
            debounce: DebounceGate::new(debounce_ms),
        }
    }
}

pub struct RecommendationEngine {
    config: EngineConfig,
    catalog: Arc<dyn CatalogReader>,
    signals: Vec<Box<dyn SignalGenerator>>,
    classifier: RuleClassifier,
    cache: RankingCache,
    sessions: HashMap<String, SessionState>,
}

impl RecommendationEngine {
    pub fn new(
        config: EngineConfig,
        catalog: Arc<dyn CatalogReader>,
        signals: Vec<Box<dyn SignalGenerator>>,
    ) -> Self {
        let classifier = RuleClassifier::new(config.classifier.clone());
        let cache = RankingCache::new(config.cache_ttl_ms);
        Self { config, catalog, signals, classifier, cache, sessions: HashMap::new() }
    }

    /// Appends an event to the session log. Returns true when the debounce
    /// window elapsed and the profile was recomputed on this call.
    pub fn record_event(
        &mut self,
        session_id: &str,
        event: InteractionEvent,
        now: DateTime<Utc>,
    ) -> bool {
        let debounce_ms = self.config.debounce_ms;
        let session = self
            .sessions
            .entry(session_id.to_string())
            .or_insert_with(|| SessionState::new(debounce_ms));
        session.log.record(event);

        if session.debounce.notify(now) {
            Self::recompute(session, &self.classifier);
            let interactions = session.log.len();
            debug!(session_id, interactions, "profile recomputed");
            return true;
        }
        false
    }

    /// Flushes a recomputation deferred by the debounce gate, if one is due.
    pub fn flush_pending(&mut self, session_id: &str, now: DateTime<Utc>) -> bool {
        let Some(session) = self.sessions.get_mut(session_id) else {
            return false;
        };
        if session.debounce.take_pending(now) {
            Self::recompute(session, &self.classifier);
            return true;
        }
        false
    }

    fn recompute(session: &mut SessionState, classifier: &RuleClassifier) {
        session.profile = aggregate(session.log.events());
        session.classification = Some(classifier.classify(&session.profile));
    }

    /// Profile and classification for a session, computed on demand so the
    /// analysis endpoint never observes a stale debounced state.
    pub fn analyze(
        &mut self,
        session_id: &str,
        events: Vec<InteractionEvent>,
    ) -> (BehaviorProfile, IntentClassification) {
        let debounce_ms = self.config.debounce_ms;
        let session = self
            .sessions
            .entry(session_id.to_string())
            .or_insert_with(|| SessionState::new(debounce_ms));
        for event in events {
            session.log.record(event);
        }
        Self::recompute(session, &self.classifier);
        let profile = session.profile.clone();
        let classification = session
            .classification
            .clone()
            .unwrap_or_else(|| self.classifier.classify(&profile));
        (profile, classification)
    }

    /// Replaces the rule-derived classification with one from an external
    /// inference provider. The session keeps its log and profile.
    pub fn apply_classification(&mut self, session_id: &str, classification: IntentClassification) {
        let debounce_ms = self.config.debounce_ms;
        let session = self
            .sessions
            .entry(session_id.to_string())
            .or_insert_with(|| SessionState::new(debounce_ms));
        session.classification = Some(classification);
    }

    pub fn profile(&self, session_id: &str) -> Option<&BehaviorProfile> {
        self.sessions.get(session_id).map(|session| &session.profile)
    }

    pub fn recommend(
        &mut self,
        request: &RecommendationRequest,
        now: DateTime<Utc>,
    ) -> RankedResult {
        let limit = request
            .limit
            .unwrap_or(self.config.default_limit)
            .min(self.config.max_limit)
            .max(1);

        let mut candidates = match &request.collection_handle {
            Some(handle) => self.catalog.collection(handle),
            None => self.catalog.all(),
        };
        let total_candidates = candidates.len();
        candidates = request.filters.apply(candidates);

        // An anchor missing from the catalog degrades to anchorless ranking;
        // the anchor-driven signals simply contribute nothing.
        let anchor = match &request.anchor_id {
            Some(id) => {
                let item = self.catalog.item(id);
                if item.is_none() {
                    debug!(anchor_id = %id, "anchor not in catalog, ranking without it");
                }
                item
            }
            None => None,
        };

        if let Some(sort) = request.sort.as_deref() {
            if STANDARD_SORTS.contains(&sort) {
                info!(sort, returned = candidates.len().min(limit), "standard sort bypass");
                return assemble_standard_sort(&candidates, sort, limit, now);
            }
        }

        if candidates.is_empty() {
            return assemble(Vec::new(), Strategy::Fallback, total_candidates, limit, now);
        }

        let session = request.session_id.as_deref().and_then(|id| self.sessions.get(id));
        let profile = session.map(|state| state.profile.clone());
        let intent = session.and_then(|state| state.classification.clone());

        let ctx = RankingContext {
            page: request.page,
            anchor,
            collection_handle: request.collection_handle.clone(),
            search_query: request.search_query.clone(),
            interacted_items: session
                .map(|state| {
                    state
                        .log
                        .events()
                        .iter()
                        .filter(|event| event.kind.is_engagement())
                        .filter_map(|event| event.product_id.clone())
                        .collect()
                })
                .unwrap_or_default(),
            intent,
        };

        let strategy = self.select_strategy(request, profile.as_ref());
        let key = cache_key(request, &ctx, candidates.len());

        if let Some(cached) = self.cache.get(&key, now) {
            debug!(key = %key.signature(), "ranking cache hit");
            return assemble(cached, strategy, total_candidates, limit, now);
        }

        let batches: Vec<_> = self
            .signals
            .iter()
            .map(|signal| {
                let batch = signal.generate(&candidates, &ctx, profile.as_ref());
                debug!(signal = signal.name(), emitted = batch.len(), "signal evaluated");
                batch
            })
            .collect();

        let candidate_ids: std::collections::BTreeSet<&str> =
            candidates.iter().map(|item| item.id.as_str()).collect();
        let anchor_id = ctx.anchor_id().map(str::to_string);
        let mut combined = combine(batches);
        combined.retain(|rec| {
            candidate_ids.contains(rec.item_id.as_str())
                && anchor_id.as_deref() != Some(rec.item_id.as_str())
        });

        self.cache.put(key, combined.clone(), now);

        info!(
            strategy = strategy.as_str(),
            total_candidates,
            scored = combined.len(),
            "ranking computed"
        );
        assemble(combined, strategy, total_candidates, limit, now)
    }

    fn select_strategy(
        &self,
        request: &RecommendationRequest,
        profile: Option<&BehaviorProfile>,
    ) -> Strategy {
        if request.search_query.as_deref().is_some_and(|q| !q.trim().is_empty()) {
            return Strategy::SearchOptimized;
        }
        if profile.is_some_and(|p| !p.is_empty()) {
            return Strategy::AiPersonalized;
        }
        if request.collection_handle.is_some() || request.page == PageContext::Collection {
            return Strategy::CollectionContextual;
        }
        Strategy::Fallback
    }
}

fn cache_key(request: &RecommendationRequest, ctx: &RankingContext, count: usize) -> CacheKey {
    let identity = [
        request.session_id.as_deref().unwrap_or("-"),
        ctx.anchor_id().unwrap_or("-"),
        request.collection_handle.as_deref().unwrap_or("-"),
        request.search_query.as_deref().unwrap_or("-"),
    ]
    .join("|");
    CacheKey::new(request.page, identity, count)
}
