//! Independent signal generators. Each scores the candidate set against the
//! current page context with its own units and weight; the ensemble combiner
//! merges them into one comparable score. Generators are pure and share no
//! mutable state, so they may run in any order or concurrently.

mod basket;
mod behavioral;
mod collaborative;
mod contextual;
mod search;

use std::collections::BTreeSet;

pub use basket::MarketBasketEngine;
pub use behavioral::BehavioralRecommender;
pub use collaborative::CollaborativeFilter;
pub use contextual::ContextualBooster;
pub use search::SearchRelevanceScorer;

use crate::behavior::{BehaviorProfile, IntentClassification};
use crate::domain::catalog::CatalogItem;
use crate::domain::interaction::PageContext;
use crate::domain::recommendation::Recommendation;

/// Weight applied to raw similarity scores.
pub const COLLABORATIVE_WEIGHT: f64 = 0.4;
/// Weight applied to `confidence * lift` for basket rules.
pub const BASKET_WEIGHT: f64 = 0.3;
/// Weight applied to curated behavioral base scores.
pub const BEHAVIORAL_WEIGHT: f64 = 0.3;
/// Query tokens shorter than this are ignored by the search scorer.
pub const MIN_SEARCH_TOKEN_LEN: usize = 3;

/// Everything a generator may consult about the current ranking call beyond
/// the candidate set itself. Read-only.
#[derive(Clone, Debug, Default)]
pub struct RankingContext {
    pub page: PageContext,
    /// The product currently being viewed, when on a product page.
    pub anchor: Option<CatalogItem>,
    pub collection_handle: Option<String>,
    pub search_query: Option<String>,
    /// Item ids the visitor viewed, carted, or wishlisted this session.
    pub interacted_items: BTreeSet<String>,
    pub intent: Option<IntentClassification>,
}

impl RankingContext {
    pub fn anchor_id(&self) -> Option<&str> {
        self.anchor.as_ref().map(|item| item.id.as_str())
    }
}

/// The shared scoring interface: candidates in, weak-signal
/// recommendations out. Implementations must not mutate inputs.
pub trait SignalGenerator: Send + Sync {
    fn name(&self) -> &'static str;

    fn generate(
        &self,
        candidates: &[CatalogItem],
        ctx: &RankingContext,
        profile: Option<&BehaviorProfile>,
    ) -> Vec<Recommendation>;
}
