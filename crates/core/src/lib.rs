pub mod assemble;
pub mod behavior;
pub mod cache;
pub mod config;
pub mod domain;
pub mod engine;
pub mod ensemble;
pub mod errors;
pub mod filters;
pub mod seed;
pub mod signals;

pub use assemble::{
    assemble, assemble_standard_sort, RankedRecommendation, RankedResult, RankingMetadata,
    Strategy,
};
pub use behavior::{
    aggregate, BehaviorProfile, ClassifierThresholds, DebounceGate, IntentClassification,
    IntentLabel, InteractionLog, RuleClassifier,
};
pub use cache::{CacheKey, RankingCache};
pub use domain::catalog::{CatalogItem, CatalogReader, InMemoryCatalog, Variant};
pub use domain::interaction::{InteractionEvent, InteractionKind, PageContext};
pub use domain::recommendation::{
    AssociationRule, ConfidenceBucket, Recommendation, SimilarityEdge, SourceTag,
};
pub use engine::{RecommendationEngine, RecommendationRequest};
pub use ensemble::combine;
pub use errors::{ApplicationError, DomainError, InterfaceError};
pub use filters::FilterContext;
pub use signals::{
    BehavioralRecommender, CollaborativeFilter, ContextualBooster, MarketBasketEngine,
    RankingContext, SearchRelevanceScorer, SignalGenerator,
};
