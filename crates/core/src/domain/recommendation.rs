use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// A scored catalog item produced by one signal generator and merged by the
/// ensemble combiner. `score` is an unbounded real; higher is better.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub item_id: String,
    pub score: f64,
    /// Human-readable reasons in the order the contributing generators ran.
    pub reasons: Vec<String>,
    pub source: SourceTag,
    pub confidence: ConfidenceBucket,
}

impl Recommendation {
    /// `relevance` is the generator's own normalized 0-1 reliability estimate
    /// for this pick. Score scales differ per generator, so the confidence
    /// bucket is banded from `relevance` rather than from `score`.
    pub fn new(
        item_id: impl Into<String>,
        score: f64,
        reason: String,
        source: SourceTag,
        relevance: f64,
    ) -> Self {
        Self {
            item_id: item_id.into(),
            score,
            reasons: vec![reason],
            source,
            confidence: ConfidenceBucket::from_score(relevance.clamp(0.0, 1.0)),
        }
    }
}

/// Which scoring strategy produced a recommendation. Becomes `hybrid` once
/// more than one generator contributed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceTag {
    Collaborative,
    MarketBasket,
    Behavioral,
    Search,
    Contextual,
    Hybrid,
}

impl SourceTag {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Collaborative => "collaborative",
            Self::MarketBasket => "market_basket",
            Self::Behavioral => "behavioral",
            Self::Search => "search",
            Self::Contextual => "contextual",
            Self::Hybrid => "hybrid",
        }
    }
}

/// Coarse display-only reliability band. Never used for ranking math.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceBucket {
    /// Reserved for the standard-sort bypass where scoring is skipped.
    None,
    Low,
    Medium,
    High,
    VeryHigh,
}

impl ConfidenceBucket {
    /// Bands a normalized 0-1 relevance estimate.
    pub fn from_score(score: f64) -> Self {
        if score >= 0.85 {
            Self::VeryHigh
        } else if score >= 0.65 {
            Self::High
        } else if score >= 0.45 {
            Self::Medium
        } else {
            Self::Low
        }
    }
}

/// Precomputed market-basket rule: antecedent items imply consequent items.
/// Static reference data, loaded once, read-only.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AssociationRule {
    pub antecedent: BTreeSet<String>,
    pub consequent: BTreeSet<String>,
    pub support: f64,
    pub confidence: f64,
    pub lift: f64,
}

impl AssociationRule {
    /// True when every antecedent item appears in the interacted set.
    pub fn applies_to(&self, interacted: &BTreeSet<String>) -> bool {
        self.antecedent.is_subset(interacted)
    }
}

/// Item-to-item similarity from collaborative filtering. Static, read-only.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SimilarityEdge {
    pub from_item: String,
    pub to_item: String,
    /// 0.0 - 1.0
    pub similarity: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn confidence_banding() {
        assert_eq!(ConfidenceBucket::from_score(0.9), ConfidenceBucket::VeryHigh);
        assert_eq!(ConfidenceBucket::from_score(0.7), ConfidenceBucket::High);
        assert_eq!(ConfidenceBucket::from_score(0.5), ConfidenceBucket::Medium);
        assert_eq!(ConfidenceBucket::from_score(0.1), ConfidenceBucket::Low);
    }

    #[test]
    fn confidence_buckets_order_for_max_merge() {
        assert!(ConfidenceBucket::VeryHigh > ConfidenceBucket::High);
        assert!(ConfidenceBucket::Low > ConfidenceBucket::None);
    }

    #[test]
    fn association_rule_subset_check() {
        let rule = AssociationRule {
            antecedent: BTreeSet::from(["a".to_string(), "b".to_string()]),
            consequent: BTreeSet::from(["c".to_string()]),
            support: 0.1,
            confidence: 0.6,
            lift: 1.4,
        };
        let full = BTreeSet::from(["a".to_string(), "b".to_string(), "x".to_string()]);
        let partial = BTreeSet::from(["a".to_string()]);
        assert!(rule.applies_to(&full));
        assert!(!rule.applies_to(&partial));
    }
}
