//! Final assembly: sort by score, assign ranks, truncate, and attach the
//! summary metadata callers use for observability.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::catalog::CatalogItem;
use crate::domain::recommendation::{ConfidenceBucket, Recommendation, SourceTag};

/// Scores at or above this bucket count as "high confidence" in metadata.
pub const HIGH_CONFIDENCE_BUCKET: ConfidenceBucket = ConfidenceBucket::High;

/// Named approach that produced a ranking, reported for observability.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Strategy {
    AiPersonalized,
    SearchOptimized,
    CollectionContextual,
    Fallback,
    /// A plain user-chosen sort; scoring was deliberately bypassed.
    Standard(String),
}

impl Strategy {
    pub fn standard(criterion: &str) -> Self {
        Self::Standard(format!("standard-{criterion}"))
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::AiPersonalized => "ai-personalized",
            Self::SearchOptimized => "search-optimized",
            Self::CollectionContextual => "collection-contextual",
            Self::Fallback => "fallback",
            Self::Standard(name) => name,
        }
    }
}

/// One ranked output row.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RankedRecommendation {
    pub rank: u32,
    #[serde(flatten)]
    pub recommendation: Recommendation,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RankingMetadata {
    pub strategy: String,
    pub total_candidates: usize,
    pub returned: usize,
    pub high_confidence: usize,
    pub per_source: HashMap<String, usize>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RankedResult {
    pub recommendations: Vec<RankedRecommendation>,
    pub metadata: RankingMetadata,
}

/// Sorts descending by score, assigns 1-based ranks, truncates to `limit`.
pub fn assemble(
    mut recommendations: Vec<Recommendation>,
    strategy: Strategy,
    total_candidates: usize,
    limit: usize,
    now: DateTime<Utc>,
) -> RankedResult {
    recommendations
        .sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
    recommendations.truncate(limit);

    let mut per_source: HashMap<String, usize> = HashMap::new();
    let mut high_confidence = 0;
    for rec in &recommendations {
        *per_source.entry(rec.source.as_str().to_string()).or_insert(0) += 1;
        if rec.confidence >= HIGH_CONFIDENCE_BUCKET {
            high_confidence += 1;
        }
    }

    let ranked = recommendations
        .into_iter()
        .enumerate()
        .map(|(index, recommendation)| RankedRecommendation {
            rank: index as u32 + 1,
            recommendation,
        })
        .collect::<Vec<_>>();

    RankedResult {
        metadata: RankingMetadata {
            strategy: strategy.as_str().to_string(),
            total_candidates,
            returned: ranked.len(),
            high_confidence,
            per_source,
            timestamp: now,
        },
        recommendations: ranked,
    }
}

/// The deliberate scoring bypass for plain user-chosen sorts: all items, in
/// the chosen order, score 0, confidence `none`.
pub fn assemble_standard_sort(
    items: &[CatalogItem],
    criterion: &str,
    limit: usize,
    now: DateTime<Utc>,
) -> RankedResult {
    let mut ordered: Vec<&CatalogItem> = items.iter().collect();
    match criterion {
        "price-asc" => {
            ordered.sort_by(|a, b| a.price.partial_cmp(&b.price).unwrap_or(std::cmp::Ordering::Equal));
        }
        "price-desc" => {
            ordered.sort_by(|a, b| b.price.partial_cmp(&a.price).unwrap_or(std::cmp::Ordering::Equal));
        }
        "title-asc" => ordered.sort_by(|a, b| a.title.cmp(&b.title)),
        "created-desc" => ordered.sort_by(|a, b| b.published_at.cmp(&a.published_at)),
        _ => {}
    }

    let recommendations = ordered
        .into_iter()
        .map(|item| Recommendation {
            item_id: item.id.clone(),
            score: 0.0,
            reasons: Vec::new(),
            source: SourceTag::Contextual,
            confidence: ConfidenceBucket::None,
        })
        .collect();

    // sort_by is stable, so equal zero scores keep the chosen order.
    let mut result =
        assemble(recommendations, Strategy::standard(criterion), items.len(), limit, now);
    result.metadata.high_confidence = 0;
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(id: &str, score: f64) -> Recommendation {
        Recommendation::new(id, score, "r".to_string(), SourceTag::Search, 0.5)
    }

    #[test]
    fn ranks_are_one_based_and_score_ordered() {
        let result = assemble(
            vec![rec("low", 1.0), rec("high", 9.0), rec("mid", 5.0)],
            Strategy::SearchOptimized,
            3,
            10,
            Utc::now(),
        );

        let ordered: Vec<_> = result
            .recommendations
            .iter()
            .map(|row| (row.rank, row.recommendation.item_id.as_str()))
            .collect();
        assert_eq!(ordered, vec![(1, "high"), (2, "mid"), (3, "low")]);
        assert_eq!(result.metadata.strategy, "search-optimized");
    }

    #[test]
    fn truncation_honours_the_limit() {
        let result = assemble(
            vec![rec("a", 3.0), rec("b", 2.0), rec("c", 1.0)],
            Strategy::AiPersonalized,
            3,
            2,
            Utc::now(),
        );
        assert_eq!(result.recommendations.len(), 2);
        assert_eq!(result.metadata.returned, 2);
        assert_eq!(result.metadata.total_candidates, 3);
    }

    #[test]
    fn per_source_counts_reflect_truncated_output() {
        let mut collab = rec("a", 3.0);
        collab.source = SourceTag::Collaborative;
        let result = assemble(
            vec![collab, rec("b", 2.0)],
            Strategy::AiPersonalized,
            2,
            10,
            Utc::now(),
        );
        assert_eq!(result.metadata.per_source.get("collaborative"), Some(&1));
        assert_eq!(result.metadata.per_source.get("search"), Some(&1));
    }

    #[test]
    fn standard_sort_bypasses_scoring() {
        let items = vec![
            catalog_item("dear", 90.0),
            catalog_item("cheap", 10.0),
            catalog_item("mid", 40.0),
        ];
        let result = assemble_standard_sort(&items, "price-asc", 10, Utc::now());

        let ids: Vec<_> = result
            .recommendations
            .iter()
            .map(|row| row.recommendation.item_id.as_str())
            .collect();
        assert_eq!(ids, vec!["cheap", "mid", "dear"]);
        assert_eq!(result.metadata.strategy, "standard-price-asc");
        assert!(result
            .recommendations
            .iter()
            .all(|row| row.recommendation.score == 0.0
                && row.recommendation.confidence == ConfidenceBucket::None));
    }

    fn catalog_item(id: &str, price: f64) -> CatalogItem {
        CatalogItem {
            id: id.to_string(),
            title: id.to_string(),
            description: String::new(),
            product_type: String::new(),
            vendor: String::new(),
            tags: Default::default(),
            price,
            compare_at_price: None,
            published_at: None,
            variants: Vec::new(),
            available: true,
            collections: Default::default(),
        }
    }
}
