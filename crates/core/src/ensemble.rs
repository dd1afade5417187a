//! Merges heterogeneous signal generator output into one recommendation per
//! item: scores sum, reasons concatenate in generator run order, confidence
//! takes the maximum, and the source tag collapses to `hybrid` once more
//! than one generator contributed.

use std::collections::HashMap;

use crate::domain::recommendation::Recommendation;
use crate::domain::recommendation::SourceTag;

pub fn combine(batches: Vec<Vec<Recommendation>>) -> Vec<Recommendation> {
    let mut merged: HashMap<String, Recommendation> = HashMap::new();
    let mut order: Vec<String> = Vec::new();

    for batch in batches {
        for rec in batch {
            match merged.get_mut(&rec.item_id) {
                Some(existing) => {
                    existing.score += rec.score;
                    existing.reasons.extend(rec.reasons);
                    existing.confidence = existing.confidence.max(rec.confidence);
                    if existing.source != rec.source {
                        existing.source = SourceTag::Hybrid;
                    }
                }
                None => {
                    order.push(rec.item_id.clone());
                    merged.insert(rec.item_id.clone(), rec);
                }
            }
        }
    }

    order.into_iter().filter_map(|id| merged.remove(&id)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::recommendation::ConfidenceBucket;

    fn rec(id: &str, score: f64, reason: &str, source: SourceTag) -> Recommendation {
        Recommendation::new(id, score, reason.to_string(), source, 0.5)
    }

    #[test]
    fn scores_add_and_tag_goes_hybrid() {
        let combined = combine(vec![
            vec![rec("x", 12.0, "collab", SourceTag::Collaborative)],
            vec![rec("x", 8.0, "basket", SourceTag::MarketBasket)],
        ]);

        assert_eq!(combined.len(), 1);
        assert!((combined[0].score - 20.0).abs() < 1e-9);
        assert_eq!(combined[0].source, SourceTag::Hybrid);
        assert_eq!(combined[0].reasons, vec!["collab".to_string(), "basket".to_string()]);
    }

    #[test]
    fn single_contributor_keeps_its_tag() {
        let combined = combine(vec![vec![rec("x", 1.0, "only", SourceTag::Search)], Vec::new()]);
        assert_eq!(combined[0].source, SourceTag::Search);
    }

    #[test]
    fn confidence_takes_the_maximum() {
        let mut low = rec("x", 0.1, "a", SourceTag::Contextual);
        low.confidence = ConfidenceBucket::Low;
        let mut high = rec("x", 0.9, "b", SourceTag::Collaborative);
        high.confidence = ConfidenceBucket::VeryHigh;

        let combined = combine(vec![vec![low], vec![high]]);
        assert_eq!(combined[0].confidence, ConfidenceBucket::VeryHigh);
    }

    #[test]
    fn first_seen_order_is_preserved() {
        let combined = combine(vec![
            vec![rec("a", 1.0, "r", SourceTag::Search), rec("b", 2.0, "r", SourceTag::Search)],
            vec![rec("c", 3.0, "r", SourceTag::Contextual)],
        ]);
        let ids: Vec<_> = combined.iter().map(|r| r.item_id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }
}
