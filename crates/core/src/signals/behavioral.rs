use crate::behavior::{BehaviorProfile, IntentLabel};
use crate::domain::catalog::CatalogItem;
use crate::domain::recommendation::{Recommendation, SourceTag};

use super::{RankingContext, SignalGenerator, BEHAVIORAL_WEIGHT};

/// Maximum items the curated slice emits per call.
const CURATED_LIMIT: usize = 6;

/// Maps the classified intent to a small curated candidate slice: trending
/// items for impulse buyers, premium items for researchers, discounted items
/// for the price sensitive, and a general slice otherwise.
#[derive(Clone, Copy, Debug, Default)]
pub struct BehavioralRecommender;

impl BehavioralRecommender {
    pub fn new() -> Self {
        Self
    }

    fn matches_label(item: &CatalogItem, label: IntentLabel) -> bool {
        match label {
            IntentLabel::ImpulseBuyer => item.has_tag("trending") || item.has_tag("popular"),
            IntentLabel::Researcher | IntentLabel::BrandLoyal => {
                item.has_tag("premium") || item.has_tag("detailed")
            }
            IntentLabel::PriceSensitive => {
                item.has_tag("sale")
                    || item.has_tag("value")
                    || item.compare_at_price.is_some_and(|compare| compare > item.price)
            }
            IntentLabel::Seasonal => item.has_tag("seasonal"),
            IntentLabel::BulkBuyer | IntentLabel::Browser => true,
        }
    }
}

impl SignalGenerator for BehavioralRecommender {
    fn name(&self) -> &'static str {
        "behavioral"
    }

    fn generate(
        &self,
        candidates: &[CatalogItem],
        ctx: &RankingContext,
        _profile: Option<&BehaviorProfile>,
    ) -> Vec<Recommendation> {
        let Some(intent) = &ctx.intent else {
            return Vec::new();
        };

        let mut curated: Vec<&CatalogItem> = candidates
            .iter()
            .filter(|item| Some(item.id.as_str()) != ctx.anchor_id())
            .filter(|item| Self::matches_label(item, intent.label))
            .take(CURATED_LIMIT)
            .collect();

        // A label with no curated matches still yields a general slice so the
        // behavioral path never goes silent.
        if curated.is_empty() {
            curated = candidates
                .iter()
                .filter(|item| Some(item.id.as_str()) != ctx.anchor_id())
                .take(CURATED_LIMIT)
                .collect();
        }

        let reason = format!("matches your {} shopping pattern", intent.label.as_str());
        curated
            .into_iter()
            .map(|item| {
                Recommendation::new(
                    item.id.clone(),
                    BEHAVIORAL_WEIGHT,
                    reason.clone(),
                    SourceTag::Behavioral,
                    intent.confidence,
                )
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;
    use crate::behavior::IntentClassification;

    fn item(id: &str, tags: &[&str]) -> CatalogItem {
        CatalogItem {
            id: id.to_string(),
            title: id.to_string(),
            description: String::new(),
            product_type: String::new(),
            vendor: String::new(),
            tags: tags.iter().map(|t| t.to_string()).collect::<BTreeSet<_>>(),
            price: 10.0,
            compare_at_price: None,
            published_at: None,
            variants: Vec::new(),
            available: true,
            collections: Default::default(),
        }
    }

    fn intent(label: IntentLabel) -> IntentClassification {
        IntentClassification {
            label,
            confidence: 0.8,
            indicators: Vec::new(),
            predicted_actions: Vec::new(),
            est_time_to_convert_secs: 15,
            est_order_value: 40.0,
        }
    }

    #[test]
    fn impulse_buyers_get_trending_items() {
        let recommender = BehavioralRecommender::new();
        let candidates = vec![item("a", &["trending"]), item("b", &[]), item("c", &["popular"])];
        let ctx = RankingContext {
            intent: Some(intent(IntentLabel::ImpulseBuyer)),
            ..Default::default()
        };

        let recs = recommender.generate(&candidates, &ctx, None);
        let ids: Vec<_> = recs.iter().map(|r| r.item_id.as_str()).collect();
        assert_eq!(ids, vec!["a", "c"]);
        assert!((recs[0].score - 0.3).abs() < 1e-9);
        assert_eq!(recs[0].reasons[0], "matches your impulse_buyer shopping pattern");
    }

    #[test]
    fn price_sensitive_matches_markdowns_without_tags() {
        let recommender = BehavioralRecommender::new();
        let mut discounted = item("a", &[]);
        discounted.compare_at_price = Some(20.0);
        let ctx = RankingContext {
            intent: Some(intent(IntentLabel::PriceSensitive)),
            ..Default::default()
        };

        let recs = recommender.generate(&[discounted, item("b", &[])], &ctx, None);
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].item_id, "a");
    }

    #[test]
    fn unmatched_label_falls_back_to_general_slice() {
        let recommender = BehavioralRecommender::new();
        let ctx = RankingContext {
            intent: Some(intent(IntentLabel::Researcher)),
            ..Default::default()
        };

        let recs = recommender.generate(&[item("a", &[]), item("b", &[])], &ctx, None);
        assert_eq!(recs.len(), 2);
    }

    #[test]
    fn no_classification_means_no_output() {
        let recommender = BehavioralRecommender::new();
        assert!(recommender
            .generate(&[item("a", &["trending"])], &RankingContext::default(), None)
            .is_empty());
    }
}
