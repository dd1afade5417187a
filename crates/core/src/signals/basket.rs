use std::collections::BTreeSet;

use crate::behavior::BehaviorProfile;
use crate::domain::catalog::CatalogItem;
use crate::domain::recommendation::{AssociationRule, Recommendation, SourceTag};

use super::{RankingContext, SignalGenerator, BASKET_WEIGHT};

/// Applies precomputed association rules against the visitor's interacted
/// item set. Rules whose antecedent is fully contained in that set emit
/// their consequents, excluding anything already seen.
#[derive(Clone, Debug, Default)]
pub struct MarketBasketEngine {
    rules: Vec<AssociationRule>,
}

impl MarketBasketEngine {
    pub fn new(rules: Vec<AssociationRule>) -> Self {
        Self { rules }
    }
}

impl SignalGenerator for MarketBasketEngine {
    fn name(&self) -> &'static str {
        "market_basket"
    }

    fn generate(
        &self,
        candidates: &[CatalogItem],
        ctx: &RankingContext,
        _profile: Option<&BehaviorProfile>,
    ) -> Vec<Recommendation> {
        let mut basket: BTreeSet<String> = ctx.interacted_items.clone();
        if let Some(anchor_id) = ctx.anchor_id() {
            basket.insert(anchor_id.to_string());
        }
        if basket.is_empty() {
            return Vec::new();
        }

        let candidate_ids: BTreeSet<&str> =
            candidates.iter().map(|item| item.id.as_str()).collect();

        let mut recs = Vec::new();
        let mut emitted = BTreeSet::new();
        for rule in &self.rules {
            if !rule.applies_to(&basket) {
                continue;
            }
            for consequent in &rule.consequent {
                if basket.contains(consequent) || !candidate_ids.contains(consequent.as_str()) {
                    continue;
                }
                if !emitted.insert(consequent.clone()) {
                    continue;
                }
                let reason = format!(
                    "Bought together {}% of the time ({:.1}x lift)",
                    (rule.confidence * 100.0).round() as i64,
                    rule.lift,
                );
                recs.push(Recommendation::new(
                    consequent.clone(),
                    rule.confidence * rule.lift * BASKET_WEIGHT,
                    reason,
                    SourceTag::MarketBasket,
                    rule.confidence,
                ));
            }
        }
        recs
    }
}
