use crate::behavior::BehaviorProfile;
use crate::domain::catalog::CatalogItem;
use crate::domain::interaction::PageContext;
use crate::domain::recommendation::{Recommendation, SourceTag};

use super::{RankingContext, SignalGenerator};

const COLLECTION_MEMBER_BOOST: f64 = 15.0;
const SAME_CATEGORY_BOOST: f64 = 20.0;
const SHARED_TAG_BOOST: f64 = 5.0;
const HOME_FEATURED_BOOST: f64 = 10.0;
/// A same-category hit with one shared tag counts as full relevance when
/// banding the confidence bucket.
const FULL_RELEVANCE: f64 = SAME_CATEGORY_BOOST + SHARED_TAG_BOOST;

/// Additive boosts tied to the page surface rather than item-intrinsic
/// similarity.
#[derive(Clone, Copy, Debug, Default)]
pub struct ContextualBooster;

impl ContextualBooster {
    pub fn new() -> Self {
        Self
    }

    fn boost(item: &CatalogItem, ctx: &RankingContext) -> (f64, Option<String>) {
        match ctx.page {
            PageContext::Collection => {
                let member = ctx
                    .collection_handle
                    .as_deref()
                    .is_some_and(|handle| item.in_collection(handle));
                if member {
                    (COLLECTION_MEMBER_BOOST, Some("featured in this collection".to_string()))
                } else {
                    (0.0, None)
                }
            }
            PageContext::ProductPage => {
                let Some(anchor) = &ctx.anchor else { return (0.0, None) };
                let mut boost = 0.0;
                if !anchor.category().is_empty() && anchor.category() == item.category() {
                    boost += SAME_CATEGORY_BOOST;
                }
                let shared_tags = anchor.tags.intersection(&item.tags).count();
                boost += shared_tags as f64 * SHARED_TAG_BOOST;
                if boost > 0.0 {
                    (boost, Some(format!("similar to {}", anchor.title)))
                } else {
                    (0.0, None)
                }
            }
            PageContext::Home => {
                if item.has_tag("featured") || item.has_tag("popular") {
                    (HOME_FEATURED_BOOST, Some("featured pick".to_string()))
                } else {
                    (0.0, None)
                }
            }
            PageContext::Search | PageContext::AllProducts => (0.0, None),
        }
    }
}

impl SignalGenerator for ContextualBooster {
    fn name(&self) -> &'static str {
        "contextual"
    }

    fn generate(
        &self,
        candidates: &[CatalogItem],
        ctx: &RankingContext,
        _profile: Option<&BehaviorProfile>,
    ) -> Vec<Recommendation> {
        candidates
            .iter()
            .filter(|item| Some(item.id.as_str()) != ctx.anchor_id())
            .filter_map(|item| {
                let (boost, reason) = Self::boost(item, ctx);
                reason.map(|reason| {
                    Recommendation::new(
                        item.id.clone(),
                        boost,
                        reason,
                        SourceTag::Contextual,
                        (boost / FULL_RELEVANCE).min(1.0),
                    )
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;

    fn item(id: &str, product_type: &str, tags: &[&str], collections: &[&str]) -> CatalogItem {
        CatalogItem {
            id: id.to_string(),
            title: id.to_string(),
            description: String::new(),
            product_type: product_type.to_string(),
            vendor: String::new(),
            tags: tags.iter().map(|t| t.to_string()).collect::<BTreeSet<_>>(),
            price: 10.0,
            compare_at_price: None,
            published_at: None,
            variants: Vec::new(),
            available: true,
            collections: collections.iter().map(|c| c.to_string()).collect::<BTreeSet<_>>(),
        }
    }

    #[test]
    fn collection_members_get_fifteen() {
        let booster = ContextualBooster::new();
        let ctx = RankingContext {
            page: PageContext::Collection,
            collection_handle: Some("summer".to_string()),
            ..Default::default()
        };
        let recs = booster.generate(
            &[item("a", "", &[], &["summer"]), item("b", "", &[], &["winter"])],
            &ctx,
            None,
        );
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].item_id, "a");
        assert_eq!(recs[0].score, 15.0);
    }

    #[test]
    fn product_page_stacks_category_and_shared_tags() {
        let booster = ContextualBooster::new();
        let anchor = item("anchor", "jacket", &["wool", "winter"], &[]);
        let ctx = RankingContext {
            page: PageContext::ProductPage,
            anchor: Some(anchor),
            ..Default::default()
        };
        let recs =
            booster.generate(&[item("a", "jacket", &["wool", "winter", "red"], &[])], &ctx, None);
        // 20 same-category + 2 shared tags * 5
        assert_eq!(recs[0].score, 30.0);
    }

    #[test]
    fn home_page_boosts_featured_and_popular() {
        let booster = ContextualBooster::new();
        let ctx = RankingContext { page: PageContext::Home, ..Default::default() };
        let recs = booster.generate(
            &[item("a", "", &["featured"], &[]), item("b", "", &["popular"], &[]), item("c", "", &[], &[])],
            &ctx,
            None,
        );
        assert_eq!(recs.len(), 2);
        assert!(recs.iter().all(|rec| rec.score == 10.0));
    }

    #[test]
    fn search_context_adds_nothing() {
        let booster = ContextualBooster::new();
        let ctx = RankingContext { page: PageContext::Search, ..Default::default() };
        assert!(booster.generate(&[item("a", "", &["featured"], &[])], &ctx, None).is_empty());
    }
}
