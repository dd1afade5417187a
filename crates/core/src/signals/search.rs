use crate::behavior::BehaviorProfile;
use crate::domain::catalog::CatalogItem;
use crate::domain::recommendation::{Recommendation, SourceTag};

use super::{RankingContext, SignalGenerator, MIN_SEARCH_TOKEN_LEN};

const TITLE_EXACT: f64 = 30.0;
const TITLE_TOKEN: f64 = 15.0;
const DESCRIPTION_EXACT: f64 = 20.0;
const DESCRIPTION_TOKEN: f64 = 10.0;
const TAG_TOKEN: f64 = 12.0;
const TYPE_EXACT: f64 = 25.0;
/// An exact title plus exact type hit counts as full relevance when banding
/// the confidence bucket.
const FULL_RELEVANCE: f64 = TITLE_EXACT + TYPE_EXACT;

/// Lexical relevance scorer. Only active when the ranking context carries a
/// search query; matching is case-insensitive and short tokens are ignored.
#[derive(Clone, Copy, Debug, Default)]
pub struct SearchRelevanceScorer;

impl SearchRelevanceScorer {
    pub fn new() -> Self {
        Self
    }

    fn score_item(item: &CatalogItem, query: &str, tokens: &[String]) -> f64 {
        let title = item.title.to_lowercase();
        let description = item.description.to_lowercase();
        let mut score = 0.0;

        if title == query {
            score += TITLE_EXACT;
        } else {
            score += tokens.iter().filter(|token| title.contains(token.as_str())).count() as f64
                * TITLE_TOKEN;
        }

        if !description.is_empty() {
            if description == query {
                score += DESCRIPTION_EXACT;
            } else {
                score += tokens
                    .iter()
                    .filter(|token| description.contains(token.as_str()))
                    .count() as f64
                    * DESCRIPTION_TOKEN;
            }
        }

        for token in tokens {
            if item.tags.iter().any(|tag| tag.to_lowercase().contains(token.as_str())) {
                score += TAG_TOKEN;
            }
        }

        if item.product_type.to_lowercase() == query {
            score += TYPE_EXACT;
        }

        score
    }
}

fn tokenize(query: &str) -> Vec<String> {
    query
        .split_whitespace()
        .map(str::to_lowercase)
        .filter(|token| token.len() >= MIN_SEARCH_TOKEN_LEN)
        .collect()
}

impl SignalGenerator for SearchRelevanceScorer {
    fn name(&self) -> &'static str {
        "search"
    }

    fn generate(
        &self,
        candidates: &[CatalogItem],
        ctx: &RankingContext,
        _profile: Option<&BehaviorProfile>,
    ) -> Vec<Recommendation> {
        let Some(query) = ctx.search_query.as_deref().map(str::trim).filter(|q| !q.is_empty())
        else {
            return Vec::new();
        };
        let query = query.to_lowercase();
        let tokens = tokenize(&query);

        candidates
            .iter()
            .filter_map(|item| {
                let score = Self::score_item(item, &query, &tokens);
                if score <= 0.0 {
                    return None;
                }
                Some(Recommendation::new(
                    item.id.clone(),
                    score,
                    format!("relevant to \"{query}\""),
                    SourceTag::Search,
                    (score / FULL_RELEVANCE).min(1.0),
                ))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;

    fn item(id: &str, title: &str, description: &str, product_type: &str, tags: &[&str]) -> CatalogItem {
        CatalogItem {
            id: id.to_string(),
            title: title.to_string(),
            description: description.to_string(),
            product_type: product_type.to_string(),
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

    fn ctx(query: &str) -> RankingContext {
        RankingContext { search_query: Some(query.to_string()), ..Default::default() }
    }

    #[test]
    fn exact_title_match_scores_thirty() {
        let scorer = SearchRelevanceScorer::new();
        let recs = scorer.generate(&[item("a", "Wool Hat", "", "", &[])], &ctx("wool hat"), None);
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].score, 30.0);
    }

    #[test]
    fn partial_title_tokens_score_fifteen_each() {
        let scorer = SearchRelevanceScorer::new();
        let recs =
            scorer.generate(&[item("a", "Wool Winter Hat", "", "", &[])], &ctx("wool hat"), None);
        assert_eq!(recs[0].score, 30.0); // two token matches, not exact
    }

    #[test]
    fn short_tokens_are_ignored_and_matching_is_case_insensitive() {
        let scorer = SearchRelevanceScorer::new();
        // "of" is below the token length floor; "WOOL" matches despite case.
        let recs = scorer.generate(&[item("a", "Bale of Wool", "", "", &[])], &ctx("of WOOL"), None);
        assert_eq!(recs[0].score, 15.0);
    }

    #[test]
    fn tags_type_and_description_stack() {
        let scorer = SearchRelevanceScorer::new();
        let candidate = item("a", "Alpine Jacket", "warm jacket for winter", "jacket", &["jacket"]);
        let recs = scorer.generate(&[candidate], &ctx("jacket"), None);
        // title token 15 + description token 10 + tag 12 + type exact 25
        assert_eq!(recs[0].score, 62.0);
    }

    #[test]
    fn confidence_tracks_match_strength_not_raw_score() {
        use crate::domain::recommendation::ConfidenceBucket;

        let scorer = SearchRelevanceScorer::new();
        let weak = scorer.generate(&[item("a", "Wool Winter Hat", "", "", &[])], &ctx("wool"), None);
        assert_eq!(weak[0].score, 15.0);
        assert_eq!(weak[0].confidence, ConfidenceBucket::Low);

        let candidate = item("b", "Alpine Jacket", "warm jacket for winter", "jacket", &["jacket"]);
        let strong = scorer.generate(&[candidate], &ctx("jacket"), None);
        assert_eq!(strong[0].confidence, ConfidenceBucket::VeryHigh);
    }

    #[test]
    fn inactive_without_a_query() {
        let scorer = SearchRelevanceScorer::new();
        let recs =
            scorer.generate(&[item("a", "Hat", "", "", &[])], &RankingContext::default(), None);
        assert!(recs.is_empty());
    }

    #[test]
    fn zero_score_items_are_omitted() {
        let scorer = SearchRelevanceScorer::new();
        let recs = scorer.generate(&[item("a", "Socks", "", "", &[])], &ctx("jacket"), None);
        assert!(recs.is_empty());
    }
}
