use crate::behavior::BehaviorProfile;
use crate::domain::catalog::CatalogItem;
use crate::domain::recommendation::{Recommendation, SimilarityEdge, SourceTag};

use super::{RankingContext, SignalGenerator, COLLABORATIVE_WEIGHT};

/// Scores candidates by their similarity edges to the anchor item. The edge
/// table is static reference data loaded once at construction.
#[derive(Clone, Debug, Default)]
pub struct CollaborativeFilter {
    edges: Vec<SimilarityEdge>,
}

impl CollaborativeFilter {
    pub fn new(edges: Vec<SimilarityEdge>) -> Self {
        Self { edges }
    }

    fn similarity(&self, from: &str, to: &str) -> Option<f64> {
        self.edges
            .iter()
            .find(|edge| edge.from_item == from && edge.to_item == to)
            .map(|edge| edge.similarity)
    }
}

impl SignalGenerator for CollaborativeFilter {
    fn name(&self) -> &'static str {
        "collaborative"
    }

    fn generate(
        &self,
        candidates: &[CatalogItem],
        ctx: &RankingContext,
        _profile: Option<&BehaviorProfile>,
    ) -> Vec<Recommendation> {
        let Some(anchor_id) = ctx.anchor_id() else {
            return Vec::new();
        };

        candidates
            .iter()
            .filter(|item| item.id != anchor_id)
            .filter_map(|item| {
                let similarity = self.similarity(anchor_id, &item.id)?;
                let reason = format!(
                    "{}% of similar users also liked this",
                    (similarity * 100.0).round() as i64
                );
                Some(Recommendation::new(
                    item.id.clone(),
                    similarity * COLLABORATIVE_WEIGHT,
                    reason,
                    SourceTag::Collaborative,
                    similarity,
                ))
            })
            .collect()
    }
}
