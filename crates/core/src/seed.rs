//! Static reference data: a small demo catalog plus the association-rule and
//! similarity-edge tables the signal generators consume. Real deployments
//! replace these with data mined from order history.

use std::collections::BTreeSet;

use crate::domain::catalog::CatalogItem;
use crate::domain::recommendation::{AssociationRule, SimilarityEdge};

fn tags(values: &[&str]) -> BTreeSet<String> {
    values.iter().map(|v| v.to_string()).collect()
}

fn item(
    id: &str,
    title: &str,
    description: &str,
    product_type: &str,
    vendor: &str,
    item_tags: &[&str],
    price: f64,
    collection: &str,
) -> CatalogItem {
    CatalogItem {
        id: id.to_string(),
        title: title.to_string(),
        description: description.to_string(),
        product_type: product_type.to_string(),
        vendor: vendor.to_string(),
        tags: tags(item_tags),
        price,
        collections: tags(&[collection]),
        ..CatalogItem::default()
    }
}

pub fn demo_catalog() -> Vec<CatalogItem> {
    let mut items = vec![
        item(
            "rain-jacket",
            "Alpine Rain Jacket",
            "Waterproof shell jacket for wet-weather hiking",
            "jacket",
            "Northpeak",
            &["outdoor", "waterproof", "trending"],
            129.0,
            "outerwear",
        ),
        item(
            "fleece-liner",
            "Fleece Jacket Liner",
            "Zip-in fleece layer sized to the Alpine jacket",
            "jacket",
            "Northpeak",
            &["outdoor", "warm"],
            49.0,
            "outerwear",
        ),
        item(
            "wool-socks",
            "Merino Wool Socks",
            "Odor-resistant merino hiking socks, 3-pack",
            "socks",
            "Trailstep",
            &["outdoor", "popular", "sale"],
            18.0,
            "accessories",
        ),
        item(
            "trek-boots",
            "Ridgeline Trekking Boots",
            "Premium full-grain leather boots with detailed stitching",
            "boots",
            "Trailstep",
            &["outdoor", "premium"],
            189.0,
            "footwear",
        ),
        item(
            "camp-mug",
            "Enamel Camp Mug",
            "Seasonal holiday edition enamel mug",
            "drinkware",
            "Emberline",
            &["seasonal", "gift"],
            14.0,
            "accessories",
        ),
    ];
    // wool-socks is on sale against a higher compare-at price.
    if let Some(socks) = items.iter_mut().find(|i| i.id == "wool-socks") {
        socks.compare_at_price = Some(24.0);
    }
    items
}

pub fn demo_similarity_edges() -> Vec<SimilarityEdge> {
    vec![
        edge("rain-jacket", "fleece-liner", 0.85),
        edge("rain-jacket", "wool-socks", 0.72),
        edge("trek-boots", "wool-socks", 0.81),
        edge("trek-boots", "rain-jacket", 0.64),
        edge("fleece-liner", "rain-jacket", 0.85),
    ]
}

pub fn demo_association_rules() -> Vec<AssociationRule> {
    vec![
        rule(&["rain-jacket"], "fleece-liner", 0.18, 0.62, 2.4),
        rule(&["trek-boots"], "wool-socks", 0.22, 0.71, 1.9),
        rule(&["rain-jacket", "trek-boots"], "wool-socks", 0.09, 0.83, 2.2),
    ]
}

fn edge(from: &str, to: &str, similarity: f64) -> SimilarityEdge {
    SimilarityEdge { from_item: from.to_string(), to_item: to.to_string(), similarity }
}

fn rule(
    antecedent: &[&str],
    consequent: &str,
    support: f64,
    confidence: f64,
    lift: f64,
) -> AssociationRule {
    AssociationRule {
        antecedent: antecedent.iter().map(|v| v.to_string()).collect(),
        consequent: BTreeSet::from([consequent.to_string()]),
        support,
        confidence,
        lift,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seed_tables_reference_only_catalog_items() {
        let ids: std::collections::BTreeSet<String> =
            demo_catalog().into_iter().map(|item| item.id).collect();

        for edge in demo_similarity_edges() {
            assert!(ids.contains(&edge.from_item), "unknown edge source {}", edge.from_item);
            assert!(ids.contains(&edge.to_item), "unknown edge target {}", edge.to_item);
        }
        for rule in demo_association_rules() {
            assert!(rule.consequent.iter().all(|id| ids.contains(id)));
            assert!(rule.antecedent.iter().all(|id| ids.contains(id)));
        }
    }
}
