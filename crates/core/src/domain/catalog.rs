use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Read-only catalog record supplied by the storefront. The engine never
/// writes back to the catalog.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CatalogItem {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub product_type: String,
    #[serde(default)]
    pub vendor: String,
    #[serde(default)]
    pub tags: BTreeSet<String>,
    pub price: f64,
    #[serde(default)]
    pub compare_at_price: Option<f64>,
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
    #[serde(default = "default_available")]
    pub available: bool,
    /// Per-variant availability, when the storefront supplies it. Empty
    /// means the item-level flag is authoritative.
    #[serde(default)]
    pub variants: Vec<Variant>,
    #[serde(default)]
    pub collections: BTreeSet<String>,
}

fn default_available() -> bool {
    true
}

/// Purchasable variant of an item. Only availability and stock matter to
/// ranking; pricing stays at the item level.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Variant {
    pub id: String,
    #[serde(default = "default_available")]
    pub available: bool,
    #[serde(default)]
    pub stock: Option<u32>,
}

impl Variant {
    pub fn purchasable(&self) -> bool {
        self.available && self.stock.map_or(true, |stock| stock > 0)
    }
}

impl Default for CatalogItem {
    fn default() -> Self {
        Self {
            id: String::new(),
            title: String::new(),
            description: String::new(),
            product_type: String::new(),
            vendor: String::new(),
            tags: BTreeSet::new(),
            price: 0.0,
            compare_at_price: None,
            published_at: None,
            variants: Vec::new(),
            available: true,
            collections: BTreeSet::new(),
        }
    }
}

impl CatalogItem {
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|candidate| candidate.eq_ignore_ascii_case(tag))
    }

    pub fn in_collection(&self, collection: &str) -> bool {
        self.collections.iter().any(|candidate| candidate.eq_ignore_ascii_case(collection))
    }

    /// Category for contextual matching. Falls back to the product type when
    /// no explicit category tag is present.
    pub fn category(&self) -> &str {
        &self.product_type
    }

    /// True when the item, or any of its variants, can be purchased.
    pub fn is_available(&self) -> bool {
        if self.variants.is_empty() {
            return self.available;
        }
        self.variants.iter().any(Variant::purchasable)
    }
}

/// Read-side catalog access consumed by the engine.
pub trait CatalogReader: Send + Sync {
    fn item(&self, id: &str) -> Option<CatalogItem>;
    fn collection(&self, handle: &str) -> Vec<CatalogItem>;
    fn all(&self) -> Vec<CatalogItem>;
}

/// In-memory catalog used by tests and the bundled fixture bootstrap.
#[derive(Clone, Debug, Default)]
pub struct InMemoryCatalog {
    items: Vec<CatalogItem>,
}

impl InMemoryCatalog {
    pub fn new(items: Vec<CatalogItem>) -> Self {
        Self { items }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl CatalogReader for InMemoryCatalog {
    fn item(&self, id: &str) -> Option<CatalogItem> {
        self.items.iter().find(|item| item.id == id).cloned()
    }

    fn collection(&self, handle: &str) -> Vec<CatalogItem> {
        self.items.iter().filter(|item| item.in_collection(handle)).cloned().collect()
    }

    fn all(&self) -> Vec<CatalogItem> {
        self.items.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: &str, collection: &str) -> CatalogItem {
        CatalogItem {
            id: id.to_string(),
            title: id.to_string(),
            description: String::new(),
            product_type: "shirt".to_string(),
            vendor: "acme".to_string(),
            tags: BTreeSet::new(),
            price: 25.0,
            compare_at_price: None,
            published_at: None,
            variants: Vec::new(),
            available: true,
            collections: BTreeSet::from([collection.to_string()]),
        }
    }

    #[test]
    fn collection_lookup_is_case_insensitive() {
        let catalog = InMemoryCatalog::new(vec![item("a", "Summer"), item("b", "winter")]);
        assert_eq!(catalog.collection("summer").len(), 1);
        assert_eq!(catalog.collection("WINTER")[0].id, "b");
    }

    #[test]
    fn missing_item_yields_none() {
        let catalog = InMemoryCatalog::new(vec![item("a", "summer")]);
        assert!(catalog.item("zzz").is_none());
    }
}
