//! Hard, user-chosen constraints. An item either passes every active
//! constraint or is removed entirely; filters never adjust scores.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::domain::catalog::CatalogItem;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterContext {
    #[serde(default)]
    pub price_min: Option<f64>,
    #[serde(default)]
    pub price_max: Option<f64>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub vendors: BTreeSet<String>,
    #[serde(default)]
    pub available_only: bool,
}

impl FilterContext {
    pub fn is_empty(&self) -> bool {
        self.price_min.is_none()
            && self.price_max.is_none()
            && self.category.is_none()
            && self.vendors.is_empty()
            && !self.available_only
    }

    pub fn passes(&self, item: &CatalogItem) -> bool {
        if let Some(min) = self.price_min {
            if item.price < min {
                return false;
            }
        }
        if let Some(max) = self.price_max {
            if item.price > max {
                return false;
            }
        }
        if let Some(category) = self.category.as_deref() {
            let tagged = item.has_tag(category);
            let typed = item.product_type.eq_ignore_ascii_case(category);
            if !tagged && !typed {
                return false;
            }
        }
        if !self.vendors.is_empty()
            && !self.vendors.iter().any(|vendor| vendor.eq_ignore_ascii_case(&item.vendor))
        {
            return false;
        }
        if self.available_only && !item.is_available() {
            return false;
        }
        true
    }

    /// Applies every active constraint to the candidate set. No-op when no
    /// constraints are set.
    pub fn apply(&self, candidates: Vec<CatalogItem>) -> Vec<CatalogItem> {
        if self.is_empty() {
            return candidates;
        }
        candidates.into_iter().filter(|item| self.passes(item)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: &str, price: f64, vendor: &str, available: bool) -> CatalogItem {
        CatalogItem {
            id: id.to_string(),
            title: id.to_string(),
            description: String::new(),
            product_type: "shirt".to_string(),
            vendor: vendor.to_string(),
            tags: Default::default(),
            price,
            compare_at_price: None,
            published_at: None,
            variants: Vec::new(),
            available,
            collections: Default::default(),
        }
    }

    #[test]
    fn empty_filter_is_a_no_op() {
        let filter = FilterContext::default();
        let candidates = vec![item("a", 10.0, "x", false)];
        assert_eq!(filter.apply(candidates.clone()), candidates);
    }

    #[test]
    fn price_range_excludes_both_ends() {
        let filter = FilterContext {
            price_min: Some(20.0),
            price_max: Some(50.0),
            ..Default::default()
        };
        let kept = filter.apply(vec![
            item("cheap", 10.0, "x", true),
            item("ok", 35.0, "x", true),
            item("dear", 80.0, "x", true),
        ]);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].id, "ok");
    }

    #[test]
    fn vendor_membership_is_case_insensitive() {
        let filter = FilterContext {
            vendors: BTreeSet::from(["Acme".to_string()]),
            ..Default::default()
        };
        assert!(filter.passes(&item("a", 10.0, "acme", true)));
        assert!(!filter.passes(&item("b", 10.0, "other", true)));
    }

    #[test]
    fn category_matches_tag_or_type() {
        let filter =
            FilterContext { category: Some("shirt".to_string()), ..Default::default() };
        assert!(filter.passes(&item("a", 10.0, "x", true)));

        let filter = FilterContext { category: Some("hat".to_string()), ..Default::default() };
        assert!(!filter.passes(&item("a", 10.0, "x", true)));
    }

    #[test]
    fn availability_flag_drops_sold_out() {
        let filter = FilterContext { available_only: true, ..Default::default() };
        let kept = filter.apply(vec![item("a", 10.0, "x", true), item("b", 10.0, "x", false)]);
        assert_eq!(kept.len(), 1);
    }

    #[test]
    fn variant_stock_overrides_the_item_flag() {
        use crate::domain::catalog::Variant;

        let filter = FilterContext { available_only: true, ..Default::default() };
        let mut sold_out = item("a", 10.0, "x", true);
        sold_out.variants = vec![
            Variant { id: "a-s".to_string(), available: true, stock: Some(0) },
            Variant { id: "a-m".to_string(), available: false, stock: Some(3) },
        ];
        assert!(!filter.passes(&sold_out));

        let mut restocked = sold_out.clone();
        restocked.variants[0].stock = Some(2);
        assert!(filter.passes(&restocked));
    }
}
