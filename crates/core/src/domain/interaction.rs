use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single recorded user action. Immutable once appended to the session log.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct InteractionEvent {
    /// Absent for page-level events such as `page_visit`.
    #[serde(default)]
    pub product_id: Option<String>,
    pub kind: InteractionKind,
    pub timestamp: DateTime<Utc>,
    /// Set on `hover_end` events only.
    #[serde(default)]
    pub duration_ms: Option<u64>,
    #[serde(default)]
    pub context: PageContext,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

impl InteractionEvent {
    pub fn new(kind: InteractionKind, context: PageContext) -> Self {
        Self {
            product_id: None,
            kind,
            timestamp: Utc::now(),
            duration_ms: None,
            context,
            metadata: HashMap::new(),
        }
    }

    pub fn with_product(mut self, product_id: impl Into<String>) -> Self {
        self.product_id = Some(product_id.into());
        self
    }

    pub fn with_duration_ms(mut self, duration_ms: u64) -> Self {
        self.duration_ms = Some(duration_ms);
        self
    }

    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.metadata.insert("category".to_string(), category.into());
        self
    }

    /// Category tag carried in free-form metadata, if any.
    pub fn category(&self) -> Option<&str> {
        self.metadata.get("category").map(String::as_str)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractionKind {
    View,
    HoverStart,
    HoverEnd,
    QuickBounce,
    CartAdd,
    CartRemove,
    WishlistAdd,
    WishlistRemove,
    PageVisit,
}

impl InteractionKind {
    /// Kinds that mark an item as "interacted with" for basket analysis.
    pub fn is_engagement(self) -> bool {
        matches!(self, Self::View | Self::CartAdd | Self::WishlistAdd)
    }
}

/// The page surface the visitor is currently on.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PageContext {
    Collection,
    Search,
    ProductPage,
    Home,
    #[default]
    AllProducts,
}

impl PageContext {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Collection => "collection",
            Self::Search => "search",
            Self::ProductPage => "product-page",
            Self::Home => "home",
            Self::AllProducts => "all-products",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn engagement_kinds_feed_basket_analysis() {
        assert!(InteractionKind::View.is_engagement());
        assert!(InteractionKind::CartAdd.is_engagement());
        assert!(InteractionKind::WishlistAdd.is_engagement());
        assert!(!InteractionKind::HoverEnd.is_engagement());
        assert!(!InteractionKind::CartRemove.is_engagement());
        assert!(!InteractionKind::PageVisit.is_engagement());
    }

    #[test]
    fn page_level_events_carry_no_product() {
        let event = InteractionEvent::new(InteractionKind::PageVisit, PageContext::Home);
        assert!(event.product_id.is_none());
        assert!(event.duration_ms.is_none());
    }

    #[test]
    fn context_serializes_kebab_case() {
        let json = serde_json::to_string(&PageContext::ProductPage).unwrap();
        assert_eq!(json, "\"product-page\"");
        let parsed: PageContext = serde_json::from_str("\"all-products\"").unwrap();
        assert_eq!(parsed, PageContext::AllProducts);
    }
}
