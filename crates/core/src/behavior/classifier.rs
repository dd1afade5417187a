use serde::{Deserialize, Serialize};

use super::profile::BehaviorProfile;

/// Discrete shopper intent. The rule table only ever emits the first three
/// plus the researcher default; the remaining labels are reachable through
/// the external inference path.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntentLabel {
    ImpulseBuyer,
    Researcher,
    PriceSensitive,
    BrandLoyal,
    Seasonal,
    BulkBuyer,
    Browser,
}

impl IntentLabel {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ImpulseBuyer => "impulse_buyer",
            Self::Researcher => "researcher",
            Self::PriceSensitive => "price_sensitive",
            Self::BrandLoyal => "brand_loyal",
            Self::Seasonal => "seasonal",
            Self::BulkBuyer => "bulk_buyer",
            Self::Browser => "browser",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().replace([' ', '-'], "_").as_str() {
            "impulse_buyer" => Some(Self::ImpulseBuyer),
            "researcher" => Some(Self::Researcher),
            "price_sensitive" => Some(Self::PriceSensitive),
            "brand_loyal" => Some(Self::BrandLoyal),
            "seasonal" => Some(Self::Seasonal),
            "bulk_buyer" => Some(Self::BulkBuyer),
            "browser" => Some(Self::Browser),
            _ => None,
        }
    }
}

/// Classification output, produced fresh per call and never persisted beyond
/// the ranking cache.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct IntentClassification {
    pub label: IntentLabel,
    /// 0.0 - 1.0
    pub confidence: f64,
    pub indicators: Vec<String>,
    pub predicted_actions: Vec<String>,
    pub est_time_to_convert_secs: u32,
    pub est_order_value: f64,
}

/// Hand-tuned rule thresholds. Preserved as configuration rather than
/// re-derived; there is no documented principled origin for the values.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ClassifierThresholds {
    pub impulse_max_hover_ms: f64,
    pub researcher_min_page_visits: u32,
    pub researcher_min_hover_ms: f64,
}

impl Default for ClassifierThresholds {
    fn default() -> Self {
        Self {
            impulse_max_hover_ms: 1_000.0,
            researcher_min_page_visits: 3,
            researcher_min_hover_ms: 3_000.0,
        }
    }
}

/// Deterministic decision table evaluated in fixed priority order; the first
/// matching rule wins with no blending. This is the mandatory fallback and
/// must produce output with no external dependency.
#[derive(Clone, Debug, Default)]
pub struct RuleClassifier {
    thresholds: ClassifierThresholds,
}

impl RuleClassifier {
    pub fn new(thresholds: ClassifierThresholds) -> Self {
        Self { thresholds }
    }

    pub fn classify(&self, profile: &BehaviorProfile) -> IntentClassification {
        let t = &self.thresholds;

        if profile.avg_hover_duration_ms < t.impulse_max_hover_ms && profile.cart_actions > 0 {
            return IntentClassification {
                label: IntentLabel::ImpulseBuyer,
                confidence: 0.8,
                indicators: vec!["quick decisions with immediate cart actions".to_string()],
                predicted_actions: vec!["complete purchase quickly".to_string()],
                est_time_to_convert_secs: 15,
                est_order_value: 40.0,
            };
        }

        if profile.page_visits > t.researcher_min_page_visits
            && profile.avg_hover_duration_ms > t.researcher_min_hover_ms
        {
            return IntentClassification {
                label: IntentLabel::Researcher,
                confidence: 0.7,
                indicators: vec!["many page visits with long product dwell time".to_string()],
                predicted_actions: vec!["compare alternatives before buying".to_string()],
                est_time_to_convert_secs: 120,
                est_order_value: 80.0,
            };
        }

        if profile.wishlist_actions > profile.cart_actions && profile.wishlist_actions > 0 {
            return IntentClassification {
                label: IntentLabel::PriceSensitive,
                confidence: 0.6,
                indicators: vec!["saves items for later instead of buying".to_string()],
                predicted_actions: vec!["wait for a discount or sale".to_string()],
                est_time_to_convert_secs: 180,
                est_order_value: 35.0,
            };
        }

        IntentClassification {
            label: IntentLabel::Researcher,
            confidence: 0.6,
            indicators: vec!["browsing without a strong signal".to_string()],
            predicted_actions: vec!["continue exploring the catalog".to_string()],
            est_time_to_convert_secs: 60,
            est_order_value: 50.0,
        }
    }
}
