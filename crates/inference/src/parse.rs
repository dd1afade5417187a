//! Defensive extraction of a classification from model output. Fast path is
//! a strict JSON parse of the first object in the text; the fallback is a
//! per-field scan over the raw text. Fields that cannot be recovered keep
//! the rule classifier's values.

use serde::Deserialize;

use shoprank_core::{IntentClassification, IntentLabel};

#[derive(Debug, Deserialize)]
struct RawClassification {
    #[serde(alias = "label")]
    intent: Option<String>,
    confidence: Option<f64>,
    #[serde(default)]
    indicators: Vec<String>,
    #[serde(default)]
    predicted_actions: Vec<String>,
    #[serde(alias = "est_time_to_convert_secs")]
    time_to_convert_secs: Option<u32>,
    est_order_value: Option<f64>,
}

/// Merges whatever the model produced over `fallback`. Never fails; at worst
/// the fallback comes back unchanged.
pub fn parse_classification(text: &str, fallback: &IntentClassification) -> IntentClassification {
    let mut result = fallback.clone();

    if let Some(raw) = first_json_object(text).and_then(|s| serde_json::from_str::<RawClassification>(s).ok()) {
        if let Some(label) = raw.intent.as_deref().and_then(IntentLabel::parse) {
            result.label = label;
        }
        if let Some(confidence) = raw.confidence.filter(|c| (0.0..=1.0).contains(c)) {
            result.confidence = confidence;
        }
        if !raw.indicators.is_empty() {
            result.indicators = raw.indicators;
        }
        if !raw.predicted_actions.is_empty() {
            result.predicted_actions = raw.predicted_actions;
        }
        if let Some(secs) = raw.time_to_convert_secs {
            result.est_time_to_convert_secs = secs;
        }
        if let Some(value) = raw.est_order_value.filter(|v| *v >= 0.0) {
            result.est_order_value = value;
        }
        return result;
    }

    // Salvage pass over free text.
    if let Some(label) = scan_label(text) {
        result.label = label;
    }
    if let Some(confidence) = scan_number_after(text, "confidence").filter(|c| (0.0..=1.0).contains(c)) {
        result.confidence = confidence;
    }
    result
}

/// Returns the first balanced `{ .. }` slice, respecting string literals.
fn first_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in text[start..].char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                in_string = false;
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + offset + ch.len_utf8()]);
                }
            }
            _ => {}
        }
    }
    None
}

fn scan_label(text: &str) -> Option<IntentLabel> {
    let lowered = text.to_ascii_lowercase().replace(['-', ' '], "_");
    const LABELS: &[&str] = &[
        "impulse_buyer",
        "price_sensitive",
        "brand_loyal",
        "bulk_buyer",
        "researcher",
        "seasonal",
        "browser",
    ];
    LABELS
        .iter()
        .filter_map(|candidate| lowered.find(candidate).map(|pos| (pos, *candidate)))
        .min_by_key(|(pos, _)| *pos)
        .and_then(|(_, candidate)| IntentLabel::parse(candidate))
}

/// Finds the first numeric literal following `key` in the text.
fn scan_number_after(text: &str, key: &str) -> Option<f64> {
    let lowered = text.to_ascii_lowercase();
    let pos = lowered.find(key)? + key.len();
    let rest = &text[pos..];
    let digits_start = rest.find(|c: char| c.is_ascii_digit())?;
    let tail = &rest[digits_start..];
    let end = tail
        .find(|c: char| !c.is_ascii_digit() && c != '.')
        .unwrap_or(tail.len());
    tail[..end].trim_end_matches('.').parse::<f64>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fallback() -> IntentClassification {
        IntentClassification {
            label: IntentLabel::Researcher,
            confidence: 0.6,
            indicators: vec!["default heuristic".to_string()],
            predicted_actions: vec!["continue browsing".to_string()],
            est_time_to_convert_secs: 60,
            est_order_value: 50.0,
        }
    }

    #[test]
    fn strict_json_overrides_fallback() {
        let text = r#"Here is the result:
{"intent": "impulse_buyer", "confidence": 0.9, "indicators": ["fast carting"],
 "predicted_actions": ["checkout"], "time_to_convert_secs": 20, "est_order_value": 42.5}"#;
        let result = parse_classification(text, &fallback());
        assert_eq!(result.label, IntentLabel::ImpulseBuyer);
        assert_eq!(result.confidence, 0.9);
        assert_eq!(result.est_time_to_convert_secs, 20);
        assert_eq!(result.est_order_value, 42.5);
    }

    #[test]
    fn partial_json_keeps_fallback_fields() {
        let text = r#"{"intent": "browser"}"#;
        let result = parse_classification(text, &fallback());
        assert_eq!(result.label, IntentLabel::Browser);
        assert_eq!(result.confidence, 0.6);
        assert_eq!(result.predicted_actions, vec!["continue browsing".to_string()]);
    }

    #[test]
    fn free_text_salvage_recovers_label_and_confidence() {
        let text = "The visitor looks like a price-sensitive shopper. Confidence: 0.75.";
        let result = parse_classification(text, &fallback());
        assert_eq!(result.label, IntentLabel::PriceSensitive);
        assert_eq!(result.confidence, 0.75);
    }

    #[test]
    fn garbage_returns_fallback_unchanged() {
        let before = fallback();
        let result = parse_classification("no structure here at all", &before);
        assert_eq!(result, before);
    }

    #[test]
    fn out_of_range_confidence_is_ignored() {
        let text = r#"{"intent": "browser", "confidence": 7.0}"#;
        let result = parse_classification(text, &fallback());
        assert_eq!(result.label, IntentLabel::Browser);
        assert_eq!(result.confidence, 0.6);
    }

    #[test]
    fn nested_braces_in_strings_do_not_break_extraction() {
        let text = r#"prefix {"intent": "seasonal", "confidence": 0.8, "indicators": ["likes {gift} sets"]} suffix"#;
        let result = parse_classification(text, &fallback());
        assert_eq!(result.label, IntentLabel::Seasonal);
    }
}
