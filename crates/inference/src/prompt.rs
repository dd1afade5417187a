use shoprank_core::BehaviorProfile;

/// Builds the classification prompt. The model is asked for a strict JSON
/// object so the parser's fast path usually succeeds.
pub fn build_prompt(profile: &BehaviorProfile) -> String {
    let categories = profile.categories_seen.iter().cloned().collect::<Vec<_>>().join(", ");
    format!(
        "You are classifying a storefront visitor's shopping intent from \
session behavior.\n\n\
Session summary:\n\
- total interactions: {}\n\
- page visits: {}\n\
- average hover duration: {:.0} ms\n\
- cart actions: {}\n\
- wishlist actions: {}\n\
- quick bounces: {}\n\
- session duration: {} ms\n\
- categories seen: {}\n\
- average time between actions: {:.0} ms\n\
- recent action sequence: {}\n\n\
Respond with exactly one JSON object and nothing else, with fields:\n\
{{\"intent\": one of [impulse_buyer, researcher, price_sensitive, brand_loyal, \
seasonal, bulk_buyer, browser], \"confidence\": number 0..1, \
\"indicators\": [strings], \"predicted_actions\": [strings], \
\"time_to_convert_secs\": integer, \"est_order_value\": number}}",
        profile.total_interactions,
        profile.page_visits,
        profile.avg_hover_duration_ms,
        profile.cart_actions,
        profile.wishlist_actions,
        profile.quick_bounces,
        profile.session_duration_ms,
        if categories.is_empty() { "none".to_string() } else { categories },
        profile.avg_time_between_actions_ms,
        if profile.recent_action_sequence.is_empty() {
            "none"
        } else {
            &profile.recent_action_sequence
        },
    )
}
