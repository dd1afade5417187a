use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::domain::interaction::{InteractionEvent, InteractionKind};

/// How many trailing actions the short sequence keeps.
const RECENT_SEQUENCE_LEN: usize = 20;

/// Fixed-shape reduction of an interaction log. Recomputed on demand; has no
/// lifecycle of its own.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BehaviorProfile {
    pub total_interactions: u32,
    pub page_visits: u32,
    pub avg_hover_duration_ms: f64,
    pub cart_actions: u32,
    pub wishlist_actions: u32,
    pub quick_bounces: u32,
    pub session_duration_ms: u64,
    pub categories_seen: BTreeSet<String>,
    pub avg_time_between_actions_ms: f64,
    /// Last 20 action kinds as a compact sequence string, oldest first.
    pub recent_action_sequence: String,
}

impl BehaviorProfile {
    pub fn is_empty(&self) -> bool {
        self.total_interactions == 0
    }
}

/// Reduces an ordered event list into a profile. Pure; empty input yields an
/// all-zero profile rather than an error, which callers rely on to always
/// get a renderable state.
pub fn aggregate(events: &[InteractionEvent]) -> BehaviorProfile {
    if events.is_empty() {
        return BehaviorProfile::default();
    }

    let mut profile = BehaviorProfile { total_interactions: events.len() as u32, ..Default::default() };

    let mut hover_total_ms = 0u64;
    let mut hover_samples = 0u32;
    let mut sequence = Vec::new();

    for event in events {
        match event.kind {
            InteractionKind::PageVisit => profile.page_visits += 1,
            InteractionKind::CartAdd | InteractionKind::CartRemove => profile.cart_actions += 1,
            InteractionKind::WishlistAdd | InteractionKind::WishlistRemove => {
                profile.wishlist_actions += 1;
            }
            InteractionKind::QuickBounce => profile.quick_bounces += 1,
            InteractionKind::HoverEnd => {
                if let Some(duration) = event.duration_ms {
                    hover_total_ms += duration;
                    hover_samples += 1;
                }
            }
            InteractionKind::View | InteractionKind::HoverStart => {}
        }

        if let Some(category) = event.category() {
            profile.categories_seen.insert(category.to_string());
        }
        sequence.push(kind_token(event.kind));
    }

    if hover_samples > 0 {
        profile.avg_hover_duration_ms = hover_total_ms as f64 / f64::from(hover_samples);
    }

    let first = events.first().map(|event| event.timestamp);
    let last = events.last().map(|event| event.timestamp);
    if let (Some(first), Some(last)) = (first, last) {
        profile.session_duration_ms = (last - first).num_milliseconds().max(0) as u64;
        if events.len() > 1 {
            profile.avg_time_between_actions_ms =
                profile.session_duration_ms as f64 / (events.len() - 1) as f64;
        }
    }

    let tail_start = sequence.len().saturating_sub(RECENT_SEQUENCE_LEN);
    profile.recent_action_sequence = sequence[tail_start..].join(">");

    profile
}

fn kind_token(kind: InteractionKind) -> &'static str {
    match kind {
        InteractionKind::View => "view",
        InteractionKind::HoverStart => "hover_start",
        InteractionKind::HoverEnd => "hover_end",
        InteractionKind::QuickBounce => "quick_bounce",
        InteractionKind::CartAdd => "cart_add",
        InteractionKind::CartRemove => "cart_remove",
        InteractionKind::WishlistAdd => "wishlist_add",
        InteractionKind::WishlistRemove => "wishlist_remove",
        InteractionKind::PageVisit => "page_visit",
    }
}
