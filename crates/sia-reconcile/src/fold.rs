use std::collections::BTreeMap;

use sia_core::{DedupKey, NotificationEvent};

use crate::classify::classify;
use crate::key::build_key;

/// Reduces the event list to the chronologically latest survivor per
/// dedup key. The comparison is non-strict: on an exact timestamp tie the
/// later-iterated event wins. Missing timestamps order before every dated
/// one, so an undated event never steals a slot from a dated one.
pub fn fold(events: &[NotificationEvent]) -> BTreeMap<DedupKey, NotificationEvent> {
    let mut canonical: BTreeMap<DedupKey, NotificationEvent> = BTreeMap::new();
    for event in events {
        let kind = classify(event);
        let key = build_key(event, &kind);
        let incoming_wins = canonical
            .get(&key)
            .map(|stored| event.created_at >= stored.created_at)
            .unwrap_or(true);
        if incoming_wins {
            canonical.insert(key, event.clone());
        }
    }
    canonical
}
