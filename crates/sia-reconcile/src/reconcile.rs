use std::collections::{BTreeMap, BTreeSet};

use regex::Regex;
use sia_core::{DedupKey, NotificationEvent, ScheduleKey, STATUS_TIDAK_BISA};

use crate::classify::classify;
use crate::key::build_key;

/// Free-text patterns that mark an event as an "unavailable" status
/// change when the structured `statusKonfirmasi` field is absent.
pub(crate) const UNAVAILABLE_PATTERNS: &[&str] = &[
    r"(?i)tidak\s+bisa",
    r"(?i)tidak\s+dapat",
    r"(?i)diganti\s+dosen\s+lain",
    r"(?i)cannot\s+teach",
    r"(?i)unavailable",
];

pub(crate) fn unavailable_patterns() -> Vec<Regex> {
    UNAVAILABLE_PATTERNS
        .iter()
        .map(|pattern| Regex::new(pattern).expect("valid regex"))
        .collect()
}

pub(crate) fn is_status_change(event: &NotificationEvent, patterns: &[Regex]) -> bool {
    if event.payload.status_konfirmasi.as_deref() == Some(STATUS_TIDAK_BISA) {
        return true;
    }
    patterns
        .iter()
        .any(|pattern| pattern.is_match(&event.title) || pattern.is_match(&event.message))
}

fn is_replacement(event: &NotificationEvent) -> bool {
    event.payload.is_replacement_success() && event.is_admin_like()
}

/// Second fold pass: resolves the conflict between "lecturer unavailable"
/// status changes and admin-side "replacement succeeded" events, which can
/// survive the basic fold under different dedup keys even though they
/// describe the same slot.
///
/// For every (schedule, recipient) pair seen in the raw log, both
/// candidate representations are cleared from the canonical map and only
/// the winner is reinserted under its recomputed key. A replacement beats
/// a status change only on a strictly later timestamp; on an exact tie
/// the status change wins, which is the opposite direction from the basic
/// fold's tie-break. Slots are resolved independently: one recipient's
/// replacement cycle never evicts another recipient's entries.
pub fn reconcile_replacements(
    folded: &BTreeMap<DedupKey, NotificationEvent>,
    events: &[NotificationEvent],
) -> BTreeMap<DedupKey, NotificationEvent> {
    let mut canonical = folded.clone();
    let patterns = unavailable_patterns();

    let mut slots: BTreeMap<(ScheduleKey, String), Vec<&NotificationEvent>> = BTreeMap::new();
    for event in events {
        slots
            .entry((event.schedule_key(), event.recipient_id.clone()))
            .or_default()
            .push(event);
    }

    for ((schedule, recipient_id), group) in &slots {
        let status_changes: Vec<&NotificationEvent> = group
            .iter()
            .copied()
            .filter(|event| is_status_change(event, &patterns))
            .collect();
        let replacements: Vec<&NotificationEvent> = group
            .iter()
            .copied()
            .filter(|event| is_replacement(event))
            .collect();
        if status_changes.is_empty() && replacements.is_empty() {
            continue;
        }

        let newest_status_change = newest(&status_changes);
        let newest_replacement = newest(&replacements);

        // Clear both candidate representations for this slot before
        // reinserting the winner; anything not in the candidate sets
        // stays put.
        let candidate_ids: BTreeSet<u64> = status_changes
            .iter()
            .chain(replacements.iter())
            .map(|event| event.id)
            .collect();
        canonical.retain(|key, entry| {
            !(key.matches_slot(schedule, recipient_id) && candidate_ids.contains(&entry.id))
        });

        let winner = match (newest_status_change, newest_replacement) {
            // Strict comparison: a replacement only beats a status change
            // when it is strictly later; the status change wins ties.
            (Some(status), Some(replacement)) => {
                if replacement.created_at > status.created_at {
                    replacement
                } else {
                    status
                }
            }
            (Some(status), None) => status,
            (None, Some(replacement)) => replacement,
            (None, None) => continue,
        };

        let kind = classify(winner);
        canonical.insert(build_key(winner, &kind), winner.clone());
    }

    canonical
}

/// Most recent event by timestamp; on exact ties the later-iterated one
/// wins, mirroring the basic fold so candidate selection is stable.
fn newest<'a>(events: &[&'a NotificationEvent]) -> Option<&'a NotificationEvent> {
    let mut best: Option<&'a NotificationEvent> = None;
    for &event in events {
        let wins = best
            .map(|current| event.created_at >= current.created_at)
            .unwrap_or(true);
        if wins {
            best = Some(event);
        }
    }
    best
}
