use sia_core::{Kind, NotificationEvent};

/// Keyword fallback lists, kept as data so they can be tested apart from
/// the classification control flow. All matching is case-insensitive
/// substring search over title + message.
pub(crate) const SERVICE_CENTER_KEYWORDS: &[&str] = &[
    "tiket", "ticket", "bug", "fitur", "feature", "kontak", "contact",
];
pub(crate) const RESCHEDULE_KEYWORDS: &[&str] = &["reschedule"];
pub(crate) const CONFIRMATION_KEYWORDS: &[&str] = &["konfirmasi", "tidak bisa", "bisa"];
pub(crate) const ASSIGNMENT_KEYWORDS: &[&str] = &["jadwal", "assignment", "schedule"];

/// Assigns an event its [`Kind`]. The structured `notificationType` hint
/// wins when it matches a known family; otherwise the title/message
/// keyword lists decide, in service-center → reschedule → confirmation →
/// assignment order. An unmatched hint is carried through verbatim as
/// [`Kind::Opaque`] rather than rejected.
pub fn classify(event: &NotificationEvent) -> Kind {
    if let Some(hint) = event.payload.notification_type.as_deref() {
        let hint = hint.trim().to_lowercase();
        if hint.starts_with("reschedule") {
            return Kind::Reschedule;
        }
        if hint.contains("konfirmasi") || hint.contains("confirm") {
            return Kind::Confirmation;
        }
        if hint.contains("assignment") || hint.contains("jadwal") {
            return Kind::Assignment;
        }
    }

    let text = event_text(event);
    if contains_any(&text, SERVICE_CENTER_KEYWORDS) {
        return Kind::ServiceCenter;
    }
    if contains_any(&text, RESCHEDULE_KEYWORDS) {
        return Kind::Reschedule;
    }
    if contains_any(&text, CONFIRMATION_KEYWORDS) {
        return Kind::Confirmation;
    }
    if contains_any(&text, ASSIGNMENT_KEYWORDS) {
        return Kind::Assignment;
    }

    match event.payload.notification_type.as_deref() {
        Some(raw) if !raw.trim().is_empty() => Kind::Opaque(raw.trim().to_string()),
        _ => Kind::Other,
    }
}

pub(crate) fn event_text(event: &NotificationEvent) -> String {
    format!("{} {}", event.title, event.message).to_lowercase()
}

pub(crate) fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|needle| haystack.contains(needle))
}
