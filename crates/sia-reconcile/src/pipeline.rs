use std::str::FromStr;

use sia_core::NotificationEvent;

use crate::classify::{contains_any, event_text, ASSIGNMENT_KEYWORDS, CONFIRMATION_KEYWORDS};
use crate::fold::fold;
use crate::reconcile::reconcile_replacements;

/// Kind filter applied by the console. Unlike [`crate::classify`], this is
/// evaluated against title/message text only, never the structured hint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum KindFilter {
    #[default]
    All,
    Confirmation,
    Assignment,
    Other,
}

impl FromStr for KindFilter {
    type Err = String;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        match input.trim().to_lowercase().as_str() {
            "all" | "" => Ok(KindFilter::All),
            "confirmation" | "konfirmasi" => Ok(KindFilter::Confirmation),
            "assignment" | "jadwal" => Ok(KindFilter::Assignment),
            "other" => Ok(KindFilter::Other),
            other => Err(format!("Unknown kind filter: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReadFilter {
    #[default]
    All,
    Read,
    Unread,
}

impl FromStr for ReadFilter {
    type Err = String;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        match input.trim().to_lowercase().as_str() {
            "all" | "" => Ok(ReadFilter::All),
            "read" => Ok(ReadFilter::Read),
            "unread" => Ok(ReadFilter::Unread),
            other => Err(format!("Unknown read filter: {other}")),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ReconcileFilter {
    pub search: Option<String>,
    pub kind: KindFilter,
    pub read: ReadFilter,
}

/// Composed pipeline: fold, reconcile replacements, filter, sort. The
/// result is ordered newest-first (ties broken by descending id so
/// repeated invocations on the same snapshot render identically); the
/// caller paginates.
pub fn reconcile(events: &[NotificationEvent], filter: &ReconcileFilter) -> Vec<NotificationEvent> {
    let folded = fold(events);
    let canonical = reconcile_replacements(&folded, events);

    let mut rows: Vec<NotificationEvent> = canonical.into_values().collect();

    if let Some(search) = filter.search.as_deref() {
        let needle = search.trim().to_lowercase();
        if !needle.is_empty() {
            rows.retain(|event| {
                [
                    event.recipient_name.as_str(),
                    event.title.as_str(),
                    event.message.as_str(),
                    event.recipient_category.as_str(),
                ]
                .iter()
                .any(|field| field.to_lowercase().contains(&needle))
            });
        }
    }

    rows.retain(|event| matches_kind(event, filter.kind));
    rows.retain(|event| match filter.read {
        ReadFilter::All => true,
        ReadFilter::Read => event.is_read,
        ReadFilter::Unread => !event.is_read,
    });

    rows.sort_by(|a, b| {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| b.id.cmp(&a.id))
    });
    rows
}

fn matches_kind(event: &NotificationEvent, filter: KindFilter) -> bool {
    let text = event_text(event);
    match filter {
        KindFilter::All => true,
        KindFilter::Confirmation => contains_any(&text, CONFIRMATION_KEYWORDS),
        KindFilter::Assignment => contains_any(&text, ASSIGNMENT_KEYWORDS),
        KindFilter::Other => {
            !contains_any(&text, CONFIRMATION_KEYWORDS)
                && !contains_any(&text, ASSIGNMENT_KEYWORDS)
        }
    }
}

/// Page slice helper for callers; pages are 1-based.
pub fn paginate<T>(rows: &[T], page: usize, per_page: usize) -> &[T] {
    if per_page == 0 {
        return &rows[..0];
    }
    let start = page.saturating_sub(1).saturating_mul(per_page);
    if start >= rows.len() {
        return &rows[..0];
    }
    let end = (start + per_page).min(rows.len());
    &rows[start..end]
}
