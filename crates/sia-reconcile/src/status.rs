use std::collections::BTreeMap;

use sia_core::{ConfirmationStatus, NotificationEvent, ScheduleKey, StatusBadge};

use crate::classify::{contains_any, event_text};
use crate::reconcile::{is_status_change, unavailable_patterns};

/// External per-schedule status source. The backend may hold a fresher
/// confirmation status than the one embedded in an event payload; when it
/// does, the looked-up value takes precedence.
pub trait StatusLookup {
    fn status_for(&self, key: &ScheduleKey) -> Option<String>;
}

/// Lookup that knows nothing; derivation falls back to payload fields.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoStatusLookup;

impl StatusLookup for NoStatusLookup {
    fn status_for(&self, _key: &ScheduleKey) -> Option<String> {
        None
    }
}

/// BTreeMap-backed lookup for tests and the snapshot console.
#[derive(Debug, Default, Clone)]
pub struct MemoryStatusLookup {
    statuses: BTreeMap<ScheduleKey, String>,
}

impl MemoryStatusLookup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: ScheduleKey, status: impl Into<String>) {
        self.statuses.insert(key, status.into());
    }
}

impl StatusLookup for MemoryStatusLookup {
    fn status_for(&self, key: &ScheduleKey) -> Option<String> {
        self.statuses.get(key).cloned()
    }
}

const NEUTRAL_STATUSES: &[&str] = &["", "pending"];

fn is_neutral(status: &str) -> bool {
    NEUTRAL_STATUSES.contains(&status)
        || status.contains("belum")
        || status.contains("not yet")
}

/// Maps a canonical entry (plus the external status lookup) to the badge
/// shown for it. Pure function; the precedence order is load-bearing and
/// evaluated strictly top to bottom:
///
/// 1. any explicit "tidak" status → unavailable, even over a
///    replacement-success marker
/// 2./3. concept-alignment and plenary-seminar sessions need no
///    confirmation and read as available while the status is neutral
/// 4. replacement succeeded
/// 5. waiting for reschedule
/// 6./7./8. explicit unavailable / available / pending
/// 9. keyword fallback over title and message
/// 10. resolved reschedule requests, with the approver/rejecter name
/// 11. no badge
pub fn derive_status(event: &NotificationEvent, lookup: &dyn StatusLookup) -> StatusBadge {
    let schedule = event.schedule_key();
    let explicit_raw = lookup
        .status_for(&schedule)
        .or_else(|| event.payload.status_konfirmasi.clone());
    let explicit = explicit_raw.as_deref().map(|s| s.trim().to_lowercase());

    if let Some(status) = &explicit {
        if status.contains("tidak") {
            return StatusBadge::plain(ConfirmationStatus::Unavailable);
        }
    }

    let patterns = unavailable_patterns();
    let defaults_available = schedule
        .schedule_type
        .map(|t| t.defaults_to_available())
        .unwrap_or(false);
    if defaults_available {
        let requires_no_confirmation = match &explicit {
            None => {
                !is_status_change(event, &patterns) && !event.payload.is_replacement_success()
            }
            Some(status) => is_neutral(status),
        };
        if requires_no_confirmation {
            return StatusBadge::plain(ConfirmationStatus::Available);
        }
    }

    if event.payload.is_replacement_success() {
        return StatusBadge::plain(ConfirmationStatus::ReplacementSucceeded);
    }

    if let Some(status) = &explicit {
        if status.contains("waiting_reschedule")
            || status.contains("menunggu_reschedule")
            || status == "waiting"
        {
            return StatusBadge::plain(ConfirmationStatus::WaitingReschedule);
        }
    }

    // Second look at the raw payload field: the lookup value may have
    // shadowed an explicit decline stored on the event itself.
    if let Some(raw) = event.payload.status_konfirmasi.as_deref() {
        if raw.to_lowercase().contains("tidak") {
            return StatusBadge::plain(ConfirmationStatus::Unavailable);
        }
    }

    if let Some(status) = &explicit {
        if status.contains("bisa") {
            return StatusBadge::plain(ConfirmationStatus::Available);
        }
        if is_neutral(status) {
            return StatusBadge::plain(ConfirmationStatus::Pending);
        }
    }

    let text = event_text(event);
    if contains_any(&text, &["tidak bisa", "tidak dapat", "diganti dosen lain"]) {
        return StatusBadge::plain(ConfirmationStatus::Unavailable);
    }
    if text.contains("bisa") {
        return StatusBadge::plain(ConfirmationStatus::Available);
    }
    if explicit.is_none() && contains_any(&text, &["konfirmasi", "ketersediaan"]) {
        return StatusBadge::plain(ConfirmationStatus::Pending);
    }

    match event.payload.reschedule_status.as_deref() {
        Some("approved") => {
            if let Some(approver) = event.payload.approved_by.as_deref() {
                return StatusBadge {
                    status: ConfirmationStatus::RescheduleApproved,
                    admin_info: Some(format!("Approved by {approver}")),
                };
            }
        }
        Some("rejected") => {
            if let Some(rejecter) = event.payload.rejected_by.as_deref() {
                return StatusBadge {
                    status: ConfirmationStatus::RescheduleRejected,
                    admin_info: Some(format!("Rejected by {rejecter}")),
                };
            }
        }
        _ => {}
    }

    StatusBadge::plain(ConfirmationStatus::None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sia_core::{
        EventPayload, ScheduleType, ADMIN_ACTION_REPLACEMENT_SUCCESS, STATUS_TIDAK_BISA,
    };

    fn event(schedule_type: Option<ScheduleType>) -> NotificationEvent {
        NotificationEvent {
            id: 1,
            recipient_id: "dsn-4".into(),
            recipient_name: String::new(),
            recipient_role: "dosen".into(),
            recipient_category: "lecturer".into(),
            title: String::new(),
            message: String::new(),
            created_at: None,
            is_read: false,
            payload: EventPayload {
                schedule_id: Some("31".into()),
                schedule_type,
                ..EventPayload::default()
            },
        }
    }

    fn derive(event: &NotificationEvent) -> StatusBadge {
        derive_status(event, &NoStatusLookup)
    }

    #[test]
    fn explicit_decline_beats_replacement_marker() {
        let mut e = event(Some(ScheduleType::Lecture));
        e.payload.status_konfirmasi = Some(STATUS_TIDAK_BISA.into());
        e.payload.admin_action = Some(ADMIN_ACTION_REPLACEMENT_SUCCESS.into());
        assert_eq!(derive(&e).status, ConfirmationStatus::Unavailable);
    }

    #[test]
    fn replacement_marker_alone_derives_replacement_succeeded() {
        let mut e = event(Some(ScheduleType::Lecture));
        e.payload.admin_action = Some(ADMIN_ACTION_REPLACEMENT_SUCCESS.into());
        assert_eq!(derive(&e).status, ConfirmationStatus::ReplacementSucceeded);
    }

    #[test]
    fn lookup_value_overrides_payload_status() {
        let mut e = event(Some(ScheduleType::Lecture));
        e.payload.status_konfirmasi = Some("bisa".into());
        let mut lookup = MemoryStatusLookup::new();
        lookup.insert(e.schedule_key(), STATUS_TIDAK_BISA);
        assert_eq!(
            derive_status(&e, &lookup).status,
            ConfirmationStatus::Unavailable
        );
    }

    #[test]
    fn waiting_lookup_value_precedes_raw_payload_decline() {
        let mut e = event(Some(ScheduleType::Lecture));
        e.payload.status_konfirmasi = Some(STATUS_TIDAK_BISA.into());
        let mut lookup = MemoryStatusLookup::new();
        lookup.insert(e.schedule_key(), "waiting");
        assert_eq!(
            derive_status(&e, &lookup).status,
            ConfirmationStatus::WaitingReschedule
        );
    }

    #[test]
    fn raw_payload_decline_surfaces_past_an_opaque_lookup_value() {
        let mut e = event(Some(ScheduleType::Lecture));
        e.payload.status_konfirmasi = Some(STATUS_TIDAK_BISA.into());
        let mut lookup = MemoryStatusLookup::new();
        lookup.insert(e.schedule_key(), "rescheduled");
        assert_eq!(
            derive_status(&e, &lookup).status,
            ConfirmationStatus::Unavailable
        );
    }

    #[test]
    fn plenary_seminar_assignment_defaults_to_available() {
        let mut e = event(Some(ScheduleType::PlenarySeminar));
        e.title = "Jadwal Seminar Pleno".into();
        assert_eq!(derive(&e).status, ConfirmationStatus::Available);
    }

    #[test]
    fn concept_alignment_pending_status_still_reads_available() {
        let mut e = event(Some(ScheduleType::ConceptAlignment));
        e.payload.status_konfirmasi = Some("pending".into());
        assert_eq!(derive(&e).status, ConfirmationStatus::Available);
    }

    #[test]
    fn default_available_type_still_reports_explicit_decline() {
        let mut e = event(Some(ScheduleType::PlenarySeminar));
        e.payload.status_konfirmasi = Some(STATUS_TIDAK_BISA.into());
        assert_eq!(derive(&e).status, ConfirmationStatus::Unavailable);
    }

    #[test]
    fn waiting_reschedule_status_maps_to_badge() {
        let mut e = event(Some(ScheduleType::Lecture));
        e.payload.status_konfirmasi = Some("menunggu_reschedule".into());
        assert_eq!(derive(&e).status, ConfirmationStatus::WaitingReschedule);
    }

    #[test]
    fn explicit_available_and_pending_statuses() {
        let mut e = event(Some(ScheduleType::Lecture));
        e.payload.status_konfirmasi = Some("bisa".into());
        assert_eq!(derive(&e).status, ConfirmationStatus::Available);

        e.payload.status_konfirmasi = Some("pending".into());
        assert_eq!(derive(&e).status, ConfirmationStatus::Pending);
    }

    #[test]
    fn keyword_fallback_reads_title_and_message() {
        let mut e = event(Some(ScheduleType::Lecture));
        e.message = "Dosen tidak dapat hadir pada sesi ini".into();
        assert_eq!(derive(&e).status, ConfirmationStatus::Unavailable);

        let mut e = event(Some(ScheduleType::Lecture));
        e.message = "Dosen menyatakan bisa mengajar".into();
        assert_eq!(derive(&e).status, ConfirmationStatus::Available);

        let mut e = event(Some(ScheduleType::Lecture));
        e.title = "Konfirmasi Ketersediaan".into();
        assert_eq!(derive(&e).status, ConfirmationStatus::Pending);
    }

    #[test]
    fn resolved_reschedules_carry_admin_info() {
        let mut e = event(Some(ScheduleType::Lecture));
        e.payload.reschedule_status = Some("approved".into());
        e.payload.approved_by = Some("Dr. Rektor".into());
        let badge = derive(&e);
        assert_eq!(badge.status, ConfirmationStatus::RescheduleApproved);
        assert_eq!(badge.admin_info.as_deref(), Some("Approved by Dr. Rektor"));

        let mut e = event(Some(ScheduleType::Lecture));
        e.payload.reschedule_status = Some("rejected".into());
        e.payload.rejected_by = Some("Kaprodi".into());
        let badge = derive(&e);
        assert_eq!(badge.status, ConfirmationStatus::RescheduleRejected);
        assert_eq!(badge.admin_info.as_deref(), Some("Rejected by Kaprodi"));
    }

    #[test]
    fn unbadged_event_derives_none() {
        let mut e = event(Some(ScheduleType::Lecture));
        e.title = "Pengumuman Libur".into();
        let badge = derive(&e);
        assert_eq!(badge.status, ConfirmationStatus::None);
        assert_eq!(badge.admin_info, None);
    }

    #[test]
    fn derivation_is_pure() {
        let mut e = event(Some(ScheduleType::Lecture));
        e.payload.status_konfirmasi = Some("bisa".into());
        assert_eq!(derive(&e), derive(&e));
    }
}
