use sia_core::{DedupKey, Kind, NotificationEvent, SCHEDULE_PLACEHOLDER};

/// Computes the identity under which the fold collapses competing events.
///
/// Service-center events get a key unique per event so ticket updates
/// never merge. Student recipients keep the kind tag in the key: a
/// student's confirmation and assignment rows for one session stay
/// separate. Every other recipient converges to one slot per
/// (schedule, recipient) regardless of kind.
pub fn build_key(event: &NotificationEvent, kind: &Kind) -> DedupKey {
    if *kind == Kind::ServiceCenter {
        return DedupKey::ServiceTicket {
            ticket_id: payload_component(event.payload.ticket_id.as_deref()),
            ticket_number: payload_component(event.payload.ticket_number.as_deref()),
            event_id: event.id,
        };
    }

    let schedule = event.schedule_key();
    if event.is_student() {
        DedupKey::StudentSlot {
            schedule_type: schedule.type_component().to_string(),
            schedule_id: schedule.id_component().to_string(),
            kind: kind.tag().to_string(),
            recipient_id: event.recipient_id.clone(),
        }
    } else {
        DedupKey::RecipientSlot {
            schedule_type: schedule.type_component().to_string(),
            schedule_id: schedule.id_component().to_string(),
            recipient_id: event.recipient_id.clone(),
        }
    }
}

fn payload_component(raw: Option<&str>) -> String {
    match raw {
        Some(value) if !value.trim().is_empty() => value.to_string(),
        _ => SCHEDULE_PLACEHOLDER.to_string(),
    }
}
