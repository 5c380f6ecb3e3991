use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Placeholder component for events that carry no schedule reference, so
/// schedule-less events still dedup consistently among themselves.
pub const SCHEDULE_PLACEHOLDER: &str = "-";

/// Payload marker set by the admin console when a lecturer replacement
/// has been carried out for a schedule.
pub const ADMIN_ACTION_REPLACEMENT_SUCCESS: &str = "replacement_success";

/// Explicit availability status meaning the lecturer cannot teach.
pub const STATUS_TIDAK_BISA: &str = "tidak_bisa";

/// One record from the append-only notification log. Immutable once
/// constructed; the engine never mutates events, only builds new mappings
/// over them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NotificationEvent {
    pub id: u64,
    pub recipient_id: String,
    #[serde(default)]
    pub recipient_name: String,
    #[serde(default)]
    pub recipient_role: String,
    #[serde(default)]
    pub recipient_category: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub message: String,
    /// `None` means missing or unparsable upstream; `Option`'s natural
    /// ordering places it before every dated timestamp, which is the
    /// tie-break behavior the fold relies on.
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub is_read: bool,
    #[serde(default)]
    pub payload: EventPayload,
}

impl NotificationEvent {
    pub fn schedule_key(&self) -> ScheduleKey {
        ScheduleKey {
            schedule_type: self.payload.schedule_type,
            schedule_id: self.payload.schedule_id.clone(),
        }
    }

    /// Student recipients are detected via category or role, any case
    /// variant.
    pub fn is_student(&self) -> bool {
        normalize_role(&self.recipient_category) == "student"
            || normalize_role(&self.recipient_role) == "student"
    }

    /// Admin-like recipients are the only eligible targets of
    /// replacement-success events.
    pub fn is_admin_like(&self) -> bool {
        is_admin_role(&self.recipient_category) || is_admin_role(&self.recipient_role)
    }
}

fn normalize_role(raw: &str) -> String {
    raw.trim().to_lowercase().replace('_', "-")
}

fn is_admin_role(raw: &str) -> bool {
    matches!(
        normalize_role(raw).as_str(),
        "admin" | "super-admin" | "superadmin" | "tim-akademik" | "academic-team"
    )
}

/// Loosely structured event payload. Every field is optional and unknown
/// fields are preserved verbatim; a malformed payload decodes to the
/// default (empty) value at the boundary rather than failing the event.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct EventPayload {
    #[serde(default, rename = "notificationType")]
    pub notification_type: Option<String>,
    #[serde(default, rename = "scheduleId", deserialize_with = "deserialize_opt_id")]
    pub schedule_id: Option<String>,
    #[serde(default, rename = "scheduleType", deserialize_with = "deserialize_schedule_type")]
    pub schedule_type: Option<ScheduleType>,
    #[serde(default, rename = "statusKonfirmasi")]
    pub status_konfirmasi: Option<String>,
    #[serde(default, rename = "adminAction")]
    pub admin_action: Option<String>,
    #[serde(default, rename = "newLecturerName")]
    pub new_lecturer_name: Option<String>,
    #[serde(default, rename = "approvedBy")]
    pub approved_by: Option<String>,
    #[serde(default, rename = "rejectedBy")]
    pub rejected_by: Option<String>,
    #[serde(default, rename = "rescheduleStatus")]
    pub reschedule_status: Option<String>,
    #[serde(default, rename = "ticketId", deserialize_with = "deserialize_opt_id")]
    pub ticket_id: Option<String>,
    #[serde(default, rename = "ticketNumber", deserialize_with = "deserialize_opt_id")]
    pub ticket_number: Option<String>,
    #[serde(default, flatten)]
    pub extra: HashMap<String, Value>,
}

impl EventPayload {
    pub fn is_replacement_success(&self) -> bool {
        self.admin_action.as_deref() == Some(ADMIN_ACTION_REPLACEMENT_SUCCESS)
    }
}

/// The schedule types the academic console manages.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum ScheduleType {
    Pbl,
    Lecture,
    Practicum,
    JournalReading,
    Csr,
    NonBlockNonCsr,
    ConceptAlignment,
    PlenarySeminar,
}

impl ScheduleType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScheduleType::Pbl => "pbl",
            ScheduleType::Lecture => "lecture",
            ScheduleType::Practicum => "practicum",
            ScheduleType::JournalReading => "journal-reading",
            ScheduleType::Csr => "csr",
            ScheduleType::NonBlockNonCsr => "non-block-non-csr",
            ScheduleType::ConceptAlignment => "concept-alignment",
            ScheduleType::PlenarySeminar => "plenary-seminar",
        }
    }

    /// Schedule types that do not require a confirmation round; they
    /// default to available until explicitly marked otherwise.
    pub fn defaults_to_available(&self) -> bool {
        matches!(
            self,
            ScheduleType::ConceptAlignment | ScheduleType::PlenarySeminar
        )
    }
}

impl fmt::Display for ScheduleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ScheduleType {
    type Err = String;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let normalized = input.trim().to_lowercase().replace('_', "-");
        match normalized.as_str() {
            "pbl" => Ok(ScheduleType::Pbl),
            "lecture" | "kuliah" => Ok(ScheduleType::Lecture),
            "practicum" | "praktikum" => Ok(ScheduleType::Practicum),
            "journal-reading" => Ok(ScheduleType::JournalReading),
            "csr" => Ok(ScheduleType::Csr),
            "non-block-non-csr" => Ok(ScheduleType::NonBlockNonCsr),
            "concept-alignment" => Ok(ScheduleType::ConceptAlignment),
            "plenary-seminar" => Ok(ScheduleType::PlenarySeminar),
            other => Err(format!("Unknown schedule type: {other}")),
        }
    }
}

/// Identifies one concrete teaching session. Either component may be
/// absent; the rendered form substitutes [`SCHEDULE_PLACEHOLDER`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ScheduleKey {
    pub schedule_type: Option<ScheduleType>,
    pub schedule_id: Option<String>,
}

impl ScheduleKey {
    pub fn type_component(&self) -> &str {
        self.schedule_type
            .as_ref()
            .map(ScheduleType::as_str)
            .unwrap_or(SCHEDULE_PLACEHOLDER)
    }

    pub fn id_component(&self) -> &str {
        self.schedule_id.as_deref().unwrap_or(SCHEDULE_PLACEHOLDER)
    }
}

impl fmt::Display for ScheduleKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.type_component(), self.id_component())
    }
}

/// Inferred category of a notification event. Derived per invocation,
/// never stored.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Kind {
    Reschedule,
    Confirmation,
    Assignment,
    ServiceCenter,
    Other,
    /// An unrecognized `notificationType` string, passed through verbatim
    /// so new upstream event types are preserved rather than rejected.
    Opaque(String),
}

impl Kind {
    pub fn tag(&self) -> &str {
        match self {
            Kind::Reschedule => "reschedule",
            Kind::Confirmation => "confirmation",
            Kind::Assignment => "assignment",
            Kind::ServiceCenter => "service-center",
            Kind::Other => "other",
            Kind::Opaque(raw) => raw,
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Identity under which competing representations of the same fact are
/// folded to one survivor.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DedupKey {
    /// Service-center tickets never collapse into each other; the event id
    /// keeps every ticket update on its own row.
    ServiceTicket {
        ticket_id: String,
        ticket_number: String,
        event_id: u64,
    },
    /// Student rows converge per kind: a student's confirmation and a
    /// student's assignment for the same session stay separate.
    StudentSlot {
        schedule_type: String,
        schedule_id: String,
        kind: String,
        recipient_id: String,
    },
    /// Lecturer/admin rows converge to one current fact per session
    /// regardless of which kind of event last touched it.
    RecipientSlot {
        schedule_type: String,
        schedule_id: String,
        recipient_id: String,
    },
}

impl DedupKey {
    pub fn matches_slot(&self, schedule: &ScheduleKey, recipient_id: &str) -> bool {
        match self {
            DedupKey::ServiceTicket { .. } => false,
            DedupKey::StudentSlot {
                schedule_type,
                schedule_id,
                recipient_id: rid,
                ..
            }
            | DedupKey::RecipientSlot {
                schedule_type,
                schedule_id,
                recipient_id: rid,
            } => {
                schedule_type == schedule.type_component()
                    && schedule_id == schedule.id_component()
                    && rid == recipient_id
            }
        }
    }
}

/// Presentation status derived from a canonical entry.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ConfirmationStatus {
    Unavailable,
    WaitingReschedule,
    Available,
    Pending,
    ReplacementSucceeded,
    RescheduleApproved,
    RescheduleRejected,
    None,
}

impl ConfirmationStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Unavailable => "unavailable",
            Self::WaitingReschedule => "waiting_reschedule",
            Self::Available => "available",
            Self::Pending => "pending",
            Self::ReplacementSucceeded => "replacement_succeeded",
            Self::RescheduleApproved => "reschedule_approved",
            Self::RescheduleRejected => "reschedule_rejected",
            Self::None => "none",
        }
    }
}

impl fmt::Display for ConfirmationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Derivation output: the status plus an optional human-readable note
/// (e.g. "Approved by X" for resolved reschedule requests).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StatusBadge {
    pub status: ConfirmationStatus,
    pub admin_info: Option<String>,
}

impl StatusBadge {
    pub fn plain(status: ConfirmationStatus) -> Self {
        Self {
            status,
            admin_info: None,
        }
    }
}

fn deserialize_opt_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let val: Value = Value::deserialize(deserializer)?;
    match val {
        Value::String(s) if !s.trim().is_empty() => Ok(Some(s)),
        Value::Number(n) => Ok(Some(n.to_string())),
        _ => Ok(None),
    }
}

fn deserialize_schedule_type<'de, D>(deserializer: D) -> Result<Option<ScheduleType>, D::Error>
where
    D: Deserializer<'de>,
{
    let val: Value = Value::deserialize(deserializer)?;
    match val {
        Value::String(s) => Ok(s.parse().ok()),
        _ => Ok(None),
    }
}
