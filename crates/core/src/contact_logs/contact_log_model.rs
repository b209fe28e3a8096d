//! Contact log domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::voters::Coordinate;

/// Categorical outcome of an attempted voter contact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContactType {
    Knocked,
    Phone,
    Text,
    Email,
    NotHome,
    Refused,
    Moved,
    Deceased,
}

impl ContactType {
    /// Wire value, as serialized into API payloads and contact summaries.
    pub fn wire_name(&self) -> &'static str {
        match self {
            Self::Knocked => "knocked",
            Self::Phone => "phone",
            Self::Text => "text",
            Self::Email => "email",
            Self::NotHome => "not_home",
            Self::Refused => "refused",
            Self::Moved => "moved",
            Self::Deceased => "deceased",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Knocked => "Knocked",
            Self::Phone => "Phone",
            Self::Text => "Text",
            Self::Email => "Email",
            Self::NotHome => "Not Home",
            Self::Refused => "Refused",
            Self::Moved => "Moved",
            Self::Deceased => "Deceased",
        }
    }
}

/// One recorded voter contact.
///
/// The id is assigned on the device at creation time and never regenerated:
/// it doubles as the idempotency key for remote delivery, so resubmitting
/// the same log after a failed or ambiguous attempt cannot create a
/// duplicate server-side record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContactLog {
    pub id: String,
    pub assignment_id: String,
    pub voter_id: String,
    pub contact_type: ContactType,
    pub result: Option<String>,
    /// 1 (strong opponent) ..= 5 (strong support).
    pub support_level: Option<i32>,
    /// Device location at the time of contact.
    pub location: Coordinate,
    pub contacted_at: DateTime<Utc>,
}

/// Form input for a new contact log, before an id and timestamp are assigned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewContactLog {
    pub assignment_id: String,
    pub voter_id: String,
    pub contact_type: ContactType,
    pub result: Option<String>,
    pub support_level: Option<i32>,
    pub location: Coordinate,
}

impl ContactLog {
    /// Stamp a draft with a fresh UUIDv7 id and the current time.
    pub fn from_draft(draft: NewContactLog, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::now_v7().to_string(),
            assignment_id: draft.assignment_id,
            voter_id: draft.voter_id,
            contact_type: draft.contact_type,
            result: draft.result,
            support_level: draft.support_level,
            location: draft.location,
            contacted_at: now,
        }
    }
}
