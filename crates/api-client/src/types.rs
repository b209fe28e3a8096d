//! Request/response DTOs for the campaign REST API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use doorstep_core::assignments::{Assignment, AssignmentStatus};
use doorstep_core::contact_logs::{ContactLog, ContactType};
use doorstep_core::voters::{Coordinate, Voter};

/// Envelope for `GET /assignments`.
#[derive(Debug, Clone, Deserialize)]
pub struct AssignmentsResponse {
    pub assignments: Vec<Assignment>,
}

/// Envelope for `GET /voters`.
#[derive(Debug, Clone, Deserialize)]
pub struct VotersResponse {
    pub voters: Vec<Voter>,
    pub total: Option<i64>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Envelope for `GET /contact-logs`.
#[derive(Debug, Clone, Deserialize)]
pub struct ContactLogsResponse {
    pub logs: Vec<ContactLog>,
}

/// Body for `PATCH /assignments/{id}`.
#[derive(Debug, Clone, Serialize)]
pub struct UpdateAssignmentStatusRequest {
    pub status: AssignmentStatus,
}

/// Body for `POST /contact-logs`.
///
/// The `id` is the client-assigned idempotency key: the server is expected
/// to dedupe repeated submissions carrying the same id.
#[derive(Debug, Clone, Serialize)]
pub struct CreateContactLogRequest {
    pub id: String,
    pub assignment_id: String,
    pub voter_id: String,
    pub contact_type: ContactType,
    pub result: Option<String>,
    pub support_level: Option<i32>,
    pub location: Coordinate,
    pub contacted_at: DateTime<Utc>,
}

impl From<&ContactLog> for CreateContactLogRequest {
    fn from(log: &ContactLog) -> Self {
        Self {
            id: log.id.clone(),
            assignment_id: log.assignment_id.clone(),
            voter_id: log.voter_id.clone(),
            contact_type: log.contact_type,
            result: log.result.clone(),
            support_level: log.support_level,
            location: log.location,
            contacted_at: log.contacted_at,
        }
    }
}

/// Query filter for `GET /voters`.
#[derive(Debug, Clone)]
pub struct VoterFilter {
    pub zip: Option<String>,
    pub limit: i64,
    pub offset: i64,
}

impl Default for VoterFilter {
    fn default() -> Self {
        Self {
            zip: None,
            limit: 50,
            offset: 0,
        }
    }
}

/// Query filter for `GET /contact-logs`.
#[derive(Debug, Clone, Default)]
pub struct ContactLogFilter {
    pub assignment_id: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
}

/// Error body shape produced by the backend (`{"detail": ...}`).
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorBody {
    pub detail: Option<String>,
}
