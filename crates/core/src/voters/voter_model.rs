//! Voter records and the geographic coordinate value type.

use serde::{Deserialize, Serialize};

/// Geographic coordinate. Equality is exact value equality.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// Summary of the most recent contact with a voter.
///
/// This is a denormalized read projection kept on the voter record; it is
/// distinct from queued contact logs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactSummary {
    /// RFC 3339 timestamp of the contact, as delivered by the server.
    pub date: String,
    #[serde(rename = "type")]
    pub contact_type: String,
    pub result: Option<String>,
}

/// A voter record as served by the campaign API and mirrored locally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Voter {
    pub id: String,
    /// State registrar voter number (e.g. "TX12345678").
    pub voter_id: String,
    pub first_name: String,
    pub last_name: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip: String,
    pub location: Coordinate,
    pub party_affiliation: Option<String>,
    /// 1 (strong opponent) ..= 5 (strong support).
    pub support_level: Option<i32>,
    pub phone: Option<String>,
    pub email: Option<String>,
    /// Position within an assignment's walk list.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sequence_order: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_contact: Option<ContactSummary>,
}

impl Voter {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    pub fn full_address(&self) -> String {
        format!(
            "{}, {}, {} {}",
            self.address, self.city, self.state, self.zip
        )
    }

    pub fn support_level_description(&self) -> &'static str {
        match self.support_level {
            Some(1) => "Strong Opponent",
            Some(2) => "Lean Opponent",
            Some(3) => "Undecided",
            Some(4) => "Lean Support",
            Some(5) => "Strong Support",
            _ => "Unknown",
        }
    }
}
