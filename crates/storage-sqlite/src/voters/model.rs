//! Database model for cached voters.

use chrono::{DateTime, Utc};
use diesel::prelude::*;

use doorstep_core::voters::{ContactSummary, Coordinate, Voter};

use crate::convert::format_rfc3339;
use crate::errors::StorageError;

#[derive(Queryable, Identifiable, Insertable, AsChangeset, Selectable, Debug, Clone)]
#[diesel(table_name = crate::schema::voters)]
#[diesel(treat_none_as_null = true)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct VoterDB {
    pub id: String,
    pub voter_id: String,
    pub first_name: String,
    pub last_name: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip: String,
    pub latitude: f64,
    pub longitude: f64,
    pub party_affiliation: Option<String>,
    pub support_level: Option<i32>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub last_contact_at: Option<String>,
    pub last_contact_type: Option<String>,
    pub last_contact_result: Option<String>,
    pub updated_at: String,
}

pub(crate) fn to_voter(row: VoterDB) -> Result<Voter, StorageError> {
    let last_contact = match (row.last_contact_at, row.last_contact_type) {
        (Some(date), Some(contact_type)) => Some(ContactSummary {
            date,
            contact_type,
            result: row.last_contact_result,
        }),
        _ => None,
    };

    Ok(Voter {
        id: row.id,
        voter_id: row.voter_id,
        first_name: row.first_name,
        last_name: row.last_name,
        address: row.address,
        city: row.city,
        state: row.state,
        zip: row.zip,
        location: Coordinate::new(row.latitude, row.longitude),
        party_affiliation: row.party_affiliation,
        support_level: row.support_level,
        phone: row.phone,
        email: row.email,
        sequence_order: None,
        last_contact,
    })
}

pub(crate) fn from_voter(voter: &Voter, now: &DateTime<Utc>) -> VoterDB {
    let (last_contact_at, last_contact_type, last_contact_result) = match &voter.last_contact {
        Some(summary) => (
            Some(summary.date.clone()),
            Some(summary.contact_type.clone()),
            summary.result.clone(),
        ),
        None => (None, None, None),
    };

    VoterDB {
        id: voter.id.clone(),
        voter_id: voter.voter_id.clone(),
        first_name: voter.first_name.clone(),
        last_name: voter.last_name.clone(),
        address: voter.address.clone(),
        city: voter.city.clone(),
        state: voter.state.clone(),
        zip: voter.zip.clone(),
        latitude: voter.location.latitude,
        longitude: voter.location.longitude,
        party_affiliation: voter.party_affiliation.clone(),
        support_level: voter.support_level,
        phone: voter.phone.clone(),
        email: voter.email.clone(),
        last_contact_at,
        last_contact_type,
        last_contact_result,
        updated_at: format_rfc3339(now),
    }
}
