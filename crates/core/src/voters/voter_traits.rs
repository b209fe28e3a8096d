use async_trait::async_trait;

use crate::errors::Result;
use crate::voters::{ContactSummary, Voter};

/// Local mirror of voter records, upserted by id.
#[async_trait]
pub trait VoterRepositoryTrait: Send + Sync {
    async fn upsert_voter(&self, voter: Voter) -> Result<()>;

    fn get_voter(&self, voter_id: &str) -> Result<Option<Voter>>;

    /// Overwrite the denormalized last-contact projection for a voter.
    /// No-op when the voter is not cached locally.
    async fn update_last_contact(&self, voter_id: &str, summary: ContactSummary) -> Result<()>;
}
