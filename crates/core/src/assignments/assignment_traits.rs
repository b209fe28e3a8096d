use async_trait::async_trait;

use crate::assignments::Assignment;
use crate::errors::Result;

/// Local mirror of server assignments, upserted by id.
#[async_trait]
pub trait AssignmentRepositoryTrait: Send + Sync {
    /// Idempotent upsert. When the assignment carries a walk list, the
    /// embedded voters and their ordering are persisted as well.
    async fn upsert_assignment(&self, assignment: Assignment) -> Result<()>;

    /// Single assignment with its cached walk list re-attached (in walk
    /// order), or `None` when it was never cached.
    fn get_assignment(&self, assignment_id: &str) -> Result<Option<Assignment>>;

    /// All cached assignments ordered by assigned date descending, walk
    /// lists omitted.
    fn list_assignments(&self) -> Result<Vec<Assignment>>;
}
