//! Persistence port for the local mirror.

use crate::mirror::domain::{AnswerKeyValue, Assignment, AssignmentId, Hit, HitId};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for mirror store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Transactional persistence contract for mirrored records.
///
/// Every `get_or_create` must be race-safe on the remote id: two overlapping
/// sync paths observing the same new id concurrently must converge on one
/// row. Implementations back this with a unique constraint (relational) or a
/// single-lock entry (in-memory). Saves overwrite the full row atomically;
/// no cross-entity transaction is offered or required.
#[async_trait]
pub trait MirrorStore: Send + Sync {
    /// Returns the HIT record for a remote id, creating an empty one on first
    /// observation.
    async fn get_or_create_hit(&self, hit_id: &HitId) -> StoreResult<Hit>;

    /// Finds a HIT record by remote id.
    async fn find_hit(&self, hit_id: &HitId) -> StoreResult<Option<Hit>>;

    /// Persists a HIT record, overwriting any existing row.
    async fn save_hit(&self, hit: &Hit) -> StoreResult<()>;

    /// Returns the assignment record for a remote id, creating an empty one
    /// owned by `hit_id` on first observation.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::HitNotFound`] when the owning HIT has no local
    /// row, and [`StoreError::AssignmentOwnedByOtherHit`] when the assignment
    /// already exists under a different HIT — assignments never migrate.
    async fn get_or_create_assignment(
        &self,
        assignment_id: &AssignmentId,
        hit_id: &HitId,
    ) -> StoreResult<Assignment>;

    /// Finds an assignment record by remote id.
    async fn find_assignment(&self, assignment_id: &AssignmentId)
    -> StoreResult<Option<Assignment>>;

    /// Persists an assignment record, overwriting any existing row.
    async fn save_assignment(&self, assignment: &Assignment) -> StoreResult<()>;

    /// Lists every assignment owned by a HIT.
    async fn assignments_for_hit(&self, hit_id: &HitId) -> StoreResult<Vec<Assignment>>;

    /// Returns the answer record for an `(assignment, key)` pair, creating an
    /// empty one on first observation.
    async fn get_or_create_answer(
        &self,
        assignment_id: &AssignmentId,
        key: &str,
    ) -> StoreResult<AnswerKeyValue>;

    /// Persists an answer record, overwriting any existing row.
    async fn save_answer(&self, answer: &AnswerKeyValue) -> StoreResult<()>;

    /// Lists every answer owned by an assignment, ordered by key.
    async fn answers_for_assignment(
        &self,
        assignment_id: &AssignmentId,
    ) -> StoreResult<Vec<AnswerKeyValue>>;
}

/// Errors returned by mirror store implementations.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// An assignment get-or-create named a HIT other than the owning one.
    #[error(
        "assignment {assignment_id} belongs to HIT {actual}, \
         refusing get-or-create under HIT {requested}"
    )]
    AssignmentOwnedByOtherHit {
        /// Remote id of the assignment.
        assignment_id: AssignmentId,
        /// HIT named by the caller.
        requested: HitId,
        /// HIT the assignment actually belongs to.
        actual: HitId,
    },

    /// A child record was requested under a HIT with no local row.
    #[error("HIT {0} has no local record")]
    HitNotFound(HitId),

    /// An answer record was requested under an assignment with no local row.
    #[error("assignment {0} has no local record")]
    AssignmentNotFound(AssignmentId),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl StoreError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
