//! Requester-side lifecycle operations: disable, dispose, expire, extend,
//! review transitions, approval, rejection, and bonuses.
//!
//! Every operation follows the same shape: validate locally, call the remote
//! marketplace, then resync the affected records so the mirror reflects the
//! post-mutation state. A failed remote call propagates before any resync, so
//! the mirror keeps the last state the marketplace confirmed.

use super::sync::{SyncError, SyncService};
use crate::mirror::{
    domain::{Assignment, AssignmentId, AssignmentStatus, Hit, HitId, HitStatus, Reward},
    ports::{MarketplaceClient, MarketplaceError, MirrorStore, StoreError},
};
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;

/// Preconditions that block a dispose.
#[derive(Debug, Error)]
pub enum DisposeError {
    /// The HIT is not in the reviewable state.
    #[error("HIT {hit_id} is not reviewable (current status: {actual:?})")]
    HitNotReviewable {
        /// HIT that was asked to be disposed.
        hit_id: HitId,
        /// Status observed after the pre-dispose resync.
        actual: Option<HitStatus>,
    },
    /// A mirrored assignment is still awaiting approval or rejection.
    #[error(
        "HIT {hit_id} has unresolved assignment {assignment_id} (current status: {actual:?})"
    )]
    AssignmentUnresolved {
        /// HIT that was asked to be disposed.
        hit_id: HitId,
        /// Assignment that is not yet approved or rejected.
        assignment_id: AssignmentId,
        /// Status observed after the pre-dispose resync.
        actual: Option<AssignmentStatus>,
    },
}

/// Errors surfaced by lifecycle operations.
#[derive(Debug, Error)]
pub enum LifecycleError {
    /// A dispose precondition failed.
    #[error(transparent)]
    Dispose(#[from] DisposeError),
    /// Remote marketplace call failed.
    #[error(transparent)]
    Remote(#[from] MarketplaceError),
    /// Resync after the remote mutation failed.
    #[error(transparent)]
    Sync(#[from] SyncError),
    /// Local store operation failed.
    #[error(transparent)]
    Store(#[from] StoreError),
    /// The operation needs a locally mirrored assignment record.
    #[error("assignment {0} is not mirrored locally")]
    AssignmentNotMirrored(AssignmentId),
    /// The mirrored assignment has no worker id to address the bonus to.
    #[error("assignment {0} has no mirrored worker id")]
    MissingWorkerId(AssignmentId),
    /// Bonus amounts must be positive.
    #[error("bonus amount {0} is not positive")]
    InvalidBonusAmount(Reward),
}

/// Result type for lifecycle operations.
pub type LifecycleResult<T> = Result<T, LifecycleError>;

/// Orchestrates requester-side marketplace mutations against the mirror.
#[derive(Clone)]
pub struct LifecycleService<C, S, K>
where
    C: MarketplaceClient,
    S: MirrorStore,
    K: Clock,
{
    client: Arc<C>,
    store: Arc<S>,
    sync: SyncService<C, S, K>,
}

impl<C, S, K> LifecycleService<C, S, K>
where
    C: MarketplaceClient,
    S: MirrorStore,
    K: Clock,
{
    /// Creates a lifecycle service sharing the sync service's client and
    /// store.
    #[must_use]
    pub fn new(client: Arc<C>, store: Arc<S>, clock: Arc<K>) -> Self {
        let sync = SyncService::new(Arc::clone(&client), Arc::clone(&store), clock);
        Self {
            client,
            store,
            sync,
        }
    }

    /// Returns the sync service this lifecycle service drives resyncs with.
    #[must_use]
    pub const fn sync(&self) -> &SyncService<C, S, K> {
        &self.sync
    }

    /// Disables a HIT: captures its final remote state, assignments and
    /// answers included, then removes it from the marketplace.
    ///
    /// No resync follows the removal; the mirror keeps the pre-removal state
    /// as the permanent record of what the HIT looked like.
    ///
    /// # Errors
    ///
    /// Returns a sync error when the final capture fails and a remote error
    /// when the marketplace refuses the removal. A failed capture leaves the
    /// HIT on the marketplace.
    pub async fn disable_hit(&self, hit_id: &HitId) -> LifecycleResult<Hit> {
        let hit = self.sync.refresh_hit(hit_id, true).await?;
        self.client.dispose_hit(hit_id).await?;
        tracing::info!(hit_id = %hit_id, "disabled HIT after capturing final state");
        Ok(hit)
    }

    /// Disposes a reviewable HIT whose assignments are all resolved.
    ///
    /// A HIT already mirrored as disposed is returned as-is without any
    /// remote call, so repeating a dispose is harmless. Otherwise the HIT is
    /// resynced first and the preconditions are checked against the fresh
    /// state.
    ///
    /// # Errors
    ///
    /// Returns [`DisposeError::HitNotReviewable`] unless the resynced status
    /// is reviewable, and [`DisposeError::AssignmentUnresolved`] when any
    /// mirrored assignment is still awaiting approval or rejection.
    pub async fn dispose_hit(&self, hit_id: &HitId) -> LifecycleResult<Hit> {
        if let Some(hit) = self.store.find_hit(hit_id).await? {
            if hit.is_disposed() {
                tracing::debug!(hit_id = %hit_id, "HIT already disposed, skipping");
                return Ok(hit);
            }
        }

        let hit = self.sync.refresh_hit(hit_id, true).await?;
        if hit.status() != Some(HitStatus::Reviewable) {
            return Err(DisposeError::HitNotReviewable {
                hit_id: hit_id.clone(),
                actual: hit.status(),
            }
            .into());
        }
        for assignment in self.store.assignments_for_hit(hit_id).await? {
            if !assignment.is_resolved() {
                return Err(DisposeError::AssignmentUnresolved {
                    hit_id: hit_id.clone(),
                    assignment_id: assignment.remote_id().clone(),
                    actual: assignment.status(),
                }
                .into());
            }
        }

        self.client.dispose_hit(hit_id).await?;
        let disposed = self.sync.refresh_hit(hit_id, false).await?;
        tracing::info!(hit_id = %hit_id, "disposed HIT");
        Ok(disposed)
    }

    /// Expires a HIT immediately, then resyncs it.
    ///
    /// # Errors
    ///
    /// Returns a remote error when the marketplace refuses, in which case no
    /// resync happens.
    pub async fn expire_hit(&self, hit_id: &HitId) -> LifecycleResult<Hit> {
        self.client.expire_hit(hit_id).await?;
        let hit = self.sync.refresh_hit(hit_id, false).await?;
        tracing::info!(hit_id = %hit_id, "expired HIT");
        Ok(hit)
    }

    /// Extends a HIT with extra assignments and/or extra lifetime, then
    /// resyncs it.
    ///
    /// The remote mutation and the resync are separate round trips; a
    /// concurrent worker submission between them can change which state the
    /// resync observes.
    ///
    /// # Errors
    ///
    /// Returns a remote error when the marketplace refuses, in which case no
    /// resync happens.
    pub async fn extend_hit(
        &self,
        hit_id: &HitId,
        assignments_increment: Option<u32>,
        expiration_increment_in_seconds: Option<u32>,
    ) -> LifecycleResult<Hit> {
        self.client
            .extend_hit(hit_id, assignments_increment, expiration_increment_in_seconds)
            .await?;
        let hit = self.sync.refresh_hit(hit_id, false).await?;
        tracing::info!(
            hit_id = %hit_id,
            ?assignments_increment,
            ?expiration_increment_in_seconds,
            "extended HIT"
        );
        Ok(hit)
    }

    /// Moves a HIT between the reviewable and reviewing states, then resyncs
    /// it.
    ///
    /// With `revert` unset a reviewable HIT becomes reviewing; with `revert`
    /// set a reviewing HIT goes back to reviewable.
    ///
    /// # Errors
    ///
    /// Returns a remote error when the HIT is not in the expected source
    /// state, in which case no resync happens.
    pub async fn set_reviewing(&self, hit_id: &HitId, revert: bool) -> LifecycleResult<Hit> {
        self.client.set_reviewing(hit_id, revert).await?;
        let hit = self.sync.refresh_hit(hit_id, false).await?;
        tracing::info!(hit_id = %hit_id, revert, "changed HIT review state");
        Ok(hit)
    }

    /// Approves a submitted assignment, recording the feedback locally and
    /// resyncing the assignment afterwards.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError::AssignmentNotMirrored`] when the assignment
    /// has no local record, and a remote error when the marketplace refuses
    /// the approval.
    pub async fn approve_assignment(
        &self,
        assignment_id: &AssignmentId,
        feedback: Option<&str>,
    ) -> LifecycleResult<Assignment> {
        let mut assignment = self.require_mirrored(assignment_id).await?;
        self.client
            .approve_assignment(assignment_id, feedback)
            .await?;
        assignment.record_feedback(feedback);
        self.store.save_assignment(&assignment).await?;
        let refreshed = self.sync.refresh_assignment(assignment_id).await?;
        tracing::info!(assignment_id = %assignment_id, "approved assignment");
        Ok(refreshed)
    }

    /// Rejects a submitted assignment, recording the feedback locally and
    /// resyncing the assignment afterwards.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError::AssignmentNotMirrored`] when the assignment
    /// has no local record, and a remote error when the marketplace refuses
    /// the rejection.
    pub async fn reject_assignment(
        &self,
        assignment_id: &AssignmentId,
        feedback: Option<&str>,
    ) -> LifecycleResult<Assignment> {
        let mut assignment = self.require_mirrored(assignment_id).await?;
        self.client
            .reject_assignment(assignment_id, feedback)
            .await?;
        assignment.record_feedback(feedback);
        self.store.save_assignment(&assignment).await?;
        let refreshed = self.sync.refresh_assignment(assignment_id).await?;
        tracing::info!(assignment_id = %assignment_id, "rejected assignment");
        Ok(refreshed)
    }

    /// Grants a bonus to the worker who completed an assignment, then resyncs
    /// the assignment.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError::InvalidBonusAmount`] for a zero amount
    /// before any remote call, [`LifecycleError::AssignmentNotMirrored`] when
    /// the assignment has no local record, and
    /// [`LifecycleError::MissingWorkerId`] when the mirror has never seen the
    /// assignment's worker.
    pub async fn grant_bonus(
        &self,
        assignment_id: &AssignmentId,
        amount: Reward,
        feedback: Option<&str>,
    ) -> LifecycleResult<Assignment> {
        if !amount.is_positive() {
            return Err(LifecycleError::InvalidBonusAmount(amount));
        }
        let assignment = self.require_mirrored(assignment_id).await?;
        let worker_id = assignment
            .worker_id()
            .ok_or_else(|| LifecycleError::MissingWorkerId(assignment_id.clone()))?
            .clone();

        self.client
            .grant_bonus(&worker_id, assignment_id, amount, feedback)
            .await?;
        let refreshed = self.sync.refresh_assignment(assignment_id).await?;
        tracing::info!(
            assignment_id = %assignment_id,
            worker_id = %worker_id,
            amount = %amount,
            "granted bonus"
        );
        Ok(refreshed)
    }

    async fn require_mirrored(
        &self,
        assignment_id: &AssignmentId,
    ) -> LifecycleResult<Assignment> {
        self.store
            .find_assignment(assignment_id)
            .await?
            .ok_or_else(|| LifecycleError::AssignmentNotMirrored(assignment_id.clone()))
    }
}
