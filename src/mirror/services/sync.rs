//! Snapshot merge orchestration: pulls remote state and folds it into the
//! local mirror.

use crate::mirror::{
    domain::{
        Assignment, AssignmentId, AssignmentSnapshot, Hit, HitId, HitSnapshot, MirrorDomainError,
    },
    ports::{MarketplaceClient, MarketplaceError, MirrorStore, StoreError},
};
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;

/// Errors surfaced by sync operations.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Remote marketplace call failed.
    #[error(transparent)]
    Remote(#[from] MarketplaceError),
    /// Local store operation failed.
    #[error(transparent)]
    Store(#[from] StoreError),
    /// Snapshot data failed domain validation.
    #[error(transparent)]
    Domain(#[from] MirrorDomainError),
    /// The assignment has never been mirrored, so its owning HIT is unknown.
    #[error("assignment {0} is not mirrored locally")]
    AssignmentNotMirrored(AssignmentId),
    /// The remote listing for the owning HIT no longer contains the
    /// assignment.
    #[error("assignment {assignment_id} is missing from the remote listing of HIT {hit_id}")]
    AssignmentMissingFromRemote {
        /// Assignment that was asked for.
        assignment_id: AssignmentId,
        /// Owning HIT whose listing was consulted.
        hit_id: HitId,
    },
}

/// Result type for sync operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// One snapshot that failed to merge during a batch run.
#[derive(Debug)]
pub struct BatchFailure {
    /// Raw HIT identifier from the failed snapshot.
    pub hit_id: String,
    /// The error that stopped the merge.
    pub error: SyncError,
}

/// Outcome of a batch sync: merged ids plus isolated per-snapshot failures.
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Identifiers merged successfully, in input order.
    pub merged: Vec<HitId>,
    /// Snapshots that failed, with the error each one hit.
    pub failures: Vec<BatchFailure>,
}

impl BatchReport {
    /// Returns `true` when every snapshot in the batch merged.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Merges remote marketplace snapshots into the local mirror store.
///
/// Each merge is a get-or-create followed by a field-wise overwrite and a
/// save, so re-running a sync against unchanged remote state converges
/// instead of duplicating records.
#[derive(Clone)]
pub struct SyncService<C, S, K>
where
    C: MarketplaceClient,
    S: MirrorStore,
    K: Clock,
{
    client: Arc<C>,
    store: Arc<S>,
    clock: Arc<K>,
}

impl<C, S, K> SyncService<C, S, K>
where
    C: MarketplaceClient,
    S: MirrorStore,
    K: Clock,
{
    /// Creates a sync service over the given marketplace client and store.
    #[must_use]
    pub fn new(client: Arc<C>, store: Arc<S>, clock: Arc<K>) -> Self {
        Self {
            client,
            store,
            clock,
        }
    }

    /// Merges one HIT snapshot into the store, creating the record when the
    /// remote id is new.
    ///
    /// With `update_assignments` set, the HIT's remote assignment listing is
    /// fetched and merged as well, answers included.
    ///
    /// # Errors
    ///
    /// Returns a domain error when the snapshot is malformed, and store or
    /// remote errors from the underlying ports. A malformed snapshot leaves
    /// the stored record untouched.
    pub async fn merge_hit_snapshot(
        &self,
        snapshot: &HitSnapshot,
        update_assignments: bool,
    ) -> SyncResult<Hit> {
        let hit_id = HitId::new(&snapshot.hit_id).map_err(SyncError::from)?;
        let mut hit = self.store.get_or_create_hit(&hit_id).await?;
        hit.merge_snapshot(snapshot, self.clock.as_ref())?;
        self.store.save_hit(&hit).await?;
        tracing::debug!(hit_id = %hit_id, status = ?hit.status(), "merged HIT snapshot");

        if update_assignments {
            let assignment_snapshots = self.client.assignments_for_hit(&hit_id).await?;
            for assignment_snapshot in &assignment_snapshots {
                self.merge_assignment_snapshot(assignment_snapshot).await?;
            }
        }
        Ok(hit)
    }

    /// Merges one assignment snapshot, then upserts every key/value pair of
    /// its answer document.
    ///
    /// # Errors
    ///
    /// Returns a domain error when the snapshot is malformed, including when
    /// it names a HIT other than the one the mirrored assignment belongs to.
    pub async fn merge_assignment_snapshot(
        &self,
        snapshot: &AssignmentSnapshot,
    ) -> SyncResult<Assignment> {
        let assignment_id = AssignmentId::new(&snapshot.assignment_id).map_err(SyncError::from)?;
        let hit_id = HitId::new(&snapshot.hit_id).map_err(SyncError::from)?;

        let mut assignment = self
            .store
            .get_or_create_assignment(&assignment_id, &hit_id)
            .await?;
        assignment.merge_snapshot(snapshot, self.clock.as_ref())?;
        self.store.save_assignment(&assignment).await?;
        tracing::debug!(
            assignment_id = %assignment_id,
            hit_id = %hit_id,
            "merged assignment snapshot"
        );

        for (key, value) in snapshot.answer.pairs() {
            let mut answer = self.store.get_or_create_answer(&assignment_id, key).await?;
            if answer.update_value(value) {
                self.store.save_answer(&answer).await?;
            }
        }
        Ok(assignment)
    }

    /// Fetches the current remote state of one HIT and merges it.
    ///
    /// # Errors
    ///
    /// Returns a remote error when the marketplace does not know the id, plus
    /// the merge errors of [`Self::merge_hit_snapshot`].
    pub async fn refresh_hit(&self, hit_id: &HitId, update_assignments: bool) -> SyncResult<Hit> {
        let snapshot = self.client.get_hit(hit_id).await?;
        self.merge_hit_snapshot(&snapshot, update_assignments)
            .await
    }

    /// Refreshes one assignment through its owning HIT's remote listing.
    ///
    /// The marketplace only lists assignments per HIT, so the locally
    /// mirrored record supplies the owner. Sibling assignments that arrive in
    /// the same listing are merged opportunistically.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::AssignmentNotMirrored`] when the assignment has
    /// no local record, and [`SyncError::AssignmentMissingFromRemote`] when
    /// the owner's listing no longer carries it.
    pub async fn refresh_assignment(
        &self,
        assignment_id: &AssignmentId,
    ) -> SyncResult<Assignment> {
        let local = self
            .store
            .find_assignment(assignment_id)
            .await?
            .ok_or_else(|| SyncError::AssignmentNotMirrored(assignment_id.clone()))?;
        let hit_id = local.hit_id().clone();

        let snapshots = self.client.assignments_for_hit(&hit_id).await?;
        let mut refreshed = None;
        for snapshot in &snapshots {
            let merged = self.merge_assignment_snapshot(snapshot).await?;
            if merged.remote_id() == assignment_id {
                refreshed = Some(merged);
            }
        }
        refreshed.ok_or_else(|| SyncError::AssignmentMissingFromRemote {
            assignment_id: assignment_id.clone(),
            hit_id,
        })
    }

    /// Merges a batch of HIT snapshots, isolating per-snapshot failures.
    ///
    /// One malformed snapshot does not stop the rest of the batch; it is
    /// recorded in the report and the run continues.
    pub async fn sync_batch(
        &self,
        snapshots: &[HitSnapshot],
        update_assignments: bool,
    ) -> BatchReport {
        let mut report = BatchReport::default();
        for snapshot in snapshots {
            match self.merge_hit_snapshot(snapshot, update_assignments).await {
                Ok(hit) => report.merged.push(hit.remote_id().clone()),
                Err(error) => {
                    tracing::warn!(
                        hit_id = %snapshot.hit_id,
                        %error,
                        "skipping snapshot that failed to merge"
                    );
                    report.failures.push(BatchFailure {
                        hit_id: snapshot.hit_id.clone(),
                        error,
                    });
                }
            }
        }
        tracing::info!(
            merged = report.merged.len(),
            failed = report.failures.len(),
            "batch sync finished"
        );
        report
    }

    /// Lists every HIT the account owns and merges the whole set.
    ///
    /// # Errors
    ///
    /// Returns a remote error when the listing call itself fails; individual
    /// merge failures land in the report instead.
    pub async fn sync_all_hits(&self, update_assignments: bool) -> SyncResult<BatchReport> {
        let snapshots = self.client.list_hits().await?;
        Ok(self.sync_batch(&snapshots, update_assignments).await)
    }

    /// Lists the account's reviewable HITs and merges the whole set.
    ///
    /// # Errors
    ///
    /// Returns a remote error when the listing call itself fails.
    pub async fn sync_reviewable_hits(&self, update_assignments: bool) -> SyncResult<BatchReport> {
        let snapshots = self.client.list_reviewable_hits().await?;
        Ok(self.sync_batch(&snapshots, update_assignments).await)
    }
}
