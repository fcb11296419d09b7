//! Assignment aggregate and its snapshot-merge logic.

use super::{
    AssignmentId, AssignmentSnapshot, AssignmentStatus, HitId, MirrorDomainError, WorkerId,
    parse_marketplace_timestamp,
};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// Local mirror of one worker's attempt at a HIT.
///
/// An assignment belongs to exactly one HIT from the moment it is created and
/// never migrates. Mirrored fields are written only by
/// [`Assignment::merge_snapshot`]; the requester feedback text is the one
/// exception, written by the approve/reject lifecycle operations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    remote_id: AssignmentId,
    hit_id: HitId,
    status: Option<AssignmentStatus>,
    worker_id: Option<WorkerId>,
    accept_time: Option<DateTime<Utc>>,
    submit_time: Option<DateTime<Utc>>,
    auto_approval_time: Option<DateTime<Utc>>,
    approval_time: Option<DateTime<Utc>>,
    rejection_time: Option<DateTime<Utc>>,
    deadline: Option<DateTime<Utc>>,
    requester_feedback: Option<String>,
    last_synced_at: Option<DateTime<Utc>>,
}

/// Parameter object for reconstructing a persisted assignment record.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PersistedAssignmentData {
    /// Persisted mirrored status.
    pub status: Option<AssignmentStatus>,
    /// Persisted worker id.
    pub worker_id: Option<WorkerId>,
    /// Persisted accept timestamp.
    pub accept_time: Option<DateTime<Utc>>,
    /// Persisted submit timestamp.
    pub submit_time: Option<DateTime<Utc>>,
    /// Persisted auto-approval deadline.
    pub auto_approval_time: Option<DateTime<Utc>>,
    /// Persisted approval timestamp.
    pub approval_time: Option<DateTime<Utc>>,
    /// Persisted rejection timestamp.
    pub rejection_time: Option<DateTime<Utc>>,
    /// Persisted completion deadline.
    pub deadline: Option<DateTime<Utc>>,
    /// Persisted requester feedback.
    pub requester_feedback: Option<String>,
    /// Persisted last-merge timestamp.
    pub last_synced_at: Option<DateTime<Utc>>,
}

impl Assignment {
    /// Creates an empty record for a freshly observed remote id, owned by the
    /// given HIT.
    #[must_use]
    pub fn new(remote_id: AssignmentId, hit_id: HitId) -> Self {
        Self::from_persisted(remote_id, hit_id, PersistedAssignmentData::default())
    }

    /// Reconstructs a record from persisted storage.
    #[must_use]
    pub fn from_persisted(
        remote_id: AssignmentId,
        hit_id: HitId,
        data: PersistedAssignmentData,
    ) -> Self {
        Self {
            remote_id,
            hit_id,
            status: data.status,
            worker_id: data.worker_id,
            accept_time: data.accept_time,
            submit_time: data.submit_time,
            auto_approval_time: data.auto_approval_time,
            approval_time: data.approval_time,
            rejection_time: data.rejection_time,
            deadline: data.deadline,
            requester_feedback: data.requester_feedback,
            last_synced_at: data.last_synced_at,
        }
    }

    /// Returns the marketplace-assigned remote id.
    #[must_use]
    pub const fn remote_id(&self) -> &AssignmentId {
        &self.remote_id
    }

    /// Returns the remote id of the owning HIT.
    #[must_use]
    pub const fn hit_id(&self) -> &HitId {
        &self.hit_id
    }

    /// Returns the mirrored marketplace status.
    #[must_use]
    pub const fn status(&self) -> Option<AssignmentStatus> {
        self.status
    }

    /// Returns the worker id, once mirrored.
    #[must_use]
    pub const fn worker_id(&self) -> Option<&WorkerId> {
        self.worker_id.as_ref()
    }

    /// Returns when the worker accepted the assignment.
    #[must_use]
    pub const fn accept_time(&self) -> Option<DateTime<Utc>> {
        self.accept_time
    }

    /// Returns when the worker submitted results.
    #[must_use]
    pub const fn submit_time(&self) -> Option<DateTime<Utc>> {
        self.submit_time
    }

    /// Returns when the results auto-approve.
    #[must_use]
    pub const fn auto_approval_time(&self) -> Option<DateTime<Utc>> {
        self.auto_approval_time
    }

    /// Returns when the requester approved, if they have.
    #[must_use]
    pub const fn approval_time(&self) -> Option<DateTime<Utc>> {
        self.approval_time
    }

    /// Returns when the requester rejected, if they have.
    #[must_use]
    pub const fn rejection_time(&self) -> Option<DateTime<Utc>> {
        self.rejection_time
    }

    /// Returns the completion deadline, once mirrored.
    #[must_use]
    pub const fn deadline(&self) -> Option<DateTime<Utc>> {
        self.deadline
    }

    /// Returns the feedback text recorded with approve/reject.
    #[must_use]
    pub fn requester_feedback(&self) -> Option<&str> {
        self.requester_feedback.as_deref()
    }

    /// Returns when the record was last merged from a snapshot.
    #[must_use]
    pub const fn last_synced_at(&self) -> Option<DateTime<Utc>> {
        self.last_synced_at
    }

    /// Returns `true` once the assignment is approved or rejected.
    #[must_use]
    pub fn is_resolved(&self) -> bool {
        self.status.is_some_and(AssignmentStatus::is_resolved)
    }

    /// Records the feedback text sent with an approve or reject call.
    pub fn record_feedback(&mut self, feedback: Option<&str>) {
        self.requester_feedback = feedback.map(str::to_owned);
    }

    /// Overwrites every mirrored attribute from a remote snapshot.
    ///
    /// The accept/submit/auto-approval timestamps are always present on the
    /// wire and always overwrite. Approval/rejection timestamps and the
    /// deadline only appear in some query shapes; their absence never clears
    /// a previously recorded value.
    ///
    /// # Errors
    ///
    /// Returns [`MirrorDomainError::SnapshotIdMismatch`] when the snapshot
    /// describes a different assignment,
    /// [`MirrorDomainError::SnapshotHitMismatch`] when it names a different
    /// owning HIT, and data-shape errors when a wire status, worker id, or
    /// timestamp fails to parse.
    pub fn merge_snapshot(
        &mut self,
        snapshot: &AssignmentSnapshot,
        clock: &impl Clock,
    ) -> Result<(), MirrorDomainError> {
        if snapshot.assignment_id != self.remote_id.as_str() {
            return Err(MirrorDomainError::SnapshotIdMismatch {
                expected: self.remote_id.as_str().to_owned(),
                actual: snapshot.assignment_id.clone(),
            });
        }
        if snapshot.hit_id != self.hit_id.as_str() {
            return Err(MirrorDomainError::SnapshotHitMismatch {
                assignment_id: self.remote_id.as_str().to_owned(),
                expected: self.hit_id.as_str().to_owned(),
                actual: snapshot.hit_id.clone(),
            });
        }

        let status = AssignmentStatus::from_wire(&snapshot.assignment_status)?;
        let worker_id = WorkerId::new(&snapshot.worker_id)?;
        let accept_time = parse_marketplace_timestamp(&snapshot.accept_time)?;
        let submit_time = parse_marketplace_timestamp(&snapshot.submit_time)?;
        let auto_approval_time = parse_marketplace_timestamp(&snapshot.auto_approval_time)?;
        let approval_time = snapshot
            .approval_time
            .as_deref()
            .map(parse_marketplace_timestamp)
            .transpose()?;
        let rejection_time = snapshot
            .rejection_time
            .as_deref()
            .map(parse_marketplace_timestamp)
            .transpose()?;
        let deadline = snapshot
            .deadline
            .as_deref()
            .map(parse_marketplace_timestamp)
            .transpose()?;

        self.status = Some(status);
        self.worker_id = Some(worker_id);
        self.accept_time = Some(accept_time);
        self.submit_time = Some(submit_time);
        self.auto_approval_time = Some(auto_approval_time);
        if approval_time.is_some() {
            self.approval_time = approval_time;
        }
        if rejection_time.is_some() {
            self.rejection_time = rejection_time;
        }
        if deadline.is_some() {
            self.deadline = deadline;
        }

        self.last_synced_at = Some(clock.utc());
        Ok(())
    }
}
