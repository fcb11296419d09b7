//! HIT aggregate root and its snapshot-merge logic.

use super::{
    Attachment, HitId, HitReviewStatus, HitSnapshot, HitStatus, MirrorDomainError, Reward,
    parse_marketplace_timestamp,
};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// Local mirror of one published unit of work.
///
/// A record is created empty the first time a remote id is observed; every
/// mirrored field starts as `None` and is only ever written by
/// [`Hit::merge_snapshot`]. Records are never deleted locally —
/// [`HitStatus::Disposed`] is the terminal marker and the row stays behind as
/// a historical cache after remote disposal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hit {
    remote_id: HitId,
    hit_type_id: Option<String>,
    title: Option<String>,
    description: Option<String>,
    keywords: Option<String>,
    status: Option<HitStatus>,
    review_status: Option<HitReviewStatus>,
    reward: Option<Reward>,
    creation_time: Option<DateTime<Utc>>,
    lifetime_in_seconds: Option<u32>,
    assignment_duration_in_seconds: Option<u32>,
    auto_approval_delay_in_seconds: Option<u32>,
    max_assignments: Option<u32>,
    requester_annotation: Option<String>,
    number_of_similar_hits: Option<u32>,
    assignments_pending: Option<u32>,
    assignments_available: Option<u32>,
    assignments_completed: Option<u32>,
    attachment: Option<Attachment>,
    last_synced_at: Option<DateTime<Utc>>,
}

/// Parameter object for reconstructing a persisted HIT record.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PersistedHitData {
    /// Persisted HIT type id.
    pub hit_type_id: Option<String>,
    /// Persisted title.
    pub title: Option<String>,
    /// Persisted description.
    pub description: Option<String>,
    /// Persisted keyword list.
    pub keywords: Option<String>,
    /// Persisted mirrored status.
    pub status: Option<HitStatus>,
    /// Persisted review status.
    pub review_status: Option<HitReviewStatus>,
    /// Persisted reward.
    pub reward: Option<Reward>,
    /// Persisted creation timestamp.
    pub creation_time: Option<DateTime<Utc>>,
    /// Persisted lifetime.
    pub lifetime_in_seconds: Option<u32>,
    /// Persisted per-assignment duration.
    pub assignment_duration_in_seconds: Option<u32>,
    /// Persisted auto-approval delay.
    pub auto_approval_delay_in_seconds: Option<u32>,
    /// Persisted maximum assignment count.
    pub max_assignments: Option<u32>,
    /// Persisted requester annotation.
    pub requester_annotation: Option<String>,
    /// Persisted similar-HIT count.
    pub number_of_similar_hits: Option<u32>,
    /// Persisted pending-assignment counter.
    pub assignments_pending: Option<u32>,
    /// Persisted available-assignment counter.
    pub assignments_available: Option<u32>,
    /// Persisted completed-assignment counter.
    pub assignments_completed: Option<u32>,
    /// Persisted application attachment.
    pub attachment: Option<Attachment>,
    /// Persisted last-merge timestamp.
    pub last_synced_at: Option<DateTime<Utc>>,
}

impl Hit {
    /// Creates an empty record for a freshly observed remote id.
    #[must_use]
    pub fn new(remote_id: HitId) -> Self {
        Self::from_persisted(remote_id, PersistedHitData::default())
    }

    /// Reconstructs a record from persisted storage.
    #[must_use]
    pub fn from_persisted(remote_id: HitId, data: PersistedHitData) -> Self {
        Self {
            remote_id,
            hit_type_id: data.hit_type_id,
            title: data.title,
            description: data.description,
            keywords: data.keywords,
            status: data.status,
            review_status: data.review_status,
            reward: data.reward,
            creation_time: data.creation_time,
            lifetime_in_seconds: data.lifetime_in_seconds,
            assignment_duration_in_seconds: data.assignment_duration_in_seconds,
            auto_approval_delay_in_seconds: data.auto_approval_delay_in_seconds,
            max_assignments: data.max_assignments,
            requester_annotation: data.requester_annotation,
            number_of_similar_hits: data.number_of_similar_hits,
            assignments_pending: data.assignments_pending,
            assignments_available: data.assignments_available,
            assignments_completed: data.assignments_completed,
            attachment: data.attachment,
            last_synced_at: data.last_synced_at,
        }
    }

    /// Returns the marketplace-assigned remote id.
    #[must_use]
    pub const fn remote_id(&self) -> &HitId {
        &self.remote_id
    }

    /// Returns the HIT type id, once mirrored.
    #[must_use]
    pub fn hit_type_id(&self) -> Option<&str> {
        self.hit_type_id.as_deref()
    }

    /// Returns the title, once mirrored.
    #[must_use]
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// Returns the description, once mirrored.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns the comma-separated keyword list, once mirrored.
    #[must_use]
    pub fn keywords(&self) -> Option<&str> {
        self.keywords.as_deref()
    }

    /// Returns the mirrored marketplace status.
    #[must_use]
    pub const fn status(&self) -> Option<HitStatus> {
        self.status
    }

    /// Returns the mirrored review status.
    #[must_use]
    pub const fn review_status(&self) -> Option<HitReviewStatus> {
        self.review_status
    }

    /// Returns the reward per assignment, once mirrored.
    #[must_use]
    pub const fn reward(&self) -> Option<Reward> {
        self.reward
    }

    /// Returns the creation timestamp, once mirrored.
    #[must_use]
    pub const fn creation_time(&self) -> Option<DateTime<Utc>> {
        self.creation_time
    }

    /// Returns the lifetime in seconds, once mirrored.
    #[must_use]
    pub const fn lifetime_in_seconds(&self) -> Option<u32> {
        self.lifetime_in_seconds
    }

    /// Returns the per-assignment duration in seconds, once mirrored.
    #[must_use]
    pub const fn assignment_duration_in_seconds(&self) -> Option<u32> {
        self.assignment_duration_in_seconds
    }

    /// Returns the auto-approval delay in seconds, once mirrored.
    #[must_use]
    pub const fn auto_approval_delay_in_seconds(&self) -> Option<u32> {
        self.auto_approval_delay_in_seconds
    }

    /// Returns the maximum assignment count, once mirrored.
    #[must_use]
    pub const fn max_assignments(&self) -> Option<u32> {
        self.max_assignments
    }

    /// Returns the requester annotation, once mirrored.
    #[must_use]
    pub fn requester_annotation(&self) -> Option<&str> {
        self.requester_annotation.as_deref()
    }

    /// Returns the similar-HIT count, once mirrored.
    #[must_use]
    pub const fn number_of_similar_hits(&self) -> Option<u32> {
        self.number_of_similar_hits
    }

    /// Returns the best-effort pending-assignment counter.
    #[must_use]
    pub const fn assignments_pending(&self) -> Option<u32> {
        self.assignments_pending
    }

    /// Returns the best-effort available-assignment counter.
    #[must_use]
    pub const fn assignments_available(&self) -> Option<u32> {
        self.assignments_available
    }

    /// Returns the best-effort completed-assignment counter.
    #[must_use]
    pub const fn assignments_completed(&self) -> Option<u32> {
        self.assignments_completed
    }

    /// Returns the application attachment, if set.
    #[must_use]
    pub const fn attachment(&self) -> Option<&Attachment> {
        self.attachment.as_ref()
    }

    /// Returns when the record was last merged from a snapshot.
    #[must_use]
    pub const fn last_synced_at(&self) -> Option<DateTime<Utc>> {
        self.last_synced_at
    }

    /// Returns `true` when the mirrored status is the terminal
    /// [`HitStatus::Disposed`].
    #[must_use]
    pub fn is_disposed(&self) -> bool {
        self.status == Some(HitStatus::Disposed)
    }

    /// Attaches an application record reference.
    ///
    /// The attachment is application state, not mirrored state; merges leave
    /// it untouched.
    pub fn attach(&mut self, attachment: Attachment) {
        self.attachment = Some(attachment);
    }

    /// Clears the application record reference.
    pub fn clear_attachment(&mut self) {
        self.attachment = None;
    }

    /// Overwrites every mirrored attribute from a remote snapshot.
    ///
    /// Fields the snapshot's query shape omits (`None` on the snapshot) keep
    /// their previously mirrored values — absence is a shape difference, not
    /// a reset. Merging the same snapshot twice leaves the record in the same
    /// state as merging it once, apart from `last_synced_at`.
    ///
    /// # Errors
    ///
    /// Returns [`MirrorDomainError::SnapshotIdMismatch`] when the snapshot
    /// describes a different HIT, and data-shape errors when a wire status,
    /// amount, or timestamp fails to parse.
    pub fn merge_snapshot(
        &mut self,
        snapshot: &HitSnapshot,
        clock: &impl Clock,
    ) -> Result<(), MirrorDomainError> {
        if snapshot.hit_id != self.remote_id.as_str() {
            return Err(MirrorDomainError::SnapshotIdMismatch {
                expected: self.remote_id.as_str().to_owned(),
                actual: snapshot.hit_id.clone(),
            });
        }

        // Parse everything before writing anything, so a malformed snapshot
        // leaves the record untouched.
        let status = HitStatus::from_wire(&snapshot.hit_status)?;
        let reward = Reward::from_wire(&snapshot.amount)?;
        let creation_time = parse_marketplace_timestamp(&snapshot.creation_time)?;
        let review_status = snapshot
            .hit_review_status
            .as_deref()
            .map(HitReviewStatus::from_wire)
            .transpose()?;

        self.status = Some(status);
        self.reward = Some(reward);
        self.creation_time = Some(creation_time);
        self.hit_type_id = Some(snapshot.hit_type_id.clone());
        self.title = Some(snapshot.title.clone());
        self.description = Some(snapshot.description.clone());
        self.keywords = Some(snapshot.keywords.clone());
        self.assignment_duration_in_seconds = Some(snapshot.assignment_duration_in_seconds);
        self.auto_approval_delay_in_seconds = Some(snapshot.auto_approval_delay_in_seconds);
        self.max_assignments = Some(snapshot.max_assignments);

        if let Some(lifetime) = snapshot.lifetime_in_seconds {
            self.lifetime_in_seconds = Some(lifetime);
        }
        if let Some(annotation) = &snapshot.requester_annotation {
            self.requester_annotation = Some(annotation.clone());
        }
        if let Some(similar) = snapshot.number_of_similar_hits {
            self.number_of_similar_hits = Some(similar);
        }
        if let Some(parsed_review) = review_status {
            self.review_status = Some(parsed_review);
        }
        if let Some(pending) = snapshot.number_of_assignments_pending {
            self.assignments_pending = Some(pending);
        }
        if let Some(available) = snapshot.number_of_assignments_available {
            self.assignments_available = Some(available);
        }
        if let Some(completed) = snapshot.number_of_assignments_completed {
            self.assignments_completed = Some(completed);
        }

        self.last_synced_at = Some(clock.utc());
        Ok(())
    }
}
