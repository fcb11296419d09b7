//! Diesel row models and their domain conversions.

use super::schema::{answer_key_values, assignments, hits};
use crate::mirror::domain::{
    AnswerKeyValue, Assignment, AssignmentId, AssignmentStatus, Attachment, Hit, HitId,
    HitReviewStatus, HitStatus, PersistedAssignmentData, PersistedHitData, Reward, WorkerId,
};
use crate::mirror::ports::{StoreError, StoreResult};
use chrono::{DateTime, Utc};
use diesel::prelude::*;

/// Full row model for mirrored HITs, used for reads and upserts alike.
#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = hits)]
#[diesel(treat_none_as_null = true)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct HitRow {
    /// Marketplace-assigned HIT identifier.
    pub remote_id: String,
    /// HIT type identifier.
    pub hit_type_id: Option<String>,
    /// HIT title.
    pub title: Option<String>,
    /// General description.
    pub description: Option<String>,
    /// Comma-separated keywords.
    pub keywords: Option<String>,
    /// Canonical status string.
    pub status: Option<String>,
    /// Canonical review status string.
    pub review_status: Option<String>,
    /// Reward in thousandths of a currency unit.
    pub reward_thousandths: Option<i64>,
    /// Creation timestamp.
    pub creation_time: Option<DateTime<Utc>>,
    /// HIT lifetime in seconds.
    pub lifetime_in_seconds: Option<i64>,
    /// Per-assignment duration in seconds.
    pub assignment_duration_in_seconds: Option<i64>,
    /// Auto-approval delay in seconds.
    pub auto_approval_delay_in_seconds: Option<i64>,
    /// Maximum assignment count.
    pub max_assignments: Option<i64>,
    /// Requester-private annotation.
    pub requester_annotation: Option<String>,
    /// Similar-HIT count.
    pub number_of_similar_hits: Option<i64>,
    /// Pending-assignment counter.
    pub assignments_pending: Option<i64>,
    /// Available-assignment counter.
    pub assignments_available: Option<i64>,
    /// Completed-assignment counter.
    pub assignments_completed: Option<i64>,
    /// Attachment type tag.
    pub attachment_kind: Option<String>,
    /// Attachment opaque identifier.
    pub attachment_reference: Option<String>,
    /// Last merge timestamp.
    pub last_synced_at: Option<DateTime<Utc>>,
}

impl HitRow {
    /// Builds the empty row inserted on first observation of a remote id.
    #[must_use]
    pub fn empty(remote_id: &HitId) -> Self {
        Self {
            remote_id: remote_id.as_str().to_owned(),
            hit_type_id: None,
            title: None,
            description: None,
            keywords: None,
            status: None,
            review_status: None,
            reward_thousandths: None,
            creation_time: None,
            lifetime_in_seconds: None,
            assignment_duration_in_seconds: None,
            auto_approval_delay_in_seconds: None,
            max_assignments: None,
            requester_annotation: None,
            number_of_similar_hits: None,
            assignments_pending: None,
            assignments_available: None,
            assignments_completed: None,
            attachment_kind: None,
            attachment_reference: None,
            last_synced_at: None,
        }
    }
}

/// Full row model for mirrored assignments.
#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = assignments)]
#[diesel(treat_none_as_null = true)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct AssignmentRow {
    /// Marketplace-assigned assignment identifier.
    pub remote_id: String,
    /// Remote id of the owning HIT.
    pub hit_id: String,
    /// Canonical status string.
    pub status: Option<String>,
    /// Worker identifier.
    pub worker_id: Option<String>,
    /// Accept timestamp.
    pub accept_time: Option<DateTime<Utc>>,
    /// Submit timestamp.
    pub submit_time: Option<DateTime<Utc>>,
    /// Auto-approval deadline.
    pub auto_approval_time: Option<DateTime<Utc>>,
    /// Approval timestamp.
    pub approval_time: Option<DateTime<Utc>>,
    /// Rejection timestamp.
    pub rejection_time: Option<DateTime<Utc>>,
    /// Completion deadline.
    pub deadline: Option<DateTime<Utc>>,
    /// Requester feedback text.
    pub requester_feedback: Option<String>,
    /// Last merge timestamp.
    pub last_synced_at: Option<DateTime<Utc>>,
}

impl AssignmentRow {
    /// Builds the empty row inserted on first observation of a remote id.
    #[must_use]
    pub fn empty(remote_id: &AssignmentId, hit_id: &HitId) -> Self {
        Self {
            remote_id: remote_id.as_str().to_owned(),
            hit_id: hit_id.as_str().to_owned(),
            status: None,
            worker_id: None,
            accept_time: None,
            submit_time: None,
            auto_approval_time: None,
            approval_time: None,
            rejection_time: None,
            deadline: None,
            requester_feedback: None,
            last_synced_at: None,
        }
    }
}

/// Row model for answer key/value records.
#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = answer_key_values)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct AnswerRow {
    /// Remote id of the owning assignment.
    pub assignment_id: String,
    /// Answer key.
    pub key: String,
    /// Answer value.
    pub value: String,
}

fn opt_u32(value: Option<i64>) -> StoreResult<Option<u32>> {
    value
        .map(u32::try_from)
        .transpose()
        .map_err(StoreError::persistence)
}

fn opt_i64(value: Option<u32>) -> Option<i64> {
    value.map(i64::from)
}

fn parse_status<T>(value: Option<&str>) -> StoreResult<Option<T>>
where
    T: for<'a> TryFrom<&'a str>,
    for<'a> <T as TryFrom<&'a str>>::Error: std::error::Error + Send + Sync + 'static,
{
    value
        .map(T::try_from)
        .transpose()
        .map_err(StoreError::persistence)
}

/// Converts a HIT row back into the domain aggregate.
pub fn row_to_hit(row: HitRow) -> StoreResult<Hit> {
    let remote_id = HitId::new(row.remote_id).map_err(StoreError::persistence)?;
    let attachment = match (row.attachment_kind, row.attachment_reference) {
        (Some(kind), Some(reference)) => Some(Attachment::new(kind, reference)),
        _ => None,
    };
    let reward = row
        .reward_thousandths
        .map(u64::try_from)
        .transpose()
        .map_err(StoreError::persistence)?
        .map(Reward::from_thousandths);

    let data = PersistedHitData {
        hit_type_id: row.hit_type_id,
        title: row.title,
        description: row.description,
        keywords: row.keywords,
        status: parse_status::<HitStatus>(row.status.as_deref())?,
        review_status: parse_status::<HitReviewStatus>(row.review_status.as_deref())?,
        reward,
        creation_time: row.creation_time,
        lifetime_in_seconds: opt_u32(row.lifetime_in_seconds)?,
        assignment_duration_in_seconds: opt_u32(row.assignment_duration_in_seconds)?,
        auto_approval_delay_in_seconds: opt_u32(row.auto_approval_delay_in_seconds)?,
        max_assignments: opt_u32(row.max_assignments)?,
        requester_annotation: row.requester_annotation,
        number_of_similar_hits: opt_u32(row.number_of_similar_hits)?,
        assignments_pending: opt_u32(row.assignments_pending)?,
        assignments_available: opt_u32(row.assignments_available)?,
        assignments_completed: opt_u32(row.assignments_completed)?,
        attachment,
        last_synced_at: row.last_synced_at,
    };
    Ok(Hit::from_persisted(remote_id, data))
}

/// Converts a domain HIT into its full row representation.
pub fn hit_to_row(hit: &Hit) -> StoreResult<HitRow> {
    let reward_thousandths = hit
        .reward()
        .map(|reward| i64::try_from(reward.thousandths()))
        .transpose()
        .map_err(StoreError::persistence)?;

    Ok(HitRow {
        remote_id: hit.remote_id().as_str().to_owned(),
        hit_type_id: hit.hit_type_id().map(str::to_owned),
        title: hit.title().map(str::to_owned),
        description: hit.description().map(str::to_owned),
        keywords: hit.keywords().map(str::to_owned),
        status: hit.status().map(|status| status.as_str().to_owned()),
        review_status: hit
            .review_status()
            .map(|status| status.as_str().to_owned()),
        reward_thousandths,
        creation_time: hit.creation_time(),
        lifetime_in_seconds: opt_i64(hit.lifetime_in_seconds()),
        assignment_duration_in_seconds: opt_i64(hit.assignment_duration_in_seconds()),
        auto_approval_delay_in_seconds: opt_i64(hit.auto_approval_delay_in_seconds()),
        max_assignments: opt_i64(hit.max_assignments()),
        requester_annotation: hit.requester_annotation().map(str::to_owned),
        number_of_similar_hits: opt_i64(hit.number_of_similar_hits()),
        assignments_pending: opt_i64(hit.assignments_pending()),
        assignments_available: opt_i64(hit.assignments_available()),
        assignments_completed: opt_i64(hit.assignments_completed()),
        attachment_kind: hit.attachment().map(|a| a.kind().to_owned()),
        attachment_reference: hit.attachment().map(|a| a.reference().to_owned()),
        last_synced_at: hit.last_synced_at(),
    })
}

/// Converts an assignment row back into the domain aggregate.
pub fn row_to_assignment(row: AssignmentRow) -> StoreResult<Assignment> {
    let remote_id = AssignmentId::new(row.remote_id).map_err(StoreError::persistence)?;
    let hit_id = HitId::new(row.hit_id).map_err(StoreError::persistence)?;
    let worker_id = row
        .worker_id
        .map(WorkerId::new)
        .transpose()
        .map_err(StoreError::persistence)?;

    let data = PersistedAssignmentData {
        status: parse_status::<AssignmentStatus>(row.status.as_deref())?,
        worker_id,
        accept_time: row.accept_time,
        submit_time: row.submit_time,
        auto_approval_time: row.auto_approval_time,
        approval_time: row.approval_time,
        rejection_time: row.rejection_time,
        deadline: row.deadline,
        requester_feedback: row.requester_feedback,
        last_synced_at: row.last_synced_at,
    };
    Ok(Assignment::from_persisted(remote_id, hit_id, data))
}

/// Converts a domain assignment into its full row representation.
#[must_use]
pub fn assignment_to_row(assignment: &Assignment) -> AssignmentRow {
    AssignmentRow {
        remote_id: assignment.remote_id().as_str().to_owned(),
        hit_id: assignment.hit_id().as_str().to_owned(),
        status: assignment.status().map(|status| status.as_str().to_owned()),
        worker_id: assignment.worker_id().map(|id| id.as_str().to_owned()),
        accept_time: assignment.accept_time(),
        submit_time: assignment.submit_time(),
        auto_approval_time: assignment.auto_approval_time(),
        approval_time: assignment.approval_time(),
        rejection_time: assignment.rejection_time(),
        deadline: assignment.deadline(),
        requester_feedback: assignment.requester_feedback().map(str::to_owned),
        last_synced_at: assignment.last_synced_at(),
    }
}

/// Converts an answer row back into the domain record.
pub fn row_to_answer(row: AnswerRow) -> StoreResult<AnswerKeyValue> {
    let assignment_id = AssignmentId::new(row.assignment_id).map_err(StoreError::persistence)?;
    Ok(AnswerKeyValue::from_persisted(
        assignment_id,
        row.key,
        row.value,
    ))
}

/// Converts a domain answer record into its row representation.
#[must_use]
pub fn answer_to_row(answer: &AnswerKeyValue) -> AnswerRow {
    AnswerRow {
        assignment_id: answer.assignment_id().as_str().to_owned(),
        key: answer.key().to_owned(),
        value: answer.value().to_owned(),
    }
}
