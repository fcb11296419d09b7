//! Point-in-time wire snapshots returned by the marketplace.
//!
//! Different marketplace queries return differently shaped responses: listing
//! queries omit the assignment counters, and approval/rejection timestamps
//! only appear once the requester has ruled. Those shape differences are
//! expressed structurally as `Option` fields, so the mergers' "only update if
//! present" rule never needs a runtime existence probe.
//!
//! Snapshots are plain data carriers: every scalar keeps its wire
//! representation (status strings, decimal amount strings, formatted
//! timestamps) and the mergers own the parsing, so malformed wire data
//! surfaces exactly where a record is merged.

use serde::{Deserialize, Serialize};

/// Snapshot of a remote HIT.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct HitSnapshot {
    /// Remote HIT identifier.
    #[serde(rename = "HITId")]
    pub hit_id: String,
    /// Identifier of the HIT type this HIT was created from.
    #[serde(rename = "HITTypeId", default)]
    pub hit_type_id: String,
    /// HIT title.
    #[serde(default)]
    pub title: String,
    /// General description shown to workers.
    #[serde(default)]
    pub description: String,
    /// Comma-separated search keywords.
    #[serde(default)]
    pub keywords: String,
    /// Wire status string, e.g. `"Assignable"`.
    #[serde(rename = "HITStatus")]
    pub hit_status: String,
    /// Reward per assignment as a decimal string, e.g. `"0.05"`.
    pub amount: String,
    /// Creation timestamp in the marketplace wire format.
    pub creation_time: String,
    /// Seconds a worker has to complete an accepted assignment.
    pub assignment_duration_in_seconds: u32,
    /// Seconds after submission until automatic approval.
    pub auto_approval_delay_in_seconds: u32,
    /// Number of assignments the HIT can hand out.
    pub max_assignments: u32,
    /// Seconds the HIT stays available; omitted by some query shapes.
    #[serde(default)]
    pub lifetime_in_seconds: Option<u32>,
    /// Requester-private annotation; omitted unless requested.
    #[serde(default)]
    pub requester_annotation: Option<String>,
    /// Count of HITs identical apart from the question; rarely present.
    #[serde(rename = "NumberOfSimilarHITs", default)]
    pub number_of_similar_hits: Option<u32>,
    /// Wire review status string; omitted by most query shapes.
    #[serde(rename = "HITReviewStatus", default)]
    pub hit_review_status: Option<String>,
    /// Assignments accepted but not yet submitted; shape-dependent.
    #[serde(default)]
    pub number_of_assignments_pending: Option<u32>,
    /// Assignments still available to workers; shape-dependent.
    #[serde(default)]
    pub number_of_assignments_available: Option<u32>,
    /// Assignments approved or rejected; shape-dependent.
    #[serde(default)]
    pub number_of_assignments_completed: Option<u32>,
}

impl HitSnapshot {
    /// Creates a snapshot with the always-present wire fields.
    ///
    /// Text attributes default to empty and numeric attributes to zero
    /// (`max_assignments` to one); set them with the `with_` builders.
    #[must_use]
    pub fn new(
        hit_id: impl Into<String>,
        hit_status: impl Into<String>,
        amount: impl Into<String>,
        creation_time: impl Into<String>,
    ) -> Self {
        Self {
            hit_id: hit_id.into(),
            hit_type_id: String::new(),
            title: String::new(),
            description: String::new(),
            keywords: String::new(),
            hit_status: hit_status.into(),
            amount: amount.into(),
            creation_time: creation_time.into(),
            assignment_duration_in_seconds: 0,
            auto_approval_delay_in_seconds: 0,
            max_assignments: 1,
            lifetime_in_seconds: None,
            requester_annotation: None,
            number_of_similar_hits: None,
            hit_review_status: None,
            number_of_assignments_pending: None,
            number_of_assignments_available: None,
            number_of_assignments_completed: None,
        }
    }

    /// Sets the HIT type id.
    #[must_use]
    pub fn with_hit_type_id(mut self, hit_type_id: impl Into<String>) -> Self {
        self.hit_type_id = hit_type_id.into();
        self
    }

    /// Sets the title.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Sets the keyword list.
    #[must_use]
    pub fn with_keywords(mut self, keywords: impl Into<String>) -> Self {
        self.keywords = keywords.into();
        self
    }

    /// Sets the per-assignment duration and auto-approval delay.
    #[must_use]
    pub const fn with_durations(
        mut self,
        assignment_duration_in_seconds: u32,
        auto_approval_delay_in_seconds: u32,
    ) -> Self {
        self.assignment_duration_in_seconds = assignment_duration_in_seconds;
        self.auto_approval_delay_in_seconds = auto_approval_delay_in_seconds;
        self
    }

    /// Sets the maximum assignment count.
    #[must_use]
    pub const fn with_max_assignments(mut self, max_assignments: u32) -> Self {
        self.max_assignments = max_assignments;
        self
    }

    /// Sets the HIT lifetime.
    #[must_use]
    pub const fn with_lifetime(mut self, lifetime_in_seconds: u32) -> Self {
        self.lifetime_in_seconds = Some(lifetime_in_seconds);
        self
    }

    /// Sets the requester annotation.
    #[must_use]
    pub fn with_requester_annotation(mut self, annotation: impl Into<String>) -> Self {
        self.requester_annotation = Some(annotation.into());
        self
    }

    /// Sets the similar-HIT count.
    #[must_use]
    pub const fn with_number_of_similar_hits(mut self, count: u32) -> Self {
        self.number_of_similar_hits = Some(count);
        self
    }

    /// Sets the wire review status.
    #[must_use]
    pub fn with_review_status(mut self, review_status: impl Into<String>) -> Self {
        self.hit_review_status = Some(review_status.into());
        self
    }

    /// Sets the three assignment counters.
    #[must_use]
    pub const fn with_assignment_counts(
        mut self,
        pending: u32,
        available: u32,
        completed: u32,
    ) -> Self {
        self.number_of_assignments_pending = Some(pending);
        self.number_of_assignments_available = Some(available);
        self.number_of_assignments_completed = Some(completed);
        self
    }
}

/// Snapshot of a remote assignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AssignmentSnapshot {
    /// Remote assignment identifier.
    pub assignment_id: String,
    /// Remote id of the owning HIT.
    #[serde(rename = "HITId")]
    pub hit_id: String,
    /// Identifier of the worker who accepted the HIT.
    pub worker_id: String,
    /// Wire status string, e.g. `"Submitted"`.
    pub assignment_status: String,
    /// When the worker accepted the assignment.
    pub accept_time: String,
    /// When the worker submitted results.
    pub submit_time: String,
    /// When the results auto-approve unless the requester rules first.
    pub auto_approval_time: String,
    /// When the requester approved; present only after approval.
    #[serde(default)]
    pub approval_time: Option<String>,
    /// When the requester rejected; present only after rejection.
    #[serde(default)]
    pub rejection_time: Option<String>,
    /// Completion deadline; shape-dependent.
    #[serde(default)]
    pub deadline: Option<String>,
    /// Submitted answer fields; empty when the worker submitted nothing.
    #[serde(default)]
    pub answer: AnswerDocument,
}

impl AssignmentSnapshot {
    /// Creates a snapshot with the always-present wire fields.
    #[must_use]
    pub fn new(
        assignment_id: impl Into<String>,
        hit_id: impl Into<String>,
        worker_id: impl Into<String>,
        assignment_status: impl Into<String>,
        accept_time: impl Into<String>,
        submit_time: impl Into<String>,
        auto_approval_time: impl Into<String>,
    ) -> Self {
        Self {
            assignment_id: assignment_id.into(),
            hit_id: hit_id.into(),
            worker_id: worker_id.into(),
            assignment_status: assignment_status.into(),
            accept_time: accept_time.into(),
            submit_time: submit_time.into(),
            auto_approval_time: auto_approval_time.into(),
            approval_time: None,
            rejection_time: None,
            deadline: None,
            answer: AnswerDocument::default(),
        }
    }

    /// Sets the approval timestamp.
    #[must_use]
    pub fn with_approval_time(mut self, approval_time: impl Into<String>) -> Self {
        self.approval_time = Some(approval_time.into());
        self
    }

    /// Sets the rejection timestamp.
    #[must_use]
    pub fn with_rejection_time(mut self, rejection_time: impl Into<String>) -> Self {
        self.rejection_time = Some(rejection_time.into());
        self
    }

    /// Sets the completion deadline.
    #[must_use]
    pub fn with_deadline(mut self, deadline: impl Into<String>) -> Self {
        self.deadline = Some(deadline.into());
        self
    }

    /// Appends one answer field.
    #[must_use]
    pub fn with_answer(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.answer.fields.push(AnswerField {
            question_identifier: key.into(),
            free_text: value.into(),
        });
        self
    }
}

/// Nested answer structure carried by an assignment snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "PascalCase")]
pub struct AnswerDocument {
    /// Repeated answer fields in submission order.
    #[serde(default)]
    pub fields: Vec<AnswerField>,
}

impl AnswerDocument {
    /// Returns `true` when the worker submitted no answer fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterates the document as `(key, value)` pairs.
    pub fn pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields
            .iter()
            .map(|field| (field.question_identifier.as_str(), field.free_text.as_str()))
    }
}

/// One answer field inside an [`AnswerDocument`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AnswerField {
    /// Key of the question form field.
    pub question_identifier: String,
    /// Free-text value the worker entered.
    pub free_text: String,
}
