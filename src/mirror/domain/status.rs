//! Status enumerations mirrored from the marketplace.
//!
//! Each enum carries two string mappings: the exact wire strings the
//! marketplace emits (`from_wire`, failing loudly on unrecognized values) and
//! a canonical lowercase storage representation (`as_str` / `TryFrom<&str>`)
//! used by persistence adapters. Local code never sets these fields directly;
//! only the mergers write them, from wire values.

use super::{MirrorDomainError, ParseStatusError};
use serde::{Deserialize, Serialize};

/// Marketplace lifecycle status of a HIT.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HitStatus {
    /// The HIT is published and workers may accept it.
    Assignable,
    /// All assignment slots are taken but not yet submitted.
    Unassignable,
    /// Every assignment has been submitted, returned, or abandoned; the HIT
    /// awaits requester review.
    Reviewable,
    /// The requester has parked the HIT for review.
    Reviewing,
    /// The HIT has been removed from the marketplace. Terminal; the local
    /// mirror is retained as a historical cache.
    Disposed,
}

impl HitStatus {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Assignable => "assignable",
            Self::Unassignable => "unassignable",
            Self::Reviewable => "reviewable",
            Self::Reviewing => "reviewing",
            Self::Disposed => "disposed",
        }
    }

    /// Maps an exact marketplace wire string to a status.
    ///
    /// # Errors
    ///
    /// Returns [`MirrorDomainError::UnknownHitStatus`] for any value outside
    /// the documented set.
    pub fn from_wire(value: &str) -> Result<Self, MirrorDomainError> {
        match value {
            "Assignable" => Ok(Self::Assignable),
            "Unassignable" => Ok(Self::Unassignable),
            "Reviewable" => Ok(Self::Reviewable),
            "Reviewing" => Ok(Self::Reviewing),
            "Disposed" => Ok(Self::Disposed),
            _ => Err(MirrorDomainError::UnknownHitStatus(value.to_owned())),
        }
    }
}

impl TryFrom<&str> for HitStatus {
    type Error = ParseStatusError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "assignable" => Ok(Self::Assignable),
            "unassignable" => Ok(Self::Unassignable),
            "reviewable" => Ok(Self::Reviewable),
            "reviewing" => Ok(Self::Reviewing),
            "disposed" => Ok(Self::Disposed),
            _ => Err(ParseStatusError(value.to_owned())),
        }
    }
}

/// Requester-side review status of a HIT.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HitReviewStatus {
    /// The HIT has not been reviewed.
    NotReviewed,
    /// The HIT has been queued for review.
    MarkedForReview,
    /// Review found the HIT appropriate.
    ReviewedAppropriate,
    /// Review found the HIT inappropriate.
    ReviewedInappropriate,
}

impl HitReviewStatus {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NotReviewed => "not_reviewed",
            Self::MarkedForReview => "marked_for_review",
            Self::ReviewedAppropriate => "reviewed_appropriate",
            Self::ReviewedInappropriate => "reviewed_inappropriate",
        }
    }

    /// Maps an exact marketplace wire string to a review status.
    ///
    /// # Errors
    ///
    /// Returns [`MirrorDomainError::UnknownReviewStatus`] for any value
    /// outside the documented set.
    pub fn from_wire(value: &str) -> Result<Self, MirrorDomainError> {
        match value {
            "NotReviewed" => Ok(Self::NotReviewed),
            "MarkedForReview" => Ok(Self::MarkedForReview),
            "ReviewedAppropriate" => Ok(Self::ReviewedAppropriate),
            "ReviewedInappropriate" => Ok(Self::ReviewedInappropriate),
            _ => Err(MirrorDomainError::UnknownReviewStatus(value.to_owned())),
        }
    }
}

impl TryFrom<&str> for HitReviewStatus {
    type Error = ParseStatusError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "not_reviewed" => Ok(Self::NotReviewed),
            "marked_for_review" => Ok(Self::MarkedForReview),
            "reviewed_appropriate" => Ok(Self::ReviewedAppropriate),
            "reviewed_inappropriate" => Ok(Self::ReviewedInappropriate),
            _ => Err(ParseStatusError(value.to_owned())),
        }
    }
}

/// Marketplace lifecycle status of an assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssignmentStatus {
    /// The worker has submitted results; the requester has not yet ruled.
    Submitted,
    /// The requester (or auto-approval) accepted the results.
    Approved,
    /// The requester rejected the results.
    Rejected,
}

impl AssignmentStatus {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Submitted => "submitted",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }

    /// Maps an exact marketplace wire string to a status.
    ///
    /// # Errors
    ///
    /// Returns [`MirrorDomainError::UnknownAssignmentStatus`] for any value
    /// outside the documented set.
    pub fn from_wire(value: &str) -> Result<Self, MirrorDomainError> {
        match value {
            "Submitted" => Ok(Self::Submitted),
            "Approved" => Ok(Self::Approved),
            "Rejected" => Ok(Self::Rejected),
            _ => Err(MirrorDomainError::UnknownAssignmentStatus(value.to_owned())),
        }
    }

    /// Returns `true` once the requester has ruled on the assignment.
    #[must_use]
    pub const fn is_resolved(self) -> bool {
        matches!(self, Self::Approved | Self::Rejected)
    }
}

impl TryFrom<&str> for AssignmentStatus {
    type Error = ParseStatusError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "submitted" => Ok(Self::Submitted),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            _ => Err(ParseStatusError(value.to_owned())),
        }
    }
}
