//! Error types for mirror domain validation and snapshot merging.

use thiserror::Error;

/// Errors raised while validating domain values or merging remote snapshots.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MirrorDomainError {
    /// A remote identifier was empty after trimming.
    #[error("{field} must not be empty")]
    EmptyIdentifier {
        /// Name of the offending identifier field.
        field: &'static str,
    },

    /// The marketplace reported a HIT status string outside the known set.
    #[error("unknown HIT status on the wire: {0:?}")]
    UnknownHitStatus(String),

    /// The marketplace reported a HIT review status string outside the known
    /// set.
    #[error("unknown HIT review status on the wire: {0:?}")]
    UnknownReviewStatus(String),

    /// The marketplace reported an assignment status string outside the known
    /// set.
    #[error("unknown assignment status on the wire: {0:?}")]
    UnknownAssignmentStatus(String),

    /// A timestamp string did not match the marketplace wire format.
    #[error("malformed marketplace timestamp {value:?}: {source}")]
    MalformedTimestamp {
        /// The offending wire value.
        value: String,
        /// Underlying chrono parse failure.
        #[source]
        source: chrono::ParseError,
    },

    /// A monetary amount string was not a valid decimal with at most three
    /// fractional digits.
    #[error("malformed marketplace amount {0:?}")]
    MalformedAmount(String),

    /// A snapshot described a different record than the one being merged.
    #[error("snapshot describes remote id {actual:?}, expected {expected:?}")]
    SnapshotIdMismatch {
        /// Remote id of the local record.
        expected: String,
        /// Remote id carried by the snapshot.
        actual: String,
    },

    /// An assignment snapshot named a different owning HIT than the local
    /// record.
    #[error(
        "assignment {assignment_id} snapshot names HIT {actual:?}, \
         but the local record belongs to HIT {expected:?}"
    )]
    SnapshotHitMismatch {
        /// Remote id of the assignment being merged.
        assignment_id: String,
        /// Owning HIT recorded locally.
        expected: String,
        /// Owning HIT named by the snapshot.
        actual: String,
    },
}

/// Error returned while parsing persisted status strings back into enums.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown persisted status: {0}")]
pub struct ParseStatusError(pub String);
