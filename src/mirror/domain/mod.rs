//! Domain model for the marketplace mirror.
//!
//! Pure types with no infrastructure dependencies: validated remote
//! identifiers, status enumerations with explicit wire mappings, fixed-point
//! money, the marketplace timestamp parser, wire snapshot carriers, and the
//! [`Hit`]/[`Assignment`]/[`AnswerKeyValue`] aggregates whose merge methods
//! implement the mirror's overwrite rules.

mod answer;
mod assignment;
mod attachment;
mod error;
mod hit;
mod ids;
mod money;
mod snapshot;
mod status;
mod timestamp;

pub use answer::AnswerKeyValue;
pub use assignment::{Assignment, PersistedAssignmentData};
pub use attachment::Attachment;
pub use error::{MirrorDomainError, ParseStatusError};
pub use hit::{Hit, PersistedHitData};
pub use ids::{AssignmentId, HitId, WorkerId};
pub use money::Reward;
pub use snapshot::{AnswerDocument, AnswerField, AssignmentSnapshot, HitSnapshot};
pub use status::{AssignmentStatus, HitReviewStatus, HitStatus};
pub use timestamp::{
    MARKETPLACE_TIMESTAMP_FORMAT, format_marketplace_timestamp, parse_marketplace_timestamp,
};
