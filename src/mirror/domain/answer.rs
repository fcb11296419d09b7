//! Answer key/value records submitted by workers.

use super::AssignmentId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One named answer field within a submitted assignment.
///
/// At most one record exists per `(assignment, key)` pair. The value is
/// stored in full; truncation is a display concern only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerKeyValue {
    assignment_id: AssignmentId,
    key: String,
    value: String,
}

impl AnswerKeyValue {
    /// Maximum number of characters [`AnswerKeyValue::short_value`] emits
    /// before eliding the rest.
    pub const MAX_DISPLAY_LENGTH: usize = 255;

    /// Creates an answer record with an empty value.
    #[must_use]
    pub fn new(assignment_id: AssignmentId, key: impl Into<String>) -> Self {
        Self {
            assignment_id,
            key: key.into(),
            value: String::new(),
        }
    }

    /// Reconstructs an answer record from persisted storage.
    #[must_use]
    pub fn from_persisted(
        assignment_id: AssignmentId,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            assignment_id,
            key: key.into(),
            value: value.into(),
        }
    }

    /// Returns the owning assignment's remote id.
    #[must_use]
    pub const fn assignment_id(&self) -> &AssignmentId {
        &self.assignment_id
    }

    /// Returns the answer key.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Returns the stored value in full.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Overwrites the value when it differs from the stored one.
    ///
    /// Returns `true` when the value changed and the record needs persisting;
    /// `false` means the stored value already matched and no write is needed.
    pub fn update_value(&mut self, value: &str) -> bool {
        if self.value == value {
            return false;
        }
        value.clone_into(&mut self.value);
        true
    }

    /// Returns the value truncated for display purposes.
    #[must_use]
    pub fn short_value(&self) -> String {
        if self.value.chars().count() <= Self::MAX_DISPLAY_LENGTH {
            return self.value.clone();
        }
        let mut short: String = self.value.chars().take(Self::MAX_DISPLAY_LENGTH).collect();
        short.push_str("...");
        short
    }
}

impl fmt::Display for AnswerKeyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.key, self.short_value())
    }
}
