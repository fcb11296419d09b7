//! Identifier newtypes for marketplace-assigned remote ids.
//!
//! The marketplace is the sole authority for these identifiers: they are
//! opaque non-empty strings, unique per entity kind, and immutable once a
//! local record has been created around them.

use super::MirrorDomainError;
use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! remote_id {
    ($(#[$doc:meta])* $name:ident, $field:literal) => {
        $(#[$doc])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Creates a validated identifier.
            ///
            /// # Errors
            ///
            /// Returns [`MirrorDomainError::EmptyIdentifier`] when the value
            /// is empty after trimming.
            pub fn new(value: impl Into<String>) -> Result<Self, MirrorDomainError> {
                let raw = value.into();
                let trimmed = raw.trim();
                if trimmed.is_empty() {
                    return Err(MirrorDomainError::EmptyIdentifier { field: $field });
                }
                Ok(Self(trimmed.to_owned()))
            }

            /// Returns the identifier as `str`.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                self.as_str()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

remote_id!(
    /// Unique marketplace identifier for a HIT.
    HitId,
    "HIT id"
);

remote_id!(
    /// Unique marketplace identifier for an assignment.
    AssignmentId,
    "assignment id"
);

remote_id!(
    /// Marketplace identifier for the worker who accepted an assignment.
    WorkerId,
    "worker id"
);
