//! Opaque application-level attachment for HIT records.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Reference to an arbitrary external record owned by the embedding
/// application.
///
/// The pair is a type tag plus an opaque identifier. The core stores and
/// returns it verbatim and never dereferences it; interpretation belongs
/// entirely to the owning application layer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Attachment {
    kind: String,
    reference: String,
}

impl Attachment {
    /// Creates an attachment reference.
    #[must_use]
    pub fn new(kind: impl Into<String>, reference: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            reference: reference.into(),
        }
    }

    /// Returns the application-defined type tag.
    #[must_use]
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Returns the opaque record identifier.
    #[must_use]
    pub fn reference(&self) -> &str {
        &self.reference
    }
}

impl fmt::Display for Attachment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.reference)
    }
}
