//! Parser for the marketplace timestamp wire format.

use super::MirrorDomainError;
use chrono::{DateTime, NaiveDateTime, Utc};

/// Wire format used by the marketplace for every timestamp field.
pub const MARKETPLACE_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Parses a marketplace timestamp string such as `"2012-04-04T22:31:03Z"`.
///
/// Marketplace timestamps are always UTC; the trailing `Z` is part of the
/// literal format. A malformed string is a data-shape failure and surfaces as
/// an error rather than a silent `None`, since silently defaulting would
/// corrupt the mirror.
///
/// # Errors
///
/// Returns [`MirrorDomainError::MalformedTimestamp`] when the value does not
/// match [`MARKETPLACE_TIMESTAMP_FORMAT`].
pub fn parse_marketplace_timestamp(value: &str) -> Result<DateTime<Utc>, MirrorDomainError> {
    NaiveDateTime::parse_from_str(value, MARKETPLACE_TIMESTAMP_FORMAT)
        .map(|naive| naive.and_utc())
        .map_err(|source| MirrorDomainError::MalformedTimestamp {
            value: value.to_owned(),
            source,
        })
}

/// Formats a timestamp in the marketplace wire format.
#[must_use]
pub fn format_marketplace_timestamp(value: DateTime<Utc>) -> String {
    value.format(MARKETPLACE_TIMESTAMP_FORMAT).to_string()
}
