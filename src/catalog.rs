//! See [`CatalogDocument`].

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Serialize, Serializer};
use serde_json::Value;

/// The path of the catalog document within the repository.
pub const CATALOG_PATH: &str = "data/icons.json";

/// The icon catalog as it's persisted. Every write replaces the whole document.
#[derive(Serialize, Clone, PartialEq, Debug)]
#[serde(rename_all = "camelCase")]
pub struct CatalogDocument {
    /// Every icon record. The records' shape isn't interpreted.
    pub all_icons: Value,

    /// The Chainguard-specific icon records. The records' shape isn't interpreted.
    pub chainguard_specific: Value,

    /// When the document was written.
    #[serde(serialize_with = "serialize_timestamp")]
    pub last_updated: DateTime<Utc>,
}

impl CatalogDocument {
    /// Constructs a document stamped with the specified write time.
    pub fn stamped(all_icons: Value, chainguard_specific: Value, now: DateTime<Utc>) -> Self {
        Self {
            all_icons,
            chainguard_specific,
            last_updated: now,
        }
    }

    /// Serializes the document as JSON indented by two spaces, the format it's committed in.
    ///
    /// # Errors
    ///
    /// Fails only if an icon record can't be represented as JSON, which can't happen for records
    /// that were themselves parsed from JSON.
    pub fn to_pretty_json(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec_pretty(self)
    }
}

/// Formats a timestamp as ISO 8601 in UTC with millisecond precision (e.g.
/// `2024-01-31T09:30:00.000Z`).
pub fn format_timestamp(timestamp: &DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Serializes a timestamp with [`format_timestamp`].
///
/// # Errors
///
/// Fails if the serializer fails to write a string.
fn serialize_timestamp<S: Serializer>(
    timestamp: &DateTime<Utc>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&format_timestamp(timestamp))
}
