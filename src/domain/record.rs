use std::fmt;

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Opaque, store-assigned record identifier
///
/// Unique within a feed kind and never reused.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RecordId(String);

impl RecordId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RecordId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Server-assigned timestamp used to order a feed (newest first)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SortKey(DateTime<Utc>);

impl SortKey {
    pub fn new(at: DateTime<Utc>) -> Self {
        Self(at)
    }

    /// Build a sort key from milliseconds since the Unix epoch
    ///
    /// Out-of-range values clamp to the epoch.
    pub fn from_millis(millis: i64) -> Self {
        Self(Utc.timestamp_millis_opt(millis).single().unwrap_or_default())
    }

    pub fn now() -> Self {
        Self(Utc::now())
    }

    pub fn as_datetime(&self) -> DateTime<Utc> {
        self.0
    }

    pub fn timestamp_millis(&self) -> i64 {
        self.0.timestamp_millis()
    }

    /// Calendar day of this key in the given time zone
    pub fn day_in<Tz: TimeZone>(&self, tz: &Tz) -> NaiveDate {
        self.0.with_timezone(tz).date_naive()
    }
}

impl From<DateTime<Utc>> for SortKey {
    fn from(at: DateTime<Utc>) -> Self {
        Self(at)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("rating must be between 0 and 5, got {0}")]
pub struct InvalidRating(pub u8);

/// Numeric feedback rating in `0..=5`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Rating(u8);

impl Rating {
    pub const MAX: u8 = 5;

    pub fn new(value: u8) -> Result<Self, InvalidRating> {
        if value > Self::MAX {
            Err(InvalidRating(value))
        } else {
            Ok(Self(value))
        }
    }

    pub fn value(&self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for Rating {
    type Error = InvalidRating;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Rating> for u8 {
    fn from(rating: Rating) -> Self {
        rating.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentBody {
    pub author: String,
    pub message: String,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub provider: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackBody {
    pub author: String,
    pub message: String,
    pub rating: Rating,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub provider: Option<String>,
}

/// Kind-specific payload of a record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum RecordBody {
    Comment(CommentBody),
    Feedback(FeedbackBody),
}

impl RecordBody {
    pub fn author(&self) -> &str {
        match self {
            RecordBody::Comment(body) => &body.author,
            RecordBody::Feedback(body) => &body.author,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            RecordBody::Comment(body) => &body.message,
            RecordBody::Feedback(body) => &body.message,
        }
    }

    pub fn rating(&self) -> Option<Rating> {
        match self {
            RecordBody::Comment(_) => None,
            RecordBody::Feedback(body) => Some(body.rating),
        }
    }
}

/// A single immutable feed item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    id: RecordId,
    sort_key: SortKey,
    body: RecordBody,
}

impl Record {
    pub fn new(id: RecordId, sort_key: SortKey, body: RecordBody) -> Self {
        Self { id, sort_key, body }
    }

    pub fn id(&self) -> &RecordId {
        &self.id
    }

    pub fn sort_key(&self) -> SortKey {
        self.sort_key
    }

    pub fn body(&self) -> &RecordBody {
        &self.body
    }
}

#[cfg(test)]
mod tests {
    use chrono::FixedOffset;

    use super::*;

    #[test]
    fn test_rating_bounds() {
        assert_eq!(Rating::new(0).map(|r| r.value()), Ok(0));
        assert_eq!(Rating::new(5).map(|r| r.value()), Ok(5));
        assert_eq!(Rating::new(6), Err(InvalidRating(6)));
    }

    #[test]
    fn test_rating_deserialize_rejects_out_of_range() {
        assert!(serde_json::from_str::<Rating>("4").is_ok());
        assert!(serde_json::from_str::<Rating>("9").is_err());
    }

    #[test]
    fn test_sort_key_orders_by_time() {
        let older = SortKey::from_millis(1_000);
        let newer = SortKey::from_millis(2_000);
        assert!(older < newer);
        assert_eq!(newer.timestamp_millis(), 2_000);
    }

    #[test]
    fn test_sort_key_day_respects_offset() {
        // 2024-03-01T23:30:00Z
        let key = SortKey::from_millis(1_709_335_800_000);
        let utc = FixedOffset::east_opt(0).expect("valid offset");
        let tokyo = FixedOffset::east_opt(9 * 3600).expect("valid offset");

        assert_eq!(key.day_in(&utc).to_string(), "2024-03-01");
        assert_eq!(key.day_in(&tokyo).to_string(), "2024-03-02");
    }

    #[test]
    fn test_body_accessors() {
        let body = RecordBody::Feedback(FeedbackBody {
            author: "alice".to_string(),
            message: "great".to_string(),
            rating: Rating::new(4).expect("valid rating"),
            avatar_url: None,
            provider: Some("github".to_string()),
        });
        assert_eq!(body.author(), "alice");
        assert_eq!(body.message(), "great");
        assert_eq!(body.rating().map(|r| r.value()), Some(4));
    }
}
