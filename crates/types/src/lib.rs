//! Validated value types shared across the SkillnScale crates.
//!
//! Everything here is free of I/O: text and rating wrappers that can only be
//! constructed in a valid state, plus the closed vocabularies (roles, statuses,
//! message kinds) that are stored as plain text in the database.

mod status;

pub use status::{
    BookingStatus, ChatRoomStatus, DeliveryMethod, DevicePlatform, MessageType, PaymentStatus,
    RecurrencePattern, RequestStatus, UnknownVariant, Urgency, UserRole,
};

/// Why a piece of user-supplied text was refused.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TextError {
    /// Nothing left after trimming.
    #[error("Text cannot be empty")]
    Empty,
    /// Longer than the column it is stored in.
    #[error("Text exceeds maximum length of {max} characters")]
    TooLong { max: usize },
}

/// Trimmed text with at least one visible character.
///
/// Used for titles, descriptions and names arriving in request bodies; deserializing a blank
/// string fails before a handler runs.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NonEmptyText(String);

impl NonEmptyText {
    /// Trims `input`, rejecting it when nothing remains.
    pub fn new(input: impl AsRef<str>) -> Result<Self, TextError> {
        let trimmed = input.as_ref().trim();
        if trimmed.is_empty() {
            return Err(TextError::Empty);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Like [`NonEmptyText::new`], additionally bounding the length in characters.
    pub fn bounded(input: impl AsRef<str>, max: usize) -> Result<Self, TextError> {
        let text = Self::new(input)?;
        if text.0.chars().count() > max {
            return Err(TextError::TooLong { max });
        }
        Ok(text)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl std::fmt::Display for NonEmptyText {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for NonEmptyText {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl serde::Serialize for NonEmptyText {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> serde::Deserialize<'de> for NonEmptyText {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        NonEmptyText::new(&s).map_err(serde::de::Error::custom)
    }
}

/// Error returned when a review rating is outside `1..=5`.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("Rating must be between 1 and 5")]
pub struct RatingError;

/// A review score between one and five stars.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Rating(u8);

impl Rating {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;

    pub fn new(value: i64) -> Result<Self, RatingError> {
        if (Self::MIN as i64..=Self::MAX as i64).contains(&value) {
            Ok(Self(value as u8))
        } else {
            Err(RatingError)
        }
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

impl From<Rating> for i32 {
    fn from(rating: Rating) -> Self {
        rating.0 as i32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_empty_text_trims_input() {
        let text = NonEmptyText::new("  Kitchen sink  ").unwrap();
        assert_eq!(text.as_str(), "Kitchen sink");
    }

    #[test]
    fn non_empty_text_rejects_whitespace() {
        assert_eq!(NonEmptyText::new("   \t"), Err(TextError::Empty));
    }

    #[test]
    fn bounded_text_counts_characters_not_bytes() {
        assert!(NonEmptyText::bounded("₹₹₹", 3).is_ok());
        assert_eq!(
            NonEmptyText::bounded("abcd", 3),
            Err(TextError::TooLong { max: 3 })
        );
    }

    #[test]
    fn non_empty_text_deserialize_rejects_blank() {
        let err = serde_json::from_str::<NonEmptyText>("\"  \"").unwrap_err();
        assert!(err.to_string().contains("Text cannot be empty"));
    }

    #[test]
    fn rating_accepts_one_through_five() {
        for value in 1..=5 {
            assert_eq!(Rating::new(value).unwrap().get() as i64, value);
        }
        assert_eq!(Rating::new(0), Err(RatingError));
        assert_eq!(Rating::new(6), Err(RatingError));
        assert_eq!(Rating::new(-3), Err(RatingError));
    }
}
