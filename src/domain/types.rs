//! Strongly-typed value objects used by domain entities.
//!
//! These wrappers enforce basic invariants (e.g., positive identifiers,
//! normalized/validated email, zero-padded clock times) so that once a value
//! reaches the domain layer it can be treated as trusted.
use std::fmt::{Display, Formatter};
use std::ops::Deref;

use phonenumber::{Mode, parse};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use validator::{ValidateEmail, ValidateUrl};

/// Errors produced when attempting to construct a constrained value object.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeConstraintError {
    /// Provided identifier is zero or negative.
    #[error("id must be greater than zero")]
    NonPositiveId,
    /// Provided email failed format validation.
    #[error("invalid email address")]
    InvalidEmail,
    /// Provided string contained no non-whitespace characters.
    #[error("value cannot be empty")]
    EmptyString,
    /// Provided value failed custom validation.
    #[error("invalid value: {0}")]
    InvalidValue(String),
    /// Phone number did not meet expected format.
    #[error("invalid phone number")]
    InvalidPhone,
    /// Provided url failed format validation.
    #[error("invalid url address")]
    InvalidUrl,
    /// Clock time is not a zero-padded `HH:MM` value.
    #[error("invalid time of day")]
    InvalidTime,
    /// Score fell outside the 0..=100 range.
    #[error("score must be between 0 and 100")]
    ScoreOutOfRange,
    /// Money amount was negative.
    #[error("amount cannot be negative")]
    NegativeAmount,
}

/// Normalizes and validates an email string.
fn normalize_email<S: Into<String>>(email: S) -> Result<String, TypeConstraintError> {
    let normalized = email.into().trim().to_lowercase();
    if normalized.validate_email() {
        Ok(normalized)
    } else {
        Err(TypeConstraintError::InvalidEmail)
    }
}

/// Macro to generate lightweight newtypes for positive identifiers.
macro_rules! id_newtype {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name(i32);

        impl $name {
            /// Creates a new identifier ensuring it is greater than zero.
            pub fn new(value: i32) -> Result<Self, TypeConstraintError> {
                if value > 0 {
                    Ok(Self(value))
                } else {
                    Err(TypeConstraintError::NonPositiveId)
                }
            }

            /// Returns the raw `i32` backing this identifier.
            pub const fn get(self) -> i32 {
                self.0
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl TryFrom<i32> for $name {
            type Error = TypeConstraintError;

            fn try_from(value: i32) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for i32 {
            fn from(value: $name) -> Self {
                value.0
            }
        }
    };
}

id_newtype!(HubId, "Unique identifier for a hub (tenant).");
id_newtype!(CompanyId, "Unique identifier for a prospective company.");
id_newtype!(OperatorId, "Unique identifier for a call-center operator.");
id_newtype!(AppointmentId, "Unique identifier for an appointment.");
id_newtype!(SlotId, "Unique identifier for a schedule slot.");
id_newtype!(CallId, "Unique identifier for a recorded call.");
id_newtype!(GoldenCallId, "Unique identifier for a golden call.");
id_newtype!(InsightId, "Unique identifier for a rejection insight.");
id_newtype!(TemplateId, "Unique identifier for a document template.");
id_newtype!(DocumentSendId, "Unique identifier for a document send.");
id_newtype!(FollowupRuleId, "Unique identifier for a follow-up rule.");
id_newtype!(CrawlJobId, "Unique identifier for a crawl job.");
id_newtype!(NewsTriggerId, "Unique identifier for a news trigger.");
id_newtype!(FraudScoreId, "Unique identifier for a fraud score.");
id_newtype!(SubsidyReportId, "Unique identifier for a subsidy report.");
id_newtype!(ComplianceDocumentId, "Unique identifier for a compliance document.");
id_newtype!(AuditLogId, "Unique identifier for an audit log entry.");
id_newtype!(ScenarioId, "Unique identifier for a roleplay scenario.");
id_newtype!(SessionId, "Unique identifier for a roleplay session.");

/// Lower-cased and validated email address.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Validates and normalizes an email string.
    pub fn new<S: Into<String>>(email: S) -> Result<Self, TypeConstraintError> {
        let normalized = normalize_email(email)?;
        Ok(Self(normalized))
    }

    /// Borrow the email as a `&str`.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Convert into the owned inner `String`.
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl Display for EmailAddress {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for EmailAddress {
    type Error = TypeConstraintError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<&str> for EmailAddress {
    type Error = TypeConstraintError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<EmailAddress> for String {
    fn from(value: EmailAddress) -> Self {
        value.0
    }
}

/// Wrapper for non-empty, trimmed strings.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NonEmptyString(String);

impl NonEmptyString {
    /// Trims whitespace and rejects empty inputs.
    pub fn new<S: Into<String>>(value: S) -> Result<Self, TypeConstraintError> {
        let trimmed = value.into().trim().to_string();
        if trimmed.is_empty() {
            return Err(TypeConstraintError::EmptyString);
        }
        Ok(Self(trimmed))
    }

    /// Sanitizes HTML before trimming, for free text echoed back into pages.
    pub fn sanitized<S: Into<String>>(value: S) -> Result<Self, TypeConstraintError> {
        Self::new(ammonia::clean(&value.into()))
    }

    /// Borrow the inner string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume the wrapper returning the owned string.
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl Deref for NonEmptyString {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl Display for NonEmptyString {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for NonEmptyString {
    type Error = TypeConstraintError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<&str> for NonEmptyString {
    type Error = TypeConstraintError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<NonEmptyString> for String {
    fn from(value: NonEmptyString) -> Self {
        value.0
    }
}

macro_rules! non_empty_string_newtype {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name(String);

        impl $name {
            /// Constructs a trimmed, non-empty value.
            pub fn new<S: Into<String>>(value: S) -> Result<Self, TypeConstraintError> {
                let inner = NonEmptyString::new(value)?;
                Ok(Self(inner.into_inner()))
            }

            /// Borrow the value as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume the wrapper and return the owned string.
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl Deref for $name {
            type Target = str;

            fn deref(&self) -> &Self::Target {
                &self.0
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl TryFrom<String> for $name {
            type Error = TypeConstraintError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl TryFrom<&str> for $name {
            type Error = TypeConstraintError;

            fn try_from(value: &str) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.0
            }
        }
    };
}

non_empty_string_newtype!(CompanyName, "Company name wrapper enforcing non-empty values.");

non_empty_string_newtype!(OperatorName, "Operator display name enforcing non-empty values.");

non_empty_string_newtype!(
    Title,
    "Short label (template name, report program, document title) enforcing non-empty values."
);

non_empty_string_newtype!(
    Keyword,
    "Keyword watched by a news trigger enforcing trimmed, non-empty values."
);

/// Normalizes a phone number string to E.164 format.
pub fn normalize_phone_to_e164(value: &str) -> Result<String, TypeConstraintError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(TypeConstraintError::EmptyString);
    }
    let parsed = parse(None, trimmed).map_err(|_| TypeConstraintError::InvalidPhone)?;
    Ok(parsed.format().mode(Mode::E164).to_string())
}

/// Normalized phone number wrapper (expected E.164).
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct PhoneNumber(String);

impl PhoneNumber {
    /// Constructs a phone number ensuring it is valid and normalizes to E.164 format.
    pub fn new<S: Into<String>>(value: S) -> Result<Self, TypeConstraintError> {
        let normalized = normalize_phone_to_e164(&value.into())?;
        Ok(Self(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl Display for PhoneNumber {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for PhoneNumber {
    type Error = TypeConstraintError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<PhoneNumber> for String {
    fn from(value: PhoneNumber) -> Self {
        value.0
    }
}

/// Non-empty, validated absolute URL.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct WebUrl(String);

impl WebUrl {
    /// Ensures a trimmed URL is non-empty and well formed before wrapping.
    pub fn new<S: Into<String>>(value: S) -> Result<Self, TypeConstraintError> {
        let url = NonEmptyString::new(value)?;

        if !url.as_str().validate_url() {
            Err(TypeConstraintError::InvalidUrl)
        } else {
            Ok(Self(url.into_inner()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl Display for WebUrl {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for WebUrl {
    type Error = TypeConstraintError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<WebUrl> for String {
    fn from(value: WebUrl) -> Self {
        value.0
    }
}

/// Zero-padded `HH:MM` clock time.
///
/// Ordering is the lexicographic ordering of the text, which matches the
/// chronological one because both parts are always two digits.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimeOfDay(String);

impl TimeOfDay {
    pub fn new<S: Into<String>>(value: S) -> Result<Self, TypeConstraintError> {
        let value = value.into();
        let trimmed = value.trim();
        let (hours, minutes) = trimmed
            .split_once(':')
            .ok_or(TypeConstraintError::InvalidTime)?;
        let two_digits = |part: &str| part.len() == 2 && part.bytes().all(|b| b.is_ascii_digit());
        if !two_digits(hours) || !two_digits(minutes) {
            return Err(TypeConstraintError::InvalidTime);
        }
        let hours: u32 = hours.parse().map_err(|_| TypeConstraintError::InvalidTime)?;
        let minutes: u32 = minutes
            .parse()
            .map_err(|_| TypeConstraintError::InvalidTime)?;
        if hours >= 24 || minutes >= 60 {
            return Err(TypeConstraintError::InvalidTime);
        }
        Ok(Self(format!("{hours:02}:{minutes:02}")))
    }

    /// Builds the time `total` minutes after midnight, `None` past 23:59.
    pub fn from_minutes(total: u32) -> Option<Self> {
        if total >= 24 * 60 {
            return None;
        }
        Some(Self(format!("{:02}:{:02}", total / 60, total % 60)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for TimeOfDay {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for TimeOfDay {
    type Error = TypeConstraintError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<&str> for TimeOfDay {
    type Error = TypeConstraintError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<TimeOfDay> for String {
    fn from(value: TimeOfDay) -> Self {
        value.0
    }
}

/// Percentage-like score in `0..=100`.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Score(i32);

impl Score {
    pub fn new(value: i32) -> Result<Self, TypeConstraintError> {
        if (0..=100).contains(&value) {
            Ok(Self(value))
        } else {
            Err(TypeConstraintError::ScoreOutOfRange)
        }
    }

    pub const fn get(self) -> i32 {
        self.0
    }
}

impl Display for Score {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<i32> for Score {
    type Error = TypeConstraintError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Non-negative amount in whole yen.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Yen(i64);

impl Yen {
    pub fn new(value: i64) -> Result<Self, TypeConstraintError> {
        if value >= 0 {
            Ok(Self(value))
        } else {
            Err(TypeConstraintError::NegativeAmount)
        }
    }

    pub const fn get(self) -> i64 {
        self.0
    }

    /// Adds two amounts, saturating at `i64::MAX`.
    pub fn saturating_add(self, other: Yen) -> Yen {
        Yen(self.0.saturating_add(other.0))
    }
}

impl Display for Yen {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "¥{}", self.0)
    }
}

/// Maps empty or whitespace-only optional text to `None`.
pub fn non_empty_opt(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_must_be_positive() {
        assert!(CompanyId::new(1).is_ok());
        assert_eq!(CompanyId::new(0), Err(TypeConstraintError::NonPositiveId));
        assert_eq!(HubId::new(-3), Err(TypeConstraintError::NonPositiveId));
    }

    #[test]
    fn email_is_lowercased_and_trimmed() {
        let email = EmailAddress::new("  Sales@Example.COM ").expect("valid email");
        assert_eq!(email.as_str(), "sales@example.com");
        assert_eq!(
            EmailAddress::new("not-an-email"),
            Err(TypeConstraintError::InvalidEmail)
        );
    }

    #[test]
    fn phone_is_normalized_to_e164() {
        let phone = PhoneNumber::new("+81 3-1234-5678").expect("valid phone");
        assert_eq!(phone.as_str(), "+81312345678");
        assert!(PhoneNumber::new("call me").is_err());
    }

    #[test]
    fn time_of_day_requires_zero_padding() {
        assert_eq!(TimeOfDay::new("09:30").expect("valid").as_str(), "09:30");
        assert!(TimeOfDay::new("9:30").is_err());
        assert!(TimeOfDay::new("24:00").is_err());
        assert!(TimeOfDay::new("12:60").is_err());
        assert_eq!(
            TimeOfDay::from_minutes(14 * 60 + 5).map(|t| t.to_string()),
            Some("14:05".to_string())
        );
        assert!(TimeOfDay::from_minutes(24 * 60).is_none());
    }

    #[test]
    fn time_of_day_orders_like_the_clock() {
        let a = TimeOfDay::new("09:00").expect("valid");
        let b = TimeOfDay::new("10:30").expect("valid");
        assert!(a < b);
    }

    #[test]
    fn score_and_yen_bounds() {
        assert!(Score::new(0).is_ok());
        assert!(Score::new(100).is_ok());
        assert_eq!(Score::new(101), Err(TypeConstraintError::ScoreOutOfRange));
        assert_eq!(Yen::new(-1), Err(TypeConstraintError::NegativeAmount));
        assert_eq!(Yen::new(1500).expect("valid").to_string(), "¥1500");
    }

    #[test]
    fn sanitized_text_strips_scripts() {
        let text = NonEmptyString::sanitized("<script>x</script>hello").expect("valid");
        assert_eq!(text.as_str(), "hello");
        assert!(NonEmptyString::sanitized("<script>x</script>").is_err());
    }
}
