//! Form definitions backing the dashboard routes.
//!
//! Forms deserialize raw request data; their `*Payload` counterparts hold
//! validated domain values. Error messages are shown to users as flash
//! messages.

use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime};
use thiserror::Error;
use validator::ValidationErrors;

use crate::domain::types::TypeConstraintError;

pub mod appointments;
pub mod calls;
pub mod companies;
pub mod compliance;
pub mod fraud;
pub mod intelligence;
pub mod nurturing;
pub mod operators;
pub mod rejections;
pub mod roleplay;
pub mod schedule;

#[derive(Debug, Error, PartialEq)]
/// Errors that can occur when processing form data.
pub enum FormError {
    #[error("入力内容に誤りがあります: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("メールアドレスが正しくありません")]
    InvalidEmail,

    #[error("電話番号が正しくありません")]
    InvalidPhoneNumber,

    #[error("URLが正しくありません")]
    InvalidUrl,

    #[error("必須項目が入力されていません")]
    Required,

    #[error("IDが正しくありません")]
    InvalidId,

    #[error("日付が正しくありません: {0}")]
    InvalidDate(String),

    #[error("時刻が正しくありません")]
    InvalidTime,

    #[error("スコアは0〜100で入力してください")]
    InvalidScore,

    #[error("金額は0以上で入力してください")]
    InvalidAmount,

    #[error("選択肢が正しくありません: {0}")]
    InvalidChoice(String),

    #[error("入力値が正しくありません: {0}")]
    InvalidValue(String),

    #[error("CSVの{row}行目: {message}")]
    CsvRow { row: usize, message: String },

    #[error("CSVを読み込めません: {0}")]
    Csv(String),
}

impl From<TypeConstraintError> for FormError {
    fn from(err: TypeConstraintError) -> Self {
        match err {
            TypeConstraintError::NonPositiveId => FormError::InvalidId,
            TypeConstraintError::InvalidEmail => FormError::InvalidEmail,
            TypeConstraintError::EmptyString => FormError::Required,
            TypeConstraintError::InvalidValue(value) => FormError::InvalidValue(value),
            TypeConstraintError::InvalidPhone => FormError::InvalidPhoneNumber,
            TypeConstraintError::InvalidUrl => FormError::InvalidUrl,
            TypeConstraintError::InvalidTime => FormError::InvalidTime,
            TypeConstraintError::ScoreOutOfRange => FormError::InvalidScore,
            TypeConstraintError::NegativeAmount => FormError::InvalidAmount,
        }
    }
}

/// Parses an `<input type="date">` value.
pub fn parse_date(value: &str) -> Result<NaiveDate, FormError> {
    let value = value.trim();
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| FormError::InvalidDate(value.to_string()))
}

/// Parses an `<input type="datetime-local">` value, with or without seconds.
pub fn parse_datetime(value: &str) -> Result<NaiveDateTime, FormError> {
    let value = value.trim();
    ["%Y-%m-%dT%H:%M", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M", "%Y-%m-%d %H:%M:%S"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .ok_or_else(|| FormError::InvalidDate(value.to_string()))
}

/// Optional date field; blank means absent.
pub fn parse_optional_date(value: Option<&str>) -> Result<Option<NaiveDate>, FormError> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        Some(v) => parse_date(v).map(Some),
        None => Ok(None),
    }
}

/// Optional numeric id coming from a `<select>` whose empty option is "none".
pub fn parse_optional_id(value: Option<&str>) -> Result<Option<i32>, FormError> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        Some(v) => v.parse::<i32>().map(Some).map_err(|_| FormError::InvalidId),
        None => Ok(None),
    }
}

/// Parses a `<select>` value into one of the closed domain enums.
pub fn parse_choice<T: FromStr>(value: &str) -> Result<T, FormError> {
    value
        .trim()
        .parse::<T>()
        .map_err(|_| FormError::InvalidChoice(value.trim().to_string()))
}

/// HTML checkboxes submit a value only when ticked.
pub fn checkbox(value: Option<&str>) -> bool {
    matches!(value.map(str::trim), Some("on" | "true" | "1"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn datetime_local_values_are_accepted() {
        let expected = NaiveDate::from_ymd_opt(2025, 6, 2)
            .and_then(|d| d.and_hms_opt(10, 30, 0))
            .expect("valid datetime");
        assert_eq!(parse_datetime("2025-06-02T10:30"), Ok(expected));
        assert_eq!(parse_datetime("2025-06-02 10:30:00"), Ok(expected));
        assert!(matches!(
            parse_datetime("02/06/2025"),
            Err(FormError::InvalidDate(_))
        ));
    }

    #[test]
    fn blank_optional_values_are_none() {
        assert_eq!(parse_optional_id(Some("  ")), Ok(None));
        assert_eq!(parse_optional_id(Some("7")), Ok(Some(7)));
        assert_eq!(parse_optional_id(Some("x")), Err(FormError::InvalidId));
        assert_eq!(parse_optional_date(None), Ok(None));
    }

    #[test]
    fn unknown_choice_is_reported() {
        use crate::domain::call::CallOutcome;
        assert_eq!(parse_choice::<CallOutcome>(" Rejected "), Ok(CallOutcome::Rejected));
        assert_eq!(
            parse_choice::<CallOutcome>("Maybe"),
            Err(FormError::InvalidChoice("Maybe".to_string()))
        );
    }

    #[test]
    fn checkbox_values() {
        assert!(checkbox(Some("on")));
        assert!(!checkbox(None));
        assert!(!checkbox(Some("off")));
    }

    #[test]
    fn type_errors_map_to_messages() {
        assert_eq!(
            FormError::from(TypeConstraintError::ScoreOutOfRange).to_string(),
            "スコアは0〜100で入力してください"
        );
        assert_eq!(
            FormError::from(TypeConstraintError::EmptyString),
            FormError::Required
        );
    }
}
