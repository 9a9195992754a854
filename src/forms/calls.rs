//! Forms for recording calls, scoring them and curating golden calls.

use chrono::NaiveDateTime;
use serde::Deserialize;
use validator::Validate;

use crate::{
    domain::{
        call::{CallOutcome, CallScore, NewCall, NewGoldenCall, Sentiment},
        types::{CallId, CompanyId, HubId, OperatorId, Score, Title, WebUrl, non_empty_opt},
    },
    forms::{FormError, parse_choice, parse_datetime, parse_optional_id},
};

#[derive(Debug, Deserialize, Validate)]
pub struct RecordCallForm {
    pub company_id: i32,
    #[serde(default)]
    pub operator_id: Option<String>,
    pub called_at: String,
    #[validate(range(min = 0, max = 86400))]
    pub duration_seconds: i32,
    pub outcome: String,
    #[serde(default)]
    pub transcript: Option<String>,
    #[serde(default)]
    pub recording_url: Option<String>,
}

pub struct RecordCallPayload {
    pub company_id: CompanyId,
    pub operator_id: Option<OperatorId>,
    pub called_at: NaiveDateTime,
    pub duration_seconds: i32,
    pub outcome: CallOutcome,
    pub transcript: Option<String>,
    pub recording_url: Option<WebUrl>,
}

impl TryFrom<RecordCallForm> for RecordCallPayload {
    type Error = FormError;

    fn try_from(form: RecordCallForm) -> Result<Self, Self::Error> {
        form.validate()?;
        Ok(Self {
            company_id: CompanyId::new(form.company_id)?,
            operator_id: parse_optional_id(form.operator_id.as_deref())?
                .map(OperatorId::new)
                .transpose()?,
            called_at: parse_datetime(&form.called_at)?,
            duration_seconds: form.duration_seconds,
            outcome: parse_choice(&form.outcome)?,
            transcript: non_empty_opt(form.transcript).map(|t| ammonia::clean(&t)),
            recording_url: non_empty_opt(form.recording_url)
                .map(WebUrl::new)
                .transpose()?,
        })
    }
}

impl RecordCallPayload {
    pub fn into_domain(self, hub_id: HubId, operator_id: OperatorId) -> NewCall {
        NewCall {
            hub_id,
            company_id: self.company_id,
            operator_id,
            called_at: self.called_at,
            duration_seconds: self.duration_seconds,
            outcome: self.outcome,
            transcript: self.transcript,
            recording_url: self.recording_url,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ScoreCallForm {
    pub quality_score: i32,
    pub sentiment: String,
}

impl TryFrom<ScoreCallForm> for CallScore {
    type Error = FormError;

    fn try_from(form: ScoreCallForm) -> Result<Self, Self::Error> {
        Ok(CallScore {
            quality_score: Score::new(form.quality_score)?,
            sentiment: parse_choice::<Sentiment>(&form.sentiment)?,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct GoldenCallForm {
    pub call_id: i32,
    pub title: String,
    #[serde(default)]
    pub reason: Option<String>,
}

pub struct GoldenCallPayload {
    pub call_id: CallId,
    pub title: Title,
    pub reason: Option<String>,
}

impl TryFrom<GoldenCallForm> for GoldenCallPayload {
    type Error = FormError;

    fn try_from(form: GoldenCallForm) -> Result<Self, Self::Error> {
        Ok(Self {
            call_id: CallId::new(form.call_id)?,
            title: Title::new(ammonia::clean(&form.title))?,
            reason: non_empty_opt(form.reason).map(|r| ammonia::clean(&r)),
        })
    }
}

impl GoldenCallPayload {
    pub fn into_domain(self, hub_id: HubId) -> NewGoldenCall {
        NewGoldenCall {
            hub_id,
            call_id: self.call_id,
            title: self.title,
            reason: self.reason,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record_form() -> RecordCallForm {
        RecordCallForm {
            company_id: 1,
            operator_id: Some("2".to_string()),
            called_at: "2025-06-02T10:00".to_string(),
            duration_seconds: 180,
            outcome: "Callback".to_string(),
            transcript: Some("  ".to_string()),
            recording_url: Some("https://rec.example.com/1.mp3".to_string()),
        }
    }

    #[test]
    fn record_form_parses_choices() {
        let payload = RecordCallPayload::try_from(record_form()).expect("valid form");
        assert_eq!(payload.outcome, CallOutcome::Callback);
        assert_eq!(payload.transcript, None);
        assert_eq!(payload.operator_id.map(|id| id.get()), Some(2));
        assert!(payload.recording_url.is_some());
    }

    #[test]
    fn negative_duration_is_rejected() {
        let mut form = record_form();
        form.duration_seconds = -1;
        assert!(matches!(
            RecordCallPayload::try_from(form),
            Err(FormError::Validation(_))
        ));
    }

    #[test]
    fn score_is_bounded() {
        let form = ScoreCallForm {
            quality_score: 120,
            sentiment: "Positive".to_string(),
        };
        assert_eq!(CallScore::try_from(form), Err(FormError::InvalidScore));

        let form = ScoreCallForm {
            quality_score: 85,
            sentiment: "Negative".to_string(),
        };
        let score = CallScore::try_from(form).expect("valid score");
        assert_eq!(score.quality_score.get(), 85);
        assert_eq!(score.sentiment, Sentiment::Negative);
    }

    #[test]
    fn golden_title_is_required() {
        let form = GoldenCallForm {
            call_id: 3,
            title: " ".to_string(),
            reason: None,
        };
        assert!(matches!(
            GoldenCallPayload::try_from(form),
            Err(FormError::Required)
        ));
    }
}
