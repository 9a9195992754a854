//! Fraud score submissions from the dashboard form and the JSON API.

use serde::Deserialize;

use crate::{
    domain::{
        fraud::NewFraudScore,
        types::{CallId, HubId, NonEmptyString, OperatorId, Score},
    },
    forms::{FormError, parse_optional_id},
};

/// HTML form variant; the call select submits an empty string for "none".
#[derive(Debug, Deserialize)]
pub struct FraudScoreForm {
    pub operator_id: i32,
    #[serde(default)]
    pub call_id: Option<String>,
    pub score: i32,
    pub reason: String,
}

/// JSON body accepted by `POST /api/v1/fraud-scores`.
#[derive(Debug, Deserialize)]
pub struct FraudScoreRequest {
    pub operator_id: i32,
    #[serde(default)]
    pub call_id: Option<i32>,
    pub score: i32,
    pub reason: String,
}

pub struct FraudScorePayload {
    pub operator_id: OperatorId,
    pub call_id: Option<CallId>,
    pub score: Score,
    pub reason: NonEmptyString,
}

impl FraudScorePayload {
    fn build(
        operator_id: i32,
        call_id: Option<i32>,
        score: i32,
        reason: String,
    ) -> Result<Self, FormError> {
        Ok(Self {
            operator_id: OperatorId::new(operator_id)?,
            call_id: call_id.map(CallId::new).transpose()?,
            score: Score::new(score)?,
            reason: NonEmptyString::sanitized(reason)?,
        })
    }

    pub fn into_domain(self, hub_id: HubId) -> NewFraudScore {
        NewFraudScore {
            hub_id,
            operator_id: self.operator_id,
            call_id: self.call_id,
            score: self.score,
            reason: self.reason,
        }
    }
}

impl TryFrom<FraudScoreForm> for FraudScorePayload {
    type Error = FormError;

    fn try_from(form: FraudScoreForm) -> Result<Self, Self::Error> {
        let call_id = parse_optional_id(form.call_id.as_deref())?;
        Self::build(form.operator_id, call_id, form.score, form.reason)
    }
}

impl TryFrom<FraudScoreRequest> for FraudScorePayload {
    type Error = FormError;

    fn try_from(request: FraudScoreRequest) -> Result<Self, Self::Error> {
        Self::build(
            request.operator_id,
            request.call_id,
            request.score,
            request.reason,
        )
    }
}
