use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::call::{
    Call as DomainCall, GoldenCall as DomainGoldenCall, NewCall as DomainNewCall,
    NewGoldenCall as DomainNewGoldenCall,
};
use crate::domain::types::{
    CallId, CompanyId, GoldenCallId, HubId, OperatorId, Score, Title, TypeConstraintError, WebUrl,
};

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::calls)]
/// Diesel model for [`crate::domain::call::Call`].
pub struct Call {
    pub id: i32,
    pub hub_id: i32,
    pub company_id: i32,
    pub operator_id: i32,
    pub called_at: NaiveDateTime,
    pub duration_seconds: i32,
    pub outcome: String,
    pub transcript: Option<String>,
    pub recording_url: Option<String>,
    pub quality_score: Option<i32>,
    pub sentiment: Option<String>,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::calls)]
/// Insertable form of [`Call`].
pub struct NewCall<'a> {
    pub hub_id: i32,
    pub company_id: i32,
    pub operator_id: i32,
    pub called_at: NaiveDateTime,
    pub duration_seconds: i32,
    pub outcome: &'a str,
    pub transcript: Option<&'a str>,
    pub recording_url: Option<&'a str>,
}

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::golden_calls)]
/// Diesel model for [`crate::domain::call::GoldenCall`].
pub struct GoldenCall {
    pub id: i32,
    pub hub_id: i32,
    pub call_id: i32,
    pub title: String,
    pub reason: Option<String>,
    pub created_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::golden_calls)]
/// Insertable form of [`GoldenCall`].
pub struct NewGoldenCall<'a> {
    pub hub_id: i32,
    pub call_id: i32,
    pub title: &'a str,
    pub reason: Option<&'a str>,
}

impl TryFrom<Call> for DomainCall {
    type Error = TypeConstraintError;

    fn try_from(call: Call) -> Result<Self, Self::Error> {
        Ok(Self {
            id: CallId::try_from(call.id)?,
            hub_id: HubId::try_from(call.hub_id)?,
            company_id: CompanyId::try_from(call.company_id)?,
            operator_id: OperatorId::try_from(call.operator_id)?,
            called_at: call.called_at,
            duration_seconds: call.duration_seconds,
            outcome: call.outcome.parse()?,
            transcript: call.transcript,
            recording_url: call.recording_url.map(WebUrl::new).transpose()?,
            quality_score: call.quality_score.map(Score::new).transpose()?,
            sentiment: call.sentiment.map(|s| s.parse()).transpose()?,
        })
    }
}

impl<'a> From<&'a DomainNewCall> for NewCall<'a> {
    fn from(call: &'a DomainNewCall) -> Self {
        Self {
            hub_id: call.hub_id.get(),
            company_id: call.company_id.get(),
            operator_id: call.operator_id.get(),
            called_at: call.called_at,
            duration_seconds: call.duration_seconds,
            outcome: call.outcome.as_str(),
            transcript: call.transcript.as_deref(),
            recording_url: call.recording_url.as_ref().map(WebUrl::as_str),
        }
    }
}

impl TryFrom<GoldenCall> for DomainGoldenCall {
    type Error = TypeConstraintError;

    fn try_from(golden: GoldenCall) -> Result<Self, Self::Error> {
        Ok(Self {
            id: GoldenCallId::try_from(golden.id)?,
            hub_id: HubId::try_from(golden.hub_id)?,
            call_id: CallId::try_from(golden.call_id)?,
            title: Title::new(golden.title)?,
            reason: golden.reason,
            created_at: golden.created_at,
        })
    }
}

impl<'a> From<&'a DomainNewGoldenCall> for NewGoldenCall<'a> {
    fn from(golden: &'a DomainNewGoldenCall) -> Self {
        Self {
            hub_id: golden.hub_id.get(),
            call_id: golden.call_id.get(),
            title: golden.title.as_str(),
            reason: golden.reason.as_deref(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::call::{CallOutcome, Sentiment};
    use chrono::Utc;

    fn row() -> Call {
        Call {
            id: 5,
            hub_id: 1,
            company_id: 2,
            operator_id: 3,
            called_at: Utc::now().naive_utc(),
            duration_seconds: 90,
            outcome: "Callback".into(),
            transcript: Some("hello".into()),
            recording_url: None,
            quality_score: Some(88),
            sentiment: Some("Positive".into()),
        }
    }

    #[test]
    fn call_row_into_domain() {
        let call = DomainCall::try_from(row()).expect("valid call");
        assert_eq!(call.outcome, CallOutcome::Callback);
        assert_eq!(call.quality_score.map(Score::get), Some(88));
        assert_eq!(call.sentiment, Some(Sentiment::Positive));
    }

    #[test]
    fn out_of_range_score_is_rejected() {
        let mut bad = row();
        bad.quality_score = Some(150);
        assert_eq!(
            DomainCall::try_from(bad),
            Err(TypeConstraintError::ScoreOutOfRange)
        );
    }
}
