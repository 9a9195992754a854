use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::fraud::{FraudScore as DomainFraudScore, NewFraudScore as DomainNewFraudScore};
use crate::domain::types::{
    CallId, FraudScoreId, HubId, NonEmptyString, OperatorId, Score, TypeConstraintError,
};

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::fraud_scores)]
/// Diesel model for [`crate::domain::fraud::FraudScore`].
pub struct FraudScore {
    pub id: i32,
    pub hub_id: i32,
    pub operator_id: i32,
    pub call_id: Option<i32>,
    pub score: i32,
    pub reason: String,
    pub created_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::fraud_scores)]
pub struct NewFraudScore<'a> {
    pub hub_id: i32,
    pub operator_id: i32,
    pub call_id: Option<i32>,
    pub score: i32,
    pub reason: &'a str,
}

impl TryFrom<FraudScore> for DomainFraudScore {
    type Error = TypeConstraintError;

    fn try_from(score: FraudScore) -> Result<Self, Self::Error> {
        Ok(Self {
            id: FraudScoreId::try_from(score.id)?,
            hub_id: HubId::try_from(score.hub_id)?,
            operator_id: OperatorId::try_from(score.operator_id)?,
            call_id: score.call_id.map(CallId::try_from).transpose()?,
            score: Score::new(score.score)?,
            reason: NonEmptyString::new(score.reason)?,
            created_at: score.created_at,
        })
    }
}

impl<'a> From<&'a DomainNewFraudScore> for NewFraudScore<'a> {
    fn from(score: &'a DomainNewFraudScore) -> Self {
        Self {
            hub_id: score.hub_id.get(),
            operator_id: score.operator_id.get(),
            call_id: score.call_id.map(CallId::get),
            score: score.score.get(),
            reason: score.reason.as_str(),
        }
    }
}
