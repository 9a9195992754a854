use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::roleplay::{
    NewRoleplayScenario as DomainNewScenario, NewRoleplaySession as DomainNewSession, Objections,
    RoleplayScenario as DomainScenario, RoleplaySession as DomainSession,
    UpdateRoleplayScenario as DomainUpdateScenario,
};
use crate::domain::types::{
    HubId, NonEmptyString, OperatorId, ScenarioId, Score, SessionId, Title, TypeConstraintError,
};

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::roleplay_scenarios)]
/// Diesel model for [`crate::domain::roleplay::RoleplayScenario`].
pub struct RoleplayScenario {
    pub id: i32,
    pub hub_id: i32,
    pub title: String,
    pub persona: String,
    pub objections: String,
    pub created_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::roleplay_scenarios)]
pub struct NewRoleplayScenario<'a> {
    pub hub_id: i32,
    pub title: &'a str,
    pub persona: &'a str,
    pub objections: String,
}

#[derive(AsChangeset)]
#[diesel(table_name = crate::schema::roleplay_scenarios)]
pub struct UpdateRoleplayScenario<'a> {
    pub title: &'a str,
    pub persona: &'a str,
    pub objections: String,
}

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::roleplay_sessions)]
/// Diesel model for [`crate::domain::roleplay::RoleplaySession`].
pub struct RoleplaySession {
    pub id: i32,
    pub hub_id: i32,
    pub scenario_id: i32,
    pub operator_id: i32,
    pub objection: String,
    pub transcript: Option<String>,
    pub score: Option<i32>,
    pub created_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::roleplay_sessions)]
pub struct NewRoleplaySession<'a> {
    pub hub_id: i32,
    pub scenario_id: i32,
    pub operator_id: i32,
    pub objection: &'a str,
}

impl TryFrom<RoleplayScenario> for DomainScenario {
    type Error = TypeConstraintError;

    fn try_from(scenario: RoleplayScenario) -> Result<Self, Self::Error> {
        Ok(Self {
            id: ScenarioId::try_from(scenario.id)?,
            hub_id: HubId::try_from(scenario.hub_id)?,
            title: Title::new(scenario.title)?,
            persona: NonEmptyString::new(scenario.persona)?,
            objections: Objections::parse(&scenario.objections)?,
            created_at: scenario.created_at,
        })
    }
}

impl<'a> From<&'a DomainNewScenario> for NewRoleplayScenario<'a> {
    fn from(scenario: &'a DomainNewScenario) -> Self {
        Self {
            hub_id: scenario.hub_id.get(),
            title: scenario.title.as_str(),
            persona: scenario.persona.as_str(),
            objections: scenario.objections.to_text(),
        }
    }
}

impl<'a> From<&'a DomainUpdateScenario> for UpdateRoleplayScenario<'a> {
    fn from(scenario: &'a DomainUpdateScenario) -> Self {
        Self {
            title: scenario.title.as_str(),
            persona: scenario.persona.as_str(),
            objections: scenario.objections.to_text(),
        }
    }
}

impl TryFrom<RoleplaySession> for DomainSession {
    type Error = TypeConstraintError;

    fn try_from(session: RoleplaySession) -> Result<Self, Self::Error> {
        Ok(Self {
            id: SessionId::try_from(session.id)?,
            hub_id: HubId::try_from(session.hub_id)?,
            scenario_id: ScenarioId::try_from(session.scenario_id)?,
            operator_id: OperatorId::try_from(session.operator_id)?,
            objection: session.objection,
            transcript: session.transcript,
            score: session.score.map(Score::new).transpose()?,
            created_at: session.created_at,
        })
    }
}

impl<'a> From<&'a DomainNewSession> for NewRoleplaySession<'a> {
    fn from(session: &'a DomainNewSession) -> Self {
        Self {
            hub_id: session.hub_id.get(),
            scenario_id: session.scenario_id.get(),
            operator_id: session.operator_id.get(),
            objection: session.objection.as_str(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn objections_are_stored_one_per_line() {
        let domain = DomainNewScenario {
            hub_id: HubId::new(1).expect("valid hub"),
            title: Title::new("受付突破").expect("valid title"),
            persona: NonEmptyString::new("受付担当").expect("valid persona"),
            objections: Objections::parse("担当者不在\n資料だけ送って").expect("valid"),
        };
        let new: NewRoleplayScenario = (&domain).into();
        assert_eq!(new.objections, "担当者不在\n資料だけ送って");

        let row = RoleplayScenario {
            id: 1,
            hub_id: 1,
            title: new.title.to_string(),
            persona: new.persona.to_string(),
            objections: new.objections.clone(),
            created_at: Utc::now().naive_utc(),
        };
        let scenario = DomainScenario::try_from(row).expect("valid scenario");
        assert_eq!(scenario.objections.as_slice().len(), 2);
    }
}
