//! Repository implementation for roleplay scenarios and training sessions.

use diesel::prelude::*;

use crate::{
    domain::{
        roleplay::{
            NewRoleplayScenario, NewRoleplaySession, RoleplayScenario, RoleplaySession,
            UpdateRoleplayScenario,
        },
        types::{HubId, OperatorId, ScenarioId, Score, SessionId},
    },
    models::roleplay::{
        NewRoleplayScenario as DbNewScenario, NewRoleplaySession as DbNewSession,
        RoleplayScenario as DbScenario, RoleplaySession as DbSession,
        UpdateRoleplayScenario as DbUpdateScenario,
    },
    repository::{
        DieselRepository, RoleplayReader, RoleplayWriter,
        errors::{RepositoryError, RepositoryResult},
    },
};

impl RoleplayReader for DieselRepository {
    fn get_scenario_by_id(
        &self,
        id: ScenarioId,
        hub_id: HubId,
    ) -> RepositoryResult<Option<RoleplayScenario>> {
        use crate::schema::roleplay_scenarios;

        let mut conn = self.conn()?;
        let scenario = roleplay_scenarios::table
            .filter(roleplay_scenarios::id.eq(id.get()))
            .filter(roleplay_scenarios::hub_id.eq(hub_id.get()))
            .first::<DbScenario>(&mut conn)
            .optional()?;

        scenario
            .map(|db| RoleplayScenario::try_from(db).map_err(RepositoryError::from))
            .transpose()
    }

    fn list_scenarios(&self, hub_id: HubId) -> RepositoryResult<Vec<RoleplayScenario>> {
        use crate::schema::roleplay_scenarios;

        let mut conn = self.conn()?;
        roleplay_scenarios::table
            .filter(roleplay_scenarios::hub_id.eq(hub_id.get()))
            .order((roleplay_scenarios::title.asc(), roleplay_scenarios::id.asc()))
            .load::<DbScenario>(&mut conn)?
            .into_iter()
            .map(|db| RoleplayScenario::try_from(db).map_err(RepositoryError::from))
            .collect()
    }

    fn get_session_by_id(
        &self,
        id: SessionId,
        hub_id: HubId,
    ) -> RepositoryResult<Option<RoleplaySession>> {
        use crate::schema::roleplay_sessions;

        let mut conn = self.conn()?;
        let session = roleplay_sessions::table
            .filter(roleplay_sessions::id.eq(id.get()))
            .filter(roleplay_sessions::hub_id.eq(hub_id.get()))
            .first::<DbSession>(&mut conn)
            .optional()?;

        session
            .map(|db| RoleplaySession::try_from(db).map_err(RepositoryError::from))
            .transpose()
    }

    fn list_sessions(
        &self,
        hub_id: HubId,
        operator_id: Option<OperatorId>,
    ) -> RepositoryResult<Vec<RoleplaySession>> {
        use crate::schema::roleplay_sessions;

        let mut conn = self.conn()?;
        let mut items = roleplay_sessions::table
            .filter(roleplay_sessions::hub_id.eq(hub_id.get()))
            .into_boxed();

        if let Some(operator_id) = operator_id {
            items = items.filter(roleplay_sessions::operator_id.eq(operator_id.get()));
        }

        items
            .order((
                roleplay_sessions::created_at.desc(),
                roleplay_sessions::id.desc(),
            ))
            .load::<DbSession>(&mut conn)?
            .into_iter()
            .map(|db| RoleplaySession::try_from(db).map_err(RepositoryError::from))
            .collect()
    }
}

impl RoleplayWriter for DieselRepository {
    fn create_scenario(
        &self,
        scenario: &NewRoleplayScenario,
    ) -> RepositoryResult<RoleplayScenario> {
        use crate::schema::roleplay_scenarios;

        let mut conn = self.conn()?;
        let insertable: DbNewScenario = scenario.into();

        let db_scenario = diesel::insert_into(roleplay_scenarios::table)
            .values(&insertable)
            .get_result::<DbScenario>(&mut conn)?;

        RoleplayScenario::try_from(db_scenario).map_err(RepositoryError::from)
    }

    fn update_scenario(
        &self,
        id: ScenarioId,
        hub_id: HubId,
        scenario: &UpdateRoleplayScenario,
    ) -> RepositoryResult<RoleplayScenario> {
        use crate::schema::roleplay_scenarios;

        let mut conn = self.conn()?;
        let changes: DbUpdateScenario = scenario.into();

        let db_scenario = diesel::update(
            roleplay_scenarios::table
                .filter(roleplay_scenarios::id.eq(id.get()))
                .filter(roleplay_scenarios::hub_id.eq(hub_id.get())),
        )
        .set(&changes)
        .get_result::<DbScenario>(&mut conn)?;

        RoleplayScenario::try_from(db_scenario).map_err(RepositoryError::from)
    }

    fn delete_scenario(&self, id: ScenarioId, hub_id: HubId) -> RepositoryResult<()> {
        use crate::schema::roleplay_scenarios;

        let mut conn = self.conn()?;
        let deleted = diesel::delete(
            roleplay_scenarios::table
                .filter(roleplay_scenarios::id.eq(id.get()))
                .filter(roleplay_scenarios::hub_id.eq(hub_id.get())),
        )
        .execute(&mut conn)?;

        if deleted == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    fn create_session(&self, session: &NewRoleplaySession) -> RepositoryResult<RoleplaySession> {
        use crate::schema::roleplay_sessions;

        let mut conn = self.conn()?;
        let insertable: DbNewSession = session.into();

        let db_session = diesel::insert_into(roleplay_sessions::table)
            .values(&insertable)
            .get_result::<DbSession>(&mut conn)?;

        RoleplaySession::try_from(db_session).map_err(RepositoryError::from)
    }

    fn submit_session_transcript(
        &self,
        id: SessionId,
        hub_id: HubId,
        transcript: &str,
    ) -> RepositoryResult<RoleplaySession> {
        use crate::schema::roleplay_sessions;

        let mut conn = self.conn()?;
        let db_session = diesel::update(
            roleplay_sessions::table
                .filter(roleplay_sessions::id.eq(id.get()))
                .filter(roleplay_sessions::hub_id.eq(hub_id.get())),
        )
        .set(roleplay_sessions::transcript.eq(Some(transcript)))
        .get_result::<DbSession>(&mut conn)?;

        RoleplaySession::try_from(db_session).map_err(RepositoryError::from)
    }

    fn grade_session(
        &self,
        id: SessionId,
        hub_id: HubId,
        score: Score,
    ) -> RepositoryResult<RoleplaySession> {
        use crate::schema::roleplay_sessions;

        let mut conn = self.conn()?;
        let db_session = diesel::update(
            roleplay_sessions::table
                .filter(roleplay_sessions::id.eq(id.get()))
                .filter(roleplay_sessions::hub_id.eq(hub_id.get())),
        )
        .set(roleplay_sessions::score.eq(Some(score.get())))
        .get_result::<DbSession>(&mut conn)?;

        RoleplaySession::try_from(db_session).map_err(RepositoryError::from)
    }
}
