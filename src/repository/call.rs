//! Repository implementation for calls and golden calls.

use diesel::prelude::*;

use crate::{
    domain::{
        call::{Call, CallScore, GoldenCall, NewCall, NewGoldenCall},
        types::{CallId, GoldenCallId, HubId, TypeConstraintError},
    },
    models::call::{
        Call as DbCall, GoldenCall as DbGoldenCall, NewCall as DbNewCall,
        NewGoldenCall as DbNewGoldenCall,
    },
    repository::{
        CallListQuery, CallReader, CallWriter, DieselRepository,
        errors::{RepositoryError, RepositoryResult},
    },
};

impl CallReader for DieselRepository {
    fn get_call_by_id(&self, id: CallId, hub_id: HubId) -> RepositoryResult<Option<Call>> {
        use crate::schema::calls;

        let mut conn = self.conn()?;
        let call = calls::table
            .filter(calls::id.eq(id.get()))
            .filter(calls::hub_id.eq(hub_id.get()))
            .first::<DbCall>(&mut conn)
            .optional()?;

        call.map(|db| Call::try_from(db).map_err(RepositoryError::from))
            .transpose()
    }

    fn list_calls(&self, query: CallListQuery) -> RepositoryResult<Vec<Call>> {
        use crate::schema::calls;

        let mut conn = self.conn()?;
        let mut items = calls::table
            .filter(calls::hub_id.eq(query.hub_id.get()))
            .into_boxed();

        if let Some(company_id) = query.company_id {
            items = items.filter(calls::company_id.eq(company_id.get()));
        }
        if let Some(operator_id) = query.operator_id {
            items = items.filter(calls::operator_id.eq(operator_id.get()));
        }
        if let Some(outcome) = query.outcome {
            items = items.filter(calls::outcome.eq(outcome.as_str()));
        }

        items
            .order((calls::called_at.desc(), calls::id.desc()))
            .load::<DbCall>(&mut conn)?
            .into_iter()
            .map(|db| Call::try_from(db).map_err(RepositoryError::from))
            .collect()
    }

    fn list_golden_calls(&self, hub_id: HubId) -> RepositoryResult<Vec<(GoldenCall, Call)>> {
        use crate::schema::{calls, golden_calls};

        let mut conn = self.conn()?;
        golden_calls::table
            .inner_join(calls::table)
            .filter(golden_calls::hub_id.eq(hub_id.get()))
            .order((golden_calls::created_at.desc(), golden_calls::id.desc()))
            .select((DbGoldenCall::as_select(), DbCall::as_select()))
            .load::<(DbGoldenCall, DbCall)>(&mut conn)?
            .into_iter()
            .map(|(golden, call)| {
                let golden = GoldenCall::try_from(golden)?;
                let call = Call::try_from(call)?;
                Ok((golden, call))
            })
            .collect::<Result<Vec<_>, TypeConstraintError>>()
            .map_err(RepositoryError::from)
    }

    fn is_golden_call(&self, call_id: CallId) -> RepositoryResult<bool> {
        use crate::schema::golden_calls;

        let mut conn = self.conn()?;
        let exists = diesel::select(diesel::dsl::exists(
            golden_calls::table.filter(golden_calls::call_id.eq(call_id.get())),
        ))
        .get_result::<bool>(&mut conn)?;

        Ok(exists)
    }
}

impl CallWriter for DieselRepository {
    fn create_call(&self, new_call: &NewCall) -> RepositoryResult<Call> {
        use crate::schema::calls;

        let mut conn = self.conn()?;
        let insertable: DbNewCall = new_call.into();

        let db_call = diesel::insert_into(calls::table)
            .values(&insertable)
            .get_result::<DbCall>(&mut conn)?;

        Call::try_from(db_call).map_err(RepositoryError::from)
    }

    fn update_call_score(
        &self,
        id: CallId,
        hub_id: HubId,
        score: &CallScore,
    ) -> RepositoryResult<Call> {
        use crate::schema::calls;

        let mut conn = self.conn()?;
        let db_call = diesel::update(
            calls::table
                .filter(calls::id.eq(id.get()))
                .filter(calls::hub_id.eq(hub_id.get())),
        )
        .set((
            calls::quality_score.eq(Some(score.quality_score.get())),
            calls::sentiment.eq(Some(score.sentiment.as_str())),
        ))
        .get_result::<DbCall>(&mut conn)?;

        Call::try_from(db_call).map_err(RepositoryError::from)
    }

    fn create_golden_call(&self, golden: &NewGoldenCall) -> RepositoryResult<GoldenCall> {
        use crate::schema::golden_calls;

        let mut conn = self.conn()?;
        let insertable: DbNewGoldenCall = golden.into();

        let db_golden = diesel::insert_into(golden_calls::table)
            .values(&insertable)
            .get_result::<DbGoldenCall>(&mut conn)?;

        GoldenCall::try_from(db_golden).map_err(RepositoryError::from)
    }

    fn delete_golden_call(&self, id: GoldenCallId, hub_id: HubId) -> RepositoryResult<()> {
        use crate::schema::golden_calls;

        let mut conn = self.conn()?;
        let deleted = diesel::delete(
            golden_calls::table
                .filter(golden_calls::id.eq(id.get()))
                .filter(golden_calls::hub_id.eq(hub_id.get())),
        )
        .execute(&mut conn)?;

        if deleted == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
