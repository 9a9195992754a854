//! Repository implementation for call-centre operators.

use diesel::prelude::*;

use crate::{
    domain::{
        operator::{NewOperator, Operator},
        types::{EmailAddress, HubId, OperatorId},
    },
    models::operator::{
        NewOperator as DbNewOperator, Operator as DbOperator, UpdateOperator as DbUpdateOperator,
    },
    repository::{
        DieselRepository, OperatorReader, OperatorWriter,
        errors::{RepositoryError, RepositoryResult},
    },
};

impl OperatorReader for DieselRepository {
    fn get_operator_by_id(
        &self,
        id: OperatorId,
        hub_id: HubId,
    ) -> RepositoryResult<Option<Operator>> {
        use crate::schema::operators;

        let mut conn = self.conn()?;
        let operator = operators::table
            .filter(operators::id.eq(id.get()))
            .filter(operators::hub_id.eq(hub_id.get()))
            .first::<DbOperator>(&mut conn)
            .optional()?;

        operator
            .map(|db| Operator::try_from(db).map_err(RepositoryError::from))
            .transpose()
    }

    fn get_operator_by_email(
        &self,
        email: &EmailAddress,
        hub_id: HubId,
    ) -> RepositoryResult<Option<Operator>> {
        use crate::schema::operators;

        let mut conn = self.conn()?;
        let operator = operators::table
            .filter(operators::email.eq(email.as_str()))
            .filter(operators::hub_id.eq(hub_id.get()))
            .first::<DbOperator>(&mut conn)
            .optional()?;

        operator
            .map(|db| Operator::try_from(db).map_err(RepositoryError::from))
            .transpose()
    }

    fn list_operators(&self, hub_id: HubId) -> RepositoryResult<Vec<Operator>> {
        use crate::schema::operators;

        let mut conn = self.conn()?;
        operators::table
            .filter(operators::hub_id.eq(hub_id.get()))
            .order((operators::name.asc(), operators::id.asc()))
            .load::<DbOperator>(&mut conn)?
            .into_iter()
            .map(|db| Operator::try_from(db).map_err(RepositoryError::from))
            .collect()
    }
}

impl OperatorWriter for DieselRepository {
    fn upsert_operator(&self, new_operator: &NewOperator) -> RepositoryResult<Operator> {
        use crate::schema::operators;

        let mut conn = self.conn()?;
        let db_new_operator: DbNewOperator = new_operator.into();
        let db_update: DbUpdateOperator = (&db_new_operator).into();

        let db_operator = diesel::insert_into(operators::table)
            .values(&db_new_operator)
            .on_conflict((operators::email, operators::hub_id))
            .do_update()
            .set(&db_update)
            .get_result::<DbOperator>(&mut conn)?;

        Operator::try_from(db_operator).map_err(RepositoryError::from)
    }

    fn set_operator_active(
        &self,
        id: OperatorId,
        hub_id: HubId,
        is_active: bool,
    ) -> RepositoryResult<Operator> {
        use crate::schema::operators;

        let mut conn = self.conn()?;
        let db_operator = diesel::update(
            operators::table
                .filter(operators::id.eq(id.get()))
                .filter(operators::hub_id.eq(hub_id.get())),
        )
        .set(operators::is_active.eq(is_active))
        .get_result::<DbOperator>(&mut conn)?;

        Operator::try_from(db_operator).map_err(RepositoryError::from)
    }
}
