use chrono::NaiveDate;
use diesel::prelude::*;

use crate::{
    domain::{
        schedule::{NewScheduleSlot, ScheduleSlot},
        types::HubId,
    },
    models::schedule::{NewScheduleSlot as DbNewSlot, ScheduleSlot as DbSlot},
    repository::{
        DieselRepository, ScheduleReader, ScheduleWriter,
        errors::{RepositoryError, RepositoryResult},
    },
};

impl ScheduleReader for DieselRepository {
    fn list_slots(&self, hub_id: HubId, date: NaiveDate) -> RepositoryResult<Vec<ScheduleSlot>> {
        use crate::schema::schedule_slots;

        let mut conn = self.conn()?;
        schedule_slots::table
            .filter(schedule_slots::hub_id.eq(hub_id.get()))
            .filter(schedule_slots::slot_date.eq(date))
            .order((
                schedule_slots::start_time.asc(),
                schedule_slots::operator_id.asc(),
            ))
            .load::<DbSlot>(&mut conn)?
            .into_iter()
            .map(|db| ScheduleSlot::try_from(db).map_err(RepositoryError::from))
            .collect()
    }
}

impl ScheduleWriter for DieselRepository {
    fn replace_slots(
        &self,
        hub_id: HubId,
        date: NaiveDate,
        slots: &[NewScheduleSlot],
    ) -> RepositoryResult<usize> {
        use crate::schema::schedule_slots;

        let mut conn = self.conn()?;
        let insertables: Vec<DbNewSlot> = slots.iter().map(Into::into).collect();

        conn.transaction::<usize, diesel::result::Error, _>(|conn| {
            diesel::delete(
                schedule_slots::table
                    .filter(schedule_slots::hub_id.eq(hub_id.get()))
                    .filter(schedule_slots::slot_date.eq(date)),
            )
            .execute(conn)?;

            if insertables.is_empty() {
                return Ok(0);
            }

            diesel::insert_into(schedule_slots::table)
                .values(&insertables)
                .execute(conn)
        })
        .map_err(RepositoryError::from)
    }

    fn clear_slots(&self, hub_id: HubId, date: NaiveDate) -> RepositoryResult<usize> {
        use crate::schema::schedule_slots;

        let mut conn = self.conn()?;
        let deleted = diesel::delete(
            schedule_slots::table
                .filter(schedule_slots::hub_id.eq(hub_id.get()))
                .filter(schedule_slots::slot_date.eq(date)),
        )
        .execute(&mut conn)?;

        Ok(deleted)
    }
}
