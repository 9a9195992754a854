//! Repository implementation for booked appointments.

use chrono::Utc;
use diesel::prelude::*;

use crate::{
    domain::{
        appointment::{Appointment, AppointmentStatus, NewAppointment},
        types::{AppointmentId, HubId},
    },
    models::appointment::{Appointment as DbAppointment, NewAppointment as DbNewAppointment},
    repository::{
        AppointmentListQuery, AppointmentReader, AppointmentWriter, DieselRepository,
        errors::{RepositoryError, RepositoryResult},
    },
};

impl AppointmentReader for DieselRepository {
    fn get_appointment_by_id(
        &self,
        id: AppointmentId,
        hub_id: HubId,
    ) -> RepositoryResult<Option<Appointment>> {
        use crate::schema::appointments;

        let mut conn = self.conn()?;
        let appointment = appointments::table
            .filter(appointments::id.eq(id.get()))
            .filter(appointments::hub_id.eq(hub_id.get()))
            .first::<DbAppointment>(&mut conn)
            .optional()?;

        appointment
            .map(|db| Appointment::try_from(db).map_err(RepositoryError::from))
            .transpose()
    }

    fn list_appointments(&self, query: AppointmentListQuery) -> RepositoryResult<Vec<Appointment>> {
        use crate::schema::appointments;

        let mut conn = self.conn()?;
        let mut items = appointments::table
            .filter(appointments::hub_id.eq(query.hub_id.get()))
            .into_boxed();

        if let Some(from) = query.from {
            items = items.filter(appointments::scheduled_at.ge(from));
        }
        if let Some(to) = query.to {
            items = items.filter(appointments::scheduled_at.lt(to));
        }
        if let Some(operator_id) = query.operator_id {
            items = items.filter(appointments::operator_id.eq(operator_id.get()));
        }
        if let Some(company_id) = query.company_id {
            items = items.filter(appointments::company_id.eq(company_id.get()));
        }

        items
            .order((appointments::scheduled_at.asc(), appointments::id.asc()))
            .load::<DbAppointment>(&mut conn)?
            .into_iter()
            .map(|db| Appointment::try_from(db).map_err(RepositoryError::from))
            .collect()
    }
}

impl AppointmentWriter for DieselRepository {
    fn create_appointment(
        &self,
        new_appointment: &NewAppointment,
    ) -> RepositoryResult<Appointment> {
        use crate::schema::appointments;

        let mut conn = self.conn()?;
        let insertable: DbNewAppointment = new_appointment.into();

        let db_appointment = diesel::insert_into(appointments::table)
            .values(&insertable)
            .get_result::<DbAppointment>(&mut conn)?;

        Appointment::try_from(db_appointment).map_err(RepositoryError::from)
    }

    fn update_appointment_status(
        &self,
        id: AppointmentId,
        hub_id: HubId,
        status: AppointmentStatus,
    ) -> RepositoryResult<Appointment> {
        use crate::schema::appointments;

        let mut conn = self.conn()?;
        let db_appointment = diesel::update(
            appointments::table
                .filter(appointments::id.eq(id.get()))
                .filter(appointments::hub_id.eq(hub_id.get())),
        )
        .set((
            appointments::status.eq(status.as_str()),
            appointments::updated_at.eq(Utc::now().naive_utc()),
        ))
        .get_result::<DbAppointment>(&mut conn)?;

        Appointment::try_from(db_appointment).map_err(RepositoryError::from)
    }

    fn set_calendar_event_id(
        &self,
        id: AppointmentId,
        hub_id: HubId,
        event_id: &str,
    ) -> RepositoryResult<()> {
        use crate::schema::appointments;

        let mut conn = self.conn()?;
        let updated = diesel::update(
            appointments::table
                .filter(appointments::id.eq(id.get()))
                .filter(appointments::hub_id.eq(hub_id.get())),
        )
        .set(appointments::calendar_event_id.eq(Some(event_id)))
        .execute(&mut conn)?;

        if updated == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
