use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::appointment::{
    Appointment as DomainAppointment, AppointmentStatus, NewAppointment as DomainNewAppointment,
};
use crate::domain::types::{AppointmentId, CompanyId, HubId, OperatorId, TypeConstraintError};

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::appointments)]
/// Diesel model for [`crate::domain::appointment::Appointment`].
pub struct Appointment {
    pub id: i32,
    pub hub_id: i32,
    pub company_id: i32,
    pub operator_id: i32,
    pub scheduled_at: NaiveDateTime,
    pub duration_minutes: i32,
    pub status: String,
    pub notes: Option<String>,
    pub calendar_event_id: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::appointments)]
/// Insertable form of [`Appointment`].
pub struct NewAppointment<'a> {
    pub hub_id: i32,
    pub company_id: i32,
    pub operator_id: i32,
    pub scheduled_at: NaiveDateTime,
    pub duration_minutes: i32,
    pub status: &'a str,
    pub notes: Option<&'a str>,
}

impl TryFrom<Appointment> for DomainAppointment {
    type Error = TypeConstraintError;

    fn try_from(appointment: Appointment) -> Result<Self, Self::Error> {
        Ok(Self {
            id: AppointmentId::try_from(appointment.id)?,
            hub_id: HubId::try_from(appointment.hub_id)?,
            company_id: CompanyId::try_from(appointment.company_id)?,
            operator_id: OperatorId::try_from(appointment.operator_id)?,
            scheduled_at: appointment.scheduled_at,
            duration_minutes: appointment.duration_minutes,
            status: appointment.status.parse()?,
            notes: appointment.notes,
            calendar_event_id: appointment.calendar_event_id,
            created_at: appointment.created_at,
            updated_at: appointment.updated_at,
        })
    }
}

impl<'a> From<&'a DomainNewAppointment> for NewAppointment<'a> {
    fn from(appointment: &'a DomainNewAppointment) -> Self {
        Self {
            hub_id: appointment.hub_id.get(),
            company_id: appointment.company_id.get(),
            operator_id: appointment.operator_id.get(),
            scheduled_at: appointment.scheduled_at,
            duration_minutes: appointment.duration_minutes,
            status: AppointmentStatus::Scheduled.as_str(),
            notes: appointment.notes.as_deref(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn row(status: &str) -> Appointment {
        let now = Utc::now().naive_utc();
        Appointment {
            id: 1,
            hub_id: 1,
            company_id: 2,
            operator_id: 3,
            scheduled_at: now,
            duration_minutes: 30,
            status: status.to_string(),
            notes: None,
            calendar_event_id: Some("evt_1".into()),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn status_text_is_parsed() {
        let domain = DomainAppointment::try_from(row("Confirmed")).expect("valid row");
        assert_eq!(domain.status, AppointmentStatus::Confirmed);
        assert_eq!(domain.calendar_event_id.as_deref(), Some("evt_1"));
        assert!(DomainAppointment::try_from(row("Lost")).is_err());
    }

    #[test]
    fn new_rows_start_scheduled() {
        let domain = DomainNewAppointment::try_new(
            HubId::new(1).expect("valid hub"),
            CompanyId::new(2).expect("valid id"),
            OperatorId::new(3).expect("valid id"),
            Utc::now().naive_utc(),
            45,
            Some("bring brochure".into()),
        )
        .expect("valid appointment");
        let new: NewAppointment = (&domain).into();
        assert_eq!(new.status, "Scheduled");
        assert_eq!(new.notes, Some("bring brochure"));
    }
}
