//! Forms for booking appointments and moving them through their lifecycle.

use chrono::NaiveDateTime;
use serde::Deserialize;

use crate::{
    domain::{
        appointment::{AppointmentStatus, NewAppointment},
        types::{CompanyId, HubId, OperatorId},
    },
    forms::{FormError, parse_choice, parse_datetime, parse_optional_id},
};

fn default_duration() -> i32 {
    30
}

#[derive(Debug, Deserialize)]
pub struct CreateAppointmentForm {
    pub company_id: i32,
    /// Ignored for operators, who always book for themselves.
    #[serde(default)]
    pub operator_id: Option<String>,
    pub scheduled_at: String,
    #[serde(default = "default_duration")]
    pub duration_minutes: i32,
    #[serde(default)]
    pub notes: Option<String>,
}

pub struct CreateAppointmentPayload {
    pub company_id: CompanyId,
    pub operator_id: Option<OperatorId>,
    pub scheduled_at: NaiveDateTime,
    pub duration_minutes: i32,
    pub notes: Option<String>,
}

impl TryFrom<CreateAppointmentForm> for CreateAppointmentPayload {
    type Error = FormError;

    fn try_from(form: CreateAppointmentForm) -> Result<Self, Self::Error> {
        Ok(Self {
            company_id: CompanyId::new(form.company_id)?,
            operator_id: parse_optional_id(form.operator_id.as_deref())?
                .map(OperatorId::new)
                .transpose()?,
            scheduled_at: parse_datetime(&form.scheduled_at)?,
            duration_minutes: form.duration_minutes,
            notes: form.notes,
        })
    }
}

impl CreateAppointmentPayload {
    pub fn into_domain(
        self,
        hub_id: HubId,
        operator_id: OperatorId,
    ) -> Result<NewAppointment, FormError> {
        NewAppointment::try_new(
            hub_id,
            self.company_id,
            operator_id,
            self.scheduled_at,
            self.duration_minutes,
            self.notes,
        )
        .map_err(|_| FormError::InvalidValue("所要時間は5〜480分で入力してください".to_string()))
    }
}

#[derive(Debug, Deserialize)]
pub struct AppointmentStatusForm {
    pub status: String,
}

pub struct AppointmentStatusPayload {
    pub status: AppointmentStatus,
}

impl TryFrom<AppointmentStatusForm> for AppointmentStatusPayload {
    type Error = FormError;

    fn try_from(form: AppointmentStatusForm) -> Result<Self, Self::Error> {
        Ok(Self {
            status: parse_choice(&form.status)?,
        })
    }
}
