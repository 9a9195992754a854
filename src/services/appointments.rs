//! Appointment booking, listing and status changes.

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime, Utc};

use crate::auth::{AuthenticatedUser, ensure_role};
use crate::domain::appointment::{
    Appointment, AppointmentFilter, AppointmentListing, AppointmentStatus, build_listings,
    group_by_date,
};
use crate::domain::types::{AppointmentId, HubId, OperatorId};
use crate::dto::appointments::{AppointmentsPageData, AppointmentsQuery, CalendarSync};
use crate::forms::appointments::{
    AppointmentStatusForm, AppointmentStatusPayload, CreateAppointmentForm,
    CreateAppointmentPayload,
};
use crate::forms::{parse_choice, parse_date, parse_optional_id};
use crate::integrations::{CalendarClient, CalendarEvent, IntegrationError};
use crate::repository::{
    AppointmentListQuery, AppointmentReader, AppointmentWriter, CompanyListQuery, CompanyReader,
    OperatorReader, OperatorWriter,
};
use crate::services::companies::require_company;
use crate::services::operators::{acting_operator, visible_operator};
use crate::services::{ServiceError, ServiceResult};
use crate::{SERVICE_ACCESS_ROLE, SERVICE_DIRECTOR_ROLE};

pub const DEFAULT_WINDOW_DAYS: i64 = 30;
const MAX_WINDOW_DAYS: i64 = 366;

/// Loads appointments of the requested window grouped by day.
///
/// Operators only see their own appointments; the remaining filters are
/// applied in memory.
pub fn list_appointments<R>(
    repo: &R,
    user: &AuthenticatedUser,
    query: AppointmentsQuery,
) -> ServiceResult<AppointmentsPageData>
where
    R: AppointmentReader + CompanyReader + OperatorReader + OperatorWriter + ?Sized,
{
    ensure_role(user, SERVICE_ACCESS_ROLE)?;

    let hub_id = HubId::new(user.hub_id)?;

    let from = match query.from.as_deref().map(str::trim) {
        Some(value) if !value.is_empty() => parse_date(value)?,
        _ => Utc::now().date_naive(),
    };
    let days = query
        .days
        .unwrap_or(DEFAULT_WINDOW_DAYS)
        .clamp(1, MAX_WINDOW_DAYS);
    let to = from + Duration::days(days);

    let filter = AppointmentFilter {
        status: match query.status.as_deref().map(str::trim) {
            Some(value) if !value.is_empty() => Some(parse_choice::<AppointmentStatus>(value)?),
            _ => None,
        },
        operator_id: parse_optional_id(query.operator_id.as_deref())?
            .map(OperatorId::new)
            .transpose()?,
        search: query
            .search
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty()),
    };

    let mut list_query =
        AppointmentListQuery::new(hub_id).window(start_of(from), start_of(to));
    if let Some(operator_id) = visible_operator(repo, user)? {
        list_query = list_query.operator(operator_id);
    }

    let appointments = repo.list_appointments(list_query).map_err(|err| {
        log::error!("Failed to list appointments: {err}");
        err
    })?;
    let (_, companies) = repo.list_companies(CompanyListQuery::new(hub_id))?;
    let operators = repo.list_operators(hub_id)?;

    let listings = filter.apply(build_listings(appointments, &companies, &operators));
    let total = listings.len();

    Ok(AppointmentsPageData {
        days: group_by_date(listings),
        total,
        from,
        to,
        companies,
        operators,
        can_pick_operator: user.has_role(SERVICE_DIRECTOR_ROLE),
    })
}

fn start_of(date: NaiveDate) -> NaiveDateTime {
    date.and_time(NaiveTime::MIN)
}

/// Books an appointment and mirrors it to the shared calendar.
///
/// A calendar failure never rolls back the booking; it is reported through
/// the returned [`CalendarSync`].
pub async fn create_appointment<R, C>(
    repo: &R,
    calendar: &C,
    user: &AuthenticatedUser,
    form: CreateAppointmentForm,
) -> ServiceResult<(Appointment, CalendarSync)>
where
    R: AppointmentWriter + CompanyReader + OperatorReader + OperatorWriter + ?Sized,
    C: CalendarClient + ?Sized,
{
    ensure_role(user, SERVICE_ACCESS_ROLE)?;

    let payload = CreateAppointmentPayload::try_from(form)?;

    let hub_id = HubId::new(user.hub_id)?;

    let company = require_company(repo, hub_id, payload.company_id)?;
    let operator = acting_operator(repo, user, payload.operator_id)?;

    let new_appointment = payload.into_domain(hub_id, operator.id)?;
    let appointment = repo.create_appointment(&new_appointment).map_err(|err| {
        log::error!("Failed to create appointment: {err}");
        err
    })?;

    let event = CalendarEvent {
        title: format!("{} 商談", company.name),
        description: appointment.notes.clone(),
        start: appointment.scheduled_at,
        end: appointment.scheduled_at + Duration::minutes(i64::from(appointment.duration_minutes)),
        attendee: operator.email.to_string(),
    };

    let sync = match calendar.create_event(&event).await {
        Ok(event_id) => match repo.set_calendar_event_id(appointment.id, hub_id, &event_id) {
            Ok(()) => CalendarSync::Synced,
            Err(err) => {
                log::warn!(
                    "Failed to store calendar event for appointment {}: {err}",
                    appointment.id
                );
                CalendarSync::Failed
            }
        },
        Err(IntegrationError::Disabled(_)) => CalendarSync::Skipped,
        Err(err) => {
            log::warn!(
                "Calendar rejected appointment {}: {err}",
                appointment.id
            );
            CalendarSync::Failed
        }
    };

    Ok((appointment, sync))
}

/// Moves an appointment to the requested status.
///
/// Operators may only update their own appointments.
pub fn update_appointment_status<R>(
    repo: &R,
    user: &AuthenticatedUser,
    appointment_id: i32,
    form: AppointmentStatusForm,
) -> ServiceResult<Appointment>
where
    R: AppointmentReader + AppointmentWriter + OperatorReader + OperatorWriter + ?Sized,
{
    ensure_role(user, SERVICE_ACCESS_ROLE)?;

    let payload = AppointmentStatusPayload::try_from(form)?;

    let hub_id = HubId::new(user.hub_id)?;
    let appointment_id = AppointmentId::new(appointment_id)?;

    let appointment = repo
        .get_appointment_by_id(appointment_id, hub_id)?
        .ok_or(ServiceError::NotFound)?;

    if let Some(operator_id) = visible_operator(repo, user)?
        && appointment.operator_id != operator_id
    {
        return Err(ServiceError::NotFound);
    }

    if !appointment.status.can_transition_to(payload.status) {
        return Err(ServiceError::Form(format!(
            "「{}」から「{}」へは変更できません",
            appointment.status.label(),
            payload.status.label()
        )));
    }

    let updated = repo.update_appointment_status(appointment.id, hub_id, payload.status)?;
    log::info!(
        "Appointment {} moved from {} to {} by {}",
        updated.id,
        appointment.status,
        updated.status,
        user.email
    );
    Ok(updated)
}

/// Appointments of one day for the JSON API.
pub fn appointments_on<R>(
    repo: &R,
    user: &AuthenticatedUser,
    date: NaiveDate,
) -> ServiceResult<Vec<AppointmentListing>>
where
    R: AppointmentReader + CompanyReader + OperatorReader + OperatorWriter + ?Sized,
{
    ensure_role(user, SERVICE_ACCESS_ROLE)?;

    let hub_id = HubId::new(user.hub_id)?;
    let mut query =
        AppointmentListQuery::new(hub_id).window(start_of(date), start_of(date + Duration::days(1)));
    if let Some(operator_id) = visible_operator(repo, user)? {
        query = query.operator(operator_id);
    }

    let appointments = repo.list_appointments(query)?;
    let (_, companies) = repo.list_companies(CompanyListQuery::new(hub_id))?;
    let operators = repo.list_operators(hub_id)?;

    let mut listings = build_listings(appointments, &companies, &operators);
    listings.sort_by_key(|l| (l.appointment.scheduled_at, l.appointment.id));
    Ok(listings)
}
