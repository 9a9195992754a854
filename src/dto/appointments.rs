//! DTOs for the appointment list.

use chrono::NaiveDate;
use serde::Deserialize;

use crate::domain::appointment::AppointmentDay;
use crate::domain::company::Company;
use crate::domain::operator::Operator;

/// Filters accepted by the appointments page. Empty strings mean "any".
#[derive(Debug, Default, Deserialize)]
pub struct AppointmentsQuery {
    pub status: Option<String>,
    pub operator_id: Option<String>,
    pub search: Option<String>,
    /// First day of the window, `YYYY-MM-DD`. Defaults to today.
    pub from: Option<String>,
    /// Window length in days.
    pub days: Option<i64>,
}

pub struct AppointmentsPageData {
    pub days: Vec<AppointmentDay>,
    pub total: usize,
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub companies: Vec<Company>,
    pub operators: Vec<Operator>,
    /// Whether the operator select is shown (directors only).
    pub can_pick_operator: bool,
}

/// Outcome of booking an appointment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalendarSync {
    Synced,
    /// Calendar integration is not configured.
    Skipped,
    /// The appointment was saved but the calendar rejected the event.
    Failed,
}
