//! Appointments booked by operators and the in-memory list filtering applied
//! to them before rendering.

use std::collections::HashMap;

use chrono::{Datelike, NaiveDate, NaiveDateTime, Weekday};
use serde::{Deserialize, Serialize};

use crate::domain::company::Company;
use crate::domain::operator::Operator;
use crate::domain::types::{
    AppointmentId, CompanyId, HubId, OperatorId, TypeConstraintError, non_empty_opt,
};

text_enum!(
    /// Lifecycle of an appointment.
    AppointmentStatus {
        Scheduled,
        Confirmed,
        Completed,
        Cancelled,
        NoShow,
    }
);

impl AppointmentStatus {
    /// Statuses reachable from `self` through the status update endpoint.
    pub fn next_statuses(self) -> &'static [AppointmentStatus] {
        use AppointmentStatus::*;
        match self {
            Scheduled => &[Confirmed, Cancelled],
            Confirmed => &[Completed, NoShow, Cancelled],
            Completed | Cancelled | NoShow => &[],
        }
    }

    pub fn can_transition_to(self, next: AppointmentStatus) -> bool {
        self.next_statuses().contains(&next)
    }

    pub fn is_terminal(self) -> bool {
        self.next_statuses().is_empty()
    }

    /// Label shown in the dashboard.
    pub fn label(self) -> &'static str {
        match self {
            AppointmentStatus::Scheduled => "予定",
            AppointmentStatus::Confirmed => "確定",
            AppointmentStatus::Completed => "完了",
            AppointmentStatus::Cancelled => "キャンセル",
            AppointmentStatus::NoShow => "不在",
        }
    }
}

pub const MIN_DURATION_MINUTES: i32 = 5;
pub const MAX_DURATION_MINUTES: i32 = 480;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Appointment {
    pub id: AppointmentId,
    pub hub_id: HubId,
    pub company_id: CompanyId,
    pub operator_id: OperatorId,
    pub scheduled_at: NaiveDateTime,
    pub duration_minutes: i32,
    pub status: AppointmentStatus,
    pub notes: Option<String>,
    pub calendar_event_id: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct NewAppointment {
    pub hub_id: HubId,
    pub company_id: CompanyId,
    pub operator_id: OperatorId,
    pub scheduled_at: NaiveDateTime,
    pub duration_minutes: i32,
    pub notes: Option<String>,
}

impl NewAppointment {
    pub fn try_new(
        hub_id: HubId,
        company_id: CompanyId,
        operator_id: OperatorId,
        scheduled_at: NaiveDateTime,
        duration_minutes: i32,
        notes: Option<String>,
    ) -> Result<Self, TypeConstraintError> {
        if !(MIN_DURATION_MINUTES..=MAX_DURATION_MINUTES).contains(&duration_minutes) {
            return Err(TypeConstraintError::InvalidValue(format!(
                "duration {duration_minutes} is outside {MIN_DURATION_MINUTES}..={MAX_DURATION_MINUTES} minutes"
            )));
        }
        Ok(Self {
            hub_id,
            company_id,
            operator_id,
            scheduled_at,
            duration_minutes,
            notes: non_empty_opt(notes).map(|n| ammonia::clean(&n)),
        })
    }
}

/// Appointment joined with the display names of its company and operator.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct AppointmentListing {
    pub appointment: Appointment,
    pub company_name: String,
    pub operator_name: String,
    pub next_statuses: Vec<AppointmentStatus>,
}

/// Joins appointments with the companies and operators loaded alongside them.
///
/// Rows whose company or operator is not among the loaded collections are
/// skipped.
pub fn build_listings(
    appointments: Vec<Appointment>,
    companies: &[Company],
    operators: &[Operator],
) -> Vec<AppointmentListing> {
    let companies: HashMap<CompanyId, &Company> = companies.iter().map(|c| (c.id, c)).collect();
    let operators: HashMap<OperatorId, &Operator> = operators.iter().map(|o| (o.id, o)).collect();

    appointments
        .into_iter()
        .filter_map(|appointment| {
            let company = companies.get(&appointment.company_id)?;
            let operator = operators.get(&appointment.operator_id)?;
            Some(AppointmentListing {
                company_name: company.name.to_string(),
                operator_name: operator.name.to_string(),
                next_statuses: appointment.status.next_statuses().to_vec(),
                appointment,
            })
        })
        .collect()
}

/// Predicates applied to the appointment list page.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AppointmentFilter {
    pub status: Option<AppointmentStatus>,
    pub operator_id: Option<OperatorId>,
    /// Case-insensitive fragment of the company name.
    pub search: Option<String>,
}

impl AppointmentFilter {
    pub fn matches(&self, listing: &AppointmentListing) -> bool {
        if let Some(status) = self.status
            && listing.appointment.status != status
        {
            return false;
        }
        if let Some(operator_id) = self.operator_id
            && listing.appointment.operator_id != operator_id
        {
            return false;
        }
        match &self.search {
            Some(term) => listing
                .company_name
                .to_lowercase()
                .contains(&term.to_lowercase()),
            None => true,
        }
    }

    pub fn apply(&self, listings: Vec<AppointmentListing>) -> Vec<AppointmentListing> {
        listings.into_iter().filter(|l| self.matches(l)).collect()
    }
}

/// Appointments falling on one calendar day.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct AppointmentDay {
    pub date: NaiveDate,
    pub label: String,
    pub items: Vec<AppointmentListing>,
}

fn weekday_label(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "月",
        Weekday::Tue => "火",
        Weekday::Wed => "水",
        Weekday::Thu => "木",
        Weekday::Fri => "金",
        Weekday::Sat => "土",
        Weekday::Sun => "日",
    }
}

/// Formats the heading used for a day group, e.g. `2025-06-02 (月)`.
pub fn day_label(date: NaiveDate) -> String {
    format!("{} ({})", date.format("%Y-%m-%d"), weekday_label(date.weekday()))
}

/// Groups listings by the date of `scheduled_at`; days ascend and rows within
/// a day ascend by time.
pub fn group_by_date(mut listings: Vec<AppointmentListing>) -> Vec<AppointmentDay> {
    listings.sort_by_key(|l| (l.appointment.scheduled_at, l.appointment.id));

    let mut days: Vec<AppointmentDay> = Vec::new();
    for listing in listings {
        let date = listing.appointment.scheduled_at.date();
        match days.last_mut() {
            Some(day) if day.date == date => day.items.push(listing),
            _ => days.push(AppointmentDay {
                date,
                label: day_label(date),
                items: vec![listing],
            }),
        }
    }
    days
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::{CompanyName, EmailAddress, OperatorName};

    fn at(date: &str, time: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(&format!("{date} {time}"), "%Y-%m-%d %H:%M")
            .expect("valid datetime")
    }

    fn company(id: i32, name: &str) -> Company {
        Company {
            id: CompanyId::new(id).expect("valid id"),
            hub_id: HubId::new(1).expect("valid hub"),
            name: CompanyName::new(name).expect("valid name"),
            email: None,
            phone: None,
            address: None,
            industry: None,
            website: None,
            created_at: at("2025-01-01", "00:00"),
            updated_at: at("2025-01-01", "00:00"),
        }
    }

    fn operator(id: i32, name: &str) -> Operator {
        Operator {
            id: OperatorId::new(id).expect("valid id"),
            hub_id: HubId::new(1).expect("valid hub"),
            name: OperatorName::new(name).expect("valid name"),
            email: EmailAddress::new(format!("op{id}@example.com")).expect("valid email"),
            phone: None,
            is_active: true,
        }
    }

    fn appointment(
        id: i32,
        company_id: i32,
        operator_id: i32,
        when: NaiveDateTime,
        status: AppointmentStatus,
    ) -> Appointment {
        Appointment {
            id: AppointmentId::new(id).expect("valid id"),
            hub_id: HubId::new(1).expect("valid hub"),
            company_id: CompanyId::new(company_id).expect("valid id"),
            operator_id: OperatorId::new(operator_id).expect("valid id"),
            scheduled_at: when,
            duration_minutes: 30,
            status,
            notes: None,
            calendar_event_id: None,
            created_at: when,
            updated_at: when,
        }
    }

    fn sample() -> Vec<AppointmentListing> {
        let companies = vec![company(1, "Acme Trading"), company(2, "Blue Ocean")];
        let operators = vec![operator(1, "Sato"), operator(2, "Suzuki")];
        let appointments = vec![
            appointment(1, 1, 1, at("2025-06-03", "14:00"), AppointmentStatus::Scheduled),
            appointment(2, 2, 2, at("2025-06-02", "10:00"), AppointmentStatus::Confirmed),
            appointment(3, 2, 1, at("2025-06-03", "09:30"), AppointmentStatus::Cancelled),
            appointment(4, 99, 1, at("2025-06-03", "09:30"), AppointmentStatus::Scheduled),
        ];
        build_listings(appointments, &companies, &operators)
    }

    #[test]
    fn transitions_follow_the_lifecycle() {
        use AppointmentStatus::*;
        assert!(Scheduled.can_transition_to(Confirmed));
        assert!(Scheduled.can_transition_to(Cancelled));
        assert!(!Scheduled.can_transition_to(Completed));
        assert!(Confirmed.can_transition_to(NoShow));
        assert!(!Completed.can_transition_to(Scheduled));
        assert!(Cancelled.is_terminal());
        assert!(!Confirmed.is_terminal());
    }

    #[test]
    fn listings_skip_rows_with_unknown_company() {
        let listings = sample();
        assert_eq!(listings.len(), 3);
        assert!(listings.iter().all(|l| l.appointment.id.get() != 4));
        assert_eq!(listings[0].company_name, "Acme Trading");
        assert_eq!(
            listings[0].next_statuses,
            vec![AppointmentStatus::Confirmed, AppointmentStatus::Cancelled]
        );
    }

    #[test]
    fn filter_combines_all_predicates() {
        let filter = AppointmentFilter {
            status: None,
            operator_id: Some(OperatorId::new(1).expect("valid id")),
            search: Some("blue".to_string()),
        };
        let result = filter.apply(sample());
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].appointment.id.get(), 3);

        let by_status = AppointmentFilter {
            status: Some(AppointmentStatus::Scheduled),
            ..AppointmentFilter::default()
        };
        assert_eq!(by_status.apply(sample()).len(), 1);
        assert_eq!(AppointmentFilter::default().apply(sample()).len(), 3);
    }

    #[test]
    fn groups_by_day_in_chronological_order() {
        let days = group_by_date(sample());
        assert_eq!(days.len(), 2);
        assert_eq!(days[0].label, "2025-06-02 (月)");
        assert_eq!(days[1].label, "2025-06-03 (火)");
        let ids: Vec<i32> = days[1].items.iter().map(|l| l.appointment.id.get()).collect();
        assert_eq!(ids, vec![3, 1]);
    }

    #[test]
    fn duration_is_bounded() {
        let hub = HubId::new(1).expect("valid hub");
        let company = CompanyId::new(1).expect("valid id");
        let operator = OperatorId::new(1).expect("valid id");
        let when = at("2025-06-02", "10:00");
        assert!(NewAppointment::try_new(hub, company, operator, when, 4, None).is_err());
        assert!(NewAppointment::try_new(hub, company, operator, when, 481, None).is_err());
        let ok = NewAppointment::try_new(hub, company, operator, when, 60, Some("  ".into()))
            .expect("valid appointment");
        assert_eq!(ok.notes, None);
    }
}
