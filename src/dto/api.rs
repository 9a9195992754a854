//! DTOs exposed by the JSON API endpoints.

use serde::{Deserialize, Serialize};

use crate::domain::appointment::AppointmentListing;
use crate::domain::company::Company;

/// Query parameters accepted by `/api/v1/companies`.
#[derive(Debug, Default, Deserialize)]
pub struct CompaniesQuery {
    /// Optional free-form search string applied to the company list.
    pub search: Option<String>,
    /// Optional page number for pagination.
    pub page: Option<usize>,
}

/// Result payload returned by [`crate::services::api::list_companies`].
#[derive(Debug, Serialize)]
pub struct CompaniesResponse {
    /// Total number of companies matching the filter.
    pub total: usize,
    pub companies: Vec<Company>,
}

#[derive(Debug, Default, Deserialize)]
pub struct AppointmentsQuery {
    /// Day to list, `YYYY-MM-DD`; today when absent.
    pub date: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AppointmentsResponse {
    pub date: String,
    pub appointments: Vec<AppointmentListing>,
}

/// Counters polled by the dashboard.
#[derive(Debug, Default, Serialize, PartialEq)]
pub struct DashboardCounters {
    /// Today's appointments keyed by status name.
    pub appointments_today: Vec<(String, usize)>,
    pub open_crawl_jobs: usize,
    pub flagged_fraud_scores: usize,
}
