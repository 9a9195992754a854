//! Services backing the `/api/v1` JSON endpoints.

use chrono::{NaiveDate, Utc};

use crate::SERVICE_ACCESS_ROLE;
use crate::auth::{AuthenticatedUser, ensure_role};
use crate::domain::appointment::AppointmentStatus;
use crate::domain::intelligence::CrawlStatus;
use crate::domain::types::{HubId, Score};
use crate::dto::api::{
    AppointmentsQuery, AppointmentsResponse, CompaniesQuery, CompaniesResponse, DashboardCounters,
};
use crate::pagination::DEFAULT_ITEMS_PER_PAGE;
use crate::repository::{
    AppointmentReader, CompanyListQuery, CompanyReader, FraudReader, IntelligenceReader,
    OperatorReader, OperatorWriter,
};
use crate::services::appointments::appointments_on;
use crate::services::{ServiceError, ServiceResult};

/// Returns the filtered list of companies of the user's hub.
pub fn list_companies<R>(
    repo: &R,
    user: &AuthenticatedUser,
    params: CompaniesQuery,
) -> ServiceResult<CompaniesResponse>
where
    R: CompanyReader + ?Sized,
{
    ensure_role(user, SERVICE_ACCESS_ROLE)?;

    let mut query = CompanyListQuery::new(HubId::new(user.hub_id)?);

    if let Some(page) = params.page {
        query = query.paginate(page, DEFAULT_ITEMS_PER_PAGE);
    }

    if let Some(term) = params
        .search
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
    {
        query = query.search(term);
    }

    let (total, companies) = repo.list_companies(query)?;

    Ok(CompaniesResponse { total, companies })
}

/// Appointments of the requested day, today when no date is given.
pub fn list_appointments<R>(
    repo: &R,
    user: &AuthenticatedUser,
    params: AppointmentsQuery,
) -> ServiceResult<AppointmentsResponse>
where
    R: AppointmentReader + CompanyReader + OperatorReader + OperatorWriter + ?Sized,
{
    let date = match params.date.as_deref().map(str::trim) {
        Some(raw) if !raw.is_empty() => NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .map_err(|_| ServiceError::Form(format!("invalid date: {raw}")))?,
        _ => Utc::now().date_naive(),
    };

    let appointments = appointments_on(repo, user, date)?;

    Ok(AppointmentsResponse {
        date: date.format("%Y-%m-%d").to_string(),
        appointments,
    })
}

/// Counters for the dashboard header: today's appointments per status,
/// pending crawl jobs and fraud scores at or above `threshold`.
pub fn dashboard_counters<R>(
    repo: &R,
    user: &AuthenticatedUser,
    threshold: i32,
    today: NaiveDate,
) -> ServiceResult<DashboardCounters>
where
    R: AppointmentReader
        + CompanyReader
        + OperatorReader
        + OperatorWriter
        + IntelligenceReader
        + FraudReader
        + ?Sized,
{
    let appointments = appointments_on(repo, user, today)?;

    let hub_id = HubId::new(user.hub_id)?;
    let threshold = Score::new(threshold).map_err(|err| ServiceError::Internal(err.to_string()))?;

    let appointments_today = AppointmentStatus::ALL
        .iter()
        .map(|status| {
            let count = appointments
                .iter()
                .filter(|l| l.appointment.status == *status)
                .count();
            (status.to_string(), count)
        })
        .collect();

    let open_crawl_jobs = repo
        .list_crawl_jobs(hub_id)?
        .iter()
        .filter(|job| job.status == CrawlStatus::Pending)
        .count();

    let flagged_fraud_scores = repo
        .list_fraud_scores(hub_id)?
        .iter()
        .filter(|score| score.score >= threshold)
        .count();

    Ok(DashboardCounters {
        appointments_today,
        open_crawl_jobs,
        flagged_fraud_scores,
    })
}

#[cfg(all(test, feature = "test-mocks"))]
mod tests {
    use super::*;
    use crate::repository::mock::MockRepository;
    use crate::services::test_support::{
        operator_user, sample_appointment, sample_company, sample_operator, viewer,
    };

    #[test]
    fn companies_require_access_role() {
        let repo = MockRepository::new();
        let mut user = viewer();
        user.roles.clear();
        assert!(matches!(
            list_companies(&repo, &user, CompaniesQuery::default()),
            Err(ServiceError::Unauthorized)
        ));
    }

    #[test]
    fn companies_are_searched_and_paginated() {
        let mut repo = MockRepository::new();
        repo.expect_list_companies()
            .withf(|query| {
                query.search.as_deref() == Some("acme") && query.pagination.is_some()
            })
            .times(1)
            .returning(|_| Ok((1, vec![sample_company(1, "Acme")])));

        let response = list_companies(
            &repo,
            &viewer(),
            CompaniesQuery {
                search: Some("  acme ".to_string()),
                page: Some(1),
            },
        )
        .expect("companies");
        assert_eq!(response.total, 1);
        assert_eq!(response.companies[0].name.as_str(), "Acme");
    }

    #[test]
    fn bad_date_is_a_form_error() {
        let repo = MockRepository::new();
        let params = AppointmentsQuery {
            date: Some("06/02/2025".to_string()),
        };
        assert!(matches!(
            list_appointments(&repo, &viewer(), params),
            Err(ServiceError::Form(_))
        ));
    }

    #[test]
    fn counters_group_today_by_status() {
        let mut repo = MockRepository::new();
        repo.expect_get_operator_by_email()
            .returning(|_, _| Ok(Some(sample_operator(7, "op@example.com"))));
        repo.expect_list_appointments().returning(|_| {
            Ok(vec![
                sample_appointment(1, 7, AppointmentStatus::Scheduled),
                sample_appointment(2, 7, AppointmentStatus::Scheduled),
                sample_appointment(3, 7, AppointmentStatus::Completed),
            ])
        });
        repo.expect_list_companies()
            .returning(|_| Ok((1, vec![sample_company(1, "Acme")])));
        repo.expect_list_operators()
            .returning(|_| Ok(vec![sample_operator(7, "op@example.com")]));
        repo.expect_list_crawl_jobs().returning(|_| Ok(Vec::new()));
        repo.expect_list_fraud_scores().returning(|_| Ok(Vec::new()));

        let today = NaiveDate::from_ymd_opt(2025, 6, 2).expect("valid date");
        let counters = dashboard_counters(&repo, &operator_user(), 70, today).expect("counters");
        assert_eq!(counters.appointments_today.len(), AppointmentStatus::ALL.len());
        assert_eq!(counters.appointments_today[0], ("Scheduled".to_string(), 2));
        assert_eq!(counters.open_crawl_jobs, 0);
    }
}
