//! Rejection insight capture and analytics.

use crate::auth::{AuthenticatedUser, ensure_role};
use crate::domain::rejection::{RejectionInsight, analyze, incubation_candidates};
use crate::domain::types::HubId;
use crate::dto::rejections::{IncubationPageData, RejectionAnalyticsData};
use crate::forms::rejections::{RejectionForm, RejectionPayload};
use crate::repository::{
    CallReader, CompanyListQuery, CompanyReader, RejectionReader, RejectionWriter,
};
use crate::services::companies::require_company;
use crate::services::{ServiceError, ServiceResult};
use crate::{SERVICE_ACCESS_ROLE, SERVICE_DIRECTOR_ROLE};

pub fn record_rejection<R>(
    repo: &R,
    user: &AuthenticatedUser,
    form: RejectionForm,
) -> ServiceResult<RejectionInsight>
where
    R: RejectionWriter + CompanyReader + CallReader + ?Sized,
{
    ensure_role(user, SERVICE_ACCESS_ROLE)?;

    let payload = RejectionPayload::try_from(form)?;

    let hub_id = HubId::new(user.hub_id)?;

    require_company(repo, hub_id, payload.company_id)?;

    if let Some(call_id) = payload.call_id {
        match repo.get_call_by_id(call_id, hub_id)? {
            Some(call) if call.company_id == payload.company_id => {}
            _ => {
                return Err(ServiceError::Form(
                    "この企業の通話ではありません".to_string(),
                ));
            }
        }
    }

    let insight = repo
        .create_insight(&payload.into_domain(hub_id))
        .map_err(|err| {
            log::error!("Failed to record rejection insight: {err}");
            err
        })?;

    log::info!(
        "Rejection for company {} recorded as {}",
        insight.company_id,
        insight.bucket()
    );

    Ok(insight)
}

/// Buckets every insight of the hub and ranks the categories.
pub fn rejection_analytics<R>(
    repo: &R,
    user: &AuthenticatedUser,
) -> ServiceResult<RejectionAnalyticsData>
where
    R: RejectionReader + CompanyReader + ?Sized,
{
    ensure_role(user, SERVICE_DIRECTOR_ROLE)?;

    let hub_id = HubId::new(user.hub_id)?;

    let insights = repo.list_insights(hub_id, None)?;
    let (_, companies) = repo.list_companies(CompanyListQuery::new(hub_id))?;

    Ok(RejectionAnalyticsData {
        stats: analyze(&insights),
        total: insights.len(),
        companies,
    })
}

/// Companies worth re-approaching because they only declined on timing.
pub fn incubation<R>(repo: &R, user: &AuthenticatedUser) -> ServiceResult<IncubationPageData>
where
    R: RejectionReader + CompanyReader + ?Sized,
{
    ensure_role(user, SERVICE_DIRECTOR_ROLE)?;

    let hub_id = HubId::new(user.hub_id)?;

    let insights = repo.list_insights(hub_id, None)?;
    let (_, companies) = repo.list_companies(CompanyListQuery::new(hub_id))?;

    Ok(IncubationPageData {
        candidates: incubation_candidates(&insights, &companies),
    })
}
