//! Daily call schedule: optimizer runs and the operator grid.

use chrono::{NaiveDate, Utc};

use crate::auth::{AuthenticatedUser, ensure_role};
use crate::domain::compliance::AuditAction;
use crate::domain::schedule::{build_grid, grid_times, optimize};
use crate::domain::types::{HubId, OperatorId};
use crate::dto::schedule::{OptimizeSummary, SchedulePageData, ScheduleQuery};
use crate::forms::parse_date;
use crate::forms::schedule::{OptimizeSchedulePayload, ScheduleDateForm};
use crate::repository::{
    CompanyListQuery, CompanyReader, ComplianceWriter, OperatorReader, ScheduleReader,
    ScheduleWriter,
};
use crate::services::compliance::record_audit;
use crate::services::{ServiceError, ServiceResult};
use crate::{SERVICE_ACCESS_ROLE, SERVICE_DIRECTOR_ROLE};

/// Loads the grid of the requested day, today when none is given.
pub fn load_schedule<R>(
    repo: &R,
    user: &AuthenticatedUser,
    query: ScheduleQuery,
) -> ServiceResult<SchedulePageData>
where
    R: ScheduleReader + OperatorReader + CompanyReader + ?Sized,
{
    ensure_role(user, SERVICE_ACCESS_ROLE)?;

    let hub_id = HubId::new(user.hub_id)?;
    let date = match query.date.as_deref().map(str::trim) {
        Some(value) if !value.is_empty() => parse_date(value)?,
        _ => Utc::now().date_naive(),
    };

    let operators: Vec<_> = repo
        .list_operators(hub_id)?
        .into_iter()
        .filter(|o| o.is_active)
        .collect();
    let slots = repo.list_slots(hub_id, date)?;
    let (_, companies) = repo.list_companies(CompanyListQuery::new(hub_id))?;

    Ok(SchedulePageData {
        date,
        times: grid_times(),
        rows: build_grid(&operators, &slots, &companies),
        companies,
        operators,
    })
}

/// Replaces the day's slots with a fresh round-robin assignment.
///
/// `body` is the raw urlencoded form so repeated multi-select keys survive.
pub fn optimize_schedule<R>(
    repo: &R,
    user: &AuthenticatedUser,
    body: &[u8],
) -> ServiceResult<OptimizeSummary>
where
    R: ScheduleWriter + OperatorReader + CompanyReader + ComplianceWriter + ?Sized,
{
    ensure_role(user, SERVICE_DIRECTOR_ROLE)?;

    let payload = OptimizeSchedulePayload::try_from(body)?;

    let hub_id = HubId::new(user.hub_id)?;

    for company_id in &payload.company_ids {
        if repo.get_company_by_id(*company_id, hub_id)?.is_none() {
            return Err(ServiceError::Form("企業が見つかりません".to_string()));
        }
    }

    let active: Vec<OperatorId> = repo
        .list_operators(hub_id)?
        .into_iter()
        .filter(|o| o.is_active)
        .map(|o| o.id)
        .collect();

    let operators: Vec<OperatorId> = if payload.operator_ids.is_empty() {
        active
    } else {
        if let Some(unknown) = payload.operator_ids.iter().find(|id| !active.contains(id)) {
            log::warn!("Optimizer request names inactive or unknown operator {unknown}");
            return Err(ServiceError::Form(
                "有効なオペレーターを選択してください".to_string(),
            ));
        }
        payload.operator_ids
    };

    if operators.is_empty() {
        return Err(ServiceError::Form(
            "有効なオペレーターがいません".to_string(),
        ));
    }

    let plan = optimize(hub_id, payload.date, &operators, &payload.company_ids);

    let assigned = repo
        .replace_slots(hub_id, payload.date, &plan.slots)
        .map_err(|err| {
            log::error!("Failed to store schedule for {}: {err}", payload.date);
            err
        })?;

    record_audit(
        repo,
        user,
        AuditAction::Update,
        "schedule",
        None,
        Some(format!(
            "{}: {assigned} assigned, {} unassigned",
            payload.date,
            plan.unassigned.len()
        )),
    );

    Ok(OptimizeSummary {
        date: payload.date,
        assigned,
        unassigned: plan.unassigned,
    })
}

/// Removes every slot of the day.
pub fn clear_schedule<R>(
    repo: &R,
    user: &AuthenticatedUser,
    form: ScheduleDateForm,
) -> ServiceResult<(NaiveDate, usize)>
where
    R: ScheduleWriter + ComplianceWriter + ?Sized,
{
    ensure_role(user, SERVICE_DIRECTOR_ROLE)?;

    let date = NaiveDate::try_from(form)?;

    let hub_id = HubId::new(user.hub_id)?;

    let removed = repo.clear_slots(hub_id, date)?;

    record_audit(
        repo,
        user,
        AuditAction::Delete,
        "schedule",
        None,
        Some(format!("{date}: {removed} removed")),
    );

    Ok((date, removed))
}
