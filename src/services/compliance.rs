//! Subsidy reporting, compliance documents and the audit trail.

use chrono::Utc;

use crate::SERVICE_DIRECTOR_ROLE;
use crate::auth::{AuthenticatedUser, ensure_role};
use crate::domain::compliance::{
    AuditAction, AuditLog, ComplianceDocument, NewAuditLog, SubsidyReport, SubsidyStatus,
    build_document_listings, build_subsidy_listings, subsidy_totals,
};
use crate::domain::types::{ComplianceDocumentId, HubId, SubsidyReportId};
use crate::dto::compliance::{
    AuditLogsPageData, AuditLogsQuery, DocumentsPageData, SubsidyPageData,
};
use crate::forms::compliance::{
    ComplianceDocumentForm, ComplianceDocumentPayload, SubsidyReportForm, SubsidyReportPayload,
    SubsidyStatusForm,
};
use crate::pagination::{DEFAULT_ITEMS_PER_PAGE, Paginated};
use crate::repository::{
    AuditLogListQuery, CompanyListQuery, CompanyReader, ComplianceReader, ComplianceWriter,
};
use crate::services::{ServiceError, ServiceResult};

/// Appends an audit entry attributed to `user`.
///
/// Runs after the audited change has been stored, so a failed insert is
/// logged and reported as `None` instead of failing the request.
pub fn record_audit<R>(
    repo: &R,
    user: &AuthenticatedUser,
    action: AuditAction,
    entity: &str,
    entity_id: Option<i32>,
    details: Option<String>,
) -> Option<AuditLog>
where
    R: ComplianceWriter + ?Sized,
{
    let hub_id = match HubId::new(user.hub_id) {
        Ok(hub_id) => hub_id,
        Err(err) => {
            log::error!("Cannot audit {entity} {action} by {}: {err}", user.email);
            return None;
        }
    };
    let log = NewAuditLog::new(hub_id, user.email.as_str(), action, entity, entity_id, details);
    repo.create_audit_log(&log)
        .inspect_err(|err| {
            log::error!(
                "Failed to write audit log for {entity} {action} by {}: {err}",
                user.email
            );
        })
        .ok()
}

pub fn list_subsidy_reports<R>(repo: &R, user: &AuthenticatedUser) -> ServiceResult<SubsidyPageData>
where
    R: ComplianceReader + CompanyReader + ?Sized,
{
    ensure_role(user, SERVICE_DIRECTOR_ROLE)?;

    let hub_id = HubId::new(user.hub_id)?;

    let reports = repo.list_subsidy_reports(hub_id)?;
    let (_, companies) = repo.list_companies(CompanyListQuery::new(hub_id))?;

    Ok(SubsidyPageData {
        totals: subsidy_totals(&reports),
        reports: build_subsidy_listings(reports, &companies),
        companies,
    })
}

pub fn create_subsidy_report<R>(
    repo: &R,
    user: &AuthenticatedUser,
    form: SubsidyReportForm,
) -> ServiceResult<SubsidyReport>
where
    R: CompanyReader + ComplianceWriter + ?Sized,
{
    ensure_role(user, SERVICE_DIRECTOR_ROLE)?;

    let payload = SubsidyReportPayload::try_from(form)?;

    let hub_id = HubId::new(user.hub_id)?;

    if repo.get_company_by_id(payload.company_id, hub_id)?.is_none() {
        return Err(ServiceError::Form("企業が見つかりません".to_string()));
    }

    let report = repo.create_subsidy_report(&payload.into_domain(hub_id)?)?;

    record_audit(
        repo,
        user,
        AuditAction::Create,
        "subsidy_report",
        Some(report.id.get()),
        Some(report.program.to_string()),
    );

    Ok(report)
}

/// Moves a report along `Draft → Submitted → Approved | Rejected`, `Rejected → Draft`.
pub fn update_subsidy_status<R>(
    repo: &R,
    user: &AuthenticatedUser,
    report_id: i32,
    form: SubsidyStatusForm,
) -> ServiceResult<SubsidyReport>
where
    R: ComplianceReader + ComplianceWriter + ?Sized,
{
    ensure_role(user, SERVICE_DIRECTOR_ROLE)?;

    let next = SubsidyStatus::try_from(form)?;

    let hub_id = HubId::new(user.hub_id)?;

    let report = repo
        .get_subsidy_report_by_id(SubsidyReportId::new(report_id)?, hub_id)?
        .ok_or(ServiceError::NotFound)?;

    if !report.status.can_transition_to(next) {
        return Err(ServiceError::Form(format!(
            "「{}」から「{}」へは変更できません",
            report.status.label(),
            next.label()
        )));
    }

    let updated = repo.update_subsidy_status(report.id, hub_id, next)?;

    record_audit(
        repo,
        user,
        AuditAction::StatusChange,
        "subsidy_report",
        Some(updated.id.get()),
        Some(format!("{} -> {}", report.status, next)),
    );

    Ok(updated)
}

/// Only drafts may be deleted.
pub fn delete_subsidy_report<R>(
    repo: &R,
    user: &AuthenticatedUser,
    report_id: i32,
) -> ServiceResult<()>
where
    R: ComplianceReader + ComplianceWriter + ?Sized,
{
    ensure_role(user, SERVICE_DIRECTOR_ROLE)?;

    let hub_id = HubId::new(user.hub_id)?;

    let report = repo
        .get_subsidy_report_by_id(SubsidyReportId::new(report_id)?, hub_id)?
        .ok_or(ServiceError::NotFound)?;

    if report.status != SubsidyStatus::Draft {
        return Err(ServiceError::Form(
            "削除できるのは下書きの報告のみです".to_string(),
        ));
    }

    repo.delete_subsidy_report(report.id, hub_id)?;

    record_audit(
        repo,
        user,
        AuditAction::Delete,
        "subsidy_report",
        Some(report.id.get()),
        Some(report.program.to_string()),
    );

    Ok(())
}

pub fn list_compliance_documents<R>(
    repo: &R,
    user: &AuthenticatedUser,
) -> ServiceResult<DocumentsPageData>
where
    R: ComplianceReader + CompanyReader + ?Sized,
{
    ensure_role(user, SERVICE_DIRECTOR_ROLE)?;

    let hub_id = HubId::new(user.hub_id)?;
    let today = Utc::now().date_naive();

    let documents = repo.list_compliance_documents(hub_id)?;
    let (_, companies) = repo.list_companies(CompanyListQuery::new(hub_id))?;

    Ok(DocumentsPageData {
        documents: build_document_listings(documents, &companies, today),
        companies,
    })
}

pub fn create_compliance_document<R>(
    repo: &R,
    user: &AuthenticatedUser,
    form: ComplianceDocumentForm,
) -> ServiceResult<ComplianceDocument>
where
    R: CompanyReader + ComplianceWriter + ?Sized,
{
    ensure_role(user, SERVICE_DIRECTOR_ROLE)?;

    let payload = ComplianceDocumentPayload::try_from(form)?;

    let hub_id = HubId::new(user.hub_id)?;

    if let Some(company_id) = payload.company_id
        && repo.get_company_by_id(company_id, hub_id)?.is_none()
    {
        return Err(ServiceError::Form("企業が見つかりません".to_string()));
    }

    let document = repo.create_compliance_document(&payload.into_domain(hub_id))?;

    record_audit(
        repo,
        user,
        AuditAction::Create,
        "compliance_document",
        Some(document.id.get()),
        Some(document.title.to_string()),
    );

    Ok(document)
}

pub fn delete_compliance_document<R>(
    repo: &R,
    user: &AuthenticatedUser,
    document_id: i32,
) -> ServiceResult<()>
where
    R: ComplianceWriter + ?Sized,
{
    ensure_role(user, SERVICE_DIRECTOR_ROLE)?;

    let hub_id = HubId::new(user.hub_id)?;
    let document_id = ComplianceDocumentId::new(document_id)?;

    repo.delete_compliance_document(document_id, hub_id)?;

    record_audit(
        repo,
        user,
        AuditAction::Delete,
        "compliance_document",
        Some(document_id.get()),
        None,
    );

    Ok(())
}

/// Newest audit entries first.
pub fn list_audit_logs<R>(
    repo: &R,
    user: &AuthenticatedUser,
    query: AuditLogsQuery,
) -> ServiceResult<AuditLogsPageData>
where
    R: ComplianceReader + ?Sized,
{
    ensure_role(user, SERVICE_DIRECTOR_ROLE)?;

    let hub_id = HubId::new(user.hub_id)?;
    let page = query.page.unwrap_or(1);

    let (total, logs) = repo.list_audit_logs(
        AuditLogListQuery::new(hub_id).paginate(page, DEFAULT_ITEMS_PER_PAGE),
    )?;

    Ok(AuditLogsPageData {
        logs: Paginated::from_total(logs, page, total, DEFAULT_ITEMS_PER_PAGE),
    })
}

/// Serializes the whole audit trail of the hub as CSV.
pub fn export_audit_logs<R>(repo: &R, user: &AuthenticatedUser) -> ServiceResult<Vec<u8>>
where
    R: ComplianceReader + ?Sized,
{
    ensure_role(user, SERVICE_DIRECTOR_ROLE)?;

    let hub_id = HubId::new(user.hub_id)?;

    let (_, logs) = repo.list_audit_logs(AuditLogListQuery::new(hub_id))?;

    audit_logs_to_csv(&logs)
}

fn audit_logs_to_csv(logs: &[AuditLog]) -> ServiceResult<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    let csv_error = |err: csv::Error| ServiceError::Internal(format!("csv: {err}"));

    writer
        .write_record([
            "id",
            "created_at",
            "actor_email",
            "action",
            "entity",
            "entity_id",
            "details",
        ])
        .map_err(csv_error)?;

    for log in logs {
        writer
            .write_record([
                log.id.get().to_string(),
                log.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
                log.actor_email.clone(),
                log.action.to_string(),
                log.entity.clone(),
                log.entity_id.map(|id| id.to_string()).unwrap_or_default(),
                log.details.clone().unwrap_or_default(),
            ])
            .map_err(csv_error)?;
    }

    writer
        .into_inner()
        .map_err(|err| ServiceError::Internal(format!("csv: {err}")))
}

#[cfg(test)]
mod csv_tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::domain::types::AuditLogId;

    #[test]
    fn audit_csv_quotes_details() {
        let log = AuditLog {
            id: AuditLogId::new(1).expect("valid id"),
            hub_id: HubId::new(1).expect("valid hub"),
            actor_email: "boss@example.com".into(),
            action: AuditAction::Import,
            entity: "company".into(),
            entity_id: None,
            details: Some("3 rows, 1 skipped".into()),
            created_at: NaiveDate::from_ymd_opt(2025, 6, 2)
                .and_then(|d| d.and_hms_opt(9, 0, 0))
                .expect("valid datetime"),
        };
        let bytes = audit_logs_to_csv(&[log]).expect("csv");
        let text = String::from_utf8(bytes).expect("utf8");
        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some("id,created_at,actor_email,action,entity,entity_id,details")
        );
        assert_eq!(
            lines.next(),
            Some("1,2025-06-02 09:00:00,boss@example.com,Import,company,,\"3 rows, 1 skipped\"")
        );
    }
}

#[cfg(all(test, feature = "test-mocks"))]
mod tests {
    use super::*;
    use crate::repository::errors::RepositoryError;
    use crate::repository::mock::MockRepository;
    use crate::services::test_support::{audit_row, director, operator_user, sample_report};

    #[test]
    fn reports_require_director() {
        let mut repo = MockRepository::new();
        repo.expect_list_subsidy_reports().times(0);
        assert!(matches!(
            list_subsidy_reports(&repo, &operator_user()),
            Err(ServiceError::Unauthorized)
        ));
    }

    #[test]
    fn submitted_report_can_be_approved() {
        let mut repo = MockRepository::new();
        repo.expect_get_subsidy_report_by_id()
            .returning(|_, _| Ok(Some(sample_report(4, SubsidyStatus::Submitted))));
        repo.expect_update_subsidy_status()
            .withf(|id, _, status| id.get() == 4 && *status == SubsidyStatus::Approved)
            .times(1)
            .returning(|_, _, _| Ok(sample_report(4, SubsidyStatus::Approved)));
        repo.expect_create_audit_log()
            .withf(|log| log.details.as_deref() == Some("Submitted -> Approved"))
            .times(1)
            .returning(|log| Ok(audit_row(log)));

        let form = SubsidyStatusForm {
            status: "Approved".into(),
        };
        let report = update_subsidy_status(&repo, &director(), 4, form).expect("updated");
        assert_eq!(report.status, SubsidyStatus::Approved);
    }

    #[test]
    fn stored_change_survives_failed_audit_insert() {
        let mut repo = MockRepository::new();
        repo.expect_get_subsidy_report_by_id()
            .returning(|_, _| Ok(Some(sample_report(4, SubsidyStatus::Submitted))));
        repo.expect_update_subsidy_status()
            .times(1)
            .returning(|_, _, _| Ok(sample_report(4, SubsidyStatus::Approved)));
        repo.expect_create_audit_log()
            .times(1)
            .returning(|_| Err(RepositoryError::DatabaseError("locked".to_string())));

        let form = SubsidyStatusForm {
            status: "Approved".into(),
        };
        let report = update_subsidy_status(&repo, &director(), 4, form).expect("updated");
        assert_eq!(report.status, SubsidyStatus::Approved);
    }

    #[test]
    fn draft_cannot_jump_to_approved() {
        let mut repo = MockRepository::new();
        repo.expect_get_subsidy_report_by_id()
            .returning(|_, _| Ok(Some(sample_report(4, SubsidyStatus::Draft))));
        repo.expect_update_subsidy_status().times(0);

        let form = SubsidyStatusForm {
            status: "Approved".into(),
        };
        assert!(matches!(
            update_subsidy_status(&repo, &director(), 4, form),
            Err(ServiceError::Form(_))
        ));
    }

    #[test]
    fn only_drafts_are_deleted() {
        let mut repo = MockRepository::new();
        repo.expect_get_subsidy_report_by_id()
            .returning(|_, _| Ok(Some(sample_report(4, SubsidyStatus::Approved))));
        repo.expect_delete_subsidy_report().times(0);

        assert!(matches!(
            delete_subsidy_report(&repo, &director(), 4),
            Err(ServiceError::Form(_))
        ));
    }

    #[test]
    fn audit_page_is_paginated() {
        let mut repo = MockRepository::new();
        repo.expect_list_audit_logs()
            .withf(|query| {
                query.pagination.as_ref().map(|p| (p.page, p.per_page))
                    == Some((2, DEFAULT_ITEMS_PER_PAGE))
            })
            .returning(|_| Ok((45, Vec::new())));

        let data = list_audit_logs(&repo, &director(), AuditLogsQuery { page: Some(2) })
            .expect("page");
        assert_eq!(data.logs.page, 2);
        assert_eq!(data.logs.pages, vec![Some(1), Some(2), Some(3)]);
    }
}
