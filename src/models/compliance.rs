use chrono::{NaiveDate, NaiveDateTime};
use diesel::prelude::*;

use crate::domain::compliance::{
    AuditLog as DomainAuditLog, ComplianceDocument as DomainDocument,
    NewAuditLog as DomainNewAuditLog, NewComplianceDocument as DomainNewDocument,
    NewSubsidyReport as DomainNewReport, SubsidyReport as DomainReport,
};
use crate::domain::types::{
    AuditLogId, CompanyId, ComplianceDocumentId, HubId, NonEmptyString, SubsidyReportId, Title,
    TypeConstraintError, WebUrl, Yen,
};

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::subsidy_reports)]
/// Diesel model for [`crate::domain::compliance::SubsidyReport`].
pub struct SubsidyReport {
    pub id: i32,
    pub hub_id: i32,
    pub company_id: i32,
    pub program: String,
    pub amount: i64,
    pub status: String,
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::subsidy_reports)]
pub struct NewSubsidyReport<'a> {
    pub hub_id: i32,
    pub company_id: i32,
    pub program: &'a str,
    pub amount: i64,
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
}

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::compliance_documents)]
/// Diesel model for [`crate::domain::compliance::ComplianceDocument`].
pub struct ComplianceDocument {
    pub id: i32,
    pub hub_id: i32,
    pub company_id: Option<i32>,
    pub title: String,
    pub url: String,
    pub doc_type: String,
    pub expires_on: Option<NaiveDate>,
    pub created_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::compliance_documents)]
pub struct NewComplianceDocument<'a> {
    pub hub_id: i32,
    pub company_id: Option<i32>,
    pub title: &'a str,
    pub url: &'a str,
    pub doc_type: &'a str,
    pub expires_on: Option<NaiveDate>,
}

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::audit_logs)]
/// Diesel model for [`crate::domain::compliance::AuditLog`].
pub struct AuditLog {
    pub id: i32,
    pub hub_id: i32,
    pub actor_email: String,
    pub action: String,
    pub entity: String,
    pub entity_id: Option<i32>,
    pub details: Option<String>,
    pub created_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::audit_logs)]
pub struct NewAuditLog<'a> {
    pub hub_id: i32,
    pub actor_email: &'a str,
    pub action: &'a str,
    pub entity: &'a str,
    pub entity_id: Option<i32>,
    pub details: Option<&'a str>,
}

impl TryFrom<SubsidyReport> for DomainReport {
    type Error = TypeConstraintError;

    fn try_from(report: SubsidyReport) -> Result<Self, Self::Error> {
        Ok(Self {
            id: SubsidyReportId::try_from(report.id)?,
            hub_id: HubId::try_from(report.hub_id)?,
            company_id: CompanyId::try_from(report.company_id)?,
            program: Title::new(report.program)?,
            amount: Yen::new(report.amount)?,
            status: report.status.parse()?,
            period_start: report.period_start,
            period_end: report.period_end,
            created_at: report.created_at,
            updated_at: report.updated_at,
        })
    }
}

impl<'a> From<&'a DomainNewReport> for NewSubsidyReport<'a> {
    fn from(report: &'a DomainNewReport) -> Self {
        Self {
            hub_id: report.hub_id.get(),
            company_id: report.company_id.get(),
            program: report.program.as_str(),
            amount: report.amount.get(),
            period_start: report.period_start,
            period_end: report.period_end,
        }
    }
}

impl TryFrom<ComplianceDocument> for DomainDocument {
    type Error = TypeConstraintError;

    fn try_from(document: ComplianceDocument) -> Result<Self, Self::Error> {
        Ok(Self {
            id: ComplianceDocumentId::try_from(document.id)?,
            hub_id: HubId::try_from(document.hub_id)?,
            company_id: document.company_id.map(CompanyId::try_from).transpose()?,
            title: Title::new(document.title)?,
            url: WebUrl::new(document.url)?,
            doc_type: NonEmptyString::new(document.doc_type)?,
            expires_on: document.expires_on,
            created_at: document.created_at,
        })
    }
}

impl<'a> From<&'a DomainNewDocument> for NewComplianceDocument<'a> {
    fn from(document: &'a DomainNewDocument) -> Self {
        Self {
            hub_id: document.hub_id.get(),
            company_id: document.company_id.map(CompanyId::get),
            title: document.title.as_str(),
            url: document.url.as_str(),
            doc_type: document.doc_type.as_str(),
            expires_on: document.expires_on,
        }
    }
}

impl TryFrom<AuditLog> for DomainAuditLog {
    type Error = TypeConstraintError;

    fn try_from(log: AuditLog) -> Result<Self, Self::Error> {
        Ok(Self {
            id: AuditLogId::try_from(log.id)?,
            hub_id: HubId::try_from(log.hub_id)?,
            actor_email: log.actor_email,
            action: log.action.parse()?,
            entity: log.entity,
            entity_id: log.entity_id,
            details: log.details,
            created_at: log.created_at,
        })
    }
}

impl<'a> From<&'a DomainNewAuditLog> for NewAuditLog<'a> {
    fn from(log: &'a DomainNewAuditLog) -> Self {
        Self {
            hub_id: log.hub_id.get(),
            actor_email: log.actor_email.as_str(),
            action: log.action.as_str(),
            entity: log.entity.as_str(),
            entity_id: log.entity_id,
            details: log.details.as_deref(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::compliance::{AuditAction, SubsidyStatus};
    use chrono::Utc;

    #[test]
    fn report_row_into_domain() {
        let now = Utc::now().naive_utc();
        let row = SubsidyReport {
            id: 1,
            hub_id: 1,
            company_id: 2,
            program: "ものづくり補助金".into(),
            amount: 1_500_000,
            status: "Submitted".into(),
            period_start: now.date(),
            period_end: now.date(),
            created_at: now,
            updated_at: now,
        };
        let report = DomainReport::try_from(row).expect("valid report");
        assert_eq!(report.status, SubsidyStatus::Submitted);
        assert_eq!(report.amount.get(), 1_500_000);
    }

    #[test]
    fn negative_amount_is_rejected() {
        let now = Utc::now().naive_utc();
        let row = SubsidyReport {
            id: 1,
            hub_id: 1,
            company_id: 2,
            program: "x".into(),
            amount: -1,
            status: "Draft".into(),
            period_start: now.date(),
            period_end: now.date(),
            created_at: now,
            updated_at: now,
        };
        assert_eq!(
            DomainReport::try_from(row),
            Err(TypeConstraintError::NegativeAmount)
        );
    }

    #[test]
    fn audit_log_action_is_text() {
        let domain = DomainNewAuditLog::new(
            HubId::new(1).expect("valid hub"),
            "boss@example.com",
            AuditAction::StatusChange,
            "subsidy_report",
            Some(4),
            None,
        );
        let new: NewAuditLog = (&domain).into();
        assert_eq!(new.action, "StatusChange");
        assert_eq!(new.entity, "subsidy_report");
    }
}
