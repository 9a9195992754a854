//! Repository implementation for subsidy reports, compliance documents and
//! the audit trail.

use chrono::Utc;
use diesel::prelude::*;

use crate::{
    domain::{
        compliance::{
            AuditLog, ComplianceDocument, NewAuditLog, NewComplianceDocument, NewSubsidyReport,
            SubsidyReport, SubsidyStatus,
        },
        types::{ComplianceDocumentId, HubId, SubsidyReportId},
    },
    models::compliance::{
        AuditLog as DbAuditLog, ComplianceDocument as DbDocument, NewAuditLog as DbNewAuditLog,
        NewComplianceDocument as DbNewDocument, NewSubsidyReport as DbNewReport,
        SubsidyReport as DbReport,
    },
    repository::{
        AuditLogListQuery, ComplianceReader, ComplianceWriter, DieselRepository,
        errors::{RepositoryError, RepositoryResult},
    },
};

impl ComplianceReader for DieselRepository {
    fn get_subsidy_report_by_id(
        &self,
        id: SubsidyReportId,
        hub_id: HubId,
    ) -> RepositoryResult<Option<SubsidyReport>> {
        use crate::schema::subsidy_reports;

        let mut conn = self.conn()?;
        let report = subsidy_reports::table
            .filter(subsidy_reports::id.eq(id.get()))
            .filter(subsidy_reports::hub_id.eq(hub_id.get()))
            .first::<DbReport>(&mut conn)
            .optional()?;

        report
            .map(|db| SubsidyReport::try_from(db).map_err(RepositoryError::from))
            .transpose()
    }

    fn list_subsidy_reports(&self, hub_id: HubId) -> RepositoryResult<Vec<SubsidyReport>> {
        use crate::schema::subsidy_reports;

        let mut conn = self.conn()?;
        subsidy_reports::table
            .filter(subsidy_reports::hub_id.eq(hub_id.get()))
            .order((subsidy_reports::period_end.desc(), subsidy_reports::id.desc()))
            .load::<DbReport>(&mut conn)?
            .into_iter()
            .map(|db| SubsidyReport::try_from(db).map_err(RepositoryError::from))
            .collect()
    }

    fn list_compliance_documents(
        &self,
        hub_id: HubId,
    ) -> RepositoryResult<Vec<ComplianceDocument>> {
        use crate::schema::compliance_documents;

        let mut conn = self.conn()?;
        compliance_documents::table
            .filter(compliance_documents::hub_id.eq(hub_id.get()))
            .order((
                compliance_documents::expires_on.asc(),
                compliance_documents::id.asc(),
            ))
            .load::<DbDocument>(&mut conn)?
            .into_iter()
            .map(|db| ComplianceDocument::try_from(db).map_err(RepositoryError::from))
            .collect()
    }

    fn list_audit_logs(&self, query: AuditLogListQuery) -> RepositoryResult<(usize, Vec<AuditLog>)> {
        use crate::schema::audit_logs;

        let mut conn = self.conn()?;

        let total = audit_logs::table
            .filter(audit_logs::hub_id.eq(query.hub_id.get()))
            .count()
            .get_result::<i64>(&mut conn)? as usize;

        let mut items = audit_logs::table
            .filter(audit_logs::hub_id.eq(query.hub_id.get()))
            .order((audit_logs::created_at.desc(), audit_logs::id.desc()))
            .into_boxed();
        if let Some(pagination) = &query.pagination {
            items = items.limit(pagination.limit()).offset(pagination.offset());
        }

        let logs = items
            .load::<DbAuditLog>(&mut conn)?
            .into_iter()
            .map(|db| AuditLog::try_from(db).map_err(RepositoryError::from))
            .collect::<RepositoryResult<Vec<_>>>()?;

        Ok((total, logs))
    }
}

impl ComplianceWriter for DieselRepository {
    fn create_subsidy_report(&self, report: &NewSubsidyReport) -> RepositoryResult<SubsidyReport> {
        use crate::schema::subsidy_reports;

        let mut conn = self.conn()?;
        let insertable: DbNewReport = report.into();

        let db_report = diesel::insert_into(subsidy_reports::table)
            .values(&insertable)
            .get_result::<DbReport>(&mut conn)?;

        SubsidyReport::try_from(db_report).map_err(RepositoryError::from)
    }

    fn update_subsidy_status(
        &self,
        id: SubsidyReportId,
        hub_id: HubId,
        status: SubsidyStatus,
    ) -> RepositoryResult<SubsidyReport> {
        use crate::schema::subsidy_reports;

        let mut conn = self.conn()?;
        let db_report = diesel::update(
            subsidy_reports::table
                .filter(subsidy_reports::id.eq(id.get()))
                .filter(subsidy_reports::hub_id.eq(hub_id.get())),
        )
        .set((
            subsidy_reports::status.eq(status.as_str()),
            subsidy_reports::updated_at.eq(Utc::now().naive_utc()),
        ))
        .get_result::<DbReport>(&mut conn)?;

        SubsidyReport::try_from(db_report).map_err(RepositoryError::from)
    }

    fn delete_subsidy_report(&self, id: SubsidyReportId, hub_id: HubId) -> RepositoryResult<()> {
        use crate::schema::subsidy_reports;

        let mut conn = self.conn()?;
        let deleted = diesel::delete(
            subsidy_reports::table
                .filter(subsidy_reports::id.eq(id.get()))
                .filter(subsidy_reports::hub_id.eq(hub_id.get())),
        )
        .execute(&mut conn)?;

        if deleted == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    fn create_compliance_document(
        &self,
        document: &NewComplianceDocument,
    ) -> RepositoryResult<ComplianceDocument> {
        use crate::schema::compliance_documents;

        let mut conn = self.conn()?;
        let insertable: DbNewDocument = document.into();

        let db_document = diesel::insert_into(compliance_documents::table)
            .values(&insertable)
            .get_result::<DbDocument>(&mut conn)?;

        ComplianceDocument::try_from(db_document).map_err(RepositoryError::from)
    }

    fn delete_compliance_document(
        &self,
        id: ComplianceDocumentId,
        hub_id: HubId,
    ) -> RepositoryResult<()> {
        use crate::schema::compliance_documents;

        let mut conn = self.conn()?;
        let deleted = diesel::delete(
            compliance_documents::table
                .filter(compliance_documents::id.eq(id.get()))
                .filter(compliance_documents::hub_id.eq(hub_id.get())),
        )
        .execute(&mut conn)?;

        if deleted == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    fn create_audit_log(&self, log: &NewAuditLog) -> RepositoryResult<AuditLog> {
        use crate::schema::audit_logs;

        let mut conn = self.conn()?;
        let insertable: DbNewAuditLog = log.into();

        let db_log = diesel::insert_into(audit_logs::table)
            .values(&insertable)
            .get_result::<DbAuditLog>(&mut conn)?;

        AuditLog::try_from(db_log).map_err(RepositoryError::from)
    }
}
