//! Mock repository implementations for isolating services in tests.

use chrono::{NaiveDate, NaiveDateTime};
use mockall::mock;

use crate::domain::appointment::{Appointment, AppointmentStatus, NewAppointment};
use crate::domain::call::{Call, CallScore, GoldenCall, NewCall, NewGoldenCall};
use crate::domain::company::{Company, NewCompany, UpdateCompany};
use crate::domain::compliance::{
    AuditLog, ComplianceDocument, NewAuditLog, NewComplianceDocument, NewSubsidyReport,
    SubsidyReport, SubsidyStatus,
};
use crate::domain::fraud::{FraudScore, NewFraudScore};
use crate::domain::intelligence::{
    CrawlCompletion, CrawlJob, NewCrawlJob, NewNewsTrigger, NewsTrigger,
};
use crate::domain::nurturing::{
    DocumentSend, DocumentTemplate, FollowupRule, NewDocumentSend, NewDocumentTemplate,
    NewFollowupRule, UpdateDocumentTemplate,
};
use crate::domain::operator::{NewOperator, Operator};
use crate::domain::rejection::{NewRejectionInsight, RejectionInsight};
use crate::domain::roleplay::{
    NewRoleplayScenario, NewRoleplaySession, RoleplayScenario, RoleplaySession,
    UpdateRoleplayScenario,
};
use crate::domain::schedule::{NewScheduleSlot, ScheduleSlot};
use crate::domain::types::{
    AppointmentId, CallId, CompanyId, ComplianceDocumentId, CrawlJobId, EmailAddress,
    FollowupRuleId, GoldenCallId, HubId, NewsTriggerId, OperatorId, ScenarioId, Score, SessionId,
    SubsidyReportId, TemplateId,
};
use crate::repository::errors::RepositoryResult;
use crate::repository::{
    AppointmentListQuery, AppointmentReader, AppointmentWriter, AuditLogListQuery, CallListQuery,
    CallReader, CallWriter, CompanyListQuery, CompanyReader, CompanyWriter, ComplianceReader,
    ComplianceWriter, FraudReader, FraudWriter, IntelligenceReader, IntelligenceWriter,
    NurturingReader, NurturingWriter, OperatorReader, OperatorWriter, RejectionReader,
    RejectionWriter, RoleplayReader, RoleplayWriter, ScheduleReader, ScheduleWriter,
};

mock! {
    pub Repository {}

    impl CompanyReader for Repository {
        fn get_company_by_id(&self, id: CompanyId, hub_id: HubId) -> RepositoryResult<Option<Company>>;
        fn list_companies(&self, query: CompanyListQuery) -> RepositoryResult<(usize, Vec<Company>)>;
    }

    impl CompanyWriter for Repository {
        fn create_companies(&self, new_companies: &[NewCompany]) -> RepositoryResult<usize>;
        fn update_company(
            &self,
            id: CompanyId,
            hub_id: HubId,
            updates: &UpdateCompany,
        ) -> RepositoryResult<Company>;
        fn delete_company(&self, id: CompanyId, hub_id: HubId) -> RepositoryResult<()>;
    }

    impl OperatorReader for Repository {
        fn get_operator_by_id(&self, id: OperatorId, hub_id: HubId)
        -> RepositoryResult<Option<Operator>>;
        fn get_operator_by_email(
            &self,
            email: &EmailAddress,
            hub_id: HubId,
        ) -> RepositoryResult<Option<Operator>>;
        fn list_operators(&self, hub_id: HubId) -> RepositoryResult<Vec<Operator>>;
    }

    impl OperatorWriter for Repository {
        fn upsert_operator(&self, new_operator: &NewOperator) -> RepositoryResult<Operator>;
        fn set_operator_active(
            &self,
            id: OperatorId,
            hub_id: HubId,
            is_active: bool,
        ) -> RepositoryResult<Operator>;
    }

    impl AppointmentReader for Repository {
        fn get_appointment_by_id(
            &self,
            id: AppointmentId,
            hub_id: HubId,
        ) -> RepositoryResult<Option<Appointment>>;
        fn list_appointments(&self, query: AppointmentListQuery) -> RepositoryResult<Vec<Appointment>>;
    }

    impl AppointmentWriter for Repository {
        fn create_appointment(&self, new_appointment: &NewAppointment)
        -> RepositoryResult<Appointment>;
        fn update_appointment_status(
            &self,
            id: AppointmentId,
            hub_id: HubId,
            status: AppointmentStatus,
        ) -> RepositoryResult<Appointment>;
        fn set_calendar_event_id(
            &self,
            id: AppointmentId,
            hub_id: HubId,
            event_id: &str,
        ) -> RepositoryResult<()>;
    }

    impl ScheduleReader for Repository {
        fn list_slots(&self, hub_id: HubId, date: NaiveDate) -> RepositoryResult<Vec<ScheduleSlot>>;
    }

    impl ScheduleWriter for Repository {
        fn replace_slots(
            &self,
            hub_id: HubId,
            date: NaiveDate,
            slots: &[NewScheduleSlot],
        ) -> RepositoryResult<usize>;
        fn clear_slots(&self, hub_id: HubId, date: NaiveDate) -> RepositoryResult<usize>;
    }

    impl CallReader for Repository {
        fn get_call_by_id(&self, id: CallId, hub_id: HubId) -> RepositoryResult<Option<Call>>;
        fn list_calls(&self, query: CallListQuery) -> RepositoryResult<Vec<Call>>;
        fn list_golden_calls(&self, hub_id: HubId) -> RepositoryResult<Vec<(GoldenCall, Call)>>;
        fn is_golden_call(&self, call_id: CallId) -> RepositoryResult<bool>;
    }

    impl CallWriter for Repository {
        fn create_call(&self, new_call: &NewCall) -> RepositoryResult<Call>;
        fn update_call_score(
            &self,
            id: CallId,
            hub_id: HubId,
            score: &CallScore,
        ) -> RepositoryResult<Call>;
        fn create_golden_call(&self, golden: &NewGoldenCall) -> RepositoryResult<GoldenCall>;
        fn delete_golden_call(&self, id: GoldenCallId, hub_id: HubId) -> RepositoryResult<()>;
    }

    impl RejectionReader for Repository {
        fn list_insights(
            &self,
            hub_id: HubId,
            company_id: Option<CompanyId>,
        ) -> RepositoryResult<Vec<RejectionInsight>>;
    }

    impl RejectionWriter for Repository {
        fn create_insight(&self, insight: &NewRejectionInsight) -> RepositoryResult<RejectionInsight>;
    }

    impl NurturingReader for Repository {
        fn get_template_by_id(
            &self,
            id: TemplateId,
            hub_id: HubId,
        ) -> RepositoryResult<Option<DocumentTemplate>>;
        fn list_templates(&self, hub_id: HubId) -> RepositoryResult<Vec<DocumentTemplate>>;
        fn list_document_sends(
            &self,
            hub_id: HubId,
            company_id: Option<CompanyId>,
        ) -> RepositoryResult<Vec<DocumentSend>>;
        fn list_followup_rules(&self, hub_id: HubId) -> RepositoryResult<Vec<FollowupRule>>;
        fn list_hubs_with_active_rules(&self) -> RepositoryResult<Vec<HubId>>;
    }

    impl NurturingWriter for Repository {
        fn create_template(&self, template: &NewDocumentTemplate) -> RepositoryResult<DocumentTemplate>;
        fn update_template(
            &self,
            id: TemplateId,
            hub_id: HubId,
            template: &UpdateDocumentTemplate,
        ) -> RepositoryResult<DocumentTemplate>;
        fn delete_template(&self, id: TemplateId, hub_id: HubId) -> RepositoryResult<()>;
        fn create_document_send(&self, send: &NewDocumentSend) -> RepositoryResult<DocumentSend>;
        fn create_followup_rule(&self, rule: &NewFollowupRule) -> RepositoryResult<FollowupRule>;
        fn set_followup_rule_active(
            &self,
            id: FollowupRuleId,
            hub_id: HubId,
            is_active: bool,
        ) -> RepositoryResult<FollowupRule>;
        fn delete_followup_rule(&self, id: FollowupRuleId, hub_id: HubId) -> RepositoryResult<()>;
    }

    impl IntelligenceReader for Repository {
        fn get_crawl_job_by_id(&self, id: CrawlJobId, hub_id: HubId)
        -> RepositoryResult<Option<CrawlJob>>;
        fn list_crawl_jobs(&self, hub_id: HubId) -> RepositoryResult<Vec<CrawlJob>>;
        fn list_pending_crawl_jobs(&self, limit: i64) -> RepositoryResult<Vec<CrawlJob>>;
        fn list_news_triggers(&self, hub_id: HubId) -> RepositoryResult<Vec<NewsTrigger>>;
    }

    impl IntelligenceWriter for Repository {
        fn create_crawl_job(&self, job: &NewCrawlJob) -> RepositoryResult<CrawlJob>;
        fn finish_crawl_job(
            &self,
            id: CrawlJobId,
            completion: &CrawlCompletion,
        ) -> RepositoryResult<CrawlJob>;
        fn delete_crawl_job(&self, id: CrawlJobId, hub_id: HubId) -> RepositoryResult<()>;
        fn create_news_trigger(&self, trigger: &NewNewsTrigger) -> RepositoryResult<NewsTrigger>;
        fn set_news_trigger_active(
            &self,
            id: NewsTriggerId,
            hub_id: HubId,
            is_active: bool,
        ) -> RepositoryResult<NewsTrigger>;
        fn mark_news_triggers_matched(
            &self,
            ids: &[NewsTriggerId],
            headline: &str,
            matched_at: NaiveDateTime,
        ) -> RepositoryResult<usize>;
        fn delete_news_trigger(&self, id: NewsTriggerId, hub_id: HubId) -> RepositoryResult<()>;
    }

    impl FraudReader for Repository {
        fn list_fraud_scores(&self, hub_id: HubId) -> RepositoryResult<Vec<FraudScore>>;
    }

    impl FraudWriter for Repository {
        fn create_fraud_score(&self, score: &NewFraudScore) -> RepositoryResult<FraudScore>;
    }

    impl ComplianceReader for Repository {
        fn get_subsidy_report_by_id(
            &self,
            id: SubsidyReportId,
            hub_id: HubId,
        ) -> RepositoryResult<Option<SubsidyReport>>;
        fn list_subsidy_reports(&self, hub_id: HubId) -> RepositoryResult<Vec<SubsidyReport>>;
        fn list_compliance_documents(&self, hub_id: HubId)
        -> RepositoryResult<Vec<ComplianceDocument>>;
        fn list_audit_logs(&self, query: AuditLogListQuery) -> RepositoryResult<(usize, Vec<AuditLog>)>;
    }

    impl ComplianceWriter for Repository {
        fn create_subsidy_report(&self, report: &NewSubsidyReport) -> RepositoryResult<SubsidyReport>;
        fn update_subsidy_status(
            &self,
            id: SubsidyReportId,
            hub_id: HubId,
            status: SubsidyStatus,
        ) -> RepositoryResult<SubsidyReport>;
        fn delete_subsidy_report(&self, id: SubsidyReportId, hub_id: HubId) -> RepositoryResult<()>;
        fn create_compliance_document(
            &self,
            document: &NewComplianceDocument,
        ) -> RepositoryResult<ComplianceDocument>;
        fn delete_compliance_document(
            &self,
            id: ComplianceDocumentId,
            hub_id: HubId,
        ) -> RepositoryResult<()>;
        fn create_audit_log(&self, log: &NewAuditLog) -> RepositoryResult<AuditLog>;
    }

    impl RoleplayReader for Repository {
        fn get_scenario_by_id(
            &self,
            id: ScenarioId,
            hub_id: HubId,
        ) -> RepositoryResult<Option<RoleplayScenario>>;
        fn list_scenarios(&self, hub_id: HubId) -> RepositoryResult<Vec<RoleplayScenario>>;
        fn get_session_by_id(
            &self,
            id: SessionId,
            hub_id: HubId,
        ) -> RepositoryResult<Option<RoleplaySession>>;
        fn list_sessions(
            &self,
            hub_id: HubId,
            operator_id: Option<OperatorId>,
        ) -> RepositoryResult<Vec<RoleplaySession>>;
    }

    impl RoleplayWriter for Repository {
        fn create_scenario(&self, scenario: &NewRoleplayScenario) -> RepositoryResult<RoleplayScenario>;
        fn update_scenario(
            &self,
            id: ScenarioId,
            hub_id: HubId,
            scenario: &UpdateRoleplayScenario,
        ) -> RepositoryResult<RoleplayScenario>;
        fn delete_scenario(&self, id: ScenarioId, hub_id: HubId) -> RepositoryResult<()>;
        fn create_session(&self, session: &NewRoleplaySession) -> RepositoryResult<RoleplaySession>;
        fn submit_session_transcript(
            &self,
            id: SessionId,
            hub_id: HubId,
            transcript: &str,
        ) -> RepositoryResult<RoleplaySession>;
        fn grade_session(
            &self,
            id: SessionId,
            hub_id: HubId,
            score: Score,
        ) -> RepositoryResult<RoleplaySession>;
    }
}
