//! Persistence traits and their Diesel implementation.
//!
//! Every trait method that touches tenant data takes the caller's [`HubId`]
//! so rows of other hubs are never read or modified.

use chrono::{NaiveDate, NaiveDateTime};

use crate::db::{DbConnection, DbPool};
use crate::domain::appointment::{Appointment, AppointmentStatus, NewAppointment};
use crate::domain::call::{Call, CallOutcome, CallScore, GoldenCall, NewCall, NewGoldenCall};
use crate::domain::company::{Company, NewCompany, UpdateCompany};
use crate::domain::compliance::{
    AuditLog, ComplianceDocument, NewAuditLog, NewComplianceDocument, NewSubsidyReport,
    SubsidyReport, SubsidyStatus,
};
use crate::domain::fraud::{FraudScore, NewFraudScore};
use crate::domain::intelligence::{CrawlCompletion, CrawlJob, NewCrawlJob, NewNewsTrigger, NewsTrigger};
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

pub mod appointment;
pub mod call;
pub mod company;
pub mod compliance;
pub mod errors;
pub mod fraud;
pub mod intelligence;
#[cfg(feature = "test-mocks")]
pub mod mock;
pub mod nurturing;
pub mod operator;
pub mod rejection;
pub mod roleplay;
pub mod schedule;

/// Diesel-backed repository shared by every handler.
#[derive(Clone)]
pub struct DieselRepository {
    pool: DbPool,
}

impl DieselRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn conn(&self) -> RepositoryResult<DbConnection> {
        Ok(self.pool.get()?)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Pagination {
    pub page: usize,
    pub per_page: usize,
}

impl Pagination {
    pub fn offset(&self) -> i64 {
        (self.page.max(1) - 1) as i64 * self.per_page as i64
    }

    pub fn limit(&self) -> i64 {
        self.per_page as i64
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompanyListQuery {
    pub hub_id: HubId,
    pub search: Option<String>,
    pub pagination: Option<Pagination>,
}

impl CompanyListQuery {
    pub fn new(hub_id: HubId) -> Self {
        Self {
            hub_id,
            search: None,
            pagination: None,
        }
    }

    pub fn search(mut self, term: impl Into<String>) -> Self {
        self.search = Some(term.into());
        self
    }

    pub fn paginate(mut self, page: usize, per_page: usize) -> Self {
        self.pagination = Some(Pagination { page, per_page });
        self
    }
}

/// Appointments whose `scheduled_at` falls in `[from, to)`.
#[derive(Debug, Clone, PartialEq)]
pub struct AppointmentListQuery {
    pub hub_id: HubId,
    pub from: Option<NaiveDateTime>,
    pub to: Option<NaiveDateTime>,
    pub operator_id: Option<OperatorId>,
    pub company_id: Option<CompanyId>,
}

impl AppointmentListQuery {
    pub fn new(hub_id: HubId) -> Self {
        Self {
            hub_id,
            from: None,
            to: None,
            operator_id: None,
            company_id: None,
        }
    }

    pub fn window(mut self, from: NaiveDateTime, to: NaiveDateTime) -> Self {
        self.from = Some(from);
        self.to = Some(to);
        self
    }

    pub fn operator(mut self, operator_id: OperatorId) -> Self {
        self.operator_id = Some(operator_id);
        self
    }

    pub fn company(mut self, company_id: CompanyId) -> Self {
        self.company_id = Some(company_id);
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CallListQuery {
    pub hub_id: HubId,
    pub company_id: Option<CompanyId>,
    pub operator_id: Option<OperatorId>,
    pub outcome: Option<CallOutcome>,
}

impl CallListQuery {
    pub fn new(hub_id: HubId) -> Self {
        Self {
            hub_id,
            company_id: None,
            operator_id: None,
            outcome: None,
        }
    }

    pub fn company(mut self, company_id: CompanyId) -> Self {
        self.company_id = Some(company_id);
        self
    }

    pub fn operator(mut self, operator_id: OperatorId) -> Self {
        self.operator_id = Some(operator_id);
        self
    }

    pub fn outcome(mut self, outcome: CallOutcome) -> Self {
        self.outcome = Some(outcome);
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AuditLogListQuery {
    pub hub_id: HubId,
    pub pagination: Option<Pagination>,
}

impl AuditLogListQuery {
    pub fn new(hub_id: HubId) -> Self {
        Self {
            hub_id,
            pagination: None,
        }
    }

    pub fn paginate(mut self, page: usize, per_page: usize) -> Self {
        self.pagination = Some(Pagination { page, per_page });
        self
    }
}

pub trait CompanyReader {
    fn get_company_by_id(&self, id: CompanyId, hub_id: HubId) -> RepositoryResult<Option<Company>>;
    /// Returns the total number of matches and the requested page.
    fn list_companies(&self, query: CompanyListQuery) -> RepositoryResult<(usize, Vec<Company>)>;
}

pub trait CompanyWriter {
    fn create_companies(&self, new_companies: &[NewCompany]) -> RepositoryResult<usize>;
    fn update_company(
        &self,
        id: CompanyId,
        hub_id: HubId,
        updates: &UpdateCompany,
    ) -> RepositoryResult<Company>;
    fn delete_company(&self, id: CompanyId, hub_id: HubId) -> RepositoryResult<()>;
}

pub trait OperatorReader {
    fn get_operator_by_id(&self, id: OperatorId, hub_id: HubId)
    -> RepositoryResult<Option<Operator>>;
    fn get_operator_by_email(
        &self,
        email: &EmailAddress,
        hub_id: HubId,
    ) -> RepositoryResult<Option<Operator>>;
    fn list_operators(&self, hub_id: HubId) -> RepositoryResult<Vec<Operator>>;
}

pub trait OperatorWriter {
    /// Inserts the operator or refreshes the row sharing its `(email, hub)`.
    fn upsert_operator(&self, new_operator: &NewOperator) -> RepositoryResult<Operator>;
    fn set_operator_active(
        &self,
        id: OperatorId,
        hub_id: HubId,
        is_active: bool,
    ) -> RepositoryResult<Operator>;
}

pub trait AppointmentReader {
    fn get_appointment_by_id(
        &self,
        id: AppointmentId,
        hub_id: HubId,
    ) -> RepositoryResult<Option<Appointment>>;
    fn list_appointments(&self, query: AppointmentListQuery) -> RepositoryResult<Vec<Appointment>>;
}

pub trait AppointmentWriter {
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

pub trait ScheduleReader {
    fn list_slots(&self, hub_id: HubId, date: NaiveDate) -> RepositoryResult<Vec<ScheduleSlot>>;
}

pub trait ScheduleWriter {
    /// Deletes the day's slots and inserts `slots` in one transaction.
    fn replace_slots(
        &self,
        hub_id: HubId,
        date: NaiveDate,
        slots: &[NewScheduleSlot],
    ) -> RepositoryResult<usize>;
    fn clear_slots(&self, hub_id: HubId, date: NaiveDate) -> RepositoryResult<usize>;
}

pub trait CallReader {
    fn get_call_by_id(&self, id: CallId, hub_id: HubId) -> RepositoryResult<Option<Call>>;
    /// Calls matching the query, newest first.
    fn list_calls(&self, query: CallListQuery) -> RepositoryResult<Vec<Call>>;
    fn list_golden_calls(&self, hub_id: HubId) -> RepositoryResult<Vec<(GoldenCall, Call)>>;
    fn is_golden_call(&self, call_id: CallId) -> RepositoryResult<bool>;
}

pub trait CallWriter {
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

pub trait RejectionReader {
    /// Insights of the hub, optionally narrowed to one company, newest first.
    fn list_insights(
        &self,
        hub_id: HubId,
        company_id: Option<CompanyId>,
    ) -> RepositoryResult<Vec<RejectionInsight>>;
}

pub trait RejectionWriter {
    fn create_insight(&self, insight: &NewRejectionInsight) -> RepositoryResult<RejectionInsight>;
}

pub trait NurturingReader {
    fn get_template_by_id(
        &self,
        id: TemplateId,
        hub_id: HubId,
    ) -> RepositoryResult<Option<DocumentTemplate>>;
    fn list_templates(&self, hub_id: HubId) -> RepositoryResult<Vec<DocumentTemplate>>;
    /// Sends of the hub, optionally narrowed to one company, newest first.
    fn list_document_sends(
        &self,
        hub_id: HubId,
        company_id: Option<CompanyId>,
    ) -> RepositoryResult<Vec<DocumentSend>>;
    fn list_followup_rules(&self, hub_id: HubId) -> RepositoryResult<Vec<FollowupRule>>;
    /// Hubs owning at least one active follow-up rule.
    fn list_hubs_with_active_rules(&self) -> RepositoryResult<Vec<HubId>>;
}

pub trait NurturingWriter {
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

pub trait IntelligenceReader {
    fn get_crawl_job_by_id(&self, id: CrawlJobId, hub_id: HubId)
    -> RepositoryResult<Option<CrawlJob>>;
    /// Jobs of the hub, newest first.
    fn list_crawl_jobs(&self, hub_id: HubId) -> RepositoryResult<Vec<CrawlJob>>;
    /// Pending jobs across every hub, oldest first.
    fn list_pending_crawl_jobs(&self, limit: i64) -> RepositoryResult<Vec<CrawlJob>>;
    fn list_news_triggers(&self, hub_id: HubId) -> RepositoryResult<Vec<NewsTrigger>>;
}

pub trait IntelligenceWriter {
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

pub trait FraudReader {
    fn list_fraud_scores(&self, hub_id: HubId) -> RepositoryResult<Vec<FraudScore>>;
}

pub trait FraudWriter {
    fn create_fraud_score(&self, score: &NewFraudScore) -> RepositoryResult<FraudScore>;
}

pub trait ComplianceReader {
    fn get_subsidy_report_by_id(
        &self,
        id: SubsidyReportId,
        hub_id: HubId,
    ) -> RepositoryResult<Option<SubsidyReport>>;
    fn list_subsidy_reports(&self, hub_id: HubId) -> RepositoryResult<Vec<SubsidyReport>>;
    fn list_compliance_documents(&self, hub_id: HubId)
    -> RepositoryResult<Vec<ComplianceDocument>>;
    /// Audit entries, newest first, with the total count.
    fn list_audit_logs(&self, query: AuditLogListQuery) -> RepositoryResult<(usize, Vec<AuditLog>)>;
}

pub trait ComplianceWriter {
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

pub trait RoleplayReader {
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
    /// Sessions newest first, optionally narrowed to one operator.
    fn list_sessions(
        &self,
        hub_id: HubId,
        operator_id: Option<OperatorId>,
    ) -> RepositoryResult<Vec<RoleplaySession>>;
}

pub trait RoleplayWriter {
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
