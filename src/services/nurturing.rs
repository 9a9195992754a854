//! Nurturing documents: templates, manual sends and follow-up automation.

use chrono::{NaiveDateTime, Utc};

use crate::auth::{AuthenticatedUser, ensure_role};
use crate::domain::call::CallOutcome;
use crate::domain::company::Company;
use crate::domain::compliance::AuditAction;
use crate::domain::nurturing::{
    DocumentSend, DocumentTemplate, FollowupRule, NewDocumentSend, RenderContext, SendStatus,
    due_followups,
};
use crate::domain::types::{FollowupRuleId, HubId, TemplateId};
use crate::dto::nurturing::{FollowupRulesPageData, FollowupRunSummary, TemplatesPageData};
use crate::forms::nurturing::{
    FollowupRuleForm, FollowupRulePayload, SendDocumentForm, SendDocumentPayload, TemplateForm,
    TemplatePayload,
};
use crate::integrations::{EmailClient, EmailMessage, IntegrationError};
use crate::repository::{
    CallListQuery, CallReader, CompanyListQuery, CompanyReader, ComplianceWriter,
    NurturingReader, NurturingWriter, OperatorReader, OperatorWriter,
};
use crate::services::companies::require_company;
use crate::services::compliance::record_audit;
use crate::services::operators::current_operator;
use crate::services::{ServiceError, ServiceResult};
use crate::{SERVICE_ACCESS_ROLE, SERVICE_DIRECTOR_ROLE};

pub fn list_templates<R>(repo: &R, user: &AuthenticatedUser) -> ServiceResult<TemplatesPageData>
where
    R: NurturingReader + ?Sized,
{
    ensure_role(user, SERVICE_DIRECTOR_ROLE)?;

    let hub_id = HubId::new(user.hub_id)?;

    Ok(TemplatesPageData {
        templates: repo.list_templates(hub_id)?,
    })
}

pub fn get_template<R>(
    repo: &R,
    user: &AuthenticatedUser,
    template_id: i32,
) -> ServiceResult<DocumentTemplate>
where
    R: NurturingReader + ?Sized,
{
    ensure_role(user, SERVICE_DIRECTOR_ROLE)?;

    let hub_id = HubId::new(user.hub_id)?;

    repo.get_template_by_id(TemplateId::new(template_id)?, hub_id)?
        .ok_or(ServiceError::NotFound)
}

pub fn create_template<R>(
    repo: &R,
    user: &AuthenticatedUser,
    form: TemplateForm,
) -> ServiceResult<DocumentTemplate>
where
    R: NurturingWriter + ComplianceWriter + ?Sized,
{
    ensure_role(user, SERVICE_DIRECTOR_ROLE)?;

    let payload = TemplatePayload::try_from(form)?;

    let hub_id = HubId::new(user.hub_id)?;

    let template = repo.create_template(&payload.into_domain(hub_id))?;

    record_audit(
        repo,
        user,
        AuditAction::Create,
        "document_template",
        Some(template.id.get()),
        Some(template.name.to_string()),
    );

    Ok(template)
}

pub fn update_template<R>(
    repo: &R,
    user: &AuthenticatedUser,
    template_id: i32,
    form: TemplateForm,
) -> ServiceResult<DocumentTemplate>
where
    R: NurturingWriter + ComplianceWriter + ?Sized,
{
    ensure_role(user, SERVICE_DIRECTOR_ROLE)?;

    let payload = TemplatePayload::try_from(form)?;

    let hub_id = HubId::new(user.hub_id)?;
    let template_id = TemplateId::new(template_id)?;

    let template = repo.update_template(template_id, hub_id, &payload.into_update())?;

    record_audit(
        repo,
        user,
        AuditAction::Update,
        "document_template",
        Some(template.id.get()),
        Some(template.name.to_string()),
    );

    Ok(template)
}

pub fn delete_template<R>(repo: &R, user: &AuthenticatedUser, template_id: i32) -> ServiceResult<()>
where
    R: NurturingWriter + ComplianceWriter + ?Sized,
{
    ensure_role(user, SERVICE_DIRECTOR_ROLE)?;

    let hub_id = HubId::new(user.hub_id)?;
    let template_id = TemplateId::new(template_id)?;

    repo.delete_template(template_id, hub_id)?;

    record_audit(
        repo,
        user,
        AuditAction::Delete,
        "document_template",
        Some(template_id.get()),
        None,
    );

    Ok(())
}

/// Renders `template` for `company`, emails it and records the outcome.
///
/// Delivery failures are stored as a `Failed` send rather than returned. An
/// unconfigured email integration records nothing so the send can be retried.
async fn deliver<R, E>(
    repo: &R,
    email: &E,
    template: &DocumentTemplate,
    company: &Company,
    operator_name: &str,
    now: NaiveDateTime,
) -> ServiceResult<DocumentSend>
where
    R: NurturingWriter + ?Sized,
    E: EmailClient + ?Sized,
{
    let Some(recipient) = company.email.as_ref() else {
        return Err(ServiceError::Form(
            "この企業にはメールアドレスが登録されていません".to_string(),
        ));
    };

    let rendered = template.render(&RenderContext {
        company: company.name.as_str(),
        operator: operator_name,
        date: now.date(),
    });

    let message = EmailMessage {
        to: recipient.to_string(),
        subject: rendered.subject,
        body: rendered.body,
    };

    let (status, error) = match email.send_email(&message).await {
        Ok(()) => (SendStatus::Sent, None),
        Err(err @ IntegrationError::Disabled(_)) => return Err(err.into()),
        Err(err) => {
            log::warn!(
                "Failed to send template {} to company {}: {err}",
                template.id,
                company.id
            );
            (SendStatus::Failed, Some(err.to_string()))
        }
    };

    let send = repo.create_document_send(&NewDocumentSend {
        hub_id: company.hub_id,
        template_id: template.id,
        company_id: company.id,
        recipient: message.to,
        status,
        error,
        sent_at: now,
    })?;

    Ok(send)
}

/// Sends a template to a company on behalf of the signed-in operator.
pub async fn send_document<R, E>(
    repo: &R,
    email: &E,
    user: &AuthenticatedUser,
    form: SendDocumentForm,
) -> ServiceResult<DocumentSend>
where
    R: NurturingReader + NurturingWriter + CompanyReader + OperatorReader + OperatorWriter + ?Sized,
    E: EmailClient + ?Sized,
{
    ensure_role(user, SERVICE_ACCESS_ROLE)?;

    let payload = SendDocumentPayload::try_from(form)?;

    let hub_id = HubId::new(user.hub_id)?;

    let template = repo
        .get_template_by_id(payload.template_id, hub_id)?
        .ok_or_else(|| ServiceError::Form("テンプレートが見つかりません".to_string()))?;
    let company = require_company(repo, hub_id, payload.company_id)?;
    let operator = current_operator(repo, user)?;

    deliver(
        repo,
        email,
        &template,
        &company,
        operator.name.as_str(),
        Utc::now().naive_utc(),
    )
    .await
}

pub fn list_followup_rules<R>(
    repo: &R,
    user: &AuthenticatedUser,
) -> ServiceResult<FollowupRulesPageData>
where
    R: NurturingReader + ?Sized,
{
    ensure_role(user, SERVICE_DIRECTOR_ROLE)?;

    let hub_id = HubId::new(user.hub_id)?;

    Ok(FollowupRulesPageData {
        rules: repo.list_followup_rules(hub_id)?,
        templates: repo.list_templates(hub_id)?,
        outcomes: CallOutcome::ALL,
    })
}

pub fn create_followup_rule<R>(
    repo: &R,
    user: &AuthenticatedUser,
    form: FollowupRuleForm,
) -> ServiceResult<FollowupRule>
where
    R: NurturingReader + NurturingWriter + ComplianceWriter + ?Sized,
{
    ensure_role(user, SERVICE_DIRECTOR_ROLE)?;

    let payload = FollowupRulePayload::try_from(form)?;

    let hub_id = HubId::new(user.hub_id)?;

    if repo.get_template_by_id(payload.template_id, hub_id)?.is_none() {
        return Err(ServiceError::Form(
            "テンプレートが見つかりません".to_string(),
        ));
    }

    let rule = repo.create_followup_rule(&payload.into_domain(hub_id)?)?;

    record_audit(
        repo,
        user,
        AuditAction::Create,
        "followup_rule",
        Some(rule.id.get()),
        Some(format!(
            "{} +{}d -> template {}",
            rule.trigger_outcome, rule.delay_days, rule.template_id
        )),
    );

    Ok(rule)
}

pub fn toggle_followup_rule<R>(
    repo: &R,
    user: &AuthenticatedUser,
    rule_id: i32,
) -> ServiceResult<FollowupRule>
where
    R: NurturingReader + NurturingWriter + ComplianceWriter + ?Sized,
{
    ensure_role(user, SERVICE_DIRECTOR_ROLE)?;

    let hub_id = HubId::new(user.hub_id)?;
    let rule_id = FollowupRuleId::new(rule_id)?;

    let rule = repo
        .list_followup_rules(hub_id)?
        .into_iter()
        .find(|r| r.id == rule_id)
        .ok_or(ServiceError::NotFound)?;

    let rule = repo.set_followup_rule_active(rule.id, hub_id, !rule.is_active)?;

    record_audit(
        repo,
        user,
        AuditAction::StatusChange,
        "followup_rule",
        Some(rule.id.get()),
        Some(format!("is_active={}", rule.is_active)),
    );

    Ok(rule)
}

pub fn delete_followup_rule<R>(repo: &R, user: &AuthenticatedUser, rule_id: i32) -> ServiceResult<()>
where
    R: NurturingWriter + ComplianceWriter + ?Sized,
{
    ensure_role(user, SERVICE_DIRECTOR_ROLE)?;

    let hub_id = HubId::new(user.hub_id)?;
    let rule_id = FollowupRuleId::new(rule_id)?;

    repo.delete_followup_rule(rule_id, hub_id)?;

    record_audit(
        repo,
        user,
        AuditAction::Delete,
        "followup_rule",
        Some(rule_id.get()),
        None,
    );

    Ok(())
}

/// Sends every follow-up of `hub_id` that is due at `now`.
///
/// Failures are logged per follow-up; only loading the hub's data can fail
/// the whole run. Without a configured email integration the remaining
/// follow-ups are counted as skipped and stay due.
pub async fn send_due_followups<R, E>(
    repo: &R,
    email: &E,
    hub_id: HubId,
    now: NaiveDateTime,
) -> ServiceResult<FollowupRunSummary>
where
    R: NurturingReader + NurturingWriter + CallReader + CompanyReader + OperatorReader + ?Sized,
    E: EmailClient + ?Sized,
{
    let rules = repo.list_followup_rules(hub_id)?;
    let calls = repo.list_calls(CallListQuery::new(hub_id))?;
    let sends = repo.list_document_sends(hub_id, None)?;

    let due = due_followups(&rules, &calls, &sends, now);
    if due.is_empty() {
        return Ok(FollowupRunSummary::default());
    }

    let templates = repo.list_templates(hub_id)?;
    let (_, companies) = repo.list_companies(CompanyListQuery::new(hub_id))?;
    let operators = repo.list_operators(hub_id)?;

    let total = due.len();
    let mut summary = FollowupRunSummary::default();
    for (index, item) in due.into_iter().enumerate() {
        let Some(template) = templates.iter().find(|t| t.id == item.template_id) else {
            log::warn!("Follow-up rule {} points to a missing template", item.rule_id);
            summary.skipped += 1;
            continue;
        };
        let Some(company) = companies.iter().find(|c| c.id == item.company_id) else {
            summary.skipped += 1;
            continue;
        };
        if company.email.is_none() {
            log::info!(
                "Skipping follow-up for company {} without email",
                company.id
            );
            summary.skipped += 1;
            continue;
        }
        let operator_name = operators
            .iter()
            .find(|o| o.id == item.operator_id)
            .map(|o| o.name.as_str())
            .unwrap_or_default();

        match deliver(repo, email, template, company, operator_name, now).await {
            Ok(send) if send.status == SendStatus::Sent => summary.sent += 1,
            Ok(_) => summary.failed += 1,
            Err(ServiceError::Integration(IntegrationError::Disabled(service))) => {
                log::warn!("{service} integration is not configured, follow-ups stay due");
                summary.skipped += total - index;
                break;
            }
            Err(err) => {
                log::error!(
                    "Failed to record follow-up for company {}: {err}",
                    company.id
                );
                summary.failed += 1;
            }
        }
    }

    log::info!(
        "Follow-ups for hub {hub_id}: {} sent, {} failed, {} skipped",
        summary.sent,
        summary.failed,
        summary.skipped
    );

    Ok(summary)
}

/// Lets a director trigger the follow-up run for their hub.
pub async fn run_followups_now<R, E>(
    repo: &R,
    email: &E,
    user: &AuthenticatedUser,
) -> ServiceResult<FollowupRunSummary>
where
    R: NurturingReader
        + NurturingWriter
        + CallReader
        + CompanyReader
        + OperatorReader
        + ComplianceWriter
        + ?Sized,
    E: EmailClient + ?Sized,
{
    ensure_role(user, SERVICE_DIRECTOR_ROLE)?;

    let hub_id = HubId::new(user.hub_id)?;

    let summary = send_due_followups(repo, email, hub_id, Utc::now().naive_utc()).await?;

    record_audit(
        repo,
        user,
        AuditAction::Update,
        "followup_run",
        None,
        Some(format!(
            "sent={} failed={} skipped={}",
            summary.sent, summary.failed, summary.skipped
        )),
    );

    Ok(summary)
}

#[cfg(all(test, feature = "test-mocks"))]
mod tests {
    use std::cell::RefCell;

    use super::*;
    use crate::domain::call::Call;
    use crate::domain::types::{CompanyId, DocumentSendId};
    use crate::integrations::IntegrationResult;
    use crate::repository::mock::MockRepository;
    use crate::services::test_support::{
        at, audit_row, director, hub, operator_user, sample_call, sample_company, sample_operator,
        sample_template,
    };

    struct FakeEmail {
        fail: bool,
        configured: bool,
        sent: RefCell<Vec<EmailMessage>>,
    }

    impl FakeEmail {
        fn new(fail: bool) -> Self {
            Self {
                fail,
                configured: true,
                sent: RefCell::new(Vec::new()),
            }
        }

        fn unconfigured() -> Self {
            Self {
                configured: false,
                ..Self::new(false)
            }
        }
    }

    impl EmailClient for FakeEmail {
        async fn send_email(&self, message: &EmailMessage) -> IntegrationResult<()> {
            if !self.configured {
                return Err(IntegrationError::Disabled("email"));
            }
            self.sent.borrow_mut().push(message.clone());
            if self.fail {
                Err(IntegrationError::Status {
                    service: "email",
                    status: 500,
                    body: "boom".to_string(),
                })
            } else {
                Ok(())
            }
        }
    }

    fn stored(new: &NewDocumentSend) -> DocumentSend {
        DocumentSend {
            id: DocumentSendId::new(1).expect("valid id"),
            hub_id: new.hub_id,
            template_id: new.template_id,
            company_id: new.company_id,
            recipient: new.recipient.clone(),
            status: new.status,
            error: new.error.clone(),
            sent_at: new.sent_at,
        }
    }

    fn rule(delay_days: i32) -> FollowupRule {
        FollowupRule {
            id: FollowupRuleId::new(1).expect("valid id"),
            hub_id: hub(),
            template_id: TemplateId::new(3).expect("valid id"),
            trigger_outcome: CallOutcome::Rejected,
            delay_days,
            is_active: true,
        }
    }

    fn call_for(company_id: i32, id: i32) -> Call {
        let mut call = sample_call(id, 7, None);
        call.company_id = CompanyId::new(company_id).expect("valid id");
        call
    }

    #[actix_web::test]
    async fn manual_send_renders_and_records() {
        let mut repo = MockRepository::new();
        repo.expect_get_template_by_id()
            .returning(|id, _| Ok(Some(sample_template(id.get()))));
        repo.expect_get_company_by_id()
            .returning(|id, _| Ok(Some(sample_company(id.get(), "Acme"))));
        repo.expect_get_operator_by_email()
            .returning(|_, _| Ok(Some(sample_operator(7, "op@example.com"))));
        repo.expect_create_document_send()
            .withf(|new| new.status == SendStatus::Sent && new.recipient == "info1@example.jp")
            .times(1)
            .returning(|new| Ok(stored(new)));
        let email = FakeEmail::new(false);

        let form = SendDocumentForm {
            template_id: 3,
            company_id: 1,
        };
        let send = send_document(&repo, &email, &operator_user(), form)
            .await
            .expect("sent");

        assert_eq!(send.status, SendStatus::Sent);
        let sent = email.sent.borrow();
        assert_eq!(sent[0].subject, "Acme様");
        assert!(sent[0].body.starts_with("Operator 7より"));
    }

    #[actix_web::test]
    async fn email_failure_is_recorded_as_failed_send() {
        let mut repo = MockRepository::new();
        repo.expect_get_template_by_id()
            .returning(|id, _| Ok(Some(sample_template(id.get()))));
        repo.expect_get_company_by_id()
            .returning(|id, _| Ok(Some(sample_company(id.get(), "Acme"))));
        repo.expect_get_operator_by_email()
            .returning(|_, _| Ok(Some(sample_operator(7, "op@example.com"))));
        repo.expect_create_document_send()
            .withf(|new| new.status == SendStatus::Failed && new.error.is_some())
            .times(1)
            .returning(|new| Ok(stored(new)));
        let email = FakeEmail::new(true);

        let form = SendDocumentForm {
            template_id: 3,
            company_id: 1,
        };
        let send = send_document(&repo, &email, &operator_user(), form)
            .await
            .expect("recorded");
        assert_eq!(send.status, SendStatus::Failed);
    }

    #[actix_web::test]
    async fn unconfigured_email_fails_send_without_recording() {
        let mut repo = MockRepository::new();
        repo.expect_get_template_by_id()
            .returning(|id, _| Ok(Some(sample_template(id.get()))));
        repo.expect_get_company_by_id()
            .returning(|id, _| Ok(Some(sample_company(id.get(), "Acme"))));
        repo.expect_get_operator_by_email()
            .returning(|_, _| Ok(Some(sample_operator(7, "op@example.com"))));
        repo.expect_create_document_send().times(0);
        let email = FakeEmail::unconfigured();

        let form = SendDocumentForm {
            template_id: 3,
            company_id: 1,
        };
        let result = send_document(&repo, &email, &operator_user(), form).await;
        assert!(matches!(
            result,
            Err(ServiceError::Integration(IntegrationError::Disabled("email")))
        ));
    }

    #[actix_web::test]
    async fn unconfigured_email_leaves_followups_due() {
        let mut repo = MockRepository::new();
        repo.expect_list_followup_rules()
            .returning(|_| Ok(vec![rule(2)]));
        repo.expect_list_calls()
            .returning(|_| Ok(vec![call_for(1, 1), call_for(2, 2)]));
        repo.expect_list_document_sends()
            .returning(|_, _| Ok(Vec::new()));
        repo.expect_list_templates()
            .returning(|_| Ok(vec![sample_template(3)]));
        repo.expect_list_companies().returning(|_| {
            Ok((2, vec![sample_company(1, "Acme"), sample_company(2, "Globex")]))
        });
        repo.expect_list_operators()
            .returning(|_| Ok(vec![sample_operator(7, "op@example.com")]));
        repo.expect_create_document_send().times(0);
        let email = FakeEmail::unconfigured();
        let now = at("2025-06-05", "00:00");

        let summary = send_due_followups(&repo, &email, hub(), now)
            .await
            .expect("run");
        assert_eq!(
            summary,
            FollowupRunSummary {
                sent: 0,
                failed: 0,
                skipped: 2
            }
        );

        let calls = vec![call_for(1, 1), call_for(2, 2)];
        assert_eq!(due_followups(&[rule(2)], &calls, &[], now).len(), 2);
    }

    #[actix_web::test]
    async fn company_without_email_is_a_form_error() {
        let mut repo = MockRepository::new();
        repo.expect_get_template_by_id()
            .returning(|id, _| Ok(Some(sample_template(id.get()))));
        repo.expect_get_company_by_id().returning(|id, _| {
            let mut company = sample_company(id.get(), "Acme");
            company.email = None;
            Ok(Some(company))
        });
        repo.expect_get_operator_by_email()
            .returning(|_, _| Ok(Some(sample_operator(7, "op@example.com"))));
        repo.expect_create_document_send().times(0);
        let email = FakeEmail::new(false);

        let form = SendDocumentForm {
            template_id: 3,
            company_id: 1,
        };
        let result = send_document(&repo, &email, &operator_user(), form).await;
        assert!(matches!(result, Err(ServiceError::Form(_))));
        assert!(email.sent.borrow().is_empty());
    }

    #[actix_web::test]
    async fn due_followups_are_sent_once_per_company() {
        let mut repo = MockRepository::new();
        repo.expect_list_followup_rules()
            .returning(|_| Ok(vec![rule(2)]));
        repo.expect_list_calls().returning(|_| {
            let mut no_email = call_for(2, 3);
            no_email.called_at = at("2025-06-01", "09:00");
            Ok(vec![call_for(1, 1), call_for(1, 2), no_email])
        });
        repo.expect_list_document_sends()
            .returning(|_, _| Ok(Vec::new()));
        repo.expect_list_templates()
            .returning(|_| Ok(vec![sample_template(3)]));
        repo.expect_list_companies().returning(|_| {
            let mut silent = sample_company(2, "Globex");
            silent.email = None;
            Ok((2, vec![sample_company(1, "Acme"), silent]))
        });
        repo.expect_list_operators()
            .returning(|_| Ok(vec![sample_operator(7, "op@example.com")]));
        repo.expect_create_document_send()
            .times(1)
            .returning(|new| Ok(stored(new)));
        let email = FakeEmail::new(false);

        let summary = send_due_followups(&repo, &email, hub(), at("2025-06-05", "00:00"))
            .await
            .expect("run");

        assert_eq!(
            summary,
            FollowupRunSummary {
                sent: 1,
                failed: 0,
                skipped: 1
            }
        );
    }

    #[actix_web::test]
    async fn nothing_due_skips_lookups() {
        let mut repo = MockRepository::new();
        repo.expect_list_followup_rules()
            .returning(|_| Ok(vec![rule(30)]));
        repo.expect_list_calls()
            .returning(|_| Ok(vec![call_for(1, 1)]));
        repo.expect_list_document_sends()
            .returning(|_, _| Ok(Vec::new()));
        repo.expect_list_templates().times(0);
        let email = FakeEmail::new(false);

        let summary = send_due_followups(&repo, &email, hub(), at("2025-06-05", "00:00"))
            .await
            .expect("run");
        assert_eq!(summary, FollowupRunSummary::default());
    }

    #[test]
    fn rule_needs_existing_template() {
        let mut repo = MockRepository::new();
        repo.expect_get_template_by_id().returning(|_, _| Ok(None));
        repo.expect_create_followup_rule().times(0);

        let form = FollowupRuleForm {
            template_id: 9,
            trigger_outcome: "Rejected".to_string(),
            delay_days: 3,
            is_active: Some("on".to_string()),
        };
        assert!(matches!(
            create_followup_rule(&repo, &director(), form),
            Err(ServiceError::Form(_))
        ));
    }

    #[test]
    fn template_crud_is_audited() {
        let mut repo = MockRepository::new();
        repo.expect_create_template()
            .times(1)
            .returning(|_| Ok(sample_template(3)));
        repo.expect_create_audit_log()
            .withf(|log| log.entity == "document_template" && log.entity_id == Some(3))
            .times(1)
            .returning(|log| Ok(audit_row(log)));

        let form = TemplateForm {
            name: "Intro".to_string(),
            subject: "{{company}}様".to_string(),
            body: "本文".to_string(),
        };
        create_template(&repo, &director(), form).expect("created");
    }
}
