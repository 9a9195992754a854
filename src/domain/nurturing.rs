//! Nurturing documents: templates, recorded sends and follow-up rules.

use std::collections::HashSet;

use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::domain::call::{Call, CallOutcome};
use crate::domain::types::{
    CallId, CompanyId, DocumentSendId, FollowupRuleId, HubId, NonEmptyString, OperatorId,
    TemplateId, Title, TypeConstraintError,
};

pub const MAX_DELAY_DAYS: i32 = 365;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct DocumentTemplate {
    pub id: TemplateId,
    pub hub_id: HubId,
    pub name: Title,
    pub subject: NonEmptyString,
    pub body: NonEmptyString,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct NewDocumentTemplate {
    pub hub_id: HubId,
    pub name: Title,
    pub subject: NonEmptyString,
    pub body: NonEmptyString,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct UpdateDocumentTemplate {
    pub name: Title,
    pub subject: NonEmptyString,
    pub body: NonEmptyString,
}

/// Values substituted into `{{company}}`, `{{operator}}` and `{{date}}`.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderContext<'a> {
    pub company: &'a str,
    pub operator: &'a str,
    pub date: NaiveDate,
}

/// Subject and body after placeholder substitution.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct RenderedDocument {
    pub subject: String,
    pub body: String,
}

/// Replaces known placeholders; anything else in braces is kept verbatim.
pub fn render_placeholders(text: &str, ctx: &RenderContext<'_>) -> String {
    text.replace("{{company}}", ctx.company)
        .replace("{{operator}}", ctx.operator)
        .replace("{{date}}", &ctx.date.format("%Y-%m-%d").to_string())
}

impl DocumentTemplate {
    pub fn render(&self, ctx: &RenderContext<'_>) -> RenderedDocument {
        RenderedDocument {
            subject: render_placeholders(&self.subject, ctx),
            body: render_placeholders(&self.body, ctx),
        }
    }
}

text_enum!(
    /// Delivery result of a document send.
    SendStatus {
        Sent,
        Failed,
    }
);

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct DocumentSend {
    pub id: DocumentSendId,
    pub hub_id: HubId,
    pub template_id: TemplateId,
    pub company_id: CompanyId,
    pub recipient: String,
    pub status: SendStatus,
    pub error: Option<String>,
    pub sent_at: NaiveDateTime,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct NewDocumentSend {
    pub hub_id: HubId,
    pub template_id: TemplateId,
    pub company_id: CompanyId,
    pub recipient: String,
    pub status: SendStatus,
    pub error: Option<String>,
    pub sent_at: NaiveDateTime,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct FollowupRule {
    pub id: FollowupRuleId,
    pub hub_id: HubId,
    pub template_id: TemplateId,
    pub trigger_outcome: CallOutcome,
    pub delay_days: i32,
    pub is_active: bool,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct NewFollowupRule {
    pub hub_id: HubId,
    pub template_id: TemplateId,
    pub trigger_outcome: CallOutcome,
    pub delay_days: i32,
    pub is_active: bool,
}

impl NewFollowupRule {
    pub fn try_new(
        hub_id: HubId,
        template_id: TemplateId,
        trigger_outcome: CallOutcome,
        delay_days: i32,
        is_active: bool,
    ) -> Result<Self, TypeConstraintError> {
        if !(0..=MAX_DELAY_DAYS).contains(&delay_days) {
            return Err(TypeConstraintError::InvalidValue(format!(
                "delay {delay_days} is outside 0..={MAX_DELAY_DAYS} days"
            )));
        }
        Ok(Self {
            hub_id,
            template_id,
            trigger_outcome,
            delay_days,
            is_active,
        })
    }
}

/// A template that should now be sent to a company because of an earlier call.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct DueFollowup {
    pub rule_id: FollowupRuleId,
    pub template_id: TemplateId,
    pub company_id: CompanyId,
    pub operator_id: OperatorId,
    pub call_id: CallId,
    pub called_at: NaiveDateTime,
}

/// Pairs active rules with the calls they fire on.
///
/// A call is due once `called_at + delay_days <= now` and no send of the
/// rule's template to the call's company exists at or after the call. At most
/// one follow-up is produced per `(company, template)`, taken from the oldest
/// qualifying call.
pub fn due_followups(
    rules: &[FollowupRule],
    calls: &[Call],
    sends: &[DocumentSend],
    now: NaiveDateTime,
) -> Vec<DueFollowup> {
    let mut ordered: Vec<&Call> = calls.iter().collect();
    ordered.sort_by_key(|c| (c.called_at, c.id));

    let mut seen: HashSet<(CompanyId, TemplateId)> = HashSet::new();
    let mut due = Vec::new();

    for rule in rules.iter().filter(|r| r.is_active) {
        let delay = Duration::days(i64::from(rule.delay_days));
        for call in &ordered {
            if call.outcome != rule.trigger_outcome || call.called_at + delay > now {
                continue;
            }
            let already_sent = sends.iter().any(|s| {
                s.template_id == rule.template_id
                    && s.company_id == call.company_id
                    && s.sent_at >= call.called_at
            });
            if already_sent || !seen.insert((call.company_id, rule.template_id)) {
                continue;
            }
            due.push(DueFollowup {
                rule_id: rule.id,
                template_id: rule.template_id,
                company_id: call.company_id,
                operator_id: call.operator_id,
                call_id: call.id,
                called_at: call.called_at,
            });
        }
    }
    due
}
