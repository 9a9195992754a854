use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::nurturing::{
    DocumentSend as DomainDocumentSend, DocumentTemplate as DomainTemplate,
    FollowupRule as DomainFollowupRule, NewDocumentSend as DomainNewDocumentSend,
    NewDocumentTemplate as DomainNewTemplate, NewFollowupRule as DomainNewFollowupRule,
    UpdateDocumentTemplate as DomainUpdateTemplate,
};
use crate::domain::types::{
    CompanyId, DocumentSendId, FollowupRuleId, HubId, NonEmptyString, TemplateId, Title,
    TypeConstraintError,
};

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::document_templates)]
/// Diesel model for [`crate::domain::nurturing::DocumentTemplate`].
pub struct DocumentTemplate {
    pub id: i32,
    pub hub_id: i32,
    pub name: String,
    pub subject: String,
    pub body: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::document_templates)]
pub struct NewDocumentTemplate<'a> {
    pub hub_id: i32,
    pub name: &'a str,
    pub subject: &'a str,
    pub body: &'a str,
}

#[derive(AsChangeset)]
#[diesel(table_name = crate::schema::document_templates)]
pub struct UpdateDocumentTemplate<'a> {
    pub name: &'a str,
    pub subject: &'a str,
    pub body: &'a str,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::document_sends)]
/// Diesel model for [`crate::domain::nurturing::DocumentSend`].
pub struct DocumentSend {
    pub id: i32,
    pub hub_id: i32,
    pub template_id: i32,
    pub company_id: i32,
    pub recipient: String,
    pub status: String,
    pub error: Option<String>,
    pub sent_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::document_sends)]
pub struct NewDocumentSend<'a> {
    pub hub_id: i32,
    pub template_id: i32,
    pub company_id: i32,
    pub recipient: &'a str,
    pub status: &'a str,
    pub error: Option<&'a str>,
    pub sent_at: NaiveDateTime,
}

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::followup_rules)]
/// Diesel model for [`crate::domain::nurturing::FollowupRule`].
pub struct FollowupRule {
    pub id: i32,
    pub hub_id: i32,
    pub template_id: i32,
    pub trigger_outcome: String,
    pub delay_days: i32,
    pub is_active: bool,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::followup_rules)]
pub struct NewFollowupRule<'a> {
    pub hub_id: i32,
    pub template_id: i32,
    pub trigger_outcome: &'a str,
    pub delay_days: i32,
    pub is_active: bool,
}

impl TryFrom<DocumentTemplate> for DomainTemplate {
    type Error = TypeConstraintError;

    fn try_from(template: DocumentTemplate) -> Result<Self, Self::Error> {
        Ok(Self {
            id: TemplateId::try_from(template.id)?,
            hub_id: HubId::try_from(template.hub_id)?,
            name: Title::new(template.name)?,
            subject: NonEmptyString::new(template.subject)?,
            body: NonEmptyString::new(template.body)?,
            created_at: template.created_at,
            updated_at: template.updated_at,
        })
    }
}

impl<'a> From<&'a DomainNewTemplate> for NewDocumentTemplate<'a> {
    fn from(template: &'a DomainNewTemplate) -> Self {
        Self {
            hub_id: template.hub_id.get(),
            name: template.name.as_str(),
            subject: template.subject.as_str(),
            body: template.body.as_str(),
        }
    }
}

impl<'a> UpdateDocumentTemplate<'a> {
    pub fn new(template: &'a DomainUpdateTemplate, updated_at: NaiveDateTime) -> Self {
        Self {
            name: template.name.as_str(),
            subject: template.subject.as_str(),
            body: template.body.as_str(),
            updated_at,
        }
    }
}

impl TryFrom<DocumentSend> for DomainDocumentSend {
    type Error = TypeConstraintError;

    fn try_from(send: DocumentSend) -> Result<Self, Self::Error> {
        Ok(Self {
            id: DocumentSendId::try_from(send.id)?,
            hub_id: HubId::try_from(send.hub_id)?,
            template_id: TemplateId::try_from(send.template_id)?,
            company_id: CompanyId::try_from(send.company_id)?,
            recipient: send.recipient,
            status: send.status.parse()?,
            error: send.error,
            sent_at: send.sent_at,
        })
    }
}

impl<'a> From<&'a DomainNewDocumentSend> for NewDocumentSend<'a> {
    fn from(send: &'a DomainNewDocumentSend) -> Self {
        Self {
            hub_id: send.hub_id.get(),
            template_id: send.template_id.get(),
            company_id: send.company_id.get(),
            recipient: send.recipient.as_str(),
            status: send.status.as_str(),
            error: send.error.as_deref(),
            sent_at: send.sent_at,
        }
    }
}

impl TryFrom<FollowupRule> for DomainFollowupRule {
    type Error = TypeConstraintError;

    fn try_from(rule: FollowupRule) -> Result<Self, Self::Error> {
        Ok(Self {
            id: FollowupRuleId::try_from(rule.id)?,
            hub_id: HubId::try_from(rule.hub_id)?,
            template_id: TemplateId::try_from(rule.template_id)?,
            trigger_outcome: rule.trigger_outcome.parse()?,
            delay_days: rule.delay_days,
            is_active: rule.is_active,
        })
    }
}

impl<'a> From<&'a DomainNewFollowupRule> for NewFollowupRule<'a> {
    fn from(rule: &'a DomainNewFollowupRule) -> Self {
        Self {
            hub_id: rule.hub_id.get(),
            template_id: rule.template_id.get(),
            trigger_outcome: rule.trigger_outcome.as_str(),
            delay_days: rule.delay_days,
            is_active: rule.is_active,
        }
    }
}
