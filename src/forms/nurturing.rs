//! Forms for document templates, manual sends and follow-up rules.

use serde::Deserialize;
use validator::Validate;

use crate::{
    domain::{
        call::CallOutcome,
        nurturing::{MAX_DELAY_DAYS, NewDocumentTemplate, NewFollowupRule, UpdateDocumentTemplate},
        types::{CompanyId, HubId, NonEmptyString, TemplateId, Title},
    },
    forms::{FormError, checkbox, parse_choice},
};

#[derive(Debug, Deserialize, Validate)]
pub struct TemplateForm {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(length(min = 1, max = 300))]
    pub subject: String,
    #[validate(length(min = 1))]
    pub body: String,
}

pub struct TemplatePayload {
    pub name: Title,
    pub subject: NonEmptyString,
    pub body: NonEmptyString,
}

impl TryFrom<TemplateForm> for TemplatePayload {
    type Error = FormError;

    fn try_from(form: TemplateForm) -> Result<Self, Self::Error> {
        form.validate()?;
        Ok(Self {
            name: Title::new(form.name)?,
            subject: NonEmptyString::sanitized(form.subject)?,
            body: NonEmptyString::sanitized(form.body)?,
        })
    }
}

impl TemplatePayload {
    pub fn into_domain(self, hub_id: HubId) -> NewDocumentTemplate {
        NewDocumentTemplate {
            hub_id,
            name: self.name,
            subject: self.subject,
            body: self.body,
        }
    }

    pub fn into_update(self) -> UpdateDocumentTemplate {
        UpdateDocumentTemplate {
            name: self.name,
            subject: self.subject,
            body: self.body,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SendDocumentForm {
    pub template_id: i32,
    pub company_id: i32,
}

pub struct SendDocumentPayload {
    pub template_id: TemplateId,
    pub company_id: CompanyId,
}

impl TryFrom<SendDocumentForm> for SendDocumentPayload {
    type Error = FormError;

    fn try_from(form: SendDocumentForm) -> Result<Self, Self::Error> {
        Ok(Self {
            template_id: TemplateId::new(form.template_id)?,
            company_id: CompanyId::new(form.company_id)?,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct FollowupRuleForm {
    pub template_id: i32,
    pub trigger_outcome: String,
    pub delay_days: i32,
    #[serde(default)]
    pub is_active: Option<String>,
}

pub struct FollowupRulePayload {
    pub template_id: TemplateId,
    pub trigger_outcome: CallOutcome,
    pub delay_days: i32,
    pub is_active: bool,
}

impl TryFrom<FollowupRuleForm> for FollowupRulePayload {
    type Error = FormError;

    fn try_from(form: FollowupRuleForm) -> Result<Self, Self::Error> {
        if !(0..=MAX_DELAY_DAYS).contains(&form.delay_days) {
            return Err(FormError::InvalidValue(format!(
                "日数は0〜{MAX_DELAY_DAYS}で入力してください"
            )));
        }
        Ok(Self {
            template_id: TemplateId::new(form.template_id)?,
            trigger_outcome: parse_choice(&form.trigger_outcome)?,
            delay_days: form.delay_days,
            is_active: checkbox(form.is_active.as_deref()),
        })
    }
}

impl FollowupRulePayload {
    pub fn into_domain(self, hub_id: HubId) -> Result<NewFollowupRule, FormError> {
        Ok(NewFollowupRule::try_new(
            hub_id,
            self.template_id,
            self.trigger_outcome,
            self.delay_days,
            self.is_active,
        )?)
    }
}
