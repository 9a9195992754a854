use serde::Deserialize;

use crate::{
    domain::{
        rejection::NewRejectionInsight,
        types::{CallId, CompanyId, HubId, NonEmptyString, non_empty_opt},
    },
    forms::{FormError, parse_optional_id},
};

#[derive(Debug, Deserialize)]
pub struct RejectionForm {
    pub company_id: i32,
    #[serde(default)]
    pub call_id: Option<String>,
    pub project: String,
    /// Free text; bucketed into a category when analysed.
    pub category: String,
    #[serde(default)]
    pub reason: Option<String>,
}

pub struct RejectionPayload {
    pub company_id: CompanyId,
    pub call_id: Option<CallId>,
    pub project: NonEmptyString,
    pub category: NonEmptyString,
    pub reason: Option<String>,
}

impl TryFrom<RejectionForm> for RejectionPayload {
    type Error = FormError;

    fn try_from(form: RejectionForm) -> Result<Self, Self::Error> {
        Ok(Self {
            company_id: CompanyId::new(form.company_id)?,
            call_id: parse_optional_id(form.call_id.as_deref())?
                .map(CallId::new)
                .transpose()?,
            project: NonEmptyString::sanitized(form.project)?,
            category: NonEmptyString::sanitized(form.category)?,
            reason: non_empty_opt(form.reason).map(|r| ammonia::clean(&r)),
        })
    }
}

impl RejectionPayload {
    pub fn into_domain(self, hub_id: HubId) -> NewRejectionInsight {
        NewRejectionInsight {
            hub_id,
            company_id: self.company_id,
            call_id: self.call_id,
            project: self.project,
            category: self.category,
            reason: self.reason,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejection_form_keeps_raw_category() {
        let form = RejectionForm {
            company_id: 5,
            call_id: Some("".to_string()),
            project: "Cloud PBX".to_string(),
            category: "予算がない".to_string(),
            reason: Some("来期に再検討".to_string()),
        };
        let insight = RejectionPayload::try_from(form)
            .expect("valid form")
            .into_domain(HubId::new(1).expect("valid hub"));
        assert_eq!(insight.category.as_str(), "予算がない");
        assert_eq!(insight.call_id, None);
    }

    #[test]
    fn project_is_required() {
        let form = RejectionForm {
            company_id: 5,
            call_id: None,
            project: "<script>x</script>".to_string(),
            category: "Price".to_string(),
            reason: None,
        };
        assert!(matches!(
            RejectionPayload::try_from(form),
            Err(FormError::Required)
        ));
    }
}
