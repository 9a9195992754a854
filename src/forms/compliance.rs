//! Forms for subsidy reports and compliance documents.

use chrono::NaiveDate;
use serde::Deserialize;

use crate::{
    domain::{
        compliance::{NewComplianceDocument, NewSubsidyReport, SubsidyStatus},
        types::{CompanyId, HubId, NonEmptyString, Title, WebUrl, Yen},
    },
    forms::{FormError, parse_choice, parse_date, parse_optional_date, parse_optional_id},
};

#[derive(Debug, Deserialize)]
pub struct SubsidyReportForm {
    pub company_id: i32,
    pub program: String,
    pub amount: i64,
    pub period_start: String,
    pub period_end: String,
}

pub struct SubsidyReportPayload {
    pub company_id: CompanyId,
    pub program: Title,
    pub amount: Yen,
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
}

impl TryFrom<SubsidyReportForm> for SubsidyReportPayload {
    type Error = FormError;

    fn try_from(form: SubsidyReportForm) -> Result<Self, Self::Error> {
        Ok(Self {
            company_id: CompanyId::new(form.company_id)?,
            program: Title::new(ammonia::clean(&form.program))?,
            amount: Yen::new(form.amount)?,
            period_start: parse_date(&form.period_start)?,
            period_end: parse_date(&form.period_end)?,
        })
    }
}

impl SubsidyReportPayload {
    pub fn into_domain(self, hub_id: HubId) -> Result<NewSubsidyReport, FormError> {
        NewSubsidyReport::try_new(
            hub_id,
            self.company_id,
            self.program,
            self.amount,
            self.period_start,
            self.period_end,
        )
        .map_err(|_| FormError::InvalidValue("期間の終了日が開始日より前です".to_string()))
    }
}

#[derive(Debug, Deserialize)]
pub struct SubsidyStatusForm {
    pub status: String,
}

impl TryFrom<SubsidyStatusForm> for SubsidyStatus {
    type Error = FormError;

    fn try_from(form: SubsidyStatusForm) -> Result<Self, Self::Error> {
        parse_choice(&form.status)
    }
}

#[derive(Debug, Deserialize)]
pub struct ComplianceDocumentForm {
    pub title: String,
    pub url: String,
    pub doc_type: String,
    #[serde(default)]
    pub company_id: Option<String>,
    #[serde(default)]
    pub expires_on: Option<String>,
}

pub struct ComplianceDocumentPayload {
    pub company_id: Option<CompanyId>,
    pub title: Title,
    pub url: WebUrl,
    pub doc_type: NonEmptyString,
    pub expires_on: Option<NaiveDate>,
}

impl TryFrom<ComplianceDocumentForm> for ComplianceDocumentPayload {
    type Error = FormError;

    fn try_from(form: ComplianceDocumentForm) -> Result<Self, Self::Error> {
        Ok(Self {
            company_id: parse_optional_id(form.company_id.as_deref())?
                .map(CompanyId::new)
                .transpose()?,
            title: Title::new(ammonia::clean(&form.title))?,
            url: WebUrl::new(form.url)?,
            doc_type: NonEmptyString::sanitized(form.doc_type)?,
            expires_on: parse_optional_date(form.expires_on.as_deref())?,
        })
    }
}

impl ComplianceDocumentPayload {
    pub fn into_domain(self, hub_id: HubId) -> NewComplianceDocument {
        NewComplianceDocument {
            hub_id,
            company_id: self.company_id,
            title: self.title,
            url: self.url,
            doc_type: self.doc_type,
            expires_on: self.expires_on,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hub() -> HubId {
        HubId::new(1).expect("valid hub")
    }

    #[test]
    fn report_period_must_be_ordered() {
        let form = SubsidyReportForm {
            company_id: 1,
            program: "IT導入補助金".to_string(),
            amount: 500_000,
            period_start: "2025-07-01".to_string(),
            period_end: "2025-06-30".to_string(),
        };
        let payload = SubsidyReportPayload::try_from(form).expect("valid form");
        assert!(matches!(
            payload.into_domain(hub()),
            Err(FormError::InvalidValue(_))
        ));
    }

    #[test]
    fn negative_amount_is_rejected() {
        let form = SubsidyReportForm {
            company_id: 1,
            program: "IT導入補助金".to_string(),
            amount: -1,
            period_start: "2025-04-01".to_string(),
            period_end: "2025-06-30".to_string(),
        };
        assert!(matches!(
            SubsidyReportPayload::try_from(form),
            Err(FormError::InvalidAmount)
        ));
    }

    #[test]
    fn document_optional_fields_may_be_blank() {
        let form = ComplianceDocumentForm {
            title: "個人情報保護方針".to_string(),
            url: "https://docs.example.com/privacy.pdf".to_string(),
            doc_type: "Policy".to_string(),
            company_id: Some(String::new()),
            expires_on: Some(" ".to_string()),
        };
        let document = ComplianceDocumentPayload::try_from(form)
            .expect("valid form")
            .into_domain(hub());
        assert_eq!(document.company_id, None);
        assert_eq!(document.expires_on, None);
    }

    #[test]
    fn status_choice_is_parsed() {
        let status = SubsidyStatus::try_from(SubsidyStatusForm {
            status: "Submitted".to_string(),
        });
        assert_eq!(status, Ok(SubsidyStatus::Submitted));
    }
}
