//! Subsidy reports, compliance documents and the audit trail.

use std::collections::HashMap;

use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::domain::company::Company;
use crate::domain::types::{
    AuditLogId, CompanyId, ComplianceDocumentId, HubId, NonEmptyString, SubsidyReportId, Title,
    TypeConstraintError, WebUrl, Yen,
};

/// Documents expiring within this many days are flagged.
pub const EXPIRY_WARNING_DAYS: i64 = 30;

text_enum!(
    /// Review lifecycle of a subsidy report.
    SubsidyStatus {
        Draft,
        Submitted,
        Approved,
        Rejected,
    }
);

impl SubsidyStatus {
    pub fn next_statuses(self) -> &'static [SubsidyStatus] {
        match self {
            SubsidyStatus::Draft => &[SubsidyStatus::Submitted],
            SubsidyStatus::Submitted => &[SubsidyStatus::Approved, SubsidyStatus::Rejected],
            SubsidyStatus::Rejected => &[SubsidyStatus::Draft],
            SubsidyStatus::Approved => &[],
        }
    }

    pub fn can_transition_to(self, next: SubsidyStatus) -> bool {
        self.next_statuses().contains(&next)
    }

    pub fn label(self) -> &'static str {
        match self {
            SubsidyStatus::Draft => "下書き",
            SubsidyStatus::Submitted => "提出済",
            SubsidyStatus::Approved => "承認",
            SubsidyStatus::Rejected => "差戻し",
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct SubsidyReport {
    pub id: SubsidyReportId,
    pub hub_id: HubId,
    pub company_id: CompanyId,
    pub program: Title,
    pub amount: Yen,
    pub status: SubsidyStatus,
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct NewSubsidyReport {
    pub hub_id: HubId,
    pub company_id: CompanyId,
    pub program: Title,
    pub amount: Yen,
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
}

impl NewSubsidyReport {
    pub fn try_new(
        hub_id: HubId,
        company_id: CompanyId,
        program: Title,
        amount: Yen,
        period_start: NaiveDate,
        period_end: NaiveDate,
    ) -> Result<Self, TypeConstraintError> {
        if period_end < period_start {
            return Err(TypeConstraintError::InvalidValue(
                "period end precedes period start".to_string(),
            ));
        }
        Ok(Self {
            hub_id,
            company_id,
            program,
            amount,
            period_start,
            period_end,
        })
    }
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct SubsidyListing {
    pub report: SubsidyReport,
    pub company_name: String,
    pub next_statuses: Vec<SubsidyStatus>,
}

pub fn build_subsidy_listings(
    reports: Vec<SubsidyReport>,
    companies: &[Company],
) -> Vec<SubsidyListing> {
    let names: HashMap<CompanyId, &str> = companies
        .iter()
        .map(|c| (c.id, c.name.as_str()))
        .collect();
    reports
        .into_iter()
        .filter_map(|report| {
            Some(SubsidyListing {
                company_name: names.get(&report.company_id)?.to_string(),
                next_statuses: report.status.next_statuses().to_vec(),
                report,
            })
        })
        .collect()
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct StatusTotal {
    pub status: SubsidyStatus,
    pub label: &'static str,
    pub count: usize,
    pub amount: Yen,
}

/// Count and summed amount for every status, in lifecycle order.
pub fn subsidy_totals(reports: &[SubsidyReport]) -> Vec<StatusTotal> {
    SubsidyStatus::ALL
        .iter()
        .map(|&status| {
            let matching = reports.iter().filter(|r| r.status == status);
            let (count, amount) = matching.fold((0, Yen::default()), |(count, sum), r| {
                (count + 1, sum.saturating_add(r.amount))
            });
            StatusTotal {
                status,
                label: status.label(),
                count,
                amount,
            }
        })
        .collect()
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ComplianceDocument {
    pub id: ComplianceDocumentId,
    pub hub_id: HubId,
    pub company_id: Option<CompanyId>,
    pub title: Title,
    pub url: WebUrl,
    pub doc_type: NonEmptyString,
    pub expires_on: Option<NaiveDate>,
    pub created_at: NaiveDateTime,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct NewComplianceDocument {
    pub hub_id: HubId,
    pub company_id: Option<CompanyId>,
    pub title: Title,
    pub url: WebUrl,
    pub doc_type: NonEmptyString,
    pub expires_on: Option<NaiveDate>,
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct ComplianceDocumentListing {
    pub document: ComplianceDocument,
    pub company_name: Option<String>,
    pub expiring: bool,
    pub expired: bool,
}

impl ComplianceDocument {
    pub fn is_expired(&self, today: NaiveDate) -> bool {
        self.expires_on.is_some_and(|d| d < today)
    }

    /// Still valid but expiring within [`EXPIRY_WARNING_DAYS`].
    pub fn is_expiring(&self, today: NaiveDate) -> bool {
        self.expires_on
            .is_some_and(|d| d >= today && d <= today + Duration::days(EXPIRY_WARNING_DAYS))
    }
}

pub fn build_document_listings(
    documents: Vec<ComplianceDocument>,
    companies: &[Company],
    today: NaiveDate,
) -> Vec<ComplianceDocumentListing> {
    let names: HashMap<CompanyId, &str> = companies
        .iter()
        .map(|c| (c.id, c.name.as_str()))
        .collect();
    documents
        .into_iter()
        .map(|document| ComplianceDocumentListing {
            company_name: document
                .company_id
                .and_then(|id| names.get(&id).map(|n| n.to_string())),
            expiring: document.is_expiring(today),
            expired: document.is_expired(today),
            document,
        })
        .collect()
}

text_enum!(
    /// Kind of mutation recorded in the audit trail.
    AuditAction {
        Create,
        Update,
        Delete,
        Import,
        StatusChange,
    }
);

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct AuditLog {
    pub id: AuditLogId,
    pub hub_id: HubId,
    pub actor_email: String,
    pub action: AuditAction,
    pub entity: String,
    pub entity_id: Option<i32>,
    pub details: Option<String>,
    pub created_at: NaiveDateTime,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct NewAuditLog {
    pub hub_id: HubId,
    pub actor_email: String,
    pub action: AuditAction,
    pub entity: String,
    pub entity_id: Option<i32>,
    pub details: Option<String>,
}

impl NewAuditLog {
    pub fn new(
        hub_id: HubId,
        actor_email: impl Into<String>,
        action: AuditAction,
        entity: impl Into<String>,
        entity_id: Option<i32>,
        details: Option<String>,
    ) -> Self {
        Self {
            hub_id,
            actor_email: actor_email.into(),
            action,
            entity: entity.into(),
            entity_id,
            details,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    fn report(id: i32, status: SubsidyStatus, amount: i64) -> SubsidyReport {
        let ts = date(2025, 6, 1).and_hms_opt(0, 0, 0).expect("valid datetime");
        SubsidyReport {
            id: SubsidyReportId::new(id).expect("valid id"),
            hub_id: HubId::new(1).expect("valid hub"),
            company_id: CompanyId::new(1).expect("valid id"),
            program: Title::new("IT導入補助金").expect("valid program"),
            amount: Yen::new(amount).expect("valid amount"),
            status,
            period_start: date(2025, 4, 1),
            period_end: date(2026, 3, 31),
            created_at: ts,
            updated_at: ts,
        }
    }

    fn document(expires_on: Option<NaiveDate>) -> ComplianceDocument {
        ComplianceDocument {
            id: ComplianceDocumentId::new(1).expect("valid id"),
            hub_id: HubId::new(1).expect("valid hub"),
            company_id: None,
            title: Title::new("個人情報保護方針").expect("valid title"),
            url: WebUrl::new("https://example.com/policy.pdf").expect("valid url"),
            doc_type: NonEmptyString::new("policy").expect("valid type"),
            expires_on,
            created_at: date(2025, 1, 1).and_hms_opt(0, 0, 0).expect("valid datetime"),
        }
    }

    #[test]
    fn subsidy_lifecycle() {
        use SubsidyStatus::*;
        assert!(Draft.can_transition_to(Submitted));
        assert!(!Draft.can_transition_to(Approved));
        assert!(Submitted.can_transition_to(Rejected));
        assert!(Rejected.can_transition_to(Draft));
        assert!(Approved.next_statuses().is_empty());
    }

    #[test]
    fn period_must_be_ordered() {
        let result = NewSubsidyReport::try_new(
            HubId::new(1).expect("valid hub"),
            CompanyId::new(1).expect("valid id"),
            Title::new("x").expect("valid"),
            Yen::default(),
            date(2025, 5, 1),
            date(2025, 4, 1),
        );
        assert!(result.is_err());
    }

    #[test]
    fn totals_cover_every_status() {
        let reports = vec![
            report(1, SubsidyStatus::Draft, 100),
            report(2, SubsidyStatus::Approved, 300),
            report(3, SubsidyStatus::Approved, 200),
        ];
        let totals = subsidy_totals(&reports);
        assert_eq!(totals.len(), 4);
        assert_eq!(totals[0].count, 1);
        assert_eq!(totals[1].count, 0);
        assert_eq!(totals[2].amount.get(), 500);
        assert_eq!(totals[2].count, 2);
    }

    #[test]
    fn expiry_flags() {
        let today = date(2025, 6, 1);
        let listings = build_document_listings(
            vec![
                document(Some(date(2025, 5, 31))),
                document(Some(date(2025, 6, 1))),
                document(Some(date(2025, 7, 1))),
                document(Some(date(2025, 7, 2))),
                document(None),
            ],
            &[],
            today,
        );
        let flags: Vec<(bool, bool)> = listings.iter().map(|l| (l.expiring, l.expired)).collect();
        assert_eq!(
            flags,
            vec![
                (false, true),
                (true, false),
                (true, false),
                (false, false),
                (false, false),
            ]
        );
    }
}
