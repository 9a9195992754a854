//! DTOs for subsidy reports, compliance documents and audit logs.

use serde::Deserialize;

use crate::domain::company::Company;
use crate::domain::compliance::{
    AuditLog, ComplianceDocumentListing, StatusTotal, SubsidyListing,
};
use crate::pagination::Paginated;

pub struct SubsidyPageData {
    pub reports: Vec<SubsidyListing>,
    pub totals: Vec<StatusTotal>,
    pub companies: Vec<Company>,
}

pub struct DocumentsPageData {
    pub documents: Vec<ComplianceDocumentListing>,
    pub companies: Vec<Company>,
}

#[derive(Debug, Default, Deserialize)]
pub struct AuditLogsQuery {
    pub page: Option<usize>,
}

pub struct AuditLogsPageData {
    pub logs: Paginated<AuditLog>,
}
