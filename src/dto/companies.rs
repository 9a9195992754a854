//! DTOs used by the company pages.

use serde::Deserialize;

use crate::domain::appointment::AppointmentListing;
use crate::domain::call::CallListing;
use crate::domain::company::Company;
use crate::domain::nurturing::{DocumentSend, DocumentTemplate};
use crate::domain::operator::Operator;
use crate::domain::rejection::RejectionInsight;
use crate::pagination::Paginated;

/// Query parameters accepted by the companies index page.
#[derive(Debug, Default, Deserialize)]
pub struct CompaniesQuery {
    /// Optional search string entered by the user.
    #[serde(alias = "q")]
    pub search: Option<String>,
    /// Page number requested by the user interface.
    pub page: Option<usize>,
}

/// Data required to render the companies index template.
pub struct CompaniesPageData {
    pub companies: Paginated<Company>,
    /// Search query echoed back to the template when present.
    pub search_query: Option<String>,
}

/// Everything shown on a single company page.
pub struct CompanyPageData {
    pub company: Company,
    pub appointments: Vec<AppointmentListing>,
    pub calls: Vec<CallListing>,
    pub insights: Vec<RejectionInsight>,
    pub sends: Vec<DocumentSend>,
    pub templates: Vec<DocumentTemplate>,
    pub operators: Vec<Operator>,
}
