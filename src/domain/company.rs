//! Prospective companies called by operators.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::types::{
    CompanyId, CompanyName, EmailAddress, HubId, PhoneNumber, TypeConstraintError, WebUrl,
    non_empty_opt,
};

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Company {
    pub id: CompanyId,
    pub hub_id: HubId,
    pub name: CompanyName,
    pub email: Option<EmailAddress>,
    pub phone: Option<PhoneNumber>,
    pub address: Option<String>,
    pub industry: Option<String>,
    pub website: Option<WebUrl>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Contact details shared by the create and update payloads.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct CompanyDetails {
    pub name: CompanyName,
    pub email: Option<EmailAddress>,
    pub phone: Option<PhoneNumber>,
    pub address: Option<String>,
    pub industry: Option<String>,
    pub website: Option<WebUrl>,
}

impl CompanyDetails {
    /// Validates raw form/CSV values, treating blank optional values as absent.
    pub fn try_new(
        name: String,
        email: Option<String>,
        phone: Option<String>,
        address: Option<String>,
        industry: Option<String>,
        website: Option<String>,
    ) -> Result<Self, TypeConstraintError> {
        Ok(Self {
            name: CompanyName::new(name)?,
            email: non_empty_opt(email).map(EmailAddress::new).transpose()?,
            phone: non_empty_opt(phone).map(PhoneNumber::new).transpose()?,
            address: non_empty_opt(address),
            industry: non_empty_opt(industry),
            website: non_empty_opt(website).map(WebUrl::new).transpose()?,
        })
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct NewCompany {
    pub hub_id: HubId,
    pub details: CompanyDetails,
}

impl NewCompany {
    #[must_use]
    pub fn new(hub_id: HubId, details: CompanyDetails) -> Self {
        Self { hub_id, details }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct UpdateCompany {
    pub details: CompanyDetails,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_optional_values_become_none() {
        let details = CompanyDetails::try_new(
            " Acme ".to_string(),
            Some("  ".to_string()),
            Some(String::new()),
            Some(" Tokyo ".to_string()),
            None,
            Some(" ".to_string()),
        )
        .expect("valid details");

        assert_eq!(details.name.as_str(), "Acme");
        assert_eq!(details.email, None);
        assert_eq!(details.phone, None);
        assert_eq!(details.address.as_deref(), Some("Tokyo"));
        assert_eq!(details.website, None);
    }

    #[test]
    fn invalid_email_is_rejected() {
        let result = CompanyDetails::try_new(
            "Acme".to_string(),
            Some("nope".to_string()),
            None,
            None,
            None,
            None,
        );
        assert_eq!(result, Err(TypeConstraintError::InvalidEmail));
    }
}
