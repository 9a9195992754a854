use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::company::{
    Company as DomainCompany, CompanyDetails, NewCompany as DomainNewCompany,
    UpdateCompany as DomainUpdateCompany,
};
use crate::domain::types::{
    CompanyId, CompanyName, EmailAddress, HubId, PhoneNumber, TypeConstraintError, WebUrl,
};

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::companies)]
/// Diesel model for [`crate::domain::company::Company`].
pub struct Company {
    pub id: i32,
    pub hub_id: i32,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub industry: Option<String>,
    pub website: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::companies)]
/// Insertable form of [`Company`].
pub struct NewCompany<'a> {
    pub hub_id: i32,
    pub name: &'a str,
    pub email: Option<&'a str>,
    pub phone: Option<&'a str>,
    pub address: Option<&'a str>,
    pub industry: Option<&'a str>,
    pub website: Option<&'a str>,
}

#[derive(AsChangeset)]
#[diesel(table_name = crate::schema::companies)]
#[diesel(treat_none_as_null = true)]
/// Data used when updating a [`Company`] record.
pub struct UpdateCompany<'a> {
    pub name: &'a str,
    pub email: Option<&'a str>,
    pub phone: Option<&'a str>,
    pub address: Option<&'a str>,
    pub industry: Option<&'a str>,
    pub website: Option<&'a str>,
    pub updated_at: NaiveDateTime,
}

impl TryFrom<Company> for DomainCompany {
    type Error = TypeConstraintError;

    fn try_from(company: Company) -> Result<Self, Self::Error> {
        Ok(Self {
            id: CompanyId::try_from(company.id)?,
            hub_id: HubId::try_from(company.hub_id)?,
            name: CompanyName::new(company.name)?,
            email: company.email.map(EmailAddress::new).transpose()?,
            phone: company.phone.map(PhoneNumber::new).transpose()?,
            address: company.address,
            industry: company.industry,
            website: company.website.map(WebUrl::new).transpose()?,
            created_at: company.created_at,
            updated_at: company.updated_at,
        })
    }
}

fn detail_refs(details: &CompanyDetails) -> [Option<&str>; 5] {
    [
        details.email.as_ref().map(EmailAddress::as_str),
        details.phone.as_ref().map(PhoneNumber::as_str),
        details.address.as_deref(),
        details.industry.as_deref(),
        details.website.as_ref().map(WebUrl::as_str),
    ]
}

impl<'a> From<&'a DomainNewCompany> for NewCompany<'a> {
    fn from(company: &'a DomainNewCompany) -> Self {
        let [email, phone, address, industry, website] = detail_refs(&company.details);
        Self {
            hub_id: company.hub_id.get(),
            name: company.details.name.as_str(),
            email,
            phone,
            address,
            industry,
            website,
        }
    }
}

impl<'a> UpdateCompany<'a> {
    pub fn new(company: &'a DomainUpdateCompany, updated_at: NaiveDateTime) -> Self {
        let [email, phone, address, industry, website] = detail_refs(&company.details);
        Self {
            name: company.details.name.as_str(),
            email,
            phone,
            address,
            industry,
            website,
            updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn new_company_borrows_domain_values() {
        let details = CompanyDetails::try_new(
            "Acme".to_string(),
            Some("Info@Acme.jp".to_string()),
            None,
            None,
            Some("SaaS".to_string()),
            None,
        )
        .expect("valid details");
        let domain = DomainNewCompany::new(HubId::new(3).expect("valid hub"), details);
        let new: NewCompany = (&domain).into();
        assert_eq!(new.hub_id, 3);
        assert_eq!(new.name, "Acme");
        assert_eq!(new.email, Some("info@acme.jp"));
        assert_eq!(new.phone, None);
        assert_eq!(new.industry, Some("SaaS"));
    }

    #[test]
    fn db_company_into_domain() {
        let now = Utc::now().naive_utc();
        let db = Company {
            id: 1,
            hub_id: 2,
            name: "Acme".into(),
            email: Some("a@b.jp".into()),
            phone: None,
            address: Some("Tokyo".into()),
            industry: None,
            website: Some("https://acme.jp".into()),
            created_at: now,
            updated_at: now,
        };
        let domain = DomainCompany::try_from(db).expect("valid company");
        assert_eq!(domain.id.get(), 1);
        assert_eq!(domain.email.map(String::from), Some("a@b.jp".to_string()));
        assert_eq!(domain.website.map(String::from), Some("https://acme.jp".to_string()));
    }

    #[test]
    fn invalid_row_is_rejected() {
        let now = Utc::now().naive_utc();
        let db = Company {
            id: 0,
            hub_id: 2,
            name: "Acme".into(),
            email: None,
            phone: None,
            address: None,
            industry: None,
            website: None,
            created_at: now,
            updated_at: now,
        };
        assert!(DomainCompany::try_from(db).is_err());
    }
}
