use diesel::prelude::*;

use crate::domain::operator::{NewOperator as DomainNewOperator, Operator as DomainOperator};
use crate::domain::types::{
    EmailAddress, HubId, OperatorId, OperatorName, PhoneNumber, TypeConstraintError,
};

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::operators)]
/// Diesel model for [`crate::domain::operator::Operator`].
pub struct Operator {
    pub id: i32,
    pub hub_id: i32,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub is_active: bool,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::operators)]
/// Insertable form of [`Operator`].
pub struct NewOperator<'a> {
    pub hub_id: i32,
    pub name: &'a str,
    pub email: &'a str,
    pub phone: Option<&'a str>,
}

#[derive(AsChangeset)]
#[diesel(table_name = crate::schema::operators)]
/// Columns refreshed when an operator is upserted.
pub struct UpdateOperator<'a> {
    pub name: &'a str,
    pub phone: Option<&'a str>,
}

impl TryFrom<Operator> for DomainOperator {
    type Error = TypeConstraintError;

    fn try_from(operator: Operator) -> Result<Self, Self::Error> {
        Ok(Self {
            id: OperatorId::try_from(operator.id)?,
            hub_id: HubId::try_from(operator.hub_id)?,
            name: OperatorName::new(operator.name)?,
            email: EmailAddress::new(operator.email)?,
            phone: operator.phone.map(PhoneNumber::new).transpose()?,
            is_active: operator.is_active,
        })
    }
}

impl<'a> From<&'a DomainNewOperator> for NewOperator<'a> {
    fn from(operator: &'a DomainNewOperator) -> Self {
        Self {
            hub_id: operator.hub_id.get(),
            name: operator.name.as_str(),
            email: operator.email.as_str(),
            phone: operator.phone.as_ref().map(PhoneNumber::as_str),
        }
    }
}

impl<'a> From<&NewOperator<'a>> for UpdateOperator<'a> {
    fn from(operator: &NewOperator<'a>) -> Self {
        Self {
            name: operator.name,
            phone: operator.phone,
        }
    }
}
