//! Operators: the people placing calls, keyed by email within a hub.

use serde::{Deserialize, Serialize};

use crate::domain::types::{
    EmailAddress, HubId, OperatorId, OperatorName, PhoneNumber, TypeConstraintError, non_empty_opt,
};

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Operator {
    pub id: OperatorId,
    pub hub_id: HubId,
    pub name: OperatorName,
    pub email: EmailAddress,
    pub phone: Option<PhoneNumber>,
    pub is_active: bool,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct NewOperator {
    pub hub_id: HubId,
    pub name: OperatorName,
    pub email: EmailAddress,
    pub phone: Option<PhoneNumber>,
}

impl NewOperator {
    #[must_use]
    pub fn new(
        hub_id: HubId,
        name: OperatorName,
        email: EmailAddress,
        phone: Option<PhoneNumber>,
    ) -> Self {
        Self {
            hub_id,
            name,
            email,
            phone,
        }
    }

    /// Validates raw values coming from forms or identity claims.
    pub fn try_new(
        hub_id: i32,
        name: impl Into<String>,
        email: impl Into<String>,
        phone: Option<String>,
    ) -> Result<Self, TypeConstraintError> {
        Ok(Self {
            hub_id: HubId::new(hub_id)?,
            name: OperatorName::new(name)?,
            email: EmailAddress::new(email)?,
            phone: non_empty_opt(phone).map(PhoneNumber::new).transpose()?,
        })
    }
}

/// Operator together with the number of upcoming appointments.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct OperatorWorkload {
    pub operator: Operator,
    pub upcoming_appointments: usize,
}
