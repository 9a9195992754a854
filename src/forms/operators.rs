use serde::Deserialize;
use validator::Validate;

use crate::{
    domain::{
        operator::NewOperator,
        types::{EmailAddress, HubId, OperatorName, PhoneNumber, non_empty_opt},
    },
    forms::FormError,
};

#[derive(Debug, Deserialize, Validate)]
pub struct AddOperatorForm {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
}

pub struct AddOperatorPayload {
    pub name: OperatorName,
    pub email: EmailAddress,
    pub phone: Option<PhoneNumber>,
}

impl TryFrom<AddOperatorForm> for AddOperatorPayload {
    type Error = FormError;

    fn try_from(form: AddOperatorForm) -> Result<Self, Self::Error> {
        form.validate()?;
        Ok(Self {
            name: OperatorName::new(form.name)?,
            email: EmailAddress::new(form.email)?,
            phone: non_empty_opt(form.phone)
                .map(PhoneNumber::new)
                .transpose()?,
        })
    }
}

impl AddOperatorPayload {
    pub fn into_domain(self, hub_id: HubId) -> NewOperator {
        NewOperator::new(hub_id, self.name, self.email, self.phone)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn operator_form_normalizes_contacts() {
        let form = AddOperatorForm {
            name: " Sato ".to_string(),
            email: "Sato@Example.com".to_string(),
            phone: Some("+81 3-1234-5678".to_string()),
        };
        let operator = AddOperatorPayload::try_from(form)
            .expect("valid form")
            .into_domain(HubId::new(2).expect("valid hub"));
        assert_eq!(operator.name.as_str(), "Sato");
        assert_eq!(operator.email.as_str(), "sato@example.com");
        assert_eq!(
            operator.phone.as_ref().map(|p| p.as_str()),
            Some("+81312345678")
        );
    }

    #[test]
    fn operator_form_rejects_bad_email() {
        let form = AddOperatorForm {
            name: "Sato".to_string(),
            email: "sato".to_string(),
            phone: None,
        };
        assert!(matches!(
            AddOperatorPayload::try_from(form),
            Err(FormError::Validation(_))
        ));
    }
}
