//! Forms driving the schedule optimizer.

use chrono::NaiveDate;
use serde::Deserialize;

use crate::{
    domain::types::{CompanyId, OperatorId},
    forms::{FormError, parse_date},
};

/// Multi-select form; repeated `company_ids`/`operator_ids` keys are parsed
/// with `serde_html_form`.
#[derive(Debug, Deserialize)]
pub struct OptimizeScheduleForm {
    pub date: String,
    #[serde(default)]
    pub company_ids: Vec<i32>,
    /// Empty means every active operator.
    #[serde(default)]
    pub operator_ids: Vec<i32>,
}

pub struct OptimizeSchedulePayload {
    pub date: NaiveDate,
    pub company_ids: Vec<CompanyId>,
    pub operator_ids: Vec<OperatorId>,
}

impl TryFrom<&[u8]> for OptimizeSchedulePayload {
    type Error = FormError;

    fn try_from(body: &[u8]) -> Result<Self, Self::Error> {
        let form: OptimizeScheduleForm = serde_html_form::from_bytes(body)
            .map_err(|err| FormError::InvalidValue(err.to_string()))?;
        Self::try_from(form)
    }
}

/// Validates ids and drops repeats, keeping submission order.
fn distinct_ids<T, E>(
    raw: Vec<i32>,
    new: impl Fn(i32) -> Result<T, E>,
) -> Result<Vec<T>, FormError>
where
    T: PartialEq,
    FormError: From<E>,
{
    let mut ids = Vec::with_capacity(raw.len());
    for id in raw {
        let id = new(id)?;
        if !ids.contains(&id) {
            ids.push(id);
        }
    }
    Ok(ids)
}

impl TryFrom<OptimizeScheduleForm> for OptimizeSchedulePayload {
    type Error = FormError;

    fn try_from(form: OptimizeScheduleForm) -> Result<Self, Self::Error> {
        // A company is called once per day and an operator holds one company per slot.
        let company_ids = distinct_ids(form.company_ids, CompanyId::new)?;
        if company_ids.is_empty() {
            return Err(FormError::InvalidValue(
                "企業を1社以上選択してください".to_string(),
            ));
        }
        let operator_ids = distinct_ids(form.operator_ids, OperatorId::new)?;

        Ok(Self {
            date: parse_date(&form.date)?,
            company_ids,
            operator_ids,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct ScheduleDateForm {
    pub date: String,
}

impl TryFrom<ScheduleDateForm> for NaiveDate {
    type Error = FormError;

    fn try_from(form: ScheduleDateForm) -> Result<Self, Self::Error> {
        parse_date(&form.date)
    }
}
