use chrono::NaiveDate;
use diesel::prelude::*;

use crate::domain::schedule::{NewScheduleSlot as DomainNewSlot, ScheduleSlot as DomainSlot};
use crate::domain::types::{
    CompanyId, HubId, OperatorId, SlotId, TimeOfDay, TypeConstraintError,
};

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::schedule_slots)]
/// Diesel model for [`crate::domain::schedule::ScheduleSlot`].
pub struct ScheduleSlot {
    pub id: i32,
    pub hub_id: i32,
    pub operator_id: i32,
    pub company_id: Option<i32>,
    pub slot_date: NaiveDate,
    pub start_time: String,
    pub end_time: String,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::schedule_slots)]
/// Insertable form of [`ScheduleSlot`].
pub struct NewScheduleSlot<'a> {
    pub hub_id: i32,
    pub operator_id: i32,
    pub company_id: Option<i32>,
    pub slot_date: NaiveDate,
    pub start_time: &'a str,
    pub end_time: &'a str,
}

impl TryFrom<ScheduleSlot> for DomainSlot {
    type Error = TypeConstraintError;

    fn try_from(slot: ScheduleSlot) -> Result<Self, Self::Error> {
        Ok(Self {
            id: SlotId::try_from(slot.id)?,
            hub_id: HubId::try_from(slot.hub_id)?,
            operator_id: OperatorId::try_from(slot.operator_id)?,
            company_id: slot.company_id.map(CompanyId::try_from).transpose()?,
            slot_date: slot.slot_date,
            start_time: TimeOfDay::new(slot.start_time)?,
            end_time: TimeOfDay::new(slot.end_time)?,
        })
    }
}

impl<'a> From<&'a DomainNewSlot> for NewScheduleSlot<'a> {
    fn from(slot: &'a DomainNewSlot) -> Self {
        Self {
            hub_id: slot.hub_id.get(),
            operator_id: slot.operator_id.get(),
            company_id: slot.company_id.map(CompanyId::get),
            slot_date: slot.slot_date,
            start_time: slot.start_time.as_str(),
            end_time: slot.end_time.as_str(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_time_is_rejected() {
        let slot = ScheduleSlot {
            id: 1,
            hub_id: 1,
            operator_id: 1,
            company_id: None,
            slot_date: NaiveDate::from_ymd_opt(2025, 6, 2).expect("valid date"),
            start_time: "9:00".into(),
            end_time: "09:30".into(),
        };
        assert_eq!(
            DomainSlot::try_from(slot),
            Err(TypeConstraintError::InvalidTime)
        );
    }
}
