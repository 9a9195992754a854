//! Calling schedule: fixed time-window slot assignment and the grid view.

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::company::Company;
use crate::domain::operator::Operator;
use crate::domain::types::{CompanyId, HubId, OperatorId, SlotId, TimeOfDay};

/// Length of one schedule slot.
pub const SLOT_MINUTES: u32 = 30;

/// Calling windows as `[start, end)` minute offsets: 10:00–12:00 and 14:00–16:00.
pub const CALL_WINDOWS: [(u32, u32); 2] = [(10 * 60, 12 * 60), (14 * 60, 16 * 60)];

/// First and last column of the grid page: 09:00–18:00.
pub const GRID_START_MINUTES: u32 = 9 * 60;
pub const GRID_END_MINUTES: u32 = 18 * 60;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ScheduleSlot {
    pub id: SlotId,
    pub hub_id: HubId,
    pub operator_id: OperatorId,
    pub company_id: Option<CompanyId>,
    pub slot_date: NaiveDate,
    pub start_time: TimeOfDay,
    pub end_time: TimeOfDay,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct NewScheduleSlot {
    pub hub_id: HubId,
    pub operator_id: OperatorId,
    pub company_id: Option<CompanyId>,
    pub slot_date: NaiveDate,
    pub start_time: TimeOfDay,
    pub end_time: TimeOfDay,
}

/// Every `(start, end)` slot of the calling windows in chronological order.
pub fn window_slots() -> Vec<(TimeOfDay, TimeOfDay)> {
    CALL_WINDOWS
        .iter()
        .flat_map(|&(start, end)| {
            (start..end)
                .step_by(SLOT_MINUTES as usize)
                .filter_map(|minute| {
                    Some((
                        TimeOfDay::from_minutes(minute)?,
                        TimeOfDay::from_minutes(minute + SLOT_MINUTES)?,
                    ))
                })
        })
        .collect()
}

/// Output of [`optimize`].
#[derive(Clone, Debug, PartialEq)]
pub struct OptimizedSchedule {
    pub slots: Vec<NewScheduleSlot>,
    /// Companies left over once every operator's windows are full.
    pub unassigned: Vec<CompanyId>,
}

/// Assigns companies to operators round-robin.
///
/// Company `i` goes to operator `i % n` at that operator's window slot
/// `i / n`.
pub fn optimize(
    hub_id: HubId,
    date: NaiveDate,
    operators: &[OperatorId],
    companies: &[CompanyId],
) -> OptimizedSchedule {
    if operators.is_empty() {
        return OptimizedSchedule {
            slots: Vec::new(),
            unassigned: companies.to_vec(),
        };
    }

    let windows = window_slots();
    let mut slots = Vec::new();
    let mut unassigned = Vec::new();

    for (index, company_id) in companies.iter().enumerate() {
        let operator_id = operators[index % operators.len()];
        match windows.get(index / operators.len()) {
            Some((start, end)) => slots.push(NewScheduleSlot {
                hub_id,
                operator_id,
                company_id: Some(*company_id),
                slot_date: date,
                start_time: start.clone(),
                end_time: end.clone(),
            }),
            None => unassigned.push(*company_id),
        }
    }

    OptimizedSchedule { slots, unassigned }
}

/// Column headings of the grid page.
pub fn grid_times() -> Vec<TimeOfDay> {
    (GRID_START_MINUTES..GRID_END_MINUTES)
        .step_by(SLOT_MINUTES as usize)
        .filter_map(TimeOfDay::from_minutes)
        .collect()
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct GridBlock {
    pub slot_id: SlotId,
    pub company_name: Option<String>,
    pub start_time: TimeOfDay,
    pub end_time: TimeOfDay,
    /// `true` on the first column covered by the slot.
    pub is_start: bool,
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct GridCell {
    pub time: TimeOfDay,
    pub block: Option<GridBlock>,
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct GridRow {
    pub operator: Operator,
    pub cells: Vec<GridCell>,
}

/// Positions each slot on its operator's row.
///
/// A cell is covered when `start_time <= time < end_time`; the comparison is
/// done on the `HH:MM` text.
pub fn build_grid(
    operators: &[Operator],
    slots: &[ScheduleSlot],
    companies: &[Company],
) -> Vec<GridRow> {
    let names: HashMap<CompanyId, &str> = companies
        .iter()
        .map(|c| (c.id, c.name.as_str()))
        .collect();
    let times = grid_times();

    operators
        .iter()
        .map(|operator| {
            let own: Vec<&ScheduleSlot> = slots
                .iter()
                .filter(|slot| slot.operator_id == operator.id)
                .collect();
            let cells = times
                .iter()
                .map(|time| {
                    let block = own
                        .iter()
                        .find(|slot| {
                            slot.start_time.as_str() <= time.as_str()
                                && time.as_str() < slot.end_time.as_str()
                        })
                        .map(|slot| GridBlock {
                            slot_id: slot.id,
                            company_name: slot
                                .company_id
                                .and_then(|id| names.get(&id).map(|name| name.to_string())),
                            start_time: slot.start_time.clone(),
                            end_time: slot.end_time.clone(),
                            is_start: slot.start_time == *time,
                        });
                    GridCell {
                        time: time.clone(),
                        block,
                    }
                })
                .collect();
            GridRow {
                operator: operator.clone(),
                cells,
            }
        })
        .collect()
}
