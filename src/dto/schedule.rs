use chrono::NaiveDate;
use serde::Deserialize;

use crate::domain::company::Company;
use crate::domain::operator::Operator;
use crate::domain::schedule::GridRow;
use crate::domain::types::{CompanyId, TimeOfDay};

#[derive(Debug, Default, Deserialize)]
pub struct ScheduleQuery {
    pub date: Option<String>,
}

/// Data required to render the schedule grid.
pub struct SchedulePageData {
    pub date: NaiveDate,
    pub times: Vec<TimeOfDay>,
    pub rows: Vec<GridRow>,
    pub companies: Vec<Company>,
    pub operators: Vec<Operator>,
}

/// Result of an optimizer run.
#[derive(Debug, PartialEq)]
pub struct OptimizeSummary {
    pub date: NaiveDate,
    pub assigned: usize,
    pub unassigned: Vec<CompanyId>,
}
