use crate::domain::company::Company;
use crate::domain::rejection::{CategoryStat, IncubationCandidate};

/// Aggregated rejection categories for the analytics dashboard.
pub struct RejectionAnalyticsData {
    pub stats: Vec<CategoryStat>,
    pub total: usize,
    pub companies: Vec<Company>,
}

pub struct IncubationPageData {
    pub candidates: Vec<IncubationCandidate>,
}
