//! DTOs for call recording, quality and sentiment pages.

use crate::domain::call::{Call, CallListing, GoldenCall, OperatorAverage, SentimentSummary};
use crate::domain::company::Company;
use crate::domain::operator::Operator;

pub struct CallsPageData {
    pub calls: Vec<CallListing>,
    pub companies: Vec<Company>,
    pub operators: Vec<Operator>,
    pub can_pick_operator: bool,
}

/// Scored calls ranked by quality together with per-operator averages.
pub struct QualityPageData {
    pub ranked: Vec<CallListing>,
    pub averages: Vec<OperatorAverage>,
}

pub struct SentimentPageData {
    pub summary: SentimentSummary,
}

pub struct GoldenCallsPageData {
    pub golden_calls: Vec<(GoldenCall, Call)>,
}
