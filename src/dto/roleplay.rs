use crate::domain::roleplay::{
    OperatorTrainingScore, RoleplayScenario, SessionListing,
};

/// Scenarios, visible sessions and per-operator averages.
pub struct RoleplayPageData {
    pub scenarios: Vec<RoleplayScenario>,
    pub sessions: Vec<SessionListing>,
    pub averages: Vec<OperatorTrainingScore>,
}

pub struct SessionPageData {
    pub session: SessionListing,
    pub scenario: RoleplayScenario,
    /// The current user may submit a transcript.
    pub can_submit: bool,
    pub can_grade: bool,
}
