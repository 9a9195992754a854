//! DTOs for document templates and follow-up automation.

use crate::domain::call::CallOutcome;
use crate::domain::nurturing::{DocumentTemplate, FollowupRule};

pub struct TemplatesPageData {
    pub templates: Vec<DocumentTemplate>,
}

pub struct FollowupRulesPageData {
    pub rules: Vec<FollowupRule>,
    pub templates: Vec<DocumentTemplate>,
    pub outcomes: &'static [CallOutcome],
}

/// Counts reported after sending due follow-ups for one hub.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FollowupRunSummary {
    pub sent: usize,
    pub failed: usize,
    /// Due follow-ups left unsent: no company email, a missing template or
    /// an unconfigured email integration.
    pub skipped: usize,
}
