use crate::domain::company::Company;
use crate::domain::intelligence::{CrawlJob, NewsTrigger};

/// Data required to render the crawl jobs and news triggers page.
pub struct IntelligencePageData {
    pub jobs: Vec<CrawlJob>,
    pub triggers: Vec<NewsTrigger>,
    pub companies: Vec<Company>,
}

/// Counts reported by a batch crawl run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CrawlRunSummary {
    pub done: usize,
    pub failed: usize,
    pub matched_triggers: usize,
}
