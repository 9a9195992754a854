//! Crawl jobs, page text extraction and keyword news triggers.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::types::{CompanyId, CrawlJobId, HubId, Keyword, NewsTriggerId, WebUrl};

/// Maximum number of characters of page text kept on a crawl job.
pub const MAX_CONTENT_CHARS: usize = 20_000;

text_enum!(
    CrawlStatus {
        Pending,
        Done,
        Failed,
    }
);

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct CrawlJob {
    pub id: CrawlJobId,
    pub hub_id: HubId,
    pub url: WebUrl,
    pub status: CrawlStatus,
    pub title: Option<String>,
    pub content: Option<String>,
    pub error: Option<String>,
    pub created_at: NaiveDateTime,
    pub finished_at: Option<NaiveDateTime>,
}

impl CrawlJob {
    /// Headline recorded on matched triggers: the page title, else the URL.
    pub fn headline(&self) -> String {
        self.title
            .clone()
            .unwrap_or_else(|| self.url.to_string())
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct NewCrawlJob {
    pub hub_id: HubId,
    pub url: WebUrl,
}

/// Terminal state written back to a crawl job.
#[derive(Clone, Debug, PartialEq)]
pub struct CrawlCompletion {
    pub status: CrawlStatus,
    pub title: Option<String>,
    pub content: Option<String>,
    pub error: Option<String>,
    pub finished_at: NaiveDateTime,
}

impl CrawlCompletion {
    pub fn done(page: PageSummary, finished_at: NaiveDateTime) -> Self {
        Self {
            status: CrawlStatus::Done,
            title: page.title,
            content: Some(page.content),
            error: None,
            finished_at,
        }
    }

    pub fn failed(error: impl Into<String>, finished_at: NaiveDateTime) -> Self {
        Self {
            status: CrawlStatus::Failed,
            title: None,
            content: None,
            error: Some(error.into()),
            finished_at,
        }
    }
}

/// Title and visible text pulled out of an HTML page.
#[derive(Clone, Debug, PartialEq)]
pub struct PageSummary {
    pub title: Option<String>,
    pub content: String,
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Text of the first `<title>` element, whitespace collapsed.
pub fn extract_title(html: &str) -> Option<String> {
    let lower = html.to_ascii_lowercase();
    let open = lower.find("<title")?;
    let start = open + lower[open..].find('>')? + 1;
    let end = start + lower[start..].find("</title")?;
    let title = collapse_whitespace(&html[start..end]);
    (!title.is_empty()).then_some(title)
}

/// Removes markup, dropping `<script>` and `<style>` bodies entirely.
pub fn strip_tags(html: &str) -> String {
    let lower = html.to_ascii_lowercase();
    let mut out = String::with_capacity(html.len());
    let mut i = 0;

    while i < html.len() {
        let rest = &html[i..];
        if rest.starts_with('<') {
            let lower_rest = &lower[i..];
            let block = ["script", "style"]
                .iter()
                .find(|tag| lower_rest[1..].starts_with(**tag));
            let skip = match block {
                Some(tag) => lower_rest
                    .find(&format!("</{tag}"))
                    .and_then(|close| lower_rest[close..].find('>').map(|gt| close + gt + 1)),
                None => lower_rest.find('>').map(|gt| gt + 1),
            };
            match skip {
                Some(len) => {
                    i += len;
                    out.push(' ');
                }
                // Unterminated tag: nothing visible follows.
                None => break,
            }
        } else if let Some(ch) = rest.chars().next() {
            out.push(ch);
            i += ch.len_utf8();
        }
    }

    collapse_whitespace(&out)
}

/// Builds the stored summary of a fetched page.
pub fn summarize_page(html: &str) -> PageSummary {
    let content: String = strip_tags(html).chars().take(MAX_CONTENT_CHARS).collect();
    PageSummary {
        title: extract_title(html),
        content,
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct NewsTrigger {
    pub id: NewsTriggerId,
    pub hub_id: HubId,
    pub company_id: CompanyId,
    pub keyword: Keyword,
    pub is_active: bool,
    pub last_matched_at: Option<NaiveDateTime>,
    pub last_headline: Option<String>,
}

impl NewsTrigger {
    /// Case-insensitive keyword lookup; inactive triggers never match.
    pub fn matches(&self, content: &str) -> bool {
        self.is_active && content.to_lowercase().contains(&self.keyword.to_lowercase())
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct NewNewsTrigger {
    pub hub_id: HubId,
    pub company_id: CompanyId,
    pub keyword: Keyword,
}

/// Identifiers of the triggers fired by a finished crawl.
pub fn matching_triggers(triggers: &[NewsTrigger], job: &CrawlJob) -> Vec<NewsTriggerId> {
    let Some(content) = job.content.as_deref() else {
        return Vec::new();
    };
    triggers
        .iter()
        .filter(|t| t.matches(content))
        .map(|t| t.id)
        .collect()
}
