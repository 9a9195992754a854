use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::intelligence::{
    CrawlCompletion, CrawlJob as DomainCrawlJob, NewCrawlJob as DomainNewCrawlJob,
    NewNewsTrigger as DomainNewNewsTrigger, NewsTrigger as DomainNewsTrigger,
};
use crate::domain::types::{
    CompanyId, CrawlJobId, HubId, Keyword, NewsTriggerId, TypeConstraintError, WebUrl,
};

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::crawl_jobs)]
/// Diesel model for [`crate::domain::intelligence::CrawlJob`].
pub struct CrawlJob {
    pub id: i32,
    pub hub_id: i32,
    pub url: String,
    pub status: String,
    pub title: Option<String>,
    pub content: Option<String>,
    pub error: Option<String>,
    pub created_at: NaiveDateTime,
    pub finished_at: Option<NaiveDateTime>,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::crawl_jobs)]
pub struct NewCrawlJob<'a> {
    pub hub_id: i32,
    pub url: &'a str,
}

#[derive(AsChangeset)]
#[diesel(table_name = crate::schema::crawl_jobs)]
#[diesel(treat_none_as_null = true)]
/// Columns written when a crawl finishes.
pub struct FinishCrawlJob<'a> {
    pub status: &'a str,
    pub title: Option<&'a str>,
    pub content: Option<&'a str>,
    pub error: Option<&'a str>,
    pub finished_at: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::news_triggers)]
/// Diesel model for [`crate::domain::intelligence::NewsTrigger`].
pub struct NewsTrigger {
    pub id: i32,
    pub hub_id: i32,
    pub company_id: i32,
    pub keyword: String,
    pub is_active: bool,
    pub last_matched_at: Option<NaiveDateTime>,
    pub last_headline: Option<String>,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::news_triggers)]
pub struct NewNewsTrigger<'a> {
    pub hub_id: i32,
    pub company_id: i32,
    pub keyword: &'a str,
}

impl TryFrom<CrawlJob> for DomainCrawlJob {
    type Error = TypeConstraintError;

    fn try_from(job: CrawlJob) -> Result<Self, Self::Error> {
        Ok(Self {
            id: CrawlJobId::try_from(job.id)?,
            hub_id: HubId::try_from(job.hub_id)?,
            url: WebUrl::new(job.url)?,
            status: job.status.parse()?,
            title: job.title,
            content: job.content,
            error: job.error,
            created_at: job.created_at,
            finished_at: job.finished_at,
        })
    }
}

impl<'a> From<&'a DomainNewCrawlJob> for NewCrawlJob<'a> {
    fn from(job: &'a DomainNewCrawlJob) -> Self {
        Self {
            hub_id: job.hub_id.get(),
            url: job.url.as_str(),
        }
    }
}

impl<'a> From<&'a CrawlCompletion> for FinishCrawlJob<'a> {
    fn from(completion: &'a CrawlCompletion) -> Self {
        Self {
            status: completion.status.as_str(),
            title: completion.title.as_deref(),
            content: completion.content.as_deref(),
            error: completion.error.as_deref(),
            finished_at: Some(completion.finished_at),
        }
    }
}

impl TryFrom<NewsTrigger> for DomainNewsTrigger {
    type Error = TypeConstraintError;

    fn try_from(trigger: NewsTrigger) -> Result<Self, Self::Error> {
        Ok(Self {
            id: NewsTriggerId::try_from(trigger.id)?,
            hub_id: HubId::try_from(trigger.hub_id)?,
            company_id: CompanyId::try_from(trigger.company_id)?,
            keyword: Keyword::new(trigger.keyword)?,
            is_active: trigger.is_active,
            last_matched_at: trigger.last_matched_at,
            last_headline: trigger.last_headline,
        })
    }
}

impl<'a> From<&'a DomainNewNewsTrigger> for NewNewsTrigger<'a> {
    fn from(trigger: &'a DomainNewNewsTrigger) -> Self {
        Self {
            hub_id: trigger.hub_id.get(),
            company_id: trigger.company_id.get(),
            keyword: trigger.keyword.as_str(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::intelligence::{CrawlStatus, PageSummary};
    use chrono::Utc;

    #[test]
    fn completion_maps_to_changeset() {
        let now = Utc::now().naive_utc();
        let completion = CrawlCompletion::done(
            PageSummary {
                title: Some("Headline".into()),
                content: "body".into(),
            },
            now,
        );
        let finish: FinishCrawlJob = (&completion).into();
        assert_eq!(finish.status, "Done");
        assert_eq!(finish.title, Some("Headline"));
        assert_eq!(finish.error, None);
        assert_eq!(finish.finished_at, Some(now));
    }

    #[test]
    fn crawl_row_into_domain() {
        let row = CrawlJob {
            id: 1,
            hub_id: 1,
            url: "https://example.com".into(),
            status: "Pending".into(),
            title: None,
            content: None,
            error: None,
            created_at: Utc::now().naive_utc(),
            finished_at: None,
        };
        let job = DomainCrawlJob::try_from(row).expect("valid job");
        assert_eq!(job.status, CrawlStatus::Pending);
    }
}
