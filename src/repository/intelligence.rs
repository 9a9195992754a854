//! Repository implementation for crawl jobs and news triggers.

use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::{
    domain::{
        intelligence::{
            CrawlCompletion, CrawlJob, CrawlStatus, NewCrawlJob, NewNewsTrigger, NewsTrigger,
        },
        types::{CrawlJobId, HubId, NewsTriggerId},
    },
    models::intelligence::{
        CrawlJob as DbCrawlJob, FinishCrawlJob, NewCrawlJob as DbNewCrawlJob,
        NewNewsTrigger as DbNewNewsTrigger, NewsTrigger as DbNewsTrigger,
    },
    repository::{
        DieselRepository, IntelligenceReader, IntelligenceWriter,
        errors::{RepositoryError, RepositoryResult},
    },
};

impl IntelligenceReader for DieselRepository {
    fn get_crawl_job_by_id(
        &self,
        id: CrawlJobId,
        hub_id: HubId,
    ) -> RepositoryResult<Option<CrawlJob>> {
        use crate::schema::crawl_jobs;

        let mut conn = self.conn()?;
        let job = crawl_jobs::table
            .filter(crawl_jobs::id.eq(id.get()))
            .filter(crawl_jobs::hub_id.eq(hub_id.get()))
            .first::<DbCrawlJob>(&mut conn)
            .optional()?;

        job.map(|db| CrawlJob::try_from(db).map_err(RepositoryError::from))
            .transpose()
    }

    fn list_crawl_jobs(&self, hub_id: HubId) -> RepositoryResult<Vec<CrawlJob>> {
        use crate::schema::crawl_jobs;

        let mut conn = self.conn()?;
        crawl_jobs::table
            .filter(crawl_jobs::hub_id.eq(hub_id.get()))
            .order((crawl_jobs::created_at.desc(), crawl_jobs::id.desc()))
            .load::<DbCrawlJob>(&mut conn)?
            .into_iter()
            .map(|db| CrawlJob::try_from(db).map_err(RepositoryError::from))
            .collect()
    }

    fn list_pending_crawl_jobs(&self, limit: i64) -> RepositoryResult<Vec<CrawlJob>> {
        use crate::schema::crawl_jobs;

        let mut conn = self.conn()?;
        crawl_jobs::table
            .filter(crawl_jobs::status.eq(CrawlStatus::Pending.as_str()))
            .order((crawl_jobs::created_at.asc(), crawl_jobs::id.asc()))
            .limit(limit)
            .load::<DbCrawlJob>(&mut conn)?
            .into_iter()
            .map(|db| CrawlJob::try_from(db).map_err(RepositoryError::from))
            .collect()
    }

    fn list_news_triggers(&self, hub_id: HubId) -> RepositoryResult<Vec<NewsTrigger>> {
        use crate::schema::news_triggers;

        let mut conn = self.conn()?;
        news_triggers::table
            .filter(news_triggers::hub_id.eq(hub_id.get()))
            .order((news_triggers::keyword.asc(), news_triggers::id.asc()))
            .load::<DbNewsTrigger>(&mut conn)?
            .into_iter()
            .map(|db| NewsTrigger::try_from(db).map_err(RepositoryError::from))
            .collect()
    }
}

impl IntelligenceWriter for DieselRepository {
    fn create_crawl_job(&self, job: &NewCrawlJob) -> RepositoryResult<CrawlJob> {
        use crate::schema::crawl_jobs;

        let mut conn = self.conn()?;
        let insertable: DbNewCrawlJob = job.into();

        let db_job = diesel::insert_into(crawl_jobs::table)
            .values(&insertable)
            .get_result::<DbCrawlJob>(&mut conn)?;

        CrawlJob::try_from(db_job).map_err(RepositoryError::from)
    }

    fn finish_crawl_job(
        &self,
        id: CrawlJobId,
        completion: &CrawlCompletion,
    ) -> RepositoryResult<CrawlJob> {
        use crate::schema::crawl_jobs;

        let mut conn = self.conn()?;
        let changes: FinishCrawlJob = completion.into();

        let db_job = diesel::update(crawl_jobs::table.find(id.get()))
            .set(&changes)
            .get_result::<DbCrawlJob>(&mut conn)?;

        CrawlJob::try_from(db_job).map_err(RepositoryError::from)
    }

    fn delete_crawl_job(&self, id: CrawlJobId, hub_id: HubId) -> RepositoryResult<()> {
        use crate::schema::crawl_jobs;

        let mut conn = self.conn()?;
        let deleted = diesel::delete(
            crawl_jobs::table
                .filter(crawl_jobs::id.eq(id.get()))
                .filter(crawl_jobs::hub_id.eq(hub_id.get())),
        )
        .execute(&mut conn)?;

        if deleted == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    fn create_news_trigger(&self, trigger: &NewNewsTrigger) -> RepositoryResult<NewsTrigger> {
        use crate::schema::news_triggers;

        let mut conn = self.conn()?;
        let insertable: DbNewNewsTrigger = trigger.into();

        let db_trigger = diesel::insert_into(news_triggers::table)
            .values(&insertable)
            .get_result::<DbNewsTrigger>(&mut conn)?;

        NewsTrigger::try_from(db_trigger).map_err(RepositoryError::from)
    }

    fn set_news_trigger_active(
        &self,
        id: NewsTriggerId,
        hub_id: HubId,
        is_active: bool,
    ) -> RepositoryResult<NewsTrigger> {
        use crate::schema::news_triggers;

        let mut conn = self.conn()?;
        let db_trigger = diesel::update(
            news_triggers::table
                .filter(news_triggers::id.eq(id.get()))
                .filter(news_triggers::hub_id.eq(hub_id.get())),
        )
        .set(news_triggers::is_active.eq(is_active))
        .get_result::<DbNewsTrigger>(&mut conn)?;

        NewsTrigger::try_from(db_trigger).map_err(RepositoryError::from)
    }

    fn mark_news_triggers_matched(
        &self,
        ids: &[NewsTriggerId],
        headline: &str,
        matched_at: NaiveDateTime,
    ) -> RepositoryResult<usize> {
        use crate::schema::news_triggers;

        if ids.is_empty() {
            return Ok(0);
        }

        let mut conn = self.conn()?;
        let raw_ids: Vec<i32> = ids.iter().map(|id| id.get()).collect();

        let updated =
            diesel::update(news_triggers::table.filter(news_triggers::id.eq_any(raw_ids)))
                .set((
                    news_triggers::last_matched_at.eq(Some(matched_at)),
                    news_triggers::last_headline.eq(Some(headline)),
                ))
                .execute(&mut conn)?;

        Ok(updated)
    }

    fn delete_news_trigger(&self, id: NewsTriggerId, hub_id: HubId) -> RepositoryResult<()> {
        use crate::schema::news_triggers;

        let mut conn = self.conn()?;
        let deleted = diesel::delete(
            news_triggers::table
                .filter(news_triggers::id.eq(id.get()))
                .filter(news_triggers::hub_id.eq(hub_id.get())),
        )
        .execute(&mut conn)?;

        if deleted == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
