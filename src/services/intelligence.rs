//! Crawl jobs and keyword news triggers.

use chrono::Utc;

use crate::auth::{AuthenticatedUser, ensure_role};
use crate::domain::compliance::AuditAction;
use crate::domain::intelligence::{
    CrawlCompletion, CrawlJob, CrawlStatus, NewsTrigger, matching_triggers, summarize_page,
};
use crate::domain::types::{CrawlJobId, HubId, NewsTriggerId};
use crate::dto::intelligence::{CrawlRunSummary, IntelligencePageData};
use crate::forms::intelligence::{
    CrawlJobForm, CrawlJobPayload, NewsTriggerForm, NewsTriggerPayload,
};
use crate::integrations::PageFetcher;
use crate::repository::{
    CompanyListQuery, CompanyReader, ComplianceWriter, IntelligenceReader, IntelligenceWriter,
};
use crate::services::companies::require_company;
use crate::services::compliance::record_audit;
use crate::services::{ServiceError, ServiceResult};
use crate::SERVICE_DIRECTOR_ROLE;

pub fn load_intelligence<R>(repo: &R, user: &AuthenticatedUser) -> ServiceResult<IntelligencePageData>
where
    R: IntelligenceReader + CompanyReader + ?Sized,
{
    ensure_role(user, SERVICE_DIRECTOR_ROLE)?;

    let hub_id = HubId::new(user.hub_id)?;

    let (_, companies) = repo.list_companies(CompanyListQuery::new(hub_id))?;

    Ok(IntelligencePageData {
        jobs: repo.list_crawl_jobs(hub_id)?,
        triggers: repo.list_news_triggers(hub_id)?,
        companies,
    })
}

pub fn create_crawl_job<R>(
    repo: &R,
    user: &AuthenticatedUser,
    form: CrawlJobForm,
) -> ServiceResult<CrawlJob>
where
    R: IntelligenceWriter + ComplianceWriter + ?Sized,
{
    ensure_role(user, SERVICE_DIRECTOR_ROLE)?;

    let payload = CrawlJobPayload::try_from(form)?;

    let hub_id = HubId::new(user.hub_id)?;

    let job = repo.create_crawl_job(&payload.into_domain(hub_id))?;

    record_audit(
        repo,
        user,
        AuditAction::Create,
        "crawl_job",
        Some(job.id.get()),
        Some(job.url.to_string()),
    );

    Ok(job)
}

pub fn delete_crawl_job<R>(repo: &R, user: &AuthenticatedUser, job_id: i32) -> ServiceResult<()>
where
    R: IntelligenceWriter + ComplianceWriter + ?Sized,
{
    ensure_role(user, SERVICE_DIRECTOR_ROLE)?;

    let hub_id = HubId::new(user.hub_id)?;
    let job_id = CrawlJobId::new(job_id)?;

    repo.delete_crawl_job(job_id, hub_id)?;

    record_audit(
        repo,
        user,
        AuditAction::Delete,
        "crawl_job",
        Some(job_id.get()),
        None,
    );

    Ok(())
}

/// Fetches the job's page, stores the outcome and fires matching triggers.
///
/// Returns the finished job and the number of triggers it matched. Fetch
/// failures end the job as `Failed` instead of surfacing as errors.
pub async fn run_crawl_job<R, F>(
    repo: &R,
    fetcher: &F,
    job: &CrawlJob,
) -> ServiceResult<(CrawlJob, usize)>
where
    R: IntelligenceReader + IntelligenceWriter + ?Sized,
    F: PageFetcher + ?Sized,
{
    let completion = match fetcher.fetch_page(job.url.as_str()).await {
        Ok(html) => CrawlCompletion::done(summarize_page(&html), Utc::now().naive_utc()),
        Err(err) => {
            log::warn!("Crawl job {} failed: {err}", job.id);
            CrawlCompletion::failed(err.to_string(), Utc::now().naive_utc())
        }
    };

    let finished = repo.finish_crawl_job(job.id, &completion).map_err(|err| {
        log::error!("Failed to store crawl job {}: {err}", job.id);
        err
    })?;

    if finished.status != CrawlStatus::Done {
        return Ok((finished, 0));
    }

    let triggers = repo.list_news_triggers(finished.hub_id)?;
    let matched = matching_triggers(&triggers, &finished);
    if matched.is_empty() {
        return Ok((finished, 0));
    }

    let headline = finished.headline();
    let count = repo.mark_news_triggers_matched(&matched, &headline, completion.finished_at)?;
    log::info!(
        "Crawl job {} matched {count} news triggers: {headline}",
        finished.id
    );

    Ok((finished, count))
}

/// Runs one of the hub's jobs immediately, whatever its current status.
pub async fn run_crawl_job_now<R, F>(
    repo: &R,
    fetcher: &F,
    user: &AuthenticatedUser,
    job_id: i32,
) -> ServiceResult<(CrawlJob, usize)>
where
    R: IntelligenceReader + IntelligenceWriter + ComplianceWriter + ?Sized,
    F: PageFetcher + ?Sized,
{
    ensure_role(user, SERVICE_DIRECTOR_ROLE)?;

    let hub_id = HubId::new(user.hub_id)?;
    let job_id = CrawlJobId::new(job_id)?;

    let job = repo
        .get_crawl_job_by_id(job_id, hub_id)?
        .ok_or(ServiceError::NotFound)?;

    let (finished, matched) = run_crawl_job(repo, fetcher, &job).await?;

    record_audit(
        repo,
        user,
        AuditAction::Update,
        "crawl_job",
        Some(finished.id.get()),
        Some(format!("run {} matched={matched}", finished.status)),
    );

    Ok((finished, matched))
}

/// Runs up to `limit` pending jobs across every hub, oldest first.
pub async fn run_pending_crawl_jobs<R, F>(
    repo: &R,
    fetcher: &F,
    limit: i64,
) -> ServiceResult<CrawlRunSummary>
where
    R: IntelligenceReader + IntelligenceWriter + ?Sized,
    F: PageFetcher + ?Sized,
{
    let jobs = repo.list_pending_crawl_jobs(limit)?;

    let mut summary = CrawlRunSummary::default();
    for job in &jobs {
        match run_crawl_job(repo, fetcher, job).await {
            Ok((finished, matched)) => {
                if finished.status == CrawlStatus::Done {
                    summary.done += 1;
                } else {
                    summary.failed += 1;
                }
                summary.matched_triggers += matched;
            }
            Err(err) => {
                log::error!("Crawl job {} could not be processed: {err}", job.id);
                summary.failed += 1;
            }
        }
    }

    Ok(summary)
}

pub fn create_news_trigger<R>(
    repo: &R,
    user: &AuthenticatedUser,
    form: NewsTriggerForm,
) -> ServiceResult<NewsTrigger>
where
    R: IntelligenceWriter + CompanyReader + ComplianceWriter + ?Sized,
{
    ensure_role(user, SERVICE_DIRECTOR_ROLE)?;

    let payload = NewsTriggerPayload::try_from(form)?;

    let hub_id = HubId::new(user.hub_id)?;

    require_company(repo, hub_id, payload.company_id)?;

    let trigger = repo.create_news_trigger(&payload.into_domain(hub_id))?;

    record_audit(
        repo,
        user,
        AuditAction::Create,
        "news_trigger",
        Some(trigger.id.get()),
        Some(trigger.keyword.to_string()),
    );

    Ok(trigger)
}

pub fn toggle_news_trigger<R>(
    repo: &R,
    user: &AuthenticatedUser,
    trigger_id: i32,
) -> ServiceResult<NewsTrigger>
where
    R: IntelligenceReader + IntelligenceWriter + ComplianceWriter + ?Sized,
{
    ensure_role(user, SERVICE_DIRECTOR_ROLE)?;

    let hub_id = HubId::new(user.hub_id)?;
    let trigger_id = NewsTriggerId::new(trigger_id)?;

    let trigger = repo
        .list_news_triggers(hub_id)?
        .into_iter()
        .find(|t| t.id == trigger_id)
        .ok_or(ServiceError::NotFound)?;

    let trigger = repo.set_news_trigger_active(trigger.id, hub_id, !trigger.is_active)?;

    record_audit(
        repo,
        user,
        AuditAction::StatusChange,
        "news_trigger",
        Some(trigger.id.get()),
        Some(format!("is_active={}", trigger.is_active)),
    );

    Ok(trigger)
}

pub fn delete_news_trigger<R>(repo: &R, user: &AuthenticatedUser, trigger_id: i32) -> ServiceResult<()>
where
    R: IntelligenceWriter + ComplianceWriter + ?Sized,
{
    ensure_role(user, SERVICE_DIRECTOR_ROLE)?;

    let hub_id = HubId::new(user.hub_id)?;
    let trigger_id = NewsTriggerId::new(trigger_id)?;

    repo.delete_news_trigger(trigger_id, hub_id)?;

    record_audit(
        repo,
        user,
        AuditAction::Delete,
        "news_trigger",
        Some(trigger_id.get()),
        None,
    );

    Ok(())
}

#[cfg(all(test, feature = "test-mocks"))]
mod tests {
    use super::*;
    use crate::domain::types::{CompanyId, Keyword, WebUrl};
    use crate::integrations::{IntegrationError, IntegrationResult};
    use crate::repository::mock::MockRepository;
    use crate::services::test_support::{at, audit_row, director, hub, operator_user};

    struct FakeFetcher {
        html: Option<&'static str>,
    }

    impl PageFetcher for FakeFetcher {
        async fn fetch_page(&self, _url: &str) -> IntegrationResult<String> {
            match self.html {
                Some(html) => Ok(html.to_string()),
                None => Err(IntegrationError::Status {
                    service: "scraper",
                    status: 404,
                    body: "missing".to_string(),
                }),
            }
        }
    }

    fn job(id: i32) -> CrawlJob {
        CrawlJob {
            id: CrawlJobId::new(id).expect("valid id"),
            hub_id: hub(),
            url: WebUrl::new("https://news.example.com/acme").expect("valid url"),
            status: CrawlStatus::Pending,
            title: None,
            content: None,
            error: None,
            created_at: at("2025-06-02", "09:00"),
            finished_at: None,
        }
    }

    fn finish(id: CrawlJobId, completion: &CrawlCompletion) -> CrawlJob {
        let mut job = job(id.get());
        job.status = completion.status;
        job.title = completion.title.clone();
        job.content = completion.content.clone();
        job.error = completion.error.clone();
        job.finished_at = Some(completion.finished_at);
        job
    }

    fn trigger(id: i32, keyword: &str) -> NewsTrigger {
        NewsTrigger {
            id: NewsTriggerId::new(id).expect("valid id"),
            hub_id: hub(),
            company_id: CompanyId::new(1).expect("valid id"),
            keyword: Keyword::new(keyword).expect("valid keyword"),
            is_active: true,
            last_matched_at: None,
            last_headline: None,
        }
    }

    #[actix_web::test]
    async fn finished_crawl_marks_matching_triggers() {
        let mut repo = MockRepository::new();
        repo.expect_finish_crawl_job()
            .withf(|_, completion| completion.status == CrawlStatus::Done)
            .times(1)
            .returning(|id, completion| Ok(finish(id, completion)));
        repo.expect_list_news_triggers()
            .returning(|_| Ok(vec![trigger(1, "osaka"), trigger(2, "Nagoya")]));
        repo.expect_mark_news_triggers_matched()
            .withf(|ids, headline, _| {
                ids.len() == 1 && ids[0].get() == 1 && headline == "Acme expands"
            })
            .times(1)
            .returning(|ids, _, _| Ok(ids.len()));
        let fetcher = FakeFetcher {
            html: Some("<title>Acme expands</title><p>New office in Osaka</p>"),
        };

        let (finished, matched) = run_crawl_job(&repo, &fetcher, &job(1)).await.expect("ran");
        assert_eq!(finished.status, CrawlStatus::Done);
        assert_eq!(matched, 1);
    }

    #[actix_web::test]
    async fn fetch_failure_marks_job_failed() {
        let mut repo = MockRepository::new();
        repo.expect_finish_crawl_job()
            .withf(|_, completion| {
                completion.status == CrawlStatus::Failed && completion.error.is_some()
            })
            .times(1)
            .returning(|id, completion| Ok(finish(id, completion)));
        repo.expect_list_news_triggers().times(0);
        let fetcher = FakeFetcher { html: None };

        let (finished, matched) = run_crawl_job(&repo, &fetcher, &job(1)).await.expect("ran");
        assert_eq!(finished.status, CrawlStatus::Failed);
        assert_eq!(matched, 0);
    }

    #[actix_web::test]
    async fn pending_run_counts_outcomes() {
        let mut repo = MockRepository::new();
        repo.expect_list_pending_crawl_jobs()
            .withf(|limit| *limit == 10)
            .returning(|_| Ok(vec![job(1), job(2)]));
        repo.expect_finish_crawl_job()
            .times(2)
            .returning(|id, completion| Ok(finish(id, completion)));
        repo.expect_list_news_triggers().returning(|_| Ok(Vec::new()));
        let fetcher = FakeFetcher {
            html: Some("<p>quiet day</p>"),
        };

        let summary = run_pending_crawl_jobs(&repo, &fetcher, 10)
            .await
            .expect("ran");
        assert_eq!(
            summary,
            CrawlRunSummary {
                done: 2,
                failed: 0,
                matched_triggers: 0
            }
        );
    }

    #[actix_web::test]
    async fn run_now_requires_director() {
        let repo = MockRepository::new();
        let fetcher = FakeFetcher { html: None };
        assert!(matches!(
            run_crawl_job_now(&repo, &fetcher, &operator_user(), 1).await,
            Err(ServiceError::Unauthorized)
        ));
    }

    #[actix_web::test]
    async fn run_now_is_audited() {
        let mut repo = MockRepository::new();
        repo.expect_get_crawl_job_by_id()
            .returning(|id, _| Ok(Some(job(id.get()))));
        repo.expect_finish_crawl_job()
            .times(1)
            .returning(|id, completion| Ok(finish(id, completion)));
        repo.expect_list_news_triggers().returning(|_| Ok(Vec::new()));
        repo.expect_create_audit_log()
            .withf(|log| {
                log.entity == "crawl_job"
                    && log.entity_id == Some(5)
                    && log.details.as_deref() == Some("run Done matched=0")
            })
            .times(1)
            .returning(|log| Ok(audit_row(log)));
        let fetcher = FakeFetcher {
            html: Some("<p>quiet day</p>"),
        };

        let (finished, _) = run_crawl_job_now(&repo, &fetcher, &director(), 5)
            .await
            .expect("ran");
        assert_eq!(finished.status, CrawlStatus::Done);
    }

    #[test]
    fn trigger_for_foreign_company_is_rejected() {
        let mut repo = MockRepository::new();
        repo.expect_get_company_by_id().returning(|_, _| Ok(None));
        repo.expect_create_news_trigger().times(0);

        let form = NewsTriggerForm {
            company_id: 9,
            keyword: "資金調達".to_string(),
        };
        assert!(matches!(
            create_news_trigger(&repo, &director(), form),
            Err(ServiceError::Form(_))
        ));
    }

    #[test]
    fn toggle_flips_trigger() {
        let mut repo = MockRepository::new();
        repo.expect_list_news_triggers()
            .returning(|_| Ok(vec![trigger(4, "osaka")]));
        repo.expect_set_news_trigger_active()
            .withf(|id, _, active| id.get() == 4 && !*active)
            .times(1)
            .returning(|id, _, active| {
                let mut trigger = trigger(id.get(), "osaka");
                trigger.is_active = active;
                Ok(trigger)
            });
        repo.expect_create_audit_log()
            .returning(|log| Ok(crate::services::test_support::audit_row(log)));

        let toggled = toggle_news_trigger(&repo, &director(), 4).expect("toggled");
        assert!(!toggled.is_active);
    }
}
