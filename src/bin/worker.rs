//! Background worker running pending crawl jobs and sending due follow-ups.

use std::time::Duration;

use chrono::Utc;
use dotenvy::dotenv;

use toguna::db::establish_connection_pool;
use toguna::integrations::HttpIntegrations;
use toguna::models::config::ServerConfig;
use toguna::repository::{DieselRepository, NurturingReader};
use toguna::services::intelligence::run_pending_crawl_jobs;
use toguna::services::nurturing::send_due_followups;

/// Crawl jobs picked up per tick.
const CRAWL_BATCH: i64 = 20;

async fn tick(repo: &DieselRepository, integrations: &HttpIntegrations) {
    match run_pending_crawl_jobs(repo, integrations, CRAWL_BATCH).await {
        Ok(summary) if summary.done + summary.failed > 0 => log::info!(
            "Crawl jobs: {} done, {} failed, {} triggers matched",
            summary.done,
            summary.failed,
            summary.matched_triggers
        ),
        Ok(_) => {}
        Err(err) => log::error!("Failed to run pending crawl jobs: {err}"),
    }

    let hubs = match repo.list_hubs_with_active_rules() {
        Ok(hubs) => hubs,
        Err(err) => {
            log::error!("Failed to list hubs with follow-up rules: {err}");
            return;
        }
    };

    for hub_id in hubs {
        match send_due_followups(repo, integrations, hub_id, Utc::now().naive_utc()).await {
            Ok(summary) if summary.sent + summary.failed + summary.skipped > 0 => log::info!(
                "Follow-ups for hub {hub_id}: {} sent, {} failed, {} skipped",
                summary.sent,
                summary.failed,
                summary.skipped
            ),
            Ok(_) => {}
            Err(err) => log::error!("Failed to send follow-ups for hub {hub_id}: {err}"),
        }
    }
}

#[actix_web::main]
async fn main() {
    dotenv().ok(); // Load .env file
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let server_config = match ServerConfig::load() {
        Ok(server_config) => server_config,
        Err(err) => {
            log::error!("Error loading server config: {err}");
            std::process::exit(1);
        }
    };

    let pool = match establish_connection_pool(&server_config.database_url) {
        Ok(pool) => pool,
        Err(e) => {
            log::error!("Failed to establish database connection: {e}");
            std::process::exit(1);
        }
    };

    let repo = DieselRepository::new(pool);

    let integrations = match HttpIntegrations::new(server_config.integrations.clone()) {
        Ok(integrations) => integrations,
        Err(e) => {
            log::error!("Failed to build HTTP client: {e}");
            std::process::exit(1);
        }
    };

    let interval = Duration::from_secs(server_config.worker_interval_secs.max(1));

    log::info!("Starting worker, interval {}s", interval.as_secs());

    loop {
        tick(&repo, &integrations).await;
        actix_web::rt::time::sleep(interval).await;
    }
}
