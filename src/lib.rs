use actix_cors::Cors;
use actix_files::Files;
use actix_identity::IdentityMiddleware;
use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::Key;
use actix_web::middleware::{Compress, Logger};
use actix_web::{App, HttpServer, web};
use actix_web_flash_messages::{FlashMessagesFramework, storage::CookieMessageStore};
use tera::Tera;

use crate::db::establish_connection_pool;
use crate::integrations::HttpIntegrations;
use crate::middleware::RedirectUnauthorized;
use crate::models::config::ServerConfig;
use crate::repository::DieselRepository;
use crate::routes::api::{
    api_v1_appointments, api_v1_companies, api_v1_dashboard, api_v1_fraud_scores,
};
use crate::routes::appointments::{add_appointment, appointments, update_appointment_status};
use crate::routes::calls::{
    add_call, auto_score_call, calls, golden_calls, mark_golden, quality_dashboard, score_call,
    sentiment_dashboard, unmark_golden,
};
use crate::routes::companies::{
    add_company, delete_company, dial_company, show_company, show_index, update_company,
    upload_companies,
};
use crate::routes::compliance::{
    add_compliance_document, add_subsidy_report, audit_logs, compliance_documents,
    delete_compliance_document, delete_subsidy_report, export_audit_logs, subsidy_reports,
    update_subsidy_status,
};
use crate::routes::fraud::{add_fraud_score, fraud_dashboard};
use crate::routes::intelligence::{
    add_crawl_job, add_news_trigger, delete_crawl_job, delete_news_trigger, intelligence,
    run_crawl_job, toggle_news_trigger,
};
use crate::routes::nurturing::{
    add_followup_rule, add_template, delete_followup_rule, delete_template, followup_rules,
    run_followups, send_document, show_template, templates, toggle_followup_rule,
    update_template,
};
use crate::routes::operators::{add_operator, operators, toggle_operator};
use crate::routes::rejections::{add_rejection, incubation, rejection_analytics};
use crate::routes::roleplay::{
    add_scenario, delete_scenario, grade_session, roleplay, show_session, start_session,
    submit_transcript, update_scenario,
};
use crate::routes::schedule::{clear_schedule, optimize_schedule, schedule};
use crate::routes::{logout, not_assigned};

pub mod auth;
pub mod db;
pub mod domain;
pub mod dto;
pub mod forms;
pub mod integrations;
pub mod middleware;
pub mod models;
pub mod pagination;
pub mod repository;
pub mod routes;
pub mod schema;
pub mod services;

pub const SERVICE_ACCESS_ROLE: &str = "toguna";
pub const SERVICE_DIRECTOR_ROLE: &str = "toguna_director";
pub const SERVICE_OPERATOR_ROLE: &str = "toguna_operator";

/// Builds and runs the Actix-Web HTTP server using the provided configuration.
pub async fn run(server_config: ServerConfig) -> std::io::Result<()> {
    // Establish Diesel connection pool for the SQLite database.
    let pool = establish_connection_pool(&server_config.database_url).map_err(|e| {
        std::io::Error::other(format!("Failed to establish database connection: {e}"))
    })?;

    let repo = DieselRepository::new(pool);

    let integrations = HttpIntegrations::new(server_config.integrations.clone())
        .map_err(|e| std::io::Error::other(format!("Failed to build HTTP client: {e}")))?;

    // Keys and stores for identity, sessions, and flash messages.
    let secret_key = Key::from(server_config.secret.as_bytes());

    let message_store = CookieMessageStore::builder(secret_key.clone()).build();
    let message_framework = FlashMessagesFramework::builder(message_store).build();

    let tera = Tera::new(&server_config.templates_dir)
        .map_err(|e| std::io::Error::other(format!("Template parsing error(s): {e}")))?;

    let bind_address = (server_config.address.clone(), server_config.port);

    HttpServer::new(move || {
        App::new()
            .wrap(Cors::permissive())
            .wrap(message_framework.clone())
            .wrap(IdentityMiddleware::default())
            .wrap(
                SessionMiddleware::builder(CookieSessionStore::default(), secret_key.clone())
                    .cookie_secure(false) // set to true in prod
                    .cookie_domain(Some(format!(".{}", server_config.domain)))
                    .build(),
            )
            .wrap(Compress::default())
            .wrap(Logger::default())
            .service(Files::new("/assets", "./assets"))
            .service(not_assigned)
            .service(
                web::scope("/api")
                    .service(api_v1_companies)
                    .service(api_v1_appointments)
                    .service(api_v1_dashboard)
                    .service(api_v1_fraud_scores),
            )
            .service(
                web::scope("")
                    .wrap(RedirectUnauthorized)
                    .service(show_index)
                    .service(add_company)
                    .service(upload_companies)
                    .service(show_company)
                    .service(update_company)
                    .service(delete_company)
                    .service(dial_company)
                    .service(operators)
                    .service(add_operator)
                    .service(toggle_operator)
                    .service(appointments)
                    .service(add_appointment)
                    .service(update_appointment_status)
                    .service(schedule)
                    .service(optimize_schedule)
                    .service(clear_schedule)
                    .service(quality_dashboard)
                    .service(sentiment_dashboard)
                    .service(golden_calls)
                    .service(mark_golden)
                    .service(unmark_golden)
                    .service(calls)
                    .service(add_call)
                    .service(score_call)
                    .service(auto_score_call)
                    .service(add_rejection)
                    .service(incubation)
                    .service(rejection_analytics)
                    .service(templates)
                    .service(add_template)
                    .service(show_template)
                    .service(update_template)
                    .service(delete_template)
                    .service(send_document)
                    .service(followup_rules)
                    .service(add_followup_rule)
                    .service(run_followups)
                    .service(toggle_followup_rule)
                    .service(delete_followup_rule)
                    .service(intelligence)
                    .service(add_crawl_job)
                    .service(run_crawl_job)
                    .service(delete_crawl_job)
                    .service(add_news_trigger)
                    .service(toggle_news_trigger)
                    .service(delete_news_trigger)
                    .service(fraud_dashboard)
                    .service(add_fraud_score)
                    .service(subsidy_reports)
                    .service(add_subsidy_report)
                    .service(update_subsidy_status)
                    .service(delete_subsidy_report)
                    .service(compliance_documents)
                    .service(add_compliance_document)
                    .service(delete_compliance_document)
                    .service(audit_logs)
                    .service(export_audit_logs)
                    .service(roleplay)
                    .service(add_scenario)
                    .service(update_scenario)
                    .service(delete_scenario)
                    .service(start_session)
                    .service(show_session)
                    .service(submit_transcript)
                    .service(grade_session)
                    .service(logout),
            )
            .app_data(web::Data::new(tera.clone()))
            .app_data(web::Data::new(repo.clone()))
            .app_data(web::Data::new(integrations.clone()))
            .app_data(web::Data::new(server_config.clone()))
    })
    .bind(bind_address)?
    .run()
    .await
}
