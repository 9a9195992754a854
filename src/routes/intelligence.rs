use actix_web::{Responder, get, post, web};
use actix_web_flash_messages::{FlashMessage, IncomingFlashMessages};
use tera::Tera;

use crate::auth::AuthenticatedUser;
use crate::domain::intelligence::CrawlStatus;
use crate::forms::intelligence::{CrawlJobForm, NewsTriggerForm};
use crate::integrations::HttpIntegrations;
use crate::models::config::ServerConfig;
use crate::repository::DieselRepository;
use crate::routes::{base_context, flash_error, page_error, redirect, render_template};
use crate::services::intelligence as intelligence_service;

#[get("/intelligence")]
pub async fn intelligence(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    flash_messages: IncomingFlashMessages,
    server_config: web::Data<ServerConfig>,
    tera: web::Data<Tera>,
) -> impl Responder {
    match intelligence_service::load_intelligence(repo.get_ref(), &user) {
        Ok(data) => {
            let mut context = base_context(
                &flash_messages,
                &user,
                "intelligence",
                &server_config.auth_service_url,
            );
            context.insert("jobs", &data.jobs);
            context.insert("triggers", &data.triggers);
            context.insert("companies", &data.companies);

            render_template(&tera, "intelligence/index.html", &context)
        }
        Err(err) => page_error(err, "intelligence"),
    }
}

#[post("/intelligence/jobs/add")]
pub async fn add_crawl_job(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    web::Form(form): web::Form<CrawlJobForm>,
) -> impl Responder {
    match intelligence_service::create_crawl_job(repo.get_ref(), &user, form) {
        Ok(_) => {
            FlashMessage::success("クロールジョブを登録しました。").send();
            redirect("/intelligence")
        }
        Err(err) => flash_error(err, "/intelligence", "クロールジョブの登録に失敗しました"),
    }
}

#[post("/intelligence/jobs/{job_id}/run")]
pub async fn run_crawl_job(
    job_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    integrations: web::Data<HttpIntegrations>,
) -> impl Responder {
    match intelligence_service::run_crawl_job_now(
        repo.get_ref(),
        integrations.get_ref(),
        &user,
        job_id.into_inner(),
    )
    .await
    {
        Ok((job, matched)) if job.status == CrawlStatus::Done => {
            FlashMessage::success(format!(
                "クロールが完了しました（一致したトリガー: {matched}件）。"
            ))
            .send();
            redirect("/intelligence")
        }
        Ok((job, _)) => {
            FlashMessage::error(format!(
                "クロールに失敗しました: {}",
                job.error.unwrap_or_default()
            ))
            .send();
            redirect("/intelligence")
        }
        Err(err) => flash_error(err, "/intelligence", "クロールの実行に失敗しました"),
    }
}

#[post("/intelligence/jobs/{job_id}/delete")]
pub async fn delete_crawl_job(
    job_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    match intelligence_service::delete_crawl_job(repo.get_ref(), &user, job_id.into_inner()) {
        Ok(()) => {
            FlashMessage::success("クロールジョブを削除しました。").send();
            redirect("/intelligence")
        }
        Err(err) => flash_error(err, "/intelligence", "クロールジョブの削除に失敗しました"),
    }
}

#[post("/intelligence/triggers/add")]
pub async fn add_news_trigger(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    web::Form(form): web::Form<NewsTriggerForm>,
) -> impl Responder {
    match intelligence_service::create_news_trigger(repo.get_ref(), &user, form) {
        Ok(_) => {
            FlashMessage::success("ニューストリガーを登録しました。").send();
            redirect("/intelligence")
        }
        Err(err) => flash_error(err, "/intelligence", "ニューストリガーの登録に失敗しました"),
    }
}

#[post("/intelligence/triggers/{trigger_id}/toggle")]
pub async fn toggle_news_trigger(
    trigger_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    match intelligence_service::toggle_news_trigger(repo.get_ref(), &user, trigger_id.into_inner())
    {
        Ok(trigger) => {
            let message = if trigger.is_active {
                "トリガーを有効にしました。"
            } else {
                "トリガーを無効にしました。"
            };
            FlashMessage::success(message).send();
            redirect("/intelligence")
        }
        Err(err) => flash_error(err, "/intelligence", "トリガーの切り替えに失敗しました"),
    }
}

#[post("/intelligence/triggers/{trigger_id}/delete")]
pub async fn delete_news_trigger(
    trigger_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    match intelligence_service::delete_news_trigger(repo.get_ref(), &user, trigger_id.into_inner())
    {
        Ok(()) => {
            FlashMessage::success("トリガーを削除しました。").send();
            redirect("/intelligence")
        }
        Err(err) => flash_error(err, "/intelligence", "トリガーの削除に失敗しました"),
    }
}
