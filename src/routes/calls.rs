use actix_web::{Responder, get, post, web};
use actix_web_flash_messages::{FlashMessage, IncomingFlashMessages};
use tera::Tera;

use crate::auth::AuthenticatedUser;
use crate::domain::call::{CallOutcome, Sentiment};
use crate::forms::calls::{GoldenCallForm, RecordCallForm, ScoreCallForm};
use crate::integrations::HttpIntegrations;
use crate::models::config::ServerConfig;
use crate::repository::DieselRepository;
use crate::routes::{base_context, flash_error, page_error, redirect, render_template};
use crate::services::calls as calls_service;

#[get("/calls")]
pub async fn calls(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    flash_messages: IncomingFlashMessages,
    server_config: web::Data<ServerConfig>,
    tera: web::Data<Tera>,
) -> impl Responder {
    match calls_service::list_calls(repo.get_ref(), &user) {
        Ok(data) => {
            let mut context = base_context(
                &flash_messages,
                &user,
                "calls",
                &server_config.auth_service_url,
            );
            context.insert("calls", &data.calls);
            context.insert("companies", &data.companies);
            context.insert("operators", &data.operators);
            context.insert("can_pick_operator", &data.can_pick_operator);
            context.insert("outcomes", CallOutcome::ALL);
            context.insert("sentiments", Sentiment::ALL);

            render_template(&tera, "calls/index.html", &context)
        }
        Err(err) => page_error(err, "calls"),
    }
}

#[post("/calls/add")]
pub async fn add_call(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    web::Form(form): web::Form<RecordCallForm>,
) -> impl Responder {
    match calls_service::record_call(repo.get_ref(), &user, form) {
        Ok(_) => {
            FlashMessage::success("通話を記録しました。").send();
            redirect("/calls")
        }
        Err(err) => flash_error(err, "/calls", "通話の記録に失敗しました"),
    }
}

#[post("/calls/{call_id}/score")]
pub async fn score_call(
    call_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    web::Form(form): web::Form<ScoreCallForm>,
) -> impl Responder {
    match calls_service::score_call(repo.get_ref(), &user, call_id.into_inner(), form) {
        Ok(_) => {
            FlashMessage::success("スコアを保存しました。").send();
            redirect("/calls")
        }
        Err(err) => flash_error(err, "/calls", "スコアの保存に失敗しました"),
    }
}

#[post("/calls/{call_id}/auto-score")]
pub async fn auto_score_call(
    call_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    integrations: web::Data<HttpIntegrations>,
) -> impl Responder {
    match calls_service::auto_score_call(
        repo.get_ref(),
        integrations.get_ref(),
        &user,
        call_id.into_inner(),
    )
    .await
    {
        Ok(call) => {
            let score = call
                .quality_score
                .map(|s| s.to_string())
                .unwrap_or_default();
            FlashMessage::success(format!("AI採点が完了しました（{score}点）。")).send();
            redirect("/calls")
        }
        Err(err) => flash_error(err, "/calls", "AI採点に失敗しました"),
    }
}

#[get("/calls/quality")]
pub async fn quality_dashboard(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    flash_messages: IncomingFlashMessages,
    server_config: web::Data<ServerConfig>,
    tera: web::Data<Tera>,
) -> impl Responder {
    match calls_service::quality_dashboard(repo.get_ref(), &user) {
        Ok(data) => {
            let mut context = base_context(
                &flash_messages,
                &user,
                "quality",
                &server_config.auth_service_url,
            );
            context.insert("ranked", &data.ranked);
            context.insert("averages", &data.averages);

            render_template(&tera, "calls/quality.html", &context)
        }
        Err(err) => page_error(err, "call quality"),
    }
}

#[get("/calls/sentiment")]
pub async fn sentiment_dashboard(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    flash_messages: IncomingFlashMessages,
    server_config: web::Data<ServerConfig>,
    tera: web::Data<Tera>,
) -> impl Responder {
    match calls_service::sentiment_dashboard(repo.get_ref(), &user) {
        Ok(data) => {
            let mut context = base_context(
                &flash_messages,
                &user,
                "sentiment",
                &server_config.auth_service_url,
            );
            context.insert("summary", &data.summary);

            render_template(&tera, "calls/sentiment.html", &context)
        }
        Err(err) => page_error(err, "sentiment"),
    }
}

#[get("/calls/golden")]
pub async fn golden_calls(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    flash_messages: IncomingFlashMessages,
    server_config: web::Data<ServerConfig>,
    tera: web::Data<Tera>,
) -> impl Responder {
    match calls_service::list_golden_calls(repo.get_ref(), &user) {
        Ok(data) => {
            let mut context = base_context(
                &flash_messages,
                &user,
                "golden",
                &server_config.auth_service_url,
            );
            context.insert("golden_calls", &data.golden_calls);

            render_template(&tera, "calls/golden.html", &context)
        }
        Err(err) => page_error(err, "golden calls"),
    }
}

#[post("/calls/golden/add")]
pub async fn mark_golden(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    web::Form(form): web::Form<GoldenCallForm>,
) -> impl Responder {
    match calls_service::mark_golden(repo.get_ref(), &user, form) {
        Ok(_) => {
            FlashMessage::success("ゴールデンコールに登録しました。").send();
            redirect("/calls/golden")
        }
        Err(err) => flash_error(err, "/calls", "ゴールデンコールの登録に失敗しました"),
    }
}

#[post("/calls/golden/{golden_id}/delete")]
pub async fn unmark_golden(
    golden_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    match calls_service::unmark_golden(repo.get_ref(), &user, golden_id.into_inner()) {
        Ok(()) => {
            FlashMessage::success("ゴールデンコールを解除しました。").send();
            redirect("/calls/golden")
        }
        Err(err) => flash_error(err, "/calls/golden", "ゴールデンコールの解除に失敗しました"),
    }
}
