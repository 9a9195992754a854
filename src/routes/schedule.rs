use actix_web::{Responder, get, post, web};
use actix_web_flash_messages::{FlashMessage, IncomingFlashMessages};
use tera::Tera;

use crate::auth::AuthenticatedUser;
use crate::dto::schedule::ScheduleQuery;
use crate::forms::schedule::ScheduleDateForm;
use crate::models::config::ServerConfig;
use crate::repository::DieselRepository;
use crate::routes::{base_context, flash_error, page_error, redirect, render_template};
use crate::services::schedule as schedule_service;

fn schedule_url(date: &str) -> String {
    format!("/schedule?date={date}")
}

#[get("/schedule")]
pub async fn schedule(
    params: web::Query<ScheduleQuery>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    flash_messages: IncomingFlashMessages,
    server_config: web::Data<ServerConfig>,
    tera: web::Data<Tera>,
) -> impl Responder {
    match schedule_service::load_schedule(repo.get_ref(), &user, params.into_inner()) {
        Ok(data) => {
            let mut context = base_context(
                &flash_messages,
                &user,
                "schedule",
                &server_config.auth_service_url,
            );
            context.insert("date", &data.date.format("%Y-%m-%d").to_string());
            context.insert("times", &data.times);
            context.insert("rows", &data.rows);
            context.insert("companies", &data.companies);
            context.insert("operators", &data.operators);

            render_template(&tera, "schedule/index.html", &context)
        }
        Err(err) => page_error(err, "schedule"),
    }
}

/// Accepts repeated `company_ids`/`operator_ids` fields, hence the raw body.
#[post("/schedule/optimize")]
pub async fn optimize_schedule(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    form: web::Bytes,
) -> impl Responder {
    match schedule_service::optimize_schedule(repo.get_ref(), &user, form.as_ref()) {
        Ok(summary) => {
            let date = summary.date.format("%Y-%m-%d").to_string();
            FlashMessage::success(format!("{}件の枠を割り当てました。", summary.assigned)).send();
            if !summary.unassigned.is_empty() {
                FlashMessage::warning(format!(
                    "{}社は枠が不足して割り当てられませんでした。",
                    summary.unassigned.len()
                ))
                .send();
            }
            redirect(&schedule_url(&date))
        }
        Err(err) => flash_error(err, "/schedule", "スケジュールの最適化に失敗しました"),
    }
}

#[post("/schedule/clear")]
pub async fn clear_schedule(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    web::Form(form): web::Form<ScheduleDateForm>,
) -> impl Responder {
    match schedule_service::clear_schedule(repo.get_ref(), &user, form) {
        Ok((date, removed)) => {
            FlashMessage::success(format!("{removed}件の枠を削除しました。")).send();
            redirect(&schedule_url(&date.format("%Y-%m-%d").to_string()))
        }
        Err(err) => flash_error(err, "/schedule", "スケジュールの削除に失敗しました"),
    }
}
