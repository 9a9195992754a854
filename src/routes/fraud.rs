use actix_web::{Responder, get, post, web};
use actix_web_flash_messages::{FlashMessage, IncomingFlashMessages};
use tera::Tera;

use crate::auth::AuthenticatedUser;
use crate::forms::fraud::FraudScoreForm;
use crate::models::config::ServerConfig;
use crate::repository::DieselRepository;
use crate::routes::{base_context, flash_error, page_error, redirect, render_template};
use crate::services::fraud as fraud_service;

#[get("/fraud")]
pub async fn fraud_dashboard(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    flash_messages: IncomingFlashMessages,
    server_config: web::Data<ServerConfig>,
    tera: web::Data<Tera>,
) -> impl Responder {
    match fraud_service::fraud_dashboard(repo.get_ref(), &user, server_config.fraud_threshold) {
        Ok(data) => {
            let mut context = base_context(
                &flash_messages,
                &user,
                "fraud",
                &server_config.auth_service_url,
            );
            context.insert("dashboard", &data.dashboard);
            context.insert("operators", &data.operators);

            render_template(&tera, "fraud/index.html", &context)
        }
        Err(err) => page_error(err, "fraud dashboard"),
    }
}

#[post("/fraud/add")]
pub async fn add_fraud_score(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    web::Form(form): web::Form<FraudScoreForm>,
) -> impl Responder {
    match fraud_service::record_fraud_score(repo.get_ref(), &user, form) {
        Ok(_) => {
            FlashMessage::success("不正スコアを登録しました。").send();
            redirect("/fraud")
        }
        Err(err) => flash_error(err, "/fraud", "不正スコアの登録に失敗しました"),
    }
}
