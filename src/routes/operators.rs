use actix_web::{Responder, get, post, web};
use actix_web_flash_messages::{FlashMessage, IncomingFlashMessages};
use tera::Tera;

use crate::auth::AuthenticatedUser;
use crate::forms::operators::AddOperatorForm;
use crate::models::config::ServerConfig;
use crate::repository::DieselRepository;
use crate::routes::{base_context, flash_error, page_error, redirect, render_template};
use crate::services::operators as operators_service;

#[get("/operators")]
pub async fn operators(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    flash_messages: IncomingFlashMessages,
    server_config: web::Data<ServerConfig>,
    tera: web::Data<Tera>,
) -> impl Responder {
    match operators_service::list_operators(repo.get_ref(), &user) {
        Ok(data) => {
            let mut context = base_context(
                &flash_messages,
                &user,
                "operators",
                &server_config.auth_service_url,
            );
            context.insert("operators", &data.operators);

            render_template(&tera, "operators/index.html", &context)
        }
        Err(err) => page_error(err, "operators"),
    }
}

#[post("/operators/add")]
pub async fn add_operator(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    web::Form(form): web::Form<AddOperatorForm>,
) -> impl Responder {
    match operators_service::add_operator(repo.get_ref(), &user, form) {
        Ok(_) => {
            FlashMessage::success("オペレーターを追加しました。").send();
            redirect("/operators")
        }
        Err(err) => flash_error(err, "/operators", "オペレーターの追加に失敗しました"),
    }
}

#[post("/operators/{operator_id}/toggle")]
pub async fn toggle_operator(
    operator_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    match operators_service::toggle_operator(repo.get_ref(), &user, operator_id.into_inner()) {
        Ok(operator) => {
            let message = if operator.is_active {
                format!("{}を有効にしました。", operator.name)
            } else {
                format!("{}を無効にしました。", operator.name)
            };
            FlashMessage::success(message).send();
            redirect("/operators")
        }
        Err(err) => flash_error(err, "/operators", "オペレーターの切り替えに失敗しました"),
    }
}
