use actix_web::{Responder, get, post, web};
use actix_web_flash_messages::{FlashMessage, IncomingFlashMessages};
use tera::Tera;

use crate::auth::AuthenticatedUser;
use crate::forms::rejections::RejectionForm;
use crate::models::config::ServerConfig;
use crate::repository::DieselRepository;
use crate::routes::{base_context, flash_error, page_error, redirect, render_template};
use crate::services::rejections as rejections_service;

#[post("/rejections/add")]
pub async fn add_rejection(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    web::Form(form): web::Form<RejectionForm>,
) -> impl Responder {
    let back = format!("/companies/{}", form.company_id);
    match rejections_service::record_rejection(repo.get_ref(), &user, form) {
        Ok(_) => {
            FlashMessage::success("お断り理由を記録しました。").send();
            redirect(&back)
        }
        Err(err) => flash_error(err, &back, "お断り理由の記録に失敗しました"),
    }
}

#[get("/rejections")]
pub async fn rejection_analytics(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    flash_messages: IncomingFlashMessages,
    server_config: web::Data<ServerConfig>,
    tera: web::Data<Tera>,
) -> impl Responder {
    match rejections_service::rejection_analytics(repo.get_ref(), &user) {
        Ok(data) => {
            let mut context = base_context(
                &flash_messages,
                &user,
                "rejections",
                &server_config.auth_service_url,
            );
            context.insert("stats", &data.stats);
            context.insert("total", &data.total);
            context.insert("companies", &data.companies);

            render_template(&tera, "rejections/index.html", &context)
        }
        Err(err) => page_error(err, "rejection analytics"),
    }
}

#[get("/rejections/incubation")]
pub async fn incubation(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    flash_messages: IncomingFlashMessages,
    server_config: web::Data<ServerConfig>,
    tera: web::Data<Tera>,
) -> impl Responder {
    match rejections_service::incubation(repo.get_ref(), &user) {
        Ok(data) => {
            let mut context = base_context(
                &flash_messages,
                &user,
                "rejections",
                &server_config.auth_service_url,
            );
            context.insert("candidates", &data.candidates);

            render_template(&tera, "rejections/incubation.html", &context)
        }
        Err(err) => page_error(err, "incubation"),
    }
}
