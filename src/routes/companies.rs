use actix_multipart::form::MultipartForm;
use actix_web::{Responder, get, post, web};
use actix_web_flash_messages::{FlashMessage, IncomingFlashMessages};
use tera::Tera;

use crate::auth::AuthenticatedUser;
use crate::dto::companies::CompaniesQuery;
use crate::forms::companies::{CompanyForm, UploadCompaniesForm};
use crate::integrations::HttpIntegrations;
use crate::models::config::ServerConfig;
use crate::repository::DieselRepository;
use crate::routes::{base_context, flash_error, page_error, redirect, render_template};
use crate::services::companies as companies_service;

#[get("/")]
pub async fn show_index(
    params: web::Query<CompaniesQuery>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    flash_messages: IncomingFlashMessages,
    server_config: web::Data<ServerConfig>,
    tera: web::Data<Tera>,
) -> impl Responder {
    match companies_service::list_companies(repo.get_ref(), &user, params.into_inner()) {
        Ok(data) => {
            let mut context = base_context(
                &flash_messages,
                &user,
                "index",
                &server_config.auth_service_url,
            );
            context.insert("companies", &data.companies);
            if let Some(search_query) = data.search_query {
                context.insert("search_query", &search_query);
            }

            render_template(&tera, "companies/index.html", &context)
        }
        Err(err) => page_error(err, "companies"),
    }
}

#[get("/companies/{company_id}")]
pub async fn show_company(
    company_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    flash_messages: IncomingFlashMessages,
    server_config: web::Data<ServerConfig>,
    tera: web::Data<Tera>,
) -> impl Responder {
    match companies_service::show_company(repo.get_ref(), &user, company_id.into_inner()) {
        Ok(data) => {
            let mut context = base_context(
                &flash_messages,
                &user,
                "index",
                &server_config.auth_service_url,
            );
            context.insert("company", &data.company);
            context.insert("appointments", &data.appointments);
            context.insert("calls", &data.calls);
            context.insert("insights", &data.insights);
            context.insert("sends", &data.sends);
            context.insert("templates", &data.templates);
            context.insert("operators", &data.operators);

            render_template(&tera, "companies/show.html", &context)
        }
        Err(err) => page_error(err, "company"),
    }
}

#[post("/companies/add")]
pub async fn add_company(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    web::Form(form): web::Form<CompanyForm>,
) -> impl Responder {
    match companies_service::add_company(repo.get_ref(), &user, form) {
        Ok(()) => {
            FlashMessage::success("企業を追加しました。").send();
            redirect("/")
        }
        Err(err) => flash_error(err, "/", "企業の追加に失敗しました"),
    }
}

#[post("/companies/{company_id}/update")]
pub async fn update_company(
    company_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    web::Form(form): web::Form<CompanyForm>,
) -> impl Responder {
    let company_id = company_id.into_inner();
    let back = format!("/companies/{company_id}");
    match companies_service::update_company(repo.get_ref(), &user, company_id, form) {
        Ok(_) => {
            FlashMessage::success("企業情報を更新しました。").send();
            redirect(&back)
        }
        Err(err) => flash_error(err, &back, "企業情報の更新に失敗しました"),
    }
}

#[post("/companies/{company_id}/delete")]
pub async fn delete_company(
    company_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    match companies_service::delete_company(repo.get_ref(), &user, company_id.into_inner()) {
        Ok(()) => {
            FlashMessage::success("企業を削除しました。").send();
            redirect("/")
        }
        Err(err) => flash_error(err, "/", "企業の削除に失敗しました"),
    }
}

#[post("/companies/upload")]
pub async fn upload_companies(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    MultipartForm(form): MultipartForm<UploadCompaniesForm>,
) -> impl Responder {
    match companies_service::upload_companies(repo.get_ref(), &user, &form) {
        Ok(count) => {
            FlashMessage::success(format!("{count}件の企業を取り込みました。")).send();
            redirect("/")
        }
        Err(err) => flash_error(err, "/", "企業の取り込みに失敗しました"),
    }
}

#[post("/companies/{company_id}/dial")]
pub async fn dial_company(
    company_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    integrations: web::Data<HttpIntegrations>,
) -> impl Responder {
    let company_id = company_id.into_inner();
    let back = format!("/companies/{company_id}");
    match companies_service::dial_company(
        repo.get_ref(),
        integrations.get_ref(),
        &user,
        company_id,
    )
    .await
    {
        Ok(call_id) => {
            FlashMessage::success(format!("発信しました（通話ID: {call_id}）。")).send();
            redirect(&back)
        }
        Err(err) => flash_error(err, &back, "発信に失敗しました"),
    }
}
