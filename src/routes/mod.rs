//! HTTP handlers and the helpers they share.

use actix_identity::Identity;
use actix_web::http::header;
use actix_web::{HttpResponse, Responder, get, post, web};
use actix_web_flash_messages::{FlashMessage, IncomingFlashMessages, Level};
use tera::{Context, Tera};

use crate::auth::AuthenticatedUser;
use crate::models::config::ServerConfig;
use crate::services::ServiceError;
use crate::{SERVICE_DIRECTOR_ROLE, SERVICE_OPERATOR_ROLE};

pub mod api;
pub mod appointments;
pub mod calls;
pub mod companies;
pub mod compliance;
pub mod fraud;
pub mod intelligence;
pub mod nurturing;
pub mod operators;
pub mod rejections;
pub mod roleplay;
pub mod schedule;

/// Maps a flash level to the bootstrap alert class.
pub fn alert_level_to_str(level: &Level) -> &'static str {
    match level {
        Level::Error => "danger",
        Level::Warning => "warning",
        Level::Success => "success",
        _ => "info",
    }
}

/// Context shared by every page: alerts, user, active nav item and home link.
pub fn base_context(
    flash_messages: &IncomingFlashMessages,
    user: &AuthenticatedUser,
    current_page: &str,
    home_url: &str,
) -> Context {
    let alerts = flash_messages
        .iter()
        .map(|f| (f.content(), alert_level_to_str(&f.level())))
        .collect::<Vec<_>>();

    let mut context = Context::new();
    context.insert("alerts", &alerts);
    context.insert("current_user", user);
    context.insert("current_page", current_page);
    context.insert("home_url", home_url);
    context.insert("is_director", &user.has_role(SERVICE_DIRECTOR_ROLE));
    context.insert("is_operator", &user.has_role(SERVICE_OPERATOR_ROLE));
    context
}

pub fn render_template(tera: &Tera, template: &str, context: &Context) -> HttpResponse {
    match tera.render(template, context) {
        Ok(body) => HttpResponse::Ok()
            .content_type("text/html; charset=utf-8")
            .body(body),
        Err(err) => {
            log::error!("Failed to render template '{template}': {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

pub fn redirect(location: &str) -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header((header::LOCATION, location))
        .finish()
}

/// Flashes a service failure and redirects back to `location`.
///
/// Unauthorized users are sent to `/na`; unexpected failures are logged
/// and flashed with `fallback`.
pub fn flash_error(err: ServiceError, location: &str, fallback: &str) -> HttpResponse {
    match err {
        ServiceError::Unauthorized => {
            FlashMessage::error("権限がありません。").send();
            redirect("/na")
        }
        ServiceError::Form(message)
        | ServiceError::Conflict(message)
        | ServiceError::TypeConstraint(message) => {
            FlashMessage::error(message).send();
            redirect(location)
        }
        ServiceError::NotFound => {
            FlashMessage::error("対象が見つかりません。").send();
            redirect(location)
        }
        err => {
            log::error!("{fallback}: {err}");
            FlashMessage::error(fallback).send();
            redirect(location)
        }
    }
}

/// Response for a page that failed to load.
pub fn page_error(err: ServiceError, page: &str) -> HttpResponse {
    match err {
        ServiceError::Unauthorized => {
            FlashMessage::error("権限がありません。").send();
            redirect("/na")
        }
        ServiceError::NotFound => {
            FlashMessage::error("対象が見つかりません。").send();
            redirect("/")
        }
        ServiceError::Form(message) => {
            FlashMessage::error(message).send();
            redirect("/")
        }
        err => {
            log::error!("Failed to load {page}: {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

#[post("/logout")]
pub async fn logout(user: Identity) -> impl Responder {
    user.logout();
    redirect("/")
}

#[get("/na")]
pub async fn not_assigned(
    user: AuthenticatedUser,
    flash_messages: IncomingFlashMessages,
    server_config: web::Data<ServerConfig>,
    tera: web::Data<Tera>,
) -> impl Responder {
    let context = base_context(&flash_messages, &user, "index", &server_config.auth_service_url);

    render_template(&tera, "main/not_assigned.html", &context)
}
