use actix_web::{Responder, get, post, web};
use actix_web_flash_messages::{FlashMessage, IncomingFlashMessages};
use tera::Tera;

use crate::auth::AuthenticatedUser;
use crate::domain::appointment::AppointmentStatus;
use crate::dto::appointments::{AppointmentsQuery, CalendarSync};
use crate::forms::appointments::{AppointmentStatusForm, CreateAppointmentForm};
use crate::integrations::HttpIntegrations;
use crate::models::config::ServerConfig;
use crate::repository::DieselRepository;
use crate::routes::{base_context, flash_error, page_error, redirect, render_template};
use crate::services::appointments as appointments_service;

#[get("/appointments")]
pub async fn appointments(
    params: web::Query<AppointmentsQuery>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    flash_messages: IncomingFlashMessages,
    server_config: web::Data<ServerConfig>,
    tera: web::Data<Tera>,
) -> impl Responder {
    let params = params.into_inner();
    let filters = (
        params.status.clone(),
        params.operator_id.clone(),
        params.search.clone(),
    );

    match appointments_service::list_appointments(repo.get_ref(), &user, params) {
        Ok(data) => {
            let mut context = base_context(
                &flash_messages,
                &user,
                "appointments",
                &server_config.auth_service_url,
            );
            context.insert("days", &data.days);
            context.insert("total", &data.total);
            context.insert("from", &data.from.format("%Y-%m-%d").to_string());
            context.insert("to", &data.to.format("%Y-%m-%d").to_string());
            context.insert("companies", &data.companies);
            context.insert("operators", &data.operators);
            context.insert("can_pick_operator", &data.can_pick_operator);
            context.insert("statuses", AppointmentStatus::ALL);
            context.insert("selected_status", &filters.0);
            context.insert("selected_operator", &filters.1);
            context.insert("search_query", &filters.2);

            render_template(&tera, "appointments/index.html", &context)
        }
        Err(err) => page_error(err, "appointments"),
    }
}

#[post("/appointments/add")]
pub async fn add_appointment(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    integrations: web::Data<HttpIntegrations>,
    web::Form(form): web::Form<CreateAppointmentForm>,
) -> impl Responder {
    match appointments_service::create_appointment(
        repo.get_ref(),
        integrations.get_ref(),
        &user,
        form,
    )
    .await
    {
        Ok((_, sync)) => {
            FlashMessage::success("アポイントを登録しました。").send();
            if sync == CalendarSync::Failed {
                FlashMessage::warning("カレンダーへの登録に失敗しました。").send();
            }
            redirect("/appointments")
        }
        Err(err) => flash_error(err, "/appointments", "アポイントの登録に失敗しました"),
    }
}

#[post("/appointments/{appointment_id}/status")]
pub async fn update_appointment_status(
    appointment_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    web::Form(form): web::Form<AppointmentStatusForm>,
) -> impl Responder {
    match appointments_service::update_appointment_status(
        repo.get_ref(),
        &user,
        appointment_id.into_inner(),
        form,
    ) {
        Ok(appointment) => {
            FlashMessage::success(format!(
                "ステータスを{}に変更しました。",
                appointment.status
            ))
            .send();
            redirect("/appointments")
        }
        Err(err) => flash_error(err, "/appointments", "ステータスの変更に失敗しました"),
    }
}
