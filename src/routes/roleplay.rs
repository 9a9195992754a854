use actix_web::{Responder, get, post, web};
use actix_web_flash_messages::{FlashMessage, IncomingFlashMessages};
use tera::Tera;

use crate::auth::AuthenticatedUser;
use crate::forms::roleplay::{GradeSessionForm, ScenarioForm, StartSessionForm, TranscriptForm};
use crate::models::config::ServerConfig;
use crate::repository::DieselRepository;
use crate::routes::{base_context, flash_error, page_error, redirect, render_template};
use crate::services::roleplay as roleplay_service;

#[get("/roleplay")]
pub async fn roleplay(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    flash_messages: IncomingFlashMessages,
    server_config: web::Data<ServerConfig>,
    tera: web::Data<Tera>,
) -> impl Responder {
    match roleplay_service::load_roleplay(repo.get_ref(), &user) {
        Ok(data) => {
            let mut context = base_context(
                &flash_messages,
                &user,
                "roleplay",
                &server_config.auth_service_url,
            );
            context.insert("scenarios", &data.scenarios);
            context.insert("sessions", &data.sessions);
            context.insert("averages", &data.averages);

            render_template(&tera, "roleplay/index.html", &context)
        }
        Err(err) => page_error(err, "roleplay"),
    }
}

#[post("/roleplay/scenarios/add")]
pub async fn add_scenario(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    web::Form(form): web::Form<ScenarioForm>,
) -> impl Responder {
    match roleplay_service::create_scenario(repo.get_ref(), &user, form) {
        Ok(_) => {
            FlashMessage::success("シナリオを作成しました。").send();
            redirect("/roleplay")
        }
        Err(err) => flash_error(err, "/roleplay", "シナリオの作成に失敗しました"),
    }
}

#[post("/roleplay/scenarios/{scenario_id}/update")]
pub async fn update_scenario(
    scenario_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    web::Form(form): web::Form<ScenarioForm>,
) -> impl Responder {
    match roleplay_service::update_scenario(repo.get_ref(), &user, scenario_id.into_inner(), form)
    {
        Ok(_) => {
            FlashMessage::success("シナリオを更新しました。").send();
            redirect("/roleplay")
        }
        Err(err) => flash_error(err, "/roleplay", "シナリオの更新に失敗しました"),
    }
}

#[post("/roleplay/scenarios/{scenario_id}/delete")]
pub async fn delete_scenario(
    scenario_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    match roleplay_service::delete_scenario(repo.get_ref(), &user, scenario_id.into_inner()) {
        Ok(()) => {
            FlashMessage::success("シナリオを削除しました。").send();
            redirect("/roleplay")
        }
        Err(err) => flash_error(err, "/roleplay", "シナリオの削除に失敗しました"),
    }
}

#[post("/roleplay/sessions/start")]
pub async fn start_session(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    web::Form(form): web::Form<StartSessionForm>,
) -> impl Responder {
    let mut rng = rand::thread_rng();
    match roleplay_service::start_session(repo.get_ref(), &user, form, &mut rng) {
        Ok(session) => redirect(&format!("/roleplay/sessions/{}", session.id)),
        Err(err) => flash_error(err, "/roleplay", "セッションの開始に失敗しました"),
    }
}

#[get("/roleplay/sessions/{session_id}")]
pub async fn show_session(
    session_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    flash_messages: IncomingFlashMessages,
    server_config: web::Data<ServerConfig>,
    tera: web::Data<Tera>,
) -> impl Responder {
    match roleplay_service::show_session(repo.get_ref(), &user, session_id.into_inner()) {
        Ok(data) => {
            let mut context = base_context(
                &flash_messages,
                &user,
                "roleplay",
                &server_config.auth_service_url,
            );
            context.insert("session", &data.session);
            context.insert("scenario", &data.scenario);
            context.insert("can_submit", &data.can_submit);
            context.insert("can_grade", &data.can_grade);

            render_template(&tera, "roleplay/session.html", &context)
        }
        Err(err) => page_error(err, "roleplay session"),
    }
}

#[post("/roleplay/sessions/{session_id}/transcript")]
pub async fn submit_transcript(
    session_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    web::Form(form): web::Form<TranscriptForm>,
) -> impl Responder {
    let session_id = session_id.into_inner();
    let back = format!("/roleplay/sessions/{session_id}");
    match roleplay_service::submit_transcript(repo.get_ref(), &user, session_id, form) {
        Ok(_) => {
            FlashMessage::success("回答を提出しました。").send();
            redirect(&back)
        }
        Err(err) => flash_error(err, &back, "回答の提出に失敗しました"),
    }
}

#[post("/roleplay/sessions/{session_id}/grade")]
pub async fn grade_session(
    session_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    web::Form(form): web::Form<GradeSessionForm>,
) -> impl Responder {
    let session_id = session_id.into_inner();
    let back = format!("/roleplay/sessions/{session_id}");
    match roleplay_service::grade_session(repo.get_ref(), &user, session_id, form) {
        Ok(session) => {
            let score = session.score.map(|s| s.to_string()).unwrap_or_default();
            FlashMessage::success(format!("{score}点で採点しました。")).send();
            redirect(&back)
        }
        Err(err) => flash_error(err, &back, "採点に失敗しました"),
    }
}
