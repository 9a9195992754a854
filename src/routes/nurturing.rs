use actix_web::{Responder, get, post, web};
use actix_web_flash_messages::{FlashMessage, IncomingFlashMessages};
use tera::Tera;

use crate::auth::AuthenticatedUser;
use crate::domain::nurturing::SendStatus;
use crate::forms::nurturing::{FollowupRuleForm, SendDocumentForm, TemplateForm};
use crate::integrations::HttpIntegrations;
use crate::models::config::ServerConfig;
use crate::repository::DieselRepository;
use crate::routes::{base_context, flash_error, page_error, redirect, render_template};
use crate::services::nurturing as nurturing_service;

#[get("/templates")]
pub async fn templates(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    flash_messages: IncomingFlashMessages,
    server_config: web::Data<ServerConfig>,
    tera: web::Data<Tera>,
) -> impl Responder {
    match nurturing_service::list_templates(repo.get_ref(), &user) {
        Ok(data) => {
            let mut context = base_context(
                &flash_messages,
                &user,
                "templates",
                &server_config.auth_service_url,
            );
            context.insert("templates", &data.templates);

            render_template(&tera, "nurturing/templates.html", &context)
        }
        Err(err) => page_error(err, "templates"),
    }
}

#[get("/templates/{template_id}")]
pub async fn show_template(
    template_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    flash_messages: IncomingFlashMessages,
    server_config: web::Data<ServerConfig>,
    tera: web::Data<Tera>,
) -> impl Responder {
    match nurturing_service::get_template(repo.get_ref(), &user, template_id.into_inner()) {
        Ok(template) => {
            let mut context = base_context(
                &flash_messages,
                &user,
                "templates",
                &server_config.auth_service_url,
            );
            context.insert("template", &template);

            render_template(&tera, "nurturing/template.html", &context)
        }
        Err(err) => page_error(err, "template"),
    }
}

#[post("/templates/add")]
pub async fn add_template(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    web::Form(form): web::Form<TemplateForm>,
) -> impl Responder {
    match nurturing_service::create_template(repo.get_ref(), &user, form) {
        Ok(_) => {
            FlashMessage::success("テンプレートを作成しました。").send();
            redirect("/templates")
        }
        Err(err) => flash_error(err, "/templates", "テンプレートの作成に失敗しました"),
    }
}

#[post("/templates/{template_id}/update")]
pub async fn update_template(
    template_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    web::Form(form): web::Form<TemplateForm>,
) -> impl Responder {
    let template_id = template_id.into_inner();
    let back = format!("/templates/{template_id}");
    match nurturing_service::update_template(repo.get_ref(), &user, template_id, form) {
        Ok(_) => {
            FlashMessage::success("テンプレートを更新しました。").send();
            redirect(&back)
        }
        Err(err) => flash_error(err, &back, "テンプレートの更新に失敗しました"),
    }
}

#[post("/templates/{template_id}/delete")]
pub async fn delete_template(
    template_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    match nurturing_service::delete_template(repo.get_ref(), &user, template_id.into_inner()) {
        Ok(()) => {
            FlashMessage::success("テンプレートを削除しました。").send();
            redirect("/templates")
        }
        Err(err) => flash_error(err, "/templates", "テンプレートの削除に失敗しました"),
    }
}

#[post("/documents/send")]
pub async fn send_document(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    integrations: web::Data<HttpIntegrations>,
    web::Form(form): web::Form<SendDocumentForm>,
) -> impl Responder {
    let back = format!("/companies/{}", form.company_id);
    match nurturing_service::send_document(repo.get_ref(), integrations.get_ref(), &user, form)
        .await
    {
        Ok(send) if send.status == SendStatus::Sent => {
            FlashMessage::success(format!("{}へ資料を送信しました。", send.recipient)).send();
            redirect(&back)
        }
        Ok(send) => {
            FlashMessage::error(format!(
                "資料の送信に失敗しました: {}",
                send.error.unwrap_or_default()
            ))
            .send();
            redirect(&back)
        }
        Err(err) => flash_error(err, &back, "資料の送信に失敗しました"),
    }
}

#[get("/followups")]
pub async fn followup_rules(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    flash_messages: IncomingFlashMessages,
    server_config: web::Data<ServerConfig>,
    tera: web::Data<Tera>,
) -> impl Responder {
    match nurturing_service::list_followup_rules(repo.get_ref(), &user) {
        Ok(data) => {
            let mut context = base_context(
                &flash_messages,
                &user,
                "followups",
                &server_config.auth_service_url,
            );
            context.insert("rules", &data.rules);
            context.insert("templates", &data.templates);
            context.insert("outcomes", data.outcomes);

            render_template(&tera, "nurturing/followups.html", &context)
        }
        Err(err) => page_error(err, "follow-up rules"),
    }
}

#[post("/followups/add")]
pub async fn add_followup_rule(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    web::Form(form): web::Form<FollowupRuleForm>,
) -> impl Responder {
    match nurturing_service::create_followup_rule(repo.get_ref(), &user, form) {
        Ok(_) => {
            FlashMessage::success("フォローアップルールを追加しました。").send();
            redirect("/followups")
        }
        Err(err) => flash_error(err, "/followups", "フォローアップルールの追加に失敗しました"),
    }
}

#[post("/followups/{rule_id}/toggle")]
pub async fn toggle_followup_rule(
    rule_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    match nurturing_service::toggle_followup_rule(repo.get_ref(), &user, rule_id.into_inner()) {
        Ok(rule) => {
            let message = if rule.is_active {
                "ルールを有効にしました。"
            } else {
                "ルールを無効にしました。"
            };
            FlashMessage::success(message).send();
            redirect("/followups")
        }
        Err(err) => flash_error(err, "/followups", "ルールの切り替えに失敗しました"),
    }
}

#[post("/followups/{rule_id}/delete")]
pub async fn delete_followup_rule(
    rule_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    match nurturing_service::delete_followup_rule(repo.get_ref(), &user, rule_id.into_inner()) {
        Ok(()) => {
            FlashMessage::success("ルールを削除しました。").send();
            redirect("/followups")
        }
        Err(err) => flash_error(err, "/followups", "ルールの削除に失敗しました"),
    }
}

#[post("/followups/run")]
pub async fn run_followups(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    integrations: web::Data<HttpIntegrations>,
) -> impl Responder {
    match nurturing_service::run_followups_now(repo.get_ref(), integrations.get_ref(), &user)
        .await
    {
        Ok(summary) => {
            FlashMessage::info(format!(
                "送信 {}件、失敗 {}件、対象外 {}件",
                summary.sent, summary.failed, summary.skipped
            ))
            .send();
            redirect("/followups")
        }
        Err(err) => flash_error(err, "/followups", "フォローアップの送信に失敗しました"),
    }
}
