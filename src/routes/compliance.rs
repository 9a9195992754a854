use actix_web::http::header;
use actix_web::{HttpResponse, Responder, get, post, web};
use actix_web_flash_messages::{FlashMessage, IncomingFlashMessages};
use chrono::Utc;
use tera::Tera;

use crate::auth::AuthenticatedUser;
use crate::domain::compliance::SubsidyStatus;
use crate::dto::compliance::AuditLogsQuery;
use crate::forms::compliance::{ComplianceDocumentForm, SubsidyReportForm, SubsidyStatusForm};
use crate::models::config::ServerConfig;
use crate::repository::DieselRepository;
use crate::routes::{base_context, flash_error, page_error, redirect, render_template};
use crate::services::compliance as compliance_service;

#[get("/subsidies")]
pub async fn subsidy_reports(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    flash_messages: IncomingFlashMessages,
    server_config: web::Data<ServerConfig>,
    tera: web::Data<Tera>,
) -> impl Responder {
    match compliance_service::list_subsidy_reports(repo.get_ref(), &user) {
        Ok(data) => {
            let mut context = base_context(
                &flash_messages,
                &user,
                "subsidies",
                &server_config.auth_service_url,
            );
            context.insert("reports", &data.reports);
            context.insert("totals", &data.totals);
            context.insert("companies", &data.companies);
            context.insert("statuses", SubsidyStatus::ALL);

            render_template(&tera, "compliance/subsidies.html", &context)
        }
        Err(err) => page_error(err, "subsidy reports"),
    }
}

#[post("/subsidies/add")]
pub async fn add_subsidy_report(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    web::Form(form): web::Form<SubsidyReportForm>,
) -> impl Responder {
    match compliance_service::create_subsidy_report(repo.get_ref(), &user, form) {
        Ok(_) => {
            FlashMessage::success("補助金レポートを作成しました。").send();
            redirect("/subsidies")
        }
        Err(err) => flash_error(err, "/subsidies", "補助金レポートの作成に失敗しました"),
    }
}

#[post("/subsidies/{report_id}/status")]
pub async fn update_subsidy_status(
    report_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    web::Form(form): web::Form<SubsidyStatusForm>,
) -> impl Responder {
    match compliance_service::update_subsidy_status(
        repo.get_ref(),
        &user,
        report_id.into_inner(),
        form,
    ) {
        Ok(report) => {
            FlashMessage::success(format!("ステータスを{}に変更しました。", report.status)).send();
            redirect("/subsidies")
        }
        Err(err) => flash_error(err, "/subsidies", "ステータスの変更に失敗しました"),
    }
}

#[post("/subsidies/{report_id}/delete")]
pub async fn delete_subsidy_report(
    report_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    match compliance_service::delete_subsidy_report(repo.get_ref(), &user, report_id.into_inner())
    {
        Ok(()) => {
            FlashMessage::success("補助金レポートを削除しました。").send();
            redirect("/subsidies")
        }
        Err(err) => flash_error(err, "/subsidies", "補助金レポートの削除に失敗しました"),
    }
}

#[get("/compliance/documents")]
pub async fn compliance_documents(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    flash_messages: IncomingFlashMessages,
    server_config: web::Data<ServerConfig>,
    tera: web::Data<Tera>,
) -> impl Responder {
    match compliance_service::list_compliance_documents(repo.get_ref(), &user) {
        Ok(data) => {
            let mut context = base_context(
                &flash_messages,
                &user,
                "documents",
                &server_config.auth_service_url,
            );
            context.insert("documents", &data.documents);
            context.insert("companies", &data.companies);

            render_template(&tera, "compliance/documents.html", &context)
        }
        Err(err) => page_error(err, "compliance documents"),
    }
}

#[post("/compliance/documents/add")]
pub async fn add_compliance_document(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    web::Form(form): web::Form<ComplianceDocumentForm>,
) -> impl Responder {
    match compliance_service::create_compliance_document(repo.get_ref(), &user, form) {
        Ok(_) => {
            FlashMessage::success("書類を登録しました。").send();
            redirect("/compliance/documents")
        }
        Err(err) => flash_error(err, "/compliance/documents", "書類の登録に失敗しました"),
    }
}

#[post("/compliance/documents/{document_id}/delete")]
pub async fn delete_compliance_document(
    document_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    match compliance_service::delete_compliance_document(
        repo.get_ref(),
        &user,
        document_id.into_inner(),
    ) {
        Ok(()) => {
            FlashMessage::success("書類を削除しました。").send();
            redirect("/compliance/documents")
        }
        Err(err) => flash_error(err, "/compliance/documents", "書類の削除に失敗しました"),
    }
}

#[get("/audit")]
pub async fn audit_logs(
    params: web::Query<AuditLogsQuery>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    flash_messages: IncomingFlashMessages,
    server_config: web::Data<ServerConfig>,
    tera: web::Data<Tera>,
) -> impl Responder {
    match compliance_service::list_audit_logs(repo.get_ref(), &user, params.into_inner()) {
        Ok(data) => {
            let mut context = base_context(
                &flash_messages,
                &user,
                "audit",
                &server_config.auth_service_url,
            );
            context.insert("logs", &data.logs);

            render_template(&tera, "compliance/audit.html", &context)
        }
        Err(err) => page_error(err, "audit logs"),
    }
}

#[get("/audit/export")]
pub async fn export_audit_logs(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    match compliance_service::export_audit_logs(repo.get_ref(), &user) {
        Ok(csv) => {
            let filename = format!("audit-{}.csv", Utc::now().format("%Y%m%d"));
            HttpResponse::Ok()
                .content_type("text/csv; charset=utf-8")
                .insert_header((
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{filename}\""),
                ))
                .body(csv)
        }
        Err(err) => page_error(err, "audit export"),
    }
}
