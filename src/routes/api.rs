use actix_web::{HttpResponse, Responder, get, post, web};
use chrono::Utc;
use serde_json::json;

use crate::auth::AuthenticatedUser;
use crate::dto::api::{AppointmentsQuery, CompaniesQuery};
use crate::forms::fraud::FraudScoreRequest;
use crate::models::config::ServerConfig;
use crate::repository::DieselRepository;
use crate::services::{ServiceError, api as api_service, fraud as fraud_service};

/// JSON error body for a failed API call.
fn error_response(err: ServiceError, action: &str) -> HttpResponse {
    match err {
        ServiceError::Unauthorized => HttpResponse::Unauthorized().finish(),
        ServiceError::NotFound => HttpResponse::NotFound().finish(),
        ServiceError::Form(message) | ServiceError::TypeConstraint(message) => {
            HttpResponse::BadRequest().json(json!({ "error": message }))
        }
        err => {
            log::error!("Failed to {action}: {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

#[get("/v1/companies")]
pub async fn api_v1_companies(
    params: web::Query<CompaniesQuery>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    match api_service::list_companies(repo.get_ref(), &user, params.into_inner()) {
        Ok(response) => HttpResponse::Ok().json(response),
        Err(err) => error_response(err, "list companies"),
    }
}

#[get("/v1/appointments")]
pub async fn api_v1_appointments(
    params: web::Query<AppointmentsQuery>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    match api_service::list_appointments(repo.get_ref(), &user, params.into_inner()) {
        Ok(response) => HttpResponse::Ok().json(response),
        Err(err) => error_response(err, "list appointments"),
    }
}

#[get("/v1/dashboard")]
pub async fn api_v1_dashboard(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    server_config: web::Data<ServerConfig>,
) -> impl Responder {
    match api_service::dashboard_counters(
        repo.get_ref(),
        &user,
        server_config.fraud_threshold,
        Utc::now().date_naive(),
    ) {
        Ok(counters) => HttpResponse::Ok().json(counters),
        Err(err) => error_response(err, "load dashboard counters"),
    }
}

#[post("/v1/fraud-scores")]
pub async fn api_v1_fraud_scores(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    web::Json(request): web::Json<FraudScoreRequest>,
) -> impl Responder {
    match fraud_service::record_fraud_score(repo.get_ref(), &user, request) {
        Ok(score) => HttpResponse::Created().json(score),
        Err(err) => error_response(err, "ingest fraud score"),
    }
}
