//! Fixtures shared by the mock-backed service tests.

use chrono::{NaiveDate, NaiveDateTime};

use crate::auth::AuthenticatedUser;
use crate::domain::appointment::{Appointment, AppointmentStatus};
use crate::domain::call::{Call, CallOutcome};
use crate::domain::company::Company;
use crate::domain::compliance::{AuditLog, NewAuditLog, SubsidyReport, SubsidyStatus};
use crate::domain::nurturing::DocumentTemplate;
use crate::domain::operator::Operator;
use crate::domain::types::{
    AppointmentId, AuditLogId, CallId, CompanyId, CompanyName, EmailAddress, HubId,
    NonEmptyString, OperatorId, OperatorName, PhoneNumber, SubsidyReportId, TemplateId, Title,
    Yen,
};
use crate::{SERVICE_ACCESS_ROLE, SERVICE_DIRECTOR_ROLE, SERVICE_OPERATOR_ROLE};

pub const HUB: i32 = 42;

fn user(email: &str, roles: &[&str]) -> AuthenticatedUser {
    AuthenticatedUser {
        sub: "1".to_string(),
        email: email.to_string(),
        hub_id: HUB,
        name: "Test User".to_string(),
        roles: roles.iter().map(|r| r.to_string()).collect(),
        exp: 0,
    }
}

pub fn director() -> AuthenticatedUser {
    user(
        "boss@example.com",
        &[SERVICE_ACCESS_ROLE, SERVICE_DIRECTOR_ROLE],
    )
}

pub fn operator_user() -> AuthenticatedUser {
    user("op@example.com", &[SERVICE_ACCESS_ROLE, SERVICE_OPERATOR_ROLE])
}

/// Access role only.
pub fn viewer() -> AuthenticatedUser {
    user("viewer@example.com", &[SERVICE_ACCESS_ROLE])
}

pub fn hub() -> HubId {
    HubId::new(HUB).expect("valid hub")
}

pub fn at(date: &str, time: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(&format!("{date} {time}"), "%Y-%m-%d %H:%M")
        .expect("valid datetime")
}

pub fn sample_company(id: i32, name: &str) -> Company {
    Company {
        id: CompanyId::new(id).expect("valid id"),
        hub_id: hub(),
        name: CompanyName::new(name).expect("valid name"),
        email: EmailAddress::new(format!("info{id}@example.jp")).ok(),
        phone: PhoneNumber::new("+81312345678").ok(),
        address: None,
        industry: None,
        website: None,
        created_at: at("2025-01-01", "00:00"),
        updated_at: at("2025-01-01", "00:00"),
    }
}

pub fn sample_operator(id: i32, email: &str) -> Operator {
    Operator {
        id: OperatorId::new(id).expect("valid id"),
        hub_id: hub(),
        name: OperatorName::new(format!("Operator {id}")).expect("valid name"),
        email: EmailAddress::new(email).expect("valid email"),
        phone: PhoneNumber::new("+81398765432").ok(),
        is_active: true,
    }
}

pub fn sample_appointment(id: i32, operator_id: i32, status: AppointmentStatus) -> Appointment {
    Appointment {
        id: AppointmentId::new(id).expect("valid id"),
        hub_id: hub(),
        company_id: CompanyId::new(1).expect("valid id"),
        operator_id: OperatorId::new(operator_id).expect("valid id"),
        scheduled_at: at("2025-06-02", "10:00"),
        duration_minutes: 30,
        status,
        notes: None,
        calendar_event_id: None,
        created_at: at("2025-06-01", "09:00"),
        updated_at: at("2025-06-01", "09:00"),
    }
}

pub fn sample_call(id: i32, operator_id: i32, transcript: Option<&str>) -> Call {
    Call {
        id: CallId::new(id).expect("valid id"),
        hub_id: hub(),
        company_id: CompanyId::new(1).expect("valid id"),
        operator_id: OperatorId::new(operator_id).expect("valid id"),
        called_at: at("2025-06-02", "10:00"),
        duration_seconds: 120,
        outcome: CallOutcome::Rejected,
        transcript: transcript.map(str::to_string),
        recording_url: None,
        quality_score: None,
        sentiment: None,
    }
}

pub fn sample_template(id: i32) -> DocumentTemplate {
    DocumentTemplate {
        id: TemplateId::new(id).expect("valid id"),
        hub_id: hub(),
        name: Title::new("Intro").expect("valid title"),
        subject: NonEmptyString::new("{{company}}様").expect("valid subject"),
        body: NonEmptyString::new("{{operator}}より{{date}}にご連絡しました").expect("valid body"),
        created_at: at("2025-01-01", "00:00"),
        updated_at: at("2025-01-01", "00:00"),
    }
}

pub fn sample_report(id: i32, status: SubsidyStatus) -> SubsidyReport {
    SubsidyReport {
        id: SubsidyReportId::new(id).expect("valid id"),
        hub_id: hub(),
        company_id: CompanyId::new(1).expect("valid id"),
        program: Title::new("IT導入補助金").expect("valid title"),
        amount: Yen::new(300_000).expect("valid amount"),
        status,
        period_start: NaiveDate::from_ymd_opt(2025, 4, 1).expect("valid date"),
        period_end: NaiveDate::from_ymd_opt(2025, 9, 30).expect("valid date"),
        created_at: at("2025-01-01", "00:00"),
        updated_at: at("2025-01-01", "00:00"),
    }
}

/// Echoes an audit insert back as a stored row.
pub fn audit_row(log: &NewAuditLog) -> AuditLog {
    AuditLog {
        id: AuditLogId::new(1).expect("valid id"),
        hub_id: log.hub_id,
        actor_email: log.actor_email.clone(),
        action: log.action,
        entity: log.entity.clone(),
        entity_id: log.entity_id,
        details: log.details.clone(),
        created_at: at("2025-06-02", "12:00"),
    }
}
