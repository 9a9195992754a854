//! Services behind the company list, company page and phone dialing.

use crate::auth::{AuthenticatedUser, ensure_role};
use crate::domain::appointment::build_listings;
use crate::domain::call::build_call_listings;
use crate::domain::company::Company;
use crate::domain::compliance::AuditAction;
use crate::domain::types::{CompanyId, HubId};
use crate::dto::companies::{CompaniesPageData, CompaniesQuery, CompanyPageData};
use crate::forms::companies::{CompanyForm, CompanyPayload, UploadCompaniesForm};
use crate::integrations::PhoneClient;
use crate::pagination::{DEFAULT_ITEMS_PER_PAGE, Paginated};
use crate::repository::{
    AppointmentListQuery, AppointmentReader, CallListQuery, CallReader, CompanyListQuery,
    CompanyReader, CompanyWriter, ComplianceWriter, NurturingReader, OperatorReader,
    OperatorWriter, RejectionReader,
};
use crate::services::compliance::record_audit;
use crate::services::operators::{current_operator, visible_operator};
use crate::services::{ServiceError, ServiceResult};
use crate::{SERVICE_ACCESS_ROLE, SERVICE_DIRECTOR_ROLE};

/// Loads the paginated companies list, optionally filtered by a search term.
pub fn list_companies<R>(
    repo: &R,
    user: &AuthenticatedUser,
    query: CompaniesQuery,
) -> ServiceResult<CompaniesPageData>
where
    R: CompanyReader + ?Sized,
{
    ensure_role(user, SERVICE_ACCESS_ROLE)?;

    let hub_id = HubId::new(user.hub_id)?;
    let page = query.page.unwrap_or(1);

    let search_query = query
        .search
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty());

    let mut list_query = CompanyListQuery::new(hub_id).paginate(page, DEFAULT_ITEMS_PER_PAGE);
    if let Some(term) = &search_query {
        list_query = list_query.search(term.clone());
    }

    let (total, companies) = repo.list_companies(list_query).map_err(|err| {
        log::error!("Failed to list companies: {err}");
        err
    })?;

    Ok(CompaniesPageData {
        companies: Paginated::from_total(companies, page, total, DEFAULT_ITEMS_PER_PAGE),
        search_query,
    })
}

/// Loads a company with its appointments, calls, rejections and sends.
///
/// Operators only see their own appointments and calls.
pub fn show_company<R>(
    repo: &R,
    user: &AuthenticatedUser,
    company_id: i32,
) -> ServiceResult<CompanyPageData>
where
    R: CompanyReader
        + OperatorReader
        + OperatorWriter
        + AppointmentReader
        + CallReader
        + RejectionReader
        + NurturingReader
        + ?Sized,
{
    ensure_role(user, SERVICE_ACCESS_ROLE)?;

    let hub_id = HubId::new(user.hub_id)?;
    let company_id = CompanyId::new(company_id)?;

    let company = repo
        .get_company_by_id(company_id, hub_id)?
        .ok_or(ServiceError::NotFound)?;

    let restrict_to = visible_operator(repo, user)?;

    let mut appointment_query = AppointmentListQuery::new(hub_id).company(company_id);
    let mut call_query = CallListQuery::new(hub_id).company(company_id);
    if let Some(operator_id) = restrict_to {
        appointment_query = appointment_query.operator(operator_id);
        call_query = call_query.operator(operator_id);
    }

    let operators = repo.list_operators(hub_id)?;
    let companies = std::slice::from_ref(&company);

    let appointments = build_listings(
        repo.list_appointments(appointment_query)?,
        companies,
        &operators,
    );
    let calls = build_call_listings(repo.list_calls(call_query)?, companies, &operators);
    let insights = repo.list_insights(hub_id, Some(company_id))?;
    let sends = repo.list_document_sends(hub_id, Some(company_id))?;
    let templates = repo.list_templates(hub_id)?;

    Ok(CompanyPageData {
        company,
        appointments,
        calls,
        insights,
        sends,
        templates,
        operators,
    })
}

pub fn add_company<R>(repo: &R, user: &AuthenticatedUser, form: CompanyForm) -> ServiceResult<()>
where
    R: CompanyWriter + ComplianceWriter + ?Sized,
{
    ensure_role(user, SERVICE_DIRECTOR_ROLE)?;

    let payload = CompanyPayload::try_from(form)?;

    let hub_id = HubId::new(user.hub_id)?;

    let new_company = payload.into_domain(hub_id);
    let name = new_company.details.name.to_string();

    repo.create_companies(std::slice::from_ref(&new_company))
        .map_err(|err| {
            log::error!("Failed to add a company: {err}");
            err
        })?;

    record_audit(repo, user, AuditAction::Create, "company", None, Some(name));

    Ok(())
}

pub fn update_company<R>(
    repo: &R,
    user: &AuthenticatedUser,
    company_id: i32,
    form: CompanyForm,
) -> ServiceResult<Company>
where
    R: CompanyWriter + ComplianceWriter + ?Sized,
{
    ensure_role(user, SERVICE_DIRECTOR_ROLE)?;

    let payload = CompanyPayload::try_from(form)?;

    let hub_id = HubId::new(user.hub_id)?;
    let company_id = CompanyId::new(company_id)?;

    let company = repo.update_company(company_id, hub_id, &payload.into_update())?;

    record_audit(
        repo,
        user,
        AuditAction::Update,
        "company",
        Some(company.id.get()),
        Some(company.name.to_string()),
    );

    Ok(company)
}

/// Deletes the company; dependent rows are removed by the database.
pub fn delete_company<R>(repo: &R, user: &AuthenticatedUser, company_id: i32) -> ServiceResult<()>
where
    R: CompanyWriter + ComplianceWriter + ?Sized,
{
    ensure_role(user, SERVICE_DIRECTOR_ROLE)?;

    let hub_id = HubId::new(user.hub_id)?;
    let company_id = CompanyId::new(company_id)?;

    repo.delete_company(company_id, hub_id)?;

    record_audit(
        repo,
        user,
        AuditAction::Delete,
        "company",
        Some(company_id.get()),
        None,
    );

    Ok(())
}

/// Parses the uploaded CSV file and creates company records in bulk.
pub fn upload_companies<R>(
    repo: &R,
    user: &AuthenticatedUser,
    form: &UploadCompaniesForm,
) -> ServiceResult<usize>
where
    R: CompanyWriter + ComplianceWriter + ?Sized,
{
    ensure_role(user, SERVICE_DIRECTOR_ROLE)?;

    let hub_id = HubId::new(user.hub_id)?;

    let companies = form.parse(hub_id).map_err(|err| {
        log::warn!("Rejected companies upload: {err}");
        err
    })?;

    let created = repo.create_companies(&companies).map_err(|err| {
        log::error!("Failed to add companies: {err}");
        err
    })?;

    record_audit(
        repo,
        user,
        AuditAction::Import,
        "company",
        None,
        Some(format!("{created} rows")),
    );

    Ok(created)
}

/// Fails with a form error unless the company belongs to the hub.
pub(crate) fn require_company<R>(repo: &R, hub_id: HubId, company_id: CompanyId) -> ServiceResult<Company>
where
    R: CompanyReader + ?Sized,
{
    repo.get_company_by_id(company_id, hub_id)?
        .ok_or_else(|| ServiceError::Form("企業が見つかりません".to_string()))
}

/// Asks the phone integration to connect the current operator with the company.
pub async fn dial_company<R, P>(
    repo: &R,
    phone: &P,
    user: &AuthenticatedUser,
    company_id: i32,
) -> ServiceResult<String>
where
    R: CompanyReader + OperatorReader + OperatorWriter + ?Sized,
    P: PhoneClient + ?Sized,
{
    ensure_role(user, SERVICE_ACCESS_ROLE)?;

    let hub_id = HubId::new(user.hub_id)?;
    let company_id = CompanyId::new(company_id)?;

    let company = repo
        .get_company_by_id(company_id, hub_id)?
        .ok_or(ServiceError::NotFound)?;

    let Some(to) = company.phone else {
        return Err(ServiceError::Form(
            "この企業には電話番号が登録されていません".to_string(),
        ));
    };

    let operator = current_operator(repo, user)?;
    let Some(from) = operator.phone else {
        return Err(ServiceError::Form(
            "オペレーターの電話番号が登録されていません".to_string(),
        ));
    };

    let call_id = phone.dial(from.as_str(), to.as_str()).await.map_err(|err| {
        log::error!("Failed to dial company {}: {err}", company.id.get());
        err
    })?;

    log::info!(
        "Operator {} dialing company {} (call {call_id})",
        operator.id.get(),
        company.id.get()
    );

    Ok(call_id)
}

#[cfg(all(test, feature = "test-mocks"))]
mod tests {
    use std::cell::RefCell;

    use super::*;
    use crate::integrations::{IntegrationError, IntegrationResult};
    use crate::repository::mock::MockRepository;
    use crate::services::test_support::{
        audit_row, director, operator_user, sample_company, sample_operator,
    };

    #[derive(Default)]
    struct FakePhone {
        dialed: RefCell<Vec<(String, String)>>,
    }

    impl PhoneClient for FakePhone {
        async fn dial(&self, from: &str, to: &str) -> IntegrationResult<String> {
            self.dialed
                .borrow_mut()
                .push((from.to_string(), to.to_string()));
            Ok("call-1".to_string())
        }
    }

    struct UnconfiguredPhone;

    impl PhoneClient for UnconfiguredPhone {
        async fn dial(&self, _from: &str, _to: &str) -> IntegrationResult<String> {
            Err(IntegrationError::Disabled("phone"))
        }
    }

    fn form(name: &str) -> CompanyForm {
        CompanyForm {
            name: name.to_string(),
            email: Some("Info@Acme.jp".to_string()),
            phone: None,
            address: None,
            industry: None,
            website: None,
        }
    }

    #[test]
    fn list_trims_search_and_paginates() {
        let mut repo = MockRepository::new();
        repo.expect_list_companies()
            .withf(|query| {
                query.search.as_deref() == Some("acme")
                    && query.pagination.as_ref().map(|p| p.page) == Some(1)
            })
            .times(1)
            .returning(|_| Ok((1, vec![sample_company(1, "Acme")])));

        let data = list_companies(
            &repo,
            &operator_user(),
            CompaniesQuery {
                search: Some("  acme ".into()),
                page: None,
            },
        )
        .expect("companies");
        assert_eq!(data.search_query.as_deref(), Some("acme"));
        assert_eq!(data.companies.items.len(), 1);
    }

    #[test]
    fn add_requires_director() {
        let mut repo = MockRepository::new();
        repo.expect_create_companies().times(0);
        assert!(matches!(
            add_company(&repo, &operator_user(), form("Acme")),
            Err(ServiceError::Unauthorized)
        ));
    }

    #[test]
    fn add_normalizes_and_audits() {
        let mut repo = MockRepository::new();
        repo.expect_create_companies()
            .withf(|companies| {
                companies.len() == 1
                    && companies[0].details.email.as_ref().map(|e| e.as_str())
                        == Some("info@acme.jp")
            })
            .times(1)
            .returning(|companies| Ok(companies.len()));
        repo.expect_create_audit_log()
            .withf(|log| log.action == AuditAction::Create && log.details.as_deref() == Some("Acme"))
            .times(1)
            .returning(|log| Ok(audit_row(log)));

        add_company(&repo, &director(), form("Acme")).expect("added");
    }

    #[test]
    fn invalid_form_is_reported_as_form_error() {
        let repo = MockRepository::new();
        assert!(matches!(
            add_company(&repo, &director(), form(" ")),
            Err(ServiceError::Form(_))
        ));
    }

    #[test]
    fn show_restricts_operator_rows() {
        let mut repo = MockRepository::new();
        repo.expect_get_company_by_id()
            .returning(|_, _| Ok(Some(sample_company(1, "Acme"))));
        repo.expect_get_operator_by_email()
            .returning(|_, _| Ok(Some(sample_operator(7, "op@example.com"))));
        repo.expect_list_operators()
            .returning(|_| Ok(vec![sample_operator(7, "op@example.com")]));
        repo.expect_list_appointments()
            .withf(|query| query.operator_id.map(|id| id.get()) == Some(7))
            .times(1)
            .returning(|_| Ok(Vec::new()));
        repo.expect_list_calls()
            .withf(|query| query.operator_id.map(|id| id.get()) == Some(7))
            .times(1)
            .returning(|_| Ok(Vec::new()));
        repo.expect_list_insights().returning(|_, _| Ok(Vec::new()));
        repo.expect_list_document_sends()
            .returning(|_, _| Ok(Vec::new()));
        repo.expect_list_templates().returning(|_| Ok(Vec::new()));

        let data = show_company(&repo, &operator_user(), 1).expect("company page");
        assert_eq!(data.company.name.as_str(), "Acme");
    }

    #[test]
    fn missing_company_is_not_found() {
        let mut repo = MockRepository::new();
        repo.expect_get_company_by_id().returning(|_, _| Ok(None));
        assert!(matches!(
            show_company(&repo, &director(), 5),
            Err(ServiceError::NotFound)
        ));
    }

    #[actix_web::test]
    async fn dial_connects_operator_and_company() {
        let mut repo = MockRepository::new();
        repo.expect_get_company_by_id()
            .returning(|_, _| Ok(Some(sample_company(1, "Acme"))));
        repo.expect_get_operator_by_email()
            .returning(|_, _| Ok(Some(sample_operator(7, "op@example.com"))));
        let phone = FakePhone::default();

        let call_id = dial_company(&repo, &phone, &operator_user(), 1)
            .await
            .expect("dialed");
        assert_eq!(call_id, "call-1");
        assert_eq!(
            phone.dialed.borrow().as_slice(),
            [("+81398765432".to_string(), "+81312345678".to_string())]
        );
    }

    #[actix_web::test]
    async fn dial_without_company_phone_is_a_form_error() {
        let mut repo = MockRepository::new();
        repo.expect_get_company_by_id().returning(|_, _| {
            let mut company = sample_company(1, "Acme");
            company.phone = None;
            Ok(Some(company))
        });
        let phone = FakePhone::default();

        assert!(matches!(
            dial_company(&repo, &phone, &operator_user(), 1).await,
            Err(ServiceError::Form(_))
        ));
        assert!(phone.dialed.borrow().is_empty());
    }

    #[actix_web::test]
    async fn dial_without_phone_integration_reports_error() {
        let mut repo = MockRepository::new();
        repo.expect_get_company_by_id()
            .returning(|_, _| Ok(Some(sample_company(1, "Acme"))));
        repo.expect_get_operator_by_email()
            .returning(|_, _| Ok(Some(sample_operator(7, "op@example.com"))));

        assert!(matches!(
            dial_company(&repo, &UnconfiguredPhone, &operator_user(), 1).await,
            Err(ServiceError::Integration(IntegrationError::Disabled("phone")))
        ));
    }
}
