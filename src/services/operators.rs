//! Services handling operator administration and identity mapping.

use chrono::Utc;

use crate::auth::{AuthenticatedUser, ensure_role};
use crate::domain::compliance::AuditAction;
use crate::domain::operator::{NewOperator, Operator, OperatorWorkload};
use crate::domain::types::{EmailAddress, HubId, OperatorId};
use crate::dto::operators::OperatorsPageData;
use crate::forms::operators::{AddOperatorForm, AddOperatorPayload};
use crate::repository::{
    AppointmentListQuery, AppointmentReader, ComplianceWriter, OperatorReader, OperatorWriter,
};
use crate::services::compliance::record_audit;
use crate::services::{ServiceError, ServiceResult};
use crate::{SERVICE_DIRECTOR_ROLE, SERVICE_OPERATOR_ROLE};

/// Returns the operator row of the signed-in user, creating it on first visit.
pub fn current_operator<R>(repo: &R, user: &AuthenticatedUser) -> ServiceResult<Operator>
where
    R: OperatorReader + OperatorWriter + ?Sized,
{
    let hub_id = HubId::new(user.hub_id)?;
    let email = EmailAddress::new(user.email.as_str())?;

    if let Some(operator) = repo.get_operator_by_email(&email, hub_id)? {
        return Ok(operator);
    }

    let new_operator = NewOperator::try_new(user.hub_id, user.name.as_str(), email, None)?;
    let operator = repo.upsert_operator(&new_operator).map_err(|err| {
        log::error!("Failed to register operator {}: {err}", user.email);
        err
    })?;
    Ok(operator)
}

/// Operator whose rows the user is restricted to; `None` means every row.
pub fn visible_operator<R>(repo: &R, user: &AuthenticatedUser) -> ServiceResult<Option<OperatorId>>
where
    R: OperatorReader + OperatorWriter + ?Sized,
{
    if user.has_role(SERVICE_DIRECTOR_ROLE) || !user.has_role(SERVICE_OPERATOR_ROLE) {
        return Ok(None);
    }
    Ok(Some(current_operator(repo, user)?.id))
}

/// Picks the operator a new row is attributed to.
///
/// Directors may choose any operator of the hub; everyone else acts as
/// themselves.
pub fn acting_operator<R>(
    repo: &R,
    user: &AuthenticatedUser,
    requested: Option<OperatorId>,
) -> ServiceResult<Operator>
where
    R: OperatorReader + OperatorWriter + ?Sized,
{
    match requested {
        Some(operator_id) if user.has_role(SERVICE_DIRECTOR_ROLE) => {
            let hub_id = HubId::new(user.hub_id)?;
            repo.get_operator_by_id(operator_id, hub_id)?
                .ok_or_else(|| ServiceError::Form("オペレーターが見つかりません".to_string()))
        }
        _ => current_operator(repo, user),
    }
}

/// Loads all operators with the number of their open upcoming appointments.
pub fn list_operators<R>(repo: &R, user: &AuthenticatedUser) -> ServiceResult<OperatorsPageData>
where
    R: OperatorReader + AppointmentReader + ?Sized,
{
    ensure_role(user, SERVICE_DIRECTOR_ROLE)?;

    let hub_id = HubId::new(user.hub_id)?;
    let now = Utc::now().naive_utc();

    let appointments = repo.list_appointments(AppointmentListQuery::new(hub_id))?;
    let operators = repo
        .list_operators(hub_id)?
        .into_iter()
        .map(|operator| {
            let upcoming_appointments = appointments
                .iter()
                .filter(|a| {
                    a.operator_id == operator.id && a.scheduled_at >= now && !a.status.is_terminal()
                })
                .count();
            OperatorWorkload {
                operator,
                upcoming_appointments,
            }
        })
        .collect();

    Ok(OperatorsPageData { operators })
}

/// Validates the incoming form and creates or refreshes the operator.
pub fn add_operator<R>(
    repo: &R,
    user: &AuthenticatedUser,
    form: AddOperatorForm,
) -> ServiceResult<Operator>
where
    R: OperatorWriter + ComplianceWriter + ?Sized,
{
    ensure_role(user, SERVICE_DIRECTOR_ROLE)?;

    let payload = AddOperatorPayload::try_from(form)?;

    let hub_id = HubId::new(user.hub_id)?;

    let operator = repo.upsert_operator(&payload.into_domain(hub_id))?;

    record_audit(
        repo,
        user,
        AuditAction::Create,
        "operator",
        Some(operator.id.get()),
        Some(operator.email.to_string()),
    );

    Ok(operator)
}

/// Flips the operator's active flag.
pub fn toggle_operator<R>(
    repo: &R,
    user: &AuthenticatedUser,
    operator_id: i32,
) -> ServiceResult<Operator>
where
    R: OperatorReader + OperatorWriter + ComplianceWriter + ?Sized,
{
    ensure_role(user, SERVICE_DIRECTOR_ROLE)?;

    let hub_id = HubId::new(user.hub_id)?;
    let operator_id = OperatorId::new(operator_id)?;

    let operator = repo
        .get_operator_by_id(operator_id, hub_id)?
        .ok_or(ServiceError::NotFound)?;

    let operator = repo.set_operator_active(operator.id, hub_id, !operator.is_active)?;

    record_audit(
        repo,
        user,
        AuditAction::StatusChange,
        "operator",
        Some(operator.id.get()),
        Some(format!("is_active={}", operator.is_active)),
    );

    Ok(operator)
}

#[cfg(all(test, feature = "test-mocks"))]
mod tests {
    use super::*;
    use crate::repository::mock::MockRepository;
    use crate::services::test_support::{director, operator_user, sample_operator, viewer};

    #[test]
    fn existing_operator_is_not_upserted() {
        let mut repo = MockRepository::new();
        repo.expect_get_operator_by_email()
            .times(1)
            .returning(|_, _| Ok(Some(sample_operator(7, "op@example.com"))));
        repo.expect_upsert_operator().times(0);

        let operator = current_operator(&repo, &operator_user()).expect("operator");
        assert_eq!(operator.id.get(), 7);
    }

    #[test]
    fn first_visit_registers_operator() {
        let mut repo = MockRepository::new();
        repo.expect_get_operator_by_email()
            .returning(|_, _| Ok(None));
        repo.expect_upsert_operator()
            .withf(|new| new.email.as_str() == "op@example.com" && new.hub_id.get() == 42)
            .times(1)
            .returning(|_| Ok(sample_operator(9, "op@example.com")));

        let operator = current_operator(&repo, &operator_user()).expect("operator");
        assert_eq!(operator.id.get(), 9);
    }

    #[test]
    fn directors_see_every_row() {
        let mut repo = MockRepository::new();
        repo.expect_get_operator_by_email().times(0);
        assert_eq!(visible_operator(&repo, &director()).expect("visible"), None);
        assert_eq!(visible_operator(&repo, &viewer()).expect("visible"), None);
    }

    #[test]
    fn operators_see_their_own_rows() {
        let mut repo = MockRepository::new();
        repo.expect_get_operator_by_email()
            .returning(|_, _| Ok(Some(sample_operator(7, "op@example.com"))));
        assert_eq!(
            visible_operator(&repo, &operator_user()).expect("visible"),
            Some(OperatorId::new(7).expect("valid id"))
        );
    }

    #[test]
    fn operators_cannot_book_for_others() {
        let mut repo = MockRepository::new();
        repo.expect_get_operator_by_id().times(0);
        repo.expect_get_operator_by_email()
            .returning(|_, _| Ok(Some(sample_operator(7, "op@example.com"))));
        let requested = OperatorId::new(3).ok();
        let operator = acting_operator(&repo, &operator_user(), requested).expect("operator");
        assert_eq!(operator.id.get(), 7);
    }

    #[test]
    fn add_requires_director() {
        let mut repo = MockRepository::new();
        repo.expect_upsert_operator().times(0);
        let form = AddOperatorForm {
            name: "Sato".into(),
            email: "sato@example.com".into(),
            phone: None,
        };
        assert!(matches!(
            add_operator(&repo, &operator_user(), form),
            Err(ServiceError::Unauthorized)
        ));
    }

    #[test]
    fn toggle_flips_flag_and_audits() {
        let mut repo = MockRepository::new();
        repo.expect_get_operator_by_id()
            .returning(|_, _| Ok(Some(sample_operator(5, "a@example.com"))));
        repo.expect_set_operator_active()
            .withf(|id, _, active| id.get() == 5 && !*active)
            .times(1)
            .returning(|_, _, _| {
                let mut operator = sample_operator(5, "a@example.com");
                operator.is_active = false;
                Ok(operator)
            });
        repo.expect_create_audit_log()
            .withf(|log| log.action == AuditAction::StatusChange && log.entity == "operator")
            .times(1)
            .returning(|log| Ok(crate::services::test_support::audit_row(log)));

        let operator = toggle_operator(&repo, &director(), 5).expect("toggled");
        assert!(!operator.is_active);
    }
}
