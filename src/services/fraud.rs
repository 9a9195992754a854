//! Fraud score ingestion and the risk dashboard.

use crate::SERVICE_DIRECTOR_ROLE;
use crate::auth::{AuthenticatedUser, ensure_role};
use crate::domain::compliance::AuditAction;
use crate::domain::fraud::{FraudScore, build_dashboard};
use crate::domain::types::{HubId, Score};
use crate::dto::fraud::FraudPageData;
use crate::forms::FormError;
use crate::forms::fraud::FraudScorePayload;
use crate::repository::{
    CallReader, ComplianceWriter, FraudReader, FraudWriter, OperatorReader,
};
use crate::services::compliance::record_audit;
use crate::services::{ServiceError, ServiceResult};

/// Loads every score of the hub flagged against `threshold`.
pub fn fraud_dashboard<R>(
    repo: &R,
    user: &AuthenticatedUser,
    threshold: i32,
) -> ServiceResult<FraudPageData>
where
    R: FraudReader + OperatorReader + ?Sized,
{
    ensure_role(user, SERVICE_DIRECTOR_ROLE)?;

    let hub_id = HubId::new(user.hub_id)?;
    let threshold = Score::new(threshold).map_err(|err| {
        log::error!("Configured fraud threshold {threshold} is invalid: {err}");
        ServiceError::Internal(err.to_string())
    })?;

    let scores = repo.list_fraud_scores(hub_id)?;
    let operators = repo.list_operators(hub_id)?;

    Ok(FraudPageData {
        dashboard: build_dashboard(scores, &operators, threshold),
        operators,
    })
}

/// Stores a score submitted from the dashboard form or the JSON API.
pub fn record_fraud_score<R, F>(
    repo: &R,
    user: &AuthenticatedUser,
    input: F,
) -> ServiceResult<FraudScore>
where
    R: FraudWriter + OperatorReader + CallReader + ComplianceWriter + ?Sized,
    FraudScorePayload: TryFrom<F, Error = FormError>,
{
    ensure_role(user, SERVICE_DIRECTOR_ROLE)?;

    let payload = FraudScorePayload::try_from(input)?;

    let hub_id = HubId::new(user.hub_id)?;

    if repo.get_operator_by_id(payload.operator_id, hub_id)?.is_none() {
        return Err(ServiceError::Form("オペレーターが見つかりません".to_string()));
    }
    if let Some(call_id) = payload.call_id {
        match repo.get_call_by_id(call_id, hub_id)? {
            Some(call) if call.operator_id == payload.operator_id => {}
            _ => {
                return Err(ServiceError::Form(
                    "このオペレーターの通話ではありません".to_string(),
                ));
            }
        }
    }

    let score = repo.create_fraud_score(&payload.into_domain(hub_id))?;

    record_audit(
        repo,
        user,
        AuditAction::Create,
        "fraud_score",
        Some(score.id.get()),
        Some(format!("operator={} score={}", score.operator_id, score.score)),
    );

    Ok(score)
}

#[cfg(all(test, feature = "test-mocks"))]
mod tests {
    use super::*;
    use crate::domain::types::{FraudScoreId, NonEmptyString, OperatorId};
    use crate::forms::fraud::{FraudScoreForm, FraudScoreRequest};
    use crate::repository::mock::MockRepository;
    use crate::services::test_support::{
        at, audit_row, director, hub, operator_user, sample_call, sample_operator,
    };

    fn score(id: i32, operator_id: i32, value: i32) -> FraudScore {
        FraudScore {
            id: FraudScoreId::new(id).expect("valid id"),
            hub_id: hub(),
            operator_id: OperatorId::new(operator_id).expect("valid id"),
            call_id: None,
            score: Score::new(value).expect("valid score"),
            reason: NonEmptyString::new("script deviation").expect("valid reason"),
            created_at: at("2025-06-02", "12:00"),
        }
    }

    #[test]
    fn dashboard_flags_scores_at_threshold() {
        let mut repo = MockRepository::new();
        repo.expect_list_fraud_scores()
            .returning(|_| Ok(vec![score(1, 1, 40), score(2, 1, 70), score(3, 2, 95)]));
        repo.expect_list_operators().returning(|_| {
            Ok(vec![
                sample_operator(1, "a@example.com"),
                sample_operator(2, "b@example.com"),
            ])
        });

        let data = fraud_dashboard(&repo, &director(), 70).expect("dashboard");
        assert_eq!(data.dashboard.flagged_count, 2);
        assert_eq!(data.dashboard.listings[0].score.id.get(), 3);
    }

    #[test]
    fn invalid_threshold_is_internal() {
        let repo = MockRepository::new();
        assert!(matches!(
            fraud_dashboard(&repo, &director(), 120),
            Err(ServiceError::Internal(_))
        ));
    }

    #[test]
    fn api_request_is_recorded_and_audited() {
        let mut repo = MockRepository::new();
        repo.expect_get_operator_by_id()
            .returning(|id, _| Ok(Some(sample_operator(id.get(), "a@example.com"))));
        repo.expect_get_call_by_id()
            .returning(|id, _| Ok(Some(sample_call(id.get(), 7, None))));
        repo.expect_create_fraud_score()
            .withf(|new| new.score.get() == 81 && new.call_id.map(|c| c.get()) == Some(3))
            .times(1)
            .returning(|new| Ok(score(9, new.operator_id.get(), new.score.get())));
        repo.expect_create_audit_log()
            .withf(|log| log.entity == "fraud_score")
            .times(1)
            .returning(|log| Ok(audit_row(log)));

        let request = FraudScoreRequest {
            operator_id: 7,
            call_id: Some(3),
            score: 81,
            reason: "unusual call pattern".to_string(),
        };
        let stored = record_fraud_score(&repo, &director(), request).expect("recorded");
        assert_eq!(stored.id.get(), 9);
    }

    #[test]
    fn call_of_other_operator_is_rejected() {
        let mut repo = MockRepository::new();
        repo.expect_get_operator_by_id()
            .returning(|id, _| Ok(Some(sample_operator(id.get(), "a@example.com"))));
        repo.expect_get_call_by_id()
            .returning(|id, _| Ok(Some(sample_call(id.get(), 2, None))));
        repo.expect_create_fraud_score().times(0);

        let form = FraudScoreForm {
            operator_id: 7,
            call_id: Some("3".to_string()),
            score: 50,
            reason: "x".to_string(),
        };
        assert!(matches!(
            record_fraud_score(&repo, &director(), form),
            Err(ServiceError::Form(_))
        ));
    }

    #[test]
    fn operators_cannot_submit_scores() {
        let repo = MockRepository::new();
        let form = FraudScoreForm {
            operator_id: 7,
            call_id: None,
            score: 50,
            reason: "x".to_string(),
        };
        assert!(matches!(
            record_fraud_score(&repo, &operator_user(), form),
            Err(ServiceError::Unauthorized)
        ));
    }
}
