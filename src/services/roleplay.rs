//! Roleplay training: scenarios, practice sessions and grading.

use rand::Rng;
use rand::seq::SliceRandom;

use crate::auth::{AuthenticatedUser, ensure_role};
use crate::domain::compliance::AuditAction;
use crate::domain::roleplay::{
    NewRoleplaySession, RoleplayScenario, RoleplaySession, build_session_listings,
    training_averages,
};
use crate::domain::types::{EmailAddress, HubId, NonEmptyString, ScenarioId, Score, SessionId};
use crate::dto::roleplay::{RoleplayPageData, SessionPageData};
use crate::forms::roleplay::{
    GradeSessionForm, ScenarioForm, ScenarioPayload, StartSessionForm, TranscriptForm,
};
use crate::repository::{
    ComplianceWriter, OperatorReader, OperatorWriter, RoleplayReader, RoleplayWriter,
};
use crate::services::compliance::record_audit;
use crate::services::operators::{current_operator, visible_operator};
use crate::services::{ServiceError, ServiceResult};
use crate::{SERVICE_ACCESS_ROLE, SERVICE_DIRECTOR_ROLE};

/// Scenarios plus the sessions the user may see.
pub fn load_roleplay<R>(repo: &R, user: &AuthenticatedUser) -> ServiceResult<RoleplayPageData>
where
    R: RoleplayReader + OperatorReader + OperatorWriter + ?Sized,
{
    ensure_role(user, SERVICE_ACCESS_ROLE)?;

    let hub_id = HubId::new(user.hub_id)?;

    let scenarios = repo.list_scenarios(hub_id)?;
    let sessions = repo.list_sessions(hub_id, visible_operator(repo, user)?)?;
    let operators = repo.list_operators(hub_id)?;

    let sessions = build_session_listings(sessions, &scenarios, &operators);
    let averages = training_averages(&sessions);

    Ok(RoleplayPageData {
        scenarios,
        sessions,
        averages,
    })
}

pub fn create_scenario<R>(
    repo: &R,
    user: &AuthenticatedUser,
    form: ScenarioForm,
) -> ServiceResult<RoleplayScenario>
where
    R: RoleplayWriter + ComplianceWriter + ?Sized,
{
    ensure_role(user, SERVICE_DIRECTOR_ROLE)?;

    let payload = ScenarioPayload::try_from(form)?;

    let hub_id = HubId::new(user.hub_id)?;

    let scenario = repo.create_scenario(&payload.into_domain(hub_id))?;

    record_audit(
        repo,
        user,
        AuditAction::Create,
        "roleplay_scenario",
        Some(scenario.id.get()),
        Some(scenario.title.to_string()),
    );

    Ok(scenario)
}

pub fn update_scenario<R>(
    repo: &R,
    user: &AuthenticatedUser,
    scenario_id: i32,
    form: ScenarioForm,
) -> ServiceResult<RoleplayScenario>
where
    R: RoleplayWriter + ComplianceWriter + ?Sized,
{
    ensure_role(user, SERVICE_DIRECTOR_ROLE)?;

    let payload = ScenarioPayload::try_from(form)?;

    let hub_id = HubId::new(user.hub_id)?;
    let scenario_id = ScenarioId::new(scenario_id)?;

    let scenario = repo.update_scenario(scenario_id, hub_id, &payload.into_update())?;

    record_audit(
        repo,
        user,
        AuditAction::Update,
        "roleplay_scenario",
        Some(scenario.id.get()),
        Some(scenario.title.to_string()),
    );

    Ok(scenario)
}

pub fn delete_scenario<R>(repo: &R, user: &AuthenticatedUser, scenario_id: i32) -> ServiceResult<()>
where
    R: RoleplayWriter + ComplianceWriter + ?Sized,
{
    ensure_role(user, SERVICE_DIRECTOR_ROLE)?;

    let hub_id = HubId::new(user.hub_id)?;
    let scenario_id = ScenarioId::new(scenario_id)?;

    repo.delete_scenario(scenario_id, hub_id)?;

    record_audit(
        repo,
        user,
        AuditAction::Delete,
        "roleplay_scenario",
        Some(scenario_id.get()),
        None,
    );

    Ok(())
}

/// Opens a practice session with an objection drawn at random.
pub fn start_session<R, G>(
    repo: &R,
    user: &AuthenticatedUser,
    form: StartSessionForm,
    rng: &mut G,
) -> ServiceResult<RoleplaySession>
where
    R: RoleplayReader + RoleplayWriter + OperatorReader + OperatorWriter + ?Sized,
    G: Rng + ?Sized,
{
    ensure_role(user, SERVICE_ACCESS_ROLE)?;

    let scenario_id = ScenarioId::try_from(form)?;

    let hub_id = HubId::new(user.hub_id)?;

    let scenario = repo
        .get_scenario_by_id(scenario_id, hub_id)?
        .ok_or_else(|| ServiceError::Form("シナリオが見つかりません".to_string()))?;

    let Some(objection) = scenario.objections.as_slice().choose(rng) else {
        return Err(ServiceError::Form(
            "シナリオに反論が登録されていません".to_string(),
        ));
    };

    let operator = current_operator(repo, user)?;

    let session = repo.create_session(&NewRoleplaySession {
        hub_id,
        scenario_id: scenario.id,
        operator_id: operator.id,
        objection: objection.clone(),
    })?;

    log::info!(
        "Operator {} started roleplay session {} on scenario {}",
        operator.id,
        session.id,
        scenario.id
    );

    Ok(session)
}

/// Loads one session; operators may only open their own.
pub fn show_session<R>(
    repo: &R,
    user: &AuthenticatedUser,
    session_id: i32,
) -> ServiceResult<SessionPageData>
where
    R: RoleplayReader + OperatorReader + OperatorWriter + ?Sized,
{
    ensure_role(user, SERVICE_ACCESS_ROLE)?;

    let hub_id = HubId::new(user.hub_id)?;
    let session_id = SessionId::new(session_id)?;

    let session = repo
        .get_session_by_id(session_id, hub_id)?
        .ok_or(ServiceError::NotFound)?;

    if let Some(operator_id) = visible_operator(repo, user)?
        && session.operator_id != operator_id
    {
        return Err(ServiceError::NotFound);
    }

    let scenario = repo
        .get_scenario_by_id(session.scenario_id, hub_id)?
        .ok_or(ServiceError::NotFound)?;
    let operators = repo.list_operators(hub_id)?;

    let email = EmailAddress::new(user.email.as_str())?;
    let own = operators
        .iter()
        .any(|operator| operator.id == session.operator_id && operator.email == email);
    let can_submit = own && session.score.is_none();
    let can_grade = user.has_role(SERVICE_DIRECTOR_ROLE)
        && session.transcript.is_some()
        && session.score.is_none();

    let session = build_session_listings(vec![session], std::slice::from_ref(&scenario), &operators)
        .pop()
        .ok_or(ServiceError::NotFound)?;

    Ok(SessionPageData {
        session,
        scenario,
        can_submit,
        can_grade,
    })
}

/// Stores the operator's transcript of their own ungraded session.
pub fn submit_transcript<R>(
    repo: &R,
    user: &AuthenticatedUser,
    session_id: i32,
    form: TranscriptForm,
) -> ServiceResult<RoleplaySession>
where
    R: RoleplayReader + RoleplayWriter + OperatorReader + OperatorWriter + ?Sized,
{
    ensure_role(user, SERVICE_ACCESS_ROLE)?;

    let transcript = NonEmptyString::try_from(form)?;

    let hub_id = HubId::new(user.hub_id)?;
    let session_id = SessionId::new(session_id)?;

    let session = repo
        .get_session_by_id(session_id, hub_id)?
        .ok_or(ServiceError::NotFound)?;

    if current_operator(repo, user)?.id != session.operator_id {
        return Err(ServiceError::NotFound);
    }
    if session.score.is_some() {
        return Err(ServiceError::Form(
            "採点済みのセッションは変更できません".to_string(),
        ));
    }

    Ok(repo.submit_session_transcript(session.id, hub_id, transcript.as_str())?)
}

pub fn grade_session<R>(
    repo: &R,
    user: &AuthenticatedUser,
    session_id: i32,
    form: GradeSessionForm,
) -> ServiceResult<RoleplaySession>
where
    R: RoleplayReader + RoleplayWriter + ComplianceWriter + ?Sized,
{
    ensure_role(user, SERVICE_DIRECTOR_ROLE)?;

    let score = Score::try_from(form)?;

    let hub_id = HubId::new(user.hub_id)?;
    let session_id = SessionId::new(session_id)?;

    let session = repo
        .get_session_by_id(session_id, hub_id)?
        .ok_or(ServiceError::NotFound)?;

    if session.transcript.is_none() {
        return Err(ServiceError::Form(
            "文字起こしが提出されていません".to_string(),
        ));
    }

    let graded = repo.grade_session(session.id, hub_id, score)?;

    record_audit(
        repo,
        user,
        AuditAction::Update,
        "roleplay_session",
        Some(graded.id.get()),
        Some(format!("score={score}")),
    );

    Ok(graded)
}

#[cfg(all(test, feature = "test-mocks"))]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;
    use crate::domain::roleplay::Objections;
    use crate::domain::types::{OperatorId, Title};
    use crate::repository::mock::MockRepository;
    use crate::services::test_support::{
        at, audit_row, director, hub, operator_user, sample_operator,
    };

    fn scenario(id: i32) -> RoleplayScenario {
        RoleplayScenario {
            id: ScenarioId::new(id).expect("valid id"),
            hub_id: hub(),
            title: Title::new("Busy CFO").expect("valid title"),
            persona: NonEmptyString::new("Short on time").expect("valid persona"),
            objections: Objections::parse("高い\n今は忙しい").expect("valid objections"),
            created_at: at("2025-06-01", "09:00"),
        }
    }

    fn session(id: i32, operator_id: i32, transcript: Option<&str>, score: Option<i32>) -> RoleplaySession {
        RoleplaySession {
            id: SessionId::new(id).expect("valid id"),
            hub_id: hub(),
            scenario_id: ScenarioId::new(1).expect("valid id"),
            operator_id: OperatorId::new(operator_id).expect("valid id"),
            objection: "高い".to_string(),
            transcript: transcript.map(str::to_string),
            score: score.and_then(|s| Score::new(s).ok()),
            created_at: at("2025-06-02", "09:00"),
        }
    }

    #[test]
    fn session_draws_objection_from_scenario() {
        let mut repo = MockRepository::new();
        repo.expect_get_scenario_by_id()
            .returning(|id, _| Ok(Some(scenario(id.get()))));
        repo.expect_get_operator_by_email()
            .returning(|_, _| Ok(Some(sample_operator(7, "op@example.com"))));
        repo.expect_create_session()
            .withf(|new| {
                new.operator_id.get() == 7 && ["高い", "今は忙しい"].contains(&new.objection.as_str())
            })
            .times(1)
            .returning(|new| {
                let mut created = session(5, new.operator_id.get(), None, None);
                created.objection = new.objection.clone();
                Ok(created)
            });
        let mut rng = StdRng::seed_from_u64(7);

        let started = start_session(
            &repo,
            &operator_user(),
            StartSessionForm { scenario_id: 1 },
            &mut rng,
        )
        .expect("started");
        assert_eq!(started.id.get(), 5);
    }

    #[test]
    fn transcript_only_for_own_session() {
        let mut repo = MockRepository::new();
        repo.expect_get_session_by_id()
            .returning(|id, _| Ok(Some(session(id.get(), 3, None, None))));
        repo.expect_get_operator_by_email()
            .returning(|_, _| Ok(Some(sample_operator(7, "op@example.com"))));
        repo.expect_submit_session_transcript().times(0);

        let form = TranscriptForm {
            transcript: "ご検討ください".to_string(),
        };
        assert!(matches!(
            submit_transcript(&repo, &operator_user(), 5, form),
            Err(ServiceError::NotFound)
        ));
    }

    #[test]
    fn graded_session_is_locked() {
        let mut repo = MockRepository::new();
        repo.expect_get_session_by_id()
            .returning(|id, _| Ok(Some(session(id.get(), 7, Some("x"), Some(80)))));
        repo.expect_get_operator_by_email()
            .returning(|_, _| Ok(Some(sample_operator(7, "op@example.com"))));
        repo.expect_submit_session_transcript().times(0);

        let form = TranscriptForm {
            transcript: "やり直し".to_string(),
        };
        assert!(matches!(
            submit_transcript(&repo, &operator_user(), 5, form),
            Err(ServiceError::Form(_))
        ));
    }

    #[test]
    fn grading_requires_transcript() {
        let mut repo = MockRepository::new();
        repo.expect_get_session_by_id()
            .returning(|id, _| Ok(Some(session(id.get(), 7, None, None))));
        repo.expect_grade_session().times(0);

        assert!(matches!(
            grade_session(&repo, &director(), 5, GradeSessionForm { score: 70 }),
            Err(ServiceError::Form(_))
        ));
    }

    #[test]
    fn grading_is_audited() {
        let mut repo = MockRepository::new();
        repo.expect_get_session_by_id()
            .returning(|id, _| Ok(Some(session(id.get(), 7, Some("x"), None))));
        repo.expect_grade_session()
            .withf(|_, _, score| score.get() == 70)
            .times(1)
            .returning(|id, _, score| Ok(session(id.get(), 7, Some("x"), Some(score.get()))));
        repo.expect_create_audit_log()
            .withf(|log| log.entity == "roleplay_session")
            .times(1)
            .returning(|log| Ok(audit_row(log)));

        let graded =
            grade_session(&repo, &director(), 5, GradeSessionForm { score: 70 }).expect("graded");
        assert_eq!(graded.score.map(|s| s.get()), Some(70));
    }

    #[test]
    fn operator_sees_own_sessions_only() {
        let mut repo = MockRepository::new();
        repo.expect_list_scenarios()
            .returning(|_| Ok(vec![scenario(1)]));
        repo.expect_get_operator_by_email()
            .returning(|_, _| Ok(Some(sample_operator(7, "op@example.com"))));
        repo.expect_list_sessions()
            .withf(|_, operator_id| operator_id.map(|id| id.get()) == Some(7))
            .times(1)
            .returning(|_, _| Ok(vec![session(1, 7, Some("x"), Some(60))]));
        repo.expect_list_operators()
            .returning(|_| Ok(vec![sample_operator(7, "op@example.com")]));

        let data = load_roleplay(&repo, &operator_user()).expect("roleplay");
        assert_eq!(data.sessions.len(), 1);
        assert_eq!(data.averages[0].average_score, 60.0);
    }
}
