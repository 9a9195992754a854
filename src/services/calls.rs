//! Call logging, quality scoring, sentiment and golden calls.

use crate::auth::{AuthenticatedUser, ensure_role};
use crate::domain::call::{
    Call, CallScore, GoldenCall, build_call_listings, operator_averages, rank_scored_calls,
    summarize_sentiment,
};
use crate::domain::compliance::AuditAction;
use crate::domain::types::{CallId, GoldenCallId, HubId};
use crate::dto::calls::{CallsPageData, GoldenCallsPageData, QualityPageData, SentimentPageData};
use crate::forms::calls::{
    GoldenCallForm, GoldenCallPayload, RecordCallForm, RecordCallPayload, ScoreCallForm,
};
use crate::integrations::ScoringClient;
use crate::repository::{
    CallListQuery, CallReader, CallWriter, CompanyListQuery, CompanyReader, ComplianceWriter,
    OperatorReader, OperatorWriter,
};
use crate::services::companies::require_company;
use crate::services::compliance::record_audit;
use crate::services::operators::{acting_operator, visible_operator};
use crate::services::{ServiceError, ServiceResult};
use crate::{SERVICE_ACCESS_ROLE, SERVICE_DIRECTOR_ROLE};

/// Recent calls; operators see only their own.
pub fn list_calls<R>(repo: &R, user: &AuthenticatedUser) -> ServiceResult<CallsPageData>
where
    R: CallReader + CompanyReader + OperatorReader + OperatorWriter + ?Sized,
{
    ensure_role(user, SERVICE_ACCESS_ROLE)?;

    let hub_id = HubId::new(user.hub_id)?;

    let mut query = CallListQuery::new(hub_id);
    if let Some(operator_id) = visible_operator(repo, user)? {
        query = query.operator(operator_id);
    }

    let calls = repo.list_calls(query)?;
    let (_, companies) = repo.list_companies(CompanyListQuery::new(hub_id))?;
    let operators = repo.list_operators(hub_id)?;

    Ok(CallsPageData {
        calls: build_call_listings(calls, &companies, &operators),
        companies,
        operators,
        can_pick_operator: user.has_role(SERVICE_DIRECTOR_ROLE),
    })
}

pub fn record_call<R>(repo: &R, user: &AuthenticatedUser, form: RecordCallForm) -> ServiceResult<Call>
where
    R: CallWriter + CompanyReader + OperatorReader + OperatorWriter + ?Sized,
{
    ensure_role(user, SERVICE_ACCESS_ROLE)?;

    let payload = RecordCallPayload::try_from(form)?;

    let hub_id = HubId::new(user.hub_id)?;

    require_company(repo, hub_id, payload.company_id)?;
    let operator = acting_operator(repo, user, payload.operator_id)?;

    let call = repo
        .create_call(&payload.into_domain(hub_id, operator.id))
        .map_err(|err| {
            log::error!("Failed to record call: {err}");
            err
        })?;
    Ok(call)
}

/// Stores a manual quality score and sentiment label.
pub fn score_call<R>(
    repo: &R,
    user: &AuthenticatedUser,
    call_id: i32,
    form: ScoreCallForm,
) -> ServiceResult<Call>
where
    R: CallWriter + ComplianceWriter + ?Sized,
{
    ensure_role(user, SERVICE_DIRECTOR_ROLE)?;

    let score = CallScore::try_from(form)?;

    let hub_id = HubId::new(user.hub_id)?;
    let call_id = CallId::new(call_id)?;

    let call = repo.update_call_score(call_id, hub_id, &score)?;

    record_audit(
        repo,
        user,
        AuditAction::Update,
        "call",
        Some(call.id.get()),
        Some(format!("score={} sentiment={}", score.quality_score, score.sentiment)),
    );

    Ok(call)
}

/// Sends the transcript to the scoring service and stores its verdict.
pub async fn auto_score_call<R, S>(
    repo: &R,
    scoring: &S,
    user: &AuthenticatedUser,
    call_id: i32,
) -> ServiceResult<Call>
where
    R: CallReader + CallWriter + ComplianceWriter + ?Sized,
    S: ScoringClient + ?Sized,
{
    ensure_role(user, SERVICE_DIRECTOR_ROLE)?;

    let hub_id = HubId::new(user.hub_id)?;
    let call_id = CallId::new(call_id)?;

    let call = repo
        .get_call_by_id(call_id, hub_id)?
        .ok_or(ServiceError::NotFound)?;

    let Some(transcript) = call.transcript.as_deref().filter(|t| !t.trim().is_empty()) else {
        return Err(ServiceError::Form(
            "この通話には文字起こしがありません".to_string(),
        ));
    };

    let score = scoring.score_transcript(transcript).await.map_err(|err| {
        log::error!("Failed to score call {}: {err}", call.id);
        err
    })?;

    let call = repo.update_call_score(call.id, hub_id, &score)?;

    record_audit(
        repo,
        user,
        AuditAction::Update,
        "call",
        Some(call.id.get()),
        Some(format!(
            "auto score={} sentiment={}",
            score.quality_score, score.sentiment
        )),
    );

    Ok(call)
}

pub fn quality_dashboard<R>(repo: &R, user: &AuthenticatedUser) -> ServiceResult<QualityPageData>
where
    R: CallReader + CompanyReader + OperatorReader + ?Sized,
{
    ensure_role(user, SERVICE_DIRECTOR_ROLE)?;

    let hub_id = HubId::new(user.hub_id)?;

    let calls = repo.list_calls(CallListQuery::new(hub_id))?;
    let (_, companies) = repo.list_companies(CompanyListQuery::new(hub_id))?;
    let operators = repo.list_operators(hub_id)?;

    let listings = build_call_listings(calls, &companies, &operators);

    Ok(QualityPageData {
        ranked: rank_scored_calls(&listings),
        averages: operator_averages(&listings),
    })
}

pub fn sentiment_dashboard<R>(repo: &R, user: &AuthenticatedUser) -> ServiceResult<SentimentPageData>
where
    R: CallReader + CompanyReader + OperatorReader + ?Sized,
{
    ensure_role(user, SERVICE_DIRECTOR_ROLE)?;

    let hub_id = HubId::new(user.hub_id)?;

    let calls = repo.list_calls(CallListQuery::new(hub_id))?;
    let (_, companies) = repo.list_companies(CompanyListQuery::new(hub_id))?;
    let operators = repo.list_operators(hub_id)?;

    let listings = build_call_listings(calls, &companies, &operators);

    Ok(SentimentPageData {
        summary: summarize_sentiment(&listings),
    })
}

pub fn list_golden_calls<R>(repo: &R, user: &AuthenticatedUser) -> ServiceResult<GoldenCallsPageData>
where
    R: CallReader + ?Sized,
{
    ensure_role(user, SERVICE_DIRECTOR_ROLE)?;

    let hub_id = HubId::new(user.hub_id)?;

    Ok(GoldenCallsPageData {
        golden_calls: repo.list_golden_calls(hub_id)?,
    })
}

/// Curates a call as a golden example. A call is golden at most once.
pub fn mark_golden<R>(
    repo: &R,
    user: &AuthenticatedUser,
    form: GoldenCallForm,
) -> ServiceResult<GoldenCall>
where
    R: CallReader + CallWriter + ComplianceWriter + ?Sized,
{
    ensure_role(user, SERVICE_DIRECTOR_ROLE)?;

    let payload = GoldenCallPayload::try_from(form)?;

    let hub_id = HubId::new(user.hub_id)?;

    let call = repo
        .get_call_by_id(payload.call_id, hub_id)?
        .ok_or_else(|| ServiceError::Form("通話が見つかりません".to_string()))?;

    if repo.is_golden_call(call.id)? {
        return Err(ServiceError::Form(
            "この通話は既にゴールデンコールです".to_string(),
        ));
    }

    let golden = repo.create_golden_call(&payload.into_domain(hub_id))?;

    record_audit(
        repo,
        user,
        AuditAction::Create,
        "golden_call",
        Some(golden.id.get()),
        Some(golden.title.to_string()),
    );

    Ok(golden)
}

pub fn unmark_golden<R>(repo: &R, user: &AuthenticatedUser, golden_id: i32) -> ServiceResult<()>
where
    R: CallWriter + ComplianceWriter + ?Sized,
{
    ensure_role(user, SERVICE_DIRECTOR_ROLE)?;

    let hub_id = HubId::new(user.hub_id)?;
    let golden_id = GoldenCallId::new(golden_id)?;

    repo.delete_golden_call(golden_id, hub_id)?;

    record_audit(
        repo,
        user,
        AuditAction::Delete,
        "golden_call",
        Some(golden_id.get()),
        None,
    );

    Ok(())
}
