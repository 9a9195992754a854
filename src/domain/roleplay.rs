//! Roleplay training scenarios and operator practice sessions.

use std::collections::HashMap;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::operator::Operator;
use crate::domain::types::{
    HubId, NonEmptyString, OperatorId, ScenarioId, Score, SessionId, Title, TypeConstraintError,
};

/// Objections parsed from a one-per-line text block.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Objections(Vec<String>);

impl Objections {
    /// Trims each line and drops blank ones; at least one objection is required.
    pub fn parse(text: &str) -> Result<Self, TypeConstraintError> {
        let lines: Vec<String> = text
            .lines()
            .map(|line| ammonia::clean(line.trim()))
            .filter(|line| !line.is_empty())
            .collect();
        if lines.is_empty() {
            return Err(TypeConstraintError::EmptyString);
        }
        Ok(Self(lines))
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    /// Stored representation: one objection per line.
    pub fn to_text(&self) -> String {
        self.0.join("\n")
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct RoleplayScenario {
    pub id: ScenarioId,
    pub hub_id: HubId,
    pub title: Title,
    pub persona: NonEmptyString,
    pub objections: Objections,
    pub created_at: NaiveDateTime,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct NewRoleplayScenario {
    pub hub_id: HubId,
    pub title: Title,
    pub persona: NonEmptyString,
    pub objections: Objections,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct UpdateRoleplayScenario {
    pub title: Title,
    pub persona: NonEmptyString,
    pub objections: Objections,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct RoleplaySession {
    pub id: SessionId,
    pub hub_id: HubId,
    pub scenario_id: ScenarioId,
    pub operator_id: OperatorId,
    pub objection: String,
    pub transcript: Option<String>,
    pub score: Option<Score>,
    pub created_at: NaiveDateTime,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct NewRoleplaySession {
    pub hub_id: HubId,
    pub scenario_id: ScenarioId,
    pub operator_id: OperatorId,
    pub objection: String,
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct SessionListing {
    pub session: RoleplaySession,
    pub scenario_title: String,
    pub operator_name: String,
}

pub fn build_session_listings(
    sessions: Vec<RoleplaySession>,
    scenarios: &[RoleplayScenario],
    operators: &[Operator],
) -> Vec<SessionListing> {
    let titles: HashMap<ScenarioId, &str> = scenarios
        .iter()
        .map(|s| (s.id, s.title.as_str()))
        .collect();
    let names: HashMap<OperatorId, &str> = operators
        .iter()
        .map(|o| (o.id, o.name.as_str()))
        .collect();

    sessions
        .into_iter()
        .filter_map(|session| {
            Some(SessionListing {
                scenario_title: titles.get(&session.scenario_id)?.to_string(),
                operator_name: names.get(&session.operator_id)?.to_string(),
                session,
            })
        })
        .collect()
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct OperatorTrainingScore {
    pub operator_id: OperatorId,
    pub operator_name: String,
    pub graded_sessions: usize,
    pub average_score: f64,
}

/// Average graded score per operator, best first; ungraded sessions are ignored.
pub fn training_averages(listings: &[SessionListing]) -> Vec<OperatorTrainingScore> {
    let mut totals: HashMap<OperatorId, (String, i64, usize)> = HashMap::new();
    for listing in listings {
        if let Some(score) = listing.session.score {
            let entry = totals
                .entry(listing.session.operator_id)
                .or_insert_with(|| (listing.operator_name.clone(), 0, 0));
            entry.1 += i64::from(score.get());
            entry.2 += 1;
        }
    }
    let mut averages: Vec<OperatorTrainingScore> = totals
        .into_iter()
        .map(|(operator_id, (operator_name, sum, count))| OperatorTrainingScore {
            operator_id,
            operator_name,
            graded_sessions: count,
            average_score: ((sum as f64 / count as f64) * 10.0).round() / 10.0,
        })
        .collect();
    averages.sort_by(|a, b| {
        b.average_score
            .total_cmp(&a.average_score)
            .then_with(|| a.operator_name.cmp(&b.operator_name))
    });
    averages
}
