//! Fraud risk scores recorded against operators and the dashboard that flags
//! them against the hub threshold.

use std::collections::HashMap;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::operator::Operator;
use crate::domain::types::{CallId, FraudScoreId, HubId, NonEmptyString, OperatorId, Score};

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct FraudScore {
    pub id: FraudScoreId,
    pub hub_id: HubId,
    pub operator_id: OperatorId,
    pub call_id: Option<CallId>,
    pub score: Score,
    pub reason: NonEmptyString,
    pub created_at: NaiveDateTime,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct NewFraudScore {
    pub hub_id: HubId,
    pub operator_id: OperatorId,
    pub call_id: Option<CallId>,
    pub score: Score,
    pub reason: NonEmptyString,
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct FraudListing {
    pub score: FraudScore,
    pub operator_name: String,
    pub flagged: bool,
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct OperatorRisk {
    pub operator_id: OperatorId,
    pub operator_name: String,
    pub max_score: Score,
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct FraudDashboard {
    pub threshold: Score,
    pub listings: Vec<FraudListing>,
    pub flagged_count: usize,
    pub operators: Vec<OperatorRisk>,
}

/// Sorts scores (highest first, newer first on ties), flags those at or above
/// `threshold` and computes the highest score per operator.
pub fn build_dashboard(
    scores: Vec<FraudScore>,
    operators: &[Operator],
    threshold: Score,
) -> FraudDashboard {
    let names: HashMap<OperatorId, &str> = operators
        .iter()
        .map(|o| (o.id, o.name.as_str()))
        .collect();

    let mut listings: Vec<FraudListing> = scores
        .into_iter()
        .filter_map(|score| {
            let operator_name = names.get(&score.operator_id)?.to_string();
            Some(FraudListing {
                flagged: score.score >= threshold,
                operator_name,
                score,
            })
        })
        .collect();
    listings.sort_by(|a, b| {
        b.score
            .score
            .cmp(&a.score.score)
            .then(b.score.created_at.cmp(&a.score.created_at))
            .then(b.score.id.cmp(&a.score.id))
    });

    let mut max_by_operator: HashMap<OperatorId, (String, Score)> = HashMap::new();
    for listing in &listings {
        max_by_operator
            .entry(listing.score.operator_id)
            .and_modify(|(_, max)| *max = (*max).max(listing.score.score))
            .or_insert_with(|| (listing.operator_name.clone(), listing.score.score));
    }
    let mut risks: Vec<OperatorRisk> = max_by_operator
        .into_iter()
        .map(|(operator_id, (operator_name, max_score))| OperatorRisk {
            operator_id,
            operator_name,
            max_score,
        })
        .collect();
    risks.sort_by(|a, b| {
        b.max_score
            .cmp(&a.max_score)
            .then_with(|| a.operator_name.cmp(&b.operator_name))
    });

    FraudDashboard {
        threshold,
        flagged_count: listings.iter().filter(|l| l.flagged).count(),
        listings,
        operators: risks,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::{EmailAddress, OperatorName};

    fn operator(id: i32, name: &str) -> Operator {
        Operator {
            id: OperatorId::new(id).expect("valid id"),
            hub_id: HubId::new(1).expect("valid hub"),
            name: OperatorName::new(name).expect("valid name"),
            email: EmailAddress::new(format!("op{id}@example.com")).expect("valid email"),
            phone: None,
            is_active: true,
        }
    }

    fn score(id: i32, operator: i32, value: i32, hour: u32) -> FraudScore {
        FraudScore {
            id: FraudScoreId::new(id).expect("valid id"),
            hub_id: HubId::new(1).expect("valid hub"),
            operator_id: OperatorId::new(operator).expect("valid id"),
            call_id: None,
            score: Score::new(value).expect("valid score"),
            reason: NonEmptyString::new("script deviation").expect("valid reason"),
            created_at: chrono::NaiveDate::from_ymd_opt(2025, 6, 2)
                .and_then(|d| d.and_hms_opt(hour, 0, 0))
                .expect("valid datetime"),
        }
    }

    #[test]
    fn sorts_flags_and_tracks_operator_maximum() {
        let operators = vec![operator(1, "Sato"), operator(2, "Abe")];
        let scores = vec![
            score(1, 1, 70, 9),
            score(2, 2, 40, 10),
            score(3, 1, 70, 11),
            score(4, 2, 85, 12),
            score(5, 9, 99, 12),
        ];
        let threshold = Score::new(70).expect("valid threshold");
        let dashboard = build_dashboard(scores, &operators, threshold);

        let order: Vec<i32> = dashboard.listings.iter().map(|l| l.score.id.get()).collect();
        assert_eq!(order, vec![4, 3, 1, 2]);
        assert_eq!(dashboard.flagged_count, 3);
        assert!(!dashboard.listings[3].flagged);

        assert_eq!(dashboard.operators.len(), 2);
        assert_eq!(dashboard.operators[0].operator_name, "Abe");
        assert_eq!(dashboard.operators[0].max_score.get(), 85);
        assert_eq!(dashboard.operators[1].max_score.get(), 70);
    }
}
