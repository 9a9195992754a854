//! Recorded calls, their quality scores and sentiment labels, and curated
//! golden calls.

use std::collections::HashMap;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::company::Company;
use crate::domain::operator::Operator;
use crate::domain::types::{
    CallId, CompanyId, GoldenCallId, HubId, OperatorId, Score, Title, WebUrl,
};

text_enum!(
    /// Result of an outbound call.
    CallOutcome {
        Appointment,
        Rejected,
        Callback,
        NoAnswer,
    }
);

text_enum!(
    /// Sentiment label assigned by scoring.
    Sentiment {
        Positive,
        Neutral,
        Negative,
    }
);

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Call {
    pub id: CallId,
    pub hub_id: HubId,
    pub company_id: CompanyId,
    pub operator_id: OperatorId,
    pub called_at: NaiveDateTime,
    pub duration_seconds: i32,
    pub outcome: CallOutcome,
    pub transcript: Option<String>,
    pub recording_url: Option<WebUrl>,
    pub quality_score: Option<Score>,
    pub sentiment: Option<Sentiment>,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct NewCall {
    pub hub_id: HubId,
    pub company_id: CompanyId,
    pub operator_id: OperatorId,
    pub called_at: NaiveDateTime,
    pub duration_seconds: i32,
    pub outcome: CallOutcome,
    pub transcript: Option<String>,
    pub recording_url: Option<WebUrl>,
}

/// Quality score and sentiment stored on a call after scoring.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct CallScore {
    pub quality_score: Score,
    pub sentiment: Sentiment,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct GoldenCall {
    pub id: GoldenCallId,
    pub hub_id: HubId,
    pub call_id: CallId,
    pub title: Title,
    pub reason: Option<String>,
    pub created_at: NaiveDateTime,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct NewGoldenCall {
    pub hub_id: HubId,
    pub call_id: CallId,
    pub title: Title,
    pub reason: Option<String>,
}

/// Call joined with display names.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct CallListing {
    pub call: Call,
    pub company_name: String,
    pub operator_name: String,
}

pub fn build_call_listings(
    calls: Vec<Call>,
    companies: &[Company],
    operators: &[Operator],
) -> Vec<CallListing> {
    let companies: HashMap<CompanyId, &Company> = companies.iter().map(|c| (c.id, c)).collect();
    let operators: HashMap<OperatorId, &Operator> = operators.iter().map(|o| (o.id, o)).collect();

    calls
        .into_iter()
        .filter_map(|call| {
            let company = companies.get(&call.company_id)?;
            let operator = operators.get(&call.operator_id)?;
            Some(CallListing {
                company_name: company.name.to_string(),
                operator_name: operator.name.to_string(),
                call,
            })
        })
        .collect()
}

/// Scored calls, best first; ties keep the newer call first.
pub fn rank_scored_calls(listings: &[CallListing]) -> Vec<CallListing> {
    let mut scored: Vec<CallListing> = listings
        .iter()
        .filter(|l| l.call.quality_score.is_some())
        .cloned()
        .collect();
    scored.sort_by(|a, b| {
        b.call
            .quality_score
            .cmp(&a.call.quality_score)
            .then(b.call.called_at.cmp(&a.call.called_at))
    });
    scored
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct OperatorAverage {
    pub operator_id: OperatorId,
    pub operator_name: String,
    pub average_score: f64,
    pub scored_calls: usize,
}

/// Average quality score per operator, highest first.
pub fn operator_averages(listings: &[CallListing]) -> Vec<OperatorAverage> {
    let mut totals: HashMap<OperatorId, (String, i64, usize)> = HashMap::new();
    for listing in listings {
        if let Some(score) = listing.call.quality_score {
            let entry = totals
                .entry(listing.call.operator_id)
                .or_insert_with(|| (listing.operator_name.clone(), 0, 0));
            entry.1 += i64::from(score.get());
            entry.2 += 1;
        }
    }

    let mut averages: Vec<OperatorAverage> = totals
        .into_iter()
        .map(|(operator_id, (operator_name, sum, count))| OperatorAverage {
            operator_id,
            operator_name,
            average_score: round1(sum as f64 / count as f64),
            scored_calls: count,
        })
        .collect();
    averages.sort_by(|a, b| {
        b.average_score
            .total_cmp(&a.average_score)
            .then_with(|| a.operator_name.cmp(&b.operator_name))
    });
    averages
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Label counts with percentages of the labelled calls.
#[derive(Clone, Debug, Default, Serialize, PartialEq)]
pub struct SentimentBreakdown {
    pub positive: usize,
    pub neutral: usize,
    pub negative: usize,
    pub unscored: usize,
    pub positive_pct: f64,
    pub neutral_pct: f64,
    pub negative_pct: f64,
}

impl SentimentBreakdown {
    fn add(&mut self, sentiment: Option<Sentiment>) {
        match sentiment {
            Some(Sentiment::Positive) => self.positive += 1,
            Some(Sentiment::Neutral) => self.neutral += 1,
            Some(Sentiment::Negative) => self.negative += 1,
            None => self.unscored += 1,
        }
    }

    fn finish(mut self) -> Self {
        let labelled = self.positive + self.neutral + self.negative;
        if labelled > 0 {
            let pct = |count: usize| round1(count as f64 * 100.0 / labelled as f64);
            self.positive_pct = pct(self.positive);
            self.neutral_pct = pct(self.neutral);
            self.negative_pct = pct(self.negative);
        }
        self
    }

    pub fn labelled(&self) -> usize {
        self.positive + self.neutral + self.negative
    }
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct OperatorSentiment {
    pub operator_id: OperatorId,
    pub operator_name: String,
    pub breakdown: SentimentBreakdown,
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct SentimentSummary {
    pub overall: SentimentBreakdown,
    pub by_operator: Vec<OperatorSentiment>,
}

/// Aggregates stored sentiment labels overall and per operator (operators
/// sorted by name).
pub fn summarize_sentiment(listings: &[CallListing]) -> SentimentSummary {
    let mut overall = SentimentBreakdown::default();
    let mut per_operator: HashMap<OperatorId, (String, SentimentBreakdown)> = HashMap::new();

    for listing in listings {
        overall.add(listing.call.sentiment);
        per_operator
            .entry(listing.call.operator_id)
            .or_insert_with(|| (listing.operator_name.clone(), SentimentBreakdown::default()))
            .1
            .add(listing.call.sentiment);
    }

    let mut by_operator: Vec<OperatorSentiment> = per_operator
        .into_iter()
        .map(|(operator_id, (operator_name, breakdown))| OperatorSentiment {
            operator_id,
            operator_name,
            breakdown: breakdown.finish(),
        })
        .collect();
    by_operator.sort_by(|a, b| a.operator_name.cmp(&b.operator_name));

    SentimentSummary {
        overall: overall.finish(),
        by_operator,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listing(
        id: i32,
        operator: (i32, &str),
        score: Option<i32>,
        sentiment: Option<Sentiment>,
        minute: u32,
    ) -> CallListing {
        let called_at = chrono::NaiveDate::from_ymd_opt(2025, 6, 2)
            .and_then(|d| d.and_hms_opt(10, minute, 0))
            .expect("valid datetime");
        CallListing {
            call: Call {
                id: CallId::new(id).expect("valid id"),
                hub_id: HubId::new(1).expect("valid hub"),
                company_id: CompanyId::new(1).expect("valid id"),
                operator_id: OperatorId::new(operator.0).expect("valid id"),
                called_at,
                duration_seconds: 120,
                outcome: CallOutcome::Rejected,
                transcript: None,
                recording_url: None,
                quality_score: score.map(|s| Score::new(s).expect("valid score")),
                sentiment,
            },
            company_name: "Acme".to_string(),
            operator_name: operator.1.to_string(),
        }
    }

    fn sample() -> Vec<CallListing> {
        vec![
            listing(1, (1, "Sato"), Some(80), Some(Sentiment::Positive), 0),
            listing(2, (2, "Abe"), Some(90), Some(Sentiment::Negative), 1),
            listing(3, (1, "Sato"), Some(60), Some(Sentiment::Positive), 2),
            listing(4, (2, "Abe"), None, None, 3),
            listing(5, (1, "Sato"), Some(90), Some(Sentiment::Neutral), 4),
        ]
    }

    #[test]
    fn ranks_scored_calls_newest_first_on_ties() {
        let ranked: Vec<i32> = rank_scored_calls(&sample())
            .iter()
            .map(|l| l.call.id.get())
            .collect();
        assert_eq!(ranked, vec![5, 2, 1, 3]);
    }

    #[test]
    fn averages_per_operator() {
        let averages = operator_averages(&sample());
        assert_eq!(averages.len(), 2);
        assert_eq!(averages[0].operator_name, "Abe");
        assert_eq!(averages[0].average_score, 90.0);
        assert_eq!(averages[1].operator_name, "Sato");
        assert_eq!(averages[1].average_score, 76.7);
        assert_eq!(averages[1].scored_calls, 3);
    }

    #[test]
    fn sentiment_counts_and_percentages() {
        let summary = summarize_sentiment(&sample());
        assert_eq!(summary.overall.positive, 2);
        assert_eq!(summary.overall.neutral, 1);
        assert_eq!(summary.overall.negative, 1);
        assert_eq!(summary.overall.unscored, 1);
        assert_eq!(summary.overall.positive_pct, 50.0);
        assert_eq!(summary.overall.labelled(), 4);

        assert_eq!(summary.by_operator[0].operator_name, "Abe");
        assert_eq!(summary.by_operator[0].breakdown.negative_pct, 100.0);
        assert_eq!(summary.by_operator[1].breakdown.positive_pct, 66.7);
    }

    #[test]
    fn empty_sentiment_has_zero_percentages() {
        let summary = summarize_sentiment(&[]);
        assert_eq!(summary.overall, SentimentBreakdown::default());
        assert!(summary.by_operator.is_empty());
    }
}
