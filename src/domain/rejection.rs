//! Rejection insights and the analytics built on top of them.

use std::collections::{HashMap, HashSet};

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::company::Company;
use crate::domain::types::{CallId, CompanyId, HubId, InsightId, NonEmptyString};

text_enum!(
    /// Fixed buckets raw rejection categories are folded into.
    RejectionCategory {
        Price,
        Timing,
        NoNeed,
        Competitor,
        Authority,
        Trust,
        Other,
    }
);

impl RejectionCategory {
    fn keywords(self) -> &'static [&'static str] {
        match self {
            RejectionCategory::Price => &[
                "price", "cost", "budget", "expensive", "価格", "費用", "予算", "高い", "値段",
            ],
            RejectionCategory::Timing => &[
                "timing", "later", "busy", "next year", "not now", "時期", "タイミング", "忙しい",
                "来年", "今は",
            ],
            RejectionCategory::NoNeed => &[
                "no need", "not interested", "unnecessary", "不要", "必要ない", "興味",
                "間に合って",
            ],
            RejectionCategory::Competitor => &[
                "competitor", "already using", "other vendor", "競合", "他社", "導入済",
            ],
            RejectionCategory::Authority => &[
                "decision", "boss", "manager", "approval", "決裁", "上司", "担当外", "権限",
            ],
            RejectionCategory::Trust => &[
                "trust", "suspicious", "scam", "reputation", "信用", "信頼", "怪しい", "実績",
            ],
            RejectionCategory::Other => &[],
        }
    }

    /// Folds a free-text category into a bucket by keyword; the first bucket
    /// in declaration order with a matching keyword wins.
    pub fn classify(raw: &str) -> RejectionCategory {
        if let Ok(exact) = raw.parse::<RejectionCategory>() {
            return exact;
        }
        let text = raw.trim().to_lowercase();
        RejectionCategory::ALL
            .iter()
            .copied()
            .find(|category| category.keywords().iter().any(|kw| text.contains(kw)))
            .unwrap_or(RejectionCategory::Other)
    }

    pub fn label(self) -> &'static str {
        match self {
            RejectionCategory::Price => "価格",
            RejectionCategory::Timing => "時期",
            RejectionCategory::NoNeed => "ニーズなし",
            RejectionCategory::Competitor => "競合",
            RejectionCategory::Authority => "決裁権",
            RejectionCategory::Trust => "信頼",
            RejectionCategory::Other => "その他",
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct RejectionInsight {
    pub id: InsightId,
    pub hub_id: HubId,
    pub company_id: CompanyId,
    pub call_id: Option<CallId>,
    pub project: NonEmptyString,
    /// Raw category as typed by the operator.
    pub category: NonEmptyString,
    pub reason: Option<String>,
    pub created_at: NaiveDateTime,
}

impl RejectionInsight {
    pub fn bucket(&self) -> RejectionCategory {
        RejectionCategory::classify(&self.category)
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct NewRejectionInsight {
    pub hub_id: HubId,
    pub company_id: CompanyId,
    pub call_id: Option<CallId>,
    pub project: NonEmptyString,
    pub category: NonEmptyString,
    pub reason: Option<String>,
}

/// One row of the analytics table.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct CategoryStat {
    pub category: RejectionCategory,
    pub label: &'static str,
    pub count: usize,
    pub distinct_projects: usize,
    pub opportunity_score: f64,
}

/// Tallies insights into every bucket (including empty ones) and ranks them
/// by count descending, ties kept in declaration order.
pub fn analyze(insights: &[RejectionInsight]) -> Vec<CategoryStat> {
    let mut counts = [0usize; 7];
    let mut projects: [HashSet<&str>; 7] = Default::default();

    for insight in insights {
        let index = bucket_index(insight.bucket());
        counts[index] += 1;
        projects[index].insert(insight.project.as_str());
    }

    let mut stats: Vec<CategoryStat> = RejectionCategory::ALL
        .iter()
        .map(|&category| {
            let index = bucket_index(category);
            let count = counts[index];
            let distinct_projects = projects[index].len();
            CategoryStat {
                category,
                label: category.label(),
                count,
                distinct_projects,
                opportunity_score: opportunity_score(count, distinct_projects),
            }
        })
        .collect();
    // Stable sort keeps declaration order among equal counts.
    stats.sort_by(|a, b| b.count.cmp(&a.count));
    stats
}

fn bucket_index(category: RejectionCategory) -> usize {
    RejectionCategory::ALL
        .iter()
        .position(|c| *c == category)
        .unwrap_or(RejectionCategory::ALL.len() - 1)
}

/// `count × ln(distinct_projects + 1)`, rounded to two decimals.
pub fn opportunity_score(count: usize, distinct_projects: usize) -> f64 {
    let raw = count as f64 * ((distinct_projects + 1) as f64).ln();
    (raw * 100.0).round() / 100.0
}

/// Company whose most recent rejection was about timing.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct IncubationCandidate {
    pub company_id: CompanyId,
    pub company_name: String,
    pub project: String,
    pub reason: Option<String>,
    pub rejected_at: NaiveDateTime,
}

/// Companies whose latest insight buckets into `Timing`, newest first.
pub fn incubation_candidates(
    insights: &[RejectionInsight],
    companies: &[Company],
) -> Vec<IncubationCandidate> {
    let mut latest: HashMap<CompanyId, &RejectionInsight> = HashMap::new();
    for insight in insights {
        latest
            .entry(insight.company_id)
            .and_modify(|current| {
                if (insight.created_at, insight.id) > (current.created_at, current.id) {
                    *current = insight;
                }
            })
            .or_insert(insight);
    }

    let names: HashMap<CompanyId, &str> = companies
        .iter()
        .map(|c| (c.id, c.name.as_str()))
        .collect();

    let mut candidates: Vec<IncubationCandidate> = latest
        .into_values()
        .filter(|insight| insight.bucket() == RejectionCategory::Timing)
        .filter_map(|insight| {
            Some(IncubationCandidate {
                company_id: insight.company_id,
                company_name: names.get(&insight.company_id)?.to_string(),
                project: insight.project.to_string(),
                reason: insight.reason.clone(),
                rejected_at: insight.created_at,
            })
        })
        .collect();
    candidates.sort_by(|a, b| {
        b.rejected_at
            .cmp(&a.rejected_at)
            .then(a.company_id.cmp(&b.company_id))
    });
    candidates
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::CompanyName;

    fn at(day: u32) -> NaiveDateTime {
        chrono::NaiveDate::from_ymd_opt(2025, 6, day)
            .and_then(|d| d.and_hms_opt(12, 0, 0))
            .expect("valid datetime")
    }

    fn insight(id: i32, company: i32, project: &str, category: &str, day: u32) -> RejectionInsight {
        RejectionInsight {
            id: InsightId::new(id).expect("valid id"),
            hub_id: HubId::new(1).expect("valid hub"),
            company_id: CompanyId::new(company).expect("valid id"),
            call_id: None,
            project: NonEmptyString::new(project).expect("valid project"),
            category: NonEmptyString::new(category).expect("valid category"),
            reason: None,
            created_at: at(day),
        }
    }

    fn company(id: i32, name: &str) -> Company {
        Company {
            id: CompanyId::new(id).expect("valid id"),
            hub_id: HubId::new(1).expect("valid hub"),
            name: CompanyName::new(name).expect("valid name"),
            email: None,
            phone: None,
            address: None,
            industry: None,
            website: None,
            created_at: at(1),
            updated_at: at(1),
        }
    }

    #[test]
    fn classifies_english_and_japanese_keywords() {
        assert_eq!(RejectionCategory::classify("Too expensive"), RejectionCategory::Price);
        assert_eq!(RejectionCategory::classify("予算がない"), RejectionCategory::Price);
        assert_eq!(RejectionCategory::classify("来年また"), RejectionCategory::Timing);
        assert_eq!(RejectionCategory::classify("他社を利用中"), RejectionCategory::Competitor);
        assert_eq!(RejectionCategory::classify("上司に確認"), RejectionCategory::Authority);
        assert_eq!(RejectionCategory::classify("Not interested"), RejectionCategory::NoNeed);
        assert_eq!(RejectionCategory::classify("looks like a scam"), RejectionCategory::Trust);
        assert_eq!(RejectionCategory::classify("weather"), RejectionCategory::Other);
        assert_eq!(RejectionCategory::classify("NoNeed"), RejectionCategory::NoNeed);
    }

    #[test]
    fn analytics_cover_every_bucket_ranked_by_count() {
        let insights = vec![
            insight(1, 1, "A", "price", 1),
            insight(2, 2, "B", "budget", 2),
            insight(3, 3, "B", "高い", 3),
            insight(4, 1, "A", "busy", 4),
            insight(5, 4, "C", "trust issue", 5),
        ];
        let stats = analyze(&insights);
        assert_eq!(stats.len(), 7);
        assert_eq!(stats[0].category, RejectionCategory::Price);
        assert_eq!(stats[0].count, 3);
        assert_eq!(stats[0].distinct_projects, 2);
        assert_eq!(stats[0].opportunity_score, 3.3);
        // Ties keep declaration order.
        assert_eq!(stats[1].category, RejectionCategory::Timing);
        assert_eq!(stats[2].category, RejectionCategory::Trust);
        assert_eq!(stats[3].category, RejectionCategory::NoNeed);
        assert_eq!(stats[6].category, RejectionCategory::Other);
        assert_eq!(stats[6].opportunity_score, 0.0);
    }

    #[test]
    fn incubation_uses_latest_insight_per_company() {
        let insights = vec![
            insight(1, 1, "A", "timing", 1),
            insight(2, 1, "A", "price", 5),
            insight(3, 2, "B", "price", 1),
            insight(4, 2, "B", "来年検討", 3),
            insight(5, 3, "C", "later", 6),
        ];
        let companies = vec![company(1, "One"), company(2, "Two"), company(3, "Three")];
        let result = incubation_candidates(&insights, &companies);
        let names: Vec<&str> = result.iter().map(|c| c.company_name.as_str()).collect();
        assert_eq!(names, vec!["Three", "Two"]);
    }
}
