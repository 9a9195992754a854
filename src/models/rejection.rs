use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::rejection::{
    NewRejectionInsight as DomainNewInsight, RejectionInsight as DomainInsight,
};
use crate::domain::types::{
    CallId, CompanyId, HubId, InsightId, NonEmptyString, TypeConstraintError,
};

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::rejection_insights)]
/// Diesel model for [`crate::domain::rejection::RejectionInsight`].
pub struct RejectionInsight {
    pub id: i32,
    pub hub_id: i32,
    pub company_id: i32,
    pub call_id: Option<i32>,
    pub project: String,
    pub category: String,
    pub reason: Option<String>,
    pub created_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::rejection_insights)]
/// Insertable form of [`RejectionInsight`].
pub struct NewRejectionInsight<'a> {
    pub hub_id: i32,
    pub company_id: i32,
    pub call_id: Option<i32>,
    pub project: &'a str,
    pub category: &'a str,
    pub reason: Option<&'a str>,
}

impl TryFrom<RejectionInsight> for DomainInsight {
    type Error = TypeConstraintError;

    fn try_from(insight: RejectionInsight) -> Result<Self, Self::Error> {
        Ok(Self {
            id: InsightId::try_from(insight.id)?,
            hub_id: HubId::try_from(insight.hub_id)?,
            company_id: CompanyId::try_from(insight.company_id)?,
            call_id: insight.call_id.map(CallId::try_from).transpose()?,
            project: NonEmptyString::new(insight.project)?,
            category: NonEmptyString::new(insight.category)?,
            reason: insight.reason,
            created_at: insight.created_at,
        })
    }
}

impl<'a> From<&'a DomainNewInsight> for NewRejectionInsight<'a> {
    fn from(insight: &'a DomainNewInsight) -> Self {
        Self {
            hub_id: insight.hub_id.get(),
            company_id: insight.company_id.get(),
            call_id: insight.call_id.map(CallId::get),
            project: insight.project.as_str(),
            category: insight.category.as_str(),
            reason: insight.reason.as_deref(),
        }
    }
}
