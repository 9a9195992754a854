use diesel::prelude::*;

use crate::{
    domain::{
        rejection::{NewRejectionInsight, RejectionInsight},
        types::{CompanyId, HubId},
    },
    models::rejection::{
        NewRejectionInsight as DbNewInsight, RejectionInsight as DbInsight,
    },
    repository::{
        DieselRepository, RejectionReader, RejectionWriter,
        errors::{RepositoryError, RepositoryResult},
    },
};

impl RejectionReader for DieselRepository {
    fn list_insights(
        &self,
        hub_id: HubId,
        company_id: Option<CompanyId>,
    ) -> RepositoryResult<Vec<RejectionInsight>> {
        use crate::schema::rejection_insights;

        let mut conn = self.conn()?;
        let mut items = rejection_insights::table
            .filter(rejection_insights::hub_id.eq(hub_id.get()))
            .into_boxed();

        if let Some(company_id) = company_id {
            items = items.filter(rejection_insights::company_id.eq(company_id.get()));
        }

        items
            .order((
                rejection_insights::created_at.desc(),
                rejection_insights::id.desc(),
            ))
            .load::<DbInsight>(&mut conn)?
            .into_iter()
            .map(|db| RejectionInsight::try_from(db).map_err(RepositoryError::from))
            .collect()
    }
}

impl RejectionWriter for DieselRepository {
    fn create_insight(&self, insight: &NewRejectionInsight) -> RepositoryResult<RejectionInsight> {
        use crate::schema::rejection_insights;

        let mut conn = self.conn()?;
        let insertable: DbNewInsight = insight.into();

        let db_insight = diesel::insert_into(rejection_insights::table)
            .values(&insertable)
            .get_result::<DbInsight>(&mut conn)?;

        RejectionInsight::try_from(db_insight).map_err(RepositoryError::from)
    }
}
