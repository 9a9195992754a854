use diesel::prelude::*;

use crate::{
    domain::{
        fraud::{FraudScore, NewFraudScore},
        types::HubId,
    },
    models::fraud::{FraudScore as DbFraudScore, NewFraudScore as DbNewFraudScore},
    repository::{
        DieselRepository, FraudReader, FraudWriter,
        errors::{RepositoryError, RepositoryResult},
    },
};

impl FraudReader for DieselRepository {
    fn list_fraud_scores(&self, hub_id: HubId) -> RepositoryResult<Vec<FraudScore>> {
        use crate::schema::fraud_scores;

        let mut conn = self.conn()?;
        fraud_scores::table
            .filter(fraud_scores::hub_id.eq(hub_id.get()))
            .order((fraud_scores::created_at.desc(), fraud_scores::id.desc()))
            .load::<DbFraudScore>(&mut conn)?
            .into_iter()
            .map(|db| FraudScore::try_from(db).map_err(RepositoryError::from))
            .collect()
    }
}

impl FraudWriter for DieselRepository {
    fn create_fraud_score(&self, score: &NewFraudScore) -> RepositoryResult<FraudScore> {
        use crate::schema::fraud_scores;

        let mut conn = self.conn()?;
        let insertable: DbNewFraudScore = score.into();

        let db_score = diesel::insert_into(fraud_scores::table)
            .values(&insertable)
            .get_result::<DbFraudScore>(&mut conn)?;

        FraudScore::try_from(db_score).map_err(RepositoryError::from)
    }
}
