//! Repository implementation for prospect companies.

use chrono::Utc;
use diesel::prelude::*;

use crate::{
    domain::{
        company::{Company, NewCompany, UpdateCompany},
        types::{CompanyId, HubId},
    },
    models::company::{
        Company as DbCompany, NewCompany as DbNewCompany, UpdateCompany as DbUpdateCompany,
    },
    repository::{
        CompanyListQuery, CompanyReader, CompanyWriter, DieselRepository,
        errors::{RepositoryError, RepositoryResult},
    },
};

impl CompanyReader for DieselRepository {
    fn get_company_by_id(&self, id: CompanyId, hub_id: HubId) -> RepositoryResult<Option<Company>> {
        use crate::schema::companies;

        let mut conn = self.conn()?;
        let company = companies::table
            .filter(companies::id.eq(id.get()))
            .filter(companies::hub_id.eq(hub_id.get()))
            .first::<DbCompany>(&mut conn)
            .optional()?;

        company
            .map(|db| Company::try_from(db).map_err(RepositoryError::from))
            .transpose()
    }

    fn list_companies(&self, query: CompanyListQuery) -> RepositoryResult<(usize, Vec<Company>)> {
        use crate::schema::companies;

        let mut conn = self.conn()?;

        let query_builder = || {
            let mut items = companies::table
                .filter(companies::hub_id.eq(query.hub_id.get()))
                .into_boxed::<diesel::sqlite::Sqlite>();

            if let Some(term) = query.search.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
                let pattern = format!("%{term}%");
                items = items.filter(
                    companies::name
                        .like(pattern.clone())
                        .or(companies::email.like(pattern.clone()))
                        .or(companies::phone.like(pattern.clone()))
                        .or(companies::address.like(pattern.clone()))
                        .or(companies::industry.like(pattern)),
                );
            }
            items
        };

        let total = query_builder().count().get_result::<i64>(&mut conn)? as usize;

        let mut items = query_builder()
            .order(companies::name.asc())
            .then_order_by(companies::id.asc());
        if let Some(pagination) = &query.pagination {
            items = items.limit(pagination.limit()).offset(pagination.offset());
        }

        let companies = items
            .load::<DbCompany>(&mut conn)?
            .into_iter()
            .map(|db| Company::try_from(db).map_err(RepositoryError::from))
            .collect::<RepositoryResult<Vec<_>>>()?;

        Ok((total, companies))
    }
}

impl CompanyWriter for DieselRepository {
    fn create_companies(&self, new_companies: &[NewCompany]) -> RepositoryResult<usize> {
        use crate::schema::companies;

        let mut conn = self.conn()?;
        let insertables: Vec<DbNewCompany> = new_companies.iter().map(Into::into).collect();

        conn.transaction::<usize, diesel::result::Error, _>(|conn| {
            diesel::insert_into(companies::table)
                .values(&insertables)
                .execute(conn)
        })
        .map_err(RepositoryError::from)
    }

    fn update_company(
        &self,
        id: CompanyId,
        hub_id: HubId,
        updates: &UpdateCompany,
    ) -> RepositoryResult<Company> {
        use crate::schema::companies;

        let mut conn = self.conn()?;
        let db_updates = DbUpdateCompany::new(updates, Utc::now().naive_utc());

        let updated = diesel::update(
            companies::table
                .filter(companies::id.eq(id.get()))
                .filter(companies::hub_id.eq(hub_id.get())),
        )
        .set(&db_updates)
        .get_result::<DbCompany>(&mut conn)?;

        Company::try_from(updated).map_err(RepositoryError::from)
    }

    fn delete_company(&self, id: CompanyId, hub_id: HubId) -> RepositoryResult<()> {
        use crate::schema::companies;

        let mut conn = self.conn()?;
        let deleted = diesel::delete(
            companies::table
                .filter(companies::id.eq(id.get()))
                .filter(companies::hub_id.eq(hub_id.get())),
        )
        .execute(&mut conn)?;

        if deleted == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
