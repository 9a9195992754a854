//! Repository implementation for document templates, sends and follow-up rules.

use chrono::Utc;
use diesel::prelude::*;

use crate::{
    domain::{
        nurturing::{
            DocumentSend, DocumentTemplate, FollowupRule, NewDocumentSend, NewDocumentTemplate,
            NewFollowupRule, UpdateDocumentTemplate,
        },
        types::{CompanyId, FollowupRuleId, HubId, TemplateId},
    },
    models::nurturing::{
        DocumentSend as DbDocumentSend, DocumentTemplate as DbTemplate,
        FollowupRule as DbFollowupRule, NewDocumentSend as DbNewDocumentSend,
        NewDocumentTemplate as DbNewTemplate, NewFollowupRule as DbNewFollowupRule,
        UpdateDocumentTemplate as DbUpdateTemplate,
    },
    repository::{
        DieselRepository, NurturingReader, NurturingWriter,
        errors::{RepositoryError, RepositoryResult},
    },
};

impl NurturingReader for DieselRepository {
    fn get_template_by_id(
        &self,
        id: TemplateId,
        hub_id: HubId,
    ) -> RepositoryResult<Option<DocumentTemplate>> {
        use crate::schema::document_templates;

        let mut conn = self.conn()?;
        let template = document_templates::table
            .filter(document_templates::id.eq(id.get()))
            .filter(document_templates::hub_id.eq(hub_id.get()))
            .first::<DbTemplate>(&mut conn)
            .optional()?;

        template
            .map(|db| DocumentTemplate::try_from(db).map_err(RepositoryError::from))
            .transpose()
    }

    fn list_templates(&self, hub_id: HubId) -> RepositoryResult<Vec<DocumentTemplate>> {
        use crate::schema::document_templates;

        let mut conn = self.conn()?;
        document_templates::table
            .filter(document_templates::hub_id.eq(hub_id.get()))
            .order((document_templates::name.asc(), document_templates::id.asc()))
            .load::<DbTemplate>(&mut conn)?
            .into_iter()
            .map(|db| DocumentTemplate::try_from(db).map_err(RepositoryError::from))
            .collect()
    }

    fn list_document_sends(
        &self,
        hub_id: HubId,
        company_id: Option<CompanyId>,
    ) -> RepositoryResult<Vec<DocumentSend>> {
        use crate::schema::document_sends;

        let mut conn = self.conn()?;
        let mut items = document_sends::table
            .filter(document_sends::hub_id.eq(hub_id.get()))
            .into_boxed();

        if let Some(company_id) = company_id {
            items = items.filter(document_sends::company_id.eq(company_id.get()));
        }

        items
            .order((document_sends::sent_at.desc(), document_sends::id.desc()))
            .load::<DbDocumentSend>(&mut conn)?
            .into_iter()
            .map(|db| DocumentSend::try_from(db).map_err(RepositoryError::from))
            .collect()
    }

    fn list_followup_rules(&self, hub_id: HubId) -> RepositoryResult<Vec<FollowupRule>> {
        use crate::schema::followup_rules;

        let mut conn = self.conn()?;
        followup_rules::table
            .filter(followup_rules::hub_id.eq(hub_id.get()))
            .order(followup_rules::id.asc())
            .load::<DbFollowupRule>(&mut conn)?
            .into_iter()
            .map(|db| FollowupRule::try_from(db).map_err(RepositoryError::from))
            .collect()
    }

    fn list_hubs_with_active_rules(&self) -> RepositoryResult<Vec<HubId>> {
        use crate::schema::followup_rules;

        let mut conn = self.conn()?;
        followup_rules::table
            .filter(followup_rules::is_active.eq(true))
            .select(followup_rules::hub_id)
            .distinct()
            .order(followup_rules::hub_id.asc())
            .load::<i32>(&mut conn)?
            .into_iter()
            .map(|id| HubId::new(id).map_err(RepositoryError::from))
            .collect()
    }
}

impl NurturingWriter for DieselRepository {
    fn create_template(
        &self,
        template: &NewDocumentTemplate,
    ) -> RepositoryResult<DocumentTemplate> {
        use crate::schema::document_templates;

        let mut conn = self.conn()?;
        let insertable: DbNewTemplate = template.into();

        let db_template = diesel::insert_into(document_templates::table)
            .values(&insertable)
            .get_result::<DbTemplate>(&mut conn)?;

        DocumentTemplate::try_from(db_template).map_err(RepositoryError::from)
    }

    fn update_template(
        &self,
        id: TemplateId,
        hub_id: HubId,
        template: &UpdateDocumentTemplate,
    ) -> RepositoryResult<DocumentTemplate> {
        use crate::schema::document_templates;

        let mut conn = self.conn()?;
        let changes = DbUpdateTemplate::new(template, Utc::now().naive_utc());

        let db_template = diesel::update(
            document_templates::table
                .filter(document_templates::id.eq(id.get()))
                .filter(document_templates::hub_id.eq(hub_id.get())),
        )
        .set(&changes)
        .get_result::<DbTemplate>(&mut conn)?;

        DocumentTemplate::try_from(db_template).map_err(RepositoryError::from)
    }

    fn delete_template(&self, id: TemplateId, hub_id: HubId) -> RepositoryResult<()> {
        use crate::schema::document_templates;

        let mut conn = self.conn()?;
        let deleted = diesel::delete(
            document_templates::table
                .filter(document_templates::id.eq(id.get()))
                .filter(document_templates::hub_id.eq(hub_id.get())),
        )
        .execute(&mut conn)?;

        if deleted == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    fn create_document_send(&self, send: &NewDocumentSend) -> RepositoryResult<DocumentSend> {
        use crate::schema::document_sends;

        let mut conn = self.conn()?;
        let insertable: DbNewDocumentSend = send.into();

        let db_send = diesel::insert_into(document_sends::table)
            .values(&insertable)
            .get_result::<DbDocumentSend>(&mut conn)?;

        DocumentSend::try_from(db_send).map_err(RepositoryError::from)
    }

    fn create_followup_rule(&self, rule: &NewFollowupRule) -> RepositoryResult<FollowupRule> {
        use crate::schema::followup_rules;

        let mut conn = self.conn()?;
        let insertable: DbNewFollowupRule = rule.into();

        let db_rule = diesel::insert_into(followup_rules::table)
            .values(&insertable)
            .get_result::<DbFollowupRule>(&mut conn)?;

        FollowupRule::try_from(db_rule).map_err(RepositoryError::from)
    }

    fn set_followup_rule_active(
        &self,
        id: FollowupRuleId,
        hub_id: HubId,
        is_active: bool,
    ) -> RepositoryResult<FollowupRule> {
        use crate::schema::followup_rules;

        let mut conn = self.conn()?;
        let db_rule = diesel::update(
            followup_rules::table
                .filter(followup_rules::id.eq(id.get()))
                .filter(followup_rules::hub_id.eq(hub_id.get())),
        )
        .set(followup_rules::is_active.eq(is_active))
        .get_result::<DbFollowupRule>(&mut conn)?;

        FollowupRule::try_from(db_rule).map_err(RepositoryError::from)
    }

    fn delete_followup_rule(&self, id: FollowupRuleId, hub_id: HubId) -> RepositoryResult<()> {
        use crate::schema::followup_rules;

        let mut conn = self.conn()?;
        let deleted = diesel::delete(
            followup_rules::table
                .filter(followup_rules::id.eq(id.get()))
                .filter(followup_rules::hub_id.eq(hub_id.get())),
        )
        .execute(&mut conn)?;

        if deleted == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
