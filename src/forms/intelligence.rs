use serde::Deserialize;

use crate::{
    domain::{
        intelligence::{NewCrawlJob, NewNewsTrigger},
        types::{CompanyId, HubId, Keyword, WebUrl},
    },
    forms::FormError,
};

#[derive(Debug, Deserialize)]
pub struct CrawlJobForm {
    pub url: String,
}

pub struct CrawlJobPayload {
    pub url: WebUrl,
}

impl TryFrom<CrawlJobForm> for CrawlJobPayload {
    type Error = FormError;

    fn try_from(form: CrawlJobForm) -> Result<Self, Self::Error> {
        Ok(Self {
            url: WebUrl::new(form.url)?,
        })
    }
}

impl CrawlJobPayload {
    pub fn into_domain(self, hub_id: HubId) -> NewCrawlJob {
        NewCrawlJob {
            hub_id,
            url: self.url,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct NewsTriggerForm {
    pub company_id: i32,
    pub keyword: String,
}

pub struct NewsTriggerPayload {
    pub company_id: CompanyId,
    pub keyword: Keyword,
}

impl TryFrom<NewsTriggerForm> for NewsTriggerPayload {
    type Error = FormError;

    fn try_from(form: NewsTriggerForm) -> Result<Self, Self::Error> {
        Ok(Self {
            company_id: CompanyId::new(form.company_id)?,
            keyword: Keyword::new(ammonia::clean(&form.keyword))?,
        })
    }
}

impl NewsTriggerPayload {
    pub fn into_domain(self, hub_id: HubId) -> NewNewsTrigger {
        NewNewsTrigger {
            hub_id,
            company_id: self.company_id,
            keyword: self.keyword,
        }
    }
}
