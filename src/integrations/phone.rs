use serde::{Deserialize, Serialize};

use crate::integrations::{HttpIntegrations, IntegrationError, IntegrationResult, PhoneClient};

#[derive(Serialize)]
struct DialRequest<'a> {
    from: &'a str,
    to: &'a str,
}

#[derive(Deserialize)]
struct DialResponse {
    call_id: String,
}

impl PhoneClient for HttpIntegrations {
    async fn dial(&self, from: &str, to: &str) -> IntegrationResult<String> {
        let url = Self::endpoint(self.config.phone_url.as_deref(), "phone", "calls")?;

        let response = self
            .post(&url)
            .json(&DialRequest { from, to })
            .send()
            .await?;
        let response = Self::check("phone", response).await?;

        let dialed: DialResponse = response
            .json()
            .await
            .map_err(|e| IntegrationError::Decode(format!("phone call: {e}")))?;
        Ok(dialed.call_id)
    }
}
