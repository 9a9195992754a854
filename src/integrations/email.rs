use serde::Serialize;

use crate::integrations::{EmailClient, EmailMessage, HttpIntegrations, IntegrationResult};

#[derive(Serialize)]
struct SendRequest<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    body: &'a str,
}

impl EmailClient for HttpIntegrations {
    async fn send_email(&self, message: &EmailMessage) -> IntegrationResult<()> {
        let url = Self::endpoint(self.config.email_url.as_deref(), "email", "send")?;

        let request = SendRequest {
            from: &self.config.from_email,
            to: &message.to,
            subject: &message.subject,
            body: &message.body,
        };

        let response = self.post(&url).json(&request).send().await?;
        Self::check("email", response).await?;
        Ok(())
    }
}
