use serde::{Deserialize, Serialize};

use crate::integrations::{
    CalendarClient, CalendarEvent, HttpIntegrations, IntegrationError, IntegrationResult,
};

#[derive(Serialize)]
struct EventRequest<'a> {
    title: &'a str,
    description: Option<&'a str>,
    start: String,
    end: String,
    attendees: [&'a str; 1],
}

#[derive(Deserialize)]
struct EventResponse {
    id: String,
}

impl<'a> From<&'a CalendarEvent> for EventRequest<'a> {
    fn from(event: &'a CalendarEvent) -> Self {
        Self {
            title: &event.title,
            description: event.description.as_deref(),
            start: event.start.format("%Y-%m-%dT%H:%M:%S").to_string(),
            end: event.end.format("%Y-%m-%dT%H:%M:%S").to_string(),
            attendees: [&event.attendee],
        }
    }
}

impl CalendarClient for HttpIntegrations {
    async fn create_event(&self, event: &CalendarEvent) -> IntegrationResult<String> {
        let url = Self::endpoint(self.config.calendar_url.as_deref(), "calendar", "events")?;

        let response = self
            .post(&url)
            .json(&EventRequest::from(event))
            .send()
            .await?;
        let response = Self::check("calendar", response).await?;

        let created: EventResponse = response
            .json()
            .await
            .map_err(|e| IntegrationError::Decode(format!("calendar event: {e}")))?;
        Ok(created.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn event_times_are_iso_formatted() {
        let start = NaiveDate::from_ymd_opt(2025, 6, 2)
            .and_then(|d| d.and_hms_opt(10, 30, 0))
            .expect("valid datetime");
        let event = CalendarEvent {
            title: "Acme / Alice".into(),
            description: None,
            start,
            end: start + chrono::Duration::minutes(30),
            attendee: "alice@example.com".into(),
        };
        let request = EventRequest::from(&event);
        assert_eq!(request.start, "2025-06-02T10:30:00");
        assert_eq!(request.end, "2025-06-02T11:00:00");
        assert_eq!(request.attendees, ["alice@example.com"]);
    }
}
