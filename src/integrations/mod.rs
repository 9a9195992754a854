//! Clients for the external SaaS services the dashboard talks to.
//!
//! Each concern is a trait so services can be exercised with fakes;
//! [`HttpIntegrations`] implements all of them over `reqwest`.
#![allow(async_fn_in_trait)]

use std::time::Duration;

use chrono::NaiveDateTime;
use serde::Serialize;
use thiserror::Error;

use crate::domain::call::CallScore;
use crate::models::config::IntegrationsConfig;

pub mod calendar;
pub mod email;
pub mod phone;
pub mod scoring;
pub mod scraper;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, Error)]
pub enum IntegrationError {
    #[error("{0} integration is not configured")]
    Disabled(&'static str),

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{service} responded with {status}: {body}")]
    Status {
        service: &'static str,
        status: u16,
        body: String,
    },

    #[error("unexpected response: {0}")]
    Decode(String),
}

pub type IntegrationResult<T> = Result<T, IntegrationError>;

/// Event pushed to the shared calendar when an appointment is booked.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalendarEvent {
    pub title: String,
    pub description: Option<String>,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub attendee: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub body: String,
}

pub trait CalendarClient {
    /// Creates the event and returns the provider's event id.
    async fn create_event(&self, event: &CalendarEvent) -> IntegrationResult<String>;
}

pub trait EmailClient {
    async fn send_email(&self, message: &EmailMessage) -> IntegrationResult<()>;
}

pub trait PhoneClient {
    /// Starts an outbound call and returns the provider's call id.
    async fn dial(&self, from: &str, to: &str) -> IntegrationResult<String>;
}

pub trait ScoringClient {
    async fn score_transcript(&self, transcript: &str) -> IntegrationResult<CallScore>;
}

pub trait PageFetcher {
    /// Downloads the HTML of `url`.
    async fn fetch_page(&self, url: &str) -> IntegrationResult<String>;
}

/// `reqwest` implementation of every integration trait.
#[derive(Clone)]
pub struct HttpIntegrations {
    client: reqwest::Client,
    config: IntegrationsConfig,
}

impl HttpIntegrations {
    pub fn new(config: IntegrationsConfig) -> IntegrationResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!("toguna/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client, config })
    }

    fn endpoint(
        base: Option<&str>,
        service: &'static str,
        path: &str,
    ) -> IntegrationResult<String> {
        let base = base
            .map(str::trim)
            .filter(|b| !b.is_empty())
            .ok_or(IntegrationError::Disabled(service))?;
        Ok(format!("{}/{}", base.trim_end_matches('/'), path))
    }

    fn post(&self, url: &str) -> reqwest::RequestBuilder {
        self.client
            .post(url)
            .bearer_auth(&self.config.api_key)
    }

    async fn check(
        service: &'static str,
        response: reqwest::Response,
    ) -> IntegrationResult<reqwest::Response> {
        if response.status().is_success() {
            return Ok(response);
        }
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        Err(IntegrationError::Status {
            service,
            status,
            body,
        })
    }
}
