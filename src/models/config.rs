//! Configuration model loaded from external sources.

use serde::Deserialize;

fn default_fraud_threshold() -> i32 {
    70
}

fn default_worker_interval_secs() -> u64 {
    60
}

#[derive(Clone, Debug, Default, Deserialize)]
/// Credentials and base URLs of the external SaaS wrappers.
///
/// A missing URL disables the corresponding integration.
pub struct IntegrationsConfig {
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub from_email: String,
    pub calendar_url: Option<String>,
    pub email_url: Option<String>,
    pub phone_url: Option<String>,
    pub scoring_url: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
/// Basic configuration shared across handlers.
pub struct ServerConfig {
    pub domain: String,
    pub address: String,
    pub port: u16,
    pub database_url: String,
    pub templates_dir: String,
    pub secret: String,
    pub auth_service_url: String,
    /// Fraud scores at or above this value are flagged.
    #[serde(default = "default_fraud_threshold")]
    pub fraud_threshold: i32,
    #[serde(default = "default_worker_interval_secs")]
    pub worker_interval_secs: u64,
    #[serde(default)]
    pub integrations: IntegrationsConfig,
}

impl ServerConfig {
    /// Loads `config/default.yaml`, the optional `config/{APP_ENV}.yaml`
    /// profile (`local` by default) and `APP_*` environment overrides.
    pub fn load() -> Result<Self, config::ConfigError> {
        let app_env = std::env::var("APP_ENV").unwrap_or_else(|_| "local".into());

        config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            .add_source(config::File::with_name(&format!("config/{app_env}")).required(false))
            .add_source(config::Environment::with_prefix("APP").separator("__"))
            .build()?
            .try_deserialize()
    }
}
