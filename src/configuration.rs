//! src/configuration.rs

use crate::analytics::{GoogleAnalyticsClient, MetaPixelClient, MixpanelClient};
use crate::store::RestStore;
use secrecy::{ExposeSecret, Secret};
use serde_aux::field_attributes::deserialize_number_from_string;
use sqlx::postgres::{PgConnectOptions, PgSslMode};
use sqlx::ConnectOptions;
use std::time::Duration;

#[derive(serde::Deserialize, Clone)]
pub struct Settings {
    pub database: DatabaseSettings,
    pub application: ApplicationSettings,
    pub store: StoreSettings,
    pub analytics: AnalyticsSettings,
}

#[derive(serde::Deserialize, Clone)]
pub struct ApplicationSettings {
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub port: u16,
    pub host: String,
    pub base_url: String,
    /// Prefix all routes are mounted under, e.g. `/acquiredtaste` when served
    /// next to other sites. Empty for the root.
    #[serde(default)]
    pub path_prefix: String,
    pub hmac_secret: Secret<String>,
    #[serde(default)]
    pub assets_url: String,
}

#[derive(serde::Deserialize, Clone)]
pub struct DatabaseSettings {
    pub username: String,
    pub password: Secret<String>,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub port: u16,
    pub host: String,
    pub database_name: String,
    pub require_ssl: bool,
}

impl DatabaseSettings {
    pub fn without_db(&self) -> PgConnectOptions {
        let ssl_mode = if self.require_ssl {
            PgSslMode::Require
        } else {
            // Try an encrypted connection, fallback to unencrypted if it fails
            PgSslMode::Prefer
        };
        PgConnectOptions::new()
            .host(&self.host)
            .username(&self.username)
            .password(self.password.expose_secret())
            .port(self.port)
            .ssl_mode(ssl_mode)
    }

    pub fn with_db(&self) -> PgConnectOptions {
        self.without_db()
            .database(&self.database_name)
            .log_statements(tracing_log::log::LevelFilter::Trace)
    }
}

/// Which implementation of the remote row store receives the signups.
#[derive(serde::Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Postgres,
    Rest,
}

#[derive(serde::Deserialize, Clone)]
pub struct StoreSettings {
    pub backend: StoreBackend,
    #[serde(default = "default_table")]
    pub table: String,
    pub rest: Option<RestStoreSettings>,
}

fn default_table() -> String {
    "signups".to_string()
}

#[derive(serde::Deserialize, Clone)]
pub struct RestStoreSettings {
    pub base_url: String,
    pub api_key: Secret<String>,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub timeout_milliseconds: u64,
}

impl RestStoreSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_milliseconds)
    }

    pub fn client(&self) -> Result<RestStore, reqwest::Error> {
        RestStore::new(self.base_url.clone(), self.api_key.clone(), self.timeout())
    }
}

#[derive(serde::Deserialize, Clone)]
pub struct AnalyticsSettings {
    /// Also report failed inserts to the event beacon.
    #[serde(default)]
    pub report_failures: bool,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub timeout_milliseconds: u64,
    pub google: Option<GoogleAnalyticsSettings>,
    pub mixpanel: Option<MixpanelSettings>,
    pub meta_pixel: Option<MetaPixelSettings>,
}

impl AnalyticsSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_milliseconds)
    }
}

#[derive(serde::Deserialize, Clone)]
pub struct GoogleAnalyticsSettings {
    pub base_url: String,
    pub measurement_id: String,
    pub api_secret: Secret<String>,
}

impl GoogleAnalyticsSettings {
    pub fn client(&self, timeout: Duration) -> Result<GoogleAnalyticsClient, reqwest::Error> {
        GoogleAnalyticsClient::new(
            self.base_url.clone(),
            self.measurement_id.clone(),
            self.api_secret.clone(),
            timeout,
        )
    }
}

#[derive(serde::Deserialize, Clone)]
pub struct MixpanelSettings {
    pub base_url: String,
    pub project_token: Secret<String>,
}

impl MixpanelSettings {
    pub fn client(&self, timeout: Duration) -> Result<MixpanelClient, reqwest::Error> {
        MixpanelClient::new(self.base_url.clone(), self.project_token.clone(), timeout)
    }
}

#[derive(serde::Deserialize, Clone)]
pub struct MetaPixelSettings {
    pub base_url: String,
    pub pixel_id: String,
    pub access_token: Secret<String>,
}

impl MetaPixelSettings {
    pub fn client(&self, timeout: Duration) -> Result<MetaPixelClient, reqwest::Error> {
        MetaPixelClient::new(
            self.base_url.clone(),
            self.pixel_id.clone(),
            self.access_token.clone(),
            timeout,
        )
    }
}

pub fn get_configuration() -> Result<Settings, config::ConfigError> {
    let base_path = std::env::current_dir().expect("Failed to determine the current directory");
    let configuration_directory = base_path.join("configuration");

    // Detect the running environment.
    // Default to `local` if unspecified.
    let environment: Environment = std::env::var("APP_ENVIRONMENT")
        .unwrap_or_else(|_| "local".into())
        .try_into()
        .expect("Failed to parse APP_ENVIRONMENT.");
    let environment_filename = format!("{}.yaml", environment.as_str());

    // Initialise our configuration reader
    let settings = config::Config::builder()
        .add_source(config::File::from(
            configuration_directory.join("base.yaml"),
        ))
        .add_source(config::File::from(
            configuration_directory.join(environment_filename),
        ))
        // Add in settings from environment variables (with a prefix of APP and '__' as separator)
        // E.g. `APP_APPLICATION__PORT=5001 would set `Settings.application.port`
        .add_source(
            config::Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?;

    // Try to convert the configuration values it read into
    // our Settings type
    settings.try_deserialize::<Settings>()
}

/// The possible runtime environment for our application.
pub enum Environment {
    Local,
    Production,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Local => "local",
            Environment::Production => "production",
        }
    }
}

impl TryFrom<String> for Environment {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        match s.to_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "production" => Ok(Self::Production),
            other => Err(format!(
                "{} is not a supported environment. Use either `local` or `production`.",
                other
            )),
        }
    }
}
