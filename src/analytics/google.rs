//! src/analytics/google.rs

use crate::analytics::{AnalyticsError, EventBeacon, Properties};
use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, Secret};
use std::time::Duration;
use uuid::Uuid;

/// Event beacon speaking the GA4 Measurement Protocol.
#[derive(Clone, Debug)]
pub struct GoogleAnalyticsClient {
    http_client: Client,
    base_url: String,
    measurement_id: String,
    api_secret: Secret<String>,
}

#[derive(serde::Serialize)]
struct CollectRequest<'a> {
    client_id: String,
    events: Vec<CollectEvent<'a>>,
}

#[derive(serde::Serialize)]
struct CollectEvent<'a> {
    name: &'a str,
    params: &'a Properties,
}

impl GoogleAnalyticsClient {
    pub fn new(
        base_url: String,
        measurement_id: String,
        api_secret: Secret<String>,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let http_client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http_client,
            base_url,
            measurement_id,
            api_secret,
        })
    }
}

#[async_trait]
impl EventBeacon for GoogleAnalyticsClient {
    #[tracing::instrument(name = "Sending event to Google Analytics", skip(self, properties))]
    async fn send(
        &self,
        command: &str,
        event_name: &str,
        properties: &Properties,
    ) -> Result<(), AnalyticsError> {
        if command != "event" {
            // `config` and friends only make sense inside the browser snippet.
            tracing::debug!("Ignoring beacon command `{}`", command);
            return Ok(());
        }
        let url = format!("{}/mp/collect", self.base_url.trim_end_matches('/'));
        let request_body = CollectRequest {
            client_id: Uuid::new_v4().to_string(),
            events: vec![CollectEvent {
                name: event_name,
                params: properties,
            }],
        };
        self.http_client
            .post(&url)
            .query(&[
                ("measurement_id", self.measurement_id.as_str()),
                ("api_secret", self.api_secret.expose_secret().as_str()),
            ])
            .json(&request_body)
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}
