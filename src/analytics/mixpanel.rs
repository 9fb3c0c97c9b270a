//! src/analytics/mixpanel.rs

use crate::analytics::{AnalyticsError, Properties, UserTracker};
use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use secrecy::{ExposeSecret, Secret};
use serde_json::json;
use std::time::Duration;

/// User tracker backed by the Mixpanel ingestion API.
#[derive(Clone, Debug)]
pub struct MixpanelClient {
    http_client: Client,
    base_url: String,
    project_token: Secret<String>,
}

impl MixpanelClient {
    pub fn new(
        base_url: String,
        project_token: Secret<String>,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let http_client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http_client,
            base_url,
            project_token,
        })
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), endpoint)
    }

    /// Mixpanel answers `1` when it accepted the payload and `0` otherwise.
    async fn post(&self, endpoint: &str, payload: serde_json::Value) -> Result<(), AnalyticsError> {
        let response = self
            .http_client
            .post(self.url(endpoint))
            .header("Accept", "text/plain")
            .json(&[payload])
            .send()
            .await?
            .error_for_status()?;
        let body = response.text().await?;
        if body.trim() == "0" {
            return Err(AnalyticsError::Rejected(format!(
                "Mixpanel refused the payload sent to `{}`",
                endpoint
            )));
        }
        Ok(())
    }

    fn event_properties(&self, distinct_id: &str, properties: &Properties) -> Properties {
        let mut merged = properties.clone();
        merged.insert(
            "token".into(),
            self.project_token.expose_secret().clone().into(),
        );
        merged.insert("distinct_id".into(), distinct_id.into());
        merged.insert("time".into(), Utc::now().timestamp().into());
        merged
    }
}

#[async_trait]
impl UserTracker for MixpanelClient {
    #[tracing::instrument(name = "Identifying user with Mixpanel", skip(self))]
    async fn identify(&self, distinct_id: &str) -> Result<(), AnalyticsError> {
        let mut properties = Properties::new();
        properties.insert("$identified_id".into(), distinct_id.into());
        let payload = json!({
            "event": "$identify",
            "properties": self.event_properties(distinct_id, &properties),
        });
        self.post("track", payload).await
    }

    #[tracing::instrument(name = "Setting Mixpanel profile", skip(self, properties))]
    async fn people_set(
        &self,
        distinct_id: &str,
        properties: &Properties,
    ) -> Result<(), AnalyticsError> {
        let payload = json!({
            "$token": self.project_token.expose_secret(),
            "$distinct_id": distinct_id,
            "$set": properties,
        });
        self.post("engage#profile-set", payload).await
    }

    #[tracing::instrument(name = "Tracking Mixpanel event", skip(self, properties))]
    async fn track(
        &self,
        distinct_id: &str,
        event_name: &str,
        properties: &Properties,
    ) -> Result<(), AnalyticsError> {
        let payload = json!({
            "event": event_name,
            "properties": self.event_properties(distinct_id, properties),
        });
        self.post("track", payload).await
    }
}
