//! src/analytics/meta_pixel.rs

use crate::analytics::{AnalyticsError, ConversionPixel, Properties};
use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use secrecy::{ExposeSecret, Secret};
use serde_json::json;
use sha2::{Digest, Sha256};
use std::time::Duration;

/// Conversion pixel reporting through the Meta Conversions API.
#[derive(Clone, Debug)]
pub struct MetaPixelClient {
    http_client: Client,
    base_url: String,
    pixel_id: String,
    access_token: Secret<String>,
}

impl MetaPixelClient {
    pub fn new(
        base_url: String,
        pixel_id: String,
        access_token: Secret<String>,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let http_client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http_client,
            base_url,
            pixel_id,
            access_token,
        })
    }
}

/// Conversions API customer match key: hex SHA-256 of the normalized email.
fn hashed_email(email: &str) -> String {
    hex::encode(Sha256::digest(email.trim().to_lowercase().as_bytes()))
}

#[async_trait]
impl ConversionPixel for MetaPixelClient {
    #[tracing::instrument(
        name = "Sending conversion to Meta Pixel",
        skip(self, properties, user_email)
    )]
    async fn send(
        &self,
        command: &str,
        event_name: &str,
        properties: &Properties,
        user_email: &str,
    ) -> Result<(), AnalyticsError> {
        match command {
            "track" | "trackCustom" => {}
            _ => {
                tracing::debug!("Ignoring pixel command `{}`", command);
                return Ok(());
            }
        }
        let url = format!(
            "{}/{}/events",
            self.base_url.trim_end_matches('/'),
            self.pixel_id
        );
        let payload = json!({
            "data": [{
                "event_name": event_name,
                "event_time": Utc::now().timestamp(),
                "action_source": "website",
                "user_data": { "em": [hashed_email(user_email)] },
                "custom_data": properties,
            }]
        });
        self.http_client
            .post(&url)
            .query(&[("access_token", self.access_token.expose_secret().as_str())])
            .json(&payload)
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}
