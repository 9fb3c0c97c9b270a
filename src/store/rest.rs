//! src/store/rest.rs

use crate::domain::SignupRecord;
use crate::store::{RemoteStore, StoreError};
use async_trait::async_trait;
use reqwest::{Client, Response};
use secrecy::{ExposeSecret, Secret};
use std::time::Duration;

/// Client of a hosted row store exposing tables over REST
/// (`POST /rest/v1/<table>`), as PostgREST based backends do.
#[derive(Clone, Debug)]
pub struct RestStore {
    http_client: Client,
    base_url: String,
    api_key: Secret<String>,
}

#[derive(serde::Deserialize)]
struct RestErrorBody {
    message: String,
}

impl RestStore {
    pub fn new(
        base_url: String,
        api_key: Secret<String>,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let http_client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http_client,
            base_url,
            api_key,
        })
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url.trim_end_matches('/'), table)
    }

    fn with_auth(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        request
            .header("apikey", self.api_key.expose_secret())
            .bearer_auth(self.api_key.expose_secret())
    }
}

/// Turn a non-success response into the error message the store sent.
async fn error_from_response(response: Response) -> StoreError {
    let status = response.status();
    match response.json::<RestErrorBody>().await {
        Ok(body) => StoreError::new(body.message),
        Err(_) => StoreError::new(format!("Row store responded with status {}", status)),
    }
}

#[async_trait]
impl RemoteStore for RestStore {
    #[tracing::instrument(
        name = "Sending new signup to the row store.",
        skip(self, record),
        fields(signup_email = %record.email())
    )]
    async fn insert(&self, table: &str, record: &SignupRecord) -> Result<(), StoreError> {
        let response = self
            .with_auth(self.http_client.post(self.table_url(table)))
            .header("Prefer", "return=minimal")
            .json(&[record])
            .send()
            .await
            .map_err(|e| StoreError::new(e.to_string()))?;
        if response.status().is_success() {
            Ok(())
        } else {
            Err(error_from_response(response).await)
        }
    }

    #[tracing::instrument(name = "Checking row store connection.", skip(self))]
    async fn ping(&self) -> Result<(), StoreError> {
        let url = format!("{}/rest/v1/", self.base_url.trim_end_matches('/'));
        let response = self
            .with_auth(self.http_client.get(url))
            .send()
            .await
            .map_err(|e| StoreError::new(e.to_string()))?;
        if response.status().is_success() {
            Ok(())
        } else {
            Err(error_from_response(response).await)
        }
    }
}
