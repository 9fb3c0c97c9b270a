//! src/analytics/mod.rs
//!
//! Third-party trackers the landing page reports signups to. Every
//! collaborator is optional and best-effort: a missing one is logged, a
//! failing one is logged, neither ever affects the signup itself.

mod google;
mod meta_pixel;
mod mixpanel;

pub use google::GoogleAnalyticsClient;
pub use meta_pixel::MetaPixelClient;
pub use mixpanel::MixpanelClient;

use crate::domain::SignupRecord;
use crate::store::StoreError;
use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::Instrument;

/// Free-form event properties, as passed to the browser snippets.
pub type Properties = serde_json::Map<String, serde_json::Value>;

#[derive(thiserror::Error, Debug)]
pub enum AnalyticsError {
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error("Tracker rejected the event: {0}")]
    Rejected(String),
}

/// Pageview/event beacon keyed by a property id, called like `gtag(command, name, params)`.
#[async_trait]
pub trait EventBeacon: Send + Sync {
    async fn send(
        &self,
        command: &str,
        event_name: &str,
        properties: &Properties,
    ) -> Result<(), AnalyticsError>;
}

/// Tracker of identified users.
///
/// The browser library keeps the identified id as ambient state. A shared
/// server-side client cannot, so later calls take the id again.
#[async_trait]
pub trait UserTracker: Send + Sync {
    async fn identify(&self, distinct_id: &str) -> Result<(), AnalyticsError>;
    async fn people_set(
        &self,
        distinct_id: &str,
        properties: &Properties,
    ) -> Result<(), AnalyticsError>;
    async fn track(
        &self,
        distinct_id: &str,
        event_name: &str,
        properties: &Properties,
    ) -> Result<(), AnalyticsError>;
}

/// Conversion pixel, called like `fbq(command, name, params)`.
///
/// Server-side conversions must name the visitor, so the email travels along
/// and is matched by the pixel, never stored in `properties`.
#[async_trait]
pub trait ConversionPixel: Send + Sync {
    async fn send(
        &self,
        command: &str,
        event_name: &str,
        properties: &Properties,
        user_email: &str,
    ) -> Result<(), AnalyticsError>;
}

pub const SIGNUP_EVENT: &str = "lead_form_submit";
pub const SIGNUP_FAILED_EVENT: &str = "form_supabase_fail";
pub const TRACKER_SIGNUP_EVENT: &str = "Waitlist Signup Success";
pub const PIXEL_SIGNUP_EVENT: &str = "Lead";

/// Fans signup outcomes out to whichever collaborators are present.
#[derive(Clone, Default)]
pub struct AnalyticsDispatcher {
    beacon: Option<Arc<dyn EventBeacon>>,
    tracker: Option<Arc<dyn UserTracker>>,
    pixel: Option<Arc<dyn ConversionPixel>>,
    report_failures: bool,
}

fn properties(value: serde_json::Value) -> Properties {
    match value {
        serde_json::Value::Object(map) => map,
        _ => Properties::new(),
    }
}

fn log_failure(collaborator: &str, result: Result<(), AnalyticsError>) {
    if let Err(e) = result {
        tracing::warn!(
            error.cause_chain = ?e,
            error.message = %e,
            "{} did not accept the event",
            collaborator
        );
    }
}

impl AnalyticsDispatcher {
    pub fn new(report_failures: bool) -> Self {
        Self {
            report_failures,
            ..Default::default()
        }
    }

    pub fn with_beacon(mut self, beacon: Arc<dyn EventBeacon>) -> Self {
        self.beacon = Some(beacon);
        self
    }

    pub fn with_tracker(mut self, tracker: Arc<dyn UserTracker>) -> Self {
        self.tracker = Some(tracker);
        self
    }

    pub fn with_pixel(mut self, pixel: Arc<dyn ConversionPixel>) -> Self {
        self.pixel = Some(pixel);
        self
    }

    pub fn reports_failures(&self) -> bool {
        self.report_failures
    }

    /// Run [`Self::signup_succeeded`] in the background, the visitor never
    /// waits for the trackers.
    pub fn spawn_signup_succeeded(&self, record: &SignupRecord) -> JoinHandle<()> {
        let dispatcher = self.clone();
        let record = record.clone();
        tokio::spawn(
            async move { dispatcher.signup_succeeded(&record).await }.in_current_span(),
        )
    }

    /// Run [`Self::signup_failed`] in the background.
    pub fn spawn_signup_failed(&self, error: &StoreError) -> JoinHandle<()> {
        let dispatcher = self.clone();
        let error = error.clone();
        tokio::spawn(async move { dispatcher.signup_failed(&error).await }.in_current_span())
    }

    #[tracing::instrument(
        name = "Reporting a successful signup",
        skip(self, record),
        fields(signup_email = %record.email())
    )]
    pub async fn signup_succeeded(&self, record: &SignupRecord) {
        match &self.beacon {
            Some(beacon) => {
                let params = properties(json!({
                    "event_category": "Engagement",
                    "event_label": "Waitlist Signup",
                    "value": 1
                }));
                log_failure("Event beacon", beacon.send("event", SIGNUP_EVENT, &params).await);
            }
            None => tracing::warn!("No event beacon configured, skipping signup event."),
        }

        match &self.tracker {
            Some(tracker) => {
                let id = record.email();
                log_failure("User tracker", tracker.identify(id).await);
                let profile = properties(json!({
                    "$first_name": record.first_name(),
                    "$email": record.email()
                }));
                log_failure("User tracker", tracker.people_set(id, &profile).await);
                let params = properties(json!({
                    "first_name": record.first_name(),
                    "platform": "Web"
                }));
                log_failure(
                    "User tracker",
                    tracker.track(id, TRACKER_SIGNUP_EVENT, &params).await,
                );
            }
            None => tracing::warn!("No user tracker configured, skipping signup event."),
        }

        match &self.pixel {
            Some(pixel) => {
                let params = properties(json!({ "content_name": "Waitlist Signup" }));
                log_failure(
                    "Conversion pixel",
                    pixel
                        .send("track", PIXEL_SIGNUP_EVENT, &params, record.email())
                        .await,
                );
            }
            None => tracing::warn!("No conversion pixel configured, skipping signup event."),
        }
    }

    /// Only the event beacon hears about failures, and only if enabled.
    #[tracing::instrument(name = "Reporting a failed signup", skip(self, error))]
    pub async fn signup_failed(&self, error: &StoreError) {
        if !self.report_failures {
            return;
        }
        match &self.beacon {
            Some(beacon) => {
                let excerpt: String = error.message.chars().take(50).collect();
                let params = properties(json!({
                    "event_category": "Error",
                    "event_label": format!("Supabase Error: {}", excerpt),
                    "value": 0
                }));
                log_failure(
                    "Event beacon",
                    beacon.send("event", SIGNUP_FAILED_EVENT, &params).await,
                );
            }
            None => tracing::warn!("No event beacon configured, skipping failure event."),
        }
    }
}
