//! src/signup/service.rs

use crate::analytics::AnalyticsDispatcher;
use crate::signup::{InFlightSubmissions, StoreBootstrap};
use crate::store::RemoteStore;
use std::sync::Arc;

/// Collaborators shared by every signup controller of the application.
#[derive(Clone)]
pub struct SignupService {
    store: Arc<dyn RemoteStore>,
    analytics: AnalyticsDispatcher,
    bootstrap: StoreBootstrap,
    in_flight: InFlightSubmissions,
    table: String,
}

impl SignupService {
    pub fn new(
        store: Arc<dyn RemoteStore>,
        analytics: AnalyticsDispatcher,
        bootstrap: StoreBootstrap,
        table: impl Into<String>,
    ) -> Self {
        Self {
            store,
            analytics,
            bootstrap,
            in_flight: InFlightSubmissions::default(),
            table: table.into(),
        }
    }

    pub fn store(&self) -> &dyn RemoteStore {
        self.store.as_ref()
    }

    pub fn analytics(&self) -> &AnalyticsDispatcher {
        &self.analytics
    }

    pub fn bootstrap(&self) -> &StoreBootstrap {
        &self.bootstrap
    }

    pub fn in_flight(&self) -> &InFlightSubmissions {
        &self.in_flight
    }

    pub fn table(&self) -> &str {
        &self.table
    }
}
