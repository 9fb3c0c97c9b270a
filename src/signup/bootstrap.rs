//! src/signup/bootstrap.rs

use crate::store::RemoteStore;
use std::sync::Arc;
use tokio::sync::watch;

/// Readiness of the remote store client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BootstrapStatus {
    Loading,
    Ready,
    Failed(String),
}

/// Tracks the one-time initialization of the remote store client.
///
/// Submissions are held back while the status is `Loading`.
#[derive(Clone, Debug)]
pub struct StoreBootstrap {
    status: watch::Receiver<BootstrapStatus>,
}

impl StoreBootstrap {
    /// Check the store in a background task. The status starts as `Loading`.
    pub fn start(store: Arc<dyn RemoteStore>) -> Self {
        let (sender, bootstrap) = Self::pending();
        tokio::spawn(async move {
            let status = match store.ping().await {
                Ok(()) => {
                    tracing::info!("Remote store is ready");
                    BootstrapStatus::Ready
                }
                Err(e) => {
                    tracing::error!(
                        error.cause_chain = ?e,
                        error.message = %e,
                        "Remote store could not be initialized"
                    );
                    BootstrapStatus::Failed(e.message)
                }
            };
            // nobody listening anymore means the application shut down
            let _ = sender.send(status);
        });
        bootstrap
    }

    /// A bootstrap that is resolved by hand through the returned sender.
    pub fn pending() -> (watch::Sender<BootstrapStatus>, Self) {
        let (sender, status) = watch::channel(BootstrapStatus::Loading);
        (sender, Self { status })
    }

    pub fn ready() -> Self {
        let (_, status) = watch::channel(BootstrapStatus::Ready);
        Self { status }
    }

    pub fn status(&self) -> BootstrapStatus {
        self.status.borrow().clone()
    }

    /// Wait until the bootstrap left `Loading`.
    pub async fn resolved(&self) -> BootstrapStatus {
        let mut status = self.status.clone();
        let resolved = match status.wait_for(|s| *s != BootstrapStatus::Loading).await {
            Ok(resolved) => (*resolved).clone(),
            // sender dropped without a verdict
            Err(_) => self.status(),
        };
        resolved
    }
}
